use super::*;

fn candidate(kind: &str, code: &str, interval: &str, window: &str) -> TaskCandidate {
    TaskCandidate {
        task_type: Some(kind.to_string()),
        task_code: Some(code.to_string()),
        interval: Some(interval.to_string()),
        window: Some(window.to_string()),
    }
}

#[test]
fn test_valid_url_task() {
    let settings =
        TaskValidator::validate(&candidate("url", "https://example.com/ping", "5", "20")).unwrap();
    assert_eq!(settings.kind, TaskKind::UrlFetch);
    assert_eq!(settings.payload, "https://example.com/ping");
    assert_eq!(settings.interval_secs, 5);
    assert_eq!(settings.window_secs, 20);
}

#[test]
fn test_valid_code_task_keeps_payload_verbatim() {
    let settings =
        TaskValidator::validate(&candidate("code", "  echo tick\n", "60", "60")).unwrap();
    assert_eq!(settings.kind, TaskKind::Code);
    assert_eq!(settings.payload, "  echo tick\n");
}

#[test]
fn test_window_below_interval_rejected() {
    let err =
        TaskValidator::validate(&candidate("url", "https://example.com", "10", "5")).unwrap_err();
    assert_eq!(
        err,
        ValidationError::WindowBelowInterval {
            window: 5,
            interval: 10
        }
    );
    let message = err.to_string();
    assert!(message.contains("window"));
    assert!(message.contains("interval"));
}

#[test]
fn test_first_violation_wins() {
    // Bad type, empty payload and bad interval: only the type is reported.
    let err = TaskValidator::validate(&candidate("shell", "", "0", "0")).unwrap_err();
    assert_eq!(err, ValidationError::UnknownTaskType("shell".to_string()));

    let err = TaskValidator::validate(&candidate("url", "   ", "0", "0")).unwrap_err();
    assert_eq!(err, ValidationError::EmptyPayload);
}

#[test]
fn test_interval_bounds() {
    let url = "https://example.com";
    assert_eq!(
        TaskValidator::validate(&candidate("url", url, "0", "10")).unwrap_err(),
        ValidationError::IntervalOutOfRange(0)
    );
    assert_eq!(
        TaskValidator::validate(&candidate("url", url, "3601", "4000")).unwrap_err(),
        ValidationError::IntervalOutOfRange(3601)
    );
    assert!(TaskValidator::validate(&candidate("url", url, "1", "1")).is_ok());
    assert!(TaskValidator::validate(&candidate("url", url, "3600", "86400")).is_ok());
}

#[test]
fn test_window_upper_bound() {
    let err = TaskValidator::validate(&candidate("url", "https://example.com", "60", "86401"))
        .unwrap_err();
    assert_eq!(err, ValidationError::WindowTooLarge(86401));
}

#[test]
fn test_non_integer_interval() {
    let err = TaskValidator::validate(&candidate("url", "https://example.com", "ten", "20"))
        .unwrap_err();
    assert!(matches!(err, ValidationError::NotAnInteger { field: "interval", .. }));
}

#[test]
fn test_url_payload_checked() {
    let err = TaskValidator::validate(&candidate("url", "not a url", "5", "20")).unwrap_err();
    assert!(matches!(err, ValidationError::InvalidUrl(_)));

    let err =
        TaskValidator::validate(&candidate("url", "file:///etc/passwd", "5", "20")).unwrap_err();
    assert!(matches!(err, ValidationError::InvalidUrl(_)));
}

#[test]
fn test_missing_fields() {
    let err = TaskValidator::validate(&TaskCandidate::default()).unwrap_err();
    assert_eq!(err, ValidationError::MissingField("taskType"));
}

#[test]
fn test_merged_with_fills_gaps() {
    let current = TaskSettings::new(TaskKind::UrlFetch, "https://example.com", 5, 20);
    let partial = TaskCandidate {
        window: Some("40".to_string()),
        ..TaskCandidate::default()
    };
    let settings = TaskValidator::validate(&partial.merged_with(&current)).unwrap();
    assert_eq!(settings.interval_secs, 5);
    assert_eq!(settings.window_secs, 40);
    assert_eq!(settings.payload, "https://example.com");
}

#[test]
fn test_overlay_prefers_other() {
    let query = candidate("url", "https://a.example", "5", "20");
    let body = TaskCandidate {
        interval: Some("7".to_string()),
        ..TaskCandidate::default()
    };
    let merged = query.overlay(body);
    assert_eq!(merged.interval.as_deref(), Some("7"));
    assert_eq!(merged.window.as_deref(), Some("20"));
}
