use super::*;
use nocron_protocols::{
    PauseSignalStore, StatsStore, TaskDefinition, TaskKind, TaskStore, TickOutcome, TickRecord,
};
use nocron_store::{FileInstanceStore, MemoryInstanceStore};
use tempfile::TempDir;

use crate::error::ControlError;
use crate::test_support::UnloggedStore;
use crate::validate::ValidationError;

const SUFFIX: &str = "abc123";
const SECRET: &str = "0123456789abcdef0123456789abcdef";

async fn setup() -> (ControlPlane, Arc<MemoryInstanceStore>) {
    let store = Arc::new(MemoryInstanceStore::new());
    let task = TaskDefinition::new(
        SUFFIX,
        SECRET,
        TaskSettings::new(TaskKind::UrlFetch, "https://example.com/ping", 5, 20),
    );
    store.create_task(&task).await.unwrap();
    (ControlPlane::new(store.clone()), store)
}

fn fields(interval: &str, window: &str) -> TaskCandidate {
    TaskCandidate {
        interval: Some(interval.to_string()),
        window: Some(window.to_string()),
        ..TaskCandidate::default()
    }
}

#[test]
fn test_action_parsing() {
    assert_eq!("update".parse::<ManagerAction>().unwrap(), ManagerAction::Update);
    assert_eq!("KILL".parse::<ManagerAction>().unwrap(), ManagerAction::Kill);
    assert_eq!("".parse::<ManagerAction>().unwrap(), ManagerAction::Stats);
    assert!(matches!(
        "explode".parse::<ManagerAction>(),
        Err(ControlError::UnknownAction(_))
    ));
}

#[tokio::test]
async fn test_rejected_update_leaves_record_untouched() {
    let (control, store) = setup().await;
    let before = store.load_task(SUFFIX).await.unwrap().unwrap();

    let err = control
        .execute(SUFFIX, Some(SECRET), ManagerAction::Update, fields("10", "5"))
        .await
        .unwrap_err();

    match err {
        ControlError::Validation(ValidationError::WindowBelowInterval { window, interval }) => {
            assert_eq!((window, interval), (5, 10));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    let after = store.load_task(SUFFIX).await.unwrap().unwrap();
    assert_eq!(before, after);
    assert_eq!(after.interval_secs(), 5);
    assert_eq!(after.window_secs(), 20);
}

#[tokio::test]
async fn test_partial_update_applies() {
    let (control, store) = setup().await;

    let outcome = control
        .execute(SUFFIX, Some(SECRET), ManagerAction::Update, fields("10", "60"))
        .await
        .unwrap();
    assert!(matches!(outcome, ControlOutcome::Updated(_)));

    let task = store.load_task(SUFFIX).await.unwrap().unwrap();
    assert_eq!(task.interval_secs(), 10);
    assert_eq!(task.window_secs(), 60);
    assert_eq!(task.payload(), "https://example.com/ping");
    assert_eq!(task.secret, SECRET);

    let logs = store.recent_logs(SUFFIX, 10).await.unwrap();
    assert!(logs[0].contains("Settings updated"));
}

#[tokio::test]
async fn test_validate_does_not_mutate() {
    let (control, store) = setup().await;
    let candidate = TaskCandidate {
        task_type: Some("url".to_string()),
        task_code: Some("https://example.org".to_string()),
        interval: Some("30".to_string()),
        window: Some("300".to_string()),
    };

    let outcome = control
        .execute(SUFFIX, Some(SECRET), ManagerAction::Validate, candidate)
        .await
        .unwrap();
    assert!(matches!(outcome, ControlOutcome::Valid(_)));
    assert!(outcome.data().is_some());

    let task = store.load_task(SUFFIX).await.unwrap().unwrap();
    assert_eq!(task.interval_secs(), 5);
}

#[tokio::test]
async fn test_pause_and_resume_are_idempotent() {
    let (control, store) = setup().await;

    for _ in 0..2 {
        control
            .execute(SUFFIX, Some(SECRET), ManagerAction::Pause, TaskCandidate::default())
            .await
            .unwrap();
        assert!(store.is_paused(SUFFIX).await.unwrap());
    }

    let first = control
        .execute(SUFFIX, Some(SECRET), ManagerAction::Resume, TaskCandidate::default())
        .await
        .unwrap();
    assert!(matches!(first, ControlOutcome::Resumed { was_paused: true }));
    assert!(!store.is_paused(SUFFIX).await.unwrap());

    let second = control
        .execute(SUFFIX, Some(SECRET), ManagerAction::Resume, TaskCandidate::default())
        .await
        .unwrap();
    assert!(matches!(second, ControlOutcome::Resumed { was_paused: false }));
    assert!(!store.is_paused(SUFFIX).await.unwrap());
}

#[tokio::test]
async fn test_resume_clears_halted_state() {
    let (control, store) = setup().await;
    control
        .execute(SUFFIX, Some(SECRET), ManagerAction::Pause, TaskCandidate::default())
        .await
        .unwrap();
    // A worker honoured the pause.
    assert!(store.consume_pause(SUFFIX).await.unwrap());
    assert!(store.is_paused(SUFFIX).await.unwrap());

    let outcome = control
        .execute(SUFFIX, Some(SECRET), ManagerAction::Resume, TaskCandidate::default())
        .await
        .unwrap();
    assert!(matches!(outcome, ControlOutcome::Resumed { was_paused: true }));
    assert!(!store.is_paused(SUFFIX).await.unwrap());
}

#[tokio::test]
async fn test_stats_view() {
    let (control, store) = setup().await;
    for ok in [true, false, true] {
        let outcome = if ok {
            TickOutcome::Success {
                detail: "HTTP 200".to_string(),
            }
        } else {
            TickOutcome::Failure {
                reason: "HTTP 500".to_string(),
            }
        };
        let tick = TickRecord::new(Utc::now(), 5, outcome);
        store.record_tick(SUFFIX, &tick).await.unwrap();
        store.append_log(SUFFIX, &tick.log_line()).await.unwrap();
    }
    store.raise_pause(SUFFIX).await.unwrap();

    let outcome = control
        .execute(SUFFIX, Some(SECRET), ManagerAction::Stats, TaskCandidate::default())
        .await
        .unwrap();
    let ControlOutcome::Stats(view) = &outcome else {
        panic!("expected stats outcome");
    };

    assert_eq!(view.stats.total_loops, 3);
    assert_eq!(view.stats.total_success, 2);
    assert_eq!(view.stats.total_fails, 1);
    assert_eq!(view.logs.len(), 3);
    assert!(view.logs[0].contains("Run OK"));
    assert!(view.logs[1].contains("Run FAILED"));
    assert!(view.paused);
    assert!(view.next_run_in_seconds.is_some_and(|secs| secs <= 5));

    let data = outcome.data().unwrap();
    assert_eq!(data["paused"], true);
    assert_eq!(data["settings"]["interval"], 5);
    assert!(data["settings"].get("secret").is_none());
}

#[tokio::test]
async fn test_stats_log_limit() {
    let (control, store) = setup().await;
    let control = control.with_stats_log_lines(2);
    for i in 0..5 {
        store.append_log(SUFFIX, &format!("line {i}")).await.unwrap();
    }

    let outcome = control
        .execute(SUFFIX, Some(SECRET), ManagerAction::Stats, TaskCandidate::default())
        .await
        .unwrap();
    let ControlOutcome::Stats(view) = outcome else {
        panic!("expected stats outcome");
    };
    assert_eq!(view.logs, vec!["line 4".to_string(), "line 3".to_string()]);
}

#[tokio::test]
async fn test_kill_then_unauthorized() {
    let (control, store) = setup().await;

    let outcome = control
        .execute(SUFFIX, Some(SECRET), ManagerAction::Kill, TaskCandidate::default())
        .await
        .unwrap();
    assert!(matches!(outcome, ControlOutcome::Killed));
    assert!(store.load_task(SUFFIX).await.unwrap().is_none());

    for action in [ManagerAction::Stats, ManagerAction::Pause, ManagerAction::Kill] {
        let err = control
            .execute(SUFFIX, Some(SECRET), action, TaskCandidate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ControlError::Unauthorized));
    }
}

#[tokio::test]
async fn test_wrong_token_rejected() {
    let (control, store) = setup().await;
    let err = control
        .execute(SUFFIX, Some("nope"), ManagerAction::Pause, TaskCandidate::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ControlError::Unauthorized));
    assert!(!store.is_paused(SUFFIX).await.unwrap());
}

#[tokio::test]
async fn test_update_reported_when_run_log_fails() {
    let store = Arc::new(UnloggedStore::default());
    let task = TaskDefinition::new(
        SUFFIX,
        SECRET,
        TaskSettings::new(TaskKind::UrlFetch, "https://example.com/ping", 5, 20),
    );
    store.create_task(&task).await.unwrap();
    let control = ControlPlane::new(store.clone());

    let outcome = control
        .execute(SUFFIX, Some(SECRET), ManagerAction::Update, fields("10", "40"))
        .await
        .unwrap();
    assert!(matches!(outcome, ControlOutcome::Updated(_)));

    let stored = store.load_task(SUFFIX).await.unwrap().unwrap();
    assert_eq!((stored.interval_secs(), stored.window_secs()), (10, 40));
}

#[tokio::test]
async fn test_concurrent_partial_updates_both_apply() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(FileInstanceStore::new(dir.path()).await.unwrap());
    let task = TaskDefinition::new(
        SUFFIX,
        SECRET,
        TaskSettings::new(TaskKind::UrlFetch, "https://example.com/ping", 5, 20),
    );
    store.create_task(&task).await.unwrap();
    let control = ControlPlane::new(store.clone());

    for _ in 0..10 {
        let interval_only = TaskCandidate {
            interval: Some("10".to_string()),
            ..TaskCandidate::default()
        };
        let window_only = TaskCandidate {
            window: Some("40".to_string()),
            ..TaskCandidate::default()
        };
        let (a, b) = tokio::join!(
            control.execute(SUFFIX, Some(SECRET), ManagerAction::Update, interval_only),
            control.execute(SUFFIX, Some(SECRET), ManagerAction::Update, window_only),
        );
        a.unwrap();
        b.unwrap();

        let stored = store.load_task(SUFFIX).await.unwrap().unwrap();
        assert_eq!((stored.interval_secs(), stored.window_secs()), (10, 40));

        let reset = TaskCandidate {
            interval: Some("5".to_string()),
            window: Some("20".to_string()),
            ..TaskCandidate::default()
        };
        control
            .execute(SUFFIX, Some(SECRET), ManagerAction::Update, reset)
            .await
            .unwrap();
    }
}
