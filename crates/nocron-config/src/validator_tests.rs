use super::*;

#[test]
fn test_validate_default_config() {
    let config = Config::default();
    let result = ConfigValidator::validate(&config);
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "install.token"));
}

#[test]
fn test_validate_invalid_port() {
    let mut config = Config::default();
    config.server.port = 0;

    let result = ConfigValidator::validate(&config);
    assert!(!result.is_valid());
    assert!(result.errors.iter().any(|e| e.path == "server.port"));
}

#[test]
fn test_validate_invalid_public_url() {
    let mut config = Config::default();
    config.server.public_url = Some("ftp://example.org".to_string());

    let result = ConfigValidator::validate(&config);
    assert!(result.errors.iter().any(|e| e.path == "server.public_url"));

    config.server.public_url = Some("not a url".to_string());
    let result = ConfigValidator::validate(&config);
    assert!(result.errors.iter().any(|e| e.path == "server.public_url"));
}

#[test]
fn test_validate_zero_timeouts() {
    let mut config = Config::default();
    config.worker.fetch_timeout_secs = 0;
    config.worker.respawn_timeout_secs = 0;
    config.code.timeout_secs = 0;

    let result = ConfigValidator::validate(&config);
    assert_eq!(result.errors.len(), 3);
}

#[test]
fn test_validate_empty_interpreter() {
    let mut config = Config::default();
    config.code.interpreter.clear();

    let result = ConfigValidator::validate(&config);
    assert!(result.errors.iter().any(|e| e.path == "code.interpreter"));
}

#[test]
fn test_validate_code_enabled_warning() {
    let mut config = Config::default();
    config.code.enabled = true;
    config.install.token = Some("token".to_string());

    let result = ConfigValidator::validate(&config);
    assert!(result.is_valid());
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].path, "code.enabled");
}

#[test]
fn test_validate_small_log_retention_warning() {
    let mut config = Config::default();
    config.worker.log_retention = 3;

    let result = ConfigValidator::validate(&config);
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "worker.log_retention"));
}
