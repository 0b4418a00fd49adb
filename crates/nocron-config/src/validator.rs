//! Configuration validation.

use crate::schema::Config;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_server(config, &mut result);
        Self::validate_worker(config, &mut result);
        Self::validate_code(config, &mut result);
        Self::validate_install(config, &mut result);

        result
    }

    fn validate_server(config: &Config, result: &mut ValidationResult) {
        if config.server.port == 0 {
            result.add_error(ValidationError::new("server.port", "Port cannot be 0"));
        }

        if config.server.host.is_empty() {
            result.add_error(ValidationError::new("server.host", "Host cannot be empty"));
        }

        if let Some(ref public_url) = config.server.public_url {
            match url::Url::parse(public_url) {
                Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
                Ok(_) => result.add_error(ValidationError::new(
                    "server.public_url",
                    "public_url must start with http:// or https://",
                )),
                Err(e) => result.add_error(ValidationError::new(
                    "server.public_url",
                    format!("public_url is not a valid URL: {}", e),
                )),
            }
        }
    }

    fn validate_worker(config: &Config, result: &mut ValidationResult) {
        if config.worker.fetch_timeout_secs == 0 {
            result.add_error(ValidationError::new(
                "worker.fetch_timeout_secs",
                "fetch_timeout_secs must be greater than 0",
            ));
        }

        if config.worker.respawn_timeout_secs == 0 {
            result.add_error(ValidationError::new(
                "worker.respawn_timeout_secs",
                "respawn_timeout_secs must be greater than 0",
            ));
        }

        if config.worker.log_retention < config.worker.stats_log_lines {
            result.add_warning(ValidationWarning::new(
                "worker.log_retention",
                "log_retention is smaller than stats_log_lines, stats will show fewer lines",
            ));
        }

        if config.worker.log_retention > 100_000 {
            result.add_warning(ValidationWarning::new(
                "worker.log_retention",
                "log_retention is very high (>100000), run logs may grow large",
            ));
        }
    }

    fn validate_code(config: &Config, result: &mut ValidationResult) {
        if config.code.interpreter.is_empty() || config.code.interpreter[0].is_empty() {
            result.add_error(ValidationError::new(
                "code.interpreter",
                "interpreter must name a program",
            ));
        }

        if config.code.timeout_secs == 0 {
            result.add_error(ValidationError::new(
                "code.timeout_secs",
                "timeout_secs must be greater than 0",
            ));
        }

        if config.code.enabled {
            result.add_warning(ValidationWarning::new(
                "code.enabled",
                "code tasks are enabled; payloads run as child processes of this server",
            ));
        }
    }

    fn validate_install(config: &Config, result: &mut ValidationResult) {
        if config.install.enabled && config.install.token.is_none() {
            result.add_warning(ValidationWarning::new(
                "install.token",
                "install endpoint is enabled without a token, anyone can create instances",
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
