//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::MainConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<MainConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Parse and validate configuration from TOML text.
pub fn load_config_from_str(content: &str) -> Result<MainConfig, ConfigError> {
    let config: MainConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::LogFormat;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = load_config_from_str("").unwrap();
        assert!(config.log_time);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Text);
        assert!(config.signals.hangup);
    }

    #[test]
    fn test_partial_sections() {
        let config = load_config_from_str(
            r#"
            log_time = false

            [logging]
            format = "json"
            quiet_on_shutdown = ["hyper", "reqwest"]

            [signals]
            hangup = false
            "#,
        )
        .unwrap();

        assert!(!config.log_time);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.quiet_on_shutdown, vec!["hyper", "reqwest"]);
        assert!(config.signals.interrupt);
        assert!(!config.signals.hangup);
    }

    #[test]
    fn test_unknown_format_is_parse_error() {
        let err = load_config_from_str("[logging]\nformat = \"xml\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_error_message() {
        let err = load_config_from_str(
            "[signals]\ninterrupt = false\nterminate = false\nhangup = false\n",
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: no termination signal enabled"
        );
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_config(Path::new("/nonexistent/setup-main.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
