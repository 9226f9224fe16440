//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the log filter directive parses
//! - Check quiet-on-shutdown targets are usable filter targets
//! - Require at least one termination signal
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: MainConfig → Result<(), Vec<ValidationError>>

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::schema::MainConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid log level directive '{0}'")]
    InvalidLogLevel(String),

    #[error("invalid quiet_on_shutdown target '{0}'")]
    InvalidQuietTarget(String),

    #[error("no termination signal enabled")]
    NoSignals,
}

/// Validate a parsed configuration, collecting every error found.
pub fn validate_config(config: &MainConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if EnvFilter::try_new(&config.logging.level).is_err() {
        errors.push(ValidationError::InvalidLogLevel(config.logging.level.clone()));
    }

    for target in &config.logging.quiet_on_shutdown {
        if !is_valid_target(target) {
            errors.push(ValidationError::InvalidQuietTarget(target.clone()));
        }
    }

    if !config.signals.any_enabled() {
        errors.push(ValidationError::NoSignals);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_valid_target(target: &str) -> bool {
    !target.is_empty()
        && target
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | ':' | '-' | '.'))
}
