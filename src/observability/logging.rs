//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the global tracing subscriber (text or JSON)
//! - Keep a reload handle on the level filter
//! - Silence noisy targets once a shutdown has been observed
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - Filter is an `EnvFilter` behind a reload layer so it can change at runtime
//! - Second initialization is an error, not a panic

use std::sync::{Arc, OnceLock};

use thiserror::Error;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry,
};

use crate::config::{LogFormat, LoggingConfig};

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log level: {0}")]
    InvalidLogLevel(String),

    #[error("logger has already been initialized: {0}")]
    AlreadyInitialized(String),

    #[error("failed to reload log filter: {0}")]
    Reload(String),
}

/// Handle to the installed subscriber's filter.
#[derive(Clone)]
pub struct LogHandle {
    reload: reload::Handle<EnvFilter, Registry>,
    base: String,
    quiet: Vec<String>,
}

impl LogHandle {
    fn new(reload: reload::Handle<EnvFilter, Registry>, base: &str, quiet: Vec<String>) -> Self {
        Self {
            reload,
            base: base.to_string(),
            quiet,
        }
    }

    /// Switch off every configured quiet target. No-op when none are configured.
    pub fn quiet_targets(&self) -> Result<(), LoggingError> {
        if self.quiet.is_empty() {
            return Ok(());
        }

        let directive = shutdown_directive(&self.base, &self.quiet);
        let filter = mk_filter(&directive)?;
        self.reload
            .reload(filter)
            .map_err(|e| LoggingError::Reload(e.to_string()))?;

        tracing::debug!(filter = %directive, "Shutdown log filter applied");
        Ok(())
    }
}

/// Install the global subscriber described by `cfg`.
pub fn init_logging(cfg: &LoggingConfig) -> Result<LogHandle, LoggingError> {
    let (filter, reload) = reload::Layer::new(mk_filter(&cfg.level)?);
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match cfg.format {
        LogFormat::Text => registry
            .with(
                fmt::layer()
                    .with_ansi(cfg.ansi)
                    .with_target(cfg.with_target),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_target(cfg.with_target),
            )
            .try_init(),
    };
    installed.map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))?;

    Ok(LogHandle::new(
        reload,
        &cfg.level,
        cfg.quiet_on_shutdown.clone(),
    ))
}

/// Set-once slot connecting the logging setup hook to the shutdown hook.
///
/// Triggering before a handle was installed does nothing.
#[derive(Clone, Default)]
pub struct ShutdownFilter {
    slot: Arc<OnceLock<LogHandle>>,
}

impl ShutdownFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the handle. Later calls are ignored.
    pub fn install(&self, handle: LogHandle) {
        let _ = self.slot.set(handle);
    }

    pub fn is_installed(&self) -> bool {
        self.slot.get().is_some()
    }

    /// Apply the shutdown filter if a handle is installed.
    pub fn trigger(&self) {
        if let Some(handle) = self.slot.get() {
            if let Err(e) = handle.quiet_targets() {
                tracing::error!(error = %e, "Failed to apply shutdown log filter");
            }
        }
    }
}

fn mk_filter(directive: &str) -> Result<EnvFilter, LoggingError> {
    EnvFilter::try_new(directive).map_err(|_| LoggingError::InvalidLogLevel(directive.to_string()))
}

fn shutdown_directive(base: &str, quiet: &[String]) -> String {
    let mut directive = base.to_string();
    for target in quiet {
        directive.push_str(&format!(",{}=off", target));
    }
    directive
}
