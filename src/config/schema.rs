//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.
//! Callbacks are not part of the schema; they live in
//! [`Hooks`](crate::lifecycle::Hooks).

use serde::{Deserialize, Serialize};

/// Root configuration for a main-task run.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MainConfig {
    /// Report elapsed wall time when the main task exits.
    pub log_time: bool,

    /// Logging settings.
    pub logging: LoggingConfig,

    /// Termination signals the coordinator listens for.
    pub signals: SignalConfig,
}

impl Default for MainConfig {
    fn default() -> Self {
        Self {
            log_time: true,
            logging: LoggingConfig::default(),
            signals: SignalConfig::default(),
        }
    }
}

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (trace, debug, info, warn, error, or `target=level` lists).
    pub level: String,

    /// Output format.
    pub format: LogFormat,

    /// Include the event target in each line.
    pub with_target: bool,

    /// Colored output (text format only).
    pub ansi: bool,

    /// Targets silenced once a shutdown has been observed.
    pub quiet_on_shutdown: Vec<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
            with_target: true,
            ansi: true,
            quiet_on_shutdown: Vec::new(),
        }
    }
}

/// Which termination signals trigger a shutdown.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SignalConfig {
    /// SIGINT (Ctrl+C).
    pub interrupt: bool,

    /// SIGTERM.
    pub terminate: bool,

    /// SIGHUP. Ignored on non-unix platforms.
    pub hangup: bool,
}

impl SignalConfig {
    pub fn any_enabled(&self) -> bool {
        self.interrupt || self.terminate || self.hangup
    }
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            interrupt: true,
            terminate: true,
            hangup: true,
        }
    }
}
