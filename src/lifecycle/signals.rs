//! OS signal handling.
//!
//! # Responsibilities
//! - Register listeners for the configured termination signals
//! - Translate every delivery into a set of the [`StopCondition`]
//! - Deregister on drop of the returned guard
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - One listener task per signal kind; repeated deliveries are no-ops once
//!   the stop condition is set
//! - SIGHUP is treated as a termination request, not a reload

use thiserror::Error;
use tokio::task::JoinHandle;

use crate::config::SignalConfig;
use crate::lifecycle::stop::StopCondition;
use crate::observability::metrics;

#[derive(Debug, Error)]
pub enum SignalError {
    #[error("failed to register {signal} handler: {source}")]
    Register {
        signal: &'static str,
        source: std::io::Error,
    },
}

/// Scoped registration of termination-signal listeners.
///
/// Listeners stop receiving as soon as the guard is dropped, so repeated
/// runs in one process do not accumulate handlers.
///
/// Tokio's process-level handler stays installed after the drop. A signal
/// delivered once the guard is gone is swallowed instead of running its
/// default action, so a host that must still exit on SIGINT or SIGTERM
/// after the run has to listen for them itself.
pub struct SignalGuard {
    listeners: Vec<JoinHandle<()>>,
}

impl SignalGuard {
    /// Register listeners for every signal enabled in `config`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn install(config: &SignalConfig, stop: StopCondition) -> Result<Self, SignalError> {
        let listeners = platform::spawn_listeners(config, stop)?;
        tracing::debug!(count = listeners.len(), "Signal listeners registered");
        Ok(Self { listeners })
    }

    /// Number of active signal listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl Drop for SignalGuard {
    fn drop(&mut self) {
        for listener in &self.listeners {
            listener.abort();
        }
        tracing::debug!("Signal listeners deregistered");
    }
}

fn observe(stop: &StopCondition, signal: &'static str) {
    if stop.set() {
        metrics::record_shutdown_signal();
        tracing::debug!(signal, "Termination signal received");
    } else {
        tracing::debug!(signal, "Termination already requested, ignoring signal");
    }
}

#[cfg(unix)]
mod platform {
    use super::{observe, SignalError};
    use crate::config::SignalConfig;
    use crate::lifecycle::stop::StopCondition;
    use tokio::signal::unix::{signal, SignalKind};
    use tokio::task::JoinHandle;

    pub(super) fn spawn_listeners(
        config: &SignalConfig,
        stop: StopCondition,
    ) -> Result<Vec<JoinHandle<()>>, SignalError> {
        let wanted = [
            (config.interrupt, SignalKind::interrupt(), "SIGINT"),
            (config.terminate, SignalKind::terminate(), "SIGTERM"),
            (config.hangup, SignalKind::hangup(), "SIGHUP"),
        ];

        // Register everything before spawning so a failure leaves nothing behind.
        let mut streams = Vec::new();
        for (enabled, kind, name) in wanted {
            if enabled {
                let stream = signal(kind).map_err(|source| SignalError::Register {
                    signal: name,
                    source,
                })?;
                streams.push((name, stream));
            }
        }

        let listeners = streams
            .into_iter()
            .map(|(name, mut stream)| {
                let stop = stop.clone();
                tokio::spawn(async move {
                    while stream.recv().await.is_some() {
                        observe(&stop, name);
                    }
                })
            })
            .collect();

        Ok(listeners)
    }
}

#[cfg(not(unix))]
mod platform {
    use super::{observe, SignalError};
    use crate::config::SignalConfig;
    use crate::lifecycle::stop::StopCondition;
    use tokio::task::JoinHandle;

    pub(super) fn spawn_listeners(
        config: &SignalConfig,
        stop: StopCondition,
    ) -> Result<Vec<JoinHandle<()>>, SignalError> {
        if !(config.interrupt || config.terminate) {
            return Ok(Vec::new());
        }

        let listener = tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                observe(&stop, "Ctrl+C");
            }
        });
        Ok(vec![listener])
    }
}
