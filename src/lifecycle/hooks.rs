//! Reporting callbacks invoked by the lifecycle wrapper and coordinator.

use std::fmt;
use std::sync::Arc;

use crate::config::LoggingConfig;
use crate::lifecycle::outcome::TaskFailure;
use crate::observability::{init_logging, LoggingError, ShutdownFilter};

pub type Hook = Arc<dyn Fn() + Send + Sync>;
pub type FailureHook = Arc<dyn Fn(&TaskFailure) + Send + Sync>;
pub type DurationHook = Arc<dyn Fn(f64) + Send + Sync>;
pub type SetupHook = Arc<dyn Fn() -> Result<(), LoggingError> + Send + Sync>;

const BANNER_WIDTH: usize = 70;

/// Named callbacks for every lifecycle event.
///
/// Build with [`Hooks::standard`] or [`Hooks::silent`] and replace single
/// callbacks with the `with_*` methods.
#[derive(Clone)]
pub struct Hooks {
    /// Once, before the task is launched.
    pub setup_logging: SetupHook,
    /// Before the task body is invoked.
    pub on_main_start: Hook,
    /// When the task body fails (error or panic).
    pub on_main_exception: FailureHook,
    /// Once, when the first termination request is observed.
    pub on_shutdown_observed: Hook,
    /// When the run ends because of a termination request.
    pub on_cancel: Hook,
    /// When the task completed without a termination request.
    pub on_finish: Hook,
    /// Elapsed seconds, when timing is enabled.
    pub report_duration: DurationHook,
    /// Trailer emitted after the duration report.
    pub on_main_end: Hook,
}

impl Hooks {
    /// Default hooks: tracing subscriber setup, banner, log lines, shutdown
    /// log filter and a blank trailer line.
    pub fn standard(logging: &LoggingConfig) -> Self {
        let filter = ShutdownFilter::new();
        let logging = logging.clone();

        let setup_filter = filter.clone();
        let setup_logging: SetupHook = Arc::new(move || {
            let handle = init_logging(&logging)?;
            setup_filter.install(handle);
            Ok(())
        });

        Self {
            setup_logging,
            on_main_start: Arc::new(|| {
                println!("{}", "=".repeat(BANNER_WIDTH));
                tracing::info!("Script started.");
                println!("{}", "=".repeat(BANNER_WIDTH));
            }),
            on_main_exception: Arc::new(|failure| {
                tracing::error!(error = %failure, "Unhandled exception occurred in main.");
            }),
            on_shutdown_observed: Arc::new(move || {
                tracing::warn!("Shutdown signal received. Shutting down.");
                filter.trigger();
            }),
            on_cancel: Arc::new(|| tracing::info!("Currently running task was cancelled.")),
            on_finish: Arc::new(|| tracing::info!("Current task completed normally.")),
            report_duration: Arc::new(|secs| {
                tracing::info!("Script ended after {:.2} seconds.", secs);
            }),
            on_main_end: Arc::new(|| println!()),
        }
    }

    /// Hooks that do nothing. Useful as a base for custom sets and in tests.
    pub fn silent() -> Self {
        Self {
            setup_logging: Arc::new(|| Ok(())),
            on_main_start: Arc::new(|| {}),
            on_main_exception: Arc::new(|_| {}),
            on_shutdown_observed: Arc::new(|| {}),
            on_cancel: Arc::new(|| {}),
            on_finish: Arc::new(|| {}),
            report_duration: Arc::new(|_| {}),
            on_main_end: Arc::new(|| {}),
        }
    }

    pub fn with_setup_logging<F>(mut self, f: F) -> Self
    where
        F: Fn() -> Result<(), LoggingError> + Send + Sync + 'static,
    {
        self.setup_logging = Arc::new(f);
        self
    }

    pub fn with_on_main_start<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_main_start = Arc::new(f);
        self
    }

    pub fn with_on_main_exception<F>(mut self, f: F) -> Self
    where
        F: Fn(&TaskFailure) + Send + Sync + 'static,
    {
        self.on_main_exception = Arc::new(f);
        self
    }

    pub fn with_on_shutdown_observed<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_shutdown_observed = Arc::new(f);
        self
    }

    pub fn with_on_cancel<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_cancel = Arc::new(f);
        self
    }

    pub fn with_on_finish<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_finish = Arc::new(f);
        self
    }

    pub fn with_report_duration<F>(mut self, f: F) -> Self
    where
        F: Fn(f64) + Send + Sync + 'static,
    {
        self.report_duration = Arc::new(f);
        self
    }

    pub fn with_on_main_end<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_main_end = Arc::new(f);
        self
    }
}

impl Default for Hooks {
    fn default() -> Self {
        Self::standard(&LoggingConfig::default())
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_builder_replaces_single_hook() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let hooks = Hooks::silent().with_on_cancel(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        (hooks.on_finish)();
        (hooks.on_cancel)();
        (hooks.on_cancel)();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_silent_setup_succeeds() {
        let hooks = Hooks::silent();
        assert!((hooks.setup_logging)().is_ok());
        (hooks.report_duration)(1.5);
        (hooks.on_main_exception)(&TaskFailure::Panic("x".into()));
    }
}
