//! Shutdown coordination for the main task.
//!
//! # Responsibilities
//! - Set up logging and signal listeners once per run
//! - Race an async main task against the stop condition
//! - Cancel the task on the first termination request and wait for it
//! - Fire exactly one terminal callback per run
//!
//! # Design Decisions
//! - Completion wins when it is ready at the same time as the stop condition
//! - Once cancellation has been requested the run is reported as a shutdown,
//!   even if the body manages to finish first (`SignalledShutdown`)
//! - Blocking tasks are never interrupted; a signal is only recorded
//! - The run scope stays in the coordinator's frame: the terminal callback
//!   fires before the duration report and trailer
//! - No cancellation timeout: a requested cancellation is awaited indefinitely

use std::sync::Arc;

use futures_util::future::BoxFuture;
use thiserror::Error;
use tokio::task::JoinError;

use crate::config::MainConfig;
use crate::lifecycle::hooks::Hooks;
use crate::lifecycle::outcome::{RunOutcome, TaskFailure, TaskResult};
use crate::lifecycle::signals::{SignalError, SignalGuard};
use crate::lifecycle::stop::StopCondition;
use crate::lifecycle::task::MainTask;
use crate::lifecycle::wrapper::{contain, contain_blocking, Lifecycle, RunScope};
use crate::observability::{metrics, LoggingError};

/// Startup failures. Task failures are outcomes, never errors.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("logging setup failed: {0}")]
    Logging(#[from] LoggingError),

    #[error(transparent)]
    Signals(#[from] SignalError),

    #[error("failed to build runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Runs one main task to a single [`RunOutcome`].
pub struct ShutdownCoordinator {
    config: MainConfig,
    hooks: Arc<Hooks>,
    stop: StopCondition,
}

impl ShutdownCoordinator {
    pub fn new(config: MainConfig, hooks: Hooks) -> Self {
        Self {
            config,
            hooks: Arc::new(hooks),
            stop: StopCondition::new(),
        }
    }

    /// The stop condition signals are written to.
    ///
    /// Setting it has the same effect as a termination signal.
    pub fn stop_condition(&self) -> StopCondition {
        self.stop.clone()
    }

    /// Run `task` to completion or cancellation.
    ///
    /// Must be called from within a Tokio runtime.
    pub async fn run(self, task: MainTask) -> Result<RunOutcome, CoordinatorError> {
        (self.hooks.setup_logging)()?;
        let _signals = SignalGuard::install(&self.config.signals, self.stop.clone())?;

        let lifecycle = Lifecycle::new(Arc::clone(&self.hooks), self.config.log_time);
        let scope = lifecycle.enter();
        let outcome = match task {
            MainTask::Async(body) => {
                let body = body(self.stop.clone());
                self.race(body).await
            }
            MainTask::Blocking(body) => {
                let stop = self.stop.clone();
                self.run_blocking(move || body(stop)).await
            }
        };

        self.report(&scope, &outcome);
        drop(scope);

        metrics::record_outcome(&outcome);
        tracing::debug!(outcome = outcome.label(), "Main task run complete");
        Ok(outcome)
    }

    async fn race(&self, body: BoxFuture<'static, TaskResult>) -> RunOutcome {
        let mut handle = tokio::spawn(contain(body));

        tokio::select! {
            biased;
            joined = &mut handle => return settle(joined, false),
            _ = self.stop.wait() => {}
        }

        (self.hooks.on_shutdown_observed)();
        handle.abort();
        tracing::debug!("Cancellation requested, waiting for main task");

        settle(handle.await, true)
    }

    async fn run_blocking<F>(&self, body: F) -> RunOutcome
    where
        F: FnOnce() -> TaskResult + Send + 'static,
    {
        let mut handle = tokio::task::spawn_blocking(move || contain_blocking(body));

        let joined = tokio::select! {
            biased;
            joined = &mut handle => joined,
            _ = self.stop.wait() => {
                (self.hooks.on_shutdown_observed)();
                tracing::debug!("Main task is blocking, waiting for it to finish");
                handle.await
            }
        };

        settle(joined, false)
    }

    /// Fire the single terminal callback for `outcome`.
    fn report(&self, scope: &RunScope, outcome: &RunOutcome) {
        match outcome {
            RunOutcome::Finished => (self.hooks.on_finish)(),
            RunOutcome::Cancelled | RunOutcome::SignalledShutdown => (self.hooks.on_cancel)(),
            RunOutcome::Failed(_) => scope.report_failure(outcome),
        }
    }
}

fn settle(joined: Result<RunOutcome, JoinError>, cancel_requested: bool) -> RunOutcome {
    match joined {
        Ok(RunOutcome::Finished) if cancel_requested => RunOutcome::SignalledShutdown,
        Ok(outcome) => outcome,
        Err(e) if e.is_cancelled() => RunOutcome::Cancelled,
        Err(e) => {
            tracing::error!(error = %e, "Main task panicked outside containment");
            RunOutcome::Failed(TaskFailure::from_panic(e.into_panic()))
        }
    }
}

/// Build a current-thread runtime and run `task` on it.
pub fn setup_main(
    config: MainConfig,
    hooks: Hooks,
    task: MainTask,
) -> Result<RunOutcome, CoordinatorError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CoordinatorError::Runtime)?;

    runtime.block_on(ShutdownCoordinator::new(config, hooks).run(task))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    struct Counters {
        observed: AtomicUsize,
        cancel: AtomicUsize,
        finish: AtomicUsize,
        exception: AtomicUsize,
    }

    fn counting_hooks() -> (Hooks, Arc<Counters>) {
        let counters = Arc::new(Counters::default());
        let (c1, c2, c3, c4) = (
            counters.clone(),
            counters.clone(),
            counters.clone(),
            counters.clone(),
        );

        let hooks = Hooks::silent()
            .with_on_shutdown_observed(move || {
                c1.observed.fetch_add(1, Ordering::SeqCst);
            })
            .with_on_cancel(move || {
                c2.cancel.fetch_add(1, Ordering::SeqCst);
            })
            .with_on_finish(move || {
                c3.finish.fetch_add(1, Ordering::SeqCst);
            })
            .with_on_main_exception(move |_| {
                c4.exception.fetch_add(1, Ordering::SeqCst);
            });

        (hooks, counters)
    }

    #[test]
    fn test_settle_favors_shutdown_after_cancel_request() {
        assert!(matches!(
            settle(Ok(RunOutcome::Finished), true),
            RunOutcome::SignalledShutdown
        ));
        assert!(matches!(
            settle(Ok(RunOutcome::Finished), false),
            RunOutcome::Finished
        ));
        assert!(matches!(
            settle(Ok(RunOutcome::Failed(TaskFailure::Panic("x".into()))), true),
            RunOutcome::Failed(_)
        ));
    }

    #[tokio::test]
    async fn test_uncontained_panic_is_reported_as_failure() {
        let (hooks, counters) = counting_hooks();
        let coordinator = ShutdownCoordinator::new(MainConfig::default(), hooks);

        async fn explode() -> RunOutcome {
            panic!("hook exploded")
        }

        let joined = tokio::spawn(explode()).await;
        let outcome = settle(joined, false);
        assert!(matches!(outcome, RunOutcome::Failed(TaskFailure::Panic(ref m)) if m == "hook exploded"));

        let scope = Lifecycle::new(Arc::clone(&coordinator.hooks), false).enter();
        coordinator.report(&scope, &outcome);

        assert_eq!(counters.exception.load(Ordering::SeqCst), 1);
        assert_eq!(counters.finish.load(Ordering::SeqCst), 0);
        assert_eq!(counters.cancel.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_finished_fires_on_finish_only() {
        let (hooks, counters) = counting_hooks();
        let coordinator = ShutdownCoordinator::new(MainConfig::default(), hooks);

        let outcome = coordinator
            .run(MainTask::future(async {
                tokio::time::sleep(Duration::from_millis(10)).await;
                Ok(())
            }))
            .await
            .unwrap();

        assert!(matches!(outcome, RunOutcome::Finished));
        assert_eq!(counters.finish.load(Ordering::SeqCst), 1);
        assert_eq!(counters.cancel.load(Ordering::SeqCst), 0);
        assert_eq!(counters.observed.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_stop_cancels_async_task() {
        let (hooks, counters) = counting_hooks();
        let coordinator = ShutdownCoordinator::new(MainConfig::default(), hooks);
        let stop = coordinator.stop_condition();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            stop.set();
            stop.set();
        });

        let outcome = coordinator
            .run(MainTask::future(async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(())
            }))
            .await
            .unwrap();

        assert!(matches!(outcome, RunOutcome::Cancelled));
        assert_eq!(counters.observed.load(Ordering::SeqCst), 1);
        assert_eq!(counters.cancel.load(Ordering::SeqCst), 1);
        assert_eq!(counters.finish.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_stop_set_before_run_still_reports_once() {
        let (hooks, counters) = counting_hooks();
        let coordinator = ShutdownCoordinator::new(MainConfig::default(), hooks);
        coordinator.stop_condition().set();

        let outcome = coordinator
            .run(MainTask::future(async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(())
            }))
            .await
            .unwrap();

        assert!(outcome.is_shutdown());
        assert_eq!(counters.observed.load(Ordering::SeqCst), 1);
        assert_eq!(counters.cancel.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failure_fires_exception_only() {
        let (hooks, counters) = counting_hooks();
        let coordinator = ShutdownCoordinator::new(MainConfig::default(), hooks);

        let outcome = coordinator
            .run(MainTask::future(async { Err("bad".into()) }))
            .await
            .unwrap();

        assert!(outcome.is_failed());
        assert_eq!(counters.exception.load(Ordering::SeqCst), 1);
        assert_eq!(counters.finish.load(Ordering::SeqCst), 0);
        assert_eq!(counters.cancel.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_setup_logging_failure_is_error() {
        let hooks = Hooks::silent().with_setup_logging(|| {
            Err(LoggingError::InvalidLogLevel("app=loud".into()))
        });
        let coordinator = ShutdownCoordinator::new(MainConfig::default(), hooks);

        let err = coordinator
            .run(MainTask::future(async { Ok(()) }))
            .await
            .unwrap_err();

        assert!(matches!(err, CoordinatorError::Logging(_)));
    }

    #[test]
    fn test_setup_main_runs_blocking_task() {
        let (hooks, counters) = counting_hooks();

        let outcome = setup_main(MainConfig::default(), hooks, MainTask::blocking(|_| Ok(()))).unwrap();

        assert!(matches!(outcome, RunOutcome::Finished));
        assert_eq!(counters.finish.load(Ordering::SeqCst), 1);
    }
}
