//! Lifecycle wrapper around the main task body.
//!
//! # Responsibilities
//! - Announce the start of the main task
//! - Contain task failures (errors and panics) and report them once
//! - Report elapsed time and the trailer on every exit path
//!
//! # Design Decisions
//! - The scope lives in the caller's frame and spans the whole run, so the
//!   terminal callbacks fire before the duration report and trailer
//! - Timing and trailer live in a drop guard, so they also run when the
//!   caller's future is dropped
//! - Containment is a separate step that can run on another task; it
//!   classifies failures and never re-raises them

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures_util::FutureExt;

use crate::lifecycle::hooks::Hooks;
use crate::lifecycle::outcome::{RunOutcome, TaskFailure, TaskResult};
use crate::observability::metrics;

/// Runs one task body under start/exception/duration reporting.
#[derive(Clone)]
pub struct Lifecycle {
    hooks: Arc<Hooks>,
    log_time: bool,
}

impl Lifecycle {
    pub fn new(hooks: Arc<Hooks>, log_time: bool) -> Self {
        Self { hooks, log_time }
    }

    /// Announce the start and begin timing.
    ///
    /// The returned scope reports duration and trailer when dropped, even if
    /// no body ever ran under it.
    pub fn enter(&self) -> RunScope {
        (self.hooks.on_main_start)();
        RunScope {
            timing: TimingGuard::start(&self.hooks, self.log_time),
        }
    }

    /// Drive an asynchronous body to completion. Returns `Finished` or `Failed`.
    pub async fn run<Fut>(&self, body: Fut) -> RunOutcome
    where
        Fut: Future<Output = TaskResult>,
    {
        let scope = self.enter();
        let outcome = contain(body).await;
        scope.report_failure(&outcome);
        outcome
    }

    /// Run a synchronous body on the current thread.
    pub fn run_blocking<F>(&self, body: F) -> RunOutcome
    where
        F: FnOnce() -> TaskResult,
    {
        let scope = self.enter();
        let outcome = contain_blocking(body);
        scope.report_failure(&outcome);
        outcome
    }
}

/// A started run. Dropping it ends the run.
pub struct RunScope {
    timing: TimingGuard,
}

impl RunScope {
    /// Fire `on_main_exception` if `outcome` is a failure.
    pub fn report_failure(&self, outcome: &RunOutcome) {
        if let RunOutcome::Failed(failure) = outcome {
            (self.timing.hooks.on_main_exception)(failure);
        }
    }
}

/// Await `body`, catching panics. Returns `Finished` or `Failed`.
pub async fn contain<Fut>(body: Fut) -> RunOutcome
where
    Fut: Future<Output = TaskResult>,
{
    classify(AssertUnwindSafe(body).catch_unwind().await)
}

/// Run `body`, catching panics. Returns `Finished` or `Failed`.
pub fn contain_blocking<F>(body: F) -> RunOutcome
where
    F: FnOnce() -> TaskResult,
{
    classify(std::panic::catch_unwind(AssertUnwindSafe(body)))
}

fn classify(result: Result<TaskResult, Box<dyn Any + Send>>) -> RunOutcome {
    match result {
        Ok(Ok(())) => RunOutcome::Finished,
        Ok(Err(e)) => RunOutcome::Failed(TaskFailure::Error(e)),
        Err(payload) => RunOutcome::Failed(TaskFailure::from_panic(payload)),
    }
}

/// Emits the duration report and trailer exactly once, on drop.
struct TimingGuard {
    hooks: Arc<Hooks>,
    started: Option<Instant>,
}

impl TimingGuard {
    fn start(hooks: &Arc<Hooks>, log_time: bool) -> Self {
        Self {
            hooks: Arc::clone(hooks),
            started: log_time.then(Instant::now),
        }
    }
}

impl Drop for TimingGuard {
    fn drop(&mut self) {
        if let Some(started) = self.started {
            let secs = started.elapsed().as_secs_f64();
            metrics::record_duration(secs);
            (self.hooks.report_duration)(secs);
        }
        (self.hooks.on_main_end)();
    }
}
