//! Graceful main-task runner.
//!
//! Runs a single long-lived main task, races it against termination signals,
//! cancels it cleanly and reports its outcome exactly once.

pub mod config;
pub mod lifecycle;
pub mod observability;

pub use config::MainConfig;
pub use lifecycle::{
    setup_main, CoordinatorError, Hooks, MainTask, RunOutcome, ShutdownCoordinator,
    StopCondition, TaskFailure, TaskResult,
};
