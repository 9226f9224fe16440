//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! ShutdownCoordinator::run (shutdown.rs):
//!     setup_logging → register signals → enter scope
//!         → race(contained task, stop) → terminal callback → drop scope
//!
//! Lifecycle wrapper (wrapper.rs):
//!     enter: on_main_start, start timing
//!     contain: body → Finished | Failed (may run on another task)
//!     drop: duration → trailer
//!
//! Signals (signals.rs):
//!     SIGINT/SIGTERM/SIGHUP → StopCondition::set (once)
//! ```
//!
//! # Design Decisions
//! - One task per run; the coordinator is consumed by `run`
//! - Cancellation is an outcome variant, never an error
//! - Async tasks are cancelled cooperatively at their next await point;
//!   a body with no await point cannot be cancelled

pub mod hooks;
pub mod outcome;
pub mod shutdown;
pub mod signals;
pub mod stop;
pub mod task;
pub mod wrapper;

pub use hooks::Hooks;
pub use outcome::{RunOutcome, TaskError, TaskFailure, TaskResult};
pub use shutdown::{setup_main, CoordinatorError, ShutdownCoordinator};
pub use signals::{SignalError, SignalGuard};
pub use stop::StopCondition;
pub use task::MainTask;
pub use wrapper::{contain, contain_blocking, Lifecycle, RunScope};
