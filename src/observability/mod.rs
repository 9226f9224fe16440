//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! lifecycle hooks / coordinator produce:
//!     → logging.rs (structured log events, shutdown filter)
//!     → metrics.rs (run outcome counters, duration histogram)
//! ```
//!
//! # Design Decisions
//! - Structured logging via tracing, JSON available for machine parsing
//! - Metrics are cheap facade calls

pub mod logging;
pub mod metrics;

pub use logging::{init_logging, LogHandle, LoggingError, ShutdownFilter};
