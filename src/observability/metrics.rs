//! Run metrics.
//!
//! # Metrics
//! - `main_runs_total` (counter): completed runs by outcome
//! - `main_run_duration_seconds` (histogram): wall time of the main task
//! - `main_shutdown_signals_total` (counter): termination requests observed
//!
//! # Design Decisions
//! - Only the `metrics` facade is used; installing a recorder/exporter is up
//!   to the host process, without one every call is a no-op

use crate::lifecycle::RunOutcome;

/// Count a finished run under its outcome label.
pub fn record_outcome(outcome: &RunOutcome) {
    metrics::counter!("main_runs_total", "outcome" => outcome.label()).increment(1);
}

/// Record the elapsed wall time of the main task.
pub fn record_duration(secs: f64) {
    metrics::histogram!("main_run_duration_seconds").record(secs);
}

/// Count an observed termination request.
pub fn record_shutdown_signal() {
    metrics::counter!("main_shutdown_signals_total").increment(1);
}
