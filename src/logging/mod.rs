//! Logging and observability
//!
//! Structured logging built on `tracing`:
//! - Console output with configurable log levels
//! - Optional JSON file logging with rotation
//! - Macros that keep batch log lines uniform
//!
//! # Example
//!
//! ```no_run
//! use assetlift::logging::init_logging;
//! use assetlift::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(unit = "Crate", "Uploading");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of one export unit
///
/// # Example
///
/// ```no_run
/// use assetlift::log_unit_start;
///
/// log_unit_start!("Crate", 1, 3);
/// ```
#[macro_export]
macro_rules! log_unit_start {
    ($unit:expr, $index:expr, $total:expr) => {
        tracing::info!(
            unit = %$unit,
            index = $index,
            total = $total,
            "Processing unit"
        );
    };
}

/// Log a unit that was recorded as failed
///
/// # Example
///
/// ```no_run
/// use assetlift::log_unit_failure;
/// use assetlift::domain::LiftError;
///
/// let error = LiftError::Network("timed out".to_string());
/// log_unit_failure!("Crate", &error);
/// ```
#[macro_export]
macro_rules! log_unit_failure {
    ($unit:expr, $error:expr) => {
        tracing::warn!(
            unit = %$unit,
            kind = ?$error.kind(),
            transient = $error.is_transient(),
            error = %$error,
            "Unit failed"
        );
    };
}

/// Log the end of a batch
///
/// # Example
///
/// ```no_run
/// use assetlift::log_batch_complete;
/// use std::time::Duration;
///
/// log_batch_complete!("run-1", 4, 1, 80.0, Duration::from_secs(3));
/// ```
#[macro_export]
macro_rules! log_batch_complete {
    ($run_id:expr, $succeeded:expr, $failed:expr, $success_rate:expr, $duration:expr) => {
        tracing::info!(
            run_id = %$run_id,
            succeeded = $succeeded,
            failed = $failed,
            success_rate = format!("{:.2}%", $success_rate),
            duration_ms = $duration.as_millis() as u64,
            "Batch completed"
        );
    };
}
