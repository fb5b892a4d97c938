//! Batch results and reporting

use super::partition::PartitionMode;
use crate::core::history::HistoryItem;
use crate::domain::{ErrorKind, LiftError};
use chrono::{DateTime, Utc};
use std::time::Duration;
use uuid::Uuid;

/// A unit that did not produce an upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitFailure {
    pub unit_name: String,
    /// Human-readable reason, the error's display text
    pub error_message: String,
    pub kind: ErrorKind,
}

impl UnitFailure {
    pub fn new(unit_name: impl Into<String>, error: &LiftError) -> Self {
        Self {
            unit_name: unit_name.into(),
            error_message: error.to_string(),
            kind: error.kind(),
        }
    }
}

/// Non-blocking validation findings for one unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitWarnings {
    pub unit_name: String,
    pub warnings: Vec<String>,
}

/// Outcome of one `run_batch` call
///
/// Every partitioned unit lands in exactly one of `succeeded` or `failed`, in
/// partition order.
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// Correlates log lines of one run
    pub run_id: Uuid,
    pub mode: PartitionMode,
    pub succeeded: Vec<HistoryItem>,
    pub failed: Vec<UnitFailure>,
    pub warnings: Vec<UnitWarnings>,
    /// The batch stopped early; remaining units are in `failed` as cancelled
    pub cancelled: bool,
    /// Text offered for clipboard copy, when auto-copy is enabled
    pub clipboard: Option<String>,
    /// First failure to append to the history log; items stay in memory
    pub history_log_error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub duration: Duration,
}

impl BatchReport {
    pub fn new(mode: PartitionMode) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            mode,
            succeeded: Vec::new(),
            failed: Vec::new(),
            warnings: Vec::new(),
            cancelled: false,
            clipboard: None,
            history_log_error: None,
            started_at: Utc::now(),
            duration: Duration::ZERO,
        }
    }

    pub fn total_units(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// No unit failed
    pub fn is_successful(&self) -> bool {
        self.failed.is_empty()
    }

    /// Success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        let total = self.total_units();
        if total == 0 {
            return 100.0;
        }
        (self.succeeded.len() as f64 / total as f64) * 100.0
    }

    pub fn failed_unit_names(&self) -> Vec<&str> {
        self.failed.iter().map(|f| f.unit_name.as_str()).collect()
    }

    /// Clipboard text for the successful units
    ///
    /// A single success yields its bare reference; several yield one
    /// `name: reference` line each.
    pub fn clipboard_text(&self) -> Option<String> {
        match self.succeeded.as_slice() {
            [] => None,
            [only] => only.copy_value().map(str::to_string),
            many => {
                let lines: Vec<String> = many
                    .iter()
                    .filter_map(|item| {
                        item.copy_value()
                            .map(|value| format!("{}: {value}", item.unit_name))
                    })
                    .collect();
                Some(lines.join("\n"))
            }
        }
    }
}
