//! Validation report and platform limits

use crate::config::LimitsConfig;
use crate::domain::{LiftError, Result};
use serde::{Deserialize, Serialize};

const MIB: u64 = 1024 * 1024;

/// Platform constraints a unit is checked against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationLimits {
    pub max_file_size_bytes: u64,
    pub max_triangle_count: u64,
    pub max_texture_dimension: u32,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self::from_config(&LimitsConfig::default())
    }
}

impl ValidationLimits {
    /// Converts the `[limits]` section, whose size is expressed in MiB
    pub fn from_config(config: &LimitsConfig) -> Self {
        Self {
            max_file_size_bytes: config.max_file_size_mb.saturating_mul(MIB),
            max_triangle_count: config.max_triangle_count,
            max_texture_dimension: config.max_texture_dimension,
        }
    }

    /// Post-export check of the real artifact size; equality is allowed
    pub fn check_actual_size(&self, len: usize) -> Result<()> {
        let len = len as u64;
        if len > self.max_file_size_bytes {
            return Err(LiftError::ValidationBlocking(vec![format!(
                "Exported file is {} ({len} bytes), above the {} limit",
                format_size(len),
                format_size(self.max_file_size_bytes)
            )]));
        }
        Ok(())
    }
}

/// Outcome of pre-flight validation for one unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub warnings: Vec<String>,
    pub blocking_errors: Vec<String>,
    pub estimated_triangle_count: u64,
    pub estimated_file_size_bytes: u64,
}

impl ValidationReport {
    pub(crate) fn new(estimated_triangle_count: u64, estimated_file_size_bytes: u64) -> Self {
        Self {
            is_valid: true,
            warnings: Vec::new(),
            blocking_errors: Vec::new(),
            estimated_triangle_count,
            estimated_file_size_bytes,
        }
    }

    pub(crate) fn warn(&mut self, message: String) {
        self.warnings.push(message);
    }

    pub(crate) fn block(&mut self, message: String) {
        self.is_valid = false;
        self.blocking_errors.push(message);
    }

    /// Turns blocking errors into [`LiftError::ValidationBlocking`]
    pub fn into_result(self) -> Result<Self> {
        if self.is_valid {
            Ok(self)
        } else {
            Err(LiftError::ValidationBlocking(self.blocking_errors))
        }
    }
}

/// Human-readable size in MiB with two decimals
pub fn format_size(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / MIB as f64)
}
