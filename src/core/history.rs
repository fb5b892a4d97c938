//! Session-scoped upload history
//!
//! [`UploadHistory`] is owned by the caller for one editing session and passed
//! into each batch run. Items are appended and never changed afterwards; only
//! [`UploadHistory::clear`] removes them.

use crate::adapters::UploadResult;
use crate::domain::{LiftError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Terminal status of a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Success,
    Failed,
}

/// One recorded unit outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub unit_name: String,
    /// Content hash or opaque backend id
    pub reference_id: Option<String>,
    /// Download URL for URL-based backends
    pub location_url: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub status: UploadStatus,
    pub error_message: Option<String>,
}

impl HistoryItem {
    pub fn success(unit_name: impl Into<String>, result: &UploadResult) -> Self {
        Self {
            unit_name: unit_name.into(),
            reference_id: Some(result.reference_id.clone()),
            location_url: result.location_url.clone(),
            timestamp: Utc::now(),
            status: UploadStatus::Success,
            error_message: None,
        }
    }

    pub fn failure(unit_name: impl Into<String>, error: &LiftError) -> Self {
        Self {
            unit_name: unit_name.into(),
            reference_id: None,
            location_url: None,
            timestamp: Utc::now(),
            status: UploadStatus::Failed,
            error_message: Some(error.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == UploadStatus::Success
    }

    /// The value a user pastes downstream: the URL when there is one, else the id
    pub fn copy_value(&self) -> Option<&str> {
        self.location_url
            .as_deref()
            .or(self.reference_id.as_deref())
    }
}

/// Upload history for one session
#[derive(Debug, Default)]
pub struct UploadHistory {
    items: Vec<HistoryItem>,
    log_path: Option<PathBuf>,
}

impl UploadHistory {
    /// In-memory history
    pub fn new() -> Self {
        Self::default()
    }

    /// History that also appends each item as a JSON line to `path`
    pub fn with_log(path: impl Into<PathBuf>) -> Self {
        Self {
            items: Vec::new(),
            log_path: Some(path.into()),
        }
    }

    /// Appends an item
    ///
    /// The item is kept in memory even when writing the log fails; the error
    /// is returned so the caller can surface it.
    pub fn record(&mut self, item: HistoryItem) -> Result<()> {
        let logged = match self.log_path {
            Some(ref path) => append_line(path, &item),
            None => Ok(()),
        };
        self.items.push(item);
        logged
    }

    /// All items, oldest first
    pub fn items(&self) -> &[HistoryItem] {
        &self.items
    }

    /// Most recent successful item
    pub fn last_success(&self) -> Option<&HistoryItem> {
        self.items.iter().rev().find(|i| i.is_success())
    }

    /// Up to `n` items, most recent first
    pub fn recent(&self, n: usize) -> Vec<&HistoryItem> {
        self.items.iter().rev().take(n).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Session reset. The on-disk log is left untouched.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Reads a JSON-lines history log back
    ///
    /// # Errors
    ///
    /// Returns [`LiftError::Io`] if the file cannot be read and
    /// [`LiftError::Serialization`] for a malformed line.
    pub fn load_log(path: impl AsRef<Path>) -> Result<Vec<HistoryItem>> {
        let contents = fs::read_to_string(path.as_ref())?;
        contents
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(n, line)| {
                serde_json::from_str(line).map_err(|e| {
                    LiftError::Serialization(format!("history log line {}: {e}", n + 1))
                })
            })
            .collect()
    }
}

fn append_line(path: &Path, item: &HistoryItem) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut line = serde_json::to_string(item)?;
    line.push('\n');
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(line.as_bytes())?;
    Ok(())
}
