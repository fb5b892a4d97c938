//! Exporter: runs the host encoder against a scoped temporary artifact
//!
//! The encoder writes to a path inside a private temporary directory. The
//! directory is removed when [`Exporter::export`] returns, whatever the outcome,
//! so only the bytes ever leave this module.

use super::settings::{EncoderParams, ExportSettings};
use crate::domain::{LiftError, Result, SceneObject};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

/// Host-provided geometry encoder
///
/// Implementations read the given objects and write the interchange file to the
/// `filepath` entry of `params`. Objects arrive as shared references; applying
/// modifiers must happen on evaluated copies inside the host.
pub trait Encoder: Send + Sync {
    /// Encodes `objects` to the file named by `params["filepath"]`
    ///
    /// # Errors
    ///
    /// Returns a human-readable detail on failure; the exporter wraps it in
    /// [`LiftError::Encode`].
    fn encode(
        &self,
        objects: &[&SceneObject],
        params: &EncoderParams,
    ) -> std::result::Result<(), String>;
}

/// Turns one unit's objects into interchange-format bytes
#[derive(Clone)]
pub struct Exporter {
    encoder: Arc<dyn Encoder>,
    scratch_root: Option<PathBuf>,
}

impl std::fmt::Debug for Exporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Exporter")
            .field("scratch_root", &self.scratch_root)
            .finish_non_exhaustive()
    }
}

impl Exporter {
    pub fn new(encoder: Arc<dyn Encoder>) -> Self {
        Self {
            encoder,
            scratch_root: None,
        }
    }

    /// Creates temporary directories under `root` instead of the system temp dir
    pub fn with_scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scratch_root = Some(root.into());
        self
    }

    /// Exports `members` and returns the encoded bytes
    ///
    /// # Errors
    ///
    /// - [`LiftError::EmptySelection`] when `members` is empty
    /// - [`LiftError::Encode`] when the encoder fails or produces no output
    /// - [`LiftError::Io`] when the temporary directory cannot be created or read
    pub fn export(
        &self,
        unit_name: &str,
        members: &[&SceneObject],
        settings: &ExportSettings,
    ) -> Result<Vec<u8>> {
        if members.is_empty() {
            return Err(LiftError::EmptySelection);
        }

        let mut builder = tempfile::Builder::new();
        builder.prefix("assetlift-");
        let scratch = match self.scratch_root {
            Some(ref root) => builder.tempdir_in(root)?,
            None => builder.tempdir()?,
        };

        let output = scratch.path().join(format!(
            "{}.{}",
            file_stem(unit_name),
            settings.format.extension()
        ));
        let params = settings.to_encoder_params(&output);

        tracing::debug!(
            unit = %unit_name,
            objects = members.len(),
            output = %output.display(),
            "Invoking encoder"
        );

        self.encoder
            .encode(members, &params)
            .map_err(LiftError::encode)?;

        let bytes = match fs::read(&output) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(LiftError::encode(format!(
                    "encoder reported success but wrote no file for '{unit_name}'"
                )))
            }
            Err(e) => return Err(e.into()),
        };

        if bytes.is_empty() {
            return Err(LiftError::encode(format!(
                "encoder produced an empty file for '{unit_name}'"
            )));
        }

        if let Err(e) = scratch.close() {
            tracing::warn!(unit = %unit_name, error = %e, "Failed to remove export scratch directory");
        }

        tracing::debug!(unit = %unit_name, bytes = bytes.len(), "Export finished");
        Ok(bytes)
    }
}

/// Reduces a unit name to something safe to use as a file name
fn file_stem(unit_name: &str) -> String {
    let stem: String = unit_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() {
        "unit".to_string()
    } else {
        stem
    }
}
