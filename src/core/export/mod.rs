//! Export settings and the encoder boundary
//!
//! - [`settings`] - presets and translation to encoder parameters
//! - [`exporter`] - runs an [`Encoder`] into a scoped temporary file

pub mod exporter;
pub mod settings;

pub use exporter::{Encoder, Exporter};
pub use settings::{EncoderParams, ExportFormat, ExportPreset, ExportSettings, MAX_COMPRESSION_LEVEL};
