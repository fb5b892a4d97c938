//! Core business logic for assetlift.
//!
//! # Modules
//!
//! - [`batch`] - partitioning, orchestration and batch reports
//! - [`export`] - export settings and the encoder boundary
//! - [`validation`] - pre-flight limit checks
//! - [`transform`] - world matrix decomposition for placement metadata
//! - [`history`] - session-scoped upload history
//!
//! # Pipeline
//!
//! For each unit of a batch, strictly one after another:
//!
//! 1. **Validate**: estimate triangles and size against the limits
//! 2. **Export**: encode the unit's objects into one binary blob
//! 3. **Check**: compare the real blob size with the limit
//! 4. **Upload**: hand the blob and the representative transform to the backend
//! 5. **Record**: append the outcome to the history and the batch report
//!
//! # Example
//!
//! ```rust,no_run
//! use assetlift::config::load_config;
//! use assetlift::core::batch::{BatchOrchestrator, PartitionMode};
//! use assetlift::core::export::{Encoder, ExportSettings};
//! use assetlift::core::history::UploadHistory;
//! use assetlift::domain::{ObjectId, Scene};
//! use std::sync::Arc;
//!
//! # async fn example(encoder: Arc<dyn Encoder>, scene: Scene) -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("assetlift.toml")?;
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//! let orchestrator = BatchOrchestrator::from_config(&config, encoder)?.with_shutdown(shutdown_rx);
//! let settings = ExportSettings::from_config(&config.export)?;
//! let mut history = UploadHistory::new();
//!
//! let selection = vec![ObjectId::new("Chair")?];
//! let report = orchestrator
//!     .run_batch(&scene, &selection, PartitionMode::Individual, &settings, &mut history)
//!     .await?;
//!
//! println!("Succeeded: {}", report.succeeded.len());
//! println!("Failed: {}", report.failed.len());
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod export;
pub mod history;
pub mod transform;
pub mod validation;
