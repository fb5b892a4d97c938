// Assetlift - Export-validate-upload pipeline for binary glTF assets
// Copyright (c) 2025 Assetlift Contributors
// Licensed under the MIT License

//! # Assetlift - export, validate and upload 3D assets
//!
//! Assetlift takes a selection of objects from a host 3D editor, splits it into
//! export units, checks each unit against size and triangle limits, encodes it
//! into a single binary glTF blob and pushes it to a remote scene store.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Partitioning** a selection per object, per collection or per hierarchy root
//! - **Validating** units before any encoding work is done
//! - **Exporting** through a host-provided [`core::export::Encoder`]
//! - **Uploading** to a direct-store service or a cloud object store plus document tree
//! - **Recording** every outcome in a session-scoped history
//!
//! ## Architecture
//!
//! - [`core`] - Business logic (batch, export, validation, transform, history)
//! - [`adapters`] - Upload backends behind the [`adapters::Uploader`] trait
//! - [`domain`] - Scene snapshot, identifiers and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
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
//! let orchestrator = BatchOrchestrator::from_config(&config, encoder)?;
//! orchestrator.uploader().probe().await?;
//!
//! let settings = ExportSettings::from_config(&config.export)?;
//! let mut history = UploadHistory::new();
//! let report = orchestrator
//!     .run_batch(
//!         &scene,
//!         &[ObjectId::new("Chair")?],
//!         PartitionMode::TopLevelWithChildren,
//!         &settings,
//!         &mut history,
//!     )
//!     .await?;
//!
//! if let Some(text) = report.clipboard {
//!     println!("{text}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Every fallible operation returns [`domain::Result`]. Within a batch, only
//! configuration, empty-selection and scene-graph errors are returned to the
//! caller; everything else is captured per unit in the
//! [`core::batch::BatchReport`].

pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
