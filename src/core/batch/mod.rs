//! Batch processing of a selection
//!
//! - [`partition`] - splitting a selection into export units
//! - [`orchestrator`] - sequential per-unit pipeline with failure isolation
//! - [`report`] - the per-run [`BatchReport`]

pub mod orchestrator;
pub mod partition;
pub mod report;

pub use orchestrator::BatchOrchestrator;
pub use partition::{partition, ExportUnit, PartitionMode, DEFAULT_GROUP};
pub use report::{BatchReport, UnitFailure, UnitWarnings};
