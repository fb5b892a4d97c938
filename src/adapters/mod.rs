//! External system integrations for assetlift.
//!
//! - [`upload`] - the [`Uploader`] trait and backend factory
//! - [`direct`] - direct-store microservice (single POST, server-side hash)
//! - [`cloud`] - object store plus document tree (blob, component, entity)
//!
//! # Design Pattern
//!
//! Backends sit behind one async trait so the batch orchestrator never knows
//! which one it talks to, and tests can substitute their own implementation.
//!
//! ```rust,no_run
//! use assetlift::adapters::create_uploader;
//! use assetlift::config::load_config;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("assetlift.toml")?;
//! let uploader = create_uploader(&config)?;
//! uploader.probe().await?;
//! # Ok(())
//! # }
//! ```

pub mod cloud;
pub mod direct;
pub mod upload;

pub use upload::{create_uploader, UploadRequest, UploadResult, Uploader};
