//! Configuration management for assetlift.
//!
//! This module provides TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! assetlift uses TOML configuration files with support for:
//! - `.env` files and environment variable substitution (`${VAR_NAME}`)
//! - `ASSETLIFT_<SECTION>_<KEY>` overrides
//! - Default values for optional settings
//! - Validation of the active backend section only
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use assetlift::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("assetlift.toml")?;
//!
//! println!("Backend: {:?}", config.backend);
//! if let Some(cloud) = &config.cloud {
//!     println!("Space: {}", cloud.space_id);
//! }
//! println!("Preset: {}", config.export.preset);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level
//! - [`DirectStoreConfig`] - Direct-store endpoint and optional credentials
//! - [`CloudConfig`] - Object store, document tree and space id
//! - [`ExportConfig`] - Preset name, overrides, auto-copy flag
//! - [`LimitsConfig`] - File size, triangle and texture limits
//! - [`HistoryConfig`] - Optional history log
//! - [`LoggingConfig`] - Logging configuration
//!
//! # Example Configuration
//!
//! ```toml
//! backend = "cloud"
//!
//! [cloud]
//! api_key = "${ASSETLIFT_CLOUD_KEY}"
//! storage_bucket = "my-project.appspot.com"
//! database_url = "https://my-project-default-rtdb.firebaseio.com"
//! space_id = "lobby"
//!
//! [export]
//! preset = "mobile_vr"
//! auto_copy_result = true
//!
//! [limits]
//! max_file_size_mb = 40
//! max_triangle_count = 100000
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, parse_config};
pub use schema::{
    ApplicationConfig, BackendTarget, CloudConfig, DirectStoreConfig, ExportConfig,
    HistoryConfig, LiftConfig, LimitsConfig, LoggingConfig, FORBIDDEN_KEY_CHARS,
};
pub use secret::{secret_string, SecretString, SecretValue};
