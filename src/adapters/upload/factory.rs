//! Uploader factory
//!
//! Picks the concrete backend from configuration once, at startup.

use super::traits::Uploader;
use crate::adapters::cloud::CloudUploader;
use crate::adapters::direct::DirectStoreUploader;
use crate::config::{BackendTarget, LiftConfig};
use crate::domain::{LiftError, Result};
use std::sync::Arc;

/// Create the uploader selected by `config.backend`
///
/// # Errors
///
/// Returns [`LiftError::Configuration`] when the selected backend's section is
/// missing or unusable. Nothing is sent over the network here.
pub fn create_uploader(config: &LiftConfig) -> Result<Arc<dyn Uploader>> {
    match config.backend {
        BackendTarget::Direct => {
            let direct = config.direct.as_ref().ok_or_else(|| {
                LiftError::Configuration(
                    "direct configuration is required when backend = 'direct'".to_string(),
                )
            })?;

            tracing::info!(base_url = %direct.base_url, "Creating direct-store uploader");
            Ok(Arc::new(DirectStoreUploader::new(direct)?))
        }
        BackendTarget::Cloud => {
            let cloud = config.cloud.as_ref().ok_or_else(|| {
                LiftError::Configuration(
                    "cloud configuration is required when backend = 'cloud'".to_string(),
                )
            })?;

            tracing::info!(
                bucket = %cloud.storage_bucket,
                space_id = %cloud.space_id,
                "Creating cloud uploader"
            );
            Ok(Arc::new(CloudUploader::new(cloud)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;

    #[test]
    fn test_creates_direct_uploader() {
        let config = parse_config(
            r#"
backend = "direct"

[direct]
base_url = "http://localhost:3000"
"#,
        )
        .unwrap();
        let uploader = create_uploader(&config).unwrap();
        assert_eq!(uploader.backend(), BackendTarget::Direct);
    }

    #[test]
    fn test_creates_cloud_uploader() {
        let config = parse_config(
            r#"
backend = "cloud"

[cloud]
api_key = "key"
storage_bucket = "demo.appspot.com"
database_url = "https://demo-default-rtdb.firebaseio.com"
space_id = "lobby"
"#,
        )
        .unwrap();
        let uploader = create_uploader(&config).unwrap();
        assert_eq!(uploader.backend(), BackendTarget::Cloud);
    }

    #[test]
    fn test_missing_section_is_configuration_error() {
        let mut config = parse_config(
            r#"
backend = "direct"

[direct]
base_url = "http://localhost:3000"
"#,
        )
        .unwrap();
        config.backend = BackendTarget::Cloud;
        assert!(matches!(
            create_uploader(&config),
            Err(LiftError::Configuration(_))
        ));
    }
}
