//! Configuration schema types
//!
//! This module defines the configuration structure the host UI exposes: backend
//! endpoint or credential bundle, space identifier, export preset, size and
//! triangle limits, and the auto-copy flag.

use crate::config::SecretString;
use serde::{Deserialize, Serialize};

/// Characters the cloud document tree does not allow in a key
pub const FORBIDDEN_KEY_CHARS: [char; 6] = ['.', '$', '#', '[', ']', '/'];

/// Upload backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendTarget {
    /// HTTP microservice that stores the blob and returns a content hash
    Direct,
    /// Object store plus structured document tree
    Cloud,
}

/// Main assetlift configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Deserialize)]
pub struct LiftConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Which backend uploads go to
    pub backend: BackendTarget,

    /// Direct-store settings (required if backend = direct)
    #[serde(default)]
    pub direct: Option<DirectStoreConfig>,

    /// Cloud settings (required if backend = cloud)
    #[serde(default)]
    pub cloud: Option<CloudConfig>,

    /// Export preset and overrides
    #[serde(default)]
    pub export: ExportConfig,

    /// Platform limits checked before export
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Session history settings
    #[serde(default)]
    pub history: HistoryConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl LiftConfig {
    /// Validates the configuration
    ///
    /// Both backend sections may be present; only the active one is validated.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;

        match self.backend {
            BackendTarget::Direct => match self.direct {
                Some(ref config) => config.validate()?,
                None => {
                    return Err(
                        "direct configuration is required when backend = 'direct'".to_string()
                    )
                }
            },
            BackendTarget::Cloud => match self.cloud {
                Some(ref config) => config.validate()?,
                None => {
                    return Err(
                        "cloud configuration is required when backend = 'cloud'".to_string()
                    )
                }
            },
        }

        self.export.validate()?;
        self.limits.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

/// Direct-store microservice configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DirectStoreConfig {
    /// Base URL of the store, e.g. `http://localhost:3000`
    pub base_url: String,

    /// Username sent with uploads (optional)
    #[serde(default)]
    pub username: Option<String>,

    /// Upload secret (optional)
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub secret: Option<SecretString>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl DirectStoreConfig {
    fn validate(&self) -> Result<(), String> {
        use secrecy::ExposeSecret;

        validate_http_url("direct.base_url", &self.base_url)?;

        // Credentials travel together
        let has_user = self.username.as_ref().is_some_and(|u| !u.trim().is_empty());
        let has_secret = self
            .secret
            .as_ref()
            .is_some_and(|s| !s.expose_secret().is_blank());
        if has_user != has_secret {
            return Err(
                "direct.username and direct.secret must either both be set or both be empty"
                    .to_string(),
            );
        }

        validate_timeout("direct.timeout_seconds", self.timeout_seconds)
    }
}

impl Default for DirectStoreConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            username: None,
            secret: None,
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Cloud backend configuration (object store + document tree)
#[derive(Debug, Clone, Deserialize)]
pub struct CloudConfig {
    /// API key sent with storage and database requests
    /// Stored securely in memory and automatically zeroized on drop
    pub api_key: SecretString,

    /// Project identifier (informational)
    #[serde(default)]
    pub project_id: String,

    /// Object-store bucket, e.g. `my-project.appspot.com`
    pub storage_bucket: String,

    /// Document tree root URL, e.g. `https://my-project-default-rtdb.firebaseio.com`
    pub database_url: String,

    /// Object-store API root
    #[serde(default = "default_storage_base_url")]
    pub storage_base_url: String,

    /// Namespace that component and entity records are written under
    pub space_id: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl CloudConfig {
    fn validate(&self) -> Result<(), String> {
        use secrecy::ExposeSecret;

        if self.api_key.expose_secret().is_blank() {
            return Err("cloud.api_key cannot be empty".to_string());
        }
        if self.storage_bucket.trim().is_empty() {
            return Err("cloud.storage_bucket cannot be empty".to_string());
        }
        validate_http_url("cloud.database_url", &self.database_url)?;
        validate_http_url("cloud.storage_base_url", &self.storage_base_url)?;

        if self.space_id.trim().is_empty() {
            return Err("cloud.space_id cannot be empty".to_string());
        }
        if let Some(c) = self.space_id.chars().find(|c| FORBIDDEN_KEY_CHARS.contains(c)) {
            return Err(format!(
                "cloud.space_id contains forbidden character '{c}'"
            ));
        }

        validate_timeout("cloud.timeout_seconds", self.timeout_seconds)
    }
}

/// Export preset and per-field overrides
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Preset name (mobile_vr, pc_vr, high_quality)
    #[serde(default = "default_preset")]
    pub preset: String,

    /// Output format override (binary or separate)
    #[serde(default)]
    pub format: Option<String>,

    /// Mesh compression level override (0-10, 0 disables compression)
    #[serde(default)]
    pub compression_level: Option<u8>,

    /// Texture size limit override in pixels
    #[serde(default)]
    pub texture_size_limit: Option<u32>,

    /// Image quality override (1-100)
    #[serde(default)]
    pub image_quality: Option<u8>,

    #[serde(default)]
    pub apply_modifiers: Option<bool>,

    #[serde(default)]
    pub include_animations: Option<bool>,

    #[serde(default)]
    pub include_cameras: Option<bool>,

    #[serde(default)]
    pub include_lights: Option<bool>,

    /// Offer the last reference for clipboard copy after a batch
    #[serde(default = "default_true")]
    pub auto_copy_result: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            preset: default_preset(),
            format: None,
            compression_level: None,
            texture_size_limit: None,
            image_quality: None,
            apply_modifiers: None,
            include_animations: None,
            include_cameras: None,
            include_lights: None,
            auto_copy_result: true,
        }
    }
}

impl ExportConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_presets = ["mobile_vr", "pc_vr", "high_quality"];
        if !valid_presets.contains(&self.preset.as_str()) {
            return Err(format!(
                "Invalid export.preset '{}'. Must be one of: {}",
                self.preset,
                valid_presets.join(", ")
            ));
        }

        if let Some(ref format) = self.format {
            if !["binary", "separate"].contains(&format.as_str()) {
                return Err(format!(
                    "Invalid export.format '{format}'. Must be one of: binary, separate"
                ));
            }
        }

        if let Some(level) = self.compression_level {
            if level > 10 {
                return Err(format!(
                    "export.compression_level must be between 0 and 10, got {level}"
                ));
            }
        }

        if let Some(limit) = self.texture_size_limit {
            if !(256..=8192).contains(&limit) {
                return Err(format!(
                    "export.texture_size_limit must be between 256 and 8192, got {limit}"
                ));
            }
        }

        if let Some(quality) = self.image_quality {
            if !(1..=100).contains(&quality) {
                return Err(format!(
                    "export.image_quality must be between 1 and 100, got {quality}"
                ));
            }
        }

        Ok(())
    }
}

/// Platform limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Maximum asset size in MiB
    #[serde(default = "default_max_file_size_mb")]
    pub max_file_size_mb: u64,

    /// Maximum triangle count per unit
    #[serde(default = "default_max_triangle_count")]
    pub max_triangle_count: u64,

    /// Largest texture dimension before a warning is raised
    #[serde(default = "default_max_texture_dimension")]
    pub max_texture_dimension: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: default_max_file_size_mb(),
            max_triangle_count: default_max_triangle_count(),
            max_texture_dimension: default_max_texture_dimension(),
        }
    }
}

impl LimitsConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_file_size_mb == 0 {
            return Err("limits.max_file_size_mb must be > 0".to_string());
        }
        if self.max_triangle_count == 0 {
            return Err("limits.max_triangle_count must be > 0".to_string());
        }
        if self.max_texture_dimension == 0 {
            return Err("limits.max_texture_dimension must be > 0".to_string());
        }
        Ok(())
    }
}

/// Session history configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HistoryConfig {
    /// Append-only JSON-lines log of every recorded history item (optional)
    #[serde(default)]
    pub log_path: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

fn validate_http_url(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field} cannot be empty"));
    }
    if !value.starts_with("http://") && !value.starts_with("https://") {
        return Err(format!("{field} must start with http:// or https://"));
    }
    url::Url::parse(value).map_err(|e| format!("{field} is not a valid URL: {e}"))?;
    Ok(())
}

fn validate_timeout(field: &str, seconds: u64) -> Result<(), String> {
    if !(1..=600).contains(&seconds) {
        return Err(format!(
            "{field} must be between 1 and 600, got {seconds}"
        ));
    }
    Ok(())
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_storage_base_url() -> String {
    "https://firebasestorage.googleapis.com".to_string()
}

fn default_preset() -> String {
    "mobile_vr".to_string()
}

fn default_max_file_size_mb() -> u64 {
    40
}

fn default_max_triangle_count() -> u64 {
    100_000
}

fn default_max_texture_dimension() -> u32 {
    2048
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;

    fn cloud() -> CloudConfig {
        CloudConfig {
            api_key: secret_string("key".to_string()),
            project_id: "demo".to_string(),
            storage_bucket: "demo.appspot.com".to_string(),
            database_url: "https://demo-default-rtdb.firebaseio.com".to_string(),
            storage_base_url: default_storage_base_url(),
            space_id: "lobby".to_string(),
            timeout_seconds: 60,
        }
    }

    fn config(backend: BackendTarget) -> LiftConfig {
        LiftConfig {
            application: ApplicationConfig::default(),
            backend,
            direct: Some(DirectStoreConfig::default()),
            cloud: Some(cloud()),
            export: ExportConfig::default(),
            limits: LimitsConfig::default(),
            history: HistoryConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(config(BackendTarget::Direct).validate().is_ok());
        assert!(config(BackendTarget::Cloud).validate().is_ok());
    }

    #[test]
    fn test_active_backend_section_required() {
        let mut cfg = config(BackendTarget::Cloud);
        cfg.cloud = None;
        let err = cfg.validate().unwrap_err();
        assert!(err.contains("cloud configuration is required"));

        // Inactive section may be missing
        cfg.backend = BackendTarget::Direct;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_direct_base_url_validation() {
        let mut direct = DirectStoreConfig::default();
        direct.base_url = "ftp://store".to_string();
        assert!(direct.validate().is_err());

        direct.base_url = String::new();
        assert!(direct.validate().is_err());
    }

    #[test]
    fn test_direct_credentials_travel_together() {
        let mut direct = DirectStoreConfig::default();
        direct.username = Some("artist".to_string());
        assert!(direct.validate().is_err());

        direct.secret = Some(secret_string("s3cret".to_string()));
        assert!(direct.validate().is_ok());
    }

    #[test]
    fn test_cloud_space_id_rejects_forbidden_chars() {
        for bad in ["a.b", "a/b", "a#b", "a$b", "a[b", "a]b"] {
            let mut c = cloud();
            c.space_id = bad.to_string();
            assert!(c.validate().is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_cloud_requires_api_key() {
        let mut c = cloud();
        c.api_key = secret_string("  ".to_string());
        assert!(c.validate().unwrap_err().contains("api_key"));
    }

    #[test]
    fn test_export_config_validation() {
        let mut export = ExportConfig::default();
        assert!(export.validate().is_ok());

        export.preset = "ultra".to_string();
        assert!(export.validate().is_err());

        export.preset = "pc_vr".to_string();
        export.compression_level = Some(11);
        assert!(export.validate().is_err());

        export.compression_level = Some(10);
        export.format = Some("zip".to_string());
        assert!(export.validate().is_err());

        export.format = Some("separate".to_string());
        export.texture_size_limit = Some(128);
        assert!(export.validate().is_err());
    }

    #[test]
    fn test_limits_must_be_positive() {
        let mut limits = LimitsConfig::default();
        limits.max_triangle_count = 0;
        assert!(limits.validate().is_err());
    }

    #[test]
    fn test_logging_rotation_validation() {
        let mut logging = LoggingConfig::default();
        logging.local_rotation = "weekly".to_string();
        assert!(logging.validate().is_err());
    }

    #[test]
    fn test_default_values() {
        let limits = LimitsConfig::default();
        assert_eq!(limits.max_file_size_mb, 40);
        assert_eq!(limits.max_triangle_count, 100_000);
        assert_eq!(limits.max_texture_dimension, 2048);

        let export = ExportConfig::default();
        assert_eq!(export.preset, "mobile_vr");
        assert!(export.auto_copy_result);
    }
}
