//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{BackendTarget, LiftConfig};
use super::secret::secret_string;
use crate::domain::errors::LiftError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Prefix for environment overrides
const ENV_PREFIX: &str = "ASSETLIFT";

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Loads a `.env` file from the working directory, if one exists
/// 2. Reads the TOML file
/// 3. Performs environment variable substitution (`${VAR}` syntax)
/// 4. Parses the TOML into [`LiftConfig`]
/// 5. Applies environment variable overrides (`ASSETLIFT_*` prefix)
/// 6. Validates the configuration
///
/// # Errors
///
/// Every failure is reported as [`LiftError::Configuration`], so a batch never
/// starts with a config that would fail every unit.
///
/// # Examples
///
/// ```no_run
/// use assetlift::config::loader::load_config;
///
/// let config = load_config("assetlift.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<LiftConfig> {
    let path = path.as_ref();

    // Missing .env is fine
    let _ = dotenvy::dotenv();

    if !path.exists() {
        return Err(LiftError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        LiftError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents)
}

/// Parses and validates configuration from a TOML string
///
/// Runs the same substitution, override and validation steps as
/// [`load_config`] without touching the filesystem.
pub fn parse_config(contents: &str) -> Result<LiftConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: LiftConfig = toml::from_str(&contents)?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        LiftError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// # Errors
///
/// Returns an error naming every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| LiftError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        // Placeholders in comments are left alone
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    processed_line = processed_line.replace(&format!("${{{var_name}}}"), &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(LiftError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn env(key: &str) -> Option<String> {
    std::env::var(format!("{ENV_PREFIX}_{key}")).ok()
}

/// Reads and parses an override, reporting unparseable values
fn env_parsed<T: FromStr>(key: &str) -> Result<Option<T>> {
    match env(key) {
        Some(raw) => raw.trim().parse().map(Some).map_err(|_| {
            LiftError::Configuration(format!(
                "Invalid value '{raw}' for {ENV_PREFIX}_{key}"
            ))
        }),
        None => Ok(None),
    }
}

/// Applies environment variable overrides using the ASSETLIFT_* prefix
///
/// Variables follow the pattern `ASSETLIFT_<SECTION>_<KEY>`, for example
/// `ASSETLIFT_CLOUD_SPACE_ID` or `ASSETLIFT_LIMITS_MAX_TRIANGLE_COUNT`.
fn apply_env_overrides(config: &mut LiftConfig) -> Result<()> {
    // Application overrides
    if let Some(val) = env("APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(val) = env("BACKEND") {
        config.backend = match val.to_lowercase().as_str() {
            "direct" => BackendTarget::Direct,
            "cloud" => BackendTarget::Cloud,
            other => {
                return Err(LiftError::Configuration(format!(
                    "Invalid value '{other}' for {ENV_PREFIX}_BACKEND. Must be one of: direct, cloud"
                )))
            }
        };
    }

    // Direct-store overrides (only if the section is configured)
    if let Some(ref mut direct) = config.direct {
        if let Some(val) = env("DIRECT_BASE_URL") {
            direct.base_url = val;
        }
        if let Some(val) = env("DIRECT_USERNAME") {
            direct.username = Some(val);
        }
        if let Some(val) = env("DIRECT_SECRET") {
            direct.secret = Some(secret_string(val));
        }
        if let Some(val) = env_parsed("DIRECT_TIMEOUT_SECONDS")? {
            direct.timeout_seconds = val;
        }
    }

    // Cloud overrides (only if the section is configured)
    if let Some(ref mut cloud) = config.cloud {
        if let Some(val) = env("CLOUD_API_KEY") {
            cloud.api_key = secret_string(val);
        }
        if let Some(val) = env("CLOUD_PROJECT_ID") {
            cloud.project_id = val;
        }
        if let Some(val) = env("CLOUD_STORAGE_BUCKET") {
            cloud.storage_bucket = val;
        }
        if let Some(val) = env("CLOUD_DATABASE_URL") {
            cloud.database_url = val;
        }
        if let Some(val) = env("CLOUD_STORAGE_BASE_URL") {
            cloud.storage_base_url = val;
        }
        if let Some(val) = env("CLOUD_SPACE_ID") {
            cloud.space_id = val;
        }
        if let Some(val) = env_parsed("CLOUD_TIMEOUT_SECONDS")? {
            cloud.timeout_seconds = val;
        }
    }

    // Export overrides
    if let Some(val) = env("EXPORT_PRESET") {
        config.export.preset = val;
    }
    if let Some(val) = env("EXPORT_FORMAT") {
        config.export.format = Some(val);
    }
    if let Some(val) = env_parsed("EXPORT_COMPRESSION_LEVEL")? {
        config.export.compression_level = Some(val);
    }
    if let Some(val) = env_parsed("EXPORT_TEXTURE_SIZE_LIMIT")? {
        config.export.texture_size_limit = Some(val);
    }
    if let Some(val) = env_parsed("EXPORT_AUTO_COPY_RESULT")? {
        config.export.auto_copy_result = val;
    }

    // Limits overrides
    if let Some(val) = env_parsed("LIMITS_MAX_FILE_SIZE_MB")? {
        config.limits.max_file_size_mb = val;
    }
    if let Some(val) = env_parsed("LIMITS_MAX_TRIANGLE_COUNT")? {
        config.limits.max_triangle_count = val;
    }
    if let Some(val) = env_parsed("LIMITS_MAX_TEXTURE_DIMENSION")? {
        config.limits.max_texture_dimension = val;
    }

    // History overrides
    if let Some(val) = env("HISTORY_LOG_PATH") {
        config.history.log_path = Some(val);
    }

    // Logging overrides
    if let Some(val) = env_parsed("LOGGING_LOCAL_ENABLED")? {
        config.logging.local_enabled = val;
    }
    if let Some(val) = env("LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Some(val) = env("LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}
