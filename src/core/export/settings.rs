//! Export settings, presets and translation to encoder parameters

use crate::config::ExportConfig;
use crate::domain::{LiftError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Highest mesh compression level the encoder accepts
pub const MAX_COMPRESSION_LEVEL: u8 = 10;

/// Parameter bundle handed to the encoder, keyed by the encoder's own names
pub type EncoderParams = BTreeMap<String, Value>;

/// Interchange output layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Single self-contained binary blob
    Binary,
    /// JSON document with side-car buffers and images
    Separate,
}

impl ExportFormat {
    /// Value of the encoder's `export_format` parameter
    pub fn encoder_name(self) -> &'static str {
        match self {
            ExportFormat::Binary => "GLB",
            ExportFormat::Separate => "GLTF_SEPARATE",
        }
    }

    /// File extension of the primary output file
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Binary => "glb",
            ExportFormat::Separate => "gltf",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = LiftError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "binary" | "glb" => Ok(Self::Binary),
            "separate" | "gltf_separate" => Ok(Self::Separate),
            _ => Err(LiftError::Configuration(format!(
                "Invalid export format: {s}. Expected 'binary' or 'separate'"
            ))),
        }
    }
}

/// Named settings bundles tuned for target platforms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportPreset {
    /// Standalone headsets: aggressive compression, small textures
    MobileVr,
    /// Tethered headsets
    PcVr,
    /// Archival quality, no mesh compression
    HighQuality,
}

impl ExportPreset {
    pub fn name(self) -> &'static str {
        match self {
            ExportPreset::MobileVr => "mobile_vr",
            ExportPreset::PcVr => "pc_vr",
            ExportPreset::HighQuality => "high_quality",
        }
    }
}

impl fmt::Display for ExportPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExportPreset {
    type Err = LiftError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "mobile_vr" => Ok(Self::MobileVr),
            "pc_vr" => Ok(Self::PcVr),
            "high_quality" => Ok(Self::HighQuality),
            _ => Err(LiftError::Configuration(format!(
                "Unknown export preset: {s}. Expected one of: mobile_vr, pc_vr, high_quality"
            ))),
        }
    }
}

/// Immutable settings for one batch run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSettings {
    pub format: ExportFormat,
    /// Largest texture edge the encoder will emit, in pixels
    pub texture_size_limit: u32,
    /// Mesh compression level, 0 disables compression
    pub compression_level: u8,
    /// Image quality, 1-100
    pub image_quality: u8,
    pub apply_modifiers: bool,
    pub include_animations: bool,
    pub include_cameras: bool,
    pub include_lights: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self::preset(ExportPreset::MobileVr)
    }
}

impl ExportSettings {
    /// Settings for a named preset
    pub fn preset(preset: ExportPreset) -> Self {
        let (compression_level, texture_size_limit, image_quality) = match preset {
            ExportPreset::MobileVr => (6, 1024, 75),
            ExportPreset::PcVr => (4, 2048, 85),
            ExportPreset::HighQuality => (0, 4096, 95),
        };
        Self {
            format: ExportFormat::Binary,
            texture_size_limit,
            compression_level,
            image_quality,
            apply_modifiers: true,
            include_animations: true,
            include_cameras: false,
            include_lights: false,
        }
    }

    /// Builds settings from the `[export]` section: preset first, then overrides
    ///
    /// # Errors
    ///
    /// Returns [`LiftError::Configuration`] for an unknown preset or format, or
    /// when the resulting bundle fails [`ExportSettings::validate`].
    pub fn from_config(config: &ExportConfig) -> Result<Self> {
        let mut settings = Self::preset(config.preset.parse()?);

        if let Some(ref format) = config.format {
            settings.format = format.parse()?;
        }
        if let Some(level) = config.compression_level {
            settings.compression_level = level;
        }
        if let Some(limit) = config.texture_size_limit {
            settings.texture_size_limit = limit;
        }
        if let Some(quality) = config.image_quality {
            settings.image_quality = quality;
        }
        if let Some(apply) = config.apply_modifiers {
            settings.apply_modifiers = apply;
        }
        if let Some(animations) = config.include_animations {
            settings.include_animations = animations;
        }
        if let Some(cameras) = config.include_cameras {
            settings.include_cameras = cameras;
        }
        if let Some(lights) = config.include_lights {
            settings.include_lights = lights;
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Checks the bundle is something the encoder can act on
    pub fn validate(&self) -> Result<()> {
        if self.compression_level > MAX_COMPRESSION_LEVEL {
            return Err(LiftError::Configuration(format!(
                "compression_level must be between 0 and {MAX_COMPRESSION_LEVEL}, got {}",
                self.compression_level
            )));
        }
        if self.texture_size_limit == 0 {
            return Err(LiftError::Configuration(
                "texture_size_limit must be positive".to_string(),
            ));
        }
        if !(1..=100).contains(&self.image_quality) {
            return Err(LiftError::Configuration(format!(
                "image_quality must be between 1 and 100, got {}",
                self.image_quality
            )));
        }
        Ok(())
    }

    pub fn compression_enabled(&self) -> bool {
        self.compression_level > 0
    }

    /// Maps the abstract knobs onto the encoder's parameter names
    pub fn to_encoder_params(&self, output: &Path) -> EncoderParams {
        let mut params = EncoderParams::new();
        params.insert(
            "filepath".to_string(),
            Value::from(output.to_string_lossy().into_owned()),
        );
        params.insert(
            "export_format".to_string(),
            Value::from(self.format.encoder_name()),
        );
        // Members are passed explicitly, never through the host's live selection
        params.insert("use_selection".to_string(), Value::from(true));
        params.insert("export_apply".to_string(), Value::from(self.apply_modifiers));
        params.insert(
            "export_animations".to_string(),
            Value::from(self.include_animations),
        );
        params.insert(
            "export_cameras".to_string(),
            Value::from(self.include_cameras),
        );
        params.insert("export_lights".to_string(), Value::from(self.include_lights));
        params.insert(
            "export_draco_mesh_compression_enable".to_string(),
            Value::from(self.compression_enabled()),
        );
        if self.compression_enabled() {
            params.insert(
                "export_draco_mesh_compression_level".to_string(),
                Value::from(self.compression_level),
            );
        }
        params.insert(
            "export_image_quality".to_string(),
            Value::from(self.image_quality),
        );
        params.insert(
            "export_image_size".to_string(),
            Value::from(self.texture_size_limit),
        );
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use test_case::test_case;

    #[test_case(ExportPreset::MobileVr, 6, 1024, 75 ; "mobile vr")]
    #[test_case(ExportPreset::PcVr, 4, 2048, 85 ; "pc vr")]
    #[test_case(ExportPreset::HighQuality, 0, 4096, 95 ; "high quality")]
    fn test_preset_values(preset: ExportPreset, compression: u8, texture: u32, quality: u8) {
        let settings = ExportSettings::preset(preset);
        assert_eq!(settings.compression_level, compression);
        assert_eq!(settings.texture_size_limit, texture);
        assert_eq!(settings.image_quality, quality);
        assert_eq!(settings.format, ExportFormat::Binary);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_preset_parse() {
        assert_eq!("PC_VR".parse::<ExportPreset>().unwrap(), ExportPreset::PcVr);
        assert!("ultra".parse::<ExportPreset>().is_err());
        assert_eq!(ExportPreset::HighQuality.to_string(), "high_quality");
    }

    #[test]
    fn test_from_config_applies_overrides() {
        let config = ExportConfig {
            preset: "pc_vr".to_string(),
            compression_level: Some(2),
            include_lights: Some(true),
            ..ExportConfig::default()
        };
        let settings = ExportSettings::from_config(&config).unwrap();
        assert_eq!(settings.compression_level, 2);
        assert_eq!(settings.texture_size_limit, 2048);
        assert!(settings.include_lights);
        assert!(!settings.include_cameras);
    }

    #[test]
    fn test_from_config_rejects_out_of_range_compression() {
        let config = ExportConfig {
            compression_level: Some(11),
            ..ExportConfig::default()
        };
        assert!(matches!(
            ExportSettings::from_config(&config),
            Err(LiftError::Configuration(_))
        ));
    }

    #[test]
    fn test_validate_rejects_zero_texture_limit() {
        let mut settings = ExportSettings::default();
        settings.texture_size_limit = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_encoder_params_names() {
        let settings = ExportSettings::default();
        let params = settings.to_encoder_params(&PathBuf::from("/tmp/out/Crate.glb"));

        assert_eq!(params["filepath"], Value::from("/tmp/out/Crate.glb"));
        assert_eq!(params["export_format"], Value::from("GLB"));
        assert_eq!(params["use_selection"], Value::from(true));
        assert_eq!(params["export_apply"], Value::from(true));
        assert_eq!(params["export_draco_mesh_compression_enable"], Value::from(true));
        assert_eq!(params["export_draco_mesh_compression_level"], Value::from(6));
        assert_eq!(params["export_image_size"], Value::from(1024));
        assert_eq!(params["export_cameras"], Value::from(false));
    }

    #[test]
    fn test_encoder_params_without_compression() {
        let settings = ExportSettings::preset(ExportPreset::HighQuality);
        let params = settings.to_encoder_params(Path::new("out.glb"));
        assert_eq!(params["export_draco_mesh_compression_enable"], Value::from(false));
        assert!(!params.contains_key("export_draco_mesh_compression_level"));
    }
}
