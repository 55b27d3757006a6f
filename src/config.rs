//! # Configuration Management Module
//!
//! Questo modulo gestisce la configurazione di un singolo run di compressione.
//!
//! ## Parametri:
//! - `source_dir`: directory scansionata ricorsivamente
//! - `quality`: qualità dell'encoder (1-100, default: 85)
//! - `max_width`: preset (`sm`=640, `md`=768, `lg`=1024) o larghezza in pixel (default: 1920)
//! - `output_format`: `webp` (default), `jpg`, `png` o `original`
//! - `preserve_originals`: copia i sorgenti in una cartella `originals/` (default: false)
//! - `placement`: `subdirectory` (default) o `in-place`
//!
//! Le stesse implementazioni di `FromStr` servono i flag CLI, i prompt
//! interattivi e il file JSON caricato con `--config`.
//!
//! ## Esempio:
//! ```rust,ignore
//! let config = Config {
//!     quality: 80,
//!     max_width: "md".parse()?,
//!     ..Default::default()
//! };
//! config.validate()?;
//! assert_eq!(config.compress_dir_name(), "compress-md-webp-80");
//! ```

use crate::{codec::CodecFormat, error::CompressError};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Named shorthand for a maximum width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizePreset {
    Sm,
    Md,
    Lg,
}

impl SizePreset {
    pub fn width(self) -> u32 {
        match self {
            Self::Sm => 640,
            Self::Md => 768,
            Self::Lg => 1024,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Sm => "sm",
            Self::Md => "md",
            Self::Lg => "lg",
        }
    }
}

/// Maximum output width, either a preset or an explicit pixel count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MaxWidth {
    Preset(SizePreset),
    Pixels(u32),
}

impl MaxWidth {
    pub fn pixels(self) -> u32 {
        match self {
            Self::Preset(preset) => preset.width(),
            Self::Pixels(width) => width,
        }
    }

    /// Tag used in directory and file names: the preset name or the width
    pub fn tag(self) -> String {
        match self {
            Self::Preset(preset) => preset.name().to_string(),
            Self::Pixels(width) => width.to_string(),
        }
    }
}

impl FromStr for MaxWidth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().to_lowercase();
        match value.as_str() {
            "sm" => Ok(Self::Preset(SizePreset::Sm)),
            "md" => Ok(Self::Preset(SizePreset::Md)),
            "lg" => Ok(Self::Preset(SizePreset::Lg)),
            _ => match value.parse::<u32>() {
                Ok(width) if width > 0 => Ok(Self::Pixels(width)),
                Ok(_) => Err("Width must be a positive number".to_string()),
                Err(_) => Err(format!(
                    "Invalid width '{}': use sm, md, lg or a positive number",
                    s.trim()
                )),
            },
        }
    }
}

impl fmt::Display for MaxWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag())
    }
}

/// Requested output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    #[serde(rename = "webp")]
    Webp,
    #[serde(rename = "jpg", alias = "jpeg")]
    Jpeg,
    #[serde(rename = "png")]
    Png,
    /// Keep each image's own format
    #[serde(rename = "original")]
    Original,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 4] = [Self::Webp, Self::Jpeg, Self::Png, Self::Original];

    pub fn tag(self) -> &'static str {
        match self {
            Self::Webp => "webp",
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Original => "original",
        }
    }

    /// Codec format to encode with, `None` when the source format is kept
    pub fn codec_format(self) -> Option<CodecFormat> {
        match self {
            Self::Webp => Some(CodecFormat::Webp),
            Self::Jpeg => Some(CodecFormat::Jpeg),
            Self::Png => Some(CodecFormat::Png),
            Self::Original => None,
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "webp" => Ok(Self::Webp),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            "original" => Ok(Self::Original),
            other => Err(format!(
                "Invalid format '{}': use webp, jpg, png or original",
                other
            )),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Where compressed files are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Placement {
    /// `compress-<size>-<format>-<quality>/` next to each source
    Subdirectory,
    /// Beside the source file
    InPlace,
}

impl FromStr for Placement {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "subdirectory" | "subdir" => Ok(Self::Subdirectory),
            "in-place" | "inplace" => Ok(Self::InPlace),
            other => Err(format!(
                "Invalid placement '{}': use subdirectory or in-place",
                other
            )),
        }
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Subdirectory => f.write_str("subdirectory"),
            Self::InPlace => f.write_str("in-place"),
        }
    }
}

/// Configuration for one compression run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory scanned for images
    pub source_dir: PathBuf,
    /// Encoder quality (1-100)
    pub quality: u8,
    /// Images wider than this are downscaled
    pub max_width: MaxWidth,
    /// Target format
    pub output_format: OutputFormat,
    /// Copy sources into `originals/` before leaving them behind
    pub preserve_originals: bool,
    /// Output placement mode
    pub placement: Placement,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("."),
            quality: 85,
            max_width: MaxWidth::Pixels(1920),
            output_format: OutputFormat::Webp,
            preserve_originals: false,
            placement: Placement::Subdirectory,
        }
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), CompressError> {
        if self.quality == 0 || self.quality > 100 {
            return Err(CompressError::Validation(
                "Quality must be between 1 and 100".to_string(),
            ));
        }

        if self.max_width.pixels() == 0 {
            return Err(CompressError::Validation(
                "Maximum width must be a positive number".to_string(),
            ));
        }

        Ok(())
    }

    pub fn size_tag(&self) -> String {
        self.max_width.tag()
    }

    pub fn format_tag(&self) -> &'static str {
        self.output_format.tag()
    }

    /// Name of the generated subdirectory, e.g. `compress-1024-webp-85`
    pub fn compress_dir_name(&self) -> String {
        format!(
            "compress-{}-{}-{}",
            self.size_tag(),
            self.format_tag(),
            self.quality
        )
    }

    /// Extension of the compressed file for a given source.
    ///
    /// With `original`, the source extension is kept unless `detected` (the
    /// sniffed content format) disagrees with it; the extension then follows
    /// the content so name and bytes always match.
    pub fn target_extension(&self, source: &Path, detected: Option<CodecFormat>) -> String {
        if let Some(format) = self.output_format.codec_format() {
            return format.extension().to_string();
        }

        let source_ext = source.extension().and_then(|ext| ext.to_str());
        match (source_ext, detected) {
            (Some(ext), Some(format)) if CodecFormat::from_alias(ext) != Some(format) => {
                format.extension().to_string()
            }
            (Some(ext), _) => ext.to_string(),
            (None, Some(format)) => format.extension().to_string(),
            (None, None) => "jpg".to_string(),
        }
    }

    /// True when `name` has the exact shape of a directory this tool writes,
    /// e.g. `compress-1024-webp-85` or `compress-sm-original-70`
    pub fn is_compress_dir_name(name: &str) -> bool {
        let Some(rest) = name.strip_prefix("compress-") else {
            return false;
        };
        let parts: Vec<&str> = rest.split('-').collect();
        let [size, format, quality] = parts.as_slice() else {
            return false;
        };

        let plain_number = |s: &str| {
            !s.is_empty() && !s.starts_with('0') && s.bytes().all(|b| b.is_ascii_digit())
        };
        let size_ok = matches!(*size, "sm" | "md" | "lg") || plain_number(*size);
        let format_ok = OutputFormat::ALL.iter().any(|f| f.tag() == *format);
        let quality_ok = plain_number(*quality)
            && quality.parse::<u8>().map_or(false, |q| (1..=100).contains(&q));

        size_ok && format_ok && quality_ok
    }

    /// Load configuration from file
    pub async fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(anyhow::anyhow!("Config file does not exist: {}", path.display()));
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.quality = 0;
        assert!(config.validate().is_err());

        config.quality = 101;
        assert!(config.validate().is_err());

        config.quality = 100;
        config.max_width = MaxWidth::Pixels(0);
        assert!(matches!(config.validate(), Err(CompressError::Validation(_))));
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.quality, 85);
        assert_eq!(config.max_width, MaxWidth::Pixels(1920));
        assert_eq!(config.output_format, OutputFormat::Webp);
        assert_eq!(config.placement, Placement::Subdirectory);
        assert!(!config.preserve_originals);
    }

    #[test]
    fn test_max_width_parsing() {
        assert_eq!("sm".parse::<MaxWidth>().unwrap().pixels(), 640);
        assert_eq!("MD".parse::<MaxWidth>().unwrap().pixels(), 768);
        assert_eq!(" lg ".parse::<MaxWidth>().unwrap().pixels(), 1024);
        assert_eq!("1500".parse::<MaxWidth>().unwrap(), MaxWidth::Pixels(1500));
        assert!("0".parse::<MaxWidth>().is_err());
        assert!("-20".parse::<MaxWidth>().is_err());
        assert!("xl".parse::<MaxWidth>().is_err());
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("WebP".parse::<OutputFormat>().unwrap(), OutputFormat::Webp);
        assert_eq!("jpeg".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
        assert_eq!("jpg".parse::<OutputFormat>().unwrap().tag(), "jpg");
        assert_eq!("original".parse::<OutputFormat>().unwrap().codec_format(), None);
        assert!("gif".parse::<OutputFormat>().is_err());
        assert_eq!("in-place".parse::<Placement>().unwrap(), Placement::InPlace);
        assert!("elsewhere".parse::<Placement>().is_err());
    }

    #[test]
    fn test_directory_naming() {
        let config = Config {
            quality: 85,
            max_width: MaxWidth::Pixels(1024),
            output_format: OutputFormat::Webp,
            ..Default::default()
        };
        assert_eq!(config.compress_dir_name(), "compress-1024-webp-85");

        let config = Config {
            quality: 70,
            max_width: MaxWidth::Preset(SizePreset::Sm),
            output_format: OutputFormat::Original,
            ..Default::default()
        };
        assert_eq!(config.compress_dir_name(), "compress-sm-original-70");
    }

    #[test]
    fn test_target_extension() {
        let mut config = Config::default();
        assert_eq!(config.target_extension(Path::new("a/b.png"), None), "webp");
        assert_eq!(
            config.target_extension(Path::new("a/b.png"), Some(CodecFormat::Png)),
            "webp"
        );

        config.output_format = OutputFormat::Jpeg;
        assert_eq!(config.target_extension(Path::new("b.png"), None), "jpg");

        config.output_format = OutputFormat::Original;
        assert_eq!(config.target_extension(Path::new("b.TIFF"), None), "TIFF");
        assert_eq!(
            config.target_extension(Path::new("b.TIFF"), Some(CodecFormat::Tiff)),
            "TIFF"
        );
        assert_eq!(
            config.target_extension(Path::new("c.JPEG"), Some(CodecFormat::Jpeg)),
            "JPEG"
        );
    }

    #[test]
    fn test_original_format_follows_sniffed_content() {
        let config = Config {
            output_format: OutputFormat::Original,
            ..Default::default()
        };
        // JPEG bytes saved under a .webp name
        assert_eq!(
            config.target_extension(Path::new("x.webp"), Some(CodecFormat::Jpeg)),
            "jpg"
        );
        assert_eq!(
            config.target_extension(Path::new("y.png"), Some(CodecFormat::Webp)),
            "webp"
        );
    }

    #[test]
    fn test_compress_dir_name_shape() {
        assert!(Config::is_compress_dir_name("compress-1024-webp-85"));
        assert!(Config::is_compress_dir_name("compress-sm-original-70"));
        assert!(Config::is_compress_dir_name("compress-lg-png-100"));
        assert!(Config::is_compress_dir_name("compress-640-jpg-1"));
        assert!(Config::is_compress_dir_name(&Config::default().compress_dir_name()));

        assert!(!Config::is_compress_dir_name("compress-2023-trip"));
        assert!(!Config::is_compress_dir_name("compress-1024-webp"));
        assert!(!Config::is_compress_dir_name("compress-1024-webp-85-old"));
        assert!(!Config::is_compress_dir_name("compress-xl-webp-85"));
        assert!(!Config::is_compress_dir_name("compress-0640-webp-85"));
        assert!(!Config::is_compress_dir_name("compress-1024-gif-85"));
        assert!(!Config::is_compress_dir_name("compress-1024-webp-0"));
        assert!(!Config::is_compress_dir_name("compress-1024-webp-101"));
        assert!(!Config::is_compress_dir_name("compressed-1024-webp-85"));
    }

    #[tokio::test]
    async fn test_config_save_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");

        let original_config = Config {
            source_dir: temp_dir.path().to_path_buf(),
            quality: 60,
            max_width: MaxWidth::Preset(SizePreset::Md),
            output_format: OutputFormat::Png,
            preserve_originals: true,
            placement: Placement::InPlace,
        };

        original_config.save_to_file(&config_path).await.unwrap();
        let loaded_config = Config::from_file(&config_path).await.unwrap();

        assert_eq!(loaded_config.source_dir, temp_dir.path());
        assert_eq!(loaded_config.quality, 60);
        assert_eq!(loaded_config.max_width, MaxWidth::Preset(SizePreset::Md));
        assert_eq!(loaded_config.output_format, OutputFormat::Png);
        assert!(loaded_config.preserve_originals);
        assert_eq!(loaded_config.placement, Placement::InPlace);
    }

    #[tokio::test]
    async fn test_config_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = Config::from_file(&temp_dir.path().join("missing.json")).await;
        assert!(result.is_err());
    }
}
