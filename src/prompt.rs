//! # Interactive Prompts
//!
//! Raccoglie con `dialoguer` le impostazioni non passate da command line,
//! con gli stessi default di `Config::default()`. I valori dati come flag
//! non vengono mai richiesti di nuovo.

use crate::config::{Config, MaxWidth, OutputFormat, Placement};
use dialoguer::{Confirm, Input, Select};
use std::path::{Path, PathBuf};

/// Job settings known before prompting; `None` means "ask"
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialConfig {
    pub source_dir: Option<PathBuf>,
    pub quality: Option<u8>,
    pub max_width: Option<MaxWidth>,
    pub output_format: Option<OutputFormat>,
    pub preserve_originals: Option<bool>,
    pub placement: Option<Placement>,
}

impl PartialConfig {
    /// Overwrite the fields of `config` that were given explicitly
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(dir) = &self.source_dir {
            config.source_dir = dir.clone();
        }
        if let Some(quality) = self.quality {
            config.quality = quality;
        }
        if let Some(max_width) = self.max_width {
            config.max_width = max_width;
        }
        if let Some(format) = self.output_format {
            config.output_format = format;
        }
        if let Some(preserve) = self.preserve_originals {
            config.preserve_originals = preserve;
        }
        if let Some(placement) = self.placement {
            config.placement = placement;
        }
    }

    /// Fill every field, prompting for the missing ones
    pub fn complete(self) -> dialoguer::Result<Config> {
        let defaults = Config::default();

        let source_dir = match self.source_dir {
            Some(dir) => dir,
            None => prompt_source_dir()?,
        };
        let quality = match self.quality {
            Some(quality) => quality,
            None => prompt_quality(defaults.quality)?,
        };
        let max_width = match self.max_width {
            Some(max_width) => max_width,
            None => prompt_max_width(defaults.max_width)?,
        };
        let output_format = match self.output_format {
            Some(format) => format,
            None => prompt_output_format()?,
        };
        let preserve_originals = match self.preserve_originals {
            Some(preserve) => preserve,
            None => Confirm::new()
                .with_prompt("Keep a copy of the original images in an 'originals' folder?")
                .default(defaults.preserve_originals)
                .interact()?,
        };
        let placement = match self.placement {
            Some(placement) => placement,
            None => prompt_placement()?,
        };

        Ok(Config {
            source_dir,
            quality,
            max_width,
            output_format,
            preserve_originals,
            placement,
        })
    }
}

fn prompt_source_dir() -> dialoguer::Result<PathBuf> {
    let input: String = Input::new()
        .with_prompt("Directory containing the images")
        .validate_with(|input: &String| validate_source_dir(input))
        .interact_text()?;
    Ok(PathBuf::from(input.trim()))
}

fn prompt_quality(default: u8) -> dialoguer::Result<u8> {
    let input: String = Input::new()
        .with_prompt("Compression quality (1-100)")
        .default(default.to_string())
        .validate_with(|input: &String| parse_quality(input).map(|_| ()))
        .interact_text()?;
    Ok(parse_quality(&input).unwrap_or(default))
}

fn prompt_max_width(default: MaxWidth) -> dialoguer::Result<MaxWidth> {
    let input: String = Input::new()
        .with_prompt("Maximum width (sm=640, md=768, lg=1024 or pixels)")
        .default(default.to_string())
        .validate_with(|input: &String| input.parse::<MaxWidth>().map(|_| ()))
        .interact_text()?;
    Ok(input.parse().unwrap_or(default))
}

fn prompt_output_format() -> dialoguer::Result<OutputFormat> {
    let labels: Vec<&str> = OutputFormat::ALL.iter().map(|f| format_label(*f)).collect();
    let index = Select::new()
        .with_prompt("Output format")
        .items(&labels)
        .default(0)
        .interact()?;
    Ok(OutputFormat::ALL[index])
}

fn prompt_placement() -> dialoguer::Result<Placement> {
    let index = Select::new()
        .with_prompt("Where should compressed images go?")
        .items(&[
            "Into a compress-<size>-<format>-<quality> folder per directory",
            "Next to the originals",
        ])
        .default(0)
        .interact()?;
    Ok(if index == 0 {
        Placement::Subdirectory
    } else {
        Placement::InPlace
    })
}

/// Final go/no-go question before a run starts
pub fn confirm_start() -> dialoguer::Result<bool> {
    Confirm::new()
        .with_prompt("Start compression with these settings?")
        .default(true)
        .interact()
}

fn format_label(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::Webp => "WebP (recommended)",
        OutputFormat::Jpeg => "JPEG",
        OutputFormat::Png => "PNG",
        OutputFormat::Original => "Keep original format",
    }
}

pub fn validate_source_dir(input: &str) -> Result<(), String> {
    let path = Path::new(input.trim());
    if input.trim().is_empty() {
        Err("Please enter a directory".to_string())
    } else if !path.is_dir() {
        Err(format!("Directory not found: {}", path.display()))
    } else {
        Ok(())
    }
}

pub fn parse_quality(input: &str) -> Result<u8, String> {
    match input.trim().parse::<u8>() {
        Ok(quality) if (1..=100).contains(&quality) => Ok(quality),
        _ => Err("Quality must be a number between 1 and 100".to_string()),
    }
}

/// Human-readable settings shown before confirmation
pub fn settings_lines(config: &Config) -> Vec<String> {
    vec![
        format!("Source directory: {}", config.source_dir.display()),
        format!("Quality: {}", config.quality),
        format!("Maximum width: {} ({}px)", config.max_width, config.max_width.pixels()),
        format!("Output format: {}", format_label(config.output_format)),
        format!(
            "Preserve originals: {}",
            if config.preserve_originals { "yes" } else { "no" }
        ),
        match config.placement {
            Placement::Subdirectory => {
                format!("Output: {}/ next to each image", config.compress_dir_name())
            }
            Placement::InPlace => "Output: next to each image".to_string(),
        },
    ]
}
