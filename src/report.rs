//! # Report Module
//!
//! Genera il riepilogo di fine run per la console e scrive il file
//! `compression_report_<YYYYMMDD_HHMMSS>.txt` nella directory scansionata.
//!
//! ## Struttura del report:
//! ```text
//! Image Compression Report - 2024-05-01 14:03:22
//! ============================================================
//!
//! Directory: /photos
//! Quality: 85
//! Maximum width: 1024px
//! ...
//! Total images processed: 12
//! Successfully compressed: 11
//! Failed: 1
//! ...
//! Errors:
//!   - no_reduction: 1 images
//! ```

use crate::{
    config::{Config, Placement},
    error::CompressError,
    file_manager::FileManager,
    progress::CompressionStats,
};
use chrono::{DateTime, Local};
use std::fmt;
use std::path::{Path, PathBuf};

const MB: f64 = 1024.0 * 1024.0;

/// Summary of a finished run
pub struct CompressionReport<'a> {
    config: &'a Config,
    stats: &'a CompressionStats,
    started_at: DateTime<Local>,
}

impl<'a> CompressionReport<'a> {
    pub fn new(config: &'a Config, stats: &'a CompressionStats, started_at: DateTime<Local>) -> Self {
        Self {
            config,
            stats,
            started_at,
        }
    }

    /// `compression_report_<YYYYMMDD_HHMMSS>.txt`
    pub fn file_name(&self) -> String {
        format!(
            "compression_report_{}.txt",
            self.started_at.format("%Y%m%d_%H%M%S")
        )
    }

    fn output_location(&self) -> String {
        match self.config.placement {
            Placement::Subdirectory => format!("{}/", self.config.compress_dir_name()),
            Placement::InPlace => "in place (next to the originals)".to_string(),
        }
    }

    /// Lines printed to the console at the end of a run
    pub fn summary_lines(&self) -> Vec<String> {
        let stats = self.stats;
        let mut lines = vec![
            "Compression Summary".to_string(),
            format!("Processed: {} images", stats.processed),
            format!("Successfully compressed: {} images", stats.successful),
        ];

        if stats.failed > 0 {
            lines.push(format!("Failed: {} images", stats.failed));
            for (error, count) in &stats.errors {
                lines.push(format!("  - {}: {} images", error, count));
            }
        }

        if stats.successful > 0 {
            lines.push(format!(
                "Total size reduction: {} -> {}",
                FileManager::format_size(stats.total_original_size),
                FileManager::format_size(stats.total_compressed_size)
            ));
            lines.push(format!(
                "Space saved: {:.2}MB ({:.1}%)",
                stats.bytes_saved() as f64 / MB,
                stats.overall_reduction_percent()
            ));
            if stats.resized_images > 0 {
                lines.push(format!(
                    "Resized {} images to fit maximum width of {}px",
                    stats.resized_images,
                    self.config.max_width.pixels()
                ));
            }
        }

        lines
    }

    /// Full text of the report file
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Write the report into `dir` and return its path
    pub async fn write_to(&self, dir: &Path) -> Result<PathBuf, CompressError> {
        let path = dir.join(self.file_name());
        tokio::fs::write(&path, self.render()).await?;
        Ok(path)
    }
}

impl fmt::Display for CompressionReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let config = self.config;
        let stats = self.stats;

        writeln!(
            f,
            "Image Compression Report - {}",
            self.started_at.format("%Y-%m-%d %H:%M:%S")
        )?;
        writeln!(f, "{}\n", "=".repeat(60))?;

        writeln!(f, "Directory: {}", config.source_dir.display())?;
        writeln!(f, "Quality: {}", config.quality)?;
        writeln!(
            f,
            "Maximum width: {}px ({})",
            config.max_width.pixels(),
            config.size_tag()
        )?;
        writeln!(f, "Output format: {}", config.output_format)?;
        writeln!(f, "Preserve originals: {}", config.preserve_originals)?;
        writeln!(f, "Placement: {}", config.placement)?;
        writeln!(f, "Compressed images location: {}\n", self.output_location())?;

        writeln!(f, "Total images processed: {}", stats.processed)?;
        writeln!(f, "Successfully compressed: {}", stats.successful)?;
        writeln!(f, "Failed: {}\n", stats.failed)?;

        if stats.successful > 0 {
            writeln!(f, "Original size: {:.2}MB", stats.total_original_size as f64 / MB)?;
            writeln!(f, "Compressed size: {:.2}MB", stats.total_compressed_size as f64 / MB)?;
            writeln!(
                f,
                "Space saved: {:.2}MB ({:.1}%)",
                stats.bytes_saved() as f64 / MB,
                stats.overall_reduction_percent()
            )?;
            writeln!(f, "Resized images: {}\n", stats.resized_images)?;
        }

        if stats.failed > 0 {
            writeln!(f, "Errors:")?;
            for (error, count) in &stats.errors {
                writeln!(f, "  - {}: {} images", error, count)?;
            }
        }

        Ok(())
    }
}
