//! # Progress Reporting and Statistics Module
//!
//! Questo modulo gestisce il feedback visivo e le statistiche di un run.
//!
//! ## Componenti:
//! - `ProgressReporter`: interfaccia usata dall'orchestratore (start, progress
//!   per file, messaggi, riepilogo finale). Ogni metodo è no-op di default.
//! - `NoopReporter`: reporter silenzioso, usato dai test e da `--quiet`
//! - `ProgressManager`: progress bar `indicatif` con una riga per file
//!   (`without_bar` mantiene le righe e rimuove l'animazione)
//! - `CompressionStats`: accumulatore di tutti i risultati del run
//!
//! ## Feedback visivo:
//! ```text
//! [OK] photos/beach.jpg -> 412.30 KB (61.2% saved, resized)
//! ⠋ [00:00:12] [=========================>--------------] 15/24 (62%) beach.jpg
//! ```

use crate::{file_manager::FileManager, outcome::CompressionOutcome};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Sink for run progress, chosen when the compressor is built
pub trait ProgressReporter: Send + Sync {
    /// Called once before the first candidate with the candidate count
    fn start(&self, _total: usize) {}

    /// Called after each candidate (`index` is 1-based)
    fn progress(&self, _index: usize, _total: usize, _path: &Path, _outcome: &CompressionOutcome) {}

    fn message(&self, _message: &str) {}

    /// Called once with the rendered summary lines
    fn finish(&self, _summary: &[String]) {}
}

/// Reporter that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {}

/// Manages the console progress bar for a run
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a progress manager; the bar is sized in `start`
    pub fn new() -> Self {
        Self::with_bar(ProgressBar::new(0))
    }

    /// Per-file lines and summary only, no animated bar
    pub fn without_bar() -> Self {
        Self::with_bar(ProgressBar::hidden())
    }

    fn with_bar(bar: ProgressBar) -> Self {
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .unwrap()
                .progress_chars("=>-"),
        );

        Self { bar }
    }

    fn file_line(path: &Path, outcome: &CompressionOutcome) -> String {
        match outcome {
            CompressionOutcome::Success {
                output_size,
                resized,
                ..
            } => format!(
                "[OK] {} -> {} ({:.1}% saved{})",
                path.display(),
                FileManager::format_size(*output_size),
                outcome.reduction_percent().unwrap_or(0.0),
                if *resized { ", resized" } else { "" }
            ),
            CompressionOutcome::Failure { kind, detail } => match kind {
                crate::outcome::FailureKind::NoReduction => {
                    format!("[SKIP] {}: compression did not reduce file size", path.display())
                }
                _ => format!("[ERROR] {}: {}", path.display(), detail),
            },
        }
    }
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for ProgressManager {
    fn start(&self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_position(0);
        self.bar.enable_steady_tick(Duration::from_millis(100));
    }

    fn progress(&self, _index: usize, _total: usize, path: &Path, outcome: &CompressionOutcome) {
        let line = Self::file_line(path, outcome);
        self.bar.suspend(|| println!("{}", line));
        self.bar.inc(1);
        self.bar
            .set_message(path.file_name().unwrap_or_default().to_string_lossy().to_string());
    }

    fn message(&self, message: &str) {
        self.bar.suspend(|| println!("{}", message));
    }

    fn finish(&self, summary: &[String]) {
        self.bar.finish_and_clear();
        for line in summary {
            println!("{}", line);
        }
    }
}

/// Statistics accumulated over one run
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CompressionStats {
    pub processed: usize,
    pub successful: usize,
    pub failed: usize,
    /// Sum of source sizes of successfully compressed files
    pub total_original_size: u64,
    /// Sum of output sizes of successfully compressed files
    pub total_compressed_size: u64,
    pub resized_images: usize,
    /// Failure classification -> occurrences
    pub errors: BTreeMap<String, usize>,
}

impl CompressionStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one outcome into the totals
    pub fn record(&mut self, outcome: &CompressionOutcome) {
        self.processed += 1;
        match outcome {
            CompressionOutcome::Success {
                original_size,
                output_size,
                resized,
                ..
            } => {
                self.successful += 1;
                self.total_original_size += original_size;
                self.total_compressed_size += output_size;
                if *resized {
                    self.resized_images += 1;
                }
            }
            CompressionOutcome::Failure { kind, .. } => {
                self.failed += 1;
                *self.errors.entry(kind.classification().to_string()).or_insert(0) += 1;
            }
        }
    }

    pub fn bytes_saved(&self) -> i64 {
        self.total_original_size as i64 - self.total_compressed_size as i64
    }

    pub fn overall_reduction_percent(&self) -> f64 {
        FileManager::calculate_reduction(self.total_original_size, self.total_compressed_size)
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Processed: {} images | Compressed: {} | Failed: {} | Resized: {} | Saved: {} ({:.1}%)",
            self.processed,
            self.successful,
            self.failed,
            self.resized_images,
            FileManager::format_size(self.bytes_saved().max(0) as u64),
            self.overall_reduction_percent()
        )
    }
}
