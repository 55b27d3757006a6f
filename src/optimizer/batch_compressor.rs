//! # Batch Compressor Orchestrator
//!
//! Esegue un job di compressione dall'inizio alla fine:
//! scan -> resolve output path -> compress -> record -> summarize -> report.
//!
//! I file vengono elaborati rigorosamente uno dopo l'altro. Il lavoro del codec
//! per ogni file gira sul blocking pool di tokio e viene atteso prima del file
//! successivo: il runtime resta reattivo a Ctrl-C senza sovrapposizioni tra file.

use crate::{
    codec::{ImageCodec, StandardCodec},
    config::{Config, Placement},
    error::CompressError,
    file_manager::FileManager,
    optimizer::{path_resolver::PathResolver, task_optimizer::TaskOptimizer},
    outcome::CompressionOutcome,
    progress::{CompressionStats, NoopReporter, ProgressReporter},
    report::CompressionReport,
};
use chrono::Local;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Main orchestrator
pub struct BatchCompressor {
    config: Arc<Config>,
    codec: Arc<dyn ImageCodec>,
    reporter: Arc<dyn ProgressReporter>,
}

impl BatchCompressor {
    /// Create a compressor with the standard codec and a silent reporter
    pub fn new(config: Config) -> Result<Self, CompressError> {
        config.validate()?;

        Ok(Self {
            config: Arc::new(config),
            codec: Arc::new(StandardCodec::new()),
            reporter: Arc::new(NoopReporter),
        })
    }

    pub fn with_codec(mut self, codec: Arc<dyn ImageCodec>) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the job and return the statistics
    pub async fn run(&self) -> Result<CompressionStats, CompressError> {
        let started_at = Local::now();
        let start_time = Instant::now();
        let root = self.config.source_dir.as_path();

        info!("Scanning {} for images...", root.display());
        let files = FileManager::find_images(root)?;
        let files = PathResolver::without_generated_outputs(root, &self.config, files);

        if files.is_empty() {
            self.handle_empty_directory(root);
            return Ok(CompressionStats::new());
        }

        self.log_configuration(files.len());

        let mut resolver = PathResolver::new(root, &self.config, &files);
        let worker = TaskOptimizer::new(self.config.clone(), self.codec.clone());
        let mut stats = CompressionStats::new();
        let total = files.len();

        self.reporter.start(total);

        for (index, file_path) in files.iter().enumerate() {
            debug!("[{}/{}] Processing: {}", index + 1, total, file_path.display());
            let outcome = self.process_file(&worker, &mut resolver, file_path).await;
            stats.record(&outcome);
            self.reporter.progress(index + 1, total, file_path, &outcome);
        }

        let report = CompressionReport::new(&self.config, &stats, started_at);
        let mut summary = report.summary_lines();

        match report.write_to(root).await {
            Ok(path) => summary.push(format!("Detailed report saved to: {}", path.display())),
            Err(e) => warn!("Could not save report: {}", e),
        }

        self.reporter.finish(&summary);
        self.print_final_stats(&stats, start_time.elapsed().as_secs_f64());

        Ok(stats)
    }

    /// Resolve, prepare and compress one candidate
    async fn process_file(
        &self,
        worker: &TaskOptimizer,
        resolver: &mut PathResolver,
        file_path: &Path,
    ) -> CompressionOutcome {
        let output_path = match resolver.resolve(file_path) {
            Ok(path) => path,
            Err(e) => {
                warn!("Skipping {}: {}", file_path.display(), e);
                return CompressionOutcome::from_error(&e);
            }
        };

        if let Err(e) = PathResolver::ensure_parent_dirs(&output_path).await {
            return CompressionOutcome::from_error(&e);
        }

        let worker = worker.clone();
        let input = file_path.to_path_buf();
        match tokio::task::spawn_blocking(move || worker.compress(&input, &output_path)).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Worker task failed for {}: {}", file_path.display(), e);
                CompressionOutcome::from_error(&CompressError::Task(e.to_string()))
            }
        }
    }

    fn handle_empty_directory(&self, root: &Path) {
        let message = format!("No supported images found in {}", root.display());
        info!("{}", message);
        self.reporter.message(&message);
    }

    fn log_configuration(&self, file_count: usize) {
        let config = &self.config;
        info!("Found {} images to process", file_count);
        info!(
            "Quality: {} | Maximum width: {}px ({}) | Output format: {}",
            config.quality,
            config.max_width.pixels(),
            config.size_tag(),
            config.output_format
        );
        match config.placement {
            Placement::Subdirectory => {
                info!("Output: {}/ next to each source", config.compress_dir_name())
            }
            Placement::InPlace => info!("Output: in place, next to each source"),
        }
        if config.preserve_originals {
            info!("Originals will be copied into originals/ folders");
        }
    }

    fn print_final_stats(&self, stats: &CompressionStats, duration: f64) {
        info!("=== Compression Complete ===");
        info!("{}", stats.format_summary());
        for (error, count) in &stats.errors {
            info!("  {}: {}", error, count);
        }
        info!("Duration: {:.2}s", duration);
    }
}
