//! # Batch Image Compressor - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing`
//! - Costruzione della configurazione da `--config`, flag e prompt interattivi
//! - Avvio del run e uscita pulita su Ctrl-C
//!
//! ## Flusso di esecuzione:
//! 1. Parsa gli argomenti CLI; il subcommand `samples` termina qui
//! 2. Carica `--config` se presente, altrimenti chiede le impostazioni mancanti
//! 3. Mostra le impostazioni e chiede conferma (saltata con `--yes`)
//! 4. Esegue il `BatchCompressor` e stampa il riepilogo
//!
//! ## Esempio di utilizzo:
//! ```bash
//! image-compressor ./photos --quality 80 --max-width md --format webp --yes
//! image-compressor samples ./test_images
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use batch_image_compressor::{
    config::{MaxWidth, OutputFormat, Placement},
    progress::{NoopReporter, ProgressManager, ProgressReporter},
    prompt::{self, PartialConfig},
    samples, BatchCompressor, Config, StandardCodec,
};

#[derive(Parser)]
#[command(name = "image-compressor")]
#[command(about = "Compress, resize and convert every image in a directory tree")]
#[command(args_conflicts_with_subcommands = true)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Directory containing the images (prompted for when omitted)
    source_dir: Option<PathBuf>,

    /// Encoder quality (1-100)
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: Option<u8>,

    /// Maximum width: sm (640), md (768), lg (1024) or a pixel count
    #[arg(short = 'w', long)]
    max_width: Option<MaxWidth>,

    /// Output format: webp, jpg, png or original
    #[arg(short, long)]
    format: Option<OutputFormat>,

    /// Copy each source into an `originals/` folder (`--preserve-originals no` to decline)
    #[arg(
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = clap::builder::BoolishValueParser::new()
    )]
    preserve_originals: Option<bool>,

    /// Where outputs go: subdirectory or in-place
    #[arg(short, long)]
    placement: Option<Placement>,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    yes: bool,

    /// Load settings from a JSON file; flags still override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the final settings to a JSON file
    #[arg(long)]
    save_config: Option<PathBuf>,

    /// Print per-file lines without the animated progress bar
    #[arg(long)]
    no_progress: bool,

    /// Print nothing but log output
    #[arg(long, conflicts_with = "no_progress")]
    quiet: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a set of synthetic test images
    Samples {
        /// Target directory
        #[arg(default_value = "test_images")]
        directory: PathBuf,
    },
}

impl Args {
    fn overrides(&self) -> PartialConfig {
        PartialConfig {
            source_dir: self.source_dir.clone(),
            quality: self.quality,
            max_width: self.max_width,
            output_format: self.format,
            preserve_originals: self.preserve_originals,
            placement: self.placement,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let default_level = if args.verbose { "debug" } else { "info" };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    if let Some(Command::Samples { directory }) = &args.command {
        let written = samples::generate_samples(directory, &StandardCodec::new())?;
        println!(
            "Created {} sample images in {}",
            written.len(),
            directory.display()
        );
        return Ok(());
    }

    let config = match build_config(&args).await {
        Ok(config) => config,
        Err(e) if is_interrupted(&e) => return cancelled(),
        Err(e) => return Err(e),
    };
    config.validate()?;

    if let Some(path) = &args.save_config {
        config.save_to_file(path).await?;
        info!("Saved settings to {}", path.display());
    }

    println!("Compression settings:");
    for line in prompt::settings_lines(&config) {
        println!("  {}", line);
    }

    if !args.yes {
        match prompt::confirm_start() {
            Ok(true) => {}
            Ok(false) => return cancelled(),
            Err(e) if prompt_interrupted(&e) => return cancelled(),
            Err(e) => return Err(e.into()),
        }
    }

    let reporter: Arc<dyn ProgressReporter> = if args.quiet {
        Arc::new(NoopReporter)
    } else if args.no_progress {
        Arc::new(ProgressManager::without_bar())
    } else {
        Arc::new(ProgressManager::new())
    };
    let compressor = BatchCompressor::new(config)?.with_reporter(reporter);

    tokio::select! {
        result = compressor.run() => {
            result?;
            println!("Compression process completed!");
        }
        _ = tokio::signal::ctrl_c() => {
            cancelled()?;
            // An in-flight worker must not delay the exit
            std::process::exit(0);
        }
    }

    Ok(())
}

async fn build_config(args: &Args) -> Result<Config> {
    let overrides = args.overrides();

    match &args.config {
        Some(path) => {
            let mut config = Config::from_file(path).await?;
            overrides.apply_to(&mut config);
            Ok(config)
        }
        None => Ok(overrides.complete()?),
    }
}

fn is_interrupted(err: &anyhow::Error) -> bool {
    err.downcast_ref::<dialoguer::Error>()
        .is_some_and(prompt_interrupted)
}

fn prompt_interrupted(err: &dialoguer::Error) -> bool {
    matches!(err, dialoguer::Error::IO(e) if e.kind() == io::ErrorKind::Interrupted)
}

fn cancelled() -> Result<()> {
    println!("\nOperation cancelled by user.");
    Ok(())
}
