//! # Batch Image Compressor Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i tipi principali tramite re-exports
//! - Fornisce un'interfaccia pulita per il main.rs e per i test
//!
//! ## Architettura dei moduli:
//! - `config`: configurazione del job, preset di dimensione e formati di output
//! - `error`: tipi di errore per ogni fase di un run
//! - `file_manager`: discovery, sostituzione atomica, backup, utilità sulle dimensioni
//! - `codec`: decode / resize / encode dietro il trait `ImageCodec`
//! - `resize`: calcolo delle dimensioni rispettando l'aspect ratio
//! - `outcome`: risultato per singolo file e classificazione dei fallimenti
//! - `optimizer`: risoluzione dei path, worker per file e orchestratore
//! - `progress`: progress reporting e statistiche del run
//! - `report`: file di report con timestamp
//! - `prompt`: raccolta interattiva delle impostazioni mancanti
//! - `samples`: immagini sintetiche di prova
//!
//! ## Utilizzo:
//! ```rust,ignore
//! use batch_image_compressor::{BatchCompressor, Config};
//!
//! let config = Config {
//!     source_dir: "photos".into(),
//!     ..Default::default()
//! };
//! let stats = BatchCompressor::new(config)?.run().await?;
//! println!("{}", stats.format_summary());
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod file_manager;
pub mod optimizer;
pub mod outcome;
pub mod progress;
pub mod prompt;
pub mod report;
pub mod resize;
pub mod samples;

pub use codec::{ImageCodec, StandardCodec};
pub use config::Config;
pub use error::CompressError;
pub use optimizer::BatchCompressor;
pub use outcome::CompressionOutcome;
pub use progress::CompressionStats;
