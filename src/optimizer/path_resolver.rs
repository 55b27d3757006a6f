//! # Path Resolution Module
//!
//! Centralizza il calcolo dei path di output di ogni candidato.
//!
//! - Modalità subdirectory: `<root>/<rel-parent>/compress-<size>-<format>-<quality>/<stem>.<size>.<ext>`
//! - Modalità in-place: `<root>/<rel-parent>/<stem>.<size>.<ext>`
//!
//! I path sono unici all'interno di un run. Il resolver ricorda ogni path già
//! assegnato, più il path di input di ogni candidato, quindi un output non può
//! mai finire sull'input di un altro candidato. In caso di conflitto
//! l'estensione sorgente entra nello stem (`photo-png.md.webp`); un secondo
//! conflitto fa fallire il file.
//!
//! Con il formato `original` l'estensione segue il contenuto rilevato: byte
//! JPEG salvati come `photo.webp` diventano `photo.<size>.jpg`.
//!
//! Gli output in-place di un run precedente con le stesse impostazioni stanno
//! accanto ai sorgenti e vengono ritrovati dalla scansione.
//! `without_generated_outputs` li toglie dai candidati, così vengono
//! sovrascritti invece che ricompressi.

use crate::{
    codec::CodecFormat,
    config::{Config, Placement},
    error::CompressError,
    file_manager::FileManager,
};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Resolves output paths for one run
pub struct PathResolver {
    root: PathBuf,
    config: Config,
    claimed: HashSet<PathBuf>,
}

impl PathResolver {
    /// Create a resolver for the candidates of one run
    pub fn new(root: &Path, config: &Config, candidates: &[PathBuf]) -> Self {
        Self {
            root: root.to_path_buf(),
            config: config.clone(),
            claimed: candidates.iter().cloned().collect(),
        }
    }

    /// Directory the output of `input_path` is written to
    pub fn output_dir(&self, input_path: &Path) -> PathBuf {
        let relative_parent = match input_path.strip_prefix(&self.root) {
            Ok(rel) => rel.parent().unwrap_or(Path::new("")).to_path_buf(),
            Err(_) => {
                debug!("{} is outside {}, using its parent", input_path.display(), self.root.display());
                return self.placement_dir(input_path.parent().unwrap_or(Path::new("")));
            }
        };

        self.placement_dir(&self.root.join(relative_parent))
    }

    fn placement_dir(&self, source_dir: &Path) -> PathBuf {
        match self.config.placement {
            Placement::Subdirectory => source_dir.join(self.config.compress_dir_name()),
            Placement::InPlace => source_dir.to_path_buf(),
        }
    }

    fn file_stem(input_path: &Path) -> Result<String, CompressError> {
        input_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .ok_or_else(|| CompressError::Validation(format!("Invalid file name: {}", input_path.display())))
    }

    fn detected_format(&self, input_path: &Path) -> Option<CodecFormat> {
        match self.config.output_format.codec_format() {
            Some(_) => None,
            None => FileManager::sniff_format(input_path),
        }
    }

    /// Preferred output path, `<stem>.<size-tag>.<ext>`, without claiming it
    pub fn output_path(&self, input_path: &Path) -> Result<PathBuf, CompressError> {
        let detected = self.detected_format(input_path);
        self.named_output(input_path, Self::file_stem(input_path)?, detected)
    }

    /// Second-choice path, `<stem>-<source-ext>.<size-tag>.<ext>`
    fn fallback_path(&self, input_path: &Path) -> Result<PathBuf, CompressError> {
        let source_ext = input_path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let stem = format!("{}-{}", Self::file_stem(input_path)?, source_ext);
        let detected = self.detected_format(input_path);
        self.named_output(input_path, stem, detected)
    }

    fn named_output(
        &self,
        input_path: &Path,
        stem: String,
        detected: Option<CodecFormat>,
    ) -> Result<PathBuf, CompressError> {
        let filename = format!(
            "{}.{}.{}",
            stem,
            self.config.size_tag(),
            self.config.target_extension(input_path, detected)
        );
        Ok(self.output_dir(input_path).join(filename))
    }

    /// Resolve and claim the output path of `input_path`
    pub fn resolve(&mut self, input_path: &Path) -> Result<PathBuf, CompressError> {
        let primary = self.output_path(input_path)?;
        if self.claimed.insert(primary.clone()) {
            debug!("Resolved output path: {} -> {}", input_path.display(), primary.display());
            return Ok(primary);
        }

        let fallback = self.fallback_path(input_path)?;
        if self.claimed.insert(fallback.clone()) {
            debug!(
                "Output path {} already taken, using {}",
                primary.display(),
                fallback.display()
            );
            return Ok(fallback);
        }

        Err(CompressError::Collision(primary))
    }

    /// Drop candidates that are the output another candidate would get
    /// under `config` (previous in-place runs with the same settings)
    pub fn without_generated_outputs(
        root: &Path,
        config: &Config,
        candidates: Vec<PathBuf>,
    ) -> Vec<PathBuf> {
        if config.placement != Placement::InPlace {
            return candidates;
        }

        let resolver = Self::new(root, config, &[]);
        let outputs: HashSet<PathBuf> = candidates
            .iter()
            .flat_map(|c| [resolver.output_path(c).ok(), resolver.fallback_path(c).ok()])
            .flatten()
            .collect();

        let (generated, sources): (Vec<PathBuf>, Vec<PathBuf>) =
            candidates.into_iter().partition(|c| outputs.contains(c));
        if !generated.is_empty() {
            debug!("Skipping {} outputs of an earlier run", generated.len());
        }
        sources
    }

    /// Create the parent directories of `path` (no-op if they exist)
    pub async fn ensure_parent_dirs(path: &Path) -> Result<(), CompressError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}
