//! # File Management Module
//!
//! Questo modulo gestisce tutte le operazioni sui file che non riguardano la codifica.
//!
//! ## Responsabilità:
//! - Discovery ricorsiva delle immagini candidate
//! - Controllo dell'estensione supportata (case-insensitive)
//! - Sostituzione atomica della destinazione con il file temporaneo
//! - Backup degli originali in una cartella `originals/`
//! - Dimensioni human-readable e percentuali di riduzione
//!
//! ## Formati supportati:
//! JPG, JPEG, PNG, BMP, WebP, TIFF
//!
//! ## Output generato dal tool:
//! - Le directory con la forma esatta di una cartella di output
//!   (`compress-1024-webp-85`) non vengono visitate
//! - Un file in `originals/` viene saltato solo se il file di cui è il backup
//!   si trova accanto alla cartella
//! - Qualsiasi altra directory, qualunque sia il nome, viene scansionata
//!
//! ## Esempio:
//! ```rust,ignore
//! let files = FileManager::find_images(Path::new("/path/to/photos"))?;
//! for file in &files {
//!     println!("{} ({})", file.display(), FileManager::format_size(FileManager::get_file_size(file)?));
//! }
//! ```

use crate::{codec::CodecFormat, config::Config, error::CompressError};
use filetime::FileTime;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// Extensions accepted as candidates (compared lower-cased)
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "webp", "tiff"];

/// Backup folder created next to sources when originals are preserved
pub const ORIGINALS_DIR: &str = "originals";

/// Manages file operations and discovery
pub struct FileManager;

impl FileManager {
    /// Find all supported images below `root`, sorted by name within each directory
    pub fn find_images(root: &Path) -> Result<Vec<PathBuf>, CompressError> {
        if !root.is_dir() {
            return Err(CompressError::NotFound(root.to_path_buf()));
        }

        let mut files = Vec::new();

        for entry in WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !Self::is_generated_dir(e))
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let path = entry.path();
            if Self::is_supported_format(path) && !Self::is_backup_copy(path) {
                files.push(path.to_path_buf());
            }
        }

        debug!("Found {} candidate images under {}", files.len(), root.display());
        Ok(files)
    }

    fn is_generated_dir(entry: &DirEntry) -> bool {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return false;
        }
        Config::is_compress_dir_name(&entry.file_name().to_string_lossy())
    }

    /// `<dir>/originals/<name>` next to an existing `<dir>/<name>`
    fn is_backup_copy(path: &Path) -> bool {
        let (Some(name), Some(folder)) = (path.file_name(), path.parent()) else {
            return false;
        };
        if folder.file_name().map_or(true, |f| f != ORIGINALS_DIR) {
            return false;
        }
        folder
            .parent()
            .map_or(false, |dir| dir.join(name).is_file())
    }

    /// Sniff the image format from the first bytes of a file
    pub fn sniff_format(path: &Path) -> Option<CodecFormat> {
        let mut header = Vec::with_capacity(32);
        fs::File::open(path)
            .and_then(|file| file.take(32).read_to_end(&mut header))
            .ok()?;
        image::guess_format(&header)
            .ok()
            .and_then(CodecFormat::from_image_format)
    }

    /// Check if a file format is supported
    pub fn is_supported_format(path: &Path) -> bool {
        if let Some(ext) = path.extension() {
            let ext_lower = ext.to_string_lossy().to_lowercase();
            SUPPORTED_EXTENSIONS.contains(&ext_lower.as_str())
        } else {
            false
        }
    }

    pub fn get_file_size(path: &Path) -> Result<u64, CompressError> {
        Ok(fs::metadata(path)?.len())
    }

    /// Move a finished temp file onto `destination`, removing any previous file first
    pub fn replace_file(temp: NamedTempFile, destination: &Path) -> Result<(), CompressError> {
        if destination.exists() {
            fs::remove_file(destination)?;
        }
        temp.persist(destination).map_err(|e| CompressError::Io(e.error))?;
        Ok(())
    }

    /// Copy `source` into `<source dir>/originals/`, keeping its timestamps.
    ///
    /// Returns `None` when a backup with that name already exists.
    pub fn backup_original(source: &Path) -> Result<Option<PathBuf>, CompressError> {
        let parent = source.parent().unwrap_or(Path::new(""));
        let file_name = source
            .file_name()
            .ok_or_else(|| CompressError::Validation(format!("Invalid file name: {}", source.display())))?;

        let backup_dir = parent.join(ORIGINALS_DIR);
        fs::create_dir_all(&backup_dir)?;

        let backup_path = backup_dir.join(file_name);
        if backup_path.exists() {
            debug!("Backup already present, skipping: {}", backup_path.display());
            return Ok(None);
        }

        fs::copy(source, &backup_path)?;

        let metadata = fs::metadata(source)?;
        filetime::set_file_times(
            &backup_path,
            FileTime::from_last_access_time(&metadata),
            FileTime::from_last_modification_time(&metadata),
        )?;

        Ok(Some(backup_path))
    }

    /// Get human-readable file size
    pub fn format_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size as u64, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }

    /// Calculate percentage reduction
    pub fn calculate_reduction(original_size: u64, new_size: u64) -> f64 {
        if original_size == 0 {
            0.0
        } else {
            ((original_size as f64 - new_size as f64) / original_size as f64) * 100.0
        }
    }
}
