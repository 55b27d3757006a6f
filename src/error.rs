//! # Error Types Module
//!
//! Definisce tutti gli errori che il compressore può sollevare.
//!
//! ## Categorie:
//! - `NotFound`: la directory da scansionare non esiste (fatale per il run)
//! - `UnreadableImage`: il codec non riesce a leggere un candidato
//! - `Io`: errori del filesystem (inclusi i permessi)
//! - `Collision`: due candidati scriverebbero lo stesso path di output
//! - `NoReduction`: la compressione non ha portato benefici ed è stata scartata
//! - `Encode` / `Image`: errore del codec in fase di encoding
//! - `Validation`: configurazione non valida (fatale in fase di setup)
//! - `Task`: il task bloccante del worker è andato in panic o è stato cancellato
//!
//! Solo `NotFound` e `Validation` interrompono un run. Tutto il resto viene
//! trasformato dal worker in un fallimento del singolo file.

use std::path::PathBuf;

/// Custom error types for batch compression
#[derive(thiserror::Error, Debug)]
pub enum CompressError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Directory not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Unreadable image: {0}")]
    UnreadableImage(String),

    #[error("Output path collision: {}", .0.display())]
    Collision(PathBuf),

    #[error("Compression did not reduce file size ({original} -> {encoded} bytes)")]
    NoReduction { original: u64, encoded: u64 },

    #[error("Encoding error: {0}")]
    Encode(String),

    #[error("Configuration error: {0}")]
    Validation(String),

    #[error("Worker task failed: {0}")]
    Task(String),
}

impl CompressError {
    /// True for filesystem access failures
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::Io(e) if e.kind() == std::io::ErrorKind::PermissionDenied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_denied_detection() {
        let denied = CompressError::from(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert!(denied.is_permission_denied());

        let missing = CompressError::from(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "gone",
        ));
        assert!(!missing.is_permission_denied());
        assert!(!CompressError::UnreadableImage("bad".into()).is_permission_denied());
    }

    #[test]
    fn test_not_found_message_contains_path() {
        let err = CompressError::NotFound(PathBuf::from("/no/such/dir"));
        assert_eq!(err.to_string(), "Directory not found: /no/such/dir");
    }
}
