//! # Compression Outcome Module
//!
//! Risultato dell'elaborazione di un singolo candidato. Ogni candidato produce
//! esattamente un `CompressionOutcome`, che non viene più modificato e viene
//! aggiunto alle statistiche una sola volta.

use crate::error::CompressError;
use std::path::PathBuf;

/// Classification of a per-file failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    PermissionDenied,
    UnreadableImage,
    NoReduction,
    Collision,
    /// Anything else, classified by its message
    Other(String),
}

impl FailureKind {
    /// Key used in the statistics breakdown and the report
    pub fn classification(&self) -> &str {
        match self {
            Self::PermissionDenied => "permission_denied",
            Self::UnreadableImage => "unreadable_image",
            Self::NoReduction => "no_reduction",
            Self::Collision => "collision",
            Self::Other(message) => message,
        }
    }
}

impl From<&CompressError> for FailureKind {
    fn from(err: &CompressError) -> Self {
        if err.is_permission_denied() {
            return Self::PermissionDenied;
        }
        match err {
            CompressError::UnreadableImage(_) => Self::UnreadableImage,
            CompressError::NoReduction { .. } => Self::NoReduction,
            CompressError::Collision(_) => Self::Collision,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Per-file result of a compression attempt
#[derive(Debug, Clone, PartialEq)]
pub enum CompressionOutcome {
    Success {
        output_path: PathBuf,
        original_size: u64,
        output_size: u64,
        resized: bool,
    },
    Failure {
        kind: FailureKind,
        detail: String,
    },
}

impl CompressionOutcome {
    pub fn from_error(err: &CompressError) -> Self {
        Self::Failure {
            kind: FailureKind::from(err),
            detail: err.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Percentage saved, `None` for failures
    pub fn reduction_percent(&self) -> Option<f64> {
        match self {
            Self::Success {
                original_size,
                output_size,
                ..
            } => Some(crate::file_manager::FileManager::calculate_reduction(
                *original_size,
                *output_size,
            )),
            Self::Failure { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_from_errors() {
        let denied = CompressError::from(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert_eq!(FailureKind::from(&denied), FailureKind::PermissionDenied);
        assert_eq!(FailureKind::from(&denied).classification(), "permission_denied");

        let no_gain = CompressError::NoReduction {
            original: 10,
            encoded: 12,
        };
        assert_eq!(FailureKind::from(&no_gain).classification(), "no_reduction");

        let unreadable = CompressError::UnreadableImage("bad header".into());
        assert_eq!(FailureKind::from(&unreadable), FailureKind::UnreadableImage);

        let clash = CompressError::Collision(PathBuf::from("a.md.webp"));
        assert_eq!(FailureKind::from(&clash).classification(), "collision");
    }

    #[test]
    fn test_other_errors_use_message() {
        let err = CompressError::Encode("WebP encoding failed".into());
        let outcome = CompressionOutcome::from_error(&err);
        match outcome {
            CompressionOutcome::Failure { kind, detail } => {
                assert_eq!(kind.classification(), "Encoding error: WebP encoding failed");
                assert_eq!(detail, err.to_string());
            }
            CompressionOutcome::Success { .. } => panic!("expected failure"),
        }
    }

    #[test]
    fn test_reduction_percent() {
        let success = CompressionOutcome::Success {
            output_path: PathBuf::from("out.webp"),
            original_size: 1000,
            output_size: 250,
            resized: false,
        };
        assert!(success.is_success());
        assert_eq!(success.reduction_percent(), Some(75.0));

        let failure = CompressionOutcome::from_error(&CompressError::UnreadableImage("x".into()));
        assert!(!failure.is_success());
        assert_eq!(failure.reduction_percent(), None);
    }
}
