//! # Task Optimizer Module
//!
//! Worker che comprime un singolo candidato. È sincrono: l'orchestratore lo
//! esegue sul blocking pool, un file alla volta.
//!
//! ## Passi per ogni file:
//! 1. legge e decodifica il sorgente
//! 2. sceglie il formato di encoding (target configurato, altrimenti quello del sorgente)
//! 3. ridimensiona se più largo della larghezza massima
//! 4. codifica in un file temporaneo accanto alla destinazione
//! 5. scarta il risultato se è stesso formato, non ridimensionato e non più piccolo
//! 6. sposta il file temporaneo sulla destinazione
//! 7. esegue il backup dell'originale se richiesto
//!
//! Gli errori non escono mai da `compress`: tornano come outcome di fallimento.

use crate::{
    codec::{CodecFormat, ImageCodec},
    config::Config,
    error::CompressError,
    file_manager::FileManager,
    outcome::CompressionOutcome,
    resize::fit_to_width,
};
use image::GenericImageView;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Compresses one file at a time
#[derive(Clone)]
pub struct TaskOptimizer {
    config: Arc<Config>,
    codec: Arc<dyn ImageCodec>,
}

impl TaskOptimizer {
    pub fn new(config: Arc<Config>, codec: Arc<dyn ImageCodec>) -> Self {
        Self { config, codec }
    }

    /// Compress `input_path` into `output_path`
    pub fn compress(&self, input_path: &Path, output_path: &Path) -> CompressionOutcome {
        match self.try_compress(input_path, output_path) {
            Ok(outcome) => outcome,
            Err(e) => {
                debug!("Compression failed for {}: {}", input_path.display(), e);
                CompressionOutcome::from_error(&e)
            }
        }
    }

    fn try_compress(
        &self,
        input_path: &Path,
        output_path: &Path,
    ) -> Result<CompressionOutcome, CompressError> {
        let bytes = fs::read(input_path)?;
        let original_size = bytes.len() as u64;

        let decoded = self.codec.decode(&bytes)?;
        let format = Self::encode_format(&self.config, input_path, decoded.format)?;

        let (width, height) = decoded.image.dimensions();
        let max_width = self.config.max_width.pixels();
        let (image, resized) = match fit_to_width(width, height, max_width) {
            Some((new_width, new_height)) => {
                debug!(
                    "Resizing {} from {}x{} to {}x{}",
                    input_path.display(),
                    width,
                    height,
                    new_width,
                    new_height
                );
                (self.codec.resize(&decoded.image, new_width, new_height), true)
            }
            None => (decoded.image, false),
        };

        let encoded = self.codec.encode(&image, format, self.config.quality)?;

        let parent = output_path.parent().unwrap_or(Path::new("."));
        let mut temp = tempfile::Builder::new()
            .prefix(".compress-")
            .suffix(".tmp")
            .tempfile_in(parent)?;
        temp.write_all(&encoded)?;
        temp.flush()?;
        let output_size = temp.as_file().metadata()?.len();

        if output_size >= original_size && !resized && Self::same_extension(input_path, output_path) {
            // Dropping the temp file deletes it
            drop(temp);
            return Err(CompressError::NoReduction {
                original: original_size,
                encoded: output_size,
            });
        }

        FileManager::replace_file(temp, output_path)?;
        debug!(
            "Compressed {} -> {} ({} -> {} bytes, {})",
            input_path.display(),
            output_path.display(),
            original_size,
            output_size,
            format
        );

        if self.config.preserve_originals && input_path != output_path {
            match FileManager::backup_original(input_path) {
                Ok(Some(backup)) => debug!("Backed up original to {}", backup.display()),
                Ok(None) => {}
                Err(e) => warn!("Could not back up {}: {}", input_path.display(), e),
            }
        }

        Ok(CompressionOutcome::Success {
            output_path: output_path.to_path_buf(),
            original_size,
            output_size,
            resized,
        })
    }

    /// Configured target, else the detected source format, else the extension
    fn encode_format(
        config: &Config,
        input_path: &Path,
        detected: Option<CodecFormat>,
    ) -> Result<CodecFormat, CompressError> {
        config
            .output_format
            .codec_format()
            .or(detected)
            .or_else(|| {
                input_path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .and_then(CodecFormat::from_alias)
            })
            .ok_or_else(|| {
                CompressError::UnreadableImage(format!(
                    "Unknown source format: {}",
                    input_path.display()
                ))
            })
    }

    fn same_extension(input_path: &Path, output_path: &Path) -> bool {
        let ext = |p: &Path| p.extension().map(|e| e.to_string_lossy().to_lowercase());
        ext(input_path) == ext(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{DecodedImage, StandardCodec};
    use crate::config::{MaxWidth, OutputFormat};
    use crate::outcome::FailureKind;
    use image::{DynamicImage, Rgb, RgbImage};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn photo(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 7 % 256) as u8, (y * 3 % 256) as u8, ((x + y) % 256) as u8])
        }))
    }

    fn write_image(path: &Path, image: &DynamicImage, format: CodecFormat, quality: u8) {
        let bytes = StandardCodec::new().encode(image, format, quality).unwrap();
        fs::write(path, bytes).unwrap();
    }

    fn worker(config: Config) -> TaskOptimizer {
        TaskOptimizer::new(Arc::new(config), Arc::new(StandardCodec::new()))
    }

    fn dims(path: &Path) -> (u32, u32) {
        let bytes = fs::read(path).unwrap();
        StandardCodec::new().decode(&bytes).unwrap().image.dimensions()
    }

    /// Codec whose encoder always returns a fixed number of bytes
    struct FixedSizeCodec {
        encoded_len: usize,
    }

    impl ImageCodec for FixedSizeCodec {
        fn decode(&self, _bytes: &[u8]) -> Result<DecodedImage, CompressError> {
            Ok(DecodedImage {
                image: photo(10, 10),
                format: Some(CodecFormat::Jpeg),
            })
        }

        fn resize(&self, image: &DynamicImage, width: u32, height: u32) -> DynamicImage {
            image.resize_exact(width, height, image::imageops::FilterType::Nearest)
        }

        fn encode(&self, _: &DynamicImage, _: CodecFormat, _: u8) -> Result<Vec<u8>, CompressError> {
            Ok(vec![0u8; self.encoded_len])
        }
    }

    #[test]
    fn test_resize_and_convert() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("wide.jpg");
        let output = temp_dir.path().join("wide.300.webp");
        write_image(&input, &photo(900, 600), CodecFormat::Jpeg, 95);

        let config = Config {
            max_width: MaxWidth::Pixels(300),
            output_format: OutputFormat::Webp,
            ..Default::default()
        };
        let outcome = worker(config).compress(&input, &output);

        match outcome {
            CompressionOutcome::Success { output_path, resized, output_size, .. } => {
                assert_eq!(output_path, output);
                assert!(resized);
                assert_eq!(output_size, fs::metadata(&output).unwrap().len());
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(dims(&output), (300, 200));
        assert!(input.exists());
    }

    #[test]
    fn test_narrow_image_is_not_resized() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("small.png");
        let output = temp_dir.path().join("small.1920.jpg");
        write_image(&input, &photo(120, 80), CodecFormat::Png, 85);

        let config = Config {
            output_format: OutputFormat::Jpeg,
            ..Default::default()
        };
        let outcome = worker(config).compress(&input, &output);

        assert!(matches!(outcome, CompressionOutcome::Success { resized: false, .. }));
        assert_eq!(dims(&output), (120, 80));
    }

    #[test]
    fn test_no_reduction_guard_with_real_codec() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("tiny.jpg");
        let output = temp_dir.path().join("tiny.1920.jpg");
        write_image(&input, &photo(64, 64), CodecFormat::Jpeg, 1);

        let config = Config {
            quality: 100,
            output_format: OutputFormat::Original,
            ..Default::default()
        };
        let outcome = worker(config).compress(&input, &output);

        match outcome {
            CompressionOutcome::Failure { kind, .. } => assert_eq!(kind, FailureKind::NoReduction),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(!output.exists());
        // Only the source is left, no temp file
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_no_reduction_guard_conditions() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("a.jpg");
        fs::write(&input, vec![1u8; 100]).unwrap();

        let run = |encoded_len: usize, output: PathBuf, max_width: u32| {
            let config = Config {
                max_width: MaxWidth::Pixels(max_width),
                output_format: OutputFormat::Original,
                ..Default::default()
            };
            let worker = TaskOptimizer::new(Arc::new(config), Arc::new(FixedSizeCodec { encoded_len }));
            worker.compress(&input, &output)
        };

        // Same size, same extension, no resize: rejected
        let same = run(100, temp_dir.path().join("a.1920.jpg"), 1920);
        assert!(matches!(same, CompressionOutcome::Failure { kind: FailureKind::NoReduction, .. }));
        assert!(!temp_dir.path().join("a.1920.jpg").exists());

        // Smaller output: accepted
        let smaller = run(99, temp_dir.path().join("b.1920.jpg"), 1920);
        assert!(smaller.is_success());

        // Larger, but resized: accepted
        let resized = run(150, temp_dir.path().join("c.5.jpg"), 5);
        assert!(matches!(resized, CompressionOutcome::Success { resized: true, .. }));

        // Larger, but extension changes: accepted
        let converted = run(150, temp_dir.path().join("d.1920.png"), 1920);
        assert!(converted.is_success());
    }

    #[test]
    fn test_existing_destination_is_replaced() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("a.jpg");
        let output = temp_dir.path().join("a.1920.webp");
        write_image(&input, &photo(50, 50), CodecFormat::Jpeg, 90);
        fs::write(&output, b"stale output from an earlier run").unwrap();

        let outcome = worker(Config::default()).compress(&input, &output);
        assert!(outcome.is_success());
        assert_eq!(dims(&output), (50, 50));
    }

    #[test]
    fn test_unreadable_image() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("broken.png");
        let output = temp_dir.path().join("broken.1920.webp");
        fs::write(&input, b"not really a png").unwrap();

        let outcome = worker(Config::default()).compress(&input, &output);
        assert!(matches!(
            outcome,
            CompressionOutcome::Failure { kind: FailureKind::UnreadableImage, .. }
        ));
        assert!(!output.exists());
    }

    #[test]
    fn test_missing_source_is_a_failure_not_a_panic() {
        let temp_dir = TempDir::new().unwrap();
        let outcome = worker(Config::default()).compress(
            &temp_dir.path().join("gone.jpg"),
            &temp_dir.path().join("gone.1920.webp"),
        );
        assert!(matches!(outcome, CompressionOutcome::Failure { kind: FailureKind::Other(_), .. }));
    }

    #[test]
    fn test_preserve_originals() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("keep.jpg");
        let output_dir = temp_dir.path().join("compress-1920-webp-85");
        fs::create_dir_all(&output_dir).unwrap();
        let output = output_dir.join("keep.1920.webp");
        write_image(&input, &photo(40, 40), CodecFormat::Jpeg, 90);
        let original_bytes = fs::read(&input).unwrap();

        let config = Config {
            preserve_originals: true,
            ..Default::default()
        };
        assert!(worker(config).compress(&input, &output).is_success());

        let backup = temp_dir.path().join("originals/keep.jpg");
        assert_eq!(fs::read(&backup).unwrap(), original_bytes);
    }

    #[test]
    fn test_encode_format_selection() {
        let keep = Config {
            output_format: OutputFormat::Original,
            ..Default::default()
        };
        // Detected content wins over a misleading extension
        assert_eq!(
            TaskOptimizer::encode_format(&keep, Path::new("x.jpg"), Some(CodecFormat::Png)).unwrap(),
            CodecFormat::Png
        );
        assert_eq!(
            TaskOptimizer::encode_format(&keep, Path::new("x.TIFF"), None).unwrap(),
            CodecFormat::Tiff
        );

        let to_webp = Config::default();
        assert_eq!(
            TaskOptimizer::encode_format(&to_webp, Path::new("x.png"), Some(CodecFormat::Png)).unwrap(),
            CodecFormat::Webp
        );
    }
}
