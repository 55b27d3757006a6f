//! # Image Codec Module
//!
//! Confine tra il compressore e la libreria di immagini che fa il lavoro sui pixel.
//!
//! Il compressore usa solo tre operazioni, raccolte nel trait `ImageCodec`:
//! - `decode(bytes)` -> immagine raster (più il formato rilevato)
//! - `resize(image, width, height)` -> immagine raster
//! - `encode(image, format, quality)` -> bytes
//!
//! `StandardCodec` le implementa in-process:
//! - **Decode**: crate `image`, formato rilevato dal contenuto
//! - **Resize**: ricampionamento Lanczos3
//! - **JPEG**: encoder baseline alla qualità richiesta
//! - **PNG**: compressione massima con filtro adattivo (la qualità è ignorata)
//! - **WebP**: encoding lossy `libwebp` tramite il crate `webp`
//! - **BMP / TIFF**: output non compresso a 8 bit

use crate::error::CompressError;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilterType, PngEncoder};
use image::imageops::FilterType;
use image::{ColorType, DynamicImage, ImageEncoder, ImageFormat, ImageOutputFormat};
use std::fmt;
use std::io::Cursor;

/// Canonical formats the codec can write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodecFormat {
    Jpeg,
    Png,
    Webp,
    Bmp,
    Tiff,
}

impl CodecFormat {
    /// Normalize a format name or extension (`jpg` -> `jpeg`, `tif` -> `tiff`)
    pub fn from_alias(name: &str) -> Option<Self> {
        match name.trim().trim_start_matches('.').to_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "webp" => Some(Self::Webp),
            "bmp" => Some(Self::Bmp),
            "tif" | "tiff" => Some(Self::Tiff),
            _ => None,
        }
    }

    pub fn from_image_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Jpeg => Some(Self::Jpeg),
            ImageFormat::Png => Some(Self::Png),
            ImageFormat::WebP => Some(Self::Webp),
            ImageFormat::Bmp => Some(Self::Bmp),
            ImageFormat::Tiff => Some(Self::Tiff),
            _ => None,
        }
    }

    /// Canonical identifier
    pub fn name(self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Webp => "webp",
            Self::Bmp => "bmp",
            Self::Tiff => "tiff",
        }
    }

    /// File extension written for this format
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
            Self::Bmp => "bmp",
            Self::Tiff => "tiff",
        }
    }
}

impl fmt::Display for CodecFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A decoded raster together with the format it was stored in
pub struct DecodedImage {
    pub image: DynamicImage,
    pub format: Option<CodecFormat>,
}

/// Decode / resize / encode operations used by the compression worker
pub trait ImageCodec: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedImage, CompressError>;

    fn resize(&self, image: &DynamicImage, width: u32, height: u32) -> DynamicImage;

    fn encode(
        &self,
        image: &DynamicImage,
        format: CodecFormat,
        quality: u8,
    ) -> Result<Vec<u8>, CompressError>;
}

/// Default codec backed by the `image` and `webp` crates
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardCodec;

impl StandardCodec {
    pub fn new() -> Self {
        Self
    }

    fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>, CompressError> {
        // JPEG has no alpha channel
        let rgb = image.to_rgb8();
        let mut buf = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut buf, quality);
        encoder.encode(rgb.as_raw(), rgb.width(), rgb.height(), ColorType::Rgb8)?;
        Ok(buf)
    }

    fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, CompressError> {
        let mut buf = Vec::new();
        let encoder =
            PngEncoder::new_with_quality(&mut buf, CompressionType::Best, PngFilterType::Adaptive);

        if image.color().has_alpha() {
            let rgba = image.to_rgba8();
            encoder.write_image(rgba.as_raw(), rgba.width(), rgba.height(), ColorType::Rgba8)?;
        } else {
            let rgb = image.to_rgb8();
            encoder.write_image(rgb.as_raw(), rgb.width(), rgb.height(), ColorType::Rgb8)?;
        }
        Ok(buf)
    }

    fn encode_webp(image: &DynamicImage, quality: u8) -> Result<Vec<u8>, CompressError> {
        let (pixels, width, height, has_alpha) = if image.color().has_alpha() {
            let rgba = image.to_rgba8();
            let (width, height) = rgba.dimensions();
            (rgba.into_raw(), width, height, true)
        } else {
            let rgb = image.to_rgb8();
            let (width, height) = rgb.dimensions();
            (rgb.into_raw(), width, height, false)
        };

        let encoder = if has_alpha {
            webp::Encoder::from_rgba(&pixels, width, height)
        } else {
            webp::Encoder::from_rgb(&pixels, width, height)
        };

        let memory = encoder
            .encode_simple(false, f32::from(quality))
            .map_err(|e| CompressError::Encode(format!("WebP encoding failed: {:?}", e)))?;

        Ok(memory.to_vec())
    }

    fn encode_uncompressed(
        image: &DynamicImage,
        format: ImageOutputFormat,
    ) -> Result<Vec<u8>, CompressError> {
        let normalized = if image.color().has_alpha() {
            DynamicImage::ImageRgba8(image.to_rgba8())
        } else {
            DynamicImage::ImageRgb8(image.to_rgb8())
        };

        let mut buf = Vec::new();
        normalized.write_to(&mut Cursor::new(&mut buf), format)?;
        Ok(buf)
    }
}

impl ImageCodec for StandardCodec {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedImage, CompressError> {
        let format = image::guess_format(bytes)
            .ok()
            .and_then(CodecFormat::from_image_format);

        let image = image::load_from_memory(bytes)
            .map_err(|e| CompressError::UnreadableImage(e.to_string()))?;

        Ok(DecodedImage { image, format })
    }

    fn resize(&self, image: &DynamicImage, width: u32, height: u32) -> DynamicImage {
        image.resize_exact(width, height, FilterType::Lanczos3)
    }

    fn encode(
        &self,
        image: &DynamicImage,
        format: CodecFormat,
        quality: u8,
    ) -> Result<Vec<u8>, CompressError> {
        match format {
            CodecFormat::Jpeg => Self::encode_jpeg(image, quality),
            CodecFormat::Png => Self::encode_png(image),
            CodecFormat::Webp => Self::encode_webp(image, quality),
            CodecFormat::Bmp => Self::encode_uncompressed(image, ImageOutputFormat::Bmp),
            CodecFormat::Tiff => Self::encode_uncompressed(image, ImageOutputFormat::Tiff),
        }
    }
}
