//! # Sample Image Generator
//!
//! Scrive un piccolo set di immagini sintetiche per provare il compressore:
//! sfondo blu-grigio con un rettangolo bianco e un'ellisse rossa, in varie
//! dimensioni e formati, inclusi due file con nomi non ASCII.

use crate::{
    codec::{CodecFormat, ImageCodec},
    error::CompressError,
};
use image::{DynamicImage, Rgb, RgbImage};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const BACKGROUND: Rgb<u8> = Rgb([73, 109, 137]);
const RECTANGLE: Rgb<u8> = Rgb([255, 255, 255]);
const ELLIPSE: Rgb<u8> = Rgb([255, 0, 0]);

/// One generated file
pub struct SampleSpec {
    pub file_name: &'static str,
    pub width: u32,
    pub height: u32,
    pub format: CodecFormat,
}

pub const SAMPLES: &[SampleSpec] = &[
    SampleSpec { file_name: "test_large.jpg", width: 3000, height: 2000, format: CodecFormat::Jpeg },
    SampleSpec { file_name: "test_medium.jpg", width: 1500, height: 1000, format: CodecFormat::Jpeg },
    SampleSpec { file_name: "test_small.jpg", width: 800, height: 600, format: CodecFormat::Jpeg },
    SampleSpec { file_name: "test_large.png", width: 3000, height: 2000, format: CodecFormat::Png },
    SampleSpec { file_name: "test_medium.png", width: 1500, height: 1000, format: CodecFormat::Png },
    SampleSpec { file_name: "test_large.webp", width: 3000, height: 2000, format: CodecFormat::Webp },
    SampleSpec { file_name: "测试图片.jpg", width: 1200, height: 800, format: CodecFormat::Jpeg },
    SampleSpec { file_name: "テスト画像.png", width: 1200, height: 800, format: CodecFormat::Png },
];

/// Draw the sample picture
pub fn draw_sample(width: u32, height: u32) -> DynamicImage {
    let (w, h) = (width as f64, height as f64);
    let (cx, cy) = (w / 2.0, h / 2.0);
    let (rx, ry) = (w / 6.0, h / 6.0);

    let canvas = RgbImage::from_fn(width, height, |x, y| {
        let (px, py) = (x as f64 + 0.5, y as f64 + 0.5);
        let dx = (px - cx) / rx;
        let dy = (py - cy) / ry;

        if dx * dx + dy * dy <= 1.0 {
            ELLIPSE
        } else if x >= width / 4 && x <= width * 3 / 4 && y >= height / 4 && y <= height * 3 / 4 {
            RECTANGLE
        } else {
            BACKGROUND
        }
    });

    DynamicImage::ImageRgb8(canvas)
}

/// Generate every sample into `dir` and return the written paths
pub fn generate_samples(dir: &Path, codec: &dyn ImageCodec) -> Result<Vec<PathBuf>, CompressError> {
    fs::create_dir_all(dir)?;

    let mut written = Vec::with_capacity(SAMPLES.len());
    for spec in SAMPLES {
        let image = draw_sample(spec.width, spec.height);
        let bytes = codec.encode(&image, spec.format, 95)?;
        let path = dir.join(spec.file_name);
        fs::write(&path, bytes)?;

        info!("Created {} ({}x{})", spec.file_name, spec.width, spec.height);
        written.push(path);
    }

    Ok(written)
}
