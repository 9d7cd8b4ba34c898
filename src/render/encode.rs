//! Image decode and encode.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, RgbaImage};

use crate::error::{ImpError, Result};
use crate::types::ImageFormat;

/// Decode a source file into RGBA pixels.
pub fn decode(path: &Path) -> Result<RgbaImage> {
    let image = image::open(path).map_err(|e| ImpError::Image {
        path: path.to_path_buf(),
        message: format!("Failed to load image: {}", e),
    })?;
    Ok(image.to_rgba8())
}

/// Encode an image in memory.
///
/// JPEG has no alpha channel, so the image is flattened to RGB first.
pub fn encode(image: &DynamicImage, format: ImageFormat, path: &Path) -> Result<Vec<u8>> {
    let codec = format.codec().ok_or_else(|| ImpError::Image {
        path: path.to_path_buf(),
        message: "No output format to encode with".to_string(),
    })?;

    let converted;
    let image = match format {
        ImageFormat::Jpeg => {
            converted = DynamicImage::ImageRgb8(image.to_rgb8());
            &converted
        }
        ImageFormat::Gif if !matches!(image, DynamicImage::ImageRgba8(_)) => {
            converted = DynamicImage::ImageRgba8(image.to_rgba8());
            &converted
        }
        _ => image,
    };

    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), codec)
        .map_err(|e| ImpError::Image {
            path: path.to_path_buf(),
            message: format!("Failed to encode {:?}: {}", format, e),
        })?;
    Ok(bytes)
}

/// Write encoded bytes to disk.
pub fn write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes).map_err(|e| ImpError::Io {
        path: path.to_path_buf(),
        message: format!("Failed to write image: {}", e),
    })
}

/// Encode an image straight to `path`, returning the byte count written.
pub fn write_image(image: &DynamicImage, format: ImageFormat, path: &Path) -> Result<u64> {
    let bytes = encode(image, format, path)?;
    write_bytes(path, &bytes)?;
    Ok(bytes.len() as u64)
}
