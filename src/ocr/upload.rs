use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info};

use super::error::OcrError;

/// Images above this size are downscaled before upload.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Longest side of a downscaled image.
const MAX_DIMENSION: u32 = 1600;

const JPEG_QUALITY: u8 = 80;

/// Base64 payloads shorter than this cannot hold a usable photo.
pub const MIN_BASE64_LEN: usize = 1000;

/// Reads an image file and returns its base64 encoding, ready for the OCR request.
pub fn encode_image_file(path: &Path) -> Result<String, OcrError> {
    let bytes = std::fs::read(path).map_err(|e| {
        OcrError::ImageConversion(format!("Failed to read {}: {}", path.display(), e))
    })?;
    debug!("Image {} is {} KB", path.display(), bytes.len() / 1024);
    let prepared = prepare_bytes(bytes, MAX_UPLOAD_BYTES)?;
    Ok(STANDARD.encode(prepared))
}

/// Checks that the bytes are an image and shrinks it when above `max_bytes`.
///
/// Oversized images are scaled so the longer side is at most 1600 px
/// and re-encoded as JPEG.
pub fn prepare_bytes(bytes: Vec<u8>, max_bytes: usize) -> Result<Vec<u8>, OcrError> {
    let format = image::guess_format(&bytes)
        .map_err(|e| OcrError::ImageConversion(format!("Not an image: {}", e)))?;

    if bytes.len() <= max_bytes {
        return Ok(bytes);
    }

    let img = image::load_from_memory_with_format(&bytes, format)
        .map_err(|e| OcrError::ImageConversion(format!("Failed to decode image: {}", e)))?;
    info!(
        "Image is {} KB ({}x{}), compressing...",
        bytes.len() / 1024,
        img.width(),
        img.height()
    );

    let img = if img.width() > MAX_DIMENSION || img.height() > MAX_DIMENSION {
        img.resize(MAX_DIMENSION, MAX_DIMENSION, FilterType::Triangle)
    } else {
        img
    };
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());

    let mut output = Cursor::new(Vec::new());
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut output, JPEG_QUALITY))
        .map_err(|e| OcrError::ImageConversion(format!("Failed to compress image: {}", e)))?;

    let compressed = output.into_inner();
    info!(
        "Image compressed from {} KB to {} KB ({}x{})",
        bytes.len() / 1024,
        compressed.len() / 1024,
        rgb.width(),
        rgb.height()
    );
    Ok(compressed)
}

/// Wraps raw base64 in a JPEG data URL unless it already is one.
pub fn to_data_url(base64_image: &str) -> String {
    if base64_image.starts_with("data:") {
        base64_image.to_string()
    } else {
        format!("data:image/jpeg;base64,{}", base64_image)
    }
}
