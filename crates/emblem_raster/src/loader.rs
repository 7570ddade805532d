//! Image decoding for image decals

use crate::{RasterError, Result};
use base64::Engine;
use emblem_core::TextureData;
use std::path::Path;

/// Decode encoded image bytes (PNG, JPEG, GIF, WebP, BMP) into RGBA texture
/// data
pub fn decode_image(bytes: &[u8]) -> Result<TextureData> {
    let img = image::load_from_memory(bytes).map_err(|e| RasterError::Decode(e.to_string()))?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    TextureData::from_rgba(rgba.into_raw(), width, height)
        .map_err(|e| RasterError::Decode(e.to_string()))
}

/// Decode a base64 payload, with or without a `data:image/...;base64,` prefix
pub fn decode_base64(data: &str) -> Result<TextureData> {
    let payload = if data.starts_with("data:") {
        data.find(";base64,")
            .map(|pos| &data[pos + 8..])
            .ok_or_else(|| RasterError::Decode("data URI without base64 payload".to_string()))?
    } else {
        data
    };

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| RasterError::Decode(e.to_string()))?;
    decode_image(&bytes)
}

/// Read and decode an image file from disk
pub fn load_image_file(path: impl AsRef<Path>) -> Result<TextureData> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| RasterError::FileLoad {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    decode_image(&bytes)
}
