//! Decoded texture data
//!
//! `TextureData` is the resolved form of every decal texture source: decoded
//! image bytes, a rasterized text run, or a rasterized fade gradient. Pixels
//! are straight-alpha RGBA8, row-major, top-left origin.

use crate::color::Rgb;
use crate::error::{DesignError, Result};
use std::sync::Arc;

/// A resolved texture shared between the model and the renderer
pub type SharedTexture = Arc<TextureData>;

/// Decoded RGBA pixel data ready for GPU upload
#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    /// Raw RGBA pixel data
    pixels: Vec<u8>,
    /// Width in pixels
    width: u32,
    /// Height in pixels
    height: u32,
}

impl TextureData {
    /// Create from raw RGBA pixels, validating the buffer length
    pub fn from_rgba(pixels: Vec<u8>, width: u32, height: u32) -> Result<Self> {
        let expected_len = (width as usize) * (height as usize) * 4;
        if pixels.len() != expected_len {
            return Err(DesignError::Texture(format!(
                "invalid pixel data length: expected {}, got {}",
                expected_len,
                pixels.len()
            )));
        }
        Ok(Self {
            pixels,
            width,
            height,
        })
    }

    /// A solid-color texture
    pub fn solid(color: Rgb, alpha: u8, width: u32, height: u32) -> Self {
        let pixel = color.to_rgba8(alpha);
        let mut pixels = Vec::with_capacity((width as usize) * (height as usize) * 4);
        for _ in 0..(width as usize) * (height as usize) {
            pixels.extend_from_slice(&pixel);
        }
        Self {
            pixels,
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Height over width; 1.0 when the width is zero
    pub fn aspect(&self) -> f32 {
        if self.width == 0 {
            1.0
        } else {
            self.height as f32 / self.width as f32
        }
    }

    /// The RGBA pixel at (x, y); panics out of bounds
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = ((y * self.width + x) * 4) as usize;
        [
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]
    }
}
