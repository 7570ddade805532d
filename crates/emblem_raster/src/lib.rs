//! Emblem Texture Rasterization
//!
//! CPU-side production of every decal texture kind:
//!
//! - **Text**: glyph runs rasterized with swash (letter spacing, centered
//!   layout, stroke-under-fill borders), fonts discovered through fontdb
//! - **Fade gradients**: hold-then-fade linear gradients
//! - **Images**: PNG/JPEG/GIF/WebP/BMP decoding into RGBA buffers, from
//!   raw bytes, files, or base64 data URIs
//! - **Previews**: a CPU renderer that flattens a layer's decal stack with
//!   the same compositing math the generated shader uses, for thumbnails
//!
//! All output is `emblem_core::TextureData` (straight-alpha RGBA8).

pub mod canvas;
pub mod font;
pub mod gradient;
pub mod loader;
pub mod preview;
pub mod text;

use thiserror::Error;

/// Side length of the square raster decal textures are drawn into. Chosen
/// larger than any expected on-screen decal footprint so scaled-up decals
/// stay sharp.
pub const RASTER_SIZE: u32 = 2048;

/// Nominal font size, in raster pixels, for text decals
pub const TEXT_FONT_SIZE: f32 = 200.0;

/// Errors from texture rasterization and decoding
#[derive(Error, Debug)]
pub enum RasterError {
    /// No installed font matched the requested family (or any fallback)
    #[error("no usable font for family '{0}'")]
    FontUnavailable(String),

    /// Font bytes could not be parsed
    #[error("invalid font data")]
    InvalidFontData,

    /// Image bytes could not be decoded
    #[error("image decode failed: {0}")]
    Decode(String),

    /// Filesystem access failed
    #[error("failed to read '{path}': {message}")]
    FileLoad { path: String, message: String },
}

pub type Result<T> = std::result::Result<T, RasterError>;

pub use canvas::Canvas;
pub use font::{FontLibrary, LoadedFont};
pub use gradient::{rasterize_fade, rasterize_fade_sized, sample_fade};
pub use loader::{decode_base64, decode_image, load_image_file};
pub use preview::render_layer_preview;
pub use text::{spaced_run_width, spaced_run_x_positions, TextRasterizer};
