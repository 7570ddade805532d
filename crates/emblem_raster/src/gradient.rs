//! Fade gradient rasterization
//!
//! A fade decal is a linear gradient that holds its base color up to
//! `fade_start`, then fades toward the base/blend mix over the remainder of
//! the texture. The gradient spans the raster's full extent along the
//! chosen direction.

use crate::canvas::Canvas;
use crate::RASTER_SIZE;
use emblem_core::{FadeDirection, FadeSpec, Rgb, TextureData};

/// Sample the fade at normalized offset `t` along its direction
pub fn sample_fade(spec: &FadeSpec, t: f32) -> Rgb {
    let t = t.clamp(0.0, 1.0);
    if t <= spec.fade_start || spec.fade_start >= 1.0 {
        return spec.base_color;
    }
    let local = (t - spec.fade_start) / (1.0 - spec.fade_start);
    spec.base_color.blend(spec.blended_color(), local)
}

/// Rasterize a fade at the standard decal raster size
pub fn rasterize_fade(spec: &FadeSpec) -> TextureData {
    rasterize_fade_sized(spec, RASTER_SIZE)
}

/// Rasterize a fade into a `size`×`size` opaque texture
pub fn rasterize_fade_sized(spec: &FadeSpec, size: u32) -> TextureData {
    let mut canvas = Canvas::new(size, size);
    let span = size.saturating_sub(1).max(1) as f32;

    match spec.direction {
        FadeDirection::Vertical => {
            let mut row = vec![0u8; (size as usize) * 4];
            for y in 0..size {
                let color = sample_fade(spec, y as f32 / span);
                for pixel in row.chunks_exact_mut(4) {
                    pixel.copy_from_slice(&color.to_rgba8(255));
                }
                canvas.write_row(y, &row);
            }
        }
        FadeDirection::Horizontal => {
            let mut row = vec![0u8; (size as usize) * 4];
            for (x, pixel) in row.chunks_exact_mut(4).enumerate() {
                let color = sample_fade(spec, x as f32 / span);
                pixel.copy_from_slice(&color.to_rgba8(255));
            }
            for y in 0..size {
                canvas.write_row(y, &row);
            }
        }
    }
    canvas.into_texture()
}
