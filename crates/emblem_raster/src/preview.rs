//! CPU layer preview renderer
//!
//! Flattens a layer's decal stack into a single RGBA image using the same
//! per-fragment math the generated decal shader runs on the GPU: rotate the
//! fragment UV about the decal position, map into the decal-local unit
//! square, flip, sample, gate on coverage and the layer's UV bounds, then
//! Porter-Duff "over" scaled by decal opacity. Useful for layer thumbnails
//! and for checking compositing behavior without a GPU device.
//!
//! The preview treats the layer as a front-facing unit quad (UV = pixel
//! center / size), so the shader's front-facing gate is always satisfied.

use emblem_core::{Layer, SharedTexture, TextureData, Uv};

use crate::canvas::Canvas;

/// One decal prepared for per-pixel evaluation, mirroring the per-decal
/// uniform element the shader receives
struct PaintEntry {
    texture: SharedTexture,
    position: Uv,
    size: Uv,
    rotation_cos: f32,
    rotation_sin: f32,
    opacity: f32,
    flip_x: bool,
    flip_y: bool,
}

impl PaintEntry {
    /// Decal-local UV for a fragment UV, after rotation about the decal
    /// position and flips. May fall outside [0,1] (then the decal does not
    /// cover this fragment).
    fn local_uv(&self, u: f32, v: f32) -> (f32, f32) {
        let dx = u - self.position.x;
        let dy = v - self.position.y;
        let rx = dx * self.rotation_cos - dy * self.rotation_sin;
        let ry = dx * self.rotation_sin + dy * self.rotation_cos;
        let mut lx = rx / self.size.x + 0.5;
        let mut ly = ry / self.size.y + 0.5;
        if self.flip_x {
            lx = 1.0 - lx;
        }
        if self.flip_y {
            ly = 1.0 - ly;
        }
        (lx, ly)
    }

    /// Nearest-neighbor sample, normalized to [0,1] per channel
    fn sample(&self, lx: f32, ly: f32) -> [f32; 4] {
        let w = self.texture.width();
        let h = self.texture.height();
        let tx = ((lx * w as f32) as u32).min(w - 1);
        let ty = ((ly * h as f32) as u32).min(h - 1);
        let px = self.texture.pixel(tx, ty);
        [
            px[0] as f32 / 255.0,
            px[1] as f32 / 255.0,
            px[2] as f32 / 255.0,
            px[3] as f32 / 255.0,
        ]
    }
}

/// Composite `src` over `dst` (both straight-alpha), with the source alpha
/// scaled by `opacity`. Matches the shader's blend step exactly, including
/// the fully-transparent cutoff that guards the unpremultiply division.
fn composite_over(dst: [f32; 4], src: [f32; 4], opacity: f32) -> [f32; 4] {
    let src_alpha = src[3] * opacity;
    let final_alpha = dst[3] * (1.0 - src_alpha) + src_alpha;
    if final_alpha < 0.001 {
        return [0.0, 0.0, 0.0, 0.0];
    }
    let mut out = [0.0f32; 4];
    for c in 0..3 {
        out[c] = (src[c] * src_alpha + dst[c] * dst[3] * (1.0 - src_alpha)) / final_alpha;
    }
    out[3] = final_alpha;
    out
}

/// Render a `size`x`size` flattened preview of the layer: base color plus
/// every renderable decal in paint order. Decals without a resolved texture
/// are skipped, exactly as the shader generator excludes them.
pub fn render_layer_preview(layer: &Layer, size: u32) -> TextureData {
    let entries: Vec<PaintEntry> = layer
        .renderable_decals()
        .filter_map(|decal| {
            let radians = decal.rotation_degrees.to_radians();
            Some(PaintEntry {
                texture: decal.texture()?.clone(),
                position: decal.position,
                size: decal.effective_size(),
                rotation_cos: radians.cos(),
                rotation_sin: radians.sin(),
                opacity: decal.opacity,
                flip_x: decal.flip_x,
                flip_y: decal.flip_y,
            })
        })
        .collect();

    let base = layer.color().to_f32_array();
    let bounds = layer.bounds();

    let mut canvas = Canvas::new(size, size);
    let mut row = vec![0u8; size as usize * 4];
    for y in 0..size {
        let v = (y as f32 + 0.5) / size as f32;
        for x in 0..size {
            let u = (x as f32 + 0.5) / size as f32;

            let mut color = base;
            for entry in &entries {
                if !bounds.contains(u, v) {
                    continue;
                }
                let (lx, ly) = entry.local_uv(u, v);
                if !(0.0..=1.0).contains(&lx) || !(0.0..=1.0).contains(&ly) {
                    continue;
                }
                color = composite_over(color, entry.sample(lx, ly), entry.opacity);
            }

            let base_idx = x as usize * 4;
            for c in 0..4 {
                row[base_idx + c] = (color[c] * 255.0).round().clamp(0.0, 255.0) as u8;
            }
        }
        canvas.write_row(y, &row);
    }
    canvas.into_texture()
}
