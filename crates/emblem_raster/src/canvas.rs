//! RGBA drawing surface
//!
//! A minimal canvas for building decal rasters: clear to a color, blit
//! tinted alpha masks (glyph coverage) with source-over compositing. Pixels
//! are straight-alpha RGBA8, row-major, top-left origin.

use emblem_core::{Rgb, TextureData};

/// A mutable RGBA pixel buffer
pub struct Canvas {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
}

impl Canvas {
    /// A fully transparent canvas
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: vec![0; (width as usize) * (height as usize) * 4],
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

    /// Fill the whole canvas with an opaque color
    pub fn fill(&mut self, color: Rgb) {
        for pixel in self.pixels.chunks_exact_mut(4) {
            pixel[0] = color.r;
            pixel[1] = color.g;
            pixel[2] = color.b;
            pixel[3] = 255;
        }
    }

    /// Write one row of RGBA pixels; `row` must be `width * 4` bytes
    pub fn write_row(&mut self, y: u32, row: &[u8]) {
        let start = (y as usize) * (self.width as usize) * 4;
        self.pixels[start..start + row.len()].copy_from_slice(row);
    }

    /// Composite an 8-bit coverage mask, tinted with `color`, onto the
    /// canvas with its top-left corner at (`x`, `y`). Coordinates may be
    /// negative or overhang; out-of-bounds texels are clipped.
    pub fn blit_mask(
        &mut self,
        mask: &[u8],
        mask_width: u32,
        mask_height: u32,
        x: i32,
        y: i32,
        color: Rgb,
    ) {
        for my in 0..mask_height as i32 {
            let dy = y + my;
            if dy < 0 || dy >= self.height as i32 {
                continue;
            }
            for mx in 0..mask_width as i32 {
                let dx = x + mx;
                if dx < 0 || dx >= self.width as i32 {
                    continue;
                }
                let coverage = mask[(my as usize) * (mask_width as usize) + mx as usize];
                if coverage == 0 {
                    continue;
                }
                let idx = ((dy as usize) * (self.width as usize) + dx as usize) * 4;
                let src_a = coverage as f32 / 255.0;
                let dst_a = self.pixels[idx + 3] as f32 / 255.0;
                let out_a = src_a + dst_a * (1.0 - src_a);
                if out_a <= 0.0 {
                    continue;
                }
                let blend = |src: u8, dst: u8| -> u8 {
                    let src = src as f32 / 255.0;
                    let dst = dst as f32 / 255.0;
                    let out = (src * src_a + dst * dst_a * (1.0 - src_a)) / out_a;
                    (out * 255.0).round().clamp(0.0, 255.0) as u8
                };
                self.pixels[idx] = blend(color.r, self.pixels[idx]);
                self.pixels[idx + 1] = blend(color.g, self.pixels[idx + 1]);
                self.pixels[idx + 2] = blend(color.b, self.pixels[idx + 2]);
                self.pixels[idx + 3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
            }
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = ((y * self.width + x) * 4) as usize;
        [
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]
    }

    pub fn into_texture(self) -> TextureData {
        TextureData::from_rgba(self.pixels, self.width, self.height)
            .expect("canvas buffer length is width * height * 4")
    }
}
