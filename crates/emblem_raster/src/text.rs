//! Text decal rasterization
//!
//! Renders a single-line text run into the square decal raster. The run is
//! horizontally centered and vertically middle-aligned; non-zero letter
//! spacing lays glyphs out individually, advancing by glyph advance plus
//! the spacing. Borders draw as a stroke pass (at twice the border width)
//! underneath the fill so the fill stays crisp.
//!
//! The layout math is kept as pure functions over glyph advances so it can
//! be tested without any installed font.

use crate::canvas::Canvas;
use crate::font::LoadedFont;
use crate::{RasterError, Result, RASTER_SIZE, TEXT_FONT_SIZE};
use emblem_core::{Rgb, TextSpec, TextureData};
use swash::scale::{Render, ScaleContext, Source};
use swash::zeno::{Format, Stroke, Style};

/// Total advance width of a run: the unspaced sum plus
/// `letter_spacing * (glyph_count - 1)`
pub fn spaced_run_width(advances: &[f32], letter_spacing: f32) -> f32 {
    if advances.is_empty() {
        return 0.0;
    }
    let naive: f32 = advances.iter().sum();
    naive + letter_spacing * (advances.len() - 1) as f32
}

/// Pen x position (left edge of the advance box) for each glyph of a run
/// centered within `extent`
pub fn spaced_run_x_positions(advances: &[f32], letter_spacing: f32, extent: f32) -> Vec<f32> {
    let total = spaced_run_width(advances, letter_spacing);
    let mut pen = (extent - total) / 2.0;
    advances
        .iter()
        .map(|advance| {
            let x = pen;
            pen += advance + letter_spacing;
            x
        })
        .collect()
}

/// Glyph rasterizer for text decals
pub struct TextRasterizer {
    /// Swash scale context (caches scaling state between runs)
    scale_context: ScaleContext,
}

impl TextRasterizer {
    pub fn new() -> Self {
        Self {
            scale_context: ScaleContext::new(),
        }
    }

    /// Rasterize a text spec at the standard decal raster size
    pub fn rasterize(&mut self, font: &LoadedFont, spec: &TextSpec) -> Result<TextureData> {
        self.rasterize_sized(font, spec, RASTER_SIZE, TEXT_FONT_SIZE)
    }

    /// Rasterize into a `raster_size` square at an explicit font size
    pub fn rasterize_sized(
        &mut self,
        font: &LoadedFont,
        spec: &TextSpec,
        raster_size: u32,
        font_size: f32,
    ) -> Result<TextureData> {
        let swash_font = swash::FontRef::from_index(font.data(), font.index() as usize)
            .ok_or(RasterError::InvalidFontData)?;

        let metrics = swash_font.metrics(&[]);
        let scale = font_size / metrics.units_per_em as f32;
        let glyph_metrics = swash_font.glyph_metrics(&[]);
        let charmap = swash_font.charmap();

        let glyphs: Vec<u16> = spec.text.chars().map(|c| charmap.map(c)).collect();
        let advances: Vec<f32> = glyphs
            .iter()
            .map(|&glyph| glyph_metrics.advance_width(glyph) * scale)
            .collect();

        let pen_xs = spaced_run_x_positions(&advances, spec.letter_spacing, raster_size as f32);
        // canvas "middle" baseline: glyph midline sits on the raster midline
        let ascent = metrics.ascent * scale;
        let descent = metrics.descent * scale;
        let baseline = (raster_size as f32 / 2.0 + (ascent - descent) / 2.0).round() as i32;

        let mut canvas = Canvas::new(raster_size, raster_size);
        let mut scaler = self
            .scale_context
            .builder(swash_font)
            .size(font_size)
            .build();

        if spec.border_width > 0.0 {
            let stroke = Stroke::new(spec.border_width * 2.0);
            for (&glyph, &pen_x) in glyphs.iter().zip(&pen_xs) {
                let image = Render::new(&[Source::Outline])
                    .format(Format::Alpha)
                    .style(Style::Stroke(stroke))
                    .render(&mut scaler, glyph);
                if let Some(image) = image {
                    Self::blit_glyph(&mut canvas, &image, pen_x, baseline, spec.border_color);
                }
            }
        }

        for (&glyph, &pen_x) in glyphs.iter().zip(&pen_xs) {
            let image = Render::new(&[Source::Outline])
                .format(Format::Alpha)
                .render(&mut scaler, glyph);
            if let Some(image) = image {
                Self::blit_glyph(&mut canvas, &image, pen_x, baseline, spec.color);
            }
        }

        Ok(canvas.into_texture())
    }

    fn blit_glyph(
        canvas: &mut Canvas,
        image: &swash::scale::image::Image,
        pen_x: f32,
        baseline: i32,
        color: Rgb,
    ) {
        if image.placement.width == 0 || image.placement.height == 0 {
            return;
        }
        let x = pen_x.round() as i32 + image.placement.left;
        let y = baseline - image.placement.top;
        canvas.blit_mask(
            &image.data,
            image.placement.width,
            image.placement.height,
            x,
            y,
            color,
        );
    }
}

impl Default for TextRasterizer {
    fn default() -> Self {
        Self::new()
    }
}
