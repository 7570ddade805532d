//! Decal model
//!
//! A decal is a positioned overlay on a layer's surface: an uploaded image,
//! a rasterized text run, or a rasterized fade gradient. The model carries
//! the texture *source* (what to resolve) separately from the resolved
//! texture (what to sample); a decal whose texture has not resolved yet is
//! kept in the model but excluded from rendering.

use crate::color::Rgb;
use crate::texture::SharedTexture;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque decal identifier, allocated by the owning [`LayerStore`](crate::LayerStore)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DecalId(u64);

impl DecalId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DecalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Normalized UV-space pair, used for both positions and sizes
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Uv {
    pub x: f32,
    pub y: f32,
}

impl Uv {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis a fade gradient runs along
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FadeDirection {
    #[default]
    Vertical,
    Horizontal,
}

/// Texture source payload for a text decal
#[derive(Clone, Debug, PartialEq)]
pub struct TextSpec {
    pub text: String,
    /// Font family name, resolved against the host's font library
    pub font: String,
    pub color: Rgb,
    /// Extra advance between glyphs, in raster pixels
    pub letter_spacing: f32,
    /// Outline half-width; the stroke is drawn at twice this width, under the fill
    pub border_width: f32,
    pub border_color: Rgb,
}

impl Default for TextSpec {
    fn default() -> Self {
        Self {
            text: "Sample Text".to_string(),
            font: "Arial".to_string(),
            color: Rgb::BLACK,
            letter_spacing: 0.0,
            border_width: 0.0,
            border_color: Rgb::WHITE,
        }
    }
}

/// Texture source payload for a fade (gradient) decal
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FadeSpec {
    pub base_color: Rgb,
    pub blend_color: Rgb,
    /// Normalized offset where the hold ends and the fade begins
    pub fade_start: f32,
    /// How far the far end fades toward `blend_color`
    pub mix_ratio: f32,
    pub direction: FadeDirection,
}

impl Default for FadeSpec {
    fn default() -> Self {
        Self {
            base_color: Rgb::BLACK,
            blend_color: Rgb::WHITE,
            fade_start: 0.4,
            mix_ratio: 0.5,
            direction: FadeDirection::Vertical,
        }
    }
}

impl FadeSpec {
    /// The far-end color: `base_color` blended toward `blend_color` by `mix_ratio`
    pub fn blended_color(&self) -> Rgb {
        self.base_color.blend(self.blend_color, self.mix_ratio)
    }
}

/// What a decal's texture is resolved from
#[derive(Clone, Debug, PartialEq)]
pub enum TextureSource {
    /// Remote or host-supplied image, fetched and decoded
    Image { url: String },
    /// Text run rasterized by the host's font library
    Text(TextSpec),
    /// Procedural hold-then-fade gradient
    Fade(FadeSpec),
}

/// Decal variant tag; the per-layer shader cache keys on these
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecalKind {
    Image,
    Text,
    Fade,
}

impl TextureSource {
    pub fn kind(&self) -> DecalKind {
        match self {
            TextureSource::Image { .. } => DecalKind::Image,
            TextureSource::Text(_) => DecalKind::Text,
            TextureSource::Fade(_) => DecalKind::Fade,
        }
    }
}

/// A positioned, transformed overlay on one layer
#[derive(Clone, Debug)]
pub struct Decal {
    id: DecalId,
    pub name: String,
    pub source: TextureSource,
    /// UV coordinate of the decal's center
    pub position: Uv,
    /// Requested size in UV units; see [`Decal::effective_size`]
    pub size: Uv,
    /// Clockwise rotation about `position`, degrees
    pub rotation_degrees: f32,
    pub opacity: f32,
    pub flip_x: bool,
    pub flip_y: bool,
    /// Derive height from the texture's pixel aspect at render time
    pub aspect_locked: bool,
    texture: Option<SharedTexture>,
}

impl Decal {
    /// Create a decal with the shared spawn defaults: centered, unrotated,
    /// opaque, unflipped, aspect-locked
    pub fn new(id: DecalId, name: impl Into<String>, source: TextureSource) -> Self {
        Self {
            id,
            name: name.into(),
            source,
            position: Uv::new(0.5, 0.5),
            size: Uv::new(0.3, 0.3),
            rotation_degrees: 0.0,
            opacity: 1.0,
            flip_x: false,
            flip_y: false,
            aspect_locked: true,
            texture: None,
        }
    }

    /// An image decal at the default placement size
    pub fn image(id: DecalId, url: impl Into<String>) -> Self {
        Self::new(id, "Image", TextureSource::Image { url: url.into() })
    }

    /// A full-layer pattern image (covers the whole printable region)
    pub fn pattern(id: DecalId, url: impl Into<String>) -> Self {
        let mut decal = Self::new(id, "Pattern", TextureSource::Image { url: url.into() });
        decal.size = Uv::new(1.0, 1.0);
        decal.aspect_locked = false;
        decal
    }

    /// A text decal; the decal is named after its content
    pub fn text(id: DecalId, spec: TextSpec) -> Self {
        let name = spec.text.clone();
        let mut decal = Self::new(id, name, TextureSource::Text(spec));
        decal.size = Uv::new(0.4, 0.2);
        decal
    }

    /// A fade decal: oversized, translucent background wash
    pub fn fade(id: DecalId, spec: FadeSpec) -> Self {
        let mut decal = Self::new(id, "Fade", TextureSource::Fade(spec));
        decal.size = Uv::new(1.2, 1.2);
        decal.opacity = 0.7;
        decal.aspect_locked = false;
        decal
    }

    pub fn id(&self) -> DecalId {
        self.id
    }

    pub fn kind(&self) -> DecalKind {
        self.source.kind()
    }

    /// Attach the resolved texture
    pub fn set_texture(&mut self, texture: SharedTexture) {
        self.texture = Some(texture);
    }

    /// Drop the resolved texture (the source changed and must re-resolve)
    pub fn clear_texture(&mut self) {
        self.texture = None;
    }

    pub fn texture(&self) -> Option<&SharedTexture> {
        self.texture.as_ref()
    }

    /// True once the texture payload has finished resolving
    pub fn has_renderable_texture(&self) -> bool {
        self.texture.is_some()
    }

    /// Size actually used for rendering. Aspect-locked decals derive height
    /// from the texture's pixel aspect; without a texture, or with a
    /// zero-width texture, the stored size is used as-is.
    pub fn effective_size(&self) -> Uv {
        if self.aspect_locked {
            if let Some(texture) = &self.texture {
                if texture.width() > 0 {
                    return Uv::new(self.size.x, self.size.x * texture.aspect());
                }
            }
        }
        Uv::new(self.size.x, self.size.y)
    }

    /// Deep clone under a new id. Transform fields are independent copies;
    /// the resolved texture is shared by reference since its content is
    /// identical.
    pub fn duplicate(&self, id: DecalId) -> Decal {
        let mut copy = self.clone();
        copy.id = id;
        copy
    }
}
