//! Decal program generation
//!
//! A `DecalProgram` is everything a host needs to render one layer's decal
//! stack: the generated WGSL (whole module plus named fragments), the packed
//! uniform blob, and the textures in binding order. Programs are identified
//! by a `StructuralKey` derived from the layer's renderable configuration,
//! so identical configurations reuse compiled artifacts instead of being
//! defeated into recompiling.

use emblem_core::{DecalKind, Layer, SharedTexture, MAX_DECALS_PER_LAYER};
use smallvec::SmallVec;

use crate::uniforms::pack_layer_uniforms;
use crate::wgsl::{DecalCodegen, ShaderFragment};

/// Deterministic identity of a generated program: the kinds of the layer's
/// renderable decals, in paint order. Two layers with the same key can share
/// one compiled module (their differences are uniform values and texture
/// contents, neither of which is baked into the source).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct StructuralKey {
    kinds: SmallVec<[DecalKind; MAX_DECALS_PER_LAYER]>,
}

impl StructuralKey {
    pub fn of_layer(layer: &Layer) -> Self {
        Self {
            kinds: layer.renderable_decals().map(|d| d.kind()).collect(),
        }
    }

    /// Number of decals the generated source is sized for
    pub fn decal_count(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn kinds(&self) -> &[DecalKind] {
        &self.kinds
    }
}

/// Generated shader program for one layer's decal stack
#[derive(Clone, Debug)]
pub struct DecalProgram {
    /// Complete standalone WGSL module
    pub wgsl: String,
    /// The same source as named fragments, for hosts with their own
    /// shader templates
    pub fragments: Vec<ShaderFragment>,
    /// Packed `LayerUniforms` blob (header + per-decal elements)
    pub uniforms: Vec<u8>,
    /// Resolved textures in paint order; index `i` binds at
    /// `@group(2) @binding(i + 1)`
    pub textures: Vec<SharedTexture>,
    pub key: StructuralKey,
}

impl DecalProgram {
    /// Generate the program for a layer, or `None` when the layer has no
    /// renderable decals (the host then restores its default material).
    pub fn generate(layer: &Layer) -> Option<Self> {
        let key = StructuralKey::of_layer(layer);
        if key.is_empty() {
            return None;
        }

        let textures: Vec<SharedTexture> = layer
            .renderable_decals()
            .filter_map(|d| d.texture().cloned())
            .collect();
        let decal_count = key.decal_count();

        tracing::debug!(
            layer = layer.name(),
            decals = decal_count,
            "generating decal program"
        );

        Some(Self {
            wgsl: DecalCodegen::generate_module(decal_count),
            fragments: DecalCodegen::fragments(decal_count),
            uniforms: pack_layer_uniforms(layer),
            textures,
            key,
        })
    }

    pub fn decal_count(&self) -> usize {
        self.key.decal_count()
    }
}
