//! Uniform packing for generated decal shaders
//!
//! The packed blob mirrors the generated module's `LayerUniforms` struct:
//! a 32-byte header (base color + UV bounds) followed by one 32-byte
//! element per renderable decal, index-aligned with the texture bindings.
//! 32 is a multiple of the 16-byte stride WGSL requires of uniform array
//! elements, so the Rust layout and the shader layout agree byte-for-byte.

use bytemuck::{Pod, Zeroable};
use emblem_core::{Decal, Layer};

/// Per-decal uniform element (32 bytes)
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct DecalInstanceRaw {
    /// Decal center in surface UV space
    pub position: [f32; 2],
    /// Effective (aspect-resolved) size in UV units
    pub size: [f32; 2],
    /// Radians; the model stores degrees
    pub rotation: f32,
    pub opacity: f32,
    /// Bools as u32 - WGSL uniforms cannot hold bool
    pub flip_x: u32,
    pub flip_y: u32,
}

impl DecalInstanceRaw {
    pub fn from_decal(decal: &Decal) -> Self {
        let size = decal.effective_size();
        Self {
            position: [decal.position.x, decal.position.y],
            size: [size.x, size.y],
            rotation: decal.rotation_degrees.to_radians(),
            opacity: decal.opacity,
            flip_x: decal.flip_x as u32,
            flip_y: decal.flip_y as u32,
        }
    }
}

/// Layer-level uniform header preceding the decal array (32 bytes)
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct LayerParamsRaw {
    pub base_color: [f32; 4],
    /// min_x, max_x, min_y, max_y
    pub bounds: [f32; 4],
}

impl LayerParamsRaw {
    pub fn from_layer(layer: &Layer) -> Self {
        let bounds = layer.bounds();
        Self {
            base_color: layer.color().to_f32_array(),
            bounds: [bounds.min_x, bounds.max_x, bounds.min_y, bounds.max_y],
        }
    }
}

/// Pack the complete uniform blob for a layer: header plus one element per
/// renderable decal, in paint order. Length is `32 + 32 * N`.
pub fn pack_layer_uniforms(layer: &Layer) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(32 + 32 * layer.renderable_count());
    bytes.extend_from_slice(bytemuck::bytes_of(&LayerParamsRaw::from_layer(layer)));
    for decal in layer.renderable_decals() {
        bytes.extend_from_slice(bytemuck::bytes_of(&DecalInstanceRaw::from_decal(decal)));
    }
    bytes
}
