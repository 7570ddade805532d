//! Emblem GPU Backend
//!
//! Runtime-generated WGSL decal shaders and the wgpu plumbing around them:
//!
//! - **Codegen**: one shader permutation per decal configuration, with the
//!   decal count baked in as the uniform array length and one texture
//!   binding per decal; named injection points for hosts with their own
//!   material templates
//! - **Uniforms**: bytemuck-packed layer blob (base color, UV bounds, one
//!   32-byte element per decal) for the cheap value-edit path
//! - **Programs**: `DecalProgram` bundles source, fragments, uniforms and
//!   textures; `StructuralKey` gives deterministic cache identity
//! - **Device plumbing**: texture upload, bind group layouts, pipeline
//!   assembly for position/normal/uv meshes
//!
//! Program generation is pure (no device needed):
//!
//! ```
//! use emblem_core::{Decal, DecalId, Layer, Rgb, TextureData, UvBounds};
//! use emblem_gpu::DecalProgram;
//! use std::sync::Arc;
//!
//! let mut layer = Layer::new("Front", Rgb::WHITE, UvBounds::FULL);
//! let mut decal = Decal::image(DecalId::new(1), "https://example.com/logo.png");
//! decal.set_texture(Arc::new(TextureData::solid(Rgb::BLACK, 255, 64, 64)));
//! layer.add_decal(decal).unwrap();
//!
//! let program = DecalProgram::generate(&layer).expect("one renderable decal");
//! assert!(program.wgsl.contains("fn fs_main"));
//! assert_eq!(program.textures.len(), 1);
//! ```

pub mod cache;
pub mod pipeline;
pub mod program;
pub mod texture;
pub mod uniforms;
pub mod wgsl;

pub use cache::ProgramCache;
pub use pipeline::{
    layer_bind_group_layout, scene_bind_group_layout, texture_bind_group_layout,
    vertex_buffer_layout, CompiledProgram,
};
pub use program::{DecalProgram, StructuralKey};
pub use texture::{create_decal_sampler, GpuTexture};
pub use uniforms::{pack_layer_uniforms, DecalInstanceRaw, LayerParamsRaw};
pub use wgsl::{DecalCodegen, InjectionPoint, ShaderFragment};
