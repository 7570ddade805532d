//! Emblem Core Model
//!
//! This crate provides the data model for the Emblem decal compositing
//! engine:
//!
//! - **Colors**: 6-hex-digit RGB parsing, formatting, and per-channel blending
//! - **Decals**: positioned image/text/fade overlays with transform state
//! - **Layers**: printable mesh regions holding an ordered decal stack
//! - **Layer store**: the per-product layer map and decal id allocator
//! - **Materials**: bump profile registry (bump/roughness/metalness)
//! - **Designs**: the JSON save format and its model conversions
//!
//! The model is renderer-agnostic: resolved textures are plain RGBA buffers
//! (`TextureData`) and all GPU concerns live in the `emblem_gpu` crate.
//!
//! # Example
//!
//! ```rust
//! use emblem_core::{Decal, Layer, LayerStore, Rgb, UvBounds};
//!
//! let mut store = LayerStore::new();
//! store.insert(Layer::new("Front", Rgb::WHITE, UvBounds::FULL));
//!
//! let id = store.alloc_decal_id();
//! let layer = store.layer_mut("Front").unwrap();
//! layer.add_decal(Decal::image(id, "https://example.com/logo.png")).unwrap();
//!
//! assert_eq!(layer.decals().len(), 1);
//! // unresolved textures keep the decal out of the render path
//! assert_eq!(layer.renderable_count(), 0);
//! ```

pub mod color;
pub mod decal;
pub mod design;
pub mod error;
pub mod layer;
pub mod material;
pub mod store;
pub mod texture;

pub use color::Rgb;
pub use decal::{
    Decal, DecalId, DecalKind, FadeDirection, FadeSpec, TextSpec, TextureSource, Uv,
};
pub use design::{Design, DecalDesign, FadeDataDesign, LayerDesign, TextDataDesign};
pub use error::{DesignError, Result};
pub use layer::{DirtyState, Layer, UvBounds, MATERIAL_NONE, MAX_DECALS_PER_LAYER};
pub use material::{BumpProfile, BumpRegistry, DEFAULT_METALNESS, DEFAULT_ROUGHNESS};
pub use store::{LayerStore, MeshSettings};
pub use texture::{SharedTexture, TextureData};
