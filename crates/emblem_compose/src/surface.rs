//! Mesh surface traits
//!
//! The compositor never talks to a renderer directly. Hosts implement
//! [`MeshSurface`] over whatever draws their meshes and hand the compositor a
//! [`SurfaceTable`] on each call that needs one; the compositor owns no
//! renderer state and holds no references between calls.

use emblem_core::{BumpProfile, Rgb, SharedTexture};
use emblem_gpu::DecalProgram;
use indexmap::IndexMap;

/// A resolved bump material ready to bind: the fetched texture plus the
/// scalar channels from its [`BumpProfile`].
#[derive(Clone, Debug)]
pub struct BumpBinding {
    pub texture: SharedTexture,
    /// Bump strength
    pub scale: f32,
    /// Tiling repeat count, both axes
    pub tiling: f32,
    pub roughness: f32,
    pub metalness: f32,
}

impl BumpBinding {
    pub fn from_profile(profile: &BumpProfile, texture: SharedTexture) -> Self {
        Self {
            texture,
            scale: profile.scale,
            tiling: profile.size,
            roughness: profile.roughness,
            metalness: profile.metalness,
        }
    }
}

/// One renderable mesh region, as the compositor sees it.
///
/// Implementations are expected to be cheap to call; the compositor pushes
/// state through this trait on every frame tick that has work to do.
pub trait MeshSurface {
    /// Set the region's base color (the color under all decals, and the
    /// whole surface color when no decal program is installed)
    fn set_base_color(&mut self, color: Rgb);

    /// Bind a bump material, or `None` to restore flat shading defaults
    /// (roughness 1, metalness 0)
    fn set_bump(&mut self, binding: Option<&BumpBinding>);

    /// Install a generated decal program. The host compiles (or fetches from
    /// its [`ProgramCache`](emblem_gpu::ProgramCache) keyed by
    /// `program.key`) and rebinds textures and uniforms.
    fn install_decal_program(&mut self, program: &DecalProgram);

    /// Push a fresh uniform blob to the installed program without
    /// recompiling. Only called while a program is installed.
    fn update_decal_uniforms(&mut self, uniforms: &[u8]);

    /// Remove any installed decal program and fall back to default material
    /// rendering
    fn clear_decal_program(&mut self);
}

/// Lookup from layer name to its surface. Regions without a surface are
/// skipped with a warning, so partially-built hosts degrade instead of
/// failing.
pub trait SurfaceTable {
    fn surface_mut(&mut self, layer: &str) -> Option<&mut dyn MeshSurface>;
}

impl<S: MeshSurface> SurfaceTable for IndexMap<String, S> {
    fn surface_mut(&mut self, layer: &str) -> Option<&mut dyn MeshSurface> {
        self.get_mut(layer).map(|s| s as &mut dyn MeshSurface)
    }
}
