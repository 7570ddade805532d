//! Emblem Compositing Pipeline
//!
//! The orchestration layer of the decal engine: owns the layer model, talks
//! to a [`TextureResolver`] for asynchronous texture loads, and drives host
//! renderer surfaces through the [`MeshSurface`] trait. Nothing in here
//! holds global state; hosts own the [`Compositor`] and pass their
//! collaborators into each call.
//!
//! ```
//! use emblem_compose::{BumpBinding, Compositor, LocalResolver, MeshSurface};
//! use emblem_core::{BumpRegistry, FadeSpec, MeshSettings, Rgb};
//! use emblem_gpu::DecalProgram;
//! use indexmap::IndexMap;
//!
//! struct Sink;
//! impl MeshSurface for Sink {
//!     fn set_base_color(&mut self, _: Rgb) {}
//!     fn set_bump(&mut self, _: Option<&BumpBinding>) {}
//!     fn install_decal_program(&mut self, _: &DecalProgram) {}
//!     fn update_decal_uniforms(&mut self, _: &[u8]) {}
//!     fn clear_decal_program(&mut self) {}
//! }
//!
//! let mut settings = IndexMap::new();
//! settings.insert("Front".to_string(), MeshSettings::default());
//! let mut compositor = Compositor::new(settings, BumpRegistry::new());
//!
//! let mut resolver = LocalResolver::new();
//! let mut surfaces: IndexMap<String, Sink> = IndexMap::new();
//! surfaces.insert("Front".to_string(), Sink);
//! compositor.prime_surfaces(&mut surfaces);
//!
//! compositor
//!     .add_fade_decal("Front", FadeSpec::default(), &mut resolver)
//!     .unwrap();
//! compositor.pump(&mut resolver, &mut surfaces);
//! compositor.refresh(&mut surfaces);
//! assert_eq!(compositor.layer("Front").unwrap().renderable_count(), 1);
//! ```

pub mod compositor;
pub mod resolver;
pub mod surface;

use emblem_core::DesignError;
use emblem_raster::RasterError;
use thiserror::Error;

/// Errors from pipeline operations. Nothing here is fatal to the host:
/// callers surface these to the user and the pipeline stays interactive.
#[derive(Error, Debug)]
pub enum ComposeError {
    /// A model operation failed (unknown layer, layer at capacity,
    /// malformed design)
    #[error("design error: {0}")]
    Design(#[from] DesignError),

    /// Rasterization or decoding failed
    #[error("raster error: {0}")]
    Raster(#[from] RasterError),

    /// A texture source had no way to resolve to pixels
    #[error("texture resolution failed: {0}")]
    Resolution(String),

    /// A remote fetch failed
    #[cfg(feature = "network")]
    #[error("network error: {0}")]
    Network(String),
}

pub type Result<T> = std::result::Result<T, ComposeError>;

pub use compositor::{Compositor, LayerPhase};
#[cfg(feature = "network")]
pub use resolver::HttpResolver;
pub use resolver::{
    LocalResolver, OutcomeTarget, RequestPayload, TextureOutcome, TextureRequest, TextureResolver,
};
pub use surface::{BumpBinding, MeshSurface, SurfaceTable};
