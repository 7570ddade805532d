//! Layer store
//!
//! The store owns every layer of the loaded product, in mesh order, and is
//! the only allocator of decal ids. Cross-layer operations (move, copy) live
//! here because they need two layers at once and must not leave either in a
//! half-mutated state.

use crate::color::Rgb;
use crate::decal::{Decal, DecalId};
use crate::error::{DesignError, Result};
use crate::layer::{Layer, UvBounds};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Per-mesh-region settings from the product configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeshSettings {
    /// Starting base color for the region's layer
    #[serde(with = "crate::color::hex")]
    pub initial_color: Rgb,
    /// Whether the region accepts image/text/fade decals at all
    #[serde(default = "default_true")]
    pub can_add_images: bool,
    /// Whether the region's base color may be changed
    #[serde(default = "default_true")]
    pub can_change_color: bool,
    /// Whether the region's bump material may be changed
    #[serde(default = "default_true")]
    pub can_change_bumpmap: bool,
    /// Regions whose bump material follows this one
    #[serde(default)]
    pub linked_bumpmaps: Vec<String>,
    /// Printable UV rectangle
    #[serde(flatten)]
    pub bounds: UvBounds,
}

fn default_true() -> bool {
    true
}

impl Default for MeshSettings {
    fn default() -> Self {
        Self {
            initial_color: Rgb::WHITE,
            can_add_images: true,
            can_change_color: true,
            can_change_bumpmap: true,
            linked_bumpmaps: Vec::new(),
            bounds: UvBounds::FULL,
        }
    }
}

/// All layers of the loaded product, plus the decal id allocator
#[derive(Clone, Debug, Default)]
pub struct LayerStore {
    layers: IndexMap<String, Layer>,
    next_decal_id: u64,
}

impl LayerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build one layer per mesh region, carrying over initial color and
    /// printable bounds. Region order is preserved.
    pub fn from_mesh_settings(settings: &IndexMap<String, MeshSettings>) -> Self {
        let mut store = Self::new();
        for (name, region) in settings {
            store.insert(Layer::new(name.clone(), region.initial_color, region.bounds));
        }
        store
    }

    /// Allocate the next decal id. Ids are monotonic within a store, never
    /// reused, and carry no meaning beyond identity.
    pub fn alloc_decal_id(&mut self) -> DecalId {
        self.next_decal_id += 1;
        DecalId::new(self.next_decal_id)
    }

    pub fn insert(&mut self, layer: Layer) {
        self.layers.insert(layer.name().to_string(), layer);
    }

    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.layers.get(name)
    }

    pub fn layer_mut(&mut self, name: &str) -> Option<&mut Layer> {
        self.layers.get_mut(name)
    }

    /// Like [`layer_mut`](Self::layer_mut) but reports the missing name
    pub fn layer_mut_checked(&mut self, name: &str) -> Result<&mut Layer> {
        self.layers
            .get_mut(name)
            .ok_or_else(|| DesignError::LayerNotFound(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.layers.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Layer> {
        self.layers.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Layer> {
        self.layers.values_mut()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Find which layer holds a decal
    pub fn layer_of_decal(&self, id: DecalId) -> Option<&str> {
        self.layers
            .values()
            .find(|layer| layer.contains_decal(id))
            .map(|layer| layer.name())
    }

    /// Move a decal to another layer, keeping its id. Appends at the
    /// target's tail. On any failure neither layer is changed; moving a
    /// decal onto its own layer is a no-op.
    pub fn move_decal(&mut self, source: &str, id: DecalId, target: &str) -> Result<()> {
        if !self.layers.contains_key(source) {
            return Err(DesignError::LayerNotFound(source.to_string()));
        }
        if !self.layers.contains_key(target) {
            return Err(DesignError::LayerNotFound(target.to_string()));
        }
        if source == target {
            return Ok(());
        }

        // Copy into the target first: a capacity failure then leaves the
        // source untouched, which keeps the operation all-or-nothing.
        let decal = match self.layers.get(source).and_then(|l| l.decal(id)) {
            Some(decal) => decal.clone(),
            None => return Err(DesignError::DecalNotFound(id)),
        };
        if let Some(target_layer) = self.layers.get_mut(target) {
            target_layer.push_decal(decal)?;
        }
        if let Some(source_layer) = self.layers.get_mut(source) {
            source_layer.remove_decal(id);
        }
        Ok(())
    }

    /// Deep-copy a decal onto a target layer under a fresh id. The resolved
    /// texture is shared; transform fields are independent. Copying onto the
    /// decal's own layer duplicates it there.
    pub fn copy_decal(&mut self, source: &str, id: DecalId, target: &str) -> Result<DecalId> {
        if !self.layers.contains_key(target) {
            return Err(DesignError::LayerNotFound(target.to_string()));
        }
        let new_id = self.alloc_decal_id();
        let copy = self
            .layers
            .get(source)
            .ok_or_else(|| DesignError::LayerNotFound(source.to_string()))?
            .decal(id)
            .ok_or(DesignError::DecalNotFound(id))?
            .duplicate(new_id);
        // target existence checked above
        if let Some(target_layer) = self.layers.get_mut(target) {
            target_layer.push_decal(copy)?;
        }
        Ok(new_id)
    }

    /// Copy a decal onto every other layer. Full layers are skipped with a
    /// warning rather than failing the whole fan-out. Returns the copies
    /// that were made.
    pub fn copy_decal_to_all(&mut self, source: &str, id: DecalId) -> Result<Vec<(String, DecalId)>> {
        let targets: Vec<String> = self
            .layers
            .keys()
            .filter(|name| name.as_str() != source)
            .cloned()
            .collect();

        let mut copies = Vec::new();
        for target in targets {
            match self.copy_decal(source, id, &target) {
                Ok(new_id) => copies.push((target, new_id)),
                Err(DesignError::CapacityExceeded { layer, limit }) => {
                    tracing::warn!("skipping copy to full layer '{layer}' ({limit} decals)");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(copies)
    }

    /// Clear every layer's decals
    pub fn clear_all_decals(&mut self) {
        for layer in self.layers.values_mut() {
            layer.clear_decals();
        }
    }
}
