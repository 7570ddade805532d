//! Layer model
//!
//! A layer is one printable mesh region: a base color, an optional bump
//! material key, the UV rectangle decals may appear in, and the ordered
//! decal stack. Decal order is paint order — index 0 composites first
//! (bottom-most).
//!
//! Layers carry explicit dirty flags instead of reactive state: structural
//! edits (add/remove/resolve) require shader regeneration, value edits
//! (position/rotation/opacity/color) only require a uniform refresh. The
//! compositor drains the flags once per frame.

use crate::color::Rgb;
use crate::decal::{Decal, DecalId, DecalKind};
use crate::error::{DesignError, Result};
use serde::{Deserialize, Serialize};

/// Hard cap on decals per layer; the generated shader binds one texture per
/// decal and must stay under the default per-stage sampled texture limit
pub const MAX_DECALS_PER_LAYER: usize = 14;

/// Material key meaning "no bump profile"
pub const MATERIAL_NONE: &str = "none";

/// The UV rectangle of a layer where decals are visible
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UvBounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl UvBounds {
    /// The whole unit square
    pub const FULL: UvBounds = UvBounds {
        min_x: 0.0,
        max_x: 1.0,
        min_y: 0.0,
        max_y: 1.0,
    };

    pub const fn new(min_x: f32, max_x: f32, min_y: f32, max_y: f32) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    /// Inclusive containment test in original (untransformed) UV space
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

impl Default for UvBounds {
    fn default() -> Self {
        UvBounds::FULL
    }
}

/// What kind of re-render a layer needs
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DirtyState {
    /// Decal count/identity changed; shader text must be regenerated
    pub structural: bool,
    /// Only uniform values changed; repack and upload, keep the program
    pub values: bool,
}

impl DirtyState {
    pub fn any(&self) -> bool {
        self.structural || self.values
    }
}

/// One printable mesh region and its decal stack
#[derive(Clone, Debug)]
pub struct Layer {
    name: String,
    color: Rgb,
    material_key: String,
    bounds: UvBounds,
    decals: Vec<Decal>,
    dirty: DirtyState,
}

impl Layer {
    pub fn new(name: impl Into<String>, color: Rgb, bounds: UvBounds) -> Self {
        Self {
            name: name.into(),
            color,
            material_key: MATERIAL_NONE.to_string(),
            bounds,
            decals: Vec::new(),
            dirty: DirtyState::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    /// Set the base color directly
    pub fn set_color(&mut self, color: Rgb) {
        self.color = color;
        self.dirty.values = true;
    }

    /// Parse and set the base color. On a malformed string the layer keeps
    /// its last-known-good color and the error is returned to the caller.
    pub fn set_color_hex(&mut self, hex: &str) -> Result<()> {
        let color = Rgb::from_hex(hex)?;
        self.set_color(color);
        Ok(())
    }

    pub fn material_key(&self) -> &str {
        &self.material_key
    }

    pub fn set_material_key(&mut self, key: impl Into<String>) {
        self.material_key = key.into();
    }

    pub fn bounds(&self) -> UvBounds {
        self.bounds
    }

    pub fn decals(&self) -> &[Decal] {
        &self.decals
    }

    pub fn decal(&self, id: DecalId) -> Option<&Decal> {
        self.decals.iter().find(|d| d.id() == id)
    }

    /// Mutable decal access. Marks the layer value-dirty: the borrow exists
    /// to edit a property, and a spurious uniform refresh is harmless.
    pub fn decal_mut(&mut self, id: DecalId) -> Option<&mut Decal> {
        let decal = self.decals.iter_mut().find(|d| d.id() == id);
        if decal.is_some() {
            self.dirty.values = true;
        }
        decal
    }

    pub fn contains_decal(&self, id: DecalId) -> bool {
        self.decals.iter().any(|d| d.id() == id)
    }

    pub fn is_full(&self) -> bool {
        self.decals.len() >= MAX_DECALS_PER_LAYER
    }

    fn capacity_error(&self) -> DesignError {
        DesignError::CapacityExceeded {
            layer: self.name.clone(),
            limit: MAX_DECALS_PER_LAYER,
        }
    }

    /// Add a decal in user-insertion order: fades go to index 0 so they
    /// composite as a background wash beneath everything already placed;
    /// every other kind appends on top.
    pub fn add_decal(&mut self, decal: Decal) -> Result<()> {
        if self.is_full() {
            return Err(self.capacity_error());
        }
        if decal.kind() == DecalKind::Fade {
            self.decals.insert(0, decal);
        } else {
            self.decals.push(decal);
        }
        self.dirty.structural = true;
        Ok(())
    }

    /// Append a decal exactly at the tail regardless of kind. Used when
    /// restoring saved designs (the saved array already encodes paint
    /// order) and when moving decals between layers.
    pub fn push_decal(&mut self, decal: Decal) -> Result<()> {
        if self.is_full() {
            return Err(self.capacity_error());
        }
        self.decals.push(decal);
        self.dirty.structural = true;
        Ok(())
    }

    /// Remove by id, returning the decal. Absent ids are a no-op.
    pub fn remove_decal(&mut self, id: DecalId) -> Option<Decal> {
        let index = self.decals.iter().position(|d| d.id() == id)?;
        self.dirty.structural = true;
        Some(self.decals.remove(index))
    }

    /// Drop every decal; returns how many were removed
    pub fn clear_decals(&mut self) -> usize {
        let removed = self.decals.len();
        if removed > 0 {
            self.decals.clear();
            self.dirty.structural = true;
        }
        removed
    }

    /// Decals that can actually render (resolved texture), in paint order
    pub fn renderable_decals(&self) -> impl Iterator<Item = &Decal> {
        self.decals.iter().filter(|d| d.has_renderable_texture())
    }

    pub fn renderable_count(&self) -> usize {
        self.renderable_decals().count()
    }

    pub fn dirty(&self) -> DirtyState {
        self.dirty
    }

    pub fn mark_structural(&mut self) {
        self.dirty.structural = true;
    }

    pub fn mark_values(&mut self) {
        self.dirty.values = true;
    }

    /// Read and clear the dirty flags
    pub fn take_dirty(&mut self) -> DirtyState {
        std::mem::take(&mut self.dirty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decal::{FadeSpec, TextureSource};
    use crate::texture::TextureData;
    use std::sync::Arc;

    fn layer() -> Layer {
        Layer::new("Front", Rgb::WHITE, UvBounds::FULL)
    }

    fn image(id: u64) -> Decal {
        Decal::image(DecalId::new(id), "http://example.com/a.png")
    }

    #[test]
    fn test_capacity_cap_rejects_fifteenth() {
        let mut layer = layer();
        for i in 0..MAX_DECALS_PER_LAYER {
            layer.add_decal(image(i as u64)).unwrap();
        }
        assert!(layer.is_full());

        let err = layer.add_decal(image(99)).unwrap_err();
        assert!(matches!(err, DesignError::CapacityExceeded { .. }));
        assert_eq!(layer.decals().len(), MAX_DECALS_PER_LAYER);
    }

    #[test]
    fn test_capacity_cap_at_every_size() {
        for n in 0..MAX_DECALS_PER_LAYER {
            let mut layer = layer();
            for i in 0..n {
                layer.add_decal(image(i as u64)).unwrap();
            }
            assert!(layer.add_decal(image(1000)).is_ok());
            assert_eq!(layer.decals().len(), n + 1);
        }
    }

    #[test]
    fn test_fade_inserts_at_head() {
        let mut layer = layer();
        layer.add_decal(image(1)).unwrap();
        layer.add_decal(image(2)).unwrap();
        layer
            .add_decal(Decal::fade(DecalId::new(3), FadeSpec::default()))
            .unwrap();

        let kinds: Vec<_> = layer.decals().iter().map(|d| d.kind()).collect();
        assert_eq!(
            kinds,
            vec![DecalKind::Fade, DecalKind::Image, DecalKind::Image]
        );
        assert_eq!(layer.decals()[1].id(), DecalId::new(1));
        assert_eq!(layer.decals()[2].id(), DecalId::new(2));
    }

    #[test]
    fn test_push_decal_keeps_saved_order() {
        let mut layer = layer();
        layer.push_decal(image(1)).unwrap();
        layer
            .push_decal(Decal::fade(DecalId::new(2), FadeSpec::default()))
            .unwrap();
        // no head insertion on the restore path
        assert_eq!(layer.decals()[1].id(), DecalId::new(2));
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut layer = layer();
        layer.add_decal(image(1)).unwrap();
        layer.take_dirty();

        assert!(layer.remove_decal(DecalId::new(42)).is_none());
        assert_eq!(layer.decals().len(), 1);
        assert!(!layer.dirty().any());

        assert!(layer.remove_decal(DecalId::new(1)).is_some());
        assert!(layer.decals().is_empty());
        assert!(layer.dirty().structural);
    }

    #[test]
    fn test_renderable_filter_excludes_unresolved() {
        let mut layer = layer();
        layer.add_decal(image(1)).unwrap();
        layer.add_decal(image(2)).unwrap();
        layer
            .decal_mut(DecalId::new(2))
            .unwrap()
            .set_texture(Arc::new(TextureData::solid(Rgb::WHITE, 255, 2, 2)));

        assert_eq!(layer.renderable_count(), 1);
        let renderable: Vec<_> = layer.renderable_decals().map(|d| d.id()).collect();
        assert_eq!(renderable, vec![DecalId::new(2)]);
        // the unresolved decal stays in the model
        assert_eq!(layer.decals().len(), 2);
    }

    #[test]
    fn test_dirty_flags() {
        let mut layer = layer();
        assert!(!layer.dirty().any());

        layer.add_decal(image(1)).unwrap();
        assert!(layer.dirty().structural);

        let taken = layer.take_dirty();
        assert!(taken.structural);
        assert!(!layer.dirty().any());

        layer.set_color(Rgb::BLACK);
        assert!(layer.dirty().values);
        assert!(!layer.dirty().structural);
    }

    #[test]
    fn test_invalid_color_keeps_last_known_good() {
        let mut layer = layer();
        layer.set_color_hex("ff0000").unwrap();
        let err = layer.set_color_hex("zzzzzz").unwrap_err();
        assert!(matches!(err, DesignError::InvalidColor(_)));
        assert_eq!(layer.color(), Rgb::new(255, 0, 0));
    }

    #[test]
    fn test_bounds_contains_is_inclusive() {
        let bounds = UvBounds::new(0.25, 0.75, 0.1, 0.9);
        assert!(bounds.contains(0.25, 0.1));
        assert!(bounds.contains(0.75, 0.9));
        assert!(bounds.contains(0.5, 0.5));
        assert!(!bounds.contains(0.24, 0.5));
        assert!(!bounds.contains(0.5, 0.91));
    }

    #[test]
    fn test_text_source_kind() {
        let decal = Decal::new(
            DecalId::new(1),
            "t",
            TextureSource::Text(Default::default()),
        );
        assert_eq!(decal.kind(), DecalKind::Text);
    }
}
