//! The compositing pipeline
//!
//! [`Compositor`] owns the layer model and drives it onto host surfaces.
//! Hosts call it in a fixed rhythm:
//!
//! 1. construct from mesh settings, then [`prime_surfaces`](Compositor::prime_surfaces)
//!    once so every region shows its initial color
//! 2. mutate (apply a design, add/move/edit decals, change colors and
//!    materials) — mutations submit texture loads but never touch surfaces
//! 3. [`pump`](Compositor::pump) each frame tick to absorb finished texture
//!    loads, and [`refresh`](Compositor::refresh) to flush dirty layers
//!    (uniform update for value edits, program regeneration for structural
//!    ones)
//!
//! Every layer moves through `Empty → Populating → Rendered` when a design
//! is applied, and `Rendered` waits for all of that layer's textures:
//! resolutions that fail are logged and their decals excluded, but the layer
//! still renders. A layer's epoch increments on apply/clear; texture
//! completions from an older epoch are discarded wholesale, and a completion
//! for a decal that was deleted mid-load is discarded individually.

use crate::resolver::{OutcomeTarget, TextureOutcome, TextureRequest, TextureResolver};
use crate::surface::{BumpBinding, SurfaceTable};
use crate::Result;
use emblem_core::{
    BumpRegistry, Decal, DecalId, Design, DesignError, FadeSpec, Layer, LayerStore, MeshSettings,
    Rgb, SharedTexture, TextSpec, TextureData, MATERIAL_NONE,
};
use emblem_gpu::{pack_layer_uniforms, DecalProgram};
use emblem_raster::render_layer_preview;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

/// Where a layer stands in the apply pipeline
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayerPhase {
    /// Cleared, nothing driven onto the surface yet
    Empty,
    /// Waiting on texture resolutions before rendering
    Populating,
    /// Fully flushed to its surface
    Rendered,
}

/// Per-layer pipeline bookkeeping, separate from the model itself
#[derive(Clone, Debug)]
struct LayerRuntime {
    phase: LayerPhase,
    /// Bumped on every apply/clear; outcomes carrying an older epoch are
    /// stale
    epoch: u64,
    /// Decal resolutions still in flight
    pending: usize,
}

impl Default for LayerRuntime {
    fn default() -> Self {
        Self {
            phase: LayerPhase::Empty,
            epoch: 1,
            pending: 0,
        }
    }
}

/// The pipeline: layer model, per-region permissions, bump registry, and
/// the state machine that drives surfaces
pub struct Compositor {
    store: LayerStore,
    settings: IndexMap<String, MeshSettings>,
    bumps: BumpRegistry,
    runtime: FxHashMap<String, LayerRuntime>,
    selected: Option<DecalId>,
}

impl Compositor {
    /// One layer per mesh region, in region order
    pub fn new(settings: IndexMap<String, MeshSettings>, bumps: BumpRegistry) -> Self {
        let store = LayerStore::from_mesh_settings(&settings);
        let runtime = settings
            .keys()
            .map(|name| (name.clone(), LayerRuntime::default()))
            .collect();
        Self {
            store,
            settings,
            bumps,
            runtime,
            selected: None,
        }
    }

    pub fn store(&self) -> &LayerStore {
        &self.store
    }

    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.store.layer(name)
    }

    /// Edit a decal's transform/value fields wherever it lives. The owning
    /// layer is marked value-dirty; the next `refresh` pushes new uniforms.
    pub fn decal_mut(&mut self, id: DecalId) -> Option<&mut Decal> {
        let name = self.store.layer_of_decal(id)?.to_string();
        self.store.layer_mut(&name)?.decal_mut(id)
    }

    pub fn phase(&self, name: &str) -> Option<LayerPhase> {
        self.runtime.get(name).map(|state| state.phase)
    }

    /// Decal resolutions still in flight for a layer
    pub fn pending(&self, name: &str) -> usize {
        self.runtime.get(name).map_or(0, |state| state.pending)
    }

    pub fn region_settings(&self, name: &str) -> Option<&MeshSettings> {
        self.settings.get(name)
    }

    pub fn bumps(&self) -> &BumpRegistry {
        &self.bumps
    }

    pub fn bumps_mut(&mut self) -> &mut BumpRegistry {
        &mut self.bumps
    }

    // --- selection ---------------------------------------------------

    pub fn selected_decal(&self) -> Option<DecalId> {
        self.selected
    }

    /// Select a decal; returns false when no layer holds it
    pub fn select_decal(&mut self, id: DecalId) -> bool {
        if self.store.layer_of_decal(id).is_some() {
            self.selected = Some(id);
            true
        } else {
            false
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    // --- startup ------------------------------------------------------

    /// Drive every layer onto its surface in its initial state: base color
    /// pushed, no decal program, phase `Rendered`. Call once after the host
    /// has built its surfaces.
    pub fn prime_surfaces(&mut self, surfaces: &mut dyn SurfaceTable) {
        for name in self.layer_names() {
            self.finalize_layer(&name, surfaces);
        }
    }

    /// Apply the product's starting material to every region that allows
    /// bump changes. Textures arrive through `pump` like any other load.
    pub fn set_initial_material(&mut self, key: &str, resolver: &mut dyn TextureResolver) {
        for name in self.layer_names() {
            let allowed = self
                .settings
                .get(&name)
                .map_or(true, |s| s.can_change_bumpmap);
            if !allowed {
                continue;
            }
            if let Some(layer) = self.store.layer_mut(&name) {
                layer.set_material_key(key);
            }
            if let Some(profile) = self.bumps.resolve(key) {
                let epoch = self.epoch_of(&name);
                resolver.submit(TextureRequest::bump(name, epoch, profile.link.clone()));
            }
        }
    }

    // --- design lifecycle --------------------------------------------

    /// Replace the whole customization with a saved design.
    ///
    /// Every layer restarts under a new epoch: decals cleared, color and
    /// material back to initial, in-flight loads orphaned. Mentioned layers
    /// then rebuild their decal stacks (saved array order is paint order)
    /// and go `Populating` until the submitted loads drain through `pump`;
    /// unknown layer names, malformed decals and bad colors are skipped with
    /// a warning. Layers with nothing in flight render before this returns.
    pub fn apply_design(
        &mut self,
        design: &Design,
        resolver: &mut dyn TextureResolver,
        surfaces: &mut dyn SurfaceTable,
    ) {
        debug!(layers = design.layers.len(), "applying design");
        let names = self.layer_names();

        for name in &names {
            self.reset_layer(name, surfaces);
        }
        self.selected = None;

        for (name, layer_design) in &design.layers {
            if self.store.layer(name).is_none() {
                warn!(layer = %name, "design references an unknown layer; skipping it");
                continue;
            }

            // ids come from the store allocator, so build the stack before
            // borrowing the layer
            let mut decals = Vec::with_capacity(layer_design.decals.len());
            for decal_design in &layer_design.decals {
                let id = self.store.alloc_decal_id();
                match decal_design.clone().into_decal(id) {
                    Ok(decal) => decals.push(decal),
                    Err(err) => warn!(layer = %name, error = %err, "skipping malformed decal"),
                }
            }

            let epoch = self.epoch_of(name);
            let mut submitted = 0usize;
            if let Some(layer) = self.store.layer_mut(name) {
                if let Some(hex) = &layer_design.color {
                    if let Err(err) = layer.set_color_hex(hex) {
                        warn!(layer = %name, error = %err, "keeping initial color");
                    }
                }
                for decal in decals {
                    let id = decal.id();
                    let source = decal.source.clone();
                    if let Err(err) = layer.push_decal(decal) {
                        warn!(layer = %name, error = %err, "dropping decals past the layer capacity");
                        break;
                    }
                    resolver.submit(TextureRequest::decal(name.clone(), epoch, id, source));
                    submitted += 1;
                }
            }
            if let Some(state) = self.runtime.get_mut(name.as_str()) {
                state.pending = submitted;
                if submitted > 0 {
                    state.phase = LayerPhase::Populating;
                }
            }
        }

        // layers with nothing in flight (unmentioned, empty, or fully
        // malformed) render immediately
        for name in &names {
            if self.pending(name) == 0 {
                self.finalize_layer(name, surfaces);
            }
        }
    }

    /// Parse and apply a design document (camelCase JSON)
    pub fn apply_design_json(
        &mut self,
        json: &str,
        resolver: &mut dyn TextureResolver,
        surfaces: &mut dyn SurfaceTable,
    ) -> Result<()> {
        let design = Design::from_json(json)?;
        self.apply_design(&design, resolver, surfaces);
        Ok(())
    }

    /// Reset every layer to its initial color, material `none`, and no
    /// decals, rendering each immediately
    pub fn clear_design(&mut self, surfaces: &mut dyn SurfaceTable) {
        debug!("clearing design");
        for name in self.layer_names() {
            self.reset_layer(&name, surfaces);
            self.finalize_layer(&name, surfaces);
        }
        self.selected = None;
    }

    /// Snapshot the whole customization as a saveable design
    pub fn snapshot(&self) -> Design {
        Design::from_store(&self.store)
    }

    /// CPU-composited flat image of one layer, for thumbnails
    pub fn preview(&self, layer: &str, size: u32) -> Option<TextureData> {
        self.store.layer(layer).map(|l| render_layer_preview(l, size))
    }

    // --- frame tick ---------------------------------------------------

    /// Absorb finished texture loads. Returns how many outcomes were
    /// drained. Layers whose last pending decal load just finished are
    /// rendered onto their surfaces.
    pub fn pump(&mut self, resolver: &mut dyn TextureResolver, surfaces: &mut dyn SurfaceTable) -> usize {
        let outcomes = resolver.drain();
        let count = outcomes.len();
        for outcome in outcomes {
            self.absorb(outcome, surfaces);
        }
        count
    }

    /// Flush dirty layers to their surfaces: structural changes regenerate
    /// and reinstall the decal program, value changes push fresh uniforms.
    /// Regeneration happens in layer order, one layer at a time; nothing is
    /// debounced.
    pub fn refresh(&mut self, surfaces: &mut dyn SurfaceTable) {
        for name in self.layer_names() {
            if self.phase(&name) != Some(LayerPhase::Rendered) {
                continue;
            }
            let Some(layer) = self.store.layer_mut(&name) else {
                continue;
            };
            let dirty = layer.take_dirty();
            if !dirty.any() {
                continue;
            }
            if dirty.structural {
                debug!(layer = %name, "structural change; regenerating decal program");
                self.finalize_layer(&name, surfaces);
            } else if let Some(layer) = self.store.layer(&name) {
                if let Some(surface) = surfaces.surface_mut(&name) {
                    surface.set_base_color(layer.color());
                    if layer.renderable_count() > 0 {
                        surface.update_decal_uniforms(&pack_layer_uniforms(layer));
                    }
                }
            }
        }
    }

    // --- decal operations --------------------------------------------

    /// Add an image decal at the default placement; its texture resolves
    /// through the resolver. Returns `None` when the region refuses decals.
    pub fn add_image_decal(
        &mut self,
        layer: &str,
        url: impl Into<String>,
        resolver: &mut dyn TextureResolver,
    ) -> Result<Option<DecalId>> {
        let url = url.into();
        self.add_decal_gated(layer, resolver, |id| Decal::image(id, url))
    }

    /// Add a full-layer pattern image decal
    pub fn add_pattern_decal(
        &mut self,
        layer: &str,
        url: impl Into<String>,
        resolver: &mut dyn TextureResolver,
    ) -> Result<Option<DecalId>> {
        let url = url.into();
        self.add_decal_gated(layer, resolver, |id| Decal::pattern(id, url))
    }

    pub fn add_text_decal(
        &mut self,
        layer: &str,
        spec: TextSpec,
        resolver: &mut dyn TextureResolver,
    ) -> Result<Option<DecalId>> {
        self.add_decal_gated(layer, resolver, |id| Decal::text(id, spec))
    }

    /// Add a fade decal; it inserts at the head of the paint order so it
    /// washes beneath existing decals
    pub fn add_fade_decal(
        &mut self,
        layer: &str,
        spec: FadeSpec,
        resolver: &mut dyn TextureResolver,
    ) -> Result<Option<DecalId>> {
        self.add_decal_gated(layer, resolver, |id| Decal::fade(id, spec))
    }

    /// Remove a decal; absent ids are a no-op. Clears the selection when it
    /// pointed at the removed decal.
    pub fn remove_decal(&mut self, layer: &str, id: DecalId) -> Result<()> {
        let removed = self.store.layer_mut_checked(layer)?.remove_decal(id);
        if removed.is_some() {
            if self.selected == Some(id) {
                self.selected = None;
            }
            debug!(layer, decal = ?id, "decal removed");
        }
        Ok(())
    }

    /// Move a decal to another layer, keeping its id, appending at the
    /// target's tail. All-or-nothing: a full target leaves both layers
    /// unchanged.
    pub fn move_decal(
        &mut self,
        source: &str,
        id: DecalId,
        target: &str,
        resolver: &mut dyn TextureResolver,
    ) -> Result<()> {
        if !self.allows_images(target) {
            warn!(layer = target, "region does not accept decals; ignoring move");
            return Ok(());
        }
        self.store.move_decal(source, id, target)?;
        if self.selected == Some(id) {
            self.selected = None;
        }
        // a load in flight for the old layer will be discarded there
        self.resubmit_if_unresolved(target, id, resolver);
        Ok(())
    }

    /// Copy a decal onto a target layer under a fresh id; the resolved
    /// texture is shared, transforms are independent
    pub fn copy_decal(
        &mut self,
        source: &str,
        id: DecalId,
        target: &str,
        resolver: &mut dyn TextureResolver,
    ) -> Result<Option<DecalId>> {
        if !self.allows_images(target) {
            warn!(layer = target, "region does not accept decals; ignoring copy");
            return Ok(None);
        }
        let new_id = self.store.copy_decal(source, id, target)?;
        self.resubmit_if_unresolved(target, new_id, resolver);
        debug!(layer = target, decal = ?new_id, "decal copied");
        Ok(Some(new_id))
    }

    /// Copy a decal onto every other layer. Regions that refuse decals and
    /// layers already at capacity are skipped.
    pub fn copy_decal_to_all(
        &mut self,
        source: &str,
        id: DecalId,
        resolver: &mut dyn TextureResolver,
    ) -> Result<Vec<(String, DecalId)>> {
        let targets: Vec<String> = self
            .store
            .names()
            .filter(|name| *name != source)
            .map(str::to_string)
            .collect();

        let mut copies = Vec::new();
        for target in targets {
            if !self.allows_images(&target) {
                debug!(layer = %target, "region does not accept decals; skipping copy");
                continue;
            }
            match self.store.copy_decal(source, id, &target) {
                Ok(new_id) => {
                    self.resubmit_if_unresolved(&target, new_id, resolver);
                    copies.push((target, new_id));
                }
                Err(DesignError::CapacityExceeded { layer, limit }) => {
                    warn!("skipping copy to full layer '{layer}' ({limit} decals)");
                }
                Err(err) => return Err(err.into()),
            }
        }
        Ok(copies)
    }

    // --- color operations --------------------------------------------

    /// Set a layer's base color from hex. A malformed string keeps the
    /// last-known-good color; a locked region ignores the change.
    pub fn set_layer_color(&mut self, layer_name: &str, hex: &str) -> Result<()> {
        if !self.allows_color(layer_name) {
            warn!(layer = layer_name, "color changes are disabled for this region");
            return Ok(());
        }
        let layer = self.store.layer_mut_checked(layer_name)?;
        if let Err(err) = layer.set_color_hex(hex) {
            warn!(layer = layer_name, error = %err, "keeping last-known-good color");
        }
        Ok(())
    }

    /// Copy one layer's base color onto another
    pub fn copy_color(&mut self, source: &str, target: &str) -> Result<()> {
        let color = self.layer_color_checked(source)?;
        if !self.allows_color(target) {
            warn!(layer = target, "color changes are disabled for this region");
            return Ok(());
        }
        self.store.layer_mut_checked(target)?.set_color(color);
        Ok(())
    }

    /// Copy one layer's base color onto every other layer that allows color
    /// changes
    pub fn copy_color_to_all(&mut self, source: &str) -> Result<()> {
        let color = self.layer_color_checked(source)?;
        let targets: Vec<String> = self
            .store
            .names()
            .filter(|name| *name != source)
            .map(str::to_string)
            .collect();
        for target in targets {
            if !self.allows_color(&target) {
                debug!(layer = %target, "color changes are disabled; skipping");
                continue;
            }
            if let Some(layer) = self.store.layer_mut(&target) {
                layer.set_color(color);
            }
        }
        Ok(())
    }

    // --- materials ----------------------------------------------------

    /// Set a layer's bump material, fanning out to its linked regions. The
    /// key `"none"` (or any unknown key) restores flat shading immediately;
    /// real profiles bind once their texture arrives through `pump`.
    pub fn set_layer_material(
        &mut self,
        layer_name: &str,
        key: &str,
        resolver: &mut dyn TextureResolver,
        surfaces: &mut dyn SurfaceTable,
    ) -> Result<()> {
        if !self.allows_bumpmap(layer_name) {
            warn!(layer = layer_name, "bump changes are disabled for this region");
            return Ok(());
        }
        if self.store.layer(layer_name).is_none() {
            return Err(DesignError::LayerNotFound(layer_name.to_string()).into());
        }

        let mut targets = vec![layer_name.to_string()];
        if let Some(settings) = self.settings.get(layer_name) {
            for linked in &settings.linked_bumpmaps {
                if !targets.contains(linked) {
                    targets.push(linked.clone());
                }
            }
        }
        for target in targets {
            self.apply_material(&target, key, resolver, surfaces);
        }
        Ok(())
    }

    fn apply_material(
        &mut self,
        name: &str,
        key: &str,
        resolver: &mut dyn TextureResolver,
        surfaces: &mut dyn SurfaceTable,
    ) {
        let Some(layer) = self.store.layer_mut(name) else {
            warn!(layer = name, "linked bumpmap names an unknown layer");
            return;
        };
        layer.set_material_key(key);
        match self.bumps.resolve(key) {
            Some(profile) => {
                let epoch = self.epoch_of(name);
                resolver.submit(TextureRequest::bump(name, epoch, profile.link.clone()));
            }
            None => {
                if let Some(surface) = surfaces.surface_mut(name) {
                    surface.set_bump(None);
                }
            }
        }
        debug!(layer = name, material = key, "material set");
    }

    // --- internals ----------------------------------------------------

    fn layer_names(&self) -> Vec<String> {
        self.store.names().map(str::to_string).collect()
    }

    fn epoch_of(&self, name: &str) -> u64 {
        self.runtime.get(name).map_or(1, |state| state.epoch)
    }

    fn initial_color(&self, name: &str) -> Rgb {
        self.settings
            .get(name)
            .map_or(Rgb::WHITE, |s| s.initial_color)
    }

    fn allows_images(&self, name: &str) -> bool {
        self.settings.get(name).map_or(true, |s| s.can_add_images)
    }

    fn allows_color(&self, name: &str) -> bool {
        self.settings.get(name).map_or(true, |s| s.can_change_color)
    }

    fn allows_bumpmap(&self, name: &str) -> bool {
        self.settings.get(name).map_or(true, |s| s.can_change_bumpmap)
    }

    fn layer_color_checked(&self, name: &str) -> Result<Rgb> {
        self.store
            .layer(name)
            .map(|layer| layer.color())
            .ok_or_else(|| DesignError::LayerNotFound(name.to_string()).into())
    }

    /// Back to initial state under a new epoch; in-flight loads for the old
    /// epoch become stale
    fn reset_layer(&mut self, name: &str, surfaces: &mut dyn SurfaceTable) {
        let initial = self.initial_color(name);
        if let Some(state) = self.runtime.get_mut(name) {
            state.epoch += 1;
            state.pending = 0;
            state.phase = LayerPhase::Empty;
        }
        if let Some(layer) = self.store.layer_mut(name) {
            layer.clear_decals();
            layer.set_color(initial);
            layer.set_material_key(MATERIAL_NONE);
        }
        if let Some(surface) = surfaces.surface_mut(name) {
            surface.set_bump(None);
        }
    }

    fn add_decal_gated(
        &mut self,
        layer_name: &str,
        resolver: &mut dyn TextureResolver,
        build: impl FnOnce(DecalId) -> Decal,
    ) -> Result<Option<DecalId>> {
        if !self.allows_images(layer_name) {
            warn!(layer = layer_name, "region does not accept decals; ignoring add");
            return Ok(None);
        }
        let decal = build(self.store.alloc_decal_id());
        let id = decal.id();
        let source = decal.source.clone();
        let unresolved = !decal.has_renderable_texture();
        self.store.layer_mut_checked(layer_name)?.add_decal(decal)?;
        if unresolved {
            let epoch = self.epoch_of(layer_name);
            resolver.submit(TextureRequest::decal(layer_name, epoch, id, source));
            if let Some(state) = self.runtime.get_mut(layer_name) {
                state.pending += 1;
            }
        }
        debug!(layer = layer_name, decal = ?id, "decal added");
        Ok(Some(id))
    }

    fn resubmit_if_unresolved(
        &mut self,
        layer_name: &str,
        id: DecalId,
        resolver: &mut dyn TextureResolver,
    ) {
        let Some(decal) = self.store.layer(layer_name).and_then(|l| l.decal(id)) else {
            return;
        };
        if decal.has_renderable_texture() {
            return;
        }
        let source = decal.source.clone();
        let epoch = self.epoch_of(layer_name);
        resolver.submit(TextureRequest::decal(layer_name, epoch, id, source));
        if let Some(state) = self.runtime.get_mut(layer_name) {
            state.pending += 1;
        }
    }

    fn absorb(&mut self, outcome: TextureOutcome, surfaces: &mut dyn SurfaceTable) {
        let TextureOutcome {
            layer: name,
            epoch,
            target,
            result,
        } = outcome;

        let Some(state) = self.runtime.get_mut(&name) else {
            warn!(layer = %name, "texture outcome for an unknown layer");
            return;
        };
        if epoch != state.epoch {
            debug!(layer = %name, "discarding texture outcome from a superseded epoch");
            return;
        }

        match target {
            OutcomeTarget::Decal(id) => {
                state.pending = state.pending.saturating_sub(1);
                let finalize = state.pending == 0 && state.phase == LayerPhase::Populating;

                if let Some(layer) = self.store.layer_mut(&name) {
                    if !layer.contains_decal(id) {
                        debug!(layer = %name, decal = ?id, "decal removed while its texture was loading");
                    } else {
                        match result {
                            Ok(texture) => {
                                if let Some(decal) = layer.decal_mut(id) {
                                    decal.set_texture(texture);
                                }
                                // a newly renderable decal changes the
                                // shader's texture count
                                layer.mark_structural();
                            }
                            Err(err) => {
                                warn!(layer = %name, decal = ?id, error = %err, "texture resolution failed; decal will not render");
                            }
                        }
                    }
                }
                if finalize {
                    self.finalize_layer(&name, surfaces);
                }
            }
            OutcomeTarget::Bump { url } => match result {
                Ok(texture) => self.bind_bump(&name, &url, texture, surfaces),
                Err(err) => {
                    warn!(layer = %name, url = %url, error = %err, "bump texture failed to load");
                }
            },
        }
    }

    /// Bind a bump texture, unless the layer's material changed while it
    /// was loading
    fn bind_bump(
        &mut self,
        name: &str,
        url: &str,
        texture: SharedTexture,
        surfaces: &mut dyn SurfaceTable,
    ) {
        let Some(layer) = self.store.layer(name) else {
            return;
        };
        match self.bumps.resolve(layer.material_key()) {
            Some(profile) if profile.link == url => {
                let binding = BumpBinding::from_profile(profile, texture);
                if let Some(surface) = surfaces.surface_mut(name) {
                    surface.set_bump(Some(&binding));
                }
                debug!(layer = name, "bump material bound");
            }
            _ => debug!(layer = name, "bump texture superseded by a newer material; discarding"),
        }
    }

    /// Push a layer's final state onto its surface: base color plus either
    /// a freshly generated decal program or the default material
    fn finalize_layer(&mut self, name: &str, surfaces: &mut dyn SurfaceTable) {
        let Some(layer) = self.store.layer_mut(name) else {
            return;
        };
        layer.take_dirty();
        let color = layer.color();
        let program = DecalProgram::generate(layer);

        match surfaces.surface_mut(name) {
            Some(surface) => {
                surface.set_base_color(color);
                match &program {
                    Some(program) => surface.install_decal_program(program),
                    None => surface.clear_decal_program(),
                }
            }
            None => warn!(layer = name, "no surface registered for layer"),
        }

        if let Some(state) = self.runtime.get_mut(name) {
            state.phase = LayerPhase::Rendered;
        }
        debug!(
            layer = name,
            decals = program.as_ref().map_or(0, |p| p.decal_count()),
            "layer rendered"
        );
    }
}
