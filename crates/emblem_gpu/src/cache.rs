//! Compiled program cache
//!
//! Keyed by `StructuralKey`, so reapplying a design or toggling between two
//! decal configurations reuses compiled modules. Generic over the compiled
//! artifact: hosts store `wgpu::ShaderModule`s (or full pipelines), tests
//! store plain values.

use rustc_hash::FxHashMap;

use crate::program::StructuralKey;

pub struct ProgramCache<P> {
    programs: FxHashMap<StructuralKey, P>,
}

impl<P> ProgramCache<P> {
    pub fn new() -> Self {
        Self {
            programs: FxHashMap::default(),
        }
    }

    pub fn get(&self, key: &StructuralKey) -> Option<&P> {
        self.programs.get(key)
    }

    pub fn contains(&self, key: &StructuralKey) -> bool {
        self.programs.contains_key(key)
    }

    /// Fetch the compiled artifact for `key`, building it on first use
    pub fn get_or_insert_with(&mut self, key: StructuralKey, build: impl FnOnce() -> P) -> &P {
        self.programs.entry(key).or_insert_with(build)
    }

    pub fn insert(&mut self, key: StructuralKey, program: P) {
        self.programs.insert(key, program);
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    /// Drop every cached artifact (device loss, shader hot-reload)
    pub fn clear(&mut self) {
        self.programs.clear();
    }
}

impl<P> Default for ProgramCache<P> {
    fn default() -> Self {
        Self::new()
    }
}
