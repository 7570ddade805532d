//! Bump material profiles
//!
//! A bump profile describes the fabric/surface treatment applied under the
//! decals: a tileable bump texture plus scalar roughness/metalness. Profiles
//! come from a host-supplied registry keyed by material name; the key
//! `"none"` (or any unknown key) means flat shading defaults.

use crate::error::Result;
use crate::layer::MATERIAL_NONE;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Roughness applied when no bump profile is active
pub const DEFAULT_ROUGHNESS: f32 = 1.0;
/// Metalness applied when no bump profile is active
pub const DEFAULT_METALNESS: f32 = 0.0;

/// One bump/roughness/metalness profile
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BumpProfile {
    /// Bump texture URL
    pub link: String,
    /// Bump strength
    pub scale: f32,
    /// Tiling repeat count, applied in both axes
    pub size: f32,
    pub roughness: f32,
    pub metalness: f32,
}

/// Host-supplied registry of bump profiles, keyed by material name
#[derive(Clone, Debug, Default)]
pub struct BumpRegistry {
    profiles: FxHashMap<String, BumpProfile>,
}

impl BumpRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the registry from its JSON descriptor:
    /// `{ "Polyester": { "link": ..., "scale": ..., ... }, ... }`
    pub fn from_json(json: &str) -> Result<Self> {
        let profiles: FxHashMap<String, BumpProfile> = serde_json::from_str(json)?;
        Ok(Self { profiles })
    }

    pub fn insert(&mut self, key: impl Into<String>, profile: BumpProfile) {
        self.profiles.insert(key.into(), profile);
    }

    pub fn get(&self, key: &str) -> Option<&BumpProfile> {
        self.profiles.get(key)
    }

    /// Resolve a material key to a profile. `"none"` and unknown keys both
    /// resolve to `None` (flat defaults).
    pub fn resolve(&self, key: &str) -> Option<&BumpProfile> {
        if key == MATERIAL_NONE {
            return None;
        }
        self.profiles.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(|k| k.as_str())
    }
}
