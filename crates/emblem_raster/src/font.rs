//! Font discovery and loading
//!
//! Uses fontdb to discover fonts by family name, falling back to the
//! generic sans-serif family when a requested name is not installed. The
//! full system scan is deferred until a lookup actually needs it, and
//! loaded faces are cached per family.

use crate::{RasterError, Result};
use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// An owned font face, usable with swash
#[derive(Clone, Debug)]
pub struct LoadedFont {
    data: Arc<Vec<u8>>,
    index: u32,
    family: String,
}

impl LoadedFont {
    /// Wrap raw TTF/OTF bytes, validating that swash can read them
    pub fn from_data(data: Vec<u8>, index: u32, family: impl Into<String>) -> Result<Self> {
        if swash::FontRef::from_index(&data, index as usize).is_none() {
            return Err(RasterError::InvalidFontData);
        }
        Ok(Self {
            data: Arc::new(data),
            index,
            family: family.into(),
        })
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Face index within the font file (for TTC collections)
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Family name the face was resolved as
    pub fn family(&self) -> &str {
        &self.family
    }
}

/// Font database with per-family face cache
pub struct FontLibrary {
    db: Database,
    cache: FxHashMap<String, Arc<LoadedFont>>,
    system_loaded: bool,
}

impl FontLibrary {
    /// An empty library; register faces with
    /// [`register_font_data`](Self::register_font_data) or let lookups fall
    /// through to a lazy system scan
    pub fn new() -> Self {
        Self {
            db: Database::new(),
            cache: FxHashMap::default(),
            system_loaded: false,
        }
    }

    /// A library with the system fonts scanned up front
    pub fn with_system_fonts() -> Self {
        let mut library = Self::new();
        library.load_system_fonts();
        library
    }

    pub fn load_system_fonts(&mut self) {
        if !self.system_loaded {
            self.db.load_system_fonts();
            self.system_loaded = true;
            tracing::debug!("loaded system fonts: {} faces", self.db.len());
        }
    }

    /// Register an in-memory font (TTF/OTF/TTC)
    pub fn register_font_data(&mut self, data: Vec<u8>) {
        self.db.load_font_data(data);
    }

    pub fn face_count(&self) -> usize {
        self.db.len()
    }

    /// Find a face for `family`, falling back to sans-serif, then to a lazy
    /// system scan if nothing matched yet
    pub fn find(&mut self, family: &str) -> Result<Arc<LoadedFont>> {
        if let Some(font) = self.cache.get(family) {
            return Ok(font.clone());
        }

        let mut id = self.query(family);
        if id.is_none() && !self.system_loaded {
            self.load_system_fonts();
            id = self.query(family);
        }
        let id = id.ok_or_else(|| RasterError::FontUnavailable(family.to_string()))?;

        let font = Arc::new(self.load_face(id, family)?);
        self.cache.insert(family.to_string(), font.clone());
        Ok(font)
    }

    fn query(&self, family: &str) -> Option<fontdb::ID> {
        let query = Query {
            families: &[Family::Name(family), Family::SansSerif],
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        self.db.query(&query)
    }

    fn load_face(&self, id: fontdb::ID, requested: &str) -> Result<LoadedFont> {
        let face = self
            .db
            .face(id)
            .ok_or_else(|| RasterError::FontUnavailable(requested.to_string()))?;
        let family = face
            .families
            .first()
            .map(|(name, _)| name.clone())
            .unwrap_or_else(|| requested.to_string());
        if family != requested {
            tracing::debug!("font '{requested}' resolved to '{family}'");
        }

        let loaded = self
            .db
            .with_face_data(id, |data, index| {
                LoadedFont::from_data(data.to_vec(), index, family.clone())
            })
            .ok_or_else(|| RasterError::FontUnavailable(requested.to_string()))??;
        Ok(loaded)
    }
}

impl Default for FontLibrary {
    fn default() -> Self {
        Self::new()
    }
}
