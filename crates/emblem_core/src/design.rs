//! Design document schema
//!
//! A design is the serialization unit for a product customization: per layer
//! name, a base color and the saved decal stack in paint order. The wire
//! format is camelCase JSON, matching the documents produced by the original
//! web tooling, so old saves load unchanged:
//!
//! ```json
//! { "layers": { "Front": { "color": "1d3557", "decals": [
//!     { "type": "text", "textData": { "text": "HELLO", "font": "Arial",
//!       "color": "#ffffff", "letterSpacing": 4, "borderWidth": 0,
//!       "borderColor": "#ffffff" },
//!       "position": { "x": 0.5, "y": 0.42 }, "size": { "x": 0.4, "y": 0.2 },
//!       "rotation": 0, "opacity": 1, "flipX": false, "flipY": false,
//!       "aspectLocked": true }
//! ] } } }
//! ```
//!
//! Decal ids are written for traceability but never read back — loading
//! allocates fresh ids, so round-trip equality is modulo ids.

use crate::color::Rgb;
use crate::decal::{Decal, DecalId, DecalKind, FadeDirection, FadeSpec, TextSpec, TextureSource, Uv};
use crate::error::{DesignError, Result};
use crate::store::LayerStore;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A complete saved design
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Design {
    pub layers: IndexMap<String, LayerDesign>,
}

/// One layer's saved state
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerDesign {
    /// Base color, bare hex
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub decals: Vec<DecalDesign>,
}

/// One decal's saved state
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecalDesign {
    /// Written on save, ignored on load
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DecalKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_data: Option<TextDataDesign>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fade_data: Option<FadeDataDesign>,
    #[serde(default = "default_position")]
    pub position: Uv,
    #[serde(default = "default_size")]
    pub size: Uv,
    /// Degrees, clockwise
    #[serde(default)]
    pub rotation: f32,
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    #[serde(default)]
    pub flip_x: bool,
    #[serde(default)]
    pub flip_y: bool,
    #[serde(default = "default_true")]
    pub aspect_locked: bool,
}

/// Saved text payload
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextDataDesign {
    pub text: String,
    #[serde(default = "default_font")]
    pub font: String,
    /// CSS-style hex, `#` optional
    #[serde(default = "default_text_color")]
    pub color: String,
    #[serde(default)]
    pub letter_spacing: f32,
    #[serde(default)]
    pub border_width: f32,
    #[serde(default = "default_border_color")]
    pub border_color: String,
}

/// Saved fade payload
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FadeDataDesign {
    #[serde(default = "default_text_color")]
    pub base_color: String,
    #[serde(default = "default_border_color")]
    pub blend_color: String,
    #[serde(default = "default_fade_start")]
    pub fade_start: f32,
    #[serde(default = "default_mix_ratio")]
    pub mix_ratio: f32,
    #[serde(default)]
    pub direction: FadeDirection,
}

fn default_position() -> Uv {
    Uv::new(0.5, 0.5)
}

fn default_size() -> Uv {
    Uv::new(0.3, 0.3)
}

fn default_opacity() -> f32 {
    1.0
}

fn default_true() -> bool {
    true
}

fn default_font() -> String {
    "Arial".to_string()
}

fn default_text_color() -> String {
    "#000000".to_string()
}

fn default_border_color() -> String {
    "#ffffff".to_string()
}

fn default_fade_start() -> f32 {
    0.4
}

fn default_mix_ratio() -> f32 {
    0.5
}

impl DecalDesign {
    /// Snapshot a live decal
    pub fn from_decal(decal: &Decal) -> Self {
        let (image_url, text_data, fade_data) = match &decal.source {
            TextureSource::Image { url } => (Some(url.clone()), None, None),
            TextureSource::Text(spec) => (
                None,
                Some(TextDataDesign {
                    text: spec.text.clone(),
                    font: spec.font.clone(),
                    color: spec.color.to_css_hex(),
                    letter_spacing: spec.letter_spacing,
                    border_width: spec.border_width,
                    border_color: spec.border_color.to_css_hex(),
                }),
                None,
            ),
            TextureSource::Fade(spec) => (
                None,
                None,
                Some(FadeDataDesign {
                    base_color: spec.base_color.to_css_hex(),
                    blend_color: spec.blend_color.to_css_hex(),
                    fade_start: spec.fade_start,
                    mix_ratio: spec.mix_ratio,
                    direction: spec.direction,
                }),
            ),
        };
        Self {
            id: Some(decal.id().raw()),
            name: decal.name.clone(),
            kind: decal.kind(),
            image_url,
            text_data,
            fade_data,
            position: decal.position,
            size: decal.size,
            rotation: decal.rotation_degrees,
            opacity: decal.opacity,
            flip_x: decal.flip_x,
            flip_y: decal.flip_y,
            aspect_locked: decal.aspect_locked,
        }
    }

    /// Rebuild a decal under a fresh id. The texture is left unresolved; the
    /// apply pipeline resolves it afterwards.
    pub fn into_decal(self, id: DecalId) -> Result<Decal> {
        let source = match self.kind {
            DecalKind::Image => {
                let url = self.image_url.ok_or(DesignError::MissingPayload {
                    name: self.name.clone(),
                    kind: "image",
                })?;
                TextureSource::Image { url }
            }
            DecalKind::Text => {
                let data = self.text_data.ok_or(DesignError::MissingPayload {
                    name: self.name.clone(),
                    kind: "text",
                })?;
                TextureSource::Text(TextSpec {
                    text: data.text,
                    font: data.font,
                    color: Rgb::from_hex(&data.color)?,
                    letter_spacing: data.letter_spacing,
                    border_width: data.border_width,
                    border_color: Rgb::from_hex(&data.border_color)?,
                })
            }
            DecalKind::Fade => {
                let data = self.fade_data.ok_or(DesignError::MissingPayload {
                    name: self.name.clone(),
                    kind: "fade",
                })?;
                TextureSource::Fade(FadeSpec {
                    base_color: Rgb::from_hex(&data.base_color)?,
                    blend_color: Rgb::from_hex(&data.blend_color)?,
                    fade_start: data.fade_start,
                    mix_ratio: data.mix_ratio,
                    direction: data.direction,
                })
            }
        };

        let mut decal = Decal::new(id, self.name, source);
        decal.position = self.position;
        decal.size = self.size;
        decal.rotation_degrees = self.rotation;
        decal.opacity = self.opacity;
        decal.flip_x = self.flip_x;
        decal.flip_y = self.flip_y;
        decal.aspect_locked = self.aspect_locked;
        Ok(decal)
    }
}

impl Design {
    /// Snapshot every layer of a store, in store order
    pub fn from_store(store: &LayerStore) -> Self {
        let mut layers = IndexMap::new();
        for layer in store.iter() {
            layers.insert(
                layer.name().to_string(),
                LayerDesign {
                    color: Some(layer.color().to_hex()),
                    decals: layer.decals().iter().map(DecalDesign::from_decal).collect(),
                },
            );
        }
        Self { layers }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::{Layer, UvBounds};

    const SAVED_DESIGN: &str = r##"{
        "layers": {
            "Front": {
                "color": "1d3557",
                "decals": [
                    { "type": "image", "name": "Image",
                      "imageUrl": "http://example.com/logo.png",
                      "position": { "x": 0.4, "y": 0.6 },
                      "size": { "x": 0.25, "y": 0.25 },
                      "rotation": 15.0, "opacity": 0.9,
                      "flipX": true, "flipY": false, "aspectLocked": true },
                    { "type": "text", "name": "HELLO",
                      "textData": { "text": "HELLO", "font": "Arial",
                        "color": "#ffffff", "letterSpacing": 4.0,
                        "borderWidth": 2.0, "borderColor": "#ff0000" } },
                    { "type": "fade",
                      "fadeData": { "baseColor": "#000000",
                        "blendColor": "#00ff00", "fadeStart": 0.3,
                        "mixRatio": 0.8, "direction": "Horizontal" } }
                ]
            },
            "Back": { "color": "ffffff" }
        }
    }"##;

    #[test]
    fn test_parse_saved_design() {
        let design = Design::from_json(SAVED_DESIGN).unwrap();
        assert_eq!(design.layers.len(), 2);

        let front = &design.layers["Front"];
        assert_eq!(front.color.as_deref(), Some("1d3557"));
        assert_eq!(front.decals.len(), 3);

        let image = &front.decals[0];
        assert_eq!(image.kind, DecalKind::Image);
        assert_eq!(image.position, Uv::new(0.4, 0.6));
        assert!(image.flip_x);

        // omitted transform fields take the load defaults
        let text = &front.decals[1];
        assert_eq!(text.position, Uv::new(0.5, 0.5));
        assert_eq!(text.size, Uv::new(0.3, 0.3));
        assert_eq!(text.opacity, 1.0);
        assert!(text.aspect_locked);

        let fade = &front.decals[2];
        let fade_data = fade.fade_data.as_ref().unwrap();
        assert_eq!(fade_data.direction, FadeDirection::Horizontal);
        assert_eq!(fade_data.fade_start, 0.3);

        assert!(design.layers["Back"].decals.is_empty());
    }

    #[test]
    fn test_into_decal_builds_sources() {
        let design = Design::from_json(SAVED_DESIGN).unwrap();
        let front = &design.layers["Front"];

        let text = front.decals[1].clone().into_decal(DecalId::new(7)).unwrap();
        assert_eq!(text.id(), DecalId::new(7));
        match &text.source {
            TextureSource::Text(spec) => {
                assert_eq!(spec.text, "HELLO");
                assert_eq!(spec.color, Rgb::WHITE);
                assert_eq!(spec.border_color, Rgb::new(255, 0, 0));
                assert_eq!(spec.letter_spacing, 4.0);
            }
            other => panic!("expected text source, got {other:?}"),
        }

        let fade = front.decals[2].clone().into_decal(DecalId::new(8)).unwrap();
        match &fade.source {
            TextureSource::Fade(spec) => {
                assert_eq!(spec.blend_color, Rgb::new(0, 255, 0));
                assert_eq!(spec.direction, FadeDirection::Horizontal);
            }
            other => panic!("expected fade source, got {other:?}"),
        }
    }

    #[test]
    fn test_into_decal_missing_payload() {
        let bare = DecalDesign {
            id: None,
            name: "broken".to_string(),
            kind: DecalKind::Image,
            image_url: None,
            text_data: None,
            fade_data: None,
            position: default_position(),
            size: default_size(),
            rotation: 0.0,
            opacity: 1.0,
            flip_x: false,
            flip_y: false,
            aspect_locked: true,
        };
        let err = bare.into_decal(DecalId::new(1)).unwrap_err();
        assert!(matches!(err, DesignError::MissingPayload { kind: "image", .. }));
    }

    #[test]
    fn test_round_trip_modulo_ids() {
        let design = Design::from_json(SAVED_DESIGN).unwrap();

        // restore into a store
        let mut store = LayerStore::new();
        store.insert(Layer::new("Front", Rgb::WHITE, UvBounds::FULL));
        store.insert(Layer::new("Back", Rgb::WHITE, UvBounds::FULL));
        for (name, layer_design) in &design.layers {
            if let Some(color) = &layer_design.color {
                store.layer_mut(name).unwrap().set_color_hex(color).unwrap();
            }
            for decal_design in &layer_design.decals {
                let id = store.alloc_decal_id();
                let decal = decal_design.clone().into_decal(id).unwrap();
                store.layer_mut(name).unwrap().push_decal(decal).unwrap();
            }
        }

        // snapshot again and compare, ids cleared on both sides
        let strip = |mut d: Design| {
            for layer in d.layers.values_mut() {
                for decal in &mut layer.decals {
                    decal.id = None;
                }
            }
            d
        };
        let reparsed = strip(Design::from_store(&store));
        let original = strip(design);
        assert_eq!(reparsed, original);
    }

    #[test]
    fn test_json_round_trip() {
        let design = Design::from_json(SAVED_DESIGN).unwrap();
        let json = design.to_json().unwrap();
        let reparsed = Design::from_json(&json).unwrap();
        assert_eq!(design, reparsed);
    }

    #[test]
    fn test_layer_color_serializes_bare_and_decal_colors_css() {
        let mut store = LayerStore::new();
        let mut layer = Layer::new("Front", Rgb::new(0x1d, 0x35, 0x57), UvBounds::FULL);
        let id = DecalId::new(1);
        layer
            .add_decal(Decal::text(id, TextSpec::default()))
            .unwrap();
        store.insert(layer);

        let json = Design::from_store(&store).to_json().unwrap();
        assert!(json.contains(r#""color":"1d3557""#));
        assert!(json.contains(r##""color":"#000000""##));
    }
}
