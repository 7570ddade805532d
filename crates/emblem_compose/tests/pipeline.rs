//! End-to-end pipeline tests: apply/pump/refresh against recording host
//! surfaces, with the built-in CPU resolver.

use emblem_compose::{BumpBinding, Compositor, LayerPhase, LocalResolver, MeshSurface};
use emblem_core::{
    BumpProfile, BumpRegistry, DecalKind, MeshSettings, Rgb, Uv, MATERIAL_NONE,
};
use emblem_gpu::{DecalProgram, ProgramCache, StructuralKey};
use image::{ImageFormat, RgbaImage};
use indexmap::IndexMap;
use std::io::Cursor;

// 1x1 red PNG
const RED_PIXEL_URI: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8DwHwAFBQIAX8jx0gAAAABJRU5ErkJggg==";

const FRONT_INITIAL: Rgb = Rgb::new(128, 128, 128);

fn trace_init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn png_bytes(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, image::Rgba(rgba));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

/// Captures everything the compositor pushes at a surface
#[derive(Default)]
struct RecordingSurface {
    base_color: Option<Rgb>,
    installed_key: Option<StructuralKey>,
    installs: usize,
    uniform_updates: usize,
    last_uniforms: Vec<u8>,
    clears: usize,
    bump: Option<BumpBinding>,
}

impl MeshSurface for RecordingSurface {
    fn set_base_color(&mut self, color: Rgb) {
        self.base_color = Some(color);
    }

    fn set_bump(&mut self, binding: Option<&BumpBinding>) {
        self.bump = binding.cloned();
    }

    fn install_decal_program(&mut self, program: &DecalProgram) {
        self.installs += 1;
        self.installed_key = Some(program.key.clone());
        self.last_uniforms = program.uniforms.clone();
    }

    fn update_decal_uniforms(&mut self, uniforms: &[u8]) {
        self.uniform_updates += 1;
        self.last_uniforms = uniforms.to_vec();
    }

    fn clear_decal_program(&mut self) {
        self.clears += 1;
        self.installed_key = None;
    }
}

fn two_regions() -> IndexMap<String, MeshSettings> {
    let mut settings = IndexMap::new();
    settings.insert(
        "Front".to_string(),
        MeshSettings {
            initial_color: FRONT_INITIAL,
            ..MeshSettings::default()
        },
    );
    settings.insert("Back".to_string(), MeshSettings::default());
    settings
}

fn rig() -> (Compositor, LocalResolver, IndexMap<String, RecordingSurface>) {
    trace_init();
    let mut surfaces = IndexMap::new();
    for name in two_regions().keys() {
        surfaces.insert(name.clone(), RecordingSurface::default());
    }
    let mut compositor = Compositor::new(two_regions(), BumpRegistry::new());
    compositor.prime_surfaces(&mut surfaces);
    (compositor, LocalResolver::new(), surfaces)
}

/// Fade under a red image, on the front layer only
fn front_design_json() -> String {
    format!(
        r##"{{
            "layers": {{
                "Front": {{
                    "color": "1d3557",
                    "decals": [
                        {{ "type": "fade",
                           "fadeData": {{ "baseColor": "#000000", "blendColor": "#00ff00" }} }},
                        {{ "type": "image", "imageUrl": "{RED_PIXEL_URI}" }}
                    ]
                }}
            }}
        }}"##
    )
}

#[test]
fn test_apply_design_drives_layers_to_rendered() {
    let (mut compositor, mut resolver, mut surfaces) = rig();

    compositor
        .apply_design_json(&front_design_json(), &mut resolver, &mut surfaces)
        .unwrap();

    // mentioned layer waits for its loads; the unmentioned one renders now
    assert_eq!(compositor.phase("Front"), Some(LayerPhase::Populating));
    assert_eq!(compositor.pending("Front"), 2);
    assert_eq!(compositor.phase("Back"), Some(LayerPhase::Rendered));

    let drained = compositor.pump(&mut resolver, &mut surfaces);
    assert_eq!(drained, 2);
    assert_eq!(compositor.phase("Front"), Some(LayerPhase::Rendered));
    assert_eq!(compositor.pending("Front"), 0);

    let front = &surfaces["Front"];
    assert_eq!(front.base_color, Some(Rgb::new(0x1d, 0x35, 0x57)));
    let key = front.installed_key.as_ref().unwrap();
    assert_eq!(key.kinds(), &[DecalKind::Fade, DecalKind::Image]);
    // header + two 32-byte decal elements
    assert_eq!(front.last_uniforms.len(), 96);

    let back = &surfaces["Back"];
    assert_eq!(back.base_color, Some(Rgb::WHITE));
    assert!(back.installed_key.is_none());
    assert!(back.clears > 0);
}

#[test]
fn test_snapshot_preserves_design_after_apply() {
    let (mut compositor, mut resolver, mut surfaces) = rig();
    compositor
        .apply_design_json(&front_design_json(), &mut resolver, &mut surfaces)
        .unwrap();
    compositor.pump(&mut resolver, &mut surfaces);

    let snapshot = compositor.snapshot();
    let front = &snapshot.layers["Front"];
    assert_eq!(front.color.as_deref(), Some("1d3557"));
    let kinds: Vec<_> = front.decals.iter().map(|d| d.kind).collect();
    // saved array order is paint order, fade still at the head
    assert_eq!(kinds, vec![DecalKind::Fade, DecalKind::Image]);

    // and the snapshot reads back
    let json = snapshot.to_json().unwrap();
    compositor
        .apply_design_json(&json, &mut resolver, &mut surfaces)
        .unwrap();
    compositor.pump(&mut resolver, &mut surfaces);
    assert_eq!(compositor.layer("Front").unwrap().renderable_count(), 2);
}

#[test]
fn test_failed_resolution_excludes_decal_but_renders() {
    let (mut compositor, mut resolver, mut surfaces) = rig();
    let json = r##"{
        "layers": {
            "Front": {
                "decals": [
                    { "type": "fade", "fadeData": { "baseColor": "#112233" } },
                    { "type": "image", "imageUrl": "http://example.com/unreachable.png" }
                ]
            }
        }
    }"##;

    compositor
        .apply_design_json(json, &mut resolver, &mut surfaces)
        .unwrap();
    compositor.pump(&mut resolver, &mut surfaces);

    assert_eq!(compositor.phase("Front"), Some(LayerPhase::Rendered));
    // the failed decal stays in the model but not in the program
    let layer = compositor.layer("Front").unwrap();
    assert_eq!(layer.decals().len(), 2);
    assert_eq!(layer.renderable_count(), 1);
    let key = surfaces["Front"].installed_key.as_ref().unwrap();
    assert_eq!(key.kinds(), &[DecalKind::Fade]);
}

#[test]
fn test_delete_during_load_discards_completion() {
    let (mut compositor, mut resolver, mut surfaces) = rig();
    compositor
        .apply_design_json(&front_design_json(), &mut resolver, &mut surfaces)
        .unwrap();
    assert_eq!(compositor.phase("Front"), Some(LayerPhase::Populating));

    // remove the image decal while its texture is still "in flight"
    let image_id = compositor
        .layer("Front")
        .unwrap()
        .decals()
        .iter()
        .find(|d| d.kind() == DecalKind::Image)
        .unwrap()
        .id();
    compositor.remove_decal("Front", image_id).unwrap();

    compositor.pump(&mut resolver, &mut surfaces);

    // the orphaned completion still drains the pending count
    assert_eq!(compositor.pending("Front"), 0);
    assert_eq!(compositor.phase("Front"), Some(LayerPhase::Rendered));
    let layer = compositor.layer("Front").unwrap();
    assert!(!layer.contains_decal(image_id));
    assert_eq!(layer.renderable_count(), 1);
    let key = surfaces["Front"].installed_key.as_ref().unwrap();
    assert_eq!(key.kinds(), &[DecalKind::Fade]);
}

#[test]
fn test_superseded_apply_discards_old_epoch() {
    let (mut compositor, mut resolver, mut surfaces) = rig();
    compositor
        .apply_design_json(&front_design_json(), &mut resolver, &mut surfaces)
        .unwrap();

    // second apply before the first one's textures were pumped
    let fade_only = r##"{
        "layers": {
            "Front": { "decals": [ { "type": "fade",
                "fadeData": { "baseColor": "#000000" } } ] }
        }
    }"##;
    compositor
        .apply_design_json(fade_only, &mut resolver, &mut surfaces)
        .unwrap();

    compositor.pump(&mut resolver, &mut surfaces);

    let layer = compositor.layer("Front").unwrap();
    assert_eq!(layer.decals().len(), 1);
    assert_eq!(layer.renderable_count(), 1);
    assert_eq!(compositor.phase("Front"), Some(LayerPhase::Rendered));
    // only the second design's program was ever installed
    assert_eq!(surfaces["Front"].installs, 1);
    let key = surfaces["Front"].installed_key.as_ref().unwrap();
    assert_eq!(key.kinds(), &[DecalKind::Fade]);
}

#[test]
fn test_value_edit_updates_uniforms_without_reinstall() {
    let (mut compositor, mut resolver, mut surfaces) = rig();
    let id = compositor
        .add_fade_decal("Front", Default::default(), &mut resolver)
        .unwrap()
        .unwrap();
    compositor.pump(&mut resolver, &mut surfaces);
    compositor.refresh(&mut surfaces);
    assert_eq!(surfaces["Front"].installs, 1);
    let before = surfaces["Front"].last_uniforms.clone();

    compositor.decal_mut(id).unwrap().position = Uv::new(0.2, 0.8);
    compositor.refresh(&mut surfaces);

    let front = &surfaces["Front"];
    assert_eq!(front.installs, 1);
    assert_eq!(front.uniform_updates, 1);
    assert_eq!(front.last_uniforms.len(), before.len());
    assert_ne!(front.last_uniforms, before);
}

#[test]
fn test_structural_edit_reinstalls_program() {
    let (mut compositor, mut resolver, mut surfaces) = rig();
    compositor
        .add_fade_decal("Front", Default::default(), &mut resolver)
        .unwrap();
    compositor.pump(&mut resolver, &mut surfaces);
    compositor.refresh(&mut surfaces);
    assert_eq!(surfaces["Front"].installs, 1);

    resolver
        .register_image_bytes("http://example.com/logo.png", &png_bytes(4, 2, [0, 0, 255, 255]))
        .unwrap();
    compositor
        .add_image_decal("Front", "http://example.com/logo.png", &mut resolver)
        .unwrap();
    compositor.pump(&mut resolver, &mut surfaces);
    compositor.refresh(&mut surfaces);

    let front = &surfaces["Front"];
    assert_eq!(front.installs, 2);
    let key = front.installed_key.as_ref().unwrap();
    assert_eq!(key.kinds(), &[DecalKind::Fade, DecalKind::Image]);
}

#[test]
fn test_same_structure_shares_one_compiled_program() {
    let (mut compositor, mut resolver, mut surfaces) = rig();
    for name in ["Front", "Back"] {
        compositor
            .add_fade_decal(name, Default::default(), &mut resolver)
            .unwrap();
    }
    compositor.pump(&mut resolver, &mut surfaces);
    compositor.refresh(&mut surfaces);

    let front_key = surfaces["Front"].installed_key.clone().unwrap();
    let back_key = surfaces["Back"].installed_key.clone().unwrap();
    assert_eq!(front_key, back_key);

    // a host cache keyed structurally compiles once for both layers
    let mut cache: ProgramCache<()> = ProgramCache::new();
    cache.get_or_insert_with(front_key, || ());
    cache.get_or_insert_with(back_key, || ());
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_unmentioned_layer_resets_to_initial_state() {
    let (mut compositor, mut resolver, mut surfaces) = rig();
    compositor.bumps_mut().insert(
        "Canvas",
        BumpProfile {
            link: "http://example.com/canvas.jpg".to_string(),
            scale: 0.5,
            size: 6.0,
            roughness: 0.9,
            metalness: 0.0,
        },
    );
    resolver
        .register_image_bytes(
            "http://example.com/canvas.jpg",
            &png_bytes(2, 2, [90, 90, 90, 255]),
        )
        .unwrap();

    // customize the back layer, then apply a front-only design
    compositor.set_layer_color("Back", "aa0000").unwrap();
    compositor
        .add_fade_decal("Back", Default::default(), &mut resolver)
        .unwrap();
    compositor
        .set_layer_material("Back", "Canvas", &mut resolver, &mut surfaces)
        .unwrap();
    compositor.pump(&mut resolver, &mut surfaces);
    compositor.refresh(&mut surfaces);
    assert!(surfaces["Back"].bump.is_some());
    assert!(surfaces["Back"].installed_key.is_some());

    compositor
        .apply_design_json(&front_design_json(), &mut resolver, &mut surfaces)
        .unwrap();
    compositor.pump(&mut resolver, &mut surfaces);

    let back = compositor.layer("Back").unwrap();
    assert_eq!(back.color(), Rgb::WHITE);
    assert_eq!(back.material_key(), MATERIAL_NONE);
    assert!(back.decals().is_empty());
    assert_eq!(compositor.phase("Back"), Some(LayerPhase::Rendered));
    assert!(surfaces["Back"].bump.is_none());
    assert!(surfaces["Back"].installed_key.is_none());
}

#[test]
fn test_clear_design_restores_every_layer() {
    let (mut compositor, mut resolver, mut surfaces) = rig();
    compositor
        .apply_design_json(&front_design_json(), &mut resolver, &mut surfaces)
        .unwrap();
    compositor.pump(&mut resolver, &mut surfaces);

    compositor.clear_design(&mut surfaces);

    for name in ["Front", "Back"] {
        let layer = compositor.layer(name).unwrap();
        assert!(layer.decals().is_empty());
        assert_eq!(layer.material_key(), MATERIAL_NONE);
        assert_eq!(compositor.phase(name), Some(LayerPhase::Rendered));
        assert!(surfaces[name].installed_key.is_none());
    }
    assert_eq!(compositor.layer("Front").unwrap().color(), FRONT_INITIAL);
    assert_eq!(compositor.selected_decal(), None);
}

#[test]
fn test_bump_binds_after_pump_and_clears_on_none() {
    let (mut compositor, mut resolver, mut surfaces) = rig();
    compositor.bumps_mut().insert(
        "Canvas",
        BumpProfile {
            link: "http://example.com/canvas.jpg".to_string(),
            scale: 0.5,
            size: 6.0,
            roughness: 0.9,
            metalness: 0.1,
        },
    );
    resolver
        .register_image_bytes(
            "http://example.com/canvas.jpg",
            &png_bytes(2, 2, [90, 90, 90, 255]),
        )
        .unwrap();

    compositor
        .set_layer_material("Front", "Canvas", &mut resolver, &mut surfaces)
        .unwrap();
    assert!(surfaces["Front"].bump.is_none());
    compositor.pump(&mut resolver, &mut surfaces);

    let bump = surfaces["Front"].bump.as_ref().unwrap();
    assert_eq!(bump.roughness, 0.9);
    assert_eq!(bump.tiling, 6.0);

    // back to flat shading, no load needed
    compositor
        .set_layer_material("Front", "none", &mut resolver, &mut surfaces)
        .unwrap();
    assert!(surfaces["Front"].bump.is_none());
}

#[test]
fn test_bump_superseded_by_material_change_is_discarded() {
    let (mut compositor, mut resolver, mut surfaces) = rig();
    compositor.bumps_mut().insert(
        "Canvas",
        BumpProfile {
            link: "http://example.com/canvas.jpg".to_string(),
            scale: 0.5,
            size: 6.0,
            roughness: 0.9,
            metalness: 0.0,
        },
    );
    resolver
        .register_image_bytes(
            "http://example.com/canvas.jpg",
            &png_bytes(2, 2, [90, 90, 90, 255]),
        )
        .unwrap();

    compositor
        .set_layer_material("Front", "Canvas", &mut resolver, &mut surfaces)
        .unwrap();
    // material changes again before the texture arrives
    compositor
        .set_layer_material("Front", "none", &mut resolver, &mut surfaces)
        .unwrap();
    compositor.pump(&mut resolver, &mut surfaces);

    assert!(surfaces["Front"].bump.is_none());
    assert_eq!(compositor.layer("Front").unwrap().material_key(), MATERIAL_NONE);
}

#[test]
fn test_preview_composites_applied_design() {
    let (mut compositor, mut resolver, mut surfaces) = rig();
    compositor
        .apply_design_json(&front_design_json(), &mut resolver, &mut surfaces)
        .unwrap();
    compositor.pump(&mut resolver, &mut surfaces);

    let preview = compositor.preview("Front", 16).unwrap();
    // the red image decal covers the center at its default placement
    assert_eq!(preview.pixel(8, 8), [255, 0, 0, 255]);
    assert!(compositor.preview("Ghost", 16).is_none());
}

#[test]
fn test_malformed_design_json_is_an_error() {
    let (mut compositor, mut resolver, mut surfaces) = rig();
    let result = compositor.apply_design_json("{ not json", &mut resolver, &mut surfaces);
    assert!(result.is_err());
    // the model is untouched
    assert_eq!(compositor.phase("Front"), Some(LayerPhase::Rendered));
}

#[test]
fn test_moved_unresolved_decal_resolves_on_target() {
    let (mut compositor, mut resolver, mut surfaces) = rig();
    resolver
        .register_image_bytes("http://example.com/logo.png", &png_bytes(2, 2, [0, 255, 0, 255]))
        .unwrap();
    let id = compositor
        .add_image_decal("Front", "http://example.com/logo.png", &mut resolver)
        .unwrap()
        .unwrap();

    // move before the texture was pumped
    compositor
        .move_decal("Front", id, "Back", &mut resolver)
        .unwrap();
    compositor.pump(&mut resolver, &mut surfaces);
    compositor.refresh(&mut surfaces);

    let back = compositor.layer("Back").unwrap();
    assert!(back.decal(id).unwrap().has_renderable_texture());
    assert_eq!(compositor.pending("Front"), 0);
    assert_eq!(compositor.pending("Back"), 0);
    let key = surfaces["Back"].installed_key.as_ref().unwrap();
    assert_eq!(key.kinds(), &[DecalKind::Image]);
}
