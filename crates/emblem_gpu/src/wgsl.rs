//! Decal WGSL code generation
//!
//! Shader source is regenerated whenever a layer's decal configuration
//! changes structurally, because the decal count is baked into the module as
//! the uniform array length and as one texture binding per decal. Value-only
//! edits (position, rotation, opacity, flips, size) never touch the source.
//!
//! Every piece of generated code is addressable by a named injection point,
//! so hosts with their own material templates can splice the decal stage in
//! instead of using the standalone module.

/// Where a generated source fragment belongs in a host shader template
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InjectionPoint {
    /// Field for the host's vertex-output struct carrying the surface UV
    UvVarying,
    /// Statement for the host's vertex main populating the UV varying
    VertexPreamble,
    /// Module-scope fragment bindings: uniform structs, sampler, one
    /// texture per decal
    FragmentBindings,
    /// The decal compositing function; the host calls
    /// `composite_decals(uv, base, front_facing)` from its fragment main
    FragmentDecalLoop,
}

/// Generated WGSL tagged with its injection point
#[derive(Clone, Debug)]
pub struct ShaderFragment {
    pub point: InjectionPoint,
    pub code: String,
}

/// Decal shader generator. `decal_count` is always the number of decals
/// with a resolved texture (at least 1 — layers with none render with no
/// decal program at all).
pub struct DecalCodegen;

impl DecalCodegen {
    /// Varying field carrying the surface UV into the fragment stage
    pub const UV_VARYING: &'static str = "@location(0) uv: vec2<f32>,";

    /// Vertex-stage statement populating the UV varying
    pub const VERTEX_PREAMBLE: &'static str = "    out.uv = in.uv;";

    /// Uniform structs and texture bindings for `decal_count` decals.
    /// Group 1 holds the layer uniforms; group 2 holds the shared sampler
    /// at binding 0 and the per-decal textures at bindings 1..=N.
    pub fn fragment_bindings(decal_count: usize) -> String {
        let mut code = String::new();

        code.push_str(
            r#"struct DecalInstance {
    position: vec2<f32>,
    size: vec2<f32>,
    rotation: f32,
    opacity: f32,
    flip_x: u32,
    flip_y: u32,
}

"#,
        );

        code.push_str(&format!(
            r#"struct LayerUniforms {{
    base_color: vec4<f32>,
    bounds: vec4<f32>,
    decals: array<DecalInstance, {}>,
}}

@group(1) @binding(0) var<uniform> decal_layer: LayerUniforms;

@group(2) @binding(0) var decal_sampler: sampler;
"#,
            decal_count
        ));

        for i in 0..decal_count {
            code.push_str(&format!(
                "@group(2) @binding({}) var decal_texture_{}: texture_2d<f32>;\n",
                i + 1,
                i
            ));
        }

        code
    }

    /// The compositing function: for each decal, map the surface UV into
    /// the decal-local unit square (rotation about the decal position, then
    /// scale, then flips), sample via a static switch on the loop index,
    /// and blend "over" scaled by opacity. Fragments outside the decal,
    /// outside the layer's UV bounds, or on back faces are left untouched.
    pub fn composite_function(decal_count: usize) -> String {
        let mut cases = String::new();
        for i in 0..decal_count {
            cases.push_str(&format!(
                r#"            case {}u: {{
                tex_color = textureSampleLevel(decal_texture_{}, decal_sampler, local, 0.0);
            }}
"#,
                i, i
            ));
        }

        format!(
            r#"fn composite_decals(uv: vec2<f32>, base: vec4<f32>, front_facing: bool) -> vec4<f32> {{
    var diffuse = base;
    let in_bounds = uv.x >= decal_layer.bounds.x && uv.x <= decal_layer.bounds.y
        && uv.y >= decal_layer.bounds.z && uv.y <= decal_layer.bounds.w;
    for (var i = 0u; i < {}u; i++) {{
        let decal = decal_layer.decals[i];
        let offset = uv - decal.position;
        let rc = cos(decal.rotation);
        let rs = sin(decal.rotation);
        let rotated = vec2<f32>(offset.x * rc - offset.y * rs, offset.x * rs + offset.y * rc);
        var local = rotated / decal.size + vec2<f32>(0.5, 0.5);
        if (decal.flip_x != 0u) {{
            local.x = 1.0 - local.x;
        }}
        if (decal.flip_y != 0u) {{
            local.y = 1.0 - local.y;
        }}

        var tex_color = vec4<f32>(0.0);
        switch i {{
{}            default: {{
                tex_color = vec4<f32>(0.0);
            }}
        }}

        let covered = all(local >= vec2<f32>(0.0)) && all(local <= vec2<f32>(1.0));
        if (covered && in_bounds && front_facing) {{
            let src_alpha = tex_color.a * decal.opacity;
            let final_alpha = diffuse.a * (1.0 - src_alpha) + src_alpha;
            if (final_alpha < 0.001) {{
                diffuse = vec4<f32>(0.0, 0.0, 0.0, 0.0);
            }} else {{
                let rgb = (tex_color.rgb * src_alpha + diffuse.rgb * diffuse.a * (1.0 - src_alpha)) / final_alpha;
                diffuse = vec4<f32>(rgb, final_alpha);
            }}
        }}
    }}
    return diffuse;
}}
"#,
            decal_count, cases
        )
    }

    /// All named fragments for `decal_count` decals, for hosts splicing
    /// into their own templates
    pub fn fragments(decal_count: usize) -> Vec<ShaderFragment> {
        vec![
            ShaderFragment {
                point: InjectionPoint::UvVarying,
                code: Self::UV_VARYING.to_string(),
            },
            ShaderFragment {
                point: InjectionPoint::VertexPreamble,
                code: Self::VERTEX_PREAMBLE.to_string(),
            },
            ShaderFragment {
                point: InjectionPoint::FragmentBindings,
                code: Self::fragment_bindings(decal_count),
            },
            ShaderFragment {
                point: InjectionPoint::FragmentDecalLoop,
                code: Self::composite_function(decal_count),
            },
        ]
    }

    /// Complete standalone module: position/normal/uv vertex stage, the
    /// decal stack over the layer base color, and a fixed-light Lambert
    /// term so the output reads as a lit surface
    pub fn generate_module(decal_count: usize) -> String {
        let mut shader = String::new();

        shader.push_str(&format!(
            "// Generated decal compositing shader ({} decals)\n\n",
            decal_count
        ));

        shader.push_str(
            r#"struct SceneUniforms {
    view_proj: mat4x4<f32>,
    model: mat4x4<f32>,
}

@group(0) @binding(0) var<uniform> scene: SceneUniforms;

"#,
        );

        shader.push_str(&Self::fragment_bindings(decal_count));

        shader.push_str(
            r#"
struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
}

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
"#,
        );
        shader.push_str("    ");
        shader.push_str(Self::UV_VARYING);
        shader.push_str(
            r#"
    @location(1) world_normal: vec3<f32>,
}

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    let world_position = scene.model * vec4<f32>(in.position, 1.0);
    out.clip_position = scene.view_proj * world_position;
    out.world_normal = normalize((scene.model * vec4<f32>(in.normal, 0.0)).xyz);
"#,
        );
        shader.push_str(Self::VERTEX_PREAMBLE);
        shader.push_str(
            r#"
    return out;
}

"#,
        );

        shader.push_str(&Self::composite_function(decal_count));

        shader.push_str(
            r#"
@fragment
fn fs_main(in: VertexOutput, @builtin(front_facing) front_facing: bool) -> @location(0) vec4<f32> {
    var diffuse = decal_layer.base_color;
    diffuse = composite_decals(in.uv, diffuse, front_facing);

    let light_dir = normalize(vec3<f32>(0.4, 0.8, 0.6));
    let ndotl = max(dot(normalize(in.world_normal), light_dir), 0.0);
    let lit = diffuse.rgb * (0.25 + 0.75 * ndotl);
    return vec4<f32>(lit, diffuse.a);
}
"#,
        );

        shader
    }
}
