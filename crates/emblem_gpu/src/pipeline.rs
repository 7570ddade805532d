//! Render pipeline assembly for generated decal programs
//!
//! Bind group plan, matching the generated module:
//! - group 0: scene uniforms (view_proj + model), vertex stage
//! - group 1: layer uniforms (base color, bounds, decal array), fragment
//! - group 2: shared sampler at binding 0, decal textures at 1..=N
//!
//! Group 2's layout depends on the decal count, so it is created per
//! compiled program; groups 0 and 1 are count-independent.

use wgpu::util::DeviceExt;

use crate::program::DecalProgram;
use crate::texture::GpuTexture;

/// Vertex layout for decal-receiving meshes: position + normal + uv,
/// interleaved, 32-byte stride
pub fn vertex_buffer_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: 32,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x3,
                offset: 0,
                shader_location: 0,
            },
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x3,
                offset: 12,
                shader_location: 1,
            },
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x2,
                offset: 24,
                shader_location: 2,
            },
        ],
    }
}

/// Group 0: scene uniforms, visible to the vertex stage
pub fn scene_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("decal_scene_layout"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

/// Group 1: layer uniforms, visible to the fragment stage
pub fn layer_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("decal_layer_layout"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

/// Group 2: one shared sampler plus `decal_count` sampled textures
pub fn texture_bind_group_layout(
    device: &wgpu::Device,
    decal_count: usize,
) -> wgpu::BindGroupLayout {
    let mut entries = Vec::with_capacity(decal_count + 1);
    entries.push(wgpu::BindGroupLayoutEntry {
        binding: 0,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    });
    for i in 0..decal_count {
        entries.push(wgpu::BindGroupLayoutEntry {
            binding: (i + 1) as u32,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        });
    }

    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("decal_texture_layout"),
        entries: &entries,
    })
}

/// A decal program compiled against a device
pub struct CompiledProgram {
    pub module: wgpu::ShaderModule,
    pub pipeline: wgpu::RenderPipeline,
    pub layer_layout: wgpu::BindGroupLayout,
    pub texture_layout: wgpu::BindGroupLayout,
    pub decal_count: usize,
}

impl CompiledProgram {
    /// Compile a generated program into a render pipeline for
    /// position/normal/uv meshes
    pub fn compile(
        device: &wgpu::Device,
        program: &DecalProgram,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let decal_count = program.decal_count();

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("decal_program_{}", decal_count)),
            source: wgpu::ShaderSource::Wgsl(program.wgsl.as_str().into()),
        });

        let scene_layout = scene_bind_group_layout(device);
        let layer_layout = layer_bind_group_layout(device);
        let texture_layout = texture_bind_group_layout(device, decal_count);

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("decal_pipeline_layout"),
            bind_group_layouts: &[&scene_layout, &layer_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("decal_pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some("vs_main"),
                buffers: &[vertex_buffer_layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            module,
            pipeline,
            layer_layout,
            texture_layout,
            decal_count,
        }
    }

    /// Upload the packed layer uniforms into a fresh buffer
    pub fn create_layer_uniform_buffer(
        &self,
        device: &wgpu::Device,
        uniforms: &[u8],
    ) -> wgpu::Buffer {
        device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("decal_layer_uniforms"),
            contents: uniforms,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        })
    }

    /// Bind group for group 1 (layer uniforms)
    pub fn create_layer_bind_group(
        &self,
        device: &wgpu::Device,
        buffer: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("decal_layer_bind_group"),
            layout: &self.layer_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        })
    }

    /// Bind group for group 2: the shared sampler plus the program's
    /// textures in paint order
    pub fn create_texture_bind_group(
        &self,
        device: &wgpu::Device,
        sampler: &wgpu::Sampler,
        textures: &[GpuTexture],
    ) -> wgpu::BindGroup {
        let mut entries = Vec::with_capacity(textures.len() + 1);
        entries.push(wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Sampler(sampler),
        });
        for (i, texture) in textures.iter().enumerate() {
            entries.push(wgpu::BindGroupEntry {
                binding: (i + 1) as u32,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            });
        }

        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("decal_texture_bind_group"),
            layout: &self.texture_layout,
            entries: &entries,
        })
    }
}
