use crate::compile::{compile_fragment_shader, compile_vertex_shader};
use crate::error::SetupError;

use super::geometry::QuadGeometry;

pub(crate) struct PipelineLayouts {
    pub uniform_layout: wgpu::BindGroupLayout,
    pub vertex_module: wgpu::ShaderModule,
}

impl PipelineLayouts {
    pub(crate) fn new(device: &wgpu::Device) -> Result<Self, SetupError> {
        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let vertex_module = compile_vertex_shader(device)?;

        Ok(Self {
            uniform_layout,
            vertex_module,
        })
    }
}

/// The single render pipeline driving the full-screen raymarch pass.
pub(crate) struct ShaderPipeline {
    pub pipeline: wgpu::RenderPipeline,
}

impl ShaderPipeline {
    /// Compiles the fragment stage and links the program.
    ///
    /// Pipeline creation runs under a validation error scope so a link
    /// failure surfaces as `SetupError::Link` instead of producing an
    /// unusable program.
    pub(crate) fn new(
        device: &wgpu::Device,
        layouts: &PipelineLayouts,
        surface_format: wgpu::TextureFormat,
        fragment_source: &str,
    ) -> Result<Self, SetupError> {
        let fragment_module = compile_fragment_shader(device, fragment_source)?;

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("raymarch pipeline layout"),
            bind_group_layouts: &[&layouts.uniform_layout],
            push_constant_ranges: &[],
        });

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("raymarch pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &layouts.vertex_module,
                entry_point: Some("main"),
                buffers: &[QuadGeometry::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &fragment_module,
                entry_point: Some("main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview: None,
            cache: None,
        });
        if let Some(error) = pollster::block_on(device.pop_error_scope()) {
            return Err(SetupError::Link {
                log: error.to_string(),
            });
        }

        Ok(Self { pipeline })
    }
}
