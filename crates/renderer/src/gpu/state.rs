use std::time::{Duration, Instant};

use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use tracing::debug;
use winit::dpi::PhysicalSize;

use crate::clock::{FrameClock, FrameSample};
use crate::error::SetupError;
use crate::types::AdapterProfile;

use super::context::GpuContext;
use super::geometry::QuadGeometry;
use super::pipeline::{PipelineLayouts, ShaderPipeline};
use super::uniforms::{UniformBinder, UniformBlock};

/// Owns every GPU object for one renderer session.
///
/// Exactly one pipeline, one vertex buffer, and one uniform buffer exist for
/// the session; `render` never creates or destroys GPU objects, it only
/// writes uniforms and encodes the draw.
pub(crate) struct GpuState {
    context: GpuContext,
    pipeline: ShaderPipeline,
    quad: QuadGeometry,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    binder: UniformBinder,
    clock: FrameClock,
    frame_count: u32,
    last_stats: Instant,
    frames_since_stats: u32,
}

impl GpuState {
    pub(crate) fn new<T>(
        target: &T,
        initial_size: PhysicalSize<u32>,
        vsync: bool,
        fragment_source: &str,
    ) -> Result<Self, SetupError>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let context = GpuContext::new(target, initial_size, vsync)?;
        let layouts = PipelineLayouts::new(&context.device)?;

        let uniform_buffer = context.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("uniform buffer"),
            size: UniformBlock::SIZE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let uniform_bind_group = context
            .device
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("uniform bind group"),
                layout: &layouts.uniform_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                }],
            });

        let pipeline =
            ShaderPipeline::new(&context.device, &layouts, context.surface_format, fragment_source)?;
        let quad = QuadGeometry::upload(&context.device);
        let binder = UniformBinder::resolve_all();

        let initial = UniformBlock::new(context.size.width, context.size.height);
        context
            .queue
            .write_buffer(&uniform_buffer, 0, bytemuck::bytes_of(&initial));

        Ok(Self {
            context,
            pipeline,
            quad,
            uniform_buffer,
            uniform_bind_group,
            binder,
            clock: FrameClock::new(),
            frame_count: 0,
            last_stats: Instant::now(),
            frames_since_stats: 0,
        })
    }

    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        self.context.size
    }

    pub(crate) fn adapter_profile(&self) -> &AdapterProfile {
        &self.context.adapter_profile
    }

    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.context.resize(new_size);
        self.binder.push_resolution(
            &self.context.queue,
            &self.uniform_buffer,
            new_size.width as f32,
            new_size.height as f32,
        );
    }

    /// Renders one frame: tick the clock, push uniforms, clear, draw the
    /// quad, present. Returns the clock sample for the display sink.
    pub(crate) fn render(&mut self) -> Result<FrameSample, wgpu::SurfaceError> {
        let frame = self.context.surface.get_current_texture()?;

        let sample = self.clock.tick();
        self.binder.push_frame(
            &self.context.queue,
            &self.uniform_buffer,
            &sample,
            self.frame_count as i32,
        );
        self.frame_count = self.frame_count.saturating_add(1);
        self.log_stats(&sample);

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("render encoder"),
                });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("render pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            render_pass.set_pipeline(&self.pipeline.pipeline);
            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.quad.vertex_buffer.slice(..));
            render_pass.draw(0..QuadGeometry::vertex_count(), 0..1);
        }

        self.context.queue.submit(std::iter::once(encoder.finish()));
        frame.present();

        Ok(sample)
    }

    fn log_stats(&mut self, sample: &FrameSample) {
        self.frames_since_stats += 1;
        let now = Instant::now();
        let since_stats = now.saturating_duration_since(self.last_stats);
        if since_stats >= Duration::from_secs(1) {
            let fps = self.frames_since_stats as f32 / since_stats.as_secs_f32();
            self.frames_since_stats = 0;
            self.last_stats = now;
            debug!(
                fps = fps.round(),
                frame_count = self.frame_count,
                time = sample.elapsed_seconds,
                "render stats"
            );
        }
    }
}
