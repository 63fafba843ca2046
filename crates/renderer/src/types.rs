use std::path::PathBuf;

/// Identifying details of the GPU adapter selected for rendering.
#[derive(Debug, Clone)]
pub struct AdapterProfile {
    pub name: String,
    pub backend: wgpu::Backend,
    pub device_type: wgpu::DeviceType,
}

impl AdapterProfile {
    pub(crate) fn from_wgpu(info: &wgpu::AdapterInfo) -> Self {
        Self {
            name: info.name.clone(),
            backend: info.backend,
            device_type: info.device_type,
        }
    }

    /// True when the adapter is a software rasterizer (llvmpipe and friends),
    /// which cannot sustain full-rate raymarching.
    pub fn is_software(&self) -> bool {
        if matches!(self.device_type, wgpu::DeviceType::Cpu) {
            return true;
        }
        let name = self.name.to_lowercase();
        name.contains("llvmpipe") || name.contains("softpipe") || name.contains("swiftshader")
    }
}

/// Immutable configuration passed to the renderer at start-up.
///
/// `RendererConfig` mirrors CLI flags and the settings file: how large the
/// window should be, whether to cap the framerate, and which fragment shader
/// to render.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Window size in physical pixels.
    pub surface_size: (u32, u32),
    /// Base window title; the framerate readout is appended per tick.
    pub title: String,
    /// Optional frames-per-second cap; None = render every callback.
    pub target_fps: Option<f32>,
    /// Present with vsync (Fifo) when true, otherwise prefer immediate modes.
    pub vsync: bool,
    /// Optional replacement for the embedded raymarch fragment shader.
    pub fragment_shader: Option<PathBuf>,
}

impl Default for RendererConfig {
    /// The scene's native 800x600 windowed configuration.
    fn default() -> Self {
        Self {
            surface_size: (800, 600),
            title: "sdfmarch".to_string(),
            target_fps: None,
            vsync: true,
            fragment_shader: None,
        }
    }
}
