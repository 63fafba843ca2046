use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use winit::dpi::PhysicalSize;

use crate::error::SetupError;
use crate::types::AdapterProfile;

pub(crate) struct GpuContext {
    pub _instance: wgpu::Instance,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub size: PhysicalSize<u32>,
    pub surface_format: wgpu::TextureFormat,
    pub adapter_profile: AdapterProfile,
}

impl GpuContext {
    pub(crate) fn new<T>(
        target: &T,
        initial_size: PhysicalSize<u32>,
        vsync: bool,
    ) -> Result<Self, SetupError>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            flags: wgpu::InstanceFlags::default(),
            memory_budget_thresholds: wgpu::MemoryBudgetThresholds::default(),
            backend_options: wgpu::BackendOptions::default(),
        });

        let window_handle = target.window_handle().map_err(|err| {
            SetupError::CapabilityUnavailable(format!("failed to acquire window handle: {err}"))
        })?;
        let display_handle = target.display_handle().map_err(|err| {
            SetupError::CapabilityUnavailable(format!("failed to acquire display handle: {err}"))
        })?;

        let surface = unsafe {
            instance.create_surface_unsafe(wgpu::SurfaceTargetUnsafe::RawHandle {
                raw_display_handle: display_handle.as_raw(),
                raw_window_handle: window_handle.as_raw(),
            })
        }
        .map_err(|err| {
            SetupError::CapabilityUnavailable(format!("failed to create rendering surface: {err}"))
        })?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .map_err(|err| {
            SetupError::CapabilityUnavailable(format!("no suitable GPU adapter found: {err}"))
        })?;

        let adapter_info = adapter.get_info();
        let limits = adapter.limits();
        let adapter_profile = AdapterProfile::from_wgpu(&adapter_info);
        tracing::debug!(
            name = %adapter_profile.name,
            backend = ?adapter_profile.backend,
            device_type = ?adapter_profile.device_type,
            is_software = adapter_profile.is_software(),
            "selected GPU adapter"
        );

        let max_dimension = limits.max_texture_dimension_2d;
        let requested_width = initial_size.width.max(1);
        let requested_height = initial_size.height.max(1);
        if requested_width > max_dimension || requested_height > max_dimension {
            return Err(SetupError::CapabilityUnavailable(format!(
                "GPU max texture dimension is {max_dimension}, requested surface is {requested_width}x{requested_height}"
            )));
        }

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|format| !format.is_srgb())
            .unwrap_or_else(|| {
                let fallback = surface_caps.formats[0];
                tracing::warn!(
                    ?fallback,
                    "no linear (non-sRGB) surface format available; falling back"
                );
                fallback
            });

        let present_mode = select_present_mode(&surface_caps, vsync);
        tracing::debug!(?present_mode, vsync, "using present mode");

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("sdfmarch device"),
            required_features: wgpu::Features::empty(),
            required_limits: limits.clone(),
            memory_hints: wgpu::MemoryHints::MemoryUsage,
            trace: wgpu::Trace::default(),
        }))
        .map_err(|err| {
            SetupError::CapabilityUnavailable(format!("failed to create GPU device: {err}"))
        })?;

        let size = PhysicalSize::new(requested_width, requested_height);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        Ok(Self {
            _instance: instance,
            surface,
            device,
            queue,
            config,
            size,
            surface_format,
            adapter_profile,
        })
    }

    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }

        self.size = new_size;
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
    }
}

/// Vsync on prefers Fifo; off prefers Immediate, then Mailbox, then whatever
/// the surface supports.
fn select_present_mode(caps: &wgpu::SurfaceCapabilities, vsync: bool) -> wgpu::PresentMode {
    let fallback = caps.present_modes[0];
    if vsync {
        caps.present_modes
            .iter()
            .copied()
            .find(|mode| *mode == wgpu::PresentMode::Fifo)
            .unwrap_or(fallback)
    } else {
        caps.present_modes
            .iter()
            .copied()
            .find(|mode| *mode == wgpu::PresentMode::Immediate)
            .or_else(|| {
                caps.present_modes
                    .iter()
                    .copied()
                    .find(|mode| *mode == wgpu::PresentMode::Mailbox)
            })
            .unwrap_or(fallback)
    }
}
