use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use crossbeam_channel::{bounded, Sender};
use winit::dpi::PhysicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoopBuilder, EventLoopProxy};
use winit::window::{Window, WindowBuilder};

use tracing::{error, info, warn};

use crate::compile::FRAGMENT_SHADER_GLSL;
use crate::error::SetupError;
use crate::gpu::GpuState;
use crate::types::RendererConfig;

/// Default cap applied when a software rasterizer is detected and the caller
/// did not request an explicit framerate.
const SOFTWARE_FPS_CAP: f32 = 15.0;

/// Lifecycle of the render loop.
///
/// Setup happens while Idle; `start` moves to Running exactly once; `stop` is
/// terminal. Draw ticks and redraw scheduling only happen while Running.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum LoopPhase {
    Idle,
    Running,
    Stopped,
}

#[derive(Debug)]
pub(crate) struct LoopState {
    phase: LoopPhase,
}

impl LoopState {
    pub(crate) fn new() -> Self {
        Self {
            phase: LoopPhase::Idle,
        }
    }

    /// Idle -> Running. Returns false if the loop already left Idle.
    pub(crate) fn start(&mut self) -> bool {
        if self.phase == LoopPhase::Idle {
            self.phase = LoopPhase::Running;
            true
        } else {
            false
        }
    }

    /// Any state -> Stopped. Idempotent.
    pub(crate) fn stop(&mut self) {
        self.phase = LoopPhase::Stopped;
    }

    pub(crate) fn should_render(&self) -> bool {
        self.phase == LoopPhase::Running
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub(crate) fn phase(&self) -> LoopPhase {
        self.phase
    }
}

/// Decides when the next frame is due, honoring an optional fps cap.
pub(crate) struct FramePacer {
    interval: Option<Duration>,
    next_due: Instant,
}

impl FramePacer {
    pub(crate) fn new(target_fps: Option<f32>, now: Instant) -> Self {
        let interval = target_fps
            .filter(|fps| *fps > 0.0)
            .map(|fps| Duration::from_secs_f32(1.0 / fps));
        Self {
            interval,
            next_due: now,
        }
    }

    pub(crate) fn ready_for_frame(&self, now: Instant) -> bool {
        now >= self.next_due
    }

    pub(crate) fn mark_rendered(&mut self, now: Instant) {
        if let Some(interval) = self.interval {
            self.next_due = now + interval;
        }
    }

    /// None when uncapped: the loop renders on every callback.
    pub(crate) fn next_deadline(&self) -> Option<Instant> {
        self.interval.map(|_| self.next_due)
    }
}

/// Receives the per-tick framerate readout.
pub trait FramerateSink {
    fn publish(&mut self, framerate: f32);
}

/// Formats the readout exactly as displayed: two decimal places.
pub(crate) fn format_framerate(framerate: f32) -> String {
    format!("Framerate: {framerate:.2}")
}

/// Writes the readout into the window title every tick.
struct WindowTitleSink {
    window: Arc<Window>,
    base_title: String,
}

impl FramerateSink for WindowTitleSink {
    fn publish(&mut self, framerate: f32) {
        self.window
            .set_title(&format!("{} | {}", self.base_title, format_framerate(framerate)));
    }
}

#[derive(Debug, Clone)]
enum LoopCommand {
    Stop,
}

/// Handle to a render loop running on its own thread.
///
/// `spawn` performs the whole setup sequence on the loop thread and reports
/// setup failures through the returned `Result`. `stop` delivers the external
/// cancellation signal: the loop transitions to Stopped, schedules no further
/// frames, and the thread winds down.
pub struct RenderRuntime {
    proxy: EventLoopProxy<LoopCommand>,
    join_handle: Option<JoinHandle<Result<()>>>,
}

impl RenderRuntime {
    pub fn spawn(config: RendererConfig) -> Result<Self> {
        let (ready_tx, ready_rx) = bounded(1);
        let handle = thread::Builder::new()
            .name("sdfmarch-render".into())
            .spawn(move || run_event_loop(config, Some(ready_tx)))
            .map_err(|err| anyhow!("failed to spawn render thread: {err}"))?;

        let proxy = ready_rx
            .recv()
            .map_err(|err| anyhow!("render thread failed to initialise: {err}"))??;

        Ok(Self {
            proxy,
            join_handle: Some(handle),
        })
    }

    /// Requests a Running -> Stopped transition. Safe to call repeatedly.
    pub fn stop(&self) -> Result<()> {
        self.proxy
            .send_event(LoopCommand::Stop)
            .map_err(|err| anyhow!(err))
    }

    /// Waits for the loop thread to finish.
    pub fn join(mut self) -> Result<()> {
        if let Some(handle) = self.join_handle.take() {
            handle
                .join()
                .map_err(|err| anyhow!("render thread panicked: {err:?}"))??;
        }
        Ok(())
    }
}

impl Drop for RenderRuntime {
    fn drop(&mut self) {
        if let Some(handle) = self.join_handle.take() {
            let _ = self.proxy.send_event(LoopCommand::Stop);
            let _ = handle.join();
        }
    }
}

/// Blocking entry point: runs the render loop on the calling thread.
pub struct Renderer {
    config: RendererConfig,
}

impl Renderer {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    /// Runs setup and the render loop until the window closes.
    pub fn run(&mut self) -> Result<()> {
        run_event_loop(self.config.clone(), None)
    }
}

/// Loads the fragment source: a user-supplied file or the embedded scene.
fn load_fragment_source(config: &RendererConfig) -> Result<String, SetupError> {
    match &config.fragment_shader {
        Some(path) => std::fs::read_to_string(path).map_err(|source| SetupError::ShaderIo {
            path: path.display().to_string(),
            source,
        }),
        None => Ok(FRAGMENT_SHADER_GLSL.to_owned()),
    }
}

type ReadySender = Sender<Result<EventLoopProxy<LoopCommand>, anyhow::Error>>;

fn run_event_loop(config: RendererConfig, ready_tx: Option<ReadySender>) -> Result<()> {
    let mut builder = EventLoopBuilder::<LoopCommand>::with_user_event();
    #[cfg(any(target_os = "linux", target_os = "android"))]
    {
        use winit::platform::wayland::EventLoopBuilderExtWayland;
        EventLoopBuilderExtWayland::with_any_thread(&mut builder, true);
    }
    let event_loop = builder
        .build()
        .map_err(|err| anyhow!("failed to create event loop: {err}"))?;
    let proxy = event_loop.create_proxy();

    let window_size = PhysicalSize::new(config.surface_size.0, config.surface_size.1);
    let window = WindowBuilder::new()
        .with_title(&config.title)
        .with_inner_size(window_size)
        .build(&event_loop)
        .map_err(|err| anyhow!("failed to create render window: {err}"))?;
    let window = Arc::new(window);

    let fragment_source = match load_fragment_source(&config) {
        Ok(source) => source,
        Err(err) => {
            let wrapped = anyhow!(err).context("failed to load fragment shader");
            if let Some(tx) = &ready_tx {
                let _ = tx.send(Err(anyhow!(wrapped.to_string())));
            }
            return Err(wrapped);
        }
    };

    let mut gpu = match GpuState::new(window.as_ref(), window_size, config.vsync, &fragment_source)
    {
        Ok(gpu) => gpu,
        Err(err) => {
            let wrapped = anyhow!(err).context("failed to initialise renderer");
            if let Some(tx) = &ready_tx {
                let _ = tx.send(Err(anyhow!(wrapped.to_string())));
            }
            return Err(wrapped);
        }
    };

    let mut target_fps = config.target_fps;
    if target_fps.is_none() && gpu.adapter_profile().is_software() {
        warn!(
            adapter = %gpu.adapter_profile().name,
            cap = SOFTWARE_FPS_CAP,
            "software rasterizer detected; capping framerate (override with an explicit fps)"
        );
        target_fps = Some(SOFTWARE_FPS_CAP);
    }

    let mut loop_state = LoopState::new();
    let mut pacer = FramePacer::new(target_fps, Instant::now());
    let mut sink = WindowTitleSink {
        window: window.clone(),
        base_title: config.title.clone(),
    };

    // Setup is complete: Idle -> Running, then hand control to the platform.
    loop_state.start();
    info!(
        width = window_size.width,
        height = window_size.height,
        fps = ?target_fps,
        "entering render loop"
    );

    if let Some(tx) = &ready_tx {
        let _ = tx.send(Ok(proxy.clone()));
    }

    let mut result = Ok(());
    let run_result = event_loop.run(move |event, elwt| {
        match event {
            Event::UserEvent(LoopCommand::Stop) => {
                loop_state.stop();
                elwt.exit();
            }
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                    loop_state.stop();
                    elwt.exit();
                }
                WindowEvent::Resized(new_size) => {
                    gpu.resize(new_size);
                }
                WindowEvent::RedrawRequested => {
                    if !loop_state.should_render() {
                        return;
                    }
                    match gpu.render() {
                        Ok(sample) => {
                            pacer.mark_rendered(Instant::now());
                            sink.publish(sample.framerate);
                        }
                        Err(wgpu::SurfaceError::Lost) | Err(wgpu::SurfaceError::Outdated) => {
                            gpu.resize(gpu.size());
                        }
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            error!("surface out of memory; stopping render loop");
                            loop_state.stop();
                            elwt.exit();
                        }
                        Err(wgpu::SurfaceError::Timeout) => {
                            warn!("surface timeout; retrying next frame");
                        }
                        Err(other) => {
                            warn!("surface error: {other:?}; retrying next frame");
                        }
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                if !loop_state.should_render() {
                    elwt.set_control_flow(ControlFlow::Wait);
                    return;
                }
                let now = Instant::now();
                if pacer.ready_for_frame(now) {
                    window.request_redraw();
                    elwt.set_control_flow(ControlFlow::Wait);
                } else if let Some(deadline) = pacer.next_deadline() {
                    elwt.set_control_flow(ControlFlow::WaitUntil(deadline));
                }
            }
            _ => {}
        }
    });

    if let Err(err) = run_result {
        result = Err(anyhow!("render event loop error: {err}"));
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loop_starts_exactly_once() {
        let mut state = LoopState::new();
        assert_eq!(state.phase(), LoopPhase::Idle);
        assert!(!state.should_render());

        assert!(state.start());
        assert_eq!(state.phase(), LoopPhase::Running);
        assert!(state.should_render());

        assert!(!state.start());
        assert_eq!(state.phase(), LoopPhase::Running);
    }

    #[test]
    fn stop_suppresses_further_ticks() {
        let mut state = LoopState::new();
        state.start();
        state.stop();
        assert_eq!(state.phase(), LoopPhase::Stopped);
        assert!(!state.should_render());

        // A stopped loop cannot be restarted.
        assert!(!state.start());
        assert!(!state.should_render());
    }

    #[test]
    fn stop_is_idempotent() {
        let mut state = LoopState::new();
        state.start();
        state.stop();
        state.stop();
        assert_eq!(state.phase(), LoopPhase::Stopped);
    }

    #[test]
    fn uncapped_pacer_is_always_ready() {
        let now = Instant::now();
        let mut pacer = FramePacer::new(None, now);
        assert!(pacer.ready_for_frame(now));
        pacer.mark_rendered(now);
        assert!(pacer.ready_for_frame(now));
        assert!(pacer.next_deadline().is_none());
    }

    #[test]
    fn capped_pacer_waits_out_the_frame_interval() {
        // 64 fps gives an interval of exactly 15.625ms, exact in f32.
        let now = Instant::now();
        let mut pacer = FramePacer::new(Some(64.0), now);
        assert!(pacer.ready_for_frame(now));

        pacer.mark_rendered(now);
        assert!(!pacer.ready_for_frame(now + Duration::from_millis(10)));
        assert!(pacer.ready_for_frame(now + Duration::from_millis(16)));
        assert_eq!(pacer.next_deadline(), Some(now + Duration::from_micros(15_625)));
    }

    #[test]
    fn zero_fps_cap_means_uncapped() {
        let now = Instant::now();
        let pacer = FramePacer::new(Some(0.0), now);
        assert!(pacer.next_deadline().is_none());
    }

    #[test]
    fn framerate_readout_has_two_decimals() {
        assert_eq!(format_framerate(62.5), "Framerate: 62.50");
        assert_eq!(format_framerate(0.0), "Framerate: 0.00");
        assert_eq!(format_framerate(144.0), "Framerate: 144.00");
    }

    struct RecordingSink {
        published: Vec<f32>,
    }

    impl FramerateSink for RecordingSink {
        fn publish(&mut self, framerate: f32) {
            self.published.push(framerate);
        }
    }

    #[test]
    fn sink_receives_every_tick() {
        let mut sink = RecordingSink { published: vec![] };
        for framerate in [60.0, 59.8, 61.2] {
            sink.publish(framerate);
        }
        assert_eq!(sink.published, vec![60.0, 59.8, 61.2]);
    }
}
