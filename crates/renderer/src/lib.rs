//! Renderer crate for sdfmarch.
//!
//! Glues the winit window, the `wgpu` pipeline, and the raymarch fragment
//! shader together. The overall flow is:
//!
//! ```text
//!   CLI / sdfmarch
//!          │ RendererConfig
//!          ▼
//!   Renderer::run ──▶ GpuState ──▶ winit event loop ──▶ render()
//!          ▲                                   │
//!          │                                   └─▶ UniformBinder ─▶ GPU UBO
//! ```
//!
//! Setup (compile, link, upload the quad, resolve uniforms, start the clock)
//! runs once; the loop then redraws continuously, one clock tick and one draw
//! per frame, until the window closes or [`RenderRuntime::stop`] fires. The
//! raymarch itself executes entirely on the GPU; from the host's perspective
//! the fragment shader is data.

mod clock;
mod compile;
mod error;
mod gpu;
mod types;
mod window;

pub use clock::{FrameClock, FrameSample};
pub use error::SetupError;
pub use types::{AdapterProfile, RendererConfig};
pub use window::{FramerateSink, RenderRuntime, Renderer};
