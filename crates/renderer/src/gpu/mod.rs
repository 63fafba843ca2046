//! GPU orchestration for the raymarch viewer.
//!
//! The path from setup to pixels is deliberately short:
//! - `context` owns wgpu instance/device/surface wiring and reconfigures the
//!   swapchain when the window resizes.
//! - `pipeline` compiles the GLSL pair into a render pipeline and checks both
//!   compile and link status through validation error scopes.
//! - `geometry` uploads the persistent full-screen quad.
//! - `uniforms` mirrors the std140 scene block and resolves named member
//!   offsets once, so per-frame pushes are plain queue writes.
//! - `state` glues everything together and exposes the `GpuState` API used by
//!   `window`.

mod context;
mod geometry;
mod pipeline;
mod state;
mod uniforms;

pub(crate) use state::GpuState;
