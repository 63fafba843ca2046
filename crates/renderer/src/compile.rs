use std::borrow::Cow;

use wgpu::naga::ShaderStage;

use crate::error::SetupError;

/// Vertex shader for the persistent full-screen quad.
pub(crate) const VERTEX_SHADER_GLSL: &str = include_str!("shaders/fullscreen.vert");

/// Default raymarch scene: a displaced sphere lit by a single point light.
pub(crate) const FRAGMENT_SHADER_GLSL: &str = include_str!("shaders/raymarch.frag");

/// Compiles the static full-screen quad vertex shader.
pub(crate) fn compile_vertex_shader(device: &wgpu::Device) -> Result<wgpu::ShaderModule, SetupError> {
    compile_stage(device, "vertex", VERTEX_SHADER_GLSL, ShaderStage::Vertex)
}

/// Compiles a raymarch fragment shader, either the embedded scene or a
/// user-supplied replacement.
pub(crate) fn compile_fragment_shader(
    device: &wgpu::Device,
    source: &str,
) -> Result<wgpu::ShaderModule, SetupError> {
    compile_stage(device, "fragment", source, ShaderStage::Fragment)
}

/// Hands GLSL to naga's frontend and surfaces the driver diagnostic on
/// failure instead of letting the error escape as an uncaptured panic.
fn compile_stage(
    device: &wgpu::Device,
    stage_name: &'static str,
    source: &str,
    stage: ShaderStage,
) -> Result<wgpu::ShaderModule, SetupError> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(stage_name),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Owned(source.to_owned()),
            stage,
            defines: &[],
        },
    });
    if let Some(error) = pollster::block_on(device.pop_error_scope()) {
        return Err(SetupError::Compile {
            stage: stage_name,
            log: error.to_string(),
        });
    }
    Ok(module)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_shader_declares_position_attribute() {
        assert!(VERTEX_SHADER_GLSL.contains("layout(location = 0) in vec2 position"));
    }

    #[test]
    fn fragment_shader_declares_scene_uniforms() {
        assert!(FRAGMENT_SHADER_GLSL.contains("vec2 iResolution"));
        assert!(FRAGMENT_SHADER_GLSL.contains("float iTime"));
        assert!(FRAGMENT_SHADER_GLSL.contains("std140"));
    }

    #[test]
    fn fragment_shader_takes_resolution_from_uniform() {
        // The surface size is pushed by the host; baked dimensions would stop
        // the scene from following window resizes.
        assert!(!FRAGMENT_SHADER_GLSL.contains("800.0"));
        assert!(!FRAGMENT_SHADER_GLSL.contains("600.0"));
    }

    #[test]
    fn fragment_shader_keeps_trace_bounds() {
        assert!(FRAGMENT_SHADER_GLSL.contains("MAX_STEPS = 128"));
        assert!(FRAGMENT_SHADER_GLSL.contains("MAX_TRACE_DISTANCE = 512.0"));
        assert!(FRAGMENT_SHADER_GLSL.contains("HIT_EPSILON = 0.001"));
    }
}
