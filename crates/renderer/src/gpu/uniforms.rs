use bytemuck::{Pod, Zeroable};

use crate::clock::FrameSample;

/// Host-side mirror of the `SceneParams` std140 block in
/// `shaders/raymarch.frag`. Field order and padding must match the GLSL
/// declaration byte-for-byte.
#[repr(C, align(16))]
#[derive(Clone, Copy)]
pub(crate) struct UniformBlock {
    pub i_resolution: [f32; 2],
    pub i_time: f32,
    pub i_time_delta: f32,
    pub i_frame: i32,
    pub _padding: [f32; 3],
}

unsafe impl Zeroable for UniformBlock {}
unsafe impl Pod for UniformBlock {}

impl UniformBlock {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        Self {
            i_resolution: [width as f32, height as f32],
            i_time: 0.0,
            i_time_delta: 0.0,
            i_frame: 0,
            _padding: [0.0; 3],
        }
    }

    pub(crate) const SIZE: u64 = std::mem::size_of::<UniformBlock>() as u64;
}

/// std140 byte offsets of the block members, keyed by shader name.
const MEMBER_OFFSETS: [(&str, wgpu::BufferAddress); 4] = [
    ("iResolution", 0),
    ("iTime", 8),
    ("iTimeDelta", 12),
    ("iFrame", 16),
];

/// A resolved location inside the uniform block.
///
/// Resolution happens once after the pipeline is built. An unknown name
/// resolves to the sentinel; pushes through a sentinel handle are silently
/// dropped rather than erroring, mirroring a null uniform location.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct UniformHandle(Option<wgpu::BufferAddress>);

impl UniformHandle {
    pub(crate) fn is_resolved(&self) -> bool {
        self.0.is_some()
    }

    /// Writes `bytes` into a CPU-side copy of the block. No-op on a sentinel.
    /// Exists so the offset arithmetic is testable without a device.
    #[cfg_attr(not(test), allow(dead_code))]
    pub(crate) fn stage(&self, block: &mut [u8], bytes: &[u8]) {
        let Some(offset) = self.0 else { return };
        let start = offset as usize;
        block[start..start + bytes.len()].copy_from_slice(bytes);
    }
}

/// Resolves a member name to its offset inside the block.
pub(crate) fn resolve(name: &str) -> UniformHandle {
    UniformHandle(
        MEMBER_OFFSETS
            .iter()
            .find(|(member, _)| *member == name)
            .map(|(_, offset)| *offset),
    )
}

/// Holds the resolved handles for every member the render loop pushes.
pub(crate) struct UniformBinder {
    time: UniformHandle,
    time_delta: UniformHandle,
    frame: UniformHandle,
    resolution: UniformHandle,
}

impl UniformBinder {
    /// Resolves all member handles once, after the program links.
    pub(crate) fn resolve_all() -> Self {
        let binder = Self {
            time: resolve("iTime"),
            time_delta: resolve("iTimeDelta"),
            frame: resolve("iFrame"),
            resolution: resolve("iResolution"),
        };
        for (name, handle) in [
            ("iTime", binder.time),
            ("iTimeDelta", binder.time_delta),
            ("iFrame", binder.frame),
            ("iResolution", binder.resolution),
        ] {
            if !handle.is_resolved() {
                tracing::warn!(name, "uniform not found; pushes will be dropped");
            }
        }
        binder
    }

    /// Pushes the per-frame time state from the clock sample.
    pub(crate) fn push_frame(
        &self,
        queue: &wgpu::Queue,
        buffer: &wgpu::Buffer,
        sample: &FrameSample,
        frame_index: i32,
    ) {
        Self::push(queue, buffer, self.time, bytemuck::bytes_of(&sample.elapsed_seconds));
        let delta_seconds = sample.delta.as_secs_f32();
        Self::push(queue, buffer, self.time_delta, bytemuck::bytes_of(&delta_seconds));
        Self::push(queue, buffer, self.frame, bytemuck::bytes_of(&frame_index));
    }

    /// Pushes the surface resolution; called at setup and on every resize.
    pub(crate) fn push_resolution(
        &self,
        queue: &wgpu::Queue,
        buffer: &wgpu::Buffer,
        width: f32,
        height: f32,
    ) {
        let resolution = [width, height];
        Self::push(queue, buffer, self.resolution, bytemuck::bytes_of(&resolution));
    }

    fn push(queue: &wgpu::Queue, buffer: &wgpu::Buffer, handle: UniformHandle, bytes: &[u8]) {
        let Some(offset) = handle.0 else { return };
        queue.write_buffer(buffer, offset, bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_matches_std140_size() {
        // std140 rounds the block up to a multiple of 16 bytes.
        assert_eq!(UniformBlock::SIZE, 32);
    }

    #[test]
    fn resolved_offsets_match_field_layout() {
        let block = UniformBlock::new(800, 600);
        let base = &block as *const _ as usize;
        let time = &block.i_time as *const _ as usize;
        let delta = &block.i_time_delta as *const _ as usize;
        let frame = &block.i_frame as *const _ as usize;

        assert_eq!(resolve("iResolution"), UniformHandle(Some(0)));
        assert_eq!(resolve("iTime"), UniformHandle(Some((time - base) as u64)));
        assert_eq!(resolve("iTimeDelta"), UniformHandle(Some((delta - base) as u64)));
        assert_eq!(resolve("iFrame"), UniformHandle(Some((frame - base) as u64)));
    }

    #[test]
    fn unknown_name_resolves_to_sentinel() {
        let handle = resolve("iMouse");
        assert!(!handle.is_resolved());
    }

    #[test]
    fn staging_through_a_sentinel_is_a_no_op() {
        let mut block = [0xAAu8; UniformBlock::SIZE as usize];
        let before = block;
        resolve("iMouse").stage(&mut block, bytemuck::bytes_of(&1.0_f32));
        assert_eq!(block, before);
    }

    #[test]
    fn staging_writes_at_the_resolved_offset() {
        let mut block = [0u8; UniformBlock::SIZE as usize];
        resolve("iTime").stage(&mut block, bytemuck::bytes_of(&1.5_f32));

        let floats: &[f32] = bytemuck::cast_slice(&block);
        assert_eq!(floats[2], 1.5);
        assert_eq!(floats[0], 0.0);
    }
}
