use wgpu::util::DeviceExt;

/// Two counter-clockwise triangles covering the normalized device square.
pub(crate) const QUAD_VERTICES: [[f32; 2]; 6] = [
    [-1.0, -1.0],
    [1.0, -1.0],
    [-1.0, 1.0],
    [-1.0, 1.0],
    [1.0, -1.0],
    [1.0, 1.0],
];

const QUAD_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

/// The persistent full-screen quad, uploaded once at setup as static data.
pub(crate) struct QuadGeometry {
    pub vertex_buffer: wgpu::Buffer,
}

impl QuadGeometry {
    pub(crate) fn upload(device: &wgpu::Device) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("fullscreen quad"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });
        Self { vertex_buffer }
    }

    pub(crate) fn vertex_count() -> u32 {
        QUAD_VERTICES.len() as u32
    }

    /// Attribute slot 0: two floats per vertex, tightly packed, no offset.
    pub(crate) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: (2 * std::mem::size_of::<f32>()) as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &QUAD_ATTRIBUTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed_area(triangle: &[[f32; 2]]) -> f32 {
        let [x0, y0] = triangle[0];
        let [x1, y1] = triangle[1];
        let [x2, y2] = triangle[2];
        (x1 - x0) * (y2 - y0) - (y1 - y0) * (x2 - x0)
    }

    #[test]
    fn quad_has_six_vertices_of_two_components() {
        assert_eq!(QUAD_VERTICES.len(), 6);
        let floats: &[f32] = bytemuck::cast_slice(&QUAD_VERTICES);
        assert_eq!(floats.len(), 12);
    }

    #[test]
    fn quad_covers_the_full_ndc_square() {
        let xs: Vec<f32> = QUAD_VERTICES.iter().map(|v| v[0]).collect();
        let ys: Vec<f32> = QUAD_VERTICES.iter().map(|v| v[1]).collect();
        assert_eq!(xs.iter().cloned().fold(f32::INFINITY, f32::min), -1.0);
        assert_eq!(xs.iter().cloned().fold(f32::NEG_INFINITY, f32::max), 1.0);
        assert_eq!(ys.iter().cloned().fold(f32::INFINITY, f32::min), -1.0);
        assert_eq!(ys.iter().cloned().fold(f32::NEG_INFINITY, f32::max), 1.0);
    }

    #[test]
    fn both_triangles_wind_counter_clockwise() {
        assert!(signed_area(&QUAD_VERTICES[..3]) > 0.0);
        assert!(signed_area(&QUAD_VERTICES[3..]) > 0.0);
    }

    #[test]
    fn layout_binds_slot_zero_with_two_float_stride() {
        let layout = QuadGeometry::layout();
        assert_eq!(layout.array_stride, 8);
        assert_eq!(layout.attributes.len(), 1);
        assert_eq!(layout.attributes[0].shader_location, 0);
        assert_eq!(layout.attributes[0].offset, 0);
        assert_eq!(layout.attributes[0].format, wgpu::VertexFormat::Float32x2);
    }
}
