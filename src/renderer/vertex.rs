//! Vertex types for 2D terrain meshes

use bytemuck::{Pod, Zeroable};

/// Simple 2D vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    /// Byte stride of one vertex in a tightly packed buffer
    pub const STRIDE: usize = std::mem::size_of::<Vertex>();
}

/// View a mesh as raw bytes for upload by the host renderer
pub fn as_bytes(vertices: &[Vertex]) -> &[u8] {
    bytemuck::cast_slice(vertices)
}

/// Colors for terrain elements
pub mod colors {
    /// Surface highlight stroked along slopes
    pub const SLOPE_STROKE: [f32; 4] = [1.0, 1.0, 1.0, 0.6];
    /// Fill alpha for slope bodies
    pub const SLOPE_FILL_ALPHA: f32 = 0.8;

    /// Convert a 0xRRGGBB tint to linear RGBA
    pub fn tint_rgba(tint: u32, alpha: f32) -> [f32; 4] {
        let r = ((tint >> 16) & 0xff) as f32 / 255.0;
        let g = ((tint >> 8) & 0xff) as f32 / 255.0;
        let b = (tint & 0xff) as f32 / 255.0;
        [r, g, b, alpha]
    }
}
