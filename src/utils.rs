#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Default for Position {
    fn default() -> Self {
        Position { x: 0.0, y: 0.0 }
    }
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Position { x, y }
    }
}

/// Packed per-vertex record consumed by the device pipeline.
///
/// The layout is the wire contract between the scene and a fixed shader:
/// 7 packed f32 components `[x, y, r, g, b, u, v]`, 28-byte stride,
/// position at byte 0, color at 8, UV at 20.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    /// f32 components per vertex.
    pub const COMPONENTS: usize = 7;
    /// Byte stride of one packed vertex.
    pub const STRIDE: u64 = std::mem::size_of::<Vertex>() as u64;
    pub const POSITION_OFFSET: u64 = 0;
    pub const COLOR_OFFSET: u64 = 8;
    pub const UV_OFFSET: u64 = 20;

    /// Batched sprites carry a fixed opaque white color; tinting is the
    /// texture's job.
    pub const WHITE: [f32; 3] = [1.0, 1.0, 1.0];

    pub fn new(position: Position, color: [f32; 3], uv: [f32; 2]) -> Self {
        Vertex {
            position: [position.x, position.y],
            color,
            uv,
        }
    }

    /// The record flattened in wire order.
    pub fn components(&self) -> [f32; Self::COMPONENTS] {
        [
            self.position[0],
            self.position[1],
            self.color[0],
            self.color[1],
            self.color[2],
            self.uv[0],
            self.uv[1],
        ]
    }
}
