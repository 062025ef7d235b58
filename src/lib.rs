//! Minimal 2D sprite-batching renderer: geometry is grouped by texture and
//! flushed to the graphics device as one draw call per group.

pub mod app;
pub mod device;
pub mod error;
pub mod geometry;
pub mod scene;
pub mod texture;
pub mod utils;
pub mod vertex_buffer;
pub mod wgpu_device;

use std::collections::HashMap;
use std::path::Path;

use device::{AttributeBinding, GraphicsDevice, ShaderSources, UniformBinding};
use error::{Error, Result};
use geometry::{quad_bounds, Bounds, SOLID_TEXTURE, UNIT_UV};
use texture::{TextureEntry, TextureSource};
use utils::Vertex;
use vertex_buffer::VertexBuffer;

pub use app::{run_app, WindowConfig};
pub use device::{DeviceOp, RecordingDevice, TextureHandle};
pub use geometry::{Geometry, Rectangle, TexturedRectangle};
pub use scene::Scene;
pub use wgpu_device::WgpuDevice;

/// Default size of the shared vertex buffer, in f32 components. Large enough
/// for ~238 quads per batch.
pub const DEFAULT_BUFFER_CAPACITY: usize = 10_000;

// Quad corners expanded as two triangles: TL,TR,BR then TL,BR,BL.
const QUAD_TRIANGLES: [usize; 6] = [0, 1, 2, 0, 2, 3];

/// Owns the graphics device, the compiled shader program, the shared vertex
/// buffer and the texture registry; exposes the primitives to push quad data
/// and flush it as one draw call.
///
/// Device and resource-creation failures at construction are unrecoverable
/// for this instance. Texture-load failures are recoverable at the call site.
pub struct Renderer {
    device: Box<dyn GraphicsDevice>,
    buffer: VertexBuffer,
    textures: HashMap<String, TextureEntry>,
    attributes: Vec<AttributeBinding>,
    uniforms: Vec<UniformBinding>,
}

impl Renderer {
    /// Compiles the shader program and pre-registers the 1x1 opaque white
    /// `"pixel"` texture so untextured shapes batch through the textured
    /// pipeline.
    pub fn new(device: Box<dyn GraphicsDevice>, shaders: &ShaderSources<'_>) -> Result<Self> {
        Self::with_buffer_capacity(device, shaders, DEFAULT_BUFFER_CAPACITY)
    }

    /// Like [`Renderer::new`] with an explicit vertex-buffer capacity (in f32
    /// components). Size it for the largest single-frame batch.
    pub fn with_buffer_capacity(
        mut device: Box<dyn GraphicsDevice>,
        shaders: &ShaderSources<'_>,
        capacity: usize,
    ) -> Result<Self> {
        device.compile_program(shaders)?;

        let mut renderer = Renderer {
            device,
            buffer: VertexBuffer::auto_clearing(capacity),
            textures: HashMap::new(),
            attributes: Vec::new(),
            uniforms: Vec::new(),
        };
        renderer.create_texture_from_pixels(SOLID_TEXTURE, 1, 1, &[255, 255, 255, 255])?;
        Ok(renderer)
    }

    /// Records a vertex-layout binding and forwards it to the device.
    /// Offsets and strides must be consistent with the packed
    /// [`Vertex`] record.
    pub fn add_attribute(
        &mut self,
        name: &str,
        components: u32,
        offset: u64,
        stride: u64,
    ) -> Result<()> {
        let binding = AttributeBinding {
            name: name.to_string(),
            components,
            offset,
            stride,
        };
        self.device.register_attribute(&binding)?;
        self.attributes.push(binding);
        Ok(())
    }

    /// Records and uploads a uniform binding.
    pub fn add_uniform(&mut self, name: &str, values: &[f32]) -> Result<()> {
        let binding = UniformBinding {
            name: name.to_string(),
            values: values.to_vec(),
        };
        self.device.set_uniform(&binding)?;
        self.uniforms.push(binding);
        Ok(())
    }

    /// Decodes the image at `path` and registers it under `name`.
    pub fn create_texture(&mut self, path: impl AsRef<Path>, name: &str) -> Result<()> {
        let decoded = texture::decode_image(path.as_ref(), name)?;
        self.create_texture_from_pixels(name, decoded.width, decoded.height, &decoded.rgba)
    }

    /// Registers tightly packed RGBA8 pixels under `name`. Re-registering a
    /// name replaces the previous entry (last write wins).
    pub fn create_texture_from_pixels(
        &mut self,
        name: &str,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Result<()> {
        let handle = self.device.create_texture(width, height, rgba)?;
        let entry = TextureEntry {
            handle,
            width,
            height,
        };
        if self.textures.insert(name.to_string(), entry).is_some() {
            log::warn!("texture {name:?} re-registered, previous entry replaced");
        }
        Ok(())
    }

    /// Loads every source, then invokes `on_complete`. All-or-nothing: a
    /// decode failure registers nothing and the callback never runs.
    pub fn load_textures<F>(&mut self, sources: &[TextureSource], on_complete: F) -> Result<()>
    where
        F: FnOnce(&mut Renderer),
    {
        let mut decoded = Vec::with_capacity(sources.len());
        for source in sources {
            decoded.push((
                source.name.as_str(),
                texture::decode_image(&source.path, &source.name)?,
            ));
        }

        for (name, image) in &decoded {
            self.create_texture_from_pixels(name, image.width, image.height, &image.rgba)?;
        }

        log::debug!("loaded {} textures", decoded.len());
        on_complete(self);
        Ok(())
    }

    /// Binds the named texture as the current device texture.
    ///
    /// An unregistered `name` is a batching-key mismatch, fails with
    /// [`Error::UnknownTexture`] before any device call, and is not worth
    /// retrying.
    pub fn use_texture(&mut self, name: &str) -> Result<()> {
        let entry = self
            .textures
            .get(name)
            .ok_or_else(|| Error::UnknownTexture {
                name: name.to_string(),
            })?;
        self.device.bind_texture(entry.handle)
    }

    /// Appends one quad (6 vertices, two triangles) to the shared buffer.
    /// UV corner i pairs with position corner i.
    pub fn push_quad(&mut self, bounds: Bounds, uv_bounds: Bounds) -> Result<()> {
        let mut components = [0.0f32; 6 * Vertex::COMPONENTS];
        for (slot, &corner) in QUAD_TRIANGLES.iter().enumerate() {
            let vertex = Vertex::new(
                bounds[corner],
                Vertex::WHITE,
                [uv_bounds[corner].x, uv_bounds[corner].y],
            );
            components[slot * Vertex::COMPONENTS..(slot + 1) * Vertex::COMPONENTS]
                .copy_from_slice(&vertex.components());
        }
        // One add per quad, so an overflow never leaves a partial quad.
        self.buffer.add(&components)
    }

    /// Buffers a full-texture quad centered at `(x, y)`.
    pub fn draw_quad(&mut self, x: f32, y: f32, width: f32, height: f32) -> Result<()> {
        self.push_quad(quad_bounds(x, y, width, height), UNIT_UV)
    }

    /// Buffers a quad sampling the given UV sub-region.
    pub fn draw_quad_uv(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        uv_bounds: Bounds,
    ) -> Result<()> {
        self.push_quad(quad_bounds(x, y, width, height), uv_bounds)
    }

    /// Submits the accumulated buffer as one draw call and returns the vertex
    /// count. The shared buffer auto-clears as part of the snapshot. Flushing
    /// an empty buffer is a no-op.
    pub fn flush(&mut self) -> Result<u32> {
        if self.buffer.is_empty() {
            return Ok(0);
        }

        let (length, storage) = self.buffer.snapshot();
        let vertex_count = (length / Vertex::COMPONENTS) as u32;
        self.device.upload_vertices(&storage[..length])?;
        self.device.draw(vertex_count)?;
        log::debug!("flushed batch: {vertex_count} vertices ({length} components)");
        Ok(vertex_count)
    }

    /// Presents the frame through the device.
    pub fn present(&mut self) -> Result<()> {
        self.device.present()
    }

    /// Propagates a viewport change to the device.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.device.set_viewport(width, height)
    }

    pub fn buffer_data(&self) -> &VertexBuffer {
        &self.buffer
    }

    pub fn buffer_data_mut(&mut self) -> &mut VertexBuffer {
        &mut self.buffer
    }

    pub fn textures(&self) -> &HashMap<String, TextureEntry> {
        &self.textures
    }

    pub fn attributes(&self) -> &[AttributeBinding] {
        &self.attributes
    }

    pub fn uniforms(&self) -> &[UniformBinding] {
        &self.uniforms
    }

    pub fn device_mut(&mut self) -> &mut dyn GraphicsDevice {
        self.device.as_mut()
    }
}
