use std::cell::RefCell;
use std::rc::Rc;

use crate::error::Result;

/// Opaque handle to a device-resident texture, minted by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// The two shader stages, consumed as opaque text blobs.
#[derive(Debug, Clone, Copy)]
pub struct ShaderSources<'a> {
    pub vertex: &'a str,
    pub fragment: &'a str,
}

/// One entry of the vertex layout: `components` f32s read at `offset` bytes
/// into each `stride`-byte record.
#[derive(Debug, Clone)]
pub struct AttributeBinding {
    pub name: String,
    pub components: u32,
    pub offset: u64,
    pub stride: u64,
}

#[derive(Debug, Clone)]
pub struct UniformBinding {
    pub name: String,
    pub values: Vec<f32>,
}

/// The capability seam between the batching core and a graphics API.
///
/// Call ordering is the contract: `compile_program` before anything else,
/// `upload_vertices` before the `draw` covering them, `bind_texture` before
/// the draws that sample it. The core never touches a graphics API directly.
pub trait GraphicsDevice {
    /// Compiles and links the shader program. Handle-creation failure is
    /// fatal ([`crate::Error::DeviceInit`]); compile/link diagnostics are
    /// logged but do not abort.
    fn compile_program(&mut self, shaders: &ShaderSources<'_>) -> Result<()>;

    fn register_attribute(&mut self, attribute: &AttributeBinding) -> Result<()>;

    fn set_uniform(&mut self, uniform: &UniformBinding) -> Result<()>;

    /// Uploads tightly packed RGBA8 pixels and returns the resident handle.
    fn create_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> Result<TextureHandle>;

    fn bind_texture(&mut self, handle: TextureHandle) -> Result<()>;

    fn upload_vertices(&mut self, data: &[f32]) -> Result<()>;

    /// Draws `vertex_count` vertices from the last upload as triangles.
    fn draw(&mut self, vertex_count: u32) -> Result<()>;

    /// Flushes the frame to the screen. No-op for headless devices.
    fn present(&mut self) -> Result<()> {
        Ok(())
    }

    /// Adjusts the output viewport. No-op for headless devices.
    fn set_viewport(&mut self, _width: u32, _height: u32) -> Result<()> {
        Ok(())
    }
}

/// Everything a [`RecordingDevice`] observed, in call order.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceOp {
    CompileProgram,
    RegisterAttribute { name: String },
    SetUniform { name: String, values: Vec<f32> },
    CreateTexture { width: u32, height: u32 },
    BindTexture(TextureHandle),
    UploadVertices(Vec<f32>),
    Draw { vertex_count: u32 },
    Present,
    SetViewport { width: u32, height: u32 },
}

/// Headless device that records every call for assertions.
///
/// The log is shared through `Rc<RefCell<..>>` so it stays readable after the
/// device is boxed into a renderer.
#[derive(Default)]
pub struct RecordingDevice {
    ops: Rc<RefCell<Vec<DeviceOp>>>,
    next_texture: u32,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle to the op log.
    pub fn log(&self) -> Rc<RefCell<Vec<DeviceOp>>> {
        Rc::clone(&self.ops)
    }
}

impl GraphicsDevice for RecordingDevice {
    fn compile_program(&mut self, _shaders: &ShaderSources<'_>) -> Result<()> {
        self.ops.borrow_mut().push(DeviceOp::CompileProgram);
        Ok(())
    }

    fn register_attribute(&mut self, attribute: &AttributeBinding) -> Result<()> {
        self.ops.borrow_mut().push(DeviceOp::RegisterAttribute {
            name: attribute.name.clone(),
        });
        Ok(())
    }

    fn set_uniform(&mut self, uniform: &UniformBinding) -> Result<()> {
        self.ops.borrow_mut().push(DeviceOp::SetUniform {
            name: uniform.name.clone(),
            values: uniform.values.clone(),
        });
        Ok(())
    }

    fn create_texture(&mut self, width: u32, height: u32, _rgba: &[u8]) -> Result<TextureHandle> {
        self.ops
            .borrow_mut()
            .push(DeviceOp::CreateTexture { width, height });
        let handle = TextureHandle(self.next_texture);
        self.next_texture += 1;
        Ok(handle)
    }

    fn bind_texture(&mut self, handle: TextureHandle) -> Result<()> {
        self.ops.borrow_mut().push(DeviceOp::BindTexture(handle));
        Ok(())
    }

    fn upload_vertices(&mut self, data: &[f32]) -> Result<()> {
        self.ops
            .borrow_mut()
            .push(DeviceOp::UploadVertices(data.to_vec()));
        Ok(())
    }

    fn draw(&mut self, vertex_count: u32) -> Result<()> {
        self.ops.borrow_mut().push(DeviceOp::Draw { vertex_count });
        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        self.ops.borrow_mut().push(DeviceOp::Present);
        Ok(())
    }

    fn set_viewport(&mut self, width: u32, height: u32) -> Result<()> {
        self.ops
            .borrow_mut()
            .push(DeviceOp::SetViewport { width, height });
        Ok(())
    }
}
