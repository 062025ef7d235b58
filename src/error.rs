use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failure taxonomy for the batching pipeline.
///
/// `BufferOverflow` and `UnknownTexture` indicate caller bugs (undersized
/// buffer, batching key that was never registered) and should surface in
/// testing rather than be handled at runtime. `DeviceInit` is fatal for the
/// renderer instance; recreate the whole renderer. `TextureLoad` is
/// recoverable at the call site by retrying that specific texture.
#[derive(Debug, Error)]
pub enum Error {
    #[error("vertex buffer overflow: {requested} components do not fit at length {length} (capacity {capacity})")]
    BufferOverflow {
        length: usize,
        requested: usize,
        capacity: usize,
    },

    #[error("graphics device initialization failed: {reason}")]
    DeviceInit { reason: String },

    #[error("texture {name:?} failed to load")]
    TextureLoad {
        name: String,
        #[source]
        source: image::ImageError,
    },

    #[error("texture {name:?} is not registered")]
    UnknownTexture { name: String },

    #[error("surface frame acquisition failed")]
    Surface(#[from] wgpu::SurfaceError),
}
