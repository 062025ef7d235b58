use std::path::{Path, PathBuf};

use crate::device::TextureHandle;
use crate::error::{Error, Result};

/// A texture to load: image file at `path`, registered under `name`.
#[derive(Debug, Clone)]
pub struct TextureSource {
    pub name: String,
    pub path: PathBuf,
}

impl TextureSource {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        TextureSource {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// Registry entry: the device-resident handle plus pixel dimensions.
#[derive(Debug, Clone, Copy)]
pub struct TextureEntry {
    pub handle: TextureHandle,
    pub width: u32,
    pub height: u32,
}

/// Decoded pixels ready for device upload.
#[derive(Debug)]
pub(crate) struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Decodes an image file into tightly packed RGBA8.
pub(crate) fn decode_image(path: &Path, name: &str) -> Result<DecodedImage> {
    let image = image::open(path)
        .map_err(|source| Error::TextureLoad {
            name: name.to_string(),
            source,
        })?
        .to_rgba8();
    let (width, height) = image.dimensions();
    Ok(DecodedImage {
        width,
        height,
        rgba: image.into_raw(),
    })
}
