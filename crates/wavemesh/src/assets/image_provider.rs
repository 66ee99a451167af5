//! Image-backed texture provider
//!
//! Thin wrapper over the `image` crate: decodes texture files referenced
//! by material libraries and hands out keys to the decoded data. Pixel
//! semantics beyond "RGBA8, ready for upload" are out of scope here.

use std::collections::HashMap;
use std::path::Path;

use slotmap::SlotMap;

use crate::mesh::{TextureKey, TextureProvider};

use super::MeshError;

/// Decoded image data ready for GPU upload.
#[derive(Debug, Clone)]
pub struct ImageData {
    /// Raw RGBA pixel data
    pub data: Vec<u8>,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl ImageData {
    /// Decode an image file into RGBA8.
    ///
    /// # Errors
    /// Fails when the file cannot be read or decoded.
    pub fn from_file(path: &Path) -> Result<Self, image::ImageError> {
        log::debug!("loading image {}", path.display());
        let decoded = image::open(path)?.to_rgba8();
        let (width, height) = decoded.dimensions();
        Ok(Self {
            data: decoded.into_raw(),
            width,
            height,
        })
    }

    /// A 1x1 solid-color image, used as the placeholder for textures that
    /// fail to decode.
    pub fn solid_color(color: [u8; 4]) -> Self {
        Self {
            data: color.to_vec(),
            width: 1,
            height: 1,
        }
    }
}

/// Texture provider that decodes files under the mesh's directory.
///
/// Resolution is memoized per name. A texture that cannot be decoded is an
/// unresolved reference, not a fatal error: a warning is logged and the
/// name maps to a white placeholder so render batches stay executable.
#[derive(Debug, Default)]
pub struct ImageTextureProvider {
    images: SlotMap<TextureKey, ImageData>,
    by_name: HashMap<String, TextureKey>,
}

impl ImageTextureProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decoded image behind a key.
    pub fn image(&self, key: TextureKey) -> Option<&ImageData> {
        self.images.get(key)
    }

    /// Number of distinct textures resolved.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Whether no textures were resolved yet.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

impl TextureProvider for ImageTextureProvider {
    fn resolve(&mut self, name: &str, search_root: &Path) -> Result<TextureKey, MeshError> {
        if let Some(&key) = self.by_name.get(name) {
            return Ok(key);
        }

        let path = search_root.join(name);
        let data = match ImageData::from_file(&path) {
            Ok(data) => {
                log::info!(
                    "loaded texture {} ({}x{})",
                    path.display(),
                    data.width,
                    data.height
                );
                data
            }
            Err(e) => {
                log::warn!("texture `{name}` failed to load, using placeholder: {e}");
                ImageData::solid_color([255, 255, 255, 255])
            }
        };

        let key = self.images.insert(data);
        self.by_name.insert(name.to_string(), key);
        Ok(key)
    }
}
