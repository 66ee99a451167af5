//! Texture resolution seam
//!
//! The mesh model never touches pixels. Texture references in material
//! documents are resolved through the [`TextureProvider`] collaborator,
//! which hands back opaque slotmap keys. Providers are expected to memoize
//! per name, so repeated references within one mesh yield one load.

use std::collections::HashMap;
use std::path::Path;

use slotmap::SlotMap;

use crate::assets::MeshError;

slotmap::new_key_type! {
    /// Opaque handle to a resolved texture resource.
    pub struct TextureKey;
}

/// A texture reference held by the mesh: the document name plus the
/// provider's resource handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    /// Name as it appeared in the material document
    pub name: String,

    /// Handle returned by the provider
    pub key: TextureKey,
}

/// Collaborator that turns texture names into resource handles.
///
/// `search_root` is the directory of the mesh document being parsed;
/// relative texture names resolve against it.
pub trait TextureProvider {
    /// Resolve a texture name to a handle, loading it when necessary.
    fn resolve(&mut self, name: &str, search_root: &Path) -> Result<TextureKey, MeshError>;
}

/// A provider that hands out stable keys without performing any I/O.
///
/// Useful for dry runs and tests where only the identity of a texture
/// matters, not its pixels.
#[derive(Debug, Default)]
pub struct TextureRegistry {
    names: SlotMap<TextureKey, String>,
    by_name: HashMap<String, TextureKey>,
}

impl TextureRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct names resolved so far.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether no names were resolved yet.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Name registered for a key.
    pub fn name(&self, key: TextureKey) -> Option<&str> {
        self.names.get(key).map(String::as_str)
    }
}

impl TextureProvider for TextureRegistry {
    fn resolve(&mut self, name: &str, _search_root: &Path) -> Result<TextureKey, MeshError> {
        if let Some(&key) = self.by_name.get(name) {
            return Ok(key);
        }
        let key = self.names.insert(name.to_string());
        self.by_name.insert(name.to_string(), key);
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_memoizes_per_name() {
        let mut registry = TextureRegistry::new();
        let root = Path::new(".");
        let a = registry.resolve("hull.png", root).unwrap();
        let b = registry.resolve("hull.png", root).unwrap();
        let c = registry.resolve("wing.png", root).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.name(a), Some("hull.png"));
    }
}
