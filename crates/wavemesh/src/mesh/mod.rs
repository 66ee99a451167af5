//! Indexed mesh model
//!
//! The in-memory form of a parsed mesh document: flat 1-indexed attribute
//! arrays, one global triangle array, and named groups that reference
//! triangles by index. Slot 0 of every attribute array is reserved so the
//! stored indices match the source document exactly.

pub mod material;
pub mod texture;

use std::num::NonZeroU32;
use std::path::PathBuf;

use crate::foundation::math::{Vec2, Vec3};

pub use material::Material;
pub use texture::{Texture, TextureKey, TextureProvider, TextureRegistry};

/// Name of the group every mesh starts with.
pub const DEFAULT_GROUP: &str = "default";

/// Index of an optional per-corner attribute (normal or UV).
///
/// `None` is the "no data" sentinel; a `Some` value is a 1-based index into
/// the corresponding attribute array, so slot 0 can never be referenced.
pub type AttrIndex = Option<NonZeroU32>;

/// One triangle of the global triangle array.
///
/// Vertex indices are always present; normal and UV indices carry the
/// sentinel when the source corner had no such channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triangle {
    /// 1-based indices into the vertex array
    pub vertices: [u32; 3],

    /// 1-based indices into the normal array, or the sentinel
    pub normals: [AttrIndex; 3],

    /// 1-based indices into the UV array, or the sentinel
    pub uvs: [AttrIndex; 3],

    /// Index into the mesh's material table (0 = built-in default)
    pub material: usize,
}

impl Triangle {
    /// Triangle with the given vertex indices, no attribute channels, and
    /// the default material.
    pub fn from_vertices(vertices: [u32; 3]) -> Self {
        Self {
            vertices,
            normals: [None; 3],
            uvs: [None; 3],
            material: 0,
        }
    }
}

/// A named, ordered subset of the mesh's triangles.
///
/// Groups never own triangle storage; they hold indices into the mesh's
/// global triangle array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    /// Group name as it appeared in the document
    pub name: String,

    /// Indices into [`Mesh::triangles`], in document order
    pub triangles: Vec<u32>,
}

impl Group {
    /// Create an empty group.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            triangles: Vec::new(),
        }
    }
}

/// An indexed triangle mesh with its materials, textures, and groups.
///
/// The mesh exclusively owns all four attribute/triangle arrays. It is
/// either freshly constructed or explicitly [`reset`](Mesh::reset) before a
/// (re)parse; parsers guarantee it is never left partially populated.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    /// Path the mesh was read from, when it came from a file
    pub path: Option<PathBuf>,

    /// Material library name recorded from the document's `mtllib` line
    pub mtllib: Option<String>,

    /// Vertex positions, 1-indexed; slot 0 is reserved and zero-filled
    pub vertices: Vec<Vec3>,

    /// Vertex normals, 1-indexed; empty when the document has none
    pub normals: Vec<Vec3>,

    /// Texture coordinates, 1-indexed; empty when the document has none
    pub uvs: Vec<Vec2>,

    /// The single global triangle array
    pub triangles: Vec<Triangle>,

    /// Groups in document order; index 0 is always the default group
    pub groups: Vec<Group>,

    /// Material table; index 0 is always the built-in default material
    pub materials: Vec<Material>,

    /// Textures resolved for this mesh, at most one entry per distinct name
    pub textures: Vec<Texture>,
}

impl Default for Mesh {
    fn default() -> Self {
        Self {
            path: None,
            mtllib: None,
            vertices: Vec::new(),
            normals: Vec::new(),
            uvs: Vec::new(),
            triangles: Vec::new(),
            groups: vec![Group::new(DEFAULT_GROUP)],
            materials: vec![Material::default()],
            textures: Vec::new(),
        }
    }
}

impl Mesh {
    /// Create an empty mesh containing only the default group and the
    /// built-in default material.
    pub fn new() -> Self {
        Self::default()
    }

    /// Release all owned storage and return to the default-constructed
    /// state. Safe to call at any time; parsers call it on every fatal
    /// error path.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Number of vertices (slot 0 excluded).
    pub fn vertex_count(&self) -> usize {
        self.vertices.len().saturating_sub(1)
    }

    /// Number of normals (slot 0 excluded).
    pub fn normal_count(&self) -> usize {
        self.normals.len().saturating_sub(1)
    }

    /// Number of texture coordinates (slot 0 excluded).
    pub fn uv_count(&self) -> usize {
        self.uvs.len().saturating_sub(1)
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Position for a 1-based vertex index.
    ///
    /// # Panics
    /// Panics when the index is outside the validated range.
    pub fn vertex(&self, index: u32) -> Vec3 {
        self.vertices[index as usize]
    }

    /// Normal for an attribute index; the zero vector for the sentinel.
    pub fn normal(&self, index: AttrIndex) -> Vec3 {
        index.map_or_else(Vec3::zeros, |i| self.normals[i.get() as usize])
    }

    /// Texture coordinate for an attribute index; the zero vector for the
    /// sentinel.
    pub fn uv(&self, index: AttrIndex) -> Vec2 {
        index.map_or_else(Vec2::zeros, |i| self.uvs[i.get() as usize])
    }

    /// Find a group by name.
    pub fn find_group(&self, name: &str) -> Option<usize> {
        self.groups.iter().position(|g| g.name == name)
    }

    /// Find a group by name, creating it at the end of the group list when
    /// it does not exist yet.
    pub fn find_or_add_group(&mut self, name: &str) -> usize {
        match self.find_group(name) {
            Some(index) => index,
            None => {
                self.groups.push(Group::new(name));
                self.groups.len() - 1
            }
        }
    }

    /// Find a material by name. Linear scan; material tables are small.
    pub fn find_material(&self, name: &str) -> Option<usize> {
        self.materials.iter().position(|m| m.name == name)
    }

    /// Find an already-resolved texture by name.
    pub fn find_texture(&self, name: &str) -> Option<&Texture> {
        self.textures.iter().find(|t| t.name == name)
    }

    /// Name of the texture behind a resolved key, if the mesh knows it.
    pub fn texture_name(&self, key: TextureKey) -> Option<&str> {
        self.textures
            .iter()
            .find(|t| t.key == key)
            .map(|t| t.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mesh_state() {
        let mesh = Mesh::new();
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.normal_count(), 0);
        assert_eq!(mesh.uv_count(), 0);
        assert_eq!(mesh.triangle_count(), 0);
        assert_eq!(mesh.groups.len(), 1);
        assert_eq!(mesh.groups[0].name, DEFAULT_GROUP);
        assert_eq!(mesh.materials.len(), 1);
        assert_eq!(mesh.materials[0].name, "default");
    }

    #[test]
    fn test_reset_restores_default_state() {
        let mut mesh = Mesh::new();
        mesh.vertices = vec![Vec3::zeros(), Vec3::new(1.0, 2.0, 3.0)];
        mesh.triangles.push(Triangle::from_vertices([1, 1, 1]));
        mesh.find_or_add_group("wing");
        mesh.mtllib = Some("plane.mtl".to_string());

        mesh.reset();
        assert_eq!(mesh, Mesh::new());
    }

    #[test]
    fn test_find_or_add_group_reuses_existing() {
        let mut mesh = Mesh::new();
        let body = mesh.find_or_add_group("body");
        assert_eq!(body, 1);
        assert_eq!(mesh.find_or_add_group("body"), body);
        assert_eq!(mesh.find_or_add_group(DEFAULT_GROUP), 0);
        assert_eq!(mesh.groups.len(), 2);
    }

    #[test]
    fn test_attribute_lookup_with_sentinel() {
        let mut mesh = Mesh::new();
        mesh.normals = vec![Vec3::zeros(), Vec3::new(0.0, 1.0, 0.0)];
        assert_eq!(mesh.normal(None), Vec3::zeros());
        assert_eq!(
            mesh.normal(NonZeroU32::new(1)),
            Vec3::new(0.0, 1.0, 0.0)
        );
    }
}
