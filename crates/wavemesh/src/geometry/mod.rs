//! In-place geometric transforms on a parsed mesh
//!
//! All operations mutate the mesh's owned arrays directly and keep the
//! triangle/group structure untouched unless stated otherwise. Operations
//! that need geometry the mesh does not have (no vertices, no normals)
//! log a warning and leave the mesh unchanged.

use std::f32::consts::{FRAC_PI_2, PI};
use std::num::NonZeroU32;

use crate::foundation::math::{Aabb, Vec2};
use crate::mesh::Mesh;

impl Mesh {
    /// Bounding box over all vertices; `None` for an empty mesh.
    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(self.vertices.iter().skip(1).copied())
    }

    /// Axis-aligned bounding-box extents (width, height, depth);
    /// zero for an empty mesh.
    pub fn dimensions(&self) -> [f32; 3] {
        self.bounds().map_or([0.0; 3], |b| b.extents().into())
    }

    /// Multiply every vertex coordinate by `factor`.
    pub fn scale(&mut self, factor: f32) {
        for vertex in self.vertices.iter_mut().skip(1) {
            *vertex *= factor;
        }
    }

    /// Center the mesh on the origin and scale it uniformly so the largest
    /// bounding-box extent becomes exactly 2. Returns the scale factor
    /// that was applied.
    pub fn unitize(&mut self) -> f32 {
        let Some(bounds) = self.bounds() else {
            log::warn!("unitize: mesh has no vertices");
            return 1.0;
        };
        let center = bounds.center();
        let largest = bounds.largest_extent();
        let factor = if largest > 0.0 { 2.0 / largest } else { 1.0 };
        if largest <= 0.0 {
            log::warn!("unitize: degenerate bounding box, translating only");
        }

        for vertex in self.vertices.iter_mut().skip(1) {
            *vertex = (*vertex - center) * factor;
        }
        factor
    }

    /// Flip the facing of every triangle: swap corners 0 and 2 of the
    /// vertex-index triple (and of the normal/UV triples when those
    /// channels exist), then negate every stored normal vector.
    ///
    /// Applying this twice is an identity transform.
    pub fn reverse_winding(&mut self) {
        let has_normals = self.normal_count() > 0;
        let has_uvs = self.uv_count() > 0;

        for triangle in &mut self.triangles {
            triangle.vertices.swap(0, 2);
            if has_normals {
                triangle.normals.swap(0, 2);
            }
            if has_uvs {
                triangle.uvs.swap(0, 2);
            }
        }

        for normal in self.normals.iter_mut().skip(1) {
            *normal = -*normal;
        }
    }

    /// Replace the UV array with one planar-projected entry per vertex:
    /// (x, z) relative to the bounding-box center, remapped into `[0, 1]`.
    /// Triangle UV indices become aliases of the vertex indices.
    pub fn generate_linear_texcoords(&mut self) {
        let Some(bounds) = self.bounds() else {
            log::warn!("generate_linear_texcoords: mesh has no vertices");
            return;
        };
        let largest = bounds.largest_extent();
        if largest <= 0.0 {
            log::warn!("generate_linear_texcoords: degenerate bounding box");
            return;
        }
        let center = bounds.center();
        let factor = 2.0 / largest;

        let mut uvs = vec![Vec2::zeros(); self.vertex_count() + 1];
        for (slot, vertex) in uvs.iter_mut().zip(self.vertices.iter()).skip(1) {
            let x = (vertex.x - center.x) * factor;
            let z = (vertex.z - center.z) * factor;
            *slot = Vec2::new((x + 1.0) / 2.0, (z + 1.0) / 2.0);
        }
        self.uvs = uvs;

        // UV storage now reuses the vertex index space.
        for triangle in &mut self.triangles {
            triangle.uvs = triangle.vertices.map(NonZeroU32::new);
        }
    }

    /// Replace the UV array with one spherically-projected entry per
    /// normal. Triangle UV indices become aliases of the normal indices.
    ///
    /// The normal's components are remapped (z, y, x) before projection;
    /// this biases pole distortion onto one axis on purpose.
    pub fn generate_spherical_texcoords(&mut self) {
        if self.normal_count() == 0 {
            log::warn!("generate_spherical_texcoords: mesh has no normals");
            return;
        }

        let mut uvs = vec![Vec2::zeros(); self.normal_count() + 1];
        for (slot, normal) in uvs.iter_mut().zip(self.normals.iter()).skip(1) {
            let (z, y, x) = (normal.x, normal.y, normal.z);
            let r = (x * x + y * y).sqrt();
            let rho = (r * r + z * z).sqrt();

            let (theta, phi) = if r == 0.0 {
                (0.0, 0.0)
            } else {
                let phi = if z == 0.0 { FRAC_PI_2 } else { (z / rho).acos() };
                let theta = if y == 0.0 {
                    FRAC_PI_2
                } else {
                    (y / r).asin() + FRAC_PI_2
                };
                (theta, phi)
            };
            *slot = Vec2::new(theta / PI, phi / PI);
        }
        self.uvs = uvs;

        for triangle in &mut self.triangles {
            triangle.uvs = triangle.normals;
        }
    }
}
