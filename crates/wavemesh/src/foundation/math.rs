//! Math utilities and types
//!
//! Provides the fundamental math types used by the mesh model and the
//! geometry transforms.

pub use nalgebra::{Vector2, Vector3, Vector4};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// Axis-aligned bounding box over a point set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Smallest coordinate on each axis
    pub min: Vec3,

    /// Largest coordinate on each axis
    pub max: Vec3,
}

impl Aabb {
    /// Compute the bounding box of a point set; `None` when the set is empty.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Vec3>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Self { min: first, max: first };
        for p in iter {
            bounds.min = bounds.min.inf(&p);
            bounds.max = bounds.max.sup(&p);
        }
        Some(bounds)
    }

    /// Center point of the box
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Per-axis extents (width, height, depth)
    pub fn extents(&self) -> Vec3 {
        self.max - self.min
    }

    /// Largest of the three extents
    pub fn largest_extent(&self) -> f32 {
        let e = self.extents();
        e.x.max(e.y).max(e.z)
    }
}
