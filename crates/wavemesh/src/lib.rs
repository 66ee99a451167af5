//! # wavemesh
//!
//! Wavefront-style mesh document handling: a two-pass parser for the
//! indexed text format (with fan triangulation and group/material
//! resolution), in-place geometry transforms, a greedy render-batch
//! compiler producing GPU-ready flat buffers and a coalesced command
//! list, and structural round-trip writers.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use wavemesh::prelude::*;
//!
//! fn main() -> Result<(), MeshError> {
//!     let mut mesh = Mesh::new();
//!     let mut textures = TextureRegistry::new();
//!     read_obj(&mut mesh, "models/teapot.obj", &mut textures)?;
//!
//!     mesh.unitize();
//!     let batches = compile(&mesh, BatchOptions::MATERIALS);
//!     println!("{} draw calls", batches.draw_count());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod assets;
pub mod config;
pub mod foundation;
pub mod geometry;
pub mod mesh;
pub mod render;

pub use assets::MeshError;

/// Common imports for library users
pub mod prelude {
    pub use crate::assets::{
        read_obj, read_obj_from, write_obj, write_obj_to, ImageTextureProvider, MeshError,
        WriteMode,
    };
    pub use crate::config::{Config, PipelineConfig, TexGenMode};
    pub use crate::foundation::math::{Vec2, Vec3};
    pub use crate::mesh::{
        AttrIndex, Group, Material, Mesh, Texture, TextureKey, TextureProvider, TextureRegistry,
        Triangle,
    };
    pub use crate::render::{compile, BatchOptions, CompiledBatches, RenderCommand};
}
