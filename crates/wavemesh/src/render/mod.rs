//! Render batch compilation
//!
//! Turns a parsed mesh into the two things a renderer collaborator needs:
//! flat, vertex-aligned attribute buffers ready for GPU upload, and an
//! ordered command list whose state changes are coalesced across runs of
//! same-material triangles. The renderer executes the list in order; this
//! module never talks to a graphics API itself.

pub mod batch;
pub mod commands;

pub use batch::{compile, BatchOptions, CompiledBatches};
pub use commands::{MaterialColorTarget, RenderCommand};
