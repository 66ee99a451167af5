//! Mesh and material document I/O
//!
//! Reading and writing of the text-based mesh format and its companion
//! material libraries, plus the image-backed texture provider.
//!
//! Error policy: malformed directives and unresolved references are
//! warnings (reported through the `log` facade, the offending line is
//! discarded or a default substituted); I/O failures and out-of-range
//! indices are fatal and abort the whole operation with the mesh reset.

pub mod image_provider;
pub mod mtl_parser;
pub mod obj_parser;
pub mod obj_writer;

pub use image_provider::{ImageData, ImageTextureProvider};
pub use mtl_parser::{parse_mtl, parse_mtl_from};
pub use obj_parser::{read_obj, read_obj_from};
pub use obj_writer::{write_mtl, write_mtl_to, write_obj, write_obj_to, WriteMode};

use thiserror::Error;

/// Fatal errors for document parsing and writing.
///
/// Anything recoverable (bad directive payloads, unknown directives,
/// unresolvable material or texture names) is logged and worked around
/// instead of surfacing here.
#[derive(Error, Debug)]
pub enum MeshError {
    /// Underlying stream or file failure
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    /// A material field directive appeared before any `newmtl`
    #[error("material library line {line}: expected `newmtl` before `{directive}`")]
    MaterialExpected {
        /// 1-based line number in the material document
        line: usize,
        /// The directive that was found instead
        directive: String,
    },

    /// A triangle references an attribute slot outside the parsed arrays;
    /// the document is corrupt or malicious
    #[error(
        "triangle {triangle} corner {corner}: {channel} index {index} out of range (1..={max})"
    )]
    OutOfRangeIndex {
        /// Index of the triangle in the global array
        triangle: usize,
        /// Corner 0..=2 within the triangle
        corner: usize,
        /// Which attribute channel was out of range
        channel: &'static str,
        /// The offending 1-based index
        index: u32,
        /// Largest valid index for the channel
        max: usize,
    },
}
