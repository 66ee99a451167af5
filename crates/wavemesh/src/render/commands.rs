//! Render state and draw commands
//!
//! The command vocabulary the batch compiler emits. Commands are plain
//! data; a renderer backend maps them onto its API one-to-one, in list
//! order.

use crate::mesh::TextureKey;

/// Which material color a [`RenderCommand::SetMaterialColor`] updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialColorTarget {
    /// Ambient reflectance
    Ambient,
    /// Diffuse reflectance (alpha carries dissolve)
    Diffuse,
    /// Specular reflectance
    Specular,
}

/// One entry of the compiled command list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderCommand {
    /// Update one of the fixed-function material colors
    SetMaterialColor {
        /// Color slot to update
        target: MaterialColorTarget,
        /// RGBA value
        color: [f32; 4],
    },

    /// Update the material's specular exponent (already in `[0, 128]`)
    SetMaterialShininess(f32),

    /// Bind a texture previously resolved through the texture provider
    SetTexture(TextureKey),

    /// Draw `vertex_count` vertices starting at `first` from the flat
    /// attribute buffers
    DrawPrimitives {
        /// Offset of the first vertex in the attribute buffers
        first: u32,
        /// Number of vertices to draw (always a multiple of 3)
        vertex_count: u32,
    },
}

impl RenderCommand {
    /// Whether this command changes render state (anything but a draw).
    pub fn is_state_change(&self) -> bool {
        !matches!(self, Self::DrawPrimitives { .. })
    }
}
