//! Greedy render-batch compiler
//!
//! Single pass over the mesh in traversal order (groups in mesh order,
//! each group's triangle list in list order), coalescing consecutive
//! same-material triangles into one draw command. This is order-preserving
//! batching, not a global optimizer: the number of state-change blocks
//! equals the number of material transitions actually encountered.

use bitflags::bitflags;

use crate::mesh::{Material, Mesh, TextureKey};

use super::commands::{MaterialColorTarget, RenderCommand};

bitflags! {
    /// Which state-change commands the compiler is asked to emit.
    /// Attribute buffers are always produced.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct BatchOptions: u32 {
        /// Emit material color/shininess blocks on material transitions
        const MATERIALS = 1 << 0;
        /// Emit texture binds on texture transitions
        const TEXTURES = 1 << 1;
    }
}

/// Compiler output: flat vertex-aligned attribute buffers plus the ordered
/// command list. Buffer entry `i` across the three buffers describes one
/// vertex; every triangle contributes three consecutive entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledBatches {
    /// Vertex positions in traversal order
    pub positions: Vec<[f32; 3]>,

    /// Vertex normals; the zero vector where a corner had no normal
    pub normals: Vec<[f32; 3]>,

    /// Texture coordinates; the zero vector where a corner had no UV
    pub uvs: Vec<[f32; 2]>,

    /// State and draw commands, to be executed in order
    pub commands: Vec<RenderCommand>,
}

impl CompiledBatches {
    /// Position buffer as raw bytes, ready for upload.
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Normal buffer as raw bytes, ready for upload.
    pub fn normal_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.normals)
    }

    /// UV buffer as raw bytes, ready for upload.
    pub fn uv_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.uvs)
    }

    /// Number of draw commands in the list.
    pub fn draw_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, RenderCommand::DrawPrimitives { .. }))
            .count()
    }

    /// Number of state-change commands in the list.
    pub fn state_change_count(&self) -> usize {
        self.commands.iter().filter(|c| c.is_state_change()).count()
    }
}

/// Running compiler state: the material/texture the GPU would currently
/// have bound, and the draw run accumulated since the last flush.
#[derive(Debug, Default)]
struct Cursor {
    material: Option<usize>,
    texture: Option<TextureKey>,
    run_start: u32,
    run_length: u32,
}

impl Cursor {
    fn flush(&mut self, commands: &mut Vec<RenderCommand>) {
        if self.run_length > 0 {
            commands.push(RenderCommand::DrawPrimitives {
                first: self.run_start,
                vertex_count: self.run_length,
            });
            self.run_start += self.run_length;
            self.run_length = 0;
        }
    }
}

/// Compile a mesh into flat attribute buffers and a coalesced command list.
///
/// Traversal order is the mesh's group order, then each group's triangle
/// list; buffers always contain `3 * triangle_count` entries in that order.
pub fn compile(mesh: &Mesh, options: BatchOptions) -> CompiledBatches {
    let vertex_total = mesh.triangle_count() * 3;
    let mut out = CompiledBatches {
        positions: Vec::with_capacity(vertex_total),
        normals: Vec::with_capacity(vertex_total),
        uvs: Vec::with_capacity(vertex_total),
        commands: Vec::new(),
    };
    let mut cursor = Cursor::default();

    for group in &mesh.groups {
        for &triangle_index in &group.triangles {
            let triangle = &mesh.triangles[triangle_index as usize];

            // Unresolvable material indices fall back to the default.
            let material_index = if triangle.material < mesh.materials.len() {
                triangle.material
            } else {
                0
            };

            if options.intersects(BatchOptions::MATERIALS | BatchOptions::TEXTURES)
                && cursor.material != Some(material_index)
            {
                cursor.flush(&mut out.commands);
                let material = &mesh.materials[material_index];
                emit_material_block(&mut out.commands, material);
                if options.contains(BatchOptions::TEXTURES) && cursor.texture != material.texture
                {
                    if let Some(key) = material.texture {
                        out.commands.push(RenderCommand::SetTexture(key));
                    }
                    cursor.texture = material.texture;
                }
                cursor.material = Some(material_index);
            }

            for corner in 0..3 {
                out.positions
                    .push(mesh.vertex(triangle.vertices[corner]).into());
                out.normals.push(mesh.normal(triangle.normals[corner]).into());
                out.uvs.push(mesh.uv(triangle.uvs[corner]).into());
            }
            cursor.run_length += 3;
        }
    }
    cursor.flush(&mut out.commands);

    out
}

fn emit_material_block(commands: &mut Vec<RenderCommand>, material: &Material) {
    commands.push(RenderCommand::SetMaterialColor {
        target: MaterialColorTarget::Ambient,
        color: material.ambient,
    });
    commands.push(RenderCommand::SetMaterialColor {
        target: MaterialColorTarget::Diffuse,
        color: material.diffuse,
    });
    commands.push(RenderCommand::SetMaterialColor {
        target: MaterialColorTarget::Specular,
        color: material.specular,
    });
    commands.push(RenderCommand::SetMaterialShininess(material.shininess));
}
