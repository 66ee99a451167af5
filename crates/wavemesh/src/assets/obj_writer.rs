//! Mesh and material document writers
//!
//! Serializes a mesh back to text, using the same "emit a state change
//! only when it differs" discipline as the render-batch compiler: a
//! `usemtl` line appears only at material transitions within the per-group
//! face lists. Output is structurally round-trippable through the parser.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use bitflags::bitflags;

use crate::mesh::{Material, Mesh};

use super::MeshError;

bitflags! {
    /// Optional output channels for the writers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct WriteMode: u32 {
        /// Write texture coordinates and UV corner indices
        const TEXCOORDS = 1 << 0;
        /// Write `mtllib`/`usemtl` lines and the companion library file
        const MATERIALS = 1 << 1;
    }
}

/// Drop requested channels the mesh cannot provide, warning once per flag.
fn effective_mode(mesh: &Mesh, mut mode: WriteMode) -> WriteMode {
    if mode.contains(WriteMode::TEXCOORDS) && mesh.uv_count() == 0 {
        log::warn!("texture coordinate output requested with no texture coordinates defined");
        mode.remove(WriteMode::TEXCOORDS);
    }
    if mode.contains(WriteMode::MATERIALS) && mesh.mtllib.is_none() {
        log::warn!("material output requested with no material library name defined");
        mode.remove(WriteMode::MATERIALS);
    }
    mode
}

/// Write a mesh document to a file, plus the companion material library
/// next to it when material output is active.
///
/// # Errors
/// Fails when either file cannot be created or written.
pub fn write_obj<P: AsRef<Path>>(mesh: &Mesh, path: P, mode: WriteMode) -> Result<(), MeshError> {
    let path = path.as_ref();
    let mode = effective_mode(mesh, mode);

    let file = File::create(path).map_err(|e| {
        log::error!("can't create mesh document {}: {}", path.display(), e);
        e
    })?;
    let mut writer = BufWriter::new(file);
    write_document(mesh, &mut writer, mode)?;
    writer.flush()?;

    if mode.contains(WriteMode::MATERIALS) {
        if let Some(name) = &mesh.mtllib {
            let library_path = path.parent().unwrap_or_else(|| Path::new(".")).join(name);
            write_mtl(mesh, &library_path)?;
        }
    }
    Ok(())
}

/// Write a mesh document to any sink. The companion material library is
/// the caller's business here; only the `mtllib` reference line is
/// emitted.
pub fn write_obj_to<W: Write>(mesh: &Mesh, writer: &mut W, mode: WriteMode) -> Result<(), MeshError> {
    write_document(mesh, writer, effective_mode(mesh, mode))
}

fn write_document<W: Write>(mesh: &Mesh, w: &mut W, mode: WriteMode) -> Result<(), MeshError> {
    writeln!(w, "# indexed mesh document")?;
    writeln!(w, "# {} vertices", mesh.vertex_count())?;
    writeln!(w, "# {} normals", mesh.normal_count())?;
    writeln!(w, "# {} triangles in {} groups", mesh.triangle_count(), mesh.groups.len())?;

    if mode.contains(WriteMode::MATERIALS) {
        if let Some(name) = &mesh.mtllib {
            writeln!(w)?;
            writeln!(w, "mtllib {name}")?;
        }
    }

    writeln!(w)?;
    for vertex in mesh.vertices.iter().skip(1) {
        writeln!(w, "v {} {} {}", vertex.x, vertex.y, vertex.z)?;
    }
    for normal in mesh.normals.iter().skip(1) {
        writeln!(w, "vn {} {} {}", normal.x, normal.y, normal.z)?;
    }
    if mode.contains(WriteMode::TEXCOORDS) {
        for uv in mesh.uvs.iter().skip(1) {
            writeln!(w, "vt {} {}", uv.x, uv.y)?;
        }
    }

    // Per-group face lists; usemtl only on material transitions, the same
    // coalescing the batch compiler applies to state commands.
    let mut current_material: Option<usize> = None;
    for group in &mesh.groups {
        writeln!(w)?;
        writeln!(w, "g {}", group.name)?;
        for &triangle_index in &group.triangles {
            let triangle = &mesh.triangles[triangle_index as usize];

            if mode.contains(WriteMode::MATERIALS) && current_material != Some(triangle.material)
            {
                let name = mesh
                    .materials
                    .get(triangle.material)
                    .map_or("default", |m| m.name.as_str());
                writeln!(w, "usemtl {name}")?;
                current_material = Some(triangle.material);
            }

            write!(w, "f")?;
            for corner in 0..3 {
                let vertex = triangle.vertices[corner];
                let uv = triangle.uvs[corner].filter(|_| mode.contains(WriteMode::TEXCOORDS));
                let normal = triangle.normals[corner];
                match (uv, normal) {
                    (Some(t), Some(n)) => write!(w, " {vertex}/{t}/{n}")?,
                    (Some(t), None) => write!(w, " {vertex}/{t}")?,
                    (None, Some(n)) => write!(w, " {vertex}//{n}")?,
                    (None, None) => write!(w, " {vertex}")?,
                }
            }
            writeln!(w)?;
        }
    }
    Ok(())
}

/// Write the mesh's material library to a file.
///
/// # Errors
/// Fails when the file cannot be created or written.
pub fn write_mtl<P: AsRef<Path>>(mesh: &Mesh, path: P) -> Result<(), MeshError> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| {
        log::error!("can't create material library {}: {}", path.display(), e);
        e
    })?;
    let mut writer = BufWriter::new(file);
    write_mtl_to(mesh, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Write the mesh's material library to any sink.
pub fn write_mtl_to<W: Write>(mesh: &Mesh, w: &mut W) -> Result<(), MeshError> {
    writeln!(w, "# material library, {} materials", mesh.materials.len())?;
    for material in &mesh.materials {
        writeln!(w)?;
        writeln!(w, "newmtl {}", material.name)?;
        writeln!(
            w,
            "Ka {} {} {}",
            material.ambient[0], material.ambient[1], material.ambient[2]
        )?;
        writeln!(
            w,
            "Kd {} {} {}",
            material.diffuse[0], material.diffuse[1], material.diffuse[2]
        )?;
        writeln!(
            w,
            "Ks {} {} {}",
            material.specular[0], material.specular[1], material.specular[2]
        )?;
        writeln!(w, "d {}", material.diffuse[3])?;
        writeln!(w, "Ns {}", Material::unscale_shininess(material.shininess))?;
        if let Some(key) = material.texture {
            if let Some(name) = mesh.texture_name(key) {
                writeln!(w, "map_Kd {name}")?;
            }
        }
    }
    Ok(())
}
