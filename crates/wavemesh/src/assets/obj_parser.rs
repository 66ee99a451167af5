//! Mesh document parser
//!
//! Two passes over one rewindable stream, because the format carries no
//! upfront element counts: the first pass tallies vertices, normals, UVs,
//! triangles (after fan triangulation) and per-group triangle counts; the
//! second fills the exactly-sized arrays. Both passes tokenize lines
//! identically, so a discarded line can never desynchronize them.

use std::fs::File;
use std::io::{BufRead, BufReader, Seek};
use std::num::NonZeroU32;
use std::path::Path;

use crate::foundation::math::{Vec2, Vec3};
use crate::mesh::{AttrIndex, Mesh, TextureProvider, Triangle};

use super::mtl_parser::{directive_text, parse_mtl};
use super::MeshError;

/// Parser position threaded through the passes instead of shared state:
/// the group and material that newly tallied/filled triangles belong to.
#[derive(Debug, Clone, Copy, Default)]
struct ParseState {
    group: usize,
    material: usize,
}

/// Element counts gathered by the first pass.
#[derive(Debug, Default)]
struct Tally {
    vertices: usize,
    normals: usize,
    uvs: usize,
    triangles: usize,
    /// Triangle count per group, parallel to `mesh.groups`
    group_triangles: Vec<usize>,
}

/// One decoded face corner.
#[derive(Debug, Clone, Copy)]
struct Corner {
    vertex: u32,
    uv: AttrIndex,
    normal: AttrIndex,
}

/// Read a mesh document from a file.
///
/// The file's directory becomes the search root for material libraries and
/// textures. The mesh is reset first and reset again on any fatal error,
/// so it is never left partially populated.
///
/// # Errors
/// Fails when the document or a referenced material library cannot be
/// opened or read, when a material field directive precedes `newmtl`, or
/// when a triangle references an out-of-range attribute index.
pub fn read_obj<P: AsRef<Path>>(
    mesh: &mut Mesh,
    path: P,
    provider: &mut dyn TextureProvider,
) -> Result<(), MeshError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        log::error!("can't open mesh document {}: {}", path.display(), e);
        e
    })?;
    let mut reader = BufReader::new(file);
    let search_root = path.parent().unwrap_or_else(|| Path::new("."));

    read_obj_from(mesh, &mut reader, search_root, provider)?;
    mesh.path = Some(path.to_path_buf());
    Ok(())
}

/// Read a mesh document from any rewindable stream.
///
/// Same contract as [`read_obj`]; tests typically pass an
/// [`std::io::Cursor`].
pub fn read_obj_from<R: BufRead + Seek>(
    mesh: &mut Mesh,
    reader: &mut R,
    search_root: &Path,
    provider: &mut dyn TextureProvider,
) -> Result<(), MeshError> {
    mesh.reset();
    let result = parse_document(mesh, reader, search_root, provider);
    if result.is_err() {
        mesh.reset();
    }
    result
}

fn parse_document<R: BufRead + Seek>(
    mesh: &mut Mesh,
    reader: &mut R,
    search_root: &Path,
    provider: &mut dyn TextureProvider,
) -> Result<(), MeshError> {
    let tally = first_pass(mesh, reader, search_root, provider)?;

    // Size everything exactly from the tally. Slot 0 of each attribute
    // array is reserved; optional channels stay empty when absent.
    mesh.vertices = vec![Vec3::zeros(); tally.vertices + 1];
    if tally.normals > 0 {
        mesh.normals = vec![Vec3::zeros(); tally.normals + 1];
    }
    if tally.uvs > 0 {
        mesh.uvs = vec![Vec2::zeros(); tally.uvs + 1];
    }
    mesh.triangles.reserve_exact(tally.triangles);
    for (group, &count) in mesh.groups.iter_mut().zip(&tally.group_triangles) {
        group.triangles.reserve_exact(count);
    }

    reader.rewind()?;
    second_pass(mesh, reader)?;
    validate_indices(mesh)
}

/// Tally pass: count elements, create groups, load material libraries.
fn first_pass<R: BufRead>(
    mesh: &mut Mesh,
    reader: &mut R,
    search_root: &Path,
    provider: &mut dyn TextureProvider,
) -> Result<Tally, MeshError> {
    let mut tally = Tally {
        group_triangles: vec![0],
        ..Tally::default()
    };
    let mut state = ParseState::default();

    let mut line = String::new();
    let mut line_no = 0usize;
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        line_no += 1;
        let text = directive_text(&line);
        if text.is_empty() {
            continue;
        }
        let mut tokens = text.split_whitespace();
        let directive = tokens.next().unwrap_or("");

        match directive {
            "v" => tally.vertices += 1,
            "vn" => tally.normals += 1,
            "vt" => tally.uvs += 1,
            "f" => {
                let corners = tokens.count();
                if corners < 3 {
                    log::warn!("line {line_no}: face with {corners} corners, line discarded");
                } else {
                    let triangles = corners - 2;
                    tally.triangles += triangles;
                    tally.group_triangles[state.group] += triangles;
                }
            }
            "g" => match tokens.next() {
                Some(name) => {
                    state.group = mesh.find_or_add_group(name);
                    if state.group == tally.group_triangles.len() {
                        tally.group_triangles.push(0);
                    }
                }
                None => log::warn!("line {line_no}: group without a name, line discarded"),
            },
            "mtllib" => {
                let name = text["mtllib".len()..].trim();
                if name.is_empty() {
                    log::warn!("line {line_no}: mtllib without a name, line discarded");
                } else {
                    if mesh.mtllib.is_some() {
                        log::warn!(
                            "line {line_no}: additional material library `{name}` replaces the previous one"
                        );
                    }
                    mesh.materials = parse_mtl(
                        &search_root.join(name),
                        search_root,
                        &mut mesh.textures,
                        provider,
                    )?;
                    mesh.mtllib = Some(name.to_string());
                }
            }
            "usemtl" => {
                // Validated here, resolved in the fill pass.
                if tokens.next().is_none() {
                    log::warn!("line {line_no}: usemtl without a name, line discarded");
                }
            }
            _ => log::warn!("line {line_no}: directive `{directive}` ignored"),
        }
    }

    Ok(tally)
}

/// Fill pass: read attribute data and faces into the pre-sized arrays.
fn second_pass<R: BufRead>(mesh: &mut Mesh, reader: &mut R) -> Result<(), MeshError> {
    let mut state = ParseState::default();

    // 1-based fill cursors; a malformed payload stores a default and still
    // advances, keeping slots aligned with the tally pass.
    let mut next_vertex = 1usize;
    let mut next_normal = 1usize;
    let mut next_uv = 1usize;

    let mut line = String::new();
    let mut line_no = 0usize;
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        line_no += 1;
        let text = directive_text(&line);
        if text.is_empty() {
            continue;
        }
        let mut tokens = text.split_whitespace();
        let directive = tokens.next().unwrap_or("");

        match directive {
            "v" => {
                match parse_vec3(&mut tokens) {
                    Some(v) => mesh.vertices[next_vertex] = v,
                    None => {
                        log::warn!("line {line_no}: invalid vertex, set to origin");
                    }
                }
                next_vertex += 1;
            }
            "vn" => {
                match parse_vec3(&mut tokens) {
                    Some(n) => mesh.normals[next_normal] = n,
                    None => {
                        log::warn!("line {line_no}: invalid normal, set to +z");
                        mesh.normals[next_normal] = Vec3::new(0.0, 0.0, 1.0);
                    }
                }
                next_normal += 1;
            }
            "vt" => {
                match parse_vec2(&mut tokens) {
                    Some(uv) => mesh.uvs[next_uv] = uv,
                    None => {
                        log::warn!("line {line_no}: invalid texture coordinate, set to 0,0");
                    }
                }
                next_uv += 1;
            }
            "f" => fill_face(mesh, &mut state, &mut tokens, line_no),
            "g" => {
                if let Some(name) = tokens.next() {
                    match mesh.find_group(name) {
                        Some(index) => state.group = index,
                        // Unreachable for a stream that rewound cleanly.
                        None => log::warn!("line {line_no}: unknown group `{name}`"),
                    }
                }
            }
            "usemtl" => {
                if let Some(name) = tokens.next() {
                    match mesh.find_material(name) {
                        Some(index) => state.material = index,
                        None => {
                            log::warn!(
                                "line {line_no}: unknown material `{name}`, using default"
                            );
                            state.material = 0;
                        }
                    }
                }
            }
            // mtllib was handled in the tally pass; everything else was
            // already warned about there.
            _ => {}
        }
    }

    Ok(())
}

/// Decode a face line's corners and fan-triangulate them.
fn fill_face<'a, I>(mesh: &mut Mesh, state: &mut ParseState, tokens: &mut I, line_no: usize)
where
    I: Iterator<Item = &'a str>,
{
    let mut corners: Vec<Corner> = Vec::new();
    for token in tokens {
        match parse_corner(token) {
            Some(corner) => corners.push(corner),
            None => {
                log::warn!("line {line_no}: malformed face corner `{token}`, face discarded");
                return;
            }
        }
    }
    if corners.len() < 3 {
        // Already warned in the tally pass.
        return;
    }

    // Fan triangulation: corner 0 is fixed, every subsequent pair forms
    // one triangle, appended in document order.
    let anchor = corners[0];
    for pair in corners[1..].windows(2) {
        let (b, c) = (pair[0], pair[1]);
        let index = mesh.triangles.len() as u32;
        mesh.triangles.push(Triangle {
            vertices: [anchor.vertex, b.vertex, c.vertex],
            normals: [anchor.normal, b.normal, c.normal],
            uvs: [anchor.uv, b.uv, c.uv],
            material: state.material,
        });
        mesh.groups[state.group].triangles.push(index);
    }
}

/// Decode one corner token in one of the four grammars:
/// `v`, `v/t`, `v/t/n`, `v//n`.
fn parse_corner(token: &str) -> Option<Corner> {
    let mut parts = token.split('/');
    let vertex = parts.next()?.parse::<u32>().ok()?;
    let uv_part = parts.next();
    let normal_part = parts.next();
    if parts.next().is_some() {
        return None;
    }

    let corner = match (uv_part, normal_part) {
        // v
        (None, None) => Corner {
            vertex,
            uv: None,
            normal: None,
        },
        // v/t
        (Some(t), None) => Corner {
            vertex,
            uv: Some(t.parse::<NonZeroU32>().ok()?),
            normal: None,
        },
        // v//n
        (Some(""), Some(n)) => Corner {
            vertex,
            uv: None,
            normal: Some(n.parse::<NonZeroU32>().ok()?),
        },
        // v/t/n
        (Some(t), Some(n)) => Corner {
            vertex,
            uv: Some(t.parse::<NonZeroU32>().ok()?),
            normal: Some(n.parse::<NonZeroU32>().ok()?),
        },
        (None, Some(_)) => unreachable!(),
    };
    Some(corner)
}

/// Every triangle corner must reference a slot inside the parsed arrays;
/// a violation means the document is corrupt and aborts the parse.
fn validate_indices(mesh: &Mesh) -> Result<(), MeshError> {
    let vertex_max = mesh.vertex_count();
    let normal_max = mesh.normal_count();
    let uv_max = mesh.uv_count();

    for (t, triangle) in mesh.triangles.iter().enumerate() {
        for corner in 0..3 {
            let v = triangle.vertices[corner];
            if v == 0 || v as usize > vertex_max {
                return Err(MeshError::OutOfRangeIndex {
                    triangle: t,
                    corner,
                    channel: "vertex",
                    index: v,
                    max: vertex_max,
                });
            }
            if let Some(n) = triangle.normals[corner] {
                if n.get() as usize > normal_max {
                    return Err(MeshError::OutOfRangeIndex {
                        triangle: t,
                        corner,
                        channel: "normal",
                        index: n.get(),
                        max: normal_max,
                    });
                }
            }
            if let Some(uv) = triangle.uvs[corner] {
                if uv.get() as usize > uv_max {
                    return Err(MeshError::OutOfRangeIndex {
                        triangle: t,
                        corner,
                        channel: "uv",
                        index: uv.get(),
                        max: uv_max,
                    });
                }
            }
        }
    }
    Ok(())
}

fn parse_vec3<'a, I>(tokens: &mut I) -> Option<Vec3>
where
    I: Iterator<Item = &'a str>,
{
    let x = tokens.next()?.parse().ok()?;
    let y = tokens.next()?.parse().ok()?;
    let z = tokens.next()?.parse().ok()?;
    Some(Vec3::new(x, y, z))
}

fn parse_vec2<'a, I>(tokens: &mut I) -> Option<Vec2>
where
    I: Iterator<Item = &'a str>,
{
    let u = tokens.next()?.parse().ok()?;
    let v = tokens.next()?.parse().ok()?;
    Some(Vec2::new(u, v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::TextureRegistry;
    use std::io::Cursor;

    fn attr(value: u32) -> AttrIndex {
        NonZeroU32::new(value)
    }

    fn read(contents: &str) -> Result<Mesh, MeshError> {
        let mut mesh = Mesh::new();
        let mut registry = TextureRegistry::new();
        read_obj_from(
            &mut mesh,
            &mut Cursor::new(contents),
            Path::new("."),
            &mut registry,
        )?;
        Ok(mesh)
    }

    #[test]
    fn test_single_triangle_document() {
        let mesh = read("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();

        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
        let tri = &mesh.triangles[0];
        assert_eq!(tri.vertices, [1, 2, 3]);
        assert_eq!(tri.normals, [None; 3]);
        assert_eq!(tri.uvs, [None; 3]);
        assert_eq!(tri.material, 0);
        assert_eq!(mesh.groups[0].name, "default");
        assert_eq!(mesh.groups[0].triangles, vec![0]);
    }

    #[test]
    fn test_fan_triangulation_order() {
        let doc = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nv -1 1 0\nf 1 2 3 4 5\n";
        let mesh = read(doc).unwrap();

        assert_eq!(mesh.triangle_count(), 3);
        assert_eq!(mesh.triangles[0].vertices, [1, 2, 3]);
        assert_eq!(mesh.triangles[1].vertices, [1, 3, 4]);
        assert_eq!(mesh.triangles[2].vertices, [1, 4, 5]);
        assert_eq!(mesh.groups[0].triangles, vec![0, 1, 2]);
    }

    #[test]
    fn test_all_four_corner_grammars() {
        let doc = "\
v 0 0 0\nv 1 0 0\nv 0 1 0
vn 0 0 1
vt 0 0\nvt 1 0\nvt 0 1
f 1 2 3
f 1/1 2/2 3/3
f 1/1/1 2/2/1 3/3/1
f 1//1 2//1 3//1
";
        let mesh = read(doc).unwrap();
        assert_eq!(mesh.triangle_count(), 4);

        assert_eq!(mesh.triangles[0].uvs, [None; 3]);
        assert_eq!(mesh.triangles[0].normals, [None; 3]);

        assert_eq!(mesh.triangles[1].uvs, [attr(1), attr(2), attr(3)]);
        assert_eq!(mesh.triangles[1].normals, [None; 3]);

        assert_eq!(mesh.triangles[2].uvs, [attr(1), attr(2), attr(3)]);
        assert_eq!(mesh.triangles[2].normals, [attr(1); 3]);

        assert_eq!(mesh.triangles[3].uvs, [None; 3]);
        assert_eq!(mesh.triangles[3].normals, [attr(1); 3]);
    }

    #[test]
    fn test_vertex_data_fills_in_file_order() {
        let mesh = read("v 1 2 3\nv 4 5 6\nf 1 2 1\n").unwrap();
        assert_eq!(mesh.vertices[0], Vec3::zeros());
        assert_eq!(mesh.vertices[1], Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(mesh.vertices[2], Vec3::new(4.0, 5.0, 6.0));
    }

    #[test]
    fn test_groups_partition_triangles() {
        let doc = "\
v 0 0 0\nv 1 0 0\nv 0 1 0
f 1 2 3
g wing
f 1 2 3
f 2 3 1
g default
f 3 1 2
";
        let mesh = read(doc).unwrap();
        assert_eq!(mesh.groups.len(), 2);
        assert_eq!(mesh.groups[0].triangles, vec![0, 3]);
        assert_eq!(mesh.groups[1].name, "wing");
        assert_eq!(mesh.groups[1].triangles, vec![1, 2]);

        // Every triangle in exactly one group.
        let mut seen: Vec<u32> = mesh
            .groups
            .iter()
            .flat_map(|g| g.triangles.iter().copied())
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_unknown_material_falls_back_to_default() {
        let doc = "v 0 0 0\nv 1 0 0\nv 0 1 0\nusemtl ghost\nf 1 2 3\n";
        let mesh = read(doc).unwrap();
        assert_eq!(mesh.triangles[0].material, 0);
    }

    #[test]
    fn test_comments_and_unknown_directives_skipped() {
        let doc = "\
# full line comment
v 0 0 0  # trailing comment
v 1 0 0
v 0 1 0
s off
o thing
f 1 2 3
";
        let mesh = read(doc).unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn test_malformed_face_corner_discards_face() {
        let doc = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 xyz\nf 1 2 3\n";
        let mesh = read(doc).unwrap();
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.triangles[0].vertices, [1, 2, 3]);
    }

    #[test]
    fn test_face_with_too_few_corners_discarded() {
        let mesh = read("v 0 0 0\nv 1 0 0\nf 1 2\n").unwrap();
        assert_eq!(mesh.triangle_count(), 0);
    }

    #[test]
    fn test_out_of_range_vertex_index_is_fatal_and_resets() {
        let mut mesh = Mesh::new();
        let mut registry = TextureRegistry::new();
        let err = read_obj_from(
            &mut mesh,
            &mut Cursor::new("v 0 0 0\nf 1 2 3\n"),
            Path::new("."),
            &mut registry,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            MeshError::OutOfRangeIndex {
                channel: "vertex",
                index: 2,
                max: 1,
                ..
            }
        ));
        // Fatal errors must not leave a partially populated mesh behind.
        assert_eq!(mesh, Mesh::new());
    }

    #[test]
    fn test_out_of_range_normal_index_is_fatal() {
        let doc = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2//1 3//9\n";
        let err = read(doc).unwrap_err();
        assert!(matches!(
            err,
            MeshError::OutOfRangeIndex {
                channel: "normal",
                index: 9,
                ..
            }
        ));
    }

    #[test]
    fn test_corner_with_extra_slashes_is_malformed() {
        let mesh = read("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1/1/1/1 2 3\n").unwrap();
        assert_eq!(mesh.triangle_count(), 0);
    }

    #[test]
    fn test_missing_file_is_io_failure() {
        let mut mesh = Mesh::new();
        let mut registry = TextureRegistry::new();
        let err = read_obj(&mut mesh, "/nonexistent/model.obj", &mut registry).unwrap_err();
        assert!(matches!(err, MeshError::Io(_)));
    }

    #[test]
    fn test_material_library_and_usemtl_resolution() {
        use std::io::Write;

        let dir = std::env::temp_dir().join("wavemesh_obj_parser_test");
        std::fs::create_dir_all(&dir).unwrap();
        let mtl_path = dir.join("ship.mtl");
        let obj_path = dir.join("ship.obj");

        let mut mtl = std::fs::File::create(&mtl_path).unwrap();
        write!(mtl, "newmtl hull\nKd 1 0 0\nmap_Kd hull.png\n").unwrap();
        let mut obj = std::fs::File::create(&obj_path).unwrap();
        write!(
            obj,
            "mtllib ship.mtl\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\nusemtl hull\nf 3 2 1\n"
        )
        .unwrap();

        let mut mesh = Mesh::new();
        let mut registry = TextureRegistry::new();
        read_obj(&mut mesh, &obj_path, &mut registry).unwrap();

        assert_eq!(mesh.mtllib.as_deref(), Some("ship.mtl"));
        assert_eq!(mesh.materials.len(), 2);
        assert_eq!(mesh.materials[1].name, "hull");
        assert_eq!(mesh.triangles[0].material, 0);
        assert_eq!(mesh.triangles[1].material, 1);
        assert_eq!(mesh.textures.len(), 1);
        assert_eq!(mesh.textures[0].name, "hull.png");

        std::fs::remove_dir_all(&dir).ok();
    }
}
