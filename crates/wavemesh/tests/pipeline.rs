//! End-to-end pipeline tests: parse, transform, compile, re-serialize.

use std::io::Cursor;
use std::path::Path;

use approx::assert_relative_eq;
use wavemesh::prelude::*;

const SHIP: &str = "\
# two-material test ship
v -2 0 0
v 2 0 0
v 0 1 0
v 0 0 3
vn 0 0 1
vt 0 0
vt 1 0
vt 0.5 1
g hull
f 1/1/1 2/2/1 3/3/1
f 1/1/1 3/3/1 4/1/1
g sail
f 2 3 4
";

fn load(contents: &str) -> Mesh {
    let mut mesh = Mesh::new();
    let mut textures = TextureRegistry::new();
    read_obj_from(
        &mut mesh,
        &mut Cursor::new(contents),
        Path::new("."),
        &mut textures,
    )
    .unwrap();
    mesh
}

#[test]
fn parse_transform_compile() {
    let mut mesh = load(SHIP);
    assert_eq!(mesh.vertex_count(), 4);
    assert_eq!(mesh.triangle_count(), 3);
    assert_eq!(mesh.groups.len(), 3); // default, hull, sail

    let factor = mesh.unitize();
    assert_relative_eq!(factor, 0.5); // largest extent was x: 4 units
    let dimensions = mesh.dimensions();
    assert_relative_eq!(dimensions[0].max(dimensions[1]).max(dimensions[2]), 2.0);

    let batches = compile(&mesh, BatchOptions::MATERIALS);
    assert_eq!(batches.positions.len(), 9);
    assert_eq!(batches.normals.len(), 9);
    assert_eq!(batches.uvs.len(), 9);
    // One material throughout: one state block, one draw.
    assert_eq!(batches.draw_count(), 1);
    assert!(matches!(
        batches.commands.last(),
        Some(RenderCommand::DrawPrimitives {
            first: 0,
            vertex_count: 9
        })
    ));
}

#[test]
fn winding_reversal_survives_round_trip() {
    let mut mesh = load(SHIP);
    mesh.reverse_winding();

    let mut text = Vec::new();
    write_obj_to(&mesh, &mut text, WriteMode::TEXCOORDS).unwrap();
    let reread = load(std::str::from_utf8(&text).unwrap());

    assert_eq!(reread.triangle_count(), mesh.triangle_count());
    for (a, b) in mesh.triangles.iter().zip(&reread.triangles) {
        assert_eq!(a.vertices, b.vertices);
        assert_eq!(a.uvs, b.uvs);
    }
    assert_eq!(reread.triangles[0].vertices, [3, 2, 1]);
}

#[test]
fn spherical_texgen_feeds_uv_buffer() {
    let mut mesh = load(SHIP);
    mesh.generate_spherical_texcoords();
    assert_eq!(mesh.uv_count(), mesh.normal_count());

    let batches = compile(&mesh, BatchOptions::empty());
    // The sail face has no normals, so its UVs alias the sentinel and
    // compile to zero vectors; the hull corners carry the projection.
    assert_eq!(batches.uvs.len(), 9);
    assert_eq!(batches.uvs[6], [0.0, 0.0]);
    assert_ne!(batches.uvs[0], [0.0, 0.0]);
}
