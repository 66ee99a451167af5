//! Material library parser
//!
//! Parses a companion material-definition document into a material table.
//! Two phases over one rewindable stream: the first counts `newmtl`
//! directives so the table can be sized up front, the second fills in the
//! fields. Index 0 of the returned table is always the built-in default
//! material, regardless of file content.

use std::fs::File;
use std::io::{BufRead, BufReader, Seek};
use std::path::Path;

use crate::mesh::{Material, Texture, TextureProvider};

use super::MeshError;

/// Strip a `#` comment and surrounding whitespace from a raw line.
pub(crate) fn directive_text(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
    .trim()
}

/// Parse a material library file.
///
/// `search_root` is the directory textures resolve against; `textures`
/// is the owning mesh's texture list, extended with at most one entry per
/// distinct `map_Kd` name.
///
/// # Errors
/// Fails when the file cannot be opened or read, or when a field directive
/// appears before any `newmtl`.
pub fn parse_mtl(
    path: &Path,
    search_root: &Path,
    textures: &mut Vec<Texture>,
    provider: &mut dyn TextureProvider,
) -> Result<Vec<Material>, MeshError> {
    let file = File::open(path).map_err(|e| {
        log::error!("can't open material library {}: {}", path.display(), e);
        e
    })?;
    let mut reader = BufReader::new(file);
    parse_mtl_from(&mut reader, search_root, textures, provider)
}

/// Parse a material library from any rewindable stream.
pub fn parse_mtl_from<R: BufRead + Seek>(
    reader: &mut R,
    search_root: &Path,
    textures: &mut Vec<Texture>,
    provider: &mut dyn TextureProvider,
) -> Result<Vec<Material>, MeshError> {
    // Phase 1: count newmtl directives so the table is sized exactly.
    let mut count = 0usize;
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        if directive_text(&line).split_whitespace().next() == Some("newmtl") {
            count += 1;
        }
    }
    reader.rewind()?;

    // Slot 0 is the built-in default; parsed materials fill 1..=count.
    let mut materials = vec![Material::default(); count + 1];
    let mut current: Option<usize> = None;
    let mut next = 1usize;

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
            "newmtl" => match tokens.next() {
                Some(name) => {
                    materials[next].name = name.to_string();
                    current = Some(next);
                    next += 1;
                }
                None => {
                    log::warn!("line {line_no}: newmtl without a name, line discarded");
                }
            },
            "Ka" => {
                let index = require_material(current, line_no, directive)?;
                if let Some(rgb) = parse_rgb(&mut tokens) {
                    materials[index].ambient[..3].copy_from_slice(&rgb);
                } else {
                    log::warn!("line {line_no}: malformed Ka, line discarded");
                }
            }
            "Kd" => {
                let index = require_material(current, line_no, directive)?;
                if let Some(rgb) = parse_rgb(&mut tokens) {
                    materials[index].diffuse[..3].copy_from_slice(&rgb);
                } else {
                    log::warn!("line {line_no}: malformed Kd, line discarded");
                }
            }
            "Ks" => {
                let index = require_material(current, line_no, directive)?;
                if let Some(rgb) = parse_rgb(&mut tokens) {
                    materials[index].specular[..3].copy_from_slice(&rgb);
                } else {
                    log::warn!("line {line_no}: malformed Ks, line discarded");
                }
            }
            "Ns" => {
                let index = require_material(current, line_no, directive)?;
                match tokens.next().and_then(|t| t.parse::<f32>().ok()) {
                    Some(ns) => materials[index].shininess = Material::scale_shininess(ns),
                    None => log::warn!("line {line_no}: malformed Ns, line discarded"),
                }
            }
            "d" => {
                let index = require_material(current, line_no, directive)?;
                match tokens.next().and_then(|t| t.parse::<f32>().ok()) {
                    Some(alpha) => materials[index].diffuse[3] = alpha,
                    None => log::warn!("line {line_no}: malformed d, line discarded"),
                }
            }
            "map_Kd" => {
                let index = require_material(current, line_no, directive)?;
                // Texture names may contain spaces; take the rest of the line.
                let name = text["map_Kd".len()..].trim();
                if name.is_empty() {
                    log::warn!("line {line_no}: map_Kd without a file name, line discarded");
                } else {
                    materials[index].texture =
                        resolve_texture(name, search_root, textures, provider);
                }
            }
            _ => {
                log::warn!("line {line_no}: directive `{directive}` ignored");
            }
        }
    }

    Ok(materials)
}

/// Resolve a texture name at most once per mesh, falling back to no
/// texture when the provider cannot deliver.
fn resolve_texture(
    name: &str,
    search_root: &Path,
    textures: &mut Vec<Texture>,
    provider: &mut dyn TextureProvider,
) -> Option<crate::mesh::TextureKey> {
    if let Some(texture) = textures.iter().find(|t| t.name == name) {
        return Some(texture.key);
    }
    match provider.resolve(name, search_root) {
        Ok(key) => {
            textures.push(Texture {
                name: name.to_string(),
                key,
            });
            Some(key)
        }
        Err(e) => {
            log::warn!("texture `{name}` could not be resolved: {e}");
            None
        }
    }
}

fn require_material(
    current: Option<usize>,
    line: usize,
    directive: &str,
) -> Result<usize, MeshError> {
    current.ok_or_else(|| MeshError::MaterialExpected {
        line,
        directive: directive.to_string(),
    })
}

fn parse_rgb<'a, I>(tokens: &mut I) -> Option<[f32; 3]>
where
    I: Iterator<Item = &'a str>,
{
    let r = tokens.next()?.parse().ok()?;
    let g = tokens.next()?.parse().ok()?;
    let b = tokens.next()?.parse().ok()?;
    Some([r, g, b])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::TextureRegistry;
    use std::io::Cursor;

    fn parse(contents: &str) -> Result<(Vec<Material>, Vec<Texture>), MeshError> {
        let mut registry = TextureRegistry::new();
        let mut textures = Vec::new();
        let materials = parse_mtl_from(
            &mut Cursor::new(contents),
            Path::new("."),
            &mut textures,
            &mut registry,
        )?;
        Ok((materials, textures))
    }

    #[test]
    fn test_parse_simple_material() {
        let (materials, _) = parse(
            r#"
# simple library
newmtl hull
Ka 0.1 0.1 0.1
Kd 0.8 0.2 0.2
Ks 0.5 0.5 0.5
Ns 250.0
d 0.9
"#,
        )
        .unwrap();

        assert_eq!(materials.len(), 2);
        assert_eq!(materials[0].name, "default");

        let hull = &materials[1];
        assert_eq!(hull.name, "hull");
        assert_eq!(hull.ambient, [0.1, 0.1, 0.1, 1.0]);
        assert_eq!(hull.diffuse, [0.8, 0.2, 0.2, 0.9]);
        assert_eq!(hull.specular, [0.5, 0.5, 0.5, 1.0]);
        assert_eq!(hull.shininess, 32.0); // 250 / 1000 * 128
    }

    #[test]
    fn test_unspecified_fields_keep_defaults() {
        let (materials, _) = parse("newmtl bare\n").unwrap();
        let bare = &materials[1];
        assert_eq!(bare.ambient, [0.2, 0.2, 0.2, 1.0]);
        assert_eq!(bare.diffuse, [0.8, 0.8, 0.8, 1.0]);
        assert_eq!(bare.specular, [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(bare.shininess, crate::mesh::material::DEFAULT_SHININESS);
    }

    #[test]
    fn test_shininess_full_scale() {
        let (materials, _) = parse("newmtl m\nNs 1000\n").unwrap();
        assert_eq!(materials[1].shininess, 128.0);
    }

    #[test]
    fn test_field_before_newmtl_is_fatal() {
        let err = parse("Kd 1 0 0\n").unwrap_err();
        assert!(matches!(
            err,
            MeshError::MaterialExpected { line: 1, .. }
        ));
    }

    #[test]
    fn test_unknown_and_malformed_directives_are_skipped() {
        let (materials, _) = parse(
            "newmtl m\nillum 2\nmap_Ks spec.png\nKd nonsense 0 0\nKs 0.3 0.3 0.3\n",
        )
        .unwrap();
        // Malformed Kd left the default in place; the later Ks still landed.
        assert_eq!(materials[1].diffuse, [0.8, 0.8, 0.8, 1.0]);
        assert_eq!(materials[1].specular, [0.3, 0.3, 0.3, 1.0]);
    }

    #[test]
    fn test_texture_resolved_once_per_name() {
        let (materials, textures) = parse(
            "newmtl a\nmap_Kd skin.png\nnewmtl b\nmap_Kd skin.png\nnewmtl c\nmap_Kd other.png\n",
        )
        .unwrap();

        assert_eq!(textures.len(), 2);
        assert_eq!(materials[1].texture, materials[2].texture);
        assert_ne!(materials[1].texture, materials[3].texture);
    }

    #[test]
    fn test_texture_name_with_spaces() {
        let (_, textures) = parse("newmtl m\nmap_Kd hull plating.png\n").unwrap();
        assert_eq!(textures[0].name, "hull plating.png");
    }

    #[test]
    fn test_multiple_materials_fill_in_order() {
        let (materials, _) = parse("newmtl one\nKd 1 0 0\nnewmtl two\nKd 0 1 0\n").unwrap();
        assert_eq!(materials.len(), 3);
        assert_eq!(materials[1].name, "one");
        assert_eq!(materials[1].diffuse[..3], [1.0, 0.0, 0.0]);
        assert_eq!(materials[2].name, "two");
        assert_eq!(materials[2].diffuse[..3], [0.0, 1.0, 0.0]);
    }
}
