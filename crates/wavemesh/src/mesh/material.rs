//! Material table entries (Wavefront Phong model)

use super::texture::TextureKey;

/// Shininess stored for materials that never saw an `Ns` directive.
/// Already in the lighting-model output range, so it is not rescaled.
pub const DEFAULT_SHININESS: f32 = 65.0;

/// Largest shininess value a material document may carry.
pub const SHININESS_INPUT_MAX: f32 = 1000.0;

/// Upper end of the lighting-model shininess range materials are stored in.
pub const SHININESS_OUTPUT_MAX: f32 = 128.0;

/// A single material: Phong color terms plus an optional diffuse texture.
///
/// Colors are RGBA; the alpha channel of `diffuse` doubles as the dissolve
/// factor (`d` directive). Shininess is stored already rescaled from the
/// document domain `[0, 1000]` into `[0, 128]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Material name (`newmtl`); index 0 of a table is always "default"
    pub name: String,

    /// Ambient color (`Ka`)
    pub ambient: [f32; 4],

    /// Diffuse color (`Kd`); alpha carries the dissolve factor (`d`)
    pub diffuse: [f32; 4],

    /// Specular color (`Ks`)
    pub specular: [f32; 4],

    /// Specular exponent, rescaled into `[0, 128]`
    pub shininess: f32,

    /// Resolved diffuse texture (`map_Kd`), when the material has one
    pub texture: Option<TextureKey>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            ambient: [0.2, 0.2, 0.2, 1.0],
            diffuse: [0.8, 0.8, 0.8, 1.0],
            specular: [0.0, 0.0, 0.0, 1.0],
            shininess: DEFAULT_SHININESS,
            texture: None,
        }
    }
}

impl Material {
    /// Default-valued material with the given name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Map a document-domain specular exponent into the stored range.
    pub fn scale_shininess(ns: f32) -> f32 {
        ns / SHININESS_INPUT_MAX * SHININESS_OUTPUT_MAX
    }

    /// Map a stored shininess back into the document domain.
    pub fn unscale_shininess(shininess: f32) -> f32 {
        shininess / SHININESS_OUTPUT_MAX * SHININESS_INPUT_MAX
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_material_values() {
        let mat = Material::default();
        assert_eq!(mat.name, "default");
        assert_eq!(mat.ambient, [0.2, 0.2, 0.2, 1.0]);
        assert_eq!(mat.diffuse, [0.8, 0.8, 0.8, 1.0]);
        assert_eq!(mat.specular, [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(mat.shininess, DEFAULT_SHININESS);
        assert!(mat.texture.is_none());
    }

    #[test]
    fn test_shininess_scaling_round_trip() {
        assert_eq!(Material::scale_shininess(1000.0), 128.0);
        assert_eq!(Material::scale_shininess(0.0), 0.0);
        assert_eq!(Material::unscale_shininess(Material::scale_shininess(250.0)), 250.0);
    }
}
