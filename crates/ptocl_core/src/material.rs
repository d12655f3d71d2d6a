//! Surface materials.
//!
//! A material is plain data: the compute kernel decides how color,
//! emission, reflectivity and refraction combine. Shapes without an
//! explicit material inherit the one of their nearest ancestor group.

use ptocl_math::{color, Tuple4};

/// Reference to a texture layer uploaded alongside the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureBinding {
    /// Layer index in the texture array
    pub index: u8,
    /// Repeat factor along u
    pub scale_x: f64,
    /// Repeat factor along v
    pub scale_y: f64,
}

impl TextureBinding {
    pub fn new(index: u8) -> Self {
        Self {
            index,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }

    pub fn with_scale(mut self, scale_x: f64, scale_y: f64) -> Self {
        self.scale_x = scale_x;
        self.scale_y = scale_y;
        self
    }
}

/// Surface description consumed by the compute backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Base color (RGB, 0-1)
    pub color: Tuple4,

    /// Emitted light (RGB, may exceed 1)
    pub emission: Tuple4,

    /// Index of refraction (1.0 = opaque/air)
    pub refractive_index: f64,

    /// Reflectivity (0 = diffuse, 1 = perfect mirror)
    pub reflectivity: f64,

    /// Base color texture
    pub texture: Option<TextureBinding>,

    /// Normal map texture
    pub normal_map: Option<TextureBinding>,

    /// Texture is an environment map wrapped around the scene
    pub is_env_map: bool,
}

impl Material {
    /// White, non-emissive, non-refractive.
    pub const DEFAULT: Material = Material {
        color: color(1.0, 1.0, 1.0),
        emission: color(0.0, 0.0, 0.0),
        refractive_index: 1.0,
        reflectivity: 0.0,
        texture: None,
        normal_map: None,
        is_env_map: false,
    };

    /// Plain diffuse surface.
    pub fn diffuse(r: f64, g: f64, b: f64) -> Self {
        Self {
            color: color(r, g, b),
            ..Self::DEFAULT
        }
    }

    pub fn glass() -> Self {
        Self {
            refractive_index: 1.52,
            reflectivity: 0.05,
            ..Self::DEFAULT
        }
    }

    pub fn mirror() -> Self {
        Self {
            reflectivity: 1.0,
            ..Self::DEFAULT
        }
    }

    /// Emissive white sphere-light material.
    pub fn light_bulb() -> Self {
        Self {
            emission: color(8.0, 8.0, 8.0),
            ..Self::DEFAULT
        }
    }

    pub fn with_color(mut self, r: f64, g: f64, b: f64) -> Self {
        self.color = color(r, g, b);
        self
    }

    pub fn with_emission(mut self, r: f64, g: f64, b: f64) -> Self {
        self.emission = color(r, g, b);
        self
    }

    pub fn with_reflectivity(mut self, reflectivity: f64) -> Self {
        self.reflectivity = reflectivity;
        self
    }

    pub fn with_refractive_index(mut self, refractive_index: f64) -> Self {
        self.refractive_index = refractive_index;
        self
    }

    pub fn with_texture(mut self, binding: TextureBinding) -> Self {
        self.texture = Some(binding);
        self
    }

    pub fn with_normal_map(mut self, binding: TextureBinding) -> Self {
        self.normal_map = Some(binding);
        self
    }

    pub fn as_env_map(mut self) -> Self {
        self.is_env_map = true;
        self
    }

    /// Check if this material is emissive.
    pub fn is_emissive(&self) -> bool {
        self.emission.x > 0.0 || self.emission.y > 0.0 || self.emission.z > 0.0
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_material() {
        let m = Material::default();
        assert_eq!(m.color, color(1.0, 1.0, 1.0));
        assert_eq!(m.refractive_index, 1.0);
        assert!(!m.is_emissive());
        assert!(m.texture.is_none());
    }

    #[test]
    fn test_presets() {
        assert_eq!(Material::glass().refractive_index, 1.52);
        assert_eq!(Material::glass().reflectivity, 0.05);
        assert_eq!(Material::mirror().reflectivity, 1.0);
        assert!(Material::light_bulb().is_emissive());
        assert_eq!(Material::diffuse(0.75, 0.25, 0.25).color, color(0.75, 0.25, 0.25));
    }

    #[test]
    fn test_texture_bindings() {
        let m = Material::default()
            .with_texture(TextureBinding::new(2).with_scale(4.0, 2.0))
            .with_normal_map(TextureBinding::new(3));

        let tex = m.texture.unwrap();
        assert_eq!(tex.index, 2);
        assert_eq!(tex.scale_x, 4.0);
        assert_eq!(m.normal_map.unwrap().scale_y, 1.0);
    }
}
