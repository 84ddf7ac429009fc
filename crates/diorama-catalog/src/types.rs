//! Catalog resource types

use crate::catalog::Catalog;
use serde::{Deserialize, Serialize};

/// A material that can be bound to a renderable surface or used as a skybox
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    #[serde(default = "default_shader")]
    pub shader: String,
    /// RGBA, 0-255
    #[serde(default = "default_color")]
    pub base_color: [u8; 4],
    #[serde(default)]
    pub texture: Option<String>,
    /// Whether the shader exposes a rotation parameter (skybox materials)
    #[serde(default)]
    pub supports_rotation: bool,
}

fn default_shader() -> String {
    "lit".to_string()
}

fn default_color() -> [u8; 4] {
    [255, 255, 255, 255]
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shader: default_shader(),
            base_color: default_color(),
            texture: None,
            supports_rotation: false,
        }
    }

    pub fn with_color(mut self, rgba: [u8; 4]) -> Self {
        self.base_color = rgba;
        self
    }

    pub fn with_shader(mut self, shader: impl Into<String>) -> Self {
        self.shader = shader.into();
        self
    }

    pub fn with_rotation_support(mut self) -> Self {
        self.supports_rotation = true;
        self
    }
}

/// A template that spawned objects are instantiated from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Prefab {
    pub name: String,
    /// Material catalog id bound on instantiation
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default = "default_true")]
    pub renderable: bool,
    /// Whether instances carry an image surface (artwork frames)
    #[serde(default)]
    pub image_surface: bool,
    /// Id baked into the prototype at authoring time; never reused by instances
    #[serde(default)]
    pub authored_id: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Prefab {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            material: None,
            renderable: true,
            image_surface: false,
            authored_id: None,
        }
    }

    pub fn with_material(mut self, material_id: impl Into<String>) -> Self {
        self.material = Some(material_id.into());
        self
    }

    pub fn with_image_surface(mut self) -> Self {
        self.image_surface = true;
        self
    }

    pub fn with_authored_id(mut self, id: impl Into<String>) -> Self {
        self.authored_id = Some(id.into());
        self
    }
}

pub type MaterialCatalog = Catalog<Material>;
pub type PrefabCatalog = Catalog<Prefab>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_defaults() {
        let m: Material = toml::from_str(r#"name = "Oak""#).unwrap();
        assert_eq!(m.shader, "lit");
        assert_eq!(m.base_color, [255, 255, 255, 255]);
        assert!(!m.supports_rotation);
    }

    #[test]
    fn test_prefab_defaults() {
        let p: Prefab = toml::from_str(r#"name = "Frame""#).unwrap();
        assert!(p.renderable);
        assert!(!p.image_surface);
        assert!(p.material.is_none());
    }

    #[test]
    fn test_material_identity_is_by_value() {
        let a = Material::new("Oak").with_color([120, 80, 40, 255]);
        let b = Material::new("Oak").with_color([120, 80, 40, 255]);
        let c = Material::new("Oak");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
