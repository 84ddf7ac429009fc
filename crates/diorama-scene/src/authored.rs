//! Authored scene files
//!
//! An authored scene lists the fixed objects a scene ships with:
//!
//! ```toml
//! [scene]
//! name = "Gallery"
//!
//! [objects.north_wall]
//! id = "wall_01"
//! position = [0.0, 1.5, 5.0]
//! rotation = [0.0, 180.0, 0.0]
//! material = "stone"
//!
//! [objects.frame_a]
//! id = "frame_a"
//! image_surface = true
//! ```

use crate::identity::{ensure_id, Placement};
use crate::world::SceneWorld;
use diorama_catalog::MaterialCatalog;
use diorama_core::{ObjectId, Result, Transform, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Root structure of a scene TOML file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthoredScene {
    pub scene: SceneMetadata,
    #[serde(default)]
    pub objects: BTreeMap<String, AuthoredObject>,
}

/// Scene metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneMetadata {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Definition of a fixed object in a scene file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthoredObject {
    /// Stable id; minted on load when missing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(default = "zero3")]
    pub position: [f32; 3],
    /// Euler degrees
    #[serde(default = "zero3")]
    pub rotation: [f32; 3],
    #[serde(default = "one3")]
    pub scale: [f32; 3],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    #[serde(default = "default_true")]
    pub renderable: bool,
    #[serde(default)]
    pub image_surface: bool,
    #[serde(default = "default_true")]
    pub active: bool,
    /// Authoring-only template, not placed in the live scene
    #[serde(default)]
    pub prototype: bool,
}

fn zero3() -> [f32; 3] {
    [0.0; 3]
}

fn one3() -> [f32; 3] {
    [1.0; 3]
}

fn default_true() -> bool {
    true
}

impl Default for AuthoredObject {
    fn default() -> Self {
        Self {
            id: None,
            position: zero3(),
            rotation: zero3(),
            scale: one3(),
            material: None,
            renderable: true,
            image_surface: false,
            active: true,
            prototype: false,
        }
    }
}

impl AuthoredObject {
    pub fn transform(&self) -> Transform {
        Transform::IDENTITY
            .with_position(Vec3::from_array(self.position))
            .with_euler_degrees(Vec3::from_array(self.rotation))
            .with_scale(Vec3::from_array(self.scale))
    }

    fn placement(&self) -> Placement {
        if self.prototype {
            Placement::Prototype
        } else {
            Placement::Live
        }
    }
}

impl AuthoredScene {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            scene: SceneMetadata {
                name: name.into(),
                description: None,
            },
            objects: BTreeMap::new(),
        }
    }

    pub fn add_object(&mut self, key: impl Into<String>, object: AuthoredObject) {
        self.objects.insert(key.into(), object);
    }

    /// Run id assignment over every object. Returns how many ids changed.
    pub fn assign_ids(&mut self) -> usize {
        let mut changed = 0;
        for object in self.objects.values_mut() {
            let before = object.id.clone();
            let placement = object.placement();
            ensure_id(&mut object.id, placement);
            if object.id != before {
                changed += 1;
            }
        }
        changed
    }

    /// Build a live scene holding every non-prototype object as a fixed object
    pub fn build_world(&self, materials: &MaterialCatalog) -> Result<SceneWorld> {
        let mut world = SceneWorld::new();

        for (key, object) in &self.objects {
            if object.prototype {
                continue;
            }
            let Some(id) = object.id.clone() else {
                tracing::warn!("Scene object '{}' has no id, skipping", key);
                continue;
            };

            world.insert_fixed(id.clone(), object.transform())?;

            if object.renderable {
                let material = object.material.as_deref().and_then(|material_id| {
                    let found = materials.get_by_id(material_id).cloned();
                    if found.is_none() {
                        tracing::warn!(
                            "Scene object '{}' references unknown material '{}'",
                            key,
                            material_id
                        );
                    }
                    found
                });
                world.add_renderable(id.as_str(), material)?;
            }
            if object.image_surface {
                world.add_image_surface(id.as_str())?;
            }
            if !object.active {
                world.set_active(id.as_str(), false)?;
            }
        }

        tracing::debug!("Built scene '{}' with {} objects", self.scene.name, world.len());
        Ok(world)
    }
}

/// Load a scene from a TOML file
pub fn load_scene<P: AsRef<Path>>(
    path: P,
    materials: &MaterialCatalog,
) -> Result<(SceneWorld, AuthoredScene)> {
    let content = fs::read_to_string(path)?;
    load_scene_string(&content, materials)
}

/// Load a scene from a TOML string
///
/// Missing ids are minted on the returned `AuthoredScene`; save it back to keep
/// them stable across runs.
pub fn load_scene_string(
    content: &str,
    materials: &MaterialCatalog,
) -> Result<(SceneWorld, AuthoredScene)> {
    let mut scene: AuthoredScene = toml::from_str(content)?;

    let changed = scene.assign_ids();
    if changed > 0 {
        tracing::warn!(
            "Assigned or cleared {} object ids in scene '{}'; save the scene to keep them",
            changed,
            scene.scene.name
        );
    }

    let world = scene.build_world(materials)?;
    Ok((world, scene))
}

/// Save an authored scene to a TOML file
pub fn save_scene<P: AsRef<Path>>(path: P, scene: &AuthoredScene) -> Result<()> {
    let content = save_scene_string(scene)?;
    fs::write(path, content)?;
    Ok(())
}

/// Save an authored scene to a TOML string
pub fn save_scene_string(scene: &AuthoredScene) -> Result<String> {
    Ok(toml::to_string_pretty(scene)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Provenance;
    use diorama_catalog::{CatalogEntry, Material};
    use diorama_core::DioramaError;

    fn materials() -> MaterialCatalog {
        MaterialCatalog::build("material", vec![CatalogEntry::new("stone", Material::new("Granite"))])
    }

    const GALLERY: &str = r#"
[scene]
name = "Gallery"

[objects.north_wall]
id = "wall_01"
position = [0.0, 1.5, 5.0]
rotation = [0.0, 180.0, 0.0]
material = "stone"

[objects.frame_a]
id = "frame_a"
image_surface = true
active = false

[objects.pedestal]
material = "marble"

[objects.frame_proto]
id = "proto"
prototype = true
"#;

    #[test]
    fn test_load_scene_string() {
        let (world, scene) = load_scene_string(GALLERY, &materials()).unwrap();
        assert_eq!(scene.scene.name, "Gallery");
        assert_eq!(world.len(), 3);

        let wall = world.find_by_id("wall_01").unwrap();
        assert_eq!(wall.provenance, Provenance::Fixed);
        assert_eq!(wall.material().map(|m| m.name.as_str()), Some("Granite"));
        assert_eq!(wall.transform.position, Vec3::new(0.0, 1.5, 5.0));

        let frame = world.find_by_id("frame_a").unwrap();
        assert!(!frame.active);
        assert!(frame.image_surface.is_some());

        assert!(!world.contains("proto"));
        assert!(world.spawned_ids().is_empty());
    }

    #[test]
    fn test_missing_ids_are_minted_and_prototypes_cleared() {
        let (world, scene) = load_scene_string(GALLERY, &materials()).unwrap();
        let pedestal_id = scene.objects["pedestal"].id.clone().unwrap();
        assert!(world.contains(pedestal_id.as_str()));
        assert!(scene.objects["frame_proto"].id.is_none());

        // Unknown material leaves the surface empty
        let pedestal = world.find_by_id(pedestal_id.as_str()).unwrap();
        assert!(pedestal.renderable.is_some());
        assert!(pedestal.material().is_none());
    }

    #[test]
    fn test_saved_ids_are_stable() {
        let (_, scene) = load_scene_string(GALLERY, &materials()).unwrap();
        let saved = save_scene_string(&scene).unwrap();

        let (world, mut reloaded) = load_scene_string(&saved, &materials()).unwrap();
        let pedestal_id = scene.objects["pedestal"].id.clone().unwrap();
        assert_eq!(reloaded.objects["pedestal"].id.as_ref(), Some(&pedestal_id));
        assert!(world.contains(pedestal_id.as_str()));
        assert_eq!(reloaded.assign_ids(), 0);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let content = r#"
[scene]
name = "Dupes"

[objects.a]
id = "same"

[objects.b]
id = "same"
"#;
        let result = load_scene_string(content, &materials());
        assert!(matches!(result, Err(DioramaError::DuplicateObjectId(_))));
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = std::env::temp_dir().join(format!("diorama_scene_{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("scene.toml");

        let mut scene = AuthoredScene::new("Room");
        scene.add_object(
            "floor",
            AuthoredObject {
                id: Some(ObjectId::from("floor_01")),
                material: Some("stone".into()),
                ..Default::default()
            },
        );
        save_scene(&path, &scene).unwrap();

        let (world, _) = load_scene(&path, &materials()).unwrap();
        assert!(world.contains("floor_01"));

        fs::remove_dir_all(&dir).ok();
    }
}
