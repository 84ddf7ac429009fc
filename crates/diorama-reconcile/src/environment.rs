//! Skybox selection

use diorama_catalog::MaterialCatalog;
use diorama_core::{DioramaError, Result};
use diorama_scene::{ActiveSkybox, SceneWorld};
use diorama_snapshot::Snapshot;
use std::sync::Arc;

/// What the environment pass did
#[derive(Debug, Clone, PartialEq)]
pub enum EnvironmentChange {
    /// The snapshot names no skybox; the backdrop is left alone
    Unchanged,
    Applied { material_id: String },
    /// The requested skybox is unknown and the default was applied instead
    FellBack { requested: String, applied: String },
    /// Neither the requested skybox nor a default could be resolved
    Unresolved { requested: String },
}

/// Resolves skybox names through the material catalog and sets the backdrop
#[derive(Debug, Clone)]
pub struct EnvironmentApplier {
    materials: Arc<MaterialCatalog>,
    default_environment: Option<String>,
}

impl EnvironmentApplier {
    pub fn new(materials: Arc<MaterialCatalog>) -> Self {
        Self {
            materials,
            default_environment: None,
        }
    }

    /// Skybox applied when a snapshot names one that cannot be resolved
    pub fn with_default(mut self, name: Option<String>) -> Self {
        self.default_environment = name.filter(|n| !n.trim().is_empty());
        self
    }

    /// Apply the skybox a snapshot asks for
    pub fn apply_from_snapshot(&self, scene: &mut SceneWorld, snapshot: &Snapshot) -> EnvironmentChange {
        let Some(requested) = snapshot.skybox_name() else {
            return EnvironmentChange::Unchanged;
        };
        let rotation = snapshot.skybox_rotation();

        if self.apply_named(scene, requested, rotation).is_ok() {
            return EnvironmentChange::Applied {
                material_id: requested.to_string(),
            };
        }

        match &self.default_environment {
            Some(default) if self.apply_named(scene, default, None).is_ok() => {
                EnvironmentChange::FellBack {
                    requested: requested.to_string(),
                    applied: default.clone(),
                }
            }
            _ => EnvironmentChange::Unresolved {
                requested: requested.to_string(),
            },
        }
    }

    /// Show the skybox registered under `name`.
    ///
    /// Rotation is kept only when the material supports it. Every change
    /// refreshes ambient lighting.
    pub fn apply_named(&self, scene: &mut SceneWorld, name: &str, rotation: Option<f32>) -> Result<()> {
        let material = self
            .materials
            .get_by_id(name)
            .ok_or_else(|| DioramaError::MaterialNotFound(name.to_string()))?;

        let rotation = if material.supports_rotation { rotation } else { None };
        scene.environment_mut().set_skybox(ActiveSkybox {
            material_id: name.to_string(),
            material: material.clone(),
            rotation,
        });
        tracing::debug!("Skybox set to '{}'", name);
        Ok(())
    }

    /// The active skybox id and rotation, for capture
    pub fn current(&self, scene: &SceneWorld) -> Option<(String, Option<f32>)> {
        scene
            .environment()
            .skybox()
            .map(|s| (s.material_id.clone(), s.rotation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diorama_catalog::{CatalogEntry, Material};
    use diorama_snapshot::SkyboxPreset;

    fn applier() -> EnvironmentApplier {
        let materials = MaterialCatalog::build(
            "material",
            vec![
                CatalogEntry::new(
                    "sky_day",
                    Material::new("Day").with_shader("skybox").with_rotation_support(),
                ),
                CatalogEntry::new("sky_flat", Material::new("Flat").with_shader("skybox")),
            ],
        );
        EnvironmentApplier::new(Arc::new(materials))
    }

    #[test]
    fn test_no_skybox_no_change() {
        let mut scene = SceneWorld::new();
        let change = applier().apply_from_snapshot(&mut scene, &Snapshot::new("s"));
        assert_eq!(change, EnvironmentChange::Unchanged);
        assert_eq!(scene.environment().ambient_generation(), 0);
    }

    #[test]
    fn test_top_level_name_wins_over_preset() {
        let mut scene = SceneWorld::new();
        let mut snapshot = Snapshot::new("s");
        snapshot.skybox_material_name = Some("sky_flat".into());
        snapshot.skybox_preset = Some(SkyboxPreset::material("sky_day"));

        let applier = applier();
        applier.apply_from_snapshot(&mut scene, &snapshot);
        assert_eq!(applier.current(&scene), Some(("sky_flat".to_string(), None)));
        assert_eq!(scene.environment().ambient_generation(), 1);
    }

    #[test]
    fn test_rotation_only_when_supported() {
        let mut scene = SceneWorld::new();
        let applier = applier();

        applier.apply_named(&mut scene, "sky_day", Some(90.0)).unwrap();
        assert_eq!(applier.current(&scene), Some(("sky_day".to_string(), Some(90.0))));

        applier.apply_named(&mut scene, "sky_flat", Some(90.0)).unwrap();
        assert_eq!(applier.current(&scene), Some(("sky_flat".to_string(), None)));
    }

    #[test]
    fn test_unknown_falls_back_to_default() {
        let mut scene = SceneWorld::new();
        let mut snapshot = Snapshot::new("s");
        snapshot.skybox_material_name = Some("sky_mars".into());

        let change = applier()
            .with_default(Some("sky_day".into()))
            .apply_from_snapshot(&mut scene, &snapshot);
        assert_eq!(
            change,
            EnvironmentChange::FellBack {
                requested: "sky_mars".into(),
                applied: "sky_day".into()
            }
        );
    }

    #[test]
    fn test_unknown_without_default_is_unresolved() {
        let mut scene = SceneWorld::new();
        let mut snapshot = Snapshot::new("s");
        snapshot.skybox_material_name = Some("sky_mars".into());

        let change = applier().apply_from_snapshot(&mut scene, &snapshot);
        assert!(matches!(change, EnvironmentChange::Unresolved { .. }));
        assert!(scene.environment().skybox().is_none());
        assert!(matches!(
            applier().apply_named(&mut scene, "sky_mars", None),
            Err(DioramaError::MaterialNotFound(_))
        ));
    }
}
