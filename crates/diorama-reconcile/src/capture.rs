//! Capture: live scene -> snapshot

use crate::environment::EnvironmentApplier;
use diorama_catalog::MaterialCatalog;
use diorama_scene::SceneWorld;
use diorama_snapshot::{ImageBindingRecord, ObjectRecord, SkyboxPreset, Snapshot};
use std::sync::Arc;

/// Produces snapshots of a live scene
#[derive(Debug, Clone)]
pub struct CaptureEngine {
    materials: Arc<MaterialCatalog>,
    environment: EnvironmentApplier,
    app_version: String,
    scene_base_id: String,
}

impl CaptureEngine {
    pub fn new(materials: Arc<MaterialCatalog>, environment: EnvironmentApplier) -> Self {
        Self {
            materials,
            environment,
            app_version: String::new(),
            scene_base_id: String::new(),
        }
    }

    pub fn with_app_version(mut self, version: impl Into<String>) -> Self {
        self.app_version = version.into();
        self
    }

    pub fn with_scene_base_id(mut self, id: impl Into<String>) -> Self {
        self.scene_base_id = id.into();
        self
    }

    /// Record every identified object, inactive ones included, ordered by id.
    ///
    /// Reads the scene only. Materials missing from the catalog are left out
    /// of their record.
    pub fn capture(&self, scene: &SceneWorld, name: &str) -> Snapshot {
        let mut snapshot = Snapshot::new(name);
        snapshot.app_version = self.app_version.clone();
        snapshot.scene_base_id = self.scene_base_id.clone();

        for object in scene.objects() {
            let material = object
                .material()
                .and_then(|m| self.materials.get_id(m))
                .map(String::from);

            if let Some(url) = object.image_url() {
                snapshot
                    .artworks
                    .push(ImageBindingRecord::new(object.id.clone(), url));
            }

            snapshot.objects.push(ObjectRecord::capture(
                object.id,
                object.provenance.template_id(),
                &object.transform,
                material,
            ));
        }

        if let Some((material_id, rotation)) = self.environment.current(scene) {
            if let Some(degrees) = rotation {
                snapshot.skybox_preset =
                    Some(SkyboxPreset::material(material_id.clone()).with_rotation(degrees));
            }
            snapshot.skybox_material_name = Some(material_id);
        }

        tracing::debug!(
            "Captured '{}': {} objects, {} artworks",
            name,
            snapshot.objects.len(),
            snapshot.artworks.len()
        );
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diorama_catalog::{CatalogEntry, Material, Prefab};
    use diorama_core::{Transform, Vec3};
    use diorama_scene::{ImageOverride, SurfaceImage};

    fn materials() -> Arc<MaterialCatalog> {
        Arc::new(MaterialCatalog::build(
            "material",
            vec![
                CatalogEntry::new("wood", Material::new("Oak")),
                CatalogEntry::new("sky_day", Material::new("Day").with_rotation_support()),
            ],
        ))
    }

    fn engine() -> CaptureEngine {
        let materials = materials();
        CaptureEngine::new(materials.clone(), EnvironmentApplier::new(materials))
            .with_app_version("0.1.0")
            .with_scene_base_id("Gallery")
    }

    #[test]
    fn test_capture_sorted_with_metadata() {
        let mut scene = SceneWorld::new();
        for id in ["zeta", "alpha", "mid"] {
            scene.insert_fixed(id, Transform::IDENTITY).unwrap();
        }
        scene.set_active("mid", false).unwrap();

        let snapshot = engine().capture(&scene, "Morning");
        let ids: Vec<&str> = snapshot.objects.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["alpha", "mid", "zeta"]);
        assert_eq!(snapshot.name, "Morning");
        assert_eq!(snapshot.app_version, "0.1.0");
        assert_eq!(snapshot.scene_base_id, "Gallery");
        assert!(!snapshot.created_at.is_empty());
        assert!(snapshot.objects.iter().all(|o| o.is_fixed()));
    }

    #[test]
    fn test_capture_materials_templates_and_artworks() {
        let mut scene = SceneWorld::new();
        let frame = Prefab::new("Frame").with_material("wood").with_image_surface();
        scene.spawn_from_prefab("o1", "frame", &frame, &materials()).unwrap();
        scene
            .set_transform(
                "o1",
                Transform::IDENTITY
                    .with_position(Vec3::new(1.0, 0.0, 2.0))
                    .with_euler_degrees(Vec3::new(0.0, 90.0, 0.0)),
            )
            .unwrap();
        scene
            .set_image_override(
                "o1",
                ImageOverride {
                    url: "https://img/a.png".into(),
                    image: Arc::new(SurfaceImage::new(1, 1, vec![0; 4])),
                },
            )
            .unwrap();

        scene.insert_fixed("wall_01", Transform::IDENTITY).unwrap();
        scene
            .add_renderable("wall_01", Some(Material::new("Unregistered")))
            .unwrap();

        let snapshot = engine().capture(&scene, "s");
        let o1 = snapshot.object("o1").unwrap();
        assert_eq!(o1.template, "frame");
        assert_eq!(o1.material.as_deref(), Some("wood"));
        assert_eq!((o1.px, o1.py, o1.pz), (1.0, 0.0, 2.0));
        assert_eq!(o1.ry, 90.0);

        let wall = snapshot.object("wall_01").unwrap();
        assert_eq!(wall.material, None);
        assert_eq!(
            snapshot.artworks,
            vec![ImageBindingRecord::new("o1", "https://img/a.png")]
        );
    }

    #[test]
    fn test_capture_skybox() {
        let mut scene = SceneWorld::new();
        let engine = engine();
        assert_eq!(engine.capture(&scene, "s").skybox_name(), None);

        engine
            .environment
            .apply_named(&mut scene, "sky_day", Some(30.0))
            .unwrap();
        let snapshot = engine.capture(&scene, "s");
        assert_eq!(snapshot.skybox_material_name.as_deref(), Some("sky_day"));
        assert_eq!(snapshot.skybox_rotation(), Some(30.0));
    }

    #[test]
    fn test_capture_is_pure() {
        let mut scene = SceneWorld::new();
        scene.insert_fixed("a", Transform::IDENTITY).unwrap();
        let engine = engine();
        let first = engine.capture(&scene, "s");
        let second = engine.capture(&scene, "s");
        assert_eq!(first.fingerprint(), second.fingerprint());
        assert_eq!(scene.len(), 1);
    }
}
