//! SceneWorld - hecs world keyed by stable object ids

use crate::components::{Active, ImageOverride, ImageSurface, Provenance, Renderable};
use crate::environment::Environment;
use crate::identity::{ensure_id, Placement};
use bimap::BiMap;
use diorama_catalog::{Material, MaterialCatalog, Prefab};
use diorama_core::{DioramaError, ObjectId, Result, Transform};

/// A read-only copy of one identified object's state
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectView {
    pub id: ObjectId,
    pub provenance: Provenance,
    pub transform: Transform,
    pub active: bool,
    /// `None` when the object has no renderable surface
    pub renderable: Option<Renderable>,
    /// `None` when the object has no image surface
    pub image_surface: Option<ImageSurface>,
}

impl ObjectView {
    pub fn material(&self) -> Option<&Material> {
        self.renderable.as_ref().and_then(|r| r.material.as_ref())
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_surface.as_ref().and_then(|s| s.url())
    }
}

/// The live scene
///
/// Wraps hecs::World with:
/// - Stable ObjectId mapping (unique among live objects)
/// - Fixed/Spawned provenance on every object
/// - The scene backdrop
pub struct SceneWorld {
    world: hecs::World,
    /// Bidirectional mapping: ObjectId <-> hecs::Entity
    id_map: BiMap<ObjectId, hecs::Entity>,
    environment: Environment,
}

impl Default for SceneWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneWorld {
    /// Create a new empty scene
    pub fn new() -> Self {
        Self {
            world: hecs::World::new(),
            id_map: BiMap::new(),
            environment: Environment::default(),
        }
    }

    fn spawn(&mut self, id: ObjectId, provenance: Provenance, transform: Transform) -> Result<hecs::Entity> {
        if id.is_blank() {
            return Err(DioramaError::InvalidObjectId(id.to_string()));
        }
        if self.id_map.contains_left(&id) {
            return Err(DioramaError::DuplicateObjectId(id.to_string()));
        }

        let entity = self
            .world
            .spawn((id.clone(), provenance, transform, Active(true)));
        self.id_map.insert(id, entity);
        Ok(entity)
    }

    /// Insert a scene-authored object
    pub fn insert_fixed(&mut self, id: impl Into<ObjectId>, transform: Transform) -> Result<()> {
        self.spawn(id.into(), Provenance::Fixed, transform)?;
        Ok(())
    }

    /// Instantiate a prefab under the given id.
    ///
    /// The id is supplied up front so the new object is never visible without
    /// it. An id baked into the prefab is cleared from the instance.
    pub fn spawn_from_prefab(
        &mut self,
        id: impl Into<ObjectId>,
        template_id: &str,
        prefab: &Prefab,
        materials: &MaterialCatalog,
    ) -> Result<()> {
        let id = id.into();
        let mut prototype_id = prefab.authored_id.clone().map(ObjectId::from);
        ensure_id(&mut prototype_id, Placement::Prototype);

        let entity = self.spawn(
            id.clone(),
            Provenance::Spawned {
                template_id: template_id.to_string(),
            },
            Transform::IDENTITY,
        )?;

        if prefab.renderable {
            let material = prefab.material.as_deref().and_then(|material_id| {
                let found = materials.get_by_id(material_id).cloned();
                if found.is_none() {
                    tracing::warn!(
                        "Prefab '{}' references unknown material '{}'",
                        template_id,
                        material_id
                    );
                }
                found
            });
            self.attach(entity, Renderable { material });
        }
        if prefab.image_surface {
            self.attach(entity, ImageSurface::default());
        }

        tracing::debug!("Spawned '{}' from prefab '{}'", id, template_id);
        Ok(())
    }

    fn attach<C: hecs::Component>(&mut self, entity: hecs::Entity, component: C) {
        // Entities reachable through id_map are always alive
        let _ = self.world.insert_one(entity, component);
    }

    fn entity(&self, id: &str) -> Result<hecs::Entity> {
        self.id_map
            .get_by_left(id)
            .copied()
            .ok_or_else(|| DioramaError::ObjectNotFound(id.to_string()))
    }

    /// Give an object a renderable surface, optionally with a material bound
    pub fn add_renderable(&mut self, id: &str, material: Option<Material>) -> Result<()> {
        let entity = self.entity(id)?;
        self.attach(entity, Renderable { material });
        Ok(())
    }

    /// Give an object an image surface
    pub fn add_image_surface(&mut self, id: &str) -> Result<()> {
        let entity = self.entity(id)?;
        self.attach(entity, ImageSurface::default());
        Ok(())
    }

    /// Destroy an object
    pub fn despawn(&mut self, id: &str) -> Result<()> {
        let entity = self.entity(id)?;
        self.world
            .despawn(entity)
            .map_err(|_| DioramaError::ObjectNotFound(id.to_string()))?;
        self.id_map.remove_by_left(id);
        Ok(())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.id_map.contains_left(id)
    }

    /// Look up one object by id
    pub fn find_by_id(&self, id: &str) -> Option<ObjectView> {
        let entity = self.entity(id).ok()?;
        self.view(entity)
    }

    fn view(&self, entity: hecs::Entity) -> Option<ObjectView> {
        let id = (*self.world.get::<&ObjectId>(entity).ok()?).clone();
        let provenance = (*self.world.get::<&Provenance>(entity).ok()?).clone();
        let transform = *self.world.get::<&Transform>(entity).ok()?;
        let active = self.world.get::<&Active>(entity).map(|a| a.0).unwrap_or(true);
        let renderable = self.world.get::<&Renderable>(entity).ok().map(|r| (*r).clone());
        let image_surface = self
            .world
            .get::<&ImageSurface>(entity)
            .ok()
            .map(|s| (*s).clone());

        Some(ObjectView {
            id,
            provenance,
            transform,
            active,
            renderable,
            image_surface,
        })
    }

    /// All object ids, ascending
    pub fn find_all(&self) -> Vec<ObjectId> {
        let mut ids: Vec<ObjectId> = self.id_map.left_values().cloned().collect();
        ids.sort();
        ids
    }

    /// Every object, inactive ones included, ordered by id
    pub fn objects(&self) -> Vec<ObjectView> {
        self.find_all()
            .iter()
            .filter_map(|id| self.find_by_id(id.as_str()))
            .collect()
    }

    /// Ids of every spawned object, ascending
    pub fn spawned_ids(&self) -> Vec<ObjectId> {
        let mut ids: Vec<ObjectId> = self
            .world
            .query::<(&ObjectId, &Provenance)>()
            .iter()
            .filter(|(_, (_, provenance))| provenance.is_spawned())
            .map(|(_, (id, _))| id.clone())
            .collect();
        ids.sort();
        ids
    }

    pub fn transform(&self, id: &str) -> Option<Transform> {
        let entity = self.entity(id).ok()?;
        self.world.get::<&Transform>(entity).ok().map(|t| *t)
    }

    /// Set an object's transform. Returns whether anything changed.
    pub fn set_transform(&mut self, id: &str, transform: Transform) -> Result<bool> {
        let entity = self.entity(id)?;
        let current = self
            .world
            .query_one_mut::<&mut Transform>(entity)
            .map_err(|_| DioramaError::ObjectNotFound(id.to_string()))?;
        if *current == transform {
            return Ok(false);
        }
        *current = transform;
        Ok(true)
    }

    /// Bind a material to the renderable surface. Returns whether anything changed.
    pub fn set_material(&mut self, id: &str, material: Material) -> Result<bool> {
        let entity = self.entity(id)?;
        let renderable = self
            .world
            .query_one_mut::<&mut Renderable>(entity)
            .map_err(|_| DioramaError::MissingSurface {
                id: id.to_string(),
                surface: "renderable",
            })?;
        if renderable.material.as_ref() == Some(&material) {
            return Ok(false);
        }
        renderable.material = Some(material);
        Ok(true)
    }

    pub fn has_image_surface(&self, id: &str) -> bool {
        self.entity(id)
            .map(|entity| self.world.get::<&ImageSurface>(entity).is_ok())
            .unwrap_or(false)
    }

    /// Attach a per-object image override, replacing any previous one
    pub fn set_image_override(&mut self, id: &str, image: ImageOverride) -> Result<()> {
        let entity = self.entity(id)?;
        let surface = self
            .world
            .query_one_mut::<&mut ImageSurface>(entity)
            .map_err(|_| DioramaError::MissingSurface {
                id: id.to_string(),
                surface: "image",
            })?;
        surface.override_image = Some(image);
        Ok(())
    }

    pub fn set_active(&mut self, id: &str, active: bool) -> Result<()> {
        let entity = self.entity(id)?;
        self.attach(entity, Active(active));
        Ok(())
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn environment_mut(&mut self) -> &mut Environment {
        &mut self.environment
    }

    /// Get number of objects
    pub fn len(&self) -> usize {
        self.id_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_map.is_empty()
    }

    /// Remove every object and reset the backdrop
    pub fn clear(&mut self) {
        self.world.clear();
        self.id_map.clear();
        self.environment = Environment::default();
    }
}
