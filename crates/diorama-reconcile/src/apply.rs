//! Apply: reconcile a live scene with a snapshot
//!
//! The pass runs in a fixed order: schema check, despawn of spawned objects
//! the snapshot no longer lists, spawn/update of every record, collection of
//! image bindings, then the environment. Per-record problems become
//! [`ApplyWarning`]s; only a schema rejection fails the call, and it does so
//! before the scene is touched.

use crate::environment::{EnvironmentApplier, EnvironmentChange};
use crate::placement::PlacementRules;
use diorama_catalog::Catalogs;
use diorama_core::{ObjectId, Result, Transform};
use diorama_scene::SceneWorld;
use diorama_snapshot::{math, upgrade, ImageBindingRecord, ObjectRecord, SchemaPolicy, Snapshot};
use std::collections::HashSet;
use std::fmt;

/// A localized problem found while applying a snapshot
#[derive(Debug, Clone, PartialEq)]
pub enum ApplyWarning {
    SceneBaseMismatch { expected: String, found: String },
    BlankRecordId { index: usize },
    DuplicateRecord { id: ObjectId },
    UnknownTemplate { id: ObjectId, template: String },
    /// A fixed object the snapshot references is not in this scene
    MissingFixedObject { id: ObjectId },
    SpawnFailed { id: ObjectId, reason: String },
    UnknownMaterial { id: ObjectId, material: String },
    NoRenderableSurface { id: ObjectId },
    BindingTargetMissing { id: ObjectId },
    NoImageSurface { id: ObjectId },
    UnknownSkybox { name: String, fallback: Option<String> },
}

impl fmt::Display for ApplyWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SceneBaseMismatch { expected, found } => write!(
                f,
                "snapshot was taken in scene '{}' but this is '{}'; applying anyway",
                found, expected
            ),
            Self::BlankRecordId { index } => write!(f, "object record #{} has no id, skipped", index),
            Self::DuplicateRecord { id } => write!(f, "object '{}' listed twice, later record skipped", id),
            Self::UnknownTemplate { id, template } => {
                write!(f, "object '{}': unknown template '{}', skipped", id, template)
            }
            Self::MissingFixedObject { id } => {
                write!(f, "object '{}' not found in scene and has no template, skipped", id)
            }
            Self::SpawnFailed { id, reason } => write!(f, "object '{}' could not be spawned: {}", id, reason),
            Self::UnknownMaterial { id, material } => {
                write!(f, "object '{}': unknown material '{}', kept previous", id, material)
            }
            Self::NoRenderableSurface { id } => {
                write!(f, "object '{}' has no renderable surface for its material", id)
            }
            Self::BindingTargetMissing { id } => write!(f, "artwork target '{}' not found, skipped", id),
            Self::NoImageSurface { id } => write!(f, "artwork target '{}' has no image surface, skipped", id),
            Self::UnknownSkybox { name, fallback } => match fallback {
                Some(default) => write!(f, "unknown skybox '{}', using '{}'", name, default),
                None => write!(f, "unknown skybox '{}', backdrop unchanged", name),
            },
        }
    }
}

/// What an apply pass did
#[derive(Debug, Clone, PartialEq)]
pub struct ApplyReport {
    /// Schema version of the incoming snapshot before any upgrade
    pub source_schema: u32,
    pub spawned: Vec<ObjectId>,
    pub despawned: Vec<ObjectId>,
    /// Existing objects whose transform or material changed
    pub updated: Vec<ObjectId>,
    pub unchanged: usize,
    pub warnings: Vec<ApplyWarning>,
    /// Image bindings with a live target, ready for the image loader
    pub bindings: Vec<ImageBindingRecord>,
    pub environment: EnvironmentChange,
}

impl ApplyReport {
    fn new(source_schema: u32) -> Self {
        Self {
            source_schema,
            spawned: Vec::new(),
            despawned: Vec::new(),
            updated: Vec::new(),
            unchanged: 0,
            warnings: Vec::new(),
            bindings: Vec::new(),
            environment: EnvironmentChange::Unchanged,
        }
    }

    fn warn(&mut self, warning: ApplyWarning) {
        tracing::warn!("{}", warning);
        self.warnings.push(warning);
    }

    /// True when the scene objects were left exactly as they were
    pub fn is_noop(&self) -> bool {
        self.spawned.is_empty() && self.despawned.is_empty() && self.updated.is_empty()
    }
}

/// The result of a successful apply
#[derive(Debug, Clone)]
pub struct Reconciled {
    /// The snapshot as applied, upgraded to the current schema
    pub snapshot: Snapshot,
    pub report: ApplyReport,
}

/// Tunables for the apply pass
#[derive(Debug, Clone, Default)]
pub struct ApplyOptions {
    pub schema_policy: SchemaPolicy,
    /// The scene this process runs; empty disables the mismatch warning
    pub scene_base_id: String,
    pub placement: PlacementRules,
}

/// Reconciles live scenes with snapshots
#[derive(Debug, Clone)]
pub struct ApplyEngine {
    catalogs: Catalogs,
    environment: EnvironmentApplier,
    options: ApplyOptions,
}

impl ApplyEngine {
    pub fn new(catalogs: Catalogs, environment: EnvironmentApplier) -> Self {
        Self {
            catalogs,
            environment,
            options: ApplyOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ApplyOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ApplyOptions {
        &self.options
    }

    /// Make the scene match the snapshot
    pub fn apply(&self, scene: &mut SceneWorld, snapshot: Snapshot) -> Result<Reconciled> {
        let source_schema = snapshot.schema_version;
        let snapshot = upgrade(snapshot, self.options.schema_policy)?;
        let mut report = ApplyReport::new(source_schema);

        if !self.options.scene_base_id.is_empty()
            && !snapshot.scene_base_id.is_empty()
            && snapshot.scene_base_id != self.options.scene_base_id
        {
            report.warn(ApplyWarning::SceneBaseMismatch {
                expected: self.options.scene_base_id.clone(),
                found: snapshot.scene_base_id.clone(),
            });
        }

        self.despawn_pass(scene, &snapshot, &mut report);
        self.reconcile_pass(scene, &snapshot, &mut report);
        self.binding_pass(scene, &snapshot, &mut report);
        self.environment_pass(scene, &snapshot, &mut report);

        tracing::info!(
            "Applied '{}': {} spawned, {} despawned, {} updated, {} unchanged, {} warnings",
            snapshot.name,
            report.spawned.len(),
            report.despawned.len(),
            report.updated.len(),
            report.unchanged,
            report.warnings.len()
        );

        Ok(Reconciled { snapshot, report })
    }

    /// Destroy spawned objects the snapshot no longer lists. Fixed objects stay.
    fn despawn_pass(&self, scene: &mut SceneWorld, snapshot: &Snapshot, report: &mut ApplyReport) {
        let wanted: HashSet<&str> = snapshot.objects.iter().map(|o| o.id.as_str()).collect();

        for id in scene.spawned_ids() {
            if wanted.contains(id.as_str()) {
                continue;
            }
            match scene.despawn(id.as_str()) {
                Ok(()) => {
                    tracing::debug!("Despawned '{}'", id);
                    report.despawned.push(id);
                }
                Err(e) => tracing::warn!("Failed to despawn '{}': {}", id, e),
            }
        }
    }

    fn reconcile_pass(&self, scene: &mut SceneWorld, snapshot: &Snapshot, report: &mut ApplyReport) {
        let mut seen: HashSet<&str> = HashSet::new();

        for (index, record) in snapshot.objects.iter().enumerate() {
            if record.id.is_blank() {
                report.warn(ApplyWarning::BlankRecordId { index });
                continue;
            }
            if !seen.insert(record.id.as_str()) {
                report.warn(ApplyWarning::DuplicateRecord {
                    id: record.id.clone(),
                });
                continue;
            }

            let spawned = !scene.contains(record.id.as_str());
            if spawned && !self.spawn(scene, record, report) {
                continue;
            }

            let changed = self.update(scene, record, report);
            if spawned {
                report.spawned.push(record.id.clone());
            } else if changed {
                report.updated.push(record.id.clone());
            } else {
                report.unchanged += 1;
            }
        }
    }

    /// Instantiate the record's template. Returns false when the record is skipped.
    fn spawn(&self, scene: &mut SceneWorld, record: &ObjectRecord, report: &mut ApplyReport) -> bool {
        if record.is_fixed() {
            report.warn(ApplyWarning::MissingFixedObject {
                id: record.id.clone(),
            });
            return false;
        }

        let Some(prefab) = self.catalogs.prefabs.get_by_id(&record.template) else {
            report.warn(ApplyWarning::UnknownTemplate {
                id: record.id.clone(),
                template: record.template.clone(),
            });
            return false;
        };

        match scene.spawn_from_prefab(
            record.id.clone(),
            &record.template,
            prefab,
            &self.catalogs.materials,
        ) {
            Ok(()) => true,
            Err(e) => {
                report.warn(ApplyWarning::SpawnFailed {
                    id: record.id.clone(),
                    reason: e.to_string(),
                });
                false
            }
        }
    }

    /// Write transform and material. Returns whether anything changed.
    fn update(&self, scene: &mut SceneWorld, record: &ObjectRecord, report: &mut ApplyReport) -> bool {
        let rules = &self.options.placement;
        let transform = Transform::IDENTITY
            .with_position(rules.position(record.position()))
            .with_euler_degrees(rules.rotation(record.euler()))
            .with_scale(rules.scale(record.scale()));

        let id = record.id.as_str();
        // A write that only removes sub-precision drift counts as unchanged
        let drift_only = scene
            .transform(id)
            .is_some_and(|current| math::equivalent(&current, &transform));
        let mut changed = match scene.set_transform(id, transform) {
            Ok(written) => written && !drift_only,
            Err(e) => {
                tracing::warn!("Failed to move '{}': {}", id, e);
                false
            }
        };

        if let Some(material_id) = &record.material {
            match self.catalogs.materials.get_by_id(material_id) {
                None => report.warn(ApplyWarning::UnknownMaterial {
                    id: record.id.clone(),
                    material: material_id.clone(),
                }),
                Some(material) => match scene.set_material(id, material.clone()) {
                    Ok(material_changed) => changed |= material_changed,
                    Err(_) => report.warn(ApplyWarning::NoRenderableSurface {
                        id: record.id.clone(),
                    }),
                },
            }
        }

        changed
    }

    /// Keep the bindings whose target exists and carries an image surface
    fn binding_pass(&self, scene: &SceneWorld, snapshot: &Snapshot, report: &mut ApplyReport) {
        for binding in &snapshot.artworks {
            let id = binding.object_id.as_str();
            if !scene.contains(id) {
                report.warn(ApplyWarning::BindingTargetMissing {
                    id: binding.object_id.clone(),
                });
            } else if !scene.has_image_surface(id) {
                report.warn(ApplyWarning::NoImageSurface {
                    id: binding.object_id.clone(),
                });
            } else {
                report.bindings.push(binding.clone());
            }
        }
    }

    fn environment_pass(&self, scene: &mut SceneWorld, snapshot: &Snapshot, report: &mut ApplyReport) {
        let change = self.environment.apply_from_snapshot(scene, snapshot);
        match &change {
            EnvironmentChange::FellBack { requested, applied } => {
                report.warn(ApplyWarning::UnknownSkybox {
                    name: requested.clone(),
                    fallback: Some(applied.clone()),
                })
            }
            EnvironmentChange::Unresolved { requested } => report.warn(ApplyWarning::UnknownSkybox {
                name: requested.clone(),
                fallback: None,
            }),
            EnvironmentChange::Unchanged | EnvironmentChange::Applied { .. } => {}
        }
        report.environment = change;
    }
}
