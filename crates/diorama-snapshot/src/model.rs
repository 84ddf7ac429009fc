//! Snapshot data model

use crate::math;
use diorama_core::{ContentHash, ObjectId, Transform, Vec3};
use serde::{Deserialize, Deserializer, Serialize};

/// Schema revision written by this build.
///
/// 1 = objects only, 2 = adds artworks and skybox, 3 = adds templates for spawned objects.
pub const CURRENT_SCHEMA_VERSION: u32 = 3;

/// A captured scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(alias = "schemaVersion", default = "legacy_version")]
    pub schema_version: u32,
    #[serde(alias = "appVersion", default)]
    pub app_version: String,
    /// Advisory only: a mismatch is warned about, never rejected
    #[serde(alias = "sceneBaseId", default)]
    pub scene_base_id: String,
    #[serde(default)]
    pub name: String,
    /// RFC 3339
    #[serde(alias = "createdAtIso", default)]
    pub created_at: String,
    #[serde(default)]
    pub objects: Vec<ObjectRecord>,
    #[serde(default)]
    pub artworks: Vec<ImageBindingRecord>,
    #[serde(
        alias = "skyboxMaterialName",
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub skybox_material_name: Option<String>,
    #[serde(alias = "skyboxPreset", default, skip_serializing_if = "Option::is_none")]
    pub skybox_preset: Option<SkyboxPreset>,
    /// Fields this build does not know, kept and written back verbatim
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Documents written before versioning carry no version field at all
fn legacy_version() -> u32 {
    1
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

/// One identified object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectRecord {
    pub id: ObjectId,
    /// Prefab catalog id; empty for fixed objects
    #[serde(alias = "prefabPath", default)]
    pub template: String,
    #[serde(default)]
    pub px: f32,
    #[serde(default)]
    pub py: f32,
    #[serde(default)]
    pub pz: f32,
    #[serde(default)]
    pub rx: f32,
    #[serde(default)]
    pub ry: f32,
    #[serde(default)]
    pub rz: f32,
    #[serde(default = "one")]
    pub sx: f32,
    #[serde(default = "one")]
    pub sy: f32,
    #[serde(default = "one")]
    pub sz: f32,
    #[serde(
        alias = "materialId",
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub material: Option<String>,
    /// Fields this build does not know
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn one() -> f32 {
    1.0
}

impl ObjectRecord {
    /// Build a record from live state, applying capture rounding
    pub fn capture(
        id: ObjectId,
        template: impl Into<String>,
        transform: &Transform,
        material: Option<String>,
    ) -> Self {
        let p = math::round_vec3(transform.position);
        let r = math::canonical_euler(transform.euler_degrees());
        let s = math::round_vec3(transform.scale);
        Self {
            id,
            template: template.into(),
            px: p.x,
            py: p.y,
            pz: p.z,
            rx: r.x,
            ry: r.y,
            rz: r.z,
            sx: s.x,
            sy: s.y,
            sz: s.z,
            material,
            extra: serde_json::Map::new(),
        }
    }

    pub fn is_fixed(&self) -> bool {
        self.template.trim().is_empty()
    }

    pub fn position(&self) -> Vec3 {
        Vec3::new(self.px, self.py, self.pz)
    }

    /// Rotation as Euler degrees
    pub fn euler(&self) -> Vec3 {
        Vec3::new(self.rx, self.ry, self.rz)
    }

    pub fn scale(&self) -> Vec3 {
        Vec3::new(self.sx, self.sy, self.sz)
    }

    pub fn transform(&self) -> Transform {
        Transform::IDENTITY
            .with_position(self.position())
            .with_euler_degrees(self.euler())
            .with_scale(self.scale())
    }
}

/// A remote image bound to an object's image surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageBindingRecord {
    #[serde(alias = "objectId")]
    pub object_id: ObjectId,
    #[serde(alias = "imageUrl")]
    pub image_url: String,
    /// Fields this build does not know
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ImageBindingRecord {
    pub fn new(object_id: impl Into<ObjectId>, image_url: impl Into<String>) -> Self {
        Self {
            object_id: object_id.into(),
            image_url: image_url.into(),
            extra: serde_json::Map::new(),
        }
    }
}

/// Skybox selection with presentation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkyboxPreset {
    #[serde(alias = "type", default)]
    pub kind: String,
    #[serde(alias = "materialName", default, deserialize_with = "empty_as_none")]
    pub material_name: Option<String>,
    /// Degrees
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f32>,
    #[serde(alias = "exposureCompensation", default, skip_serializing_if = "Option::is_none")]
    pub exposure_compensation: Option<f32>,
}

impl SkyboxPreset {
    pub fn material(name: impl Into<String>) -> Self {
        Self {
            kind: "material".to_string(),
            material_name: Some(name.into()),
            rotation: None,
            exposure_compensation: None,
        }
    }

    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.rotation = Some(degrees);
        self
    }
}

/// The parts of a snapshot that describe scene content
#[derive(Serialize)]
struct Content<'a> {
    objects: Vec<ObjectContent<'a>>,
    artworks: Vec<(&'a str, &'a str)>,
    skybox: Option<&'a str>,
    skybox_rotation: Option<f32>,
}

#[derive(Serialize)]
struct ObjectContent<'a> {
    id: &'a str,
    template: &'a str,
    position: [f32; 3],
    rotation: [f32; 3],
    scale: [f32; 3],
    material: Option<&'a str>,
}

impl<'a> From<&'a ObjectRecord> for ObjectContent<'a> {
    fn from(r: &'a ObjectRecord) -> Self {
        Self {
            id: r.id.as_str(),
            template: &r.template,
            position: [r.px, r.py, r.pz],
            rotation: [r.rx, r.ry, r.rz],
            scale: [r.sx, r.sy, r.sz],
            material: r.material.as_deref(),
        }
    }
}

impl Snapshot {
    /// An empty snapshot at the current schema, stamped with the current time
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            app_version: String::new(),
            scene_base_id: String::new(),
            name: name.into(),
            created_at: chrono::Utc::now().to_rfc3339(),
            objects: Vec::new(),
            artworks: Vec::new(),
            skybox_material_name: None,
            skybox_preset: None,
            extra: serde_json::Map::new(),
        }
    }

    pub fn is_legacy(&self) -> bool {
        self.schema_version < CURRENT_SCHEMA_VERSION
    }

    /// The skybox material to show: the top-level name, else the preset's
    pub fn skybox_name(&self) -> Option<&str> {
        self.skybox_material_name.as_deref().or_else(|| {
            self.skybox_preset
                .as_ref()
                .and_then(|p| p.material_name.as_deref())
        })
    }

    pub fn skybox_rotation(&self) -> Option<f32> {
        self.skybox_preset.as_ref().and_then(|p| p.rotation)
    }

    pub fn object(&self, id: &str) -> Option<&ObjectRecord> {
        self.objects.iter().find(|o| o.id.as_str() == id)
    }

    /// Sort object records by id
    pub fn sort_objects(&mut self) {
        self.objects.sort_by(|a, b| a.id.cmp(&b.id));
    }

    /// Hash of the scene content, ignoring metadata and record order
    pub fn fingerprint(&self) -> ContentHash {
        let mut objects: Vec<&ObjectRecord> = self.objects.iter().collect();
        objects.sort_by(|a, b| a.id.cmp(&b.id));
        let mut artworks: Vec<&ImageBindingRecord> = self.artworks.iter().collect();
        artworks.sort_by(|a, b| a.object_id.cmp(&b.object_id));

        let content = Content {
            objects: objects.into_iter().map(ObjectContent::from).collect(),
            artworks: artworks
                .into_iter()
                .map(|a| (a.object_id.as_str(), a.image_url.as_str()))
                .collect(),
            skybox: self.skybox_name(),
            skybox_rotation: self.skybox_rotation(),
        };
        // Plain records of strings and floats always serialize
        ContentHash::of(&content).unwrap_or_else(|_| ContentHash::from_bytes(&[]))
    }
}
