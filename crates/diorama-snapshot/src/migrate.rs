//! Schema migration
//!
//! Each step lifts a raw document by exactly one schema version. Steps work
//! on the JSON object so that fields this build does not model survive.

use crate::model::{Snapshot, CURRENT_SCHEMA_VERSION};
use diorama_core::{DioramaError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// What to do with snapshots written under an older schema
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaPolicy {
    /// Upgrade in memory, filling new fields with safe defaults
    #[default]
    Upgrade,
    /// Refuse anything that is not the current schema
    Strict,
}

type Document = Map<String, Value>;

/// v1 carried objects only: add empty artworks and no skybox
fn v1_to_v2(doc: &mut Document) {
    doc.entry("artworks").or_insert_with(|| Value::Array(Vec::new()));
    if !doc.contains_key("skyboxMaterialName") {
        doc.entry("skybox_material_name")
            .or_insert_with(|| Value::String(String::new()));
    }
}

/// v2 objects had no template: every existing object is treated as fixed
fn v2_to_v3(doc: &mut Document) {
    if let Some(Value::Array(objects)) = doc.get_mut("objects") {
        for object in objects.iter_mut().filter_map(Value::as_object_mut) {
            if !object.contains_key("prefabPath") {
                object
                    .entry("template")
                    .or_insert_with(|| Value::String(String::new()));
            }
        }
    }
}

/// Step that lifts a document from `version` to `version + 1`
fn step(version: u32) -> Option<fn(&mut Document)> {
    match version {
        1 => Some(v1_to_v2),
        2 => Some(v2_to_v3),
        _ => None,
    }
}

/// Read the schema version of a raw document. Documents without one are v1.
fn document_version(doc: &Document) -> Result<u32> {
    let value = doc.get("schema_version").or_else(|| doc.get("schemaVersion"));
    match value {
        None | Some(Value::Null) => Ok(1),
        Some(v) => v
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| DioramaError::ParseError(format!("invalid schema version: {}", v))),
    }
}

/// Check a document's schema and upgrade it to the current version.
///
/// Newer schemas are always rejected. Older ones are upgraded step by step
/// under [`SchemaPolicy::Upgrade`] and rejected under [`SchemaPolicy::Strict`].
pub fn migrate_document(mut doc: Document, policy: SchemaPolicy) -> Result<Document> {
    let found = document_version(&doc)?;

    if found > CURRENT_SCHEMA_VERSION {
        return Err(DioramaError::UnsupportedSchema {
            found,
            supported: CURRENT_SCHEMA_VERSION,
        });
    }
    if found < CURRENT_SCHEMA_VERSION && policy == SchemaPolicy::Strict {
        return Err(DioramaError::OutdatedSchema {
            found,
            current: CURRENT_SCHEMA_VERSION,
        });
    }

    let mut version = found.max(1);
    while version < CURRENT_SCHEMA_VERSION {
        let Some(upgrade_step) = step(version) else {
            return Err(DioramaError::UnsupportedSchema {
                found,
                supported: CURRENT_SCHEMA_VERSION,
            });
        };
        upgrade_step(&mut doc);
        version += 1;
        tracing::debug!("Upgraded snapshot document to schema v{}", version);
    }

    doc.remove("schemaVersion");
    doc.insert("schema_version".to_string(), Value::from(CURRENT_SCHEMA_VERSION));

    if found < CURRENT_SCHEMA_VERSION {
        tracing::info!(
            "Upgraded snapshot from schema v{} to v{}",
            found,
            CURRENT_SCHEMA_VERSION
        );
    }
    Ok(doc)
}

/// Bring an in-memory snapshot to the current schema
pub fn upgrade(snapshot: Snapshot, policy: SchemaPolicy) -> Result<Snapshot> {
    if snapshot.schema_version == CURRENT_SCHEMA_VERSION {
        return Ok(snapshot);
    }
    let Value::Object(doc) = serde_json::to_value(&snapshot)? else {
        return Err(DioramaError::ParseError("snapshot is not an object".to_string()));
    };
    let doc = migrate_document(doc, policy)?;
    Ok(serde_json::from_value(Value::Object(doc))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_v1_to_v2_adds_defaults() {
        let mut d = doc(json!({"schemaVersion": 1, "objects": []}));
        v1_to_v2(&mut d);
        assert_eq!(d["artworks"], json!([]));
        assert_eq!(d["skybox_material_name"], json!(""));
    }

    #[test]
    fn test_v1_to_v2_keeps_existing_values() {
        let mut d = doc(json!({"artworks": [{"object_id": "a", "image_url": "u"}], "skyboxMaterialName": "sky"}));
        v1_to_v2(&mut d);
        assert_eq!(d["artworks"].as_array().map(Vec::len), Some(1));
        assert!(!d.contains_key("skybox_material_name"));
    }

    #[test]
    fn test_v2_to_v3_marks_objects_fixed() {
        let mut d = doc(json!({"objects": [{"id": "a"}, {"id": "b", "prefabPath": "frame"}]}));
        v2_to_v3(&mut d);
        assert_eq!(d["objects"][0]["template"], json!(""));
        assert!(d["objects"][1].get("template").is_none());
    }

    #[test]
    fn test_chain_from_v1() {
        let d = doc(json!({"schemaVersion": 1, "objects": [{"id": "wall_01", "px": 1.0}]}));
        let d = migrate_document(d, SchemaPolicy::Upgrade).unwrap();
        let snapshot: Snapshot = serde_json::from_value(Value::Object(d)).unwrap();

        assert_eq!(snapshot.schema_version, CURRENT_SCHEMA_VERSION);
        assert!(snapshot.objects[0].is_fixed());
        assert!(snapshot.artworks.is_empty());
        assert!(snapshot.skybox_name().is_none());
    }

    #[test]
    fn test_unversioned_document_is_v1() {
        let d = doc(json!({"objects": []}));
        assert_eq!(document_version(&d).unwrap(), 1);
        assert!(migrate_document(d, SchemaPolicy::Strict).is_err());
    }

    #[test]
    fn test_newer_schema_rejected() {
        let d = doc(json!({"schema_version": 4, "objects": []}));
        let result = migrate_document(d, SchemaPolicy::Upgrade);
        assert!(matches!(
            result,
            Err(DioramaError::UnsupportedSchema { found: 4, supported: 3 })
        ));
    }

    #[test]
    fn test_strict_rejects_older() {
        let d = doc(json!({"schema_version": 2}));
        let result = migrate_document(d, SchemaPolicy::Strict);
        assert!(matches!(result, Err(DioramaError::OutdatedSchema { found: 2, .. })));
    }

    #[test]
    fn test_unknown_fields_survive_upgrade() {
        let d = doc(json!({"schema_version": 2, "weather": "rain"}));
        let d = migrate_document(d, SchemaPolicy::Upgrade).unwrap();
        assert_eq!(d["weather"], json!("rain"));
    }

    #[test]
    fn test_upgrade_typed_snapshot() {
        let mut snapshot = Snapshot::new("old");
        snapshot.schema_version = 2;
        let upgraded = upgrade(snapshot, SchemaPolicy::Upgrade).unwrap();
        assert_eq!(upgraded.schema_version, CURRENT_SCHEMA_VERSION);
        assert_eq!(upgraded.name, "old");
    }

    #[test]
    fn test_invalid_version_is_parse_error() {
        let d = doc(json!({"schema_version": "three"}));
        assert!(matches!(
            migrate_document(d, SchemaPolicy::Upgrade),
            Err(DioramaError::ParseError(_))
        ));
    }
}
