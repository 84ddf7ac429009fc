//! JSON encoding

use crate::migrate::{migrate_document, SchemaPolicy};
use crate::model::Snapshot;
use diorama_core::{DioramaError, Result};
use serde_json::Value;

/// Parse a snapshot, upgrading older schemas
pub fn from_json(content: &str) -> Result<Snapshot> {
    from_json_with_policy(content, SchemaPolicy::Upgrade)
}

/// Parse a snapshot under the given schema policy.
///
/// Anything that is not a JSON object is a parse error; nothing partial is returned.
pub fn from_json_with_policy(content: &str, policy: SchemaPolicy) -> Result<Snapshot> {
    let value: Value = serde_json::from_str(content)
        .map_err(|e| DioramaError::ParseError(format!("invalid snapshot JSON: {}", e)))?;
    let Value::Object(doc) = value else {
        return Err(DioramaError::ParseError(
            "snapshot must be a JSON object".to_string(),
        ));
    };

    let doc = migrate_document(doc, policy)?;
    serde_json::from_value(Value::Object(doc))
        .map_err(|e| DioramaError::ParseError(format!("invalid snapshot: {}", e)))
}

pub fn to_json(snapshot: &Snapshot) -> Result<String> {
    Ok(serde_json::to_string(snapshot)?)
}

pub fn to_json_pretty(snapshot: &Snapshot) -> Result<String> {
    Ok(serde_json::to_string_pretty(snapshot)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ImageBindingRecord, ObjectRecord, CURRENT_SCHEMA_VERSION};
    use diorama_core::{ObjectId, Transform};

    #[test]
    fn test_round_trip() {
        let mut snapshot = Snapshot::new("Gallery A");
        snapshot.scene_base_id = "Gallery".into();
        snapshot.objects.push(ObjectRecord::capture(
            ObjectId::from("o1"),
            "frame",
            &Transform::IDENTITY,
            Some("wood".into()),
        ));
        snapshot
            .artworks
            .push(ImageBindingRecord::new("o1", "https://img/a.png"));

        let json = to_json_pretty(&snapshot).unwrap();
        let back = from_json(&json).unwrap();
        assert_eq!(back, snapshot);
    }

    #[test]
    fn test_empty_object_is_legacy_and_upgraded() {
        let snapshot = from_json("{}").unwrap();
        assert_eq!(snapshot.schema_version, CURRENT_SCHEMA_VERSION);
        assert!(snapshot.objects.is_empty());
    }

    #[test]
    fn test_garbage_is_parse_error() {
        assert!(matches!(from_json("not json"), Err(DioramaError::ParseError(_))));
        assert!(matches!(from_json("[1, 2]"), Err(DioramaError::ParseError(_))));
        assert!(matches!(
            from_json(r#"{"schema_version": 3, "objects": [{"px": 1}]}"#),
            Err(DioramaError::ParseError(_))
        ));
    }

    #[test]
    fn test_policy_is_honoured() {
        let json = r#"{"schema_version": 2, "objects": []}"#;
        assert!(from_json_with_policy(json, SchemaPolicy::Strict).is_err());
        assert!(from_json_with_policy(json, SchemaPolicy::Upgrade).is_ok());
    }

    #[test]
    fn test_output_uses_snake_case() {
        let json = to_json(&Snapshot::new("s")).unwrap();
        assert!(json.contains("\"schema_version\":3"));
        assert!(!json.contains("schemaVersion"));
    }
}
