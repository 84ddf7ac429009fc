//! TOML catalog files
//!
//! ```toml
//! [[materials]]
//! id = "wood"
//! material = { name = "Oak", base_color = [150, 111, 51, 255] }
//!
//! [[prefabs]]
//! id = "frame"
//! prefab = { name = "Frame", material = "wood", image_surface = true }
//! ```

use crate::catalog::CatalogEntry;
use crate::types::{Material, MaterialCatalog, Prefab, PrefabCatalog};
use diorama_core::{DioramaError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaterialEntry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub material: Option<Material>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrefabEntry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub prefab: Option<Prefab>,
}

/// Root structure of a catalog TOML file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub materials: Vec<MaterialEntry>,
    #[serde(default)]
    pub prefabs: Vec<PrefabEntry>,
}

impl CatalogFile {
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| DioramaError::CatalogError(format!("Failed to parse catalog: {}", e)))
    }
}

/// The built catalogs, shared read-only by every engine
#[derive(Debug, Clone, Default)]
pub struct Catalogs {
    pub materials: Arc<MaterialCatalog>,
    pub prefabs: Arc<PrefabCatalog>,
}

impl Catalogs {
    pub fn new(materials: MaterialCatalog, prefabs: PrefabCatalog) -> Self {
        Self {
            materials: Arc::new(materials),
            prefabs: Arc::new(prefabs),
        }
    }

    /// Build both catalogs from a parsed file, skipping malformed entries
    pub fn from_file(file: CatalogFile) -> Self {
        let materials = MaterialCatalog::build(
            "material",
            file.materials.into_iter().map(|e| CatalogEntry {
                id: e.id,
                resource: e.material,
            }),
        );
        let prefabs = PrefabCatalog::build(
            "prefab",
            file.prefabs.into_iter().map(|e| CatalogEntry {
                id: e.id,
                resource: e.prefab,
            }),
        );
        Self::new(materials, prefabs)
    }

    pub fn load_from_str(content: &str) -> Result<Self> {
        Ok(Self::from_file(CatalogFile::from_str(content)?))
    }

    /// Load catalogs from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            DioramaError::CatalogError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::load_from_str(&content)
    }

    /// Load catalogs, falling back to empty ones on a configuration error
    pub fn load_or_empty<P: AsRef<Path>>(path: P) -> Self {
        match Self::load_from_file(path) {
            Ok(catalogs) => catalogs,
            Err(e) => {
                tracing::warn!("{}; continuing with empty catalogs", e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[[materials]]
id = "wood"
material = { name = "Oak", base_color = [150, 111, 51, 255] }

[[materials]]
id = "sky_day"
material = { name = "Day Sky", shader = "skybox", supports_rotation = true }

[[materials]]
material = { name = "No Id" }

[[prefabs]]
id = "frame"
prefab = { name = "Frame", material = "wood", image_surface = true, authored_id = "proto_frame" }

[[prefabs]]
id = "broken"
"#;

    #[test]
    fn test_load_from_str() {
        let catalogs = Catalogs::load_from_str(SAMPLE).unwrap();
        assert_eq!(catalogs.materials.len(), 2);
        assert_eq!(catalogs.prefabs.len(), 1);

        let frame = catalogs.prefabs.get_by_id("frame").unwrap();
        assert!(frame.image_surface);
        assert_eq!(frame.material.as_deref(), Some("wood"));

        let sky = catalogs.materials.get_by_id("sky_day").unwrap();
        assert!(sky.supports_rotation);
    }

    #[test]
    fn test_invalid_toml_is_catalog_error() {
        let result = Catalogs::load_from_str("[[materials]\nid = ");
        assert!(matches!(result, Err(DioramaError::CatalogError(_))));
    }

    #[test]
    fn test_missing_file_degrades_to_empty() {
        let path = std::env::temp_dir().join(format!("diorama_missing_{}.toml", uuid::Uuid::new_v4()));
        let catalogs = Catalogs::load_or_empty(&path);
        assert!(catalogs.materials.is_empty());
        assert!(catalogs.prefabs.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let dir = std::env::temp_dir().join(format!("diorama_catalog_{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("catalog.toml");
        fs::write(&path, SAMPLE).unwrap();

        let catalogs = Catalogs::load_from_file(&path).unwrap();
        assert_eq!(catalogs.materials.all_ids().collect::<Vec<_>>(), vec!["wood", "sky_day"]);

        fs::remove_dir_all(&dir).ok();
    }
}
