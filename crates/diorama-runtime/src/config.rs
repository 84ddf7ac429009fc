//! Layered configuration system
//!
//! Config is loaded with four layers of precedence (highest wins):
//! 1. Environment variables: `DIORAMA_*`
//! 2. Project-local: `.diorama/config.toml`
//! 3. Global: `~/.diorama/config.toml`
//! 4. Built-in defaults

use diorama_core::{DioramaError, Result};
use diorama_images::DEFAULT_MAX_CONCURRENT;
use diorama_reconcile::{ApplyOptions, PlacementRules};
use diorama_snapshot::SchemaPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_CURRENT_KEY: &str = "diorama.current";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// `[scene]` as written in a config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneSection {
    #[serde(default)]
    pub scene_base_id: Option<String>,
    #[serde(default)]
    pub app_version: Option<String>,
    /// Store key the current snapshot is saved under
    #[serde(default)]
    pub current_key: Option<String>,
    /// Snapshot file applied by a reset
    #[serde(default)]
    pub default_snapshot: Option<PathBuf>,
}

/// `[apply]` as written in a config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplySection {
    #[serde(default)]
    pub schema_policy: Option<SchemaPolicy>,
    #[serde(default)]
    pub placement: Option<PlacementRules>,
    #[serde(default)]
    pub default_environment: Option<String>,
}

/// `[images]` as written in a config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImagesSection {
    #[serde(default)]
    pub max_concurrent_downloads: Option<usize>,
    #[serde(default)]
    pub proxy_base: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Top-level config file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DioramaConfigFile {
    #[serde(default)]
    pub scene: SceneSection,
    #[serde(default)]
    pub apply: ApplySection,
    #[serde(default)]
    pub images: ImagesSection,
}

/// Resolved configuration with every layer applied
#[derive(Debug, Clone)]
pub struct DioramaConfig {
    pub scene_base_id: String,
    pub app_version: String,
    pub current_key: String,
    pub default_snapshot: Option<PathBuf>,
    pub schema_policy: SchemaPolicy,
    pub placement: PlacementRules,
    pub default_environment: Option<String>,
    pub max_concurrent_downloads: usize,
    pub proxy_base: Option<String>,
    pub timeout_secs: u64,
}

impl Default for DioramaConfig {
    fn default() -> Self {
        Self::resolve(DioramaConfigFile::default())
    }
}

impl DioramaConfig {
    /// Load config with layered precedence: global < project < env vars
    pub fn load() -> Result<Self> {
        let mut config = DioramaConfigFile::default();

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                let global = Self::load_file(&global_path)?;
                Self::merge_into(&mut config, global);
            }
        }

        let local_path = PathBuf::from(".diorama/config.toml");
        if local_path.exists() {
            let local = Self::load_file(&local_path)?;
            Self::merge_into(&mut config, local);
        }

        Self::apply_env_overrides(&mut config)?;
        Ok(Self::resolve(config))
    }

    /// Load config from a specific file path only, plus env overrides
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let mut config = Self::load_file(path)?;
        Self::apply_env_overrides(&mut config)?;
        Ok(Self::resolve(config))
    }

    /// Options for the apply engine
    pub fn apply_options(&self) -> ApplyOptions {
        ApplyOptions {
            schema_policy: self.schema_policy,
            scene_base_id: self.scene_base_id.clone(),
            placement: self.placement.clone(),
        }
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".diorama").join("config.toml"))
    }

    fn load_file(path: &Path) -> Result<DioramaConfigFile> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| {
            DioramaError::ConfigError(format!("Failed to parse config {}: {}", path.display(), e))
        })
    }

    fn merge_into(base: &mut DioramaConfigFile, overlay: DioramaConfigFile) {
        let scene = overlay.scene;
        if scene.scene_base_id.is_some() {
            base.scene.scene_base_id = scene.scene_base_id;
        }
        if scene.app_version.is_some() {
            base.scene.app_version = scene.app_version;
        }
        if scene.current_key.is_some() {
            base.scene.current_key = scene.current_key;
        }
        if scene.default_snapshot.is_some() {
            base.scene.default_snapshot = scene.default_snapshot;
        }

        let apply = overlay.apply;
        if apply.schema_policy.is_some() {
            base.apply.schema_policy = apply.schema_policy;
        }
        if apply.placement.is_some() {
            base.apply.placement = apply.placement;
        }
        if apply.default_environment.is_some() {
            base.apply.default_environment = apply.default_environment;
        }

        let images = overlay.images;
        if images.max_concurrent_downloads.is_some() {
            base.images.max_concurrent_downloads = images.max_concurrent_downloads;
        }
        if images.proxy_base.is_some() {
            base.images.proxy_base = images.proxy_base;
        }
        if images.timeout_secs.is_some() {
            base.images.timeout_secs = images.timeout_secs;
        }
    }

    fn apply_env_overrides(config: &mut DioramaConfigFile) -> Result<()> {
        if let Ok(id) = std::env::var("DIORAMA_SCENE_BASE_ID") {
            config.scene.scene_base_id = Some(id);
        }
        if let Ok(raw) = std::env::var("DIORAMA_MAX_CONCURRENT_DOWNLOADS") {
            let n = raw.trim().parse::<usize>().map_err(|_| {
                DioramaError::ConfigError(format!(
                    "DIORAMA_MAX_CONCURRENT_DOWNLOADS must be a positive integer, got '{}'",
                    raw
                ))
            })?;
            config.images.max_concurrent_downloads = Some(n);
        }
        if let Ok(base) = std::env::var("DIORAMA_PROXY_BASE") {
            config.images.proxy_base = Some(base);
        }
        if let Ok(name) = std::env::var("DIORAMA_DEFAULT_ENVIRONMENT") {
            config.apply.default_environment = Some(name);
        }
        Ok(())
    }

    fn resolve(file: DioramaConfigFile) -> Self {
        let non_blank = |s: Option<String>| s.filter(|v| !v.trim().is_empty());
        Self {
            scene_base_id: file.scene.scene_base_id.unwrap_or_default(),
            app_version: file
                .scene
                .app_version
                .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string()),
            current_key: non_blank(file.scene.current_key)
                .unwrap_or_else(|| DEFAULT_CURRENT_KEY.to_string()),
            default_snapshot: file.scene.default_snapshot,
            schema_policy: file.apply.schema_policy.unwrap_or_default(),
            placement: file.apply.placement.unwrap_or_default(),
            default_environment: non_blank(file.apply.default_environment),
            max_concurrent_downloads: file
                .images
                .max_concurrent_downloads
                .filter(|n| *n > 0)
                .unwrap_or(DEFAULT_MAX_CONCURRENT),
            proxy_base: non_blank(file.images.proxy_base),
            timeout_secs: file.images.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_config(content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("diorama_config_test_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_defaults() {
        let config = DioramaConfig::default();
        assert_eq!(config.current_key, "diorama.current");
        assert_eq!(config.max_concurrent_downloads, 4);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.schema_policy, SchemaPolicy::Upgrade);
        assert!(config.placement.is_disabled());
        assert!(config.proxy_base.is_none());
    }

    #[test]
    fn test_load_config_from_file() {
        let config_str = r#"
[scene]
scene_base_id = "gallery-a"
default_snapshot = "scenarios/default.json"

[apply]
schema_policy = "strict"
default_environment = "sky_day"

[apply.placement]
y_range = [0.0, 4.0]
rotation_step = 15.0

[images]
timeout_secs = 5
"#;
        let path = temp_config(config_str);
        let config = DioramaConfig::load_from_file(&path).unwrap();

        assert_eq!(config.scene_base_id, "gallery-a");
        assert_eq!(
            config.default_snapshot.as_deref(),
            Some(Path::new("scenarios/default.json"))
        );
        assert_eq!(config.schema_policy, SchemaPolicy::Strict);
        assert_eq!(config.default_environment.as_deref(), Some("sky_day"));
        assert_eq!(config.placement.rotation_step, Some(15.0));
        assert_eq!(config.timeout_secs, 5);

        let options = config.apply_options();
        assert_eq!(options.scene_base_id, "gallery-a");
        assert_eq!(options.schema_policy, SchemaPolicy::Strict);

        std::fs::remove_file(&path).ok();
        std::fs::remove_dir(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_env_var_override() {
        let path = temp_config("[images]\nproxy_base = \"https://file-proxy/?u=\"\n");

        std::env::set_var("DIORAMA_PROXY_BASE", "https://env-proxy/?u=");
        let config = DioramaConfig::load_from_file(&path);
        std::env::remove_var("DIORAMA_PROXY_BASE");

        assert_eq!(
            config.unwrap().proxy_base.as_deref(),
            Some("https://env-proxy/?u=")
        );

        std::fs::remove_file(&path).ok();
        std::fs::remove_dir(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_project_layer_wins_over_global() {
        let mut base: DioramaConfigFile = toml::from_str(
            "[scene]\nscene_base_id = \"global\"\napp_version = \"1.0\"\n[images]\nmax_concurrent_downloads = 8\n",
        )
        .unwrap();
        let overlay: DioramaConfigFile =
            toml::from_str("[scene]\nscene_base_id = \"project\"\n").unwrap();
        DioramaConfig::merge_into(&mut base, overlay);

        let config = DioramaConfig::resolve(base);
        assert_eq!(config.scene_base_id, "project");
        assert_eq!(config.app_version, "1.0");
        assert_eq!(config.max_concurrent_downloads, 8);
    }

    #[test]
    fn test_zero_downloads_falls_back_to_default() {
        let file: DioramaConfigFile =
            toml::from_str("[images]\nmax_concurrent_downloads = 0\n").unwrap();
        assert_eq!(DioramaConfig::resolve(file).max_concurrent_downloads, 4);
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let path = temp_config("[images]\nmax_concurrent_downloads = \"lots\"\n");
        assert!(matches!(
            DioramaConfig::load_from_file(&path),
            Err(DioramaError::ConfigError(_))
        ));
        std::fs::remove_file(&path).ok();
        std::fs::remove_dir(path.parent().unwrap()).ok();
    }
}
