//! Snapshot persistence: a key-value blob store and a download sink.
//!
//! Blobs are opaque strings (snapshot JSON). The store keeps the "current"
//! snapshot between sessions; the sink hands a named file to the user.

use diorama_core::{DioramaError, Result};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Key-value storage for serialized snapshots
pub trait BlobStore: Send + Sync {
    /// Set a value by key. Overwrites any existing value.
    fn save(&self, key: &str, value: &str) -> Result<()>;

    /// Get a value by key, `None` when nothing was saved under it
    fn load(&self, key: &str) -> Result<Option<String>>;
}

/// Receives files offered to the user
pub trait ByteSink: Send + Sync {
    /// Offer `content` under `filename`; returns the name actually used
    fn offer(&self, filename: &str, content: &str) -> Result<String>;
}

/// Process-local store, lost on exit
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return all keys, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.data.read().keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl BlobStore for MemoryStore {
    fn save(&self, key: &str, value: &str) -> Result<()> {
        self.data.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.data.read().get(key).cloned())
    }
}

/// One file per key under a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(safe_file_name(key, "blob", ".json"))
    }
}

impl BlobStore for FileStore {
    fn save(&self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.root)?;
        let path = self.path_for(key);
        std::fs::write(&path, value)
            .map_err(|e| DioramaError::StoreError(format!("write {}: {}", path.display(), e)))
    }

    fn load(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DioramaError::StoreError(format!(
                "read {}: {}",
                path.display(),
                e
            ))),
        }
    }
}

/// Writes offered files into a downloads directory
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `~/Downloads`, falling back to the working directory
    pub fn downloads() -> Self {
        Self::new(dirs::download_dir().unwrap_or_else(|| PathBuf::from(".")))
    }
}

impl ByteSink for DirectorySink {
    fn offer(&self, filename: &str, content: &str) -> Result<String> {
        let name = safe_file_name(filename, "Scenario", ".json");
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(&name);
        std::fs::write(&path, content)
            .map_err(|e| DioramaError::StoreError(format!("write {}: {}", path.display(), e)))?;
        tracing::info!("Saved {}", path.display());
        Ok(name)
    }
}

const INVALID_FILE_NAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Make `raw` usable as a file name on any platform.
///
/// Invalid characters become `_`, trailing dots and spaces are trimmed, a
/// blank result becomes `default_base`, and `extension` is appended unless
/// already present (case-insensitive).
pub fn safe_file_name(raw: &str, default_base: &str, extension: &str) -> String {
    let replaced: String = raw
        .chars()
        .map(|c| {
            if c.is_control() || INVALID_FILE_NAME_CHARS.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect();

    let mut name = replaced.trim().trim_end_matches(['.', ' ']).to_string();
    if name.is_empty() {
        name = default_base.to_string();
    }
    if !name.to_lowercase().ends_with(&extension.to_lowercase()) {
        name.push_str(extension);
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(prefix: &str) -> PathBuf {
        std::env::temp_dir().join(format!("{}_{}", prefix, uuid::Uuid::new_v4()))
    }

    #[test]
    fn memory_store_save_and_load() {
        let store = MemoryStore::new();
        assert_eq!(store.load("current").unwrap(), None);

        store.save("current", "{\"a\":1}").unwrap();
        store.save("current", "{\"a\":2}").unwrap();
        store.save("other", "{}").unwrap();
        assert_eq!(store.load("current").unwrap().as_deref(), Some("{\"a\":2}"));
        assert_eq!(store.keys(), vec!["current", "other"]);
    }

    #[test]
    fn file_store_round_trip() {
        let dir = temp_dir("diorama_store_test");
        let store = FileStore::new(&dir);
        assert_eq!(store.load("diorama.current").unwrap(), None);

        store.save("diorama.current", "{\"name\":\"x\"}").unwrap();
        assert!(dir.join("diorama.current.json").exists());
        assert_eq!(
            store.load("diorama.current").unwrap().as_deref(),
            Some("{\"name\":\"x\"}")
        );

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn file_store_sanitizes_keys() {
        let dir = temp_dir("diorama_store_test");
        let store = FileStore::new(&dir);
        store.save("../escape/attempt", "{}").unwrap();
        assert!(dir.join(".._escape_attempt.json").exists());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn directory_sink_writes_sanitized_name() {
        let dir = temp_dir("diorama_sink_test");
        let sink = DirectorySink::new(&dir);
        let name = sink.offer("My: Gallery?", "{}").unwrap();
        assert_eq!(name, "My_ Gallery_.json");
        assert_eq!(std::fs::read_to_string(dir.join(&name)).unwrap(), "{}");
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn safe_file_name_rules() {
        assert_eq!(safe_file_name("", "Scenario", ".json"), "Scenario.json");
        assert_eq!(safe_file_name("   ", "Scenario", ".json"), "Scenario.json");
        assert_eq!(safe_file_name("a/b\\c", "Scenario", ".json"), "a_b_c.json");
        assert_eq!(safe_file_name("room. . ", "Scenario", ".json"), "room.json");
        assert_eq!(safe_file_name("Room.JSON", "Scenario", ".json"), "Room.JSON");
        assert_eq!(safe_file_name("...", "Scenario", ".json"), "Scenario.json");
    }
}
