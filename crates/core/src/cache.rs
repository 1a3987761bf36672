//! Local key/value cache for authoring state.
//!
//! [`LocalCache`] stores JSON values by string key. Two implementations:
//! [`MemoryCache`] for tests and short-lived sessions, and [`FileCache`],
//! which keeps one `<key>.json` file per key in a directory and writes via
//! a temporary file plus rename.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde_json::Value;

use crate::error::CoreError;

/// Get/set JSON values by key.
pub trait LocalCache: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>, CoreError>;

    fn set(&self, key: &str, value: Value) -> Result<(), CoreError>;

    /// Value stored under `key`, or `default` when absent.
    fn get_or(&self, key: &str, default: Value) -> Result<Value, CoreError> {
        Ok(self.get(key)?.unwrap_or(default))
    }
}

// ---------------------------------------------------------------------------
// MemoryCache
// ---------------------------------------------------------------------------

/// In-process cache backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Value>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalCache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<Value>, CoreError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| CoreError::Validation("cache lock poisoned".into()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<(), CoreError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| CoreError::Validation("cache lock poisoned".into()))?;
        entries.insert(key.to_string(), value);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FileCache
// ---------------------------------------------------------------------------

/// Directory-backed cache: one pretty-printed JSON file per key.
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    /// Use `dir` as the cache root. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, CoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(CoreError::Validation(format!(
                "Invalid cache key '{key}'. Keys may only contain letters, digits, '_' and '-'"
            )));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl LocalCache for FileCache {
    fn get(&self, key: &str) -> Result<Option<Value>, CoreError> {
        let path = self.path_for(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: Value) -> Result<(), CoreError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;

        let tmp = path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(&serde_json::to_vec_pretty(&value)?)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn memory_cache_get_set() {
        let cache = MemoryCache::new();
        assert_eq!(cache.get("project").unwrap(), None);
        cache.set("project", json!({"name": "p"})).unwrap();
        assert_eq!(cache.get("project").unwrap(), Some(json!({"name": "p"})));
        cache.set("project", json!({"name": "q"})).unwrap();
        assert_eq!(cache.get("project").unwrap().unwrap()["name"], "q");
    }

    #[test]
    fn get_or_falls_back_to_default() {
        let cache = MemoryCache::new();
        let value = cache.get_or("project", json!({"totalTasks": 1})).unwrap();
        assert_eq!(value["totalTasks"], 1);
    }

    #[test]
    fn file_cache_persists_across_handles() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path().join("nested"));
        assert_eq!(cache.get("project").unwrap(), None);

        cache.set("project", json!({"template": {"name": "t"}})).unwrap();

        let reopened = FileCache::new(dir.path().join("nested"));
        assert_eq!(
            reopened.get("project").unwrap(),
            Some(json!({"template": {"name": "t"}}))
        );
        assert!(!dir.path().join("nested/project.json.tmp").exists());
    }

    #[test]
    fn file_cache_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path());
        assert_matches!(cache.set("../escape", json!(1)), Err(CoreError::Validation(_)));
        assert_matches!(cache.get(""), Err(CoreError::Validation(_)));
    }

    #[test]
    fn file_cache_reports_corrupt_json() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("project.json"), b"{not json").unwrap();
        let cache = FileCache::new(dir.path());
        assert_matches!(cache.get("project"), Err(CoreError::Serialization(_)));
    }
}
