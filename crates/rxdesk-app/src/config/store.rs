//! Key-value settings store backing the session
//!
//! The session only ever reads and writes a handful of string keys, so the
//! store is a flat string table. [`TomlSettingsStore`] persists it to
//! `.rxdesk/session.toml`; [`MemorySettingsStore`] keeps it in memory.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use rxdesk_core::prelude::*;

use super::settings::rxdesk_dir;

const SESSION_FILENAME: &str = "session.toml";

/// Key-value reader/writer for persisted settings
#[cfg_attr(test, mockall::automock)]
pub trait SettingsStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn put(&mut self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`; removing an absent key is not an error
    fn remove(&mut self, key: &str) -> Result<()>;
}

// ─────────────────────────────────────────────────────────────────────────────
// In-memory Store
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct MemorySettingsStore {
    values: BTreeMap<String, String>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a store, e.g. to simulate a persisted login
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn put(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.values.remove(key);
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// TOML File Store
// ─────────────────────────────────────────────────────────────────────────────

/// Settings persisted to `.rxdesk/session.toml`
///
/// Values are loaded once on open; every mutation rewrites the whole file
/// under an exclusive lock.
#[derive(Debug)]
pub struct TomlSettingsStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl TomlSettingsStore {
    /// Open the store under `project_path`, starting empty when the file is
    /// missing or unreadable.
    pub fn open(project_path: &Path) -> Self {
        let path = rxdesk_dir(project_path).join(SESSION_FILENAME);
        let values = Self::read(&path);
        Self { path, values }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(path: &Path) -> BTreeMap<String, String> {
        if !path.exists() {
            return BTreeMap::new();
        }
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).unwrap_or_else(|e| {
                warn!("Failed to parse {:?}, starting with an empty store: {}", path, e);
                BTreeMap::new()
            }),
            Err(e) => {
                warn!("Failed to read {:?}: {}", path, e);
                BTreeMap::new()
            }
        }
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create .rxdesk directory")?;
        }

        let content = toml::to_string(&self.values)
            .map_err(|e| Error::store(format!("Failed to serialize session: {}", e)))?;

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;

        // Lock is released when the file is dropped
        file.lock_exclusive().context("Failed to lock session.toml")?;

        file.write_all(content.as_bytes()).context("Failed to write session.toml")?;
        file.flush().context("Failed to flush session.toml")?;

        debug!("Saved session store to {:?}", self.path);
        Ok(())
    }
}

impl SettingsStore for TomlSettingsStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn put(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        self.persist()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.values.remove(key).is_some() {
            self.persist()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemorySettingsStore::new().with("user_id", "4");
        assert_eq!(store.get("user_id").as_deref(), Some("4"));

        store.put("access_token", "abc").unwrap();
        store.remove("user_id").unwrap();
        store.remove("never_set").unwrap();

        assert_eq!(store.get("access_token").as_deref(), Some("abc"));
        assert_eq!(store.get("user_id"), None);
    }

    #[test]
    fn test_toml_store_persists_across_open() {
        let temp = tempdir().unwrap();

        let mut store = TomlSettingsStore::open(temp.path());
        store.put("access_token", "tok-123").unwrap();
        store.put("user_id", "9").unwrap();
        assert!(store.path().exists());

        let reopened = TomlSettingsStore::open(temp.path());
        assert_eq!(reopened.get("access_token").as_deref(), Some("tok-123"));
        assert_eq!(reopened.get("user_id").as_deref(), Some("9"));
    }

    #[test]
    fn test_toml_store_remove_persists() {
        let temp = tempdir().unwrap();

        let mut store = TomlSettingsStore::open(temp.path());
        store.put("access_token", "tok").unwrap();
        store.remove("access_token").unwrap();

        let reopened = TomlSettingsStore::open(temp.path());
        assert_eq!(reopened.get("access_token"), None);
    }

    #[test]
    fn test_corrupt_session_file_starts_empty() {
        let temp = tempdir().unwrap();
        let dir = temp.path().join(".rxdesk");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("session.toml"), "not = [valid").unwrap();

        let store = TomlSettingsStore::open(temp.path());
        assert_eq!(store.get("access_token"), None);
    }

    #[test]
    fn test_missing_file_not_created_by_open() {
        let temp = tempdir().unwrap();
        let store = TomlSettingsStore::open(temp.path());
        assert!(!store.path().exists());
    }
}
