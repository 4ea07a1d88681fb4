//! JSON file settings store.

use async_trait::async_trait;
use keymagic_core::ports::SettingsStore;
use keymagic_core::{Error, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Settings store persisting every value in one JSON object.
///
/// Each write replaces the file atomically (temp file + rename), so a crash
/// leaves either the old or the new contents on disk.
pub struct FileStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`, loading existing values if the file exists.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let values = match tokio::fs::read_to_string(&path).await {
            Ok(content) if content.trim().is_empty() => BTreeMap::new(),
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                Error::Store(format!("Corrupt settings file {}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "Settings file does not exist yet");
                BTreeMap::new()
            }
            Err(e) => return Err(e.into()),
        };

        info!(path = %path.display(), entries = values.len(), "Opened settings store");
        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, values: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_vec_pretty(values)?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        debug!(path = %self.path.display(), entries = values.len(), "Settings written");
        Ok(())
    }
}

#[async_trait]
impl SettingsStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.lock().await;
        let previous = values.insert(key.to_string(), value.to_string());

        if let Err(e) = self.persist(&values).await {
            // Keep memory consistent with disk.
            match previous {
                Some(old) => values.insert(key.to_string(), old),
                None => values.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut values = self.values.lock().await;
        if values.remove(key).is_some() {
            self.persist(&values).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let store = FileStore::open(&path).await.unwrap();
        store.set("awesome__license_key", "ABC123").await.unwrap();
        drop(store);

        let reopened = FileStore::open(&path).await.unwrap();
        assert_eq!(
            reopened.get("awesome__license_key").await.unwrap().as_deref(),
            Some("ABC123")
        );
    }

    #[tokio::test]
    async fn test_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/settings.json");

        let store = FileStore::open(&path).await.unwrap();
        store.set("k", "v").await.unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = FileStore::open(&path).await.err().unwrap();
        assert!(matches!(err, Error::Store(_)));
    }

    #[tokio::test]
    async fn test_delete_missing_key_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("s.json")).await.unwrap();

        store.delete("nothing").await.unwrap();
        assert!(!store.path().exists());
    }
}
