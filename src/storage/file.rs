//! JSON-file key-value store
//!
//! Values live in a single flat JSON object. Every write rewrites the file via
//! a temporary sibling and a rename, so a crash leaves either the old or the
//! new contents on disk. An unreadable file is treated as empty storage.

use super::KeyValueStore;
use crate::config::{ensure_app_data_dir, STORE_FILE};
use crate::error::{RecorderError, Result, ResultExt};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Key-value store persisted to a JSON file
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileStore {
    /// Open (or create) a store at the given path
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(RecorderError::from)
                    .with_context(|| format!("creating storage directory {:?}", parent))?;
            }
        }

        let values = if path.exists() {
            Self::read_values(&path)
        } else {
            BTreeMap::new()
        };

        Ok(Self { path, values })
    }

    /// Open the store in the platform data directory
    pub fn open_default() -> Result<Self> {
        let dir = ensure_app_data_dir()?;
        Self::open(dir.join(STORE_FILE))
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_values(path: &Path) -> BTreeMap<String, String> {
        let parsed = std::fs::read_to_string(path)
            .map_err(RecorderError::from)
            .and_then(|content| {
                serde_json::from_str::<BTreeMap<String, String>>(&content).map_err(Into::into)
            });

        match parsed {
            Ok(values) => values,
            Err(e) => {
                tracing::warn!("Discarding unreadable storage file {:?}: {}", path, e);
                BTreeMap::new()
            }
        }
    }

    fn persist(&self) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.values)?;
        let tmp = self.path.with_extension("json.tmp");

        std::fs::write(&tmp, content)
            .map_err(RecorderError::from)
            .with_context(|| format!("writing {:?}", tmp))?;
        std::fs::rename(&tmp, &self.path)
            .map_err(RecorderError::from)
            .with_context(|| format!("replacing {:?}", self.path))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
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
