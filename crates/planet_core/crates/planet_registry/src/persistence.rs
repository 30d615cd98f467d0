//! Registry snapshots and the key/value document stores they live in.

use crate::archive::ArchivedRecord;
use crate::error::StoreError;
use crate::registry::PlanetRegistry;
use dashmap::DashMap;
use planet_objects::{PlanetEntity, PlanetId};
use planet_utils::time::Millis;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

pub const SNAPSHOT_VERSION: u32 = 1;
pub const SNAPSHOT_KEY: &str = "registry/state.bin";

/// Whole-registry state as a single document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    pub version: u32,
    pub counter: u32,
    pub last_maintenance: Option<Millis>,
    pub active: Vec<PlanetEntity>,
    pub archived: Vec<(PlanetId, ArchivedRecord)>,
    pub loaded: Vec<PlanetId>,
    pub retired: Vec<PlanetId>,
}

/// Opaque key/value document storage. Keys are `/`-separated relative paths.
pub trait DocumentStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;
    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError>;
    /// Keys starting with `prefix`, sorted.
    fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError>;
}

fn validate_key(key: &str) -> Result<(), StoreError> {
    let bad = key.is_empty()
        || key.starts_with('/')
        || key.split('/').any(|part| part.is_empty() || part == "." || part == "..");
    if bad {
        Err(StoreError::InvalidKey(key.to_string()))
    } else {
        Ok(())
    }
}

/// Documents as files under a root directory. Writes go to a temp file in the
/// target directory and are renamed into place.
#[derive(Debug, Clone)]
pub struct FsDocumentStore {
    root: PathBuf,
}

impl FsDocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem path of `key` under the root.
    pub fn resolve(&self, key: &str) -> Result<PathBuf, StoreError> {
        validate_key(key)?;
        Ok(key.split('/').fold(self.root.clone(), |path, part| path.join(part)))
    }

    fn collect(&self, dir: &Path, out: &mut Vec<String>) -> Result<(), StoreError> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };
        for entry in entries {
            let path = entry?.path();
            if path.is_dir() {
                self.collect(&path, out)?;
            } else if let Ok(relative) = path.strip_prefix(&self.root) {
                let key: Vec<String> = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect();
                out.push(key.join("/"));
            }
        }
        Ok(())
    }
}

impl DocumentStore for FsDocumentStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        match fs::read(self.resolve(key)?) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let path = self.resolve(key)?;
        let dir = path.parent().unwrap_or(&self.root);
        fs::create_dir_all(dir)?;
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| StoreError::Io(e.error))?;
        Ok(())
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let mut keys = Vec::new();
        self.collect(&self.root, &mut keys)?;
        keys.retain(|k| k.starts_with(prefix));
        keys.sort();
        Ok(keys)
    }
}

#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    docs: DashMap<String, Vec<u8>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        validate_key(key)?;
        Ok(self.docs.get(key).map(|doc| doc.value().clone()))
    }

    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        validate_key(key)?;
        self.docs.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let mut keys: Vec<String> = self
            .docs
            .iter()
            .filter(|kv| kv.key().starts_with(prefix))
            .map(|kv| kv.key().clone())
            .collect();
        keys.sort();
        Ok(keys)
    }
}

/// Saves and restores the registry as one bincode document.
pub struct RegistryPersistence<S: DocumentStore + ?Sized> {
    store: std::sync::Arc<S>,
}

impl<S: DocumentStore + ?Sized> RegistryPersistence<S> {
    pub fn new(store: std::sync::Arc<S>) -> Self {
        Self { store }
    }

    /// Changes made while the write is in flight leave the registry dirty.
    pub fn save(&self, registry: &PlanetRegistry) -> Result<(), StoreError> {
        let snapshot = registry.snapshot_for_save();
        let written = bincode::serialize(&snapshot)
            .map_err(StoreError::from)
            .and_then(|bytes| self.store.put(SNAPSHOT_KEY, &bytes).map(|()| bytes));
        let bytes = match written {
            Ok(bytes) => bytes,
            Err(err) => {
                registry.mark_dirty();
                return Err(err);
            }
        };
        info!(
            active = snapshot.active.len(),
            archived = snapshot.archived.len(),
            bytes = bytes.len(),
            "registry saved"
        );
        Ok(())
    }

    /// Returns `false` when no snapshot exists yet.
    pub fn load(&self, registry: &PlanetRegistry) -> Result<bool, StoreError> {
        let Some(bytes) = self.store.get(SNAPSHOT_KEY)? else {
            debug!("no registry snapshot found");
            return Ok(false);
        };
        let snapshot: RegistrySnapshot = bincode::deserialize(&bytes)?;
        registry.restore(snapshot)?;
        Ok(true)
    }
}
