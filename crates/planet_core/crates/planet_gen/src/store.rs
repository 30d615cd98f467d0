//! Artifact stores with staged, all-or-nothing bundle commits.
//!
//! A bundle is first written to a staging area. Nothing becomes visible under
//! its live keys until [`StagedBundle::commit`]; dropping an uncommitted
//! bundle discards it.

use crate::artifacts::{ArtifactBundle, ArtifactDocument};
use dashmap::DashMap;
use planet_registry::{DocumentStore, FsDocumentStore, StoreError};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};

const STAGING_DIR: &str = ".staging";

pub trait StagedBundle: Send {
    /// Publishes every document under its live key, or none of them.
    fn commit(self: Box<Self>) -> Result<Vec<String>, StoreError>;
}

pub trait ArtifactStore: Send + Sync {
    fn stage(&self, bundle: &ArtifactBundle) -> Result<Box<dyn StagedBundle + '_>, StoreError>;
    fn write(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError>;
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;
    fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError>;
}

// ---------- Filesystem ----------

#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    docs: FsDocumentStore,
}

impl FsArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        Ok(Self {
            docs: FsDocumentStore::new(root)?,
        })
    }

    pub fn root(&self) -> &Path {
        self.docs.root()
    }
}

struct FsStaged<'a> {
    store: &'a FsArtifactStore,
    dir: TempDir,
    keys: Vec<String>,
}

fn staged_path(dir: &Path, key: &str) -> PathBuf {
    key.split('/').fold(dir.to_path_buf(), |path, part| path.join(part))
}

impl StagedBundle for FsStaged<'_> {
    fn commit(self: Box<Self>) -> Result<Vec<String>, StoreError> {
        let mut moved: Vec<PathBuf> = Vec::with_capacity(self.keys.len());
        for key in &self.keys {
            let result = self.store.docs.resolve(key).and_then(|live| {
                if let Some(parent) = live.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::rename(staged_path(self.dir.path(), key), &live)?;
                Ok(live)
            });
            match result {
                Ok(live) => moved.push(live),
                Err(err) => {
                    warn!(%key, error = %err, rolled_back = moved.len(), "bundle commit failed");
                    for live in moved {
                        if let Err(rollback) = fs::remove_file(&live) {
                            warn!(path = %live.display(), error = %rollback, "rollback left a committed document behind");
                        }
                    }
                    return Err(err);
                }
            }
        }
        debug!(documents = self.keys.len(), "bundle committed");
        Ok(self.keys)
    }
}

impl ArtifactStore for FsArtifactStore {
    fn stage(&self, bundle: &ArtifactBundle) -> Result<Box<dyn StagedBundle + '_>, StoreError> {
        let staging = self.root().join(STAGING_DIR);
        fs::create_dir_all(&staging)?;
        let dir = tempfile::Builder::new()
            .prefix("bundle-")
            .tempdir_in(&staging)?;

        for ArtifactDocument { key, bytes } in &bundle.documents {
            // Validates the key before anything is written.
            self.docs.resolve(key)?;
            let path = staged_path(dir.path(), key);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, bytes)?;
        }

        Ok(Box::new(FsStaged {
            store: self,
            dir,
            keys: bundle.keys(),
        }))
    }

    fn write(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        self.docs.put(key, bytes)
    }

    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        self.docs.get(key)
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let mut keys = self.docs.list(prefix)?;
        keys.retain(|k| !k.starts_with(STAGING_DIR));
        Ok(keys)
    }
}

// ---------- Memory ----------

#[derive(Debug, Default)]
pub struct MemoryArtifactStore {
    docs: DashMap<String, Vec<u8>>,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

struct MemoryStaged<'a> {
    store: &'a MemoryArtifactStore,
    documents: Vec<ArtifactDocument>,
}

impl StagedBundle for MemoryStaged<'_> {
    fn commit(self: Box<Self>) -> Result<Vec<String>, StoreError> {
        let keys = self.documents.iter().map(|d| d.key.clone()).collect();
        for doc in self.documents {
            self.store.docs.insert(doc.key, doc.bytes);
        }
        Ok(keys)
    }
}

impl ArtifactStore for MemoryArtifactStore {
    fn stage(&self, bundle: &ArtifactBundle) -> Result<Box<dyn StagedBundle + '_>, StoreError> {
        Ok(Box::new(MemoryStaged {
            store: self,
            documents: bundle.documents.clone(),
        }))
    }

    fn write(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        self.docs.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.docs.get(key).map(|doc| doc.value().clone()))
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
