//! Fragment storage backends.
//!
//! `DirectoryStore` persists one file per key; `MemoryStore` keeps everything
//! in process and counts its traffic.

use std::{
    collections::BTreeMap,
    fs,
    io::{self, ErrorKind, Write},
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

use crate::application::render::RenderedFragment;

use super::keys::CacheKey;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to prepare cache directory {path}: {source}")]
    Init {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cache i/o failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cached fragment at {path} is not valid: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode fragment for key {key}: {source}")]
    Encode {
        key: CacheKey,
        #[source]
        source: serde_json::Error,
    },
    #[error("no fragment stored under key {key}")]
    Missing { key: CacheKey },
}

/// Persistent mapping from fingerprint to rendered fragment.
///
/// Callers never reuse a key for different content, so `put` on an existing
/// key may leave the stored value in place.
pub trait FragmentStore {
    fn contains(&self, key: &CacheKey) -> Result<bool, StoreError>;

    /// Fails with [`StoreError::Missing`] when nothing is stored under `key`.
    fn get(&self, key: &CacheKey) -> Result<RenderedFragment, StoreError>;

    fn put(&mut self, key: &CacheKey, fragment: &RenderedFragment) -> Result<(), StoreError>;
}

/// Directory of JSON-encoded fragments, one file named by each key.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    /// Open the store, creating `root` if it does not exist yet.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| StoreError::Init {
            path: root.clone(),
            source,
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.root.join(key.as_str())
    }
}

impl FragmentStore for DirectoryStore {
    fn contains(&self, key: &CacheKey) -> Result<bool, StoreError> {
        let path = self.path_for(key);
        path.try_exists()
            .map_err(|source| StoreError::Io { path, source })
    }

    fn get(&self, key: &CacheKey) -> Result<RenderedFragment, StoreError> {
        let path = self.path_for(key);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(StoreError::Missing { key: key.clone() });
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        serde_json::from_str(&raw).map_err(|source| StoreError::Decode { path, source })
    }

    fn put(&mut self, key: &CacheKey, fragment: &RenderedFragment) -> Result<(), StoreError> {
        let path = self.path_for(key);
        let encoded = serde_json::to_string(fragment).map_err(|source| StoreError::Encode {
            key: key.clone(),
            source,
        })?;

        let io_error = |source: io::Error| StoreError::Io {
            path: path.clone(),
            source,
        };

        let mut staged = NamedTempFile::new_in(&self.root).map_err(io_error)?;
        staged.write_all(encoded.as_bytes()).map_err(io_error)?;
        staged.flush().map_err(io_error)?;

        match staged.persist_noclobber(&path) {
            Ok(_) => Ok(()),
            Err(err) if err.error.kind() == ErrorKind::AlreadyExists => {
                debug!(
                    target = "errata::cache::store",
                    op = "directory_store::put",
                    result = "exists",
                    key = %key,
                    "Fragment already stored; keeping existing file"
                );
                Ok(())
            }
            Err(err) => Err(io_error(err.error)),
        }
    }
}

/// In-process store that records how often it is read and written.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    fragments: BTreeMap<CacheKey, RenderedFragment>,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `put` calls served so far.
    pub fn write_count(&self) -> usize {
        self.writes
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

impl FragmentStore for MemoryStore {
    fn contains(&self, key: &CacheKey) -> Result<bool, StoreError> {
        Ok(self.fragments.contains_key(key))
    }

    fn get(&self, key: &CacheKey) -> Result<RenderedFragment, StoreError> {
        self.fragments
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::Missing { key: key.clone() })
    }

    fn put(&mut self, key: &CacheKey, fragment: &RenderedFragment) -> Result<(), StoreError> {
        self.writes += 1;
        self.fragments
            .entry(key.clone())
            .or_insert_with(|| fragment.clone());
        Ok(())
    }
}
