//! Cart persistence adapter.
//!
//! The cart survives process restarts through a small save/load boundary so
//! the cart logic itself stays storage-agnostic. The production adapter
//! writes a JSON snapshot to disk; tests use the in-memory adapter.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

use thiserror::Error;

use crate::cart::CartSnapshot;

/// Errors that can occur while persisting or restoring the cart.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem operation failed.
    #[error("cart store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot (de)serialization failed.
    #[error("cart snapshot serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Storage boundary for the persisted cart snapshot.
pub trait CartStore: Send + Sync {
    /// Persist the snapshot, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the snapshot cannot be written.
    fn save(&self, snapshot: &CartSnapshot) -> Result<(), StoreError>;

    /// Restore the previously persisted snapshot, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if a snapshot exists but cannot be read.
    fn load(&self) -> Result<Option<CartSnapshot>, StoreError>;
}

/// JSON-file cart store.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a store writing to `path`. Parent directories are created on
    /// first save.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CartStore for JsonFileStore {
    fn save(&self, snapshot: &CartSnapshot) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let bytes = serde_json::to_vec_pretty(snapshot)?;
        fs::write(&self.path, bytes)?;
        Ok(())
    }

    fn load(&self) -> Result<Option<CartSnapshot>, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let snapshot = serde_json::from_slice(&bytes)?;
        Ok(Some(snapshot))
    }
}

/// In-memory cart store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Option<CartSnapshot>>,
}

impl CartStore for MemoryStore {
    fn save(&self, snapshot: &CartSnapshot) -> Result<(), StoreError> {
        let mut slot = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        *slot = Some(snapshot.clone());
        Ok(())
    }

    fn load(&self) -> Result<Option<CartSnapshot>, StoreError> {
        let slot = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        Ok(slot.clone())
    }
}
