// store.rs — StateStore trait and JsonStateStore implementation.
//
// The StateStore trait is the abstraction API for persisting the aggregate.
// The production implementation (JsonStateStore) keeps the whole portal in
// one pretty-printed JSON document and replaces it atomically on every
// save. The trait can be swapped for SQLite or a remote backend later
// without changing the engine.
//
// Two asymmetric failure policies, deliberately:
// - load() is fail-soft: missing or unparseable content falls back to the
//   seed aggregate (and persists it), older schema shapes are defaulted
//   forward and re-persisted. A user never loses access to the portal
//   because the document went bad.
// - save() is fail-loud: I/O errors and version conflicts propagate to the
//   caller, which decides whether to retry, alert, or drop the change.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use pb_model::AppState;

use crate::error::StoreError;
use crate::migrate;

/// Trait for persisting and retrieving the aggregate.
pub trait StateStore {
    /// Load the persisted aggregate, falling back to the seed on first use
    /// or unreadable content.
    fn load(&mut self) -> Result<AppState, StoreError>;

    /// Persist the aggregate with a single whole-document write.
    ///
    /// Rejects with [`StoreError::VersionConflict`] if the store already
    /// holds a version at or past `state.version` (another writer got
    /// there first).
    fn save(&mut self, state: &AppState) -> Result<(), StoreError>;
}

/// JSON document-based StateStore implementation.
///
/// The document lives at a fixed path; `save` writes a sibling temp file
/// and renames it over the old document, so readers never observe a
/// half-written aggregate even if the process dies mid-write.
pub struct JsonStateStore {
    path: PathBuf,
}

impl JsonStateStore {
    /// Create a store backed by the given document path.
    /// Creates the parent directory if it doesn't exist.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        Ok(Self { path })
    }

    /// Create a store at the platform default path
    /// (`<data_dir>/pulseboard/state.json`).
    pub fn at_default_path() -> Result<Self, StoreError> {
        Self::new(crate::paths::default_state_path()?)
    }

    /// Path to the state document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Version of the document currently on disk, if one parses.
    fn persisted_version(&self) -> Option<u64> {
        let raw = fs::read_to_string(&self.path).ok()?;
        let doc: serde_json::Value = serde_json::from_str(&raw).ok()?;
        // Missing version field means a pre-versioning document: version 0.
        Some(doc.get("version").and_then(|v| v.as_u64()).unwrap_or(0))
    }

    /// Write the document without a version check (used by `load` to
    /// persist the seed and re-persist migrated documents).
    fn write_document(&self, state: &AppState) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(state)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|source| StoreError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(())
    }

    fn reset_to_seed(&self) -> Result<AppState, StoreError> {
        let seed = AppState::seed();
        self.write_document(&seed)?;
        Ok(seed)
    }
}

impl StateStore for JsonStateStore {
    fn load(&mut self) -> Result<AppState, StoreError> {
        if !self.path.exists() {
            info!(path = %self.path.display(), "no state document; seeding");
            return self.reset_to_seed();
        }

        let raw = fs::read_to_string(&self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;

        let doc: serde_json::Value = match serde_json::from_str(&raw) {
            Ok(doc) => doc,
            Err(err) => {
                warn!(path = %self.path.display(), %err, "unparseable state document; reseeding");
                return self.reset_to_seed();
            }
        };

        let upgraded = migrate::needs_defaults(&doc);

        let state: AppState = match serde_json::from_value(doc) {
            Ok(state) => state,
            Err(err) => {
                warn!(path = %self.path.display(), %err, "malformed state document; reseeding");
                return self.reset_to_seed();
            }
        };

        if upgraded {
            info!(path = %self.path.display(), "older schema detected; defaults applied and re-persisted");
            self.write_document(&state)?;
        }

        Ok(state)
    }

    fn save(&mut self, state: &AppState) -> Result<(), StoreError> {
        if let Some(theirs) = self.persisted_version() {
            if theirs >= state.version {
                return Err(StoreError::VersionConflict {
                    ours: state.version,
                    theirs,
                });
            }
        }
        debug!(version = state.version, "persisting aggregate");
        self.write_document(state)
    }
}
