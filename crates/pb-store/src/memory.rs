// memory.rs — MemoryStateStore: in-memory StateStore for tests.
//
// Behaves like the JSON store, including the optimistic version check, but
// keeps the aggregate in a field. The engine is tested against this fake
// so tests need no filesystem.

use pb_model::AppState;

use crate::error::StoreError;
use crate::store::StateStore;

/// In-memory StateStore. Empty stores seed on first load, same as disk.
#[derive(Default)]
pub struct MemoryStateStore {
    state: Option<AppState>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a prepared aggregate instead of the seed.
    pub fn with_state(state: AppState) -> Self {
        Self { state: Some(state) }
    }

    /// Peek at the persisted aggregate (test assertions).
    pub fn persisted(&self) -> Option<&AppState> {
        self.state.as_ref()
    }
}

impl StateStore for MemoryStateStore {
    fn load(&mut self) -> Result<AppState, StoreError> {
        match &self.state {
            Some(state) => Ok(state.clone()),
            None => {
                let seed = AppState::seed();
                self.state = Some(seed.clone());
                Ok(seed)
            }
        }
    }

    fn save(&mut self, state: &AppState) -> Result<(), StoreError> {
        if let Some(current) = &self.state {
            if current.version >= state.version {
                return Err(StoreError::VersionConflict {
                    ours: state.version,
                    theirs: current.version,
                });
            }
        }
        self.state = Some(state.clone());
        Ok(())
    }
}
