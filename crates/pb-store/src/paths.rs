// paths.rs — Default location of the persisted state document.

use std::path::PathBuf;

use crate::error::StoreError;

/// Platform-appropriate default path for the state document:
/// `<data_dir>/pulseboard/state.json`.
pub fn default_state_path() -> Result<PathBuf, StoreError> {
    dirs::data_dir()
        .map(|dir| dir.join("pulseboard").join("state.json"))
        .ok_or(StoreError::NoDataDir)
}
