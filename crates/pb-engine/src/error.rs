// error.rs — Error types for the workflow engine.

use thiserror::Error;
use uuid::Uuid;

use pb_store::StoreError;

/// Errors that can occur during engine operations.
///
/// Repository operations on unknown ids are deliberately *not* errors
/// (fail-soft no-ops); only lifecycle transitions, creation-time
/// validation, and persistence failures surface here.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Persisting the new aggregate failed. The in-memory aggregate is
    /// left untouched; the caller decides whether to retry or drop.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The requested status change is not a valid edge of the task
    /// lifecycle state machine.
    #[error("invalid transition from {from} to {to} for task {task_id}")]
    InvalidTransition {
        task_id: Uuid,
        from: String,
        to: String,
    },

    /// A lifecycle operation referenced a task that does not exist.
    #[error("task not found: {0}")]
    TaskNotFound(Uuid),

    /// A KPI or task was created against a department code that does not
    /// exist in the aggregate.
    #[error("unknown department code: {0}")]
    UnknownDepartment(String),

    /// A department with this code already exists.
    #[error("department code already in use: {0}")]
    DuplicateDepartmentCode(String),

    /// A user with this username (case-insensitive) already exists.
    #[error("username already in use: {0}")]
    DuplicateUsername(String),
}
