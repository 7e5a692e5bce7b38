// task.rs — Task: the work item lifecycle state machine.
//
// The state machine enforces a valid lifecycle:
//   Backlog → InProgress → PendingApproval → Completed
//   (reject edge: PendingApproval → InProgress)
//
// Every status change in the system, including general task edits, goes
// through `TaskStatus::can_transition_to`. There is no bypass: a task can
// only become Completed from PendingApproval, which is what keeps the
// related-KPI auto-increment from firing twice or being skipped.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Task priority for display ordering.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

/// The lifecycle state of a task.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Created, nobody has started work yet.
    Backlog,

    /// An assignee is actively working on it.
    InProgress,

    /// An assignee marked it done; awaiting manager approval.
    PendingApproval,

    /// Approved by a manager. Terminal in the normal flow, but a manager
    /// can reopen (back to InProgress or Backlog).
    Completed,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Backlog => write!(f, "backlog"),
            TaskStatus::InProgress => write!(f, "in_progress"),
            TaskStatus::PendingApproval => write!(f, "pending_approval"),
            TaskStatus::Completed => write!(f, "completed"),
        }
    }
}

impl TaskStatus {
    /// Check whether transitioning from this status to `next` is valid.
    ///
    /// The valid transitions form a directed graph:
    ///   Backlog → InProgress → PendingApproval → Completed
    /// with a reject edge (PendingApproval → InProgress), a direct submit
    /// edge (Backlog → PendingApproval, an assignee can submit without
    /// ever pressing "start"), reopen edges out of Completed, and a
    /// shelve edge (InProgress → Backlog).
    ///
    /// Completed is reachable from PendingApproval only.
    pub fn can_transition_to(&self, next: &TaskStatus) -> bool {
        matches!(
            (self, next),
            (TaskStatus::Backlog, TaskStatus::InProgress)
                | (TaskStatus::Backlog, TaskStatus::PendingApproval)
                | (TaskStatus::InProgress, TaskStatus::PendingApproval)
                | (TaskStatus::InProgress, TaskStatus::Backlog)
                | (TaskStatus::PendingApproval, TaskStatus::Completed)
                | (TaskStatus::PendingApproval, TaskStatus::InProgress)
                | (TaskStatus::Completed, TaskStatus::InProgress)
                | (TaskStatus::Completed, TaskStatus::Backlog)
        )
    }
}

/// A comment on a task. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskComment {
    pub id: Uuid,
    pub author_user_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl TaskComment {
    pub fn new(author_user_id: Uuid, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            author_user_id,
            text: text.into(),
            created_at: Utc::now(),
        }
    }
}

/// A file attached to a task (metadata only; the bytes live elsewhere).
/// Append-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskAttachment {
    pub id: Uuid,
    pub file_name: String,
    pub uploaded_by: Uuid,
    pub uploaded_at: DateTime<Utc>,
}

impl TaskAttachment {
    pub fn new(file_name: impl Into<String>, uploaded_by: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            file_name: file_name.into(),
            uploaded_by,
            uploaded_at: Utc::now(),
        }
    }
}

/// A work item belonging to a department.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: Uuid,

    /// Weak reference to the owning department's code.
    pub department_code: String,

    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Recipients of assignment/approval notifications. Order irrelevant;
    /// callers keep it duplicate-free (the dispatcher does not dedup).
    #[serde(default)]
    pub assignee_user_ids: Vec<Uuid>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,

    pub priority: TaskPriority,

    pub status: TaskStatus,

    /// Weak reference to the KPI this task advances. When set, approval
    /// increments that KPI's current value by one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_kpi_id: Option<Uuid>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<TaskComment>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<TaskAttachment>,

    /// Free-form member-reported percentage. Independent of KPI progress.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress_percent: Option<f64>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Create a new task in Backlog.
    pub fn new(
        department_code: impl Into<String>,
        title: impl Into<String>,
        priority: TaskPriority,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            department_code: department_code.into(),
            title: title.into(),
            description: None,
            assignee_user_ids: Vec::new(),
            due_date: None,
            priority,
            status: TaskStatus::Backlog,
            related_kpi_id: None,
            comments: Vec::new(),
            attachments: Vec::new(),
            progress_percent: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Mark the task as updated (call after any mutation).
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
