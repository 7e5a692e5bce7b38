// activity.rs — ActivityEntry: the bounded human-readable event log.
//
// The log is newest-first and capped at ACTIVITY_LOG_CAP entries; inserting
// past the cap evicts the oldest. Entries reference tasks/KPIs weakly: the
// referenced entity may have been deleted since, and readers tolerate that.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of activity entries retained in the aggregate.
pub const ACTIVITY_LOG_CAP: usize = 100;

/// What kind of event an activity entry records.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    TaskCreated,
    TaskUpdated,
    /// An assignee submitted the task for approval.
    TaskCompleted,
    TaskStatusChanged,
    TaskDeleted,
    KpiCreated,
    KpiUpdated,
    KpiDeleted,
    DepartmentCreated,
    DepartmentDeleted,
    UserJoined,
    CommentAdded,
}

/// One human-readable event in the activity log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivityEntry {
    pub id: Uuid,
    pub department_code: String,
    /// The acting user.
    pub user_id: Uuid,
    pub kind: ActivityKind,
    pub timestamp: DateTime<Utc>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_task_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_kpi_id: Option<Uuid>,
}

impl ActivityEntry {
    pub fn new(
        department_code: impl Into<String>,
        user_id: Uuid,
        kind: ActivityKind,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            department_code: department_code.into(),
            user_id,
            kind,
            timestamp: Utc::now(),
            description: description.into(),
            related_task_id: None,
            related_kpi_id: None,
        }
    }

    /// Attach the task this entry refers to.
    pub fn with_task(mut self, task_id: Uuid) -> Self {
        self.related_task_id = Some(task_id);
        self
    }

    /// Attach the KPI this entry refers to.
    pub fn with_kpi(mut self, kpi_id: Uuid) -> Self {
        self.related_kpi_id = Some(kpi_id);
        self
    }
}
