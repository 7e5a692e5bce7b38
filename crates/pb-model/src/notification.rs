// notification.rs — Notification: typed per-user notification records.
//
// Records are pure data. Delivering a system-level push notification to a
// device is a separate service's job; it only reads title/message shapes.
// A notification is mutated exactly once after creation: flipping is_read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    TaskAssigned,
    TaskDueSoon,
    TaskOverdue,
    TaskApproved,
    TaskRejected,
    /// Generic edit notification for non-lifecycle task changes.
    TaskUpdated,
}

/// A notification addressed to one concrete user.
///
/// `user_id` is always a recipient resolved by the dispatcher at creation
/// time, never "whoever is reading this".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub id: Uuid,
    /// The recipient.
    pub user_id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub is_read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_task_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_kpi_id: Option<Uuid>,
}

impl Notification {
    pub fn new(
        user_id: Uuid,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            kind,
            title: title.into(),
            message: message.into(),
            timestamp: Utc::now(),
            is_read: false,
            related_task_id: None,
            related_kpi_id: None,
        }
    }

    pub fn with_task(mut self, task_id: Uuid) -> Self {
        self.related_task_id = Some(task_id);
        self
    }
}
