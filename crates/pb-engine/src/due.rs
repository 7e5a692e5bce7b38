// due.rs — Due-date sweep: task_due_soon / task_overdue fan-out.
//
// The caller (the UI's periodic tick) supplies `now`, which keeps the
// sweep deterministic in tests. To avoid re-notifying on every tick, a
// recipient who already holds an *unread* notification of the same kind
// for the same task is skipped; once they read it, the next sweep may
// notify again.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use pb_model::{NotificationKind, TaskStatus};

use crate::dispatch::notify;
use crate::error::EngineError;
use crate::service::Portal;

/// How far ahead a due date counts as "due soon".
const DUE_SOON_WINDOW_HOURS: i64 = 24;

impl Portal {
    /// Scan open tasks with due dates and fan out due-soon/overdue
    /// notifications to their assignees.
    pub fn scan_due_tasks(&mut self, now: DateTime<Utc>) -> Result<(), EngineError> {
        let window = Duration::hours(DUE_SOON_WINDOW_HOURS);
        let mut pending: Vec<(Uuid, String, Vec<Uuid>, NotificationKind)> = Vec::new();

        for task in &self.state().tasks {
            if task.status == TaskStatus::Completed {
                continue;
            }
            let Some(due) = task.due_date else {
                continue;
            };
            let kind = if due < now {
                NotificationKind::TaskOverdue
            } else if due - now <= window {
                NotificationKind::TaskDueSoon
            } else {
                continue;
            };
            pending.push((task.id, task.title.clone(), task.assignee_user_ids.clone(), kind));
        }

        let mut next = self.state().clone();
        for (task_id, title, assignees, kind) in pending {
            let (notif_title, message) = match kind {
                NotificationKind::TaskOverdue => {
                    ("Task overdue", format!("\"{title}\" is past its due date"))
                }
                _ => ("Task due soon", format!("\"{title}\" is due within 24 hours")),
            };
            for assignee in assignees {
                let already_notified = next.notifications.iter().any(|n| {
                    !n.is_read
                        && n.user_id == assignee
                        && n.kind == kind
                        && n.related_task_id == Some(task_id)
                });
                if already_notified {
                    continue;
                }
                notify(&mut next, assignee, kind, notif_title, &message, Some(task_id));
            }
        }

        self.commit(next)
    }
}
