// lifecycle.rs — The task lifecycle engine: the single transition gate.
//
// Every status change in the portal, including general task edits, funnels
// through `transition_task`. The gate validates the edge against
// TaskStatus::can_transition_to and applies the side effects that belong
// to that edge, into the same aggregate the mutation is building:
//
//   pending_approval → completed    KPI auto-increment (+1) when a related
//                                   KPI resolves, "approved" activity,
//                                   task_approved fan-out
//   pending_approval → in_progress  "rejected" activity, task_rejected
//                                   fan-out
//   *                → pending_approval  task_completed activity (submission
//                                   for approval); no notification here
//   any other valid edge            task_status_changed activity
//
// Because completed is only reachable from pending_approval and there is
// no completed → completed edge, a related KPI can never be incremented
// twice for one task, and a direct jump to completed that would skip the
// increment is rejected instead of silently desynchronizing KPI progress.

use tracing::info;
use uuid::Uuid;

use pb_model::{
    ActivityEntry, ActivityKind, AppState, NotificationKind, Task, TaskAttachment, TaskComment,
    TaskStatus,
};

use crate::dispatch::{fan_out, record_activity};
use crate::error::EngineError;
use crate::service::Portal;

impl Portal {
    /// Create a task. It always starts in Backlog regardless of the status
    /// on the passed value, and its department code must exist.
    ///
    /// Side effects: one task_assigned notification per assignee (the
    /// actor included, if self-assigned) and a task_created activity.
    pub fn create_task(&mut self, mut task: Task, actor: Uuid) -> Result<(), EngineError> {
        if self.state().department_by_code(&task.department_code).is_none() {
            return Err(EngineError::UnknownDepartment(task.department_code));
        }
        task.status = TaskStatus::Backlog;

        let mut next = self.state().clone();
        record_activity(
            &mut next,
            ActivityEntry::new(
                task.department_code.clone(),
                actor,
                ActivityKind::TaskCreated,
                format!("created task \"{}\"", task.title),
            )
            .with_task(task.id),
        );
        fan_out(
            &mut next,
            &task.assignee_user_ids,
            NotificationKind::TaskAssigned,
            "New task assigned",
            &format!("You were assigned \"{}\"", task.title),
            Some(task.id),
        );
        info!(task_id = %task.id, title = %task.title, "task created");
        next.tasks.insert(0, task);
        self.commit(next)
    }

    /// Begin work: Backlog → InProgress.
    pub fn start_task(&mut self, task_id: Uuid, actor: Uuid) -> Result<(), EngineError> {
        self.guarded_transition(task_id, TaskStatus::Backlog, TaskStatus::InProgress, actor)
    }

    /// An assignee marks the task complete: it moves to PendingApproval
    /// and waits for a manager. An optional comment and any attached files
    /// are appended to the task's append-only sequences.
    ///
    /// No notification is sent at this step; the fan-out happens at
    /// approve/reject time.
    pub fn submit_for_approval(
        &mut self,
        task_id: Uuid,
        actor: Uuid,
        comment: Option<String>,
        attachments: Vec<TaskAttachment>,
    ) -> Result<(), EngineError> {
        let mut next = self.state().clone();
        {
            let Some(task) = next.tasks.iter_mut().find(|t| t.id == task_id) else {
                return Err(EngineError::TaskNotFound(task_id));
            };
            if let Some(text) = comment {
                task.comments.push(TaskComment::new(actor, text));
            }
            task.attachments.extend(attachments);
        }
        transition_task(&mut next, task_id, TaskStatus::PendingApproval, actor)?;
        self.commit(next)
    }

    /// Manager approval: PendingApproval → Completed, with the KPI
    /// auto-increment, "approved" activity and task_approved fan-out.
    ///
    /// Calling approve on an already-completed task is an invalid
    /// transition, which is exactly what keeps the KPI from incrementing
    /// twice.
    pub fn approve(&mut self, task_id: Uuid, actor: Uuid) -> Result<(), EngineError> {
        let mut next = self.state().clone();
        transition_task(&mut next, task_id, TaskStatus::Completed, actor)?;
        self.commit(next)
    }

    /// Manager rejection: PendingApproval → InProgress. The task goes back
    /// to its assignees with a task_rejected fan-out; no KPI change.
    pub fn reject(&mut self, task_id: Uuid, actor: Uuid) -> Result<(), EngineError> {
        // InProgress is also the target of the reopen edge out of
        // Completed; rejection specifically means "was awaiting approval".
        self.guarded_transition(
            task_id,
            TaskStatus::PendingApproval,
            TaskStatus::InProgress,
            actor,
        )
    }

    /// General task edit. Non-status fields replace the stored task; a
    /// changed status is routed through the same transition gate as the
    /// dedicated operations, so an edit carrying pending_approval →
    /// completed performs the full approval side effects and an invalid
    /// edge (say backlog → completed) is rejected outright.
    ///
    /// The edit itself fans out a generic task_updated notification to
    /// assignees and records a task_updated activity.
    pub fn edit_task(&mut self, mut updated: Task, actor: Uuid) -> Result<(), EngineError> {
        let task_id = updated.id;
        let Some(existing) = self.state().task(task_id) else {
            return Err(EngineError::TaskNotFound(task_id));
        };
        let current_status = existing.status;
        let created_at = existing.created_at;
        let target = updated.status;

        let mut next = self.state().clone();

        // The status field on the edit is applied through the gate below,
        // never by direct replacement.
        updated.status = current_status;
        updated.created_at = created_at;
        updated.touch();

        record_activity(
            &mut next,
            ActivityEntry::new(
                updated.department_code.clone(),
                actor,
                ActivityKind::TaskUpdated,
                format!("updated task \"{}\"", updated.title),
            )
            .with_task(task_id),
        );
        fan_out(
            &mut next,
            &updated.assignee_user_ids,
            NotificationKind::TaskUpdated,
            "Task updated",
            &format!("\"{}\" was updated", updated.title),
            Some(task_id),
        );

        if let Some(slot) = next.tasks.iter_mut().find(|t| t.id == task_id) {
            *slot = updated;
        }

        if target != current_status {
            transition_task(&mut next, task_id, target, actor)?;
        }

        self.commit(next)
    }

    /// Validate that the task currently sits in `expected_from`, then run
    /// the gate. Used by operations whose meaning is tied to the source
    /// state (start, reject), where another valid edge into the same
    /// target would change the semantics.
    fn guarded_transition(
        &mut self,
        task_id: Uuid,
        expected_from: TaskStatus,
        target: TaskStatus,
        actor: Uuid,
    ) -> Result<(), EngineError> {
        let Some(task) = self.state().task(task_id) else {
            return Err(EngineError::TaskNotFound(task_id));
        };
        if task.status != expected_from {
            return Err(EngineError::InvalidTransition {
                task_id,
                from: task.status.to_string(),
                to: target.to_string(),
            });
        }
        let mut next = self.state().clone();
        transition_task(&mut next, task_id, target, actor)?;
        self.commit(next)
    }
}

/// The single transition gate: validate the edge, move the task, apply the
/// side effects that belong to that edge.
pub(crate) fn transition_task(
    next: &mut AppState,
    task_id: Uuid,
    target: TaskStatus,
    actor: Uuid,
) -> Result<(), EngineError> {
    let Some(task) = next.tasks.iter_mut().find(|t| t.id == task_id) else {
        return Err(EngineError::TaskNotFound(task_id));
    };
    let from = task.status;
    if !from.can_transition_to(&target) {
        return Err(EngineError::InvalidTransition {
            task_id,
            from: from.to_string(),
            to: target.to_string(),
        });
    }
    task.status = target;
    task.touch();

    let title = task.title.clone();
    let code = task.department_code.clone();
    let assignees = task.assignee_user_ids.clone();
    let related_kpi = task.related_kpi_id;

    info!(%task_id, %from, to = %target, "task transition");

    match (from, target) {
        (TaskStatus::PendingApproval, TaskStatus::Completed) => {
            // (a) KPI auto-increment, when the weak reference resolves.
            if let Some(kpi_id) = related_kpi {
                if let Some(kpi) = next.kpis.iter_mut().find(|k| k.id == kpi_id) {
                    kpi.current_value += 1.0;
                    kpi.last_updated = chrono::Utc::now();
                    let kpi_name = kpi.name.clone();
                    record_activity(
                        next,
                        ActivityEntry::new(
                            code.clone(),
                            actor,
                            ActivityKind::KpiUpdated,
                            format!("\"{kpi_name}\" +1 from approval of \"{title}\""),
                        )
                        .with_kpi(kpi_id)
                        .with_task(task_id),
                    );
                }
            }
            // (b) the approval itself.
            record_activity(
                next,
                ActivityEntry::new(
                    code,
                    actor,
                    ActivityKind::TaskStatusChanged,
                    format!("approved \"{title}\""),
                )
                .with_task(task_id),
            );
            // (c) tell the assignees.
            fan_out(
                next,
                &assignees,
                NotificationKind::TaskApproved,
                "Task approved",
                &format!("\"{title}\" was approved"),
                Some(task_id),
            );
        }
        (TaskStatus::PendingApproval, TaskStatus::InProgress) => {
            record_activity(
                next,
                ActivityEntry::new(
                    code,
                    actor,
                    ActivityKind::TaskStatusChanged,
                    format!("rejected \"{title}\", back to in progress"),
                )
                .with_task(task_id),
            );
            fan_out(
                next,
                &assignees,
                NotificationKind::TaskRejected,
                "Task rejected",
                &format!("\"{title}\" was sent back for more work"),
                Some(task_id),
            );
        }
        (_, TaskStatus::PendingApproval) => {
            record_activity(
                next,
                ActivityEntry::new(
                    code,
                    actor,
                    ActivityKind::TaskCompleted,
                    format!("submitted \"{title}\" for approval"),
                )
                .with_task(task_id),
            );
        }
        (from, to) => {
            record_activity(
                next,
                ActivityEntry::new(
                    code,
                    actor,
                    ActivityKind::TaskStatusChanged,
                    format!("moved \"{title}\" from {from} to {to}"),
                )
                .with_task(task_id),
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pb_model::{AppState, Department, Kpi, Role, TaskPriority, User};
    use pb_store::MemoryStateStore;

    struct Fixture {
        portal: Portal,
        task_id: Uuid,
        kpi_id: Uuid,
        member_id: Uuid,
        manager_id: Uuid,
    }

    /// One department, a manager, a member, a KPI at 32/50 and a task in
    /// PendingApproval assigned to the member and related to the KPI.
    fn fixture() -> Fixture {
        let mut state = AppState::default();

        let mut manager = User::new("dkim", "Dana Kim", Role::Manager);
        manager.department_code = Some("BD".to_string());
        let mut member = User::new("msolis", "Marta Solis", Role::Member);
        member.department_code = Some("BD".to_string());

        let mut dept = Department::new("BD", "Business Development");
        dept.manager_user_id = Some(manager.id);

        let mut kpi = Kpi::new("BD", "Deals closed", "deals", 50.0);
        kpi.current_value = 32.0;

        let mut task = Task::new("BD", "Close the Acme deal", TaskPriority::High);
        task.assignee_user_ids = vec![member.id];
        task.related_kpi_id = Some(kpi.id);
        task.status = TaskStatus::PendingApproval;

        let (task_id, kpi_id, member_id, manager_id) = (task.id, kpi.id, member.id, manager.id);

        state.departments.push(dept);
        state.users.push(manager);
        state.users.push(member);
        state.kpis.push(kpi);
        state.tasks.push(task);

        let portal = Portal::open(Box::new(MemoryStateStore::with_state(state))).unwrap();
        Fixture {
            portal,
            task_id,
            kpi_id,
            member_id,
            manager_id,
        }
    }

    #[test]
    fn approve_completes_task_and_increments_kpi() {
        let mut f = fixture();
        f.portal.approve(f.task_id, f.manager_id).unwrap();

        let state = f.portal.state();
        assert_eq!(state.task(f.task_id).unwrap().status, TaskStatus::Completed);
        assert_eq!(state.kpi(f.kpi_id).unwrap().current_value, 33.0);
    }

    #[test]
    fn approve_twice_errors_and_kpi_increments_once() {
        let mut f = fixture();
        f.portal.approve(f.task_id, f.manager_id).unwrap();

        let second = f.portal.approve(f.task_id, f.manager_id);
        assert!(matches!(
            second,
            Err(EngineError::InvalidTransition { .. })
        ));
        assert_eq!(f.portal.state().kpi(f.kpi_id).unwrap().current_value, 33.0);
    }

    #[test]
    fn approve_without_related_kpi_touches_no_kpi() {
        let mut f = fixture();
        let mut task = f.portal.state().task(f.task_id).unwrap().clone();
        task.related_kpi_id = None;
        f.portal.upsert_task(task).unwrap();

        f.portal.approve(f.task_id, f.manager_id).unwrap();
        assert_eq!(f.portal.state().kpi(f.kpi_id).unwrap().current_value, 32.0);
    }

    #[test]
    fn approve_with_dangling_kpi_reference_is_tolerated() {
        let mut f = fixture();
        f.portal.delete_kpi(f.kpi_id).unwrap();

        // The weak reference misses; approval still completes the task.
        f.portal.approve(f.task_id, f.manager_id).unwrap();
        assert_eq!(
            f.portal.state().task(f.task_id).unwrap().status,
            TaskStatus::Completed
        );
    }

    #[test]
    fn reject_returns_task_to_in_progress_without_kpi_change() {
        let mut f = fixture();
        f.portal.reject(f.task_id, f.manager_id).unwrap();

        let state = f.portal.state();
        assert_eq!(state.task(f.task_id).unwrap().status, TaskStatus::InProgress);
        assert_eq!(state.kpi(f.kpi_id).unwrap().current_value, 32.0);
        assert_eq!(
            state.notifications[0].kind,
            NotificationKind::TaskRejected
        );
    }

    #[test]
    fn reject_on_completed_task_is_invalid() {
        let mut f = fixture();
        f.portal.approve(f.task_id, f.manager_id).unwrap();

        // Completed → InProgress is a valid reopen edge, but reject means
        // "was awaiting approval" and must refuse.
        assert!(matches!(
            f.portal.reject(f.task_id, f.manager_id),
            Err(EngineError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn start_task_requires_backlog() {
        let mut f = fixture();
        // Task is in PendingApproval; "start" must not act as a rejection.
        assert!(matches!(
            f.portal.start_task(f.task_id, f.member_id),
            Err(EngineError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn create_task_forces_backlog_and_notifies_assignees() {
        let mut f = fixture();
        let mut task = Task::new("BD", "Prep quarterly review", TaskPriority::Medium);
        task.status = TaskStatus::Completed; // ignored: creation starts in Backlog
        task.assignee_user_ids = vec![f.member_id];
        let new_id = task.id;

        f.portal.create_task(task, f.manager_id).unwrap();

        let state = f.portal.state();
        assert_eq!(state.task(new_id).unwrap().status, TaskStatus::Backlog);
        assert_eq!(state.tasks[0].id, new_id, "new tasks insert at the front");
        let n = &state.notifications[0];
        assert_eq!(n.kind, NotificationKind::TaskAssigned);
        assert_eq!(n.user_id, f.member_id);
        assert_eq!(state.activities[0].kind, ActivityKind::TaskCreated);
    }

    #[test]
    fn create_task_rejects_unknown_department() {
        let mut f = fixture();
        let task = Task::new("NOPE", "Orphan task", TaskPriority::Low);
        assert!(matches!(
            f.portal.create_task(task, f.manager_id),
            Err(EngineError::UnknownDepartment(code)) if code == "NOPE"
        ));
    }

    #[test]
    fn submit_appends_comment_and_attachments_without_notifying() {
        let mut f = fixture();
        let mut task = Task::new("BD", "Write the recap", TaskPriority::Low);
        task.assignee_user_ids = vec![f.member_id];
        let id = task.id;
        f.portal.create_task(task, f.member_id).unwrap();
        let notifications_before = f.portal.state().notifications.len();

        f.portal
            .submit_for_approval(
                id,
                f.member_id,
                Some("recap attached".to_string()),
                vec![TaskAttachment::new("recap.pdf", f.member_id)],
            )
            .unwrap();

        let state = f.portal.state();
        let task = state.task(id).unwrap();
        assert_eq!(task.status, TaskStatus::PendingApproval);
        assert_eq!(task.comments.len(), 1);
        assert_eq!(task.attachments.len(), 1);
        assert_eq!(state.activities[0].kind, ActivityKind::TaskCompleted);
        // Submission itself sends nothing; fan-out happens at approve/reject.
        assert_eq!(state.notifications.len(), notifications_before);
    }

    #[test]
    fn edit_task_rejects_status_jump_that_skips_approval() {
        let mut f = fixture();
        let mut task = Task::new("BD", "Sneaky complete", TaskPriority::Low);
        task.assignee_user_ids = vec![f.member_id];
        let id = task.id;
        f.portal.create_task(task, f.manager_id).unwrap();

        let mut edit = f.portal.state().task(id).unwrap().clone();
        edit.status = TaskStatus::Completed;
        assert!(matches!(
            f.portal.edit_task(edit, f.manager_id),
            Err(EngineError::InvalidTransition { .. })
        ));
        // Nothing was committed.
        assert_eq!(f.portal.state().task(id).unwrap().status, TaskStatus::Backlog);
    }

    #[test]
    fn edit_task_with_approval_edge_runs_approval_side_effects() {
        let mut f = fixture();
        let mut edit = f.portal.state().task(f.task_id).unwrap().clone();
        edit.status = TaskStatus::Completed;

        f.portal.edit_task(edit, f.manager_id).unwrap();

        let state = f.portal.state();
        assert_eq!(state.task(f.task_id).unwrap().status, TaskStatus::Completed);
        // Routed through the gate: the KPI increment happened.
        assert_eq!(state.kpi(f.kpi_id).unwrap().current_value, 33.0);
        assert!(state
            .notifications
            .iter()
            .any(|n| n.kind == NotificationKind::TaskApproved));
    }

    #[test]
    fn edit_task_sends_generic_update_notification() {
        let mut f = fixture();
        let mut edit = f.portal.state().task(f.task_id).unwrap().clone();
        edit.title = "Close the Acme deal (renamed)".to_string();

        f.portal.edit_task(edit, f.manager_id).unwrap();

        let state = f.portal.state();
        assert_eq!(state.notifications[0].kind, NotificationKind::TaskUpdated);
        assert_eq!(state.notifications[0].user_id, f.member_id);
        assert_eq!(state.activities[0].kind, ActivityKind::TaskUpdated);
        // Non-status edit: status untouched, no KPI movement.
        assert_eq!(
            state.task(f.task_id).unwrap().status,
            TaskStatus::PendingApproval
        );
        assert_eq!(state.kpi(f.kpi_id).unwrap().current_value, 32.0);
    }

    #[test]
    fn lifecycle_ops_on_unknown_task_error() {
        let mut f = fixture();
        let ghost = Uuid::new_v4();
        assert!(matches!(
            f.portal.approve(ghost, f.manager_id),
            Err(EngineError::TaskNotFound(_))
        ));
        assert!(matches!(
            f.portal.submit_for_approval(ghost, f.member_id, None, Vec::new()),
            Err(EngineError::TaskNotFound(_))
        ));
    }
}
