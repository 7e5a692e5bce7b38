// service.rs — Portal: the service object owning the aggregate.
//
// Portal holds the current AppState plus an injected StateStore. Every
// mutation follows the same shape:
//
//   1. clone the current aggregate
//   2. apply the change and all of its side effects to the clone
//   3. bump the version and save the clone with one whole-document write
//   4. on success, swap the clone in as the current aggregate
//
// A failed save leaves the in-memory aggregate untouched, so no reader
// ever observes a half-applied mutation. Repository operations on unknown
// ids are fail-soft no-ops: the aggregate is returned unchanged and
// nothing is persisted.

use tracing::debug;
use uuid::Uuid;

use pb_model::{
    ActivityEntry, ActivityKind, AppState, Department, Kpi, Notification, Task, User,
};
use pb_store::StateStore;

use crate::cascade;
use crate::dispatch::record_activity;
use crate::error::EngineError;

/// The portal engine: owns the aggregate, exposes every mutation.
pub struct Portal {
    store: Box<dyn StateStore>,
    state: AppState,
}

impl Portal {
    /// Open the portal over a store. Loads the persisted aggregate (or the
    /// seed on first use).
    pub fn open(mut store: Box<dyn StateStore>) -> Result<Self, EngineError> {
        let state = store.load()?;
        Ok(Self { store, state })
    }

    /// The current aggregate snapshot.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Persist `next` as the new aggregate.
    ///
    /// An unchanged aggregate short-circuits without a write, which is
    /// what makes the fail-soft no-ops and the idempotent mark-read
    /// operations free of spurious version bumps.
    pub(crate) fn commit(&mut self, mut next: AppState) -> Result<(), EngineError> {
        next.version = self.state.version;
        if next == self.state {
            debug!("mutation left aggregate unchanged; skipping save");
            return Ok(());
        }
        next.version = self.state.version + 1;
        self.store.save(&next)?;
        self.state = next;
        Ok(())
    }

    // ---- departments ----

    /// Add a department. Codes are unique; a duplicate is an error.
    pub fn add_department(&mut self, department: Department, actor: Uuid) -> Result<(), EngineError> {
        if self.state.department_by_code(&department.code).is_some() {
            return Err(EngineError::DuplicateDepartmentCode(department.code));
        }
        let mut next = self.state.clone();
        record_activity(
            &mut next,
            ActivityEntry::new(
                department.code.clone(),
                actor,
                ActivityKind::DepartmentCreated,
                format!("created department \"{}\"", department.name),
            ),
        );
        next.departments.push(department);
        self.commit(next)
    }

    /// Replace a department by id. Unknown id: no-op.
    pub fn update_department(&mut self, department: Department) -> Result<(), EngineError> {
        let mut next = self.state.clone();
        match next.departments.iter_mut().find(|d| d.id == department.id) {
            Some(slot) => *slot = department,
            None => {
                debug!(id = %department.id, "update_department: unknown id");
                return Ok(());
            }
        }
        self.commit(next)
    }

    /// Delete a department and cascade: its KPIs and tasks are removed,
    /// its users unassigned, the preview cursor repointed. Unknown id:
    /// no-op. Activity/notification entries referencing the removed
    /// entities stay behind as weak references.
    pub fn delete_department(&mut self, department_id: Uuid, actor: Uuid) -> Result<(), EngineError> {
        let mut next = self.state.clone();
        let Some(code) = cascade::remove_department(&mut next, department_id) else {
            debug!(id = %department_id, "delete_department: unknown id");
            return Ok(());
        };
        record_activity(
            &mut next,
            ActivityEntry::new(
                code.clone(),
                actor,
                ActivityKind::DepartmentDeleted,
                format!("deleted department {code}"),
            ),
        );
        self.commit(next)
    }

    // ---- users ----

    /// Add a user. Usernames are unique case-insensitively.
    pub fn add_user(&mut self, user: User) -> Result<(), EngineError> {
        if self.state.users.iter().any(|u| u.username_matches(&user.username)) {
            return Err(EngineError::DuplicateUsername(user.username));
        }
        let mut next = self.state.clone();
        if let Some(code) = &user.department_code {
            record_activity(
                &mut next,
                ActivityEntry::new(
                    code.clone(),
                    user.id,
                    ActivityKind::UserJoined,
                    format!("{} joined {}", user.display_name, code),
                ),
            );
        }
        next.users.push(user);
        self.commit(next)
    }

    /// Replace a user by id. Unknown id: no-op.
    pub fn update_user(&mut self, user: User) -> Result<(), EngineError> {
        let mut next = self.state.clone();
        match next.users.iter_mut().find(|u| u.id == user.id) {
            Some(slot) => *slot = user,
            None => {
                debug!(id = %user.id, "update_user: unknown id");
                return Ok(());
            }
        }
        self.commit(next)
    }

    /// Explicit member removal. Unknown id: no-op.
    pub fn delete_user(&mut self, user_id: Uuid) -> Result<(), EngineError> {
        let mut next = self.state.clone();
        next.users.retain(|u| u.id != user_id);
        self.commit(next)
    }

    // ---- KPIs ----

    /// Add a KPI. The department code must exist at creation time.
    pub fn add_kpi(&mut self, kpi: Kpi) -> Result<(), EngineError> {
        if self.state.department_by_code(&kpi.department_code).is_none() {
            return Err(EngineError::UnknownDepartment(kpi.department_code));
        }
        let mut next = self.state.clone();
        next.kpis.push(kpi);
        self.commit(next)
    }

    /// Replace a KPI by id, refreshing its last_updated stamp.
    /// Unknown id: no-op.
    pub fn update_kpi(&mut self, mut kpi: Kpi) -> Result<(), EngineError> {
        let mut next = self.state.clone();
        match next.kpis.iter_mut().find(|k| k.id == kpi.id) {
            Some(slot) => {
                kpi.last_updated = chrono::Utc::now();
                *slot = kpi;
            }
            None => {
                debug!(id = %kpi.id, "update_kpi: unknown id");
                return Ok(());
            }
        }
        self.commit(next)
    }

    /// Delete a KPI. Unknown id: no-op. Tasks pointing at it keep their
    /// related_kpi_id; the reference is weak and tolerated on lookup.
    pub fn delete_kpi(&mut self, kpi_id: Uuid) -> Result<(), EngineError> {
        let mut next = self.state.clone();
        next.kpis.retain(|k| k.id != kpi_id);
        self.commit(next)
    }

    // ---- tasks (repository half; lifecycle lives in lifecycle.rs) ----

    /// Insert a task at the front if its id is new, else replace the
    /// existing task in place (position preserved).
    ///
    /// No cross-entity validation here: `related_kpi_id` is not checked.
    /// Validated creation is `create_task`.
    pub fn upsert_task(&mut self, mut task: Task) -> Result<(), EngineError> {
        let mut next = self.state.clone();
        task.touch();
        match next.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(slot) => *slot = task,
            None => next.tasks.insert(0, task),
        }
        self.commit(next)
    }

    /// Remove a task outright. Unknown id: no-op. Notifications and
    /// activity entries referencing the id stay behind (weak references).
    pub fn delete_task(&mut self, task_id: Uuid) -> Result<(), EngineError> {
        let mut next = self.state.clone();
        next.tasks.retain(|t| t.id != task_id);
        self.commit(next)
    }

    // ---- activity log & notifications ----

    /// Prepend an activity entry, evicting the oldest past the cap.
    pub fn add_activity(&mut self, entry: ActivityEntry) -> Result<(), EngineError> {
        let mut next = self.state.clone();
        record_activity(&mut next, entry);
        self.commit(next)
    }

    /// Prepend a notification.
    pub fn add_notification(&mut self, notification: Notification) -> Result<(), EngineError> {
        let mut next = self.state.clone();
        next.notifications.insert(0, notification);
        self.commit(next)
    }

    /// Mark one notification read. Idempotent; unknown id: no-op.
    pub fn mark_notification_read(&mut self, notification_id: Uuid) -> Result<(), EngineError> {
        let mut next = self.state.clone();
        if let Some(n) = next.notifications.iter_mut().find(|n| n.id == notification_id) {
            n.is_read = true;
        }
        self.commit(next)
    }

    /// Mark every notification addressed to `user_id` read. Idempotent.
    pub fn mark_all_notifications_read(&mut self, user_id: Uuid) -> Result<(), EngineError> {
        let mut next = self.state.clone();
        for n in next.notifications.iter_mut().filter(|n| n.user_id == user_id) {
            n.is_read = true;
        }
        self.commit(next)
    }

    /// Move the admin preview cursor. Pure cursor update, no cascade.
    pub fn set_preview_department(&mut self, code: Option<String>) -> Result<(), EngineError> {
        let mut next = self.state.clone();
        next.preview_department_code = code;
        self.commit(next)
    }
}
