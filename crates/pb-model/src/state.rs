// state.rs — AppState: the aggregate root.
//
// One AppState value is one consistent snapshot of the whole portal. It is
// the unit of atomicity: every mutation produces a brand-new AppState and
// persists it with a single whole-document write, so cross-entity side
// effects (approve ⇒ increment KPI ⇒ log activity ⇒ notify) land together
// or not at all.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::activity::ActivityEntry;
use crate::department::Department;
use crate::kpi::Kpi;
use crate::notification::Notification;
use crate::task::{Task, TaskPriority, TaskStatus};
use crate::user::{Role, User};

/// The aggregate root: everything the portal knows, in one value.
///
/// `activities`, `notifications` and `version` carry `#[serde(default)]` so
/// documents persisted by older schema versions still load; the store
/// re-persists after applying defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AppState {
    /// Monotonically increasing write counter, used for optimistic
    /// concurrency: a save whose version does not advance past the
    /// persisted one is rejected instead of clobbering another writer.
    #[serde(default)]
    pub version: u64,

    pub users: Vec<User>,
    pub departments: Vec<Department>,
    pub kpis: Vec<Kpi>,
    pub tasks: Vec<Task>,

    /// Newest-first, capped at [`ACTIVITY_LOG_CAP`] entries.
    ///
    /// [`ACTIVITY_LOG_CAP`]: crate::activity::ACTIVITY_LOG_CAP
    #[serde(default)]
    pub activities: Vec<ActivityEntry>,

    /// Newest-first. Never auto-expired.
    #[serde(default)]
    pub notifications: Vec<Notification>,

    /// Admin-only UI cursor: which department an admin is previewing.
    /// Not a business invariant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_department_code: Option<String>,
}

impl AppState {
    pub fn department_by_code(&self, code: &str) -> Option<&Department> {
        self.departments.iter().find(|d| d.code == code)
    }

    pub fn task(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn kpi(&self, id: Uuid) -> Option<&Kpi> {
        self.kpis.iter().find(|k| k.id == id)
    }

    pub fn user(&self, id: Uuid) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    /// Build the seed aggregate used on first run: one admin, one
    /// department with a manager and two members, a handful of KPIs and
    /// tasks so the portal is not empty on first open.
    pub fn seed() -> Self {
        let admin = User::new("admin", "Portal Admin", Role::Admin);

        let mut manager = User::new("dkim", "Dana Kim", Role::Manager);
        manager.department_code = Some("BD".to_string());
        manager.can_create_tasks = true;
        manager.specialty = Some("Partnerships".to_string());

        let mut member_a = User::new("msolis", "Marta Solis", Role::Member);
        member_a.department_code = Some("BD".to_string());
        member_a.can_create_tasks = true;

        let mut member_b = User::new("tosei", "Taro Osei", Role::Member);
        member_b.department_code = Some("BD".to_string());

        let mut dept = Department::new("BD", "Business Development");
        dept.manager_user_id = Some(manager.id);

        let mut kpi_deals = Kpi::new("BD", "Deals closed", "deals", 50.0);
        kpi_deals.current_value = 32.0;
        kpi_deals.owner_user_id = Some(manager.id);

        let mut kpi_calls = Kpi::new("BD", "Discovery calls", "calls", 120.0);
        kpi_calls.current_value = 78.0;

        let kpi_partners = Kpi::new("BD", "New partners onboarded", "partners", 12.0);

        let mut task_proposal = Task::new("BD", "Draft Q3 partner proposal", TaskPriority::High);
        task_proposal.assignee_user_ids = vec![member_a.id];
        task_proposal.related_kpi_id = Some(kpi_deals.id);
        task_proposal.status = TaskStatus::InProgress;

        let mut task_calls = Task::new("BD", "Book discovery calls for June", TaskPriority::Medium);
        task_calls.assignee_user_ids = vec![member_b.id];
        task_calls.related_kpi_id = Some(kpi_calls.id);

        let task_deck = Task::new("BD", "Refresh the intro deck", TaskPriority::Low);

        Self {
            version: 0,
            users: vec![admin, manager, member_a, member_b],
            departments: vec![dept],
            kpis: vec![kpi_deals, kpi_calls, kpi_partners],
            tasks: vec![task_proposal, task_calls, task_deck],
            activities: Vec::new(),
            notifications: Vec::new(),
            preview_department_code: Some("BD".to_string()),
        }
    }
}
