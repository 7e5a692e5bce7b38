// workflow.rs — End-to-end approval workflow and persistence scenarios.
//
// These tests run the whole stack: Portal over a JsonStateStore on a
// temp directory, exercising the approval workflow, the department
// cascade, the bounded activity log and the cross-writer version check.

use tempfile::tempdir;
use uuid::Uuid;

use pb_engine::{EngineError, Portal};
use pb_model::{
    ActivityEntry, ActivityKind, AppState, Department, Kpi, NotificationKind, Role, Task,
    TaskPriority, TaskStatus, User,
};
use pb_store::{JsonStateStore, MemoryStateStore, StateStore, StoreError};

struct Board {
    portal: Portal,
    task_id: Uuid,
    kpi_id: Uuid,
    member_id: Uuid,
    manager_id: Uuid,
    dept_id: Uuid,
}

/// Department BD with KPI k1 {target 50, current 32} and task t1 in
/// pending_approval, related to k1, assigned to member m1.
fn board() -> Board {
    let mut state = AppState::default();

    let mut manager = User::new("dkim", "Dana Kim", Role::Manager);
    manager.department_code = Some("BD".to_string());
    let mut member = User::new("m1", "Member One", Role::Member);
    member.department_code = Some("BD".to_string());

    let mut dept = Department::new("BD", "Business Development");
    dept.manager_user_id = Some(manager.id);

    let mut kpi = Kpi::new("BD", "Deals closed", "deals", 50.0);
    kpi.current_value = 32.0;

    let mut task = Task::new("BD", "Close the Acme deal", TaskPriority::High);
    task.assignee_user_ids = vec![member.id];
    task.related_kpi_id = Some(kpi.id);
    task.status = TaskStatus::PendingApproval;

    let (task_id, kpi_id, member_id, manager_id, dept_id) =
        (task.id, kpi.id, member.id, manager.id, dept.id);

    state.departments.push(dept);
    state.users.push(manager);
    state.users.push(member);
    state.kpis.push(kpi);
    state.tasks.push(task);

    Board {
        portal: Portal::open(Box::new(MemoryStateStore::with_state(state))).unwrap(),
        task_id,
        kpi_id,
        member_id,
        manager_id,
        dept_id,
    }
}

#[test]
fn scenario_approve_couples_task_kpi_activity_and_notification() {
    let mut b = board();
    b.portal.approve(b.task_id, b.manager_id).unwrap();

    let state = b.portal.state();
    assert_eq!(state.task(b.task_id).unwrap().status, TaskStatus::Completed);
    assert_eq!(state.kpi(b.kpi_id).unwrap().current_value, 33.0);

    let approved: Vec<_> = state
        .notifications
        .iter()
        .filter(|n| n.kind == NotificationKind::TaskApproved)
        .collect();
    assert_eq!(approved.len(), 1);
    assert_eq!(approved[0].user_id, b.member_id);

    let kpi_updates = state
        .activities
        .iter()
        .filter(|a| a.kind == ActivityKind::KpiUpdated)
        .count();
    let status_changes = state
        .activities
        .iter()
        .filter(|a| a.kind == ActivityKind::TaskStatusChanged)
        .count();
    assert_eq!(kpi_updates, 1);
    assert_eq!(status_changes, 1);
}

#[test]
fn scenario_reject_returns_task_without_touching_kpi() {
    let mut b = board();
    b.portal.reject(b.task_id, b.manager_id).unwrap();

    let state = b.portal.state();
    assert_eq!(state.task(b.task_id).unwrap().status, TaskStatus::InProgress);
    assert_eq!(state.kpi(b.kpi_id).unwrap().current_value, 32.0);

    let rejected: Vec<_> = state
        .notifications
        .iter()
        .filter(|n| n.kind == NotificationKind::TaskRejected)
        .collect();
    assert_eq!(rejected.len(), 1);
    assert_eq!(rejected[0].user_id, b.member_id);
}

#[test]
fn scenario_department_delete_cascades_but_keeps_users() {
    let mut b = board();
    b.portal.delete_department(b.dept_id, b.manager_id).unwrap();

    let state = b.portal.state();
    assert!(state.kpi(b.kpi_id).is_none());
    assert!(state.task(b.task_id).is_none());

    let member = state.user(b.member_id).expect("member still present");
    assert!(member.department_code.is_none());
}

#[test]
fn scenario_101_activities_leave_100_oldest_evicted() {
    let mut b = board();
    for i in 0..101 {
        b.portal
            .add_activity(ActivityEntry::new(
                "BD",
                b.manager_id,
                ActivityKind::TaskUpdated,
                format!("entry {i}"),
            ))
            .unwrap();
    }

    let activities = &b.portal.state().activities;
    assert_eq!(activities.len(), 100);
    assert_eq!(activities[0].description, "entry 100");
    assert!(activities.iter().all(|a| a.description != "entry 0"));
}

#[test]
fn full_lifecycle_walk_over_a_file_store() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.json");

    let member = Uuid::new_v4();
    let manager = Uuid::new_v4();
    let task_id;

    {
        let store = JsonStateStore::new(&path).unwrap();
        let mut portal = Portal::open(Box::new(store)).unwrap();

        let mut task = Task::new("BD", "Quarterly outreach", TaskPriority::Medium);
        task.assignee_user_ids = vec![member];
        task_id = task.id;

        portal.create_task(task, manager).unwrap();
        portal.start_task(task_id, member).unwrap();
        portal
            .submit_for_approval(task_id, member, Some("done, see attachment".into()), vec![])
            .unwrap();
        portal.approve(task_id, manager).unwrap();
    }

    // Reopen from disk: the whole walk survived as one consistent document.
    let store = JsonStateStore::new(&path).unwrap();
    let portal = Portal::open(Box::new(store)).unwrap();
    let state = portal.state();

    let task = state.task(task_id).unwrap();
    assert_eq!(task.status, TaskStatus::Completed);
    assert_eq!(task.comments.len(), 1);
    assert!(state
        .notifications
        .iter()
        .any(|n| n.kind == NotificationKind::TaskApproved && n.user_id == member));
}

#[test]
fn save_load_round_trip_preserves_the_aggregate() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.json");

    let mut store = JsonStateStore::new(&path).unwrap();
    let mut state = store.load().unwrap();
    state.version += 1;
    store.save(&state).unwrap();

    let mut reopened = JsonStateStore::new(&path).unwrap();
    assert_eq!(reopened.load().unwrap(), state);
}

#[test]
fn second_writer_with_stale_snapshot_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.json");

    // Seed the document, then open two portals over it: two tabs.
    JsonStateStore::new(&path).unwrap().load().unwrap();
    let mut tab_a = Portal::open(Box::new(JsonStateStore::new(&path).unwrap())).unwrap();
    let mut tab_b = Portal::open(Box::new(JsonStateStore::new(&path).unwrap())).unwrap();

    tab_a.set_preview_department(Some("OPS".to_string())).unwrap();

    // Tab B still holds the old snapshot; its write must not clobber A's.
    let result = tab_b.set_preview_department(Some("HR".to_string()));
    assert!(matches!(
        result,
        Err(EngineError::Store(StoreError::VersionConflict { .. }))
    ));

    // A's change is what persisted.
    let mut check = JsonStateStore::new(&path).unwrap();
    assert_eq!(
        check.load().unwrap().preview_department_code.as_deref(),
        Some("OPS")
    );
}

#[test]
fn approve_is_atomic_with_respect_to_the_document() {
    // All approval side effects land in one persisted document version.
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.json");

    let mut state = AppState::default();
    let member = Uuid::new_v4();
    state.departments.push(Department::new("BD", "Business Development"));
    let mut kpi = Kpi::new("BD", "Deals closed", "deals", 50.0);
    kpi.current_value = 32.0;
    let mut task = Task::new("BD", "Close it", TaskPriority::High);
    task.assignee_user_ids = vec![member];
    task.related_kpi_id = Some(kpi.id);
    task.status = TaskStatus::PendingApproval;
    let (task_id, kpi_id) = (task.id, kpi.id);
    state.kpis.push(kpi);
    state.tasks.push(task);

    let mut seed_store = JsonStateStore::new(&path).unwrap();
    seed_store.load().unwrap(); // creates the document
    state.version = seed_store.load().unwrap().version + 1;
    seed_store.save(&state).unwrap();

    let mut portal = Portal::open(Box::new(JsonStateStore::new(&path).unwrap())).unwrap();
    let version_before = portal.state().version;
    portal.approve(task_id, Uuid::new_v4()).unwrap();

    let mut check = JsonStateStore::new(&path).unwrap();
    let on_disk = check.load().unwrap();
    assert_eq!(on_disk.version, version_before + 1, "exactly one write");
    assert_eq!(on_disk.task(task_id).unwrap().status, TaskStatus::Completed);
    assert_eq!(on_disk.kpi(kpi_id).unwrap().current_value, 33.0);
    assert!(on_disk
        .notifications
        .iter()
        .any(|n| n.kind == NotificationKind::TaskApproved));
}
