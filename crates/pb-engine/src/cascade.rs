// cascade.rs — Referential cleanup when a department is removed.
//
// Deleting a department cascades by its code:
//   1. the department itself is removed;
//   2. every KPI and task carrying that code is removed;
//   3. every user carrying that code is unassigned (role/status untouched);
//   4. the admin preview cursor is repointed if it targeted the code.
//
// Activity log entries and notifications referencing the removed KPIs and
// tasks are left in place. Those references are weak: lookup-only,
// tolerate misses, never purged.

use uuid::Uuid;

use pb_model::AppState;

/// Remove a department and everything that hangs off its code.
/// Returns the removed code, or `None` if the id was unknown.
pub(crate) fn remove_department(state: &mut AppState, department_id: Uuid) -> Option<String> {
    let pos = state.departments.iter().position(|d| d.id == department_id)?;
    let code = state.departments.remove(pos).code;

    state.kpis.retain(|k| k.department_code != code);
    state.tasks.retain(|t| t.department_code != code);

    for user in &mut state.users {
        if user.department_code.as_deref() == Some(code.as_str()) {
            user.department_code = None;
        }
    }

    // The cursor lives outside the entity graph but inside the aggregate,
    // so it is repointed here: some remaining department, or nothing.
    if state.preview_department_code.as_deref() == Some(code.as_str()) {
        state.preview_department_code = state.departments.first().map(|d| d.code.clone());
    }

    Some(code)
}
