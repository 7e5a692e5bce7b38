// department.rs — Department: the organizational unit KPIs and tasks belong to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DepartmentStatus {
    Active,
    Archived,
}

/// A department.
///
/// `code` is the short, stable identifier KPIs, tasks and users point at —
/// not the id. Deleting a department cascades by code: its KPIs and tasks
/// are removed, its users unassigned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Department {
    pub id: Uuid,
    /// Short unique code used as the foreign key by KPIs, tasks and users.
    pub code: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_user_id: Option<Uuid>,
    pub status: DepartmentStatus,
    pub created_at: DateTime<Utc>,
}

impl Department {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            code: code.into(),
            name: name.into(),
            manager_user_id: None,
            status: DepartmentStatus::Active,
            created_at: Utc::now(),
        }
    }
}
