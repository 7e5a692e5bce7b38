// user.rs — User: portal members, managers and admins.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a user is allowed to do in the portal.
///
/// Role gates are decided by the caller (the identity layer); the engine
/// trusts the acting user's role as given.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full access, including department management and the preview cursor.
    Admin,
    /// Runs a department: approves/rejects tasks, manages members.
    Manager,
    /// Regular department member.
    Member,
}

/// Whether a user can currently sign in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Active,
    Disabled,
}

/// A portal user.
///
/// `department_code` is a weak reference to [`Department::code`], not the
/// department id. It is cleared (not cascaded away) when the department is
/// deleted: the user becomes unassigned but keeps role and status.
///
/// [`Department::code`]: crate::department::Department::code
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: Uuid,
    /// Unique login name, compared case-insensitively.
    pub username: String,
    pub display_name: String,
    pub role: Role,
    /// Weak reference to a department code; `None` means unassigned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department_code: Option<String>,
    pub status: UserStatus,
    pub can_create_tasks: bool,
    /// Force a password change on next sign-in.
    ///
    /// Defaults to `true` when absent from persisted state: an aggregate
    /// written before this field existed gets the fail-secure default.
    #[serde(default = "default_require_password_change")]
    pub require_password_change: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,
    pub created_at: DateTime<Utc>,
}

fn default_require_password_change() -> bool {
    true
}

impl User {
    /// Create a new active member with a fresh id.
    pub fn new(username: impl Into<String>, display_name: impl Into<String>, role: Role) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            display_name: display_name.into(),
            role,
            department_code: None,
            status: UserStatus::Active,
            can_create_tasks: false,
            require_password_change: true,
            specialty: None,
            created_at: Utc::now(),
        }
    }

    /// Case-insensitive username comparison (usernames are unique under this).
    pub fn username_matches(&self, other: &str) -> bool {
        self.username.eq_ignore_ascii_case(other)
    }
}
