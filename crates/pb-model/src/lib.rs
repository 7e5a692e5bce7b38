//! # pb-model
//!
//! Entity types for the Pulseboard tracking portal.
//!
//! Everything the portal knows about lives inside one aggregate,
//! [`AppState`]: users, departments, KPIs, tasks, the activity log and
//! notifications. The aggregate is the unit of persistence and atomicity;
//! mutation lives in `pb-engine`, persistence in `pb-store`.
//!
//! ## Key components
//!
//! - [`AppState`] — the aggregate root, one consistent snapshot of all entities
//! - [`Task`] / [`TaskStatus`] — the task lifecycle state machine (Backlog
//!   → InProgress → PendingApproval → Completed, with a reject edge back)
//! - [`Kpi`] — department KPIs with progress derived from current/target
//! - [`ActivityEntry`] — bounded, newest-first human-readable event log
//! - [`Notification`] — typed per-user notification records

pub mod activity;
pub mod department;
pub mod kpi;
pub mod notification;
pub mod state;
pub mod task;
pub mod user;

pub use activity::{ActivityEntry, ActivityKind, ACTIVITY_LOG_CAP};
pub use department::{Department, DepartmentStatus};
pub use kpi::Kpi;
pub use notification::{Notification, NotificationKind};
pub use state::AppState;
pub use task::{Task, TaskAttachment, TaskComment, TaskPriority, TaskStatus};
pub use user::{Role, User, UserStatus};
