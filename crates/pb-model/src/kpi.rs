// kpi.rs — Kpi: a measurable department goal with a target and current value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A department KPI.
///
/// `current_value` changes through exactly two paths: an explicit
/// `update_kpi` call, or the +1 auto-increment when a related task is
/// approved. Nothing else touches it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Kpi {
    pub id: Uuid,
    /// Weak reference to the owning department's code.
    pub department_code: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Unit of measurement for display ("deals", "%", "calls").
    pub unit: String,
    /// Expected to be > 0; progress is defined as 0 otherwise.
    pub target: f64,
    pub current_value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_user_id: Option<Uuid>,
    pub last_updated: DateTime<Utc>,
}

impl Kpi {
    pub fn new(
        department_code: impl Into<String>,
        name: impl Into<String>,
        unit: impl Into<String>,
        target: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            department_code: department_code.into(),
            name: name.into(),
            description: None,
            unit: unit.into(),
            target,
            current_value: 0.0,
            owner_user_id: None,
            last_updated: Utc::now(),
        }
    }

    /// Percentage of target reached, rounded to the nearest integer.
    ///
    /// Deliberately unclamped: a value past 100 is a legitimate over-target
    /// signal. Display code clamps for rendering; the model does not.
    /// A target of zero (or less) yields 0 rather than dividing by zero.
    pub fn progress(&self) -> i64 {
        if self.target <= 0.0 {
            return 0;
        }
        (self.current_value / self.target * 100.0).round() as i64
    }
}
