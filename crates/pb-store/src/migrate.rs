// migrate.rs — Forward migration of older persisted schema shapes.
//
// Older documents may lack the activities/notifications arrays, the version
// counter, or the per-user require_password_change flag. serde's
// `#[serde(default)]` attributes apply the actual defaults during
// deserialization; this module only answers "did that happen?", so the
// store knows to re-persist the corrected document immediately.

use serde_json::Value;

/// Returns true if deserializing `doc` will apply any schema default.
pub(crate) fn needs_defaults(doc: &Value) -> bool {
    let Some(obj) = doc.as_object() else {
        return false;
    };

    if !obj.contains_key("activities")
        || !obj.contains_key("notifications")
        || !obj.contains_key("version")
    {
        return true;
    }

    // require_password_change defaults to true (fail-secure) when absent.
    if let Some(users) = obj.get("users").and_then(Value::as_array) {
        if users
            .iter()
            .filter_map(Value::as_object)
            .any(|u| !u.contains_key("require_password_change"))
        {
            return true;
        }
    }

    false
}
