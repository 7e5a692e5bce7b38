// dispatch.rs — Activity recorder and notification dispatcher.
//
// Both side-effect channels write into the *same* AppState value the
// triggering mutation is building, so they are persisted in the one
// atomic replace along with the mutation itself.
//
// The activity log is newest-first and bounded: inserting past
// ACTIVITY_LOG_CAP evicts the oldest entry. Notifications are newest-first
// and unbounded; they are never auto-expired.

use uuid::Uuid;

use pb_model::{
    ActivityEntry, AppState, Notification, NotificationKind, ACTIVITY_LOG_CAP,
};

/// Prepend an activity entry, evicting the oldest past the cap.
pub(crate) fn record_activity(state: &mut AppState, entry: ActivityEntry) {
    state.activities.insert(0, entry);
    state.activities.truncate(ACTIVITY_LOG_CAP);
}

/// Create a notification for one concrete recipient and prepend it.
///
/// The recipient is always resolved by the caller at dispatch time; a
/// notification never means "whoever reads this later".
pub(crate) fn notify(
    state: &mut AppState,
    recipient: Uuid,
    kind: NotificationKind,
    title: &str,
    message: &str,
    related_task_id: Option<Uuid>,
) {
    let mut notification = Notification::new(recipient, kind, title, message);
    notification.related_task_id = related_task_id;
    state.notifications.insert(0, notification);
}

/// Fan out one notification per recipient.
///
/// No dedup: a recipient listed twice receives two notifications. Callers
/// keep assignee sets duplicate-free.
pub(crate) fn fan_out(
    state: &mut AppState,
    recipients: &[Uuid],
    kind: NotificationKind,
    title: &str,
    message: &str,
    related_task_id: Option<Uuid>,
) {
    for &recipient in recipients {
        notify(state, recipient, kind, title, message, related_task_id);
    }
}
