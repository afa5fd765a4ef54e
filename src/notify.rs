//! Best-effort external notification hook.
//!
//! An optional collaborator (e.g. a prediction backend bridge) can observe
//! every finalized activity. Implementations must never block or fail the
//! tracking pipeline; the trait is deliberately infallible from the
//! engine's point of view.

use crate::models::Activity;
use tracing::debug;

/// Per-activity hook invoked after the tracker finalizes an interval.
pub trait ActivityNotifier: Send + Sync {
    fn notify_activity(&self, activity: &Activity);
}

/// Notifier that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl ActivityNotifier for NoopNotifier {
    fn notify_activity(&self, _activity: &Activity) {}
}

/// Notifier that traces each activity, useful when no backend is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl ActivityNotifier for LogNotifier {
    fn notify_activity(&self, activity: &Activity) {
        debug!(
            app = %activity.app_name,
            productive = activity.is_productive,
            duration_secs = activity.duration().as_secs(),
            "activity finalized"
        );
    }
}
