use tracing::warn;

/// Operator-facing alerts for session-level events. Fire-and-forget: the
/// core never waits on acknowledgement. Item-level progress travels through
/// the session status string instead.
pub trait OperatorNotifier: Send + Sync {
    fn alert(&self, message: &str);
}

/// Default notifier; the host UI layer substitutes its own blocking dialog.
pub struct TracingNotifier;

impl OperatorNotifier for TracingNotifier {
    fn alert(&self, message: &str) {
        warn!(target: "operator", "{message}");
    }
}
