use std::time::Duration;

use portalscan_scan_state::ScanSession;

/// Where the current item stands against its rolling time bound.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ItemTiming {
    /// No invocation has touched this item yet; the clock starts now.
    FirstTouch,
    Running { elapsed_ms: i64 },
    Exceeded { elapsed_ms: i64 },
}

/// Bounds how long one queue item may occupy the automation. The clock is
/// armed by the first invocation that touches the item and survives
/// navigations because it lives in the session record.
pub struct ItemTimeoutSupervisor {
    bound_ms: i64,
}

impl ItemTimeoutSupervisor {
    pub fn new(bound: Duration) -> Self {
        Self {
            bound_ms: bound.as_millis() as i64,
        }
    }

    pub fn check(&self, session: &ScanSession, now_ms: i64) -> ItemTiming {
        if session.is_first_touch() {
            return ItemTiming::FirstTouch;
        }
        let elapsed_ms = session.item_elapsed_ms(now_ms).unwrap_or(0);
        if elapsed_ms > self.bound_ms {
            ItemTiming::Exceeded { elapsed_ms }
        } else {
            ItemTiming::Running { elapsed_ms }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portalscan_core_types::ScanId;
    use portalscan_scan_state::WorkItem;

    fn session() -> ScanSession {
        ScanSession::new(
            ScanId::new(),
            vec![WorkItem::new("a"), WorkItem::new("b")],
            0,
        )
    }

    #[test]
    fn untouched_item_is_first_touch() {
        let supervisor = ItemTimeoutSupervisor::new(Duration::from_millis(90_000));
        assert_eq!(supervisor.check(&session(), 1_000), ItemTiming::FirstTouch);
    }

    #[test]
    fn clock_measures_from_first_touch_not_session_creation() {
        let supervisor = ItemTimeoutSupervisor::new(Duration::from_millis(1_000));
        let mut session = session();
        // Session created at 0; item first touched much later.
        session.begin_item(50_000);

        assert_eq!(
            supervisor.check(&session, 50_400),
            ItemTiming::Running { elapsed_ms: 400 }
        );
        assert_eq!(
            supervisor.check(&session, 51_001),
            ItemTiming::Exceeded { elapsed_ms: 1_001 }
        );
    }

    #[test]
    fn advancing_re_arms_the_clock_for_the_next_item() {
        let supervisor = ItemTimeoutSupervisor::new(Duration::from_millis(1_000));
        let mut session = session();
        session.begin_item(0);
        session.advance("next");
        assert_eq!(supervisor.check(&session, 10_000), ItemTiming::FirstTouch);
    }
}
