use portalscan_core_types::ScanId;
use serde::{Deserialize, Serialize};

use crate::errors::StateError;

/// One unit of remote lookup work. Immutable once enqueued.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    /// Portal lookup key.
    pub identifier: String,
    /// Display-only auxiliary fields carried from the host page.
    pub name: Option<String>,
    pub birth_date: Option<String>,
}

impl WorkItem {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            name: None,
            birth_date: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_birth_date(mut self, birth_date: impl Into<String>) -> Self {
        self.birth_date = Some(birth_date.into());
        self
    }
}

/// Durable record of one scan run.
///
/// Invariants: `index <= queue.len()`, and `index == queue.len()` implies
/// `active == false` within the mutation that advanced past the last item.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScanSession {
    pub scan_id: ScanId,
    pub active: bool,
    pub queue: Vec<WorkItem>,
    /// Cursor into `queue`; items below it are done or skipped.
    pub index: usize,
    pub auth_wait: bool,
    /// Epoch millis at which the authentication wait began.
    pub auth_started_ms: i64,
    /// Identifier of the item currently occupying the automation.
    pub current_item: Option<String>,
    /// Epoch millis of the first invocation that touched `current_item`.
    pub current_item_started_ms: Option<i64>,
    pub status: String,
}

impl ScanSession {
    pub fn new(scan_id: ScanId, queue: Vec<WorkItem>, now_ms: i64) -> Self {
        let status = format!("Starting scan for {} items...", queue.len());
        Self {
            scan_id,
            active: true,
            queue,
            index: 0,
            auth_wait: true,
            auth_started_ms: now_ms,
            current_item: None,
            current_item_started_ms: None,
            status,
        }
    }

    /// The item under the cursor, if any remain.
    pub fn current(&self) -> Option<&WorkItem> {
        self.queue.get(self.index)
    }

    pub fn finished(&self) -> bool {
        self.index >= self.queue.len()
    }

    /// A loaded page is ours only when the session is live and the page's
    /// embedded token matches.
    pub fn is_authoritative_for(&self, token: &ScanId) -> bool {
        self.active && self.scan_id == *token
    }

    /// Check the persisted queue and cursor before acting on them. A failure
    /// here is unrecoverable by skipping.
    pub fn validate(&self) -> Result<(), StateError> {
        if self.queue.is_empty() {
            return Err(StateError::QueueInvalid("queue is empty".into()));
        }
        if self.index > self.queue.len() {
            return Err(StateError::QueueInvalid(format!(
                "cursor {} out of bounds for {} items",
                self.index,
                self.queue.len()
            )));
        }
        if let Some(item) = self.current() {
            if item.identifier.trim().is_empty() {
                return Err(StateError::ItemInvalid {
                    index: self.index,
                    reason: "empty identifier".into(),
                });
            }
        }
        Ok(())
    }

    /// Whether the current item has not been touched by any invocation yet.
    pub fn is_first_touch(&self) -> bool {
        match self.current() {
            Some(item) => {
                self.current_item.as_deref() != Some(item.identifier.as_str())
                    || self.current_item_started_ms.is_none()
            }
            None => false,
        }
    }

    /// Start the per-item clock for the item under the cursor.
    pub fn begin_item(&mut self, now_ms: i64) {
        if let Some(item) = self.queue.get(self.index) {
            self.status = format!(
                "Processing {} ({}/{})...",
                item.identifier,
                self.index + 1,
                self.queue.len()
            );
            self.current_item = Some(item.identifier.clone());
            self.current_item_started_ms = Some(now_ms);
        }
    }

    /// Elapsed millis since the current item was first touched.
    pub fn item_elapsed_ms(&self, now_ms: i64) -> Option<i64> {
        self.current_item_started_ms
            .map(|started| now_ms.saturating_sub(started))
    }

    /// Move the cursor past the current item and drop item tracking. Returns
    /// true when the queue is exhausted; the session deactivates in the same
    /// mutation so the cursor-at-end invariant holds.
    pub fn advance(&mut self, status: impl Into<String>) -> bool {
        self.index += 1;
        self.current_item = None;
        self.current_item_started_ms = None;
        self.status = status.into();
        if self.finished() {
            self.active = false;
        }
        self.finished()
    }

    /// Deactivate in place; queue and cursor stay for inspection.
    pub fn mark_stopped(&mut self, reason: impl Into<String>) {
        self.active = false;
        self.auth_wait = false;
        self.current_item = None;
        self.current_item_started_ms = None;
        self.status = reason.into();
    }

    pub fn clear_auth_wait(&mut self, status: impl Into<String>) {
        self.auth_wait = false;
        self.status = status.into();
    }
}
