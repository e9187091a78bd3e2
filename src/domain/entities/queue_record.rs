use crate::domain::entities::ScanEvent;
use crate::domain::value_objects::{FailureReason, RecordId, RecordState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One field event awaiting delivery to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueRecord {
    pub id: RecordId,
    pub event: ScanEvent,
    pub state: RecordState,
    pub attempt_count: u32,
    pub failure_reason: Option<FailureReason>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub synced_at: Option<DateTime<Utc>>,
    pub failed_at: Option<DateTime<Utc>>,
}

impl QueueRecord {
    /// A freshly captured record, not yet attempted.
    pub fn draft(id: RecordId, event: ScanEvent, created_at: DateTime<Utc>) -> Self {
        let created_at = crate::domain::entities::scan_event::truncate_to_millis(created_at);
        Self {
            id,
            event,
            state: RecordState::Pending,
            attempt_count: 0,
            failure_reason: None,
            created_at,
            updated_at: created_at,
            synced_at: None,
            failed_at: None,
        }
    }

    pub fn is_unsynced(&self) -> bool {
        self.state.is_unsynced()
    }
}

/// Per-state totals, backing the "N pending sync" indicator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueCounts {
    pub pending: u64,
    pub in_flight: u64,
    pub synced: u64,
    pub failed: u64,
}

impl QueueCounts {
    pub fn unsynced(&self) -> u64 {
        self.pending + self.in_flight + self.failed
    }
}
