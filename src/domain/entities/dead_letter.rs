use crate::domain::entities::QueueRecord;
use crate::domain::value_objects::FailureReason;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A quarantined record wrapped with operator-facing context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeadLetterEntry {
    pub record: QueueRecord,
    pub reason: FailureReason,
    pub first_failed_at: DateTime<Utc>,
    pub attempt_count: u32,
}

impl DeadLetterEntry {
    pub fn from_record(record: QueueRecord) -> Option<Self> {
        let reason = record.failure_reason.clone()?;
        let first_failed_at = record.failed_at?;
        let attempt_count = record.attempt_count;
        Some(Self {
            record,
            reason,
            first_failed_at,
            attempt_count,
        })
    }
}
