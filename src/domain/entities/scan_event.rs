use crate::domain::value_objects::{BucketId, PickerId, ScanKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The domain event a device captures: one bucket scanned for one picker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanEvent {
    pub picker_id: PickerId,
    pub bucket_id: BucketId,
    pub kind: ScanKind,
    /// Local capture time on the device.
    pub scanned_at: DateTime<Utc>,
}

impl ScanEvent {
    pub fn new(
        picker_id: PickerId,
        bucket_id: BucketId,
        kind: ScanKind,
        scanned_at: DateTime<Utc>,
    ) -> Self {
        Self {
            picker_id,
            bucket_id,
            kind,
            // Millisecond precision: the payload must compare equal after a
            // round trip through the durable store.
            scanned_at: truncate_to_millis(scanned_at),
        }
    }
}

pub(crate) fn truncate_to_millis(ts: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(ts.timestamp_millis()).unwrap_or(ts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{BucketId, PickerId, ScanKind};

    #[test]
    fn scanned_at_is_truncated_to_millis() {
        let event = ScanEvent::new(
            PickerId::new("p1".into()).unwrap(),
            BucketId::new("b1".into()).unwrap(),
            ScanKind::Pick,
            Utc::now(),
        );
        assert_eq!(
            event.scanned_at.timestamp_subsec_nanos() % 1_000_000,
            0
        );
    }
}
