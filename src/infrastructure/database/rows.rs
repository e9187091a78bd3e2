use crate::domain::entities::{AttendanceEntry, QueueRecord, ScanEvent};
use crate::domain::value_objects::{
    BucketId, FailureReason, PickerId, RecordId, RecordState, ScanKind,
};
use crate::shared::error::AppError;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct ScanQueueRow {
    pub id: String,
    pub picker_id: String,
    pub bucket_id: String,
    pub kind: String,
    pub scanned_at: i64,
    pub status: String,
    pub attempt_count: i64,
    pub failure_reason: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    pub synced_at: Option<i64>,
    pub failed_at: Option<i64>,
}

impl ScanQueueRow {
    pub fn into_record(self) -> Result<QueueRecord, AppError> {
        let picker_id = PickerId::new(self.picker_id).map_err(AppError::Validation)?;
        let bucket_id = BucketId::new(self.bucket_id).map_err(AppError::Validation)?;
        let id = RecordId::new(self.id).map_err(AppError::Validation)?;

        Ok(QueueRecord {
            id,
            event: ScanEvent {
                picker_id,
                bucket_id,
                kind: ScanKind::from(self.kind.as_str()),
                scanned_at: timestamp_from_millis(self.scanned_at)?,
            },
            state: RecordState::from(self.status.as_str()),
            attempt_count: self.attempt_count.max(0) as u32,
            failure_reason: self
                .failure_reason
                .as_deref()
                .map(FailureReason::from),
            created_at: timestamp_from_millis(self.created_at)?,
            updated_at: timestamp_from_millis(self.updated_at)?,
            synced_at: self.synced_at.map(timestamp_from_millis).transpose()?,
            failed_at: self.failed_at.map(timestamp_from_millis).transpose()?,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct AttendanceRow {
    pub picker_id: String,
    pub is_checked_in: bool,
    pub last_updated_at: i64,
}

impl AttendanceRow {
    pub fn into_entry(self) -> Result<AttendanceEntry, AppError> {
        Ok(AttendanceEntry {
            picker_id: PickerId::new(self.picker_id).map_err(AppError::Validation)?,
            is_checked_in: self.is_checked_in,
            last_updated_at: timestamp_from_millis(self.last_updated_at)?,
        })
    }
}

pub fn timestamp_from_millis(millis: i64) -> Result<DateTime<Utc>, AppError> {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .ok_or_else(|| AppError::Database(format!("Invalid timestamp in row: {millis}")))
}
