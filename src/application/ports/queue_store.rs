use crate::domain::entities::{QueueCounts, QueueRecord};
use crate::domain::value_objects::{FailureReason, RecordId};
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    Inserted,
    /// The id already exists with an identical payload; nothing was written.
    Duplicate,
}

/// Durable on-device queue of captured scans.
///
/// Every mutation must be persisted before returning, and state transitions
/// are conditional on the current state: an illegal transition is an error,
/// never a silent overwrite.
#[async_trait]
pub trait QueueStore: Send + Sync {
    async fn enqueue(&self, record: &QueueRecord) -> Result<EnqueueOutcome, AppError>;

    async fn get(&self, id: &RecordId) -> Result<Option<QueueRecord>, AppError>;

    /// All `pending` records in capture order (FIFO).
    async fn list_pending(&self) -> Result<Vec<QueueRecord>, AppError>;

    async fn list_failed(&self) -> Result<Vec<QueueRecord>, AppError>;

    /// `pending -> in_flight`; increments and returns the attempt count.
    async fn mark_in_flight(&self, id: &RecordId) -> Result<u32, AppError>;

    /// `in_flight -> synced`.
    async fn mark_synced(&self, id: &RecordId) -> Result<(), AppError>;

    /// `in_flight -> failed` with a classified reason.
    async fn mark_failed(&self, id: &RecordId, reason: &FailureReason) -> Result<(), AppError>;

    /// `in_flight -> pending` after a transient delivery failure.
    async fn requeue(&self, id: &RecordId) -> Result<(), AppError>;

    /// `failed -> pending` by explicit operator action. Clears the failure
    /// reason, keeps the attempt count.
    async fn retry_failed(&self, id: &RecordId) -> Result<(), AppError>;

    /// Permanently removes a `failed` record.
    async fn discard_failed(&self, id: &RecordId) -> Result<(), AppError>;

    /// Startup crash recovery: reverts records stranded `in_flight` back to
    /// `pending`. Returns how many were recovered.
    async fn recover_in_flight(&self) -> Result<u64, AppError>;

    /// Prunes `synced` audit rows older than the cutoff.
    async fn purge_synced(&self, older_than: DateTime<Utc>) -> Result<u64, AppError>;

    async fn counts(&self) -> Result<QueueCounts, AppError>;

    async fn has_unsynced(&self) -> Result<bool, AppError>;
}
