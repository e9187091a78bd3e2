use crate::domain::entities::AttendanceEntry;
use crate::shared::error::AppError;
use async_trait::async_trait;

/// Persisted snapshot of the attendance cache, so validation keeps working
/// across an offline restart.
#[async_trait]
pub trait AttendanceStore: Send + Sync {
    async fn load_all(&self) -> Result<Vec<AttendanceEntry>, AppError>;

    /// Last-write-wins upsert: applied only if the entry is newer than the
    /// stored one. Returns whether the write was applied.
    async fn upsert(&self, entry: &AttendanceEntry) -> Result<bool, AppError>;

    /// Replaces the whole snapshot with a fresh seed from the backend.
    async fn replace_all(&self, entries: &[AttendanceEntry]) -> Result<(), AppError>;
}
