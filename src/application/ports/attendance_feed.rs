use crate::domain::entities::AttendanceEvent;
use crate::shared::error::AppError;
use async_trait::async_trait;
use futures::stream::BoxStream;

pub type AttendanceStream = BoxStream<'static, AttendanceEvent>;

/// Long-lived realtime subscription to attendance changes. Dropping the
/// stream (or aborting the task that consumes it) is the unsubscribe.
#[async_trait]
pub trait AttendanceFeed: Send + Sync {
    async fn subscribe(&self) -> Result<AttendanceStream, AppError>;
}
