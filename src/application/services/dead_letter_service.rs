use crate::application::ports::queue_store::QueueStore;
use crate::application::services::status::QueueStatusChannel;
use crate::domain::entities::DeadLetterEntry;
use crate::domain::value_objects::RecordId;
use crate::shared::error::AppError;
use std::sync::Arc;
use tracing::{info, warn};

/// Operator surface over quarantined records. Records only leave `failed`
/// through the explicit actions here; no drain ever resubmits them.
pub struct DeadLetterService {
    queue: Arc<dyn QueueStore>,
    status: Arc<QueueStatusChannel>,
}

impl DeadLetterService {
    pub fn new(queue: Arc<dyn QueueStore>, status: Arc<QueueStatusChannel>) -> Self {
        Self { queue, status }
    }

    pub async fn list(&self) -> Result<Vec<DeadLetterEntry>, AppError> {
        let failed = self.queue.list_failed().await?;
        let entries = failed
            .into_iter()
            .filter_map(|record| {
                let id = record.id.clone();
                let entry = DeadLetterEntry::from_record(record);
                if entry.is_none() {
                    warn!("Failed record {} is missing quarantine context", id);
                }
                entry
            })
            .collect();
        Ok(entries)
    }

    /// Moves the record back to `pending`. The caller re-triggers a drain.
    pub async fn retry(&self, id: &RecordId) -> Result<(), AppError> {
        self.queue.retry_failed(id).await?;
        info!("Dead-letter record {} requeued by operator", id);
        self.status.refresh().await?;
        Ok(())
    }

    /// Permanently removes the record. Destructive; confirmation happens
    /// upstream in the shell.
    pub async fn discard(&self, id: &RecordId) -> Result<(), AppError> {
        self.queue.discard_failed(id).await?;
        warn!("Dead-letter record {} discarded permanently", id);
        self.status.refresh().await?;
        Ok(())
    }
}
