use crate::application::services::dead_letter_service::DeadLetterService;
use crate::application::services::sync_service::{SyncService, SyncTrigger};
use crate::domain::entities::DeadLetterEntry;
use crate::domain::value_objects::RecordId;
use crate::presentation::dto::dead_letter::{DeadLetterActionRequest, DeadLetterEntryResponse};
use crate::presentation::dto::Validate;
use crate::shared::error::AppError;
use std::sync::Arc;

pub struct DeadLetterHandler {
    dead_letter_service: Arc<DeadLetterService>,
    sync_service: Arc<SyncService>,
}

impl DeadLetterHandler {
    pub fn new(
        dead_letter_service: Arc<DeadLetterService>,
        sync_service: Arc<SyncService>,
    ) -> Self {
        Self {
            dead_letter_service,
            sync_service,
        }
    }

    pub async fn list(&self) -> Result<Vec<DeadLetterEntryResponse>, AppError> {
        let entries = self.dead_letter_service.list().await?;
        Ok(entries.iter().map(map_entry).collect())
    }

    /// Requeues the record and kicks a drain so the retry is attempted
    /// without waiting for the next timer.
    pub async fn retry(&self, request: DeadLetterActionRequest) -> Result<(), AppError> {
        request.validate().map_err(AppError::Validation)?;
        let id = RecordId::parse(&request.record_id).map_err(AppError::Validation)?;

        self.dead_letter_service.retry(&id).await?;
        self.sync_service.handle_trigger(SyncTrigger::Manual).await?;
        Ok(())
    }

    pub async fn discard(&self, request: DeadLetterActionRequest) -> Result<(), AppError> {
        request.validate().map_err(AppError::Validation)?;
        let id = RecordId::parse(&request.record_id).map_err(AppError::Validation)?;

        self.dead_letter_service.discard(&id).await
    }
}

fn map_entry(entry: &DeadLetterEntry) -> DeadLetterEntryResponse {
    DeadLetterEntryResponse {
        record_id: entry.record.id.to_string(),
        picker_id: entry.record.event.picker_id.to_string(),
        bucket_id: entry.record.event.bucket_id.to_string(),
        kind: entry.record.event.kind.as_str().to_string(),
        reason: entry.reason.as_str().to_string(),
        first_failed_at: entry.first_failed_at.timestamp_millis(),
        attempt_count: entry.attempt_count,
        captured_at: entry.record.created_at.timestamp_millis(),
    }
}
