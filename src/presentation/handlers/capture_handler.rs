use crate::application::services::capture_service::{CaptureParams, CaptureService};
use crate::domain::value_objects::{BucketId, PickerId, RecordId, ScanKind};
use crate::presentation::dto::capture::{CaptureScanRequest, CaptureScanResponse};
use crate::presentation::dto::Validate;
use crate::shared::error::AppError;
use chrono::{DateTime, Utc};
use std::sync::Arc;

pub struct CaptureHandler {
    capture_service: Arc<CaptureService>,
}

impl CaptureHandler {
    pub fn new(capture_service: Arc<CaptureService>) -> Self {
        Self { capture_service }
    }

    pub async fn capture_scan(
        &self,
        request: CaptureScanRequest,
    ) -> Result<CaptureScanResponse, AppError> {
        request.validate().map_err(AppError::Validation)?;

        let params = CaptureParams {
            picker_id: PickerId::new(request.picker_id).map_err(AppError::Validation)?,
            bucket_id: BucketId::new(request.bucket_id).map_err(AppError::Validation)?,
            kind: ScanKind::from(request.kind.as_str()),
            scanned_at: request.scanned_at.map(parse_timestamp).transpose()?,
            client_id: request
                .client_id
                .as_deref()
                .map(RecordId::parse)
                .transpose()
                .map_err(AppError::Validation)?,
        };

        let record_id = self.capture_service.capture_scan(params).await?;
        Ok(CaptureScanResponse {
            record_id: record_id.to_string(),
        })
    }
}

fn parse_timestamp(millis: i64) -> Result<DateTime<Utc>, AppError> {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .ok_or_else(|| AppError::Validation(format!("Invalid scanned_at timestamp: {millis}")))
}
