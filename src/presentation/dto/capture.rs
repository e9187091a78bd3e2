use crate::presentation::dto::Validate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureScanRequest {
    pub picker_id: String,
    pub bucket_id: String,
    pub kind: String,
    /// Capture time in unix milliseconds; defaults to now.
    pub scanned_at: Option<i64>,
    /// Resend with the same id to retry a capture without duplicating.
    pub client_id: Option<String>,
}

impl Validate for CaptureScanRequest {
    fn validate(&self) -> Result<(), String> {
        if self.picker_id.trim().is_empty() {
            return Err("picker_id must not be empty".to_string());
        }
        if self.bucket_id.trim().is_empty() {
            return Err("bucket_id must not be empty".to_string());
        }
        if self.kind.trim().is_empty() {
            return Err("kind must not be empty".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureScanResponse {
    pub record_id: String,
}
