use crate::presentation::dto::Validate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeadLetterEntryResponse {
    pub record_id: String,
    pub picker_id: String,
    pub bucket_id: String,
    pub kind: String,
    pub reason: String,
    pub first_failed_at: i64,
    pub attempt_count: u32,
    pub captured_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeadLetterActionRequest {
    pub record_id: String,
}

impl Validate for DeadLetterActionRequest {
    fn validate(&self) -> Result<(), String> {
        if self.record_id.trim().is_empty() {
            return Err("record_id must not be empty".to_string());
        }
        Ok(())
    }
}
