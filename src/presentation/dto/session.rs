use crate::presentation::dto::Validate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStateResponse {
    /// "active" or "expired_blocked".
    pub state: String,
    pub can_clear_local_state: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReauthenticateRequest {
    pub email: String,
    pub password: String,
}

impl Validate for ReauthenticateRequest {
    fn validate(&self) -> Result<(), String> {
        if self.email.trim().is_empty() {
            return Err("email must not be empty".to_string());
        }
        if self.password.is_empty() {
            return Err("password must not be empty".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReauthenticateResponse {
    pub renewed: bool,
    pub expires_at: Option<i64>,
    /// Whether a drain was resumed right after recovery.
    pub sync_resumed: bool,
}
