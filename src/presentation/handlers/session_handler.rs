use crate::application::services::session_guard::{SessionGuard, SessionState};
use crate::application::services::sync_service::{SyncService, SyncTrigger};
use crate::domain::entities::Credentials;
use crate::presentation::dto::session::{
    ReauthenticateRequest, ReauthenticateResponse, SessionStateResponse,
};
use crate::presentation::dto::Validate;
use crate::shared::error::AppError;
use std::sync::Arc;
use tokio::sync::watch;

pub struct SessionHandler {
    guard: Arc<SessionGuard>,
    sync_service: Arc<SyncService>,
}

impl SessionHandler {
    pub fn new(guard: Arc<SessionGuard>, sync_service: Arc<SyncService>) -> Self {
        Self {
            guard,
            sync_service,
        }
    }

    pub async fn state(&self) -> Result<SessionStateResponse, AppError> {
        let state = match self.guard.state() {
            SessionState::Active => "active",
            SessionState::ExpiredBlocked => "expired_blocked",
        };
        Ok(SessionStateResponse {
            state: state.to_string(),
            can_clear_local_state: self.guard.can_clear_local_state().await?,
        })
    }

    /// The shell subscribes to raise and drop the blocking re-auth prompt.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.guard.subscribe()
    }

    /// Re-validates credentials and resumes the paused orchestrator.
    pub async fn reauthenticate(
        &self,
        request: ReauthenticateRequest,
    ) -> Result<ReauthenticateResponse, AppError> {
        request.validate().map_err(AppError::Validation)?;

        let credentials = Credentials::new(request.email, request.password);
        let session = self.guard.reauthenticate(&credentials).await?;

        let resumed = self
            .sync_service
            .handle_trigger(SyncTrigger::Manual)
            .await?
            .is_some();

        Ok(ReauthenticateResponse {
            renewed: true,
            expires_at: session.expires_at.map(|t| t.timestamp_millis()),
            sync_resumed: resumed,
        })
    }

    pub async fn sign_out(&self) -> Result<(), AppError> {
        self.guard.sign_out().await
    }
}
