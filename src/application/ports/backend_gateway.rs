use crate::domain::entities::{AttendanceEntry, Credentials, QueueRecord, Session};
use crate::domain::value_objects::FailureReason;
use async_trait::async_trait;
use thiserror::Error;

/// Positive outcome of a scan submission. An idempotent replay of an already
/// committed id is treated identically to a first commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitAck {
    Committed,
    AlreadyCommitted,
}

/// Failure taxonomy the orchestrator classifies drain outcomes on.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Timeout, 5xx, connectivity drop mid-request. Outcome unknown; safe to
    /// retry because submission carries the record id as idempotency key.
    #[error("transient delivery failure: {0}")]
    Transient(String),

    /// The backend rejected the write permanently (authorization rule or
    /// server-side invariant).
    #[error("submission rejected: {0}")]
    Rejected(FailureReason),

    #[error("session expired")]
    SessionExpired,

    /// Re-authentication refused the presented credentials.
    #[error("authentication rejected: {0}")]
    AuthRejected(String),
}

impl From<GatewayError> for crate::shared::error::AppError {
    fn from(err: GatewayError) -> Self {
        use crate::shared::error::AppError;
        match err {
            GatewayError::Transient(msg) => AppError::Network(msg),
            GatewayError::Rejected(reason) => AppError::Auth(reason.to_string()),
            GatewayError::SessionExpired => AppError::SessionExpired,
            GatewayError::AuthRejected(msg) => AppError::Auth(msg),
        }
    }
}

/// The backend collaborator. Implementations live in the host application;
/// this crate only relies on the contract.
#[async_trait]
pub trait BackendGateway: Send + Sync {
    /// Submits one scan, keyed by `record.id` for server-side dedup.
    async fn submit_scan(&self, record: &QueueRecord) -> Result<SubmitAck, GatewayError>;

    /// One-shot attendance snapshot used to seed the cache on startup.
    async fn fetch_attendance(&self) -> Result<Vec<AttendanceEntry>, GatewayError>;

    async fn reauthenticate(&self, credentials: &Credentials) -> Result<Session, GatewayError>;
}
