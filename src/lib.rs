pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
pub mod shared;
pub mod state;

pub use application::ports::attendance_feed::{AttendanceFeed, AttendanceStream};
pub use application::ports::backend_gateway::{BackendGateway, GatewayError, SubmitAck};
pub use application::ports::queue_store::{EnqueueOutcome, QueueStore};
pub use application::ports::secure_storage::SecureStorage;
pub use application::services::{
    AttendanceService, CaptureParams, CaptureService, DeadLetterService, DrainSummary,
    RetryPolicy, SessionGuard, SessionState, SyncService, SyncTrigger,
};
pub use domain::{
    AttendanceEntry, AttendanceEvent, BucketId, Credentials, DeadLetterEntry, FailureReason,
    PickerId, QueueCounts, QueueRecord, RecordId, RecordState, ScanEvent, ScanKind, Session,
};
pub use shared::{AppConfig, AppError, JitterScheduler, Result};
pub use state::AppState;

/// Installs the tracing subscriber. Call once from the host application.
pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "picktrack=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
