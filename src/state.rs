use crate::application::ports::attendance_feed::AttendanceFeed;
use crate::application::ports::backend_gateway::BackendGateway;
use crate::application::ports::queue_store::QueueStore;
use crate::application::ports::secure_storage::SecureStorage;
use crate::application::services::{
    AttendanceService, CaptureService, DeadLetterService, QueueStatusChannel, RetryPolicy,
    SessionGuard, SyncService,
};
use crate::infrastructure::database::{
    ConnectionPool, SqliteAttendanceStore, SqliteQueueStore,
};
use crate::presentation::handlers::{
    CaptureHandler, DeadLetterHandler, SessionHandler, SyncHandler,
};
use crate::shared::error::AppError;
use crate::shared::{AppConfig, JitterScheduler};
use chrono::{Duration, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// The fully wired engine. Everything is constructed here, dependency
/// injected, and torn down in `shutdown`; no process-wide singletons.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub pool: ConnectionPool,
    pub queue: Arc<dyn QueueStore>,
    pub attendance: AttendanceService,
    pub capture_service: Arc<CaptureService>,
    pub sync_service: Arc<SyncService>,
    pub dead_letter_service: Arc<DeadLetterService>,
    pub session_guard: Arc<SessionGuard>,
    pub capture_handler: Arc<CaptureHandler>,
    pub sync_handler: Arc<SyncHandler>,
    pub dead_letter_handler: Arc<DeadLetterHandler>,
    pub session_handler: Arc<SessionHandler>,
}

impl AppState {
    /// Builds the engine. The backend gateway, realtime feed and secure
    /// storage are supplied by the host application.
    ///
    /// Startup order matters: migrations, then crash recovery (records
    /// stranded in flight go back to pending), then the attendance cache
    /// hydrates from its persisted snapshot before the one-shot seed fetch
    /// is even attempted, so validation works offline from the first frame.
    pub async fn new(
        config: AppConfig,
        gateway: Arc<dyn BackendGateway>,
        feed: Option<Arc<dyn AttendanceFeed>>,
        secure_storage: Arc<dyn SecureStorage>,
    ) -> anyhow::Result<Self> {
        config.validate().map_err(AppError::Configuration)?;

        let pool = match database_path(&config) {
            Some(path) => {
                ConnectionPool::open_file(&path, config.database.max_connections).await?
            }
            None => ConnectionPool::from_memory().await?,
        };
        pool.migrate().await?;

        let queue: Arc<dyn QueueStore> =
            Arc::new(SqliteQueueStore::new(pool.get_pool().clone()));
        let attendance_store = Arc::new(SqliteAttendanceStore::new(pool.get_pool().clone()));

        let recovered = queue.recover_in_flight().await?;
        if recovered > 0 {
            warn!(
                "Recovered {} records stranded in flight by a previous shutdown",
                recovered
            );
        }

        let cutoff = Utc::now() - Duration::seconds(config.sync.synced_retention as i64);
        let purged = queue.purge_synced(cutoff).await?;
        if purged > 0 {
            info!("Purged {} synced records from the audit trail", purged);
        }

        let attendance = AttendanceService::new(attendance_store, gateway.clone());
        attendance.hydrate().await?;
        if let Err(e) = attendance.seed().await {
            warn!(
                "Attendance seed fetch failed; continuing from the persisted snapshot: {}",
                e
            );
        }
        if let Some(feed) = feed {
            attendance.start_feed(feed).await?;
        }

        let status_channel = Arc::new(QueueStatusChannel::new(queue.clone()));
        status_channel.refresh().await?;

        let session_guard = Arc::new(SessionGuard::new(
            queue.clone(),
            gateway.clone(),
            secure_storage,
        ));

        let sync_service = Arc::new(SyncService::new(
            queue.clone(),
            gateway,
            session_guard.clone(),
            status_channel.clone(),
            JitterScheduler::from_max_ms(config.sync.reconnect_jitter_max_ms),
            RetryPolicy {
                max_attempts: config.sync.max_attempts,
            },
        ));
        if config.sync.auto_sync {
            sync_service.schedule_sync(config.sync.sync_interval).await;
        }

        let capture_service = Arc::new(CaptureService::new(
            attendance.clone(),
            queue.clone(),
            status_channel.clone(),
        ));
        let dead_letter_service =
            Arc::new(DeadLetterService::new(queue.clone(), status_channel));

        let capture_handler = Arc::new(CaptureHandler::new(capture_service.clone()));
        let sync_handler = Arc::new(SyncHandler::new(sync_service.clone()));
        let dead_letter_handler = Arc::new(DeadLetterHandler::new(
            dead_letter_service.clone(),
            sync_service.clone(),
        ));
        let session_handler = Arc::new(SessionHandler::new(
            session_guard.clone(),
            sync_service.clone(),
        ));

        info!("Sync engine initialized");

        Ok(Self {
            config,
            pool,
            queue,
            attendance,
            capture_service,
            sync_service,
            dead_letter_service,
            session_guard,
            capture_handler,
            sync_handler,
            dead_letter_handler,
            session_handler,
        })
    }

    pub async fn shutdown(&self) {
        self.sync_service.stop_scheduler().await;
        self.attendance.stop_feed().await;
        self.pool.close().await;
        info!("Sync engine shut down");
    }
}

/// Resolves the SQLite file behind `database.url`, rooted in the data dir
/// when relative. `sqlite::memory:` yields `None`.
fn database_path(config: &AppConfig) -> Option<PathBuf> {
    let raw = config
        .database
        .url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:");
    let raw = raw.split('?').next().unwrap_or(raw);
    if raw == ":memory:" || raw.is_empty() {
        return None;
    }

    let path = Path::new(raw);
    if path.is_absolute() {
        Some(path.to_path_buf())
    } else {
        Some(Path::new(&config.storage.data_dir).join(path))
    }
}
