use crate::application::ports::backend_gateway::{BackendGateway, GatewayError, SubmitAck};
use crate::application::ports::queue_store::QueueStore;
use crate::application::services::session_guard::SessionGuard;
use crate::application::services::status::QueueStatusChannel;
use crate::domain::entities::QueueCounts;
use crate::domain::value_objects::FailureReason;
use crate::shared::error::AppError;
use crate::shared::jitter::JitterScheduler;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncTrigger {
    /// Transition from offline to online. The only trigger that jitters.
    Reconnected,
    Foregrounded,
    Interval,
    Manual,
}

impl SyncTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncTrigger::Reconnected => "reconnected",
            SyncTrigger::Foregrounded => "foregrounded",
            SyncTrigger::Interval => "interval",
            SyncTrigger::Manual => "manual",
        }
    }
}

/// Injectable promotion policy for transiently failing records.
/// `None` retries forever; `Some(n)` quarantines after the n-th attempt.
#[derive(Debug, Clone, Copy, Default)]
pub struct RetryPolicy {
    pub max_attempts: Option<u32>,
}

impl RetryPolicy {
    pub fn unlimited() -> Self {
        Self { max_attempts: None }
    }

    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: Some(max_attempts),
        }
    }

    pub fn is_exhausted(&self, attempt_count: u32) -> bool {
        self.max_attempts
            .map(|max| attempt_count >= max)
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncStatus {
    pub is_syncing: bool,
    pub last_sync: Option<DateTime<Utc>>,
    pub sync_errors: u32,
}

/// Outcome of one drain cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainSummary {
    pub synced: u32,
    pub quarantined: u32,
    pub requeued: u32,
    /// The cycle stopped early (transient failure, session expiry, or the
    /// device went offline mid-drain).
    pub halted: bool,
}

/// Drains the durable queue against the backend when connectivity and a
/// valid session are available.
///
/// At most one drain runs at a time; triggers arriving mid-drain coalesce
/// away, since the running cycle's successor will pick up anything newly
/// enqueued.
pub struct SyncService {
    queue: Arc<dyn QueueStore>,
    gateway: Arc<dyn BackendGateway>,
    guard: Arc<SessionGuard>,
    status_channel: Arc<QueueStatusChannel>,
    jitter: JitterScheduler,
    retry_policy: RetryPolicy,
    online: Arc<AtomicBool>,
    drain_lock: Arc<Mutex<()>>,
    status: Arc<RwLock<SyncStatus>>,
    scheduler: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl SyncService {
    pub fn new(
        queue: Arc<dyn QueueStore>,
        gateway: Arc<dyn BackendGateway>,
        guard: Arc<SessionGuard>,
        status_channel: Arc<QueueStatusChannel>,
        jitter: JitterScheduler,
        retry_policy: RetryPolicy,
    ) -> Self {
        Self {
            queue,
            gateway,
            guard,
            status_channel,
            jitter,
            retry_policy,
            online: Arc::new(AtomicBool::new(false)),
            drain_lock: Arc::new(Mutex::new(())),
            status: Arc::new(RwLock::new(SyncStatus {
                is_syncing: false,
                last_sync: None,
                sync_errors: 0,
            })),
            scheduler: Arc::new(Mutex::new(None)),
        }
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    /// Platform shell reports connectivity regained. Fires a jittered
    /// reconnect drain on the offline-to-online edge only.
    pub async fn notify_online(&self) -> Result<Option<DrainSummary>, AppError> {
        let was_online = self.online.swap(true, Ordering::SeqCst);
        if was_online {
            return Ok(None);
        }
        info!("Connectivity regained");
        self.handle_trigger(SyncTrigger::Reconnected).await
    }

    pub fn notify_offline(&self) {
        if self.online.swap(false, Ordering::SeqCst) {
            info!("Connectivity lost");
        }
    }

    /// Entry point for every drain trigger. Returns `None` when the trigger
    /// was skipped (offline, session blocked) or coalesced into a running
    /// drain.
    pub async fn handle_trigger(
        &self,
        trigger: SyncTrigger,
    ) -> Result<Option<DrainSummary>, AppError> {
        if !self.is_online() {
            debug!("Ignoring {} trigger while offline", trigger.as_str());
            return Ok(None);
        }
        if self.guard.is_blocked() {
            debug!(
                "Ignoring {} trigger while session recovery is pending",
                trigger.as_str()
            );
            return Ok(None);
        }

        let Ok(_drain_guard) = self.drain_lock.try_lock() else {
            debug!("Drain already running; coalescing {} trigger", trigger.as_str());
            return Ok(None);
        };

        {
            let mut status = self.status.write().await;
            status.is_syncing = true;
        }

        if trigger == SyncTrigger::Reconnected {
            // Stagger the reconnect burst: hundreds of devices regaining the
            // same access point must not drain in the same second.
            let delay = self.jitter.delay();
            debug!("Reconnect drain delayed by {}ms", delay.as_millis());
            tokio::time::sleep(delay).await;
        }

        let result = self.drain().await;

        let mut status = self.status.write().await;
        status.is_syncing = false;
        status.last_sync = Some(Utc::now());
        if result.is_err() {
            status.sync_errors += 1;
        }
        drop(status);

        result.map(Some)
    }

    async fn drain(&self) -> Result<DrainSummary, AppError> {
        let pending = self.queue.list_pending().await?;
        let mut summary = DrainSummary::default();
        if pending.is_empty() {
            return Ok(summary);
        }
        info!("Draining {} pending records", pending.len());

        for record in pending {
            if !self.is_online() {
                debug!("Went offline mid-drain; stopping");
                summary.halted = true;
                break;
            }
            if self.guard.is_blocked() {
                summary.halted = true;
                break;
            }

            let attempt = self.queue.mark_in_flight(&record.id).await?;

            match self.gateway.submit_scan(&record).await {
                Ok(ack) => {
                    if ack == SubmitAck::AlreadyCommitted {
                        debug!("Record {} already committed (idempotent replay)", record.id);
                    }
                    self.queue.mark_synced(&record.id).await?;
                    summary.synced += 1;
                }
                Err(GatewayError::Rejected(reason)) => {
                    // Permanent: quarantine and keep going; one rejected
                    // record must not block unrelated records.
                    warn!("Record {} permanently rejected: {}", record.id, reason);
                    self.queue.mark_failed(&record.id, &reason).await?;
                    summary.quarantined += 1;
                }
                Err(GatewayError::SessionExpired) => {
                    // Outcome unknown; the idempotency key makes the later
                    // retry safe either way.
                    self.queue.requeue(&record.id).await?;
                    warn!("Session expired mid-drain; escalating to recovery guard");
                    self.guard.on_session_expired().await?;
                    summary.halted = true;
                    break;
                }
                Err(GatewayError::Transient(msg)) | Err(GatewayError::AuthRejected(msg)) => {
                    if self.retry_policy.is_exhausted(attempt) {
                        warn!(
                            "Record {} exhausted {} delivery attempts; quarantining",
                            record.id, attempt
                        );
                        self.queue
                            .mark_failed(&record.id, &FailureReason::RetriesExhausted)
                            .await?;
                        summary.quarantined += 1;
                    } else {
                        // Requeue and stop: later records must not be
                        // attempted before this one eventually lands (FIFO).
                        debug!(
                            "Transient failure for record {} (attempt {}): {}",
                            record.id, attempt, msg
                        );
                        self.queue.requeue(&record.id).await?;
                        summary.requeued += 1;
                        summary.halted = true;
                    }
                    if summary.halted {
                        break;
                    }
                }
            }

            if let Err(e) = self.status_channel.refresh().await {
                warn!("Failed to refresh queue counts mid-drain: {}", e);
            }
        }

        if let Err(e) = self.status_channel.refresh().await {
            warn!("Failed to refresh queue counts after drain: {}", e);
        }

        info!(
            "Drain finished: {} synced, {} quarantined, {} requeued{}",
            summary.synced,
            summary.quarantined,
            summary.requeued,
            if summary.halted { " (halted)" } else { "" }
        );
        Ok(summary)
    }

    /// Periodic drain trigger while online.
    pub async fn schedule_sync(&self, interval_secs: u64) {
        let service = self.clone();
        let handle = tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(std::time::Duration::from_secs(interval_secs));
            // The first tick completes immediately; startup already drains.
            interval.tick().await;
            loop {
                interval.tick().await;
                if let Err(e) = service.handle_trigger(SyncTrigger::Interval).await {
                    tracing::error!("Scheduled sync failed: {}", e);
                }
            }
        });

        let mut scheduler = self.scheduler.lock().await;
        if let Some(previous) = scheduler.replace(handle) {
            previous.abort();
        }
    }

    pub async fn stop_scheduler(&self) {
        if let Some(handle) = self.scheduler.lock().await.take() {
            handle.abort();
        }
    }

    pub async fn get_status(&self) -> SyncStatus {
        self.status.read().await.clone()
    }

    pub fn subscribe_counts(&self) -> watch::Receiver<QueueCounts> {
        self.status_channel.subscribe()
    }
}

impl Clone for SyncService {
    fn clone(&self) -> Self {
        Self {
            queue: self.queue.clone(),
            gateway: self.gateway.clone(),
            guard: self.guard.clone(),
            status_channel: self.status_channel.clone(),
            jitter: self.jitter.clone(),
            retry_policy: self.retry_policy,
            online: self.online.clone(),
            drain_lock: self.drain_lock.clone(),
            status: self.status.clone(),
            scheduler: self.scheduler.clone(),
        }
    }
}
