use crate::application::ports::attendance_feed::AttendanceFeed;
use crate::application::ports::attendance_store::AttendanceStore;
use crate::application::ports::backend_gateway::BackendGateway;
use crate::domain::entities::{AttendanceEntry, AttendanceEvent};
use crate::domain::value_objects::PickerId;
use crate::shared::error::AppError;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Serialize)]
pub struct AttendanceSnapshot {
    pub total: usize,
    pub checked_in: usize,
    pub last_updated_at: Option<DateTime<Utc>>,
}

/// Locally mirrored "who is checked in" state.
///
/// Answers validation questions from memory, never the network. A picker
/// absent from the cache is treated as not checked in: under-permitting
/// forces a retry once online, over-permitting produces records the backend
/// will reject after the fact.
pub struct AttendanceService {
    store: Arc<dyn AttendanceStore>,
    gateway: Arc<dyn BackendGateway>,
    entries: Arc<RwLock<HashMap<PickerId, AttendanceEntry>>>,
    feed_task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl AttendanceService {
    pub fn new(store: Arc<dyn AttendanceStore>, gateway: Arc<dyn BackendGateway>) -> Self {
        Self {
            store,
            gateway,
            entries: Arc::new(RwLock::new(HashMap::new())),
            feed_task: Arc::new(Mutex::new(None)),
        }
    }

    /// Cold-start hydration from the persisted snapshot, which is the last
    /// known server truth when the device wakes up offline.
    pub async fn hydrate(&self) -> Result<usize, AppError> {
        let persisted = self.store.load_all().await?;
        let mut entries = self.entries.write().await;
        entries.clear();
        for entry in persisted {
            entries.insert(entry.picker_id.clone(), entry);
        }
        debug!("Attendance cache hydrated with {} entries", entries.len());
        Ok(entries.len())
    }

    /// One-shot seed fetch from the backend, replacing memory and the
    /// persisted snapshot. After this the cache relies purely on the feed
    /// until the next cold start.
    pub async fn seed(&self) -> Result<usize, AppError> {
        let fetched = self.gateway.fetch_attendance().await.map_err(AppError::from)?;
        self.store.replace_all(&fetched).await?;

        let mut entries = self.entries.write().await;
        entries.clear();
        for entry in fetched {
            entries.insert(entry.picker_id.clone(), entry);
        }
        info!("Attendance cache seeded with {} entries", entries.len());
        Ok(entries.len())
    }

    pub async fn is_checked_in(&self, picker_id: &PickerId) -> bool {
        let entries = self.entries.read().await;
        entries
            .get(picker_id)
            .map(|entry| entry.is_checked_in)
            .unwrap_or(false)
    }

    /// Pure last-write-wins reducer. Returns the replacement entry, or
    /// `None` when the event is stale and must be ignored.
    pub fn reduce(
        current: Option<&AttendanceEntry>,
        event: &AttendanceEvent,
    ) -> Option<AttendanceEntry> {
        match current {
            Some(entry) if event.timestamp <= entry.last_updated_at => None,
            _ => Some(AttendanceEntry::new(
                event.picker_id.clone(),
                event.is_checked_in,
                event.timestamp,
            )),
        }
    }

    /// Applies one feed event to memory and the persisted snapshot.
    /// Returns whether the event was applied (false: stale, dropped).
    pub async fn apply_event(&self, event: AttendanceEvent) -> Result<bool, AppError> {
        let mut entries = self.entries.write().await;
        let updated = match Self::reduce(entries.get(&event.picker_id), &event) {
            Some(entry) => entry,
            None => {
                debug!("Stale attendance event for {} ignored", event.picker_id);
                return Ok(false);
            }
        };

        self.store.upsert(&updated).await?;
        entries.insert(updated.picker_id.clone(), updated);
        Ok(true)
    }

    /// Starts consuming the realtime feed. Replaces any previous
    /// subscription. The handler task owns the stream; capture never waits
    /// on it.
    pub async fn start_feed(&self, feed: Arc<dyn AttendanceFeed>) -> Result<(), AppError> {
        let mut stream = feed.subscribe().await?;
        let service = self.clone();

        let handle = tokio::spawn(async move {
            while let Some(event) = stream.next().await {
                if let Err(e) = service.apply_event(event).await {
                    error!("Failed to apply attendance event: {}", e);
                }
            }
            warn!("Attendance feed ended");
        });

        let mut task = self.feed_task.lock().await;
        if let Some(previous) = task.replace(handle) {
            previous.abort();
        }
        Ok(())
    }

    /// Explicit unsubscribe; part of engine teardown.
    pub async fn stop_feed(&self) {
        if let Some(handle) = self.feed_task.lock().await.take() {
            handle.abort();
        }
    }

    pub async fn snapshot(&self) -> AttendanceSnapshot {
        let entries = self.entries.read().await;
        AttendanceSnapshot {
            total: entries.len(),
            checked_in: entries.values().filter(|e| e.is_checked_in).count(),
            last_updated_at: entries.values().map(|e| e.last_updated_at).max(),
        }
    }
}

impl Clone for AttendanceService {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            gateway: self.gateway.clone(),
            entries: self.entries.clone(),
            feed_task: self.feed_task.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::attendance_feed::AttendanceStream;
    use crate::application::ports::backend_gateway::{GatewayError, SubmitAck};
    use crate::domain::entities::{Credentials, QueueRecord, Session};
    use crate::infrastructure::database::{ConnectionPool, SqliteAttendanceStore};
    use async_trait::async_trait;
    use chrono::Duration;
    use mockall::mock;

    mock! {
        pub Gateway {}

        #[async_trait]
        impl BackendGateway for Gateway {
            async fn submit_scan(&self, record: &QueueRecord) -> Result<SubmitAck, GatewayError>;
            async fn fetch_attendance(&self) -> Result<Vec<AttendanceEntry>, GatewayError>;
            async fn reauthenticate(&self, credentials: &Credentials) -> Result<Session, GatewayError>;
        }
    }

    fn picker(id: &str) -> PickerId {
        PickerId::new(id.into()).unwrap()
    }

    fn entry(id: &str, checked_in: bool, age_secs: i64) -> AttendanceEntry {
        AttendanceEntry::new(picker(id), checked_in, Utc::now() - Duration::seconds(age_secs))
    }

    fn event(id: &str, checked_in: bool, age_secs: i64) -> AttendanceEvent {
        AttendanceEvent::new(picker(id), checked_in, Utc::now() - Duration::seconds(age_secs))
    }

    async fn setup_service(gateway: MockGateway) -> AttendanceService {
        let pool = ConnectionPool::from_memory().await.unwrap();
        pool.migrate().await.unwrap();
        let store: Arc<dyn AttendanceStore> =
            Arc::new(SqliteAttendanceStore::new(pool.get_pool().clone()));
        AttendanceService::new(store, Arc::new(gateway))
    }

    #[test]
    fn reduce_applies_newer_events() {
        let current = entry("p1", true, 60);
        let newer = event("p1", false, 0);
        let reduced = AttendanceService::reduce(Some(&current), &newer).unwrap();
        assert!(!reduced.is_checked_in);
        assert_eq!(reduced.last_updated_at, newer.timestamp);
    }

    #[test]
    fn reduce_drops_stale_events() {
        let current = entry("p1", true, 0);
        let stale = event("p1", false, 60);
        assert!(AttendanceService::reduce(Some(&current), &stale).is_none());
    }

    #[test]
    fn reduce_accepts_events_for_unseen_pickers() {
        let fresh = event("p1", true, 0);
        let reduced = AttendanceService::reduce(None, &fresh).unwrap();
        assert!(reduced.is_checked_in);
    }

    #[tokio::test]
    async fn unknown_picker_is_not_checked_in() {
        let mut gateway = MockGateway::new();
        gateway.expect_fetch_attendance().never();
        let service = setup_service(gateway).await;

        assert!(!service.is_checked_in(&picker("nobody")).await);
    }

    #[tokio::test]
    async fn seed_replaces_cache_and_persists() {
        let mut gateway = MockGateway::new();
        gateway
            .expect_fetch_attendance()
            .times(1)
            .returning(|| Ok(vec![entry("p1", true, 0), entry("p2", false, 0)]));
        let service = setup_service(gateway).await;

        assert_eq!(service.seed().await.unwrap(), 2);
        assert!(service.is_checked_in(&picker("p1")).await);
        assert!(!service.is_checked_in(&picker("p2")).await);

        // A second instance over the same store sees the persisted snapshot.
        let fresh = service.clone();
        {
            let mut entries = fresh.entries.write().await;
            entries.clear();
        }
        assert_eq!(service.hydrate().await.unwrap(), 2);
        assert!(service.is_checked_in(&picker("p1")).await);
    }

    #[tokio::test]
    async fn failed_seed_keeps_cache_empty_and_fails_closed() {
        let mut gateway = MockGateway::new();
        gateway
            .expect_fetch_attendance()
            .times(1)
            .returning(|| Err(GatewayError::Transient("offline".into())));
        let service = setup_service(gateway).await;

        assert!(service.seed().await.is_err());
        assert!(!service.is_checked_in(&picker("p1")).await);
    }

    #[tokio::test]
    async fn apply_event_respects_last_write_wins() {
        let mut gateway = MockGateway::new();
        gateway.expect_fetch_attendance().never();
        let service = setup_service(gateway).await;

        assert!(service.apply_event(event("p1", true, 30)).await.unwrap());
        assert!(service.is_checked_in(&picker("p1")).await);

        // Stale check-out must not override the newer check-in.
        assert!(!service.apply_event(event("p1", false, 120)).await.unwrap());
        assert!(service.is_checked_in(&picker("p1")).await);

        assert!(service.apply_event(event("p1", false, 0)).await.unwrap());
        assert!(!service.is_checked_in(&picker("p1")).await);
    }

    struct ChannelFeed {
        rx: std::sync::Mutex<Option<tokio::sync::mpsc::Receiver<AttendanceEvent>>>,
    }

    #[async_trait]
    impl AttendanceFeed for ChannelFeed {
        async fn subscribe(&self) -> Result<AttendanceStream, AppError> {
            let rx = self
                .rx
                .lock()
                .unwrap()
                .take()
                .ok_or_else(|| AppError::Internal("already subscribed".into()))?;
            let stream = futures::stream::unfold(rx, |mut rx| async move {
                rx.recv().await.map(|event| (event, rx))
            });
            Ok(Box::pin(stream))
        }
    }

    #[tokio::test]
    async fn feed_events_update_the_cache() {
        let mut gateway = MockGateway::new();
        gateway.expect_fetch_attendance().never();
        let service = setup_service(gateway).await;

        let (tx, rx) = tokio::sync::mpsc::channel(8);
        let feed = Arc::new(ChannelFeed {
            rx: std::sync::Mutex::new(Some(rx)),
        });
        service.start_feed(feed).await.unwrap();

        tx.send(event("p1", true, 0)).await.unwrap();

        // The handler task applies the event shortly after delivery.
        for _ in 0..50 {
            if service.is_checked_in(&picker("p1")).await {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert!(service.is_checked_in(&picker("p1")).await);

        service.stop_feed().await;
    }
}
