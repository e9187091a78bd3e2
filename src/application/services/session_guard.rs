use crate::application::ports::backend_gateway::BackendGateway;
use crate::application::ports::queue_store::QueueStore;
use crate::application::ports::secure_storage::SecureStorage;
use crate::domain::entities::{Credentials, Session};
use crate::shared::error::AppError;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

pub const SESSION_TOKEN_KEY: &str = "session_token";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Active,
    /// Session expired while unsynced records exist. Sync is paused and
    /// destructive sign-out paths are blocked until re-authentication.
    ExpiredBlocked,
}

/// Intercepts session expiry while the queue still holds unsynced work.
///
/// While blocked, no sign-out routine that clears local state may run; the
/// queue is never mutated by the guard itself, so a recovery cycle leaves
/// its contents untouched.
pub struct SessionGuard {
    queue: Arc<dyn QueueStore>,
    gateway: Arc<dyn BackendGateway>,
    secure_storage: Arc<dyn SecureStorage>,
    state_tx: watch::Sender<SessionState>,
}

impl SessionGuard {
    pub fn new(
        queue: Arc<dyn QueueStore>,
        gateway: Arc<dyn BackendGateway>,
        secure_storage: Arc<dyn SecureStorage>,
    ) -> Self {
        let (state_tx, _rx) = watch::channel(SessionState::Active);
        Self {
            queue,
            gateway,
            secure_storage,
            state_tx,
        }
    }

    pub fn state(&self) -> SessionState {
        *self.state_tx.borrow()
    }

    /// The rendering shell subscribes to raise and drop the blocking
    /// re-authentication prompt.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    pub fn is_blocked(&self) -> bool {
        self.state() == SessionState::ExpiredBlocked
    }

    /// Called by the orchestrator when the backend reports an expired
    /// session. Engages only while unsynced records exist; with an empty
    /// queue the ordinary sign-out/re-login flow outside this engine is
    /// sufficient.
    pub async fn on_session_expired(&self) -> Result<SessionState, AppError> {
        if self.queue.has_unsynced().await? {
            warn!("Session expired with unsynced records; blocking sign-out until re-auth");
            self.state_tx.send_replace(SessionState::ExpiredBlocked);
            Ok(SessionState::ExpiredBlocked)
        } else {
            Ok(SessionState::Active)
        }
    }

    /// Re-validates credentials against the backend, persists the renewed
    /// token and unblocks. The caller resumes the orchestrator afterwards.
    pub async fn reauthenticate(&self, credentials: &Credentials) -> Result<Session, AppError> {
        let session = self
            .gateway
            .reauthenticate(credentials)
            .await
            .map_err(AppError::from)?;

        self.secure_storage
            .store(SESSION_TOKEN_KEY, &session.access_token)
            .await?;

        self.state_tx.send_replace(SessionState::Active);
        info!("Session renewed; sync may resume");
        Ok(session)
    }

    /// Gate for any destructive sign-out path: local state may only be
    /// cleared when nothing unsynced remains and the guard is not engaged.
    pub async fn can_clear_local_state(&self) -> Result<bool, AppError> {
        Ok(!self.is_blocked() && !self.queue.has_unsynced().await?)
    }

    /// Ordinary sign-out. Refuses while local state must be preserved.
    pub async fn sign_out(&self) -> Result<(), AppError> {
        if !self.can_clear_local_state().await? {
            return Err(AppError::Auth(
                "Cannot sign out while unsynced records exist".to_string(),
            ));
        }
        self.secure_storage.delete(SESSION_TOKEN_KEY).await?;
        Ok(())
    }

    /// Token restored at startup, if any.
    pub async fn persisted_session(&self) -> Result<Option<String>, AppError> {
        self.secure_storage
            .retrieve(SESSION_TOKEN_KEY)
            .await
            .map_err(AppError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::backend_gateway::{GatewayError, SubmitAck};
    use crate::domain::entities::{AttendanceEntry, QueueRecord, ScanEvent};
    use crate::domain::value_objects::{BucketId, PickerId, RecordId, ScanKind};
    use crate::infrastructure::database::{ConnectionPool, SqliteQueueStore};
    use async_trait::async_trait;
    use chrono::Utc;
    use mockall::mock;
    use std::collections::HashMap;
    use std::sync::Mutex;

    mock! {
        pub Gateway {}

        #[async_trait]
        impl BackendGateway for Gateway {
            async fn submit_scan(&self, record: &QueueRecord) -> Result<SubmitAck, GatewayError>;
            async fn fetch_attendance(&self) -> Result<Vec<AttendanceEntry>, GatewayError>;
            async fn reauthenticate(&self, credentials: &Credentials) -> Result<Session, GatewayError>;
        }
    }

    #[derive(Default)]
    struct MemorySecureStorage {
        values: Mutex<HashMap<String, String>>,
    }

    #[async_trait]
    impl SecureStorage for MemorySecureStorage {
        async fn store(
            &self,
            key: &str,
            value: &str,
        ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            self.values
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn retrieve(
            &self,
            key: &str,
        ) -> Result<Option<String>, Box<dyn std::error::Error + Send + Sync>> {
            Ok(self.values.lock().unwrap().get(key).cloned())
        }

        async fn delete(
            &self,
            key: &str,
        ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            self.values.lock().unwrap().remove(key);
            Ok(())
        }

        async fn exists(
            &self,
            key: &str,
        ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
            Ok(self.values.lock().unwrap().contains_key(key))
        }
    }

    async fn setup(gateway: MockGateway) -> (SessionGuard, Arc<dyn QueueStore>) {
        let pool = ConnectionPool::from_memory().await.unwrap();
        pool.migrate().await.unwrap();
        let queue: Arc<dyn QueueStore> =
            Arc::new(SqliteQueueStore::new(pool.get_pool().clone()));
        let guard = SessionGuard::new(
            queue.clone(),
            Arc::new(gateway),
            Arc::new(MemorySecureStorage::default()),
        );
        (guard, queue)
    }

    async fn enqueue_one(queue: &Arc<dyn QueueStore>) -> RecordId {
        let event = ScanEvent::new(
            PickerId::new("p1".into()).unwrap(),
            BucketId::new("b1".into()).unwrap(),
            ScanKind::Pick,
            Utc::now(),
        );
        let record = QueueRecord::draft(RecordId::generate(), event, Utc::now());
        queue.enqueue(&record).await.unwrap();
        record.id
    }

    #[tokio::test]
    async fn expiry_with_empty_queue_does_not_engage() {
        let (guard, _queue) = setup(MockGateway::new()).await;

        assert_eq!(
            guard.on_session_expired().await.unwrap(),
            SessionState::Active
        );
        assert!(!guard.is_blocked());
        assert!(guard.can_clear_local_state().await.unwrap());
    }

    #[tokio::test]
    async fn expiry_with_pending_work_blocks_destructive_paths() {
        let (guard, queue) = setup(MockGateway::new()).await;
        enqueue_one(&queue).await;

        assert_eq!(
            guard.on_session_expired().await.unwrap(),
            SessionState::ExpiredBlocked
        );
        assert!(guard.is_blocked());
        assert!(!guard.can_clear_local_state().await.unwrap());
        assert!(guard.sign_out().await.is_err());
    }

    #[tokio::test]
    async fn reauthentication_unblocks_and_persists_token() {
        let mut gateway = MockGateway::new();
        gateway
            .expect_reauthenticate()
            .times(1)
            .returning(|_| Ok(Session::new("fresh-token".into(), None)));
        let (guard, queue) = setup(gateway).await;
        enqueue_one(&queue).await;

        guard.on_session_expired().await.unwrap();
        let mut state_rx = guard.subscribe();
        assert_eq!(*state_rx.borrow_and_update(), SessionState::ExpiredBlocked);

        let credentials = Credentials::new("field@orchard".into(), "secret".into());
        guard.reauthenticate(&credentials).await.unwrap();

        assert!(!guard.is_blocked());
        assert_eq!(*state_rx.borrow_and_update(), SessionState::Active);
        assert_eq!(
            guard.persisted_session().await.unwrap(),
            Some("fresh-token".to_string())
        );
        // The queue was never touched by the recovery cycle.
        assert_eq!(queue.counts().await.unwrap().pending, 1);
    }

    #[tokio::test]
    async fn failed_reauthentication_stays_blocked() {
        let mut gateway = MockGateway::new();
        gateway
            .expect_reauthenticate()
            .times(1)
            .returning(|_| Err(GatewayError::AuthRejected("bad password".into())));
        let (guard, queue) = setup(gateway).await;
        enqueue_one(&queue).await;

        guard.on_session_expired().await.unwrap();
        let credentials = Credentials::new("field@orchard".into(), "wrong".into());
        assert!(guard.reauthenticate(&credentials).await.is_err());
        assert!(guard.is_blocked());
    }
}
