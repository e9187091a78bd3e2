use crate::application::ports::queue_store::{EnqueueOutcome, QueueStore};
use crate::application::services::attendance_service::AttendanceService;
use crate::application::services::status::QueueStatusChannel;
use crate::domain::entities::{QueueRecord, ScanEvent};
use crate::domain::value_objects::{BucketId, PickerId, RecordId, ScanKind};
use crate::shared::error::AppError;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct CaptureParams {
    pub picker_id: PickerId,
    pub bucket_id: BucketId,
    pub kind: ScanKind,
    /// Local capture time; defaults to now.
    pub scanned_at: Option<DateTime<Utc>>,
    /// Caller-supplied id for capture-level retries. A retried capture with
    /// the same id and payload is a no-op returning the same id.
    pub client_id: Option<RecordId>,
}

/// The boundary the rendering layer records events through. Validates
/// against the attendance cache, then writes to the durable queue. Never
/// waits on the network, online or offline.
pub struct CaptureService {
    attendance: AttendanceService,
    queue: Arc<dyn QueueStore>,
    status: Arc<QueueStatusChannel>,
}

impl CaptureService {
    pub fn new(
        attendance: AttendanceService,
        queue: Arc<dyn QueueStore>,
        status: Arc<QueueStatusChannel>,
    ) -> Self {
        Self {
            attendance,
            queue,
            status,
        }
    }

    pub async fn capture_scan(&self, params: CaptureParams) -> Result<RecordId, AppError> {
        // Fail closed: a picker the cache has never seen is not checked in.
        if !self.attendance.is_checked_in(&params.picker_id).await {
            return Err(AppError::NotCheckedIn(params.picker_id.to_string()));
        }

        let now = Utc::now();
        let id = params.client_id.unwrap_or_else(RecordId::generate);
        let event = ScanEvent::new(
            params.picker_id,
            params.bucket_id,
            params.kind,
            params.scanned_at.unwrap_or(now),
        );
        let record = QueueRecord::draft(id.clone(), event, now);

        match self.queue.enqueue(&record).await? {
            EnqueueOutcome::Inserted => {
                debug!("Captured scan {} for {}", id, record.event.picker_id);
            }
            EnqueueOutcome::Duplicate => {
                debug!("Capture retry for {} already queued", id);
            }
        }

        if let Err(e) = self.status.refresh().await {
            warn!("Failed to refresh queue counts after capture: {}", e);
        }

        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::attendance_store::AttendanceStore;
    use crate::application::ports::backend_gateway::{BackendGateway, GatewayError, SubmitAck};
    use crate::domain::entities::{AttendanceEntry, AttendanceEvent, Credentials, Session};
    use crate::domain::value_objects::RecordState;
    use crate::infrastructure::database::{
        ConnectionPool, SqliteAttendanceStore, SqliteQueueStore,
    };
    use async_trait::async_trait;
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

    async fn setup() -> (CaptureService, Arc<dyn QueueStore>, AttendanceService) {
        let pool = ConnectionPool::from_memory().await.unwrap();
        pool.migrate().await.unwrap();

        let queue: Arc<dyn QueueStore> =
            Arc::new(SqliteQueueStore::new(pool.get_pool().clone()));
        let attendance_store: Arc<dyn AttendanceStore> =
            Arc::new(SqliteAttendanceStore::new(pool.get_pool().clone()));

        let mut gateway = MockGateway::new();
        gateway.expect_fetch_attendance().never();
        let attendance = AttendanceService::new(attendance_store, Arc::new(gateway));
        let status = Arc::new(QueueStatusChannel::new(queue.clone()));

        let capture = CaptureService::new(attendance.clone(), queue.clone(), status);
        (capture, queue, attendance)
    }

    fn params(picker: &str, bucket: &str) -> CaptureParams {
        CaptureParams {
            picker_id: PickerId::new(picker.into()).unwrap(),
            bucket_id: BucketId::new(bucket.into()).unwrap(),
            kind: ScanKind::Pick,
            scanned_at: None,
            client_id: None,
        }
    }

    async fn check_in(attendance: &AttendanceService, picker: &str) {
        attendance
            .apply_event(AttendanceEvent::new(
                PickerId::new(picker.into()).unwrap(),
                true,
                Utc::now(),
            ))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn capture_rejects_unknown_picker() {
        let (capture, queue, _attendance) = setup().await;

        let err = capture.capture_scan(params("ghost", "b1")).await.unwrap_err();
        assert!(matches!(err, AppError::NotCheckedIn(_)));
        assert!(queue.list_pending().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn capture_rejects_checked_out_picker() {
        let (capture, _queue, attendance) = setup().await;
        attendance
            .apply_event(AttendanceEvent::new(
                PickerId::new("p1".into()).unwrap(),
                false,
                Utc::now(),
            ))
            .await
            .unwrap();

        let err = capture.capture_scan(params("p1", "b1")).await.unwrap_err();
        assert!(matches!(err, AppError::NotCheckedIn(_)));
    }

    #[tokio::test]
    async fn capture_enqueues_pending_record() {
        let (capture, queue, attendance) = setup().await;
        check_in(&attendance, "p1").await;

        let id = capture.capture_scan(params("p1", "b1")).await.unwrap();

        let record = queue.get(&id).await.unwrap().unwrap();
        assert_eq!(record.state, RecordState::Pending);
        assert_eq!(record.attempt_count, 0);
        assert_eq!(record.event.bucket_id.as_str(), "b1");
    }

    #[tokio::test]
    async fn retried_capture_with_client_id_is_idempotent() {
        let (capture, queue, attendance) = setup().await;
        check_in(&attendance, "p1").await;

        // A UI retry resends the same scan: same id, same capture moment.
        let client_id = RecordId::generate();
        let scanned_at = Utc::now();
        let mut first = params("p1", "b1");
        first.client_id = Some(client_id.clone());
        first.scanned_at = Some(scanned_at);
        let mut second = params("p1", "b1");
        second.client_id = Some(client_id.clone());
        second.scanned_at = Some(scanned_at);

        let id_a = capture.capture_scan(first).await.unwrap();
        let id_b = capture.capture_scan(second).await.unwrap();

        assert_eq!(id_a, id_b);
        assert_eq!(queue.list_pending().await.unwrap().len(), 1);
    }
}
