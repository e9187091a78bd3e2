use crate::application::services::sync_service::{DrainSummary, SyncService, SyncTrigger};
use crate::domain::entities::QueueCounts;
use crate::presentation::dto::sync::{
    ConnectivityRequest, SyncStatusResponse, TriggerSyncRequest, TriggerSyncResponse,
};
use crate::presentation::dto::Validate;
use crate::shared::error::AppError;
use std::sync::Arc;
use tokio::sync::watch;

pub struct SyncHandler {
    sync_service: Arc<SyncService>,
}

impl SyncHandler {
    pub fn new(sync_service: Arc<SyncService>) -> Self {
        Self { sync_service }
    }

    pub async fn trigger_sync(
        &self,
        request: TriggerSyncRequest,
    ) -> Result<TriggerSyncResponse, AppError> {
        request.validate().map_err(AppError::Validation)?;

        let trigger = match request.trigger.as_str() {
            "foregrounded" => SyncTrigger::Foregrounded,
            "interval" => SyncTrigger::Interval,
            _ => SyncTrigger::Manual,
        };

        let summary = self.sync_service.handle_trigger(trigger).await?;
        Ok(summary_response(summary))
    }

    /// Connectivity edge reported by the platform shell.
    pub async fn set_connectivity(
        &self,
        request: ConnectivityRequest,
    ) -> Result<TriggerSyncResponse, AppError> {
        if request.online {
            let summary = self.sync_service.notify_online().await?;
            Ok(summary_response(summary))
        } else {
            self.sync_service.notify_offline();
            Ok(summary_response(None))
        }
    }

    pub async fn status(&self) -> Result<SyncStatusResponse, AppError> {
        let status = self.sync_service.get_status().await;
        let counts = *self.sync_service.subscribe_counts().borrow();
        Ok(SyncStatusResponse {
            is_syncing: status.is_syncing,
            last_sync: status.last_sync.map(|t| t.timestamp_millis()),
            sync_errors: status.sync_errors,
            pending: counts.pending,
            in_flight: counts.in_flight,
            failed: counts.failed,
            synced: counts.synced,
        })
    }

    /// Live queue counts for the "N pending sync" indicator.
    pub fn subscribe_counts(&self) -> watch::Receiver<QueueCounts> {
        self.sync_service.subscribe_counts()
    }
}

fn summary_response(summary: Option<DrainSummary>) -> TriggerSyncResponse {
    match summary {
        Some(summary) => TriggerSyncResponse {
            started: true,
            synced: summary.synced,
            quarantined: summary.quarantined,
            requeued: summary.requeued,
            halted: summary.halted,
        },
        None => TriggerSyncResponse {
            started: false,
            synced: 0,
            quarantined: 0,
            requeued: 0,
            halted: false,
        },
    }
}
