use crate::presentation::dto::Validate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerSyncRequest {
    /// One of "foregrounded", "interval", "manual".
    pub trigger: String,
}

impl Validate for TriggerSyncRequest {
    fn validate(&self) -> Result<(), String> {
        match self.trigger.as_str() {
            "foregrounded" | "interval" | "manual" => Ok(()),
            other => Err(format!("Unknown sync trigger: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerSyncResponse {
    /// False when the trigger was skipped or coalesced into a running drain.
    pub started: bool,
    pub synced: u32,
    pub quarantined: u32,
    pub requeued: u32,
    pub halted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectivityRequest {
    pub online: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncStatusResponse {
    pub is_syncing: bool,
    pub last_sync: Option<i64>,
    pub sync_errors: u32,
    pub pending: u64,
    pub in_flight: u64,
    pub failed: u64,
    pub synced: u64,
}
