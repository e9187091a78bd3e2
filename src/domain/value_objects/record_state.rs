use serde::{Deserialize, Serialize};

/// Lifecycle state of a queued scan.
///
/// Legal transitions: `Pending -> InFlight -> {Synced | Pending | Failed}`.
/// `Synced` is terminal; `Failed -> Pending` only via an explicit retry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordState {
    Pending,
    InFlight,
    Synced,
    Failed,
    Unknown(String),
}

impl RecordState {
    pub fn as_str(&self) -> &str {
        match self {
            RecordState::Pending => "pending",
            RecordState::InFlight => "in_flight",
            RecordState::Synced => "synced",
            RecordState::Failed => "failed",
            RecordState::Unknown(value) => value.as_str(),
        }
    }

    pub fn is_unsynced(&self) -> bool {
        !matches!(self, RecordState::Synced)
    }
}

impl From<&str> for RecordState {
    fn from(value: &str) -> Self {
        match value {
            "pending" => RecordState::Pending,
            "in_flight" => RecordState::InFlight,
            "synced" => RecordState::Synced,
            "failed" => RecordState::Failed,
            other => RecordState::Unknown(other.to_string()),
        }
    }
}
