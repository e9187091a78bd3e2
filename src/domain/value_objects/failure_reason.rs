use serde::{Deserialize, Serialize};
use std::fmt;

/// Classified cause of a permanently failed record. Only ever set on
/// quarantined records; transient causes never produce one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    /// The picker was archived server-side after the scan was captured.
    PickerArchived,
    /// A row-level authorization rule rejected the write.
    RowLevelDenied,
    /// The event failed a server-side invariant.
    InvalidEvent,
    /// The injected retry policy ran out of transient attempts.
    RetriesExhausted,
    Unknown(String),
}

impl FailureReason {
    pub fn as_str(&self) -> &str {
        match self {
            FailureReason::PickerArchived => "picker_archived",
            FailureReason::RowLevelDenied => "row_level_denied",
            FailureReason::InvalidEvent => "invalid_event",
            FailureReason::RetriesExhausted => "retries_exhausted",
            FailureReason::Unknown(value) => value.as_str(),
        }
    }
}

impl From<&str> for FailureReason {
    fn from(value: &str) -> Self {
        match value {
            "picker_archived" => FailureReason::PickerArchived,
            "row_level_denied" => FailureReason::RowLevelDenied,
            "invalid_event" => FailureReason::InvalidEvent,
            "retries_exhausted" => FailureReason::RetriesExhausted,
            other => FailureReason::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
