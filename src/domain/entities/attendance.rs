use crate::domain::value_objects::PickerId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Locally mirrored attendance state for one picker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceEntry {
    pub picker_id: PickerId,
    pub is_checked_in: bool,
    pub last_updated_at: DateTime<Utc>,
}

impl AttendanceEntry {
    pub fn new(picker_id: PickerId, is_checked_in: bool, last_updated_at: DateTime<Utc>) -> Self {
        Self {
            picker_id,
            is_checked_in,
            last_updated_at,
        }
    }
}

/// Attendance change delivered by the backend's realtime feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceEvent {
    pub picker_id: PickerId,
    pub is_checked_in: bool,
    pub timestamp: DateTime<Utc>,
}

impl AttendanceEvent {
    pub fn new(picker_id: PickerId, is_checked_in: bool, timestamp: DateTime<Utc>) -> Self {
        Self {
            picker_id,
            is_checked_in,
            timestamp,
        }
    }
}
