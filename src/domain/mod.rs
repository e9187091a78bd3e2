pub mod entities;
pub mod value_objects;

pub use entities::{
    AttendanceEntry, AttendanceEvent, Credentials, DeadLetterEntry, QueueCounts, QueueRecord,
    ScanEvent, Session,
};
pub use value_objects::{BucketId, FailureReason, PickerId, RecordId, RecordState, ScanKind};
