pub mod bucket_id;
pub mod failure_reason;
pub mod picker_id;
pub mod record_id;
pub mod record_state;
pub mod scan_kind;

pub use bucket_id::BucketId;
pub use failure_reason::FailureReason;
pub use picker_id::PickerId;
pub use record_id::RecordId;
pub use record_state::RecordState;
pub use scan_kind::ScanKind;
