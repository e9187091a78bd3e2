pub mod attendance_service;
pub mod capture_service;
pub mod dead_letter_service;
pub mod session_guard;
pub mod status;
pub mod sync_service;

pub use attendance_service::{AttendanceService, AttendanceSnapshot};
pub use capture_service::{CaptureParams, CaptureService};
pub use dead_letter_service::DeadLetterService;
pub use session_guard::{SessionGuard, SessionState, SESSION_TOKEN_KEY};
pub use status::QueueStatusChannel;
pub use sync_service::{DrainSummary, RetryPolicy, SyncService, SyncStatus, SyncTrigger};
