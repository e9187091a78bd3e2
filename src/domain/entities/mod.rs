pub mod attendance;
pub mod dead_letter;
pub mod queue_record;
pub mod scan_event;
pub mod session;

pub use attendance::{AttendanceEntry, AttendanceEvent};
pub use dead_letter::DeadLetterEntry;
pub use queue_record::{QueueCounts, QueueRecord};
pub use scan_event::ScanEvent;
pub use session::{Credentials, Session};
