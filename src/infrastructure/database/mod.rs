pub mod connection_pool;
pub mod rows;
pub mod sqlite_attendance_store;
pub mod sqlite_queue_store;

pub use connection_pool::{ConnectionPool, DbPool};
pub use sqlite_attendance_store::SqliteAttendanceStore;
pub use sqlite_queue_store::SqliteQueueStore;
