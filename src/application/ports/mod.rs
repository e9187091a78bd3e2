pub mod attendance_feed;
pub mod attendance_store;
pub mod backend_gateway;
pub mod queue_store;
pub mod secure_storage;

pub use attendance_feed::{AttendanceFeed, AttendanceStream};
pub use attendance_store::AttendanceStore;
pub use backend_gateway::{BackendGateway, GatewayError, SubmitAck};
pub use queue_store::{EnqueueOutcome, QueueStore};
pub use secure_storage::SecureStorage;
