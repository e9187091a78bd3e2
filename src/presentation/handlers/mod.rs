pub mod capture_handler;
pub mod dead_letter_handler;
pub mod session_handler;
pub mod sync_handler;

pub use capture_handler::CaptureHandler;
pub use dead_letter_handler::DeadLetterHandler;
pub use session_handler::SessionHandler;
pub use sync_handler::SyncHandler;
