pub mod config;
pub mod error;
pub mod jitter;

pub use config::AppConfig;
pub use error::{AppError, Result};
pub use jitter::JitterScheduler;
