pub mod ports;
pub mod services;

pub use services::{
    AttendanceService, CaptureService, DeadLetterService, SessionGuard, SyncService,
};
