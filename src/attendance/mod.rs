pub mod cutoff;
pub mod service;

pub use service::AttendanceService;
