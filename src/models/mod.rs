pub mod assignment;
pub mod certificate;
pub mod completion_log;
pub mod course;
pub mod progress;
pub mod quiz;
pub mod user;
