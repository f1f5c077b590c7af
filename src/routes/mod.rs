pub mod assignment;
pub mod certificate;
pub mod health;
pub mod progress;
pub mod quiz;
