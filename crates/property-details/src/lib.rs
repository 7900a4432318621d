pub mod config;
pub mod error;
pub mod property;
pub mod telemetry;
