pub mod config;
pub mod error;
pub mod geo;
pub mod telemetry;
pub mod workflows;
