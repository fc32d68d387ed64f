pub mod config;
pub mod error;
pub mod export;
pub mod inputs;
pub mod map;
pub mod scoring;
pub mod telemetry;
