//! spate-core — session metering types and configuration.
//! All other spate crates depend on this one.

pub mod config;
pub mod meter;

pub use meter::{now_millis, Direction, MeterSnapshot, SessionMeter};
