//! hwinfo: Interactive terminal menu for probing and preparing macOS hardware.

pub mod error;
pub mod logging;
pub mod platform;
pub mod provider;
pub mod report;
pub mod tui;
pub mod types;
