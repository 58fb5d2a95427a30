//! actmon - foreground application and browser activity monitor.
//!
//! Tracks which application has focus and which pages are open in the
//! browsers, and writes human-readable, per-day logs.

pub mod config;
pub mod error;
pub mod logwriter;
pub mod monitor;
pub mod platform;
pub mod store;

#[cfg(windows)]
pub mod winapi_utils;

pub use config::MonitorConfig;
pub use error::{MonitorError, Result};
pub use monitor::Monitor;
