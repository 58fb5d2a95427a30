//! Error types for the monitoring engine.
//!
//! Only startup can fail outward. Everything that happens after a
//! successful [`Monitor::start`](crate::monitor::Monitor::start) is
//! logged and swallowed.

use thiserror::Error;

/// Errors surfaced to the host.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("failed to start the poll timer: {0}")]
    Timer(#[source] std::io::Error),

    #[error("failed to subscribe to process events: {0}")]
    EventSource(String),

    #[error("process event source is already subscribed")]
    AlreadySubscribed,

    #[error("monitor has been disposed")]
    Disposed,

    #[error("invalid configuration value for {key}: {reason}")]
    Config { key: &'static str, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MonitorError>;
