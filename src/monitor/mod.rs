//! Activity tracking.
//!
//! [`Monitor`] drives the application [`SessionTracker`] and the
//! [`BrowserTracker`] from a tick thread and pushed process events.

pub mod browser_tracker;
pub mod classify;
pub mod engine;
pub mod session_tracker;

pub use browser_tracker::{BrowserTracker, VisitKey};
pub use engine::Monitor;
pub use session_tracker::SessionTracker;
