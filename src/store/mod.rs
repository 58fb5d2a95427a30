//! Session data types and aggregation.
//!
//! Trackers own the live data; this module only defines its shape and the
//! on-demand statistics computed from it.

pub mod aggregator;
pub mod types;

pub use aggregator::*;
pub use types::*;
