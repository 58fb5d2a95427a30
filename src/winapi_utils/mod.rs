//! Safe wrappers around Windows API calls.
//!
//! This module provides safe Rust abstractions over unsafe WinAPI functions
//! for window enumeration and process information.

pub mod process;
pub mod window;

pub use process::*;
pub use window::*;
