//! OS seams of the monitor.
//!
//! [`WindowInspector`] answers point-in-time questions about windows and
//! processes; [`ProcessEventSource`] pushes process start/stop
//! notifications. Both fail soft. The engine only talks to these traits,
//! so trackers can be driven by the scripted fakes in tests.

pub mod watcher;

#[cfg(windows)]
pub mod win32;

#[cfg(not(windows))]
pub mod fallback;

#[cfg(test)]
pub mod fake;

pub use watcher::ProcessWatcher;

#[cfg(windows)]
pub use win32::Win32Inspector as NativeInspector;

#[cfg(not(windows))]
pub use fallback::ProcfsInspector as NativeInspector;

use crate::error::Result;
use crate::store::{ProcessInfo, WindowHandle};
use std::collections::HashSet;
use std::sync::Arc;

/// A visible, titled window as seen during one poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowSnapshot {
    pub handle: WindowHandle,
    pub title: String,
    pub class_name: String,
}

/// One row of the process table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEntry {
    pub pid: u32,
    /// Executable name as reported by the OS (may carry `.exe`).
    pub name: String,
}

/// Lowercase executable name without a trailing `.exe`.
pub fn normalize_process_name(name: &str) -> String {
    let lower = name.trim().to_lowercase();
    match lower.strip_suffix(".exe") {
        Some(stem) => stem.to_string(),
        None => lower,
    }
}

/// Executable name without a trailing `.exe`, case preserved.
pub fn display_process_name(name: &str) -> String {
    let trimmed = name.trim();
    let cut = trimmed.len().saturating_sub(4);
    if trimmed.len() > 4
        && trimmed.is_char_boundary(cut)
        && trimmed[cut..].eq_ignore_ascii_case(".exe")
    {
        trimmed[..cut].to_string()
    } else {
        trimmed.to_string()
    }
}

/// Stateless OS window/process introspection.
///
/// Every method fails soft: errors surface as `None`, `0`, `false` or an
/// empty collection.
pub trait WindowInspector: Send + Sync {
    fn foreground_window(&self) -> Option<WindowHandle>;

    fn is_visible(&self, handle: WindowHandle) -> bool;

    fn title(&self, handle: WindowHandle) -> String;

    /// `0` when the owner cannot be determined.
    fn owning_process_id(&self, handle: WindowHandle) -> u32;

    /// Visible, non-empty-titled windows owned by any of `process_ids`.
    fn enumerate_windows(&self, process_ids: &HashSet<u32>) -> Vec<WindowSnapshot>;

    fn process_name(&self, pid: u32) -> Option<String>;

    fn process_path(&self, pid: u32) -> Option<String>;

    fn processes(&self) -> Vec<ProcessEntry>;
}

/// A process start or stop notification.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessEvent {
    Started(ProcessInfo),
    Stopped(ProcessInfo),
}

/// Callback invoked from the event source's own thread.
pub type ProcessEventHandler = Arc<dyn Fn(ProcessEvent) + Send + Sync>;

/// Asynchronous process start/stop notifications.
pub trait ProcessEventSource: Send {
    /// Starts delivering events to `handler`.
    fn subscribe(&mut self, handler: ProcessEventHandler) -> Result<()>;

    /// Stops delivery. Once this returns no further callbacks run.
    /// Calling it while unsubscribed is a no-op.
    fn unsubscribe(&mut self);

    fn is_subscribed(&self) -> bool;
}
