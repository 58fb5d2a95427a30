//! Non-Windows [`WindowInspector`].
//!
//! There is no portable foreground-window API, so window queries report
//! nothing. The process table is read from `/proc` where it exists, which
//! keeps browser presence tracking and the process watcher working.

use super::{ProcessEntry, WindowInspector, WindowSnapshot};
use crate::store::WindowHandle;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct ProcfsInspector {
    root: PathBuf,
}

impl Default for ProcfsInspector {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcfsInspector {
    pub fn new() -> Self {
        Self::with_root("/proc")
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn comm(&self, pid: u32) -> Option<String> {
        read_trimmed(&self.root.join(pid.to_string()).join("comm"))
    }
}

fn read_trimmed(path: &Path) -> Option<String> {
    let raw = fs::read_to_string(path).ok()?;
    let value = raw.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl WindowInspector for ProcfsInspector {
    fn foreground_window(&self) -> Option<WindowHandle> {
        None
    }

    fn is_visible(&self, _handle: WindowHandle) -> bool {
        false
    }

    fn title(&self, _handle: WindowHandle) -> String {
        String::new()
    }

    fn owning_process_id(&self, _handle: WindowHandle) -> u32 {
        0
    }

    fn enumerate_windows(&self, _process_ids: &HashSet<u32>) -> Vec<WindowSnapshot> {
        Vec::new()
    }

    fn process_name(&self, pid: u32) -> Option<String> {
        self.comm(pid)
    }

    fn process_path(&self, pid: u32) -> Option<String> {
        fs::read_link(self.root.join(pid.to_string()).join("exe"))
            .ok()
            .map(|p| p.display().to_string())
    }

    fn processes(&self) -> Vec<ProcessEntry> {
        let Ok(entries) = fs::read_dir(&self.root) else {
            return Vec::new();
        };

        entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().to_str()?.parse::<u32>().ok())
            .filter_map(|pid| Some(ProcessEntry { pid, name: self.comm(pid)? }))
            .collect()
    }
}
