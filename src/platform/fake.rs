//! Scripted platform doubles for tests.

use super::{
    ProcessEntry, ProcessEvent, ProcessEventHandler, ProcessEventSource, WindowInspector,
    WindowSnapshot,
};
use crate::error::{MonitorError, Result};
use crate::store::WindowHandle;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
struct FakeWindow {
    pid: u32,
    title: String,
    class_name: String,
    visible: bool,
}

#[derive(Debug, Default)]
struct FakeState {
    foreground: Option<WindowHandle>,
    windows: BTreeMap<isize, FakeWindow>,
    processes: BTreeMap<u32, String>,
    paths: HashMap<u32, String>,
}

/// In-memory window manager and process table.
#[derive(Debug, Default)]
pub struct FakeInspector {
    state: Mutex<FakeState>,
}

impl FakeInspector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_process(&self, pid: u32, name: &str) {
        self.state.lock().unwrap().processes.insert(pid, name.to_string());
    }

    /// Removes the process and every window it owns.
    pub fn remove_process(&self, pid: u32) {
        let mut state = self.state.lock().unwrap();
        state.processes.remove(&pid);
        state.windows.retain(|_, w| w.pid != pid);
    }

    pub fn set_path(&self, pid: u32, path: &str) {
        self.state.lock().unwrap().paths.insert(pid, path.to_string());
    }

    pub fn add_window(&self, handle: isize, pid: u32, title: &str) {
        self.state.lock().unwrap().windows.insert(
            handle,
            FakeWindow {
                pid,
                title: title.to_string(),
                class_name: "FakeWindowClass".to_string(),
                visible: true,
            },
        );
    }

    pub fn set_title(&self, handle: isize, title: &str) {
        if let Some(w) = self.state.lock().unwrap().windows.get_mut(&handle) {
            w.title = title.to_string();
        }
    }

    pub fn set_class(&self, handle: isize, class_name: &str) {
        if let Some(w) = self.state.lock().unwrap().windows.get_mut(&handle) {
            w.class_name = class_name.to_string();
        }
    }

    pub fn set_visible(&self, handle: isize, visible: bool) {
        if let Some(w) = self.state.lock().unwrap().windows.get_mut(&handle) {
            w.visible = visible;
        }
    }

    pub fn remove_window(&self, handle: isize) {
        self.state.lock().unwrap().windows.remove(&handle);
    }

    pub fn focus(&self, handle: Option<isize>) {
        self.state.lock().unwrap().foreground = handle.map(WindowHandle);
    }
}

impl WindowInspector for FakeInspector {
    fn foreground_window(&self) -> Option<WindowHandle> {
        self.state.lock().unwrap().foreground
    }

    fn is_visible(&self, handle: WindowHandle) -> bool {
        self.state
            .lock()
            .unwrap()
            .windows
            .get(&handle.0)
            .is_some_and(|w| w.visible)
    }

    fn title(&self, handle: WindowHandle) -> String {
        self.state
            .lock()
            .unwrap()
            .windows
            .get(&handle.0)
            .map(|w| w.title.clone())
            .unwrap_or_default()
    }

    fn owning_process_id(&self, handle: WindowHandle) -> u32 {
        self.state
            .lock()
            .unwrap()
            .windows
            .get(&handle.0)
            .map(|w| w.pid)
            .unwrap_or(0)
    }

    fn enumerate_windows(&self, process_ids: &HashSet<u32>) -> Vec<WindowSnapshot> {
        self.state
            .lock()
            .unwrap()
            .windows
            .iter()
            .filter(|(_, w)| process_ids.contains(&w.pid) && w.visible && !w.title.is_empty())
            .map(|(h, w)| WindowSnapshot {
                handle: WindowHandle(*h),
                title: w.title.clone(),
                class_name: w.class_name.clone(),
            })
            .collect()
    }

    fn process_name(&self, pid: u32) -> Option<String> {
        self.state.lock().unwrap().processes.get(&pid).cloned()
    }

    fn process_path(&self, pid: u32) -> Option<String> {
        self.state.lock().unwrap().paths.get(&pid).cloned()
    }

    fn processes(&self) -> Vec<ProcessEntry> {
        self.state
            .lock()
            .unwrap()
            .processes
            .iter()
            .map(|(pid, name)| ProcessEntry {
                pid: *pid,
                name: name.clone(),
            })
            .collect()
    }
}

/// Event source whose events are emitted by the test itself.
pub struct FakeEventSource {
    handler: Arc<Mutex<Option<ProcessEventHandler>>>,
    fail_subscribe: bool,
}

/// Test-side handle of a [`FakeEventSource`].
#[derive(Clone)]
pub struct FakeEmitter {
    handler: Arc<Mutex<Option<ProcessEventHandler>>>,
}

impl FakeEventSource {
    pub fn new() -> (Self, FakeEmitter) {
        let handler = Arc::new(Mutex::new(None));
        (
            Self {
                handler: Arc::clone(&handler),
                fail_subscribe: false,
            },
            FakeEmitter { handler },
        )
    }

    /// A source whose `subscribe` always fails.
    pub fn failing() -> Self {
        Self {
            handler: Arc::new(Mutex::new(None)),
            fail_subscribe: true,
        }
    }
}

impl FakeEmitter {
    /// Delivers the event synchronously. Returns false when nobody is
    /// subscribed.
    pub fn emit(&self, event: ProcessEvent) -> bool {
        let handler = self.handler.lock().unwrap().clone();
        match handler {
            Some(handler) => {
                handler(event);
                true
            }
            None => false,
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.handler.lock().unwrap().is_some()
    }
}

impl ProcessEventSource for FakeEventSource {
    fn subscribe(&mut self, handler: ProcessEventHandler) -> Result<()> {
        if self.fail_subscribe {
            return Err(MonitorError::EventSource("scripted failure".to_string()));
        }
        let mut slot = self.handler.lock().unwrap();
        if slot.is_some() {
            return Err(MonitorError::AlreadySubscribed);
        }
        *slot = Some(handler);
        Ok(())
    }

    fn unsubscribe(&mut self) {
        self.handler.lock().unwrap().take();
    }

    fn is_subscribed(&self) -> bool {
        self.handler.lock().unwrap().is_some()
    }
}
