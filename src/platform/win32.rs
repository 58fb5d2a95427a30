//! Win32 implementation of [`WindowInspector`].

use super::{ProcessEntry, WindowInspector, WindowSnapshot};
use crate::store::WindowHandle;
use crate::winapi_utils::{
    enum_top_level_windows, get_class_name, get_foreground_window, get_process_name,
    get_process_path, get_window_text, get_window_thread_process_id, is_window_visible,
    list_processes,
};
use std::collections::HashSet;
use windows::Win32::Foundation::HWND;

#[derive(Debug, Default, Clone, Copy)]
pub struct Win32Inspector;

impl Win32Inspector {
    pub fn new() -> Self {
        Self
    }
}

fn hwnd(handle: WindowHandle) -> HWND {
    HWND(handle.0 as *mut std::ffi::c_void)
}

fn handle(hwnd: HWND) -> WindowHandle {
    WindowHandle(hwnd.0 as isize)
}

impl WindowInspector for Win32Inspector {
    fn foreground_window(&self) -> Option<WindowHandle> {
        get_foreground_window().map(handle)
    }

    fn is_visible(&self, handle: WindowHandle) -> bool {
        is_window_visible(hwnd(handle))
    }

    fn title(&self, handle: WindowHandle) -> String {
        get_window_text(hwnd(handle))
    }

    fn owning_process_id(&self, handle: WindowHandle) -> u32 {
        get_window_thread_process_id(hwnd(handle)).1
    }

    fn enumerate_windows(&self, process_ids: &HashSet<u32>) -> Vec<WindowSnapshot> {
        if process_ids.is_empty() {
            return Vec::new();
        }

        enum_top_level_windows()
            .into_iter()
            .filter(|&w| process_ids.contains(&get_window_thread_process_id(w).1))
            .filter(|&w| is_window_visible(w))
            .filter_map(|w| {
                let title = get_window_text(w);
                if title.is_empty() {
                    return None;
                }
                Some(WindowSnapshot {
                    handle: handle(w),
                    title,
                    class_name: get_class_name(w),
                })
            })
            .collect()
    }

    fn process_name(&self, pid: u32) -> Option<String> {
        if pid == 0 {
            return None;
        }
        get_process_name(pid)
    }

    fn process_path(&self, pid: u32) -> Option<String> {
        if pid == 0 {
            return None;
        }
        get_process_path(pid)
    }

    fn processes(&self) -> Vec<ProcessEntry> {
        list_processes()
            .into_iter()
            .map(|(pid, name)| ProcessEntry { pid, name })
            .collect()
    }
}
