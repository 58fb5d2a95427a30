//! Window-related WinAPI wrappers.
//!
//! Provides safe abstractions for focus detection, window text and class
//! retrieval, visibility tests and top-level window enumeration.

use windows::Win32::Foundation::{BOOL, HWND, LPARAM};
use windows::Win32::UI::WindowsAndMessaging::{
    EnumWindows, GetClassNameW, GetForegroundWindow, GetWindowTextLengthW, GetWindowTextW,
    GetWindowThreadProcessId, IsWindowVisible,
};

/// Gets the handle of the currently focused (foreground) window.
///
/// Returns `None` if no window has focus (e.g., desktop is focused).
///
/// # Example
/// ```no_run
/// use actmon::winapi_utils::get_foreground_window;
///
/// if let Some(hwnd) = get_foreground_window() {
///     println!("Foreground window handle: {:?}", hwnd);
/// }
/// ```
pub fn get_foreground_window() -> Option<HWND> {
    let hwnd = unsafe { GetForegroundWindow() };
    if hwnd.0.is_null() {
        None
    } else {
        Some(hwnd)
    }
}

/// Gets the title text of a window.
///
/// Returns an empty string if the window has no title or if the call fails.
pub fn get_window_text(hwnd: HWND) -> String {
    unsafe {
        let len = GetWindowTextLengthW(hwnd);
        if len <= 0 {
            return String::new();
        }

        // Room for the null terminator
        let mut buffer: Vec<u16> = vec![0; (len + 1) as usize];

        let copied = GetWindowTextW(hwnd, &mut buffer);
        if copied <= 0 {
            return String::new();
        }

        String::from_utf16_lossy(&buffer[..copied as usize])
    }
}

/// Gets the window class name, empty on failure.
pub fn get_class_name(hwnd: HWND) -> String {
    let mut buffer: [u16; 256] = [0; 256];
    let copied = unsafe { GetClassNameW(hwnd, &mut buffer) };
    if copied <= 0 {
        return String::new();
    }
    String::from_utf16_lossy(&buffer[..copied as usize])
}

/// Whether the window has the WS_VISIBLE style.
pub fn is_window_visible(hwnd: HWND) -> bool {
    unsafe { IsWindowVisible(hwnd).as_bool() }
}

/// Gets the thread ID and process ID of the window's owner.
///
/// # Returns
/// A tuple of `(thread_id, process_id)`. Both will be 0 if the call fails.
pub fn get_window_thread_process_id(hwnd: HWND) -> (u32, u32) {
    let mut process_id: u32 = 0;
    let thread_id = unsafe { GetWindowThreadProcessId(hwnd, Some(&mut process_id)) };
    (thread_id, process_id)
}

unsafe extern "system" fn collect_window(hwnd: HWND, lparam: LPARAM) -> BOOL {
    let windows = &mut *(lparam.0 as *mut Vec<HWND>);
    windows.push(hwnd);
    BOOL(1)
}

/// Lists every top-level window.
///
/// Returns an empty list if enumeration fails.
pub fn enum_top_level_windows() -> Vec<HWND> {
    let mut windows: Vec<HWND> = Vec::new();
    let result = unsafe {
        EnumWindows(
            Some(collect_window),
            LPARAM(&mut windows as *mut Vec<HWND> as isize),
        )
    };
    if let Err(e) = result {
        tracing::debug!(error = ?e, "EnumWindows failed");
        return Vec::new();
    }
    windows
}
