//! Process-related WinAPI wrappers.
//!
//! Provides safe abstractions for retrieving process names and image paths
//! and for snapshotting the process table.

use windows::core::PWSTR;
use windows::Win32::Foundation::{CloseHandle, HANDLE};
use windows::Win32::System::Diagnostics::ToolHelp::{
    CreateToolhelp32Snapshot, Process32FirstW, Process32NextW, PROCESSENTRY32W,
    TH32CS_SNAPPROCESS,
};
use windows::Win32::System::ProcessStatus::GetModuleBaseNameW;
use windows::Win32::System::Threading::{
    OpenProcess, QueryFullProcessImageNameW, PROCESS_NAME_WIN32,
    PROCESS_QUERY_LIMITED_INFORMATION, PROCESS_VM_READ,
};

/// RAII wrapper for Windows handles.
///
/// Automatically closes the handle when dropped to prevent handle leaks.
struct OwnedHandle(HANDLE);

impl OwnedHandle {
    /// Opens a process with limited query and VM read permissions.
    ///
    /// Returns `None` if the process cannot be opened (e.g., access denied
    /// for system processes).
    fn open_process(pid: u32) -> Option<Self> {
        let handle = unsafe {
            OpenProcess(
                PROCESS_QUERY_LIMITED_INFORMATION | PROCESS_VM_READ,
                false,
                pid,
            )
        };

        match handle {
            Ok(h) if !h.is_invalid() => Some(Self(h)),
            _ => None,
        }
    }

    fn as_raw(&self) -> HANDLE {
        self.0
    }
}

impl Drop for OwnedHandle {
    fn drop(&mut self) {
        unsafe {
            let _ = CloseHandle(self.0);
        }
    }
}

/// Gets the executable name of a process by its process ID.
///
/// Returns `None` if the process cannot be opened or the module name cannot
/// be retrieved.
pub fn get_process_name(pid: u32) -> Option<String> {
    let handle = OwnedHandle::open_process(pid)?;

    // MAX_PATH
    let mut buffer: [u16; 260] = [0; 260];

    let len = unsafe { GetModuleBaseNameW(handle.as_raw(), None, &mut buffer) };

    if len == 0 {
        return None;
    }

    Some(String::from_utf16_lossy(&buffer[..len as usize]))
}

/// Gets the full image path of a process.
pub fn get_process_path(pid: u32) -> Option<String> {
    let handle = OwnedHandle::open_process(pid)?;

    let mut buffer: Vec<u16> = vec![0; 1024];
    let mut size = buffer.len() as u32;

    let result = unsafe {
        QueryFullProcessImageNameW(
            handle.as_raw(),
            PROCESS_NAME_WIN32,
            PWSTR(buffer.as_mut_ptr()),
            &mut size,
        )
    };

    match result {
        Ok(()) if size > 0 => Some(String::from_utf16_lossy(&buffer[..size as usize])),
        _ => None,
    }
}

/// Snapshots the process table as `(pid, executable name)` pairs.
///
/// Returns an empty list if the snapshot cannot be taken.
pub fn list_processes() -> Vec<(u32, String)> {
    let snapshot = match unsafe { CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0) } {
        Ok(h) if !h.is_invalid() => OwnedHandle(h),
        Ok(_) => return Vec::new(),
        Err(e) => {
            tracing::debug!(error = ?e, "CreateToolhelp32Snapshot failed");
            return Vec::new();
        }
    };

    let mut entry = PROCESSENTRY32W {
        dwSize: std::mem::size_of::<PROCESSENTRY32W>() as u32,
        ..Default::default()
    };

    let mut processes = Vec::new();
    let mut next = unsafe { Process32FirstW(snapshot.as_raw(), &mut entry) };
    while next.is_ok() {
        let len = entry
            .szExeFile
            .iter()
            .position(|&c| c == 0)
            .unwrap_or(entry.szExeFile.len());
        processes.push((
            entry.th32ProcessID,
            String::from_utf16_lossy(&entry.szExeFile[..len]),
        ));
        next = unsafe { Process32NextW(snapshot.as_raw(), &mut entry) };
    }

    processes
}
