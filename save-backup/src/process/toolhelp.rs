//! Windows process lookup through a Toolhelp32 snapshot.

use super::ProcessChecker;
use crate::utils::errors::{BackupError, Result};
use std::io;
use windows_sys::Win32::Foundation::{
    CloseHandle, GetLastError, ERROR_NO_MORE_FILES, HANDLE, INVALID_HANDLE_VALUE,
};
use windows_sys::Win32::System::Diagnostics::ToolHelp::{
    CreateToolhelp32Snapshot, Process32FirstW, Process32NextW, PROCESSENTRY32W,
    TH32CS_SNAPPROCESS,
};

/// Compares `szExeFile` of every process in a fresh snapshot.
#[derive(Debug, Default, Clone, Copy)]
pub struct ToolhelpChecker;

/// Closes the snapshot handle on every exit path.
struct Snapshot(HANDLE);

impl Drop for Snapshot {
    fn drop(&mut self) {
        // SAFETY: the handle came from a successful CreateToolhelp32Snapshot
        unsafe {
            CloseHandle(self.0);
        }
    }
}

impl ProcessChecker for ToolhelpChecker {
    fn is_process_running(&self, name: &str) -> Result<bool> {
        // SAFETY: plain FFI call; the result is checked before use
        let handle = unsafe { CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0) };
        if handle == INVALID_HANDLE_VALUE {
            return Err(BackupError::Enumeration(io::Error::last_os_error()));
        }
        let snapshot = Snapshot(handle);

        // SAFETY: PROCESSENTRY32W is plain data, all-zero is a valid value
        let mut entry: PROCESSENTRY32W = unsafe { std::mem::zeroed() };
        entry.dwSize = std::mem::size_of::<PROCESSENTRY32W>() as u32;

        // SAFETY: `entry` is a valid, sized PROCESSENTRY32W
        let mut ok = unsafe { Process32FirstW(snapshot.0, &mut entry) };
        while ok != 0 {
            if exe_name(&entry) == name {
                return Ok(true);
            }
            // SAFETY: as above
            ok = unsafe { Process32NextW(snapshot.0, &mut entry) };
        }

        // SAFETY: reads the calling thread's last-error value
        let code = unsafe { GetLastError() };
        if code == ERROR_NO_MORE_FILES {
            Ok(false)
        } else {
            Err(BackupError::Enumeration(io::Error::from_raw_os_error(
                code as i32,
            )))
        }
    }
}

/// NUL-terminated UTF-16 image name of one entry
fn exe_name(entry: &PROCESSENTRY32W) -> String {
    let len = entry
        .szExeFile
        .iter()
        .position(|c| *c == 0)
        .unwrap_or(entry.szExeFile.len());
    String::from_utf16_lossy(&entry.szExeFile[..len])
}
