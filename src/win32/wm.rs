//! [`WindowManager`] implementation backed by the Win32 API.
//!
//! Monitors come from `EnumDisplayMonitors`, windows from `EnumWindows`.
//! A window's visible frame is read from DWM (`DWMWA_EXTENDED_FRAME_BOUNDS`)
//! because `GetWindowRect` includes the invisible resize border.

use crate::command::{WindowHandle, WindowInfo};
use crate::geometry::{Monitor, Rectangle};
use crate::traits::WindowManager;
use log::debug;
use std::ffi::c_void;
use windows::core::{BOOL, PCWSTR, PWSTR};
use windows::Win32::Foundation::{CloseHandle, HWND, LPARAM, RECT, TRUE};
use windows::Win32::Graphics::Dwm::{
    DwmGetWindowAttribute, DWMWA_CLOAKED, DWMWA_EXTENDED_FRAME_BOUNDS,
};
use windows::Win32::Graphics::Gdi::{
    EnumDisplayDevicesW, EnumDisplayMonitors, GetMonitorInfoW, DISPLAY_DEVICEW, HDC, HMONITOR,
    MONITORINFO, MONITORINFOEXW,
};
use windows::Win32::System::Threading::{
    OpenProcess, QueryFullProcessImageNameW, PROCESS_NAME_FORMAT,
    PROCESS_QUERY_LIMITED_INFORMATION,
};
use windows::Win32::UI::WindowsAndMessaging::{
    EnumWindows, GetWindowRect, GetWindowTextW, GetWindowThreadProcessId, IsWindowVisible,
    SetWindowPos, ShowWindow, MONITORINFOF_PRIMARY, SWP_NOACTIVATE, SWP_NOMOVE, SWP_NOSIZE,
    SWP_NOZORDER, SW_RESTORE,
};

/// Win32-backed window manager.
///
/// Lists visible, titled, uncloaked top-level windows, minus the titles in
/// `excluded_titles` (the desktop and the taskbar by default).
pub struct Win32Wm {
    excluded_titles: Vec<String>,
}

/// Errors that can occur when talking to Win32.
#[derive(Debug, thiserror::Error)]
#[error("win32 error: {0}")]
pub struct Win32Error(String);

impl Win32Wm {
    pub fn new(excluded_titles: Vec<String>) -> Self {
        Self { excluded_titles }
    }

    fn is_listed(&self, hwnd: HWND) -> bool {
        if !unsafe { IsWindowVisible(hwnd) }.as_bool() || is_cloaked(hwnd) {
            return false;
        }
        let title = window_title(hwnd);
        !title.is_empty() && !self.excluded_titles.iter().any(|t| *t == title)
    }
}

//  Win32 helpers

fn hwnd(handle: WindowHandle) -> HWND {
    HWND(handle.0 as *mut c_void)
}

fn rect(r: RECT) -> Rectangle {
    Rectangle::new(
        f64::from(r.left),
        f64::from(r.right),
        f64::from(r.top),
        f64::from(r.bottom),
    )
}

fn wide_to_string(buf: &[u16]) -> String {
    let len = buf.iter().position(|c| *c == 0).unwrap_or(buf.len());
    String::from_utf16_lossy(&buf[..len])
}

fn window_title(hwnd: HWND) -> String {
    let mut buf = [0u16; 512];
    let len = unsafe { GetWindowTextW(hwnd, &mut buf) };
    String::from_utf16_lossy(&buf[..len.max(0) as usize])
}

/// Hidden UWP windows are visible to `IsWindowVisible` but cloaked by DWM.
fn is_cloaked(hwnd: HWND) -> bool {
    let mut cloaked = 0u32;
    let result = unsafe {
        DwmGetWindowAttribute(
            hwnd,
            DWMWA_CLOAKED,
            &mut cloaked as *mut _ as *mut c_void,
            std::mem::size_of::<u32>() as u32,
        )
    };
    result.is_ok() && cloaked != 0
}

/// File name of the executable that owns `hwnd`, e.g. `"code.exe"`.
fn process_name(hwnd: HWND) -> Option<String> {
    let mut pid = 0u32;
    unsafe { GetWindowThreadProcessId(hwnd, Some(&mut pid)) };
    if pid == 0 {
        return None;
    }
    let process = unsafe { OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, false, pid) }.ok()?;
    let mut buf = vec![0u16; 1024];
    let mut size = buf.len() as u32;
    let result = unsafe {
        QueryFullProcessImageNameW(
            process,
            PROCESS_NAME_FORMAT(0),
            PWSTR(buf.as_mut_ptr()),
            &mut size,
        )
    };
    let _ = unsafe { CloseHandle(process) };
    result.ok()?;
    buf.truncate(size as usize);
    Some(app_name(&String::from_utf16_lossy(&buf)))
}

/// Last component of an executable path.
fn app_name(path: &str) -> String {
    path.rsplit(['\\', '/']).next().unwrap_or(path).to_string()
}

/// Stable hardware id of the monitor attached to display `device`.
fn monitor_device_id(device: &[u16]) -> Option<String> {
    let mut dd = DISPLAY_DEVICEW {
        cb: std::mem::size_of::<DISPLAY_DEVICEW>() as u32,
        ..Default::default()
    };
    let found = unsafe { EnumDisplayDevicesW(PCWSTR(device.as_ptr()), 0, &mut dd, 0) };
    if !found.as_bool() {
        return None;
    }
    let id = wide_to_string(&dd.DeviceID);
    (!id.is_empty()).then_some(id)
}

unsafe extern "system" fn enum_monitors_proc(
    hmonitor: HMONITOR,
    _hdc: HDC,
    _clip: *mut RECT,
    lparam: LPARAM,
) -> BOOL {
    let monitors = unsafe { &mut *(lparam.0 as *mut Vec<Monitor>) };
    let mut info = MONITORINFOEXW::default();
    info.monitorInfo.cbSize = std::mem::size_of::<MONITORINFOEXW>() as u32;
    let ok = unsafe {
        GetMonitorInfoW(hmonitor, &mut info as *mut MONITORINFOEXW as *mut MONITORINFO)
    };
    if ok.as_bool() {
        let name = wide_to_string(&info.szDevice);
        let id = monitor_device_id(&info.szDevice).unwrap_or_else(|| name.clone());
        monitors.push(Monitor {
            area: rect(info.monitorInfo.rcMonitor),
            work: rect(info.monitorInfo.rcWork),
            is_primary: info.monitorInfo.dwFlags & MONITORINFOF_PRIMARY != 0,
            name,
            id,
        });
    }
    TRUE
}

unsafe extern "system" fn enum_windows_proc(hwnd: HWND, lparam: LPARAM) -> BOOL {
    let found = unsafe { &mut *(lparam.0 as *mut Vec<HWND>) };
    found.push(hwnd);
    TRUE
}

impl WindowManager for Win32Wm {
    type Error = Win32Error;

    fn monitors(&self) -> Result<Vec<Monitor>, Win32Error> {
        let mut monitors: Vec<Monitor> = Vec::new();
        let ok = unsafe {
            EnumDisplayMonitors(
                None,
                None,
                Some(enum_monitors_proc),
                LPARAM(&mut monitors as *mut _ as isize),
            )
        };
        if !ok.as_bool() {
            return Err(Win32Error("EnumDisplayMonitors failed".into()));
        }
        Ok(monitors)
    }

    fn windows(&self) -> Result<Vec<WindowInfo>, Win32Error> {
        let mut found: Vec<HWND> = Vec::new();
        unsafe {
            EnumWindows(
                Some(enum_windows_proc),
                LPARAM(&mut found as *mut _ as isize),
            )
        }
        .map_err(|e| Win32Error(format!("EnumWindows: {}", e)))?;

        let windows = found
            .into_iter()
            .filter(|h| self.is_listed(*h))
            .filter_map(|h| {
                let app = process_name(h)?;
                Some(WindowInfo {
                    app,
                    handle: WindowHandle(h.0 as isize),
                })
            })
            .collect::<Vec<_>>();
        debug!("enumerated {} window(s)", windows.len());
        Ok(windows)
    }

    fn window_bounds(&self, window: WindowHandle) -> Result<Rectangle, Win32Error> {
        let mut r = RECT::default();
        unsafe { GetWindowRect(hwnd(window), &mut r) }
            .map_err(|e| Win32Error(format!("GetWindowRect({}): {}", window, e)))?;
        Ok(rect(r))
    }

    fn visible_frame(&self, window: WindowHandle) -> Result<Rectangle, Win32Error> {
        let mut r = RECT::default();
        unsafe {
            DwmGetWindowAttribute(
                hwnd(window),
                DWMWA_EXTENDED_FRAME_BOUNDS,
                &mut r as *mut _ as *mut c_void,
                std::mem::size_of::<RECT>() as u32,
            )
        }
        .map_err(|e| Win32Error(format!("DwmGetWindowAttribute({}): {}", window, e)))?;
        Ok(rect(r))
    }

    fn restore(&self, window: WindowHandle) -> Result<(), Win32Error> {
        // The return value is the previous visibility, not a status.
        let _ = unsafe { ShowWindow(hwnd(window), SW_RESTORE) };
        Ok(())
    }

    fn set_position(&self, window: WindowHandle, x: i32, y: i32) -> Result<(), Win32Error> {
        unsafe {
            SetWindowPos(
                hwnd(window),
                None,
                x,
                y,
                0,
                0,
                SWP_NOSIZE | SWP_NOZORDER | SWP_NOACTIVATE,
            )
        }
        .map_err(|e| Win32Error(format!("SetWindowPos({}): {}", window, e)))
    }

    fn set_size(&self, window: WindowHandle, width: i32, height: i32) -> Result<(), Win32Error> {
        unsafe {
            SetWindowPos(
                hwnd(window),
                None,
                0,
                0,
                width,
                height,
                SWP_NOMOVE | SWP_NOZORDER | SWP_NOACTIVATE,
            )
        }
        .map_err(|e| Win32Error(format!("SetWindowPos({}): {}", window, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_name_is_last_path_component() {
        assert_eq!(app_name(r"C:\Windows\explorer.exe"), "explorer.exe");
        assert_eq!(app_name("C:/tools/code.exe"), "code.exe");
        assert_eq!(app_name("plain.exe"), "plain.exe");
    }

    #[test]
    fn wide_strings_stop_at_nul() {
        let mut buf = [0u16; 8];
        for (i, c) in "ab".encode_utf16().enumerate() {
            buf[i] = c;
        }
        assert_eq!(wide_to_string(&buf), "ab");
    }
}
