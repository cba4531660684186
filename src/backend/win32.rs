//! [`WindowPrimitives`] implementation backed by the Win32 API.
//!
//! Handles are `HWND` values widened to `u64`.  Display geometry comes from
//! `GetSystemMetrics`; caption and border presence are the `WS_CAPTION` and
//! `WS_THICKFRAME` bits of `GWL_STYLE`.

use super::stylebits::{apply_style_bits, style_from_bits};
use crate::command::{DisplayRegion, WindowHandle, WindowRect, WindowStyle};
use crate::traits::WindowPrimitives;
use std::ptr;
use winapi::shared::minwindef::{BOOL, LPARAM, TRUE};
use winapi::shared::windef::{HWND, RECT};
use winapi::um::errhandlingapi::{GetLastError, SetLastError};
use winapi::um::winuser::{
    EnumWindows, GetSystemMetrics, GetWindowLongW, GetWindowRect, GetWindowTextLengthW,
    GetWindowTextW, IsWindow, IsWindowVisible, SetWindowLongW, SetWindowPos, SetWindowTextW,
    GWL_STYLE, SM_CMONITORS, SM_CXSCREEN, SM_CXVIRTUALSCREEN, SM_CYSCREEN, SM_CYVIRTUALSCREEN,
    SM_XVIRTUALSCREEN, SM_YVIRTUALSCREEN, SWP_FRAMECHANGED, SWP_NOMOVE, SWP_NOSIZE,
    SWP_NOZORDER,
};

/// The local Win32 desktop.
#[derive(Debug, Default, Clone, Copy)]
pub struct Win32Desktop;

/// A failed Win32 call.
#[derive(Debug, thiserror::Error)]
#[error("win32 error: {0}")]
pub struct Win32Error(String);

impl Win32Desktop {
    pub fn new() -> Self {
        Self
    }
}

fn hwnd(handle: WindowHandle) -> HWND {
    handle.0 as usize as HWND
}

/// Wrap `GetLastError` for the call named `what`.
fn last_error(what: &str) -> Win32Error {
    let code = unsafe { GetLastError() };
    Win32Error(format!("{} failed (code {})", what, code))
}

fn check(ok: BOOL, what: &str) -> Result<(), Win32Error> {
    if ok == 0 {
        Err(last_error(what))
    } else {
        Ok(())
    }
}

fn metric(index: i32) -> i32 {
    unsafe { GetSystemMetrics(index) }
}

unsafe extern "system" fn collect_window(hwnd: HWND, lparam: LPARAM) -> BOOL {
    let found = &mut *(lparam as *mut Vec<HWND>);
    found.push(hwnd);
    TRUE
}

fn read_title(hwnd: HWND) -> String {
    unsafe {
        let len = GetWindowTextLengthW(hwnd);
        if len <= 0 {
            return String::new();
        }
        let mut buffer = vec![0u16; len as usize + 1];
        let copied = GetWindowTextW(hwnd, buffer.as_mut_ptr(), buffer.len() as i32);
        String::from_utf16_lossy(&buffer[..copied.max(0) as usize])
    }
}

impl WindowPrimitives for Win32Desktop {
    type Error = Win32Error;

    fn visible_windows(&self) -> Result<Vec<(WindowHandle, String)>, Self::Error> {
        let mut found: Vec<HWND> = Vec::new();
        check(
            unsafe { EnumWindows(Some(collect_window), &mut found as *mut _ as LPARAM) },
            "EnumWindows",
        )?;
        Ok(found
            .into_iter()
            .filter(|&h| unsafe { IsWindowVisible(h) } != 0)
            .map(|h| (WindowHandle(h as usize as u64), read_title(h)))
            .collect())
    }

    fn is_window(&self, handle: WindowHandle) -> bool {
        unsafe { IsWindow(hwnd(handle)) != 0 }
    }

    fn window_rect(&self, handle: WindowHandle) -> Result<WindowRect, Self::Error> {
        let mut rect = RECT {
            left: 0,
            top: 0,
            right: 0,
            bottom: 0,
        };
        check(
            unsafe { GetWindowRect(hwnd(handle), &mut rect) },
            "GetWindowRect",
        )?;
        Ok(WindowRect::new(
            rect.left,
            rect.top,
            (rect.right - rect.left).max(0) as u32,
            (rect.bottom - rect.top).max(0) as u32,
        ))
    }

    fn set_window_rect(&self, handle: WindowHandle, rect: WindowRect) -> Result<(), Self::Error> {
        check(
            unsafe {
                SetWindowPos(
                    hwnd(handle),
                    ptr::null_mut(),
                    rect.x,
                    rect.y,
                    rect.width as i32,
                    rect.height as i32,
                    SWP_NOZORDER | SWP_FRAMECHANGED,
                )
            },
            "SetWindowPos",
        )
    }

    fn window_style(&self, handle: WindowHandle) -> Result<WindowStyle, Self::Error> {
        unsafe {
            SetLastError(0);
            let bits = GetWindowLongW(hwnd(handle), GWL_STYLE);
            if bits == 0 && GetLastError() != 0 {
                return Err(last_error("GetWindowLongW"));
            }
            Ok(style_from_bits(bits as u32))
        }
    }

    fn set_window_style(&self, handle: WindowHandle, style: WindowStyle) -> Result<(), Self::Error> {
        let h = hwnd(handle);
        unsafe {
            SetLastError(0);
            let bits = GetWindowLongW(h, GWL_STYLE);
            if bits == 0 && GetLastError() != 0 {
                return Err(last_error("GetWindowLongW"));
            }
            let updated = apply_style_bits(bits as u32, style);
            SetLastError(0);
            if SetWindowLongW(h, GWL_STYLE, updated as i32) == 0 && GetLastError() != 0 {
                return Err(last_error("SetWindowLongW"));
            }
            // Style changes only take effect after a frame refresh.
            check(
                SetWindowPos(
                    h,
                    ptr::null_mut(),
                    0,
                    0,
                    0,
                    0,
                    SWP_NOMOVE | SWP_NOSIZE | SWP_NOZORDER | SWP_FRAMECHANGED,
                ),
                "SetWindowPos",
            )
        }
    }

    fn window_title(&self, handle: WindowHandle) -> Result<String, Self::Error> {
        if !self.is_window(handle) {
            return Err(Win32Error(format!("{} is not a window", handle)));
        }
        Ok(read_title(hwnd(handle)))
    }

    fn set_window_title(&self, handle: WindowHandle, title: &str) -> Result<(), Self::Error> {
        let wide: Vec<u16> = title.encode_utf16().chain(std::iter::once(0)).collect();
        check(
            unsafe { SetWindowTextW(hwnd(handle), wide.as_ptr()) },
            "SetWindowTextW",
        )
    }

    fn primary_display_size(&self) -> Result<(u32, u32), Self::Error> {
        let (w, h) = (metric(SM_CXSCREEN), metric(SM_CYSCREEN));
        if w <= 0 || h <= 0 {
            return Err(Win32Error("primary display size unavailable".into()));
        }
        Ok((w as u32, h as u32))
    }

    fn monitor_count(&self) -> Result<usize, Self::Error> {
        Ok(metric(SM_CMONITORS).max(0) as usize)
    }

    fn virtual_desktop_bounds(&self) -> Result<DisplayRegion, Self::Error> {
        let (w, h) = (metric(SM_CXVIRTUALSCREEN), metric(SM_CYVIRTUALSCREEN));
        if w <= 0 || h <= 0 {
            return Err(Win32Error("virtual desktop size unavailable".into()));
        }
        Ok(DisplayRegion::new(
            metric(SM_XVIRTUALSCREEN),
            metric(SM_YVIRTUALSCREEN),
            w as u32,
            h as u32,
        ))
    }
}
