//! [`WindowPrimitives`] implementation backed by Hyprland IPC.
//!
//! Communicates directly with Hyprland through its Unix socket at
//! `$XDG_RUNTIME_DIR/hypr/$HYPRLAND_INSTANCE_SIGNATURE/.socket.sock`.
//!
//! Hyprland has no notion of a caption bit, so caption and border map onto
//! the `decorate` and `noborder` window properties.  Those properties cannot
//! be read back over IPC; the last style set through this backend is
//! remembered instead, and windows never touched report both as present.
//! Client titles are owned by the client, so renaming is not supported.

use crate::command::{parse_handle, DisplayRegion, WindowHandle, WindowRect, WindowStyle};
use crate::traits::WindowPrimitives;
use serde::Deserialize;
use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::path::PathBuf;

/// Hyprland-backed desktop.
///
/// Each method call opens a short-lived IPC request; no connection is kept.
#[derive(Default)]
pub struct HyprlandDesktop {
    styles: RefCell<HashMap<WindowHandle, WindowStyle>>,
}

/// Errors that can occur when talking to Hyprland.
#[derive(Debug, thiserror::Error)]
#[error("hyprland IPC error: {0}")]
pub struct HyprlandError(String);

impl HyprlandDesktop {
    pub fn new() -> Self {
        Self::default()
    }

    fn clients(&self) -> Result<Vec<ClientJson>, HyprlandError> {
        parse_clients(&ipc_json("clients")?)
    }

    fn client(&self, handle: WindowHandle) -> Result<ClientJson, HyprlandError> {
        self.clients()?
            .into_iter()
            .find(|c| c.handle() == Some(handle))
            .ok_or_else(|| HyprlandError(format!("no client {}", handle)))
    }

    fn monitors(&self) -> Result<Vec<MonitorJson>, HyprlandError> {
        parse_monitors(&ipc_json("monitors")?)
    }
}

//  Direct Hyprland IPC helpers

/// Resolve the Hyprland command socket path.
fn socket_path() -> Result<PathBuf, HyprlandError> {
    let runtime_dir = std::env::var("XDG_RUNTIME_DIR")
        .map_err(|_| HyprlandError("XDG_RUNTIME_DIR not set".into()))?;
    let his = std::env::var("HYPRLAND_INSTANCE_SIGNATURE")
        .map_err(|_| HyprlandError("HYPRLAND_INSTANCE_SIGNATURE not set".into()))?;
    Ok(PathBuf::from(format!(
        "{}/hypr/{}/.socket.sock",
        runtime_dir, his
    )))
}

/// Send a raw request to the command socket and return the response.
fn ipc_request(command: &str) -> Result<String, HyprlandError> {
    let path = socket_path()?;
    let mut stream = UnixStream::connect(&path)
        .map_err(|e| HyprlandError(format!("connect to {}: {}", path.display(), e)))?;

    stream
        .write_all(command.as_bytes())
        .map_err(|e| HyprlandError(format!("write: {}", e)))?;

    let mut response = Vec::new();
    stream
        .read_to_end(&mut response)
        .map_err(|e| HyprlandError(format!("read: {}", e)))?;

    String::from_utf8(response).map_err(|e| HyprlandError(format!("utf-8: {}", e)))
}

fn ipc_json(data_command: &str) -> Result<String, HyprlandError> {
    ipc_request(&format!("j/{}", data_command))
}

/// Send a command that answers `ok` on success.
fn ipc_ok(command: &str) -> Result<(), HyprlandError> {
    let response = ipc_request(command)?;
    if response.trim() == "ok" {
        Ok(())
    } else {
        Err(HyprlandError(format!("{}: {}", command, response.trim())))
    }
}

fn ipc_dispatch(args: &str) -> Result<(), HyprlandError> {
    ipc_ok(&format!("/dispatch {}", args))
}

//  Minimal serde structs for the JSON we care about

/// Subset of an object returned by `j/clients`.
#[derive(Debug, Deserialize)]
struct ClientJson {
    address: String,
    mapped: bool,
    hidden: bool,
    at: [i32; 2],
    size: [i32; 2],
    title: String,
}

impl ClientJson {
    fn handle(&self) -> Option<WindowHandle> {
        parse_handle(&self.address)
    }

    fn visible(&self) -> bool {
        self.mapped && !self.hidden
    }

    fn rect(&self) -> WindowRect {
        WindowRect::new(
            self.at[0],
            self.at[1],
            self.size[0].max(0) as u32,
            self.size[1].max(0) as u32,
        )
    }
}

/// Subset of an object returned by `j/monitors`.
#[derive(Debug, Deserialize)]
struct MonitorJson {
    width: u32,
    height: u32,
    x: i32,
    y: i32,
}

fn parse_clients(json: &str) -> Result<Vec<ClientJson>, HyprlandError> {
    serde_json::from_str(json).map_err(|e| HyprlandError(format!("parse clients: {}", e)))
}

fn parse_monitors(json: &str) -> Result<Vec<MonitorJson>, HyprlandError> {
    serde_json::from_str(json).map_err(|e| HyprlandError(format!("parse monitors: {}", e)))
}

/// The monitor at the layout origin, or the first one listed.
fn primary(monitors: &[MonitorJson]) -> Option<&MonitorJson> {
    monitors
        .iter()
        .find(|m| m.x == 0 && m.y == 0)
        .or_else(|| monitors.first())
}

/// Smallest rectangle containing every monitor.
fn bounding_box(monitors: &[MonitorJson]) -> Option<DisplayRegion> {
    let left = monitors.iter().map(|m| m.x).min()?;
    let top = monitors.iter().map(|m| m.y).min()?;
    let right = monitors.iter().map(|m| m.x + m.width as i32).max()?;
    let bottom = monitors.iter().map(|m| m.y + m.height as i32).max()?;
    Some(DisplayRegion::new(
        left,
        top,
        (right - left) as u32,
        (bottom - top) as u32,
    ))
}

//  WindowPrimitives implementation

impl WindowPrimitives for HyprlandDesktop {
    type Error = HyprlandError;

    fn visible_windows(&self) -> Result<Vec<(WindowHandle, String)>, Self::Error> {
        Ok(self
            .clients()?
            .into_iter()
            .filter(ClientJson::visible)
            .filter_map(|c| c.handle().map(|h| (h, c.title)))
            .collect())
    }

    fn is_window(&self, handle: WindowHandle) -> bool {
        self.client(handle).is_ok()
    }

    fn window_rect(&self, handle: WindowHandle) -> Result<WindowRect, Self::Error> {
        Ok(self.client(handle)?.rect())
    }

    fn set_window_rect(&self, handle: WindowHandle, rect: WindowRect) -> Result<(), Self::Error> {
        // Tiled windows ignore pixel moves.
        if let Err(e) = ipc_dispatch(&format!("setfloating address:{}", handle)) {
            log::debug!("setfloating {}: {}", handle, e);
        }
        ipc_dispatch(&format!(
            "resizewindowpixel exact {} {},address:{}",
            rect.width, rect.height, handle
        ))?;
        ipc_dispatch(&format!(
            "movewindowpixel exact {} {},address:{}",
            rect.x, rect.y, handle
        ))
    }

    fn window_style(&self, handle: WindowHandle) -> Result<WindowStyle, Self::Error> {
        if !self.is_window(handle) {
            return Err(HyprlandError(format!("no client {}", handle)));
        }
        Ok(self
            .styles
            .borrow()
            .get(&handle)
            .copied()
            .unwrap_or_default())
    }

    fn set_window_style(&self, handle: WindowHandle, style: WindowStyle) -> Result<(), Self::Error> {
        ipc_ok(&format!(
            "/setprop address:{} decorate {}",
            handle, style.caption as u8
        ))?;
        ipc_ok(&format!(
            "/setprop address:{} noborder {}",
            handle, !style.border as u8
        ))?;
        self.styles.borrow_mut().insert(handle, style);
        Ok(())
    }

    fn window_title(&self, handle: WindowHandle) -> Result<String, Self::Error> {
        Ok(self.client(handle)?.title)
    }

    fn set_window_title(&self, handle: WindowHandle, _title: &str) -> Result<(), Self::Error> {
        Err(HyprlandError(format!(
            "cannot rename {}: titles belong to the client",
            handle
        )))
    }

    fn primary_display_size(&self) -> Result<(u32, u32), Self::Error> {
        let monitors = self.monitors()?;
        primary(&monitors)
            .map(|m| (m.width, m.height))
            .ok_or_else(|| HyprlandError("no monitors".into()))
    }

    fn monitor_count(&self) -> Result<usize, Self::Error> {
        Ok(self.monitors()?.len())
    }

    fn virtual_desktop_bounds(&self) -> Result<DisplayRegion, Self::Error> {
        bounding_box(&self.monitors()?).ok_or_else(|| HyprlandError("no monitors".into()))
    }
}
