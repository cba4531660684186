//! Commands and types used throughout gridlaunch.
//!
//! This module defines the vocabulary that all components share:
//! [`Command`] describes every request the shell can make, [`Reply`] is the
//! answer it gets back, and [`WindowHandle`] / [`DisplayRegion`] /
//! [`WindowRect`] / [`WindowStyle`] / [`PlacementOptions`] provide the
//! supporting data types.
//!
//! Window handles are accepted on the wire either as a JSON number or as a
//! string (`"0x1a2b"` or `"6699"`), because shells tend to echo back
//! whatever format they displayed.

use crate::config::Settings;
use crate::error::{ErrorKind, LayoutError};
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::mpsc;

/// Opaque identifier of a live top-level window, as handed out by the
/// window backend.  The engine only uses it as a map key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowHandle(pub u64);

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

/// Parse `"0x1a2b"` (hex) or `"6699"` (decimal).
pub fn parse_handle(s: &str) -> Option<WindowHandle> {
    let s = s.trim();
    let value = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok()?,
        None => s.parse().ok()?,
    };
    Some(WindowHandle(value))
}

impl Serialize for WindowHandle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.0)
    }
}

impl<'de> Deserialize<'de> for WindowHandle {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Visitor;
        struct V;
        impl<'de> Visitor<'de> for V {
            type Value = WindowHandle;
            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "non-negative integer or handle string")
            }
            fn visit_u64<E>(self, n: u64) -> Result<WindowHandle, E> {
                Ok(WindowHandle(n))
            }
            fn visit_i64<E>(self, n: i64) -> Result<WindowHandle, E>
            where
                E: DeError,
            {
                u64::try_from(n)
                    .map(WindowHandle)
                    .map_err(|_| DeError::custom("window handle must not be negative"))
            }
            fn visit_str<E>(self, s: &str) -> Result<WindowHandle, E>
            where
                E: DeError,
            {
                parse_handle(s)
                    .ok_or_else(|| DeError::custom(format!("invalid window handle: {:?}", s)))
            }
        }
        deserializer.deserialize_any(V)
    }
}

/// A rectangular tiling surface in screen pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayRegion {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
}

impl DisplayRegion {
    pub fn new(left: i32, top: i32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Exclusive right edge.
    pub fn right(&self) -> i32 {
        self.left.saturating_add(self.width as i32)
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> i32 {
        self.top.saturating_add(self.height as i32)
    }
}

/// On-screen rectangle of a window (outer frame, screen pixels).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl WindowRect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Presence of the caption (title bar) and the sizing border.
///
/// Backends translate this to and from their native style flags; nothing
/// above the backend layer deals in bitmasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowStyle {
    pub caption: bool,
    pub border: bool,
}

impl Default for WindowStyle {
    fn default() -> Self {
        Self {
            caption: true,
            border: true,
        }
    }
}

/// Size of one grid cell in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellSize {
    pub width: u32,
    pub height: u32,
}

impl CellSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Flags for [`Command::ApplyWindowLayout`].
///
/// Every flag defaults to `false`, so `{}` is a valid options object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementOptions {
    /// Strip the caption from every placed window.
    pub remove_caption: bool,
    /// Strip the sizing border from every placed window.
    pub remove_border: bool,
    /// Synthesize overflow cells when the grid is full.
    pub bypass_cell_limit: bool,
    /// Keep every window where it is; only resize and restyle.
    pub freeze_current_position: bool,
}

/// One row of [`Reply::Windows`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedWindow {
    pub order: u64,
    pub title: String,
    pub handle: WindowHandle,
    pub x: i32,
    pub y: i32,
    pub has_caption: bool,
    pub has_border: bool,
}

/// Payload of [`Command::EditWindow`]: the edited row of the tracked-window
/// table, applied as rename, restyle, then move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowEdit {
    pub handle: WindowHandle,
    pub title: String,
    #[serde(default)]
    pub remove_caption: bool,
    #[serde(default)]
    pub remove_border: bool,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Every request the shell can make.
///
/// Commands are produced by [`CommandSource`](crate::traits::CommandSource)
/// implementations and consumed by the [`Session`](crate::session::Session).
///
/// # Wire format
///
/// ```json
/// {"LaunchProgram":{"path":"C:\\Games\\client.exe","count":4}}
/// {"ApplyWindowLayout":{"title":"client","width":480,"height":344,"options":{"bypass_cell_limit":true}}}
/// "GetTrackedWindows"
/// {"RenameWindow":{"handle":"0x1a2b","title":"client #1"}}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Start `count` copies of the executable at `path`.
    LaunchProgram { path: String, count: u32 },

    /// Reconcile the tracked set against live windows titled `title` and
    /// tile them into `width × height` cells.
    ApplyWindowLayout {
        title: String,
        width: u32,
        height: u32,
        #[serde(default)]
        options: PlacementOptions,
    },

    /// List tracked windows in insertion order.
    GetTrackedWindows,

    /// Change a window's title text.
    RenameWindow { handle: WindowHandle, title: String },

    /// Set caption/border presence (absolute, not toggled).
    RestyleWindow {
        handle: WindowHandle,
        remove_caption: bool,
        remove_border: bool,
    },

    /// Move and resize a window directly, outside of the grid bookkeeping.
    MoveWindow {
        handle: WindowHandle,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    },

    /// Rename, restyle and move one window in a single request.
    EditWindow(WindowEdit),

    /// [`LaunchProgram`](Command::LaunchProgram) with the saved program and
    /// count.
    LaunchSaved,

    /// [`ApplyWindowLayout`](Command::ApplyWindowLayout) with the saved
    /// title, cell size and style flags.
    ApplySavedLayout,

    /// Return the persisted settings.
    GetSettings,

    /// Replace and persist the settings.
    SaveSettings(Settings),
}

/// Answer to a [`Command`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Reply {
    /// The command succeeded; `message` is meant for the user.
    Done { message: String },

    /// A layout pass succeeded and processed `count` windows.
    Placed { count: usize, message: String },

    /// Tracked windows, ascending by `order`.
    Windows(Vec<TrackedWindow>),

    /// Current settings.
    Settings(Settings),

    /// The command failed; prior state is unchanged except where noted on
    /// [`LayoutError`].
    Error { kind: ErrorKind, message: String },
}

impl Reply {
    pub fn done(message: impl Into<String>) -> Self {
        Reply::Done {
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Reply::Error { .. })
    }
}

impl From<&LayoutError> for Reply {
    fn from(e: &LayoutError) -> Self {
        Reply::Error {
            kind: e.kind(),
            message: e.to_string(),
        }
    }
}

/// A command paired with the channel its [`Reply`] must be sent on.
#[derive(Debug)]
pub struct Request {
    pub command: Command,
    pub reply: mpsc::Sender<Reply>,
}

impl Request {
    /// Build a request and return the receiving end for its reply.
    pub fn new(command: Command) -> (Self, mpsc::Receiver<Reply>) {
        let (reply, rx) = mpsc::channel();
        (Self { command, reply }, rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_display_is_hex() {
        assert_eq!(WindowHandle(0x1a2b).to_string(), "0x1a2b");
    }

    #[test]
    fn parse_handle_accepts_hex_and_decimal() {
        assert_eq!(parse_handle("0x1a2b"), Some(WindowHandle(0x1a2b)));
        assert_eq!(parse_handle(" 6699 "), Some(WindowHandle(6699)));
        assert_eq!(parse_handle("0XFF"), Some(WindowHandle(255)));
        assert_eq!(parse_handle("nope"), None);
        assert_eq!(parse_handle("-1"), None);
    }

    #[test]
    fn handle_deserializes_from_number_or_string() {
        let a: WindowHandle = serde_json::from_str("6699").unwrap();
        let b: WindowHandle = serde_json::from_str(r#""0x1a2b""#).unwrap();
        assert_eq!(a, WindowHandle(6699));
        assert_eq!(b, WindowHandle(0x1a2b));
        assert!(serde_json::from_str::<WindowHandle>("-4").is_err());
    }

    #[test]
    fn apply_layout_options_default_when_missing() {
        let json = r#"{"ApplyWindowLayout":{"title":"client","width":480,"height":344}}"#;
        let cmd: Command = serde_json::from_str(json).unwrap();
        assert_eq!(
            cmd,
            Command::ApplyWindowLayout {
                title: "client".into(),
                width: 480,
                height: 344,
                options: PlacementOptions::default(),
            }
        );
    }

    #[test]
    fn partial_options_keep_other_flags_off() {
        let json = r#"{"ApplyWindowLayout":{"title":"t","width":1,"height":1,"options":{"bypass_cell_limit":true}}}"#;
        let cmd: Command = serde_json::from_str(json).unwrap();
        match cmd {
            Command::ApplyWindowLayout { options, .. } => {
                assert!(options.bypass_cell_limit);
                assert!(!options.remove_caption);
                assert!(!options.remove_border);
                assert!(!options.freeze_current_position);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn unit_commands_are_plain_strings() {
        let cmd: Command = serde_json::from_str(r#""GetTrackedWindows""#).unwrap();
        assert_eq!(cmd, Command::GetTrackedWindows);
    }

    #[test]
    fn rename_accepts_string_handle() {
        let json = r#"{"RenameWindow":{"handle":"0x10","title":"one"}}"#;
        let cmd: Command = serde_json::from_str(json).unwrap();
        assert_eq!(
            cmd,
            Command::RenameWindow {
                handle: WindowHandle(16),
                title: "one".into(),
            }
        );
    }

    #[test]
    fn error_reply_carries_kind() {
        let reply = Reply::from(&LayoutError::NoDisplayInfo);
        assert!(reply.is_error());
        let json = serde_json::to_string(&reply).unwrap();
        assert_eq!(
            json,
            r#"{"Error":{"kind":"NoDisplayInfo","message":"unable to read display information"}}"#
        );
    }

    #[test]
    fn region_edges() {
        let r = DisplayRegion::new(1920, 0, 1280, 1024);
        assert_eq!(r.right(), 3200);
        assert_eq!(r.bottom(), 1024);
    }
}
