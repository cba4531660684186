//! Core traits that decouple gridlaunch from any specific windowing system
//! or transport mechanism.
//!
//! Every concrete backend (Win32, Hyprland, a test harness, …) implements
//! one of these traits.  The [`Session`](crate::session::Session) and the
//! [`LayoutEngine`](crate::engine::LayoutEngine) only depend on these
//! abstractions.

use crate::command::{DisplayRegion, Request, WindowHandle, WindowRect, WindowStyle};
use std::path::Path;
use std::sync::mpsc;

/// The window and display primitives the layout engine is built on.
///
/// An implementation might talk to the Win32 API, to a compositor over IPC,
/// or it might be an in-memory fake used in tests.  Every method is a single
/// synchronous call with no retries.
pub trait WindowPrimitives {
    /// The error type produced by this backend.
    type Error: std::error::Error + Send + 'static;

    /// Every visible top-level window with its current title, in the
    /// backend's enumeration order.
    fn visible_windows(&self) -> Result<Vec<(WindowHandle, String)>, Self::Error>;

    /// Whether `handle` still refers to a live window.
    fn is_window(&self, handle: WindowHandle) -> bool;

    /// Current outer rectangle of the window.  Fails if the handle is
    /// invalid.
    fn window_rect(&self, handle: WindowHandle) -> Result<WindowRect, Self::Error>;

    /// Move and resize the window in one call.
    fn set_window_rect(&self, handle: WindowHandle, rect: WindowRect) -> Result<(), Self::Error>;

    /// Current caption/border presence.
    fn window_style(&self, handle: WindowHandle) -> Result<WindowStyle, Self::Error>;

    /// Set caption/border presence and refresh the frame.
    fn set_window_style(&self, handle: WindowHandle, style: WindowStyle) -> Result<(), Self::Error>;

    /// Current title text.
    fn window_title(&self, handle: WindowHandle) -> Result<String, Self::Error>;

    /// Replace the title text.
    fn set_window_title(&self, handle: WindowHandle, title: &str) -> Result<(), Self::Error>;

    /// `(width, height)` of the primary display.
    fn primary_display_size(&self) -> Result<(u32, u32), Self::Error>;

    /// Number of active physical displays.
    fn monitor_count(&self) -> Result<usize, Self::Error>;

    /// Bounding box of the whole virtual desktop.
    fn virtual_desktop_bounds(&self) -> Result<DisplayRegion, Self::Error>;
}

/// Starts processes without waiting for them.
pub trait ProcessLauncher {
    /// The error type produced by this launcher.
    type Error: std::error::Error + Send + 'static;

    /// Spawn the program at `path`.  Returns as soon as the process has been
    /// created.
    fn launch(&self, path: &Path) -> Result<(), Self::Error>;
}

//  Command Source

/// A source of shell [`Request`]s.
///
/// Implementations listen on some transport (a loopback socket, a test
/// harness, …) and forward parsed requests into the provided
/// [`mpsc::Sender`].  Each request carries its own reply channel, so the
/// source can hand the answer back to whoever asked.
///
/// # Contract
///
/// * [`run`](CommandSource::run) **blocks** until the source is exhausted or
///   an unrecoverable error occurs.
/// * Each received command must be sent through `sink` exactly once.
/// * Implementations must be [`Send`] so they can run on a dedicated thread.
pub trait CommandSource: Send {
    /// The error type produced by this source.
    type Error: std::error::Error + Send + 'static;

    /// Start listening and forward every incoming [`Request`] into `sink`.
    ///
    /// This method blocks the calling thread.
    fn run(&mut self, sink: mpsc::Sender<Request>) -> Result<(), Self::Error>;
}
