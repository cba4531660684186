//! In-memory desktop used by the unit tests.
//!
//! [`FakeDesktop`] implements both [`WindowPrimitives`] and
//! [`ProcessLauncher`] and records every mutating call so tests can assert
//! on what the engine asked for.

use crate::command::{DisplayRegion, WindowHandle, WindowRect, WindowStyle};
use crate::traits::{ProcessLauncher, WindowPrimitives};
use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
#[error("fake desktop: {0}")]
pub struct FakeError(pub String);

#[derive(Debug, Clone)]
struct FakeWindow {
    handle: WindowHandle,
    title: String,
    rect: WindowRect,
    style: WindowStyle,
    visible: bool,
}

/// Record-keeping fake desktop.
#[derive(Debug)]
pub struct FakeDesktop {
    pub primary: Cell<(u32, u32)>,
    pub monitors: Cell<usize>,
    pub virtual_bounds: Cell<DisplayRegion>,
    /// When set, every display metric query fails.
    pub metrics_fail: Cell<bool>,
    windows: RefCell<Vec<FakeWindow>>,
    /// Every `set_window_rect` call, in order.
    pub moves: RefCell<Vec<(WindowHandle, WindowRect)>>,
    /// Every launched path, in order.
    pub launches: RefCell<Vec<PathBuf>>,
    /// Fail the launch with this zero-based index.
    pub fail_launch_at: Cell<Option<usize>>,
    /// When set, every `set_window_title` call fails.
    pub rename_fails: Cell<bool>,
}

impl FakeDesktop {
    /// A single display of `width × height`.
    pub fn single(width: u32, height: u32) -> Self {
        Self {
            primary: Cell::new((width, height)),
            monitors: Cell::new(1),
            virtual_bounds: Cell::new(DisplayRegion::new(0, 0, width, height)),
            metrics_fail: Cell::new(false),
            windows: RefCell::new(Vec::new()),
            moves: RefCell::new(Vec::new()),
            launches: RefCell::new(Vec::new()),
            fail_launch_at: Cell::new(None),
            rename_fails: Cell::new(false),
        }
    }

    /// Two displays: the primary plus a virtual desktop of the given size.
    pub fn dual(primary: (u32, u32), virtual_bounds: DisplayRegion) -> Self {
        let desktop = Self::single(primary.0, primary.1);
        desktop.monitors.set(2);
        desktop.virtual_bounds.set(virtual_bounds);
        desktop
    }

    /// Open a visible window at `rect`.
    pub fn open(&self, handle: u64, title: &str, rect: WindowRect) -> WindowHandle {
        let handle = WindowHandle(handle);
        self.windows.borrow_mut().push(FakeWindow {
            handle,
            title: title.to_string(),
            rect,
            style: WindowStyle::default(),
            visible: true,
        });
        handle
    }

    /// Open `count` windows titled `title`, handles starting at `first`.
    pub fn open_many(&self, first: u64, count: u64, title: &str) -> Vec<WindowHandle> {
        (0..count)
            .map(|i| self.open(first + i, title, WindowRect::new(10, 10, 300, 200)))
            .collect()
    }

    pub fn close(&self, handle: WindowHandle) {
        self.windows.borrow_mut().retain(|w| w.handle != handle);
    }

    pub fn hide(&self, handle: WindowHandle) {
        let _ = self.with_window(handle, |w| w.visible = false);
    }

    pub fn rect_of(&self, handle: WindowHandle) -> Option<WindowRect> {
        self.windows
            .borrow()
            .iter()
            .find(|w| w.handle == handle)
            .map(|w| w.rect)
    }

    pub fn style_of(&self, handle: WindowHandle) -> Option<WindowStyle> {
        self.windows
            .borrow()
            .iter()
            .find(|w| w.handle == handle)
            .map(|w| w.style)
    }

    pub fn title_of(&self, handle: WindowHandle) -> Option<String> {
        self.windows
            .borrow()
            .iter()
            .find(|w| w.handle == handle)
            .map(|w| w.title.clone())
    }

    pub fn set_style(&self, handle: WindowHandle, style: WindowStyle) {
        let _ = self.with_window(handle, |w| w.style = style);
    }

    fn with_window<R>(
        &self,
        handle: WindowHandle,
        f: impl FnOnce(&mut FakeWindow) -> R,
    ) -> Result<R, FakeError> {
        let mut windows = self.windows.borrow_mut();
        windows
            .iter_mut()
            .find(|w| w.handle == handle)
            .map(f)
            .ok_or_else(|| FakeError(format!("no window {}", handle)))
    }

    fn metrics(&self) -> Result<(), FakeError> {
        if self.metrics_fail.get() {
            Err(FakeError("metrics unavailable".into()))
        } else {
            Ok(())
        }
    }
}

impl WindowPrimitives for FakeDesktop {
    type Error = FakeError;

    fn visible_windows(&self) -> Result<Vec<(WindowHandle, String)>, FakeError> {
        Ok(self
            .windows
            .borrow()
            .iter()
            .filter(|w| w.visible)
            .map(|w| (w.handle, w.title.clone()))
            .collect())
    }

    fn is_window(&self, handle: WindowHandle) -> bool {
        self.windows.borrow().iter().any(|w| w.handle == handle)
    }

    fn window_rect(&self, handle: WindowHandle) -> Result<WindowRect, FakeError> {
        self.with_window(handle, |w| w.rect)
    }

    fn set_window_rect(&self, handle: WindowHandle, rect: WindowRect) -> Result<(), FakeError> {
        self.with_window(handle, |w| w.rect = rect)?;
        self.moves.borrow_mut().push((handle, rect));
        Ok(())
    }

    fn window_style(&self, handle: WindowHandle) -> Result<WindowStyle, FakeError> {
        self.with_window(handle, |w| w.style)
    }

    fn set_window_style(&self, handle: WindowHandle, style: WindowStyle) -> Result<(), FakeError> {
        self.with_window(handle, |w| w.style = style)
    }

    fn window_title(&self, handle: WindowHandle) -> Result<String, FakeError> {
        self.with_window(handle, |w| w.title.clone())
    }

    fn set_window_title(&self, handle: WindowHandle, title: &str) -> Result<(), FakeError> {
        if self.rename_fails.get() {
            return Err(FakeError(format!("cannot rename {}", handle)));
        }
        self.with_window(handle, |w| w.title = title.to_string())
    }

    fn primary_display_size(&self) -> Result<(u32, u32), FakeError> {
        self.metrics()?;
        Ok(self.primary.get())
    }

    fn monitor_count(&self) -> Result<usize, FakeError> {
        self.metrics()?;
        Ok(self.monitors.get())
    }

    fn virtual_desktop_bounds(&self) -> Result<DisplayRegion, FakeError> {
        self.metrics()?;
        Ok(self.virtual_bounds.get())
    }
}

impl ProcessLauncher for FakeDesktop {
    type Error = FakeError;

    fn launch(&self, path: &Path) -> Result<(), FakeError> {
        let index = self.launches.borrow().len();
        if self.fail_launch_at.get() == Some(index) {
            return Err(FakeError(format!("cannot start {}", path.display())));
        }
        self.launches.borrow_mut().push(path.to_path_buf());
        Ok(())
    }
}
