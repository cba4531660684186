//! The grid placement engine.
//!
//! [`LayoutEngine`] owns the tracked-window set and implements the layout
//! pass ([`reconcile_and_place`](LayoutEngine::reconcile_and_place)) plus
//! the per-window edit operations used by the shell's window table.
//!
//! The engine never owns the window backend; every operation borrows one.
//! This keeps independent sessions (and tests) from sharing state.
//!
//! # Layout pass
//!
//! 1. Resolve the display topology.
//! 2. Enumerate visible windows whose title matches exactly.
//! 3. Evict tracked handles that are no longer live.
//! 4. In freeze mode, record each window where it already is, resize it, and
//!    stop.
//! 5. Otherwise cut every region into cells and drop the occupied ones.
//! 6. Fail if there are more new windows than free cells, unless overflow
//!    is allowed, in which case extra positions are synthesized.
//! 7. Give each new window a free cell, in enumeration order.
//! 8. Restyle and move every tracked window to its cell.
//!
//! Eviction in step 3 is not rolled back if a later step fails.

use crate::command::{
    CellSize, PlacementOptions, TrackedWindow, WindowEdit, WindowHandle, WindowRect, WindowStyle,
};
use crate::error::LayoutError;
use crate::grid::{self, PlacementTable};
use crate::topology;
use crate::traits::WindowPrimitives;
use log::{debug, info};
use std::collections::HashSet;
use std::fmt;

/// Which step of an [`edit_window`](LayoutEngine::edit_window) call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditStep {
    Rename,
    Restyle,
    Move,
}

impl fmt::Display for EditStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditStep::Rename => write!(f, "rename"),
            EditStep::Restyle => write!(f, "restyle"),
            EditStep::Move => write!(f, "move"),
        }
    }
}

/// Error from [`LayoutEngine::edit_window`].
#[derive(Debug, thiserror::Error)]
#[error("{step} failed: {source}")]
pub struct EditError {
    pub step: EditStep,
    #[source]
    pub source: LayoutError,
}

/// Tracks windows and keeps them on a stable grid.
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    table: PlacementTable,
}

impl LayoutEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// The tracked-window set.
    pub fn table(&self) -> &PlacementTable {
        &self.table
    }

    /// Reconcile the tracked set with the live windows titled `title` and
    /// lay them out in `cell`-sized slots.
    ///
    /// Returns the number of live matching windows processed.
    pub fn reconcile_and_place<W: WindowPrimitives>(
        &mut self,
        wm: &W,
        title: &str,
        cell: CellSize,
        options: PlacementOptions,
    ) -> Result<usize, LayoutError> {
        if cell.width == 0 || cell.height == 0 {
            return Err(LayoutError::InvalidArgument(format!(
                "cell size must be positive, got {}x{}",
                cell.width, cell.height
            )));
        }
        if i32::try_from(cell.width).is_err() || i32::try_from(cell.height).is_err() {
            return Err(LayoutError::InvalidArgument(format!(
                "cell size {}x{} exceeds the screen coordinate range",
                cell.width, cell.height
            )));
        }

        let regions = topology::resolve(wm);
        if regions.is_empty() {
            return Err(LayoutError::NoDisplayInfo);
        }

        let live = matching_windows(wm, title)?;
        if live.is_empty() {
            return Err(LayoutError::NoMatchingWindow(title.to_string()));
        }

        let gone = self.table.evict_missing(&live);
        let new: Vec<WindowHandle> = live
            .iter()
            .copied()
            .filter(|h| !self.table.contains(*h))
            .collect();
        info!(
            "layout {:?}: {} live, {} new, {} gone",
            title,
            live.len(),
            new.len(),
            gone.len()
        );

        if options.freeze_current_position {
            return self.freeze_in_place(wm, &live, cell, options);
        }

        let mut available = grid::available_cells(&regions, cell, &self.table.occupied());
        if new.len() > available.len() {
            if !options.bypass_cell_limit {
                return Err(LayoutError::InsufficientSpace {
                    needed: new.len(),
                    available: available.len(),
                });
            }
            let extra = new.len() - available.len();
            debug!("synthesizing {} overflow position(s)", extra);
            grid::extend_with_overflow(&mut available, extra, cell.width);
        }

        for (handle, position) in new.iter().zip(available) {
            let record = self.table.place(*handle, position);
            debug!("  {} -> ({}, {}) #{}", handle, record.x, record.y, record.order);
        }

        for handle in &live {
            let Some(record) = self.table.get(*handle).copied() else {
                continue;
            };
            strip_style(wm, *handle, options)?;
            wm.set_window_rect(
                *handle,
                WindowRect::new(record.x, record.y, cell.width, cell.height),
            )
            .map_err(LayoutError::backend)?;
        }

        Ok(live.len())
    }

    /// Freeze-position variant of the layout pass: every live window is
    /// recorded at its current corner and resized there.
    fn freeze_in_place<W: WindowPrimitives>(
        &mut self,
        wm: &W,
        live: &[WindowHandle],
        cell: CellSize,
        options: PlacementOptions,
    ) -> Result<usize, LayoutError> {
        for handle in live {
            let rect = wm.window_rect(*handle).map_err(LayoutError::backend)?;
            let record = self.table.place(*handle, (rect.x, rect.y));
            debug!("  {} stays at ({}, {}) #{}", handle, record.x, record.y, record.order);
            strip_style(wm, *handle, options)?;
            wm.set_window_rect(
                *handle,
                WindowRect::new(rect.x, rect.y, cell.width, cell.height),
            )
            .map_err(LayoutError::backend)?;
        }
        Ok(live.len())
    }

    /// Tracked windows in insertion order, with live title and style.
    ///
    /// Handles that are no longer valid are skipped silently.
    pub fn list_tracked<W: WindowPrimitives>(&self, wm: &W) -> Vec<TrackedWindow> {
        self.table
            .sorted()
            .into_iter()
            .filter(|(handle, _)| wm.is_window(*handle))
            .filter_map(|(handle, record)| {
                let title = wm.window_title(handle).ok()?;
                let style = wm.window_style(handle).ok()?;
                Some(TrackedWindow {
                    order: record.order,
                    title,
                    handle,
                    x: record.x,
                    y: record.y,
                    has_caption: style.caption,
                    has_border: style.border,
                })
            })
            .collect()
    }

    /// Change the title of `handle`.
    pub fn rename<W: WindowPrimitives>(
        &self,
        wm: &W,
        handle: WindowHandle,
        title: &str,
    ) -> Result<(), LayoutError> {
        ensure_live(wm, handle)?;
        wm.set_window_title(handle, title)
            .map_err(LayoutError::backend)
    }

    /// Set caption and border presence on `handle`.
    ///
    /// Unlike the layout pass, this sets both bits absolutely: `false`
    /// restores a previously removed caption or border.
    pub fn restyle<W: WindowPrimitives>(
        &self,
        wm: &W,
        handle: WindowHandle,
        remove_caption: bool,
        remove_border: bool,
    ) -> Result<(), LayoutError> {
        ensure_live(wm, handle)?;
        let style = WindowStyle {
            caption: !remove_caption,
            border: !remove_border,
        };
        wm.set_window_style(handle, style)
            .map_err(LayoutError::backend)
    }

    /// Move and resize `handle` directly.  The tracked record is left as it
    /// was.
    pub fn reposition<W: WindowPrimitives>(
        &self,
        wm: &W,
        handle: WindowHandle,
        rect: WindowRect,
    ) -> Result<(), LayoutError> {
        ensure_live(wm, handle)?;
        wm.set_window_rect(handle, rect)
            .map_err(LayoutError::backend)
    }

    /// Rename, restyle and reposition one window, stopping at the first
    /// failure.  The rename is skipped when the title is already `edit.title`.
    pub fn edit_window<W: WindowPrimitives>(
        &self,
        wm: &W,
        edit: &WindowEdit,
    ) -> Result<(), EditError> {
        let unchanged = wm
            .window_title(edit.handle)
            .map(|current| current == edit.title)
            .unwrap_or(false);
        if !unchanged {
            self.rename(wm, edit.handle, &edit.title)
                .map_err(|source| EditError {
                    step: EditStep::Rename,
                    source,
                })?;
        }
        self.restyle(wm, edit.handle, edit.remove_caption, edit.remove_border)
            .map_err(|source| EditError {
                step: EditStep::Restyle,
                source,
            })?;
        let rect = WindowRect::new(edit.x, edit.y, edit.width, edit.height);
        self.reposition(wm, edit.handle, rect)
            .map_err(|source| EditError {
                step: EditStep::Move,
                source,
            })
    }
}

/// Handles of visible windows titled exactly `title`, in enumeration order,
/// without duplicates.
fn matching_windows<W: WindowPrimitives>(
    wm: &W,
    title: &str,
) -> Result<Vec<WindowHandle>, LayoutError> {
    let mut seen = HashSet::new();
    Ok(wm
        .visible_windows()
        .map_err(LayoutError::backend)?
        .into_iter()
        .filter(|(_, t)| t == title)
        .map(|(h, _)| h)
        .filter(|h| seen.insert(*h))
        .collect())
}

/// Clear the caption and/or border bits requested by `options`.  Bits that
/// are not requested are left untouched.
fn strip_style<W: WindowPrimitives>(
    wm: &W,
    handle: WindowHandle,
    options: PlacementOptions,
) -> Result<(), LayoutError> {
    if !options.remove_caption && !options.remove_border {
        return Ok(());
    }
    let current = wm.window_style(handle).map_err(LayoutError::backend)?;
    let wanted = WindowStyle {
        caption: current.caption && !options.remove_caption,
        border: current.border && !options.remove_border,
    };
    if wanted != current {
        wm.set_window_style(handle, wanted)
            .map_err(LayoutError::backend)?;
    }
    Ok(())
}

fn ensure_live<W: WindowPrimitives>(wm: &W, handle: WindowHandle) -> Result<(), LayoutError> {
    if wm.is_window(handle) {
        Ok(())
    } else {
        Err(LayoutError::InvalidHandle(handle))
    }
}

//  Tests
