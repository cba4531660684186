//! Grid cells and the tracked-window table.
//!
//! Each [`DisplayRegion`] is cut into `cols × rows` cells of a fixed
//! [`CellSize`].  Cells are identified by their top-left corner in screen
//! coordinates, so cells from different regions never need a region index.
//!
//! The [`PlacementTable`] maps live window handles to the cell they were
//! given.  Entries keep their cell across layout passes and carry an
//! insertion `order` that is never reused, even after eviction.

use crate::command::{CellSize, DisplayRegion, WindowHandle};
use std::collections::{HashMap, HashSet};

/// Top-left corner of a cell in screen coordinates.
pub type Position = (i32, i32);

/// How many whole cells fit into `region`, as `(cols, rows)`.
pub fn capacity(region: &DisplayRegion, cell: CellSize) -> (u32, u32) {
    if cell.width == 0 || cell.height == 0 {
        return (0, 0);
    }
    (region.width / cell.width, region.height / cell.height)
}

/// Every cell of every region, row-major within a region, regions in the
/// order given.
pub fn candidate_cells(regions: &[DisplayRegion], cell: CellSize) -> Vec<Position> {
    let mut cells = Vec::new();
    for region in regions {
        let (cols, rows) = capacity(region, cell);
        for row in 0..rows {
            for col in 0..cols {
                cells.push((
                    offset(region.left, col * cell.width),
                    offset(region.top, row * cell.height),
                ));
            }
        }
    }
    cells
}

/// `base + delta`, clamped to the `i32` range.
fn offset(base: i32, delta: u32) -> i32 {
    base.saturating_add(i32::try_from(delta).unwrap_or(i32::MAX))
}

/// Candidate cells that no entry in `occupied` already holds, in
/// enumeration order.
pub fn available_cells(
    regions: &[DisplayRegion],
    cell: CellSize,
    occupied: &HashSet<Position>,
) -> Vec<Position> {
    candidate_cells(regions, cell)
        .into_iter()
        .filter(|pos| !occupied.contains(pos))
        .collect()
}

/// Append `extra` overflow positions to `available`.
///
/// Each new position sits one cell width to the right of the position
/// appended before it (or of the last real cell for the first one), on the
/// same row.  An empty list starts at `(0, 0)`.  The resulting positions may
/// fall off-screen or coincide with real cells; that is accepted.  They stop
/// at `i32::MAX` instead of wrapping.
pub fn extend_with_overflow(available: &mut Vec<Position>, extra: usize, cell_width: u32) {
    for _ in 0..extra {
        let next = match available.last() {
            Some(&(x, y)) => (offset(x, cell_width), y),
            None => (0, 0),
        };
        available.push(next);
    }
}

/// Where a tracked window lives and when it was first seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementRecord {
    pub x: i32,
    pub y: i32,
    /// Insertion sequence number, starting at 1.
    pub order: u64,
}

impl PlacementRecord {
    pub fn position(&self) -> Position {
        (self.x, self.y)
    }
}

/// The tracked-window set.
#[derive(Debug, Clone)]
pub struct PlacementTable {
    /// `handle -> record`.
    records: HashMap<WindowHandle, PlacementRecord>,
    /// Counter used to allocate the next `order`.
    next_order: u64,
}

impl Default for PlacementTable {
    fn default() -> Self {
        Self::new()
    }
}

impl PlacementTable {
    pub fn new() -> Self {
        Self {
            records: HashMap::new(),
            next_order: 1,
        }
    }

    //  Accessors

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, handle: WindowHandle) -> Option<&PlacementRecord> {
        self.records.get(&handle)
    }

    pub fn contains(&self, handle: WindowHandle) -> bool {
        self.records.contains_key(&handle)
    }

    /// Positions held by tracked entries.
    pub fn occupied(&self) -> HashSet<Position> {
        self.records.values().map(PlacementRecord::position).collect()
    }

    /// Every entry, ascending by `order`.
    pub fn sorted(&self) -> Vec<(WindowHandle, PlacementRecord)> {
        let mut entries: Vec<_> = self.records.iter().map(|(h, r)| (*h, *r)).collect();
        entries.sort_by_key(|(_, r)| r.order);
        entries
    }

    //  Mutation

    /// Drop every entry whose handle is not in `live`.  Returns the evicted
    /// handles, ascending by their former `order`.
    pub fn evict_missing(&mut self, live: &[WindowHandle]) -> Vec<WindowHandle> {
        let live: HashSet<WindowHandle> = live.iter().copied().collect();
        let mut gone: Vec<(WindowHandle, u64)> = self
            .records
            .iter()
            .filter(|(h, _)| !live.contains(h))
            .map(|(h, r)| (*h, r.order))
            .collect();
        gone.sort_by_key(|(_, order)| *order);
        for (handle, _) in &gone {
            self.records.remove(handle);
        }
        gone.into_iter().map(|(h, _)| h).collect()
    }

    /// Record `handle` at `position`.
    ///
    /// An existing entry keeps its `order` and only moves; a new entry gets
    /// the next `order`.
    pub fn place(&mut self, handle: WindowHandle, position: Position) -> PlacementRecord {
        let order = match self.records.get(&handle) {
            Some(existing) => existing.order,
            None => self.allocate_order(),
        };
        let record = PlacementRecord {
            x: position.0,
            y: position.1,
            order,
        };
        self.records.insert(handle, record);
        record
    }

    //  Internal

    fn allocate_order(&mut self) -> u64 {
        let order = self.next_order;
        self.next_order += 1;
        order
    }
}

//  Tests
