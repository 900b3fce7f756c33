//! Incremental occupancy bookkeeping
//!
//! Every footprint added to the grid is remembered per object as the exact
//! cell ranges that were incremented, so removal reverses it precisely and
//! counts never go negative.
//!
//! While temporary clears are active, a cell inside a cleared region keeps
//! its live count at zero. Footprint changes to such a cell are applied to
//! the oldest clear holding it, so the restored counts include them.

use ahash::AHashMap;

use crate::core::types::{CellRect, ObjectId, WorldRect};
use crate::grid::store::GridStore;

/// Saved counts of a region that was temporarily zeroed
#[derive(Debug, Clone)]
struct TemporaryClear {
    range: CellRect,
    saved: Vec<u16>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CountChange {
    Increment,
    Decrement,
}

/// Tracks which cells each dynamic object occupies
#[derive(Debug, Default)]
pub struct OccupancyTracker {
    footprints: AHashMap<ObjectId, Vec<CellRect>>,
    temporary: Vec<TemporaryClear>,
}

impl OccupancyTracker {
    pub fn new() -> Self {
        Self {
            footprints: AHashMap::new(),
            temporary: Vec::new(),
        }
    }

    /// Occupy the cells under `rects` on behalf of `id`
    ///
    /// Replaces any footprint already recorded for the object. Returns the
    /// number of cell ranges recorded; zero when the grid is uninitialized or
    /// every rectangle misses it.
    pub fn add_object_footprint(
        &mut self,
        grid: &mut GridStore,
        id: ObjectId,
        rects: &[WorldRect],
    ) -> usize {
        if !grid.is_initialized() {
            return 0;
        }

        self.remove_object_footprint(grid, id);

        let ranges: Vec<CellRect> = rects
            .iter()
            .filter_map(|rect| grid.rect_to_cells(*rect))
            .collect();
        if ranges.is_empty() {
            return 0;
        }

        for range in &ranges {
            self.apply_range(grid, *range, CountChange::Increment);
        }

        let count = ranges.len();
        self.footprints.insert(id, ranges);
        count
    }

    /// Release the cells recorded for `id`
    ///
    /// Returns false when nothing was recorded, e.g. for objects inserted
    /// before the grid existed.
    pub fn remove_object_footprint(&mut self, grid: &mut GridStore, id: ObjectId) -> bool {
        let Some(ranges) = self.footprints.remove(&id) else {
            return false;
        };

        for range in ranges {
            self.apply_range(grid, range, CountChange::Decrement);
        }
        true
    }

    fn apply_range(&mut self, grid: &mut GridStore, range: CellRect, change: CountChange) {
        if self.temporary.is_empty() {
            match change {
                CountChange::Increment => grid.increment_range(range),
                CountChange::Decrement => grid.decrement_range(range),
            }
            return;
        }

        for cell in range.cells() {
            // Later clears saved the zero left by earlier ones
            let held = self.temporary.iter_mut().find_map(|clear| {
                let offset = clear.range.offset_of(cell)?;
                clear.saved.get_mut(offset)
            });

            match (held, change) {
                (Some(saved), CountChange::Increment) => *saved += 1,
                (Some(saved), CountChange::Decrement) => {
                    debug_assert!(*saved > 0, "occupancy underflow at {:?}", cell);
                    *saved = saved.saturating_sub(1);
                }
                (None, CountChange::Increment) => grid.increment_cell(cell),
                (None, CountChange::Decrement) => grid.decrement_cell(cell),
            }
        }
    }

    pub fn has_footprint(&self, id: ObjectId) -> bool {
        self.footprints.contains_key(&id)
    }

    /// Cell ranges currently recorded for an object
    pub fn footprint(&self, id: ObjectId) -> Option<&[CellRect]> {
        self.footprints.get(&id).map(Vec::as_slice)
    }

    pub fn tracked_objects(&self) -> usize {
        self.footprints.len()
    }

    /// Treat a region as empty until `pop_all_temporary_clears`
    ///
    /// Returns false when the rectangle misses the grid.
    pub fn push_temporary_clear(&mut self, grid: &mut GridStore, rect: WorldRect) -> bool {
        let Some(range) = grid.rect_to_cells(rect) else {
            return false;
        };

        let saved = grid.snapshot_range(range);
        grid.clear_range(range);
        self.temporary.push(TemporaryClear { range, saved });
        true
    }

    /// Restore every temporarily cleared region, most recent first
    pub fn pop_all_temporary_clears(&mut self, grid: &mut GridStore) {
        while let Some(clear) = self.temporary.pop() {
            grid.restore_range(clear.range, &clear.saved);
        }
    }

    pub fn temporary_clear_depth(&self) -> usize {
        self.temporary.len()
    }

    /// Forget all records without touching any grid
    ///
    /// Used when the grid they refer to is rebuilt or released.
    pub fn clear(&mut self) {
        self.footprints.clear();
        self.temporary.clear();
    }
}
