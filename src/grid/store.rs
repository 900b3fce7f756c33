//! Occupancy storage for the motion map
//!
//! Each cell holds a reference count of the things obstructing it. A cell is
//! free iff its count is zero; overlapping footprints simply stack.

use glam::Vec2;

use crate::core::types::{CellCoord, CellRect, WorldRect};

/// Fixed-size occupancy grid over a rectangular world region
#[derive(Debug, Clone)]
pub struct GridStore {
    bounds: WorldRect,
    cell_size: f32,
    inv_cell_size: f32,
    width: usize,
    height: usize,
    counts: Vec<u16>,
    initialized: bool,
}

impl GridStore {
    /// Create an uninitialized grid
    pub fn new() -> Self {
        Self {
            bounds: WorldRect::new(Vec2::ZERO, Vec2::ZERO),
            cell_size: 0.0,
            inv_cell_size: 0.0,
            width: 0,
            height: 0,
            counts: Vec::new(),
            initialized: false,
        }
    }

    /// Allocate a grid of `floor(size / cell_size)` cells on each axis
    ///
    /// A non-positive cell size or a degenerate region yields a 0×0 grid.
    pub fn initialize(&mut self, bounds: WorldRect, cell_size: f32) {
        let size = bounds.size();
        let valid = cell_size > 0.0 && cell_size.is_finite();

        self.bounds = bounds;
        self.cell_size = if valid { cell_size } else { 0.0 };
        self.inv_cell_size = if valid { 1.0 / cell_size } else { 0.0 };
        self.width = Self::axis_cells(size.x, self.inv_cell_size);
        self.height = Self::axis_cells(size.y, self.inv_cell_size);
        self.counts = vec![0; self.width * self.height];
        self.initialized = true;
    }

    fn axis_cells(extent: f32, inv_cell_size: f32) -> usize {
        if extent > 0.0 && inv_cell_size > 0.0 {
            (extent * inv_cell_size).floor() as usize
        } else {
            0
        }
    }

    /// Release all storage and mark the grid uninitialized
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn bounds(&self) -> WorldRect {
        self.bounds
    }

    /// World position of the grid's (0, 0) corner
    pub fn origin(&self) -> Vec2 {
        self.bounds.min
    }

    #[inline]
    pub fn in_bounds(&self, cell: CellCoord) -> bool {
        cell.x >= 0
            && cell.y >= 0
            && (cell.x as usize) < self.width
            && (cell.y as usize) < self.height
    }

    /// Flat array index of an in-bounds cell
    #[inline]
    pub fn index(&self, cell: CellCoord) -> Option<usize> {
        if self.in_bounds(cell) {
            Some(cell.y as usize * self.width + cell.x as usize)
        } else {
            None
        }
    }

    /// Cell coordinates of a flat index
    #[inline]
    pub fn coord(&self, index: usize) -> CellCoord {
        CellCoord::new((index % self.width) as i32, (index / self.width) as i32)
    }

    fn max_cell(&self) -> CellCoord {
        // Clamp targets stay at index 0 even for a 0×0 grid
        CellCoord::new(
            self.width.saturating_sub(1) as i32,
            self.height.saturating_sub(1) as i32,
        )
    }

    /// Convert world position to cell coordinates, `None` outside the grid
    pub fn world_to_cell(&self, pos: Vec2) -> Option<CellCoord> {
        if !self.initialized || !pos.is_finite() {
            return None;
        }
        let local = (pos - self.origin()) * self.inv_cell_size;
        let cell = CellCoord::new(local.x.floor() as i32, local.y.floor() as i32);
        self.in_bounds(cell).then_some(cell)
    }

    /// Convert world position to the nearest cell inside the grid
    ///
    /// `None` for NaN or infinite positions, which have no nearest cell.
    pub fn world_to_cell_clamped(&self, pos: Vec2) -> Option<CellCoord> {
        if !pos.is_finite() {
            return None;
        }
        let local = (pos - self.origin()) * self.inv_cell_size;
        let max = self.max_cell();
        Some(CellCoord::new(
            (local.x.floor() as i32).clamp(0, max.x),
            (local.y.floor() as i32).clamp(0, max.y),
        ))
    }

    /// Cell center in world coordinates
    pub fn cell_to_world_center(&self, cell: CellCoord) -> Vec2 {
        self.origin()
            + Vec2::new(
                (cell.x as f32 + 0.5) * self.cell_size,
                (cell.y as f32 + 0.5) * self.cell_size,
            )
    }

    /// World-space extent of a cell
    pub fn cell_world_rect(&self, cell: CellCoord) -> WorldRect {
        let min = self.origin()
            + Vec2::new(cell.x as f32 * self.cell_size, cell.y as f32 * self.cell_size);
        WorldRect::new(min, min + Vec2::splat(self.cell_size))
    }

    /// Range of cells overlapped by a world rectangle, clamped to the grid
    ///
    /// Returns `None` when the rectangle misses the grid entirely.
    pub fn rect_to_cells(&self, rect: WorldRect) -> Option<CellRect> {
        if !self.initialized || self.width == 0 || self.height == 0 {
            return None;
        }
        if !rect.min.is_finite() || !rect.max.is_finite() {
            return None;
        }

        let lo = (rect.min.min(rect.max) - self.origin()) * self.inv_cell_size;
        let hi = (rect.min.max(rect.max) - self.origin()) * self.inv_cell_size;

        let min_x = lo.x.floor() as i32;
        let min_y = lo.y.floor() as i32;
        // A zero-width rectangle still covers the cell it sits in
        let max_x = (hi.x.ceil() as i32 - 1).max(min_x);
        let max_y = (hi.y.ceil() as i32 - 1).max(min_y);

        let max = self.max_cell();
        if max_x < 0 || max_y < 0 || min_x > max.x || min_y > max.y {
            return None;
        }

        Some(CellRect::new(
            min_x.max(0),
            min_y.max(0),
            max_x.min(max.x),
            max_y.min(max.y),
        ))
    }

    /// Occupancy count of a cell
    #[inline]
    pub fn count(&self, cell: CellCoord) -> Option<u16> {
        self.index(cell).map(|i| self.counts[i])
    }

    #[inline]
    pub fn is_cell_free(&self, cell: CellCoord) -> bool {
        self.index(cell).map_or(false, |i| self.counts[i] == 0)
    }

    /// Whether an agent of `unit_size` × `unit_size` cells fits with its
    /// minimum corner at `cell`
    pub fn is_walkable(&self, cell: CellCoord, unit_size: u32) -> bool {
        let n = unit_size.max(1) as i32;
        if cell.x < 0
            || cell.y < 0
            || cell.x as usize + n as usize > self.width
            || cell.y as usize + n as usize > self.height
        {
            return false;
        }

        for y in cell.y..cell.y + n {
            let row = y as usize * self.width;
            for x in cell.x..cell.x + n {
                if self.counts[row + x as usize] != 0 {
                    return false;
                }
            }
        }
        true
    }

    /// Whether every cell of an in-bounds range is free
    pub fn is_range_free(&self, range: CellRect) -> bool {
        range.cells().all(|cell| self.is_cell_free(cell))
    }

    pub fn increment_range(&mut self, range: CellRect) {
        for cell in range.cells() {
            self.increment_cell(cell);
        }
    }

    pub fn decrement_range(&mut self, range: CellRect) {
        for cell in range.cells() {
            self.decrement_cell(cell);
        }
    }

    #[inline]
    pub fn increment_cell(&mut self, cell: CellCoord) {
        if let Some(i) = self.index(cell) {
            self.counts[i] += 1;
        }
    }

    #[inline]
    pub fn decrement_cell(&mut self, cell: CellCoord) {
        if let Some(i) = self.index(cell) {
            debug_assert!(self.counts[i] > 0, "occupancy underflow at {:?}", cell);
            self.counts[i] = self.counts[i].saturating_sub(1);
        }
    }

    /// Permanently obstruct a single cell
    pub fn block_cell(&mut self, cell: CellCoord) {
        self.increment_cell(cell);
    }

    /// Copy the counts of a range, row by row
    pub fn snapshot_range(&self, range: CellRect) -> Vec<u16> {
        range
            .cells()
            .map(|cell| self.count(cell).unwrap_or(0))
            .collect()
    }

    /// Write back counts previously taken with `snapshot_range`
    pub fn restore_range(&mut self, range: CellRect, values: &[u16]) {
        for (cell, &value) in range.cells().zip(values) {
            if let Some(i) = self.index(cell) {
                self.counts[i] = value;
            }
        }
    }

    pub fn clear_range(&mut self, range: CellRect) {
        for cell in range.cells() {
            if let Some(i) = self.index(cell) {
                self.counts[i] = 0;
            }
        }
    }

    /// Number of cells with a non-zero count
    pub fn occupied_cell_count(&self) -> usize {
        self.counts.iter().filter(|&&c| c != 0).count()
    }

    /// Raw occupancy counts in row-major order
    pub fn counts(&self) -> &[u16] {
        &self.counts
    }
}

impl Default for GridStore {
    fn default() -> Self {
        Self::new()
    }
}
