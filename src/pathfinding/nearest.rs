//! Relocating points that land on occupied cells

use crate::core::types::CellCoord;
use crate::grid::store::GridStore;

/// Cells at Chebyshev distance exactly `radius` from `center`
///
/// Order: top row left to right, bottom row left to right, then the left
/// and right columns without their corners, top to bottom.
pub fn ring(center: CellCoord, radius: i32) -> impl Iterator<Item = CellCoord> {
    let r = radius.max(1);
    let rows = [-r, r].into_iter().flat_map(move |dy| {
        (-r..=r).map(move |dx| center.offset(dx, dy))
    });
    let columns = [-r, r].into_iter().flat_map(move |dx| {
        (-r + 1..r).map(move |dy| center.offset(dx, dy))
    });
    rows.chain(columns)
}

/// Closest cell, by ring, where an agent of `unit_size` cells fits
///
/// Returns `cell` itself when it is already walkable. A cell outside the
/// grid is first clamped onto its edge. Rings grow until they no longer touch
/// the grid; `None` means no cell fits anywhere.
pub fn nearest_free_cell(grid: &GridStore, cell: CellCoord, unit_size: u32) -> Option<CellCoord> {
    if !grid.is_initialized() || grid.cell_count() == 0 {
        return None;
    }

    let width = grid.width() as i32;
    let height = grid.height() as i32;
    let cell = CellCoord::new(cell.x.clamp(0, width - 1), cell.y.clamp(0, height - 1));
    if grid.is_walkable(cell, unit_size) {
        return Some(cell);
    }

    let mut radius = 1;

    loop {
        let beyond_grid = cell.x - radius < 0
            && cell.y - radius < 0
            && cell.x + radius >= width
            && cell.y + radius >= height;
        if let Some(found) = ring(cell, radius).find(|&c| grid.is_walkable(c, unit_size)) {
            return Some(found);
        }
        if beyond_grid {
            return None;
        }
        radius += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{CellRect, WorldRect};
    use ahash::AHashSet;
    use glam::Vec2;

    fn grid(size: f32) -> GridStore {
        let mut grid = GridStore::new();
        grid.initialize(WorldRect::new(Vec2::ZERO, Vec2::splat(size)), 1.0);
        grid
    }

    #[test]
    fn test_ring_covers_whole_perimeter() {
        for radius in 1..5 {
            let cells: Vec<CellCoord> = ring(CellCoord::new(0, 0), radius).collect();
            let unique: AHashSet<CellCoord> = cells.iter().copied().collect();

            assert_eq!(cells.len(), (8 * radius) as usize);
            assert_eq!(unique.len(), cells.len(), "ring visits a cell twice");
            assert!(cells.iter().all(|c| c.chebyshev(CellCoord::new(0, 0)) == radius));
        }
    }

    #[test]
    fn test_free_cell_returned_unchanged() {
        let grid = grid(5.0);
        assert_eq!(
            nearest_free_cell(&grid, CellCoord::new(2, 2), 1),
            Some(CellCoord::new(2, 2))
        );
    }

    #[test]
    fn test_finds_each_diagonal_neighbor() {
        // Only one diagonal neighbor left free each time
        for (dx, dy) in [(-1, -1), (1, -1), (-1, 1), (1, 1)] {
            let mut grid = grid(3.0);
            let free = CellCoord::new(1 + dx, 1 + dy);
            for cell in CellRect::new(0, 0, 2, 2).cells() {
                if cell != free {
                    grid.block_cell(cell);
                }
            }
            assert_eq!(nearest_free_cell(&grid, CellCoord::new(1, 1), 1), Some(free));
        }
    }

    #[test]
    fn test_prefers_smaller_ring() {
        let mut grid = grid(9.0);
        for cell in CellRect::new(3, 3, 5, 5).cells() {
            grid.block_cell(cell);
        }
        let found = nearest_free_cell(&grid, CellCoord::new(4, 4), 1).unwrap();
        assert_eq!(found.chebyshev(CellCoord::new(4, 4)), 2);
        // Top row is scanned first, left to right
        assert_eq!(found, CellCoord::new(2, 2));
    }

    #[test]
    fn test_respects_unit_size() {
        let mut grid = grid(6.0);
        grid.block_cell(CellCoord::new(2, 2));
        let found = nearest_free_cell(&grid, CellCoord::new(2, 2), 2).unwrap();
        assert!(grid.is_walkable(found, 2));
    }

    #[test]
    fn test_full_grid_gives_none() {
        let mut grid = grid(4.0);
        for cell in CellRect::new(0, 0, 3, 3).cells() {
            grid.block_cell(cell);
        }
        assert_eq!(nearest_free_cell(&grid, CellCoord::new(0, 0), 1), None);
        assert_eq!(nearest_free_cell(&GridStore::new(), CellCoord::new(0, 0), 1), None);
    }

    #[test]
    fn test_far_outside_cell_clamped_onto_grid() {
        let mut grid = grid(4.0);
        grid.block_cell(CellCoord::new(3, 0));
        // Clamped to (3, 0); the first free ring cell is on the row below
        assert_eq!(
            nearest_free_cell(&grid, CellCoord::new(1_000_000_000, -7), 1),
            Some(CellCoord::new(2, 1))
        );
        assert_eq!(
            nearest_free_cell(&grid, CellCoord::new(i32::MIN, i32::MAX), 1),
            Some(CellCoord::new(0, 3))
        );
    }
}
