//! Turning raw cell paths into waypoints
//!
//! Two passes: straight runs collapse to their end points, then an optional
//! greedy line-of-sight pass drops every waypoint the agent can walk past in
//! a straight line.

use glam::Vec2;

use crate::core::types::CellCoord;
use crate::grid::store::GridStore;

/// Widest footprint the line-of-sight test can sample, in cells
pub const MAX_SMOOTHING_UNIT: u32 = 2;

/// Keeps offset sample lines off the exact boundary of the footprint
const EDGE_INSET: f32 = 0.05;

fn gcd(a: i32, b: i32) -> i32 {
    if b == 0 {
        a.abs()
    } else {
        gcd(b, a % b)
    }
}

/// Reduced direction between two cells
fn direction(from: CellCoord, to: CellCoord) -> (i32, i32) {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    match gcd(dx, dy) {
        0 => (0, 0),
        g => (dx / g, dy / g),
    }
}

/// Drop cells that sit in the middle of a straight run
///
/// Keeps the first and last cell and every cell where the direction of
/// travel changes. Running it on its own output changes nothing.
pub fn remove_fictitious_points(path: &[CellCoord]) -> Vec<CellCoord> {
    if path.len() <= 2 {
        return path.to_vec();
    }

    let mut reduced = Vec::with_capacity(path.len());
    reduced.push(path[0]);

    let mut heading = direction(path[0], path[1]);
    for pair in path[1..].windows(2) {
        let next_heading = direction(pair[0], pair[1]);
        if next_heading != heading {
            reduced.push(pair[0]);
            heading = next_heading;
        }
    }

    reduced.push(path[path.len() - 1]);
    reduced
}

/// Fail loudly for footprints the smoothing pass cannot check
///
/// # Panics
///
/// Panics when `unit_size` is zero or wider than [`MAX_SMOOTHING_UNIT`].
pub fn assert_smoothable(unit_size: u32) {
    assert!(
        (1..=MAX_SMOOTHING_UNIT).contains(&unit_size),
        "path smoothing supports footprints of 1 to {} cells, got {}",
        MAX_SMOOTHING_UNIT,
        unit_size
    );
}

/// Whether an agent can move in a straight line between two anchor cells
///
/// Samples the segment between the footprint centers every `step` cells.
/// A one-cell agent is checked along two lines offset half a cell to each
/// side of the direction of travel; a two-cell agent along the center line
/// and two lines offset by a full cell.
pub fn has_line_of_sight(
    grid: &GridStore,
    from: CellCoord,
    to: CellCoord,
    unit_size: u32,
    step: f32,
) -> bool {
    assert_smoothable(unit_size);

    let half = unit_size as f32 * 0.5;
    let edge = half - EDGE_INSET;
    let offsets: &[f32] = if unit_size == 1 {
        &[-edge, edge]
    } else {
        &[-edge, 0.0, edge]
    };

    let a = Vec2::new(from.x as f32 + half, from.y as f32 + half);
    let b = Vec2::new(to.x as f32 + half, to.y as f32 + half);
    let delta = b - a;
    let length = delta.length();
    if length <= f32::EPSILON {
        return grid.is_walkable(from, unit_size);
    }

    let heading = delta / length;
    let normal = heading.perp();
    let samples = (length / step).ceil() as usize;

    offsets.iter().all(|&offset| {
        let line_start = a + normal * offset;
        (0..=samples).all(|i| {
            let along = (i as f32 * step).min(length);
            let point = line_start + heading * along;
            grid.is_cell_free(CellCoord::new(point.x.floor() as i32, point.y.floor() as i32))
        })
    })
}

/// Greedily skip waypoints that are in direct line of sight
///
/// Expects a path from [`remove_fictitious_points`]; consecutive points of
/// such a path are always mutually visible.
pub fn smooth_path(
    grid: &GridStore,
    points: &[CellCoord],
    unit_size: u32,
    step: f32,
) -> Vec<CellCoord> {
    assert_smoothable(unit_size);

    if points.len() <= 2 {
        return points.to_vec();
    }

    let mut smoothed = Vec::with_capacity(points.len());
    smoothed.push(points[0]);
    let mut anchor = 0;

    for candidate in 2..points.len() {
        if !has_line_of_sight(grid, points[anchor], points[candidate], unit_size, step) {
            anchor = candidate - 1;
            smoothed.push(points[anchor]);
        }
    }

    smoothed.push(points[points.len() - 1]);
    smoothed
}

/// Cell centers in world space
pub fn cells_to_world(grid: &GridStore, cells: &[CellCoord], out: &mut Vec<Vec2>) {
    out.extend(cells.iter().map(|&cell| grid.cell_to_world_center(cell)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::WorldRect;

    fn c(x: i32, y: i32) -> CellCoord {
        CellCoord::new(x, y)
    }

    fn open_grid(size: f32) -> GridStore {
        let mut grid = GridStore::new();
        grid.initialize(WorldRect::new(Vec2::ZERO, Vec2::splat(size)), 1.0);
        grid
    }

    #[test]
    fn test_collapses_straight_runs() {
        let path = vec![c(0, 0), c(1, 0), c(2, 0), c(3, 1), c(4, 2), c(4, 3), c(4, 4)];
        let reduced = remove_fictitious_points(&path);
        assert_eq!(reduced, vec![c(0, 0), c(2, 0), c(4, 2), c(4, 4)]);
    }

    #[test]
    fn test_fictitious_removal_idempotent() {
        let path = vec![c(0, 0), c(1, 1), c(2, 2), c(3, 2), c(4, 2), c(5, 3)];
        let once = remove_fictitious_points(&path);
        let twice = remove_fictitious_points(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_short_paths_untouched() {
        assert!(remove_fictitious_points(&[]).is_empty());
        assert_eq!(remove_fictitious_points(&[c(1, 1)]), vec![c(1, 1)]);
        assert_eq!(
            remove_fictitious_points(&[c(1, 1), c(2, 2)]),
            vec![c(1, 1), c(2, 2)]
        );
    }

    #[test]
    fn test_line_of_sight_open_and_blocked() {
        let mut grid = open_grid(10.0);
        assert!(has_line_of_sight(&grid, c(0, 0), c(9, 4), 1, 0.25));

        grid.block_cell(c(5, 2));
        assert!(!has_line_of_sight(&grid, c(0, 0), c(9, 4), 1, 0.25));
        assert!(has_line_of_sight(&grid, c(0, 5), c(9, 5), 1, 0.25));
    }

    #[test]
    fn test_line_of_sight_uses_footprint_width() {
        let mut grid = open_grid(10.0);
        // Obstacle right next to row 3
        grid.block_cell(c(5, 4));

        assert!(has_line_of_sight(&grid, c(0, 3), c(9, 3), 1, 0.25));
        assert!(!has_line_of_sight(&grid, c(0, 3), c(8, 3), 2, 0.25));
        assert!(has_line_of_sight(&grid, c(0, 2), c(8, 2), 2, 0.25));
    }

    #[test]
    #[should_panic(expected = "path smoothing supports")]
    fn test_wide_footprint_panics() {
        let grid = open_grid(10.0);
        has_line_of_sight(&grid, c(0, 0), c(5, 5), 3, 0.25);
    }

    #[test]
    fn test_smoothing_around_corner() {
        // L-shaped wall; the reduced path hugs it with three turns
        let mut grid = open_grid(10.0);
        for y in 0..6 {
            grid.block_cell(c(4, y));
        }

        let reduced = vec![c(0, 0), c(3, 3), c(3, 6), c(5, 6), c(8, 3)];
        let smoothed = smooth_path(&grid, &reduced, 1, 0.25);

        assert_eq!(smoothed, vec![c(0, 0), c(3, 6), c(5, 6), c(8, 3)]);
        for pair in smoothed.windows(2) {
            assert!(has_line_of_sight(&grid, pair[0], pair[1], 1, 0.25));
        }
    }

    #[test]
    fn test_smoothing_straightens_open_path() {
        let grid = open_grid(10.0);
        let reduced = vec![c(0, 0), c(3, 3), c(7, 3), c(9, 5)];
        assert_eq!(smooth_path(&grid, &reduced, 1, 0.25), vec![c(0, 0), c(9, 5)]);
    }

    #[test]
    fn test_world_conversion() {
        let mut grid = GridStore::new();
        grid.initialize(
            WorldRect::new(Vec2::new(-5.0, 10.0), Vec2::new(5.0, 20.0)),
            2.0,
        );
        let mut out = Vec::new();
        cells_to_world(&grid, &[c(0, 0), c(2, 1)], &mut out);
        assert_eq!(out, vec![Vec2::new(-4.0, 11.0), Vec2::new(0.0, 13.0)]);
    }
}
