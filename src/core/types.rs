//! Core type definitions used throughout the codebase

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for world objects that occupy grid cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub Uuid);

impl ObjectId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

/// Integer grid cell coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CellCoord {
    pub x: i32,
    pub y: i32,
}

impl CellCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chebyshev distance (max of axis deltas)
    pub fn chebyshev(&self, other: CellCoord) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    /// Manhattan distance (sum of axis deltas)
    pub fn manhattan(&self, other: CellCoord) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    pub fn offset(&self, dx: i32, dy: i32) -> CellCoord {
        CellCoord::new(self.x + dx, self.y + dy)
    }
}

/// Inclusive range of grid cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRect {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl CellRect {
    pub const fn new(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Square block of `size` cells anchored at `anchor` (its minimum corner)
    pub fn block(anchor: CellCoord, size: u32) -> Self {
        let extent = size.max(1) as i32 - 1;
        Self::new(anchor.x, anchor.y, anchor.x + extent, anchor.y + extent)
    }

    pub fn width(&self) -> usize {
        (self.max_x - self.min_x + 1).max(0) as usize
    }

    pub fn height(&self) -> usize {
        (self.max_y - self.min_y + 1).max(0) as usize
    }

    pub fn cell_count(&self) -> usize {
        self.width() * self.height()
    }

    pub fn contains(&self, cell: CellCoord) -> bool {
        cell.x >= self.min_x && cell.x <= self.max_x && cell.y >= self.min_y && cell.y <= self.max_y
    }

    /// Row-major position of `cell` within the range
    pub fn offset_of(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        Some((cell.y - self.min_y) as usize * self.width() + (cell.x - self.min_x) as usize)
    }

    /// Iterate cells row by row
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        (self.min_y..=self.max_y)
            .flat_map(move |y| (self.min_x..=self.max_x).map(move |x| CellCoord::new(x, y)))
    }
}

/// Axis-aligned rectangle on the ground plane (world units)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldRect {
    pub min: Vec2,
    pub max: Vec2,
}

impl WorldRect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn from_center(center: Vec2, half_extents: Vec2) -> Self {
        Self::new(center - half_extents, center + half_extents)
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x
            && point.x < self.max.x
            && point.y >= self.min.y
            && point.y < self.max.y
    }
}

/// Axis-aligned box in world space; z is the vertical axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldVolume {
    pub min: Vec3,
    pub max: Vec3,
}

impl WorldVolume {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Footprint of the box on the ground plane
    pub fn ground_rect(&self) -> WorldRect {
        WorldRect::new(self.min.truncate(), self.max.truncate())
    }

    pub fn intersects(&self, other: &WorldVolume) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_distances() {
        let a = CellCoord::new(0, 0);
        let b = CellCoord::new(3, -4);
        assert_eq!(a.chebyshev(b), 4);
        assert_eq!(a.manhattan(b), 7);
    }

    #[test]
    fn test_block_rect() {
        let rect = CellRect::block(CellCoord::new(2, 3), 2);
        assert_eq!(rect, CellRect::new(2, 3, 3, 4));
        assert_eq!(rect.cell_count(), 4);
        assert_eq!(rect.cells().count(), 4);
        assert!(rect.contains(CellCoord::new(3, 4)));
        assert!(!rect.contains(CellCoord::new(4, 4)));
    }

    #[test]
    fn test_volume_intersection() {
        let a = WorldVolume::new(Vec3::ZERO, Vec3::ONE);
        let b = WorldVolume::new(Vec3::splat(0.5), Vec3::splat(2.0));
        let c = WorldVolume::new(Vec3::new(0.0, 0.0, 1.5), Vec3::new(1.0, 1.0, 2.0));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        assert_eq!(a.ground_rect().size(), Vec2::ONE);
    }
}
