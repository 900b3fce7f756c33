//! Host-world stand-ins built from scenario files
//!
//! `AsciiTerrain` turns a character map into ground heights and solid walls;
//! `BoxObstacle` is a movable object with a single box collider.

use glam::{Vec2, Vec3};

use crate::core::error::{NavError, Result};
use crate::core::types::{ObjectId, WorldRect, WorldVolume};
use crate::grid::builder::Terrain;
use crate::occupancy::footprint::{CollisionShape, NavObstacle};

/// Tolerance for deciding that a point sits on a tile edge
const EDGE_EPSILON: f32 = 1e-4;

/// One character of a scenario map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    /// Walkable ground at the given height level
    Ground(u8),
    /// Solid from the ground up
    Wall,
}

impl Tile {
    fn parse(symbol: char) -> Option<Self> {
        match symbol {
            '.' => Some(Tile::Ground(0)),
            '#' => Some(Tile::Wall),
            '0'..='9' => symbol.to_digit(10).map(|level| Tile::Ground(level as u8)),
            _ => None,
        }
    }

    fn level(self) -> u8 {
        match self {
            Tile::Ground(level) => level,
            Tile::Wall => 0,
        }
    }
}

/// Terrain described by rows of characters, first row at the lowest y
///
/// Ground height at a tile edge or corner is the highest level among the
/// tiles touching it, so the foot of a tall step is the side that reads as
/// steep.
#[derive(Debug, Clone)]
pub struct AsciiTerrain {
    origin: Vec2,
    tile_size: f32,
    level_height: f32,
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
    walls: Vec<WorldVolume>,
}

impl AsciiTerrain {
    pub fn parse<S: AsRef<str>>(
        rows: &[S],
        origin: Vec2,
        tile_size: f32,
        level_height: f32,
    ) -> Result<Self> {
        if rows.is_empty() {
            return Err(NavError::InvalidScenario("map has no rows".into()));
        }
        if !(tile_size > 0.0) {
            return Err(NavError::InvalidScenario(format!(
                "tile size ({}) must be positive",
                tile_size
            )));
        }

        let width = rows[0].as_ref().chars().count();
        if width == 0 {
            return Err(NavError::InvalidScenario("map rows are empty".into()));
        }

        let mut tiles = Vec::with_capacity(width * rows.len());
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.chars().count() != width {
                return Err(NavError::InvalidScenario(format!(
                    "map row {} has {} tiles, expected {}",
                    y,
                    row.chars().count(),
                    width
                )));
            }
            for (x, symbol) in row.chars().enumerate() {
                let tile = Tile::parse(symbol).ok_or_else(|| {
                    NavError::InvalidScenario(format!(
                        "unknown map symbol '{}' at row {}, column {}",
                        symbol, y, x
                    ))
                })?;
                tiles.push(tile);
            }
        }

        let mut terrain = Self {
            origin,
            tile_size,
            level_height,
            width,
            height: rows.len(),
            tiles,
            walls: Vec::new(),
        };
        terrain.walls = terrain.collect_walls();
        Ok(terrain)
    }

    fn collect_walls(&self) -> Vec<WorldVolume> {
        let mut walls = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                if self.tiles[y * self.width + x] == Tile::Wall {
                    let rect = self.tile_rect(x, y);
                    walls.push(WorldVolume::new(
                        rect.min.extend(f32::MIN),
                        rect.max.extend(f32::MAX),
                    ));
                }
            }
        }
        walls
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Area covered by the map
    pub fn bounds(&self) -> WorldRect {
        let size = Vec2::new(self.width as f32, self.height as f32) * self.tile_size;
        WorldRect::new(self.origin, self.origin + size)
    }

    pub fn tile(&self, x: usize, y: usize) -> Option<Tile> {
        (x < self.width && y < self.height).then(|| self.tiles[y * self.width + x])
    }

    pub fn wall_count(&self) -> usize {
        self.walls.len()
    }

    fn tile_rect(&self, x: usize, y: usize) -> WorldRect {
        let min = self.origin + Vec2::new(x as f32, y as f32) * self.tile_size;
        WorldRect::new(min, min + Vec2::splat(self.tile_size))
    }

    /// Tile indices along one axis whose closed extent contains `t`
    fn axis_tiles(t: f32, len: usize) -> std::ops::RangeInclusive<i64> {
        let nearest = t.round();
        let (lo, hi) = if (t - nearest).abs() <= EDGE_EPSILON {
            (nearest as i64 - 1, nearest as i64)
        } else {
            let tile = t.floor() as i64;
            (tile, tile)
        };
        lo.max(0)..=hi.min(len as i64 - 1)
    }
}

impl Terrain for AsciiTerrain {
    fn ground_height(&self, point: Vec2) -> f32 {
        let local = (point - self.origin) / self.tile_size;
        let mut level = 0u8;
        for y in Self::axis_tiles(local.y, self.height) {
            for x in Self::axis_tiles(local.x, self.width) {
                level = level.max(self.tiles[y as usize * self.width + x as usize].level());
            }
        }
        level as f32 * self.level_height
    }

    fn is_volume_free(&self, volume: &WorldVolume) -> bool {
        !self.walls.iter().any(|wall| wall.intersects(volume))
    }
}

/// Axis-aligned box standing on the ground plane
#[derive(Debug, Clone)]
pub struct BoxObstacle {
    id: ObjectId,
    name: String,
    shapes: Vec<CollisionShape>,
}

impl BoxObstacle {
    pub fn new(
        name: impl Into<String>,
        min: Vec2,
        max: Vec2,
        height: f32,
        collidable: bool,
    ) -> Self {
        let bounds = WorldVolume::new(min.extend(0.0), Vec3::new(max.x, max.y, height));
        let shape = if collidable {
            CollisionShape::solid(bounds)
        } else {
            CollisionShape::trigger(bounds)
        };
        Self {
            id: ObjectId::new(),
            name: name.into(),
            shapes: vec![shape],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl NavObstacle for BoxObstacle {
    fn object_id(&self) -> ObjectId {
        self.id
    }

    fn collision_shapes(&self) -> &[CollisionShape] {
        &self.shapes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rejects_bad_maps() {
        let empty: [&str; 0] = [];
        assert!(AsciiTerrain::parse(&empty, Vec2::ZERO, 1.0, 0.5).is_err());
        assert!(AsciiTerrain::parse(&["...", ".."], Vec2::ZERO, 1.0, 0.5).is_err());
        assert!(matches!(
            AsciiTerrain::parse(&["..x"], Vec2::ZERO, 1.0, 0.5),
            Err(NavError::InvalidScenario(_))
        ));
    }

    #[test]
    fn test_first_row_is_lowest_y() {
        let terrain = AsciiTerrain::parse(&["#..", "..."], Vec2::ZERO, 1.0, 0.5).unwrap();
        assert_eq!(terrain.tile(0, 0), Some(Tile::Wall));
        assert_eq!(terrain.tile(0, 1), Some(Tile::Ground(0)));
        assert_eq!(terrain.tile(3, 0), None);
        assert_eq!(terrain.bounds(), WorldRect::new(Vec2::ZERO, Vec2::new(3.0, 2.0)));
    }

    #[test]
    fn test_edge_height_takes_highest_neighbor() {
        let terrain = AsciiTerrain::parse(&[".4"], Vec2::ZERO, 1.0, 0.5).unwrap();
        assert_eq!(terrain.ground_height(Vec2::new(0.0, 0.0)), 0.0);
        assert_eq!(terrain.ground_height(Vec2::new(0.5, 0.5)), 0.0);
        assert_eq!(terrain.ground_height(Vec2::new(1.0, 0.0)), 2.0);
        assert_eq!(terrain.ground_height(Vec2::new(2.0, 1.0)), 2.0);
    }

    #[test]
    fn test_walls_do_not_touch_neighbors() {
        let terrain = AsciiTerrain::parse(&[".#."], Vec2::ZERO, 1.0, 0.5).unwrap();
        let column = |x: f32| {
            WorldVolume::new(Vec3::new(x, 0.0, 0.1), Vec3::new(x + 1.0, 1.0, 2.0))
        };
        assert!(terrain.is_volume_free(&column(0.0)));
        assert!(!terrain.is_volume_free(&column(1.0)));
        assert!(terrain.is_volume_free(&column(2.0)));
    }

    #[test]
    fn test_box_obstacle_footprint() {
        let solid = BoxObstacle::new("crate", Vec2::new(1.0, 1.0), Vec2::new(2.0, 3.0), 1.0, true);
        assert_eq!(
            solid.footprint_rects(),
            vec![WorldRect::new(Vec2::new(1.0, 1.0), Vec2::new(2.0, 3.0))]
        );

        let trigger = BoxObstacle::new("plate", Vec2::ZERO, Vec2::ONE, 0.1, false);
        assert!(trigger.footprint_rects().is_empty());
        assert_ne!(solid.object_id(), trigger.object_id());
    }
}
