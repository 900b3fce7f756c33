//! Owner-held collection of navigation grids
//!
//! A world usually keeps one grid per agent profile (infantry, vehicles,
//! ...). The set forwards object lifecycle notifications to all of them.

use std::collections::BTreeMap;

use crate::core::error::Result;
use crate::core::types::ObjectId;
use crate::grid::builder::{BuildStats, Terrain};
use crate::nav::grid::NavGrid;
use crate::occupancy::footprint::NavObstacle;

/// Named navigation grids, iterated in name order
#[derive(Debug, Default)]
pub struct NavGridSet {
    grids: BTreeMap<String, NavGrid>,
}

impl NavGridSet {
    pub fn new() -> Self {
        Self {
            grids: BTreeMap::new(),
        }
    }

    /// Add a grid, returning the one it replaced
    pub fn insert(&mut self, name: impl Into<String>, grid: NavGrid) -> Option<NavGrid> {
        self.grids.insert(name.into(), grid)
    }

    pub fn remove(&mut self, name: &str) -> Option<NavGrid> {
        self.grids.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&NavGrid> {
        self.grids.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut NavGrid> {
        self.grids.get_mut(name)
    }

    pub fn len(&self) -> usize {
        self.grids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NavGrid)> {
        self.grids.iter().map(|(name, grid)| (name.as_str(), grid))
    }

    /// An object entered the world or moved
    pub fn object_inserted(&mut self, object: &dyn NavObstacle) {
        for grid in self.grids.values_mut() {
            grid.add_object_footprint(object);
        }
    }

    /// An object left the world
    pub fn object_removed(&mut self, id: ObjectId) {
        for grid in self.grids.values_mut() {
            grid.remove_object_footprint(id);
        }
    }

    /// Rebuild every initialized grid against fresh terrain
    ///
    /// Uninitialized grids are skipped. Stops at the first failure.
    pub fn rebuild_all<T: Terrain + ?Sized>(
        &mut self,
        terrain: &T,
        objects: &[&dyn NavObstacle],
    ) -> Result<Vec<(String, BuildStats)>> {
        let mut results = Vec::with_capacity(self.grids.len());
        for (name, grid) in self.grids.iter_mut() {
            if !grid.is_initialized() {
                continue;
            }
            let stats = grid.rebuild(terrain, objects)?;
            results.push((name.clone(), stats));
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::NavConfig;
    use crate::core::types::{WorldRect, WorldVolume};
    use crate::occupancy::footprint::CollisionShape;
    use glam::{Vec2, Vec3};

    struct FlatGround;

    impl Terrain for FlatGround {
        fn ground_height(&self, _point: Vec2) -> f32 {
            0.0
        }

        fn is_volume_free(&self, _volume: &WorldVolume) -> bool {
            true
        }
    }

    struct Barrel {
        id: ObjectId,
        shapes: Vec<CollisionShape>,
    }

    impl NavObstacle for Barrel {
        fn object_id(&self) -> ObjectId {
            self.id
        }

        fn collision_shapes(&self) -> &[CollisionShape] {
            &self.shapes
        }
    }

    fn grid_with_cell(cell_size: f32) -> NavGrid {
        let config = NavConfig::with_cell_size(cell_size);
        let mut grid = NavGrid::new(config.clone());
        grid.build_or_rebuild(
            WorldRect::new(Vec2::ZERO, Vec2::splat(8.0)),
            config,
            &FlatGround,
            &[],
        )
        .unwrap();
        grid
    }

    #[test]
    fn test_lifecycle_reaches_every_grid() {
        let mut set = NavGridSet::new();
        set.insert("fine", grid_with_cell(0.5));
        set.insert("coarse", grid_with_cell(2.0));

        let barrel = Barrel {
            id: ObjectId::new(),
            shapes: vec![CollisionShape::solid(WorldVolume::new(
                Vec3::new(3.0, 3.0, 0.0),
                Vec3::new(4.0, 4.0, 1.0),
            ))],
        };
        let region = WorldRect::new(Vec2::splat(3.2), Vec2::splat(3.8));

        set.object_inserted(&barrel);
        assert!(set.iter().all(|(_, grid)| !grid.is_region_free(region)));

        set.object_removed(barrel.id);
        assert!(set.iter().all(|(_, grid)| grid.is_region_free(region)));
    }

    #[test]
    fn test_rebuild_all_skips_uninitialized() {
        let mut set = NavGridSet::new();
        set.insert("ready", grid_with_cell(1.0));
        set.insert("pending", NavGrid::new(NavConfig::default()));

        let results = set.rebuild_all(&FlatGround, &[]).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0, "ready");
        assert_eq!(results[0].1.cells, 64);
    }

    #[test]
    fn test_insert_replaces() {
        let mut set = NavGridSet::new();
        assert!(set.insert("a", grid_with_cell(1.0)).is_none());
        assert!(set.insert("a", grid_with_cell(2.0)).is_some());
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("a").unwrap().config().cell_size, 2.0);
        assert!(set.remove("a").is_some());
        assert!(set.is_empty());
    }
}
