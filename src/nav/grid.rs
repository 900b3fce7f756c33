//! Navigation grid: the motion map together with everything that queries it
//!
//! `NavGrid` owns the occupancy store, the per-object footprint records and
//! the pathfinder scratch state for one agent profile. Queries take
//! `&mut self`, so at most one path query runs against a grid at a time.

use glam::Vec2;

use crate::core::config::{NavConfig, SearchLimits};
use crate::core::error::{NavError, Result};
use crate::core::types::{CellCoord, ObjectId, WorldRect};
use crate::grid::builder::{BuildStats, MotionMapBuilder, Terrain};
use crate::grid::store::GridStore;
use crate::occupancy::footprint::NavObstacle;
use crate::occupancy::tracker::OccupancyTracker;
use crate::pathfinding::astar::{
    PathOutcome, Pathfinder, RejectReason, SearchQuery, SearchStats,
};
use crate::pathfinding::nearest::nearest_free_cell;
use crate::pathfinding::postprocess::{
    assert_smoothable, cells_to_world, remove_fictitious_points, smooth_path,
};

/// Everything the last query produced, kept for debug visualization
#[derive(Debug, Clone, PartialEq)]
pub struct PathDebug {
    pub outcome: PathOutcome,
    pub unit_size: u32,
    pub smoothed: bool,
    pub stats: SearchStats,
    /// Cells visited by the search result, start first
    pub raw: Vec<CellCoord>,
    /// Raw cells with straight runs collapsed
    pub reduced: Vec<CellCoord>,
    /// Waypoints handed back to the caller
    pub waypoints: Vec<Vec2>,
}

impl PathDebug {
    fn new() -> Self {
        Self {
            outcome: PathOutcome::Rejected(RejectReason::Uninitialized),
            unit_size: 0,
            smoothed: false,
            stats: SearchStats::default(),
            raw: Vec::new(),
            reduced: Vec::new(),
            waypoints: Vec::new(),
        }
    }

    /// Reduced cells as world-space points
    pub fn reduced_world(&self, grid: &GridStore) -> Vec<Vec2> {
        let mut out = Vec::with_capacity(self.reduced.len());
        cells_to_world(grid, &self.reduced, &mut out);
        out
    }
}

/// Motion map plus pathfinding for one agent profile
#[derive(Debug)]
pub struct NavGrid {
    config: NavConfig,
    store: GridStore,
    tracker: OccupancyTracker,
    pathfinder: Pathfinder,
    last_path: Option<PathDebug>,
}

impl NavGrid {
    /// Create an empty, uninitialized grid
    pub fn new(config: NavConfig) -> Self {
        Self {
            config,
            store: GridStore::new(),
            tracker: OccupancyTracker::new(),
            pathfinder: Pathfinder::new(),
            last_path: None,
        }
    }

    pub fn config(&self) -> &NavConfig {
        &self.config
    }

    pub fn store(&self) -> &GridStore {
        &self.store
    }

    pub fn tracker(&self) -> &OccupancyTracker {
        &self.tracker
    }

    pub fn is_initialized(&self) -> bool {
        self.store.is_initialized()
    }

    /// (Re)build the motion map over `bounds` for the profile in `config`
    ///
    /// Terrain that is too steep or lacks head room is blocked permanently,
    /// then the footprints of `objects` already in the world are inserted.
    pub fn build_or_rebuild<T: Terrain + ?Sized>(
        &mut self,
        bounds: WorldRect,
        config: NavConfig,
        terrain: &T,
        objects: &[&dyn NavObstacle],
    ) -> Result<BuildStats> {
        config.validate()?;

        self.reset();
        self.config = config;
        self.store.initialize(bounds, self.config.cell_size);
        self.pathfinder.resize(self.store.cell_count());

        let stats = MotionMapBuilder::new(&self.config).build(&mut self.store, terrain);
        for object in objects {
            self.add_object_footprint(*object);
        }

        tracing::info!(
            "Navigation grid ready: {}x{} cells, {} blocked by terrain, {} objects",
            self.store.width(),
            self.store.height(),
            stats.blocked(),
            self.tracker.tracked_objects()
        );

        Ok(stats)
    }

    /// Rebuild over the current bounds with the current config
    pub fn rebuild<T: Terrain + ?Sized>(
        &mut self,
        terrain: &T,
        objects: &[&dyn NavObstacle],
    ) -> Result<BuildStats> {
        if !self.is_initialized() {
            return Err(NavError::Uninitialized);
        }
        let bounds = self.store.bounds();
        let config = self.config.clone();
        self.build_or_rebuild(bounds, config, terrain, objects)
    }

    /// Release all grid storage; the config is kept
    pub fn reset(&mut self) {
        self.store.reset();
        self.tracker.clear();
        self.pathfinder = Pathfinder::new();
        self.last_path = None;
    }

    /// Footprint side length in cells for an agent `agent_width` wide
    ///
    /// # Panics
    ///
    /// Panics when the width rounds to zero cells.
    pub fn unit_cells(&self, agent_width: f32) -> u32 {
        let cells = (agent_width / self.config.cell_size).ceil();
        assert!(
            cells >= 1.0,
            "agent width {} maps to zero cells at cell size {}",
            agent_width,
            self.config.cell_size
        );
        cells as u32
    }

    /// Whether every cell under `rect` is free; false off-grid
    pub fn is_region_free(&self, rect: WorldRect) -> bool {
        self.store
            .rect_to_cells(rect)
            .map_or(false, |range| self.store.is_range_free(range))
    }

    /// Insert or move an object's footprint
    ///
    /// Returns false when nothing was recorded (grid uninitialized or the
    /// footprint lies outside it).
    pub fn add_object_footprint(&mut self, object: &dyn NavObstacle) -> bool {
        let rects = object.footprint_rects();
        let id = object.object_id();
        let recorded = self
            .tracker
            .add_object_footprint(&mut self.store, id, &rects)
            > 0;
        if !recorded {
            tracing::debug!("No footprint recorded for object {:?}", id);
        }
        recorded
    }

    pub fn remove_object_footprint(&mut self, id: ObjectId) -> bool {
        let removed = self.tracker.remove_object_footprint(&mut self.store, id);
        if !removed {
            tracing::debug!("Object {:?} had no recorded footprint", id);
        }
        removed
    }

    /// Treat `rect` as free until [`NavGrid::pop_all_temporary_clears`]
    pub fn push_temporary_clear(&mut self, rect: WorldRect) -> bool {
        self.tracker.push_temporary_clear(&mut self.store, rect)
    }

    pub fn pop_all_temporary_clears(&mut self) {
        self.tracker.pop_all_temporary_clears(&mut self.store);
    }

    /// Find a path and report success as a boolean
    ///
    /// `path` is cleared and filled with world-space waypoints.
    #[allow(clippy::too_many_arguments)]
    pub fn find_path(
        &mut self,
        unit_size: u32,
        start: Vec2,
        end: Vec2,
        max_fields_distance: u32,
        max_fields_to_check: u32,
        smooth: bool,
        path: &mut Vec<Vec2>,
    ) -> bool {
        let limits = SearchLimits {
            max_fields_distance,
            max_fields_to_check,
        };
        self.find_path_detailed(unit_size, start, end, limits, smooth, path)
            .is_found()
    }

    /// Find a path using the limits from the grid config
    pub fn find_path_with_default_limits(
        &mut self,
        unit_size: u32,
        start: Vec2,
        end: Vec2,
        smooth: bool,
        path: &mut Vec<Vec2>,
    ) -> PathOutcome {
        let limits = self.config.limits;
        self.find_path_detailed(unit_size, start, end, limits, smooth, path)
    }

    /// Find a path and report why it failed, if it did
    ///
    /// On success `path` starts at the start cell center. With `smooth` the
    /// waypoints are the line-of-sight reduced cell centers; without it they
    /// are the turning points and the last one is `end` itself.
    ///
    /// # Panics
    ///
    /// Panics when `unit_size` is zero, or when `smooth` is set for a
    /// footprint wider than two cells.
    pub fn find_path_detailed(
        &mut self,
        unit_size: u32,
        start: Vec2,
        end: Vec2,
        limits: SearchLimits,
        smooth: bool,
        path: &mut Vec<Vec2>,
    ) -> PathOutcome {
        assert!(unit_size > 0, "agent footprint must cover at least one cell");
        if smooth {
            assert_smoothable(unit_size);
        }
        path.clear();

        let mut debug = self.last_path.take().unwrap_or_else(PathDebug::new);
        debug.unit_size = unit_size;
        debug.smoothed = smooth;
        debug.raw.clear();
        debug.reduced.clear();
        debug.waypoints.clear();

        let (outcome, stats) = self.run_query(unit_size, start, end, limits);
        debug.outcome = outcome;
        debug.stats = stats;

        if outcome.is_found() {
            debug.raw.extend_from_slice(self.pathfinder.raw_path());
            debug
                .reduced
                .extend(remove_fictitious_points(self.pathfinder.raw_path()));

            if smooth {
                let smoothed =
                    smooth_path(&self.store, &debug.reduced, unit_size, self.config.los_step);
                cells_to_world(&self.store, &smoothed, path);
            } else {
                let turns = &debug.reduced[..debug.reduced.len() - 1];
                cells_to_world(&self.store, turns, path);
                path.push(end);
            }
            debug.waypoints.extend_from_slice(path);
        }

        tracing::debug!(
            "Path query {:?} -> {:?} (unit {}): {:?}, {} waypoints",
            start,
            end,
            unit_size,
            outcome,
            path.len()
        );

        self.last_path = Some(debug);
        outcome
    }

    fn run_query(
        &mut self,
        unit_size: u32,
        start: Vec2,
        end: Vec2,
        limits: SearchLimits,
    ) -> (PathOutcome, SearchStats) {
        if !self.store.is_initialized() {
            return (
                PathOutcome::Rejected(RejectReason::Uninitialized),
                SearchStats::default(),
            );
        }
        let cells = (self.store.world_to_cell(start), self.store.world_to_cell(end));
        let (Some(start), Some(end)) = cells else {
            return (
                PathOutcome::Rejected(RejectReason::OutOfBounds),
                SearchStats::default(),
            );
        };

        let query = SearchQuery {
            start,
            end,
            unit_size,
            limits,
            heuristic: self.config.heuristic,
        };
        let outcome = self.pathfinder.search(&self.store, &query);
        (outcome, self.pathfinder.stats())
    }

    /// Center of the closest cell where an agent of `unit_size` cells fits
    pub fn nearest_free_position(&self, point: Vec2, unit_size: u32) -> Option<Vec2> {
        if !self.store.is_initialized() {
            return None;
        }
        let cell = self.store.world_to_cell_clamped(point)?;
        nearest_free_cell(&self.store, cell, unit_size)
            .map(|free| self.store.cell_to_world_center(free))
    }

    /// Raw, reduced and final waypoints of the most recent query
    pub fn last_path(&self) -> Option<&PathDebug> {
        self.last_path.as_ref()
    }
}
