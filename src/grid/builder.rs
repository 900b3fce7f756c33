//! One-shot motion map construction from terrain
//!
//! Samples ground height at every grid vertex, blocks cells that are too
//! steep for the agent profile, then probes the free volume above each
//! remaining cell. Runs in O(width × height) and is not incremental.

use glam::{Vec2, Vec3};
use std::f32::consts::SQRT_2;

use crate::core::config::NavConfig;
use crate::core::types::{CellCoord, WorldVolume};
use crate::grid::store::GridStore;

/// Terrain and collision queries supplied by the host world
pub trait Terrain {
    /// Ground height at a point on the ground plane
    fn ground_height(&self, point: Vec2) -> f32;

    /// Whether nothing solid intersects the given box
    fn is_volume_free(&self, volume: &WorldVolume) -> bool;
}

/// Summary of a motion map build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub cells: usize,
    pub slope_blocked: usize,
    pub volume_blocked: usize,
}

impl BuildStats {
    pub fn blocked(&self) -> usize {
        self.slope_blocked + self.volume_blocked
    }
}

/// Builds the static part of a motion map for one agent profile
pub struct MotionMapBuilder<'a> {
    config: &'a NavConfig,
}

impl<'a> MotionMapBuilder<'a> {
    pub fn new(config: &'a NavConfig) -> Self {
        Self { config }
    }

    /// Height of every grid vertex, row-major with `width + 1` columns
    fn sample_vertices<T: Terrain + ?Sized>(&self, grid: &GridStore, terrain: &T) -> Vec<f32> {
        let columns = grid.width() + 1;
        let rows = grid.height() + 1;
        let origin = grid.origin();
        let cell_size = grid.cell_size();

        let mut heights = Vec::with_capacity(columns * rows);
        for vy in 0..rows {
            for vx in 0..columns {
                let point = origin + Vec2::new(vx as f32 * cell_size, vy as f32 * cell_size);
                heights.push(terrain.ground_height(point));
            }
        }
        heights
    }

    /// Obstruct every cell the agent profile cannot stand on
    ///
    /// The grid must already be initialized; its existing counts are kept.
    pub fn build<T: Terrain + ?Sized>(&self, grid: &mut GridStore, terrain: &T) -> BuildStats {
        let mut stats = BuildStats::default();
        if !grid.is_initialized() || grid.cell_count() == 0 {
            return stats;
        }

        let heights = self.sample_vertices(grid, terrain);
        let columns = grid.width() + 1;
        let diagonal = grid.cell_size() * SQRT_2;
        let max_slope = self.config.max_slope();

        for y in 0..grid.height() {
            for x in 0..grid.width() {
                stats.cells += 1;
                let cell = CellCoord::new(x as i32, y as i32);

                let corners = [
                    heights[y * columns + x],
                    heights[y * columns + x + 1],
                    heights[(y + 1) * columns + x],
                    heights[(y + 1) * columns + x + 1],
                ];
                let min_height = corners.iter().copied().fold(f32::INFINITY, f32::min);
                let max_height = corners.iter().copied().fold(f32::NEG_INFINITY, f32::max);

                if (max_height - min_height).atan2(diagonal) > max_slope {
                    grid.block_cell(cell);
                    stats.slope_blocked += 1;
                    continue;
                }

                let bottom = max_height + self.config.ground_clearance;
                let top = max_height + self.config.agent_height;
                if top <= bottom {
                    continue;
                }

                let footprint = grid.cell_world_rect(cell);
                let volume = WorldVolume::new(
                    Vec3::new(footprint.min.x, footprint.min.y, bottom),
                    Vec3::new(footprint.max.x, footprint.max.y, top),
                );
                if !terrain.is_volume_free(&volume) {
                    grid.block_cell(cell);
                    stats.volume_blocked += 1;
                }
            }
        }

        tracing::debug!(
            "Motion map built: {}x{} cells, {} too steep, {} obstructed",
            grid.width(),
            grid.height(),
            stats.slope_blocked,
            stats.volume_blocked
        );

        stats
    }
}
