//! A* search over the motion map
//!
//! Costs are fixed-point integers: an orthogonal step costs 10, a diagonal
//! step 14. All per-cell scratch arrays are sized once per grid and reused;
//! open/closed membership is versioned by a generation counter so nothing
//! has to be cleared between queries.

use serde::{Deserialize, Serialize};

use crate::core::config::{HeuristicKind, SearchLimits};
use crate::core::types::CellCoord;
use crate::grid::store::GridStore;
use crate::pathfinding::open_list::OpenList;

pub const ORTHOGONAL_COST: u32 = 10;
pub const DIAGONAL_COST: u32 = 14;

/// List tags are reset once the generation counter passes this value
const TAG_RESET_THRESHOLD: u32 = 1 << 30;

/// Expansion order: orthogonal neighbors first, then diagonals
const NEIGHBORS: [(i32, i32, u32); 8] = [
    (1, 0, ORTHOGONAL_COST),
    (0, 1, ORTHOGONAL_COST),
    (-1, 0, ORTHOGONAL_COST),
    (0, -1, ORTHOGONAL_COST),
    (1, 1, DIAGONAL_COST),
    (-1, 1, DIAGONAL_COST),
    (1, -1, DIAGONAL_COST),
    (-1, -1, DIAGONAL_COST),
];

/// Why a query was refused before any search happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    Uninitialized,
    OutOfBounds,
    SameCell,
    TargetBlocked,
}

/// Result of a path query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathOutcome {
    Found,
    /// Open list ran dry before reaching the target
    NoPath,
    /// `max_fields_to_check` cells were queued without reaching the target
    LimitReached,
    Rejected(RejectReason),
}

impl PathOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, PathOutcome::Found)
    }
}

/// One search request in cell space
#[derive(Debug, Clone, Copy)]
pub struct SearchQuery {
    pub start: CellCoord,
    pub end: CellCoord,
    /// Side length of the agent footprint in cells
    pub unit_size: u32,
    pub limits: SearchLimits,
    pub heuristic: HeuristicKind,
}

/// Counters from the most recent search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Cells taken off the open list
    pub expanded: u32,
    /// Cells put on the open list, the start excluded
    pub queued: u32,
}

pub fn heuristic(kind: HeuristicKind, from: CellCoord, to: CellCoord) -> u32 {
    let dx = (from.x - to.x).unsigned_abs();
    let dy = (from.y - to.y).unsigned_abs();
    match kind {
        HeuristicKind::Manhattan => ORTHOGONAL_COST * (dx + dy),
        HeuristicKind::Octile => {
            ORTHOGONAL_COST * dx.max(dy) + (DIAGONAL_COST - ORTHOGONAL_COST) * dx.min(dy)
        }
    }
}

/// Reusable A* state for one grid
///
/// Not reentrant: a query borrows the pathfinder mutably for its whole
/// duration, so one grid answers one query at a time.
#[derive(Debug, Default)]
pub struct Pathfinder {
    g_cost: Vec<u32>,
    f_cost: Vec<u32>,
    parent: Vec<u32>,
    list_tag: Vec<u32>,
    generation: u32,
    open: OpenList,
    raw_path: Vec<CellCoord>,
    stats: SearchStats,
}

impl Pathfinder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(cells: usize) -> Self {
        let mut pathfinder = Self::new();
        pathfinder.resize(cells);
        pathfinder
    }

    /// Size all scratch arrays for a grid of `cells` cells
    pub fn resize(&mut self, cells: usize) {
        self.g_cost = vec![0; cells];
        self.f_cost = vec![0; cells];
        self.parent = vec![0; cells];
        self.list_tag = vec![0; cells];
        self.generation = 0;
        self.open.resize(cells);
        self.raw_path = Vec::with_capacity(cells);
        self.stats = SearchStats::default();
    }

    pub fn capacity(&self) -> usize {
        self.list_tag.len()
    }

    /// Cells of the last found path, start first
    pub fn raw_path(&self) -> &[CellCoord] {
        &self.raw_path
    }

    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Advance the open/closed sentinels; returns (open, closed)
    fn next_generation(&mut self) -> (u32, u32) {
        self.generation += 2;
        if self.generation >= TAG_RESET_THRESHOLD {
            tracing::debug!("Resetting pathfinder list tags");
            self.list_tag.fill(0);
            self.generation = 2;
        }
        (self.generation, self.generation + 1)
    }

    /// Run one search against `grid`
    ///
    /// # Panics
    ///
    /// Panics when `query.unit_size` is zero.
    pub fn search(&mut self, grid: &GridStore, query: &SearchQuery) -> PathOutcome {
        assert!(
            query.unit_size > 0,
            "agent footprint must cover at least one cell"
        );

        self.raw_path.clear();
        self.stats = SearchStats::default();

        if !grid.is_initialized() {
            return PathOutcome::Rejected(RejectReason::Uninitialized);
        }
        let (Some(start_idx), Some(end_idx)) = (grid.index(query.start), grid.index(query.end))
        else {
            return PathOutcome::Rejected(RejectReason::OutOfBounds);
        };
        if start_idx == end_idx {
            return PathOutcome::Rejected(RejectReason::SameCell);
        }
        if !grid.is_walkable(query.end, query.unit_size) {
            return PathOutcome::Rejected(RejectReason::TargetBlocked);
        }

        if self.capacity() != grid.cell_count() {
            self.resize(grid.cell_count());
        }

        let (open_tag, closed_tag) = self.next_generation();
        self.open.clear();

        let start = query.start;
        let unit = query.unit_size;
        let max_distance = i32::try_from(query.limits.max_fields_distance).unwrap_or(i32::MAX);

        self.g_cost[start_idx] = 0;
        self.f_cost[start_idx] = heuristic(query.heuristic, start, query.end);
        self.parent[start_idx] = start_idx as u32;
        self.list_tag[start_idx] = open_tag;
        self.open.push(start_idx, &self.f_cost);

        while let Some(current_idx) = self.open.pop(&self.f_cost) {
            self.list_tag[current_idx] = closed_tag;
            self.stats.expanded += 1;
            let current = grid.coord(current_idx);
            let current_g = self.g_cost[current_idx];

            for &(dx, dy, step_cost) in &NEIGHBORS {
                let next = current.offset(dx, dy);
                if (next.x - start.x).abs() > max_distance
                    || (next.y - start.y).abs() > max_distance
                {
                    continue;
                }
                let Some(next_idx) = grid.index(next) else {
                    continue;
                };
                if self.list_tag[next_idx] == closed_tag || !grid.is_walkable(next, unit) {
                    continue;
                }
                // No squeezing between two cells that touch only at a corner
                if dx != 0
                    && dy != 0
                    && (!grid.is_walkable(current.offset(dx, 0), unit)
                        || !grid.is_walkable(current.offset(0, dy), unit))
                {
                    continue;
                }

                let g = current_g + step_cost;

                if self.list_tag[next_idx] == open_tag {
                    if g < self.g_cost[next_idx] {
                        self.g_cost[next_idx] = g;
                        self.f_cost[next_idx] = g + heuristic(query.heuristic, next, query.end);
                        self.parent[next_idx] = current_idx as u32;
                        self.open.decrease(next_idx, &self.f_cost);
                    }
                    continue;
                }

                self.g_cost[next_idx] = g;
                self.f_cost[next_idx] = g + heuristic(query.heuristic, next, query.end);
                self.parent[next_idx] = current_idx as u32;
                self.list_tag[next_idx] = open_tag;

                // The target counts as reached as soon as it is queued
                if next_idx == end_idx {
                    self.trace_back(grid, start_idx, end_idx);
                    tracing::trace!(
                        "Path {:?} -> {:?}: {} cells, {} expanded",
                        query.start,
                        query.end,
                        self.raw_path.len(),
                        self.stats.expanded
                    );
                    return PathOutcome::Found;
                }

                self.open.push(next_idx, &self.f_cost);
                self.stats.queued += 1;
                if self.stats.queued >= query.limits.max_fields_to_check {
                    tracing::trace!(
                        "Path {:?} -> {:?}: gave up after {} cells",
                        query.start,
                        query.end,
                        self.stats.queued
                    );
                    return PathOutcome::LimitReached;
                }
            }
        }

        PathOutcome::NoPath
    }

    /// G-cost of the last found path
    pub fn path_cost(&self, grid: &GridStore) -> Option<u32> {
        let last = self.raw_path.last()?;
        grid.index(*last).map(|i| self.g_cost[i])
    }

    fn trace_back(&mut self, grid: &GridStore, start_idx: usize, end_idx: usize) {
        let mut current = end_idx;
        self.raw_path.push(grid.coord(current));
        while current != start_idx && self.raw_path.len() <= self.list_tag.len() {
            current = self.parent[current] as usize;
            self.raw_path.push(grid.coord(current));
        }
        self.raw_path.reverse();
    }

    #[cfg(test)]
    fn set_generation(&mut self, generation: u32) {
        self.generation = generation;
    }
}

/// Summed 10/14 step cost of a cell path
pub fn path_step_cost(path: &[CellCoord]) -> u32 {
    path.windows(2)
        .map(|pair| {
            if pair[0].x != pair[1].x && pair[0].y != pair[1].y {
                DIAGONAL_COST
            } else {
                ORTHOGONAL_COST
            }
        })
        .sum()
}
