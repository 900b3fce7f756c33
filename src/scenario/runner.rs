//! Scenario files: a map, some obstacles and a list of path queries
//!
//! ```toml
//! name = "detour"
//! map = [
//!     "......",
//!     "..##..",
//!     "......",
//! ]
//!
//! [config]
//! heuristic = "octile"
//!
//! [[obstacles]]
//! name = "cart"
//! min = [4.0, 0.0]
//! max = [5.0, 1.0]
//!
//! [[queries]]
//! name = "across"
//! start = [0.5, 1.5]
//! end = [5.5, 1.5]
//! expect = "found"
//! ```

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::core::config::{NavConfig, SearchLimits};
use crate::core::error::{NavError, Result};
use crate::core::types::WorldRect;
use crate::grid::builder::BuildStats;
use crate::nav::grid::NavGrid;
use crate::occupancy::footprint::NavObstacle;
use crate::pathfinding::astar::{PathOutcome, SearchStats};
use crate::pathfinding::postprocess::MAX_SMOOTHING_UNIT;
use crate::scenario::fixtures::{AsciiTerrain, BoxObstacle};

fn default_level_height() -> f32 {
    0.5
}

fn default_obstacle_height() -> f32 {
    1.0
}

fn default_true() -> bool {
    true
}

/// Box obstacle as written in a scenario file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleSpec {
    pub name: String,
    pub min: Vec2,
    pub max: Vec2,
    #[serde(default = "default_obstacle_height")]
    pub height: f32,
    /// Triggers are tracked but never block
    #[serde(default)]
    pub trigger: bool,
}

impl ObstacleSpec {
    pub fn to_obstacle(&self) -> BoxObstacle {
        BoxObstacle::new(self.name.clone(), self.min, self.max, self.height, !self.trigger)
    }
}

/// One path query as written in a scenario file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuerySpec {
    pub name: String,
    pub start: Vec2,
    pub end: Vec2,
    /// Footprint side length in cells
    #[serde(default)]
    pub unit: Option<u32>,
    /// Agent width in world units, converted to cells by the grid
    #[serde(default)]
    pub agent_width: Option<f32>,
    #[serde(default = "default_true")]
    pub smooth: bool,
    /// Overrides the limits from `[config]`
    #[serde(default)]
    pub limits: Option<SearchLimits>,
    /// Area treated as free for the duration of this query
    #[serde(default)]
    pub temporary_clear: Option<WorldRect>,
    /// Move start and end to the nearest cells the agent fits in
    #[serde(default)]
    pub snap_to_free: bool,
    #[serde(default)]
    pub expect: Option<PathOutcome>,
}

impl QuerySpec {
    fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| {
            Err(NavError::InvalidScenario(format!(
                "query '{}': {}",
                self.name, reason
            )))
        };

        match (self.unit, self.agent_width) {
            (Some(_), Some(_)) => return invalid("set either unit or agent_width, not both"),
            (Some(0), None) => return invalid("unit must be at least 1"),
            (None, Some(width)) if !(width > 0.0) => return invalid("agent_width must be positive"),
            _ => {}
        }
        if self.smooth && self.unit.map_or(false, |unit| unit > MAX_SMOOTHING_UNIT) {
            return invalid("smoothing supports units of 1 to 2 cells");
        }
        if let Some(limits) = self.limits {
            if limits.max_fields_distance == 0 || limits.max_fields_to_check == 0 {
                return invalid("search limits must be non-zero");
            }
        }
        Ok(())
    }

    fn unit_size(&self, nav: &NavGrid) -> Result<u32> {
        let unit = match (self.unit, self.agent_width) {
            (Some(unit), _) => unit,
            (None, Some(width)) => nav.unit_cells(width),
            (None, None) => 1,
        };
        if self.smooth && unit > MAX_SMOOTHING_UNIT {
            return Err(NavError::InvalidScenario(format!(
                "query '{}': agent spans {} cells, too wide to smooth",
                self.name, unit
            )));
        }
        Ok(unit)
    }
}

/// A complete scenario file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub config: NavConfig,
    /// World position of the map's lower corner
    #[serde(default)]
    pub origin: Vec2,
    /// World height of one ground level digit
    #[serde(default = "default_level_height")]
    pub level_height: f32,
    /// One string per row, first row at the lowest y; one tile per cell
    pub map: Vec<String>,
    #[serde(default)]
    pub obstacles: Vec<ObstacleSpec>,
    #[serde(default)]
    pub queries: Vec<QuerySpec>,
}

impl Scenario {
    /// Parse and validate a scenario from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let scenario: Scenario = toml::from_str(content)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Load and validate a scenario from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut scenario = Self::from_toml_str(&content)?;
        if scenario.name.is_empty() {
            scenario.name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
        }
        Ok(scenario)
    }

    /// Swap in a navigation profile loaded separately
    pub fn with_config(mut self, config: NavConfig) -> Result<Self> {
        self.config = config;
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        self.config.validate()?;
        self.terrain()?;
        for query in &self.queries {
            query.validate()?;
        }
        Ok(())
    }

    pub fn terrain(&self) -> Result<AsciiTerrain> {
        AsciiTerrain::parse(&self.map, self.origin, self.config.cell_size, self.level_height)
    }

    pub fn obstacles(&self) -> Vec<BoxObstacle> {
        self.obstacles.iter().map(ObstacleSpec::to_obstacle).collect()
    }

    /// Build a grid covering the map with every obstacle in place
    pub fn build_grid(&self) -> Result<(NavGrid, BuildStats)> {
        let terrain = self.terrain()?;
        let obstacles = self.obstacles();
        let objects: Vec<&dyn NavObstacle> =
            obstacles.iter().map(|o| o as &dyn NavObstacle).collect();

        let mut nav = NavGrid::new(self.config.clone());
        let stats =
            nav.build_or_rebuild(terrain.bounds(), self.config.clone(), &terrain, &objects)?;
        Ok((nav, stats))
    }

    /// Build the grid and answer every query in file order
    pub fn run(&self) -> Result<ScenarioReport> {
        let (mut nav, stats) = self.build_grid()?;
        let store = nav.store();
        let grid = GridReport {
            width: store.width(),
            height: store.height(),
            cell_size: store.cell_size(),
            slope_blocked: stats.slope_blocked,
            volume_blocked: stats.volume_blocked,
            obstacles: nav.tracker().tracked_objects(),
            occupied_cells: store.occupied_cell_count(),
        };

        let mut queries = Vec::with_capacity(self.queries.len());
        for query in &self.queries {
            queries.push(self.run_query(&mut nav, query)?);
        }

        let report = ScenarioReport {
            name: self.name.clone(),
            grid,
            queries,
        };
        tracing::info!(
            "Scenario '{}': {}/{} queries as expected",
            report.name,
            report.queries.iter().filter(|q| q.passed).count(),
            report.queries.len()
        );
        Ok(report)
    }

    fn run_query(&self, nav: &mut NavGrid, query: &QuerySpec) -> Result<QueryReport> {
        let unit_size = query.unit_size(nav)?;
        if let Some(rect) = query.temporary_clear {
            nav.push_temporary_clear(rect);
        }

        let (start, end) = if query.snap_to_free {
            (
                nav.nearest_free_position(query.start, unit_size).unwrap_or(query.start),
                nav.nearest_free_position(query.end, unit_size).unwrap_or(query.end),
            )
        } else {
            (query.start, query.end)
        };

        let limits = query.limits.unwrap_or(self.config.limits);
        let mut waypoints = Vec::new();
        let outcome =
            nav.find_path_detailed(unit_size, start, end, limits, query.smooth, &mut waypoints);
        let stats = nav.last_path().map(|debug| debug.stats).unwrap_or_default();

        if query.temporary_clear.is_some() {
            nav.pop_all_temporary_clears();
        }

        let length: f32 = waypoints.windows(2).map(|pair| pair[0].distance(pair[1])).sum();
        let passed = query.expect.map_or(true, |expected| expected == outcome);
        if !passed {
            tracing::warn!(
                "Query '{}' returned {:?}, expected {:?}",
                query.name,
                outcome,
                query.expect
            );
        }

        Ok(QueryReport {
            name: query.name.clone(),
            unit_size,
            outcome,
            expected: query.expect,
            passed,
            waypoints,
            length,
            stats,
        })
    }
}

/// Grid summary after the scenario was built
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridReport {
    pub width: usize,
    pub height: usize,
    pub cell_size: f32,
    pub slope_blocked: usize,
    pub volume_blocked: usize,
    pub obstacles: usize,
    pub occupied_cells: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryReport {
    pub name: String,
    pub unit_size: u32,
    pub outcome: PathOutcome,
    pub expected: Option<PathOutcome>,
    pub passed: bool,
    pub waypoints: Vec<Vec2>,
    /// Summed waypoint segment lengths (world units)
    pub length: f32,
    pub stats: SearchStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioReport {
    pub name: String,
    pub grid: GridReport,
    pub queries: Vec<QueryReport>,
}

impl ScenarioReport {
    pub fn all_passed(&self) -> bool {
        self.queries.iter().all(|query| query.passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &QueryReport> {
        self.queries.iter().filter(|query| !query.passed)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pathfinding::astar::RejectReason;

    const DETOUR: &str = r#"
        name = "detour"
        map = [
            "........",
            "...#....",
            "...#....",
            "...#....",
            "........",
        ]

        [config]
        heuristic = "octile"

        [[queries]]
        name = "around the wall"
        start = [0.5, 2.5]
        end = [6.5, 2.5]
        expect = "found"

        [[queries]]
        name = "into the wall"
        start = [0.5, 2.5]
        end = [3.5, 2.5]
        expect = { rejected = "target_blocked" }
    "#;

    #[test]
    fn test_parse_with_defaults() {
        let scenario = Scenario::from_toml_str(DETOUR).unwrap();
        assert_eq!(scenario.name, "detour");
        assert_eq!(scenario.level_height, 0.5);
        assert_eq!(scenario.origin, Vec2::ZERO);
        assert_eq!(scenario.queries.len(), 2);
        assert!(scenario.queries[0].smooth);
        assert_eq!(
            scenario.queries[1].expect,
            Some(PathOutcome::Rejected(RejectReason::TargetBlocked))
        );
    }

    #[test]
    fn test_run_reports_every_query() {
        let report = Scenario::from_toml_str(DETOUR).unwrap().run().unwrap();
        assert!(report.all_passed(), "{:?}", report.failures().collect::<Vec<_>>());
        assert_eq!(report.grid.width, 8);
        assert_eq!(report.grid.height, 5);
        assert_eq!(report.grid.volume_blocked, 3);

        let detour = &report.queries[0];
        assert_eq!(detour.waypoints.first(), Some(&Vec2::new(0.5, 2.5)));
        assert_eq!(detour.waypoints.last(), Some(&Vec2::new(6.5, 2.5)));
        assert!(detour.length > 6.0);
        assert!(detour.stats.expanded > 0);

        let json = report.to_json().unwrap();
        assert!(json.contains("\"target_blocked\""));
    }

    #[test]
    fn test_invalid_queries_rejected() {
        let both = r#"
            map = ["...."]
            [[queries]]
            name = "q"
            start = [0.5, 0.5]
            end = [2.5, 0.5]
            unit = 1
            agent_width = 1.0
        "#;
        assert!(matches!(
            Scenario::from_toml_str(both),
            Err(NavError::InvalidScenario(_))
        ));

        let too_wide = r#"
            map = ["...."]
            [[queries]]
            name = "q"
            start = [0.5, 0.5]
            end = [2.5, 0.5]
            unit = 3
        "#;
        assert!(Scenario::from_toml_str(too_wide).is_err());
    }

    #[test]
    fn test_wide_agent_width_rejected_at_run() {
        let content = r#"
            map = ["......", "......", "......", "......"]
            [[queries]]
            name = "wide"
            start = [0.5, 0.5]
            end = [4.5, 0.5]
            agent_width = 2.5
        "#;
        let scenario = Scenario::from_toml_str(content).unwrap();
        assert!(matches!(scenario.run(), Err(NavError::InvalidScenario(_))));
    }

    #[test]
    fn test_temporary_clear_is_released() {
        let content = r#"
            map = ["...."]
            [[obstacles]]
            name = "door"
            min = [2.0, 0.0]
            max = [3.0, 1.0]

            [[queries]]
            name = "through the door"
            start = [0.5, 0.5]
            end = [3.5, 0.5]
            temporary_clear = { min = [2.0, 0.0], max = [3.0, 1.0] }
            expect = "found"

            [[queries]]
            name = "door closed again"
            start = [0.5, 0.5]
            end = [3.5, 0.5]
            expect = "no_path"
        "#;
        let report = Scenario::from_toml_str(content).unwrap().run().unwrap();
        assert!(report.all_passed(), "{:?}", report.failures().collect::<Vec<_>>());
        assert_eq!(report.grid.obstacles, 1);
    }

    #[test]
    fn test_snap_to_free() {
        let content = r#"
            map = ["....", ".#..", "...."]
            [[queries]]
            name = "snapped"
            start = [3.5, 2.5]
            end = [1.5, 1.5]
            snap_to_free = true
            expect = "found"
        "#;
        let report = Scenario::from_toml_str(content).unwrap().run().unwrap();
        assert!(report.all_passed(), "{:?}", report.failures().collect::<Vec<_>>());
    }
}
