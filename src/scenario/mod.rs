//! Scenario files for exercising navigation grids outside a host world

pub mod fixtures;
pub mod runner;

pub use fixtures::{AsciiTerrain, BoxObstacle, Tile};
pub use runner::{GridReport, ObstacleSpec, QueryReport, QuerySpec, Scenario, ScenarioReport};
