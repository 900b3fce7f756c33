//! Motion Map - occupancy grid and A* pathfinding for agents of variable footprint

pub mod core;
pub mod grid;
pub mod nav;
pub mod occupancy;
pub mod pathfinding;
pub mod scenario;

pub use crate::core::{NavConfig, NavError, Result};
pub use nav::{NavGrid, NavGridSet};
