//! Navigation configuration with documented constants
//!
//! Every grid owns one `NavConfig`. There is no process-wide configuration:
//! grids built for different agent profiles carry their own values.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::error::{NavError, Result};

/// Heuristic used to estimate remaining cost to the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeuristicKind {
    /// 10 × (|dx| + |dy|)
    ///
    /// Matches the legacy motion map and reproduces its paths exactly. It
    /// overestimates diagonal moves (20 per step against a cost of 14), so
    /// paths are not guaranteed minimal around obstacles.
    #[default]
    Manhattan,
    /// 10 × max(|dx|, |dy|) + 4 × min(|dx|, |dy|)
    ///
    /// Exact on an open grid with 10/14 step costs, never overestimates.
    Octile,
}

/// Work bounds for a single path query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchLimits {
    /// Candidates farther than this from the start along either axis are skipped
    pub max_fields_distance: u32,
    /// Search aborts once this many cells have been pushed onto the open list
    pub max_fields_to_check: u32,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            max_fields_distance: 256,
            max_fields_to_check: 20_000,
        }
    }
}

/// Configuration for one navigation grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    // === GRID ===
    /// Side length of a grid cell (world units)
    ///
    /// Smaller cells follow obstacle outlines more closely but grow every
    /// grid-sized array (occupancy and all pathfinder scratch) quadratically.
    pub cell_size: f32,

    // === AGENT PROFILE ===
    /// Vertical clearance an agent needs above the ground (world units)
    pub agent_height: f32,

    /// Steepest ground an agent can climb (degrees)
    ///
    /// Measured across a cell diagonal: a cell is blocked when
    /// atan(height difference of its corners / (cell_size × √2)) exceeds this.
    pub max_slope_degrees: f32,

    /// Gap left between the highest corner and the bottom of the clearance probe
    ///
    /// Keeps the ground itself from registering as an obstruction.
    pub ground_clearance: f32,

    // === SEARCH ===
    pub heuristic: HeuristicKind,

    /// Line-of-sight sampling step as a fraction of a cell
    pub los_step: f32,

    /// Limits used by queries that do not pass their own
    pub limits: SearchLimits,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            cell_size: 1.0,
            agent_height: 2.0,
            max_slope_degrees: 45.0,
            ground_clearance: 0.1,
            heuristic: HeuristicKind::Manhattan,
            los_step: 0.25,
            limits: SearchLimits::default(),
        }
    }
}

impl NavConfig {
    pub fn with_cell_size(cell_size: f32) -> Self {
        Self {
            cell_size,
            ..Self::default()
        }
    }

    /// Maximum climbable slope in radians
    pub fn max_slope(&self) -> f32 {
        self.max_slope_degrees.to_radians()
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if !(self.cell_size > 0.0) || !self.cell_size.is_finite() {
            return Err(NavError::InvalidConfig(format!(
                "cell_size ({}) must be positive",
                self.cell_size
            )));
        }

        if self.agent_height < 0.0 || self.ground_clearance < 0.0 {
            return Err(NavError::InvalidConfig(format!(
                "agent_height ({}) and ground_clearance ({}) must not be negative",
                self.agent_height, self.ground_clearance
            )));
        }

        if !(self.max_slope_degrees > 0.0 && self.max_slope_degrees <= 90.0) {
            return Err(NavError::InvalidConfig(format!(
                "max_slope_degrees ({}) must be in (0, 90]",
                self.max_slope_degrees
            )));
        }

        if !(self.los_step > 0.0 && self.los_step <= 1.0) {
            return Err(NavError::InvalidConfig(format!(
                "los_step ({}) must be in (0, 1]",
                self.los_step
            )));
        }

        if self.limits.max_fields_distance == 0 || self.limits.max_fields_to_check == 0 {
            return Err(NavError::InvalidConfig("search limits must be non-zero".into()));
        }

        Ok(())
    }

    /// Parse and validate a config from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: NavConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}
