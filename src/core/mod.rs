pub mod config;
pub mod error;
pub mod types;

pub use config::{HeuristicKind, NavConfig, SearchLimits};
pub use error::{NavError, Result};
pub use types::{CellCoord, CellRect, ObjectId, WorldRect, WorldVolume};
