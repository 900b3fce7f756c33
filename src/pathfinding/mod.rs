//! A* pathfinding and path post-processing on the motion map

pub mod astar;
pub mod nearest;
pub mod open_list;
pub mod postprocess;

pub use astar::{
    heuristic, path_step_cost, PathOutcome, Pathfinder, RejectReason, SearchQuery, SearchStats,
    DIAGONAL_COST, ORTHOGONAL_COST,
};
pub use nearest::nearest_free_cell;
pub use open_list::OpenList;
pub use postprocess::{
    has_line_of_sight, remove_fictitious_points, smooth_path, MAX_SMOOTHING_UNIT,
};
