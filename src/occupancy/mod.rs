//! Dynamic obstacles on the motion map

pub mod footprint;
pub mod tracker;

pub use footprint::{default_footprint, CollisionShape, NavObstacle};
pub use tracker::OccupancyTracker;
