//! Motion map storage and construction

pub mod builder;
pub mod store;

pub use builder::{BuildStats, MotionMapBuilder, Terrain};
pub use store::GridStore;
