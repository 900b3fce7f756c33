//! Navigation grids exposed to the rest of the world

pub mod grid;
pub mod registry;

pub use grid::{NavGrid, PathDebug};
pub use registry::NavGridSet;
