//! Footprint derivation for world objects
//!
//! The default policy takes the ground rectangle of every collidable shape.
//! Object types with a better idea of what they block (doors that only block
//! their frame, props with a hollow middle) override `footprint_rects`.

use crate::core::types::{ObjectId, WorldRect, WorldVolume};

/// Collision shape of a world object, reduced to its bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionShape {
    pub bounds: WorldVolume,
    /// Triggers and other non-solid shapes do not obstruct movement
    pub collidable: bool,
}

impl CollisionShape {
    pub fn solid(bounds: WorldVolume) -> Self {
        Self {
            bounds,
            collidable: true,
        }
    }

    pub fn trigger(bounds: WorldVolume) -> Self {
        Self {
            bounds,
            collidable: false,
        }
    }
}

/// A world object that can occupy motion map cells
pub trait NavObstacle {
    fn object_id(&self) -> ObjectId;

    fn collision_shapes(&self) -> &[CollisionShape];

    /// Ground rectangles this object obstructs
    fn footprint_rects(&self) -> Vec<WorldRect> {
        default_footprint(self.collision_shapes())
    }
}

/// One ground rectangle per collidable shape
pub fn default_footprint(shapes: &[CollisionShape]) -> Vec<WorldRect> {
    shapes
        .iter()
        .filter(|shape| shape.collidable)
        .map(|shape| shape.bounds.ground_rect())
        .collect()
}
