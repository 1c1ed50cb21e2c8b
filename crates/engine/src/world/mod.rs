mod actor;
mod inventory;
mod level;
mod session;
mod tile_grid;

pub use actor::{Actor, AxisCollision, PhysicsConfig, StepReport, DEFAULT_ACTOR_SIZE};
pub use inventory::{Inventory, DEFAULT_ITEM_NAME};
pub use level::{LevelDescriptor, LevelError, LevelRegistry, TransitionPoint};
pub use session::{ExplorationSession, TickEvent};
pub use tile_grid::{
    MapObject, ObjectId, ObjectKind, TileGrid, TileGridError, TileKind, BASE_LAYER,
    DEFAULT_TILE_SIZE,
};

/// World space is y-down and measured in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Vec2) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Axis-aligned box occupying `[x, x + w) x [y, y + h)`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Aabb {
    pub position: Vec2,
    pub size: Vec2,
}

impl Aabb {
    pub fn new(position: Vec2, size: Vec2) -> Self {
        Self { position, size }
    }

    pub fn center(&self) -> Vec2 {
        Vec2 {
            x: self.position.x + self.size.x * 0.5,
            y: self.position.y + self.size.y * 0.5,
        }
    }

    pub fn right(&self) -> f32 {
        self.position.x + self.size.x
    }

    pub fn bottom(&self) -> f32 {
        self.position.y + self.size.y
    }
}
