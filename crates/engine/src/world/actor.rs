use serde::Deserialize;

use super::{Aabb, TileGrid, Vec2};

pub const DEFAULT_ACTOR_SIZE: Vec2 = Vec2::new(32.0, 42.0);

/// Samples are taken this far inside the exclusive right and bottom edges.
const EDGE_EPSILON: f32 = 0.01;
const GROUND_PROBE_DEPTH: f32 = 1.0;
const FALLBACK_STEP_SIZE: f32 = 1.0;

/// Per-tick constants; velocities are pixels per tick, y grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PhysicsConfig {
    pub jump_impulse: f32,
    pub jump_horizontal_impulse: f32,
    pub ground_speed: f32,
    pub air_control: f32,
    pub air_damping: f32,
    pub gravity: f32,
    pub max_fall_speed: f32,
    pub step_size: f32,
    pub probe_inset: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            jump_impulse: -10.0,
            jump_horizontal_impulse: 2.0,
            ground_speed: 4.0,
            air_control: 0.3,
            air_damping: 0.95,
            gravity: 0.5,
            max_fall_speed: 10.0,
            step_size: 1.0,
            probe_inset: 2.0,
        }
    }
}

impl PhysicsConfig {
    fn effective_step_size(&self) -> f32 {
        if self.step_size.is_finite() && self.step_size > 0.0 {
            self.step_size
        } else {
            FALLBACK_STEP_SIZE
        }
    }
}

/// Side of the actor that was blocked during a sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AxisCollision {
    #[default]
    None,
    Negative,
    Positive,
}

impl AxisCollision {
    pub fn is_blocked(self) -> bool {
        self != Self::None
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    pub jumped: bool,
    pub x: AxisCollision,
    pub y: AxisCollision,
    pub grounded: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    position: Vec2,
    velocity: Vec2,
    size: Vec2,
    grounded: bool,
    move_left: bool,
    move_right: bool,
    jump_requested: bool,
}

impl Default for Actor {
    fn default() -> Self {
        Self::new(Vec2::ZERO, DEFAULT_ACTOR_SIZE)
    }
}

impl Actor {
    pub fn new(position: Vec2, size: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            size,
            grounded: false,
            move_left: false,
            move_right: false,
            jump_requested: false,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn half_extents(&self) -> Vec2 {
        Vec2::new(self.size.x * 0.5, self.size.y * 0.5)
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.position, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.bounds().center()
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    pub fn set_move_intent(&mut self, left: bool, right: bool) {
        self.move_left = left;
        self.move_right = right;
    }

    /// Consumed by the next `step`, whether or not the jump happens.
    pub fn request_jump(&mut self) {
        self.jump_requested = true;
    }

    /// Position = spawn, velocity and flags cleared.
    pub fn reset_to(&mut self, spawn: Vec2) {
        self.position = spawn;
        self.velocity = Vec2::ZERO;
        self.grounded = false;
        self.jump_requested = false;
    }

    fn intent_direction(&self) -> f32 {
        match (self.move_left, self.move_right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }

    /// Takes effect only while grounded.
    pub fn jump(&mut self, config: &PhysicsConfig) -> bool {
        if !self.grounded {
            return false;
        }
        self.velocity.y = config.jump_impulse;
        self.velocity.x += self.intent_direction() * config.jump_horizontal_impulse;
        self.grounded = false;
        true
    }

    pub fn step(&mut self, grid: &TileGrid, config: &PhysicsConfig) -> StepReport {
        let mut report = StepReport::default();
        let direction = self.intent_direction();

        if std::mem::take(&mut self.jump_requested) {
            report.jumped = self.jump(config);
        }

        if self.grounded {
            self.velocity.x = direction * config.ground_speed;
        } else {
            let speed = config.ground_speed.abs();
            let steered = self.velocity.x + direction * config.ground_speed * config.air_control;
            self.velocity.x = steered.clamp(-speed, speed) * config.air_damping;
        }

        self.velocity.y = (self.velocity.y + config.gravity).min(config.max_fall_speed);

        report.x = self.sweep_x(grid, config);
        report.y = self.sweep_y(grid, config);

        let landed = report.y == AxisCollision::Positive;
        self.grounded = landed || self.grounded_probe(grid, config);
        report.grounded = self.grounded;
        report
    }

    fn sweep_x(&mut self, grid: &TileGrid, config: &PhysicsConfig) -> AxisCollision {
        let step_size = config.effective_step_size();
        let mut remaining = self.velocity.x;
        while remaining.abs() > 0.0 {
            let delta = remaining.signum() * remaining.abs().min(step_size);
            let candidate = Vec2::new(self.position.x + delta, self.position.y);
            if self.probe_blocked(grid, candidate, config) {
                self.velocity.x = 0.0;
                return if delta > 0.0 {
                    AxisCollision::Positive
                } else {
                    AxisCollision::Negative
                };
            }
            self.position = candidate;
            remaining -= delta;
        }
        AxisCollision::None
    }

    fn sweep_y(&mut self, grid: &TileGrid, config: &PhysicsConfig) -> AxisCollision {
        let step_size = config.effective_step_size();
        let mut remaining = self.velocity.y;
        while remaining.abs() > 0.0 {
            let delta = remaining.signum() * remaining.abs().min(step_size);
            let candidate = Vec2::new(self.position.x, self.position.y + delta);
            if self.probe_blocked(grid, candidate, config) {
                self.velocity.y = 0.0;
                return if delta > 0.0 {
                    AxisCollision::Positive
                } else {
                    AxisCollision::Negative
                };
            }
            self.position = candidate;
            remaining -= delta;
        }
        AxisCollision::None
    }

    fn probe_columns(&self, left: f32, config: &PhysicsConfig) -> [f32; 3] {
        let width = self.size.x;
        let inset = config.probe_inset.clamp(0.0, width * 0.5);
        let right_edge = left + width - EDGE_EPSILON;
        [
            left + inset,
            left + width * 0.5,
            (left + width - inset).min(right_edge),
        ]
    }

    fn probe_blocked(&self, grid: &TileGrid, candidate: Vec2, config: &PhysicsConfig) -> bool {
        let Vec2 { x, y } = candidate;
        let top = y;
        let bottom = y + self.size.y - EDGE_EPSILON;
        let left = x;
        let right = x + self.size.x - EDGE_EPSILON;
        let third = self.size.y / 3.0;

        let columns = self.probe_columns(x, config);
        let horizontal_edges = columns
            .iter()
            .flat_map(|&px| [(px, top), (px, bottom)]);
        let vertical_edges = [y + third, y + third * 2.0]
            .into_iter()
            .flat_map(|py| [(left, py), (right, py)]);

        horizontal_edges
            .chain(vertical_edges)
            .any(|(px, py)| grid.is_solid(px, py))
    }

    fn grounded_probe(&self, grid: &TileGrid, config: &PhysicsConfig) -> bool {
        let probe_y = self.position.y + self.size.y - EDGE_EPSILON + GROUND_PROBE_DEPTH;
        self.probe_columns(self.position.x, config)
            .iter()
            .any(|&px| grid.is_solid(px, probe_y))
    }
}
