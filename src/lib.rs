//! Horde Arena - real-time combat simulation core
//!
//! Core modules:
//! - `sim`: Frame-stepped simulation (spawning, movement, effects, combat)
//! - `settings`: Data-driven tuning and difficulty presets
//! - `error`: Load-time configuration failures

pub mod error;
pub mod settings;
pub mod sim;

pub use error::ConfigError;
pub use settings::{Difficulty, DifficultyPreset, SimSettings};

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Fixed balance constants
pub mod consts {
    /// Nominal frame length (60 updates/second)
    pub const FRAME_MS: f64 = 1000.0 / 60.0;

    /// One abstract unit is this fraction of the play-area height
    pub const UNIT_FRACTION_OF_HEIGHT: f32 = 0.1;

    /// Raw damage per damage unit
    pub const DAMAGE_UNIT: f32 = 10.0;

    /// Collider radius of a size-1.0 kind, in abstract units
    pub const ENTITY_RADIUS_UNITS: f32 = 0.25;
    /// Distance to target at which entities stop and touch (abstract units)
    pub const CONTACT_RADIUS_UNITS: f32 = 0.4;
    /// Per-entity contact damage throttle
    pub const CONTACT_COOLDOWN_MS: f64 = 500.0;
    /// Duration of the "just damaged" flash
    pub const FLASH_MS: f64 = 120.0;

    /// Off-screen distance past which entities are pulled back (abstract units)
    pub const TELEPORT_DISTANCE_UNITS: f32 = 4.0;
    /// Distance outside the viewport edge that pulled-back entities land at
    pub const SPAWN_EDGE_UNITS: f32 = 1.0;
    /// Margin beyond the viewport where normal waves appear
    pub const SPAWN_MARGIN_UNITS: f32 = 0.8;

    /// Animation oscillation rate range (radians per second)
    pub const ANIM_RATE_MIN: f32 = 4.0;
    pub const ANIM_RATE_MAX: f32 = 8.0;
}

/// Axis-aligned rectangle in world pixels (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Grow the rectangle by `margin` on every side
    pub fn expanded(&self, margin: f32) -> Self {
        Self::new(
            self.x - margin,
            self.y - margin,
            self.width + margin * 2.0,
            self.height + margin * 2.0,
        )
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.left() && p.x <= self.right() && p.y >= self.top() && p.y <= self.bottom()
    }

    /// Euclidean distance from `p` to the rectangle (0 when inside)
    pub fn distance_outside(&self, p: Vec2) -> f32 {
        let dx = (self.left() - p.x).max(0.0).max(p.x - self.right());
        let dy = (self.top() - p.y).max(0.0).max(p.y - self.bottom());
        Vec2::new(dx, dy).length()
    }

    /// Clamp a point into the rectangle
    pub fn clamp(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            p.x.clamp(self.left(), self.right()),
            p.y.clamp(self.top(), self.bottom()),
        )
    }
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Absolute angular difference in [0, π]
#[inline]
pub fn angle_between(a: f32, b: f32) -> f32 {
    normalize_angle(a - b).abs()
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}
