//! Attack shapes and hit tests
//!
//! Every entity is treated as a disc. All tests are inclusive at the
//! boundary so an entity exactly touching the shape counts as hit.

use std::f32::consts::{PI, TAU};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::angle_between;

/// An attack area anchored at an origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AttackShape {
    Circle {
        radius: f32,
    },
    /// `facing` and `width` in radians; width >= 2π is a full circle
    Sector {
        facing: f32,
        radius: f32,
        width: f32,
    },
    /// Oriented rectangle starting at the origin
    Beam {
        direction: Vec2,
        length: f32,
        width: f32,
    },
}

impl AttackShape {
    /// Whether a disc at `pos` with `entity_radius` intersects the shape
    pub fn hits(&self, origin: Vec2, pos: Vec2, entity_radius: f32) -> bool {
        match *self {
            AttackShape::Circle { radius } => circle_hit(origin, radius, pos, entity_radius),
            AttackShape::Sector { facing, radius, width } => {
                sector_hit(origin, facing, radius, width, pos, entity_radius)
            }
            AttackShape::Beam { direction, length, width } => {
                beam_hit(origin, direction, length, width, pos, entity_radius)
            }
        }
    }
}

/// Circle: distance minus entity radius within the attack radius
#[inline]
pub fn circle_hit(center: Vec2, radius: f32, pos: Vec2, entity_radius: f32) -> bool {
    center.distance(pos) - entity_radius <= radius
}

/// Sector: circle rule plus an angular test widened by the entity's
/// apparent half-size `atan2(r, d)`. The widening is capped so a sector
/// narrower than a full circle never reaches directly behind the attacker.
pub fn sector_hit(origin: Vec2, facing: f32, radius: f32, width: f32, pos: Vec2, entity_radius: f32) -> bool {
    if !circle_hit(origin, radius, pos, entity_radius) {
        return false;
    }
    if width >= TAU {
        return true;
    }

    let offset = pos - origin;
    let distance = offset.length();
    if distance <= f32::EPSILON {
        return true;
    }

    let half_width = (width * 0.5).max(0.0);
    let allowance = entity_radius.atan2(distance).min((PI - half_width) * 0.5);
    let diff = angle_between(offset.y.atan2(offset.x), facing);
    diff - allowance <= half_width
}

/// Beam: projection onto the forward axis within [-r, length] and
/// perpendicular offset within half the width plus r
pub fn beam_hit(origin: Vec2, direction: Vec2, length: f32, width: f32, pos: Vec2, entity_radius: f32) -> bool {
    let forward = direction.normalize_or_zero();
    if forward == Vec2::ZERO {
        return false;
    }
    let offset = pos - origin;
    let along = offset.dot(forward);
    let across = offset.perp_dot(forward).abs();
    along >= -entity_radius && along <= length && across <= width * 0.5 + entity_radius
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_circle_boundary_inclusive() {
        let center = Vec2::ZERO;
        // exactly radius + entity radius away
        assert!(circle_hit(center, 100.0, Vec2::new(120.0, 0.0), 20.0));
        assert!(!circle_hit(center, 100.0, Vec2::new(121.0, 0.0), 20.0));
    }

    #[test]
    fn test_zero_radius_circle_misses_outside_collider() {
        assert!(!circle_hit(Vec2::ZERO, 0.0, Vec2::new(30.0, 0.0), 20.0));
        assert!(circle_hit(Vec2::ZERO, 0.0, Vec2::new(15.0, 0.0), 20.0));
    }

    #[test]
    fn test_sector_front_and_back() {
        let width = PI / 2.0;
        assert!(sector_hit(Vec2::ZERO, 0.0, 100.0, width, Vec2::new(50.0, 0.0), 5.0));
        assert!(!sector_hit(Vec2::ZERO, 0.0, 100.0, width, Vec2::new(-50.0, 0.0), 5.0));
        assert!(!sector_hit(Vec2::ZERO, 0.0, 100.0, width, Vec2::new(0.0, 50.0), 1.0));
    }

    #[test]
    fn test_sector_allowance_widens_edge() {
        // Center is 50° off a 90° sector's facing, but the entity is large
        let pos = Vec2::from_angle(50f32.to_radians()) * 60.0;
        assert!(!sector_hit(Vec2::ZERO, 0.0, 100.0, PI / 2.0, pos, 0.0));
        assert!(sector_hit(Vec2::ZERO, 0.0, 100.0, PI / 2.0, pos, 15.0));
    }

    #[test]
    fn test_full_sector_ignores_angle() {
        assert!(sector_hit(Vec2::ZERO, 0.0, 100.0, TAU, Vec2::new(-80.0, 0.0), 1.0));
        assert!(!sector_hit(Vec2::ZERO, 0.0, 100.0, TAU, Vec2::new(-180.0, 0.0), 1.0));
    }

    #[test]
    fn test_beam_bounds() {
        let dir = Vec2::X;
        assert!(beam_hit(Vec2::ZERO, dir, 200.0, 20.0, Vec2::new(100.0, 0.0), 5.0));
        // perpendicular limit: width/2 + r
        assert!(beam_hit(Vec2::ZERO, dir, 200.0, 20.0, Vec2::new(100.0, 15.0), 5.0));
        assert!(!beam_hit(Vec2::ZERO, dir, 200.0, 20.0, Vec2::new(100.0, 16.0), 5.0));
        // behind the origin by more than r
        assert!(beam_hit(Vec2::ZERO, dir, 200.0, 20.0, Vec2::new(-5.0, 0.0), 5.0));
        assert!(!beam_hit(Vec2::ZERO, dir, 200.0, 20.0, Vec2::new(-6.0, 0.0), 5.0));
        // past the end
        assert!(!beam_hit(Vec2::ZERO, dir, 200.0, 20.0, Vec2::new(201.0, 0.0), 5.0));
    }

    #[test]
    fn test_beam_zero_direction_never_hits() {
        assert!(!beam_hit(Vec2::ZERO, Vec2::ZERO, 200.0, 20.0, Vec2::ZERO, 5.0));
    }

    #[test]
    fn test_shape_dispatch() {
        let shape = AttackShape::Beam {
            direction: Vec2::Y,
            length: 50.0,
            width: 10.0,
        };
        assert!(shape.hits(Vec2::ZERO, Vec2::new(0.0, 40.0), 1.0));
        assert!(!shape.hits(Vec2::ZERO, Vec2::new(40.0, 0.0), 1.0));
    }

    proptest! {
        #[test]
        fn prop_sector_never_hits_directly_behind(
            facing in -PI..PI,
            width in 0.0f32..(TAU - 0.01),
            distance in 1.0f32..200.0,
            entity_radius in 0.0f32..100.0,
        ) {
            let behind = Vec2::from_angle(facing + PI) * distance;
            prop_assert!(!sector_hit(Vec2::ZERO, facing, 400.0, width, behind, entity_radius));
        }

        #[test]
        fn prop_full_sector_matches_circle(
            x in -300.0f32..300.0,
            y in -300.0f32..300.0,
            facing in -PI..PI,
            entity_radius in 0.0f32..50.0,
        ) {
            let pos = Vec2::new(x, y);
            prop_assert_eq!(
                sector_hit(Vec2::ZERO, facing, 150.0, TAU, pos, entity_radius),
                circle_hit(Vec2::ZERO, 150.0, pos, entity_radius)
            );
        }

        #[test]
        fn prop_beam_hit_is_rotation_invariant(
            angle in -PI..PI,
            along in -50.0f32..250.0,
            across in -40.0f32..40.0,
        ) {
            let local = Vec2::new(along, across);
            let rotated = Vec2::from_angle(angle).rotate(local);
            let dir = Vec2::from_angle(angle);
            // stay clear of the exact boundary to avoid rounding flips
            prop_assume!((across.abs() - 15.0).abs() > 0.01);
            prop_assume!((along + 5.0).abs() > 0.01 && (along - 200.0).abs() > 0.01);
            prop_assert_eq!(
                beam_hit(Vec2::ZERO, dir, 200.0, 20.0, rotated, 5.0),
                beam_hit(Vec2::ZERO, Vec2::X, 200.0, 20.0, local, 5.0)
            );
        }
    }
}
