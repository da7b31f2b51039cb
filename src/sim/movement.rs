//! Movement, containment and contact damage
//!
//! Chasers walk straight at their target (the taunt target when one is
//! set, otherwise the player). Line-runners ignore targets and keep their
//! spawn heading until they leave the buffered viewport.

use super::spawn::{ALL_EDGES, edge_point};
use super::state::{EntityId, SimState};
use crate::consts::*;

/// Player damage produced by one movement pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactReport {
    pub damage: f32,
    pub hit_player: Vec<EntityId>,
}

/// Pull drifting chasers back next to the viewport.
///
/// Line-runners, elites and bosses are never moved. Returns the number of
/// relocated entities.
pub fn contain(state: &mut SimState) -> usize {
    let view = state.viewport();
    let unit = state.unit();
    let threshold = TELEPORT_DISTANCE_UNITS * unit;
    let landing = SPAWN_EDGE_UNITS * unit;

    let mut moved = 0;
    for entity in &mut state.entities {
        if entity.is_line_runner() || entity.is_persistent() {
            continue;
        }
        if view.distance_outside(entity.pos) > threshold {
            entity.pos = edge_point(&mut state.rng, view, landing, &ALL_EDGES);
            moved += 1;
        }
    }
    moved
}

/// Remove line-runners that have left the buffered viewport
pub fn remove_departed_line_runners(state: &mut SimState) -> Vec<EntityId> {
    let bounds = state
        .viewport()
        .expanded(state.settings.line_runner_despawn_units * state.unit());

    let mut departed = Vec::new();
    state.entities.retain(|e| {
        let gone = e.is_line_runner() && !bounds.contains(e.pos);
        if gone {
            departed.push(e.id);
        }
        !gone
    });
    departed
}

/// Advance every non-stunned entity by `dt_ms` and collect contact hits
pub fn step(state: &mut SimState, dt_ms: f64) -> ContactReport {
    let now = state.now_ms;
    let unit = state.unit();
    let speed_multiplier = state.difficulty.speed;
    let slow_zone = state.slow_zone;
    let (target, targets_player) = match state.taunt_target {
        Some(decoy) => (decoy, false),
        None => (state.player.pos, true),
    };
    let contact_radius = CONTACT_RADIUS_UNITS * unit;
    let dt_secs = (dt_ms / 1000.0) as f32;

    let mut report = ContactReport::default();
    for entity in &mut state.entities {
        if entity.is_stunned(now) {
            continue;
        }

        entity.anim_phase = (entity.anim_phase + entity.anim_rate * dt_secs) % std::f32::consts::TAU;

        let slow = slow_zone.map_or(1.0, |zone| zone.multiplier_at(entity.pos));
        let distance = entity.kind.speed * unit * speed_multiplier * slow * dt_secs;

        if entity.is_line_runner() {
            if let Some(direction) = entity.direction {
                entity.pos += direction * distance;
            }
            continue;
        }

        let to_target = target - entity.pos;
        let gap = to_target.length();
        if gap <= contact_radius {
            if targets_player && now - entity.last_contact_ms >= CONTACT_COOLDOWN_MS {
                report.damage += entity.contact_damage;
                report.hit_player.push(entity.id);
                entity.last_contact_ms = now;
            }
            continue;
        }

        let advance = distance.min(gap - contact_radius);
        entity.pos += to_target.normalize_or_zero() * advance;
    }
    report
}
