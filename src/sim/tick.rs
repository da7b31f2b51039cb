//! Per-frame update
//!
//! Advances the simulation by one variable-length frame. Combat is not part
//! of the pass: callers resolve skills after `update` returns, then
//! renderers read snapshots.

use glam::Vec2;

use super::combat::{self, KillEvent};
use super::effects;
use super::movement;
use super::spawn;
use super::state::{EntityId, SimState};
use crate::consts::FRAME_MS;

/// Per-frame input from the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInput {
    /// Elapsed time since the previous frame
    pub delta_ms: f64,
    pub player: Vec2,
    pub player_level: u32,
    /// Top-left corner of the viewport in world pixels
    pub camera: Vec2,
}

impl Default for FrameInput {
    fn default() -> Self {
        Self {
            delta_ms: FRAME_MS,
            player: Vec2::ZERO,
            player_level: 0,
            camera: Vec2::ZERO,
        }
    }
}

/// What happened during one `update`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    /// Total contact damage dealt to the player
    pub contact_damage: f32,
    /// Entities that hit the player this frame
    pub hit_player: Vec<EntityId>,
    /// Deaths from burn ticks
    pub kills: Vec<KillEvent>,
    pub spawned: Vec<EntityId>,
    /// Line-runners that left the screen
    pub departed: Vec<EntityId>,
}

/// Advance the simulation by one frame.
///
/// Order: clock and inputs, spawning, containment, movement and contact
/// damage, line-runner exits, burn ticks, effect cleanup.
pub fn update(state: &mut SimState, input: &FrameInput) -> FrameReport {
    let dt = if input.delta_ms.is_finite() { input.delta_ms.max(0.0) } else { 0.0 };
    state.now_ms += dt;
    state.set_player(input.player, input.player_level);
    state.camera = input.camera;

    let spawned = spawn::run(state);
    movement::contain(state);
    let contact = movement::step(state, dt);
    let departed = movement::remove_departed_line_runners(state);
    let kills = combat::tick_burns(state);
    effects::cleanup_expired_effects(state);

    FrameReport {
        contact_damage: contact.damage,
        hit_player: contact.hit_player,
        kills,
        spawned,
        departed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::combat::{CritModifiers, NoModifiers, resolve_circle};
    use crate::sim::effects::{EffectKind, burn, has_effect, stun};
    use crate::sim::skills::{Skill, SkillKind, cast};
    use crate::sim::snapshot::{EntityView, get_all};
    use crate::sim::spawn::spawn_entity;

    fn centered_input(state: &SimState, delta_ms: f64) -> FrameInput {
        let view = state.viewport();
        FrameInput {
            delta_ms,
            player: view.center(),
            player_level: 0,
            camera: Vec2::new(view.x, view.y),
        }
    }

    #[test]
    fn test_update_advances_clock_and_spawns() {
        let mut state = SimState::with_defaults(1).unwrap();
        let report = update(&mut state, &FrameInput::default());
        assert!((state.now_ms - FRAME_MS).abs() < 1e-9);
        assert!(!report.spawned.is_empty());
        assert_eq!(state.len(), report.spawned.len());
    }

    #[test]
    fn test_negative_delta_does_not_rewind() {
        let mut state = SimState::with_defaults(1).unwrap();
        state.now_ms = 100.0;
        let input = FrameInput {
            delta_ms: -50.0,
            ..Default::default()
        };
        update(&mut state, &input);
        assert_eq!(state.now_ms, 100.0);
    }

    #[test]
    fn test_kill_end_to_end() {
        let mut state = SimState::with_defaults(2).unwrap();
        let input = centered_input(&state, FRAME_MS);
        let target = input.player + Vec2::new(200.0, 0.0);
        let id = spawn_entity(&mut state, "grunt", target).unwrap();
        update(&mut state, &input);

        let bystander = spawn_entity(&mut state, "grunt", input.player - Vec2::new(200.0, 0.0)).unwrap();

        // a zero-radius circle just outside the collider touches nothing
        let edge = state.entity(bystander).unwrap().pos + Vec2::new(30.0, 0.0);
        let miss = resolve_circle(&mut state, &mut NoModifiers, edge, 0.0, 1000.0);
        assert!(miss.hit_ids.is_empty());
        assert_eq!(state.entity(bystander).unwrap().hp, 20.0);

        let pos = state.entity(id).unwrap().pos;
        let outcome = resolve_circle(&mut state, &mut NoModifiers, pos, 10.0, 1000.0);
        assert_eq!(outcome.kill_count(), 1);
        assert_eq!(outcome.kills[0].id, id);
        assert_eq!(outcome.kills[0].position, pos);
        assert_eq!(outcome.kills[0].reward, 1);
        assert!(state.entity(id).is_none());
        assert!(state.entity(bystander).is_some());
        assert!(get_all(&state).iter().all(|v| v.id != id));

        update(&mut state, &input);
        assert!(state.entity(id).is_none());
    }

    #[test]
    fn test_burn_end_to_end() {
        let mut state = SimState::with_defaults(3).unwrap();
        let input = centered_input(&state, 1000.0);
        state.set_player(input.player, 0);
        let id = spawn_entity(&mut state, "grunt", input.player + Vec2::new(150.0, 0.0)).unwrap();
        state.entity_mut(id).unwrap().hp = 12.0;
        let until = state.now_ms + 3000.0;
        burn(&mut state, &[id], until, 1000.0, 5.0, None);

        update(&mut state, &input);
        assert_eq!(state.entity(id).unwrap().hp, 7.0);
        update(&mut state, &input);
        assert_eq!(state.entity(id).unwrap().hp, 2.0);
        // the tick due at 3000 coincides with expiry and is not applied
        update(&mut state, &input);
        assert_eq!(state.entity(id).unwrap().hp, 2.0);
        assert!(!has_effect(&state, id, EffectKind::Burn));

        let input = FrameInput {
            delta_ms: 1.0,
            ..input
        };
        update(&mut state, &input);
        assert!(state.entity(id).unwrap().effects.is_empty());
    }

    #[test]
    fn test_burn_ticks_survive_long_frames() {
        let mut state = SimState::with_defaults(3).unwrap();
        let input = centered_input(&state, 1500.0);
        state.set_player(input.player, 0);
        let id = spawn_entity(&mut state, "grunt", input.player + Vec2::new(150.0, 0.0)).unwrap();
        state.entity_mut(id).unwrap().hp = 12.0;
        burn(&mut state, &[id], 3000.0, 1000.0, 5.0, None);

        update(&mut state, &input);
        update(&mut state, &input);
        assert_eq!(state.entity(id).unwrap().hp, 2.0);
        assert!(state.entity(id).unwrap().effects.is_empty());
    }

    #[test]
    fn test_stun_freezes_then_resumes() {
        let mut state = SimState::with_defaults(4).unwrap();
        let input = centered_input(&state, FRAME_MS);
        let start = input.player + Vec2::new(300.0, 0.0);
        let id = spawn_entity(&mut state, "grunt", start).unwrap();
        stun(&mut state, &[id], 500.0);

        while state.now_ms + FRAME_MS < 500.0 {
            update(&mut state, &input);
            assert_eq!(state.entity(id).unwrap().pos, start);
        }
        for _ in 0..5 {
            update(&mut state, &input);
        }
        assert!(state.entity(id).unwrap().pos.x < start.x);
    }

    /// Scripted session with auto-cast skills, returning the final snapshot
    fn scripted_run(seed: u64, frames: usize) -> (SimState, Vec<EntityView>) {
        let mut state = SimState::with_defaults(seed).unwrap();
        let mut modifiers = CritModifiers::new(seed, 1.0, 0.1, 2.0);
        let skills = [
            Skill::new(SkillKind::Nova, 3),
            Skill::new(SkillKind::Cleave, 4),
            Skill::new(SkillKind::Lance, 3),
        ];
        let mut ready_at = [0.0f64; 3];

        for frame in 0..frames {
            let mut input = centered_input(&state, FRAME_MS);
            input.player_level = (frame / 120) as u32;
            update(&mut state, &input);
            for hp in state.entities().iter().map(|e| e.hp) {
                assert!(hp > 0.0, "dead entity survived the update");
            }

            for (skill, ready) in skills.iter().zip(ready_at.iter_mut()) {
                if state.now_ms >= *ready {
                    let facing = frame as f32 * 0.05;
                    cast(&mut state, &mut modifiers, skill, input.player, facing);
                    *ready = state.now_ms + skill.cooldown_ms();
                }
            }
        }
        let views = get_all(&state);
        (state, views)
    }

    #[test]
    fn test_hp_positive_after_every_update() {
        let (state, _) = scripted_run(7, 900);
        assert!(state.len() <= state.settings().max_entities);
    }

    #[test]
    fn test_identical_seeds_are_deterministic() {
        let (a_state, a) = scripted_run(99, 400);
        let (b_state, b) = scripted_run(99, 400);
        assert_eq!(a, b);
        assert_eq!(a_state.now_ms, b_state.now_ms);
    }
}
