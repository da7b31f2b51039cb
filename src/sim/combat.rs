//! Combat resolution
//!
//! An activation computes its final damage once (through the caller's
//! `DamageModifier`), finds every entity the attack shape touches, then
//! applies that damage entity by entity. Anything that drops to zero HP is
//! removed on the spot and reported as a `KillEvent`.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::effects::EffectKind;
use super::growth;
use super::shapes::{AttackShape, circle_hit};
use super::state::{Entity, EntityId, SimState};
use crate::consts::FLASH_MS;
use crate::polar_to_cartesian;

/// Equipment/buff multipliers and the critical roll, supplied by the caller
pub trait DamageModifier {
    /// Returns the final damage and whether it was a critical hit
    fn apply_crit_and_modifiers(&mut self, base_damage: f32, player_level: u32) -> (f32, bool);
}

/// Passes damage through unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct NoModifiers;

impl DamageModifier for NoModifiers {
    fn apply_crit_and_modifiers(&mut self, base_damage: f32, _player_level: u32) -> (f32, bool) {
        (base_damage, false)
    }
}

/// Flat multiplier plus a seeded critical roll whose chance creeps up with
/// player level
#[derive(Debug, Clone)]
pub struct CritModifiers {
    pub damage_multiplier: f32,
    pub crit_chance: f64,
    pub crit_chance_per_level: f64,
    pub crit_multiplier: f32,
    rng: Pcg32,
}

impl CritModifiers {
    pub fn new(seed: u64, damage_multiplier: f32, crit_chance: f64, crit_multiplier: f32) -> Self {
        Self {
            damage_multiplier,
            crit_chance,
            crit_chance_per_level: 0.002,
            crit_multiplier,
            rng: Pcg32::seed_from_u64(seed),
        }
    }
}

impl DamageModifier for CritModifiers {
    fn apply_crit_and_modifiers(&mut self, base_damage: f32, player_level: u32) -> (f32, bool) {
        let damage = base_damage * self.damage_multiplier;
        let chance = self.crit_chance + self.crit_chance_per_level * player_level as f64;
        let chance = if chance.is_nan() { 0.0 } else { chance.clamp(0.0, 1.0) };
        if self.rng.random_bool(chance) {
            (damage * self.crit_multiplier, true)
        } else {
            (damage, false)
        }
    }
}

/// One entity death, reported to whoever materializes rewards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KillEvent {
    pub id: EntityId,
    pub kind_id: String,
    /// Position just before removal
    pub position: Vec2,
    /// Informational; rewards are materialized as pickups elsewhere
    pub reward: u32,
    pub is_elite: bool,
    pub is_boss: bool,
}

/// Result of damaging a single entity
#[derive(Debug, Clone, PartialEq)]
pub enum DamageResult {
    /// The id no longer exists
    NotFound,
    Hit { remaining: f32 },
    Killed(KillEvent),
}

/// Everything one activation did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CombatOutcome {
    /// Every entity the attack touched, in hit order
    pub hit_ids: Vec<EntityId>,
    pub kills: Vec<KillEvent>,
    /// Final per-entity damage of the activation
    pub damage: f32,
    pub critical: bool,
}

impl CombatOutcome {
    pub fn kill_count(&self) -> usize {
        self.kills.len()
    }

    pub fn killed_positions(&self) -> Vec<Vec2> {
        self.kills.iter().map(|k| k.position).collect()
    }

    /// Fold a follow-up activation into this one
    pub fn absorb(&mut self, other: CombatOutcome) {
        self.hit_ids.extend(other.hit_ids);
        self.kills.extend(other.kills);
        self.critical |= other.critical;
    }
}

fn kill_event(state: &SimState, entity: &Entity) -> KillEvent {
    let base = growth::kind_reward(&entity.kind, state.player.level);
    let multiplier = if entity.is_boss {
        state.settings.boss_reward_multiplier
    } else if entity.is_elite {
        state.settings.elite_reward_multiplier
    } else {
        1.0
    };
    KillEvent {
        id: entity.id,
        kind_id: entity.kind.id.clone(),
        position: entity.pos,
        reward: (base as f32 * multiplier).round() as u32,
        is_elite: entity.is_elite,
        is_boss: entity.is_boss,
    }
}

/// Subtract `amount` from one entity, removing it if it dies
pub fn damage_entity(state: &mut SimState, id: EntityId, amount: f32) -> DamageResult {
    let Some(index) = state.index_of(id) else {
        return DamageResult::NotFound;
    };
    let now = state.now_ms;
    let amount = if amount > 0.0 { amount } else { 0.0 };

    let entity = &mut state.entities[index];
    entity.hp -= amount;
    entity.flash_until_ms = now + FLASH_MS;
    if entity.hp > 0.0 {
        return DamageResult::Hit { remaining: entity.hp };
    }

    let entity = state.remove_at(index);
    DamageResult::Killed(kill_event(state, &entity))
}

/// Ids of entities touched by `shape`, in id order
pub fn entities_hit(state: &SimState, origin: Vec2, shape: &AttackShape) -> Vec<EntityId> {
    let unit = state.unit();
    state
        .entities
        .iter()
        .filter(|e| shape.hits(origin, e.pos, e.radius(unit)))
        .map(|e| e.id)
        .collect()
}

/// Apply already-final damage to a list of targets
pub(crate) fn apply_damage(state: &mut SimState, targets: &[EntityId], damage: f32, outcome: &mut CombatOutcome) {
    for &id in targets {
        match damage_entity(state, id, damage) {
            DamageResult::NotFound => {}
            DamageResult::Hit { .. } => outcome.hit_ids.push(id),
            DamageResult::Killed(kill) => {
                outcome.hit_ids.push(id);
                outcome.kills.push(kill);
            }
        }
    }
}

/// Hit everything inside `shape` with final damage, skipping the modifier
pub fn strike(state: &mut SimState, origin: Vec2, shape: &AttackShape, damage: f32) -> CombatOutcome {
    let targets = entities_hit(state, origin, shape);
    let mut outcome = CombatOutcome {
        damage,
        ..Default::default()
    };
    apply_damage(state, &targets, damage, &mut outcome);
    outcome
}

/// Run one activation: modifiers once, then the shape's hit set
pub fn resolve(
    state: &mut SimState,
    modifiers: &mut dyn DamageModifier,
    origin: Vec2,
    shape: &AttackShape,
    base_damage: f32,
) -> CombatOutcome {
    let (damage, critical) = modifiers.apply_crit_and_modifiers(base_damage, state.player.level);
    let mut outcome = strike(state, origin, shape, damage);
    outcome.critical = critical;
    outcome
}

pub fn resolve_circle(
    state: &mut SimState,
    modifiers: &mut dyn DamageModifier,
    origin: Vec2,
    radius: f32,
    base_damage: f32,
) -> CombatOutcome {
    resolve(state, modifiers, origin, &AttackShape::Circle { radius }, base_damage)
}

pub fn resolve_sector(
    state: &mut SimState,
    modifiers: &mut dyn DamageModifier,
    origin: Vec2,
    facing: f32,
    radius: f32,
    width: f32,
    base_damage: f32,
) -> CombatOutcome {
    let shape = AttackShape::Sector { facing, radius, width };
    resolve(state, modifiers, origin, &shape, base_damage)
}

pub fn resolve_beam(
    state: &mut SimState,
    modifiers: &mut dyn DamageModifier,
    origin: Vec2,
    direction: Vec2,
    length: f32,
    width: f32,
    base_damage: f32,
) -> CombatOutcome {
    let shape = AttackShape::Beam { direction, length, width };
    resolve(state, modifiers, origin, &shape, base_damage)
}

/// Fire `count` beams at distinct random live entities (drawn without
/// replacement). Beams beyond the live count fire in random directions.
pub fn resolve_random_beams(
    state: &mut SimState,
    modifiers: &mut dyn DamageModifier,
    origin: Vec2,
    count: usize,
    length: f32,
    width: f32,
    base_damage: f32,
) -> CombatOutcome {
    let (damage, critical) = modifiers.apply_crit_and_modifiers(base_damage, state.player.level);

    let live = state.len();
    let picks = count.min(live);
    let chosen = rand::seq::index::sample(&mut state.rng, live, picks);
    let mut directions: Vec<Vec2> = chosen
        .iter()
        .map(|i| (state.entities[i].pos - origin).normalize_or_zero())
        .collect();
    for direction in directions.iter_mut().filter(|d| **d == Vec2::ZERO) {
        *direction = random_direction(&mut state.rng);
    }
    for _ in picks..count {
        directions.push(random_direction(&mut state.rng));
    }

    let mut outcome = CombatOutcome {
        damage,
        critical,
        ..Default::default()
    };
    for direction in directions {
        let shape = AttackShape::Beam { direction, length, width };
        let targets = entities_hit(state, origin, &shape);
        apply_damage(state, &targets, damage, &mut outcome);
    }
    outcome
}

pub(crate) fn random_direction<R: Rng>(rng: &mut R) -> Vec2 {
    polar_to_cartesian(1.0, rng.random_range(0.0..std::f32::consts::TAU))
}

/// Burn tick driver: once per update, before expired effects are dropped.
///
/// Ticks fall on `last_tick + k * interval`. Every tick time up to `now`
/// and strictly before expiry is applied, so a long frame catches up
/// instead of losing ticks. A splash radius spreads the same damage to
/// neighbours.
pub fn tick_burns(state: &mut SimState) -> Vec<KillEvent> {
    let now = state.now_ms;
    let mut due: Vec<(EntityId, Vec2, f32, Option<f32>, u32)> = Vec::new();

    for entity in &mut state.entities {
        let Some(burn) = entity.effects.iter_mut().find(|e| e.kind == EffectKind::Burn) else {
            continue;
        };
        let interval = burn.tick_interval_ms.unwrap_or(1000.0).max(1.0);
        let mut ticks = 0;
        while burn.last_tick_ms + interval <= now && burn.last_tick_ms + interval < burn.expires_at_ms {
            burn.last_tick_ms += interval;
            ticks += 1;
        }
        if let Some(damage) = burn.tick_damage.filter(|_| ticks > 0) {
            due.push((entity.id, entity.pos, damage, burn.splash_radius, ticks));
        }
    }

    let unit = state.unit();
    let mut outcome = CombatOutcome::default();
    for (id, pos, damage, splash, ticks) in due {
        for _ in 0..ticks {
            apply_damage(state, &[id], damage, &mut outcome);
            if let Some(radius) = splash {
                let neighbours: Vec<EntityId> = state
                    .entities
                    .iter()
                    .filter(|e| e.id != id && circle_hit(pos, radius, e.pos, e.radius(unit)))
                    .map(|e| e.id)
                    .collect();
                apply_damage(state, &neighbours, damage, &mut outcome);
            }
        }
    }
    outcome.kills
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::effects::burn;
    use crate::sim::spawn::{spawn_entity, try_spawn_elite};

    fn state() -> SimState {
        SimState::with_defaults(5).unwrap()
    }

    /// Always doubles and always crits
    struct Doubler;

    impl DamageModifier for Doubler {
        fn apply_crit_and_modifiers(&mut self, base_damage: f32, _player_level: u32) -> (f32, bool) {
            (base_damage * 2.0, true)
        }
    }

    #[test]
    fn test_damage_missing_entity_is_noop() {
        let mut state = state();
        assert_eq!(damage_entity(&mut state, EntityId(42), 10.0), DamageResult::NotFound);
    }

    #[test]
    fn test_damage_then_kill() {
        let mut state = state();
        let id = spawn_entity(&mut state, "grunt", Vec2::new(5.0, 6.0)).unwrap();
        assert_eq!(damage_entity(&mut state, id, 5.0), DamageResult::Hit { remaining: 15.0 });
        match damage_entity(&mut state, id, 15.0) {
            DamageResult::Killed(kill) => {
                assert_eq!(kill.id, id);
                assert_eq!(kill.position, Vec2::new(5.0, 6.0));
                assert_eq!(kill.reward, 1);
                assert!(!kill.is_elite);
            }
            other => panic!("expected kill, got {other:?}"),
        }
        assert!(state.entity(id).is_none());
        assert_eq!(damage_entity(&mut state, id, 1.0), DamageResult::NotFound);
    }

    #[test]
    fn test_negative_damage_does_not_heal() {
        let mut state = state();
        let id = spawn_entity(&mut state, "grunt", Vec2::ZERO).unwrap();
        damage_entity(&mut state, id, -50.0);
        assert_eq!(state.entity(id).unwrap().hp, 20.0);
    }

    #[test]
    fn test_modifier_applied_once_per_activation() {
        let mut state = state();
        let a = spawn_entity(&mut state, "grunt", Vec2::new(10.0, 0.0)).unwrap();
        let b = spawn_entity(&mut state, "grunt", Vec2::new(-10.0, 0.0)).unwrap();
        let outcome = resolve_circle(&mut state, &mut Doubler, Vec2::ZERO, 50.0, 4.0);
        assert_eq!(outcome.damage, 8.0);
        assert!(outcome.critical);
        assert_eq!(outcome.hit_ids, vec![a, b]);
        assert_eq!(state.entity(a).unwrap().hp, 12.0);
        assert_eq!(state.entity(b).unwrap().hp, 12.0);
    }

    #[test]
    fn test_sector_only_hits_front() {
        let mut state = state();
        let front = spawn_entity(&mut state, "grunt", Vec2::new(60.0, 0.0)).unwrap();
        let back = spawn_entity(&mut state, "grunt", Vec2::new(-60.0, 0.0)).unwrap();
        let outcome = resolve_sector(&mut state, &mut NoModifiers, Vec2::ZERO, 0.0, 100.0, 1.0, 1.0);
        assert_eq!(outcome.hit_ids, vec![front]);
        assert_eq!(state.entity(back).unwrap().hp, 20.0);
    }

    #[test]
    fn test_beam_kills_report_positions() {
        let mut state = state();
        spawn_entity(&mut state, "grunt", Vec2::new(100.0, 0.0)).unwrap();
        spawn_entity(&mut state, "grunt", Vec2::new(200.0, 0.0)).unwrap();
        spawn_entity(&mut state, "grunt", Vec2::new(100.0, 300.0)).unwrap();
        let outcome = resolve_beam(&mut state, &mut NoModifiers, Vec2::ZERO, Vec2::X, 500.0, 20.0, 100.0);
        assert_eq!(outcome.kill_count(), 2);
        assert_eq!(
            outcome.killed_positions(),
            vec![Vec2::new(100.0, 0.0), Vec2::new(200.0, 0.0)]
        );
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn test_random_beams_pick_distinct_targets() {
        let mut state = state();
        let a = spawn_entity(&mut state, "grunt", Vec2::new(300.0, 0.0)).unwrap();
        let b = spawn_entity(&mut state, "grunt", Vec2::new(0.0, 300.0)).unwrap();
        let outcome = resolve_random_beams(&mut state, &mut NoModifiers, Vec2::ZERO, 2, 400.0, 10.0, 1.0);
        // one beam per target, no target picked twice
        assert_eq!(outcome.hit_ids.iter().filter(|&&id| id == a).count(), 1);
        assert_eq!(outcome.hit_ids.iter().filter(|&&id| id == b).count(), 1);
        assert_eq!(state.entity(a).unwrap().hp, 19.0);
        assert_eq!(state.entity(b).unwrap().hp, 19.0);
    }

    #[test]
    fn test_random_beams_with_no_targets() {
        let mut state = state();
        let outcome = resolve_random_beams(&mut state, &mut NoModifiers, Vec2::ZERO, 3, 400.0, 10.0, 1.0);
        assert!(outcome.hit_ids.is_empty());
    }

    #[test]
    fn test_elite_reward_multiplier() {
        let mut state = state();
        state.player.level = 5;
        let id = try_spawn_elite(&mut state, 5).unwrap();
        let hp = state.entity(id).unwrap().hp;
        match damage_entity(&mut state, id, hp) {
            DamageResult::Killed(kill) => {
                assert!(kill.is_elite);
                assert_eq!(kill.reward, 10 * 5);
            }
            other => panic!("expected kill, got {other:?}"),
        }
    }

    #[test]
    fn test_burn_splash_hits_neighbours() {
        let mut state = state();
        let burning = spawn_entity(&mut state, "grunt", Vec2::ZERO).unwrap();
        let near = spawn_entity(&mut state, "grunt", Vec2::new(30.0, 0.0)).unwrap();
        let far = spawn_entity(&mut state, "grunt", Vec2::new(500.0, 0.0)).unwrap();
        burn(&mut state, &[burning], 5000.0, 1000.0, 3.0, Some(20.0));

        state.now_ms = 500.0;
        assert!(tick_burns(&mut state).is_empty());
        assert_eq!(state.entity(burning).unwrap().hp, 20.0);

        state.now_ms = 1000.0;
        tick_burns(&mut state);
        assert_eq!(state.entity(burning).unwrap().hp, 17.0);
        assert_eq!(state.entity(near).unwrap().hp, 17.0);
        assert_eq!(state.entity(far).unwrap().hp, 20.0);
    }

    #[test]
    fn test_long_frame_catches_up_burn_ticks() {
        let mut state = state();
        let id = spawn_entity(&mut state, "grunt", Vec2::ZERO).unwrap();
        burn(&mut state, &[id], 3000.0, 1000.0, 5.0, None);

        state.now_ms = 1500.0;
        tick_burns(&mut state);
        assert_eq!(state.entity(id).unwrap().hp, 15.0);

        // the tick due at 2000 still lands; the one at 3000 is at expiry
        state.now_ms = 3000.0;
        tick_burns(&mut state);
        assert_eq!(state.entity(id).unwrap().hp, 10.0);
        state.now_ms = 9000.0;
        tick_burns(&mut state);
        assert_eq!(state.entity(id).unwrap().hp, 10.0);
    }

    #[test]
    fn test_single_frame_applies_every_due_tick() {
        let mut state = state();
        let id = spawn_entity(&mut state, "grunt", Vec2::ZERO).unwrap();
        burn(&mut state, &[id], 10_000.0, 1000.0, 2.0, None);
        state.now_ms = 4500.0;
        tick_burns(&mut state);
        assert_eq!(state.entity(id).unwrap().hp, 12.0);
        assert_eq!(state.entity(id).unwrap().effects[0].last_tick_ms, 4000.0);
    }

    #[test]
    fn test_nan_crit_chance_never_crits() {
        let mut modifiers = CritModifiers::new(3, 1.0, f64::NAN, 2.0);
        for level in [0, 10, 100] {
            assert_eq!(modifiers.apply_crit_and_modifiers(10.0, level), (10.0, false));
        }
    }

    #[test]
    fn test_crit_modifiers_bounds() {
        let mut always = CritModifiers::new(1, 1.5, 1.0, 2.0);
        assert_eq!(always.apply_crit_and_modifiers(10.0, 0), (30.0, true));
        let mut never = CritModifiers::new(1, 1.0, 0.0, 2.0);
        never.crit_chance_per_level = 0.0;
        assert_eq!(never.apply_crit_and_modifiers(10.0, 50), (10.0, false));
    }
}
