//! Player skills
//!
//! Each skill maps its level to a shape and a damage value through a
//! linear formula in damage units, then hands off to the combat resolver.
//! Follow-ups (Nova's echo, Cleave's ignite, Lance's chain) re-enter the
//! resolver at most once per cast and never trigger further follow-ups.

use std::f32::consts::PI;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::combat::{self, CombatOutcome, DamageModifier, apply_damage, strike};
use super::effects;
use super::shapes::AttackShape;
use super::state::{EntityId, SimState};
use crate::consts::DAMAGE_UNIT;

/// Echo radius relative to the original nova
pub const NOVA_ECHO_RADIUS_FACTOR: f32 = 0.6;
/// Burn applied by Cleave's ignite
pub const IGNITE_DURATION_MS: f64 = 3000.0;
pub const IGNITE_INTERVAL_MS: f64 = 1000.0;
/// Ignite tick damage as a fraction of the cleave hit
pub const IGNITE_DAMAGE_FACTOR: f32 = 0.2;
/// Lance chain damage as a fraction of the beam hit
pub const CHAIN_DAMAGE_FACTOR: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillKind {
    /// Circle centred on the caster
    Nova,
    /// Sector in front of the caster
    Cleave,
    /// Beams at random targets
    Lance,
}

impl SkillKind {
    pub const ALL: [SkillKind; 3] = [SkillKind::Nova, SkillKind::Cleave, SkillKind::Lance];

    pub fn as_str(&self) -> &'static str {
        match self {
            SkillKind::Nova => "nova",
            SkillKind::Cleave => "cleave",
            SkillKind::Lance => "lance",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "nova" => Some(SkillKind::Nova),
            "cleave" => Some(SkillKind::Cleave),
            "lance" => Some(SkillKind::Lance),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub kind: SkillKind,
    pub level: u32,
}

impl Skill {
    pub fn new(kind: SkillKind, level: u32) -> Self {
        Self { kind, level }
    }

    /// Damage in damage units before modifiers
    pub fn damage_units(&self) -> f32 {
        let level = self.level as f32;
        match self.kind {
            SkillKind::Nova => 1.0 + 0.5 * level,
            SkillKind::Cleave => 1.5 + 0.6 * level,
            SkillKind::Lance => 0.8 + 0.4 * level,
        }
    }

    /// Raw damage before modifiers
    pub fn base_damage(&self) -> f32 {
        self.damage_units() * DAMAGE_UNIT
    }

    /// Reach in abstract units: nova/cleave radius, lance length
    pub fn reach_units(&self) -> f32 {
        let level = self.level as f32;
        match self.kind {
            SkillKind::Nova => 2.0 + 0.1 * level,
            SkillKind::Cleave => 1.8 + 0.05 * level,
            SkillKind::Lance => 6.0,
        }
    }

    /// Cleave arc in radians
    pub fn cleave_width(&self) -> f32 {
        2.0 * PI / 3.0
    }

    /// Lance width in abstract units
    pub fn lance_width_units(&self) -> f32 {
        0.3
    }

    pub fn beam_count(&self) -> usize {
        1 + self.level as usize / 2
    }

    /// Time between automatic casts, shortening 3% per level down to half
    pub fn cooldown_ms(&self) -> f64 {
        let base = match self.kind {
            SkillKind::Nova => 1500.0,
            SkillKind::Cleave => 900.0,
            SkillKind::Lance => 1200.0,
        };
        (base * 0.97f64.powi(self.level as i32)).max(base * 0.5)
    }

    /// Minimum level for the follow-up and its trigger chance
    pub fn follow_up(&self) -> (u32, f64) {
        match self.kind {
            SkillKind::Nova => (3, 0.25),
            SkillKind::Cleave => (4, 0.30),
            SkillKind::Lance => (3, 0.30),
        }
    }
}

/// Cast `skill` from `origin`. `facing` (radians) aims Cleave; the other
/// skills ignore it.
pub fn cast(
    state: &mut SimState,
    modifiers: &mut dyn DamageModifier,
    skill: &Skill,
    origin: Vec2,
    facing: f32,
) -> CombatOutcome {
    let (min_level, chance) = skill.follow_up();
    let chance = if skill.level >= min_level { chance } else { 0.0 };
    cast_with_chance(state, modifiers, skill, origin, facing, chance)
}

fn cast_with_chance(
    state: &mut SimState,
    modifiers: &mut dyn DamageModifier,
    skill: &Skill,
    origin: Vec2,
    facing: f32,
    chance: f64,
) -> CombatOutcome {
    let unit = state.unit();
    let reach = skill.reach_units() * unit;
    let base = skill.base_damage();

    match skill.kind {
        SkillKind::Nova => {
            let mut outcome = combat::resolve_circle(state, modifiers, origin, reach, base);
            if outcome.kills.is_empty() || !roll(state, chance) {
                return outcome;
            }
            let pick = state.rng.random_range(0..outcome.kills.len());
            let center = outcome.kills[pick].position;
            let echo = AttackShape::Circle {
                radius: reach * NOVA_ECHO_RADIUS_FACTOR,
            };
            let follow = strike(state, center, &echo, outcome.damage);
            outcome.absorb(follow);
            outcome
        }
        SkillKind::Cleave => {
            let width = skill.cleave_width();
            let outcome = combat::resolve_sector(state, modifiers, origin, facing, reach, width, base);
            let survivors: Vec<EntityId> = outcome
                .hit_ids
                .iter()
                .copied()
                .filter(|id| state.entity(*id).is_some())
                .collect();
            if survivors.is_empty() || !roll(state, chance) {
                return outcome;
            }
            let until = state.now_ms + IGNITE_DURATION_MS;
            let tick = outcome.damage * IGNITE_DAMAGE_FACTOR;
            let ignited = effects::burn(state, &survivors, until, IGNITE_INTERVAL_MS, tick, None);
            log::debug!("Cleave ignited {} survivors", ignited);
            outcome
        }
        SkillKind::Lance => {
            let width = skill.lance_width_units() * unit;
            let count = skill.beam_count();
            let mut outcome = combat::resolve_random_beams(state, modifiers, origin, count, reach, width, base);
            let candidates: Vec<EntityId> = state
                .entities()
                .iter()
                .map(|e| e.id)
                .filter(|id| !outcome.hit_ids.contains(id))
                .collect();
            if candidates.is_empty() || !roll(state, chance) {
                return outcome;
            }
            let target = candidates[state.rng.random_range(0..candidates.len())];
            let damage = outcome.damage * CHAIN_DAMAGE_FACTOR;
            apply_damage(state, &[target], damage, &mut outcome);
            outcome
        }
    }
}

fn roll(state: &mut SimState, chance: f64) -> bool {
    chance > 0.0 && state.rng.random_bool(chance.min(1.0))
}
