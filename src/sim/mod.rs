//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Simulation clock only, no wall time
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod combat;
pub mod effects;
pub mod growth;
pub mod kind;
pub mod movement;
pub mod shapes;
pub mod skills;
pub mod snapshot;
pub mod spawn;
pub mod state;
pub mod tick;

pub use combat::{
    CombatOutcome, CritModifiers, DamageModifier, DamageResult, KillEvent, NoModifiers, damage_entity,
    resolve_beam, resolve_circle, resolve_random_beams, resolve_sector, tick_burns,
};
pub use effects::{
    EffectKind, StatusEffect, all_with_effect, apply_status_effect, burn, cleanup_expired_effects, get_effect,
    has_effect, stun,
};
pub use kind::{Behavior, EntityKind, KindRegistry};
pub use shapes::AttackShape;
pub use skills::{Skill, SkillKind, cast};
pub use snapshot::{EntityView, get_all, hide_all, world_to_cell};
pub use spawn::{spawn_entity, try_spawn_boss, try_spawn_elite};
pub use state::{Entity, EntityId, Player, SimState, SlowZone};
pub use tick::{FrameInput, FrameReport, update};
