//! Timed status effects
//!
//! This module only tracks which effects exist and when they end. What an
//! effect *does* lives elsewhere: movement checks stun, and the burn tick
//! driver in `combat` applies burn damage.

use serde::{Deserialize, Serialize};

use super::state::{Entity, EntityId, SimState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    /// Freezes movement, contact attacks and animation
    Stun,
    /// Periodic damage
    Burn,
}

/// One timed effect on one entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatusEffect {
    pub kind: EffectKind,
    /// Absolute expiry on the simulation clock
    pub expires_at_ms: f64,
    pub tick_damage: Option<f32>,
    pub tick_interval_ms: Option<f64>,
    /// Neighbours within this radius share each tick
    pub splash_radius: Option<f32>,
    /// Stamped with the application time when first added
    pub last_tick_ms: f64,
}

impl StatusEffect {
    pub fn new(kind: EffectKind, expires_at_ms: f64) -> Self {
        Self {
            kind,
            expires_at_ms,
            tick_damage: None,
            tick_interval_ms: None,
            splash_radius: None,
            last_tick_ms: 0.0,
        }
    }

    pub fn stun(until_ms: f64) -> Self {
        Self::new(EffectKind::Stun, until_ms)
    }

    pub fn burn(until_ms: f64, tick_interval_ms: f64, damage: f32, splash_radius: Option<f32>) -> Self {
        Self {
            tick_damage: Some(damage),
            tick_interval_ms: Some(tick_interval_ms),
            splash_radius,
            ..Self::new(EffectKind::Burn, until_ms)
        }
    }

    /// Active through every tick strictly before expiry
    #[inline]
    pub fn is_active(&self, now_ms: f64) -> bool {
        now_ms < self.expires_at_ms
    }

    /// Extend to the later end time and take any supplied numbers
    fn refresh(&mut self, other: &StatusEffect) {
        self.expires_at_ms = self.expires_at_ms.max(other.expires_at_ms);
        if other.tick_damage.is_some() {
            self.tick_damage = other.tick_damage;
        }
        if other.tick_interval_ms.is_some() {
            self.tick_interval_ms = other.tick_interval_ms;
        }
        if other.splash_radius.is_some() {
            self.splash_radius = other.splash_radius;
        }
    }
}

impl Entity {
    pub fn effect(&self, kind: EffectKind) -> Option<&StatusEffect> {
        self.effects.iter().find(|e| e.kind == kind)
    }

    /// Whether an active effect of `kind` is present at `now_ms`
    pub fn has_effect(&self, kind: EffectKind, now_ms: f64) -> bool {
        self.effect(kind).is_some_and(|e| e.is_active(now_ms))
    }

    #[inline]
    pub fn is_stunned(&self, now_ms: f64) -> bool {
        self.has_effect(EffectKind::Stun, now_ms)
    }

    fn apply_effect(&mut self, effect: &StatusEffect, now_ms: f64) {
        match self.effects.iter_mut().find(|e| e.kind == effect.kind) {
            Some(existing) => existing.refresh(effect),
            None => self.effects.push(StatusEffect {
                last_tick_ms: now_ms,
                ..*effect
            }),
        }
    }
}

/// Apply `effect` to every listed entity that still exists.
/// Returns how many entities received it.
pub fn apply_status_effect(state: &mut SimState, targets: &[EntityId], effect: StatusEffect) -> usize {
    let now = state.now_ms;
    let mut applied = 0;
    for &id in targets {
        if let Some(entity) = state.entity_mut(id) {
            entity.apply_effect(&effect, now);
            applied += 1;
        }
    }
    applied
}

pub fn stun(state: &mut SimState, targets: &[EntityId], until_ms: f64) -> usize {
    apply_status_effect(state, targets, StatusEffect::stun(until_ms))
}

pub fn burn(
    state: &mut SimState,
    targets: &[EntityId],
    until_ms: f64,
    tick_interval_ms: f64,
    damage: f32,
    splash_radius: Option<f32>,
) -> usize {
    let effect = StatusEffect::burn(until_ms, tick_interval_ms.max(1.0), damage, splash_radius);
    apply_status_effect(state, targets, effect)
}

/// Drop every effect whose expiry is at or before the current time
pub fn cleanup_expired_effects(state: &mut SimState) {
    let now = state.now_ms;
    for entity in &mut state.entities {
        entity.effects.retain(|e| e.is_active(now));
    }
}

pub fn has_effect(state: &SimState, id: EntityId, kind: EffectKind) -> bool {
    state
        .entity(id)
        .is_some_and(|e| e.has_effect(kind, state.now_ms))
}

pub fn get_effect(state: &SimState, id: EntityId, kind: EffectKind) -> Option<&StatusEffect> {
    state
        .entity(id)
        .and_then(|e| e.effect(kind))
        .filter(|e| e.is_active(state.now_ms))
}

/// Ids of every entity carrying an active effect of `kind`, in id order
pub fn all_with_effect(state: &SimState, kind: EffectKind) -> Vec<EntityId> {
    state
        .entities
        .iter()
        .filter(|e| e.has_effect(kind, state.now_ms))
        .map(|e| e.id)
        .collect()
}
