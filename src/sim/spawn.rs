//! Spawn scheduling
//!
//! Normal waves run on a population- and phase-dependent cadence,
//! line-runner swarms on their own fixed timer, and elites/bosses are
//! triggered by the caller when the player reaches a qualifying level.

use std::sync::Arc;

use glam::Vec2;
use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;

use super::growth;
use super::kind::{Behavior, EntityKind};
use super::state::{Entity, EntityId, SimState};
use crate::consts::*;
use crate::settings::SimSettings;
use crate::{Rect, polar_to_cartesian};

/// Viewport edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

/// Normal waves and elites never come from below
pub const WAVE_EDGES: [Edge; 3] = [Edge::Top, Edge::Left, Edge::Right];
pub const ALL_EDGES: [Edge; 4] = [Edge::Top, Edge::Bottom, Edge::Left, Edge::Right];

/// Uniform point on a random edge of `view`, `distance` outside it
pub(crate) fn edge_point<R: Rng>(rng: &mut R, view: Rect, distance: f32, edges: &[Edge]) -> Vec2 {
    let edge = edges[rng.random_range(0..edges.len())];
    match edge {
        Edge::Top => Vec2::new(rng.random_range(view.left()..=view.right()), view.top() - distance),
        Edge::Bottom => Vec2::new(rng.random_range(view.left()..=view.right()), view.bottom() + distance),
        Edge::Left => Vec2::new(view.left() - distance, rng.random_range(view.top()..=view.bottom())),
        Edge::Right => Vec2::new(view.right() + distance, rng.random_range(view.top()..=view.bottom())),
    }
}

/// Interval until the next wave.
///
/// Shrinks as the population grows (density constant over the live count,
/// count floored at 1) and as the time phase speeds up; never below the
/// configured minimum.
pub fn spawn_interval_ms(settings: &SimSettings, live_count: usize, elapsed_ms: f64) -> f64 {
    let density = settings.target_density as f64 / live_count.max(1) as f64;
    let phase = settings.phase_multiplier(elapsed_ms) as f64;
    (settings.base_spawn_interval_ms * density / phase).max(settings.min_spawn_interval_ms)
}

/// Entities in the next wave, at least 1 and at most `remaining`
pub fn wave_size(settings: &SimSettings, elapsed_ms: f64, spawn_multiplier: f32, remaining: usize) -> usize {
    let scaled = settings.base_wave_count * settings.phase_multiplier(elapsed_ms) * spawn_multiplier;
    (scaled.floor().max(1.0) as usize).min(remaining)
}

fn build_entity(
    state: &mut SimState,
    kind: Arc<EntityKind>,
    pos: Vec2,
    level: u32,
    hp_multiplier: f32,
) -> Entity {
    let hp = growth::kind_hp(&kind, level, state.difficulty.hp) * hp_multiplier;
    let contact_damage = growth::damage(level, kind.damage_factor, state.difficulty.damage);
    let anim_phase = state.rng.random_range(0.0..std::f32::consts::TAU);
    let anim_rate = state.rng.random_range(ANIM_RATE_MIN..ANIM_RATE_MAX);
    let is_elite = kind.behavior == Behavior::Elite;
    let is_boss = kind.behavior == Behavior::Boss;

    Entity {
        id: state.next_entity_id(),
        kind,
        pos,
        hp,
        max_hp: hp,
        contact_damage,
        last_contact_ms: f64::NEG_INFINITY,
        anim_phase,
        anim_rate,
        flash_until_ms: 0.0,
        direction: None,
        is_elite,
        is_boss,
        hp_multiplier,
        effects: Vec::new(),
        visible: true,
    }
}

/// Place one entity of a registered kind at `pos`.
/// Returns `None` when the kind is unknown or the store is full.
pub fn spawn_entity(state: &mut SimState, kind_id: &str, pos: Vec2) -> Option<EntityId> {
    if state.remaining_capacity() == 0 {
        return None;
    }
    let kind = Arc::clone(state.kinds.get(kind_id)?);
    let level = state.player.level;
    let entity = build_entity(state, kind, pos, level, 1.0);
    let id = entity.id;
    state.insert(entity);
    Some(id)
}

fn pick_wave_kind(state: &mut SimState) -> Option<Arc<EntityKind>> {
    let level = state.player.level;
    let eligible: Vec<&Arc<EntityKind>> = state
        .wave_kinds
        .iter()
        .filter(|k| k.min_level <= level)
        .collect();
    let weights = WeightedIndex::new(eligible.iter().map(|k| k.spawn_weight)).ok()?;
    let pick = weights.sample(&mut state.rng);
    eligible.get(pick).map(|k| Arc::clone(k))
}

/// Off-screen spawn point above/left/right of the camera, inside the map
fn wave_spawn_point(state: &mut SimState) -> Vec2 {
    let view = state.viewport();
    let margin = SPAWN_MARGIN_UNITS * state.unit();
    let p = edge_point(&mut state.rng, view, margin, &WAVE_EDGES);
    state.settings.map_bounds.clamp(p)
}

/// Spawn a wave if the cadence timer has elapsed
pub fn maybe_spawn_wave(state: &mut SimState) -> Vec<EntityId> {
    if state.now_ms < state.next_wave_at_ms {
        return Vec::new();
    }

    let interval = spawn_interval_ms(&state.settings, state.len(), state.now_ms);
    state.next_wave_at_ms = state.now_ms + interval;

    let remaining = state.remaining_capacity();
    if remaining == 0 {
        return Vec::new();
    }

    let count = wave_size(&state.settings, state.now_ms, state.difficulty.spawn_count, remaining);
    let level = state.player.level;
    let mut spawned = Vec::with_capacity(count);
    for _ in 0..count {
        let Some(kind) = pick_wave_kind(state) else {
            log::warn!("No wave kind unlocked at level {}", level);
            break;
        };
        let pos = wave_spawn_point(state);
        let entity = build_entity(state, kind, pos, level, 1.0);
        spawned.push(entity.id);
        state.insert(entity);
    }

    log::debug!(
        "Wave at {:.0}ms: {} spawned, {} live, next in {:.0}ms",
        state.now_ms,
        spawned.len(),
        state.len(),
        interval
    );
    spawned
}

/// Uniform point inside a disc
fn point_in_disc<R: Rng>(rng: &mut R, center: Vec2, radius: f32) -> Vec2 {
    let r = radius * rng.random::<f32>().sqrt();
    let theta = rng.random_range(0.0..std::f32::consts::TAU);
    center + polar_to_cartesian(r, theta)
}

/// Spawn a line-runner batch if its timer has elapsed
pub fn maybe_spawn_line_runners(state: &mut SimState) -> Vec<EntityId> {
    if state.now_ms < state.next_line_runners_at_ms {
        return Vec::new();
    }
    state.next_line_runners_at_ms = state.now_ms + state.settings.line_runner_period_ms;
    spawn_line_runner_batch(state)
}

/// Spawn one batch from a random corner aimed past the opposite corner
pub fn spawn_line_runner_batch(state: &mut SimState) -> Vec<EntityId> {
    let Some(kind) = state.line_runner_kind.clone() else {
        return Vec::new();
    };

    let unit = state.unit();
    let view = state.viewport();
    let corners = [
        Vec2::new(view.left(), view.top()),
        Vec2::new(view.right(), view.top()),
        Vec2::new(view.left(), view.bottom()),
        Vec2::new(view.right(), view.bottom()),
    ];
    let corner_index = state.rng.random_range(0..corners.len());
    let corner = corners[corner_index];
    let opposite = corners[corners.len() - 1 - corner_index];

    let outward = (corner - view.center()).normalize_or_zero();
    let disc_radius = state.settings.line_runner_disc_units * unit;
    let anchor = corner + outward * disc_radius;
    let target = opposite - outward * state.settings.line_runner_overshoot_units * unit;
    let min_spacing = state.settings.line_runner_min_spacing_units * unit;
    let attempts = state.settings.line_runner_max_attempts;
    let level = state.player.level;

    let batch = state.settings.line_runner_batch.min(state.remaining_capacity());
    let mut placed: Vec<Vec2> = Vec::with_capacity(batch);
    let mut spawned = Vec::with_capacity(batch);

    for _ in 0..batch {
        // Keep the last candidate if no spaced spot turns up
        let mut candidate = point_in_disc(&mut state.rng, anchor, disc_radius);
        for _ in 1..attempts {
            if placed.iter().all(|p| p.distance(candidate) >= min_spacing) {
                break;
            }
            candidate = point_in_disc(&mut state.rng, anchor, disc_radius);
        }
        placed.push(candidate);

        let heading = (target - candidate).normalize_or_zero();
        let direction = if heading == Vec2::ZERO { -outward } else { heading };

        let mut entity = build_entity(state, Arc::clone(&kind), candidate, level, 1.0);
        entity.direction = Some(direction);
        spawned.push(entity.id);
        state.insert(entity);
    }

    log::debug!("Line-runner batch from corner {}: {} spawned", corner_index, spawned.len());
    spawned
}

/// Spawn an elite when `level` is a positive multiple of the elite tier and
/// has not produced one yet. Elite HP is the level's HP times the level.
pub fn try_spawn_elite(state: &mut SimState, level: u32) -> Option<EntityId> {
    let tier = state.settings.elite_tier_levels;
    if level == 0 || level % tier != 0 || state.elite_levels.contains(&level) {
        return None;
    }
    if state.remaining_capacity() == 0 {
        return None;
    }

    let kind = match state.elite_kind.clone() {
        Some(kind) => kind,
        None => pick_wave_kind(state)?,
    };
    let pos = wave_spawn_point(state);
    let mut entity = build_entity(state, kind, pos, level, level as f32);
    entity.is_elite = true;
    let id = entity.id;
    log::info!(
        "Elite {} ({}) spawned for level {} with {:.0} HP",
        id.0,
        entity.kind.id,
        level,
        entity.hp
    );
    state.insert(entity);
    state.elite_levels.insert(level);
    Some(id)
}

/// Spawn a boss when `level` is a positive multiple of the boss tier and
/// has not produced one yet
pub fn try_spawn_boss(state: &mut SimState, level: u32) -> Option<EntityId> {
    let tier = state.settings.boss_tier_levels;
    if level == 0 || level % tier != 0 || state.boss_levels.contains(&level) {
        return None;
    }
    if state.remaining_capacity() == 0 {
        return None;
    }

    let kind = state.boss_kind.clone()?;
    let multiplier = state.settings.boss_hp_multiplier;
    let pos = wave_spawn_point(state);
    let mut entity = build_entity(state, kind, pos, level, multiplier);
    entity.is_boss = true;
    let id = entity.id;
    log::info!("Boss {} ({}) spawned for level {} with {:.0} HP", id.0, entity.kind.id, level, entity.hp);
    state.insert(entity);
    state.boss_levels.insert(level);
    Some(id)
}

/// Scheduler step of the frame pass
pub fn run(state: &mut SimState) -> Vec<EntityId> {
    let mut spawned = maybe_spawn_wave(state);
    spawned.extend(maybe_spawn_line_runners(state));
    spawned
}
