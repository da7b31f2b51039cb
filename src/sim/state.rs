//! Simulation state and core entity types
//!
//! `SimState` is the single owner of every live entity and of the
//! world-level singletons (taunt target, slow zone). Subsystems receive it by
//! `&mut` and run in a fixed order, so no synchronization is needed.

use std::collections::BTreeSet;
use std::sync::Arc;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::effects::StatusEffect;
use super::kind::{Behavior, EntityKind, KindRegistry};
use crate::error::ConfigError;
use crate::settings::{Difficulty, SimSettings};
use crate::Rect;

/// Unique entity identifier, never reused until `reset`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// A live hostile entity
#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    pub kind: Arc<EntityKind>,
    pub pos: Vec2,
    pub hp: f32,
    pub max_hp: f32,
    /// Damage dealt to the player per contact hit
    pub contact_damage: f32,
    /// Last time this entity damaged the player
    pub last_contact_ms: f64,
    pub anim_phase: f32,
    pub anim_rate: f32,
    /// Cosmetic only
    pub flash_until_ms: f64,
    /// Fixed heading for line-runners
    pub direction: Option<Vec2>,
    pub is_elite: bool,
    pub is_boss: bool,
    /// HP multiplier captured at spawn
    pub hp_multiplier: f32,
    pub effects: Vec<StatusEffect>,
    pub visible: bool,
}

impl Entity {
    /// Collider radius in world pixels
    #[inline]
    pub fn radius(&self, unit: f32) -> f32 {
        self.kind.radius(unit)
    }

    #[inline]
    pub fn is_line_runner(&self) -> bool {
        self.kind.behavior == Behavior::LineRunner
    }

    /// Elites and bosses only leave play by dying
    #[inline]
    pub fn is_persistent(&self) -> bool {
        self.is_elite || self.is_boss
    }
}

/// Circular region that slows anything inside it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlowZone {
    pub center: Vec2,
    pub radius: f32,
    pub multiplier: f32,
}

impl SlowZone {
    /// Speed multiplier for an entity at `pos`
    pub fn multiplier_at(&self, pos: Vec2) -> f32 {
        if pos.distance_squared(self.center) <= self.radius * self.radius {
            self.multiplier
        } else {
            1.0
        }
    }
}

/// Player data supplied by the caller
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub level: u32,
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct SimState {
    pub(crate) settings: SimSettings,
    pub(crate) kinds: KindRegistry,
    pub(crate) wave_kinds: Vec<Arc<EntityKind>>,
    pub(crate) line_runner_kind: Option<Arc<EntityKind>>,
    pub(crate) elite_kind: Option<Arc<EntityKind>>,
    pub(crate) boss_kind: Option<Arc<EntityKind>>,
    /// Run seed for reproducibility
    pub seed: u64,
    pub(crate) rng: Pcg32,
    /// Simulation clock (ms since start or last reset)
    pub now_ms: f64,
    pub player: Player,
    /// Top-left corner of the camera viewport
    pub camera: Vec2,
    pub difficulty: Difficulty,
    pub taunt_target: Option<Vec2>,
    pub slow_zone: Option<SlowZone>,
    /// Live entities (sorted by id)
    pub(crate) entities: Vec<Entity>,
    next_id: u32,
    pub(crate) next_wave_at_ms: f64,
    pub(crate) next_line_runners_at_ms: f64,
    pub(crate) elite_levels: BTreeSet<u32>,
    pub(crate) boss_levels: BTreeSet<u32>,
}

impl SimState {
    /// Build a simulation, resolving every kind the settings reference
    pub fn new(settings: SimSettings, kinds: KindRegistry, seed: u64) -> Result<Self, ConfigError> {
        settings.validate()?;

        let wave_kinds = settings
            .wave_kinds
            .iter()
            .map(|id| kinds.require(id, "wave kind", Behavior::Normal))
            .collect::<Result<Vec<_>, _>>()?;
        let line_runner_kind = settings
            .line_runner_kind
            .as_deref()
            .map(|id| kinds.require(id, "line-runner kind", Behavior::LineRunner))
            .transpose()?;
        let elite_kind = settings
            .elite_kind
            .as_deref()
            .map(|id| kinds.require(id, "elite kind", Behavior::Elite))
            .transpose()?;
        let boss_kind = settings
            .boss_kind
            .as_deref()
            .map(|id| kinds.require(id, "boss kind", Behavior::Boss))
            .transpose()?;

        let line_runner_period = settings.line_runner_period_ms;
        log::info!(
            "Simulation ready: {} kinds, {} wave kinds, capacity {}",
            kinds.len(),
            wave_kinds.len(),
            settings.max_entities
        );

        Ok(Self {
            settings,
            kinds,
            wave_kinds,
            line_runner_kind,
            elite_kind,
            boss_kind,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            now_ms: 0.0,
            player: Player::default(),
            camera: Vec2::ZERO,
            difficulty: Difficulty::default(),
            taunt_target: None,
            slow_zone: None,
            entities: Vec::new(),
            next_id: 1,
            next_wave_at_ms: 0.0,
            next_line_runners_at_ms: line_runner_period,
            elite_levels: BTreeSet::new(),
            boss_levels: BTreeSet::new(),
        })
    }

    /// Builtin kinds with default settings
    pub fn with_defaults(seed: u64) -> Result<Self, ConfigError> {
        Self::new(SimSettings::default(), KindRegistry::builtin()?, seed)
    }

    pub fn settings(&self) -> &SimSettings {
        &self.settings
    }

    pub fn kinds(&self) -> &KindRegistry {
        &self.kinds
    }

    /// World pixels per abstract unit
    #[inline]
    pub fn unit(&self) -> f32 {
        self.settings.unit()
    }

    /// Current camera viewport
    pub fn viewport(&self) -> Rect {
        self.settings.viewport_at(self.camera)
    }

    /// Live entities, ordered by id
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Free slots before the entity cap
    pub fn remaining_capacity(&self) -> usize {
        self.settings.max_entities.saturating_sub(self.entities.len())
    }

    pub(crate) fn index_of(&self, id: EntityId) -> Option<usize> {
        self.entities.binary_search_by_key(&id, |e| e.id).ok()
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.index_of(id).map(|i| &self.entities[i])
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        let index = self.index_of(id)?;
        Some(&mut self.entities[index])
    }

    /// Allocate a new entity ID
    pub(crate) fn next_entity_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Add an entity; ids are allocated in order so the store stays sorted
    pub(crate) fn insert(&mut self, entity: Entity) {
        debug_assert!(self.entities.last().is_none_or(|last| last.id < entity.id));
        self.entities.push(entity);
    }

    pub(crate) fn remove_at(&mut self, index: usize) -> Entity {
        self.entities.remove(index)
    }

    pub fn set_player(&mut self, pos: Vec2, level: u32) {
        self.player = Player { pos, level };
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
    }

    /// Redirect every chasing entity toward a decoy position
    pub fn set_taunt_target(&mut self, pos: Vec2) {
        self.taunt_target = Some(pos);
    }

    pub fn clear_taunt_target(&mut self) {
        self.taunt_target = None;
    }

    pub fn set_slow_zone(&mut self, center: Vec2, radius: f32, multiplier: f32) {
        self.slow_zone = Some(SlowZone {
            center,
            radius: radius.max(0.0),
            multiplier: multiplier.max(0.0),
        });
    }

    pub fn clear_slow_zone(&mut self) {
        self.slow_zone = None;
    }

    /// Speed multiplier from the slow zone at `pos`
    pub fn slow_multiplier_at(&self, pos: Vec2) -> f32 {
        self.slow_zone.map_or(1.0, |zone| zone.multiplier_at(pos))
    }

    /// Drop every entity and restart the clock, timers and id counter.
    /// Settings, kinds and difficulty are kept.
    pub fn reset(&mut self) {
        let dropped = self.entities.len();
        self.entities.clear();
        self.next_id = 1;
        self.rng = Pcg32::seed_from_u64(self.seed);
        self.now_ms = 0.0;
        self.player = Player::default();
        self.camera = Vec2::ZERO;
        self.taunt_target = None;
        self.slow_zone = None;
        self.next_wave_at_ms = 0.0;
        self.next_line_runners_at_ms = self.settings.line_runner_period_ms;
        self.elite_levels.clear();
        self.boss_levels.clear();
        log::info!("Simulation reset ({} entities dropped)", dropped);
    }
}
