//! Entity kind templates
//!
//! Kinds are flat data records tagged with a `Behavior`; systems branch on
//! the tag instead of dispatching through per-kind types.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Builtin kind table
const BUILTIN_KINDS: &str = include_str!("../../data/kinds.json");

/// Movement/lifecycle behavior of a kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Behavior {
    /// Chases the player (or the taunt target)
    #[default]
    Normal,
    /// Crosses the screen on a fixed heading and despawns on exit
    LineRunner,
    /// Level-gated persistent threat
    Elite,
    /// Rare persistent threat
    Boss,
}

impl Behavior {
    pub fn as_str(&self) -> &'static str {
        match self {
            Behavior::Normal => "normal",
            Behavior::LineRunner => "line_runner",
            Behavior::Elite => "elite",
            Behavior::Boss => "boss",
        }
    }
}

/// Immutable entity template
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityKind {
    pub id: String,
    pub name: String,
    /// Abstract units per second
    pub speed: f32,
    /// Contact damage multiplier applied to the damage curve
    pub damage_factor: f32,
    pub base_hp: f32,
    pub base_reward: u32,
    /// Relative collider size (1.0 = standard)
    pub size: f32,
    #[serde(default)]
    pub behavior: Behavior,
    /// Relative pick weight for normal waves
    #[serde(default = "default_spawn_weight")]
    pub spawn_weight: f32,
    /// Player level at which the kind joins normal waves
    #[serde(default)]
    pub min_level: u32,
}

fn default_spawn_weight() -> f32 {
    1.0
}

impl EntityKind {
    /// Collider radius in world pixels for a given abstract unit size
    #[inline]
    pub fn radius(&self, unit: f32) -> f32 {
        self.size * crate::consts::ENTITY_RADIUS_UNITS * unit
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.id.is_empty() {
            return Err(ConfigError::invalid("kind.id", "must not be empty"));
        }
        if !(self.speed >= 0.0) {
            return Err(ConfigError::invalid("kind.speed", format!("`{}` has a negative speed", self.id)));
        }
        if !(self.base_hp > 0.0) {
            return Err(ConfigError::invalid("kind.base_hp", format!("`{}` must have positive HP", self.id)));
        }
        if !(self.size > 0.0) {
            return Err(ConfigError::invalid("kind.size", format!("`{}` must have positive size", self.id)));
        }
        if !(self.spawn_weight >= 0.0) {
            return Err(ConfigError::invalid(
                "kind.spawn_weight",
                format!("`{}` has a negative weight", self.id),
            ));
        }
        Ok(())
    }
}

/// Static table of kinds, loaded once
#[derive(Debug, Clone, Default)]
pub struct KindRegistry {
    kinds: Vec<Arc<EntityKind>>,
}

impl KindRegistry {
    /// Build from already-parsed kinds, rejecting duplicates and bad values
    pub fn new(kinds: Vec<EntityKind>) -> Result<Self, ConfigError> {
        let mut registry = Self::default();
        for kind in kinds {
            kind.validate()?;
            if registry.get(&kind.id).is_some() {
                return Err(ConfigError::DuplicateKind(kind.id));
            }
            registry.kinds.push(Arc::new(kind));
        }
        Ok(registry)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let kinds: Vec<EntityKind> = serde_json::from_str(json)?;
        Self::new(kinds)
    }

    /// The kind table shipped with the crate
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_json(BUILTIN_KINDS)
    }

    pub fn get(&self, id: &str) -> Option<&Arc<EntityKind>> {
        self.kinds.iter().find(|k| k.id == id)
    }

    /// Look up a kind referenced by configuration, failing on unknown ids or
    /// a behavior that does not fit the role
    pub fn require(
        &self,
        id: &str,
        role: &'static str,
        expected: Behavior,
    ) -> Result<Arc<EntityKind>, ConfigError> {
        let kind = self
            .get(id)
            .ok_or_else(|| ConfigError::UnknownKind(id.to_string()))?;
        if kind.behavior != expected {
            return Err(ConfigError::WrongBehavior {
                kind: id.to_string(),
                role,
                actual: kind.behavior.as_str(),
            });
        }
        Ok(Arc::clone(kind))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<EntityKind>> {
        self.kinds.iter()
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}
