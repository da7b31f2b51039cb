//! Simulation settings and difficulty presets
//!
//! Loaded once at startup (JSON) and validated before the simulation is
//! built. Nothing in here changes while a run is in progress except the
//! `Difficulty` multipliers, which callers may adjust at any time.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Rect;
use crate::consts::UNIT_FRACTION_OF_HEIGHT;
use crate::error::ConfigError;

/// Difficulty preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DifficultyPreset {
    Casual,
    #[default]
    Normal,
    Brutal,
}

impl DifficultyPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyPreset::Casual => "Casual",
            DifficultyPreset::Normal => "Normal",
            DifficultyPreset::Brutal => "Brutal",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "casual" | "easy" => Some(DifficultyPreset::Casual),
            "normal" => Some(DifficultyPreset::Normal),
            "brutal" | "hard" => Some(DifficultyPreset::Brutal),
            _ => None,
        }
    }

    /// Multipliers for this preset
    pub fn difficulty(&self) -> Difficulty {
        match self {
            DifficultyPreset::Casual => Difficulty {
                spawn_count: 0.75,
                speed: 0.9,
                hp: 0.8,
                damage: 0.7,
            },
            DifficultyPreset::Normal => Difficulty::default(),
            DifficultyPreset::Brutal => Difficulty {
                spawn_count: 1.5,
                speed: 1.15,
                hp: 1.4,
                damage: 1.5,
            },
        }
    }
}

/// External difficulty knobs, settable at any time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Difficulty {
    /// Scales the per-wave spawn count
    pub spawn_count: f32,
    /// Scales every entity's movement speed
    pub speed: f32,
    /// Scales entity HP at spawn
    pub hp: f32,
    /// Scales contact damage at spawn
    pub damage: f32,
}

impl Default for Difficulty {
    fn default() -> Self {
        Self {
            spawn_count: 1.0,
            speed: 1.0,
            hp: 1.0,
            damage: 1.0,
        }
    }
}

/// One time phase of the spawn cadence
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnPhase {
    /// Phase applies while elapsed time is below this (None = open-ended)
    pub until_ms: Option<f64>,
    /// Spawn rate multiplier during this phase
    pub multiplier: f32,
}

/// Static simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimSettings {
    // === Geometry ===
    /// Camera viewport size in world pixels
    pub viewport_width: f32,
    pub viewport_height: f32,
    /// Playable map bounds
    pub map_bounds: Rect,

    // === Wave cadence ===
    /// Hard cap on simultaneous entities
    pub max_entities: usize,
    /// Interval multiplied by the density factor
    pub base_spawn_interval_ms: f64,
    /// The interval never drops below this
    pub min_spawn_interval_ms: f64,
    /// Density constant divided by the live count
    pub target_density: f32,
    /// Entities per wave before phase/difficulty scaling
    pub base_wave_count: f32,
    /// Time phases, ordered by `until_ms`
    pub phases: Vec<SpawnPhase>,

    // === Line-runner swarms ===
    pub line_runner_period_ms: f64,
    pub line_runner_batch: usize,
    /// Radius of the disc members are scattered in (abstract units)
    pub line_runner_disc_units: f32,
    pub line_runner_min_spacing_units: f32,
    pub line_runner_max_attempts: u32,
    /// How far past the opposite corner members aim
    pub line_runner_overshoot_units: f32,
    /// Buffer around the viewport before a line-runner is removed
    pub line_runner_despawn_units: f32,

    // === Elites and bosses ===
    pub elite_tier_levels: u32,
    pub elite_reward_multiplier: f32,
    pub boss_tier_levels: u32,
    pub boss_hp_multiplier: f32,
    pub boss_reward_multiplier: f32,

    // === Kind references ===
    pub wave_kinds: Vec<String>,
    pub line_runner_kind: Option<String>,
    pub elite_kind: Option<String>,
    pub boss_kind: Option<String>,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            viewport_width: 1280.0,
            viewport_height: 720.0,
            map_bounds: Rect::new(-2000.0, -2000.0, 5280.0, 4720.0),

            max_entities: 300,
            base_spawn_interval_ms: 60.0,
            min_spawn_interval_ms: 250.0,
            target_density: 40.0,
            base_wave_count: 2.0,
            phases: vec![
                SpawnPhase {
                    until_ms: Some(60_000.0),
                    multiplier: 1.0,
                },
                SpawnPhase {
                    until_ms: Some(180_000.0),
                    multiplier: 1.5,
                },
                SpawnPhase {
                    until_ms: None,
                    multiplier: 2.0,
                },
            ],

            line_runner_period_ms: 15_000.0,
            line_runner_batch: 8,
            line_runner_disc_units: 1.2,
            line_runner_min_spacing_units: 0.35,
            line_runner_max_attempts: 12,
            line_runner_overshoot_units: 2.0,
            line_runner_despawn_units: 2.5,

            elite_tier_levels: 5,
            elite_reward_multiplier: 5.0,
            boss_tier_levels: 25,
            boss_hp_multiplier: 40.0,
            boss_reward_multiplier: 25.0,

            wave_kinds: vec!["grunt".into(), "skitter".into(), "brute".into()],
            line_runner_kind: Some("dart".into()),
            elite_kind: Some("champion".into()),
            boss_kind: Some("overlord".into()),
        }
    }
}

impl SimSettings {
    /// Parse and validate settings from JSON (missing fields take defaults)
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// World pixels per abstract unit
    #[inline]
    pub fn unit(&self) -> f32 {
        self.viewport_height * UNIT_FRACTION_OF_HEIGHT
    }

    /// Viewport rectangle for a camera at `camera` (top-left corner)
    pub fn viewport_at(&self, camera: glam::Vec2) -> Rect {
        Rect::new(camera.x, camera.y, self.viewport_width, self.viewport_height)
    }

    /// Spawn rate multiplier for the phase containing `elapsed_ms`
    pub fn phase_multiplier(&self, elapsed_ms: f64) -> f32 {
        self.phases
            .iter()
            .find(|p| p.until_ms.is_none_or(|until| elapsed_ms < until))
            .or(self.phases.last())
            .map(|p| p.multiplier)
            .unwrap_or(1.0)
    }

    /// Check numeric invariants (kind references are checked by `SimState::new`)
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.viewport_width > 0.0 && self.viewport_height > 0.0) {
            return Err(ConfigError::invalid("viewport", "dimensions must be positive"));
        }
        if !(self.map_bounds.width > 0.0 && self.map_bounds.height > 0.0) {
            return Err(ConfigError::invalid("map_bounds", "dimensions must be positive"));
        }
        if self.max_entities == 0 {
            return Err(ConfigError::invalid("max_entities", "must be at least 1"));
        }
        if !(self.base_spawn_interval_ms > 0.0) {
            return Err(ConfigError::invalid("base_spawn_interval_ms", "must be positive"));
        }
        if !(self.min_spawn_interval_ms > 0.0) {
            return Err(ConfigError::invalid("min_spawn_interval_ms", "must be positive"));
        }
        if !(self.target_density > 0.0) {
            return Err(ConfigError::invalid("target_density", "must be positive"));
        }
        if !(self.base_wave_count > 0.0) {
            return Err(ConfigError::invalid("base_wave_count", "must be positive"));
        }
        self.validate_phases()?;
        if !(self.line_runner_period_ms > 0.0) {
            return Err(ConfigError::invalid("line_runner_period_ms", "must be positive"));
        }
        if self.line_runner_max_attempts == 0 {
            return Err(ConfigError::invalid("line_runner_max_attempts", "must be at least 1"));
        }
        if self.elite_tier_levels == 0 {
            return Err(ConfigError::invalid("elite_tier_levels", "must be at least 1"));
        }
        if self.boss_tier_levels == 0 {
            return Err(ConfigError::invalid("boss_tier_levels", "must be at least 1"));
        }
        if self.wave_kinds.is_empty() {
            return Err(ConfigError::invalid("wave_kinds", "at least one kind is required"));
        }
        Ok(())
    }

    fn validate_phases(&self) -> Result<(), ConfigError> {
        if self.phases.is_empty() {
            return Err(ConfigError::invalid("phases", "at least one phase is required"));
        }
        let mut previous = 0.0;
        for (i, phase) in self.phases.iter().enumerate() {
            if !(phase.multiplier > 0.0) {
                return Err(ConfigError::invalid("phases", format!("phase {i} multiplier must be positive")));
            }
            match phase.until_ms {
                Some(until) if until <= previous => {
                    return Err(ConfigError::invalid("phases", format!("phase {i} boundary is not increasing")));
                }
                Some(until) => previous = until,
                None if i + 1 != self.phases.len() => {
                    return Err(ConfigError::invalid("phases", "only the last phase may be open-ended"));
                }
                None => {}
            }
        }
        Ok(())
    }
}
