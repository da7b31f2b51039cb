//! Growth & balance curves
//!
//! Pure functions of (base value, player level, external multiplier). The
//! spawner uses them when entities are created; combat uses `reward` when
//! entities die.

use super::kind::{Behavior, EntityKind};
use crate::consts::DAMAGE_UNIT;

/// Per-level HP growth factor
pub const HP_GROWTH_RATE: f32 = 1.07;
/// Level at which the stepped tier multiplier starts
pub const TIER_THRESHOLD_LEVEL: u32 = 30;
/// Levels per tier above the threshold
pub const TIER_SIZE_LEVELS: u32 = 10;
/// Multiplier gained per tier
pub const TIER_STEP: f32 = 0.25;
/// Rewards double every this many levels
pub const REWARD_TIER_LEVELS: u32 = 10;

/// Line-runners ignore the curves
pub const LINE_RUNNER_HP: f32 = 1.0;
pub const LINE_RUNNER_REWARD: u32 = 1;

/// Stepped strength boost: 1 below the threshold, then `TIER_STEP` more for
/// each tier entered (reaching the threshold enters the first tier)
pub fn tier_multiplier(level: u32) -> f32 {
    if level < TIER_THRESHOLD_LEVEL {
        return 1.0;
    }
    let tiers = 1 + (level - TIER_THRESHOLD_LEVEL) / TIER_SIZE_LEVELS;
    1.0 + TIER_STEP * tiers as f32
}

/// HP at `level`, never below 1 so a fresh entity is always alive
pub fn hp(base_hp: f32, level: u32, external: f32) -> f32 {
    let growth = HP_GROWTH_RATE.powi(level.min(i32::MAX as u32) as i32);
    (base_hp * growth * tier_multiplier(level) * external)
        .floor()
        .clamp(1.0, f32::MAX)
}

/// Contact damage per hit at `level`
pub fn damage(level: u32, damage_factor: f32, external: f32) -> f32 {
    DAMAGE_UNIT * level.max(1) as f32 * damage_factor * tier_multiplier(level) * external
}

/// Reward doubling every `REWARD_TIER_LEVELS` levels
pub fn reward(base_reward: u32, level: u32) -> u32 {
    base_reward.saturating_mul(2u32.saturating_pow(level / REWARD_TIER_LEVELS))
}

/// Spawn HP for a kind, honoring the flat line-runner override
pub fn kind_hp(kind: &EntityKind, level: u32, external: f32) -> f32 {
    match kind.behavior {
        Behavior::LineRunner => (LINE_RUNNER_HP * external).max(1.0),
        _ => hp(kind.base_hp, level, external),
    }
}

/// Kill reward for a kind before elite/boss multipliers
pub fn kind_reward(kind: &EntityKind, level: u32) -> u32 {
    match kind.behavior {
        Behavior::LineRunner => LINE_RUNNER_REWARD,
        _ => reward(kind.base_reward, level),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::kind::KindRegistry;

    #[test]
    fn test_hp_at_level_zero_is_base() {
        assert_eq!(hp(20.0, 0, 1.0), 20.0);
        assert_eq!(hp(20.5, 0, 1.0), 20.0);
    }

    #[test]
    fn test_hp_grows_exponentially() {
        let h10 = hp(100.0, 10, 1.0);
        let expected = (100.0 * 1.07f32.powi(10)).floor();
        assert_eq!(h10, expected);
        assert!(hp(100.0, 20, 1.0) > h10 * 1.9);
    }

    #[test]
    fn test_hp_never_below_one() {
        assert_eq!(hp(1.0, 0, 0.01), 1.0);
    }

    #[test]
    fn test_tier_multiplier_steps() {
        assert_eq!(tier_multiplier(0), 1.0);
        assert_eq!(tier_multiplier(29), 1.0);
        assert_eq!(tier_multiplier(30), 1.25);
        assert_eq!(tier_multiplier(39), 1.25);
        assert_eq!(tier_multiplier(40), 1.5);
    }

    #[test]
    fn test_damage_uses_level_floor_of_one() {
        assert_eq!(damage(0, 1.0, 1.0), DAMAGE_UNIT);
        assert_eq!(damage(1, 1.0, 1.0), DAMAGE_UNIT);
        assert_eq!(damage(4, 0.5, 2.0), DAMAGE_UNIT * 4.0);
        assert_eq!(damage(30, 1.0, 1.0), DAMAGE_UNIT * 30.0 * 1.25);
    }

    #[test]
    fn test_reward_doubles_per_tier() {
        assert_eq!(reward(3, 0), 3);
        assert_eq!(reward(3, 9), 3);
        assert_eq!(reward(3, 10), 6);
        assert_eq!(reward(3, 25), 12);
        assert_eq!(reward(3, 10_000), u32::MAX);
    }

    #[test]
    fn test_line_runner_ignores_curves() {
        let registry = KindRegistry::builtin().unwrap();
        let dart = registry.get("dart").unwrap();
        assert_eq!(kind_hp(dart, 50, 1.0), LINE_RUNNER_HP);
        assert_eq!(kind_hp(dart, 50, 3.0), 3.0);
        assert_eq!(kind_reward(dart, 50), LINE_RUNNER_REWARD);

        let grunt = registry.get("grunt").unwrap();
        assert!(kind_hp(grunt, 50, 1.0) > grunt.base_hp);
    }
}
