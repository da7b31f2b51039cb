//! Horde Arena headless driver
//!
//! Runs a scripted session against the simulation core: the player walks a
//! loop around the map, skills fire on their cooldowns, and kill rewards
//! level the player up. Useful for balance passes and soak runs.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;

    use clap::Parser;
    use env_logger::{Builder, Env};
    use glam::Vec2;
    use log::LevelFilter;

    use horde_arena::consts::FRAME_MS;
    use horde_arena::sim::{
        CritModifiers, FrameInput, KindRegistry, SimState, Skill, SkillKind, cast, try_spawn_boss, try_spawn_elite,
        update,
    };
    use horde_arena::{ConfigError, DifficultyPreset, SimSettings};

    /// Headless arena simulation
    #[derive(Parser)]
    #[command(author, version, about, long_about = None)]
    pub struct Args {
        /// RNG seed
        #[arg(short, long, default_value_t = 1)]
        seed: u64,
        /// Frames to simulate at 60 per second
        #[arg(short, long, default_value_t = 3600)]
        frames: usize,
        /// casual, normal or brutal
        #[arg(short, long, default_value = "normal")]
        difficulty: String,
        /// Settings JSON (defaults to built-in tuning)
        #[arg(long)]
        settings: Option<PathBuf>,
        /// Entity kind JSON (defaults to the built-in table)
        #[arg(long)]
        kinds: Option<PathBuf>,
        /// Base critical hit chance
        #[arg(long, default_value_t = 0.05)]
        crit_chance: f64,
        /// Enable verbose logging
        #[arg(short, long)]
        pub verbose: bool,
    }

    /// Install the logger; RUST_LOG overrides the verbosity flag
    pub fn init_logging(verbose: bool) {
        let level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
        let env = Env::default().default_filter_or(level.to_string());
        let _ = Builder::from_env(env).try_init();
    }

    /// Player level earned by a reward total
    fn level_for_reward(total: u64) -> u32 {
        ((total as f64 / 5.0).sqrt()) as u32
    }

    pub fn run(args: Args) -> Result<(), ConfigError> {
        let settings = match &args.settings {
            Some(path) => SimSettings::load(path)?,
            None => SimSettings::default(),
        };
        let kinds = match &args.kinds {
            Some(path) => {
                let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.display().to_string(),
                    source,
                })?;
                KindRegistry::from_json(&json)?
            }
            None => KindRegistry::builtin()?,
        };
        let preset = DifficultyPreset::from_str(&args.difficulty).unwrap_or_else(|| {
            log::warn!("Unknown difficulty '{}', using normal", args.difficulty);
            DifficultyPreset::Normal
        });

        let mut state = SimState::new(settings, kinds, args.seed)?;
        state.set_difficulty(preset.difficulty());
        let mut modifiers = CritModifiers::new(args.seed ^ 0x5eed, 1.0, args.crit_chance, 2.0);

        let mut skills = [
            Skill::new(SkillKind::Nova, 1),
            Skill::new(SkillKind::Cleave, 1),
            Skill::new(SkillKind::Lance, 1),
        ];
        let mut ready_at = [0.0f64; 3];

        let view = state.viewport();
        let half_view = Vec2::new(view.width, view.height) * 0.5;
        let center = state.settings().map_bounds.center();
        let orbit = half_view.y;

        let mut level = 0u32;
        let mut total_reward = 0u64;
        let mut kills = 0usize;
        let mut elite_kills = 0usize;
        let mut boss_kills = 0usize;
        let mut damage_taken = 0.0f32;

        for frame in 0..args.frames {
            let t = frame as f32 * FRAME_MS as f32 / 1000.0;
            let player = center + Vec2::from_angle(t * 0.2) * orbit;
            let input = FrameInput {
                delta_ms: FRAME_MS,
                player,
                player_level: level,
                camera: player - half_view,
            };

            let report = update(&mut state, &input);
            damage_taken += report.contact_damage;
            let mut frame_kills = report.kills;

            let facing = state
                .entities()
                .iter()
                .min_by(|a, b| a.pos.distance_squared(player).total_cmp(&b.pos.distance_squared(player)))
                .map_or(0.0, |e| {
                    let d = e.pos - player;
                    d.y.atan2(d.x)
                });
            for (skill, ready) in skills.iter().zip(ready_at.iter_mut()) {
                if state.now_ms < *ready {
                    continue;
                }
                let outcome = cast(&mut state, &mut modifiers, skill, player, facing);
                *ready = state.now_ms + skill.cooldown_ms();
                frame_kills.extend(outcome.kills);
            }

            for kill in &frame_kills {
                total_reward += kill.reward as u64;
                elite_kills += kill.is_elite as usize;
                boss_kills += kill.is_boss as usize;
            }
            kills += frame_kills.len();

            let next_level = level_for_reward(total_reward);
            while level < next_level {
                level += 1;
                // Rotate skill upgrades
                let skill = &mut skills[level as usize % skills.len()];
                skill.level += 1;
                log::info!(
                    "Level {} at {:.1}s, {} now level {}",
                    level,
                    state.now_ms / 1000.0,
                    skill.kind.as_str(),
                    skill.level
                );
                state.player.level = level;
                try_spawn_elite(&mut state, level);
                try_spawn_boss(&mut state, level);
            }

            if frame % 600 == 0 {
                log::debug!(
                    "t={:.0}s live={} kills={} reward={}",
                    state.now_ms / 1000.0,
                    state.len(),
                    kills,
                    total_reward
                );
            }
        }

        log::info!(
            "Finished {} frames ({:.1}s): level {}, {} kills ({} elite, {} boss), reward {}, damage taken {:.0}, {} live",
            args.frames,
            state.now_ms / 1000.0,
            level,
            kills,
            elite_kills,
            boss_kills,
            total_reward,
            damage_taken,
            state.len()
        );
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use clap::Parser;

    let args = native::Args::parse();
    native::init_logging(args.verbose);
    log::info!("Horde Arena (headless) starting...");

    if let Err(e) = native::run(args) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is driven by the host page on wasm
}
