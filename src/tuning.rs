//! Data-driven game balance
//!
//! Every knob has a default matching the shipped balance. Partial JSON
//! documents override only the fields they name.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure loading a tuning document
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning value: {0}")]
    Invalid(&'static str),
}

/// Player movement and survivability
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    /// Movement speed at level 1 (units/s)
    pub base_speed: f32,
    pub max_health: i32,
    /// Collision radius
    pub radius: f32,
    /// Height the model floats above its ground position
    pub hover_offset: f32,
    /// Damage immunity after a hit (ms)
    pub invincibility_ms: f64,
    /// Exponential knockback decay rate (1/s)
    pub knockback_decay: f32,
    /// Knockback impulse for a 0-damage hit
    pub knockback_strength: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            base_speed: 18.0,
            max_health: 150,
            radius: 0.9,
            hover_offset: 0.6,
            invincibility_ms: 900.0,
            knockback_decay: 8.5,
            knockback_strength: 12.0,
        }
    }
}

/// Auto-fire
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShootingTuning {
    pub projectile_speed: f32,
    /// Targets beyond this are ignored
    pub range: f32,
    /// Shot cooldown at level 1 (ms)
    pub base_interval_ms: f64,
    /// Level-ups never push the cooldown below this (ms)
    pub min_interval_ms: f64,
    /// Bullet radius for enemy hit tests
    pub bullet_radius: f32,
    /// Rapid-fire boost duration (ms)
    pub boost_duration_ms: f64,
}

impl Default for ShootingTuning {
    fn default() -> Self {
        Self {
            projectile_speed: 19.0,
            range: 10.8,
            base_interval_ms: 450.0,
            min_interval_ms: 100.0,
            bullet_radius: 0.45,
            boost_duration_ms: 10_000.0,
        }
    }
}

/// Regular enemies and snipers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyTuning {
    pub base_speed: f32,
    pub base_damage: i32,
    /// Concurrency cap before the first difficulty recompute
    pub initial_max_concurrent: u32,
    pub base_spawn_interval_ms: f64,
    pub sniper_shoot_interval_ms: f64,
    pub sniper_projectile_speed: f32,
    /// Sniper shot damage as a fraction of the current enemy damage
    pub sniper_damage_factor: f32,
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            base_speed: 2.8,
            base_damage: 20,
            initial_max_concurrent: 18,
            base_spawn_interval_ms: 1300.0,
            sniper_shoot_interval_ms: 1400.0,
            sniper_projectile_speed: 16.0,
            sniper_damage_factor: 0.3,
        }
    }
}

/// Clamps on the difficulty controller
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyTuning {
    pub max_enemy_speed: f32,
    pub min_spawn_interval_ms: f64,
}

impl Default for DifficultyTuning {
    fn default() -> Self {
        Self {
            max_enemy_speed: 8.5,
            min_spawn_interval_ms: 260.0,
        }
    }
}

/// Boss cadence and stats
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BossTuning {
    pub base_interval_ms: f64,
    pub min_interval_ms: f64,
    pub interval_decrease_per_minute_ms: f64,
    pub base_health: f64,
    pub health_per_minute: f64,
    pub speed_factor: f32,
    /// Bosses never move slower than this
    pub min_speed: f32,
    pub damage_factor: f32,
}

impl Default for BossTuning {
    fn default() -> Self {
        Self {
            base_interval_ms: 60_000.0,
            min_interval_ms: 25_000.0,
            interval_decrease_per_minute_ms: 4000.0,
            base_health: 40.0,
            health_per_minute: 12.0,
            speed_factor: 0.72,
            min_speed: 1.8,
            damage_factor: 2.0,
        }
    }
}

/// Drops
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PickupTuning {
    pub health_chance: f64,
    /// Heal amount as a fraction of current enemy damage
    pub health_heal_factor: f32,
    pub coin_chance: f64,
    /// Added to the coin chance for boss kills
    pub boss_coin_bonus: f64,
}

impl Default for PickupTuning {
    fn default() -> Self {
        Self {
            health_chance: 0.18,
            health_heal_factor: 0.75,
            coin_chance: 0.35,
            boss_coin_bonus: 0.2,
        }
    }
}

/// Score and kill streaks
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringTuning {
    pub points_per_kill: u64,
    pub max_multiplier: f64,
    /// Streak resets after this long without a kill (ms)
    pub multiplier_decay_ms: f64,
}

impl Default for ScoringTuning {
    fn default() -> Self {
        Self {
            points_per_kill: 100,
            max_multiplier: 5.0,
            multiplier_decay_ms: 3000.0,
        }
    }
}

/// XP and level scaling
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionTuning {
    pub initial_xp_to_next: f32,
    pub xp_per_second: f32,
    pub xp_per_kill_normal: f32,
    pub xp_per_kill_boss: f32,
    /// Movement speed bonus per level above 1
    pub level_speed_bonus: f32,
    /// Shooting interval shrink per level above 1 (compounded)
    pub level_fire_rate_bonus: f64,
}

impl Default for ProgressionTuning {
    fn default() -> Self {
        Self {
            initial_xp_to_next: 100.0,
            xp_per_second: 1.0,
            xp_per_kill_normal: 15.0,
            xp_per_kill_boss: 80.0,
            level_speed_bonus: 0.07,
            level_fire_rate_bonus: 0.08,
        }
    }
}

/// Shop prices (coins)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopTuning {
    pub rapid_fire: u32,
    pub shockwave: u32,
    pub heal_100: u32,
    pub heal_50: u32,
}

impl Default for ShopTuning {
    fn default() -> Self {
        Self {
            rapid_fire: 10,
            shockwave: 20,
            heal_100: 12,
            heal_50: 6,
        }
    }
}

/// Complete balance sheet
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub player: PlayerTuning,
    pub shooting: ShootingTuning,
    pub enemies: EnemyTuning,
    pub difficulty: DifficultyTuning,
    pub boss: BossTuning,
    pub pickups: PickupTuning,
    pub scoring: ScoringTuning,
    pub progression: ProgressionTuning,
    pub shop: ShopTuning,
}

impl Tuning {
    /// Parse a (possibly partial) JSON document over the defaults
    pub fn from_json_str(json: &str) -> Result<Self, TuningError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let tuning = Self::from_json_str(&json)?;
        log::info!("Loaded tuning from {}", path.as_ref().display());
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        if self.player.max_health <= 0 {
            return Err(TuningError::Invalid("player.max_health must be positive"));
        }
        if self.player.radius <= 0.0 {
            return Err(TuningError::Invalid("player.radius must be positive"));
        }
        if self.shooting.base_interval_ms <= 0.0 {
            return Err(TuningError::Invalid("shooting.base_interval_ms must be positive"));
        }
        if self.difficulty.min_spawn_interval_ms <= 0.0 {
            return Err(TuningError::Invalid("difficulty.min_spawn_interval_ms must be positive"));
        }
        if self.boss.min_interval_ms <= 0.0 {
            return Err(TuningError::Invalid("boss.min_interval_ms must be positive"));
        }
        if self.progression.initial_xp_to_next < 1.0 {
            return Err(TuningError::Invalid("progression.initial_xp_to_next must be at least 1"));
        }
        Ok(())
    }
}
