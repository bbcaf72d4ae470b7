//! Adaptive difficulty controller
//!
//! Enemy speed, damage, spawn cadence and crowd size scale with in-game
//! minutes, kill count, player level and the player's shot rate.

use serde::{Deserialize, Serialize};

use super::combat::effective_shooting_interval;
use super::state::GameState;
use crate::consts::*;
use crate::tuning::Tuning;

/// What the formulas read
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyInputs {
    pub minutes: f64,
    pub kills: u32,
    pub level: u32,
    /// Shots per second at the current effective interval
    pub dps: f64,
}

impl DifficultyInputs {
    pub fn from_state(state: &GameState) -> Self {
        Self {
            minutes: state.minutes(),
            kills: state.scoring.kills,
            level: state.progression.level,
            dps: player_dps(state),
        }
    }

    #[inline]
    fn levels_gained(&self) -> f64 {
        f64::from(self.level.max(1) - 1)
    }

    /// How far above baseline the shot rate is (never negative)
    #[inline]
    fn dps_excess(&self) -> f64 {
        (self.dps / BASELINE_DPS - 1.0).max(0.0)
    }

    #[inline]
    fn kills_sqrt(&self) -> f64 {
        f64::from(self.kills).sqrt()
    }
}

/// Current difficulty outputs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Difficulty {
    pub enemy_speed: f32,
    pub enemy_damage: i32,
    pub spawn_interval_ms: f64,
    pub max_concurrent_enemies: u32,
    /// Last recompute (in-game ms)
    pub last_update_ms: f64,
}

impl Difficulty {
    /// Run-start values
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            enemy_speed: tuning.enemies.base_speed,
            enemy_damage: tuning.enemies.base_damage,
            spawn_interval_ms: tuning.enemies.base_spawn_interval_ms,
            max_concurrent_enemies: tuning.enemies.initial_max_concurrent,
            last_update_ms: 0.0,
        }
    }

    /// Recompute every output from the inputs
    pub fn recompute(&mut self, tuning: &Tuning, inputs: &DifficultyInputs, now_ms: f64) {
        self.enemy_speed = enemy_speed(tuning, inputs);
        self.enemy_damage = enemy_damage(tuning, inputs);
        self.spawn_interval_ms = spawn_interval_ms(tuning, inputs);
        self.max_concurrent_enemies = max_concurrent_enemies(inputs);
        self.last_update_ms = now_ms;
    }
}

/// Shots per second
pub fn player_dps(state: &GameState) -> f64 {
    1000.0 / effective_shooting_interval(state)
}

pub fn enemy_speed(tuning: &Tuning, inputs: &DifficultyInputs) -> f32 {
    let speed = f64::from(tuning.enemies.base_speed)
        + inputs.minutes * 0.55
        + inputs.levels_gained() * 0.28
        + inputs.dps_excess() * 0.9;
    (speed as f32).min(tuning.difficulty.max_enemy_speed)
}

pub fn enemy_damage(tuning: &Tuning, inputs: &DifficultyInputs) -> i32 {
    let scale = 1.0 + 0.10 * inputs.minutes + 0.03 * inputs.levels_gained();
    let damage = (f64::from(tuning.enemies.base_damage) * scale).round();
    (damage.min(f64::from(i32::MAX)) as i32).max(5)
}

pub fn spawn_interval_ms(tuning: &Tuning, inputs: &DifficultyInputs) -> f64 {
    let denom = 1.0
        + inputs.minutes * 0.35
        + inputs.kills_sqrt() * 0.12
        + inputs.levels_gained() * 0.25
        + inputs.dps_excess() * 0.4;
    let interval = (tuning.enemies.base_spawn_interval_ms / denom).round();
    interval.max(tuning.difficulty.min_spawn_interval_ms)
}

pub fn max_concurrent_enemies(inputs: &DifficultyInputs) -> u32 {
    let extra = (3.0 * inputs.minutes + 1.3 * inputs.kills_sqrt() + 0.8 * inputs.levels_gained())
        .floor();
    let max = 10.0 + extra;
    max.clamp(
        f64::from(MIN_CONCURRENT_ENEMIES),
        f64::from(MAX_CONCURRENT_ENEMIES),
    ) as u32
}

/// Enemies per spawn tick (before the capacity cap)
pub fn pack_size(inputs: &DifficultyInputs) -> u32 {
    let mut packs = 1.0 + (inputs.minutes * 0.6).floor() + (inputs.kills_sqrt() / 6.0).floor();
    if inputs.dps > 3.0 {
        packs += 1.0;
    }
    packs.clamp(1.0, f64::from(MAX_PACK_SIZE)) as u32
}

/// Time between boss spawns
pub fn boss_interval_ms(tuning: &Tuning, minutes: f64) -> f64 {
    let boss = &tuning.boss;
    (boss.base_interval_ms - minutes.max(0.0) * boss.interval_decrease_per_minute_ms)
        .max(boss.min_interval_ms)
}

/// Recompute difficulty if the update interval has elapsed
pub fn update_difficulty(state: &mut GameState) {
    let now = state.now_ms();
    if now - state.difficulty.last_update_ms < DIFFICULTY_UPDATE_INTERVAL_MS {
        return;
    }
    let inputs = DifficultyInputs::from_state(state);
    state.difficulty.recompute(&state.tuning, &inputs, now);
    log::debug!(
        "Difficulty: speed={:.2} damage={} spawn={}ms max={}",
        state.difficulty.enemy_speed,
        state.difficulty.enemy_damage,
        state.difficulty.spawn_interval_ms,
        state.difficulty.max_concurrent_enemies
    );
}
