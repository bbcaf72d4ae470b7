//! Per-frame simulation tick
//!
//! Advances the clock, runs the spawn and boss timers, then updates every
//! system in a fixed order so collisions see post-movement positions.

use glam::Vec2;

use super::hooks::{Hooks, flush_hud};
use super::state::{GamePhase, GameState, ItemKind};
use super::{combat, difficulty, enemies, items, pickups, player, progression};
use crate::consts::MAX_FRAME_DT;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Desired movement on the XZ plane (x, z); normalized internally
    pub move_dir: Vec2,
    /// Pause toggle
    pub pause: bool,
    /// Item to activate this tick
    pub use_item: Option<ItemKind>,
}

/// Regular spawn timer. Returns the number of enemies placed.
fn run_spawn_timer(state: &mut GameState) -> u32 {
    let now = state.now_ms();
    if now - state.last_spawn_ms < state.difficulty.spawn_interval_ms {
        return 0;
    }
    if state.alive_enemy_count() as u32 >= state.difficulty.max_concurrent_enemies {
        return 0;
    }
    let spawned = enemies::spawn_pack(state);
    state.last_spawn_ms = now;
    spawned
}

fn run_boss_timer(state: &mut GameState, hooks: &mut dyn Hooks) {
    let now = state.now_ms();
    let interval = difficulty::boss_interval_ms(&state.tuning, state.minutes());
    if now - state.last_boss_ms >= interval {
        enemies::spawn_boss(state, hooks);
        state.last_boss_ms = now;
    }
}

/// Advance the game by one frame of `dt` seconds
pub fn tick(state: &mut GameState, hooks: &mut dyn Hooks, input: &TickInput, dt: f32) {
    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.set_paused(true);
                return;
            }
            GamePhase::Paused => state.set_paused(false),
            GamePhase::GameOver => {}
        }
    }

    // Don't tick if paused or game over
    if matches!(state.phase, GamePhase::Paused | GamePhase::GameOver) {
        return;
    }

    let raw_dt = dt.max(0.0);
    state.clock.advance(raw_dt);
    let dt = raw_dt.min(MAX_FRAME_DT);

    if let Some(item) = input.use_item {
        items::activate_item(state, hooks, item);
    }

    run_spawn_timer(state);
    run_boss_timer(state, hooks);

    if !state.player.is_alive() {
        return;
    }

    player::update_player(state, input.move_dir, dt);
    enemies::update_enemies(state, hooks, dt);
    combat::update_shooting(state);
    combat::update_projectiles(state, dt);
    combat::update_enemy_projectiles(state, hooks, dt);
    if state.is_over() {
        return;
    }
    combat::check_projectile_collisions(state, hooks);
    hooks.update_explosions(dt);
    player::check_contact_damage(state, hooks);
    if state.is_over() {
        return;
    }
    progression::update_multiplier(state);
    pickups::update_pickups(state, hooks, dt);
    progression::update_xp(state, hooks, dt);
    items::update_shockwaves(state, hooks);
    difficulty::update_difficulty(state);
    flush_hud(state, hooks);
}
