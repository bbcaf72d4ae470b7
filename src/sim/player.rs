//! Player movement, damage and game over

use glam::{Vec2, Vec3};
use rand::Rng;

use super::collision::collides_with_enemies;
use super::hooks::{Hooks, flush_hud};
use super::state::{GamePhase, GameState};
use crate::consts::CONTACT_EPSILON;
use crate::highscores::ScoreRecord;
use crate::{flatten, heading_of, xz_distance_squared};

/// Whether the player circle can stand at `pos`
fn player_fits(state: &GameState, pos: Vec3) -> bool {
    let radius = state.player.radius;
    state.world.is_free(pos, radius) && !collides_with_enemies(&state.enemies, pos, radius)
}

/// Move by `delta`, sliding along whichever axis stays clear
pub fn try_move_player(state: &mut GameState, delta: Vec3) -> bool {
    let base = state.player.position;
    let candidates = [
        base + Vec3::new(delta.x, 0.0, delta.z),
        base + Vec3::new(delta.x, 0.0, 0.0),
        base + Vec3::new(0.0, 0.0, delta.z),
    ];
    match candidates.into_iter().find(|&pos| player_fits(state, pos)) {
        Some(pos) => {
            state.player.position = pos;
            true
        }
        None => false,
    }
}

/// Apply knockback, then input movement along `move_dir` (world XZ)
pub fn update_player(state: &mut GameState, move_dir: Vec2, dt: f32) {
    let knockback = state.player.knockback;
    if knockback.length_squared() > 1e-6 {
        try_move_player(state, knockback * dt);
        let decay = (-state.tuning.player.knockback_decay * dt).exp();
        state.player.knockback *= decay;
    }

    let Some(dir) = move_dir.try_normalize() else {
        return;
    };
    let step = Vec3::new(dir.x, 0.0, dir.y) * state.player.speed * dt;
    try_move_player(state, step);
    state.player.heading = heading_of(step);
}

/// Push the player away from `from`
pub fn apply_knockback(state: &mut GameState, from: Vec3, strength: f32) {
    let mut dir = flatten(state.player.position - from);
    if dir.length_squared() < 1e-6 {
        dir = Vec3::new(
            state.rng.random::<f32>() - 0.5,
            0.0,
            state.rng.random::<f32>() - 0.5,
        );
    }
    state.player.knockback += dir.normalize_or_zero() * strength;
}

/// Whether damage would land now
pub fn is_vulnerable(state: &GameState) -> bool {
    state
        .clock
        .since(state.player.last_damage_ms)
        .is_none_or(|elapsed| elapsed >= state.tuning.player.invincibility_ms)
}

/// Damage the player unless the invincibility window is open.
/// Returns true when the damage landed.
pub fn take_damage(state: &mut GameState, hooks: &mut dyn Hooks, amount: i32, source: Vec3) -> bool {
    if !state.player.is_alive() || state.is_over() || !is_vulnerable(state) {
        return false;
    }

    state.player.health -= amount;
    state.player.last_damage_ms = Some(state.now_ms());
    let strength = state.tuning.player.knockback_strength * (1.0 + amount as f32 / 30.0);
    apply_knockback(state, source, strength);
    state.hud.force();
    log::debug!("Player took {} damage ({} left)", amount, state.player.health);

    if state.player.health <= 0 {
        state.player.health = 0;
        game_over(state, hooks);
    }
    true
}

/// First enemy touching the player deals its damage
pub fn check_contact_damage(state: &mut GameState, hooks: &mut dyn Hooks) {
    if !is_vulnerable(state) {
        return;
    }
    let player_pos = state.player.position;
    let player_radius = state.player.radius;
    let touching = state.enemies.iter().find(|e| {
        let reach = player_radius + e.radius + CONTACT_EPSILON;
        e.alive && xz_distance_squared(player_pos, e.position) <= reach * reach
    });
    if let Some((damage, source)) = touching.map(|e| (e.damage, e.position)) {
        take_damage(state, hooks, damage, source);
    }
}

/// End the run and hand the score to the collaborator once
pub fn game_over(state: &mut GameState, hooks: &mut dyn Hooks) {
    if state.is_over() {
        return;
    }
    state.phase = GamePhase::GameOver;
    state.clock.pause();
    state.hud.force();

    if !state.score_submitted {
        let record = ScoreRecord::from_state(state);
        hooks.submit_score(&record);
        state.score_submitted = true;
    }
    log::info!(
        "Game over: score={} kills={} level={} time={:.1} min",
        state.scoring.score,
        state.scoring.kills,
        state.progression.level,
        state.minutes()
    );
    flush_hud(state, hooks);
}
