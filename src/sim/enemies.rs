//! Enemy spawning, steering and removal
//!
//! Enemies chase the player with simple avoidance: go straight when possible,
//! otherwise try a few rotated headings, then axis-only steps, then hold.
//! A separation pass keeps the crowd from stacking.

use std::f32::consts::{FRAC_PI_3, FRAC_PI_6};

use glam::{Quat, Vec3};
use rand::Rng;

use super::collision::{CollisionWorld, FieldBounds};
use super::combat;
use super::difficulty::{DifficultyInputs, pack_size};
use super::hooks::{Announcement, Hooks, Renderable};
use super::progression;
use super::state::{Enemy, EnemyId, EnemyKind, GameState};
use crate::consts::*;
use crate::{flatten, heading_of, xz_distance, xz_distance_squared};

/// Rotations tried when the direct path is blocked, in preference order
const FALLBACK_ANGLES: [f32; 4] = [FRAC_PI_6, -FRAC_PI_6, FRAC_PI_3, -FRAC_PI_3];

/// Whether a circle clears every alive enemy (with a small gap), skipping `skip`
pub fn is_position_free_of_enemies(
    enemies: &[Enemy],
    position: Vec3,
    radius: f32,
    skip: Option<usize>,
) -> bool {
    enemies.iter().enumerate().all(|(i, other)| {
        if Some(i) == skip || !other.alive {
            return true;
        }
        let min_dist = radius + other.radius + ENEMY_SEPARATION_MARGIN;
        xz_distance_squared(position, other.position) >= min_dist * min_dist
    })
}

/// Rejection-sample a spawn point for `kind`
///
/// Returns `None` when every attempt lands on the player, an obstacle or
/// (for regular kinds) another enemy.
fn find_spawn_point(state: &mut GameState, kind: EnemyKind) -> Option<Vec3> {
    let bounds: FieldBounds = *state.world.bounds()?;
    let radius = kind.radius();
    let padding = radius + kind.spawn_padding();
    let (min_x, max_x) = (bounds.min_x + padding, bounds.max_x - padding);
    let (min_z, max_z) = (bounds.min_z + padding, bounds.max_z - padding);

    for _ in 0..SPAWN_ATTEMPTS {
        let x = min_x + (max_x - min_x) * state.rng.random::<f32>();
        let z = min_z + (max_z - min_z) * state.rng.random::<f32>();
        let pos = Vec3::new(x, ENEMY_Y, z);

        let far = xz_distance(state.player.position, pos) >= kind.min_player_distance();
        let clear = !state.world.check_obstacle_collision(pos, radius);
        let uncrowded = !kind.avoids_enemies_on_spawn()
            || is_position_free_of_enemies(&state.enemies, pos, radius, None);
        if far && clear && uncrowded {
            return Some(pos);
        }
    }
    None
}

/// Spawn a normal enemy or sniper. Placement failure skips the spawn.
pub fn spawn_enemy_of_type(state: &mut GameState, kind: EnemyKind) -> Option<EnemyId> {
    debug_assert!(!kind.is_boss(), "bosses spawn through spawn_boss");
    let Some(pos) = find_spawn_point(state, kind) else {
        log::debug!("No room to spawn {:?} after {} attempts", kind, SPAWN_ATTEMPTS);
        return None;
    };

    let id = EnemyId(state.next_entity_id());
    let speed = state.difficulty.enemy_speed * kind.speed_factor();
    let damage = state.difficulty.enemy_damage;
    state
        .enemies
        .push(Enemy::new(id, kind, pos, kind.base_health(), speed, damage));
    Some(id)
}

/// Spawn one regular enemy if under the concurrency cap
pub fn spawn_enemy(state: &mut GameState) -> Option<EnemyId> {
    if state.alive_enemy_count() >= state.difficulty.max_concurrent_enemies as usize {
        return None;
    }
    let sniper = state.sniper_count() < MAX_SNIPERS && state.rng.random::<f64>() < SNIPER_CHANCE;
    let kind = if sniper {
        EnemyKind::Sniper
    } else {
        EnemyKind::Normal
    };
    spawn_enemy_of_type(state, kind)
}

/// Spawn a pack sized by difficulty, capped by remaining capacity
pub fn spawn_pack(state: &mut GameState) -> u32 {
    let alive = state.alive_enemy_count() as u32;
    let capacity = state.difficulty.max_concurrent_enemies.saturating_sub(alive);
    let count = capacity.min(pack_size(&DifficultyInputs::from_state(state)));
    (0..count).filter(|_| spawn_enemy(state).is_some()).count() as u32
}

/// Spawn a boss scaled to run time
pub fn spawn_boss(state: &mut GameState, hooks: &mut dyn Hooks) -> Option<EnemyId> {
    let Some(pos) = find_spawn_point(state, EnemyKind::Boss) else {
        log::debug!("No room to spawn boss after {} attempts", SPAWN_ATTEMPTS);
        return None;
    };

    let boss = &state.tuning.boss;
    let minutes = state.minutes();
    let health = (boss.base_health + minutes * boss.health_per_minute).round() as i32;
    let speed = (state.difficulty.enemy_speed * boss.speed_factor).max(boss.min_speed);
    let damage = (state.difficulty.enemy_damage as f32 * boss.damage_factor).round() as i32;

    let id = EnemyId(state.next_entity_id());
    state
        .enemies
        .push(Enemy::new(id, EnemyKind::Boss, pos, health, speed, damage));
    log::info!(
        "Boss spawned: hp={} speed={:.2} damage={} at {:.1} min",
        health,
        speed,
        damage,
        minutes
    );
    hooks.announce(Announcement::BossSpawned { id });
    Some(id)
}

/// Resolve one enemy's next position toward the player
fn steer(world: &CollisionWorld, enemy: &Enemy, direction: Vec3, target: Vec3, dt: f32) -> Vec3 {
    let step = enemy.speed * dt;
    let origin = enemy.position;
    let valid = |pos: Vec3| world.is_free(pos, enemy.radius);

    let direct = origin + direction * step;
    if valid(direct) {
        return direct;
    }

    let closest = |candidates: &mut dyn Iterator<Item = Vec3>| {
        let mut best: Option<(Vec3, f32)> = None;
        for pos in candidates {
            if !valid(pos) {
                continue;
            }
            let d = xz_distance(pos, target);
            if best.is_none_or(|(_, best_d)| d < best_d) {
                best = Some((pos, d));
            }
        }
        best.map(|(pos, _)| pos)
    };

    let mut rotated = FALLBACK_ANGLES
        .iter()
        .map(|&a| origin + (Quat::from_rotation_y(a) * direction) * step);
    if let Some(pos) = closest(&mut rotated) {
        return pos;
    }

    let mut axis = [
        origin + Vec3::new(direction.x, 0.0, 0.0) * step,
        origin + Vec3::new(0.0, 0.0, direction.z) * step,
    ]
    .into_iter();
    closest(&mut axis).unwrap_or(origin)
}

/// Push `desired` out of overlapping neighbors; keep `fallback` if that leaves the field
pub fn apply_enemy_separation(
    world: &CollisionWorld,
    enemies: &[Enemy],
    index: usize,
    desired: Vec3,
    radius: f32,
    fallback: Vec3,
) -> Vec3 {
    let mut pos = desired;
    for (j, other) in enemies.iter().enumerate() {
        if j == index || !other.alive {
            continue;
        }
        let dx = pos.x - other.position.x;
        let dz = pos.z - other.position.z;
        let dist = (dx * dx + dz * dz).sqrt();
        let min_dist = radius + other.radius + ENEMY_SEPARATION_MARGIN;
        if dist > 0.0 && dist < min_dist {
            let push = (min_dist - dist) * 0.5;
            pos.x += dx / dist * push;
            pos.z += dz / dist * push;
        }
    }
    if world.is_free(pos, radius) {
        pos
    } else {
        fallback
    }
}

/// Snap an enemy that penetrated the player back to the contact circle
pub fn separate_enemy_from_player(state: &mut GameState, index: usize) {
    let player_pos = state.player.position;
    let min_dist = state.player.radius + state.enemies[index].radius;
    let enemy = &state.enemies[index];

    let to_enemy = flatten(enemy.position - player_pos);
    let dist = to_enemy.length().max(1e-6);
    if dist >= min_dist {
        return;
    }
    let normal = to_enemy / dist;
    let target = Vec3::new(
        player_pos.x + normal.x * (min_dist + 0.001),
        ENEMY_Y,
        player_pos.z + normal.z * (min_dist + 0.001),
    );
    if state.world.is_free(target, enemy.radius) {
        state.enemies[index].position = target;
    }
}

/// Sniper fire on cooldown when the player is in sight
fn try_sniper_shot(state: &mut GameState, index: usize) {
    let enemy = &state.enemies[index];
    if !enemy.kind.fires_projectiles() {
        return;
    }
    let ready = state
        .clock
        .since(enemy.last_shot_ms)
        .is_none_or(|elapsed| elapsed >= state.tuning.enemies.sniper_shoot_interval_ms);
    if !ready || !state.world.has_line_of_sight(enemy.position, state.player.position) {
        return;
    }

    let origin = enemy.position;
    let target = state.player.position;
    let damage = ((state.difficulty.enemy_damage as f32 * state.tuning.enemies.sniper_damage_factor)
        .round() as i32)
        .max(1);
    combat::create_enemy_projectile(state, origin, target, damage);
    state.enemies[index].last_shot_ms = Some(state.now_ms());
}

/// Advance every enemy one step
pub fn update_enemies(state: &mut GameState, hooks: &mut dyn Hooks, dt: f32) {
    let mut i = state.enemies.len();
    while i > 0 {
        i -= 1;
        if !state.enemies[i].alive {
            remove_enemy_at(state, hooks, i);
            continue;
        }

        let player_pos = state.player.position;
        let enemy = &state.enemies[i];
        let Some(direction) = flatten(player_pos - enemy.position).try_normalize() else {
            continue;
        };

        let stepped = steer(&state.world, enemy, direction, player_pos, dt);
        let separated = apply_enemy_separation(
            &state.world,
            &state.enemies,
            i,
            stepped,
            enemy.radius,
            enemy.position,
        );

        let enemy = &mut state.enemies[i];
        enemy.position = separated;
        enemy.heading = heading_of(direction);

        separate_enemy_from_player(state, i);
        try_sniper_shot(state, i);
        state.enemies[i].sync_health_bar();
    }
}

/// Remove the enemy at `index` and retire its renderables
pub fn remove_enemy_at(state: &mut GameState, hooks: &mut dyn Hooks, index: usize) -> bool {
    if index >= state.enemies.len() {
        return false;
    }
    let mut enemy = state.enemies.remove(index);
    enemy.alive = false;
    hooks.dispose_renderable(Renderable::Enemy(enemy.id));
    if enemy.health_bar.take().is_some() {
        hooks.dispose_renderable(Renderable::HealthBar(enemy.id));
    }
    true
}

/// Remove an enemy by ID. A second call for the same enemy is a no-op.
pub fn remove_enemy(state: &mut GameState, hooks: &mut dyn Hooks, id: EnemyId) -> bool {
    match state.enemy_index(id) {
        Some(index) => remove_enemy_at(state, hooks, index),
        None => false,
    }
}

/// Death pipeline: explosion, kill registration, removal
pub fn kill_enemy_at(state: &mut GameState, hooks: &mut dyn Hooks, index: usize) {
    let Some(enemy) = state.enemies.get_mut(index) else {
        return;
    };
    enemy.alive = false;
    let (id, kind, position) = (enemy.id, enemy.kind, enemy.position);

    hooks.spawn_explosion(position);
    progression::register_kill(state, hooks, kind, position);
    remove_enemy(state, hooks, id);
    log::debug!("Killed {:?} {:?}", kind, id);
}
