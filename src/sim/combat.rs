//! Projectile combat
//!
//! Auto-targeted player fire, sniper fire at the player, projectile motion
//! with wall sweeps, and bullet-vs-enemy hit resolution.

use glam::Vec3;

use super::collision::CollisionWorld;
use super::enemies;
use super::hooks::Hooks;
use super::player;
use super::pool::{Handle, Pool};
use super::state::{GameState, Projectile};
use crate::consts::*;
use crate::{flatten, heading_of, xz_distance_squared};

/// Shot cooldown after rapid-fire boost is applied (ms)
pub fn effective_shooting_interval(state: &GameState) -> f64 {
    let interval = state.player.shooting_interval_ms;
    if boost_active(state) {
        (interval / RAPID_FIRE_DIVISOR)
            .floor()
            .max(RAPID_FIRE_MIN_INTERVAL_MS)
    } else {
        interval
    }
}

/// Whether the rapid-fire boost is running
pub fn boost_active(state: &GameState) -> bool {
    state.now_ms() < state.player.boost_until_ms
}

/// Nearest alive enemy in range with a clear shot
pub fn find_nearest_enemy(state: &GameState) -> Option<usize> {
    let range_sq = state.tuning.shooting.range * state.tuning.shooting.range;
    let origin = state.player.position;

    let mut nearest = None;
    let mut nearest_sq = f32::INFINITY;
    for (i, enemy) in state.enemies.iter().enumerate() {
        if !enemy.alive {
            continue;
        }
        let d_sq = xz_distance_squared(origin, enemy.position);
        if d_sq <= range_sq
            && d_sq < nearest_sq
            && state.world.has_line_of_sight(origin, enemy.position)
        {
            nearest = Some(i);
            nearest_sq = d_sq;
        }
    }
    nearest
}

/// Flattened unit direction from `from` toward `to` (+Z if they coincide)
fn aim(from: Vec3, to: Vec3) -> Vec3 {
    flatten(to - from).try_normalize().unwrap_or(Vec3::Z)
}

fn launch(
    pool: &mut Pool<Projectile>,
    start: Vec3,
    direction: Vec3,
    now_ms: f64,
    lifetime_ms: f64,
    damage: i32,
) -> Option<Handle> {
    let handle = pool.acquire();
    let p = pool.get_mut(handle)?;
    p.position = start;
    p.direction = direction;
    p.heading = heading_of(direction);
    p.spawned_at_ms = now_ms;
    p.lifetime_ms = lifetime_ms;
    p.damage = damage;
    Some(handle)
}

/// Fire a player projectile at `target`
pub fn create_projectile(state: &mut GameState, target: Vec3) -> Option<Handle> {
    let start = state.player.position + Vec3::Y * PLAYER_MUZZLE_OFFSET;
    let direction = aim(start, target);
    let now = state.now_ms();
    let handle = launch(
        &mut state.projectile_pool,
        start,
        direction,
        now,
        PROJECTILE_LIFETIME_MS,
        0,
    )?;
    state.projectiles.push(handle);
    log::trace!("Player shot toward ({:.1}, {:.1})", target.x, target.z);
    Some(handle)
}

/// Fire an enemy projectile from `origin` at `target` carrying `damage`
pub fn create_enemy_projectile(
    state: &mut GameState,
    origin: Vec3,
    target: Vec3,
    damage: i32,
) -> Option<Handle> {
    let start = origin + Vec3::Y * ENEMY_MUZZLE_OFFSET;
    let direction = aim(start, target);
    let now = state.now_ms();
    let handle = launch(
        &mut state.enemy_projectile_pool,
        start,
        direction,
        now,
        ENEMY_PROJECTILE_LIFETIME_MS,
        damage,
    )?;
    state.enemy_projectiles.push(handle);
    log::trace!("Enemy shot for {} damage", damage);
    Some(handle)
}

/// Fire at the nearest valid target when the cooldown allows
pub fn update_shooting(state: &mut GameState) -> bool {
    let interval = effective_shooting_interval(state);
    let ready = state
        .clock
        .since(state.player.last_shot_ms)
        .is_none_or(|elapsed| elapsed >= interval);
    if !ready {
        return false;
    }
    let Some(target) = find_nearest_enemy(state).map(|i| state.enemies[i].position) else {
        return false;
    };
    if create_projectile(state, target).is_none() {
        return false;
    }
    state.player.last_shot_ms = Some(state.now_ms());
    true
}

/// Expire or move one projectile. Returns false when it should be retired.
fn advance(p: &mut Projectile, world: &CollisionWorld, now_ms: f64, step: f32, sweep: f32) -> bool {
    if p.expired(now_ms) {
        return false;
    }
    let next = p.position + p.direction * step;
    if world.path_hits_obstacle(p.position, next, sweep) {
        return false;
    }
    p.position = next;
    true
}

/// Move player projectiles, retiring expired, walled or runaway ones
pub fn update_projectiles(state: &mut GameState, dt: f32) {
    let now = state.now_ms();
    let step = state.tuning.shooting.projectile_speed * dt;
    let player_pos = state.player.position;
    let max_sq = PROJECTILE_MAX_DISTANCE * PROJECTILE_MAX_DISTANCE;

    let GameState {
        projectiles,
        projectile_pool,
        world,
        ..
    } = &mut *state;

    projectiles.retain(|&handle| {
        let keep = match projectile_pool.get_mut(handle) {
            Some(p) => {
                advance(p, world, now, step, PROJECTILE_SWEEP_RADIUS)
                    && xz_distance_squared(player_pos, p.position) <= max_sq
            }
            None => false,
        };
        if !keep {
            projectile_pool.release(handle);
        }
        keep
    });
}

/// Move enemy projectiles and apply the payload of any that reach the player
pub fn update_enemy_projectiles(state: &mut GameState, hooks: &mut dyn Hooks, dt: f32) {
    let now = state.now_ms();
    let step = state.tuning.enemies.sniper_projectile_speed * dt;
    let player_pos = state.player.position;
    let reach = state.player.radius + ENEMY_PROJECTILE_HIT_MARGIN;
    let reach_sq = reach * reach;

    let mut hits: Vec<(i32, Vec3)> = Vec::new();
    let GameState {
        enemy_projectiles,
        enemy_projectile_pool,
        world,
        ..
    } = &mut *state;

    enemy_projectiles.retain(|&handle| {
        let keep = match enemy_projectile_pool.get_mut(handle) {
            Some(p) => {
                if !advance(p, world, now, step, ENEMY_PROJECTILE_SWEEP_RADIUS) {
                    false
                } else if xz_distance_squared(player_pos, p.position) <= reach_sq {
                    hits.push((p.damage, p.position));
                    false
                } else {
                    true
                }
            }
            None => false,
        };
        if !keep {
            enemy_projectile_pool.release(handle);
        }
        keep
    });

    for (damage, source) in hits {
        player::take_damage(state, hooks, damage, source);
    }
}

/// Resolve player projectiles against enemies (one damage per hit)
///
/// Newest projectiles resolve first, each against the newest overlapping enemy.
pub fn check_projectile_collisions(state: &mut GameState, hooks: &mut dyn Hooks) {
    let bullet_radius = state.tuning.shooting.bullet_radius;
    let mut i = state.projectiles.len();
    while i > 0 {
        i -= 1;
        let handle = state.projectiles[i];
        let Some(pos) = state.projectile_pool.get(handle).map(|p| p.position) else {
            state.projectiles.remove(i);
            continue;
        };

        let hit = state.enemies.iter().rposition(|e| {
            let reach = bullet_radius + e.radius;
            e.alive && xz_distance_squared(pos, e.position) <= reach * reach
        });
        let Some(index) = hit else {
            continue;
        };

        state.projectiles.remove(i);
        state.projectile_pool.release(handle);

        let enemy = &mut state.enemies[index];
        let killed = enemy.apply_hit(1);
        enemy.sync_health_bar();
        if killed {
            enemies::kill_enemy_at(state, hooks, index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::arena;
    use crate::sim::collision::Obstacle;
    use crate::sim::hooks::RecordingHooks;
    use crate::sim::state::{Enemy, EnemyId, EnemyKind};
    use crate::tuning::Tuning;

    fn open_state() -> GameState {
        GameState::with_world(3, Tuning::default(), arena::open_field(60.0))
    }

    fn place(state: &mut GameState, kind: EnemyKind, x: f32, z: f32, hp: i32) -> EnemyId {
        let id = EnemyId(state.next_entity_id());
        let pos = Vec3::new(x, ENEMY_Y, z);
        state.enemies.push(Enemy::new(id, kind, pos, hp, 0.0, 20));
        id
    }

    #[test]
    fn test_rapid_fire_interval() {
        let mut state = open_state();
        assert!(!boost_active(&state));
        assert_eq!(effective_shooting_interval(&state), 450.0);
        state.player.boost_until_ms = 10_000.0;
        assert!(boost_active(&state));
        assert_eq!(effective_shooting_interval(&state), 150.0);
        state.player.shooting_interval_ms = 100.0;
        assert_eq!(effective_shooting_interval(&state), 60.0);
    }

    #[test]
    fn test_nearest_target_respects_range_and_sight() {
        let mut state = open_state();
        place(&mut state, EnemyKind::Normal, 0.0, 20.0, 3);
        assert_eq!(find_nearest_enemy(&state), None);

        place(&mut state, EnemyKind::Normal, 0.0, 8.0, 3);
        place(&mut state, EnemyKind::Normal, 5.0, 0.0, 3);
        assert_eq!(find_nearest_enemy(&state), Some(2));

        state.world.add_obstacle(Obstacle::new(2.5, 0.0, 1.0, 4.0, 2.0));
        assert_eq!(find_nearest_enemy(&state), Some(1));
    }

    #[test]
    fn test_projectile_is_flat_and_aimed() {
        let mut state = open_state();
        let handle = create_projectile(&mut state, Vec3::new(0.0, ENEMY_Y, 5.0)).unwrap();
        let p = state.projectile_pool.get(handle).unwrap();
        assert_eq!(p.direction.y, 0.0);
        assert!((p.direction - Vec3::Z).length() < 1e-5);
        assert!((p.position.y - (PLAYER_Y + PLAYER_MUZZLE_OFFSET)).abs() < 1e-6);
        assert_eq!(p.lifetime_ms, PROJECTILE_LIFETIME_MS);
    }

    #[test]
    fn test_wall_destroys_projectile() {
        let mut state = open_state();
        state.world.add_obstacle(Obstacle::new(0.0, 1.0, 4.0, 0.5, 2.0));
        create_projectile(&mut state, Vec3::new(0.0, ENEMY_Y, 5.0));
        update_projectiles(&mut state, 0.05);
        assert!(state.projectiles.is_empty());
        assert_eq!(state.projectile_pool.free_count(), 1);
    }

    #[test]
    fn test_projectile_retired_past_cutoff() {
        let mut state = open_state();
        create_projectile(&mut state, Vec3::new(0.0, ENEMY_Y, 5.0));
        let handle = state.projectiles[0];
        state.projectile_pool.get_mut(handle).unwrap().position.z = 29.9;
        update_projectiles(&mut state, 0.05);
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_hit_damages_newest_overlapping_enemy() {
        let mut state = open_state();
        let mut hooks = RecordingHooks::default();
        let first = place(&mut state, EnemyKind::Normal, 0.0, 5.0, 3);
        let newest = place(&mut state, EnemyKind::Normal, 0.0, 5.2, 3);

        create_projectile(&mut state, Vec3::new(0.0, ENEMY_Y, 5.0));
        let handle = state.projectiles[0];
        state.projectile_pool.get_mut(handle).unwrap().position = Vec3::new(0.0, 1.5, 5.1);
        check_projectile_collisions(&mut state, &mut hooks);

        assert!(state.projectiles.is_empty());
        assert_eq!(state.enemies[0].id, first);
        assert_eq!(state.enemies[0].health, 3);
        assert_eq!(state.enemies[1].id, newest);
        assert_eq!(state.enemies[1].health, 2);
    }

    #[test]
    fn test_newest_projectile_resolves_first() {
        let mut state = open_state();
        let mut hooks = RecordingHooks::default();
        place(&mut state, EnemyKind::Normal, 0.0, 5.0, 1);

        // Two bullets on the same enemy: the newer one kills, the older flies on
        let older = create_projectile(&mut state, Vec3::new(0.0, ENEMY_Y, 5.0)).unwrap();
        let newer = create_projectile(&mut state, Vec3::new(0.0, ENEMY_Y, 5.0)).unwrap();
        for handle in [older, newer] {
            state.projectile_pool.get_mut(handle).unwrap().position = Vec3::new(0.0, 1.5, 5.0);
        }
        check_projectile_collisions(&mut state, &mut hooks);

        assert!(state.enemies.is_empty());
        assert_eq!(state.projectiles, vec![older]);
        assert!(!state.projectile_pool.is_active(newer));
    }

    #[test]
    fn test_killing_hit_runs_pipeline() {
        let mut state = open_state();
        let mut hooks = RecordingHooks::default();
        place(&mut state, EnemyKind::Normal, 0.0, 5.0, 1);
        create_projectile(&mut state, Vec3::new(0.0, ENEMY_Y, 5.0));
        let handle = state.projectiles[0];
        state.projectile_pool.get_mut(handle).unwrap().position = Vec3::new(0.0, 1.5, 5.0);
        check_projectile_collisions(&mut state, &mut hooks);

        assert!(state.enemies.is_empty());
        assert_eq!(state.scoring.kills, 1);
        assert_eq!(state.scoring.score, 100);
        assert_eq!(hooks.explosions.len(), 1);
    }

    #[test]
    fn test_enemy_projectile_applies_payload() {
        let mut state = open_state();
        let mut hooks = RecordingHooks::default();
        let target = state.player.position;
        create_enemy_projectile(&mut state, Vec3::new(0.0, ENEMY_Y, 1.2), target, 7);
        update_enemy_projectiles(&mut state, &mut hooks, 0.01);
        assert!(state.enemy_projectiles.is_empty());
        assert_eq!(state.player.health, 150 - 7);
    }

    #[test]
    fn test_enemy_projectile_expires() {
        let mut state = open_state();
        let mut hooks = RecordingHooks::default();
        create_enemy_projectile(&mut state, Vec3::new(0.0, ENEMY_Y, 20.0), Vec3::new(0.0, 1.0, 40.0), 7);
        state.clock.advance(4.0);
        update_enemy_projectiles(&mut state, &mut hooks, 0.01);
        assert!(state.enemy_projectiles.is_empty());
        assert_eq!(state.player.health, 150);
    }
}
