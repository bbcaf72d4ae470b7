//! Health and coin drops

use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;

use super::hooks::{Announcement, Hooks, Renderable};
use super::state::{GameState, Pickup, PickupKind};
use crate::consts::{PICKUP_JITTER, PICKUP_REACH};
use crate::xz_distance_squared;

/// Spin rate (rad/s)
const SPIN_RATE: f32 = 1.8;
/// Bob rate (rad/s)
const BOB_RATE: f32 = 2.6;

/// Drop a pickup near `position` with random jitter and animation phases
pub fn create_pickup(state: &mut GameState, kind: PickupKind, position: Vec3) -> u32 {
    let jitter = Vec3::new(
        (state.rng.random::<f32>() - 0.5) * PICKUP_JITTER,
        0.0,
        (state.rng.random::<f32>() - 0.5) * PICKUP_JITTER,
    );
    let spin = state.rng.random::<f32>() * TAU;
    let bob = state.rng.random::<f32>() * TAU;
    let id = state.next_entity_id();
    state.pickups.push(Pickup {
        id,
        kind,
        position: position + jitter,
        spin,
        bob,
    });
    log::trace!("Dropped {:?} pickup {}", kind, id);
    id
}

/// Bosses always drop health; others roll the drop chance
pub fn maybe_drop_health_pickup(state: &mut GameState, position: Vec3, is_boss: bool) {
    if is_boss || state.rng.random::<f64>() < state.tuning.pickups.health_chance {
        create_pickup(state, PickupKind::Health, position);
    }
}

/// Roll a coin drop (boss kills get a bonus chance)
pub fn maybe_drop_coin_pickup(state: &mut GameState, position: Vec3, is_boss: bool) {
    let p = &state.tuning.pickups;
    let chance = if is_boss {
        (p.coin_chance + p.boss_coin_bonus).min(1.0)
    } else {
        p.coin_chance
    };
    if state.rng.random::<f64>() < chance {
        create_pickup(state, PickupKind::Coin, position);
    }
}

/// Restore health up to the maximum. Returns the amount actually healed.
pub fn heal(state: &mut GameState, hooks: &mut dyn Hooks, amount: i32) -> i32 {
    let player = &mut state.player;
    if !player.is_alive() {
        return 0;
    }
    let before = player.health;
    player.health = (player.health + amount.max(0)).min(player.max_health);
    let healed = player.health - before;
    if healed > 0 {
        state.hud.force();
        hooks.announce(Announcement::Healed { amount: healed });
    }
    healed
}

pub fn add_coins(state: &mut GameState, hooks: &mut dyn Hooks, amount: u32) {
    state.progression.coins += amount;
    hooks.announce(Announcement::CoinCollected {
        total: state.progression.coins,
    });
}

/// Animate pickups and collect the ones the player reaches
pub fn update_pickups(state: &mut GameState, hooks: &mut dyn Hooks, dt: f32) {
    let player_pos = state.player.position;
    let reach = state.player.radius + PICKUP_REACH;

    let mut i = state.pickups.len();
    while i > 0 {
        i -= 1;
        let pickup = &mut state.pickups[i];
        pickup.spin += SPIN_RATE * dt;
        pickup.bob += BOB_RATE * dt;
        if xz_distance_squared(player_pos, pickup.position) > reach * reach {
            continue;
        }

        let pickup = state.pickups.remove(i);
        match pickup.kind {
            PickupKind::Health => {
                let amount = (state.difficulty.enemy_damage as f32
                    * state.tuning.pickups.health_heal_factor)
                    .round() as i32;
                heal(state, hooks, amount);
            }
            PickupKind::Coin => add_coins(state, hooks, 1),
        }
        hooks.dispose_renderable(Renderable::Pickup(pickup.id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::arena;
    use crate::sim::hooks::RecordingHooks;
    use crate::tuning::Tuning;

    fn open_state() -> GameState {
        GameState::with_world(11, Tuning::default(), arena::open_field(60.0))
    }

    #[test]
    fn test_boss_always_drops_health() {
        let mut state = open_state();
        for _ in 0..20 {
            maybe_drop_health_pickup(&mut state, Vec3::new(5.0, 1.0, 5.0), true);
        }
        assert_eq!(state.pickups.len(), 20);
        for p in &state.pickups {
            assert!((p.position.x - 5.0).abs() <= 0.3);
            assert!((p.position.z - 5.0).abs() <= 0.3);
        }
    }

    #[test]
    fn test_zero_chance_never_drops() {
        let mut tuning = Tuning::default();
        tuning.pickups.health_chance = 0.0;
        tuning.pickups.coin_chance = 0.0;
        tuning.pickups.boss_coin_bonus = 0.0;
        let mut state = GameState::with_world(1, tuning, arena::open_field(60.0));
        for _ in 0..50 {
            maybe_drop_health_pickup(&mut state, Vec3::ZERO, false);
            maybe_drop_coin_pickup(&mut state, Vec3::ZERO, true);
        }
        assert!(state.pickups.is_empty());
    }

    #[test]
    fn test_health_pickup_heals_clamped() {
        let mut state = open_state();
        let mut hooks = RecordingHooks::default();
        state.player.health = 140;
        create_pickup(&mut state, PickupKind::Health, Vec3::new(0.5, 1.0, 0.0));
        update_pickups(&mut state, &mut hooks, 0.016);
        assert_eq!(state.player.health, 150);
        assert!(state.pickups.is_empty());
        assert!(hooks.announcements.contains(&Announcement::Healed { amount: 10 }));
        assert!(matches!(hooks.disposed[..], [Renderable::Pickup(_)]));
    }

    #[test]
    fn test_heal_amount_tracks_enemy_damage() {
        let mut state = open_state();
        let mut hooks = RecordingHooks::default();
        state.player.health = 50;
        create_pickup(&mut state, PickupKind::Health, Vec3::ZERO);
        update_pickups(&mut state, &mut hooks, 0.016);
        // round(20 * 0.75)
        assert_eq!(state.player.health, 65);
    }

    #[test]
    fn test_coin_collect_and_far_pickup_stays() {
        let mut state = open_state();
        let mut hooks = RecordingHooks::default();
        create_pickup(&mut state, PickupKind::Coin, Vec3::new(1.0, 1.0, 0.0));
        create_pickup(&mut state, PickupKind::Coin, Vec3::new(10.0, 1.0, 0.0));
        update_pickups(&mut state, &mut hooks, 0.016);
        assert_eq!(state.progression.coins, 1);
        assert_eq!(state.pickups.len(), 1);
        assert!(hooks.announcements.contains(&Announcement::CoinCollected { total: 1 }));
    }

    #[test]
    fn test_dead_player_not_healed() {
        let mut state = open_state();
        let mut hooks = RecordingHooks::default();
        state.player.health = 0;
        assert_eq!(heal(&mut state, &mut hooks, 30), 0);
        assert_eq!(state.player.health, 0);
        assert!(hooks.announcements.is_empty());
    }
}
