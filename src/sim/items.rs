//! Shop, inventory and item effects

use thiserror::Error;

use super::enemies;
use super::hooks::{Announcement, Hooks, Renderable};
use super::pickups;
use super::state::{GameState, ItemKind, Shockwave};
use crate::consts::{SHOCKWAVE_DURATION_MS, SHOCKWAVE_RANGE_FACTOR};
use crate::tuning::Tuning;
use crate::xz_distance;

/// Radius a fresh shockwave starts from
const SHOCKWAVE_START_RADIUS: f32 = 0.05;

/// Why a purchase was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PurchaseError {
    #[error("{item:?} costs {price} coins but only {coins} available")]
    InsufficientCoins { item: ItemKind, price: u32, coins: u32 },
    #[error("cannot shop after the run has ended")]
    RunOver,
}

/// Coin price of an item
pub fn price(tuning: &Tuning, item: ItemKind) -> u32 {
    let shop = &tuning.shop;
    match item {
        ItemKind::RapidFire => shop.rapid_fire,
        ItemKind::Shockwave => shop.shockwave,
        ItemKind::Heal100 => shop.heal_100,
        ItemKind::Heal50 => shop.heal_50,
    }
}

/// Spend coins on one item
pub fn buy_item(state: &mut GameState, item: ItemKind) -> Result<(), PurchaseError> {
    if state.is_over() {
        return Err(PurchaseError::RunOver);
    }
    let price = price(&state.tuning, item);
    let coins = state.progression.coins;
    if coins < price {
        return Err(PurchaseError::InsufficientCoins { item, price, coins });
    }
    state.progression.coins -= price;
    *state.inventory.count_mut(item) += 1;
    state.hud.force();
    log::debug!("Bought {:?} for {} coins", item, price);
    Ok(())
}

/// Use one owned item. Returns false when none is owned.
pub fn activate_item(state: &mut GameState, hooks: &mut dyn Hooks, item: ItemKind) -> bool {
    let count = state.inventory.count_mut(item);
    if *count == 0 {
        return false;
    }
    *count -= 1;

    match item {
        ItemKind::RapidFire => {
            state.player.boost_until_ms = state.now_ms() + state.tuning.shooting.boost_duration_ms;
        }
        ItemKind::Shockwave => {
            start_shockwave(state);
        }
        ItemKind::Heal100 => heal_percent(state, hooks, 1.0),
        ItemKind::Heal50 => heal_percent(state, hooks, 0.5),
    }
    state.hud.force();
    hooks.announce(Announcement::ItemUsed(item));
    log::debug!("Used {:?}", item);
    true
}

fn heal_percent(state: &mut GameState, hooks: &mut dyn Hooks, fraction: f32) {
    let amount = (state.player.max_health as f32 * fraction).round() as i32;
    pickups::heal(state, hooks, amount);
}

/// Launch a shockwave from the player
pub fn start_shockwave(state: &mut GameState) -> u32 {
    let id = state.next_entity_id();
    state.shockwaves.push(Shockwave {
        id,
        origin: state.player.position,
        started_ms: state.now_ms(),
        duration_ms: SHOCKWAVE_DURATION_MS,
        last_radius: SHOCKWAVE_START_RADIUS,
        radius: SHOCKWAVE_START_RADIUS,
        end_radius: state.tuning.shooting.range * SHOCKWAVE_RANGE_FACTOR,
    });
    id
}

/// Eased front radius at progress `t`
#[inline]
pub fn shockwave_radius(end_radius: f32, t: f32) -> f32 {
    end_radius * (1.0 - (1.0 - t).powi(2))
}

/// Grow shockwaves and kill the enemies their front sweeps over
pub fn update_shockwaves(state: &mut GameState, hooks: &mut dyn Hooks) {
    let now = state.now_ms();
    let mut w = state.shockwaves.len();
    while w > 0 {
        w -= 1;
        let wave = &state.shockwaves[w];
        let t = wave.progress(now);
        let radius = shockwave_radius(wave.end_radius, t);
        let (origin, last) = (wave.origin, wave.last_radius);

        let mut j = state.enemies.len();
        while j > 0 {
            j -= 1;
            let enemy = &state.enemies[j];
            if !enemy.alive {
                continue;
            }
            let d = xz_distance(enemy.position, origin);
            if d > last && d <= radius {
                enemies::kill_enemy_at(state, hooks, j);
            }
        }

        let wave = &mut state.shockwaves[w];
        wave.last_radius = radius;
        wave.radius = radius;
        if t >= 1.0 {
            let wave = state.shockwaves.remove(w);
            hooks.dispose_renderable(Renderable::Shockwave(wave.id));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::arena;
    use crate::sim::hooks::RecordingHooks;
    use crate::sim::state::{Enemy, EnemyId, EnemyKind};
    use glam::Vec3;

    fn open_state() -> GameState {
        GameState::with_world(13, Tuning::default(), arena::open_field(120.0))
    }

    fn place(state: &mut GameState, id: u32, x: f32) {
        let pos = Vec3::new(x, 1.0, 0.0);
        state
            .enemies
            .push(Enemy::new(EnemyId(id), EnemyKind::Normal, pos, 3, 0.0, 20));
    }

    #[test]
    fn test_buy_requires_coins() {
        let mut state = open_state();
        state.progression.coins = 9;
        let err = buy_item(&mut state, ItemKind::RapidFire).unwrap_err();
        assert_eq!(
            err,
            PurchaseError::InsufficientCoins {
                item: ItemKind::RapidFire,
                price: 10,
                coins: 9
            }
        );
        state.progression.coins = 26;
        buy_item(&mut state, ItemKind::Shockwave).unwrap();
        buy_item(&mut state, ItemKind::Heal50).unwrap();
        assert_eq!(state.progression.coins, 0);
        assert_eq!(state.inventory.count(ItemKind::Shockwave), 1);
        assert_eq!(state.inventory.count(ItemKind::Heal50), 1);
    }

    #[test]
    fn test_every_item_purchasable() {
        let mut state = open_state();
        let total: u32 = ItemKind::ALL.iter().map(|&i| price(&state.tuning, i)).sum();
        assert_eq!(total, 48);
        state.progression.coins = total;
        for item in ItemKind::ALL {
            buy_item(&mut state, item).unwrap();
            assert_eq!(state.inventory.count(item), 1);
        }
        assert_eq!(state.progression.coins, 0);
    }

    #[test]
    fn test_activate_without_item_is_noop() {
        let mut state = open_state();
        let mut hooks = RecordingHooks::default();
        assert!(!activate_item(&mut state, &mut hooks, ItemKind::Heal100));
        assert!(hooks.announcements.is_empty());
    }

    #[test]
    fn test_rapid_fire_sets_boost() {
        let mut state = open_state();
        let mut hooks = RecordingHooks::default();
        state.clock.advance(2.0);
        state.inventory.rapid_fire = 1;
        assert!(activate_item(&mut state, &mut hooks, ItemKind::RapidFire));
        assert_eq!(state.player.boost_until_ms, 12_000.0);
        assert_eq!(state.inventory.rapid_fire, 0);
        assert!(hooks.announcements.contains(&Announcement::ItemUsed(ItemKind::RapidFire)));
    }

    #[test]
    fn test_heal_items() {
        let mut state = open_state();
        let mut hooks = RecordingHooks::default();
        state.player.health = 10;
        state.inventory.heal_50 = 1;
        state.inventory.heal_100 = 1;
        activate_item(&mut state, &mut hooks, ItemKind::Heal50);
        assert_eq!(state.player.health, 85);
        activate_item(&mut state, &mut hooks, ItemKind::Heal100);
        assert_eq!(state.player.health, 150);
    }

    #[test]
    fn test_shockwave_radius_easing() {
        assert_eq!(shockwave_radius(54.0, 0.0), 0.0);
        assert!((shockwave_radius(54.0, 0.5) - 40.5).abs() < 1e-4);
        assert_eq!(shockwave_radius(54.0, 1.0), 54.0);
    }

    #[test]
    fn test_shockwave_sweeps_front_only() {
        let mut state = open_state();
        let mut hooks = RecordingHooks::default();
        place(&mut state, 1, 3.0);
        place(&mut state, 2, 50.0);
        start_shockwave(&mut state);

        // t = 100/1800: radius ~5.8, first enemy swept
        state.clock.advance(0.1);
        update_shockwaves(&mut state, &mut hooks);
        assert_eq!(state.enemies.len(), 1);
        assert_eq!(state.enemies[0].id, EnemyId(2));
        assert_eq!(state.scoring.kills, 1);

        // An enemy walking into the already-swept area is spared
        place(&mut state, 3, 2.0);
        state.clock.advance(1.7);
        update_shockwaves(&mut state, &mut hooks);
        assert_eq!(state.shockwaves.len(), 0);
        assert_eq!(state.enemies.len(), 1);
        assert_eq!(state.enemies[0].id, EnemyId(3));
        assert!(hooks.disposed.iter().any(|r| matches!(r, Renderable::Shockwave(_))));
    }
}
