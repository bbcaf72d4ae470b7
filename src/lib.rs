//! Arena Survivor - simulation core for a top-down arena survival game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (collision, pools, combat, AI, difficulty, loop)
//! - `tuning`: Data-driven game balance
//! - `persistence`: Progress records and JSON file storage
//! - `highscores`: Local leaderboard
//!
//! Rendering, HUD, input devices and storage backends are collaborators reached
//! through [`sim::Hooks`].

pub mod highscores;
pub mod persistence;
pub mod sim;
pub mod tuning;

pub use highscores::Leaderboard;
pub use tuning::Tuning;

use glam::{Vec2, Vec3};

/// Fixed engine constants (not balance knobs - see [`Tuning`] for those)
pub mod consts {
    /// Largest frame delta fed to integration (seconds)
    pub const MAX_FRAME_DT: f32 = 0.05;

    /// Footprint expansion used by line-of-sight tests
    pub const LOS_EPSILON: f32 = 0.02;
    /// Sweep radius for player projectiles against walls
    pub const PROJECTILE_SWEEP_RADIUS: f32 = 0.08;
    /// Sweep radius for enemy projectiles against walls
    pub const ENEMY_PROJECTILE_SWEEP_RADIUS: f32 = 0.05;
    /// Slab test treats a segment component below this as zero
    pub const SEGMENT_EPSILON: f32 = 1e-8;

    /// Player projectile lifetime (ms)
    pub const PROJECTILE_LIFETIME_MS: f64 = 3000.0;
    /// Enemy projectile lifetime (ms)
    pub const ENEMY_PROJECTILE_LIFETIME_MS: f64 = 4000.0;
    /// Player projectiles farther than this from the player are retired
    pub const PROJECTILE_MAX_DISTANCE: f32 = 30.0;
    /// Muzzle height above the player position
    pub const PLAYER_MUZZLE_OFFSET: f32 = 0.5;
    /// Muzzle height above a sniper position
    pub const ENEMY_MUZZLE_OFFSET: f32 = 0.6;
    /// Extra reach added to the player radius when enemy shots connect
    pub const ENEMY_PROJECTILE_HIT_MARGIN: f32 = 0.25;

    /// Rapid fire divides the shooting interval by this
    pub const RAPID_FIRE_DIVISOR: f64 = 3.0;
    /// Rapid fire never shoots faster than this (ms)
    pub const RAPID_FIRE_MIN_INTERVAL_MS: f64 = 60.0;

    /// Rejection-sampling budget for enemy and boss placement
    pub const SPAWN_ATTEMPTS: u32 = 80;
    /// Minimum distance between a fresh normal/sniper spawn and the player
    pub const SPAWN_MIN_PLAYER_DISTANCE: f32 = 6.0;
    /// Minimum distance between a fresh boss and the player
    pub const BOSS_MIN_PLAYER_DISTANCE: f32 = 10.0;
    /// Gap kept between enemy circles
    pub const ENEMY_SEPARATION_MARGIN: f32 = 0.05;
    /// Most snipers alive at once
    pub const MAX_SNIPERS: usize = 2;
    /// Chance a regular spawn rolls a sniper
    pub const SNIPER_CHANCE: f64 = 0.18;

    /// Recompute cadence for the difficulty controller (ms of game time)
    pub const DIFFICULTY_UPDATE_INTERVAL_MS: f64 = 1600.0;
    /// DPS the difficulty formulas treat as baseline
    pub const BASELINE_DPS: f64 = 2.2;
    /// Concurrency cap clamp
    pub const MIN_CONCURRENT_ENEMIES: u32 = 12;
    pub const MAX_CONCURRENT_ENEMIES: u32 = 80;
    /// Pack size clamp
    pub const MAX_PACK_SIZE: u32 = 6;

    /// HUD refresh throttle (ms)
    pub const HUD_REFRESH_INTERVAL_MS: f64 = 120.0;
    /// Contact tolerance for enemy/player touch damage
    pub const CONTACT_EPSILON: f32 = 0.01;
    /// Extra reach for pickup collection
    pub const PICKUP_REACH: f32 = 0.9;
    /// Random offset applied to dropped pickups (each axis, ±half)
    pub const PICKUP_JITTER: f32 = 0.6;

    /// Shockwave sweep duration (ms)
    pub const SHOCKWAVE_DURATION_MS: f64 = 1800.0;
    /// Shockwave end radius as a multiple of the shooting range
    pub const SHOCKWAVE_RANGE_FACTOR: f32 = 5.0;

    /// Enemy ground height
    pub const ENEMY_Y: f32 = 1.0;
    /// Player ground height (before the hover offset)
    pub const PLAYER_Y: f32 = 1.0;
}

/// Project onto the XZ plane (drop y)
#[inline]
pub fn xz(v: Vec3) -> Vec2 {
    Vec2::new(v.x, v.z)
}

/// Same vector with y zeroed
#[inline]
pub fn flatten(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Squared distance in the XZ plane
#[inline]
pub fn xz_distance_squared(a: Vec3, b: Vec3) -> f32 {
    xz(a).distance_squared(xz(b))
}

/// Distance in the XZ plane
#[inline]
pub fn xz_distance(a: Vec3, b: Vec3) -> f32 {
    xz(a).distance(xz(b))
}

/// Yaw that faces along `dir` (model forward is +Z)
#[inline]
pub fn heading_of(dir: Vec3) -> f32 {
    dir.x.atan2(dir.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xz_distance_ignores_height() {
        let a = Vec3::new(0.0, 5.0, 0.0);
        let b = Vec3::new(3.0, -2.0, 4.0);
        assert!((xz_distance(a, b) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_heading_of_forward() {
        assert!(heading_of(Vec3::Z).abs() < 1e-6);
        assert!((heading_of(Vec3::X) - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }
}
