//! Game state and core simulation types
//!
//! Everything the simulation mutates lives in [`GameState`]; systems take it
//! explicitly instead of reaching for globals.

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::arena;
use super::clock::SimClock;
use super::collision::CollisionWorld;
use super::difficulty::Difficulty;
use super::pool::{Handle, Pool};
use crate::consts::*;
use crate::tuning::Tuning;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Simulation frozen (rendering continues)
    Paused,
    /// Player health reached zero
    GameOver,
}

/// Stable enemy identifier (never reused within a run)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct EnemyId(pub u32);

/// Enemy archetypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Melee chaser
    Normal,
    /// Keeps chasing but also fires at the player on a cooldown
    Sniper,
    /// Timed spawn with scaled health and a health bar
    Boss,
}

impl EnemyKind {
    /// Collision radius
    pub fn radius(self) -> f32 {
        match self {
            EnemyKind::Normal => 0.55,
            EnemyKind::Sniper => 0.45,
            EnemyKind::Boss => 1.25,
        }
    }

    /// Extra clearance from the field edge when picking a spawn point
    pub fn spawn_padding(self) -> f32 {
        match self {
            EnemyKind::Normal | EnemyKind::Sniper => 0.6,
            EnemyKind::Boss => 1.0,
        }
    }

    /// Minimum distance from the player for a fresh spawn
    pub fn min_player_distance(self) -> f32 {
        match self {
            EnemyKind::Normal | EnemyKind::Sniper => SPAWN_MIN_PLAYER_DISTANCE,
            EnemyKind::Boss => BOSS_MIN_PLAYER_DISTANCE,
        }
    }

    /// Starting health for regular kinds (bosses scale with run time instead)
    pub fn base_health(self) -> i32 {
        match self {
            EnemyKind::Normal => 3,
            EnemyKind::Sniper => 4,
            EnemyKind::Boss => 1,
        }
    }

    /// Multiplier on the global enemy speed
    pub fn speed_factor(self) -> f32 {
        match self {
            EnemyKind::Sniper => 0.9,
            EnemyKind::Normal | EnemyKind::Boss => 1.0,
        }
    }

    /// Whether spawn placement must avoid other enemies
    pub fn avoids_enemies_on_spawn(self) -> bool {
        !self.is_boss()
    }

    #[inline]
    pub fn is_boss(self) -> bool {
        self == EnemyKind::Boss
    }

    #[inline]
    pub fn fires_projectiles(self) -> bool {
        self == EnemyKind::Sniper
    }
}

/// Body color tier driven by remaining health
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HealthTint {
    #[default]
    Healthy,
    /// At or below 66%
    Wounded,
    /// At or below 33%
    Critical,
}

impl HealthTint {
    pub fn for_ratio(ratio: f32) -> Self {
        if ratio <= 0.33 {
            HealthTint::Critical
        } else if ratio <= 0.66 {
            HealthTint::Wounded
        } else {
            HealthTint::Healthy
        }
    }
}

/// Floating health bar tracked with a boss
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthBar {
    /// Fill ratio 0..=1
    pub fill: f32,
}

/// An enemy entity
#[derive(Debug, Clone)]
pub struct Enemy {
    pub id: EnemyId,
    pub kind: EnemyKind,
    /// Position on the XZ plane (y fixed)
    pub position: Vec3,
    /// Facing yaw
    pub heading: f32,
    pub radius: f32,
    pub health: i32,
    pub max_health: i32,
    pub alive: bool,
    pub speed: f32,
    pub damage: i32,
    /// Last sniper shot (ms)
    pub last_shot_ms: Option<f64>,
    pub tint: HealthTint,
    /// Boss-only
    pub health_bar: Option<HealthBar>,
}

impl Enemy {
    pub fn new(
        id: EnemyId,
        kind: EnemyKind,
        position: Vec3,
        health: i32,
        speed: f32,
        damage: i32,
    ) -> Self {
        let health = health.max(1);
        Self {
            id,
            kind,
            position: Vec3::new(position.x, ENEMY_Y, position.z),
            heading: 0.0,
            radius: kind.radius(),
            health,
            max_health: health,
            alive: true,
            speed,
            damage,
            last_shot_ms: None,
            tint: HealthTint::Healthy,
            health_bar: kind.is_boss().then_some(HealthBar { fill: 1.0 }),
        }
    }

    #[inline]
    pub fn health_ratio(&self) -> f32 {
        (self.health as f32 / self.max_health as f32).max(0.0)
    }

    /// Apply bullet damage and refresh the tint. Returns true when this hit killed it.
    pub fn apply_hit(&mut self, amount: i32) -> bool {
        if !self.alive {
            return false;
        }
        self.health -= amount;
        self.tint = HealthTint::for_ratio(self.health_ratio());
        self.health <= 0
    }

    /// Sync the boss bar fill with current health
    pub fn sync_health_bar(&mut self) {
        let ratio = self.health_ratio();
        if let Some(bar) = self.health_bar.as_mut() {
            bar.fill = ratio;
        }
    }
}

/// The player
#[derive(Debug, Clone)]
pub struct Player {
    /// Ground position (XZ + fixed y)
    pub position: Vec3,
    /// Facing yaw
    pub heading: f32,
    /// Current movement speed (level-scaled)
    pub speed: f32,
    pub health: i32,
    pub max_health: i32,
    pub radius: f32,
    pub hover_offset: f32,
    /// Decaying knockback velocity (units/s)
    pub knockback: Vec3,
    /// Last time damage landed (ms)
    pub last_damage_ms: Option<f64>,
    /// Current shooting cooldown (level-scaled, ms)
    pub shooting_interval_ms: f64,
    pub last_shot_ms: Option<f64>,
    /// Rapid fire is active while `now < boost_until_ms`
    pub boost_until_ms: f64,
}

impl Player {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            position: Vec3::new(0.0, PLAYER_Y, 0.0),
            heading: 0.0,
            speed: tuning.player.base_speed,
            health: tuning.player.max_health,
            max_health: tuning.player.max_health,
            radius: tuning.player.radius,
            hover_offset: tuning.player.hover_offset,
            knockback: Vec3::ZERO,
            last_damage_ms: None,
            shooting_interval_ms: tuning.shooting.base_interval_ms,
            last_shot_ms: None,
            boost_until_ms: 0.0,
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Where the model is drawn
    pub fn render_position(&self) -> Vec3 {
        self.position + Vec3::Y * self.hover_offset
    }
}

/// A pooled projectile record (player or enemy)
#[derive(Debug, Clone, Default)]
pub struct Projectile {
    pub position: Vec3,
    /// Normalized, flattened (y = 0)
    pub direction: Vec3,
    /// Yaw the mesh is oriented to
    pub heading: f32,
    pub spawned_at_ms: f64,
    pub lifetime_ms: f64,
    /// Payload carried by enemy shots; zero for player shots
    pub damage: i32,
}

impl Projectile {
    #[inline]
    pub fn expired(&self, now_ms: f64) -> bool {
        now_ms - self.spawned_at_ms >= self.lifetime_ms
    }
}

/// Pickup types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupKind {
    Health,
    Coin,
}

/// A dropped pickup
#[derive(Debug, Clone)]
pub struct Pickup {
    pub id: u32,
    pub kind: PickupKind,
    pub position: Vec3,
    /// Spin phase (radians)
    pub spin: f32,
    /// Bob phase (radians)
    pub bob: f32,
}

impl Pickup {
    /// Bobbing display height
    pub fn render_height(&self) -> f32 {
        let base = match self.kind {
            PickupKind::Coin => 0.45,
            PickupKind::Health => 0.20,
        };
        base + self.bob.sin() * 0.15
    }
}

/// Expanding ring that kills what its front sweeps over
#[derive(Debug, Clone)]
pub struct Shockwave {
    pub id: u32,
    pub origin: Vec3,
    pub started_ms: f64,
    pub duration_ms: f64,
    /// Front radius last tick
    pub last_radius: f32,
    /// Front radius now
    pub radius: f32,
    pub end_radius: f32,
}

impl Shockwave {
    /// Progress 0..=1
    pub fn progress(&self, now_ms: f64) -> f32 {
        ((now_ms - self.started_ms) / self.duration_ms).clamp(0.0, 1.0) as f32
    }
}

/// Score and kill streak
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scoring {
    pub score: u64,
    pub kills: u32,
    pub streak: u32,
    pub multiplier: f64,
    pub last_kill_ms: Option<f64>,
}

impl Default for Scoring {
    fn default() -> Self {
        Self {
            score: 0,
            kills: 0,
            streak: 0,
            multiplier: 1.0,
            last_kill_ms: None,
        }
    }
}

/// Level, XP and currency
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Progression {
    pub level: u32,
    pub xp: f32,
    pub xp_to_next: f32,
    pub coins: u32,
}

impl Progression {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            level: 1,
            xp: 0.0,
            xp_to_next: tuning.progression.initial_xp_to_next,
            coins: 0,
        }
    }
}

/// Shop items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    RapidFire,
    Shockwave,
    Heal100,
    Heal50,
}

impl ItemKind {
    pub const ALL: [ItemKind; 4] = [
        ItemKind::RapidFire,
        ItemKind::Shockwave,
        ItemKind::Heal50,
        ItemKind::Heal100,
    ];
}

/// Owned items
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Inventory {
    pub rapid_fire: u32,
    pub shockwave: u32,
    pub heal_100: u32,
    pub heal_50: u32,
}

impl Inventory {
    pub fn count(&self, item: ItemKind) -> u32 {
        match item {
            ItemKind::RapidFire => self.rapid_fire,
            ItemKind::Shockwave => self.shockwave,
            ItemKind::Heal100 => self.heal_100,
            ItemKind::Heal50 => self.heal_50,
        }
    }

    pub fn count_mut(&mut self, item: ItemKind) -> &mut u32 {
        match item {
            ItemKind::RapidFire => &mut self.rapid_fire,
            ItemKind::Shockwave => &mut self.shockwave,
            ItemKind::Heal100 => &mut self.heal_100,
            ItemKind::Heal50 => &mut self.heal_50,
        }
    }
}

/// HUD refresh bookkeeping
#[derive(Debug, Clone, Default)]
pub struct HudThrottle {
    pub last_refresh_ms: Option<f64>,
    /// Set by critical events (damage, level-up, game over)
    pub forced: bool,
}

impl HudThrottle {
    pub fn force(&mut self) {
        self.forced = true;
    }

    /// Whether a refresh is due at `now_ms`
    pub fn due(&self, now_ms: f64) -> bool {
        self.forced
            || self
                .last_refresh_ms
                .is_none_or(|last| now_ms - last >= HUD_REFRESH_INTERVAL_MS)
    }

    pub fn mark_refreshed(&mut self, now_ms: f64) {
        self.last_refresh_ms = Some(now_ms);
        self.forced = false;
    }
}

/// Complete simulation context
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub tuning: Tuning,
    pub clock: SimClock,
    pub phase: GamePhase,
    pub rng: Pcg32,
    /// Static obstacles and play-field bounds
    pub world: CollisionWorld,
    pub player: Player,
    /// Live enemies, in spawn order
    pub enemies: Vec<Enemy>,
    /// Live player projectiles, in fire order
    pub projectiles: Vec<Handle>,
    pub projectile_pool: Pool<Projectile>,
    /// Live enemy projectiles, in fire order
    pub enemy_projectiles: Vec<Handle>,
    pub enemy_projectile_pool: Pool<Projectile>,
    pub pickups: Vec<Pickup>,
    pub shockwaves: Vec<Shockwave>,
    pub scoring: Scoring,
    pub progression: Progression,
    pub inventory: Inventory,
    pub difficulty: Difficulty,
    pub last_spawn_ms: f64,
    pub last_boss_ms: f64,
    pub hud: HudThrottle,
    /// Score already handed to persistence for this run
    pub score_submitted: bool,
    next_id: u32,
}

impl GameState {
    /// New run in the standard arena
    pub fn new(seed: u64) -> Self {
        Self::with_world(seed, Tuning::default(), arena::standard_arena())
    }

    /// New run with explicit balance and world
    pub fn with_world(seed: u64, tuning: Tuning, world: CollisionWorld) -> Self {
        log::info!(
            "Run started: seed={}, obstacles={}",
            seed,
            world.obstacles().len()
        );
        Self {
            seed,
            player: Player::new(&tuning),
            progression: Progression::new(&tuning),
            difficulty: Difficulty::new(&tuning),
            tuning,
            clock: SimClock::new(),
            phase: GamePhase::Playing,
            rng: Pcg32::seed_from_u64(seed),
            world,
            enemies: Vec::new(),
            projectiles: Vec::new(),
            projectile_pool: Pool::new(),
            enemy_projectiles: Vec::new(),
            enemy_projectile_pool: Pool::new(),
            pickups: Vec::new(),
            shockwaves: Vec::new(),
            scoring: Scoring::default(),
            inventory: Inventory::default(),
            last_spawn_ms: 0.0,
            last_boss_ms: 0.0,
            hud: HudThrottle::default(),
            score_submitted: false,
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    #[inline]
    pub fn now_ms(&self) -> f64 {
        self.clock.now_ms()
    }

    /// In-game minutes since the run started
    #[inline]
    pub fn minutes(&self) -> f64 {
        self.clock.minutes().max(0.0)
    }

    pub fn alive_enemy_count(&self) -> usize {
        self.enemies.iter().filter(|e| e.alive).count()
    }

    pub fn sniper_count(&self) -> usize {
        self.enemies
            .iter()
            .filter(|e| e.alive && e.kind == EnemyKind::Sniper)
            .count()
    }

    pub fn enemy_index(&self, id: EnemyId) -> Option<usize> {
        self.enemies.iter().position(|e| e.id == id)
    }

    /// Freeze or unfreeze the simulation
    pub fn set_paused(&mut self, paused: bool) {
        match (self.phase, paused) {
            (GamePhase::Playing, true) => {
                self.phase = GamePhase::Paused;
                self.clock.pause();
                log::debug!("Paused at {:.0} ms", self.now_ms());
            }
            (GamePhase::Paused, false) => {
                self.phase = GamePhase::Playing;
                self.clock.resume();
                log::debug!("Resumed at {:.0} ms", self.now_ms());
            }
            _ => {}
        }
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.phase == GamePhase::Paused
    }

    #[inline]
    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }
}
