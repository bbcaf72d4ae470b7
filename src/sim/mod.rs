//! Simulation module
//!
//! All gameplay logic lives here. It stays free of rendering and platform
//! dependencies:
//! - One pausable in-game clock
//! - Seeded RNG only
//! - Stable iteration order (spawn order for enemies, fire order for projectiles)
//! - Collaborators reached through [`Hooks`]

pub mod arena;
pub mod clock;
pub mod collision;
pub mod combat;
pub mod difficulty;
pub mod enemies;
pub mod hooks;
pub mod items;
pub mod pickups;
pub mod player;
pub mod pool;
pub mod progression;
pub mod state;
pub mod tick;

pub use clock::SimClock;
pub use collision::{Aabb, CollisionWorld, FieldBounds, Obstacle, segment_intersects_box};
pub use difficulty::{Difficulty, DifficultyInputs};
pub use hooks::{Announcement, Hooks, NullHooks, Renderable};
pub use items::PurchaseError;
pub use pool::{Handle, Pool};
pub use state::{
    Enemy, EnemyId, EnemyKind, GamePhase, GameState, Inventory, ItemKind, Pickup, PickupKind,
    Player, Projectile, Shockwave,
};
pub use tick::{TickInput, tick};
