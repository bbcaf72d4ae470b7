//! Collaborator interface
//!
//! Rendering, effects, HUD and storage live outside the simulation. The
//! simulation calls into them through [`Hooks`]; every method has a no-op
//! default so a collaborator implements only what it cares about.

use glam::Vec3;

use super::state::{EnemyId, GameState, ItemKind};
use crate::highscores::ScoreRecord;
use crate::persistence::ProgressRecord;

/// A renderable owned by the front end that the simulation retires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Renderable {
    Enemy(EnemyId),
    HealthBar(EnemyId),
    Pickup(u32),
    Shockwave(u32),
}

/// Floating-text worthy moments
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Announcement {
    StreakMilestone { streak: u32, bonus: u64 },
    LevelUp { level: u32 },
    Healed { amount: i32 },
    CoinCollected { total: u32 },
    BossSpawned { id: EnemyId },
    ItemUsed(ItemKind),
}

/// Outbound calls from the simulation
pub trait Hooks {
    /// Free the front-end resources behind a removed entity
    fn dispose_renderable(&mut self, _renderable: Renderable) {}

    /// Enemy death effect
    fn spawn_explosion(&mut self, _position: Vec3) {}

    /// Advance effects once per tick
    fn update_explosions(&mut self, _dt: f32) {}

    /// Score, health, kills or inventory changed (throttled)
    fn refresh_hud(&mut self, _state: &GameState) {}

    fn announce(&mut self, _announcement: Announcement) {}

    /// Called after every level-up
    fn save_progress(&mut self, _record: &ProgressRecord) {}

    /// Called once when the run ends
    fn submit_score(&mut self, _record: &ScoreRecord) {}
}

/// Collaborator that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullHooks;

impl Hooks for NullHooks {}

/// Collaborator that records what it was asked to do
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct RecordingHooks {
    pub disposed: Vec<Renderable>,
    pub explosions: Vec<Vec3>,
    pub explosion_updates: u32,
    pub hud_refreshes: u32,
    pub announcements: Vec<Announcement>,
    pub saved: Vec<ProgressRecord>,
    pub submitted: Vec<ScoreRecord>,
}

#[cfg(test)]
impl Hooks for RecordingHooks {
    fn dispose_renderable(&mut self, renderable: Renderable) {
        self.disposed.push(renderable);
    }

    fn spawn_explosion(&mut self, position: Vec3) {
        self.explosions.push(position);
    }

    fn update_explosions(&mut self, _dt: f32) {
        self.explosion_updates += 1;
    }

    fn refresh_hud(&mut self, _state: &GameState) {
        self.hud_refreshes += 1;
    }

    fn announce(&mut self, announcement: Announcement) {
        self.announcements.push(announcement);
    }

    fn save_progress(&mut self, record: &ProgressRecord) {
        self.saved.push(record.clone());
    }

    fn submit_score(&mut self, record: &ScoreRecord) {
        self.submitted.push(record.clone());
    }
}

/// Refresh the HUD if the throttle allows it
pub fn flush_hud(state: &mut GameState, hooks: &mut dyn Hooks) {
    let now = state.now_ms();
    if state.hud.due(now) {
        hooks.refresh_hud(state);
        state.hud.mark_refreshed(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flush_hud_throttles() {
        let mut state = GameState::new(1);
        let mut hooks = RecordingHooks::default();

        flush_hud(&mut state, &mut hooks);
        flush_hud(&mut state, &mut hooks);
        assert_eq!(hooks.hud_refreshes, 1);

        state.hud.force();
        flush_hud(&mut state, &mut hooks);
        assert_eq!(hooks.hud_refreshes, 2);

        state.clock.advance(0.2);
        flush_hud(&mut state, &mut hooks);
        assert_eq!(hooks.hud_refreshes, 3);
    }
}
