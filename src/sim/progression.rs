//! Kill streaks, score, XP and levels

use glam::Vec3;

use super::hooks::{Announcement, Hooks};
use super::pickups;
use super::state::{EnemyKind, GameState};
use crate::persistence::ProgressRecord;

/// Streak counts that award a one-off bonus
pub const STREAK_MILESTONES: [u32; 8] = [5, 10, 15, 20, 25, 30, 40, 50];

/// Bonus points for reaching a streak milestone
pub fn milestone_bonus(milestone: u32) -> u64 {
    match milestone {
        50.. => 2000,
        25.. => 1000,
        10.. => 500,
        _ => 200,
    }
}

/// Score multiplier for a kill streak (baseline 1.0)
pub fn streak_multiplier(streak: u32, max_multiplier: f64) -> f64 {
    match streak {
        5.. => (2.0 + f64::from(streak - 5) * 0.1).min(max_multiplier),
        3.. => 1.5,
        2 => 1.2,
        _ => 1.0,
    }
}

/// Award the first milestone crossed between two streak values
fn check_streak_milestone(state: &mut GameState, hooks: &mut dyn Hooks, previous: u32, current: u32) {
    let Some(&milestone) = STREAK_MILESTONES
        .iter()
        .find(|&&m| previous < m && current >= m)
    else {
        return;
    };
    let bonus = milestone_bonus(milestone);
    state.scoring.score += bonus;
    hooks.announce(Announcement::StreakMilestone {
        streak: milestone,
        bonus,
    });
}

/// Score, XP and drops for a killed enemy
pub fn register_kill(state: &mut GameState, hooks: &mut dyn Hooks, kind: EnemyKind, position: Vec3) {
    let previous = state.scoring.streak;
    state.scoring.streak += 1;
    state.scoring.last_kill_ms = Some(state.now_ms());
    check_streak_milestone(state, hooks, previous, state.scoring.streak);

    // Below a streak of 2 the multiplier only resets through decay
    if state.scoring.streak >= 2 {
        state.scoring.multiplier =
            streak_multiplier(state.scoring.streak, state.tuning.scoring.max_multiplier);
    }

    let points =
        (state.tuning.scoring.points_per_kill as f64 * state.scoring.multiplier).floor();
    state.scoring.kills += 1;
    state.scoring.score += points as u64;

    let xp = if kind.is_boss() {
        state.tuning.progression.xp_per_kill_boss
    } else {
        state.tuning.progression.xp_per_kill_normal
    };
    add_xp(state, hooks, xp);

    pickups::maybe_drop_health_pickup(state, position, kind.is_boss());
    pickups::maybe_drop_coin_pickup(state, position, kind.is_boss());
}

/// Reset the streak once kills stop coming
pub fn update_multiplier(state: &mut GameState) {
    let Some(elapsed) = state.clock.since(state.scoring.last_kill_ms) else {
        return;
    };
    if elapsed <= state.tuning.scoring.multiplier_decay_ms {
        return;
    }
    if state.scoring.multiplier > 1.0 || state.scoring.streak > 0 {
        state.scoring.multiplier = 1.0;
        state.scoring.streak = 0;
    }
}

/// Movement speed and shot cooldown for the current level
pub fn recompute_player_stats(state: &mut GameState) {
    let levels = state.progression.level.max(1) - 1;
    let p = &state.tuning.progression;
    state.player.speed =
        state.tuning.player.base_speed * (1.0 + p.level_speed_bonus * levels as f32);

    let rate = (1.0 - p.level_fire_rate_bonus).powi(levels as i32);
    state.player.shooting_interval_ms = (state.tuning.shooting.base_interval_ms * rate)
        .round()
        .max(state.tuning.shooting.min_interval_ms);
}

/// Add XP, levelling up as many times as it covers
pub fn add_xp(state: &mut GameState, hooks: &mut dyn Hooks, amount: f32) {
    state.progression.xp += amount;
    while state.progression.xp >= state.progression.xp_to_next {
        let prog = &mut state.progression;
        prog.xp -= prog.xp_to_next;
        prog.level += 1;
        prog.xp_to_next = (prog.xp_to_next * 1.25 + 25.0).round();

        recompute_player_stats(state);
        state.hud.force();
        hooks.announce(Announcement::LevelUp {
            level: state.progression.level,
        });
        hooks.save_progress(&ProgressRecord::from_state(state));
        log::info!(
            "Level up: {} (next at {} xp)",
            state.progression.level,
            state.progression.xp_to_next
        );
    }
}

/// Passive XP over time
pub fn update_xp(state: &mut GameState, hooks: &mut dyn Hooks, dt: f32) {
    let amount = state.tuning.progression.xp_per_second * dt;
    add_xp(state, hooks, amount);
}

/// Restore saved progress (clamped to sane values) and recompute stats
pub fn apply_progress(state: &mut GameState, record: &ProgressRecord) {
    let prog = &mut state.progression;
    prog.level = record.level.max(1);
    prog.xp = if record.xp.is_finite() {
        record.xp.max(0.0)
    } else {
        0.0
    };
    if record.xp_to_next.is_finite() {
        prog.xp_to_next = record.xp_to_next.max(1.0);
    }
    prog.coins = record.coins;

    recompute_player_stats(state);
    state.hud.force();
    log::info!("Progress loaded: level {}", state.progression.level);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::arena;
    use crate::sim::hooks::RecordingHooks;
    use crate::tuning::Tuning;

    fn open_state() -> GameState {
        GameState::with_world(9, Tuning::default(), arena::open_field(60.0))
    }

    #[test]
    fn test_streak_multiplier_thresholds() {
        assert_eq!(streak_multiplier(1, 5.0), 1.0);
        assert_eq!(streak_multiplier(2, 5.0), 1.2);
        assert_eq!(streak_multiplier(4, 5.0), 1.5);
        assert_eq!(streak_multiplier(5, 5.0), 2.0);
        assert!((streak_multiplier(15, 5.0) - 3.0).abs() < 1e-9);
        assert_eq!(streak_multiplier(100, 5.0), 5.0);
    }

    #[test]
    fn test_milestone_bonus_tiers() {
        assert_eq!(milestone_bonus(5), 200);
        assert_eq!(milestone_bonus(10), 500);
        assert_eq!(milestone_bonus(30), 1000);
        assert_eq!(milestone_bonus(50), 2000);
    }

    #[test]
    fn test_kills_build_score() {
        let mut state = open_state();
        let mut hooks = RecordingHooks::default();
        for _ in 0..3 {
            register_kill(&mut state, &mut hooks, EnemyKind::Normal, Vec3::ZERO);
        }
        // 100 + 120 + 150
        assert_eq!(state.scoring.score, 370);
        assert_eq!(state.scoring.kills, 3);
        assert_eq!(state.scoring.multiplier, 1.5);
    }

    #[test]
    fn test_fifth_kill_hits_milestone() {
        let mut state = open_state();
        let mut hooks = RecordingHooks::default();
        for _ in 0..5 {
            register_kill(&mut state, &mut hooks, EnemyKind::Normal, Vec3::ZERO);
        }
        assert!(hooks.announcements.contains(&Announcement::StreakMilestone {
            streak: 5,
            bonus: 200
        }));
    }

    #[test]
    fn test_multiplier_decays_after_quiet_period() {
        let mut state = open_state();
        let mut hooks = RecordingHooks::default();
        register_kill(&mut state, &mut hooks, EnemyKind::Normal, Vec3::ZERO);
        register_kill(&mut state, &mut hooks, EnemyKind::Normal, Vec3::ZERO);
        state.clock.advance(2.0);
        update_multiplier(&mut state);
        assert_eq!(state.scoring.streak, 2);
        state.clock.advance(1.5);
        update_multiplier(&mut state);
        assert_eq!(state.scoring.streak, 0);
        assert_eq!(state.scoring.multiplier, 1.0);
    }

    #[test]
    fn test_level_up_chain_and_stats() {
        let mut state = open_state();
        let mut hooks = RecordingHooks::default();
        add_xp(&mut state, &mut hooks, 260.0);
        // 100 -> level 2 (next 150), 150 -> level 3 (next 213)
        assert_eq!(state.progression.level, 3);
        assert_eq!(state.progression.xp_to_next, 213.0);
        assert!((state.progression.xp - 10.0).abs() < 1e-4);
        assert_eq!(hooks.saved.len(), 2);
        assert!((state.player.speed - 18.0 * 1.14).abs() < 1e-4);
        assert_eq!(state.player.shooting_interval_ms, 381.0);
    }

    #[test]
    fn test_boss_kill_xp() {
        let mut state = open_state();
        let mut hooks = RecordingHooks::default();
        register_kill(&mut state, &mut hooks, EnemyKind::Boss, Vec3::ZERO);
        assert_eq!(state.progression.xp, 80.0);
    }

    #[test]
    fn test_apply_progress_clamps() {
        let mut state = open_state();
        let record = ProgressRecord {
            level: 0,
            xp: -5.0,
            xp_to_next: 0.0,
            coins: 9,
            timestamp_ms: 0.0,
        };
        apply_progress(&mut state, &record);
        assert_eq!(state.progression.level, 1);
        assert_eq!(state.progression.xp, 0.0);
        assert_eq!(state.progression.xp_to_next, 1.0);
        assert_eq!(state.progression.coins, 9);
    }
}
