//! Pausable in-game clock
//!
//! The only time source the simulation reads. It advances only while
//! running, so timers built on it never see real-world pause length.

use serde::{Deserialize, Serialize};

/// In-game time in milliseconds since the run started
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimClock {
    elapsed_ms: f64,
    paused: bool,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current in-game time (ms)
    #[inline]
    pub fn now_ms(&self) -> f64 {
        self.elapsed_ms
    }

    /// Elapsed in-game minutes
    #[inline]
    pub fn minutes(&self) -> f64 {
        self.elapsed_ms / 60_000.0
    }

    /// Advance by a frame delta in seconds. No-op while paused.
    pub fn advance(&mut self, dt_secs: f32) {
        if self.paused || !(dt_secs > 0.0) {
            return;
        }
        self.elapsed_ms += f64::from(dt_secs) * 1000.0;
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Milliseconds since `then`, or `None` if it never happened
    #[inline]
    pub fn since(&self, then: Option<f64>) -> Option<f64> {
        then.map(|t| self.elapsed_ms - t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_accumulates_ms() {
        let mut clock = SimClock::new();
        clock.advance(0.5);
        clock.advance(0.25);
        assert!((clock.now_ms() - 750.0).abs() < 1e-6);
    }

    #[test]
    fn test_paused_clock_does_not_move() {
        let mut clock = SimClock::new();
        clock.advance(1.0);
        clock.pause();
        clock.advance(10.0);
        assert!((clock.now_ms() - 1000.0).abs() < 1e-6);
        clock.resume();
        clock.advance(1.0);
        assert!((clock.now_ms() - 2000.0).abs() < 1e-6);
    }

    #[test]
    fn test_negative_and_nan_deltas_ignored() {
        let mut clock = SimClock::new();
        clock.advance(-1.0);
        clock.advance(f32::NAN);
        assert_eq!(clock.now_ms(), 0.0);
    }
}
