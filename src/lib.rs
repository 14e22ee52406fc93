//! Chicken Blast - bomb the wandering chickens before the clock runs out
//!
//! Core modules:
//! - `sim`: Deterministic simulation (levels, timers, spawning, blasts, session state machine)
//! - `progress`: Per-level results and unlocked levels
//! - `persistence`: Versioned JSON envelope for stored records
//! - `platform`: Key-value storage backends and wall-clock time
//! - `settings`: Player preferences
//! - `audio`: Sound cues emitted by the engine

pub mod audio;
pub mod persistence;
pub mod platform;
pub mod progress;
pub mod settings;
pub mod sim;

pub use audio::{AudioSink, Cue};
pub use progress::{LevelResult, ProgressStore, UnlockSet};
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    use std::time::Duration;

    /// Highest playable level; later levels clamp to this one
    pub const MAX_LEVEL: u32 = 7;

    /// Play field dimensions (logical points)
    pub const FIELD_WIDTH: f32 = 350.0;
    pub const FIELD_HEIGHT: f32 = 500.0;

    /// Inset bounds where targets may appear
    pub const TARGET_MIN_X: f32 = 30.0;
    pub const TARGET_MAX_X: f32 = 320.0;
    pub const TARGET_MIN_Y: f32 = 80.0;
    pub const TARGET_MAX_Y: f32 = 470.0;

    /// Inset bounds where bombs are placed
    pub const BOMB_MIN_X: f32 = 50.0;
    pub const BOMB_MAX_X: f32 = 300.0;
    pub const BOMB_MIN_Y: f32 = 100.0;
    pub const BOMB_MAX_Y: f32 = 450.0;

    /// Targets seeded the moment a round goes active
    pub const INITIAL_TARGETS: usize = 3;
    /// Number of target sprite variants (1-based)
    pub const TARGET_VARIANTS: u8 = 4;

    /// Session clock granularity
    pub const CLOCK_STEP: Duration = Duration::from_secs(1);
    /// Delay between a target being hit and its removal (presentation only)
    pub const GRACE_PERIOD: Duration = Duration::from_secs(2);
    /// Delay between the last detonation and round completion
    pub const COMPLETION_DELAY: Duration = Duration::from_millis(1500);
    /// Armed-bomb blink toggle period during placement
    pub const BLINK_INTERVAL: Duration = Duration::from_millis(500);

    /// Frame step used by headless drivers (60 Hz)
    pub const FRAME_DT: f32 = 1.0 / 60.0;
    /// Longest frame `advance_secs` will simulate in one call
    pub const MAX_FRAME_DT: Duration = Duration::from_millis(100);
}

/// Axis-aligned rectangle, inclusive on both ends
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    pub const fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Region targets spawn and relocate within
    pub const fn targets() -> Self {
        use consts::*;
        Self::new(
            Vec2::new(TARGET_MIN_X, TARGET_MIN_Y),
            Vec2::new(TARGET_MAX_X, TARGET_MAX_Y),
        )
    }

    /// Region bombs are placed within
    pub const fn bombs() -> Self {
        use consts::*;
        Self::new(
            Vec2::new(BOMB_MIN_X, BOMB_MIN_Y),
            Vec2::new(BOMB_MAX_X, BOMB_MAX_Y),
        )
    }

    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Sample a point uniformly, each axis independently
    pub fn sample<R: rand::Rng>(&self, rng: &mut R) -> Vec2 {
        Vec2::new(
            rng.random_range(self.min.x..=self.max.x),
            rng.random_range(self.min.y..=self.max.y),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_sample_stays_in_bounds() {
        let mut rng = Pcg32::seed_from_u64(7);
        for bounds in [Bounds::targets(), Bounds::bombs()] {
            for _ in 0..500 {
                assert!(bounds.contains(bounds.sample(&mut rng)));
            }
        }
    }

    #[test]
    fn test_bounds_are_inset() {
        let field = Bounds::new(Vec2::ZERO, Vec2::new(consts::FIELD_WIDTH, consts::FIELD_HEIGHT));
        let t = Bounds::targets();
        assert!(field.contains(t.min) && field.contains(t.max));
        assert!(t.min.x > 0.0 && t.max.x < consts::FIELD_WIDTH);
    }
}
