//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Simulated time only (advanced by the caller)
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies beyond the progress store

pub mod autoplay;
pub mod blast;
pub mod clock;
pub mod level;
pub mod session;
pub mod spawn;
pub mod state;
pub mod timers;

pub use blast::{BlastOutcome, BlastReport, Rejection, RoundTally};
pub use clock::SessionClock;
pub use level::{BombColor, BombKind, BombSpec, LevelConfig, config_for};
pub use session::GameSession;
pub use spawn::SpawnScheduler;
pub use state::{
    Bomb, EntityId, GameEvent, RoundToken, SessionEnd, SessionState, Snapshot, Target,
};
pub use timers::{TimerKind, TimerQueue};
