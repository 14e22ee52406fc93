//! Entities, session phases and events
//!
//! Entities are addressed by id. Deferred operations hold ids, never references.

use std::collections::BTreeMap;
use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::level::{BombKind, LevelConfig};
use crate::progress::LevelResult;

/// Unique id of a bomb or target within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Identifies one round. Bumped on every setup and reset so late callbacks can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RoundToken(pub u64);

impl RoundToken {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionState {
    /// Level select
    #[default]
    Menu,
    /// Bombs laid out and blinking, clock not started
    Placement,
    /// Clock running, targets spawning
    Active,
    /// Every bomb used
    RoundComplete,
    /// Clock ran out, or the last level was cleared
    SessionOver,
}

/// A bomb waiting to be detonated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bomb {
    pub id: EntityId,
    pub kind: BombKind,
    pub pos: Vec2,
    pub radius: f32,
    pub points: u32,
    /// Displayed number, 1..=N
    pub number: u32,
    /// Blink cue during placement (no gameplay effect)
    pub blinking: bool,
}

impl Bomb {
    pub fn new(id: EntityId, kind: BombKind, pos: Vec2, number: u32) -> Self {
        let spec = kind.spec();
        Self {
            id,
            kind,
            pos,
            radius: spec.radius,
            points: spec.points,
            number,
            blinking: true,
        }
    }

    /// Whether `point` lies inside the blast (boundary included)
    #[inline]
    pub fn covers(&self, point: Vec2) -> bool {
        self.pos.distance(point) <= self.radius
    }
}

/// A wandering target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub id: EntityId,
    /// Sprite variant, 1-based
    pub variant: u8,
    pub pos: Vec2,
    /// Cleared the moment a blast scores this target
    pub alive: bool,
    /// Hit and waiting out the grace period before removal
    pub dying: bool,
}

impl Target {
    pub fn new(id: EntityId, variant: u8, pos: Vec2) -> Self {
        Self {
            id,
            variant,
            pos,
            alive: true,
            dying: false,
        }
    }

    /// Alive and not already hit
    #[inline]
    pub fn is_hittable(&self) -> bool {
        self.alive && !self.dying
    }
}

/// Why the session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEnd {
    /// Clock reached zero with bombs left
    Timeout,
    /// Cleared the final level
    AllLevelsCleared,
}

/// Notifications for presentation and audio. Drained by the front end each frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    LevelStarted { level: u32 },
    RoundStarted { level: u32 },
    BlinkToggled { on: bool },
    TargetSpawned { id: EntityId, pos: Vec2 },
    TargetRelocated { id: EntityId, pos: Vec2 },
    Explosion { bomb: u32, pos: Vec2, radius: f32, kind: BombKind },
    /// One target scored; drives the "+N Points!" toast and smoke puff
    TargetHit { id: EntityId, pos: Vec2, points: u32 },
    TargetRemoved { id: EntityId },
    RoundComplete { result: LevelResult },
    SessionOver { reason: SessionEnd },
}

/// Per-frame view of the session for rendering
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub state: SessionState,
    pub level: u32,
    pub config: LevelConfig,
    pub bombs: Vec<Bomb>,
    pub alive_targets: Vec<Target>,
    pub dying_targets: Vec<Target>,
    pub score: u64,
    pub destroyed: u32,
    pub remaining: Duration,
    pub unlocked: Vec<u32>,
}

/// Live entities of the current round
#[derive(Debug, Clone, Default)]
pub struct Arena {
    /// Bomb slots indexed by `number - 1`; `None` once detonated
    pub bombs: Vec<Option<Bomb>>,
    pub targets: BTreeMap<EntityId, Target>,
    next_id: u32,
}

impl Arena {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Default::default()
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id.max(1));
        self.next_id = id.0 + 1;
        id
    }

    /// Drop every entity. Ids keep counting so stale ids never get reused.
    pub fn clear(&mut self) {
        self.bombs.clear();
        self.targets.clear();
    }

    pub fn armed_bombs(&self) -> impl Iterator<Item = &Bomb> {
        self.bombs.iter().flatten()
    }

    pub fn armed_count(&self) -> usize {
        self.armed_bombs().count()
    }

    pub fn alive_targets(&self) -> impl Iterator<Item = &Target> {
        self.targets.values().filter(|t| t.is_hittable())
    }

    pub fn dying_targets(&self) -> impl Iterator<Item = &Target> {
        self.targets.values().filter(|t| t.dying)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_not_reused_after_clear() {
        let mut arena = Arena::new();
        let a = arena.next_entity_id();
        arena.clear();
        let b = arena.next_entity_id();
        assert_ne!(a, b);
    }

    #[test]
    fn test_bomb_covers_boundary() {
        let bomb = Bomb::new(EntityId(1), BombKind::HandGrenade, Vec2::ZERO, 1);
        assert!(bomb.covers(Vec2::new(60.0, 0.0)));
        assert!(!bomb.covers(Vec2::new(60.5, 0.0)));
        assert!(bomb.blinking);
    }

    #[test]
    fn test_dying_target_not_hittable() {
        let mut t = Target::new(EntityId(3), 2, Vec2::ONE);
        assert!(t.is_hittable());
        t.dying = true;
        assert!(!t.is_hittable());
    }
}
