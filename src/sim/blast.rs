//! Detonation and scoring
//!
//! Scoring is final at hit time. Removal of hit targets happens later (grace period)
//! and never touches the score.

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::level::BombKind;
use super::state::{Bomb, EntityId, Target};

/// Running totals for the current round. Only ever grows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundTally {
    pub score: u64,
    pub destroyed: u32,
    pub bombs_detonated: u32,
}

impl RoundTally {
    fn award(&mut self, points: u32) {
        self.score += u64::from(points);
        self.destroyed += 1;
    }
}

/// Why a detonation request was ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Session is not in `Active`
    NotActive,
    /// Index out of range, or that bomb already went off
    NoSuchBomb(usize),
}

/// What one detonation did
#[derive(Debug, Clone, PartialEq)]
pub struct BlastReport {
    pub bomb: EntityId,
    pub number: u32,
    pub kind: BombKind,
    pub pos: Vec2,
    pub radius: f32,
    /// Targets scored, with their positions at hit time
    pub hits: Vec<(EntityId, Vec2)>,
    pub points_awarded: u64,
    pub bombs_remaining: usize,
}

impl BlastReport {
    /// The blast used the last armed bomb
    pub fn cleared_round(&self) -> bool {
        self.bombs_remaining == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BlastOutcome {
    Detonated(BlastReport),
    Rejected(Rejection),
}

impl BlastOutcome {
    pub fn report(&self) -> Option<&BlastReport> {
        match self {
            BlastOutcome::Detonated(report) => Some(report),
            BlastOutcome::Rejected(_) => None,
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, BlastOutcome::Rejected(_))
    }
}

/// Mark every hittable target within the bomb's radius as dead (and dying until its
/// removal) and score it.
///
/// Returns the hit targets in id order. Targets already dying are skipped, so a
/// target can only ever be scored by one bomb.
pub fn resolve(
    bomb: &Bomb,
    targets: &mut BTreeMap<EntityId, Target>,
    tally: &mut RoundTally,
) -> Vec<(EntityId, Vec2)> {
    let mut hits = Vec::new();
    for target in targets.values_mut() {
        if !target.is_hittable() || !bomb.covers(target.pos) {
            continue;
        }
        target.alive = false;
        target.dying = true;
        tally.award(bomb.points);
        hits.push((target.id, target.pos));
    }
    tally.bombs_detonated += 1;
    hits
}
