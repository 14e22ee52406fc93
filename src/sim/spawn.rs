//! Target spawning and relocation
//!
//! Targets don't move continuously. Each one jumps to a fresh random spot on its own
//! repeating timer, and new ones arrive on a level-wide timer.

use std::time::Duration;

use rand::Rng;
use rand_pcg::Pcg32;

use super::level::LevelConfig;
use super::state::{Arena, EntityId, GameEvent, RoundToken, Target};
use super::timers::{TimerKind, TimerQueue};
use crate::Bounds;
use crate::consts::{INITIAL_TARGETS, TARGET_VARIANTS};

/// Mutable session parts the scheduler works on
pub struct SpawnCtx<'a> {
    pub arena: &'a mut Arena,
    pub rng: &'a mut Pcg32,
    pub timers: &'a mut TimerQueue,
    pub events: &'a mut Vec<GameEvent>,
    pub now: Duration,
    pub round: RoundToken,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnScheduler {
    pub spawn_interval: Duration,
    pub relocation_interval: Duration,
    pub bounds: Bounds,
}

impl SpawnScheduler {
    pub fn for_level(config: &LevelConfig) -> Self {
        Self {
            spawn_interval: config.spawn_interval,
            relocation_interval: config.relocation_interval,
            bounds: Bounds::targets(),
        }
    }

    /// Seed the opening targets and start the spawn timer
    pub fn activate(&self, ctx: &mut SpawnCtx<'_>) -> Vec<EntityId> {
        let seeded = (0..INITIAL_TARGETS).map(|_| self.spawn_one(ctx)).collect();
        ctx.timers
            .schedule(ctx.now + self.spawn_interval, ctx.round, TimerKind::Spawn);
        seeded
    }

    /// Spawn timer fired: add a target and re-arm
    pub fn on_spawn_timer(&self, ctx: &mut SpawnCtx<'_>) -> EntityId {
        let id = self.spawn_one(ctx);
        ctx.timers
            .schedule(ctx.now + self.spawn_interval, ctx.round, TimerKind::Spawn);
        id
    }

    /// Relocation timer fired for `id`. Returns false (and stops relocating) if the
    /// target is gone or already hit.
    pub fn on_relocate_timer(&self, ctx: &mut SpawnCtx<'_>, id: EntityId) -> bool {
        let Some(target) = ctx.arena.targets.get_mut(&id) else {
            return false;
        };
        if !target.is_hittable() {
            return false;
        }
        target.pos = self.bounds.sample(ctx.rng);
        ctx.events.push(GameEvent::TargetRelocated { id, pos: target.pos });
        ctx.timers.schedule(
            ctx.now + self.relocation_interval,
            ctx.round,
            TimerKind::Relocate(id),
        );
        true
    }

    fn spawn_one(&self, ctx: &mut SpawnCtx<'_>) -> EntityId {
        let id = ctx.arena.next_entity_id();
        let variant = ctx.rng.random_range(1..=TARGET_VARIANTS);
        let pos = self.bounds.sample(ctx.rng);
        ctx.arena.targets.insert(id, Target::new(id, variant, pos));
        ctx.events.push(GameEvent::TargetSpawned { id, pos });
        ctx.timers.schedule(
            ctx.now + self.relocation_interval,
            ctx.round,
            TimerKind::Relocate(id),
        );
        log::trace!("target {:?} spawned at ({:.0}, {:.0})", id, pos.x, pos.y);
        id
    }
}
