//! Session state machine
//!
//! `GameSession` is the only thing that mutates session state. Commands come from the
//! front end; timed work (clock, spawning, relocation, removals, round completion,
//! blinking) sits in a `TimerQueue` and runs from `advance`. Every timer is tagged
//! with the round that scheduled it, and anything from an older round is dropped.

use std::time::Duration;

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::blast::{self, BlastOutcome, BlastReport, Rejection, RoundTally};
use super::clock::SessionClock;
use super::level::{LevelConfig, config_for};
use super::spawn::{SpawnCtx, SpawnScheduler};
use super::state::{
    Arena, Bomb, EntityId, GameEvent, RoundToken, SessionEnd, SessionState, Snapshot, Target,
};
use super::timers::{Deferred, TimerKind, TimerQueue};
use crate::consts::{
    BLINK_INTERVAL, CLOCK_STEP, COMPLETION_DELAY, GRACE_PERIOD, MAX_FRAME_DT, MAX_LEVEL,
};
use crate::platform::KeyValueStore;
use crate::progress::{LevelResult, ProgressStore};
use crate::settings::Settings;
use crate::Bounds;

pub struct GameSession<S: KeyValueStore> {
    state: SessionState,
    level: u32,
    config: LevelConfig,
    arena: Arena,
    tally: RoundTally,
    clock: SessionClock,
    spawner: SpawnScheduler,
    timers: TimerQueue,
    round: RoundToken,
    /// Simulated time since the session was created
    now: Duration,
    rng: Pcg32,
    seed: u64,
    blink_enabled: bool,
    /// Last bomb gone, waiting out the completion delay
    completion_pending: bool,
    last_result: Option<LevelResult>,
    progress: ProgressStore<S>,
    events: Vec<GameEvent>,
}

impl<S: KeyValueStore> GameSession<S> {
    /// New session at the menu, progress loaded from `store`
    pub fn new(seed: u64, store: S) -> Self {
        let config = config_for(1);
        log::info!("Session created with seed: {seed}");
        Self {
            state: SessionState::Menu,
            level: 1,
            config,
            arena: Arena::new(),
            tally: RoundTally::default(),
            clock: SessionClock::new(),
            spawner: SpawnScheduler::for_level(&config),
            timers: TimerQueue::new(),
            round: RoundToken::default(),
            now: Duration::ZERO,
            rng: Pcg32::seed_from_u64(seed),
            seed,
            blink_enabled: true,
            completion_pending: false,
            last_result: None,
            progress: ProgressStore::open(store),
            events: Vec::new(),
        }
    }

    pub fn with_settings(settings: &Settings, store: S) -> Self {
        let mut session = Self::new(settings.session_seed(), store);
        session.blink_enabled = settings.blink_enabled();
        session
    }

    // === Commands ===

    /// Menu → Placement for an unlocked level
    pub fn start_level(&mut self, level: u32) -> bool {
        if self.state != SessionState::Menu {
            log::debug!("start_level({level}) ignored in {:?}", self.state);
            return false;
        }
        if !(1..=MAX_LEVEL).contains(&level) || !self.progress.is_unlocked(level) {
            log::debug!("start_level({level}) ignored: level locked");
            return false;
        }
        self.level = level;
        self.setup_placement();
        true
    }

    /// Placement → Active: clock and spawner start, bombs stop blinking
    pub fn start(&mut self) -> bool {
        if self.state != SessionState::Placement {
            log::debug!("start() ignored in {:?}", self.state);
            return false;
        }
        self.timers.cancel_where(|op| op.kind == TimerKind::Blink);
        for bomb in self.arena.bombs.iter_mut().flatten() {
            bomb.blinking = false;
        }

        self.state = SessionState::Active;
        self.clock.start(self.config.round_duration);
        self.timers
            .schedule(self.now + CLOCK_STEP, self.round, TimerKind::ClockStep);
        let seeded = self.spawner.activate(&mut SpawnCtx {
            arena: &mut self.arena,
            rng: &mut self.rng,
            timers: &mut self.timers,
            events: &mut self.events,
            now: self.now,
            round: self.round,
        });
        self.events.push(GameEvent::RoundStarted { level: self.level });
        log::info!(
            "Level {} running: {}s, {} targets seeded",
            self.level,
            self.config.round_duration.as_secs(),
            seeded.len()
        );
        true
    }

    /// Detonate the bomb in slot `index` (bomb number - 1).
    ///
    /// Scoring is applied before this returns. Removal of hit targets and round
    /// completion happen later from `advance`.
    pub fn detonate(&mut self, index: usize) -> BlastOutcome {
        if self.state != SessionState::Active {
            log::debug!("detonate({index}) ignored in {:?}", self.state);
            return BlastOutcome::Rejected(Rejection::NotActive);
        }
        let Some(bomb) = self.arena.bombs.get_mut(index).and_then(Option::take) else {
            log::debug!("detonate({index}) ignored: no armed bomb there");
            return BlastOutcome::Rejected(Rejection::NoSuchBomb(index));
        };

        let hits = blast::resolve(&bomb, &mut self.arena.targets, &mut self.tally);
        self.events.push(GameEvent::Explosion {
            bomb: bomb.number,
            pos: bomb.pos,
            radius: bomb.radius,
            kind: bomb.kind,
        });
        for &(id, pos) in &hits {
            self.events.push(GameEvent::TargetHit {
                id,
                pos,
                points: bomb.points,
            });
            self.timers
                .schedule(self.now + GRACE_PERIOD, self.round, TimerKind::Remove(id));
        }

        let report = BlastReport {
            bomb: bomb.id,
            number: bomb.number,
            kind: bomb.kind,
            pos: bomb.pos,
            radius: bomb.radius,
            points_awarded: hits.len() as u64 * u64::from(bomb.points),
            hits,
            bombs_remaining: self.arena.armed_count(),
        };
        log::debug!(
            "Bomb {} hit {} targets (+{}), {} left",
            report.number,
            report.hits.len(),
            report.points_awarded,
            report.bombs_remaining
        );

        if report.cleared_round() {
            // No timeout or new spawns once the last bomb is gone
            self.completion_pending = true;
            self.clock.stop();
            self.timers.cancel_where(|op| {
                matches!(op.kind, TimerKind::ClockStep | TimerKind::Spawn)
            });
            self.timers.schedule(
                self.now + COMPLETION_DELAY,
                self.round,
                TimerKind::CompleteRound,
            );
        }
        BlastOutcome::Detonated(report)
    }

    /// RoundComplete → Placement for the next level, or SessionOver after the last one
    pub fn next_level(&mut self) -> bool {
        if self.state != SessionState::RoundComplete {
            log::debug!("next_level() ignored in {:?}", self.state);
            return false;
        }
        if self.level < MAX_LEVEL {
            self.level += 1;
            self.setup_placement();
        } else {
            self.state = SessionState::SessionOver;
            self.events.push(GameEvent::SessionOver {
                reason: SessionEnd::AllLevelsCleared,
            });
            log::info!("All levels cleared");
        }
        true
    }

    /// Back to the menu from anywhere
    pub fn restart_game(&mut self) {
        self.reset_to_menu();
    }

    /// Back to the menu from anywhere
    pub fn back_to_main_menu(&mut self) {
        self.reset_to_menu();
    }

    /// Wipe stored results and unlocks (menu only)
    pub fn reset_progress(&mut self) -> bool {
        if self.state != SessionState::Menu {
            log::debug!("reset_progress() ignored in {:?}", self.state);
            return false;
        }
        self.progress.reset();
        true
    }

    // === Time ===

    /// Run every deferred operation due within the next `dt`, in order
    pub fn advance(&mut self, dt: Duration) {
        let target = self.now + dt;
        while let Some(op) = self.timers.pop_due(target) {
            self.now = op.due;
            self.fire(op);
        }
        self.now = target;
    }

    /// `advance` for frame loops that measure in seconds. Negative or NaN deltas do
    /// nothing; long frames (background tab, debugger pause) are clamped to `MAX_FRAME_DT`.
    pub fn advance_secs(&mut self, dt: f32) {
        let dt = Duration::try_from_secs_f32(dt).unwrap_or(Duration::ZERO);
        self.advance(dt.min(MAX_FRAME_DT));
    }

    fn fire(&mut self, op: Deferred) {
        if op.round != self.round {
            log::debug!("Dropped stale {:?} from round {:?}", op.kind, op.round);
            return;
        }
        let active = self.state == SessionState::Active;
        match op.kind {
            TimerKind::ClockStep if active && !self.completion_pending => {
                if self.clock.tick(CLOCK_STEP).is_zero() {
                    self.time_out();
                } else {
                    self.timers
                        .schedule(self.now + CLOCK_STEP, self.round, TimerKind::ClockStep);
                }
            }
            TimerKind::Spawn if active && !self.completion_pending => {
                let spawner = self.spawner;
                spawner.on_spawn_timer(&mut self.spawn_ctx());
            }
            TimerKind::Relocate(id) if active => {
                let spawner = self.spawner;
                spawner.on_relocate_timer(&mut self.spawn_ctx(), id);
            }
            TimerKind::Remove(id) => self.remove_target(id),
            TimerKind::CompleteRound if active && self.completion_pending => {
                self.complete_round();
            }
            TimerKind::Blink if self.state == SessionState::Placement => self.toggle_blink(),
            kind => log::debug!("Dropped {kind:?}: not meaningful in {:?}", self.state),
        }
    }

    fn spawn_ctx(&mut self) -> SpawnCtx<'_> {
        SpawnCtx {
            arena: &mut self.arena,
            rng: &mut self.rng,
            timers: &mut self.timers,
            events: &mut self.events,
            now: self.now,
            round: self.round,
        }
    }

    // === Transitions ===

    fn setup_placement(&mut self) {
        self.begin_new_round();
        self.config = config_for(self.level);
        self.spawner = SpawnScheduler::for_level(&self.config);

        let bounds = Bounds::bombs();
        for number in 1..=self.config.bomb_count {
            let id = self.arena.next_entity_id();
            let pos = bounds.sample(&mut self.rng);
            let mut bomb = Bomb::new(id, self.config.bomb_kind, pos, number);
            bomb.blinking = self.blink_enabled;
            self.arena.bombs.push(Some(bomb));
        }
        if self.blink_enabled {
            self.timers
                .schedule(self.now + BLINK_INTERVAL, self.round, TimerKind::Blink);
        }

        self.state = SessionState::Placement;
        self.events.push(GameEvent::LevelStarted { level: self.level });
        log::info!(
            "Level {} placement: {} x {}",
            self.level,
            self.config.bomb_count,
            self.config.bomb_kind.name()
        );
    }

    /// Invalidate every timer of the current round and clear the field
    fn begin_new_round(&mut self) {
        let cancelled = self.timers.cancel_round(self.round);
        if cancelled > 0 {
            log::debug!("Cancelled {cancelled} pending timers of {:?}", self.round);
        }
        self.round = self.round.next();
        self.clock.stop();
        self.arena.clear();
        self.tally = RoundTally::default();
        self.completion_pending = false;
        self.last_result = None;
    }

    fn reset_to_menu(&mut self) {
        self.begin_new_round();
        self.timers.clear();
        self.clock = SessionClock::new();
        self.state = SessionState::Menu;
        self.progress.reload();
        log::info!("Back to menu");
    }

    fn time_out(&mut self) {
        self.state = SessionState::SessionOver;
        self.clock.stop();
        self.stop_round_timers();
        self.events.push(GameEvent::SessionOver {
            reason: SessionEnd::Timeout,
        });
        log::info!(
            "Level {} timed out: score {}, {} bombs unused",
            self.level,
            self.tally.score,
            self.arena.armed_count()
        );
    }

    fn complete_round(&mut self) {
        self.state = SessionState::RoundComplete;
        self.completion_pending = false;
        self.stop_round_timers();

        let unused = self.arena.armed_count() as u32;
        let result = LevelResult {
            level: self.level,
            bomb_kind: self.config.bomb_kind,
            bombs_used: self.config.bomb_count.saturating_sub(unused),
            destroyed: self.tally.destroyed,
            score: self.tally.score,
            timestamp: crate::platform::now_ms(),
        };
        self.progress.record(result.clone());
        self.last_result = Some(result.clone());
        self.events.push(GameEvent::RoundComplete { result });
        log::info!(
            "Level {} complete: score {}, {} destroyed",
            self.level,
            self.tally.score,
            self.tally.destroyed
        );
    }

    /// Stop clock, spawning and relocation. Pending removals still play out.
    fn stop_round_timers(&mut self) {
        self.timers.cancel_where(|op| {
            matches!(
                op.kind,
                TimerKind::ClockStep
                    | TimerKind::Spawn
                    | TimerKind::Relocate(_)
                    | TimerKind::CompleteRound
            )
        });
    }

    fn remove_target(&mut self, id: EntityId) {
        let dying = self.arena.targets.get(&id).is_some_and(|t| t.dying);
        if dying {
            self.arena.targets.remove(&id);
            self.events.push(GameEvent::TargetRemoved { id });
        }
    }

    fn toggle_blink(&mut self) {
        let mut on = false;
        for bomb in self.arena.bombs.iter_mut().flatten() {
            bomb.blinking = !bomb.blinking;
            on = bomb.blinking;
        }
        self.events.push(GameEvent::BlinkToggled { on });
        self.timers
            .schedule(self.now + BLINK_INTERVAL, self.round, TimerKind::Blink);
    }

    // === Queries ===

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn config(&self) -> &LevelConfig {
        &self.config
    }

    pub fn score(&self) -> u64 {
        self.tally.score
    }

    pub fn destroyed(&self) -> u32 {
        self.tally.destroyed
    }

    pub fn tally(&self) -> RoundTally {
        self.tally
    }

    pub fn remaining(&self) -> Duration {
        self.clock.remaining()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn round(&self) -> RoundToken {
        self.round
    }

    /// Bomb slots in number order; `None` for detonated ones
    pub fn bomb_slots(&self) -> &[Option<Bomb>] {
        &self.arena.bombs
    }

    pub fn armed_bombs(&self) -> impl Iterator<Item = &Bomb> {
        self.arena.armed_bombs()
    }

    pub fn armed_count(&self) -> usize {
        self.arena.armed_count()
    }

    /// Slot index of the armed bomb showing `number`
    pub fn bomb_index(&self, number: u32) -> Option<usize> {
        self.arena
            .bombs
            .iter()
            .position(|b| b.as_ref().is_some_and(|b| b.number == number))
    }

    pub fn target(&self, id: EntityId) -> Option<&Target> {
        self.arena.targets.get(&id)
    }

    pub fn targets(&self) -> impl Iterator<Item = &Target> {
        self.arena.targets.values()
    }

    pub fn alive_targets(&self) -> impl Iterator<Item = &Target> {
        self.arena.alive_targets()
    }

    pub fn dying_targets(&self) -> impl Iterator<Item = &Target> {
        self.arena.dying_targets()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn last_result(&self) -> Option<&LevelResult> {
        self.last_result.as_ref()
    }

    pub fn progress(&self) -> &ProgressStore<S> {
        &self.progress
    }

    /// Take every event emitted since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.state,
            level: self.level,
            config: self.config,
            bombs: self.arena.armed_bombs().cloned().collect(),
            alive_targets: self.arena.alive_targets().cloned().collect(),
            dying_targets: self.arena.dying_targets().cloned().collect(),
            score: self.tally.score,
            destroyed: self.tally.destroyed,
            remaining: self.clock.remaining(),
            unlocked: self.progress.unlocked().levels(),
        }
    }
}
