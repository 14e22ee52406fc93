//! End-to-end session flows through the public API

use std::time::Duration;

use chicken_blast::audio::{self, Cue};
use chicken_blast::consts::{GRACE_PERIOD, MAX_LEVEL};
use chicken_blast::platform::{KeyValueStore, MemoryStore};
use chicken_blast::sim::{
    BlastOutcome, BombKind, GameEvent, GameSession, Rejection, SessionEnd, SessionState, autoplay,
};

fn detonate_all<S: KeyValueStore>(session: &mut GameSession<S>) {
    for slot in 0..session.bomb_slots().len() {
        session.detonate(slot);
    }
}

fn all_unlocked() -> MemoryStore {
    let mut store = MemoryStore::new();
    store
        .set("chicken_blast_completed_levels", "[1,2,3,4,5,6,7]")
        .expect("seed unlocks");
    store
}

#[test]
fn test_clearing_level_one_unlocks_level_two() {
    let mut session = GameSession::new(1, MemoryStore::new());
    assert!(session.start_level(1));
    assert!(session.start());
    detonate_all(&mut session);
    session.advance(Duration::from_secs(2));

    assert_eq!(session.state(), SessionState::RoundComplete);
    let result = session.last_result().expect("result");
    assert_eq!(result.level, 1);
    assert_eq!(result.bomb_kind, BombKind::HandGrenade);
    assert_eq!(result.bombs_used, 3);
    assert_eq!(session.snapshot().unlocked, vec![1, 2]);

    assert!(session.next_level());
    assert_eq!(session.state(), SessionState::Placement);
    assert_eq!(session.level(), 2);
    assert_eq!(session.config().bomb_kind, BombKind::Dynamite);
}

#[test]
fn test_full_campaign_ends_in_session_over() {
    let mut session = GameSession::new(2, MemoryStore::new());
    let mut cues: Vec<Cue> = Vec::new();
    assert!(session.start_level(1));

    for level in 1..=MAX_LEVEL {
        assert_eq!(session.level(), level);
        assert!(session.start());
        detonate_all(&mut session);
        session.advance(Duration::from_secs(2));
        assert_eq!(session.state(), SessionState::RoundComplete);
        assert!(session.next_level());
        audio::play_events(&mut cues, &session.drain_events());
    }

    assert_eq!(session.state(), SessionState::SessionOver);
    let unlocked = session.progress().unlocked().levels();
    assert_eq!(unlocked, (1..=MAX_LEVEL).collect::<Vec<_>>());
    assert_eq!(session.progress().completed_count(), MAX_LEVEL as usize);

    let explosions = cues.iter().filter(|c| **c == Cue::Explosion).count();
    assert_eq!(explosions, 3 + 4 + 5 + 4 + 3 + 2 + 1);
    assert_eq!(
        cues.iter().filter(|c| **c == Cue::RoundComplete).count(),
        MAX_LEVEL as usize
    );
    assert_eq!(cues.last(), Some(&Cue::SessionOver));
}

#[test]
fn test_progress_survives_new_session() {
    let mut first = GameSession::new(3, MemoryStore::new());
    first.start_level(1);
    first.start();
    detonate_all(&mut first);
    first.advance(Duration::from_secs(2));
    let store = first.progress().store().clone();

    let mut second = GameSession::new(4, store);
    assert!(second.progress().is_unlocked(2));
    assert!(second.start_level(2));
}

#[test]
fn test_timeout_leaves_level_locked() {
    let mut session = GameSession::new(5, MemoryStore::new());
    session.start_level(1);
    session.start();
    session.detonate(0);
    session.advance(Duration::from_secs(20));

    assert_eq!(session.state(), SessionState::SessionOver);
    assert!(session.drain_events().contains(&GameEvent::SessionOver {
        reason: SessionEnd::Timeout
    }));
    assert_eq!(
        session.detonate(1),
        BlastOutcome::Rejected(Rejection::NotActive)
    );
    assert!(!session.next_level());
    assert!(!session.progress().is_unlocked(2));

    session.restart_game();
    assert_eq!(session.state(), SessionState::Menu);
    assert!(session.start_level(1));
}

#[test]
fn test_menu_reset_freezes_everything() {
    let mut session = GameSession::new(6, MemoryStore::new());
    session.start_level(1);
    session.start();
    session.advance(Duration::from_millis(2500));
    session.detonate(0);
    session.back_to_main_menu();
    session.drain_events();

    assert_eq!(session.pending_timers(), 0);
    session.advance(Duration::from_secs(120));
    let snap = session.snapshot();
    assert_eq!(snap.state, SessionState::Menu);
    assert!(snap.bombs.is_empty());
    assert!(snap.alive_targets.is_empty());
    assert!(snap.dying_targets.is_empty());
    assert!(session.drain_events().is_empty());
}

#[test]
fn test_blast_scores_and_splits_targets() {
    let mut session = GameSession::new(7, all_unlocked());
    assert!(session.start_level(MAX_LEVEL));
    assert!(session.start());

    // Wait for a plasma blast to have something in range
    let mut fired = None;
    for _ in 0..36 {
        if let Some((slot, covered)) = autoplay::best_bomb(&session) {
            if covered > 0 {
                fired = Some((session.detonate(slot), covered));
                break;
            }
        }
        session.advance(Duration::from_millis(500));
    }
    let (outcome, covered) = fired.expect("some target came within range");
    let report = outcome.report().expect("detonated");

    assert_eq!(report.hits.len(), covered);
    assert_eq!(session.score(), covered as u64 * 150);
    assert_eq!(session.destroyed() as usize, covered);
    let snap = session.snapshot();
    assert_eq!(snap.dying_targets.len(), covered);
    assert!(snap.bombs.is_empty());

    // Dying targets disappear after the grace period; the score stays
    session.advance(GRACE_PERIOD);
    assert!(session.dying_targets().next().is_none());
    assert_eq!(session.score(), covered as u64 * 150);
    assert_eq!(session.state(), SessionState::RoundComplete);
    assert_eq!(session.last_result().map(|r| r.bombs_used), Some(1));
}
