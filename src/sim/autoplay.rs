//! Idle/demo player
//!
//! Greedy: fire whichever bomb currently covers the most live targets.

use std::time::Duration;

use super::session::GameSession;
use super::state::SessionState;
use crate::platform::KeyValueStore;

/// Below this much clock, any bomb is worth firing
const PANIC_TIME: Duration = Duration::from_secs(3);

/// Armed slot covering the most hittable targets, with that count
pub fn best_bomb<S: KeyValueStore>(session: &GameSession<S>) -> Option<(usize, usize)> {
    session
        .bomb_slots()
        .iter()
        .enumerate()
        .filter_map(|(i, slot)| slot.as_ref().map(|b| (i, b)))
        .map(|(i, bomb)| {
            let covered = session
                .alive_targets()
                .filter(|t| bomb.covers(t.pos))
                .count();
            (i, covered)
        })
        // Earliest slot wins ties
        .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
}

/// Slot the demo player would fire right now, if any.
///
/// Waits until a bomb covers at least `min_hits` targets, unless time is short.
pub fn choose<S: KeyValueStore>(session: &GameSession<S>, min_hits: usize) -> Option<usize> {
    if session.state() != SessionState::Active {
        return None;
    }
    let (slot, covered) = best_bomb(session)?;
    if covered >= min_hits.max(1) || session.remaining() <= PANIC_TIME {
        Some(slot)
    } else {
        None
    }
}
