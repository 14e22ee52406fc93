//! Deferred operations on simulated time
//!
//! Every pending operation carries the round it belongs to and, where relevant,
//! the entity it acts on. Firing order is (due time, insertion order).

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::time::Duration;

use super::state::{EntityId, RoundToken};

/// What a deferred operation does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// One step of the session clock (repeating)
    ClockStep,
    /// Spawn one target (repeating)
    Spawn,
    /// Move a live target somewhere new (repeating)
    Relocate(EntityId),
    /// Drop a dying target after its grace period
    Remove(EntityId),
    /// Finish the round after the last bomb
    CompleteRound,
    /// Flip the placement blink cue (repeating)
    Blink,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deferred {
    pub due: Duration,
    pub round: RoundToken,
    pub kind: TimerKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Key {
    due: Duration,
    seq: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Entry {
    key: Key,
    op: Deferred,
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.key.cmp(&other.key)
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Min-queue of deferred operations
#[derive(Debug, Clone, Default)]
pub struct TimerQueue {
    heap: BinaryHeap<Reverse<Entry>>,
    seq: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due: Duration, round: RoundToken, kind: TimerKind) {
        self.seq += 1;
        self.heap.push(Reverse(Entry {
            key: Key { due, seq: self.seq },
            op: Deferred { due, round, kind },
        }));
    }

    /// Pop the earliest operation due at or before `now`
    pub fn pop_due(&mut self, now: Duration) -> Option<Deferred> {
        match self.heap.peek() {
            Some(Reverse(entry)) if entry.key.due <= now => self.heap.pop().map(|Reverse(e)| e.op),
            _ => None,
        }
    }

    /// Drop every pending operation matching `pred`
    pub fn cancel_where(&mut self, mut pred: impl FnMut(&Deferred) -> bool) -> usize {
        let before = self.heap.len();
        self.heap.retain(|Reverse(e)| !pred(&e.op));
        before - self.heap.len()
    }

    /// Drop everything belonging to `round`
    pub fn cancel_round(&mut self, round: RoundToken) -> usize {
        self.cancel_where(|op| op.round == round)
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Whether any pending operation matches `kind`
    pub fn contains(&self, kind: TimerKind) -> bool {
        self.heap.iter().any(|Reverse(e)| e.op.kind == kind)
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.heap.peek().map(|Reverse(e)| e.key.due)
    }
}
