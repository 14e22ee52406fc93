//! Level progress: latest result per level and the set of unlocked levels
//!
//! Both records live in the key-value store. Anything unreadable falls back to
//! "fresh install": no results, only level 1 unlocked.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::consts::MAX_LEVEL;
use crate::persistence;
use crate::platform::KeyValueStore;
use crate::sim::BombKind;

/// Outcome of one completed level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelResult {
    pub level: u32,
    #[serde(rename = "bombType", with = "bomb_kind_name")]
    pub bomb_kind: BombKind,
    pub bombs_used: u32,
    #[serde(rename = "chickensBlasted")]
    pub destroyed: u32,
    pub score: u64,
    /// Unix timestamp (ms) when achieved
    #[serde(rename = "date")]
    pub timestamp: f64,
}

/// Bomb kinds are stored by display name. Unknown names read as the weakest tier.
mod bomb_kind_name {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::sim::BombKind;

    pub fn serialize<S: Serializer>(kind: &BombKind, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(kind.name())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<BombKind, D::Error> {
        let name = String::deserialize(d)?;
        Ok(BombKind::from_name(&name).unwrap_or_default())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Statistics {
    level_stats: Vec<LevelResult>,
}

/// Playable levels. Level 1 is always a member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<u32>", into = "Vec<u32>")]
pub struct UnlockSet(BTreeSet<u32>);

impl Default for UnlockSet {
    fn default() -> Self {
        Self(BTreeSet::from([1]))
    }
}

impl From<Vec<u32>> for UnlockSet {
    fn from(levels: Vec<u32>) -> Self {
        let mut set = Self::default();
        set.0
            .extend(levels.into_iter().filter(|l| (1..=MAX_LEVEL).contains(l)));
        set
    }
}

impl From<UnlockSet> for Vec<u32> {
    fn from(set: UnlockSet) -> Self {
        set.0.into_iter().collect()
    }
}

impl UnlockSet {
    pub fn contains(&self, level: u32) -> bool {
        self.0.contains(&level)
    }

    /// Mark `level` complete: it and the next level (if any) become playable
    pub fn complete(&mut self, level: u32) {
        let level = level.clamp(1, MAX_LEVEL);
        self.0.insert(level);
        if level < MAX_LEVEL {
            self.0.insert(level + 1);
        }
    }

    pub fn levels(&self) -> Vec<u32> {
        self.0.iter().copied().collect()
    }

    pub fn highest(&self) -> u32 {
        self.0.last().copied().unwrap_or(1)
    }
}

/// Progress records backed by a key-value store
pub struct ProgressStore<S: KeyValueStore> {
    store: S,
    results: Vec<LevelResult>,
    unlocked: UnlockSet,
    /// In-memory records newer than what the store holds (last write failed)
    unsaved: bool,
}

impl<S: KeyValueStore> ProgressStore<S> {
    const STATS_KEY: &'static str = "chicken_blast_statistics";
    const UNLOCKS_KEY: &'static str = "chicken_blast_completed_levels";

    /// Open and load both records
    pub fn open(store: S) -> Self {
        let mut progress = Self {
            store,
            results: Vec::new(),
            unlocked: UnlockSet::default(),
            unsaved: false,
        };
        progress.reload();
        progress
    }

    /// Re-read both records from the store. Skipped while the last write failed, so
    /// the in-memory records are not replaced by older stored ones.
    pub fn reload(&mut self) {
        if self.unsaved {
            log::warn!("Progress not reloaded: last save failed, keeping in-memory records");
            return;
        }
        let stats: Statistics =
            persistence::load(&self.store, Self::STATS_KEY).unwrap_or_default();
        self.results = stats.level_stats;
        self.results.sort_by_key(|r| r.level);
        self.results.dedup_by_key(|r| r.level);
        self.unlocked = persistence::load(&self.store, Self::UNLOCKS_KEY).unwrap_or_default();
        log::info!(
            "Loaded progress: {} results, levels {:?} unlocked",
            self.results.len(),
            self.unlocked.levels()
        );
    }

    /// Store a completed level's result (replacing any earlier one) and unlock the next level
    pub fn record(&mut self, result: LevelResult) {
        let level = result.level;
        self.results.retain(|r| r.level != level);
        self.results.push(result);
        self.results.sort_by_key(|r| r.level);
        self.unlocked.complete(level);
        self.save();
        log::info!("Level {level} recorded, unlocked {:?}", self.unlocked.levels());
    }

    /// Forget every result and lock everything but level 1
    pub fn reset(&mut self) {
        self.results.clear();
        self.unlocked = UnlockSet::default();
        self.save();
        log::info!("Progress reset");
    }

    fn save(&mut self) {
        let stats = Statistics {
            level_stats: self.results.clone(),
        };
        let stats_ok = persistence::save(&mut self.store, Self::STATS_KEY, &stats);
        let unlocks_ok = persistence::save(&mut self.store, Self::UNLOCKS_KEY, &self.unlocked);
        self.unsaved = !(stats_ok && unlocks_ok);
    }

    /// Whether the in-memory records failed to reach the store
    pub fn is_unsaved(&self) -> bool {
        self.unsaved
    }

    pub fn is_unlocked(&self, level: u32) -> bool {
        self.unlocked.contains(level)
    }

    pub fn unlocked(&self) -> &UnlockSet {
        &self.unlocked
    }

    /// Results ordered by level
    pub fn results(&self) -> &[LevelResult] {
        &self.results
    }

    /// Most recent result for `level`. A later completion replaces an earlier one
    /// even when it scored less.
    pub fn result_for(&self, level: u32) -> Option<&LevelResult> {
        self.results.iter().find(|r| r.level == level)
    }

    pub fn total_score(&self) -> u64 {
        self.results.iter().map(|r| r.score).sum()
    }

    pub fn total_destroyed(&self) -> u32 {
        self.results.iter().map(|r| r.destroyed).sum()
    }

    pub fn completed_count(&self) -> usize {
        self.results.len()
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{MemoryStore, StorageError};

    /// Reads through to memory; writes fail while `read_only` is set
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        read_only: bool,
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            if self.read_only {
                return Err(StorageError::Unavailable("read-only".to_string()));
            }
            self.inner.set(key, value)
        }

        fn remove(&mut self, key: &str) -> Result<(), StorageError> {
            self.inner.remove(key)
        }
    }

    fn result(level: u32, score: u64) -> LevelResult {
        LevelResult {
            level,
            bomb_kind: crate::sim::config_for(level).bomb_kind,
            bombs_used: 3,
            destroyed: (score / 10) as u32,
            score,
            timestamp: 1_700_000_000_000.0,
        }
    }

    #[test]
    fn test_fresh_store_has_level_one() {
        let progress = ProgressStore::open(MemoryStore::new());
        assert_eq!(progress.unlocked().levels(), vec![1]);
        assert!(progress.results().is_empty());
    }

    #[test]
    fn test_completing_unlocks_next() {
        let mut progress = ProgressStore::open(MemoryStore::new());
        progress.record(result(1, 30));
        assert!(progress.is_unlocked(2));
        assert!(!progress.is_unlocked(3));
    }

    #[test]
    fn test_last_level_unlocks_nothing_new() {
        let mut progress = ProgressStore::open(MemoryStore::new());
        progress.record(result(MAX_LEVEL, 150));
        assert!(progress.is_unlocked(MAX_LEVEL));
        assert!(!progress.is_unlocked(MAX_LEVEL + 1));
    }

    #[test]
    fn test_latest_result_overwrites() {
        let mut progress = ProgressStore::open(MemoryStore::new());
        progress.record(result(2, 100));
        progress.record(result(2, 40));
        assert_eq!(progress.completed_count(), 1);
        assert_eq!(progress.result_for(2).map(|r| r.score), Some(40));
    }

    #[test]
    fn test_survives_reopen() {
        let mut progress = ProgressStore::open(MemoryStore::new());
        progress.record(result(1, 20));
        progress.record(result(2, 60));
        let reopened = ProgressStore::open(progress.store().clone());
        assert_eq!(reopened.results(), progress.results());
        assert_eq!(reopened.unlocked().levels(), vec![1, 2, 3]);
        assert_eq!(reopened.total_score(), 80);
        assert_eq!(reopened.total_destroyed(), 8);
    }

    #[test]
    fn test_reset_keeps_level_one() {
        let mut progress = ProgressStore::open(MemoryStore::new());
        progress.record(result(1, 20));
        progress.reset();
        assert_eq!(progress.unlocked().levels(), vec![1]);
        let reopened = ProgressStore::open(progress.store().clone());
        assert_eq!(reopened.unlocked().levels(), vec![1]);
        assert!(reopened.results().is_empty());
    }

    #[test]
    fn test_corrupt_records_fall_back_to_defaults() {
        let mut store = MemoryStore::new();
        store.set("chicken_blast_statistics", "%%%").expect("set");
        store.set("chicken_blast_completed_levels", "{\"x\":").expect("set");
        let progress = ProgressStore::open(store);
        assert!(progress.results().is_empty());
        assert_eq!(progress.unlocked().levels(), vec![1]);
    }

    #[test]
    fn test_reads_legacy_unwrapped_records() {
        let mut store = MemoryStore::new();
        store
            .set(
                "chicken_blast_statistics",
                r#"{"levelStats":[{"level":3,"bombType":"Mystery Bomb","bombsUsed":5,"chickensBlasted":4,"score":120,"date":1.0}]}"#,
            )
            .expect("set");
        store.set("chicken_blast_completed_levels", "[4,2,99]").expect("set");

        let progress = ProgressStore::open(store);
        let r = progress.result_for(3).expect("level 3 result");
        assert_eq!(r.bomb_kind, BombKind::HandGrenade);
        assert_eq!(r.destroyed, 4);
        // Out-of-range level dropped, level 1 added back
        assert_eq!(progress.unlocked().levels(), vec![1, 2, 4]);
    }

    #[test]
    fn test_failed_save_survives_reload() {
        let mut progress = ProgressStore::open(FlakyStore {
            read_only: true,
            ..Default::default()
        });
        progress.record(result(1, 20));
        assert!(progress.is_unsaved());

        progress.reload();
        assert!(progress.is_unlocked(2));
        assert_eq!(progress.result_for(1).map(|r| r.score), Some(20));
    }

    #[test]
    fn test_reload_resumes_after_successful_save() {
        let mut progress = ProgressStore::open(FlakyStore {
            read_only: true,
            ..Default::default()
        });
        progress.record(result(1, 20));
        progress.store.read_only = false;
        progress.record(result(2, 40));
        assert!(!progress.is_unsaved());

        progress.reload();
        assert_eq!(progress.unlocked().levels(), vec![1, 2, 3]);
        assert_eq!(progress.completed_count(), 2);
    }
}
