//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Wall-clock timestamps
//! - Key-value storage (LocalStorage on web, a directory of files natively)
//! - The browser-facing facade (wasm32 only)

pub mod storage;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use storage::{KeyValueStore, MemoryStore, StorageError};

#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStore;
#[cfg(target_arch = "wasm32")]
pub use storage::LocalStorage;

/// Milliseconds since the Unix epoch
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

/// Milliseconds since the Unix epoch
#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

/// The store the game persists to on this platform
#[cfg(target_arch = "wasm32")]
pub fn default_store() -> Box<dyn KeyValueStore> {
    match LocalStorage::open() {
        Ok(store) => Box::new(store),
        Err(e) => {
            log::warn!("LocalStorage unavailable ({e}), progress will not persist");
            Box::new(MemoryStore::new())
        }
    }
}

/// The store the game persists to on this platform
#[cfg(not(target_arch = "wasm32"))]
pub fn default_store() -> Box<dyn KeyValueStore> {
    let dir = std::env::var_os("CHICKEN_BLAST_DATA_DIR")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("chicken-blast"));
    match FileStore::open(&dir) {
        Ok(store) => Box::new(store),
        Err(e) => {
            log::warn!("Can't use {} for saves ({e}), progress will not persist", dir.display());
            Box::new(MemoryStore::new())
        }
    }
}
