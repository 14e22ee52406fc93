//! Player preferences
//!
//! Persisted separately from progress, through the same key-value store.

use serde::{Deserialize, Serialize};

use crate::persistence;
use crate::platform::KeyValueStore;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Silence every cue
    pub muted: bool,

    // === Accessibility ===
    /// Reduced motion (no bomb blinking during placement)
    pub reduced_motion: bool,

    // === Simulation ===
    /// Fixed RNG seed for reproducible rounds; `None` seeds from the clock
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
            reduced_motion: false,
            seed: None,
        }
    }
}

impl Settings {
    const STORAGE_KEY: &'static str = "chicken_blast_settings";

    /// Volume actually applied to cues
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
        }
    }

    /// Whether the placement blink cue should be shown
    pub fn blink_enabled(&self) -> bool {
        !self.reduced_motion
    }

    /// Seed to use for a new session
    pub fn session_seed(&self) -> u64 {
        self.seed
            .unwrap_or_else(|| crate::platform::now_ms() as u64)
    }

    /// Load settings, or defaults if none are stored
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        match persistence::load(store, Self::STORAGE_KEY) {
            Some(settings) => {
                log::info!("Loaded settings");
                settings
            }
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S) {
        if persistence::save(store, Self::STORAGE_KEY, self) {
            log::info!("Settings saved");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStore;

    #[test]
    fn test_muted_is_silent() {
        let settings = Settings {
            muted: true,
            ..Default::default()
        };
        assert_eq!(settings.effective_volume(), 0.0);
        assert!((Settings::default().effective_volume() - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_missing_fields_default() {
        let settings: Settings = serde_json::from_str(r#"{"muted":true}"#).expect("parse");
        assert!(settings.muted);
        assert_eq!(settings.sfx_volume, 1.0);
        assert!(settings.blink_enabled());
    }

    #[test]
    fn test_save_then_load() {
        let mut store = MemoryStore::new();
        assert_eq!(Settings::load(&store), Settings::default());

        let settings = Settings {
            reduced_motion: true,
            seed: Some(5),
            ..Default::default()
        };
        settings.save(&mut store);
        let loaded = Settings::load(&store);
        assert_eq!(loaded, settings);
        assert_eq!(loaded.session_seed(), 5);
        assert!(!loaded.blink_enabled());
    }
}
