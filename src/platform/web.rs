//! Browser facade
//!
//! Exposes the session to a JS front end: commands in, JSON snapshots and events out.
//! Cues are played here, so the page never has to care about audio.

use wasm_bindgen::prelude::*;

use super::{KeyValueStore, default_store};
use crate::audio::{self, WebAudio};
use crate::settings::Settings;
use crate::sim::GameSession;

#[wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"logger already initialized".into());
    }
    log::info!("Chicken Blast engine loaded");
}

#[wasm_bindgen]
pub struct WebGame {
    session: GameSession<Box<dyn KeyValueStore>>,
    settings: Settings,
    audio: WebAudio,
    /// Events since the last `tick`, serialized for the page
    pending_events: String,
}

#[wasm_bindgen]
impl WebGame {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WebGame {
        let store = default_store();
        let settings = Settings::load(&store);
        let audio = WebAudio::new(&settings);
        let session = GameSession::with_settings(&settings, store);
        WebGame {
            session,
            settings,
            audio,
            pending_events: "[]".to_string(),
        }
    }

    pub fn start_level(&mut self, level: u32) -> bool {
        self.session.start_level(level)
    }

    pub fn start(&mut self) -> bool {
        self.session.start()
    }

    /// Detonate bomb slot `index`. False if the request was ignored.
    pub fn detonate(&mut self, index: usize) -> bool {
        !self.session.detonate(index).is_rejected()
    }

    pub fn next_level(&mut self) -> bool {
        self.session.next_level()
    }

    pub fn restart_game(&mut self) {
        self.session.restart_game();
    }

    pub fn back_to_main_menu(&mut self) {
        self.session.back_to_main_menu();
    }

    pub fn reset_progress(&mut self) -> bool {
        self.session.reset_progress()
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.settings.muted = muted;
        self.audio.apply_settings(&self.settings);
    }

    /// Advance by `dt` seconds, play any cues, and stash the events for `events_json`
    pub fn tick(&mut self, dt: f32) {
        self.session.advance_secs(dt);
        let events = self.session.drain_events();
        audio::play_events(&mut self.audio, &events);
        self.pending_events = serde_json::to_string(&events).unwrap_or_else(|e| {
            log::warn!("Failed to encode events: {e}");
            "[]".to_string()
        });
    }

    pub fn events_json(&self) -> String {
        self.pending_events.clone()
    }

    pub fn snapshot_json(&self) -> String {
        serde_json::to_string(&self.session.snapshot()).unwrap_or_else(|e| {
            log::warn!("Failed to encode snapshot: {e}");
            "null".to_string()
        })
    }

    pub fn progress_json(&self) -> String {
        serde_json::to_string(self.session.progress().results()).unwrap_or_else(|_| "[]".to_string())
    }
}

impl Default for WebGame {
    fn default() -> Self {
        Self::new()
    }
}
