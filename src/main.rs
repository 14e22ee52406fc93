//! Chicken Blast entry point
//!
//! Natively this runs a headless demo: the greedy autoplayer works through every
//! level it can, logging each round. The browser build enters through
//! `platform::web` instead.

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::web::wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use chicken_blast::audio::{self, LogSink};
    use chicken_blast::consts::{FRAME_DT, MAX_LEVEL};
    use chicken_blast::platform::default_store;
    use chicken_blast::sim::{GameSession, SessionState, autoplay};
    use chicken_blast::Settings;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Chicken Blast (native demo) starting...");

    let store = default_store();
    let mut settings = Settings::load(&store);
    if let Some(seed) = std::env::args().nth(1).and_then(|s| s.parse().ok()) {
        settings.seed = Some(seed);
    }
    let mut sink = LogSink::new(&settings);
    let mut session = GameSession::with_settings(&settings, store);

    let level = session.progress().unlocked().highest();
    if !session.start_level(level) {
        log::error!("Level {level} is not playable");
        return;
    }

    loop {
        match session.state() {
            SessionState::Placement => {
                // Half a second of blinking bombs, then go
                for _ in 0..30 {
                    session.advance_secs(FRAME_DT);
                }
                session.start();
            }
            SessionState::Active => {
                if let Some(slot) = autoplay::choose(&session, 2) {
                    session.detonate(slot);
                }
                session.advance_secs(FRAME_DT);
            }
            SessionState::RoundComplete => {
                if let Some(result) = session.last_result() {
                    println!(
                        "Level {}: {} with {} bombs, {} chickens, {} points",
                        result.level,
                        result.bomb_kind.name(),
                        result.bombs_used,
                        result.destroyed,
                        result.score
                    );
                }
                session.next_level();
            }
            SessionState::SessionOver => {
                if session.level() == MAX_LEVEL && session.last_result().is_some() {
                    println!("All {MAX_LEVEL} levels cleared!");
                } else {
                    println!(
                        "Time's up on level {} with {} points",
                        session.level(),
                        session.score()
                    );
                }
                break;
            }
            SessionState::Menu => break,
        }
        audio::play_events(&mut sink, &session.drain_events());
    }
    audio::play_events(&mut sink, &session.drain_events());

    let progress = session.progress();
    println!(
        "Progress: {} levels completed, {} total points, levels {:?} unlocked",
        progress.completed_count(),
        progress.total_score(),
        progress.unlocked().levels()
    );
}
