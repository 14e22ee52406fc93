//! Sound cues
//!
//! The engine only names three cues. Playing them is fire-and-forget: a sink that
//! can't play simply doesn't, and the simulation never hears about it.

use crate::settings::Settings;
use crate::sim::{GameEvent, SessionEnd};

/// Sound cue types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// A bomb went off
    Explosion,
    /// Every bomb used, round recorded
    RoundComplete,
    /// Time ran out, or the last level was cleared
    SessionOver,
}

impl Cue {
    /// The cue an event should trigger, if any
    pub fn for_event(event: &GameEvent) -> Option<Cue> {
        match event {
            GameEvent::Explosion { .. } => Some(Cue::Explosion),
            GameEvent::RoundComplete { .. } => Some(Cue::RoundComplete),
            GameEvent::SessionOver {
                reason: SessionEnd::Timeout | SessionEnd::AllLevelsCleared,
            } => Some(Cue::SessionOver),
            _ => None,
        }
    }
}

/// Anything that can play cues
pub trait AudioSink {
    fn play(&mut self, cue: Cue);
}

/// Recording sink (tests, replays)
impl AudioSink for Vec<Cue> {
    fn play(&mut self, cue: Cue) {
        self.push(cue);
    }
}

/// Play the cue for every event that has one
pub fn play_events<A: AudioSink + ?Sized>(sink: &mut A, events: &[GameEvent]) {
    for cue in events.iter().filter_map(Cue::for_event) {
        sink.play(cue);
    }
}

/// Sink for builds without an audio backend: logs the cue and moves on
#[derive(Debug, Clone, Default)]
pub struct LogSink {
    volume: f32,
}

impl LogSink {
    pub fn new(settings: &Settings) -> Self {
        Self {
            volume: settings.effective_volume(),
        }
    }
}

impl AudioSink for LogSink {
    fn play(&mut self, cue: Cue) {
        if self.volume > 0.0 {
            log::debug!("cue {:?} at volume {:.2}", cue, self.volume);
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::WebAudio;

/// Audio system using Web Audio API
///
/// Procedurally generated cues - no external files needed!
#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{AudioSink, Cue};
    use crate::settings::Settings;

    pub struct WebAudio {
        ctx: Option<AudioContext>,
        volume: f32,
    }

    impl WebAudio {
        pub fn new(settings: &Settings) -> Self {
            // Try to create audio context (may fail if not in secure context)
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                volume: settings.effective_volume(),
            }
        }

        pub fn apply_settings(&mut self, settings: &Settings) {
            self.volume = settings.effective_volume();
        }

        /// Create an oscillator with gain envelope
        fn create_osc(
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// Deep boom with a crack on top
        fn explosion(ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = Self::create_osc(ctx, 100.0, OscillatorType::Sawtooth) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.5, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.4)
                .ok();
            osc.frequency().set_value_at_time(100.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(30.0, t + 0.4)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.5).ok();

            if let Some((crack, crack_gain)) = Self::create_osc(ctx, 1500.0, OscillatorType::Square) {
                crack_gain.gain().set_value_at_time(vol * 0.2, t).ok();
                crack_gain
                    .gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.1)
                    .ok();
                crack.start().ok();
                crack.stop_with_when(t + 0.15).ok();
            }
        }

        /// Rising arpeggio (round complete) or falling one (session over)
        fn arpeggio(ctx: &AudioContext, vol: f32, notes: &[f32], step: f64, osc_type: OscillatorType) {
            for (i, freq) in notes.iter().enumerate() {
                let t = ctx.current_time() + i as f64 * step;
                if let Some((osc, gain)) = Self::create_osc(ctx, *freq, osc_type) {
                    gain.gain().set_value_at_time(vol * 0.3, t).ok();
                    gain.gain()
                        .exponential_ramp_to_value_at_time(0.01, t + 0.3)
                        .ok();
                    osc.start_with_when(t).ok();
                    osc.stop_with_when(t + 0.4).ok();
                }
            }
        }
    }

    impl AudioSink for WebAudio {
        fn play(&mut self, cue: Cue) {
            let vol = self.volume;
            if vol <= 0.0 {
                return;
            }
            let Some(ctx) = &self.ctx else { return };

            // Resume context if suspended (browsers require user gesture)
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            match cue {
                Cue::Explosion => Self::explosion(ctx, vol),
                Cue::RoundComplete => Self::arpeggio(
                    ctx,
                    vol,
                    &[400.0, 500.0, 600.0, 800.0],
                    0.1,
                    OscillatorType::Triangle,
                ),
                Cue::SessionOver => Self::arpeggio(
                    ctx,
                    vol,
                    &[400.0, 350.0, 300.0, 200.0],
                    0.2,
                    OscillatorType::Sine,
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{BombKind, EntityId};
    use glam::Vec2;

    #[test]
    fn test_only_three_events_make_sound() {
        let events = vec![
            GameEvent::TargetSpawned {
                id: EntityId(1),
                pos: Vec2::ZERO,
            },
            GameEvent::Explosion {
                bomb: 1,
                pos: Vec2::ZERO,
                radius: 60.0,
                kind: BombKind::HandGrenade,
            },
            GameEvent::TargetHit {
                id: EntityId(1),
                pos: Vec2::ZERO,
                points: 10,
            },
            GameEvent::SessionOver {
                reason: SessionEnd::Timeout,
            },
        ];
        let mut played: Vec<Cue> = Vec::new();
        play_events(&mut played, &events);
        assert_eq!(played, vec![Cue::Explosion, Cue::SessionOver]);
    }

    #[test]
    fn test_log_sink_never_fails() {
        let mut sink = LogSink::new(&Settings {
            muted: true,
            ..Default::default()
        });
        sink.play(Cue::RoundComplete);
    }
}
