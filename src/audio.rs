//! Sound cues
//!
//! Maps simulation events to short procedurally generated tones. The cue
//! table and gain math are platform independent; playback goes through the
//! Web Audio API on wasm and is silently skipped anywhere it fails.

use crate::sim::SimEvent;

/// Sound cue types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    /// Bird flapped
    Jump,
    /// Obstacle passed
    Score,
    /// Coin picked up
    Coin,
    /// Bird hit something
    Collision,
    /// Run over
    GameOver,
    /// Countdown finished, play begins
    Start,
    /// One countdown step
    Countdown,
}

/// One swept tone: frequency ramps from `start_hz` to `end_hz`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub start_hz: f32,
    pub end_hz: f32,
    /// Seconds
    pub duration: f32,
    /// Time to reach peak gain (seconds)
    pub attack: f32,
    /// Peak gain before the volume setting is applied
    pub peak: f32,
}

impl SoundCue {
    pub fn tone(self) -> Tone {
        let (start_hz, end_hz, duration, attack, peak) = match self {
            SoundCue::Jump => (600.0, 300.0, 0.15, 0.02, 0.15),
            SoundCue::Score => (800.0, 1200.0, 0.1, 0.02, 0.1),
            SoundCue::Coin => (1000.0, 1500.0, 0.15, 0.02, 0.15),
            SoundCue::Collision => (200.0, 100.0, 0.1, 0.01, 0.2),
            SoundCue::GameOver => (400.0, 200.0, 0.3, 0.05, 0.15),
            SoundCue::Start => (300.0, 600.0, 0.2, 0.05, 0.12),
            SoundCue::Countdown => (800.0, 800.0, 0.1, 0.02, 0.1),
        };
        Tone {
            start_hz,
            end_hz,
            duration,
            attack,
            peak,
        }
    }

    /// Cue for an event, if it has one
    pub fn for_event(event: &SimEvent) -> Option<Self> {
        match event {
            SimEvent::Jumped => Some(SoundCue::Jump),
            SimEvent::Scored { .. } => Some(SoundCue::Score),
            SimEvent::Collected { .. } => Some(SoundCue::Coin),
            SimEvent::Collided { .. } => Some(SoundCue::Collision),
            SimEvent::GameOverReached { .. } => Some(SoundCue::GameOver),
            SimEvent::GameStarted => Some(SoundCue::Start),
            SimEvent::CountdownTick { .. } => Some(SoundCue::Countdown),
        }
    }
}

/// Cues for a batch of events, in event order
pub fn cues_for(events: &[SimEvent]) -> Vec<SoundCue> {
    events.iter().filter_map(SoundCue::for_event).collect()
}

/// Volume and mute state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mixer {
    master_volume: f32,
    muted: bool,
}

impl Default for Mixer {
    fn default() -> Self {
        Self {
            master_volume: 0.7,
            muted: false,
        }
    }
}

impl Mixer {
    pub fn new(master_volume: f32, muted: bool) -> Self {
        let mut mixer = Self {
            master_volume: 0.0,
            muted,
        };
        mixer.set_master_volume(master_volume);
        mixer
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = if vol.is_nan() { 0.0 } else { vol.clamp(0.0, 1.0) };
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn master_volume(&self) -> f32 {
        self.master_volume
    }

    /// Peak gain for a cue, or `None` when it should not play at all
    pub fn gain_for(&self, cue: SoundCue) -> Option<f32> {
        if self.muted || self.master_volume <= 0.0 {
            return None;
        }
        Some(cue.tone().peak * self.master_volume)
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use super::{Mixer, SoundCue, Tone};
    use crate::sim::SimEvent;
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    /// Audio manager for the game
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        pub mixer: Mixer,
    }

    impl AudioManager {
        pub fn new(mixer: Mixer) -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self { ctx, mixer }
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        pub fn play_events(&self, events: &[SimEvent]) {
            for event in events {
                if let Some(cue) = SoundCue::for_event(event) {
                    self.play(cue);
                }
            }
        }

        pub fn play(&self, cue: SoundCue) {
            let Some(peak) = self.mixer.gain_for(cue) else {
                return;
            };
            let Some(ctx) = &self.ctx else { return };

            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }
            if play_tone(ctx, cue.tone(), peak).is_none() {
                log::debug!("Dropped {:?} cue", cue);
            }
        }
    }

    fn create_osc(ctx: &AudioContext, freq: f32) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(OscillatorType::Sine);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    fn play_tone(ctx: &AudioContext, tone: Tone, peak: f32) -> Option<()> {
        let (osc, gain) = create_osc(ctx, tone.start_hz)?;
        let t = ctx.current_time();
        let attack = t + tone.attack as f64;
        let end = t + tone.duration as f64;

        gain.gain().set_value_at_time(0.0, t).ok()?;
        gain.gain().linear_ramp_to_value_at_time(peak, attack).ok()?;
        gain.gain()
            .exponential_ramp_to_value_at_time((peak / 15.0).max(0.0001), end)
            .ok()?;
        osc.frequency().set_value_at_time(tone.start_hz, t).ok()?;
        if tone.end_hz != tone.start_hz {
            osc.frequency()
                .exponential_ramp_to_value_at_time(tone.end_hz, end)
                .ok()?;
        }

        osc.start().ok()?;
        osc.stop_with_when(end).ok()?;
        Some(())
    }
}
