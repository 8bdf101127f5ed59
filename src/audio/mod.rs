//! Sound cues and background music.
//!
//! Cues are rendered to PCM on demand and handed to an [`AudioBackend`].
//! Multi-note cues and the music loop are driven by the loop-thread
//! scheduler, so `AudioDirector::update` must be called every frame.

pub mod synth;

#[cfg(feature = "audio")]
mod rodio_backend;

use std::time::Instant;

use thiserror::Error;
use tracing::{debug, warn};

use crate::scheduler::{CancellationToken, OneShotSequence, PeriodicTask};
use crate::session::{SessionEvent, SessionPhase};

use self::synth::{MUSIC_NOTE_PERIOD, Tone};

#[cfg(feature = "audio")]
pub use self::rodio_backend::RodioBackend;

/// Master volume step for one volume key press.
const VOLUME_STEP: u8 = 10;

/// Audio output could not be opened.
#[derive(Debug, Error)]
pub enum AudioError {
    #[cfg(feature = "audio")]
    #[error("no audio output device: {0}")]
    NoDevice(#[from] rodio::StreamError),
    #[error("built without audio support")]
    Unsupported,
}

/// Discrete sound effects.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Cue {
    Click,
    FoodConsumed,
    TerminalCollision,
    NewRecord,
}

/// Sink for rendered mono samples at [`synth::SAMPLE_RATE`].
pub trait AudioBackend {
    /// Plays `samples` without blocking. Failures are dropped silently.
    fn play(&mut self, samples: Vec<f32>);
}

impl AudioBackend for Box<dyn AudioBackend> {
    fn play(&mut self, samples: Vec<f32>) {
        (**self).play(samples);
    }
}

/// Discards everything; used when no output device is available.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentBackend;

impl AudioBackend for SilentBackend {
    fn play(&mut self, _samples: Vec<f32>) {}
}

/// Opens the default output device.
pub fn open_backend() -> Result<Box<dyn AudioBackend>, AudioError> {
    #[cfg(feature = "audio")]
    {
        let backend = RodioBackend::open()?;
        Ok(Box::new(backend))
    }

    #[cfg(not(feature = "audio"))]
    {
        Err(AudioError::Unsupported)
    }
}

/// User-adjustable audio switches.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct AudioSettings {
    pub music_enabled: bool,
    pub sfx_enabled: bool,
    /// Master volume, 0..=100.
    pub volume: u8,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            music_enabled: true,
            sfx_enabled: true,
            volume: 70,
        }
    }
}

impl AudioSettings {
    fn gain(self) -> f32 {
        f32::from(self.volume.min(100)) / 100.0
    }
}

/// Maps session events to cues and runs the music loop.
pub struct AudioDirector<B: AudioBackend> {
    backend: B,
    available: bool,
    settings: AudioSettings,
    music: PeriodicTask,
    music_wanted: bool,
    note_index: usize,
    fanfares: Vec<OneShotSequence<Tone>>,
    fanfare_token: CancellationToken,
}

impl<B: AudioBackend> AudioDirector<B> {
    #[must_use]
    pub fn new(backend: B, settings: AudioSettings) -> Self {
        Self {
            backend,
            available: true,
            settings,
            music: PeriodicTask::new(MUSIC_NOTE_PERIOD),
            music_wanted: false,
            note_index: 0,
            fanfares: Vec::new(),
            fanfare_token: CancellationToken::new(),
        }
    }

    /// Director over a backend that produces no sound.
    #[must_use]
    pub fn degraded(backend: B, settings: AudioSettings) -> Self {
        Self {
            available: false,
            ..Self::new(backend, settings)
        }
    }

    /// Reacts to one session event.
    pub fn handle(&mut self, event: &SessionEvent, now: Instant) {
        match event {
            SessionEvent::Click => self.cue(Cue::Click, now),
            SessionEvent::FoodConsumed => self.cue(Cue::FoodConsumed, now),
            SessionEvent::TerminalCollision(_) => self.cue(Cue::TerminalCollision, now),
            SessionEvent::NewRecord { .. } => self.cue(Cue::NewRecord, now),
            SessionEvent::PhaseChanged(SessionPhase::Running) => {
                self.cancel_fanfares();
                self.start_music(now);
            }
            SessionEvent::PhaseChanged(SessionPhase::Idle) => {
                self.cancel_fanfares();
                self.stop_music();
            }
            SessionEvent::PhaseChanged(SessionPhase::Paused | SessionPhase::Over) => {
                self.stop_music();
            }
            SessionEvent::GameEnded { .. } | SessionEvent::FrameReady(_) => {}
        }
    }

    /// Plays `cue` unless sound effects are switched off.
    pub fn cue(&mut self, cue: Cue, now: Instant) {
        if !self.settings.sfx_enabled {
            return;
        }

        match cue {
            Cue::Click => self.play(&synth::CLICK),
            Cue::FoodConsumed => self.play(&synth::EAT),
            Cue::TerminalCollision => self.play(&synth::GAME_OVER),
            Cue::NewRecord => {
                let mut sequence =
                    OneShotSequence::new(now, synth::fanfare(), self.fanfare_token.clone());
                for note in sequence.poll(now) {
                    self.play(&note);
                }
                self.fanfares.push(sequence);
            }
        }
    }

    /// Plays whatever music notes and fanfare steps are due at `now`.
    pub fn update(&mut self, now: Instant) {
        if self.music.poll(now) {
            let note = synth::music_note(self.note_index);
            self.note_index = self.note_index.wrapping_add(1);
            self.play(&note);
        }

        let mut due = Vec::new();
        for sequence in &mut self.fanfares {
            due.extend(sequence.poll(now));
        }
        self.fanfares.retain(|sequence| !sequence.is_finished());
        for note in due {
            self.play(&note);
        }
    }

    pub fn toggle_music(&mut self, now: Instant) {
        self.settings.music_enabled = !self.settings.music_enabled;
        debug!(enabled = self.settings.music_enabled, "music toggled");

        if self.settings.music_enabled && self.music_wanted {
            self.music.start_immediately(now);
        } else {
            self.music.stop();
        }
        self.cue(Cue::Click, now);
    }

    pub fn toggle_sfx(&mut self, now: Instant) {
        self.settings.sfx_enabled = !self.settings.sfx_enabled;
        debug!(enabled = self.settings.sfx_enabled, "sound effects toggled");
        self.cue(Cue::Click, now);
    }

    pub fn volume_up(&mut self) {
        self.settings.volume = self.settings.volume.saturating_add(VOLUME_STEP).min(100);
    }

    pub fn volume_down(&mut self) {
        self.settings.volume = self.settings.volume.saturating_sub(VOLUME_STEP);
    }

    #[must_use]
    pub fn settings(&self) -> AudioSettings {
        self.settings
    }

    /// False when running without an output device.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.available
    }

    #[must_use]
    pub fn is_music_playing(&self) -> bool {
        self.music.is_running()
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn start_music(&mut self, now: Instant) {
        self.music_wanted = true;
        if self.settings.music_enabled && !self.music.is_running() {
            self.note_index = 0;
            self.music.start_immediately(now);
        }
    }

    fn stop_music(&mut self) {
        self.music_wanted = false;
        self.music.stop();
    }

    fn cancel_fanfares(&mut self) {
        if self.fanfares.is_empty() {
            return;
        }

        self.fanfare_token.cancel();
        self.fanfares.clear();
        self.fanfare_token = CancellationToken::new();
    }

    fn play(&mut self, tone: &Tone) {
        if !self.available {
            return;
        }

        self.backend.play(synth::render(tone, self.settings.gain()));
    }
}

/// Opens the output device, falling back to a silent director.
///
/// The failure is logged once here and never surfaces again.
#[must_use]
pub fn director_with_default_output(
    settings: AudioSettings,
) -> AudioDirector<Box<dyn AudioBackend>> {
    match open_backend() {
        Ok(backend) => AudioDirector::new(backend, settings),
        Err(error) => {
            warn!(%error, "audio unavailable, continuing without sound");
            AudioDirector::degraded(Box::new(SilentBackend), settings)
        }
    }
}
