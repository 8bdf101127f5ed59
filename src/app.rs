use std::time::{Duration, Instant};

use tracing::debug;

use crate::audio::{AudioBackend, AudioDirector, Cue};
use crate::config::{SpeedPreset, resolve_tick_interval};
use crate::engine::{EndReason, FrameSnapshot};
use crate::input::{Direction, GameInput};
use crate::score::ScoreStore;
use crate::session::{SessionController, SessionEvent, SessionPhase, TransitionError};

/// Top-level panel shown to the player.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Screen {
    Home,
    Game,
    GameOver,
}

impl Screen {
    /// Panel for a session phase. Paused keeps the board visible.
    #[must_use]
    pub fn for_phase(phase: SessionPhase) -> Self {
        match phase {
            SessionPhase::Idle => Self::Home,
            SessionPhase::Running | SessionPhase::Paused => Self::Game,
            SessionPhase::Over => Self::GameOver,
        }
    }
}

/// What the renderer needs beyond the live session: current panel, last
/// frame and the outcome of the last run.
#[derive(Debug, Clone)]
pub struct ScreenState {
    pub screen: Screen,
    pub frame: Option<FrameSnapshot>,
    pub new_record: bool,
    pub final_score: u32,
    pub end_reason: Option<EndReason>,
}

impl Default for ScreenState {
    fn default() -> Self {
        Self {
            screen: Screen::Home,
            frame: None,
            new_record: false,
            final_score: 0,
            end_reason: None,
        }
    }
}

impl ScreenState {
    pub fn on_event(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::PhaseChanged(phase) => {
                let screen = Screen::for_phase(*phase);
                if screen != self.screen {
                    debug!(?screen, "switching screen");
                }
                if *phase == SessionPhase::Running && self.screen != Screen::Game {
                    self.new_record = false;
                    self.end_reason = None;
                }
                self.screen = screen;
            }
            SessionEvent::FrameReady(frame) => self.frame = Some(frame.clone()),
            SessionEvent::TerminalCollision(reason) => self.end_reason = Some(*reason),
            SessionEvent::NewRecord { score } => {
                self.new_record = true;
                self.final_score = *score;
                self.end_reason.get_or_insert(EndReason::BoardFilled);
            }
            SessionEvent::GameEnded { score } => {
                self.new_record = false;
                self.final_score = *score;
                self.end_reason.get_or_insert(EndReason::BoardFilled);
            }
            SessionEvent::Click | SessionEvent::FoodConsumed => {}
        }
    }
}

/// Wires input, the session controller and the presentation collaborators.
pub struct App<S: ScoreStore, B: AudioBackend> {
    pub session: SessionController<S>,
    pub audio: AudioDirector<B>,
    pub screens: ScreenState,
    pub selected_speed: SpeedPreset,
    tick_override: Option<u64>,
    quit: bool,
}

impl<S: ScoreStore, B: AudioBackend> App<S, B> {
    #[must_use]
    pub fn new(
        session: SessionController<S>,
        audio: AudioDirector<B>,
        selected_speed: SpeedPreset,
        tick_override: Option<u64>,
    ) -> Self {
        Self {
            session,
            audio,
            screens: ScreenState::default(),
            selected_speed,
            tick_override,
            quit: false,
        }
    }

    /// Applies one input according to the visible screen.
    pub fn handle_input(&mut self, input: GameInput, now: Instant) {
        match input {
            GameInput::Quit => self.quit = true,
            GameInput::ToggleMusic => self.audio.toggle_music(now),
            GameInput::ToggleSfx => self.audio.toggle_sfx(now),
            GameInput::VolumeUp => self.audio.volume_up(),
            GameInput::VolumeDown => self.audio.volume_down(),
            other => {
                let result = match self.screens.screen {
                    Screen::Home => {
                        self.handle_home_input(other, now);
                        Ok(())
                    }
                    Screen::Game => self.handle_game_input(other, now),
                    Screen::GameOver => self.handle_game_over_input(other, now),
                };
                if let Err(error) = result {
                    debug!(%error, ?other, "input ignored");
                }
            }
        }

        self.dispatch(now);
    }

    /// Runs a due tick, forwards its events and advances queued audio.
    pub fn update(&mut self, now: Instant) {
        self.session.poll(now);
        self.dispatch(now);
        self.audio.update(now);
    }

    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Tick period the next session started from the home screen would use.
    #[must_use]
    pub fn selected_tick_interval(&self) -> Duration {
        resolve_tick_interval(self.selected_speed, self.tick_override)
    }

    fn handle_home_input(&mut self, input: GameInput, now: Instant) {
        match input {
            GameInput::Direction(Direction::Up | Direction::Left) => {
                self.selected_speed = self.selected_speed.step(false);
            }
            GameInput::Direction(Direction::Down | Direction::Right) => {
                self.selected_speed = self.selected_speed.step(true);
            }
            GameInput::Confirm => {
                let interval = self.selected_tick_interval();
                self.session.start(interval, now);
            }
            GameInput::Back => self.quit = true,
            _ => {}
        }
    }

    fn handle_game_input(&mut self, input: GameInput, now: Instant) -> Result<(), TransitionError> {
        match input {
            GameInput::Direction(direction) => self.session.steer(direction).map(|_| ()),
            GameInput::Pause => self.session.toggle_pause(now),
            GameInput::Tap => {
                if self.session.phase() == SessionPhase::Running {
                    self.audio.cue(Cue::Click, now);
                }
                Ok(())
            }
            GameInput::Back => {
                self.session.exit();
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn handle_game_over_input(
        &mut self,
        input: GameInput,
        now: Instant,
    ) -> Result<(), TransitionError> {
        match input {
            GameInput::Confirm => self.session.replay(now),
            GameInput::Back => {
                self.session.exit();
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn dispatch(&mut self, now: Instant) {
        for event in self.session.drain_events() {
            self.audio.handle(&event, now);
            self.screens.on_event(&event);
        }
    }
}
