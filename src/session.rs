use std::mem;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::engine::{CollisionPolicy, EndReason, FrameSnapshot, TickEngine, TickOutcome};
use crate::grid::GridSize;
use crate::input::Direction;
use crate::scheduler::PeriodicTask;
use crate::score::ScoreStore;

/// Lifecycle phase of the session controller.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SessionPhase {
    Idle,
    Running,
    Paused,
    Over,
}

/// Notifications for the presentation collaborators, in emission order.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum SessionEvent {
    Click,
    FoodConsumed,
    TerminalCollision(EndReason),
    NewRecord { score: u32 },
    GameEnded { score: u32 },
    FrameReady(FrameSnapshot),
    PhaseChanged(SessionPhase),
}

/// An operation was requested in a phase that does not allow it.
/// The controller state is unchanged when this is returned.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Error)]
#[error("cannot {operation} while the session is {phase:?}")]
pub struct TransitionError {
    pub operation: &'static str,
    pub phase: SessionPhase,
}

/// Fixed parameters shared by every run of a controller.
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    pub bounds: GridSize,
    pub policy: CollisionPolicy,
    /// Seed for food placement; `None` draws from OS entropy.
    pub seed: Option<u64>,
}

/// Owns the session phase, the best score and the tick schedule.
pub struct SessionController<S: ScoreStore> {
    phase: SessionPhase,
    best_score: u32,
    store: S,
    config: SessionConfig,
    engine: Option<TickEngine>,
    schedule: PeriodicTask,
    speed: Duration,
    seeder: StdRng,
    events: Vec<SessionEvent>,
}

impl<S: ScoreStore> SessionController<S> {
    /// Creates an idle controller and loads the best score from `store`.
    ///
    /// A failing store degrades to a best score of 0.
    pub fn new(store: S, config: SessionConfig, speed: Duration) -> Self {
        let best_score = match store.load_best_score() {
            Ok(best) => best,
            Err(error) => {
                warn!(%error, "best score unavailable, starting from 0");
                0
            }
        };
        let seeder = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            phase: SessionPhase::Idle,
            best_score,
            store,
            config,
            engine: None,
            schedule: PeriodicTask::new(speed),
            speed,
            seeder,
            events: Vec::new(),
        }
    }

    /// Begins a new run at `speed` per tick. Valid from any phase.
    pub fn start(&mut self, speed: Duration, now: Instant) {
        self.schedule.stop();
        self.schedule.set_period(speed);
        self.speed = speed;

        let rng = StdRng::seed_from_u64(self.seeder.r#gen());
        let engine = TickEngine::new(self.config.bounds, self.config.policy, rng);
        let frame = engine.frame();
        self.engine = Some(engine);

        info!(speed_ms = speed.as_millis() as u64, "session started");
        self.events.push(SessionEvent::Click);
        self.set_phase(SessionPhase::Running);
        self.events.push(SessionEvent::FrameReady(frame));
        self.schedule.start(now);
    }

    /// Stops the tick schedule, keeping snake, food and score.
    pub fn pause(&mut self) -> Result<(), TransitionError> {
        self.require(SessionPhase::Running, "pause")?;

        self.schedule.stop();
        self.set_phase(SessionPhase::Paused);
        Ok(())
    }

    /// Restarts the tick schedule at the current speed.
    pub fn resume(&mut self, now: Instant) -> Result<(), TransitionError> {
        self.require(SessionPhase::Paused, "resume")?;

        self.schedule.start(now);
        self.set_phase(SessionPhase::Running);
        Ok(())
    }

    /// Pauses a running session or resumes a paused one.
    pub fn toggle_pause(&mut self, now: Instant) -> Result<(), TransitionError> {
        match self.phase {
            SessionPhase::Running => self.pause(),
            SessionPhase::Paused => self.resume(now),
            phase => Err(TransitionError {
                operation: "toggle pause",
                phase,
            }),
        }
    }

    /// Starts a new run at the last used speed.
    pub fn replay(&mut self, now: Instant) -> Result<(), TransitionError> {
        self.require(SessionPhase::Over, "replay")?;

        self.start(self.speed, now);
        Ok(())
    }

    /// Abandons any run and returns to idle. Valid from any phase.
    pub fn exit(&mut self) {
        self.schedule.stop();
        self.engine = None;
        self.events.push(SessionEvent::Click);

        if self.phase != SessionPhase::Idle {
            debug!(from = ?self.phase, "session exited");
            self.set_phase(SessionPhase::Idle);
        }
    }

    /// Queues a heading for the next tick.
    ///
    /// Returns `Ok(false)` when the heading would reverse the snake.
    pub fn steer(&mut self, direction: Direction) -> Result<bool, TransitionError> {
        self.require(SessionPhase::Running, "steer")?;
        let phase = self.phase;
        let Some(engine) = self.engine.as_mut() else {
            return Err(TransitionError {
                operation: "steer",
                phase,
            });
        };

        let accepted = engine.snake.set_pending(direction);
        if !accepted {
            debug!(?direction, "reversal rejected");
        }
        self.events.push(SessionEvent::Click);
        Ok(accepted)
    }

    /// Runs a tick when one is due at `now`. Returns true when a tick ran.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.phase != SessionPhase::Running || !self.schedule.poll(now) {
            return false;
        }

        self.step().is_ok()
    }

    /// Runs exactly one tick regardless of the schedule.
    pub fn step(&mut self) -> Result<TickOutcome, TransitionError> {
        self.require(SessionPhase::Running, "tick")?;
        let phase = self.phase;
        let Some(engine) = self.engine.as_mut() else {
            return Err(TransitionError {
                operation: "tick",
                phase,
            });
        };

        let outcome = engine.tick();
        match outcome {
            TickOutcome::Moved { ate } => {
                if ate {
                    self.events.push(SessionEvent::FoodConsumed);
                }
                self.events.push(SessionEvent::FrameReady(engine.frame()));
            }
            TickOutcome::BoardFilled => {
                self.events.push(SessionEvent::FoodConsumed);
                self.events.push(SessionEvent::FrameReady(engine.frame()));
                self.finish(EndReason::BoardFilled);
            }
            TickOutcome::Collided(reason) => {
                self.events.push(SessionEvent::TerminalCollision(reason));
                self.finish(reason);
            }
        }

        Ok(outcome)
    }

    fn finish(&mut self, reason: EndReason) {
        self.schedule.stop();
        let score = self.score();
        let ticks = self.engine.as_ref().map_or(0, |engine| engine.tick_count);

        if score > self.best_score {
            self.best_score = score;
            if let Err(error) = self.store.save_best_score(score) {
                warn!(%error, score, "failed to persist best score");
            }
            info!(score, ticks, ?reason, "session over with a new record");
            self.events.push(SessionEvent::NewRecord { score });
        } else {
            info!(score, ticks, ?reason, "session over");
            self.events.push(SessionEvent::GameEnded { score });
        }

        self.events.push(SessionEvent::Click);
        self.set_phase(SessionPhase::Over);
    }

    /// Removes and returns every event emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        mem::take(&mut self.events)
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn best_score(&self) -> u32 {
        self.best_score
    }

    /// Score of the current or last run; 0 when idle.
    #[must_use]
    pub fn score(&self) -> u32 {
        self.engine.as_ref().map_or(0, |engine| engine.score)
    }

    /// Tick period of the current or last run.
    #[must_use]
    pub fn speed(&self) -> Duration {
        self.speed
    }

    #[must_use]
    pub fn engine(&self) -> Option<&TickEngine> {
        self.engine.as_ref()
    }

    /// Mutable access for scripted setups; does not touch the schedule.
    pub fn engine_mut(&mut self) -> Option<&mut TickEngine> {
        self.engine.as_mut()
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn config(&self) -> SessionConfig {
        self.config
    }

    fn set_phase(&mut self, phase: SessionPhase) {
        debug!(from = ?self.phase, to = ?phase, "phase change");
        self.phase = phase;
        self.events.push(SessionEvent::PhaseChanged(phase));
    }

    fn require(
        &self,
        expected: SessionPhase,
        operation: &'static str,
    ) -> Result<(), TransitionError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(self.transition_error(operation))
        }
    }

    fn transition_error(&self, operation: &'static str) -> TransitionError {
        TransitionError {
            operation,
            phase: self.phase,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use crate::engine::{CollisionPolicy, EndReason, FrameSnapshot, TickOutcome};
    use crate::grid::{Cell, GridSize};
    use crate::input::Direction;
    use crate::score::{MemoryScoreStore, ScoreStore, StoreError};
    use crate::snake::Snake;

    use super::{SessionConfig, SessionController, SessionEvent, SessionPhase, TransitionError};

    const SPEED: Duration = Duration::from_millis(100);

    fn config() -> SessionConfig {
        SessionConfig {
            bounds: GridSize::square(20),
            policy: CollisionPolicy::default(),
            seed: Some(99),
        }
    }

    fn controller(best: u32) -> SessionController<MemoryScoreStore> {
        SessionController::new(MemoryScoreStore::with_best(best), config(), SPEED)
    }

    fn crash_into_left_wall(session: &mut SessionController<MemoryScoreStore>, score: u32) {
        let engine = session.engine_mut().expect("running session has an engine");
        engine.snake = Snake::new(Cell::new(0, 0), Direction::Left);
        engine.score = score;
        assert_eq!(
            session.step(),
            Ok(TickOutcome::Collided(EndReason::WallCollision))
        );
    }

    struct BrokenStore;

    impl ScoreStore for BrokenStore {
        fn load_best_score(&self) -> Result<u32, StoreError> {
            Err(StoreError::Io(std::io::Error::other("unavailable")))
        }

        fn save_best_score(&mut self, _score: u32) -> Result<(), StoreError> {
            Err(StoreError::Io(std::io::Error::other("unavailable")))
        }
    }

    #[test]
    fn new_controller_is_idle_with_loaded_best() {
        let session = controller(12);

        assert_eq!(session.phase(), SessionPhase::Idle);
        assert_eq!(session.best_score(), 12);
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn start_resets_run_and_announces_running() {
        let mut session = controller(0);
        let now = Instant::now();

        session.start(SPEED, now);
        let events = session.drain_events();

        assert_eq!(session.phase(), SessionPhase::Running);
        assert_eq!(session.score(), 0);
        let engine = session.engine().expect("engine after start");
        assert_eq!(engine.snake.to_vec(), vec![Cell::new(10, 10)]);
        assert_eq!(engine.snake.direction(), Direction::Right);
        assert!(events.contains(&SessionEvent::PhaseChanged(SessionPhase::Running)));
        assert!(matches!(events.last(), Some(SessionEvent::FrameReady(_))));
    }

    #[test]
    fn poll_ticks_once_per_period() {
        let mut session = controller(0);
        let now = Instant::now();
        session.start(SPEED, now);

        assert!(!session.poll(now + Duration::from_millis(50)));
        assert!(session.poll(now + SPEED));
        assert_eq!(
            session.engine().map(|engine| engine.snake.head()),
            Some(Cell::new(11, 10))
        );
    }

    #[test]
    fn invalid_transitions_are_rejected_without_side_effects() {
        let mut session = controller(0);
        let now = Instant::now();

        assert_eq!(
            session.resume(now),
            Err(TransitionError {
                operation: "resume",
                phase: SessionPhase::Idle
            })
        );
        assert!(session.pause().is_err());
        assert!(session.replay(now).is_err());
        assert!(session.steer(Direction::Up).is_err());
        assert!(session.step().is_err());
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert!(session.drain_events().is_empty());

        session.start(SPEED, now);
        assert!(session.resume(now).is_err());
        assert_eq!(session.phase(), SessionPhase::Running);
    }

    #[test]
    fn pause_then_resume_keeps_state() {
        let mut session = controller(0);
        let now = Instant::now();
        session.start(SPEED, now);
        let before = session.engine().map(|engine| (engine.frame(), engine.score));

        session.pause().expect("pause from running");
        assert_eq!(session.phase(), SessionPhase::Paused);
        assert!(!session.poll(now + SPEED * 5));

        session.resume(now + SPEED * 5).expect("resume from paused");
        let after = session.engine().map(|engine| (engine.frame(), engine.score));

        assert_eq!(session.phase(), SessionPhase::Running);
        assert_eq!(before, after);
    }

    #[test]
    fn steering_while_paused_is_rejected() {
        let mut session = controller(0);
        session.start(SPEED, Instant::now());
        session.pause().expect("pause from running");

        assert!(session.steer(Direction::Up).is_err());
        assert_eq!(
            session.engine().map(|engine| engine.snake.pending_direction()),
            Some(Direction::Right)
        );
    }

    #[test]
    fn reversal_is_refused_but_turn_is_queued() {
        let mut session = controller(0);
        session.start(SPEED, Instant::now());

        assert_eq!(session.steer(Direction::Left), Ok(false));
        assert_eq!(session.steer(Direction::Down), Ok(true));
    }

    #[test]
    fn beating_best_score_records_and_persists() {
        let mut session = controller(5);
        session.start(SPEED, Instant::now());
        session.drain_events();

        crash_into_left_wall(&mut session, 7);
        let events = session.drain_events();

        assert_eq!(session.phase(), SessionPhase::Over);
        assert_eq!(session.best_score(), 7);
        assert_eq!(session.store().saves(), 1);
        assert_eq!(
            events,
            vec![
                SessionEvent::TerminalCollision(EndReason::WallCollision),
                SessionEvent::NewRecord { score: 7 },
                SessionEvent::Click,
                SessionEvent::PhaseChanged(SessionPhase::Over),
            ]
        );
    }

    #[test]
    fn lower_score_ends_without_record() {
        let mut session = controller(5);
        session.start(SPEED, Instant::now());
        session.drain_events();

        crash_into_left_wall(&mut session, 3);
        let events = session.drain_events();

        assert_eq!(session.best_score(), 5);
        assert_eq!(session.store().saves(), 0);
        assert!(events.contains(&SessionEvent::GameEnded { score: 3 }));
    }

    #[test]
    fn best_score_never_decreases_across_sessions() {
        let mut session = controller(0);
        let mut previous_best = session.best_score();

        for score in [4, 2, 9, 0, 9, 11] {
            session.start(SPEED, Instant::now());
            crash_into_left_wall(&mut session, score);

            assert!(session.best_score() >= previous_best);
            previous_best = session.best_score();
        }

        assert_eq!(previous_best, 11);
    }

    #[test]
    fn game_over_stops_ticking() {
        let mut session = controller(0);
        let now = Instant::now();
        session.start(SPEED, now);
        crash_into_left_wall(&mut session, 0);

        assert!(!session.poll(now + SPEED * 10));
        assert!(session.step().is_err());
    }

    #[test]
    fn replay_reuses_last_speed() {
        let mut session = controller(0);
        let now = Instant::now();
        let slow = Duration::from_millis(150);
        session.start(slow, now);
        crash_into_left_wall(&mut session, 1);

        session.replay(now).expect("replay from over");

        assert_eq!(session.phase(), SessionPhase::Running);
        assert_eq!(session.speed(), slow);
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn exit_returns_to_idle_and_keeps_best() {
        let mut session = controller(3);
        session.start(SPEED, Instant::now());
        crash_into_left_wall(&mut session, 8);

        session.exit();

        assert_eq!(session.phase(), SessionPhase::Idle);
        assert_eq!(session.best_score(), 8);
        assert!(session.engine().is_none());
    }

    #[test]
    fn broken_store_degrades_to_unremembered_best() {
        let mut session = SessionController::new(BrokenStore, config(), SPEED);
        assert_eq!(session.best_score(), 0);

        session.start(SPEED, Instant::now());
        let engine = session.engine_mut().expect("engine after start");
        engine.snake = Snake::new(Cell::new(19, 0), Direction::Right);
        engine.score = 2;
        session.step().expect("tick while running");

        assert_eq!(session.phase(), SessionPhase::Over);
        assert_eq!(session.best_score(), 2);
    }

    #[test]
    fn full_board_ends_with_record_handling() {
        let mut session = SessionController::new(
            MemoryScoreStore::default(),
            SessionConfig {
                bounds: GridSize {
                    width: 2,
                    height: 1,
                },
                ..config()
            },
            SPEED,
        );
        session.start(SPEED, Instant::now());
        session.drain_events();
        let engine = session.engine_mut().expect("engine after start");
        engine.snake = Snake::new(Cell::new(0, 0), Direction::Right);
        engine.food = Cell::new(1, 0);

        assert_eq!(session.step(), Ok(TickOutcome::BoardFilled));

        assert_eq!(session.phase(), SessionPhase::Over);
        assert_eq!(session.best_score(), 1);
        assert_eq!(session.store().saves(), 1);
        assert_eq!(
            session.drain_events(),
            vec![
                SessionEvent::FoodConsumed,
                SessionEvent::FrameReady(FrameSnapshot {
                    snake: vec![Cell::new(1, 0), Cell::new(0, 0)],
                    food: None,
                }),
                SessionEvent::NewRecord { score: 1 },
                SessionEvent::Click,
                SessionEvent::PhaseChanged(SessionPhase::Over),
            ]
        );
    }

    #[test]
    fn every_ending_clicks_before_switching_screens() {
        let mut session = controller(10);
        session.start(SPEED, Instant::now());
        session.drain_events();

        crash_into_left_wall(&mut session, 0);

        assert_eq!(
            session.drain_events(),
            vec![
                SessionEvent::TerminalCollision(EndReason::WallCollision),
                SessionEvent::GameEnded { score: 0 },
                SessionEvent::Click,
                SessionEvent::PhaseChanged(SessionPhase::Over),
            ]
        );
    }
}
