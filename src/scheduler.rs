//! Clock-driven scheduling primitives polled from the main loop.
//!
//! Nothing here owns a thread or a timer: callers pass the current `Instant`
//! and act on what is due. That keeps every tick and every audio step on the
//! loop thread, one at a time.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Shared flag that stops a scheduled sequence once raised.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Rc<Cell<bool>>,
}

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

/// Fixed-period task that fires at most once per poll.
///
/// A stopped task never reports due until `start` is called again.
#[derive(Debug, Clone)]
pub struct PeriodicTask {
    period: Duration,
    next_due: Option<Instant>,
}

impl PeriodicTask {
    #[must_use]
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next_due: None,
        }
    }

    /// Arms the task so the first run is due one period after `now`.
    pub fn start(&mut self, now: Instant) {
        self.next_due = Some(now + self.period);
    }

    /// Arms the task so the first run is due at `now`.
    pub fn start_immediately(&mut self, now: Instant) {
        self.next_due = Some(now);
    }

    pub fn stop(&mut self) {
        self.next_due = None;
    }

    /// Changes the period. Only allowed while stopped so a pending run can
    /// never fire on the old schedule.
    pub fn set_period(&mut self, period: Duration) {
        debug_assert!(!self.is_running(), "stop the task before changing its period");
        self.period = period;
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    /// Returns true when a run is due at `now` and schedules the next one.
    ///
    /// Missed periods are dropped instead of replayed in a burst.
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(due) = self.next_due else {
            return false;
        };

        if now < due {
            return false;
        }

        let mut next = due + self.period;
        if next <= now {
            next = now + self.period;
        }
        self.next_due = Some(next);
        true
    }
}

/// Finite list of one-shot steps at fixed offsets from a start instant.
#[derive(Debug, Clone)]
pub struct OneShotSequence<T> {
    started_at: Instant,
    steps: Vec<(Duration, T)>,
    next_step: usize,
    token: CancellationToken,
}

impl<T: Clone> OneShotSequence<T> {
    /// Schedules `steps` (offset, payload) relative to `now`. Offsets must be
    /// non-decreasing.
    #[must_use]
    pub fn new(now: Instant, steps: Vec<(Duration, T)>, token: CancellationToken) -> Self {
        debug_assert!(steps.windows(2).all(|pair| pair[0].0 <= pair[1].0));

        Self {
            started_at: now,
            steps,
            next_step: 0,
            token,
        }
    }

    /// Returns the payloads that became due since the last poll.
    pub fn poll(&mut self, now: Instant) -> Vec<T> {
        if self.token.is_cancelled() {
            self.next_step = self.steps.len();
            return Vec::new();
        }

        let elapsed = now.saturating_duration_since(self.started_at);
        let mut due = Vec::new();
        while let Some((offset, payload)) = self.steps.get(self.next_step) {
            if *offset > elapsed {
                break;
            }
            due.push(payload.clone());
            self.next_step += 1;
        }

        due
    }

    /// True once every step has fired or the sequence was cancelled.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.token.is_cancelled() || self.next_step >= self.steps.len()
    }
}
