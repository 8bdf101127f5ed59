use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::DEFAULT_HEADING;
use crate::food::place_food;
use crate::grid::{Cell, GridSize};
use crate::snake::{Snake, would_collide};

/// Whether moving into the cell the tail is about to vacate counts as a hit.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum CollisionPolicy {
    /// The vacating tail is not an obstacle.
    #[default]
    TailVacates,
    /// The whole pre-move body, tail included, is an obstacle.
    TailBlocks,
}

/// Why a run of the tick engine ended.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum EndReason {
    WallCollision,
    SelfCollision,
    /// The snake covers every cell, so no food can be placed.
    BoardFilled,
}

/// Result of one tick.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum TickOutcome {
    /// The snake moved one cell; `ate` is true when it grew this tick.
    Moved { ate: bool },
    /// The head hit a wall or the body. State is left as it was before the tick.
    Collided(EndReason),
    /// The snake ate the last food and now fills the board.
    BoardFilled,
}

/// Immutable post-tick view handed to the renderer.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FrameSnapshot {
    pub snake: Vec<Cell>,
    /// `None` once the snake covers every cell.
    pub food: Option<Cell>,
}

/// Snake, food and score for one session.
#[derive(Debug, Clone)]
pub struct TickEngine {
    pub snake: Snake,
    pub food: Cell,
    pub score: u32,
    pub tick_count: u64,
    bounds: GridSize,
    policy: CollisionPolicy,
    rng: StdRng,
}

impl TickEngine {
    /// Creates a fresh session state: one-cell snake in the grid centre,
    /// default heading, random food.
    #[must_use]
    pub fn new(bounds: GridSize, policy: CollisionPolicy, mut rng: StdRng) -> Self {
        let start = Cell {
            x: i32::from(bounds.width / 2),
            y: i32::from(bounds.height / 2),
        };
        let snake = Snake::new(start, DEFAULT_HEADING);
        let food = place_food(&mut rng, bounds, &snake).unwrap_or(start);

        Self {
            snake,
            food,
            score: 0,
            tick_count: 0,
            bounds,
            policy,
            rng,
        }
    }

    /// Creates a deterministic state for tests and reproducible simulations.
    #[must_use]
    pub fn new_with_seed(bounds: GridSize, policy: CollisionPolicy, seed: u64) -> Self {
        Self::new(bounds, policy, StdRng::seed_from_u64(seed))
    }

    /// Advances the snake by one cell.
    pub fn tick(&mut self) -> TickOutcome {
        let direction = self.snake.commit_pending();
        let head = self.snake.advance(direction);

        let collided = match self.policy {
            CollisionPolicy::TailVacates => {
                would_collide(head, self.bounds, self.snake.segments_without_tail())
            }
            CollisionPolicy::TailBlocks => would_collide(head, self.bounds, self.snake.segments()),
        };
        if collided {
            let reason = if head.is_within_bounds(self.bounds) {
                EndReason::SelfCollision
            } else {
                EndReason::WallCollision
            };
            return TickOutcome::Collided(reason);
        }

        self.tick_count += 1;
        self.snake.push_head(head);

        if head != self.food {
            self.snake.drop_tail();
            return TickOutcome::Moved { ate: false };
        }

        self.score += 1;
        match place_food(&mut self.rng, self.bounds, &self.snake) {
            Some(food) => {
                self.food = food;
                TickOutcome::Moved { ate: true }
            }
            None => TickOutcome::BoardFilled,
        }
    }

    /// Snapshot of the current snake and food.
    #[must_use]
    pub fn frame(&self) -> FrameSnapshot {
        FrameSnapshot {
            snake: self.snake.to_vec(),
            food: (!self.snake.occupies(self.food)).then_some(self.food),
        }
    }

    #[must_use]
    pub fn bounds(&self) -> GridSize {
        self.bounds
    }
}
