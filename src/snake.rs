use std::collections::VecDeque;

use crate::grid::{Cell, GridSize};
use crate::input::{Direction, direction_change_is_valid};

/// Snake body plus its current and pending headings.
///
/// The pending slot holds the latest accepted steering input and is committed
/// once at the top of each tick, so the last write before a tick boundary wins.
#[derive(Debug, Clone)]
pub struct Snake {
    body: VecDeque<Cell>,
    direction: Direction,
    pending_direction: Direction,
}

impl Snake {
    /// Creates a one-cell snake at `start` heading in `direction`.
    #[must_use]
    pub fn new(start: Cell, direction: Direction) -> Self {
        let mut body = VecDeque::new();
        body.push_front(start);

        Self {
            body,
            direction,
            pending_direction: direction,
        }
    }

    /// Creates a snake from explicit body segments (front is head).
    #[must_use]
    pub fn from_segments(segments: Vec<Cell>, direction: Direction) -> Self {
        debug_assert!(!segments.is_empty(), "snake needs at least one segment");

        Self {
            body: VecDeque::from(segments),
            direction,
            pending_direction: direction,
        }
    }

    /// Stores `direction` as the heading for the next tick.
    ///
    /// Returns `false` and leaves the slot untouched when `direction` reverses
    /// the current heading.
    pub fn set_pending(&mut self, direction: Direction) -> bool {
        if !direction_change_is_valid(self.direction, direction) {
            return false;
        }

        self.pending_direction = direction;
        true
    }

    /// Promotes the pending heading to the current one and returns it.
    pub fn commit_pending(&mut self) -> Direction {
        self.direction = self.pending_direction;
        self.direction
    }

    /// Head position after one step in `direction`. Does not mutate the snake.
    #[must_use]
    pub fn advance(&self, direction: Direction) -> Cell {
        self.head().step(direction)
    }

    pub(crate) fn push_head(&mut self, cell: Cell) {
        self.body.push_front(cell);
    }

    pub(crate) fn drop_tail(&mut self) {
        if self.body.len() > 1 {
            let _ = self.body.pop_back();
        }
    }

    /// Returns the current head position.
    #[must_use]
    pub fn head(&self) -> Cell {
        *self
            .body
            .front()
            .expect("snake body must always contain at least one segment")
    }

    /// Returns true if any segment occupies `cell`.
    #[must_use]
    pub fn occupies(&self, cell: Cell) -> bool {
        self.body.contains(&cell)
    }

    /// Body segments excluding the tail, which vacates on a non-growing move.
    pub fn segments_without_tail(&self) -> impl Iterator<Item = &Cell> {
        self.body.iter().take(self.body.len().saturating_sub(1))
    }

    /// Returns current segment count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Returns true when there are no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Returns the heading applied on the last tick.
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Returns the heading queued for the next tick.
    #[must_use]
    pub fn pending_direction(&self) -> Direction {
        self.pending_direction
    }

    /// Iterates over body segments from head to tail.
    pub fn segments(&self) -> impl Iterator<Item = &Cell> {
        self.body.iter()
    }

    /// Copies the body into a head-first vector.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Cell> {
        self.body.iter().copied().collect()
    }
}

/// Returns true when `head` leaves `bounds` or lands on a cell of `body`.
#[must_use]
pub fn would_collide<'a, I>(head: Cell, bounds: GridSize, body: I) -> bool
where
    I: IntoIterator<Item = &'a Cell>,
{
    !head.is_within_bounds(bounds) || body.into_iter().any(|segment| *segment == head)
}

#[cfg(test)]
mod tests {
    use crate::grid::{Cell, GridSize};
    use crate::input::Direction;

    use super::{Snake, would_collide};

    #[test]
    fn advance_is_pure() {
        let snake = Snake::new(Cell::new(5, 5), Direction::Right);

        assert_eq!(snake.advance(Direction::Right), Cell::new(6, 5));
        assert_eq!(snake.head(), Cell::new(5, 5));
        assert_eq!(snake.len(), 1);
    }

    #[test]
    fn pending_rejects_reverse_of_current() {
        let mut snake = Snake::new(Cell::new(5, 5), Direction::Right);

        assert!(!snake.set_pending(Direction::Left));
        assert_eq!(snake.pending_direction(), Direction::Right);

        assert!(snake.set_pending(Direction::Down));
        assert_eq!(snake.pending_direction(), Direction::Down);
    }

    #[test]
    fn pending_is_last_writer_wins() {
        let mut snake = Snake::new(Cell::new(5, 5), Direction::Right);

        assert!(snake.set_pending(Direction::Up));
        assert!(snake.set_pending(Direction::Down));

        assert_eq!(snake.commit_pending(), Direction::Down);
        assert_eq!(snake.direction(), Direction::Down);
    }

    #[test]
    fn reversal_check_uses_current_not_pending() {
        let mut snake = Snake::new(Cell::new(5, 5), Direction::Right);

        // Up is pending but Right is still current, so Down is not a reversal.
        assert!(snake.set_pending(Direction::Up));
        assert!(snake.set_pending(Direction::Down));
        assert!(!snake.set_pending(Direction::Left));
    }

    #[test]
    fn drop_tail_never_empties_the_body() {
        let mut snake = Snake::new(Cell::new(1, 1), Direction::Right);

        snake.drop_tail();

        assert_eq!(snake.len(), 1);
    }

    #[test]
    fn segments_without_tail_skips_last() {
        let snake = Snake::from_segments(
            vec![Cell::new(3, 1), Cell::new(2, 1), Cell::new(1, 1)],
            Direction::Right,
        );

        let trimmed: Vec<Cell> = snake.segments_without_tail().copied().collect();

        assert_eq!(trimmed, vec![Cell::new(3, 1), Cell::new(2, 1)]);
        assert_eq!(snake.len(), 3);
    }

    #[test]
    fn collision_covers_walls_and_body() {
        let bounds = GridSize::square(20);
        let snake = Snake::from_segments(
            vec![Cell::new(5, 5), Cell::new(4, 5), Cell::new(3, 5)],
            Direction::Right,
        );

        assert!(would_collide(Cell::new(-1, 0), bounds, snake.segments()));
        assert!(would_collide(Cell::new(0, 20), bounds, snake.segments()));
        assert!(would_collide(Cell::new(4, 5), bounds, snake.segments()));
        assert!(!would_collide(Cell::new(6, 5), bounds, snake.segments()));
    }
}
