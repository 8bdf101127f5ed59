use rand::Rng;

use crate::grid::{Cell, GridSize};
use crate::snake::Snake;

/// Picks a uniformly random cell not occupied by the snake.
///
/// Uses rejection sampling over the whole grid. Returns `None` when the snake
/// already covers every cell, so sampling never spins on a full board.
#[must_use]
pub fn place_food<R: Rng + ?Sized>(rng: &mut R, bounds: GridSize, snake: &Snake) -> Option<Cell> {
    if snake.len() >= bounds.total_cells() {
        return None;
    }

    loop {
        let candidate = Cell {
            x: rng.gen_range(0..i32::from(bounds.width)),
            y: rng.gen_range(0..i32::from(bounds.height)),
        };

        if !snake.occupies(candidate) {
            return Some(candidate);
        }
    }
}
