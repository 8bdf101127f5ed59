use std::io;
use std::time::Duration;

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};

use crate::config::SWIPE_THRESHOLD_CELLS;

/// Canonical movement directions for snake input.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Returns the opposite direction.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Unit vector in grid coordinates (y grows downwards).
    #[must_use]
    pub fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }
}

/// High-level input events consumed by the game loop.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum GameInput {
    Direction(Direction),
    /// Pause/resume toggle.
    Pause,
    Confirm,
    /// Leave the current screen for the home screen.
    Back,
    ToggleMusic,
    ToggleSfx,
    /// Pointer press and release too short to count as a swipe.
    Tap,
    VolumeUp,
    VolumeDown,
    Quit,
}

/// Returns whether a direction change is legal (no immediate 180° turns).
#[must_use]
pub fn direction_change_is_valid(current: Direction, next: Direction) -> bool {
    next != current.opposite()
}

/// Maps one key press to a game input.
#[must_use]
pub fn map_key(key: KeyEvent) -> Option<GameInput> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    let input = match key.code {
        KeyCode::Up | KeyCode::Char('w' | 'W') => GameInput::Direction(Direction::Up),
        KeyCode::Down | KeyCode::Char('s' | 'S') => GameInput::Direction(Direction::Down),
        KeyCode::Left | KeyCode::Char('a' | 'A') => GameInput::Direction(Direction::Left),
        KeyCode::Right | KeyCode::Char('d' | 'D') => GameInput::Direction(Direction::Right),
        KeyCode::Char(' ') | KeyCode::Char('p' | 'P') => GameInput::Pause,
        KeyCode::Enter => GameInput::Confirm,
        KeyCode::Esc | KeyCode::Backspace => GameInput::Back,
        KeyCode::Char('m' | 'M') => GameInput::ToggleMusic,
        KeyCode::Char('e' | 'E') => GameInput::ToggleSfx,
        KeyCode::Char('+' | '=') => GameInput::VolumeUp,
        KeyCode::Char('-' | '_') => GameInput::VolumeDown,
        KeyCode::Char('q' | 'Q') => GameInput::Quit,
        _ => return None,
    };

    Some(input)
}

/// Resolves a drag gesture into a direction along its dominant axis.
///
/// Gestures shorter than `threshold` cells on the dominant axis are ignored.
#[must_use]
pub fn swipe_direction(dx: i32, dy: i32, threshold: i32) -> Option<Direction> {
    if dx.abs() > dy.abs() {
        if dx >= threshold {
            Some(Direction::Right)
        } else if dx <= -threshold {
            Some(Direction::Left)
        } else {
            None
        }
    } else if dy >= threshold {
        Some(Direction::Down)
    } else if dy <= -threshold {
        Some(Direction::Up)
    } else {
        None
    }
}

/// Polls crossterm for keyboard and mouse-drag input.
#[derive(Debug, Default)]
pub struct InputHandler {
    drag_start: Option<(u16, u16)>,
}

impl InputHandler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next pending input, if any, without blocking.
    pub fn poll_input(&mut self) -> io::Result<Option<GameInput>> {
        while event::poll(Duration::ZERO)? {
            let mapped = match event::read()? {
                Event::Key(key) => map_key(key),
                Event::Mouse(mouse) => self.track_mouse(mouse),
                _ => None,
            };

            if mapped.is_some() {
                return Ok(mapped);
            }
        }

        Ok(None)
    }

    fn track_mouse(&mut self, mouse: MouseEvent) -> Option<GameInput> {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.drag_start = Some((mouse.column, mouse.row));
                None
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let (start_x, start_y) = self.drag_start.take()?;
                let dx = i32::from(mouse.column) - i32::from(start_x);
                let dy = i32::from(mouse.row) - i32::from(start_y);
                Some(
                    swipe_direction(dx, dy, SWIPE_THRESHOLD_CELLS)
                        .map_or(GameInput::Tap, GameInput::Direction),
                )
            }
            _ => None,
        }
    }
}
