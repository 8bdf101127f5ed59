use std::time::Duration;

use clap::ValueEnum;
use ratatui::style::Color;
use ratatui::symbols::border;

use crate::grid::GridSize;
use crate::input::Direction;

/// Board dimensions.
pub const GRID_SIZE: GridSize = GridSize::square(20);

/// Heading of a fresh snake.
pub const DEFAULT_HEADING: Direction = Direction::Right;

/// Tick period bounds accepted from the command line.
pub const MIN_TICK_INTERVAL_MS: u64 = 30;
pub const MAX_TICK_INTERVAL_MS: u64 = 1000;

/// Minimum drag distance, in terminal cells, that counts as a swipe.
pub const SWIPE_THRESHOLD_CELLS: i32 = 2;

/// Main loop frame budget.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Named tick speeds offered on the home screen.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, ValueEnum)]
pub enum SpeedPreset {
    Slow,
    #[default]
    Normal,
    Fast,
}

impl SpeedPreset {
    pub const ALL: [Self; 3] = [Self::Slow, Self::Normal, Self::Fast];

    #[must_use]
    pub fn tick_interval(self) -> Duration {
        match self {
            Self::Slow => Duration::from_millis(150),
            Self::Normal => Duration::from_millis(100),
            Self::Fast => Duration::from_millis(60),
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Slow => "Slow",
            Self::Normal => "Normal",
            Self::Fast => "Fast",
        }
    }

    /// Neighbouring preset in menu order, saturating at both ends.
    #[must_use]
    pub fn step(self, forward: bool) -> Self {
        let index = Self::ALL.iter().position(|preset| *preset == self).unwrap_or(1);
        let next = if forward {
            (index + 1).min(Self::ALL.len() - 1)
        } else {
            index.saturating_sub(1)
        };
        Self::ALL[next]
    }
}

/// Tick period for a session: an explicit millisecond override wins over the
/// preset and is clamped into the supported range.
#[must_use]
pub fn resolve_tick_interval(preset: SpeedPreset, tick_ms: Option<u64>) -> Duration {
    match tick_ms {
        Some(ms) => Duration::from_millis(ms.clamp(MIN_TICK_INTERVAL_MS, MAX_TICK_INTERVAL_MS)),
        None => preset.tick_interval(),
    }
}

/// Colors for every visual element.
#[derive(Debug)]
pub struct Theme {
    pub snake_head: Color,
    /// Body color next to the head; segments fade towards `play_bg`.
    pub snake_body: Color,
    pub food: Color,
    pub play_bg: Color,
    pub border_fg: Color,
    pub hud_label: Color,
    pub hud_value: Color,
    pub menu_title: Color,
    pub menu_footer: Color,
    pub highlight: Color,
    pub star: Color,
}

/// Neon cyan/magenta palette.
pub const THEME_NEON: Theme = Theme {
    snake_head: Color::Rgb(0, 247, 255),
    snake_body: Color::Rgb(0, 200, 214),
    food: Color::Rgb(255, 0, 255),
    play_bg: Color::Black,
    border_fg: Color::Rgb(0, 247, 255),
    hud_label: Color::DarkGray,
    hud_value: Color::White,
    menu_title: Color::Rgb(255, 0, 255),
    menu_footer: Color::DarkGray,
    highlight: Color::Rgb(255, 255, 0),
    star: Color::Gray,
};

/// Full-block glyph used for the snake body.
pub const GLYPH_SNAKE_BODY: &str = "██";

/// Glyph pair used for the snake head.
pub const GLYPH_SNAKE_HEAD: &str = "▓▓";

/// Glyph pair used for food.
pub const GLYPH_FOOD: &str = "()";

/// Terminal columns per grid cell, keeping cells roughly square.
pub const CELL_WIDTH: u16 = 2;

pub const BORDER_SET: border::Set = border::ROUNDED;

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{SpeedPreset, resolve_tick_interval};

    #[test]
    fn explicit_tick_is_clamped() {
        assert_eq!(
            resolve_tick_interval(SpeedPreset::Normal, Some(5)),
            Duration::from_millis(30)
        );
        assert_eq!(
            resolve_tick_interval(SpeedPreset::Normal, Some(5000)),
            Duration::from_millis(1000)
        );
        assert_eq!(
            resolve_tick_interval(SpeedPreset::Slow, Some(120)),
            Duration::from_millis(120)
        );
    }

    #[test]
    fn preset_is_used_without_override() {
        assert_eq!(
            resolve_tick_interval(SpeedPreset::Fast, None),
            Duration::from_millis(60)
        );
    }

    #[test]
    fn preset_step_saturates() {
        assert_eq!(SpeedPreset::Slow.step(false), SpeedPreset::Slow);
        assert_eq!(SpeedPreset::Slow.step(true), SpeedPreset::Normal);
        assert_eq!(SpeedPreset::Fast.step(true), SpeedPreset::Fast);
    }
}
