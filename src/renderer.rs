use std::time::Duration;

use ratatui::Frame;
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::Block;

use crate::app::{Screen, ScreenState};
use crate::audio::AudioSettings;
use crate::config::{
    BORDER_SET, CELL_WIDTH, GLYPH_FOOD, GLYPH_SNAKE_BODY, GLYPH_SNAKE_HEAD, SpeedPreset, Theme,
};
use crate::engine::FrameSnapshot;
use crate::grid::{Cell, GridSize};
use crate::session::SessionPhase;
use crate::ui::backdrop::render_starfield;
use crate::ui::hud::{HudInfo, render_hud};
use crate::ui::menu::{render_game_over_menu, render_home_menu, render_pause_menu};

/// Everything one frame draws, gathered by the main loop.
#[derive(Debug)]
pub struct View<'a> {
    pub screens: &'a ScreenState,
    pub phase: SessionPhase,
    pub bounds: GridSize,
    pub score: u32,
    pub best_score: u32,
    pub selected_speed: SpeedPreset,
    pub tick_interval: Duration,
    pub audio: AudioSettings,
    pub audio_available: bool,
    /// Time since launch, drives backdrop animation.
    pub elapsed: Duration,
    pub theme: &'a Theme,
}

/// Renders the full frame for the visible screen.
pub fn render(frame: &mut Frame<'_>, view: &View<'_>) {
    let area = frame.area();
    frame.render_widget(Block::new().style(Style::new().bg(view.theme.play_bg)), area);

    match view.screens.screen {
        Screen::Home => {
            render_starfield(frame, area, view.elapsed, view.theme);
            render_home_menu(frame, area, view);
        }
        Screen::Game => {
            let board = render_board_with_hud(frame, area, view);
            if view.phase == SessionPhase::Paused {
                render_pause_menu(frame, board, view.theme);
            }
        }
        Screen::GameOver => {
            let board = render_board_with_hud(frame, area, view);
            render_game_over_menu(frame, board, view);
        }
    }
}

fn render_board_with_hud(frame: &mut Frame<'_>, area: Rect, view: &View<'_>) -> Rect {
    let play_area = render_hud(
        frame,
        area,
        &HudInfo {
            score: view.score,
            best_score: view.best_score,
            length: view.screens.frame.as_ref().map_or(0, |snapshot| snapshot.snake.len()),
            tick_interval: view.tick_interval,
            audio: view.audio,
            audio_available: view.audio_available,
            theme: view.theme,
        },
    );

    let board = board_rect(play_area, view.bounds);
    let block = Block::bordered()
        .border_set(BORDER_SET)
        .border_style(Style::new().fg(view.theme.border_fg));
    let inner = block.inner(board);
    frame.render_widget(block, board);

    if let Some(snapshot) = &view.screens.frame {
        if let Some(food) = snapshot.food {
            render_food(frame, inner, view.bounds, food, view.theme);
        }
        render_snake(frame, inner, view.bounds, snapshot, view.theme);
    }

    board
}

/// Centres a bordered board of `bounds` cells inside `area`.
fn board_rect(area: Rect, bounds: GridSize) -> Rect {
    let width = bounds.width.saturating_mul(CELL_WIDTH).saturating_add(2);
    let height = bounds.height.saturating_add(2);

    let [row] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [board] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(row);
    board
}

fn render_food(frame: &mut Frame<'_>, inner: Rect, bounds: GridSize, food: Cell, theme: &Theme) {
    let Some((x, y)) = logical_to_terminal(inner, bounds, food) else {
        return;
    };

    frame.buffer_mut().set_string(
        x,
        y,
        GLYPH_FOOD,
        Style::new().fg(theme.food).add_modifier(Modifier::BOLD),
    );
}

fn render_snake(
    frame: &mut Frame<'_>,
    inner: Rect,
    bounds: GridSize,
    snapshot: &FrameSnapshot,
    theme: &Theme,
) {
    let length = snapshot.snake.len();
    let buffer = frame.buffer_mut();

    for (index, segment) in snapshot.snake.iter().enumerate() {
        let Some((x, y)) = logical_to_terminal(inner, bounds, *segment) else {
            continue;
        };

        if index == 0 {
            buffer.set_string(
                x,
                y,
                GLYPH_SNAKE_HEAD,
                Style::new()
                    .fg(theme.snake_head)
                    .add_modifier(Modifier::BOLD),
            );
            continue;
        }

        let color = fade(theme.snake_body, body_alpha(index, length));
        buffer.set_string(x, y, GLYPH_SNAKE_BODY, Style::new().fg(color));
    }
}

/// Body brightness: 1.0 next to the head down to 0.5 at the tail.
fn body_alpha(index: usize, length: usize) -> f32 {
    if length == 0 {
        return 1.0;
    }
    1.0 - (index as f32 / length as f32) * 0.5
}

/// Darkens an RGB color towards black. Named colors are returned unchanged.
fn fade(color: Color, alpha: f32) -> Color {
    match color {
        Color::Rgb(r, g, b) => {
            let scale = |channel: u8| (f32::from(channel) * alpha.clamp(0.0, 1.0)).round() as u8;
            Color::Rgb(scale(r), scale(g), scale(b))
        }
        other => other,
    }
}

fn logical_to_terminal(inner: Rect, bounds: GridSize, cell: Cell) -> Option<(u16, u16)> {
    if !cell.is_within_bounds(bounds) {
        return None;
    }

    let x_offset = u16::try_from(cell.x).ok()?.saturating_mul(CELL_WIDTH);
    let y_offset = u16::try_from(cell.y).ok()?;

    let x = inner.x.saturating_add(x_offset);
    let y = inner.y.saturating_add(y_offset);
    if x.saturating_add(CELL_WIDTH) > inner.right() || y >= inner.bottom() {
        return None;
    }

    Some((x, y))
}
