use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Clear, Paragraph};

use crate::config::{SpeedPreset, Theme};
use crate::engine::EndReason;
use crate::renderer::View;

/// Draws the home screen: best score, speed picker and audio settings.
pub fn render_home_menu(frame: &mut Frame<'_>, area: Rect, view: &View<'_>) {
    let theme = view.theme;
    let popup = centered_popup(area, 60, 70);
    frame.render_widget(Clear, popup);

    let [title_row, body_row, footer_row] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(3),
        Constraint::Length(2),
    ])
    .areas(popup);

    frame.render_widget(
        Paragraph::new(Line::from("NEON SNAKE"))
            .alignment(Alignment::Center)
            .style(
                Style::default()
                    .fg(theme.menu_title)
                    .add_modifier(Modifier::BOLD),
            ),
        title_row,
    );

    let mut body = vec![
        Line::from(format!("Best: {}", view.best_score)),
        Line::from(""),
    ];
    body.extend(
        SpeedPreset::ALL
            .iter()
            .map(|preset| speed_line(*preset, view.selected_speed, theme)),
    );
    body.push(Line::from(""));
    body.push(Line::from(audio_summary(view)));
    body.push(Line::from(""));
    body.push(Line::from("[Enter] Start   [Q]/[Esc] Quit"));
    body.push(Line::from("[M] Music   [E] Effects   [+/-] Volume"));

    frame.render_widget(
        Paragraph::new(body)
            .alignment(Alignment::Center)
            .block(
                Block::bordered()
                    .title(" start ")
                    .border_style(Style::default().fg(theme.border_fg)),
            ),
        body_row,
    );

    frame.render_widget(
        Paragraph::new(Line::from("Arrows/WASD or drag with the mouse to steer"))
            .alignment(Alignment::Center)
            .style(Style::default().fg(theme.menu_footer)),
        footer_row,
    );
}

fn speed_line(preset: SpeedPreset, selected: SpeedPreset, theme: &Theme) -> Line<'static> {
    let text = format!(
        "{} ({} ms)",
        preset.label(),
        preset.tick_interval().as_millis()
    );

    if preset == selected {
        Line::styled(
            format!("▶ {text} ◀"),
            Style::default()
                .fg(theme.highlight)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Line::from(text)
    }
}

fn audio_summary(view: &View<'_>) -> String {
    if !view.audio_available {
        return "Audio unavailable".to_owned();
    }

    let on_off = |enabled: bool| if enabled { "on" } else { "off" };
    format!(
        "Music {}  Effects {}  Volume {}",
        on_off(view.audio.music_enabled),
        on_off(view.audio.sfx_enabled),
        view.audio.volume
    )
}

/// Draws the pause overlay on top of the board.
pub fn render_pause_menu(frame: &mut Frame<'_>, area: Rect, theme: &Theme) {
    let popup = centered_popup(area, 60, 40);
    frame.render_widget(Clear, popup);

    let lines = vec![
        Line::from("PAUSED"),
        Line::from(""),
        Line::from("[Space] Resume"),
        Line::from("[Esc] Home"),
    ];
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(
                Block::bordered()
                    .title(" pause ")
                    .border_style(Style::default().fg(theme.border_fg)),
            ),
        popup,
    );
}

/// Draws the game-over popup on top of the final board.
pub fn render_game_over_menu(frame: &mut Frame<'_>, area: Rect, view: &View<'_>) {
    let theme = view.theme;
    let screens = view.screens;
    let popup = centered_popup(area, 70, 60);
    frame.render_widget(Clear, popup);

    let record_line = if screens.new_record {
        Line::styled(
            "New high score!",
            Style::default()
                .fg(theme.highlight)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Line::from("")
    };

    let lines = vec![
        Line::from("GAME OVER"),
        Line::from(""),
        Line::from(format!("Score: {}", screens.final_score)),
        Line::from(format!("Best: {}", view.best_score)),
        Line::from(match screens.end_reason {
            Some(EndReason::WallCollision) => "Cause: hit wall",
            Some(EndReason::SelfCollision) => "Cause: hit yourself",
            Some(EndReason::BoardFilled) => "Board filled!",
            None => "",
        }),
        record_line,
        Line::from(""),
        Line::from("[Enter] Play again"),
        Line::from("[Esc] Home"),
    ];

    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(
                Block::bordered()
                    .title(" game over ")
                    .border_style(Style::default().fg(theme.food)),
            ),
        popup,
    );
}

fn centered_popup(area: Rect, width_percent: u16, height_percent: u16) -> Rect {
    let [_, mid, _] = Layout::vertical([
        Constraint::Percentage((100 - height_percent) / 2),
        Constraint::Percentage(height_percent),
        Constraint::Percentage((100 - height_percent) / 2),
    ])
    .areas(area);

    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage((100 - width_percent) / 2),
        Constraint::Percentage(width_percent),
        Constraint::Percentage((100 - width_percent) / 2),
    ])
    .areas(mid);

    center
}
