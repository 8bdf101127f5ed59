use std::time::Duration;

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::audio::AudioSettings;
use crate::config::Theme;

const HUD_MARGIN_X: u16 = 2;
const SEPARATOR: &str = " │ ";

/// Values displayed by the HUD rows.
#[derive(Debug, Clone)]
pub struct HudInfo<'a> {
    pub score: u32,
    pub best_score: u32,
    pub length: usize,
    pub tick_interval: Duration,
    pub audio: AudioSettings,
    pub audio_available: bool,
    pub theme: &'a Theme,
}

/// Renders the two-line HUD and returns the remaining play area above it.
#[must_use]
pub fn render_hud(frame: &mut Frame<'_>, area: Rect, info: &HudInfo<'_>) -> Rect {
    let [play_area, score_area, status_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(area);

    let score_area = inset_horizontal(score_area, HUD_MARGIN_X);
    let status_area = inset_horizontal(status_area, HUD_MARGIN_X);

    frame.render_widget(
        Paragraph::new(score_line(info, usize::from(score_area.width)))
            .alignment(Alignment::Right)
            .style(Style::default().fg(info.theme.hud_label)),
        score_area,
    );
    frame.render_widget(
        Paragraph::new(status_line(info))
            .alignment(Alignment::Right)
            .style(Style::default().fg(info.theme.hud_label)),
        status_area,
    );

    play_area
}

fn inset_horizontal(area: Rect, margin: u16) -> Rect {
    let total_margin = margin.saturating_mul(2);
    Rect {
        x: area.x.saturating_add(margin),
        y: area.y,
        width: area.width.saturating_sub(total_margin),
        height: area.height,
    }
}

fn score_line(info: &HudInfo<'_>, available_width: usize) -> Line<'static> {
    let compact = score_line_width(info, false) > available_width;
    let (length_label, score_label, best_label) = if compact {
        ("L", "S", "B")
    } else {
        ("Length", "Score", "Best")
    };

    // The score outshines the stored best while a record is being set.
    let record_run = info.score > info.best_score;
    let score_color = if record_run {
        info.theme.highlight
    } else {
        info.theme.hud_value
    };
    let shown_best = info.best_score.max(info.score);

    Line::from(vec![
        Span::raw(format!("{length_label}: ")),
        Span::styled(
            info.length.to_string(),
            Style::default().fg(info.theme.hud_value),
        ),
        Span::raw(SEPARATOR),
        Span::raw(format!("{score_label}: ")),
        Span::styled(info.score.to_string(), Style::default().fg(score_color)),
        Span::raw(SEPARATOR),
        Span::raw(format!("{best_label}: ")),
        Span::styled(
            shown_best.to_string(),
            Style::default().fg(info.theme.hud_value),
        ),
    ])
}

fn score_line_width(info: &HudInfo<'_>, compact: bool) -> usize {
    let labels = if compact { 3 } else { "Length".len() + "Score".len() + "Best".len() };
    labels
        + 3 * ": ".len()
        + 2 * SEPARATOR.chars().count()
        + info.length.to_string().len()
        + info.score.to_string().len()
        + info.best_score.max(info.score).to_string().len()
}

fn status_line(info: &HudInfo<'_>) -> Line<'static> {
    let speed = format!("{} ms/tick", info.tick_interval.as_millis());

    if !info.audio_available {
        return Line::from(vec![
            Span::raw(speed),
            Span::raw(SEPARATOR),
            Span::raw("audio unavailable"),
        ]);
    }

    let on_off = |enabled: bool| if enabled { "on" } else { "off" };
    Line::from(vec![
        Span::raw(speed),
        Span::raw(SEPARATOR),
        Span::raw(format!("music {}", on_off(info.audio.music_enabled))),
        Span::raw(SEPARATOR),
        Span::raw(format!("fx {}", on_off(info.audio.sfx_enabled))),
        Span::raw(SEPARATOR),
        Span::raw(format!("vol {}", info.audio.volume)),
    ])
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::audio::AudioSettings;
    use crate::config::THEME_NEON;

    use super::{HudInfo, score_line, status_line};

    fn info(score: u32, best_score: u32, audio_available: bool) -> HudInfo<'static> {
        HudInfo {
            score,
            best_score,
            length: 4,
            tick_interval: Duration::from_millis(100),
            audio: AudioSettings::default(),
            audio_available,
            theme: &THEME_NEON,
        }
    }

    fn line_text(line: &ratatui::text::Line<'_>) -> String {
        line.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    #[test]
    fn best_tracks_a_record_in_progress() {
        let text = line_text(&score_line(&info(12, 5, true), 80));

        assert_eq!(text, "Length: 4 │ Score: 12 │ Best: 12");
    }

    #[test]
    fn narrow_hud_uses_compact_labels() {
        let text = line_text(&score_line(&info(1, 5, true), 10));

        assert_eq!(text, "L: 4 │ S: 1 │ B: 5");
    }

    #[test]
    fn status_reports_degraded_audio() {
        assert_eq!(
            line_text(&status_line(&info(0, 0, false))),
            "100 ms/tick │ audio unavailable"
        );
        assert_eq!(
            line_text(&status_line(&info(0, 0, true))),
            "100 ms/tick │ music on │ fx on │ vol 70"
        );
    }
}
