use std::sync::OnceLock;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;

use crate::config::Theme;

const STAR_COUNT: usize = 120;
const STAR_SEED: u64 = 0x5eed_57a2;
const TWINKLE_GLYPHS: [&str; 4] = [" ", "·", "+", "*"];

/// One star, placed in unit coordinates so it survives terminal resizes.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Star {
    x: f32,
    y: f32,
    period_ms: u64,
    phase_ms: u64,
}

/// The seeded star table, generated on first use.
fn stars() -> &'static [Star] {
    static STARS: OnceLock<Vec<Star>> = OnceLock::new();
    STARS.get_or_init(generate_stars)
}

fn generate_stars() -> Vec<Star> {
    let mut rng = StdRng::seed_from_u64(STAR_SEED);
    (0..STAR_COUNT)
        .map(|_| Star {
            x: rng.gen_range(0.0..1.0),
            y: rng.gen_range(0.0..1.0),
            period_ms: rng.gen_range(1_000..5_000),
            phase_ms: rng.gen_range(0..3_000),
        })
        .collect()
}

/// Brightness step 0..=3 of a star at `elapsed`: a triangle wave over its period.
fn twinkle_level(star: &Star, elapsed: Duration) -> usize {
    let t = (elapsed.as_millis() as u64 + star.phase_ms) % star.period_ms;
    let half = star.period_ms / 2;
    let rising = if t < half { t } else { star.period_ms - t };
    let max_level = (TWINKLE_GLYPHS.len() - 1) as u64;
    (rising * max_level / half.max(1)).min(max_level) as usize
}

/// Paints a twinkling starfield behind the home screen.
pub fn render_starfield(frame: &mut Frame<'_>, area: Rect, elapsed: Duration, theme: &Theme) {
    if area.width == 0 || area.height == 0 {
        return;
    }

    let style = Style::default().fg(theme.star);
    let buffer = frame.buffer_mut();
    for star in stars() {
        let x = area.x + (star.x * f32::from(area.width)) as u16;
        let y = area.y + (star.y * f32::from(area.height)) as u16;
        if x >= area.right() || y >= area.bottom() {
            continue;
        }

        let glyph = TWINKLE_GLYPHS[twinkle_level(star, elapsed)];
        buffer.set_string(x, y, glyph, style);
    }
}
