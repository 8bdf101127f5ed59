use std::io;
use std::panic;
use std::path::PathBuf;
use std::thread;
use std::time::Instant;

use clap::Parser;
use neon_snake::app::App;
use neon_snake::audio::{AudioSettings, director_with_default_output};
use neon_snake::config::{FRAME_INTERVAL, GRID_SIZE, SpeedPreset, THEME_NEON};
use neon_snake::engine::CollisionPolicy;
use neon_snake::input::InputHandler;
use neon_snake::logging::init_file_logging;
use neon_snake::renderer::{self, View};
use neon_snake::score::FileScoreStore;
use neon_snake::session::{SessionConfig, SessionController};
use neon_snake::terminal_runtime::{TerminalSession, restore_terminal};
use tracing::info;

#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Speed preset selected on the home screen.
    #[arg(long, value_enum, default_value_t = SpeedPreset::Normal)]
    speed: SpeedPreset,

    /// Explicit tick period in milliseconds; overrides --speed.
    #[arg(long = "tick-ms")]
    tick_ms: Option<u64>,

    /// Start with background music switched off.
    #[arg(long = "no-music")]
    no_music: bool,

    /// Start with sound effects switched off.
    #[arg(long = "no-sfx")]
    no_sfx: bool,

    /// Master volume, 0-100.
    #[arg(long, default_value_t = 70, value_parser = clap::value_parser!(u8).range(0..=100))]
    volume: u8,

    /// Treat the cell the tail is leaving as an obstacle.
    #[arg(long = "strict-tail")]
    strict_tail: bool,

    /// Seed for food placement.
    #[arg(long)]
    seed: Option<u64>,

    /// Append logs to this file.
    #[arg(long = "log-file")]
    log_file: Option<PathBuf>,

    /// Read and write the best score here instead of the user data directory.
    #[arg(long = "scores-file")]
    scores_file: Option<PathBuf>,
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.log_file {
        if let Err(error) = init_file_logging(path) {
            eprintln!("Failed to open log file {}: {error}", path.display());
        }
    }

    install_panic_hook();
    run(cli)
}

fn run(cli: Cli) -> io::Result<()> {
    let store = cli
        .scores_file
        .clone()
        .map_or_else(FileScoreStore::at_default_location, FileScoreStore::new);
    let config = SessionConfig {
        bounds: GRID_SIZE,
        policy: if cli.strict_tail {
            CollisionPolicy::TailBlocks
        } else {
            CollisionPolicy::TailVacates
        },
        seed: cli.seed,
    };
    let session = SessionController::new(store, config, cli.speed.tick_interval());
    let audio = director_with_default_output(AudioSettings {
        music_enabled: !cli.no_music,
        sfx_enabled: !cli.no_sfx,
        volume: cli.volume,
    });
    let mut app = App::new(session, audio, cli.speed, cli.tick_ms);
    info!(best = app.session.best_score(), "neon-snake ready");

    let mut terminal_session = TerminalSession::enter()?;
    let mut input = InputHandler::new();
    let launched = Instant::now();

    loop {
        let now = Instant::now();
        while let Some(game_input) = input.poll_input()? {
            app.handle_input(game_input, now);
        }
        if app.should_quit() {
            break;
        }

        app.update(now);

        let view = View {
            screens: &app.screens,
            phase: app.session.phase(),
            bounds: app.session.config().bounds,
            score: app.session.score(),
            best_score: app.session.best_score(),
            selected_speed: app.selected_speed,
            tick_interval: app.session.speed(),
            audio: app.audio.settings(),
            audio_available: app.audio.is_available(),
            elapsed: now.duration_since(launched),
            theme: &THEME_NEON,
        };
        terminal_session
            .terminal_mut()
            .draw(|frame| renderer::render(frame, &view))?;

        thread::sleep(FRAME_INTERVAL);
    }

    Ok(())
}

fn install_panic_hook() {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        default_hook(panic_info);
    }));
}
