mod display;

use std::collections::HashMap;
use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::Path;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
        KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use rand::thread_rng;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use ribbon_shooter::compute::Game;
use ribbon_shooter::config::Args;
use ribbon_shooter::input::{Action, KeyStatus};

use display::StarField;

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames.  Covers terminals that don't emit key-release events:
/// the OS key-repeat rate is ≥ 15 Hz, so at 60 FPS a window of 8 frames
/// (≈133 ms) is always refreshed before expiry.
const HOLD_WINDOW: u64 = 8;

/// Keys bound to each action.
const BINDINGS: &[(Action, &[KeyCode])] = &[
    (Action::Left, &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')]),
    (Action::Right, &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')]),
    (Action::Up, &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')]),
    (Action::Down, &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')]),
    (Action::Fire, &[KeyCode::Char(' ')]),
];

/// Returns true if `key` was seen within the last `HOLD_WINDOW` frames.
fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

fn key_status(key_frame: &HashMap<KeyCode, u64>, frame: u64) -> KeyStatus {
    let mut keys = KeyStatus::default();
    for (action, codes) in BINDINGS {
        let held = codes.iter().any(|code| is_held(key_frame, code, frame));
        keys.set(*action, held);
    }
    keys
}

// ── Logging ───────────────────────────────────────────────────────────────────

/// The terminal is in raw mode, so logs only ever go to a file.
fn init_logging(path: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let file = File::create(path)
        .with_context(|| format!("failed to create log file at {}", path.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(file);
    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_ansi(false)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    Ok(Some(guard))
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Runs frames until the player quits.
///
/// Input model: a `key_frame` map records the frame number of the last
/// press/repeat event for every key.  Each frame the keys still "fresh"
/// (within `HOLD_WINDOW` frames) become the `KeyStatus` the simulation
/// reads, so Space and a direction can be held at the same time.
fn game_loop<W: Write>(
    out: &mut W,
    game: &mut Game,
    rx: &mpsc::Receiver<Event>,
) -> anyhow::Result<()> {
    let frame_budget = Duration::from_secs(1) / game.settings.fps;
    let stars = StarField::new(
        &mut thread_rng(),
        game.settings.canvas_width,
        game.settings.canvas_height,
    );

    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut frame: u64 = 0;

    loop {
        let frame_start = Instant::now();
        frame += 1;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(Event::Key(KeyEvent { code, kind, modifiers, .. })) = rx.try_recv() {
            match kind {
                KeyEventKind::Press => {
                    let _ = key_frame.insert(code, frame);
                    match code {
                        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                            return Ok(());
                        }
                        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                            return Ok(());
                        }
                        KeyCode::Char('r') | KeyCode::Char('R') => game.restart(),
                        _ => {}
                    }
                }
                KeyEventKind::Repeat => {
                    let _ = key_frame.insert(code, frame);
                }
                KeyEventKind::Release => {
                    let _ = key_frame.remove(&code);
                }
            }
        }

        let keys = key_status(&key_frame, frame);
        let _ = game.tick(&keys);

        let (width, height) = terminal::size()?;
        display::render(out, game, &stars, width, height)?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_budget {
            thread::sleep(frame_budget - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let _guard = init_logging(args.log_file.as_deref())?;

    // Asset sizes must be known before any pool is built.
    let sprites = args.sprite_sizes().context("failed to load sprite sizes")?;
    let settings = args.settings()?;
    let mut game = Game::new(settings, sprites).context("failed to initialise game")?;
    info!(?settings, "starting");

    let mut out = BufWriter::new(stdout());

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Kitty-protocol terminals support this; others fall back gracefully.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break; // receiver dropped → program exiting
            }
        }
    });

    let result = game_loop(&mut out, &mut game, &rx);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    info!(score = game.score, waves = game.waves, "exiting");
    result
}
