//! Terminal blockfall runner (default binary).
//!
//! Fixed-timestep loop: poll `crossterm` keys, map them to actions, advance
//! the engine clock, drain engine events to the log and draw the snapshot.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use log::{debug, info, warn};

use blockfall::config::{AppConfig, CONFIG_FILE};
use blockfall::core::{EngineEvent, GameSnapshot, GameState, JsonFileStore};
use blockfall::input::{handle_key_event, should_quit};
use blockfall::logging;
use blockfall::term::{FrameBuffer, GameView, TerminalRenderer, Viewport};

fn main() -> Result<()> {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));

    let (config, problem) = match AppConfig::load(&path) {
        Ok(config) => (config, None),
        Err(err) => (AppConfig::default(), Some(err)),
    };
    logging::init(&config.log)?;
    if let Some(err) = problem {
        warn!("using default config: {err:#}");
    }

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, &config);

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

fn run(term: &mut TerminalRenderer, config: &AppConfig) -> Result<()> {
    let store = JsonFileStore::new(&config.scores_path);
    let mut game = GameState::with_config(config.engine).with_store(Box::new(store));
    game.switch_mode(config.mode);
    info!("ready, {} selected", config.mode.as_str());

    let view = GameView::default();
    let mut fb = FrameBuffer::new(0, 0);
    let mut snap = GameSnapshot::default();

    let tick_duration = Duration::from_millis(config.tick_ms as u64);
    let mut last_tick = Instant::now();

    loop {
        // Render.
        game.snapshot_into(&mut snap);
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        view.render_into_with_scores(&snap, Some(game.high_scores()), Viewport::new(w, h), &mut fb);
        term.draw(&fb)?;

        // Input with timeout until next tick.
        let timeout = tick_duration.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Release && should_quit(key) {
                        info!("quit");
                        return Ok(());
                    }
                    if let Some(action) = handle_key_event(key) {
                        let applied = game.apply_action(action);
                        debug!("{action:?} applied={applied}");
                    }
                }
                Event::Resize(..) => term.invalidate(),
                _ => {}
            }
        }

        // Tick.
        if last_tick.elapsed() >= tick_duration {
            last_tick = Instant::now();
            game.tick(config.tick_ms);
            for event in game.take_events() {
                log_event(event);
            }
        }
    }
}

fn log_event(event: EngineEvent) {
    match event {
        EngineEvent::GameStarted { mode } => info!("{} started", mode.as_str()),
        EngineEvent::LinesRemoved { count } if event.is_tetris() => {
            info!("{count} lines at once")
        }
        EngineEvent::LevelChanged { level } => info!("level {level}"),
        EngineEvent::GameOver | EngineEvent::Victory => info!("{event:?}"),
        other => debug!("{other:?}"),
    }
}
