//! Game state module - manages the complete game state
//!
//! This module ties together the grid, the piece bag, the mode rules and the
//! scheduler. It owns the session lifecycle (menu, playing, paused, game over,
//! victory), piece movement and locking, line clears, scoring and the timers
//! that drive them.
//!
//! Time only advances through [`GameState::tick`], and only while playing.

use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, info, warn};

use crate::collision::check_collision;
use crate::events::EngineEvent;
use crate::grid::Grid;
use crate::highscores::{HighScoreTable, ScoreEntry, ScoreStore};
use crate::mode::{rules, LevelInputs, ModeRules};
use crate::pieces::{Piece, Shape};
use crate::rng::PieceBag;
use crate::scoring::{
    calculate_drop_score, calculate_line_score, clear_intensity, line_clear_delay_ms,
};
use crate::snapshot::{ActiveSnapshot, GameSnapshot};
use crate::timer::{Scheduler, TimerHandle, TimerToken};
use crate::types::*;

/// Engine parameters fixed for the lifetime of a `GameState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub grid: GridSize,
    pub lock_delay_ms: u32,
    pub spawn_column: i32,
    /// Bag seed; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            grid: GridSize::default(),
            lock_delay_ms: LOCK_DELAY_MS,
            spawn_column: SPAWN_COLUMN,
            seed: None,
        }
    }
}

/// Active falling piece
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tetromino {
    pub kind: PieceKind,
    pub shape: Shape,
    pub x: i32,
    pub y: i32,
}

impl Tetromino {
    /// Place a piece at `column`, lifted so its first occupied row is row 0
    pub fn spawn(piece: Piece, column: i32) -> Self {
        Self {
            kind: piece.kind,
            shape: piece.shape,
            x: column,
            y: -(piece.shape.top_offset() as i32),
        }
    }

    /// The piece without its position, keeping the current rotation.
    pub fn piece(&self) -> Piece {
        Piece {
            kind: self.kind,
            shape: self.shape,
        }
    }
}

/// Complete game state
#[derive(Debug)]
pub struct GameState {
    config: EngineConfig,
    grid: Grid,
    bag: PieceBag,
    active: Option<Tetromino>,
    next: Option<Piece>,
    hold: Option<Piece>,
    can_hold: bool,
    status: GameStatus,
    mode: ModeId,
    score: u32,
    lines: u32,
    level: u32,
    fall_speed_ms: u32,
    /// Session time for timed modes.
    elapsed_ms: u64,
    /// Clock value at session start.
    session_started_at: u64,
    scheduler: Scheduler,
    fall_timer: Option<TimerHandle>,
    lock_timer: Option<TimerHandle>,
    clear_timer: Option<TimerHandle>,
    session_timer: Option<TimerHandle>,
    /// Complete rows waiting for the clear window to end.
    pending_clear: Vec<usize>,
    events: Vec<EngineEvent>,
    high_scores: HighScoreTable,
    store: Option<Box<dyn ScoreStore>>,
}

impl GameState {
    /// Create a new game with the given bag seed and default config
    pub fn new(seed: u64) -> Self {
        Self::with_config(EngineConfig {
            seed: Some(seed),
            ..EngineConfig::default()
        })
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let bag = match config.seed {
            Some(seed) => PieceBag::new(seed),
            None => PieceBag::from_entropy(),
        };
        let mode = ModeId::default();

        Self {
            config,
            grid: Grid::new(config.grid),
            bag,
            active: None,
            next: None,
            hold: None,
            can_hold: true,
            status: GameStatus::Menu,
            mode,
            score: 0,
            lines: 0,
            level: 1,
            fall_speed_ms: rules(mode).fall_speed_ms(1),
            elapsed_ms: 0,
            session_started_at: 0,
            scheduler: Scheduler::new(),
            fall_timer: None,
            lock_timer: None,
            clear_timer: None,
            session_timer: None,
            pending_clear: Vec::new(),
            events: Vec::new(),
            high_scores: HighScoreTable::new(),
            store: None,
        }
    }

    /// Attach a high-score store and load its table.
    ///
    /// A store that fails to load is still kept for saving; the table
    /// starts empty.
    pub fn with_store(mut self, store: Box<dyn ScoreStore>) -> Self {
        match store.load() {
            Ok(table) => self.high_scores = table,
            Err(err) => warn!("could not load high scores: {err:#}"),
        }
        self.store = Some(store);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn mode(&self) -> ModeId {
        self.mode
    }

    pub fn rules(&self) -> &'static ModeRules {
        rules(self.mode)
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn fall_speed_ms(&self) -> u32 {
        self.fall_speed_ms
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn can_hold(&self) -> bool {
        self.can_hold
    }

    pub fn active(&self) -> Option<Tetromino> {
        self.active
    }

    pub fn next_piece(&self) -> Option<Piece> {
        self.next
    }

    pub fn hold_piece_slot(&self) -> Option<Piece> {
        self.hold
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn high_scores(&self) -> &HighScoreTable {
        &self.high_scores
    }

    /// Virtual clock in milliseconds.
    pub fn now_ms(&self) -> u64 {
        self.scheduler.now()
    }

    pub fn lock_pending(&self) -> bool {
        self.lock_timer.is_some()
    }

    /// Milliseconds until the next gravity step, if the fall timer runs.
    pub fn fall_remaining_ms(&self) -> Option<u64> {
        self.fall_timer.and_then(|h| self.scheduler.remaining_ms(h))
    }

    /// Drain queued events in the order they happened.
    pub fn take_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        let rules = self.rules();

        out.grid.clone_from(&self.grid);
        out.active = self.active.map(ActiveSnapshot::from);
        out.ghost_y = self.ghost_y();
        out.next = self.next;
        out.hold = self.hold;
        out.can_hold = self.can_hold;
        out.status = self.status;
        out.mode = self.mode;
        out.score = self.score;
        out.lines = self.lines;
        out.level = self.level;
        out.remaining_lines = if rules.show_remaining_lines {
            rules.remaining_lines(self.lines)
        } else {
            None
        };
        out.elapsed_ms = self.elapsed_ms;
        out.fall_speed_ms = self.fall_speed_ms;
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut s = GameSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }

    /// Start a session in `mode`. Only valid from the menu.
    pub fn start_game(&mut self, mode: ModeId) -> bool {
        if self.status != GameStatus::Menu {
            return false;
        }

        self.mode = mode;
        self.reset_session();

        let rules = rules(mode);
        self.level = rules.level(LevelInputs::default());
        self.fall_speed_ms = rules.fall_speed_ms(self.level);
        self.status = GameStatus::Playing;
        self.session_started_at = self.scheduler.now();
        if rules.has_timer {
            self.session_timer = Some(
                self.scheduler
                    .schedule_repeating(SESSION_TICK_MS, TimerToken::SessionClock),
            );
        }

        info!("starting {} session", mode.as_str());
        self.events.push(EngineEvent::GameStarted { mode });

        if self.spawn_piece() {
            self.restart_fall_timer();
        }
        true
    }

    /// Abandon the session and go back to the menu. Valid from any state.
    pub fn reset_game(&mut self) {
        self.reset_session();
        if self.status != GameStatus::Menu {
            debug!("{} -> menu", self.status.as_str());
        }
        self.status = GameStatus::Menu;
    }

    /// Reset and start again in the current mode.
    pub fn restart(&mut self) -> bool {
        self.reset_game();
        self.start_game(self.mode)
    }

    /// Pick a mode.
    ///
    /// In the menu this only selects it. A running or paused session in a
    /// different mode is abandoned and a new one starts. After a finished
    /// session the engine returns to the menu with the mode selected.
    pub fn switch_mode(&mut self, mode: ModeId) -> bool {
        match self.status {
            GameStatus::Menu => {
                self.mode = mode;
                true
            }
            GameStatus::Playing | GameStatus::Paused => {
                if mode == self.mode {
                    return false;
                }
                self.reset_game();
                self.start_game(mode)
            }
            GameStatus::GameOver | GameStatus::Victory => {
                self.reset_game();
                self.mode = mode;
                true
            }
        }
    }

    /// Playing and paused swap; every timer freezes while paused.
    pub fn toggle_pause(&mut self) -> bool {
        match self.status {
            GameStatus::Playing => {
                self.status = GameStatus::Paused;
                self.events.push(EngineEvent::Paused);
            }
            GameStatus::Paused => {
                self.status = GameStatus::Playing;
                self.events.push(EngineEvent::Resumed);
            }
            _ => return false,
        }
        debug!("pause toggled, now {}", self.status.as_str());
        true
    }

    fn reset_session(&mut self) {
        self.stop_timers();
        self.grid = Grid::new(self.config.grid);
        self.active = None;
        self.next = None;
        self.hold = None;
        self.can_hold = true;
        self.score = 0;
        self.lines = 0;
        self.level = 1;
        self.fall_speed_ms = rules(self.mode).fall_speed_ms(1);
        self.elapsed_ms = 0;
        self.session_started_at = self.scheduler.now();
    }

    fn stop_timers(&mut self) {
        self.scheduler.cancel_all();
        self.fall_timer = None;
        self.lock_timer = None;
        self.clear_timer = None;
        self.session_timer = None;
        self.pending_clear.clear();
    }

    /// Promote `next` to the current piece at the spawn position
    ///
    /// Returns false (and ends the game) if the spawn position is blocked.
    pub fn spawn_piece(&mut self) -> bool {
        if self.status != GameStatus::Playing {
            return false;
        }
        self.cancel_lock_delay();

        let piece = self.next.take().unwrap_or_else(|| self.bag.draw());
        self.next = Some(self.bag.draw());
        self.can_hold = true;

        let candidate = Tetromino::spawn(piece, self.config.spawn_column);
        if check_collision(&self.grid, &candidate.shape, candidate.x, candidate.y) {
            self.active = None;
            self.game_over();
            return false;
        }
        self.active = Some(candidate);
        true
    }

    /// Try to move the active piece
    ///
    /// A blocked downward move arms the lock delay instead.
    pub fn move_piece(&mut self, dx: i32, dy: i32) -> bool {
        if self.status != GameStatus::Playing {
            return false;
        }
        let Some(active) = self.active else {
            return false;
        };

        let (x, y) = (active.x + dx, active.y + dy);
        if !check_collision(&self.grid, &active.shape, x, y) {
            self.active = Some(Tetromino { x, y, ..active });
            self.cancel_lock_delay();
            if dy > 0 {
                self.restart_fall_timer();
            }
            return true;
        }

        if dy > 0 {
            self.schedule_lock();
        }
        false
    }

    /// Rotate clockwise, trying each horizontal kick in order
    pub fn rotate_piece(&mut self) -> bool {
        if self.status != GameStatus::Playing {
            return false;
        }
        let Some(active) = self.active else {
            return false;
        };

        let shape = active.shape.rotated();
        for dx in KICK_OFFSETS {
            let x = active.x + dx;
            if !check_collision(&self.grid, &shape, x, active.y) {
                self.active = Some(Tetromino { shape, x, ..active });
                self.cancel_lock_delay();
                self.events.push(EngineEvent::Rotated);
                return true;
            }
        }
        false
    }

    /// Drop to the lowest free row and lock at once.
    ///
    /// Returns the rows travelled, or `None` if there was nothing to drop.
    pub fn hard_drop(&mut self) -> Option<u32> {
        if self.status != GameStatus::Playing || self.active.is_none() {
            return None;
        }

        let mut rows = 0;
        while self.move_piece(0, 1) {
            rows += 1;
        }
        self.score = self.score.saturating_add(calculate_drop_score(rows));
        self.lock_active(true);
        Some(rows)
    }

    /// Swap the active piece with the hold slot
    pub fn hold_piece(&mut self) -> bool {
        if self.status != GameStatus::Playing || !self.can_hold {
            return false;
        }
        let Some(active) = self.active else {
            return false;
        };
        self.cancel_lock_delay();

        match self.hold.replace(active.piece()) {
            None => {
                self.active = None;
                if !self.spawn_piece() {
                    return true;
                }
            }
            Some(held) => {
                let swapped = Tetromino::spawn(held, self.config.spawn_column);
                if check_collision(&self.grid, &swapped.shape, swapped.x, swapped.y) {
                    self.active = None;
                    self.game_over();
                    return true;
                }
                self.active = Some(swapped);
            }
        }

        self.can_hold = false;
        self.events.push(EngineEvent::Held);
        true
    }

    /// Lock the active piece where it is.
    pub fn lock_piece(&mut self) -> bool {
        if self.status != GameStatus::Playing {
            return false;
        }
        self.lock_active(false)
    }

    /// Row the active piece would land on
    pub fn ghost_y(&self) -> Option<i32> {
        let active = self.active?;
        let mut y = active.y;
        while !check_collision(&self.grid, &active.shape, active.x, y + 1) {
            y += 1;
        }
        Some(y)
    }

    /// Advance the clock by `elapsed_ms` and fire due timers in order
    ///
    /// Does nothing unless playing. Returns true if any timer fired.
    pub fn tick(&mut self, elapsed_ms: u32) -> bool {
        if self.status != GameStatus::Playing {
            return false;
        }

        let until = self.scheduler.now() + elapsed_ms as u64;
        let mut fired = false;
        while self.status == GameStatus::Playing {
            let Some((handle, token)) = self.scheduler.pop_due(until) else {
                break;
            };
            fired = true;
            self.on_timer(handle, token);
        }

        if self.status == GameStatus::Playing {
            self.scheduler.advance_to(until);
            self.sync_elapsed();
        }
        fired
    }

    /// Apply a game action
    pub fn apply_action(&mut self, action: GameAction) -> bool {
        match action {
            GameAction::MoveLeft => self.move_piece(-1, 0),
            GameAction::MoveRight => self.move_piece(1, 0),
            GameAction::SoftDrop => self.move_piece(0, 1),
            GameAction::HardDrop => self.hard_drop().is_some(),
            GameAction::Rotate => self.rotate_piece(),
            GameAction::Hold => self.hold_piece(),
            GameAction::Pause => self.toggle_pause(),
            GameAction::Start => self.start_game(self.mode),
            GameAction::Restart => self.restart(),
            GameAction::Reset => {
                self.reset_game();
                true
            }
            GameAction::SelectMode(mode) => self.switch_mode(mode),
        }
    }

    fn on_timer(&mut self, handle: TimerHandle, token: TimerToken) {
        match token {
            TimerToken::Fall if self.fall_timer == Some(handle) => {
                // A pending lock owns the piece until it fires or is cancelled.
                if self.lock_timer.is_none() && self.active.is_some() {
                    self.move_piece(0, 1);
                }
            }
            TimerToken::LockDelay if self.lock_timer == Some(handle) => {
                self.lock_timer = None;
                if self.active.is_some() {
                    self.lock_active(false);
                }
            }
            TimerToken::LineClear if self.clear_timer == Some(handle) => {
                self.clear_timer = None;
                self.finish_line_clear();
            }
            TimerToken::SessionClock if self.session_timer == Some(handle) => {
                self.sync_elapsed();
                self.update_level_and_speed();
            }
            _ => {}
        }
    }

    fn restart_fall_timer(&mut self) {
        if let Some(handle) = self.fall_timer.take() {
            self.scheduler.cancel(handle);
        }
        if self.status == GameStatus::Playing {
            self.fall_timer = Some(
                self.scheduler
                    .schedule_repeating(self.fall_speed_ms, TimerToken::Fall),
            );
        }
    }

    fn schedule_lock(&mut self) {
        if self.lock_timer.is_some() {
            return;
        }
        self.lock_timer = Some(
            self.scheduler
                .schedule_once(self.config.lock_delay_ms, TimerToken::LockDelay),
        );
    }

    fn cancel_lock_delay(&mut self) {
        if let Some(handle) = self.lock_timer.take() {
            self.scheduler.cancel(handle);
        }
    }

    fn lock_active(&mut self, hard_drop: bool) -> bool {
        self.cancel_lock_delay();
        let Some(active) = self.active.take() else {
            return false;
        };

        self.grid
            .place(&active.shape, active.x, active.y, active.kind);
        self.events.push(EngineEvent::PieceLocked {
            kind: active.kind,
            hard_drop,
        });

        let rows = self.grid.full_rows();
        if rows.is_empty() {
            self.spawn_piece();
            return true;
        }

        let intensity = clear_intensity(rows.len());
        let cols = self.grid.cols();
        for &row in &rows {
            self.events.push(EngineEvent::LineCleared {
                row,
                cols,
                intensity,
            });
        }
        let delay = line_clear_delay_ms(rows.len());
        self.pending_clear = rows;
        self.clear_timer = Some(self.scheduler.schedule_once(delay, TimerToken::LineClear));
        true
    }

    fn finish_line_clear(&mut self) {
        let rows = std::mem::take(&mut self.pending_clear);
        let count = self.grid.remove_rows(&rows);

        // Points use the level in force before this clear.
        self.score = self
            .score
            .saturating_add(calculate_line_score(count, self.level));
        self.lines += count as u32;
        self.events.push(EngineEvent::LinesRemoved {
            count: count as u32,
        });

        self.update_level_and_speed();
        if self.rules().target_reached(self.lines) {
            self.win_game();
            return;
        }
        self.spawn_piece();
    }

    fn update_level_and_speed(&mut self) {
        let rules = self.rules();
        let level = rules.level(LevelInputs {
            lines: self.lines,
            elapsed_ms: self.elapsed_ms,
        });
        if level == self.level {
            return;
        }

        self.level = level;
        self.fall_speed_ms = rules.fall_speed_ms(level);
        debug!("level {} at {}ms per row", level, self.fall_speed_ms);
        self.restart_fall_timer();
        self.events.push(EngineEvent::LevelChanged { level });
    }

    fn sync_elapsed(&mut self) {
        if self.rules().has_timer {
            self.elapsed_ms = self.scheduler.now() - self.session_started_at;
        }
    }

    fn game_over(&mut self) {
        if self.status.is_terminal() {
            return;
        }
        self.sync_elapsed();
        self.stop_timers();
        self.status = GameStatus::GameOver;
        info!(
            "game over: score {} lines {} level {}",
            self.score, self.lines, self.level
        );
        self.events.push(EngineEvent::GameOver);
        self.record_score();
    }

    fn win_game(&mut self) {
        if self.status.is_terminal() {
            return;
        }
        self.sync_elapsed();
        self.stop_timers();
        self.active = None;
        self.status = GameStatus::Victory;
        info!(
            "victory: {} lines in {}ms, score {}",
            self.lines, self.elapsed_ms, self.score
        );
        self.events.push(EngineEvent::Victory);
        self.record_score();
    }

    fn record_score(&mut self) {
        let entry = ScoreEntry {
            score: self.score,
            lines: self.lines,
            level: self.level,
            date: unix_ms(),
            time: self.rules().has_timer.then_some(self.elapsed_ms),
        };
        if let Some(rank) = self.high_scores.insert(self.mode, entry) {
            debug!("new {} high score at rank {}", self.mode.as_str(), rank + 1);
        }
        if let Some(store) = self.store.as_mut() {
            if let Err(err) = store.save(&self.high_scores) {
                warn!("could not save high scores: {err:#}");
            }
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(1)
    }
}

fn unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highscores::MemoryStore;

    fn started(mode: ModeId) -> GameState {
        let mut state = GameState::new(12345);
        assert!(state.start_game(mode));
        state.take_events();
        state
    }

    /// Grid with the given bottom rows, O piece hovering over cols 4-5.
    fn with_o_over(state: &mut GameState, rows: &[&str]) {
        state.grid = Grid::from_strs(GridSize::default(), rows).unwrap();
        state.active = Some(Tetromino::spawn(Piece::new(PieceKind::O), 4));
    }

    #[test]
    fn test_new_game_state() {
        let state = GameState::new(12345);

        assert_eq!(state.status, GameStatus::Menu);
        assert_eq!(state.score, 0);
        assert_eq!(state.level, 1);
        assert_eq!(state.lines, 0);
        assert!(state.active.is_none());
        assert!(state.hold.is_none());
        assert!(state.next.is_none());
        assert_eq!(state.scheduler.pending_count(), 0);
    }

    #[test]
    fn test_game_start() {
        let mut state = GameState::new(12345);
        assert!(state.start_game(ModeId::Marathon));

        assert_eq!(state.status, GameStatus::Playing);
        assert!(state.active.is_some());
        assert!(state.next.is_some());
        assert!(state.fall_timer.is_some());
        assert!(state.session_timer.is_none());
        assert_eq!(
            state.take_events(),
            vec![EngineEvent::GameStarted {
                mode: ModeId::Marathon
            }]
        );

        // Only from the menu.
        assert!(!state.start_game(ModeId::Sprint));
        assert_eq!(state.mode, ModeId::Marathon);
    }

    #[test]
    fn test_spawn_position() {
        let mut state = started(ModeId::Marathon);
        state.next = Some(Piece::new(PieceKind::I));
        state.active = None;
        assert!(state.spawn_piece());

        let active = state.active.unwrap();
        assert_eq!(active.kind, PieceKind::I);
        assert_eq!(active.x, SPAWN_COLUMN);
        assert_eq!(active.y, -1);
        assert!(state.can_hold);
    }

    #[test]
    fn test_spawn_collision_is_game_over_without_grid_mutation() {
        let mut state = started(ModeId::Marathon);
        let mut rows = vec!["IIIIIIIII."; 2];
        rows.extend(std::iter::repeat("..........").take(18));
        state.grid = Grid::from_strs(GridSize::default(), &rows).unwrap();
        let before = state.grid.clone();

        assert!(!state.spawn_piece());
        assert_eq!(state.status, GameStatus::GameOver);
        assert!(state.active.is_none());
        assert_eq!(state.grid, before);
        assert_eq!(state.scheduler.pending_count(), 0);
        assert!(state.take_events().contains(&EngineEvent::GameOver));
    }

    #[test]
    fn test_clear_two_bottom_rows() {
        let mut state = started(ModeId::Marathon);
        with_o_over(&mut state, &["IIII..IIII", "IIII..IIII"]);

        assert_eq!(state.hard_drop(), Some(18));
        assert_eq!(state.score, 36);
        assert!(state.active.is_none());

        let events = state.take_events();
        assert_eq!(
            events[0],
            EngineEvent::PieceLocked {
                kind: PieceKind::O,
                hard_drop: true
            }
        );
        let cleared: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                EngineEvent::LineCleared { row, intensity, .. } => Some((*row, *intensity)),
                _ => None,
            })
            .collect();
        assert_eq!(cleared, vec![(19, 2), (18, 2)]);

        // Rows stay until the 130ms window ends.
        state.tick(129);
        assert!(state.grid.is_row_full(19));
        state.tick(1);

        assert_eq!(state.lines, 2);
        assert_eq!(state.score, 36 + 100);
        assert_eq!(state.grid.rows(), 20);
        assert_eq!(state.grid.filled_count(), 0);
        assert!(state.active.is_some());
        assert!(state
            .take_events()
            .contains(&EngineEvent::LinesRemoved { count: 2 }));
    }

    #[test]
    fn test_line_score_uses_level_before_update() {
        let mut state = started(ModeId::Marathon);
        state.lines = 9;
        with_o_over(&mut state, &["IIII..IIII"]);

        state.hard_drop();
        state.tick(100);

        assert_eq!(state.lines, 10);
        assert_eq!(state.score, 36 + 40);
        assert_eq!(state.level, 2);
        assert_eq!(state.fall_speed_ms, 950);
        assert_eq!(state.fall_remaining_ms(), Some(950));
        assert!(state
            .take_events()
            .contains(&EngineEvent::LevelChanged { level: 2 }));
    }

    #[test]
    fn test_sprint_victory_at_forty_lines() {
        let mut state = started(ModeId::Sprint);
        state.lines = 38;
        with_o_over(&mut state, &["IIII..IIII", "IIII..IIII"]);
        state.hard_drop();
        state.tick(130);

        assert_eq!(state.lines, 40);
        assert_eq!(state.status, GameStatus::Victory);
        assert!(state.active.is_none());
        assert_eq!(state.scheduler.pending_count(), 0);

        let best = state.high_scores.best(ModeId::Sprint).copied().unwrap();
        assert_eq!(best.lines, 40);
        assert_eq!(best.time, Some(130));
    }

    #[test]
    fn test_sprint_below_target_keeps_playing() {
        let mut state = started(ModeId::Sprint);
        state.lines = 37;
        with_o_over(&mut state, &["IIII..IIII", "IIII..IIII"]);
        state.hard_drop();
        state.tick(130);

        assert_eq!(state.lines, 39);
        assert_eq!(state.status, GameStatus::Playing);
        assert_eq!(state.snapshot().remaining_lines, Some(1));
    }

    #[test]
    fn test_hold_preserves_rotation_across_swaps() {
        let mut state = started(ModeId::Marathon);
        let t = Tetromino::spawn(Piece::new(PieceKind::T), SPAWN_COLUMN);
        let rotated_t = t.shape.rotated();
        state.active = Some(Tetromino {
            shape: rotated_t,
            ..t
        });

        assert!(state.hold_piece());
        assert_eq!(state.hold.unwrap().shape, rotated_t);
        assert!(!state.can_hold);
        assert!(!state.hold_piece());

        state.rotate_piece();
        let other = state.active.unwrap();

        state.can_hold = true;
        assert!(state.hold_piece());
        assert_eq!(state.active.unwrap().kind, PieceKind::T);
        assert_eq!(state.active.unwrap().shape, rotated_t);
        assert_eq!(state.hold.unwrap().shape, other.shape);

        state.can_hold = true;
        assert!(state.hold_piece());
        assert_eq!(state.active.unwrap().shape, other.shape);
        assert_eq!(state.hold.unwrap().shape, rotated_t);
    }

    #[test]
    fn test_hold_swap_into_blocked_spawn_is_game_over() {
        let mut state = started(ModeId::Marathon);
        state.hold = Some(Piece::new(PieceKind::O));
        let mut rows = vec!["IIIIIIIII."];
        rows.extend(std::iter::repeat("..........").take(19));
        state.grid = Grid::from_strs(GridSize::default(), &rows).unwrap();
        let before = state.grid.clone();
        let active = state.active.unwrap();

        assert!(state.hold_piece());
        assert_eq!(state.status, GameStatus::GameOver);
        assert!(state.active.is_none());
        assert_eq!(state.hold, Some(active.piece()));
        assert_eq!(state.grid, before);
        assert_eq!(state.scheduler.pending_count(), 0);

        let events = state.take_events();
        assert!(events.contains(&EngineEvent::GameOver));
        assert!(!events.contains(&EngineEvent::Held));
    }

    #[test]
    fn test_pause_freezes_fall_timer_and_elapsed() {
        let mut state = started(ModeId::Sprint);
        state.tick(250);
        let y = state.active.unwrap().y;
        let remaining = state.fall_remaining_ms().unwrap();
        assert_eq!(remaining, 250);
        assert_eq!(state.elapsed_ms, 250);

        assert!(state.toggle_pause());
        assert!(!state.tick(10_000));
        assert!(!state.move_piece(1, 0));
        assert_eq!(state.fall_remaining_ms(), Some(remaining));
        assert_eq!(state.elapsed_ms, 250);

        assert!(state.toggle_pause());
        state.tick(remaining as u32 - 1);
        assert_eq!(state.active.unwrap().y, y);
        state.tick(1);
        assert_eq!(state.active.unwrap().y, y + 1);
        assert_eq!(state.elapsed_ms, 500);
        assert_eq!(
            state.take_events(),
            vec![EngineEvent::Paused, EngineEvent::Resumed]
        );
    }

    #[test]
    fn test_lock_delay_cancel_and_rearm() {
        let mut state = started(ModeId::Marathon);
        let mut active = state.active.unwrap();
        active.y = state.ghost_y().unwrap();
        state.active = Some(active);

        assert!(!state.move_piece(0, 1));
        assert!(state.lock_pending());
        assert!(state.move_piece(-1, 0));
        assert!(!state.lock_pending());

        assert!(!state.move_piece(0, 1));
        state.tick(399);
        assert!(state.lock_pending());
        assert_eq!(state.active.unwrap().kind, active.kind);

        state.tick(1);
        assert!(!state.lock_pending());
        assert!(state.take_events().contains(&EngineEvent::PieceLocked {
            kind: active.kind,
            hard_drop: false
        }));
        assert!(state.grid.filled_count() > 0);
    }

    #[test]
    fn test_pending_lock_suppresses_gravity_and_keeps_deadline() {
        let mut state = started(ModeId::Marathon);
        state.tick(700);
        let mut active = state.active.unwrap();
        active.y = state.ghost_y().unwrap();
        state.active = Some(active);

        assert!(!state.move_piece(0, 1));
        let handle = state.lock_timer.unwrap();

        // The fall timer fires at 1000ms, inside the lock window.
        state.tick(300);
        assert_eq!(state.active, Some(active));
        assert_eq!(state.lock_timer, Some(handle));
        assert_eq!(state.scheduler.remaining_ms(handle), Some(100));

        // A second blocked move keeps the original deadline.
        assert!(!state.move_piece(0, 1));
        assert_eq!(state.lock_timer, Some(handle));
        assert_eq!(state.scheduler.remaining_ms(handle), Some(100));

        state.tick(99);
        assert!(state.lock_pending());
        assert_eq!(state.active, Some(active));

        state.tick(1);
        assert!(!state.lock_pending());
        assert!(state.take_events().contains(&EngineEvent::PieceLocked {
            kind: active.kind,
            hard_drop: false
        }));
    }

    #[test]
    fn test_ghost_never_mutates_grid() {
        let state = started(ModeId::Marathon);
        let before = state.grid.clone();

        let ghost = state.ghost_y().unwrap();
        let active = state.active.unwrap();
        let bottom = active
            .shape
            .occupied()
            .iter()
            .map(|&(r, _)| r as i32)
            .max()
            .unwrap();
        assert_eq!(ghost + bottom, 19);
        assert_eq!(state.grid, before);
        assert_eq!(state.active.unwrap(), active);
    }

    #[test]
    fn test_rotation_kicks_off_the_wall() {
        let mut state = started(ModeId::Marathon);
        // Vertical I against the right wall.
        let i = Piece::new(PieceKind::I);
        state.active = Some(Tetromino {
            kind: PieceKind::I,
            shape: i.shape.rotated(),
            x: 7,
            y: 5,
        });

        assert!(state.rotate_piece());
        let active = state.active.unwrap();
        assert_eq!(active.shape, i.shape.rotated().rotated());
        assert_eq!(active.x, 6);
        assert_eq!(state.take_events(), vec![EngineEvent::Rotated]);
    }

    #[test]
    fn test_rotation_without_room_is_rejected() {
        let mut state = started(ModeId::Marathon);
        // Vertical I down a one-wide well at column 4.
        let mut rows = vec![".........."; 8];
        rows.extend(std::iter::repeat("IIII.IIIII").take(12));
        state.grid = Grid::from_strs(GridSize::default(), &rows).unwrap();
        let i = Piece::new(PieceKind::I);
        let active = Tetromino {
            kind: PieceKind::I,
            shape: i.shape.rotated(),
            x: 2,
            y: 8,
        };
        state.active = Some(active);
        let before = state.grid.clone();

        assert!(!state.rotate_piece());
        assert_eq!(state.active, Some(active));
        assert_eq!(state.grid, before);
        assert!(!state.lock_pending());
        assert!(state.take_events().is_empty());
    }

    #[test]
    fn test_reset_returns_to_menu() {
        let mut state = started(ModeId::Survival);
        state.tick(500);
        state.reset_game();

        assert_eq!(state.status, GameStatus::Menu);
        assert_eq!(state.scheduler.pending_count(), 0);
        assert!(state.active.is_none());
        assert_eq!(state.elapsed_ms, 0);
        assert!(!state.tick(1_000));
    }

    #[test]
    fn test_switch_mode() {
        let mut state = GameState::new(7);
        assert!(state.switch_mode(ModeId::Sprint));
        assert_eq!(state.status, GameStatus::Menu);

        assert!(state.apply_action(GameAction::Start));
        assert_eq!(state.mode, ModeId::Sprint);
        assert!(!state.switch_mode(ModeId::Sprint));

        state.tick(1_000);
        assert!(state.switch_mode(ModeId::Survival));
        assert_eq!(state.status, GameStatus::Playing);
        assert_eq!(state.mode, ModeId::Survival);
        assert_eq!(state.elapsed_ms, 0);
    }

    #[test]
    fn test_survival_speeds_up_every_thirty_seconds() {
        let mut state = started(ModeId::Survival);
        state.tick(29_999);
        assert_eq!(state.level, 1);

        state.tick(1);
        assert_eq!(state.level, 2);
        assert_eq!(state.fall_speed_ms, 900);
    }

    #[test]
    fn test_game_over_records_score() {
        let mut state = GameState::new(3).with_store(Box::new(MemoryStore::new()));
        state.start_game(ModeId::Marathon);
        state.score = 777;
        state.game_over();

        assert_eq!(state.status, GameStatus::GameOver);
        let best = state.high_scores.best(ModeId::Marathon).copied().unwrap();
        assert_eq!(best.score, 777);
        assert_eq!(best.time, None);
        assert!(!state.start_game(ModeId::Marathon));
        assert!(state.restart());
    }

    #[derive(Debug)]
    struct BrokenStore;

    impl ScoreStore for BrokenStore {
        fn load(&self) -> anyhow::Result<HighScoreTable> {
            anyhow::bail!("unreadable")
        }

        fn save(&mut self, _: &HighScoreTable) -> anyhow::Result<()> {
            anyhow::bail!("read-only")
        }
    }

    #[test]
    fn test_broken_store_does_not_affect_game() {
        let mut state = GameState::new(3).with_store(Box::new(BrokenStore));
        state.start_game(ModeId::Marathon);
        state.game_over();

        assert_eq!(state.status, GameStatus::GameOver);
        assert_eq!(state.high_scores.entries(ModeId::Marathon).len(), 1);
    }
}
