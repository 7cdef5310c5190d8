//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the workspace.
//! Everything here is plain data, usable from the engine, the input mapping
//! and the terminal view alike.
//!
//! # Grid Dimensions
//!
//! - **Width**: 10 columns (indexed 0-9)
//! - **Height**: 20 rows (indexed 0-19)
//! - **Spawn column**: 3, with the piece lifted by its top offset
//!
//! # Game Timing Constants
//!
//! Timing values are in milliseconds:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TICK_MS` | 16 | Host loop interval (~60 FPS) |
//! | `BASE_FALL_MS` | 1000 | Gravity at level 1 |
//! | `MIN_FALL_MS` | 50 | Fastest gravity any mode reaches |
//! | `LOCK_DELAY_MS` | 400 | Grace period before a grounded piece locks |
//! | `SESSION_TICK_MS` | 100 | Session clock resolution for timed modes |
//!
//! # Examples
//!
//! ```
//! use blockfall_types::{GameAction, ModeId, PieceKind, GRID_COLS, GRID_ROWS};
//!
//! assert_eq!(PieceKind::from_str("t"), Some(PieceKind::T));
//! assert_eq!(ModeId::from_str("Sprint"), Some(ModeId::Sprint));
//! assert_eq!(GameAction::from_str("hardDrop"), Some(GameAction::HardDrop));
//!
//! assert_eq!(GRID_COLS, 10);
//! assert_eq!(GRID_ROWS, 20);
//! ```

use serde::{Deserialize, Serialize};

/// Grid width in cells (10 columns)
pub const GRID_COLS: u16 = 10;

/// Grid height in cells (20 rows)
pub const GRID_ROWS: u16 = 20;

/// Column where new pieces appear.
pub const SPAWN_COLUMN: i32 = 3;

/// Host loop interval in milliseconds (16ms ≈ 60 FPS)
pub const TICK_MS: u32 = 16;

/// Gravity interval at level 1.
pub const BASE_FALL_MS: u32 = 1000;

/// Floor for every fall-speed curve.
pub const MIN_FALL_MS: u32 = 50;

/// Lock delay once a downward move fails.
pub const LOCK_DELAY_MS: u32 = 400;

/// Session clock resolution for timed modes.
pub const SESSION_TICK_MS: u32 = 100;

/// Clear animation windows, indexed by simultaneous line count.
pub const LINE_CLEAR_DELAYS_MS: [u32; 5] = [0, 100, 130, 160, 200];

/// Window used for any line count outside the table.
pub const LINE_CLEAR_FALLBACK_MS: u32 = 130;

/// Line clear scoring table
///
/// Base points for clearing N lines, multiplied by the current level:
/// - 0 lines: 0 points
/// - 1 line: 40 points
/// - 2 lines: 100 points
/// - 3 lines: 300 points
/// - 4 lines: 1200 points (Tetris!)
pub const LINE_SCORES: [u32; 5] = [0, 40, 100, 300, 1200];

/// Points per row of a hard drop.
pub const HARD_DROP_POINTS_PER_ROW: u32 = 2;

/// Horizontal offsets tried, in order, when a rotation collides.
pub const KICK_OFFSETS: [i32; 5] = [0, -1, 1, -2, 2];

/// Maximum entries kept per mode in the high-score table.
pub const HIGH_SCORE_LIMIT: usize = 10;

/// The seven piece kinds
///
/// The kind doubles as the color tag written into grid cells:
/// - **I**: Cyan, horizontal bar
/// - **O**: Yellow, 2x2 square
/// - **T**: Magenta, T-shaped
/// - **S**: Green, S-shaped
/// - **Z**: Red, Z-shaped (mirror of S)
/// - **J**: Blue, J-shaped
/// - **L**: Orange, L-shaped (mirror of J)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PieceKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl PieceKind {
    /// Catalog order, used to fill the randomizer bag.
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// Parse piece kind from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use blockfall_types::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_str("i"), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_str("O"), Some(PieceKind::O));
    /// assert_eq!(PieceKind::from_str("unknown"), None);
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "i" => Some(PieceKind::I),
            "o" => Some(PieceKind::O),
            "t" => Some(PieceKind::T),
            "s" => Some(PieceKind::S),
            "z" => Some(PieceKind::Z),
            "j" => Some(PieceKind::J),
            "l" => Some(PieceKind::L),
            _ => None,
        }
    }
}

/// Lifecycle of a game session.
///
/// `Menu → Playing → {Paused ⇄ Playing} → {GameOver | Victory} → Menu`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameStatus {
    #[default]
    Menu,
    Playing,
    Paused,
    GameOver,
    Victory,
}

impl GameStatus {
    /// True for the two end-of-session states.
    pub fn is_terminal(&self) -> bool {
        matches!(self, GameStatus::GameOver | GameStatus::Victory)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::Menu => "menu",
            GameStatus::Playing => "playing",
            GameStatus::Paused => "paused",
            GameStatus::GameOver => "gameover",
            GameStatus::Victory => "victory",
        }
    }
}

/// Game mode identifier.
///
/// The rules attached to each id live in the core crate's mode table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ModeId {
    #[default]
    Marathon,
    Sprint,
    Survival,
}

impl ModeId {
    pub const ALL: [ModeId; 3] = [ModeId::Marathon, ModeId::Sprint, ModeId::Survival];

    /// Parse a mode id (case-insensitive)
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "marathon" => Some(ModeId::Marathon),
            "sprint" => Some(ModeId::Sprint),
            "survival" => Some(ModeId::Survival),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModeId::Marathon => "marathon",
            ModeId::Sprint => "sprint",
            ModeId::Survival => "survival",
        }
    }
}

/// Grid dimensions in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridSize {
    pub rows: u16,
    pub cols: u16,
}

impl GridSize {
    pub const fn new(rows: u16, cols: u16) -> Self {
        Self { rows, cols }
    }

    pub fn cell_count(&self) -> usize {
        self.rows as usize * self.cols as usize
    }
}

impl Default for GridSize {
    fn default() -> Self {
        Self::new(GRID_ROWS, GRID_COLS)
    }
}

/// Game actions that can be applied to modify game state
///
/// Produced by the input layer; each maps to one engine operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    /// Move piece one cell left
    MoveLeft,
    /// Move piece one cell right
    MoveRight,
    /// Move piece one cell down
    SoftDrop,
    /// Instantly drop piece to lowest valid position and lock it
    HardDrop,
    /// Rotate piece 90° clockwise
    Rotate,
    /// Hold current piece (if available)
    Hold,
    /// Toggle pause state
    Pause,
    /// Start a new session in the selected mode
    Start,
    /// Reset the current session and start again
    Restart,
    /// Abandon the session and return to the menu
    Reset,
    /// Pick a mode (restarts a running session in a different mode)
    SelectMode(ModeId),
}

impl GameAction {
    /// Parse action from a camelCase string
    ///
    /// # Examples
    ///
    /// ```
    /// use blockfall_types::{GameAction, ModeId};
    ///
    /// assert_eq!(GameAction::from_str("moveLeft"), Some(GameAction::MoveLeft));
    /// assert_eq!(GameAction::from_str("rotate"), Some(GameAction::Rotate));
    /// assert_eq!(
    ///     GameAction::from_str("sprint"),
    ///     Some(GameAction::SelectMode(ModeId::Sprint))
    /// );
    /// assert_eq!(GameAction::from_str("unknown"), None);
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "moveleft" => Some(GameAction::MoveLeft),
            "moveright" => Some(GameAction::MoveRight),
            "softdrop" => Some(GameAction::SoftDrop),
            "harddrop" => Some(GameAction::HardDrop),
            "rotate" => Some(GameAction::Rotate),
            "hold" => Some(GameAction::Hold),
            "pause" => Some(GameAction::Pause),
            "start" => Some(GameAction::Start),
            "restart" => Some(GameAction::Restart),
            "reset" => Some(GameAction::Reset),
            other => ModeId::from_str(other).map(GameAction::SelectMode),
        }
    }
}

/// A cell on the grid
///
/// - `None`: Empty cell
/// - `Some(PieceKind)`: Cell filled with the color of the given kind
pub type Cell = Option<PieceKind>;
