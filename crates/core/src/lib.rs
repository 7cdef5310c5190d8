//! Core game logic module - pure, deterministic, and testable
//!
//! This crate contains the rules and state of the game. It has no
//! dependency on terminals or input devices; the only I/O it performs is
//! through a [`ScoreStore`] the host chooses to attach.
//!
//! # Module Structure
//!
//! - [`pieces`]: the seven canonical shapes and the clockwise rotation transform
//! - [`rng`]: 7-bag random piece generation for fair distribution
//! - [`grid`]: the playfield, line detection and row removal
//! - [`collision`]: the overlap/bounds test every move goes through
//! - [`scoring`]: line and drop points, clear windows
//! - [`mode`]: per-mode level, speed and win rules
//! - [`timer`]: the virtual-clock scheduler behind gravity and delays
//! - [`game_state`]: the session state machine tying it all together
//! - [`events`], [`snapshot`]: what collaborators observe
//! - [`highscores`]: per-mode rankings and their stores
//!
//! # Game Rules
//!
//! - **7-Bag Randomizer**: every aligned window of seven draws holds each piece once
//! - **Rotation**: clockwise only, with horizontal kicks of 0, -1, +1, -2, +2
//! - **Lock Delay**: 400ms after a blocked downward move, cancelled by any successful move or rotation
//! - **Ghost Piece**: shows where the current piece will land
//! - **Hold**: one piece, once per spawn; swapped pieces keep their rotation
//! - **Scoring**: 40/100/300/1200 times the level, plus 2 points per hard-dropped row
//!
//! # Example
//!
//! ```
//! use blockfall_core::GameState;
//! use blockfall_types::{GameAction, GameStatus, ModeId};
//!
//! let mut game = GameState::new(12345);
//! game.start_game(ModeId::Marathon);
//!
//! game.apply_action(GameAction::MoveRight);
//! game.apply_action(GameAction::Rotate);
//! game.apply_action(GameAction::HardDrop);
//!
//! assert_eq!(game.status(), GameStatus::Playing);
//! assert!(game.score() > 0); // Hard drop awards points
//! ```
//!
//! # Timing
//!
//! Call [`GameState::tick`] every frame with the elapsed milliseconds. The
//! clock only moves while playing, so pausing freezes gravity, lock delay,
//! line-clear windows and the session clock alike.

pub mod collision;
pub mod events;
pub mod game_state;
pub mod grid;
pub mod highscores;
pub mod mode;
pub mod pieces;
pub mod rng;
pub mod scoring;
pub mod snapshot;
pub mod timer;

pub use blockfall_types as types;

// Re-export commonly used types for convenience
pub use collision::check_collision;
pub use events::EngineEvent;
pub use game_state::{EngineConfig, GameState, Tetromino};
pub use grid::Grid;
pub use highscores::{HighScoreTable, JsonFileStore, MemoryStore, ScoreEntry, ScoreStore};
pub use mode::{rules, rules_by_name, LevelInputs, ModeRules, MODES};
pub use pieces::{get_shape, rotate_matrix, top_offset, Piece, Shape};
pub use rng::PieceBag;
pub use scoring::{calculate_drop_score, calculate_line_score, line_clear_delay_ms};
pub use snapshot::{ActiveSnapshot, GameSnapshot};
pub use timer::{Scheduler, TimerHandle, TimerToken};
