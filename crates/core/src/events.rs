//! One-way notifications for effects, audio and overlays.
//!
//! Events are queued by the game state after the mutation they describe has
//! completed and are drained by the host with `GameState::take_events`.
//! Nothing a consumer does with them can reach back into the game.

use crate::types::{ModeId, PieceKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineEvent {
    /// A session started in `mode`.
    GameStarted { mode: ModeId },
    /// The current piece was written into the grid.
    PieceLocked { kind: PieceKind, hard_drop: bool },
    /// A complete row was found; its removal is pending.
    LineCleared { row: usize, cols: usize, intensity: u8 },
    /// Pending rows were removed after the clear window.
    LinesRemoved { count: u32 },
    /// The current piece rotated.
    Rotated,
    /// The current piece went to the hold slot.
    Held,
    LevelChanged { level: u32 },
    Paused,
    Resumed,
    GameOver,
    Victory,
}

impl EngineEvent {
    /// True for the maximum-value four-line clear.
    pub fn is_tetris(&self) -> bool {
        matches!(self, EngineEvent::LinesRemoved { count: 4 })
    }
}
