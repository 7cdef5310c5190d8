use crate::game_state::Tetromino;
use crate::grid::Grid;
use crate::pieces::{Piece, Shape};
use crate::types::{GameStatus, ModeId, PieceKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveSnapshot {
    pub kind: PieceKind,
    pub shape: Shape,
    pub x: i32,
    pub y: i32,
}

impl From<Tetromino> for ActiveSnapshot {
    fn from(value: Tetromino) -> Self {
        Self {
            kind: value.kind,
            shape: value.shape,
            x: value.x,
            y: value.y,
        }
    }
}

/// Read-only view of a session for renderers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSnapshot {
    pub grid: Grid,
    pub active: Option<ActiveSnapshot>,
    pub ghost_y: Option<i32>,
    pub next: Option<Piece>,
    pub hold: Option<Piece>,
    pub can_hold: bool,
    pub status: GameStatus,
    pub mode: ModeId,
    pub score: u32,
    pub lines: u32,
    pub level: u32,
    /// Lines left to the target, for modes that show it.
    pub remaining_lines: Option<u32>,
    pub elapsed_ms: u64,
    pub fall_speed_ms: u32,
}

impl GameSnapshot {
    pub fn clear(&mut self) {
        self.grid.clear();
        self.active = None;
        self.ghost_y = None;
        self.next = None;
        self.hold = None;
        self.can_hold = true;
        self.status = GameStatus::Menu;
        self.mode = ModeId::default();
        self.score = 0;
        self.lines = 0;
        self.level = 1;
        self.remaining_lines = None;
        self.elapsed_ms = 0;
        self.fall_speed_ms = 0;
    }

    pub fn playable(&self) -> bool {
        self.status == GameStatus::Playing
    }
}

impl Default for GameSnapshot {
    fn default() -> Self {
        let mut s = Self {
            grid: Grid::default(),
            active: None,
            ghost_y: None,
            next: None,
            hold: None,
            can_hold: true,
            status: GameStatus::Menu,
            mode: ModeId::default(),
            score: 0,
            lines: 0,
            level: 1,
            remaining_lines: None,
            elapsed_ms: 0,
            fall_speed_ms: 0,
        };
        s.clear();
        s
    }
}
