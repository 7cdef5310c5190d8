//! GameView: maps a `GameSnapshot` into a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.

use crate::core::{rules, GameSnapshot, HighScoreTable, Piece, MODES};
use crate::fb::{Cell, CellStyle, FrameBuffer, Rgb};
use crate::types::{GameStatus, ModeId, PieceKind};

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorY {
    Center,
    Top,
}

const BOARD_BG: Rgb = Rgb::new(30, 30, 40);
const LABEL: CellStyle = CellStyle::fg(Rgb::new(220, 220, 220)).bold();
const VALUE: CellStyle = CellStyle::fg(Rgb::new(200, 200, 200));
const BANNER: CellStyle = CellStyle::fg(Rgb::new(255, 255, 255)).bold();

/// Entries listed per mode on the menu.
const MENU_SCORE_ROWS: usize = 5;

/// A lightweight terminal renderer for the game.
pub struct GameView {
    /// Board cell width in terminal columns.
    cell_w: u16,
    /// Board cell height in terminal rows.
    cell_h: u16,
    anchor_y: AnchorY,
}

impl Default for GameView {
    fn default() -> Self {
        // 2x1 helps compensate for typical terminal glyph aspect ratio.
        Self {
            cell_w: 2,
            cell_h: 1,
            anchor_y: AnchorY::Center,
        }
    }
}

/// Board placement inside the viewport.
#[derive(Debug, Clone, Copy)]
struct Frame {
    x: u16,
    y: u16,
    w: u16,
    h: u16,
}

impl GameView {
    pub fn new(cell_w: u16, cell_h: u16) -> Self {
        Self {
            cell_w,
            cell_h,
            anchor_y: AnchorY::Center,
        }
    }

    pub fn with_anchor_y(mut self, anchor_y: AnchorY) -> Self {
        self.anchor_y = anchor_y;
        self
    }

    /// Render a snapshot into an existing framebuffer.
    pub fn render_into(&self, snap: &GameSnapshot, viewport: Viewport, fb: &mut FrameBuffer) {
        self.render_into_with_scores(snap, None, viewport, fb);
    }

    /// Render a snapshot; on the menu, `scores` fills the side panel.
    pub fn render_into_with_scores(
        &self,
        snap: &GameSnapshot,
        scores: Option<&HighScoreTable>,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(Cell::default());

        let rows = snap.grid.rows() as u16;
        let cols = snap.grid.cols() as u16;
        let board_w = cols * self.cell_w;
        let board_h = rows * self.cell_h;
        let frame = Frame {
            x: viewport.width.saturating_sub(board_w + 2) / 2,
            y: match self.anchor_y {
                AnchorY::Center => viewport.height.saturating_sub(board_h + 2) / 2,
                AnchorY::Top => 0,
            },
            w: board_w + 2,
            h: board_h + 2,
        };

        fb.fill_rect(
            frame.x + 1,
            frame.y + 1,
            board_w,
            board_h,
            ' ',
            CellStyle::fg(Rgb::new(80, 80, 90)).on(BOARD_BG),
        );
        draw_border(fb, frame, CellStyle::fg(Rgb::new(200, 200, 200)));

        // Locked cells.
        for y in 0..rows {
            for x in 0..cols {
                match snap.grid.get(x as i32, y as i32).flatten() {
                    Some(kind) => self.draw_board_cell(fb, frame, x, y, kind),
                    None => self.fill_cell_rect(
                        fb,
                        frame,
                        x,
                        y,
                        '·',
                        CellStyle::fg(Rgb::new(90, 90, 100)).on(BOARD_BG).dim(),
                    ),
                }
            }
        }

        if let Some(active) = snap.active {
            if let Some(ghost_y) = snap.ghost_y {
                let ghost = CellStyle::fg(Rgb::new(140, 140, 140)).on(BOARD_BG).dim();
                for (r, c) in active.shape.occupied() {
                    let (x, y) = (active.x + c as i32, ghost_y + r as i32);
                    if in_board(x, y, cols, rows) {
                        self.fill_cell_rect(fb, frame, x as u16, y as u16, '░', ghost);
                    }
                }
            }
            // Cells above the grid are not drawn.
            for (r, c) in active.shape.occupied() {
                let (x, y) = (active.x + c as i32, active.y + r as i32);
                if in_board(x, y, cols, rows) {
                    self.draw_board_cell(fb, frame, x as u16, y as u16, active.kind);
                }
            }
        }

        self.draw_side_panel(fb, snap, scores, viewport, frame);

        match snap.status {
            GameStatus::Menu => self.draw_menu(fb, snap.mode, frame),
            GameStatus::Paused => {
                draw_overlay(fb, frame, &["PAUSED", "P resume"]);
            }
            GameStatus::GameOver => {
                draw_overlay(fb, frame, &["GAME OVER", "R retry  ESC menu"]);
            }
            GameStatus::Victory => {
                let time = format_time(snap.elapsed_ms);
                draw_overlay(fb, frame, &["VICTORY", time.as_str(), "R retry  ESC menu"]);
            }
            GameStatus::Playing => {}
        }
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(&self, snap: &GameSnapshot, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(snap, viewport, &mut fb);
        fb
    }

    pub fn render_with_scores(
        &self,
        snap: &GameSnapshot,
        scores: Option<&HighScoreTable>,
        viewport: Viewport,
    ) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into_with_scores(snap, scores, viewport, &mut fb);
        fb
    }

    fn draw_board_cell(&self, fb: &mut FrameBuffer, frame: Frame, x: u16, y: u16, kind: PieceKind) {
        let style = CellStyle::fg(piece_color(kind)).on(BOARD_BG).bold();
        self.fill_cell_rect(fb, frame, x, y, '█', style);
    }

    fn fill_cell_rect(
        &self,
        fb: &mut FrameBuffer,
        frame: Frame,
        cell_x: u16,
        cell_y: u16,
        ch: char,
        style: CellStyle,
    ) {
        let px = frame.x + 1 + cell_x * self.cell_w;
        let py = frame.y + 1 + cell_y * self.cell_h;
        fb.fill_rect(px, py, self.cell_w, self.cell_h, ch, style);
    }

    fn draw_side_panel(
        &self,
        fb: &mut FrameBuffer,
        snap: &GameSnapshot,
        scores: Option<&HighScoreTable>,
        viewport: Viewport,
        frame: Frame,
    ) {
        let panel_x = frame.x.saturating_add(frame.w).saturating_add(2);
        if panel_x >= viewport.width || viewport.width - panel_x < 12 {
            return;
        }
        let rules = rules(snap.mode);

        let mut y = frame.y;
        fb.put_str(panel_x, y, "MODE", LABEL);
        fb.put_str(panel_x, y + 1, rules.label, VALUE);
        y += 3;

        if snap.status == GameStatus::Menu {
            if let Some(table) = scores {
                draw_high_scores(fb, table, snap.mode, panel_x, y);
            }
            return;
        }

        fb.put_str(panel_x, y, "SCORE", LABEL);
        fb.put_u32(panel_x, y + 1, snap.score, VALUE);
        y += 3;

        fb.put_str(panel_x, y, "LEVEL", LABEL);
        fb.put_u32(panel_x, y + 1, snap.level, VALUE);
        y += 3;

        match snap.remaining_lines {
            Some(left) => {
                fb.put_str(panel_x, y, "LEFT", LABEL);
                fb.put_u32(panel_x, y + 1, left, VALUE);
            }
            None => {
                fb.put_str(panel_x, y, "LINES", LABEL);
                fb.put_u32(panel_x, y + 1, snap.lines, VALUE);
            }
        }
        y += 3;

        if rules.has_timer {
            fb.put_str(panel_x, y, "TIME", LABEL);
            fb.put_str(panel_x, y + 1, &format_time(snap.elapsed_ms), VALUE);
            y += 3;
        }

        fb.put_str(panel_x, y, "HOLD", LABEL);
        let hold_style = if snap.can_hold { VALUE } else { VALUE.dim() };
        y = draw_preview(fb, snap.hold, panel_x, y + 1, hold_style) + 1;

        fb.put_str(panel_x, y, "NEXT", LABEL);
        draw_preview(fb, snap.next, panel_x, y + 1, VALUE);
    }

    fn draw_menu(&self, fb: &mut FrameBuffer, selected: ModeId, frame: Frame) {
        let mut lines: Vec<String> = Vec::with_capacity(MODES.len() + 5);
        lines.push("BLOCKFALL".to_string());
        lines.push(String::new());
        for (i, m) in MODES.iter().enumerate() {
            let marker = if m.id == selected { '>' } else { ' ' };
            lines.push(format!("{marker} {} {}", i + 1, m.label));
        }
        lines.push(String::new());
        lines.push("ENTER start  Q quit".to_string());

        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        draw_overlay(fb, frame, &refs);

        // Description under the board, wrapped to the frame width.
        let desc = CellStyle::default().dim();
        let width = frame.w.max(1) as usize;
        let mut y = frame.y.saturating_add(frame.h);
        for chunk in wrap(rules(selected).description, width) {
            fb.put_str(frame.x, y, &chunk, desc);
            y = y.saturating_add(1);
        }
    }
}

fn in_board(x: i32, y: i32, cols: u16, rows: u16) -> bool {
    x >= 0 && y >= 0 && x < cols as i32 && y < rows as i32
}

fn draw_border(fb: &mut FrameBuffer, f: Frame, style: CellStyle) {
    if f.w < 2 || f.h < 2 {
        return;
    }

    fb.put_char(f.x, f.y, '┌', style);
    fb.put_char(f.x + f.w - 1, f.y, '┐', style);
    fb.put_char(f.x, f.y + f.h - 1, '└', style);
    fb.put_char(f.x + f.w - 1, f.y + f.h - 1, '┘', style);

    for dx in 1..f.w - 1 {
        fb.put_char(f.x + dx, f.y, '─', style);
        fb.put_char(f.x + dx, f.y + f.h - 1, '─', style);
    }
    for dy in 1..f.h - 1 {
        fb.put_char(f.x, f.y + dy, '│', style);
        fb.put_char(f.x + f.w - 1, f.y + dy, '│', style);
    }
}

/// Centered block of lines in the middle of the board.
fn draw_overlay(fb: &mut FrameBuffer, f: Frame, lines: &[&str]) {
    let top = f.y + (f.h / 2).saturating_sub(lines.len() as u16 / 2);
    for (i, text) in lines.iter().enumerate() {
        let w = text.chars().count() as u16;
        let x = f.x + f.w.saturating_sub(w) / 2;
        let style = if i == 0 { BANNER } else { VALUE };
        fb.put_str(x, top + i as u16, text, style);
    }
}

/// Draw a piece's shape in two-column cells. Returns the row after it.
fn draw_preview(fb: &mut FrameBuffer, piece: Option<Piece>, x: u16, y: u16, style: CellStyle) -> u16 {
    let Some(piece) = piece else {
        fb.put_str(x, y, "-", style);
        return y + 2;
    };

    let color = CellStyle {
        fg: piece_color(piece.kind),
        ..style
    };
    let top = piece.shape.top_offset();
    let mut last = 0;
    for (r, c) in piece.shape.occupied() {
        let row = (r - top) as u16;
        fb.put_str(x + c as u16 * 2, y + row, "██", color);
        last = last.max(row);
    }
    y + last + 2
}

fn draw_high_scores(fb: &mut FrameBuffer, table: &HighScoreTable, mode: ModeId, x: u16, y: u16) {
    fb.put_str(x, y, "BEST", LABEL);
    let entries = table.entries(mode);
    if entries.is_empty() {
        fb.put_str(x, y + 1, "no scores yet", VALUE.dim());
        return;
    }

    for (i, entry) in entries.iter().take(MENU_SCORE_ROWS).enumerate() {
        let row = y + 1 + i as u16;
        let cx = fb.put_u32(x, row, i as u32 + 1, VALUE.dim());
        let cx = fb.put_str(cx, row, ". ", VALUE.dim());
        match (mode, entry.time) {
            (ModeId::Sprint, Some(ms)) => {
                fb.put_str(cx, row, &format_time(ms), VALUE);
            }
            _ => {
                fb.put_u32(cx, row, entry.score, VALUE);
            }
        }
    }
}

fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        if !line.is_empty() && line.chars().count() + 1 + word.chars().count() > width {
            out.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        out.push(line);
    }
    out
}

pub fn piece_color(kind: PieceKind) -> Rgb {
    match kind {
        PieceKind::I => Rgb::new(80, 220, 220),
        PieceKind::O => Rgb::new(240, 220, 80),
        PieceKind::T => Rgb::new(200, 120, 220),
        PieceKind::S => Rgb::new(100, 220, 120),
        PieceKind::Z => Rgb::new(220, 80, 80),
        PieceKind::J => Rgb::new(80, 120, 220),
        PieceKind::L => Rgb::new(255, 165, 0),
    }
}

/// `MM:SS.cc` session time.
pub fn format_time(ms: u64) -> String {
    let minutes = ms / 60_000;
    let seconds = (ms / 1000) % 60;
    let centis = (ms % 1000) / 10;
    format!("{minutes:02}:{seconds:02}.{centis:02}")
}
