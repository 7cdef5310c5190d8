//! Scoring module - line clear points, drop bonus and clear windows
//!
//! Classic table scoring: base points for 1-4 simultaneous lines multiplied by
//! the level in force when the clear resolves. Hard drops add a flat bonus
//! per row travelled. Soft drops score nothing.

use crate::types::{
    HARD_DROP_POINTS_PER_ROW, LINE_CLEAR_DELAYS_MS, LINE_CLEAR_FALLBACK_MS, LINE_SCORES,
};

/// Largest simultaneous clear (a "tetris").
pub const MAX_CLEAR: usize = 4;

/// Calculate line clear score
/// lines: number of lines cleared (0-4)
/// level: current level (1-based)
pub fn calculate_line_score(lines: usize, level: u32) -> u32 {
    LINE_SCORES
        .get(lines)
        .copied()
        .unwrap_or(0)
        .saturating_mul(level)
}

/// Hard drop bonus for the rows travelled
pub fn calculate_drop_score(rows: u32) -> u32 {
    rows.saturating_mul(HARD_DROP_POINTS_PER_ROW)
}

/// Length of the clear animation window for a simultaneous line count
pub fn line_clear_delay_ms(lines: usize) -> u32 {
    match lines {
        1..=MAX_CLEAR => LINE_CLEAR_DELAYS_MS[lines],
        _ => LINE_CLEAR_FALLBACK_MS,
    }
}

/// Effect intensity for a clear (1-4)
pub fn clear_intensity(lines: usize) -> u8 {
    lines.clamp(1, MAX_CLEAR) as u8
}
