//! Mode policy table
//!
//! Each [`ModeId`] maps to a static [`ModeRules`] record: level formula,
//! fall-speed curve, timer usage and win condition. The engine consults the
//! record whenever level or speed must be recomputed.

use crate::types::{ModeId, BASE_FALL_MS, MIN_FALL_MS};

/// Session values a level formula may depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LevelInputs {
    pub lines: u32,
    pub elapsed_ms: u64,
}

/// Rules for one game mode.
#[derive(Debug, Clone, Copy)]
pub struct ModeRules {
    pub id: ModeId,
    pub label: &'static str,
    pub description: &'static str,
    /// Whether the session clock runs (and elapsed time is recorded).
    pub has_timer: bool,
    /// Whether the line counter shows lines left instead of lines done.
    pub show_remaining_lines: bool,
    /// Line count that ends the session in victory.
    pub target_lines: Option<u32>,
    level: fn(LevelInputs) -> u32,
    fall_speed: fn(u32) -> u32,
}

impl ModeRules {
    /// Level for the given session values.
    pub fn level(&self, inputs: LevelInputs) -> u32 {
        (self.level)(inputs)
    }

    /// Gravity interval in milliseconds at `level`.
    pub fn fall_speed_ms(&self, level: u32) -> u32 {
        (self.fall_speed)(level)
    }

    /// Lines left before the target, if this mode has one.
    pub fn remaining_lines(&self, lines: u32) -> Option<u32> {
        self.target_lines.map(|target| target.saturating_sub(lines))
    }

    /// Whether `lines` meets the win condition.
    pub fn target_reached(&self, lines: u32) -> bool {
        self.target_lines.is_some_and(|target| lines >= target)
    }
}

fn marathon_level(inputs: LevelInputs) -> u32 {
    inputs.lines / 10 + 1
}

fn marathon_speed(level: u32) -> u32 {
    let step = level.saturating_sub(1).saturating_mul(50);
    BASE_FALL_MS.saturating_sub(step).max(MIN_FALL_MS)
}

fn sprint_level(_: LevelInputs) -> u32 {
    1
}

fn sprint_speed(_: u32) -> u32 {
    500
}

fn survival_level(inputs: LevelInputs) -> u32 {
    let seconds = inputs.elapsed_ms / 1000;
    (seconds / 30) as u32 + 1
}

fn survival_speed(level: u32) -> u32 {
    let step = level.saturating_sub(1).saturating_mul(100);
    BASE_FALL_MS.saturating_sub(step).max(MIN_FALL_MS)
}

/// Dispatch table, one record per mode in [`ModeId::ALL`] order.
pub static MODES: [ModeRules; 3] = [
    ModeRules {
        id: ModeId::Marathon,
        label: "Marathon",
        description: "Endless classic play. Score as many points as you can.",
        has_timer: false,
        show_remaining_lines: false,
        target_lines: None,
        level: marathon_level,
        fall_speed: marathon_speed,
    },
    ModeRules {
        id: ModeId::Sprint,
        label: "Sprint",
        description: "Clear 40 lines as fast as possible.",
        has_timer: true,
        show_remaining_lines: true,
        target_lines: Some(40),
        level: sprint_level,
        fall_speed: sprint_speed,
    },
    ModeRules {
        id: ModeId::Survival,
        label: "Survival",
        description: "Speed rises every 30 seconds. Hold on.",
        has_timer: true,
        show_remaining_lines: false,
        target_lines: None,
        level: survival_level,
        fall_speed: survival_speed,
    },
];

/// Rules for a mode id.
pub fn rules(id: ModeId) -> &'static ModeRules {
    match id {
        ModeId::Marathon => &MODES[0],
        ModeId::Sprint => &MODES[1],
        ModeId::Survival => &MODES[2],
    }
}

/// Rules for a mode name, falling back to marathon for unknown names.
pub fn rules_by_name(name: &str) -> &'static ModeRules {
    rules(ModeId::from_str(name).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(lines: u32) -> LevelInputs {
        LevelInputs {
            lines,
            elapsed_ms: 0,
        }
    }

    fn elapsed(elapsed_ms: u64) -> LevelInputs {
        LevelInputs {
            lines: 0,
            elapsed_ms,
        }
    }

    #[test]
    fn test_table_order_matches_ids() {
        for (rules, id) in MODES.iter().zip(ModeId::ALL) {
            assert_eq!(rules.id, id);
        }
    }

    #[test]
    fn test_marathon_curve() {
        let m = rules(ModeId::Marathon);
        assert_eq!(m.level(lines(0)), 1);
        assert_eq!(m.level(lines(9)), 1);
        assert_eq!(m.level(lines(10)), 2);
        assert_eq!(m.level(lines(100)), 11);

        assert_eq!(m.fall_speed_ms(1), 1000);
        assert_eq!(m.fall_speed_ms(2), 950);
        assert_eq!(m.fall_speed_ms(11), 500);
        assert_eq!(m.fall_speed_ms(20), 50);
        assert_eq!(m.fall_speed_ms(40), 50);
        assert!(!m.has_timer);
        assert_eq!(m.remaining_lines(12), None);
        assert!(!m.target_reached(1_000));
    }

    #[test]
    fn test_sprint_rules() {
        let s = rules(ModeId::Sprint);
        assert_eq!(s.level(lines(39)), 1);
        assert_eq!(s.fall_speed_ms(7), 500);
        assert!(s.has_timer);
        assert!(s.show_remaining_lines);
        assert_eq!(s.remaining_lines(12), Some(28));
        assert_eq!(s.remaining_lines(45), Some(0));
        assert!(!s.target_reached(39));
        assert!(s.target_reached(40));
    }

    #[test]
    fn test_survival_curve() {
        let s = rules(ModeId::Survival);
        assert_eq!(s.level(elapsed(0)), 1);
        assert_eq!(s.level(elapsed(29_999)), 1);
        assert_eq!(s.level(elapsed(30_000)), 2);
        assert_eq!(s.level(elapsed(95_000)), 4);

        assert_eq!(s.fall_speed_ms(1), 1000);
        assert_eq!(s.fall_speed_ms(4), 700);
        assert_eq!(s.fall_speed_ms(10), 100);
        assert_eq!(s.fall_speed_ms(11), 50);
        assert_eq!(s.fall_speed_ms(30), 50);
    }

    #[test]
    fn test_unknown_name_falls_back_to_marathon() {
        assert_eq!(rules_by_name("zen").id, ModeId::Marathon);
        assert_eq!(rules_by_name("SPRINT").id, ModeId::Sprint);
    }
}
