//! Terminal input module (engine-facing).
//!
//! Maps `crossterm` key events into [`crate::types::GameAction`]. There is no
//! key-repeat timing here; the terminal's own auto-repeat drives held keys.

pub mod map;

pub use blockfall_types as types;

pub use map::{handle_key_event, should_quit};
