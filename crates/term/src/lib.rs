//! Terminal "game renderer" module.
//!
//! A small, game-oriented rendering layer: [`GameView`] turns a
//! [`core::GameSnapshot`] into a framebuffer of styled characters, and
//! [`TerminalRenderer`] flushes that framebuffer through `crossterm`.
//! The view never touches game state; it only reads snapshots.

pub mod fb;
pub mod game_view;
pub mod renderer;

pub use blockfall_core as core;
pub use blockfall_types as types;

pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use game_view::{format_time, piece_color, AnchorY, GameView, Viewport};
pub use renderer::{encode_changed_rows_into, encode_full_into, TerminalRenderer};
