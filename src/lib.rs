//! Blockfall (workspace facade crate).
//!
//! The implementation lives in dedicated crates under `crates/`; this package
//! re-exports them as `blockfall::{core, input, term, types}` and adds the
//! pieces only the runner needs: file configuration and log setup.

pub mod config;
pub mod logging;

pub use blockfall_core as core;
pub use blockfall_input as input;
pub use blockfall_term as term;
pub use blockfall_types as types;
