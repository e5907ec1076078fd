//! Hook system for build automation.
//!
//! - `runner`: format hook execution (`$LECTERN_*` variables, command execution)

mod runner;

pub use runner::*;
