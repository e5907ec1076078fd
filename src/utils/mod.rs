//! Shared utilities.

pub mod date;
pub mod exec;
pub mod path;
pub mod plural;
