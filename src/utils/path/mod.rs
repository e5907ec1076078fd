//! Path utilities.
//!
//! Pure functions for path manipulation. No side effects.
//!
//! - [`fs`]: Filesystem path normalization (`normalize_path`, `resolve_path`)
//!   and slash-separated relative paths (`relative_slash`, `to_slash`)

pub mod fs;

pub use fs::{normalize_path, relative_slash, resolve_path, split_extension, to_slash};
