//! Lectern - content indexing for headless CMS collections.
//!
//! Collections are declared in `lectern.toml`. Each build scans a
//! collection's files, validates their frontmatter, and writes a typed
//! `index.ts` plus an `index.json` manifest next to the content. The
//! [`runtime`] module reads those manifests back.

pub mod cli;
pub mod collection;
pub mod config;
pub mod hooks;
pub mod indexer;
pub mod logger;
pub mod runtime;
pub mod utils;
