//! Collection indexing.
//!
//! # Module Structure
//!
//! ```text
//! indexer/
//! ├── resolve       # File discovery by pattern
//! ├── frontmatter   # Frontmatter extraction + schema validation
//! ├── history       # Git history lookup (gix)
//! ├── identifier    # Content-addressed identifiers
//! ├── build         # Entry enrichment, error policy, sub-indexes
//! ├── emit          # index.ts / index.json artifacts
//! ├── report        # Build report
//! └── error         # IndexError, EntryError, EntryFailure
//! ```

pub mod build;
pub mod emit;
pub mod error;
pub mod frontmatter;
pub mod history;
pub mod identifier;
pub mod report;
pub mod resolve;


pub use build::{
    BuiltIndex, CollectionIndex, ErrorPolicy, IndexContent, IndexOptions, Indexer, KeyedEntry,
    Partition,
};
pub use emit::{
    DEFAULT_IMPORT_SOURCE, EmitTarget, IndexEmitter, IndexManifest, JsonEmitter,
    TypeScriptEmitter, write_artifacts,
};
pub use error::{EntryError, EntryFailure, IndexError};
pub use identifier::{IdentifierError, Uid};
pub use report::BuildReport;

use crate::collection::ParsedCollection;
use std::path::PathBuf;

/// An indexed collection and the artifacts written for it.
#[derive(Debug)]
pub struct Generated<'c> {
    pub index: CollectionIndex<'c>,
    pub written: Vec<PathBuf>,
}

/// Index a collection and write its artifacts.
pub fn generate<'c>(
    indexer: &Indexer<'_>,
    collection: &'c ParsedCollection,
    targets: &[EmitTarget],
    import_source: &str,
) -> Result<Generated<'c>, IndexError> {
    let index = indexer.index(collection)?;
    let written = write_artifacts(&index, indexer.base(), targets, import_source)?;
    Ok(Generated { index, written })
}
