//! Collection declarations.
//!
//! | Module       | Purpose                                              |
//! |--------------|------------------------------------------------------|
//! | `pattern`    | Structured path patterns and their compiler          |
//! | `schema`     | JSON Schema validation and TypeScript type printing  |
//! | `entry`      | Entry records, field references, sort order          |
//! | `definition` | Collection definitions, sub-index specs, naming      |
//! | `registry`   | Ordered set of registered collections                |

pub mod definition;
pub mod entry;
pub mod pattern;
pub mod registry;
pub mod schema;

pub use definition::{
    CollectionDefinition, ContentFormat, DefinitionError, IndexSpec, ParsedCollection,
    PartitionFn, SortFn,
};
pub use entry::{EntryRecord, FieldRef, LatestChanges, SortOrder, UpdatedBy};
pub use pattern::{Capture, CompiledPattern, PathPattern, PathProps, PatternError, Segment};
pub use registry::Registry;
pub use schema::{Schema, SchemaError, Violation};
