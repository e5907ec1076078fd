//! Configuration section definitions.
//!
//! Each module corresponds to a section in `lectern.toml`:
//!
//! | Module       | TOML Section     | Purpose                              |
//! |--------------|------------------|--------------------------------------|
//! | `build`      | `[build]`        | Error policy, artifacts, format hook |
//! | `collection` | `[[collection]]` | Collection declarations              |

mod build;
mod collection;

pub use build::BuildConfig;
pub use collection::{CollectionConfig, IndexConfig, PartitionConfig, SchemaSource, SortConfig};
