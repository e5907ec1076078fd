//! Read access to generated indexes.

pub mod error;
pub mod import;
pub mod provider;

pub use error::LookupError;
pub use import::{CollectionEntry, ImportMapper};
pub use provider::{CollectionInfo, DataSource, EntryIter, FileDataProvider};
