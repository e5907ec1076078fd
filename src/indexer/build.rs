//! Collection index building.
//!
//! # Pipeline
//!
//! ```text
//! resolve ─► read entry data ─► timestamps + history ─► identifier
//!                                                          │
//!          sub-indexes ◄── duplicate key check ◄───────────┘
//! ```
//!
//! Files are processed one at a time in discovery order. A failing file
//! either aborts the pass or is skipped and recorded, depending on the
//! [`ErrorPolicy`].

use super::error::{EntryError, EntryFailure, IndexError};
use super::frontmatter::{FrontmatterError, read_entry_data};
use super::history::History;
use super::identifier::Uid;
use super::resolve::{DiscoveredFile, resolve};
use crate::collection::{EntryRecord, IndexSpec, ParsedCollection};
use crate::logger::Logger;
use crate::utils::date::DateTimeUtc;
use crate::utils::path::split_extension;
use crate::debug;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fs::{self, Metadata};
use std::path::Path;

// ============================================================================
// Options
// ============================================================================

/// What happens when a single file fails to index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Stop the collection pass at the first failure.
    #[default]
    Abort,
    /// Leave the file out, record the failure, continue.
    Skip,
}

#[derive(Debug, Clone, Copy)]
pub struct IndexOptions {
    pub policy: ErrorPolicy,
    /// Look up git history for every entry.
    pub history: bool,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            policy: ErrorPolicy::Abort,
            history: true,
        }
    }
}

// ============================================================================
// Built index
// ============================================================================

/// An entry together with its key in the primary mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyedEntry {
    pub key: String,
    pub entry: EntryRecord,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    pub key: String,
    /// Entry keys, in index order.
    pub entries: Vec<String>,
}

/// Contents of a sub-index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IndexContent {
    /// Groups in first-seen order.
    Partitions(Vec<Partition>),
    /// Every entry key, sorted.
    Ordered(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuiltIndex {
    pub name: String,
    #[serde(flatten)]
    pub content: IndexContent,
}

/// Result of indexing one collection.
#[derive(Debug)]
pub struct CollectionIndex<'a> {
    pub collection: &'a ParsedCollection,
    /// Primary mapping, in discovery order.
    pub entries: Vec<KeyedEntry>,
    pub indexes: Vec<BuiltIndex>,
    /// Files left out under [`ErrorPolicy::Skip`].
    pub failures: Vec<EntryFailure>,
}

impl CollectionIndex<'_> {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&EntryRecord> {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| &e.entry)
    }
}

// ============================================================================
// Indexer
// ============================================================================

/// Indexes collections relative to a base path.
pub struct Indexer<'a> {
    base: &'a Path,
    options: IndexOptions,
    history: Option<History>,
    logger: Logger,
}

impl<'a> Indexer<'a> {
    pub fn new(base: &'a Path, options: IndexOptions, logger: &Logger) -> Self {
        let logger = logger.child("index");
        let history = if options.history {
            match History::discover(base) {
                Ok(history) => Some(history),
                Err(e) => {
                    debug!(logger; "history unavailable: {e}");
                    None
                }
            }
        } else {
            None
        };
        Self {
            base,
            options,
            history,
            logger,
        }
    }

    pub fn base(&self) -> &Path {
        self.base
    }

    /// Index one collection.
    pub fn index<'c>(&self, collection: &'c ParsedCollection) -> Result<CollectionIndex<'c>, IndexError> {
        let mut entries: Vec<KeyedEntry> = Vec::new();
        let mut owners: FxHashMap<String, String> = FxHashMap::default();
        let mut failures = Vec::new();

        for file in resolve(collection, self.base, &self.logger)? {
            let key = file.key();
            let result = match owners.get(&key) {
                Some(existing) => Err(EntryError::DuplicateKey {
                    key: key.clone(),
                    existing: existing.clone(),
                }),
                None => self.build_entry(collection, &file),
            };

            match result {
                Ok(entry) => {
                    debug!(self.logger; "indexed {} as `{key}`", file.relative);
                    owners.insert(key.clone(), file.relative.clone());
                    entries.push(KeyedEntry { key, entry });
                }
                Err(error) => {
                    let failure = EntryFailure::new(file.relative.clone(), error);
                    match self.options.policy {
                        ErrorPolicy::Abort => return Err(IndexError::Entry(failure)),
                        ErrorPolicy::Skip => {
                            // Reported together by the caller
                            debug!(self.logger; "skipping {failure}");
                            failures.push(failure);
                        }
                    }
                }
            }
        }

        let indexes = collection
            .indexes()
            .iter()
            .map(|spec| build_index(collection, spec, &entries))
            .collect();

        Ok(CollectionIndex {
            collection,
            entries,
            indexes,
            failures,
        })
    }

    fn build_entry(
        &self,
        collection: &ParsedCollection,
        file: &DiscoveredFile,
    ) -> Result<EntryRecord, EntryError> {
        let data = read_entry_data(&file.path, collection.format(), collection.schema())?;
        let metadata = fs::metadata(&file.path).map_err(|source| FrontmatterError::Io {
            path: file.path.clone(),
            source,
        })?;
        let (created_at, updated_at) = file_times(&metadata);

        let stem = split_extension(&file.file).0;
        let name = file
            .props
            .name
            .clone()
            .unwrap_or_else(|| stem.rsplit('/').next().unwrap_or(stem).to_string());

        let mut entry = EntryRecord {
            id: Uid::derive(&file.file)?,
            path: file.dir().to_string(),
            file: file.file.clone(),
            ext: file.ext().to_string(),
            data,
            created_at,
            updated_at,
            updated_by: None,
            update_message: None,
            update_commit: None,
            name,
            sort_index: self.sort_index(file),
            lang_code: file.props.lang_code.clone(),
        };

        if let Some(history) = &self.history {
            match history.latest(&file.path) {
                Ok(changes) => entry.apply_history(changes),
                Err(e) => debug!(self.logger; "no history for {}: {e}", file.relative),
            }
        }
        Ok(entry)
    }

    /// Captured sort index, `0` when absent or not a number.
    fn sort_index(&self, file: &DiscoveredFile) -> i64 {
        let Some(raw) = file.props.sort_index.as_deref() else {
            return 0;
        };
        leading_integer(raw).unwrap_or_else(|| {
            debug!(self.logger; "sort index `{raw}` of {} is not a number", file.relative);
            0
        })
    }
}

/// Integer value of the leading digits (`"3a"` -> 3, `" -2"` -> -2).
fn leading_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let unsigned = trimmed.trim_start_matches(['+', '-']);
    let sign_len = trimmed.len() - unsigned.len();
    if sign_len > 1 {
        return None;
    }
    let digits = unsigned.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    trimmed[..sign_len + digits].parse().ok()
}

/// Creation and change times of a file.
///
/// Creation falls back to modification where the platform has no birth
/// time. The change time is the inode change time on unix.
pub fn file_times(metadata: &Metadata) -> (DateTimeUtc, DateTimeUtc) {
    let modified = metadata
        .modified()
        .map(DateTimeUtc::from_system_time)
        .unwrap_or_else(|_| DateTimeUtc::epoch());
    let created = metadata
        .created()
        .map(DateTimeUtc::from_system_time)
        .unwrap_or(modified);

    #[cfg(unix)]
    let changed = {
        use std::os::unix::fs::MetadataExt;
        DateTimeUtc::from_unix_millis(metadata.ctime() * 1000 + metadata.ctime_nsec() / 1_000_000)
    };
    #[cfg(not(unix))]
    let changed = modified;

    (created, changed)
}

// ============================================================================
// Sub-indexes
// ============================================================================

/// Group and sort entries for one sub-index.
///
/// Sorting happens within each partition, with the collection's default
/// sort when the index has none. Sorts are stable.
pub fn build_index(collection: &ParsedCollection, spec: &IndexSpec, entries: &[KeyedEntry]) -> BuiltIndex {
    let sort = spec.sort_fn().or(collection.default_sort());
    let sort_entries = |list: &mut Vec<&KeyedEntry>| {
        if let Some(sort) = sort {
            list.sort_by(|a, b| sort(&a.entry, &b.entry));
        }
    };
    let keys = |list: Vec<&KeyedEntry>| -> Vec<String> {
        list.into_iter().map(|e| e.key.clone()).collect()
    };

    let content = match spec.partition_fn() {
        Some(partition) => {
            let mut groups: Vec<(String, Vec<&KeyedEntry>)> = Vec::new();
            let mut positions: FxHashMap<String, usize> = FxHashMap::default();
            for entry in entries {
                let Some(key) = partition(&entry.entry) else {
                    continue;
                };
                let position = *positions.entry(key.clone()).or_insert_with(|| {
                    groups.push((key, Vec::new()));
                    groups.len() - 1
                });
                groups[position].1.push(entry);
            }
            let partitions = groups
                .into_iter()
                .map(|(key, mut list)| {
                    sort_entries(&mut list);
                    Partition {
                        key,
                        entries: keys(list),
                    }
                })
                .collect();
            IndexContent::Partitions(partitions)
        }
        None => {
            let mut list: Vec<&KeyedEntry> = entries.iter().collect();
            sort_entries(&mut list);
            IndexContent::Ordered(keys(list))
        }
    };

    BuiltIndex {
        name: spec.name().to_string(),
        content,
    }
}
