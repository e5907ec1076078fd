//! Runtime view of generated indexes.
//!
//! [`ImportMapper`] loads an `index.json` and turns every record into a
//! [`CollectionEntry`]. Entry bodies are only read when asked for.

use super::error::LookupError;
use crate::collection::{ContentFormat, EntryRecord};
use crate::indexer::IndexManifest;
use crate::indexer::frontmatter::split_body;
use pulldown_cmark::{Options, Parser, html};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// An indexed entry with lazy access to its body.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionEntry {
    pub key: String,
    #[serde(flatten)]
    pub record: EntryRecord,
    #[serde(skip)]
    source: PathBuf,
    #[serde(skip)]
    format: ContentFormat,
    #[serde(skip)]
    content: OnceLock<String>,
}

impl CollectionEntry {
    pub fn new(key: String, record: EntryRecord, source: PathBuf, format: ContentFormat) -> Self {
        Self {
            key,
            record,
            source,
            format,
            content: OnceLock::new(),
        }
    }

    pub fn id(&self) -> &str {
        self.record.id.as_str()
    }

    pub fn data(&self) -> &serde_json::Value {
        &self.record.data
    }

    /// Absolute path of the content file.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Whether `reference` is this entry's id or key.
    pub fn is_named(&self, reference: &str) -> bool {
        self.record.id.as_str().eq_ignore_ascii_case(reference) || self.key == reference
    }

    /// Body after the frontmatter block, read on first access.
    ///
    /// Data formats have no body and yield an empty string.
    pub fn content(&self) -> Result<&str, LookupError> {
        if let Some(content) = self.content.get() {
            return Ok(content);
        }
        let body = if self.format.has_frontmatter() {
            let text = fs::read_to_string(&self.source).map_err(|source| LookupError::Read {
                path: self.source.clone(),
                source,
            })?;
            split_body(&text).to_string()
        } else {
            String::new()
        };
        Ok(self.content.get_or_init(|| body))
    }

    /// Body rendered as HTML.
    pub fn render_html(&self) -> Result<String, LookupError> {
        let content = self.content()?;
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS;
        let mut out = String::with_capacity(content.len() * 3 / 2);
        html::push_html(&mut out, Parser::new_ext(content, options));
        Ok(out)
    }
}

/// Entries of one generated `index.json`.
#[derive(Debug)]
pub struct ImportMapper {
    manifest: IndexManifest,
    entries: Vec<CollectionEntry>,
}

impl ImportMapper {
    /// Load a manifest. Entry sources resolve against its directory.
    pub fn load(index_json: &Path) -> Result<Self, LookupError> {
        let text = fs::read_to_string(index_json).map_err(|source| LookupError::Read {
            path: index_json.to_path_buf(),
            source,
        })?;
        let manifest: IndexManifest =
            serde_json::from_str(&text).map_err(|e| LookupError::Manifest {
                path: index_json.to_path_buf(),
                message: e.to_string(),
            })?;
        let dir = index_json.parent().unwrap_or(Path::new("."));
        Ok(Self::from_manifest(manifest, dir))
    }

    pub fn from_manifest(manifest: IndexManifest, scan_dir: &Path) -> Self {
        let format = manifest.collection.format;
        let entries = manifest
            .entries
            .iter()
            .map(|keyed| {
                let source = scan_dir.join(&keyed.entry.file);
                CollectionEntry::new(keyed.key.clone(), keyed.entry.clone(), source, format)
            })
            .collect();
        Self { manifest, entries }
    }

    pub fn manifest(&self) -> &IndexManifest {
        &self.manifest
    }

    pub fn entries(&self) -> &[CollectionEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find an entry by id or key.
    pub fn entry(&self, reference: &str) -> Option<&CollectionEntry> {
        self.entries.iter().find(|e| e.is_named(reference))
    }
}
