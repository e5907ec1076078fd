//! Data provider over generated indexes.

use super::error::LookupError;
use super::import::{CollectionEntry, ImportMapper};
use crate::collection::{ContentFormat, ParsedCollection, Registry};
use crate::indexer::Uid;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Summary of a registered collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionInfo {
    pub id: Uid,
    pub name: String,
    pub export_name: String,
    pub root_dir: String,
    pub format: ContentFormat,
}

impl From<&ParsedCollection> for CollectionInfo {
    fn from(collection: &ParsedCollection) -> Self {
        Self {
            id: collection.id.clone(),
            name: collection.name.clone(),
            export_name: collection.export_name.clone(),
            root_dir: collection.root_dir.clone(),
            format: collection.format(),
        }
    }
}

pub type EntryIter<'a> = Box<dyn Iterator<Item = Result<CollectionEntry, LookupError>> + 'a>;

/// Read access to indexed collections.
pub trait DataSource {
    fn collections(&self) -> Vec<CollectionInfo>;

    /// One collection by id, name, export name or root directory.
    fn collection(&self, reference: &str) -> Result<CollectionInfo, LookupError>;

    /// Every entry of a collection.
    ///
    /// Yields a single [`LookupError::EmptyIndex`] when the index is missing
    /// or has no entries.
    fn entries(&self, reference: &str) -> EntryIter<'_>;

    /// One entry by id or key.
    fn entry(&self, collection: &str, entry: &str) -> Result<CollectionEntry, LookupError>;
}

/// [`DataSource`] reading the `index.json` of each collection.
///
/// Loaded manifests are cached per collection until [`invalidate`] is called.
///
/// [`invalidate`]: FileDataProvider::invalidate
pub struct FileDataProvider {
    base: PathBuf,
    registry: Registry,
    cache: RwLock<FxHashMap<Uid, Arc<ImportMapper>>>,
}

impl FileDataProvider {
    pub fn new(base: impl Into<PathBuf>, registry: Registry) -> Self {
        Self {
            base: base.into(),
            registry,
            cache: RwLock::new(FxHashMap::default()),
        }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Drop every cached manifest.
    pub fn invalidate(&self) {
        self.cache.write().clear();
    }

    fn find(&self, reference: &str) -> Result<&ParsedCollection, LookupError> {
        self.registry
            .get(reference)
            .ok_or_else(|| LookupError::UnknownCollection(reference.to_string()))
    }

    /// Loaded, non-empty index of a collection.
    fn mapper(&self, collection: &ParsedCollection) -> Result<Arc<ImportMapper>, LookupError> {
        if let Some(mapper) = self.cache.read().get(&collection.id) {
            return Ok(Arc::clone(mapper));
        }

        let path = self.base.join(&collection.root_dir).join("index.json");
        if !path.is_file() {
            return Err(LookupError::EmptyIndex(collection.name.clone()));
        }
        let mapper = ImportMapper::load(&path)?;
        if mapper.is_empty() {
            return Err(LookupError::EmptyIndex(collection.name.clone()));
        }

        let mapper = Arc::new(mapper);
        self.cache
            .write()
            .insert(collection.id.clone(), Arc::clone(&mapper));
        Ok(mapper)
    }
}

impl DataSource for FileDataProvider {
    fn collections(&self) -> Vec<CollectionInfo> {
        self.registry.iter().map(CollectionInfo::from).collect()
    }

    fn collection(&self, reference: &str) -> Result<CollectionInfo, LookupError> {
        self.find(reference).map(CollectionInfo::from)
    }

    fn entries(&self, reference: &str) -> EntryIter<'_> {
        let mapper = match self.find(reference).and_then(|c| self.mapper(c)) {
            Ok(mapper) => mapper,
            Err(e) => return Box::new(std::iter::once(Err(e))),
        };
        let count = mapper.entries().len();
        Box::new((0..count).map(move |i| Ok(mapper.entries()[i].clone())))
    }

    fn entry(&self, collection: &str, entry: &str) -> Result<CollectionEntry, LookupError> {
        let parsed = self.find(collection)?;
        let mapper = self.mapper(parsed)?;
        mapper
            .entry(entry)
            .cloned()
            .ok_or_else(|| LookupError::UnknownEntry {
                collection: parsed.name.clone(),
                entry: entry.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::{CollectionDefinition, PathPattern};
    use crate::indexer::{DEFAULT_IMPORT_SOURCE, EmitTarget, IndexOptions, Indexer, generate};
    use crate::logger::Logger;
    use std::fs;
    use tempfile::TempDir;

    fn site() -> (TempDir, FileDataProvider) {
        let temp = TempDir::new().unwrap();
        let pages = temp.path().join("pages");
        fs::create_dir_all(pages.join("guide")).unwrap();
        fs::write(pages.join("intro.md"), "---\ntitle: Intro\n---\nHello\n").unwrap();
        fs::write(pages.join("guide/setup.md"), "---\ntitle: Setup\n---\n").unwrap();
        fs::create_dir_all(temp.path().join("posts")).unwrap();

        let mut registry = Registry::new();
        registry
            .register(CollectionDefinition::new(PathPattern::root("pages").any()))
            .unwrap();
        registry
            .register(CollectionDefinition::new(PathPattern::root("posts").any()))
            .unwrap();

        let logger = Logger::silent();
        let options = IndexOptions {
            history: false,
            ..IndexOptions::default()
        };
        let indexer = Indexer::new(temp.path(), options, &logger);
        for collection in &registry {
            generate(&indexer, collection, &[EmitTarget::Json], DEFAULT_IMPORT_SOURCE).unwrap();
        }

        let provider = FileDataProvider::new(temp.path(), registry);
        (temp, provider)
    }

    #[test]
    fn test_collections() {
        let (_temp, provider) = site();
        let names: Vec<_> = provider.collections().into_iter().map(|c| c.name).collect();
        assert_eq!(names, ["Pages", "Posts"]);
        assert_eq!(provider.collection("pages").unwrap().export_name, "pages");
        assert!(matches!(
            provider.collection("nope"),
            Err(LookupError::UnknownCollection(_))
        ));
    }

    #[test]
    fn test_entries() {
        let (_temp, provider) = site();
        let keys: Vec<_> = provider
            .entries("Pages")
            .map(|e| e.unwrap().key)
            .collect();
        assert_eq!(keys, ["guide/setup", "intro"]);
    }

    #[test]
    fn test_empty_index_fails_fast() {
        let (_temp, provider) = site();
        let results: Vec<_> = provider.entries("posts").collect();
        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], Err(LookupError::EmptyIndex(_))));
    }

    #[test]
    fn test_missing_index_fails_fast() {
        let (temp, provider) = site();
        fs::remove_file(temp.path().join("pages/index.json")).unwrap();
        assert!(matches!(
            provider.entries("pages").next(),
            Some(Err(LookupError::EmptyIndex(_)))
        ));
    }

    #[test]
    fn test_entry_lookup_and_content() {
        let (_temp, provider) = site();
        let intro = provider.entry("pages", "intro").unwrap();
        let by_id = provider.entry("pages", intro.id()).unwrap();
        assert_eq!(by_id.key, "intro");
        assert_eq!(by_id.content().unwrap(), "Hello\n");
        assert!(matches!(
            provider.entry("pages", "missing"),
            Err(LookupError::UnknownEntry { .. })
        ));
    }

    #[test]
    fn test_cache_until_invalidated() {
        let (temp, provider) = site();
        assert_eq!(provider.entries("pages").count(), 2);

        fs::remove_file(temp.path().join("pages/index.json")).unwrap();
        assert_eq!(provider.entries("pages").count(), 2);

        provider.invalidate();
        assert!(provider.entries("pages").next().unwrap().is_err());
    }
}
