//! Content file discovery.
//!
//! Walks the scan directory of a collection, keeps files whose extension the
//! collection format supports and whose base-relative path matches the
//! compiled pattern. Directory listings are sorted by file name, so discovery
//! order is the same on every run.

use super::error::IndexError;
use crate::collection::{ParsedCollection, PathProps};
use crate::debug;
use crate::logger::Logger;
use crate::utils::path::{relative_slash, split_extension};
use jwalk::{Parallelism, WalkDir};
use std::path::{Path, PathBuf};

/// Generated artifacts living in the scan directory.
pub const GENERATED_FILES: &[&str] = &["index.ts", "index.json"];

/// A content file matched by a collection pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    /// Absolute path.
    pub path: PathBuf,
    /// Path relative to the base path, `/`-separated.
    pub relative: String,
    /// Path relative to the scan directory, `/`-separated.
    pub file: String,
    pub props: PathProps,
}

impl DiscoveredFile {
    /// Directory relative to the scan directory, `.` at the top level.
    pub fn dir(&self) -> &str {
        match self.file.rsplit_once('/') {
            Some((dir, _)) => dir,
            None => ".",
        }
    }

    pub fn ext(&self) -> &str {
        split_extension(&self.file).1
    }

    pub fn key(&self) -> String {
        crate::collection::entry::entry_key(&self.file, self.dir(), self.props.name.as_deref())
    }
}

/// Discover the files of a collection under `base`.
pub fn resolve<'a>(
    collection: &'a ParsedCollection,
    base: &'a Path,
    logger: &'a Logger,
) -> Result<impl Iterator<Item = DiscoveredFile> + 'a, IndexError> {
    let scan_dir = base.join(&collection.root_dir);
    if !scan_dir.is_dir() {
        return Err(IndexError::ScanDir(scan_dir));
    }

    let format = collection.format();
    let walker = WalkDir::new(&scan_dir)
        .sort(true)
        .skip_hidden(true)
        .parallelism(Parallelism::Serial);

    let files = walker.into_iter().filter_map(move |entry| {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!(logger; "skipping unreadable entry: {e}");
                return None;
            }
        };
        if !entry.file_type().is_file() {
            return None;
        }

        let path = entry.path();
        let relative = relative_slash(&path, base)?;
        let file = relative
            .strip_prefix(collection.root_dir.as_str())
            .and_then(|rest| rest.strip_prefix('/'))?
            .to_string();

        if GENERATED_FILES.contains(&file.as_str()) {
            return None;
        }
        if !format.supports(split_extension(&file).1) {
            return None;
        }

        let props = collection.pattern.matches(&relative)?;
        Some(DiscoveredFile {
            path,
            relative,
            file,
            props,
        })
    });

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::{CollectionDefinition, ContentFormat, PathPattern};
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "---\ntitle: x\n---\n").unwrap();
    }

    fn files(collection: &ParsedCollection, base: &Path) -> Vec<String> {
        resolve(collection, base, &Logger::silent())
            .unwrap()
            .map(|f| f.file)
            .collect()
    }

    #[test]
    fn test_filters_by_extension_and_pattern() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "pages/intro.mdx");
        touch(dir.path(), "pages/guide/setup.md");
        touch(dir.path(), "pages/notes.txt");
        touch(dir.path(), "pages/.hidden/secret.md");
        touch(dir.path(), "other/outside.md");

        let collection = CollectionDefinition::new(PathPattern::root("pages").any().raw(r"\.mdx?"))
            .parse()
            .unwrap();
        assert_eq!(files(&collection, dir.path()), ["guide/setup.md", "intro.mdx"]);
    }

    #[test]
    fn test_discovery_is_sorted() {
        let dir = TempDir::new().unwrap();
        for name in ["c.md", "a.md", "b.md"] {
            touch(dir.path(), &format!("docs/{name}"));
        }
        let collection = CollectionDefinition::new(PathPattern::root("docs").any())
            .parse()
            .unwrap();
        assert_eq!(files(&collection, dir.path()), ["a.md", "b.md", "c.md"]);
    }

    #[test]
    fn test_pattern_captures_and_key() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "docs/en/02-setup.md");
        touch(dir.path(), "docs/en/readme.md");

        let pattern = PathPattern::parse(r"{root:docs}/{lang:[a-z]{2}}/{index:\d+}-{name:[\w-]+}\.md")
            .unwrap();
        let collection = CollectionDefinition::new(pattern).parse().unwrap();
        let found: Vec<_> = resolve(&collection, dir.path(), &Logger::silent())
            .unwrap()
            .collect();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].relative, "docs/en/02-setup.md");
        assert_eq!(found[0].dir(), "en");
        assert_eq!(found[0].ext(), "md");
        assert_eq!(found[0].key(), "en/setup");
        assert_eq!(found[0].props.sort_index.as_deref(), Some("02"));
    }

    #[test]
    fn test_generated_files_are_skipped() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("data")).unwrap();
        fs::write(dir.path().join("data/index.json"), "{}").unwrap();
        fs::write(dir.path().join("data/team.json"), "{}").unwrap();

        let collection = CollectionDefinition::new(PathPattern::root("data").any())
            .format(ContentFormat::Json)
            .parse()
            .unwrap();
        assert_eq!(files(&collection, dir.path()), ["team.json"]);
    }

    #[test]
    fn test_missing_scan_dir() {
        let dir = TempDir::new().unwrap();
        let collection = CollectionDefinition::new(PathPattern::root("pages").any())
            .parse()
            .unwrap();
        let err = resolve(&collection, dir.path(), &Logger::silent())
            .err()
            .unwrap();
        assert!(matches!(err, IndexError::ScanDir(_)));
    }
}
