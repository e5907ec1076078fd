//! Build report types and formatting.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use owo_colors::OwoColorize;

use super::build::CollectionIndex;
use super::error::EntryFailure;
use crate::utils::plural::plural_s;

/// Outcome of one collection pass.
#[derive(Debug)]
pub struct CollectionSummary {
    pub name: String,
    pub entries: usize,
    pub written: Vec<PathBuf>,
}

/// Report of a build or check run.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub collections: Vec<CollectionSummary>,
    /// Failed files grouped by collection name.
    pub failures: BTreeMap<String, Vec<EntryFailure>>,
}

impl BuildReport {
    /// Record a collection pass, taking its failures.
    pub fn add(&mut self, index: &mut CollectionIndex<'_>, written: Vec<PathBuf>) {
        let name = index.collection.name.clone();
        if !index.failures.is_empty() {
            self.failures
                .entry(name.clone())
                .or_default()
                .append(&mut index.failures);
        }
        self.collections.push(CollectionSummary {
            name,
            entries: index.entries.len(),
            written,
        });
    }

    pub fn entry_count(&self) -> usize {
        self.collections.iter().map(|c| c.entries).sum()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.values().map(Vec::len).sum()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Print failures grouped by collection to stderr.
    pub fn print(&self) {
        for (name, failures) in &self.failures {
            eprintln!();
            eprintln!(
                "{} {}",
                name.red().bold(),
                format!("({} file{})", failures.len(), plural_s(failures.len())).dimmed()
            );
            for failure in failures {
                eprintln!("{}{}{}", "[".dimmed(), failure.file.cyan(), "]".dimmed());
                let violations = failure.violations();
                if violations.is_empty() {
                    eprintln!("{} {}", "→".red(), failure.error);
                } else {
                    for violation in violations {
                        eprintln!("{} {violation}", "→".red());
                    }
                }
            }
        }
    }
}

impl fmt::Display for BuildReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.failure_count();
        if total == 0 {
            write!(f, "{}", "all entries valid".green())
        } else {
            write!(
                f,
                "{} {} {}",
                "found".dimmed(),
                total.to_string().red().bold(),
                format!("invalid file{}", plural_s(total)).dimmed()
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::{CollectionDefinition, PathPattern};
    use crate::indexer::error::EntryError;

    #[test]
    fn test_add_takes_failures() {
        let collection = CollectionDefinition::new(PathPattern::root("pages").any())
            .parse()
            .unwrap();
        let mut index = CollectionIndex {
            collection: &collection,
            entries: Vec::new(),
            indexes: Vec::new(),
            failures: vec![EntryFailure::new(
                "pages/a.mdx",
                EntryError::DuplicateKey {
                    key: "a".into(),
                    existing: "pages/a.md".into(),
                },
            )],
        };

        let mut report = BuildReport::default();
        report.add(&mut index, Vec::new());
        assert!(index.failures.is_empty());
        assert_eq!(report.failure_count(), 1);
        assert!(report.has_failures());
        assert_eq!(report.collections[0].name, "Pages");
    }

    #[test]
    fn test_clean_report() {
        let report = BuildReport::default();
        assert!(!report.has_failures());
        assert!(report.to_string().contains("all entries valid"));
    }
}
