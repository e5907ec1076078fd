//! Indexing error types.

use super::frontmatter::FrontmatterError;
use super::identifier::IdentifierError;
use crate::collection::Violation;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop a collection pass.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("scan directory `{}` does not exist", .0.display())]
    ScanDir(PathBuf),

    #[error("failed to write `{}`", .0.display())]
    Write(PathBuf, #[source] std::io::Error),

    #[error("failed to serialize the index of `{0}`")]
    Serialize(String, #[source] serde_json::Error),

    #[error(transparent)]
    Identifier(#[from] IdentifierError),

    #[error("{}", format_failure(.0))]
    Entry(EntryFailure),
}

fn format_failure(failure: &EntryFailure) -> String {
    format!("failed to index {failure}")
}

/// Per-file errors, handled according to the error policy.
#[derive(Debug, Error)]
pub enum EntryError {
    #[error(transparent)]
    Frontmatter(#[from] FrontmatterError),

    #[error("key `{key}` is already used by `{existing}`")]
    DuplicateKey { key: String, existing: String },

    #[error(transparent)]
    Identifier(#[from] IdentifierError),
}

/// A file that could not be indexed.
#[derive(Debug)]
pub struct EntryFailure {
    /// File path relative to the base path.
    pub file: String,
    pub error: EntryError,
}

impl EntryFailure {
    pub fn new(file: impl Into<String>, error: impl Into<EntryError>) -> Self {
        Self {
            file: file.into(),
            error: error.into(),
        }
    }

    /// Violated schema rules, if this is a validation failure.
    pub fn violations(&self) -> &[Violation] {
        match &self.error {
            EntryError::Frontmatter(FrontmatterError::Validation { violations, .. }) => violations,
            _ => &[],
        }
    }
}

impl fmt::Display for EntryFailure {
    /// `<file>: <field>: <message>` per violation, otherwise `<file>: <error>`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let violations = self.violations();
        if violations.is_empty() {
            return write!(f, "{}: {}", self.file, self.error);
        }
        for (i, violation) in violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}: {violation}", self.file)?;
        }
        Ok(())
    }
}
