//! Frontmatter extraction and validation.
//!
//! A markdown file starts with a YAML block between two `---` lines:
//!
//! ```text
//! ---
//! title: Getting started
//! ---
//! # Body
//! ```
//!
//! The reader stops at the second delimiter, so the body is never loaded.
//! With fewer than two delimiters, whatever was read is parsed as-is.

use crate::collection::{ContentFormat, Schema, Violation};
use serde_json::Value;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

const DELIMITER: &str = "---";

#[derive(Debug, Error)]
pub enum FrontmatterError {
    #[error("failed to read `{}`", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid frontmatter in `{}`: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("{} violation(s) in `{}`", .violations.len(), .path.display())]
    Validation {
        path: PathBuf,
        violations: Vec<Violation>,
    },
}

/// Read the frontmatter block of a markdown file, without delimiters.
pub fn extract_frontmatter<R: BufRead>(reader: R) -> io::Result<String> {
    let mut block = String::new();
    let mut delimiters = 0;
    for line in reader.lines() {
        let line = line?;
        if line.trim() == DELIMITER {
            delimiters += 1;
            if delimiters == 2 {
                break;
            }
            continue;
        }
        block.push_str(&line);
        block.push('\n');
    }
    Ok(block)
}

/// Text following the frontmatter block.
///
/// Returns the whole text when it does not open with a delimiter line.
pub fn split_body(text: &str) -> &str {
    let mut rest = text;
    let mut delimiters = 0;
    let mut first = true;
    while !rest.is_empty() {
        let (line, next) = match rest.find('\n') {
            Some(i) => (&rest[..i], &rest[i + 1..]),
            None => (rest, ""),
        };
        if line.trim() == DELIMITER {
            delimiters += 1;
            if delimiters == 2 {
                return next;
            }
        } else if first && !line.trim().is_empty() {
            return text;
        }
        first = false;
        rest = next;
    }
    if delimiters == 0 { text } else { "" }
}

/// Parse and validate the frontmatter of a markdown file.
pub fn parse_frontmatter(path: &Path, schema: &Schema) -> Result<Value, FrontmatterError> {
    let file = File::open(path).map_err(|source| io_error(path, source))?;
    let block = extract_frontmatter(BufReader::new(file)).map_err(|e| io_error(path, e))?;
    let data = parse_yaml(path, &block)?;
    validate(path, data, schema)
}

/// Parse and validate a whole-file JSON or YAML document.
pub fn read_document(
    path: &Path,
    format: ContentFormat,
    schema: &Schema,
) -> Result<Value, FrontmatterError> {
    let text = std::fs::read_to_string(path).map_err(|e| io_error(path, e))?;
    let data = match format {
        ContentFormat::Json => {
            serde_json::from_str(&text).map_err(|e| FrontmatterError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
        }
        ContentFormat::Yaml | ContentFormat::Markdown => parse_yaml(path, &text)?,
    };
    validate(path, data, schema)
}

/// Entry data of a content file, by collection format.
pub fn read_entry_data(
    path: &Path,
    format: ContentFormat,
    schema: &Schema,
) -> Result<Value, FrontmatterError> {
    if format.has_frontmatter() {
        parse_frontmatter(path, schema)
    } else {
        read_document(path, format, schema)
    }
}

fn parse_yaml(path: &Path, text: &str) -> Result<Value, FrontmatterError> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_yaml::from_str(text).map_err(|e| FrontmatterError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn validate(path: &Path, data: Value, schema: &Schema) -> Result<Value, FrontmatterError> {
    match schema.validate(&data) {
        Ok(()) => Ok(data),
        Err(violations) => Err(FrontmatterError::Validation {
            path: path.to_path_buf(),
            violations,
        }),
    }
}

fn io_error(path: &Path, source: io::Error) -> FrontmatterError {
    FrontmatterError::Io {
        path: path.to_path_buf(),
        source,
    }
}
