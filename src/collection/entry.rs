//! Collection entries and field references.

use crate::indexer::identifier::Uid;
use crate::utils::date::DateTimeUtc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;

/// Commit author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatedBy {
    pub name: String,
    pub email: String,
}

/// Most recent commit touching a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatestChanges {
    pub updated_at: DateTimeUtc,
    pub updated_by: UpdatedBy,
    pub update_message: String,
    pub update_commit: String,
}

/// A fully enriched entry, as written to the generated index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryRecord {
    pub id: Uid,
    /// Directory relative to the scan dir, `.` for top-level files.
    pub path: String,
    /// File name relative to the scan dir, with extension.
    pub file: String,
    pub ext: String,
    pub data: Value,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<UpdatedBy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_commit: Option<String>,
    /// Captured name, or the file stem.
    pub name: String,
    #[serde(default)]
    pub sort_index: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang_code: Option<String>,
}

impl EntryRecord {
    /// Apply git history, replacing the filesystem update time.
    pub fn apply_history(&mut self, changes: LatestChanges) {
        self.updated_at = changes.updated_at;
        self.updated_by = Some(changes.updated_by);
        self.update_message = Some(changes.update_message);
        self.update_commit = Some(changes.update_commit);
    }
}

/// Key of an entry in the primary mapping.
///
/// `<dir>/<name>` when a name was captured, otherwise the file path without
/// its extension.
pub fn entry_key(file: &str, dir: &str, name: Option<&str>) -> String {
    match name {
        Some(name) if dir == "." || dir.is_empty() => name.to_string(),
        Some(name) => format!("{dir}/{name}"),
        None => {
            let (stem, _) = crate::utils::path::split_extension(file);
            stem.to_string()
        }
    }
}

// ============================================================================
// Field references
// ============================================================================

/// Entry fields addressable from partition and sort declarations.
const ENTRY_FIELDS: &[&str] = &[
    "id",
    "name",
    "path",
    "file",
    "ext",
    "langCode",
    "sortIndex",
    "createdAt",
    "updatedAt",
    "updatedBy",
    "updateMessage",
    "updateCommit",
    "data",
];

/// Reference to an entry field: `sortIndex`, `updatedBy.name`, `data.category`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRef {
    head: String,
    tail: Vec<String>,
}

impl FieldRef {
    /// Parse a dotted reference. Returns `None` for unknown top-level fields.
    pub fn parse(reference: &str) -> Option<Self> {
        let mut parts = reference.split('.');
        let head = parts.next()?;
        if !ENTRY_FIELDS.contains(&head) {
            return None;
        }
        let tail: Vec<String> = parts.map(str::to_string).collect();
        if tail.iter().any(String::is_empty) || (head == "data" && tail.is_empty()) {
            return None;
        }
        Some(Self {
            head: head.to_string(),
            tail,
        })
    }

    /// Resolve against an entry. Missing values are `None`.
    pub fn resolve(&self, entry: &EntryRecord) -> Option<Value> {
        let root = match self.head.as_str() {
            "data" => return lookup(&entry.data, &self.tail).cloned(),
            "updatedBy" => {
                let by = entry.updated_by.as_ref()?;
                serde_json::json!({ "name": by.name, "email": by.email })
            }
            "id" => Value::from(entry.id.as_str()),
            "name" => Value::from(entry.name.as_str()),
            "path" => Value::from(entry.path.as_str()),
            "file" => Value::from(entry.file.as_str()),
            "ext" => Value::from(entry.ext.as_str()),
            "langCode" => Value::from(entry.lang_code.clone()?),
            "sortIndex" => Value::from(entry.sort_index),
            "createdAt" => Value::from(entry.created_at.to_iso_string()),
            "updatedAt" => Value::from(entry.updated_at.to_iso_string()),
            "updateMessage" => Value::from(entry.update_message.clone()?),
            "updateCommit" => Value::from(entry.update_commit.clone()?),
            _ => return None,
        };
        lookup(&root, &self.tail).cloned()
    }

    /// Partition key: strings as-is, numbers and booleans stringified.
    pub fn partition_key(&self, entry: &EntryRecord) -> Option<String> {
        match self.resolve(entry)? {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Compare two entries by this field; missing values sort last.
    pub fn compare(&self, a: &EntryRecord, b: &EntryRecord, order: SortOrder) -> Ordering {
        match (self.resolve(a), self.resolve(b)) {
            (Some(x), Some(y)) => order.apply(compare_values(&x, &y)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.head)?;
        for part in &self.tail {
            write!(f, ".{part}")?;
        }
        Ok(())
    }
}

fn lookup<'a>(value: &'a Value, path: &[String]) -> Option<&'a Value> {
    path.iter()
        .try_fold(value, |v, key| match v {
            Value::Array(items) => items.get(key.parse::<usize>().ok()?),
            _ => v.get(key),
        })
        .filter(|v| !v.is_null())
}

/// Numbers numerically, strings lexically, booleans false-first.
/// Values of different kinds order by kind.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => kind_rank(a).cmp(&kind_rank(b)),
    }
}

fn kind_rank(value: &Value) -> u8 {
    match value {
        Value::Number(_) => 0,
        Value::String(_) => 1,
        Value::Bool(_) => 2,
        Value::Array(_) => 3,
        Value::Object(_) => 4,
        Value::Null => 5,
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

#[cfg(test)]
pub(crate) fn test_entry(file: &str, data: Value) -> EntryRecord {
    let (dir, _) = file.rsplit_once('/').unwrap_or((".", file));
    let (stem, ext) = crate::utils::path::split_extension(file);
    let name = stem.rsplit('/').next().unwrap_or(stem);
    EntryRecord {
        id: Uid::derive(file).unwrap(),
        path: dir.to_string(),
        file: file.to_string(),
        ext: ext.to_string(),
        data,
        created_at: DateTimeUtc::from_ymd(2024, 1, 1),
        updated_at: DateTimeUtc::from_ymd(2024, 1, 2),
        updated_by: None,
        update_message: None,
        update_commit: None,
        name: name.to_string(),
        sort_index: 0,
        lang_code: None,
    }
}
