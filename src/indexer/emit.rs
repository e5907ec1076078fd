//! Generated index artifacts.
//!
//! Each artifact kind implements [`IndexEmitter`]. Output depends only on the
//! built index, so unchanged content produces byte-identical files.

use super::build::{BuiltIndex, CollectionIndex, IndexContent, KeyedEntry};
use super::error::IndexError;
use super::identifier::Uid;
use crate::collection::definition::BY_ID_EXPORT;
use crate::collection::{ContentFormat, EntryRecord};
use convert_case::{Case, Casing};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

/// First line of every generated file.
pub const NOTICE: &str = "Autogenerated file, please do not modify this manually!";

/// Default module providing `CollectionEntry` and `importMarkdownFiles`.
pub const DEFAULT_IMPORT_SOURCE: &str = "@lectern/content/internal";

/// Renders one artifact of a collection index.
pub trait IndexEmitter {
    /// File name inside the scan directory.
    fn file_name(&self) -> &'static str;

    fn render(&self, index: &CollectionIndex<'_>) -> Result<String, IndexError>;
}

/// Artifact kinds selectable in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmitTarget {
    Typescript,
    Json,
}

impl EmitTarget {
    pub fn emitter(self, import_source: &str) -> Box<dyn IndexEmitter> {
        match self {
            Self::Typescript => Box::new(TypeScriptEmitter::new(import_source)),
            Self::Json => Box::new(JsonEmitter),
        }
    }
}

/// Render and write the selected artifacts of a collection.
///
/// Returns the written paths in target order.
pub fn write_artifacts(
    index: &CollectionIndex<'_>,
    base: &Path,
    targets: &[EmitTarget],
    import_source: &str,
) -> Result<Vec<PathBuf>, IndexError> {
    let dir = base.join(&index.collection.root_dir);
    targets
        .iter()
        .map(|target| {
            let emitter = target.emitter(import_source);
            let path = dir.join(emitter.file_name());
            let content = emitter.render(index)?;
            fs::write(&path, content).map_err(|e| IndexError::Write(path.clone(), e))?;
            Ok(path)
        })
        .collect()
}

// ============================================================================
// TypeScript
// ============================================================================

/// `index.ts`: typed map of entry keys to lazily imported files.
pub struct TypeScriptEmitter {
    import_source: String,
}

impl TypeScriptEmitter {
    pub fn new(import_source: impl Into<String>) -> Self {
        Self {
            import_source: import_source.into(),
        }
    }
}

impl IndexEmitter for TypeScriptEmitter {
    fn file_name(&self) -> &'static str {
        "index.ts"
    }

    fn render(&self, index: &CollectionIndex<'_>) -> Result<String, IndexError> {
        let mut out = format!("// {NOTICE}\n");
        if index.is_empty() {
            return Ok(out);
        }

        let collection = index.collection;
        let export = &collection.export_name;
        let keys_type = format!("{}Keys", collection.type_name);
        let schema_type = format!("{}Schema", collection.type_name);
        let entry_type = format!("{}Entry", collection.type_name);

        writeln!(
            out,
            "\nimport {{ type CollectionEntry, importMarkdownFiles }} from {};",
            js_string(&self.import_source)
        ).unwrap();

        let keys = index.entries.iter().map(|e| js_string(&e.key));
        writeln!(out, "\nexport type {keys_type} = {};", union(keys)).unwrap();
        writeln!(
            out,
            "\nexport type {schema_type} = {};",
            collection.schema().to_typescript()
        ).unwrap();
        writeln!(
            out,
            "\nexport type {entry_type} = CollectionEntry<{schema_type}>;"
        ).unwrap();

        writeln!(
            out,
            "\nexport const {export} = importMarkdownFiles<{keys_type}, {entry_type}>({{"
        ).unwrap();
        for keyed in &index.entries {
            write_entry(&mut out, keyed);
        }
        out.push_str("});\n");

        writeln!(out, "\nexport const {BY_ID_EXPORT} = new Map<string, {entry_type}>(").unwrap();
        writeln!(
            out,
            "    Array.from({export}.values()).map((entry: {entry_type}) => [entry.id, entry]),"
        ).unwrap();
        out.push_str(");\n");

        for built in &index.indexes {
            write_sub_index(&mut out, built, export, &entry_type);
        }
        Ok(out)
    }
}

fn write_entry(out: &mut String, keyed: &KeyedEntry) {
    let entry = &keyed.entry;
    let optional = |value: Option<&str>| value.map_or_else(|| "undefined".to_string(), js_string);
    let updated_by = entry.updated_by.as_ref().map_or_else(
        || "undefined".to_string(),
        |by| {
            format!(
                "{{ name: {}, email: {} }}",
                js_string(&by.name),
                js_string(&by.email)
            )
        },
    );

    writeln!(out, "    {}: {{", js_string(&keyed.key)).unwrap();
    writeln!(out, "        ...(await import({})),", js_string(&format!("./{}", entry.file))).unwrap();
    writeln!(out, "        id: {},", js_string(entry.id.as_str())).unwrap();
    writeln!(out, "        name: {},", js_string(&entry.name)).unwrap();
    writeln!(out, "        path: {},", js_string(&entry.path)).unwrap();
    writeln!(out, "        file: {},", js_string(&entry.file)).unwrap();
    writeln!(out, "        ext: {},", js_string(&entry.ext)).unwrap();
    writeln!(out, "        langCode: {},", optional(entry.lang_code.as_deref())).unwrap();
    writeln!(out, "        sortIndex: {},", entry.sort_index).unwrap();
    writeln!(out, "        createdAt: new Date(\"{}\"),", entry.created_at).unwrap();
    writeln!(out, "        updatedAt: new Date(\"{}\"),", entry.updated_at).unwrap();
    writeln!(out, "        updatedBy: {updated_by},").unwrap();
    writeln!(out, "        updateMessage: {},", optional(entry.update_message.as_deref())).unwrap();
    writeln!(out, "        updateCommit: {},", optional(entry.update_commit.as_deref())).unwrap();
    out.push_str("    },\n");
}

fn write_sub_index(out: &mut String, built: &BuiltIndex, export: &str, entry_type: &str) {
    let get = |key: &String| format!("{export}.get({})", js_string(key));

    match &built.content {
        IndexContent::Partitions(partitions) => {
            let keys_type = format!("{}Keys", built.name.to_case(Case::UpperCamel));
            let keys = partitions.iter().map(|p| js_string(&p.key));
            writeln!(out, "\nexport type {keys_type} = {};", union(keys)).unwrap();
            writeln!(
                out,
                "\nexport const {} = new Map<{keys_type}, {entry_type}[]>([",
                built.name
            ).unwrap();
            for partition in partitions {
                let members: Vec<String> = partition.entries.iter().map(get).collect();
                writeln!(
                    out,
                    "    [{}, [{}] as {entry_type}[]],",
                    js_string(&partition.key),
                    members.join(", ")
                ).unwrap();
            }
            out.push_str("]);\n");
        }
        IndexContent::Ordered(keys) => {
            let members: Vec<String> = keys.iter().map(get).collect();
            writeln!(
                out,
                "\nexport const {} = [{}] as {entry_type}[];",
                built.name,
                members.join(", ")
            ).unwrap();
        }
    }
}

/// JSON string literal, valid in TypeScript.
fn js_string(value: &str) -> String {
    Value::String(value.to_string()).to_string()
}

fn union(parts: impl Iterator<Item = String>) -> String {
    let parts: Vec<String> = parts.collect();
    if parts.is_empty() {
        "never".to_string()
    } else {
        parts.join(" | ")
    }
}

// ============================================================================
// JSON manifest
// ============================================================================

/// `index.json`: the same index for Rust consumers.
pub struct JsonEmitter;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestCollection {
    pub id: Uid,
    pub name: String,
    pub export_name: String,
    pub root_dir: String,
    pub format: ContentFormat,
}

/// Deserialized form of `index.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexManifest {
    pub notice: String,
    pub collection: ManifestCollection,
    #[serde(default)]
    pub entries: Vec<KeyedEntry>,
    #[serde(default)]
    pub indexes: Vec<BuiltIndex>,
}

impl IndexManifest {
    pub fn from_index(index: &CollectionIndex<'_>) -> Self {
        let collection = index.collection;
        Self {
            notice: NOTICE.to_string(),
            collection: ManifestCollection {
                id: collection.id.clone(),
                name: collection.name.clone(),
                export_name: collection.export_name.clone(),
                root_dir: collection.root_dir.clone(),
                format: collection.format(),
            },
            entries: index.entries.clone(),
            indexes: index.indexes.clone(),
        }
    }

    pub fn entry(&self, key: &str) -> Option<&EntryRecord> {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| &e.entry)
    }
}

impl IndexEmitter for JsonEmitter {
    fn file_name(&self) -> &'static str {
        "index.json"
    }

    fn render(&self, index: &CollectionIndex<'_>) -> Result<String, IndexError> {
        let manifest = IndexManifest::from_index(index);
        let mut out = serde_json::to_string_pretty(&manifest)
            .map_err(|e| IndexError::Serialize(index.collection.name.clone(), e))?;
        out.push('\n');
        Ok(out)
    }
}
