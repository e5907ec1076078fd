//! Collection definitions and their parsed form.

use super::entry::{EntryRecord, FieldRef, SortOrder};
use super::pattern::{CompiledPattern, PathPattern, PatternError};
use super::schema::Schema;
use crate::indexer::identifier::{IdentifierError, Uid};
use crate::utils::plural::{capitalize, pluralize, singularize};
use convert_case::{Case, Casing};
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt, sync::Arc};
use thiserror::Error;

/// Partition function: entries returning `None` are left out of the index.
pub type PartitionFn = Arc<dyn Fn(&EntryRecord) -> Option<String> + Send + Sync>;

/// Export of the generated module mapping ids to entries.
pub const BY_ID_EXPORT: &str = "_byId";

/// Sort function.
pub type SortFn = Arc<dyn Fn(&EntryRecord, &EntryRecord) -> Ordering + Send + Sync>;

#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error(transparent)]
    Pattern(#[from] PatternError),

    #[error("index `{0}` declares neither a partition nor a sort")]
    EmptyIndex(String),

    #[error("index name `{0}` is not a valid identifier")]
    InvalidIndexName(String),

    #[error("index `{0}` is declared more than once")]
    DuplicateIndex(String),

    #[error("index `{index}` would export `{export}` a second time")]
    ReservedName { index: String, export: String },

    #[error("collection root `{0}` is already registered")]
    DuplicateCollection(String),

    #[error("unknown entry field `{0}`")]
    UnknownField(String),

    #[error(transparent)]
    Identifier(#[from] IdentifierError),
}

// ============================================================================
// Content format
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentFormat {
    /// Markdown with a YAML frontmatter block.
    #[default]
    Markdown,
    /// Whole-file JSON documents.
    Json,
    /// Whole-file YAML documents.
    Yaml,
}

impl ContentFormat {
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::Markdown => &["md", "mdx"],
            Self::Json => &["json"],
            Self::Yaml => &["yaml", "yml"],
        }
    }

    pub fn supports(self, ext: &str) -> bool {
        self.extensions()
            .iter()
            .any(|e| e.eq_ignore_ascii_case(ext))
    }

    pub fn has_frontmatter(self) -> bool {
        matches!(self, Self::Markdown)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }
}

impl fmt::Display for ContentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Sub-indexes
// ============================================================================

/// A named secondary index over a collection.
#[derive(Clone)]
pub struct IndexSpec {
    name: String,
    partition: Option<PartitionFn>,
    sort: Option<SortFn>,
}

impl fmt::Debug for IndexSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexSpec")
            .field("name", &self.name)
            .field("partition", &self.partition.is_some())
            .field("sort", &self.sort.is_some())
            .finish()
    }
}

impl IndexSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            partition: None,
            sort: None,
        }
    }

    pub fn partition<F>(mut self, f: F) -> Self
    where
        F: Fn(&EntryRecord) -> Option<String> + Send + Sync + 'static,
    {
        self.partition = Some(Arc::new(f));
        self
    }

    pub fn sort<F>(mut self, f: F) -> Self
    where
        F: Fn(&EntryRecord, &EntryRecord) -> Ordering + Send + Sync + 'static,
    {
        self.sort = Some(Arc::new(f));
        self
    }

    /// Partition by a field reference (`data.category`).
    pub fn partition_by(self, field: &str) -> Result<Self, DefinitionError> {
        let field = parse_field(field)?;
        Ok(self.partition(move |e| field.partition_key(e)))
    }

    /// Sort by a field reference.
    pub fn sort_by(self, field: &str, order: SortOrder) -> Result<Self, DefinitionError> {
        Ok(self.sort(sort_by_field(field, order)?))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the generated partition keys type (`byTag` -> `ByTagKeys`).
    pub fn keys_type(&self) -> String {
        format!("{}Keys", self.name.to_case(Case::UpperCamel))
    }

    pub fn partition_fn(&self) -> Option<&PartitionFn> {
        self.partition.as_ref()
    }

    pub fn sort_fn(&self) -> Option<&SortFn> {
        self.sort.as_ref()
    }
}

/// Build a sort closure from a field reference.
pub fn sort_by_field(
    field: &str,
    order: SortOrder,
) -> Result<impl Fn(&EntryRecord, &EntryRecord) -> Ordering + Send + Sync + 'static, DefinitionError>
{
    let field = parse_field(field)?;
    Ok(move |a: &EntryRecord, b: &EntryRecord| field.compare(a, b, order))
}

fn parse_field(field: &str) -> Result<FieldRef, DefinitionError> {
    FieldRef::parse(field).ok_or_else(|| DefinitionError::UnknownField(field.to_string()))
}

/// Index names become exports of the generated module.
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

// ============================================================================
// CollectionDefinition
// ============================================================================

/// A declared collection, before validation.
///
/// ```ignore
/// let docs = CollectionDefinition::new(PathPattern::root("docs").any().raw(r"\.mdx?"))
///     .name("Docs")
///     .index(IndexSpec::new("byCategory").partition_by("data.category")?);
/// ```
#[derive(Clone)]
pub struct CollectionDefinition {
    pub name: Option<String>,
    pub format: ContentFormat,
    pub pattern: PathPattern,
    pub schema: Schema,
    pub indexes: Vec<IndexSpec>,
    pub sort: Option<SortFn>,
}

impl fmt::Debug for CollectionDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionDefinition")
            .field("name", &self.name)
            .field("format", &self.format)
            .field("pattern", &self.pattern.to_string())
            .field("indexes", &self.indexes)
            .field("sort", &self.sort.is_some())
            .finish()
    }
}

impl CollectionDefinition {
    /// Markdown collection validated against the minimal schema.
    pub fn new(pattern: PathPattern) -> Self {
        Self {
            name: None,
            format: ContentFormat::default(),
            pattern,
            schema: Schema::minimal(),
            indexes: Vec::new(),
            sort: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn format(mut self, format: ContentFormat) -> Self {
        self.format = format;
        self
    }

    pub fn schema(mut self, schema: Schema) -> Self {
        self.schema = schema;
        self
    }

    pub fn index(mut self, index: IndexSpec) -> Self {
        self.indexes.push(index);
        self
    }

    pub fn sort<F>(mut self, f: F) -> Self
    where
        F: Fn(&EntryRecord, &EntryRecord) -> Ordering + Send + Sync + 'static,
    {
        self.sort = Some(Arc::new(f));
        self
    }

    /// Validate and derive names.
    pub fn parse(self) -> Result<ParsedCollection, DefinitionError> {
        let compiled = self.pattern.compile()?;

        let root_dir = compiled.scan_dir().to_string();
        let id = Uid::derive(&root_dir)?;
        let name = capitalize(self.name.as_deref().unwrap_or(&root_dir));
        let words = root_dir.replace(|c: char| !c.is_alphanumeric(), "_");
        let export_name = pluralize(&words.to_case(Case::Camel));
        let type_name = singularize(&export_name.to_case(Case::UpperCamel));

        // Exports of the generated module an index must not repeat
        let reserved = [
            export_name.as_str(),
            BY_ID_EXPORT,
            "CollectionEntry",
            "importMarkdownFiles",
        ];
        let mut seen: Vec<&str> = Vec::with_capacity(self.indexes.len());
        let mut types: Vec<String> = ["Keys", "Schema", "Entry"]
            .iter()
            .map(|suffix| format!("{type_name}{suffix}"))
            .collect();

        for index in &self.indexes {
            if !is_identifier(&index.name) {
                return Err(DefinitionError::InvalidIndexName(index.name.clone()));
            }
            if index.partition.is_none() && index.sort.is_none() {
                return Err(DefinitionError::EmptyIndex(index.name.clone()));
            }
            if reserved.contains(&index.name.as_str()) {
                return Err(DefinitionError::ReservedName {
                    index: index.name.clone(),
                    export: index.name.clone(),
                });
            }
            if seen.contains(&index.name.as_str()) {
                return Err(DefinitionError::DuplicateIndex(index.name.clone()));
            }
            if index.partition.is_some() {
                let keys_type = index.keys_type();
                if types.contains(&keys_type) {
                    return Err(DefinitionError::ReservedName {
                        index: index.name.clone(),
                        export: keys_type,
                    });
                }
                types.push(keys_type);
            }
            seen.push(&index.name);
        }

        Ok(ParsedCollection {
            id,
            name,
            export_name,
            type_name,
            root_dir,
            pattern: compiled,
            definition: self,
        })
    }
}

// ============================================================================
// ParsedCollection
// ============================================================================

/// A validated collection with its derived names.
#[derive(Debug, Clone)]
pub struct ParsedCollection {
    /// Identifier of the root directory.
    pub id: Uid,
    /// Capitalized declared name, or the capitalized root directory.
    pub name: String,
    /// Name of the generated mapping export (`pages`).
    pub export_name: String,
    /// Singular PascalCase prefix of generated types (`Page`).
    pub type_name: String,
    /// Scan directory, relative to the base path.
    pub root_dir: String,
    pub pattern: CompiledPattern,
    pub definition: CollectionDefinition,
}

impl ParsedCollection {
    pub fn format(&self) -> ContentFormat {
        self.definition.format
    }

    pub fn schema(&self) -> &Schema {
        &self.definition.schema
    }

    pub fn indexes(&self) -> &[IndexSpec] {
        &self.definition.indexes
    }

    pub fn default_sort(&self) -> Option<&SortFn> {
        self.definition.sort.as_ref()
    }

    /// Whether `reference` names this collection (id, name or export name).
    pub fn is_named(&self, reference: &str) -> bool {
        self.id.as_str().eq_ignore_ascii_case(reference)
            || self.name == reference
            || self.export_name == reference
            || self.root_dir == reference
    }
}
