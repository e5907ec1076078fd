//! `[[collection]]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [[collection]]
//! name = "Docs"                    # Optional, defaults to the capitalized root
//! format = "markdown"              # markdown | json | yaml
//! content = "{root:docs}/{lang:[a-z]{2}}/{any}\\.mdx?"
//! schema = "schemas/docs.json"     # Path or inline table, default: minimal schema
//! sort = { by = "sortIndex" }      # Default sort for sub-indexes
//!
//! [collection.index.byCategory]
//! partition = { by = "data.category" }
//! sort = { by = "updatedAt", order = "desc" }
//! ```
//!
//! Sub-indexes are emitted in name order.

use crate::collection::definition::sort_by_field;
use crate::collection::{
    CollectionDefinition, ContentFormat, FieldRef, IndexSpec, PathPattern, Schema, SortOrder,
};
use crate::config::{ConfigDiagnostics, ConfigError};
use crate::utils::path::resolve_path;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionConfig {
    pub name: Option<String>,
    pub format: ContentFormat,
    /// Path template, e.g. `{root:docs}/{any}\.md`.
    pub content: String,
    pub schema: Option<SchemaSource>,
    pub sort: Option<SortConfig>,
    pub index: BTreeMap<String, IndexConfig>,
}

/// Where a collection schema comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaSource {
    /// JSON or YAML file, relative to the config file.
    Path(PathBuf),
    /// JSON Schema written as a TOML table.
    Inline(Value),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortConfig {
    /// Field reference (`sortIndex`, `data.date`).
    pub by: String,
    #[serde(default)]
    pub order: SortOrder,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionConfig {
    pub by: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub partition: Option<PartitionConfig>,
    pub sort: Option<SortConfig>,
}

impl CollectionConfig {
    /// Name used in messages: the declared name, else the content template.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.content)
    }

    /// Collect every problem of the `position`-th collection.
    pub fn validate(&self, position: usize, root: &Path, diag: &mut ConfigDiagnostics) {
        let field = format!("collection[{position}]");

        if self.content.trim().is_empty() {
            diag.error_with_hint(
                format!("{field}.content"),
                "content template is required",
                "e.g. `content = \"{root:docs}/{any}\\\\.md\"`",
            );
        } else if let Err(e) = PathPattern::parse(&self.content).and_then(|p| p.compile()) {
            diag.error(format!("{field}.content"), e.to_string());
        }

        if let Some(SchemaSource::Path(path)) = &self.schema {
            let resolved = resolve_path(path, root);
            if !resolved.is_file() {
                diag.error(
                    format!("{field}.schema"),
                    format!("schema file not found: {}", resolved.display()),
                );
            }
        }

        if let Some(sort) = &self.sort {
            check_field(&sort.by, format!("{field}.sort.by"), diag);
        }

        for (name, index) in &self.index {
            let field = format!("{field}.index.{name}");
            if index.partition.is_none() && index.sort.is_none() {
                diag.error(field.clone(), "declares neither `partition` nor `sort`");
            }
            if let Some(partition) = &index.partition {
                check_field(&partition.by, format!("{field}.partition.by"), diag);
            }
            if let Some(sort) = &index.sort {
                check_field(&sort.by, format!("{field}.sort.by"), diag);
            }
        }
    }

    /// Build the collection definition, resolving schema paths against `root`.
    pub fn to_definition(&self, root: &Path) -> Result<CollectionDefinition, ConfigError> {
        let definition_error = |source| ConfigError::Definition {
            collection: self.label().to_string(),
            source,
        };
        let schema_error = |source| ConfigError::Schema {
            collection: self.label().to_string(),
            source,
        };

        let pattern = PathPattern::parse(&self.content).map_err(|e| definition_error(e.into()))?;
        let mut definition = CollectionDefinition::new(pattern).format(self.format);
        if let Some(name) = &self.name {
            definition = definition.name(name);
        }

        match &self.schema {
            Some(SchemaSource::Path(path)) => {
                let schema = Schema::from_file(&resolve_path(path, root)).map_err(schema_error)?;
                definition = definition.schema(schema);
            }
            Some(SchemaSource::Inline(value)) => {
                let schema = Schema::compile(value.clone()).map_err(schema_error)?;
                definition = definition.schema(schema);
            }
            None => {}
        }

        if let Some(sort) = &self.sort {
            definition = definition.sort(sort_by_field(&sort.by, sort.order).map_err(definition_error)?);
        }

        for (name, index) in &self.index {
            let mut spec = IndexSpec::new(name);
            if let Some(partition) = &index.partition {
                spec = spec.partition_by(&partition.by).map_err(definition_error)?;
            }
            if let Some(sort) = &index.sort {
                spec = spec.sort_by(&sort.by, sort.order).map_err(definition_error)?;
            }
            definition = definition.index(spec);
        }

        Ok(definition)
    }
}

fn check_field(reference: &str, field: String, diag: &mut ConfigDiagnostics) {
    if FieldRef::parse(reference).is_none() {
        diag.error_with_hint(
            field,
            format!("unknown entry field `{reference}`"),
            "use an entry field like `sortIndex` or `data.<key>`",
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;
    use serde_json::json;

    #[test]
    fn test_minimal_collection() {
        let config = test_parse_config(
            r#"
[[collection]]
content = "{root:pages}/{any}\\.mdx?"
"#,
        );
        let collection = &config.collections[0];
        assert_eq!(collection.content, r"{root:pages}/{any}\.mdx?");
        assert_eq!(collection.format, ContentFormat::Markdown);
        assert!(collection.schema.is_none());
        assert!(collection.index.is_empty());
        assert_eq!(collection.label(), r"{root:pages}/{any}\.mdx?");
    }

    #[test]
    fn test_full_collection() {
        let config = test_parse_config(
            r#"
[[collection]]
name = "Docs"
format = "yaml"
content = "{root:docs}/{any}\\.ya?ml"
schema = { type = "object", required = ["title"] }
sort = { by = "sortIndex" }

[collection.index.byCategory]
partition = { by = "data.category" }
sort = { by = "updatedAt", order = "desc" }

[collection.index.recent]
sort = { by = "createdAt", order = "desc" }
"#,
        );
        let collection = &config.collections[0];
        assert_eq!(collection.label(), "Docs");
        assert_eq!(collection.format, ContentFormat::Yaml);
        assert_eq!(
            collection.schema,
            Some(SchemaSource::Inline(json!({ "type": "object", "required": ["title"] })))
        );
        assert_eq!(collection.sort.as_ref().unwrap().order, SortOrder::Asc);

        let by_category = &collection.index["byCategory"];
        assert_eq!(by_category.partition.as_ref().unwrap().by, "data.category");
        assert_eq!(by_category.sort.as_ref().unwrap().order, SortOrder::Desc);

        let definition = collection.to_definition(Path::new("/site")).unwrap();
        let names: Vec<_> = definition.indexes.iter().map(|i| i.name()).collect();
        assert_eq!(names, ["byCategory", "recent"]);
        assert!(definition.sort.is_some());
    }

    #[test]
    fn test_schema_path() {
        let config = test_parse_config(
            r#"
[[collection]]
content = "{root:docs}/{any}\\.md"
schema = "schemas/docs.json"
"#,
        );
        assert_eq!(
            config.collections[0].schema,
            Some(SchemaSource::Path(PathBuf::from("schemas/docs.json")))
        );

        let mut diag = ConfigDiagnostics::new();
        config.collections[0].validate(0, Path::new("/nonexistent"), &mut diag);
        assert_eq!(diag.errors()[0].field, "collection[0].schema");
    }

    #[test]
    fn test_validate_collects_every_error() {
        let config = test_parse_config(
            r#"
[[collection]]
content = "docs/{any}"
sort = { by = "data" }

[collection.index.empty]

[collection.index.byTag]
partition = { by = "tags" }
"#,
        );
        let mut diag = ConfigDiagnostics::new();
        config.collections[0].validate(0, Path::new("/site"), &mut diag);

        let fields: Vec<_> = diag.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            [
                "collection[0].content",
                "collection[0].sort.by",
                "collection[0].index.byTag.partition.by",
                "collection[0].index.empty",
            ]
        );
    }

    #[test]
    fn test_missing_content() {
        let collection = CollectionConfig::default();
        let mut diag = ConfigDiagnostics::new();
        collection.validate(3, Path::new("/site"), &mut diag);
        assert_eq!(diag.errors()[0].field, "collection[3].content");
    }
}
