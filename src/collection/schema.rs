//! Frontmatter validation schemas.
//!
//! Schemas are JSON Schema documents. Besides validating parsed frontmatter,
//! a schema prints itself as a TypeScript type for the generated index.

use jsonschema::{JSONSchema, error::ValidationErrorKind};
use serde_json::{Value, json};
use std::{fmt, fs, path::Path, sync::Arc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to read schema {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse schema {path}: {message}")]
    Parse { path: String, message: String },

    #[error("invalid schema: {0}")]
    Invalid(String),
}

/// A single violated rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Field path (`title`, `/tags/0`), empty for the document itself.
    pub field: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.field.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

/// Compiled JSON Schema plus its source document.
#[derive(Clone)]
pub struct Schema {
    source: Value,
    compiled: Arc<JSONSchema>,
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema").field("source", &self.source).finish()
    }
}

impl Schema {
    pub fn compile(source: Value) -> Result<Self, SchemaError> {
        let compiled =
            JSONSchema::compile(&source).map_err(|e| SchemaError::Invalid(e.to_string()))?;
        Ok(Self {
            source,
            compiled: Arc::new(compiled),
        })
    }

    /// Load a schema file. `.yaml`/`.yml` files are read as YAML, anything
    /// else as JSON.
    pub fn from_file(path: &Path) -> Result<Self, SchemaError> {
        let display = path.display().to_string();
        let text = fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: display.clone(),
            source,
        })?;
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml" | "yml")
        );
        let value: Value = if is_yaml {
            serde_yaml::from_str(&text).map_err(|e| SchemaError::Parse {
                path: display.clone(),
                message: e.to_string(),
            })?
        } else {
            serde_json::from_str(&text).map_err(|e| SchemaError::Parse {
                path: display.clone(),
                message: e.to_string(),
            })?
        };
        Self::compile(value)
    }

    /// Default schema: a required `title` and an optional kebab-case `slug`.
    pub fn minimal() -> Self {
        let source = json!({
            "type": "object",
            "properties": {
                "title": { "type": "string" },
                "slug": { "type": "string", "pattern": "^[a-z](-?[a-z])*$" }
            },
            "required": ["title"]
        });
        match Self::compile(source.clone()) {
            Ok(schema) => schema,
            Err(_) => unreachable!("minimal schema is valid"),
        }
    }

    pub fn source(&self) -> &Value {
        &self.source
    }

    /// Validate a document, collecting every violation.
    pub fn validate(&self, document: &Value) -> Result<(), Vec<Violation>> {
        let errors = match self.compiled.validate(document) {
            Ok(()) => return Ok(()),
            Err(errors) => errors,
        };
        let mut violations: Vec<Violation> = errors
            .map(|error| {
                let pointer = error.instance_path.to_string();
                let field = match &error.kind {
                    ValidationErrorKind::Required { property } => {
                        let name = property
                            .as_str()
                            .map(str::to_string)
                            .unwrap_or_else(|| property.to_string());
                        join_field(&pointer, &name)
                    }
                    _ => pointer.trim_start_matches('/').to_string(),
                };
                Violation {
                    field,
                    message: error.to_string(),
                }
            })
            .collect();
        violations.sort_by(|a, b| a.field.cmp(&b.field));
        Err(violations)
    }

    /// Render the schema as a TypeScript type expression.
    pub fn to_typescript(&self) -> String {
        let mut out = String::new();
        print_type(&self.source, 0, &mut out);
        out
    }
}

fn join_field(pointer: &str, name: &str) -> String {
    let parent = pointer.trim_start_matches('/');
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}/{name}")
    }
}

// ============================================================================
// TypeScript printing
// ============================================================================

fn print_type(schema: &Value, depth: usize, out: &mut String) {
    let Some(obj) = schema.as_object() else {
        // `true` accepts anything, `false` nothing
        out.push_str(if schema == &Value::Bool(false) {
            "never"
        } else {
            "unknown"
        });
        return;
    };

    if let Some(value) = obj.get("const") {
        out.push_str(&value.to_string());
        return;
    }
    if let Some(Value::Array(values)) = obj.get("enum") {
        print_union(values.iter().map(|v| v.to_string()), out);
        return;
    }
    for key in ["anyOf", "oneOf"] {
        if let Some(Value::Array(variants)) = obj.get(key) {
            let printed = variants.iter().map(|v| {
                let mut s = String::new();
                print_type(v, depth, &mut s);
                s
            });
            print_union(printed, out);
            return;
        }
    }
    if let Some(Value::Array(parts)) = obj.get("allOf") {
        let printed: Vec<String> = parts
            .iter()
            .map(|v| {
                let mut s = String::new();
                print_type(v, depth, &mut s);
                s
            })
            .collect();
        if printed.is_empty() {
            out.push_str("unknown");
        } else {
            out.push_str(&printed.join(" & "));
        }
        return;
    }

    match obj.get("type") {
        Some(Value::String(ty)) => print_primitive(ty, obj, depth, out),
        Some(Value::Array(types)) => {
            let printed = types.iter().filter_map(Value::as_str).map(|ty| {
                let mut s = String::new();
                print_primitive(ty, obj, depth, &mut s);
                s
            });
            print_union(printed, out);
        }
        _ if obj.contains_key("properties") => print_primitive("object", obj, depth, out),
        _ => out.push_str("unknown"),
    }
}

fn print_primitive(ty: &str, obj: &serde_json::Map<String, Value>, depth: usize, out: &mut String) {
    match ty {
        "string" => out.push_str("string"),
        "number" | "integer" => out.push_str("number"),
        "boolean" => out.push_str("boolean"),
        "null" => out.push_str("null"),
        "array" => match obj.get("items") {
            Some(items) => {
                let mut inner = String::new();
                print_type(items, depth, &mut inner);
                if inner.contains(' ') {
                    out.push_str(&format!("({inner})[]"));
                } else {
                    out.push_str(&format!("{inner}[]"));
                }
            }
            None => out.push_str("unknown[]"),
        },
        "object" => print_object(obj, depth, out),
        _ => out.push_str("unknown"),
    }
}

fn print_object(obj: &serde_json::Map<String, Value>, depth: usize, out: &mut String) {
    let properties = obj.get("properties").and_then(Value::as_object);
    let additional = obj.get("additionalProperties");

    let Some(properties) = properties.filter(|p| !p.is_empty()) else {
        match additional {
            Some(extra @ Value::Object(_)) => {
                let mut inner = String::new();
                print_type(extra, depth, &mut inner);
                out.push_str(&format!("Record<string, {inner}>"));
            }
            Some(Value::Bool(false)) => out.push_str("{}"),
            _ => out.push_str("Record<string, unknown>"),
        }
        return;
    };

    let required: Vec<&str> = obj
        .get("required")
        .and_then(Value::as_array)
        .map(|r| r.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let indent = "  ".repeat(depth + 1);
    out.push_str("{\n");
    for (name, schema) in properties {
        let mut ty = String::new();
        print_type(schema, depth + 1, &mut ty);
        let key = property_key(name);
        if required.contains(&name.as_str()) {
            out.push_str(&format!("{indent}{key}: {ty};\n"));
        } else {
            out.push_str(&format!("{indent}{key}?: {ty} | undefined;\n"));
        }
    }
    if let Some(extra @ Value::Object(_)) = additional {
        let mut ty = String::new();
        print_type(extra, depth + 1, &mut ty);
        out.push_str(&format!("{indent}[key: string]: {ty};\n"));
    }
    out.push_str(&"  ".repeat(depth));
    out.push('}');
}

fn print_union(parts: impl Iterator<Item = String>, out: &mut String) {
    let mut parts: Vec<String> = parts.collect();
    parts.dedup();
    if parts.is_empty() {
        out.push_str("never");
    } else {
        out.push_str(&parts.join(" | "));
    }
}

/// Quote property names that are not valid identifiers.
fn property_key(name: &str) -> String {
    let mut chars = name.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if valid {
        name.to_string()
    } else {
        Value::String(name.to_string()).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_requires_title() {
        let schema = Schema::minimal();
        assert!(schema.validate(&json!({ "title": "Intro" })).is_ok());

        let violations = schema.validate(&json!({ "slug": "intro" })).unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "title");
    }

    #[test]
    fn test_minimal_slug_pattern() {
        let schema = Schema::minimal();
        assert!(schema.validate(&json!({ "title": "A", "slug": "getting-started" })).is_ok());

        let violations = schema
            .validate(&json!({ "title": "A", "slug": "Getting_Started" }))
            .unwrap_err();
        assert_eq!(violations[0].field, "slug");
    }

    #[test]
    fn test_null_document_fails() {
        let violations = Schema::minimal().validate(&Value::Null).unwrap_err();
        assert!(!violations.is_empty());
    }

    #[test]
    fn test_every_violation_reported() {
        let schema = Schema::compile(json!({
            "type": "object",
            "properties": {
                "title": { "type": "string" },
                "order": { "type": "integer" }
            },
            "required": ["title", "order"]
        }))
        .unwrap();
        let violations = schema.validate(&json!({})).unwrap_err();
        let fields: Vec<_> = violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, ["order", "title"]);
    }

    #[test]
    fn test_invalid_schema() {
        let err = Schema::compile(json!({ "type": 12 })).unwrap_err();
        assert!(matches!(err, SchemaError::Invalid(_)));
    }

    #[test]
    fn test_typescript_minimal() {
        assert_eq!(
            Schema::minimal().to_typescript(),
            "{\n  title: string;\n  slug?: string | undefined;\n}"
        );
    }

    #[test]
    fn test_typescript_nested() {
        let schema = Schema::compile(json!({
            "type": "object",
            "properties": {
                "tags": { "type": "array", "items": { "type": "string" } },
                "status": { "enum": ["draft", "published"] },
                "author": {
                    "type": "object",
                    "properties": { "display-name": { "type": ["string", "null"] } },
                    "required": ["display-name"]
                }
            },
            "required": ["status"]
        }))
        .unwrap();
        assert_eq!(
            schema.to_typescript(),
            "{\n  tags?: string[] | undefined;\n  status: \"draft\" | \"published\";\n  author?: {\n    \"display-name\": string | null;\n  } | undefined;\n}"
        );
    }

    #[test]
    fn test_typescript_fallbacks() {
        let any = Schema::compile(json!({})).unwrap();
        assert_eq!(any.to_typescript(), "unknown");

        let map = Schema::compile(json!({
            "type": "object",
            "additionalProperties": { "type": "number" }
        }))
        .unwrap();
        assert_eq!(map.to_typescript(), "Record<string, number>");
    }

    #[test]
    fn test_schema_from_yaml_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("schema.yaml");
        fs::write(
            &path,
            "type: object\nproperties:\n  title: { type: string }\nrequired: [title]\n",
        )
        .unwrap();
        let schema = Schema::from_file(&path).unwrap();
        assert!(schema.validate(&json!({ "title": "x" })).is_ok());
    }
}
