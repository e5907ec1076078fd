//! Project configuration management for `lectern.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── build      # [build]
//! │   └── collection # [[collection]]
//! ├── types/         # Utility types
//! │   └── error      # ConfigError, ConfigDiagnostics
//! └── mod.rs         # LecternConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section            | Purpose                                        |
//! |--------------------|------------------------------------------------|
//! | `[build]`          | Error policy, history, artifacts, format hook  |
//! | `[[collection]]`   | Content template, schema, sort, sub-indexes    |

pub mod section;
pub mod types;
mod util;

use util::find_config_file;

pub use section::{
    BuildConfig, CollectionConfig, IndexConfig, PartitionConfig, SchemaSource, SortConfig,
};
pub use types::{ConfigDiagnostic, ConfigDiagnostics, ConfigError};

use crate::collection::Registry;
use crate::logger::Logger;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Default config file name.
pub const CONFIG_FILE: &str = "lectern.toml";

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing lectern.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LecternConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Base path: parent of the config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default, rename = "collection")]
    pub collections: Vec<CollectionConfig>,
}

impl LecternConfig {
    /// Find `config` searching upward from `start`, then load and validate it.
    ///
    /// The directory containing the config file becomes the base path.
    pub fn load(start: &Path, config: &Path, logger: &Logger) -> Result<Self> {
        let Some(config_path) = find_config_file(start, config) else {
            return Err(ConfigError::NotFound(config.to_path_buf()).into());
        };
        let config_path = crate::utils::path::normalize_path(&config_path);

        let mut config = Self::from_path(&config_path, logger)?;
        config.root = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        config.config_path = config_path;

        config.validate(logger)?;
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Toml)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path, logger: &Logger) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path, logger);
        }
        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::Toml)?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path, logger: &Logger) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        logger.warn(&format!("unknown fields in {display_path}, ignoring:"));
        for field in fields {
            eprintln!("- {field}");
        }
    }

    /// Get the base path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Validate configuration.
    ///
    /// Collects all validation errors and returns them at once.
    pub fn validate(&self, logger: &Logger) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        if self.collections.is_empty() {
            diag.error_with_hint(
                "collection",
                "no collections declared",
                "add a `[[collection]]` table with a `content` template",
            );
        }

        self.build.validate(&self.root, &mut diag);
        for (position, collection) in self.collections.iter().enumerate() {
            collection.validate(position, &self.root, &mut diag);
        }

        diag.print_warnings(logger);
        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }

    /// Build the collection registry, in declaration order.
    pub fn registry(&self) -> Result<Registry, ConfigError> {
        let mut registry = Registry::new();
        for collection in &self.collections {
            let definition = collection.to_definition(&self.root)?;
            registry
                .register(definition)
                .map_err(|source| ConfigError::Definition {
                    collection: collection.label().to_string(),
                    source,
                })?;
        }
        Ok(registry)
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config, panicking on unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> LecternConfig {
    let (parsed, ignored) = LecternConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const DOCS: &str = r#"
[build]
history = false

[[collection]]
content = "{root:docs}/{any}\\.md"
schema = "schemas/docs.yaml"

[[collection]]
name = "Blog"
content = "{root:posts}/{index:\\d+}-{name:[\\w-]+}\\.md"

[collection.index.byYear]
partition = { by = "data.year" }
"#;

    #[test]
    fn test_from_str_invalid_toml() {
        let result = LecternConfig::from_str("[build\nhistory = false");
        assert!(result.is_err());
    }

    #[test]
    fn test_default_config() {
        let config = LecternConfig::default();
        assert_eq!(config.root(), Path::new(""));
        assert!(config.collections.is_empty());
        assert!(config.build.history);
    }

    #[test]
    fn test_unknown_fields_detected() {
        let content = "[build]\nhistory = false\n[unknown_section]\nfield = \"value\"";
        let (config, ignored) = LecternConfig::parse_with_ignored(content).unwrap();
        assert!(!config.build.history);
        assert!(ignored.iter().any(|f| f.contains("unknown_section")));
    }

    #[test]
    fn test_no_collections_is_an_error() {
        let config = test_parse_config("[build]\nhistory = false");
        let err = config.validate(&Logger::silent()).unwrap_err();
        assert!(err.to_string().contains("no collections declared"));
    }

    #[test]
    fn test_load_and_build_registry() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("docs/guide");
        fs::create_dir_all(&nested).unwrap();
        fs::create_dir_all(dir.path().join("schemas")).unwrap();
        fs::write(
            dir.path().join("schemas/docs.yaml"),
            "type: object\nrequired: [title, order]\n",
        )
        .unwrap();
        fs::write(dir.path().join(CONFIG_FILE), DOCS).unwrap();

        let config =
            LecternConfig::load(&nested, Path::new(CONFIG_FILE), &Logger::silent()).unwrap();
        assert_eq!(
            config.root(),
            crate::utils::path::normalize_path(dir.path())
        );
        assert!(!config.build.history);

        let registry = config.registry().unwrap();
        let names: Vec<_> = registry.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Docs", "Blog"]);

        let docs = registry.get("docs").unwrap();
        assert_eq!(docs.schema().source()["required"][1], "order");
        let blog = registry.get("Blog").unwrap();
        assert_eq!(blog.indexes()[0].name(), "byYear");
    }

    #[test]
    fn test_load_missing_config() {
        let dir = TempDir::new().unwrap();
        let err = LecternConfig::load(dir.path(), Path::new("missing-lectern.toml"), &Logger::silent())
            .unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_duplicate_roots_rejected() {
        let config = test_parse_config(
            r#"
[[collection]]
content = "{root:docs}/{any}\\.md"

[[collection]]
content = "{root:docs}/{any}\\.mdx"
"#,
        );
        assert!(matches!(
            config.registry(),
            Err(ConfigError::Definition { .. })
        ));
    }
}
