//! `[build]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [build]
//! on_error = "abort"              # abort | skip
//! history = true                  # Look up git history per entry
//! emit = ["typescript", "json"]   # Artifacts written next to the content
//! import_source = "@lectern/content/internal"
//! format = ["prettier", "--write", "$LECTERN_FILE"]
//! ```

use crate::config::ConfigDiagnostics;
use crate::indexer::{DEFAULT_IMPORT_SOURCE, EmitTarget, ErrorPolicy, IndexOptions};
use crate::utils::exec::resolve_program;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// What happens when a single file fails to index.
    pub on_error: ErrorPolicy,

    /// Look up the latest commit touching each entry.
    pub history: bool,

    /// Artifacts to write.
    pub emit: Vec<EmitTarget>,

    /// Module the generated `index.ts` imports its helpers from.
    pub import_source: String,

    /// Formatter run on every written artifact.
    /// Supports `$LECTERN_*` variable substitution.
    pub format: Vec<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            on_error: ErrorPolicy::Abort,
            history: true,
            emit: vec![EmitTarget::Typescript, EmitTarget::Json],
            import_source: DEFAULT_IMPORT_SOURCE.to_string(),
            format: Vec::new(),
        }
    }
}

impl BuildConfig {
    pub fn index_options(&self) -> IndexOptions {
        IndexOptions {
            policy: self.on_error,
            history: self.history,
        }
    }

    /// The format hook command, if one is configured.
    pub fn format_hook(&self) -> Option<&[String]> {
        (!self.format.is_empty()).then_some(self.format.as_slice())
    }

    /// Check the section. The format program is resolved from `root`, the
    /// directory the hook runs in.
    pub fn validate(&self, root: &Path, diag: &mut ConfigDiagnostics) {
        if self.emit.is_empty() {
            diag.error_with_hint(
                "build.emit",
                "no artifacts selected",
                "use `emit = [\"typescript\", \"json\"]`",
            );
        }
        for (i, target) in self.emit.iter().enumerate() {
            if self.emit[..i].contains(target) {
                diag.warn("build.emit", format!("`{target:?}` is listed more than once"));
            }
        }

        if self.import_source.trim().is_empty() {
            diag.error("build.import_source", "must not be empty");
        }

        if let Some(program) = self.format.first()
            && !program.starts_with('$')
            && resolve_program(program, Some(root)).is_err()
        {
            diag.error_with_hint(
                "build.format",
                format!("`{program}` not found"),
                "install the formatter or remove `build.format`",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.build, BuildConfig::default());
        assert!(config.build.format_hook().is_none());

        let options = config.build.index_options();
        assert_eq!(options.policy, ErrorPolicy::Abort);
        assert!(options.history);
    }

    #[test]
    fn test_full_section() {
        let config = test_parse_config(
            r#"
[build]
on_error = "skip"
history = false
emit = ["json"]
import_source = "@acme/cms"
format = ["prettier", "--write", "$LECTERN_FILE"]
"#,
        );
        assert_eq!(config.build.on_error, ErrorPolicy::Skip);
        assert!(!config.build.history);
        assert_eq!(config.build.emit, [EmitTarget::Json]);
        assert_eq!(config.build.import_source, "@acme/cms");
        assert_eq!(
            config.build.format_hook(),
            Some(&["prettier".to_string(), "--write".into(), "$LECTERN_FILE".into()][..])
        );
    }

    #[test]
    fn test_invalid_policy_rejected() {
        let result: Result<BuildConfig, _> = toml::from_str("on_error = \"retry\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate() {
        let mut diag = ConfigDiagnostics::new();
        let build = BuildConfig {
            emit: vec![EmitTarget::Json, EmitTarget::Json],
            format: vec!["definitely-not-a-formatter-0451".into()],
            ..BuildConfig::default()
        };
        build.validate(Path::new("."), &mut diag);
        assert_eq!(diag.len(), 1);
        assert_eq!(diag.errors()[0].field, "build.format");
        assert_eq!(diag.warnings().len(), 1);

        let mut diag = ConfigDiagnostics::new();
        BuildConfig {
            emit: Vec::new(),
            ..BuildConfig::default()
        }
        .validate(Path::new("."), &mut diag);
        assert_eq!(diag.errors()[0].field, "build.emit");
    }

    #[cfg(unix)]
    #[test]
    fn test_format_program_resolved_from_root() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::TempDir::new().unwrap();
        let script = dir.path().join("format.sh");
        std::fs::write(&script, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let build = BuildConfig {
            format: vec!["./format.sh".into()],
            ..BuildConfig::default()
        };
        let mut diag = ConfigDiagnostics::new();
        build.validate(dir.path(), &mut diag);
        assert!(diag.is_empty());

        let elsewhere = tempfile::TempDir::new().unwrap();
        let mut diag = ConfigDiagnostics::new();
        build.validate(elsewhere.path(), &mut diag);
        assert_eq!(diag.errors()[0].field, "build.format");
    }
}
