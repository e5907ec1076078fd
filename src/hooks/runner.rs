//! Format hook execution.
//!
//! Runs the configured `build.format` command on every written artifact,
//! with `$LECTERN_*` variables substituted and exported.

use crate::debug;
use crate::logger::Logger;
use crate::utils::exec::Cmd;
use anyhow::{Context, Result};
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};

/// Variable naming the artifact being formatted.
pub const FILE_VAR: &str = "LECTERN_FILE";

// ============================================================================
// Environment Variables
// ============================================================================

/// Build `$LECTERN_*` environment variables for one artifact
pub fn build_lectern_vars(root: &Path, collection: &str, file: &Path) -> FxHashMap<String, String> {
    let mut vars = FxHashMap::default();
    vars.insert(FILE_VAR.into(), file.display().to_string());
    vars.insert("LECTERN_ROOT".into(), root.display().to_string());
    vars.insert("LECTERN_COLLECTION".into(), collection.into());
    vars
}

// ============================================================================
// Command Argument Resolution
// ============================================================================

/// Resolve `$LECTERN_*` variables in command arguments
///
/// Replaces occurrences of `$LECTERN_XXX` with actual values from the vars map
pub fn resolve_args(args: &[String], vars: &FxHashMap<String, String>) -> Vec<String> {
    args.iter()
        .map(|arg| {
            let mut result = arg.clone();
            for (key, value) in vars {
                let pattern = format!("${key}");
                result = result.replace(&pattern, value);
            }
            result
        })
        .collect()
}

/// Resolved command line for one artifact.
///
/// The file path is appended when no argument references `$LECTERN_FILE`.
pub fn format_command(command: &[String], vars: &FxHashMap<String, String>) -> Vec<String> {
    let pattern = format!("${FILE_VAR}");
    let references_file = command.iter().any(|arg| arg.contains(&pattern));
    let mut resolved = resolve_args(command, vars);
    if !references_file && let Some(file) = vars.get(FILE_VAR) {
        resolved.push(file.clone());
    }
    resolved
}

// ============================================================================
// Hook Execution
// ============================================================================

/// Run the format hook on one artifact, in the base directory.
pub fn run_format_hook(
    command: &[String],
    root: &Path,
    collection: &str,
    file: &Path,
    logger: &Logger,
) -> Result<()> {
    let vars = build_lectern_vars(root, collection, file);
    let resolved = format_command(command, &vars);

    debug!(logger; "running `{}`", resolved.join(" "));
    Cmd::from_slice(&resolved)
        .cwd(root)
        .envs(&vars)
        .run(logger)
        .with_context(|| format!("failed to format {}", file.display()))?;
    Ok(())
}

/// Run the format hook on every artifact of a collection, stopping at the
/// first failure.
pub fn format_artifacts(
    command: &[String],
    root: &Path,
    collection: &str,
    files: &[PathBuf],
    logger: &Logger,
) -> Result<()> {
    let logger = logger.child("format");
    for file in files {
        run_format_hook(command, root, collection, file, &logger)?;
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
