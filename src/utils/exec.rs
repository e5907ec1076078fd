//! External command execution utilities.
//!
//! Provides a Builder-based API for running commands with output handling.
//!
//! # Examples
//!
//! ```ignore
//! use crate::utils::exec::Cmd;
//!
//! Cmd::new("prettier")
//!     .args(["--write", "docs/index.ts"])
//!     .cwd(root)
//!     .run(&logger)?;
//! ```

use crate::debug;
use crate::logger::Logger;
use anyhow::{Context, Result, bail};
use regex::Regex;
use std::{
    ffi::{OsStr, OsString},
    path::{Path, PathBuf},
    process::{Command, Output},
    sync::OnceLock,
};

// ============================================================================
// Builder API
// ============================================================================

/// Command builder for external process execution.
#[derive(Debug, Default)]
pub struct Cmd {
    program: OsString,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
    envs: Vec<(String, String)>,
}

impl Cmd {
    pub fn new<S: AsRef<OsStr>>(program: S) -> Self {
        Self {
            program: program.as_ref().to_owned(),
            ..Default::default()
        }
    }

    /// Create from a command array (e.g., `["prettier", "--write"]`).
    pub fn from_slice<S: AsRef<OsStr>>(cmd: &[S]) -> Self {
        let mut iter = cmd.iter();
        let program = iter
            .next()
            .map(|s| s.as_ref().to_owned())
            .unwrap_or_default();
        let args: Vec<_> = iter.map(|s| s.as_ref().to_owned()).collect();
        Self {
            program,
            args,
            ..Default::default()
        }
    }

    /// Add a single argument. Empty arguments are dropped.
    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        let arg = arg.as_ref();
        if !arg.is_empty() {
            self.args.push(arg.to_owned());
        }
        self
    }

    /// Add multiple arguments. Empty arguments are dropped.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        for arg in args {
            self = self.arg(arg);
        }
        self
    }

    pub fn cwd<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.cwd = Some(dir.as_ref().to_owned());
        self
    }

    /// Set environment variables for the subprocess.
    pub fn envs<K, V, I>(mut self, vars: I) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
        I: IntoIterator<Item = (K, V)>,
    {
        for (k, v) in vars {
            self.envs.push((k.as_ref().to_owned(), v.as_ref().to_owned()));
        }
        self
    }

    fn program_name(&self) -> String {
        self.program.to_string_lossy().to_string()
    }

    /// Execute the command and return its output.
    ///
    /// The program is resolved on `PATH` first. A missing program or a
    /// non-zero exit is an error carrying the command's stderr.
    pub fn run(self, logger: &Logger) -> Result<Output> {
        let name = self.program_name();
        if name.is_empty() {
            bail!("empty command");
        }
        let program = resolve_program(&self.program, self.cwd.as_deref())
            .with_context(|| format!("`{name}` not found"))?;

        let mut cmd = Command::new(program);
        cmd.args(&self.args).envs(self.envs.iter().cloned());
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }

        let output = cmd
            .output()
            .with_context(|| format!("failed to execute `{name}`"))?;

        if !output.status.success() {
            bail!(format_error(&name, &output));
        }
        log_output(&name, &output, logger);
        Ok(output)
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Locate `program` on `PATH`, resolving relative paths against `cwd`.
pub fn resolve_program(program: impl AsRef<OsStr>, cwd: Option<&Path>) -> which::Result<PathBuf> {
    match cwd {
        Some(dir) => which::which_in(program, std::env::var_os("PATH"), dir),
        None => which::which(program),
    }
}

/// Strip ANSI escape codes from string.
fn strip_ansi(s: &str) -> std::borrow::Cow<'_, str> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| match Regex::new(r"\x1b\[[0-9;]*m") {
        Ok(re) => re,
        Err(_) => unreachable!("static regex"),
    });
    re.replace_all(s, "")
}

/// Log non-empty stderr lines of a successful command (verbose only).
fn log_output(name: &str, output: &Output, logger: &Logger) {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let lines: Vec<_> = stderr
        .lines()
        .map(strip_ansi)
        .filter(|line| !line.trim().is_empty())
        .collect();
    if !lines.is_empty() {
        debug!(logger; "`{name}`: {}", lines.join("\n"));
    }
}

/// Format error message for failed command.
fn format_error(name: &str, output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);

    let mut msg = format!("command `{name}` failed with {}", output.status);
    let stderr = strip_ansi(stderr.trim()).into_owned();
    if !stderr.is_empty() {
        msg.push('\n');
        msg.push_str(&stderr);
    }
    let stdout = stdout.trim();
    if !stdout.is_empty() {
        msg.push_str("\nstdout:\n");
        msg.push_str(stdout);
    }
    msg
}

// ============================================================================
// Tests
// ============================================================================
