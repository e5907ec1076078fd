//! Logging handle with colored output and a single-line status display.
//!
//! This module provides:
//! - `Logger`, a cheap cloneable handle passed to every component
//! - `log!` / `debug!` macros for formatted terminal output with colored prefixes
//! - `StatusLine` for "indexing ... done in 1.23ms" style progress
//!
//! # Example
//!
//! ```ignore
//! let logger = Logger::new(verbose).child("resolve");
//! log!(logger; "found {} files", count);
//! debug!(logger; "skipping {}", path.display());
//! ```

use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use owo_colors::OwoColorize;
use std::{
    borrow::Cow,
    io::{IsTerminal, Write, stderr},
    time::Instant,
};

// ============================================================================
// Log Macros
// ============================================================================

/// Log a message through a [`Logger`] handle
///
/// # Usage
/// ```ignore
/// log!(logger; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr; $($arg:tt)*) => {{
        $logger.log(&format!($($arg)*))
    }};
}

/// Log a debug message (only shown when the handle is verbose)
///
/// # Usage
/// ```ignore
/// debug!(logger; "debug info: {}", value);
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr; $($arg:tt)*) => {{
        if $logger.is_verbose() {
            $logger.log(&format!($($arg)*))
        }
    }};
}

// ============================================================================
// Logger
// ============================================================================

/// Explicit logging handle.
///
/// Every component receives one at construction. `child` derives a handle
/// with a different module prefix, sharing the verbosity setting.
#[derive(Debug, Clone)]
pub struct Logger {
    scope: Cow<'static, str>,
    verbose: bool,
    quiet: bool,
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(false)
    }
}

impl Logger {
    /// Create a root logger with the `lectern` prefix.
    pub fn new(verbose: bool) -> Self {
        Self {
            scope: Cow::Borrowed("lectern"),
            verbose,
            quiet: false,
        }
    }

    /// A logger that drops every message (tests, library callers).
    pub fn silent() -> Self {
        Self {
            scope: Cow::Borrowed("lectern"),
            verbose: false,
            quiet: true,
        }
    }

    /// Derive a handle with a different module prefix.
    pub fn child(&self, scope: impl Into<Cow<'static, str>>) -> Self {
        Self {
            scope: scope.into(),
            verbose: self.verbose,
            quiet: self.quiet,
        }
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose && !self.quiet
    }

    /// Log a message with this handle's colored prefix.
    pub fn log(&self, message: &str) {
        if self.quiet {
            return;
        }
        let prefix = colorize_prefix(&self.scope);
        let mut out = stderr().lock();
        writeln!(out, "{prefix} {message}").ok();
        out.flush().ok();
    }

    /// Log under an explicit module prefix, e.g. `warning`.
    pub fn log_as(&self, module: &str, message: &str) {
        if self.quiet {
            return;
        }
        let prefix = colorize_prefix(module);
        let mut out = stderr().lock();
        writeln!(out, "{prefix} {message}").ok();
        out.flush().ok();
    }

    pub fn warn(&self, message: &str) {
        self.log_as("warning", message);
    }

    /// Start a status line: `[build] indexing "Pages"`.
    pub fn status(&self, message: &str) -> StatusLine<'_> {
        StatusLine::start(self, message)
    }
}

/// Apply color to a module prefix based on module type
#[inline]
fn colorize_prefix(module: &str) -> String {
    let prefix = format!("[{module}]");
    match module.to_ascii_lowercase().as_str() {
        "build" => prefix.bright_blue().bold().to_string(),
        "check" => prefix.bright_green().bold().to_string(),
        "warning" => prefix.yellow().bold().to_string(),
        _ => prefix.bright_yellow().bold().to_string(),
    }
}

// ============================================================================
// Status Line
// ============================================================================

/// Single-line progress display for one unit of work.
///
/// Prints the message without a newline, then completes the same line with
/// the elapsed time on `finish`. Verbose handles print only the final line.
pub struct StatusLine<'a> {
    logger: &'a Logger,
    message: String,
    started: Instant,
    open: bool,
}

impl<'a> StatusLine<'a> {
    fn start(logger: &'a Logger, message: &str) -> Self {
        let open = !logger.quiet && !logger.verbose && stderr().is_terminal();
        if open {
            let prefix = colorize_prefix(&logger.scope);
            let mut out = stderr().lock();
            write!(out, "{} {}", prefix, message.dimmed()).ok();
            out.flush().ok();
        }
        Self {
            logger,
            message: message.to_string(),
            started: Instant::now(),
            open,
        }
    }

    /// Elapsed time in milliseconds.
    pub fn elapsed_ms(&self) -> f64 {
        self.started.elapsed().as_secs_f64() * 1000.0
    }

    /// Break the line so other output does not get appended to it.
    pub fn interrupt(&mut self) {
        if self.open {
            let mut out = stderr().lock();
            writeln!(out).ok();
            self.open = false;
        }
    }

    /// Complete the line with `done in Xms` and a summary.
    pub fn finish(mut self, summary: &str) {
        let elapsed = format!("{:.2}ms", self.elapsed_ms());
        if self.open {
            let prefix = colorize_prefix(&self.logger.scope);
            let mut out = stderr().lock();
            execute!(out, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine)).ok();
            writeln!(
                out,
                "{} {} {}",
                prefix,
                self.message.dimmed(),
                format!("done in {elapsed} ({summary})").dimmed()
            )
            .ok();
            out.flush().ok();
            self.open = false;
        } else {
            self.logger
                .log(&format!("{} done in {elapsed} ({summary})", self.message));
        }
    }
}

impl Drop for StatusLine<'_> {
    fn drop(&mut self) {
        // Unfinished (error path): terminate the line
        self.interrupt();
    }
}

// ============================================================================
// Tests
// ============================================================================
