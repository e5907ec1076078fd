//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Content indexer for headless CMS collections
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path, searched upward from the current directory
    #[arg(short = 'C', long, global = true, default_value = crate::config::CONFIG_FILE, value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Index collections and write their artifacts
    #[command(visible_alias = "b")]
    Build {
        #[command(flatten)]
        select: SelectArgs,

        /// Leave invalid files out instead of failing the collection
        #[arg(long)]
        skip_invalid: bool,
    },

    /// Validate every entry without writing artifacts
    #[command(visible_alias = "c")]
    Check {
        #[command(flatten)]
        select: SelectArgs,
    },

    /// List registered collections
    #[command(visible_alias = "l")]
    List,

    /// Print generated entries as JSON
    #[command(visible_alias = "s")]
    Show {
        /// Collection id, name or export name
        collection: String,

        /// Entry id or key; all entries when omitted
        entry: Option<String>,

        /// Pretty-print JSON output
        #[arg(short, long)]
        pretty: bool,
    },
}

/// Collection selection shared by `build` and `check`.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct SelectArgs {
    /// Only process the named collections (repeatable)
    #[arg(short = 'c', long = "collection", value_name = "NAME")]
    pub collections: Vec<String>,
}
