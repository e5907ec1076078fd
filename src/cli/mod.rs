//! Command-line interface module.

mod args;
pub mod build;
mod common;
pub mod list;
pub mod show;

pub use args::{Cli, Commands, SelectArgs};
pub use common::Project;

use anyhow::Result;

/// Load the project and dispatch the parsed command.
pub fn run(cli: &Cli) -> Result<()> {
    let project = Project::load(cli)?;
    match &cli.command {
        Commands::Build {
            select,
            skip_invalid,
        } => build::build(&project, select, *skip_invalid).map(|_| ()),
        Commands::Check { select } => build::check(&project, select).map(|_| ()),
        Commands::List => list::list(&project),
        Commands::Show {
            collection,
            entry,
            pretty,
        } => show::show(&project, collection, entry.as_deref(), *pretty),
    }
}
