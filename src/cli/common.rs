//! Shared helpers for CLI commands.

use anyhow::{Result, bail};
use std::path::Path;

use super::args::{Cli, SelectArgs};
use crate::collection::{ParsedCollection, Registry};
use crate::config::LecternConfig;
use crate::logger::Logger;
use crate::utils::plural::plural_count;

/// Loaded configuration and its collection registry.
pub struct Project {
    pub config: LecternConfig,
    pub registry: Registry,
    pub logger: Logger,
}

impl Project {
    /// Load the project the CLI points at.
    pub fn load(cli: &Cli) -> Result<Self> {
        let logger = Logger::new(cli.verbose);
        let cwd = std::env::current_dir()?;
        Self::load_from(&cwd, &cli.config, logger)
    }

    pub fn load_from(start: &Path, config: &Path, logger: Logger) -> Result<Self> {
        let config = LecternConfig::load(start, config, &logger.child("config"))?;
        let registry = config.registry()?;
        Ok(Self {
            config,
            registry,
            logger,
        })
    }

    /// Base path every collection root is relative to.
    pub fn root(&self) -> &Path {
        self.config.root()
    }

    /// Selected collections in declaration order, all when none are named.
    pub fn select(&self, select: &SelectArgs) -> Result<Vec<&ParsedCollection>> {
        if select.collections.is_empty() {
            return Ok(self.registry.iter().collect());
        }
        for name in &select.collections {
            if self.registry.get(name).is_none() {
                bail!("no collection matches `{name}`");
            }
        }
        Ok(self
            .registry
            .iter()
            .filter(|c| select.collections.iter().any(|name| c.is_named(name)))
            .collect())
    }
}

/// `1 entry`, `3 entries`.
pub fn entry_count(n: usize) -> String {
    plural_count(n, "entry")
}
