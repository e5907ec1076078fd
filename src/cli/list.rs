//! `list` command.

use anyhow::Result;
use owo_colors::OwoColorize;

use super::common::{Project, entry_count};
use crate::runtime::{CollectionInfo, DataSource, FileDataProvider, LookupError};

/// A registered collection and the size of its generated index.
#[derive(Debug)]
pub struct Listing {
    pub info: CollectionInfo,
    /// `None` when the index is missing or empty.
    pub entries: Option<usize>,
}

/// Collect every registered collection in declaration order.
pub fn collect(provider: &impl DataSource) -> Result<Vec<Listing>> {
    provider
        .collections()
        .into_iter()
        .map(|info| {
            let mut count = 0;
            for entry in provider.entries(info.id.as_str()) {
                match entry {
                    Ok(_) => count += 1,
                    Err(LookupError::EmptyIndex(_)) => {
                        return Ok(Listing {
                            info,
                            entries: None,
                        });
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            Ok(Listing {
                info,
                entries: Some(count),
            })
        })
        .collect()
}

/// Print registered collections.
pub fn list(project: &Project) -> Result<()> {
    let provider = FileDataProvider::new(project.root(), project.config.registry()?);
    for listing in collect(&provider)? {
        let info = &listing.info;
        let size = match listing.entries {
            Some(n) => entry_count(n),
            None => "not built".to_string(),
        };
        println!(
            "{} {} {}",
            info.name.bold(),
            format!("({})", info.export_name).dimmed(),
            size.cyan()
        );
        println!("  {} {}", "id".dimmed(), info.id);
        println!("  {} {}/ {}", "root".dimmed(), info.root_dir, info.format.dimmed());
    }
    Ok(())
}
