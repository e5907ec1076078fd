//! `build` and `check` commands.
//!
//! Both index the selected collections in declaration order. `build` writes
//! the artifacts and runs the format hook; `check` only validates, reporting
//! every failure instead of stopping at the first.

use anyhow::{Context, Result, bail};

use super::args::SelectArgs;
use super::common::{Project, entry_count};
use crate::hooks::format_artifacts;
use crate::indexer::{BuildReport, ErrorPolicy, IndexOptions, Indexer, generate};
use crate::log;

/// Generate artifacts for the selected collections.
pub fn build(project: &Project, select: &SelectArgs, skip_invalid: bool) -> Result<BuildReport> {
    let logger = project.logger.child("build");
    let settings = &project.config.build;

    let mut options = settings.index_options();
    if skip_invalid {
        options.policy = ErrorPolicy::Skip;
    }
    let indexer = Indexer::new(project.root(), options, &project.logger);

    let mut report = BuildReport::default();
    for collection in project.select(select)? {
        let status = logger.status(&format!("indexing \"{}\"", collection.name));
        let mut generated = generate(&indexer, collection, &settings.emit, &settings.import_source)
            .with_context(|| format!("failed to build collection `{}`", collection.name))?;

        if let Some(command) = settings.format_hook() {
            format_artifacts(
                command,
                project.root(),
                &collection.name,
                &generated.written,
                &project.logger,
            )?;
        }

        status.finish(&entry_count(generated.index.entries.len()));
        report.add(&mut generated.index, generated.written);
    }

    if report.has_failures() {
        report.print();
        log!(logger; "{report}");
    }
    Ok(report)
}

/// Validate the selected collections without writing anything.
///
/// Fails when any file is invalid.
pub fn check(project: &Project, select: &SelectArgs) -> Result<BuildReport> {
    let logger = project.logger.child("check");
    let options = IndexOptions {
        policy: ErrorPolicy::Skip,
        history: false,
    };
    let indexer = Indexer::new(project.root(), options, &project.logger);

    let mut report = BuildReport::default();
    for collection in project.select(select)? {
        let status = logger.status(&format!("checking \"{}\"", collection.name));
        let mut index = indexer
            .index(collection)
            .with_context(|| format!("failed to check collection `{}`", collection.name))?;
        status.finish(&entry_count(index.entries.len()));
        report.add(&mut index, Vec::new());
    }

    if report.has_failures() {
        report.print();
        bail!("{report}");
    }
    log!(logger; "{report}");
    Ok(report)
}
