use anyhow::{Context, Result};
use std::path::PathBuf;

use codeshift::core::{OutputFormat, OutputWriter, Settings};
use codeshift::{FileDiscovery, FileProcessor, GlobWalker, RuleSet, WriteMode};

pub fn run(
    root: PathBuf,
    config: Option<PathBuf>,
    dry_run: bool,
    format: OutputFormat,
) -> Result<()> {
    let settings =
        Settings::load(&root, config.as_deref()).context("Failed to load configuration")?;
    let rules = RuleSet::from_settings(&settings).context("Failed to build rule set")?;

    let files = GlobWalker::from_settings(&settings)
        .discover(&root)
        .context("Failed to discover files")?;
    tracing::info!("Found {} files to process", files.len());

    let mode = if dry_run {
        WriteMode::DryRun
    } else {
        WriteMode::Apply
    };
    let root = root.canonicalize().unwrap_or(root);
    let processor = FileProcessor::new(&rules, root, mode);
    let report = processor.run(&files);

    tracing::info!(
        "Finished {} v{}: {} of {} files {}",
        rules.name,
        rules.version,
        report.files_modified.len(),
        report.files_scanned,
        if dry_run { "would change" } else { "changed" }
    );

    OutputWriter::new(format).write_report(&report)
}
