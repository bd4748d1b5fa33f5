use anyhow::{Context, Result};
use std::path::PathBuf;

use codeshift::core::{OutputFormat, OutputWriter, Settings};
use codeshift::RuleSet;

pub fn run(root: PathBuf, config: Option<PathBuf>, format: OutputFormat) -> Result<()> {
    let settings =
        Settings::load(&root, config.as_deref()).context("Failed to load configuration")?;
    let rules = RuleSet::from_settings(&settings).context("Failed to build rule set")?;

    OutputWriter::new(format).write_rules(&rules.summary())
}
