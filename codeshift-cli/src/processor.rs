use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::{CodeshiftError, Result};
use crate::preview::PreviewDiff;
use crate::rewrite::RuleSet;

/// Read/write access to the files being migrated
pub trait FileStore {
    fn read(&self, path: &Path) -> Result<String>;
    fn write(&self, path: &Path, content: &str) -> Result<()>;
}

/// The real file system. Writes replace the file in place.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStore;

impl FileStore for FsStore {
    fn read(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).map_err(|source| CodeshiftError::Read {
            path: path.to_path_buf(),
            source,
        })
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        fs::write(path, content).map_err(|source| CodeshiftError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Mode for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Write changed files back
    Apply,
    /// Compute changes and previews, write nothing
    DryRun,
}

/// What happened to one file
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub changed: bool,
    pub fired: Vec<String>,
    pub preview: Option<PreviewDiff>,
}

/// Result of a run over many files
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub mode: WriteMode,

    /// Total files processed
    pub files_scanned: usize,

    /// Files whose content changed (written unless dry-run)
    pub files_modified: Vec<PathBuf>,

    /// How many files each rule changed
    pub rule_hits: BTreeMap<String, usize>,

    /// Per-file errors; the run continued past each of them
    pub errors: Vec<String>,

    /// Dry-run previews
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub previews: Vec<PreviewDiff>,
}

impl RunReport {
    pub fn new(mode: WriteMode) -> Self {
        Self {
            mode,
            files_scanned: 0,
            files_modified: Vec::new(),
            rule_hits: BTreeMap::new(),
            errors: Vec::new(),
            previews: Vec::new(),
        }
    }

    pub fn add_outcome(&mut self, outcome: FileOutcome) {
        if !outcome.changed {
            return;
        }
        for rule in outcome.fired {
            *self.rule_hits.entry(rule).or_insert(0) += 1;
        }
        self.previews.extend(outcome.preview);
        self.files_modified.push(outcome.path);
    }

    pub fn add_error(&mut self, error: String) {
        self.errors.push(error);
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Runs a rule set over files one at a time: read, rewrite, write back only
/// when the content changed.
pub struct FileProcessor<'a, S: FileStore = FsStore> {
    rules: &'a RuleSet,
    store: S,
    mode: WriteMode,
    root: PathBuf,
}

impl<'a> FileProcessor<'a, FsStore> {
    pub fn new(rules: &'a RuleSet, root: PathBuf, mode: WriteMode) -> Self {
        Self::with_store(rules, FsStore, root, mode)
    }
}

impl<'a, S: FileStore> FileProcessor<'a, S> {
    pub fn with_store(rules: &'a RuleSet, store: S, root: PathBuf, mode: WriteMode) -> Self {
        Self {
            rules,
            store,
            mode,
            root,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn display_path(&self, path: &Path) -> PathBuf {
        pathdiff::diff_paths(path, &self.root).unwrap_or_else(|| path.to_path_buf())
    }

    pub fn process(&self, path: &Path) -> Result<FileOutcome> {
        let original = self.store.read(path)?;
        let outcome = self.rules.run(path, &original);

        // A rule pair can cancel out; only real differences count
        if !outcome.changed || outcome.content == original {
            return Ok(FileOutcome {
                path: path.to_path_buf(),
                changed: false,
                fired: Vec::new(),
                preview: None,
            });
        }

        let preview = match self.mode {
            WriteMode::Apply => {
                self.store.write(path, &outcome.content)?;
                tracing::info!("Updated {}", self.display_path(path).display());
                None
            }
            WriteMode::DryRun => {
                tracing::info!("Would update {}", self.display_path(path).display());
                Some(PreviewDiff::between(
                    self.display_path(path),
                    outcome.fired.clone(),
                    &original,
                    &outcome.content,
                ))
            }
        };

        Ok(FileOutcome {
            path: path.to_path_buf(),
            changed: true,
            fired: outcome.fired,
            preview,
        })
    }

    /// Process every file in order. Failures are logged and recorded, and the
    /// run moves on to the next file.
    pub fn run(&self, files: &[PathBuf]) -> RunReport {
        let mut report = RunReport::new(self.mode);

        for path in files {
            report.files_scanned += 1;

            match self.process(path) {
                Ok(outcome) => report.add_outcome(outcome),
                Err(e) => {
                    tracing::error!("{}", e);
                    report.add_error(e.to_string());
                }
            }
        }

        report
    }
}
