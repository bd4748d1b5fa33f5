use std::path::Path;

use super::imports::ImportScan;
use super::matcher::{Matcher, PathFilter};

/// Adds `import { <symbol> } from "<module>";` to files that started using
/// `symbol` without importing it. Runs after every content rule.
#[derive(Debug, Clone)]
pub struct ImportInserter {
    pub name: String,
    pub enabled: bool,
    pub symbol: String,
    pub module: String,

    /// Content that proves the symbol is used
    pub trigger: Matcher,

    /// Extra content condition on top of the trigger
    pub content: Matcher,

    pub paths: PathFilter,
}

impl ImportInserter {
    pub fn new(
        name: impl Into<String>,
        symbol: impl Into<String>,
        module: impl Into<String>,
        trigger: Matcher,
    ) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            symbol: symbol.into(),
            module: module.into(),
            trigger,
            content: Matcher::Always,
            paths: PathFilter::any(),
        }
    }

    pub fn with_paths(mut self, paths: PathFilter) -> Self {
        self.paths = paths;
        self
    }

    pub fn when(mut self, content: Matcher) -> Self {
        self.content = content;
        self
    }

    pub fn describe_condition(&self) -> String {
        match self.content {
            Matcher::Always => self.trigger.describe(),
            _ => format!("{} and {}", self.trigger.describe(), self.content.describe()),
        }
    }

    pub fn import_line(&self) -> String {
        format!("import {{ {} }} from \"{}\";", self.symbol, self.module)
    }

    /// Returns the content with the import inserted, or `None` when nothing
    /// needs to change.
    pub fn apply(&self, path: &Path, content: &str) -> Option<String> {
        if !self.enabled
            || !self.paths.matches(path)
            || !self.trigger.is_match(content)
            || !self.content.is_match(content)
        {
            return None;
        }

        let lines: Vec<&str> = content.split('\n').collect();
        let scan = ImportScan::of(&lines);

        if let Some(open) = scan.unterminated {
            tracing::warn!(
                "{}:{}: import block never closes, not inserting {}",
                path.display(),
                open + 1,
                self.symbol
            );
            return None;
        }

        if scan.imports(&self.symbol, &self.module) {
            return None;
        }

        let Some(anchor) = scan.anchor() else {
            tracing::debug!(
                "{}: uses {} but has no imports to anchor on, skipping",
                path.display(),
                self.symbol
            );
            return None;
        };

        let import_line = match lines[anchor].ends_with('\r') {
            true => format!("{}\r", self.import_line()),
            false => self.import_line(),
        };

        let mut updated: Vec<&str> = Vec::with_capacity(lines.len() + 1);
        updated.extend_from_slice(&lines[..=anchor]);
        updated.push(&import_line);
        updated.extend_from_slice(&lines[anchor + 1..]);

        Some(updated.join("\n"))
    }
}
