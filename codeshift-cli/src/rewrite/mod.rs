pub mod imports;
pub mod inserter;
pub mod matcher;
pub mod registry;
pub mod transforms;

pub use imports::{BindingRoute, ExportKind, ImportRewriter, ImportScan, ImportStatement};
pub use inserter::ImportInserter;
pub use matcher::{Matcher, PathFilter};
pub use registry::{RuleSet, RuleSpec};

use std::fmt::Debug;
use std::path::Path;

/// A content transformation. Implementations must be idempotent:
/// applying one to its own output returns that output unchanged.
pub trait Transform: Debug + Send + Sync {
    fn apply(&self, path: &Path, content: &str) -> String;

    /// One-line description for rule listings
    fn describe(&self) -> String;
}

/// A named transform gated by a path filter and a content matcher
#[derive(Debug)]
pub struct Rule {
    pub name: String,
    pub enabled: bool,
    pub paths: PathFilter,
    pub content: Matcher,
    pub transform: Box<dyn Transform>,
}

impl Rule {
    pub fn new(name: impl Into<String>, transform: impl Transform + 'static) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            paths: PathFilter::any(),
            content: Matcher::Always,
            transform: Box::new(transform),
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

    pub fn applies_to(&self, path: &Path, content: &str) -> bool {
        self.enabled && self.paths.matches(path) && self.content.is_match(content)
    }
}

/// Output of running the pipeline over one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutcome {
    pub content: String,

    /// True iff at least one rule produced a different buffer
    pub changed: bool,

    /// Rules that changed the buffer, in order
    pub fired: Vec<String>,
}

/// Ordered list of rules applied to one in-memory buffer
#[derive(Debug, Default)]
pub struct RulePipeline {
    rules: Vec<Rule>,
}

impl RulePipeline {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn rules_mut(&mut self) -> &mut [Rule] {
        &mut self.rules
    }

    pub fn run(&self, path: &Path, content: &str) -> PipelineOutcome {
        let mut current = content.to_string();
        let mut fired = Vec::new();

        for rule in &self.rules {
            if !rule.applies_to(path, &current) {
                continue;
            }

            let next = rule.transform.apply(path, &current);
            if next != current {
                tracing::debug!("{}: rule {} fired", path.display(), rule.name);
                fired.push(rule.name.clone());
                current = next;
            }
        }

        PipelineOutcome {
            changed: !fired.is_empty(),
            content: current,
            fired,
        }
    }
}
