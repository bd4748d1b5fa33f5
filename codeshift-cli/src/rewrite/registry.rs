use serde::{Deserialize, Serialize};
use std::path::Path;

use super::imports::{BindingRoute, ImportRewriter};
use super::inserter::ImportInserter;
use super::matcher::{Matcher, PathFilter};
use super::transforms::{LineLiteralReplace, LiteralReplace, RegexReplace, Scope};
use super::{PipelineOutcome, Rule, RulePipeline};
use crate::core::{CodeshiftError, Result, Settings};

pub const DEFAULT_PRESET: &str = "next-yak-to-styled-components";

/// Preset with no rules, for runs driven entirely by custom rules
pub const EMPTY_PRESET: &str = "none";

pub const PRESETS: &[&str] = &[DEFAULT_PRESET, EMPTY_PRESET];

/// A versioned, ordered set of rules plus the import insertions that run
/// after them
#[derive(Debug)]
pub struct RuleSet {
    pub name: String,
    pub version: u32,
    pub pipeline: RulePipeline,
    pub inserters: Vec<ImportInserter>,
}

impl RuleSet {
    pub fn new(name: impl Into<String>, version: u32) -> Self {
        Self {
            name: name.into(),
            version,
            pipeline: RulePipeline::default(),
            inserters: Vec::new(),
        }
    }

    pub fn preset(name: &str) -> Result<Self> {
        match name {
            DEFAULT_PRESET => next_yak_to_styled_components(),
            EMPTY_PRESET => Ok(RuleSet::new(EMPTY_PRESET, 1)),
            other => Err(CodeshiftError::UnknownPreset(other.to_string())),
        }
    }

    /// Preset named in the settings, extended with the custom rules and with
    /// the disabled rules switched off
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let mut set = Self::preset(&settings.preset)?;

        for spec in &settings.rules {
            if set.contains(&spec.name) {
                return Err(CodeshiftError::InvalidRule {
                    name: spec.name.clone(),
                    reason: "a rule with this name already exists".to_string(),
                });
            }
            match spec.build()? {
                BuiltRule::Rule(rule) => set.pipeline.push(rule),
                BuiltRule::Inserter(inserter) => set.inserters.push(inserter),
            }
        }

        for name in &settings.disabled_rules {
            set.disable(name)?;
        }

        Ok(set)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.pipeline.rules().iter().any(|rule| rule.name == name)
            || self.inserters.iter().any(|inserter| inserter.name == name)
    }

    pub fn disable(&mut self, name: &str) -> Result<()> {
        let mut found = false;
        for rule in self.pipeline.rules_mut().iter_mut().filter(|rule| rule.name == name) {
            rule.enabled = false;
            found = true;
        }
        for inserter in self.inserters.iter_mut().filter(|inserter| inserter.name == name) {
            inserter.enabled = false;
            found = true;
        }

        if !found {
            return Err(CodeshiftError::UnknownRule(name.to_string()));
        }
        Ok(())
    }

    /// Content rules, then the import insertions
    pub fn run(&self, path: &Path, content: &str) -> PipelineOutcome {
        let mut outcome = self.pipeline.run(path, content);

        for inserter in &self.inserters {
            if let Some(updated) = inserter.apply(path, &outcome.content) {
                tracing::debug!("{}: inserted {}", path.display(), inserter.import_line());
                outcome.content = updated;
                outcome.changed = true;
                outcome.fired.push(inserter.name.clone());
            }
        }

        outcome
    }

    pub fn summary(&self) -> RuleSetSummary {
        let mut entries: Vec<RuleSummary> = self
            .pipeline
            .rules()
            .iter()
            .map(|rule| RuleSummary {
                name: rule.name.clone(),
                stage: Stage::Rule,
                enabled: rule.enabled,
                paths: describe_paths(&rule.paths),
                condition: rule.content.describe(),
                action: rule.transform.describe(),
            })
            .collect();

        entries.extend(self.inserters.iter().map(|inserter| RuleSummary {
            name: inserter.name.clone(),
            stage: Stage::Insert,
            enabled: inserter.enabled,
            paths: describe_paths(&inserter.paths),
            condition: inserter.describe_condition(),
            action: format!("insert `{}` if missing", inserter.import_line()),
        }));

        RuleSetSummary {
            name: self.name.clone(),
            version: self.version,
            rules: entries,
        }
    }
}

fn describe_paths(paths: &PathFilter) -> String {
    if paths.is_any() {
        return "all files".to_string();
    }

    let mut parts = Vec::new();
    if !paths.only.is_empty() {
        parts.push(format!("paths containing {}", paths.only.join(" | ")));
    }
    if !paths.except.is_empty() {
        parts.push(format!("except {}", paths.except.join(" | ")));
    }
    parts.join(", ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Rule,
    Insert,
}

#[derive(Debug, Clone, Serialize)]
pub struct RuleSummary {
    pub name: String,
    pub stage: Stage,
    pub enabled: bool,
    pub paths: String,
    pub condition: String,
    pub action: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RuleSetSummary {
    pub name: String,
    pub version: u32,
    pub rules: Vec<RuleSummary>,
}

fn invalid(name: &str) -> impl Fn(String) -> CodeshiftError + '_ {
    move |reason| CodeshiftError::InvalidRule {
        name: name.to_string(),
        reason,
    }
}

/// Migration from next-yak back to styled-components
fn next_yak_to_styled_components() -> Result<RuleSet> {
    let mut set = RuleSet::new(DEFAULT_PRESET, 3);
    let base_link_styles = PathFilter::only(["baseLinkStyles"]);

    set.pipeline.push(
        Rule::new(
            "strip-static-css-prop-type",
            RegexReplace::new(
                r"type\s+StaticCSSProp\s*=\s*\{\s*className:\s*string;\s*style\?:\s*CSSProperties;\s*\};",
                "",
                Scope::Content,
            )?,
        )
        .with_paths(base_link_styles.clone())
        .when(Matcher::contains("StaticCSSProp")),
    );

    set.pipeline.push(
        Rule::new(
            "strip-static-css-prop-casts-block",
            RegexReplace::new(r"\s+as\s+unknown\s+as\s+StaticCSSProp", "", Scope::Content)?,
        )
        .with_paths(base_link_styles)
        .when(Matcher::contains("StaticCSSProp")),
    );

    set.pipeline.push(
        Rule::new(
            "rename-visually-hidden-mixin",
            LiteralReplace::new("visuallyHiddenMixinYak", "visuallyHiddenMixin")?,
        )
        .with_paths(PathFilter::except(["blocks/theme"]))
        .when(Matcher::contains("visuallyHiddenMixinYak")),
    );

    set.pipeline.push(
        Rule::new(
            "strip-static-css-prop-casts",
            RegexReplace::new(r"\s+as\s+unknown\s+as\s+StaticCSSProp", "", Scope::PerLine)?,
        )
        .when(Matcher::contains("as unknown as StaticCSSProp")),
    );

    set.pipeline.push(
        Rule::new(
            "next-yak-imports",
            ImportRewriter::new(
                "next-yak",
                "styled-components",
                vec![BindingRoute::default_export("styled"), BindingRoute::named("css")],
            ),
        )
        .when(Matcher::contains("next-yak")),
    );

    set.pipeline.push(
        Rule::new(
            "styled-svg-icon-import",
            LineLiteralReplace::new(
                Matcher::contains(r#"from "@blocks/icons""#),
                r#"StyledSvg""#,
                r#"StyledSvgDeprecated""#,
            )?,
        )
        .when(Matcher::contains(r#"StyledSvg""#)),
    );

    set.pipeline.push(
        Rule::new(
            "styled-svg-selector",
            RegexReplace::new(
                r"\$\{StyledSvg\}\s*([{,])",
                "$${StyledSvgDeprecated}$1",
                Scope::Content,
            )?,
        )
        .when(Matcher::contains("${StyledSvg}")),
    );

    set.inserters.push(ImportInserter::new(
        "styled-svg-deprecated-import",
        "StyledSvgDeprecated",
        "@blocks/icons",
        Matcher::contains("${StyledSvgDeprecated}"),
    ));

    Ok(set)
}

fn enabled_by_default() -> bool {
    true
}

/// A rule declared in the config file
#[derive(Debug, Clone, Deserialize)]
pub struct RuleSpec {
    pub name: String,

    #[serde(default = "enabled_by_default")]
    pub enabled: bool,

    /// Apply only to paths containing one of these
    #[serde(default)]
    pub only_paths: Vec<String>,

    /// Never apply to paths containing one of these
    #[serde(default)]
    pub except_paths: Vec<String>,

    /// Apply only when the content contains this text
    #[serde(default)]
    pub when_contains: Option<String>,

    /// Apply only when this regex matches somewhere in the content
    #[serde(default)]
    pub when_matches: Option<String>,

    pub action: ActionSpec,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionSpec {
    Literal {
        find: String,
        replace: String,
    },
    Regex {
        pattern: String,
        replace: String,
        #[serde(default)]
        per_line: bool,
    },
    Import {
        from: String,
        to: String,
        #[serde(default)]
        default: Option<String>,
        #[serde(default)]
        named: Vec<String>,
        #[serde(default)]
        keep_in_source: Vec<KeepInSource>,
    },
    Insert {
        symbol: String,
        module: String,
        trigger: String,
    },
}

/// Binding that stays imported from the source module in matching files
#[derive(Debug, Clone, Deserialize)]
pub struct KeepInSource {
    pub binding: String,
    pub paths: Vec<String>,
}

pub enum BuiltRule {
    Rule(Rule),
    Inserter(ImportInserter),
}

impl RuleSpec {
    fn path_filter(&self) -> PathFilter {
        PathFilter {
            only: self.only_paths.clone(),
            except: self.except_paths.clone(),
        }
    }

    /// The configured content condition, if any
    fn content_gate(&self) -> Result<Option<Matcher>> {
        match (&self.when_contains, &self.when_matches) {
            (Some(_), Some(_)) => Err(invalid(&self.name)(
                "set either when_contains or when_matches, not both".to_string(),
            )),
            (Some(text), None) => Ok(Some(Matcher::contains(text.clone()))),
            (None, Some(pattern)) => Ok(Some(Matcher::regex(pattern)?)),
            (None, None) => Ok(None),
        }
    }

    pub fn build(&self) -> Result<BuiltRule> {
        let name = self.name.as_str();
        let paths = self.path_filter();
        let gate = self.content_gate()?;

        let mut rule = match &self.action {
            ActionSpec::Literal { find, replace } => {
                let literal = LiteralReplace::new(find.clone(), replace.clone())?;
                Rule::new(name, literal).when(Matcher::contains(find.clone()))
            }
            ActionSpec::Regex {
                pattern,
                replace,
                per_line,
            } => {
                let scope = if *per_line { Scope::PerLine } else { Scope::Content };
                Rule::new(name, RegexReplace::new(pattern, replace.clone(), scope)?)
            }
            ActionSpec::Import {
                from,
                to,
                default,
                named,
                keep_in_source,
            } => {
                if default.is_none() && named.is_empty() {
                    return Err(invalid(name)("import rule lists no bindings".to_string()));
                }
                if from == to {
                    return Err(invalid(name)("source and target module are the same".to_string()));
                }

                let mut routes: Vec<BindingRoute> = default
                    .iter()
                    .map(BindingRoute::default_export)
                    .chain(named.iter().map(BindingRoute::named))
                    .collect();

                for keep in keep_in_source {
                    let route = routes
                        .iter_mut()
                        .find(|route| route.name == keep.binding)
                        .ok_or_else(|| {
                            invalid(name)(format!(
                                "keep_in_source names unknown binding '{}'",
                                keep.binding
                            ))
                        })?;
                    route.keep_in_source = Some(PathFilter::only(keep.paths.clone()));
                }

                Rule::new(name, ImportRewriter::new(from.clone(), to.clone(), routes))
                    .when(Matcher::contains(from.clone()))
            }
            ActionSpec::Insert {
                symbol,
                module,
                trigger,
            } => {
                let trigger = Matcher::contains(trigger.clone());
                let mut inserter =
                    ImportInserter::new(name, symbol.clone(), module.clone(), trigger)
                        .with_paths(paths);
                if let Some(gate) = gate {
                    inserter = inserter.when(gate);
                }
                inserter.enabled = self.enabled;
                return Ok(BuiltRule::Inserter(inserter));
            }
        };

        if let Some(gate) = gate {
            rule = rule.when(gate);
        }
        rule.enabled = self.enabled;
        Ok(BuiltRule::Rule(rule.with_paths(paths)))
    }
}
