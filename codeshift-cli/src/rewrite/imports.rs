use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

use super::matcher::{contains_word, PathFilter};
use super::Transform;
use crate::core::{CodeshiftError, Result};

fn statement_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"^import\s*(?:(?P<default>[A-Za-z_$][\w$]*)\s*(?:,\s*)?)?(?:\{(?P<named>[^{}]*)\})?\s*from\s*["'](?P<source>[^"']+)["']\s*;?$"#,
        )
        .expect("Failed to compile import statement regex")
    })
}

fn binding_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<name>[A-Za-z_$][\w$]*)(?:\s+as\s+(?P<alias>[A-Za-z_$][\w$]*))?$")
            .expect("Failed to compile import binding regex")
    })
}

fn block_close_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\}\s*from\b").expect("Failed to compile block close regex"))
}

fn single_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(\bfrom\s*["']|^import\s*["'])"#)
            .expect("Failed to compile single-line import regex")
    })
}

/// One logical import statement, possibly spanning several physical lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpan {
    /// First line index (0-based)
    pub start: usize,

    /// Last line index, inclusive
    pub end: usize,

    /// Trimmed lines joined with single spaces
    pub text: String,
}

impl ImportSpan {
    fn new(start: usize, end: usize, parts: &[&str]) -> Self {
        Self {
            start,
            end,
            text: parts.join(" "),
        }
    }

    /// Whether this statement imports from `module`
    pub fn mentions_module(&self, module: &str) -> bool {
        mentions_module(&self.text, module)
    }
}

/// Result of grouping a file's lines into import statements.
///
/// A block opens on an `import` line with `{` but no `}`, and closes on the
/// first following line containing `} from`. Both the import rewriter and
/// the import inserter read from this scan, so they always agree on what
/// counts as an import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportScan {
    pub statements: Vec<ImportSpan>,

    /// Opening line of a block that never closed
    pub unterminated: Option<usize>,
}

impl ImportScan {
    pub fn of(lines: &[&str]) -> Self {
        let mut scan = ImportScan::default();
        let mut open: Option<(usize, Vec<&str>)> = None;

        for (idx, raw) in lines.iter().enumerate() {
            let line = raw.trim();

            if let Some((start, mut parts)) = open.take() {
                parts.push(line);
                if block_close_regex().is_match(line) {
                    scan.statements.push(ImportSpan::new(start, idx, &parts));
                } else {
                    open = Some((start, parts));
                }
                continue;
            }

            if !(line.starts_with("import ") || line.starts_with("import{")) {
                continue;
            }

            if line.contains('{') && !line.contains('}') {
                open = Some((idx, vec![line]));
            } else if single_line_regex().is_match(line) {
                scan.statements.push(ImportSpan::new(idx, idx, &[line]));
            }
        }

        scan.unterminated = open.map(|(start, _)| start);
        scan
    }

    /// Line index after which a new import belongs: the last line of the
    /// last top-level import statement.
    pub fn anchor(&self) -> Option<usize> {
        self.statements.last().map(|span| span.end)
    }

    /// Whether `symbol` is already imported from `module`, in a single-line
    /// statement or anywhere inside a multi-line block.
    pub fn imports(&self, symbol: &str, module: &str) -> bool {
        self.statements
            .iter()
            .any(|span| span.mentions_module(module) && contains_word(&span.text, symbol))
    }
}

fn mentions_module(text: &str, module: &str) -> bool {
    text.contains(&format!("\"{}\"", module)) || text.contains(&format!("'{}'", module))
}

/// A single imported name, with its local alias if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub name: String,
    pub alias: Option<String>,
}

impl Binding {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
        }
    }

    fn parse(text: &str) -> Option<Self> {
        let caps = binding_regex().captures(text)?;
        let name = caps["name"].to_string();
        let alias = caps
            .name("alias")
            .map(|m| m.as_str().to_string())
            .filter(|alias| *alias != name);
        Some(Self { name, alias })
    }

    /// The identifier this binding introduces in the importing file
    pub fn local(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    fn render_named(&self) -> String {
        match &self.alias {
            Some(alias) => format!("{} as {}", self.name, alias),
            None => self.name.clone(),
        }
    }
}

/// Parsed `import <default>?, {<named>}? from "<source>"` statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportStatement {
    pub source: String,
    pub default: Option<Binding>,
    pub named: Vec<Binding>,
}

impl ImportStatement {
    /// Parse a statement's joined text. Returns `None` for any shape outside
    /// the default/named grammar (namespace imports, `import type`, trailing
    /// comments, inline `type` modifiers).
    pub fn parse(text: &str) -> Option<Self> {
        let caps = statement_regex().captures(text.trim())?;

        let default = match caps.name("default") {
            Some(m) if m.as_str() == "type" => return None,
            Some(m) => Some(Binding::new(m.as_str())),
            None => None,
        };

        let named = match caps.name("named") {
            Some(m) => m
                .as_str()
                .split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(Binding::parse)
                .collect::<Option<Vec<_>>>()?,
            None => Vec::new(),
        };

        if default.is_none() && named.is_empty() {
            return None;
        }

        Some(Self {
            source: caps["source"].to_string(),
            default,
            named,
        })
    }

    pub fn render(&self) -> String {
        let named = self
            .named
            .iter()
            .map(Binding::render_named)
            .collect::<Vec<_>>()
            .join(", ");

        match (&self.default, named.is_empty()) {
            (Some(default), true) => {
                format!("import {} from \"{}\";", default.local(), self.source)
            }
            (Some(default), false) => format!(
                "import {}, {{ {} }} from \"{}\";",
                default.local(),
                named,
                self.source
            ),
            (None, _) => format!("import {{ {} }} from \"{}\";", named, self.source),
        }
    }

    fn bindings(&self) -> impl Iterator<Item = (&Binding, bool)> {
        self.default
            .iter()
            .map(|b| (b, true))
            .chain(self.named.iter().map(|b| (b, false)))
    }
}

/// How a binding is exported by the target module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Default,
    Named,
}

/// Where one imported name goes when its statement is rewritten
#[derive(Debug, Clone)]
pub struct BindingRoute {
    pub name: String,
    pub export: ExportKind,

    /// Exported name in the target module, if different
    pub rename: Option<String>,

    /// Files where this binding stays imported from the source module
    pub keep_in_source: Option<PathFilter>,
}

impl BindingRoute {
    pub fn default_export(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            export: ExportKind::Default,
            rename: None,
            keep_in_source: None,
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            export: ExportKind::Named,
            rename: None,
            keep_in_source: None,
        }
    }

    pub fn renamed(mut self, target_name: impl Into<String>) -> Self {
        self.rename = Some(target_name.into());
        self
    }

    pub fn kept_in_source_for(mut self, paths: PathFilter) -> Self {
        self.keep_in_source = Some(paths);
        self
    }

    fn keeps(&self, path: &Path) -> bool {
        self.keep_in_source.as_ref().is_some_and(|filter| filter.matches(path))
    }
}

/// Rewrites imports of one module into imports of another
#[derive(Debug, Clone)]
pub struct ImportRewriter {
    pub from: String,
    pub to: String,
    pub routes: Vec<BindingRoute>,
}

impl ImportRewriter {
    pub fn new(from: impl Into<String>, to: impl Into<String>, routes: Vec<BindingRoute>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            routes,
        }
    }

    fn route(&self, name: &str) -> Option<&BindingRoute> {
        self.routes.iter().find(|route| route.name == name)
    }

    /// Rewrite one parsed statement. `Ok(None)` means nothing moves;
    /// `Err` explains why the statement was left alone.
    pub fn rewrite(&self, path: &Path, stmt: &ImportStatement) -> Result<Option<Vec<String>>> {
        let mut kept = ImportStatement {
            source: stmt.source.clone(),
            default: None,
            named: Vec::new(),
        };
        let mut moved = ImportStatement {
            source: self.to.clone(),
            default: None,
            named: Vec::new(),
        };
        let mut moved_any = false;

        for (binding, is_default) in stmt.bindings() {
            let route = self
                .route(&binding.name)
                .ok_or_else(|| {
                    CodeshiftError::UnsupportedImport(format!(
                        "unexpected binding '{}'",
                        binding.name
                    ))
                })?;

            if route.keeps(path) {
                if is_default {
                    kept.default = Some(binding.clone());
                } else {
                    kept.named.push(binding.clone());
                }
                continue;
            }

            moved_any = true;
            match route.export {
                ExportKind::Default => {
                    if moved.default.is_some() {
                        return Err(CodeshiftError::UnsupportedImport(
                            "more than one default binding".to_string(),
                        ));
                    }
                    moved.default = Some(Binding::new(binding.local()));
                }
                ExportKind::Named => {
                    let name = route.rename.clone().unwrap_or_else(|| binding.name.clone());
                    let alias = Some(binding.local().to_string()).filter(|local| *local != name);
                    moved.named.push(Binding { name, alias });
                }
            }
        }

        if !moved_any {
            return Ok(None);
        }

        let mut lines = Vec::new();
        if kept.default.is_some() || !kept.named.is_empty() {
            lines.push(kept.render());
        }
        lines.push(moved.render());
        Ok(Some(lines))
    }
}

impl Transform for ImportRewriter {
    fn apply(&self, path: &Path, content: &str) -> String {
        let lines: Vec<&str> = content.split('\n').collect();
        let scan = ImportScan::of(&lines);
        let mut replacements: Vec<(usize, usize, Vec<String>)> = Vec::new();

        for span in scan.statements.iter().filter(|span| span.mentions_module(&self.from)) {
            let outcome = match ImportStatement::parse(&span.text) {
                Some(stmt) if stmt.source == self.from => self.rewrite(path, &stmt),
                _ => Err(CodeshiftError::UnsupportedImport(
                    "statement shape not recognized".to_string(),
                )),
            };

            match outcome {
                Ok(Some(new_lines)) => {
                    let first = lines[span.start];
                    let indent = &first[..first.len() - first.trim_start().len()];
                    let eol = if lines[span.end].ends_with('\r') { "\r" } else { "" };
                    let new_lines = new_lines
                        .into_iter()
                        .map(|line| format!("{}{}{}", indent, line, eol))
                        .collect();
                    replacements.push((span.start, span.end, new_lines));
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!("{}:{}: {}: {}", path.display(), span.start + 1, e, span.text);
                }
            }
        }

        let inside_statement =
            |idx: usize| scan.statements.iter().any(|span| span.start <= idx && idx <= span.end);
        for (idx, line) in lines.iter().enumerate() {
            if !inside_statement(idx)
                && line.contains("from")
                && mentions_module(line, &self.from)
            {
                tracing::warn!(
                    "{}:{}: reference to \"{}\" is not an import statement this rule understands",
                    path.display(),
                    idx + 1,
                    self.from
                );
            }
        }

        if replacements.is_empty() {
            return content.to_string();
        }

        let mut output: Vec<String> = Vec::with_capacity(lines.len());
        let mut pending = replacements.into_iter().peekable();
        let mut idx = 0;
        while idx < lines.len() {
            match pending.next_if(|(start, _, _)| *start == idx) {
                Some((_, end, new_lines)) => {
                    output.extend(new_lines);
                    idx = end + 1;
                }
                None => {
                    output.push(lines[idx].to_string());
                    idx += 1;
                }
            }
        }

        output.join("\n")
    }

    fn describe(&self) -> String {
        let names: Vec<&str> = self.routes.iter().map(|r| r.name.as_str()).collect();
        format!(
            "rewrite imports of {{{}}} from \"{}\" to \"{}\"",
            names.join(", "),
            self.from,
            self.to
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn yak_rewriter() -> ImportRewriter {
        ImportRewriter::new(
            "next-yak",
            "styled-components",
            vec![BindingRoute::default_export("styled"), BindingRoute::named("css")],
        )
    }

    fn rewrite_line(line: &str) -> String {
        yak_rewriter().apply(Path::new("/repo/src/Button.tsx"), line)
    }

    #[test]
    fn test_styled_only() {
        assert_eq!(
            rewrite_line(r#"import { styled } from "next-yak";"#),
            r#"import styled from "styled-components";"#
        );
    }

    #[test]
    fn test_styled_and_css() {
        assert_eq!(
            rewrite_line(r#"import { styled, css } from "next-yak";"#),
            r#"import styled, { css } from "styled-components";"#
        );
        assert_eq!(
            rewrite_line(r#"import { css, styled } from 'next-yak'"#),
            r#"import styled, { css } from "styled-components";"#
        );
    }

    #[test]
    fn test_css_only() {
        assert_eq!(
            rewrite_line(r#"import { css } from "next-yak";"#),
            r#"import { css } from "styled-components";"#
        );
    }

    #[test]
    fn test_default_style_source_import() {
        assert_eq!(
            rewrite_line(r#"import styled from "next-yak";"#),
            r#"import styled from "styled-components";"#
        );
    }

    #[test]
    fn test_alias_is_preserved() {
        assert_eq!(
            rewrite_line(r#"import { css as yakCss } from "next-yak";"#),
            r#"import { css as yakCss } from "styled-components";"#
        );
    }

    #[test]
    fn test_unknown_binding_left_unchanged() {
        let line = r#"import { styled, keyframes } from "next-yak";"#;
        assert_eq!(rewrite_line(line), line);
    }

    #[test]
    fn test_unrecognized_shape_left_unchanged() {
        let line = r#"import * as yak from "next-yak";"#;
        assert_eq!(rewrite_line(line), line);

        let line = r#"import type { YakTheme } from "next-yak";"#;
        assert_eq!(rewrite_line(line), line);
    }

    #[test]
    fn test_other_modules_untouched() {
        let content = "import React from \"react\";\nimport { css } from \"next-yak\";\n\nexport const a = css``;\n";
        let expected = "import React from \"react\";\nimport { css } from \"styled-components\";\n\nexport const a = css``;\n";
        assert_eq!(rewrite_line(content), expected);
    }

    #[test]
    fn test_multi_line_statement() {
        let content = "import {\n  styled,\n  css,\n} from \"next-yak\";\nconst x = 1;";
        assert_eq!(
            rewrite_line(content),
            "import styled, { css } from \"styled-components\";\nconst x = 1;"
        );
    }

    #[test]
    fn test_keep_in_source_splits_statement() {
        let rewriter = ImportRewriter::new(
            "next-yak",
            "styled-components",
            vec![
                BindingRoute::default_export("styled"),
                BindingRoute::named("css").kept_in_source_for(PathFilter::only(["blocks/theme"])),
            ],
        );
        let line = r#"import { styled, css } from "next-yak";"#;

        assert_eq!(
            rewriter.apply(Path::new("/repo/blocks/theme/index.ts"), line),
            "import { css } from \"next-yak\";\nimport styled from \"styled-components\";"
        );
        assert_eq!(
            rewriter.apply(Path::new("/repo/src/index.ts"), line),
            r#"import styled, { css } from "styled-components";"#
        );

        let kept_only = r#"import { css } from "next-yak";"#;
        assert_eq!(
            rewriter.apply(Path::new("/repo/blocks/theme/index.ts"), kept_only),
            kept_only
        );
    }

    #[test]
    fn test_renamed_binding_keeps_local_name() {
        let rewriter = ImportRewriter::new(
            "old-lib",
            "new-lib",
            vec![BindingRoute::named("makeStyles").renamed("createStyles")],
        );
        assert_eq!(
            rewriter.apply(Path::new("a.ts"), r#"import { makeStyles } from "old-lib";"#),
            r#"import { createStyles as makeStyles } from "new-lib";"#
        );
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let content = "import { styled, css } from \"next-yak\";\nimport { css as c } from 'next-yak';\n";
        let once = rewrite_line(content);
        assert_eq!(rewrite_line(&once), once);
    }

    #[test]
    fn test_indentation_and_crlf_preserved() {
        assert_eq!(
            rewrite_line("  import { css } from \"next-yak\";\r\nx\r\n"),
            "  import { css } from \"styled-components\";\r\nx\r\n"
        );
    }

    #[test]
    fn test_scan_single_and_multi_line() {
        let lines = vec![
            "import React from \"react\";",
            "import {",
            "  Icon,",
            "  StyledSvg,",
            "} from \"@blocks/icons\";",
            "import \"./global.css\";",
            "",
            "const a = 1;",
        ];
        let scan = ImportScan::of(&lines);

        assert_eq!(scan.statements.len(), 3);
        assert_eq!((scan.statements[1].start, scan.statements[1].end), (1, 4));
        assert_eq!(scan.anchor(), Some(5));
        assert!(scan.imports("StyledSvg", "@blocks/icons"));
        assert!(!scan.imports("StyledSvgDeprecated", "@blocks/icons"));
        assert!(!scan.imports("Icon", "react"));
        assert_eq!(scan.unterminated, None);
    }

    #[test]
    fn test_scan_unterminated_block() {
        let lines = vec!["import React from \"react\";", "import {", "  Icon,", "const a = 1;"];
        let scan = ImportScan::of(&lines);

        assert_eq!(scan.statements.len(), 1);
        assert_eq!(scan.unterminated, Some(1));
    }

    #[test]
    fn test_parse_statement() {
        let stmt = ImportStatement::parse(r#"import styled, { css, keyframes as kf } from "next-yak";"#).unwrap();
        assert_eq!(stmt.source, "next-yak");
        assert_eq!(stmt.default, Some(Binding::new("styled")));
        assert_eq!(
            stmt.named,
            vec![
                Binding::new("css"),
                Binding {
                    name: "keyframes".to_string(),
                    alias: Some("kf".to_string())
                }
            ]
        );
        assert!(ImportStatement::parse(r#"import "./side-effect";"#).is_none());
    }

    #[test]
    fn test_rewrite_reports_unsupported_bindings() {
        let path = Path::new("/repo/src/Button.tsx");
        let stmt = ImportStatement::parse(r#"import { css, keyframes } from "next-yak";"#).unwrap();

        match yak_rewriter().rewrite(path, &stmt) {
            Err(CodeshiftError::UnsupportedImport(reason)) => {
                assert_eq!(reason, "unexpected binding 'keyframes'")
            }
            other => panic!("unexpected result: {:?}", other),
        }

        let ok = ImportStatement::parse(r#"import { css } from "next-yak";"#).unwrap();
        assert_eq!(
            yak_rewriter().rewrite(path, &ok).unwrap(),
            Some(vec![r#"import { css } from "styled-components";"#.to_string()])
        );
    }
}
