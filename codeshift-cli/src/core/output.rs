use anyhow::Result;
use serde::Serialize;

use crate::preview::generate_preview;
use crate::processor::{RunReport, WriteMode};
use crate::rewrite::registry::{RuleSetSummary, Stage};

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Markdown,
}

pub struct OutputWriter {
    format: OutputFormat,
}

impl OutputWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn write_report(&self, report: &RunReport) -> Result<()> {
        print!("{}", self.render_report(report)?);
        Ok(())
    }

    pub fn render_report(&self, report: &RunReport) -> Result<String> {
        let mut out = String::new();
        let dry_run = report.mode == WriteMode::DryRun;

        match self.format {
            OutputFormat::Json => {
                out.push_str(&serde_json::to_string_pretty(report)?);
                out.push('\n');
            }
            OutputFormat::Text => {
                if dry_run && !report.previews.is_empty() {
                    out.push_str(&generate_preview(&report.previews));
                    out.push('\n');
                }

                out.push_str(if dry_run {
                    "✓ Dry run complete, no files written\n"
                } else {
                    "✓ Migration complete!\n"
                });
                out.push_str(&format!("  Files scanned: {}\n", report.files_scanned));
                out.push_str(&format!(
                    "  Files {}: {}\n",
                    if dry_run { "to modify" } else { "modified" },
                    report.files_modified.len()
                ));

                if !report.rule_hits.is_empty() {
                    out.push_str("\nRules applied:\n");
                    for (rule, count) in &report.rule_hits {
                        out.push_str(&format!(
                            "  • {} ({} file{})\n",
                            rule,
                            count,
                            if *count == 1 { "" } else { "s" }
                        ));
                    }
                }

                if !dry_run && !report.files_modified.is_empty() {
                    out.push_str("\nModified files:\n");
                    for file in &report.files_modified {
                        out.push_str(&format!("  • {}\n", file.display()));
                    }
                }

                if !report.errors.is_empty() {
                    out.push_str("\nErrors:\n");
                    for error in &report.errors {
                        out.push_str(&format!("  ⚠️  {}\n", error));
                    }
                }
            }
            OutputFormat::Markdown => {
                out.push_str(if dry_run {
                    "# Migration Preview\n\n"
                } else {
                    "# Migration Report\n\n"
                });
                out.push_str("| Metric | Value |\n");
                out.push_str("|--------|-------|\n");
                out.push_str(&format!("| Files scanned | {} |\n", report.files_scanned));
                out.push_str(&format!("| Files modified | {} |\n", report.files_modified.len()));
                out.push_str(&format!("| Errors | {} |\n", report.errors.len()));

                if !report.rule_hits.is_empty() {
                    out.push_str("\n## Rules\n\n");
                    for (rule, count) in &report.rule_hits {
                        out.push_str(&format!("- **{}**: {} files\n", rule, count));
                    }
                }

                if !report.files_modified.is_empty() {
                    out.push_str("\n## Files\n\n");
                    for file in &report.files_modified {
                        out.push_str(&format!("- `{}`\n", file.display()));
                    }
                }

                for preview in &report.previews {
                    out.push_str(&format!("\n```diff\n{}```\n", preview.format_diff()));
                }
            }
        }

        Ok(out)
    }

    pub fn write_rules(&self, summary: &RuleSetSummary) -> Result<()> {
        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(summary)?);
            }
            OutputFormat::Text => {
                println!("Rule set {} (version {})", summary.name, summary.version);
                for (i, rule) in summary.rules.iter().enumerate() {
                    let stage = match rule.stage {
                        Stage::Rule => "rule",
                        Stage::Insert => "insert",
                    };
                    println!(
                        "  {:>2}. [{}] {} ({}){}",
                        i + 1,
                        stage,
                        rule.name,
                        rule.paths,
                        if rule.enabled { "" } else { " [disabled]" }
                    );
                    println!("      when {}: {}", rule.condition, rule.action);
                }
            }
            OutputFormat::Markdown => {
                println!("# Rule set `{}` v{}\n", summary.name, summary.version);
                println!("| # | Rule | Stage | Enabled | Paths | Action |");
                println!("|---|------|-------|---------|-------|--------|");
                for (i, rule) in summary.rules.iter().enumerate() {
                    println!(
                        "| {} | `{}` | {:?} | {} | {} | {} |",
                        i + 1,
                        rule.name,
                        rule.stage,
                        rule.enabled,
                        rule.paths,
                        rule.action
                    );
                }
            }
        }
        Ok(())
    }

    pub fn write_error(&self, error: &str) -> Result<()> {
        match self.format {
            OutputFormat::Json => {
                #[derive(Serialize)]
                struct ErrorResponse {
                    error: String,
                }
                println!(
                    "{}",
                    serde_json::to_string_pretty(&ErrorResponse {
                        error: error.to_string()
                    })?
                );
            }
            OutputFormat::Text | OutputFormat::Markdown => {
                eprintln!("Error: {}", error);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn report() -> RunReport {
        let mut report = RunReport::new(WriteMode::Apply);
        report.files_scanned = 3;
        report.files_modified.push(PathBuf::from("src/a.tsx"));
        report.rule_hits.insert("next-yak-imports".to_string(), 1);
        report.add_error("Failed to read src/b.tsx: denied".to_string());
        report
    }

    #[test]
    fn test_text_report() {
        let text = OutputWriter::new(OutputFormat::Text).render_report(&report()).unwrap();

        assert!(text.contains("Files scanned: 3"));
        assert!(text.contains("Files modified: 1"));
        assert!(text.contains("next-yak-imports (1 file)"));
        assert!(text.contains("src/a.tsx"));
        assert!(text.contains("Failed to read src/b.tsx"));
    }

    #[test]
    fn test_json_report() {
        let json = OutputWriter::new(OutputFormat::Json).render_report(&report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["mode"], "apply");
        assert_eq!(value["files_scanned"], 3);
        assert_eq!(value["rule_hits"]["next-yak-imports"], 1);
        assert!(value.get("previews").is_none());
    }
}
