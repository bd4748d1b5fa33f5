use serde::Serialize;
use similar::{ChangeTag, TextDiff};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Removed,
    Added,
}

/// A single changed line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewChange {
    /// Line number (1-indexed) in the original for removals, in the new
    /// content for additions
    pub line: usize,

    pub kind: ChangeKind,

    /// Line text without its line terminator
    pub text: String,
}

/// Preview of all changes in a single file
#[derive(Debug, Clone, Serialize)]
pub struct PreviewDiff {
    pub file_path: PathBuf,

    /// Rules that changed this file, in order
    pub rules: Vec<String>,

    pub num_changes: usize,

    pub changes: Vec<PreviewChange>,
}

impl PreviewDiff {
    pub fn between(file_path: PathBuf, rules: Vec<String>, original: &str, updated: &str) -> Self {
        let diff = TextDiff::from_lines(original, updated);
        let changes: Vec<PreviewChange> = diff
            .iter_all_changes()
            .filter_map(|change| {
                let (kind, index) = match change.tag() {
                    ChangeTag::Equal => return None,
                    ChangeTag::Delete => (ChangeKind::Removed, change.old_index()?),
                    ChangeTag::Insert => (ChangeKind::Added, change.new_index()?),
                };
                Some(PreviewChange {
                    line: index + 1,
                    kind,
                    text: change.value().trim_end_matches(['\n', '\r']).to_string(),
                })
            })
            .collect();

        Self {
            file_path,
            rules,
            num_changes: changes.len(),
            changes,
        }
    }

    /// Generate a human-readable diff output
    pub fn format_diff(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!("📝 {}\n", self.file_path.display()));
        output.push_str(&format!(
            "   {} changed line{} ({})\n\n",
            self.num_changes,
            if self.num_changes == 1 { "" } else { "s" },
            self.rules.join(", ")
        ));

        for change in &self.changes {
            let sign = match change.kind {
                ChangeKind::Removed => '-',
                ChangeKind::Added => '+',
            };
            output.push_str(&format!("  {:>4} {} {}\n", change.line, sign, change.text));
        }

        output
    }
}

/// Generate preview for all files
pub fn generate_preview(diffs: &[PreviewDiff]) -> String {
    let mut output = String::new();

    let total_files = diffs.len();
    let total_changes: usize = diffs.iter().map(|d| d.num_changes).sum();

    output.push_str("========================================\n");
    output.push_str("           PREVIEW CHANGES\n");
    output.push_str("========================================\n\n");
    output.push_str(&format!(
        "📊 {} file{}, {} changed line{}\n\n",
        total_files,
        if total_files == 1 { "" } else { "s" },
        total_changes,
        if total_changes == 1 { "" } else { "s" }
    ));

    for (i, diff) in diffs.iter().enumerate() {
        output.push_str(&diff.format_diff());
        if i < diffs.len() - 1 {
            output.push_str("\n----------------------------------------\n\n");
        }
    }

    output.push_str("\n========================================\n");
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_diff() {
        let diff = PreviewDiff::between(
            PathBuf::from("src/Button.tsx"),
            vec!["next-yak-imports".to_string()],
            "import { css } from \"next-yak\";\nconst a = 1;\n",
            "import { css } from \"styled-components\";\nconst a = 1;\n",
        );

        assert_eq!(diff.num_changes, 2);
        assert_eq!(
            diff.changes[0],
            PreviewChange {
                line: 1,
                kind: ChangeKind::Removed,
                text: "import { css } from \"next-yak\";".to_string(),
            }
        );
        assert_eq!(diff.changes[1].kind, ChangeKind::Added);

        let formatted = diff.format_diff();
        assert!(formatted.contains("src/Button.tsx"));
        assert!(formatted.contains("next-yak-imports"));
        assert!(formatted.contains("- import { css } from \"next-yak\";"));
        assert!(formatted.contains("+ import { css } from \"styled-components\";"));
    }

    #[test]
    fn test_generate_preview_totals() {
        let diff = PreviewDiff::between(PathBuf::from("a.ts"), Vec::new(), "a\n", "b\n");
        let output = generate_preview(&[diff]);

        assert!(output.contains("1 file, 2 changed lines"));
    }
}
