use std::fs;
use std::path::Path;

use codeshift::core::Settings;
use codeshift::{FileDiscovery, FileProcessor, GlobWalker, RuleSet, WriteMode};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn read(root: &Path, rel: &str) -> String {
    fs::read_to_string(root.join(rel)).unwrap()
}

fn migrate(root: &Path, mode: WriteMode) -> codeshift::RunReport {
    let settings = Settings::default();
    let rules = RuleSet::from_settings(&settings).unwrap();
    let files = GlobWalker::from_settings(&settings).discover(root).unwrap();
    FileProcessor::new(&rules, root.canonicalize().unwrap(), mode).run(&files)
}

const BUTTON: &str = r#"import { styled, css } from "next-yak";
import { visuallyHiddenMixinYak } from "@blocks/theme";

export const Label = styled.span`
  ${visuallyHiddenMixinYak};
`;
"#;

const LINK: &str = r#"import styled from "styled-components";
import {
  Icon,
  StyledSvg,
} from "@blocks/icons";

export const Link = styled.a`
  ${StyledSvg} {
    fill: currentColor;
  }
`;
"#;

#[test]
fn test_migrates_tree() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "src/Button.tsx", BUTTON);
    write(root, "src/Link.tsx", LINK);
    write(root, "src/plain.ts", "export const answer = 42;\n");

    let report = migrate(root, WriteMode::Apply);

    assert_eq!(report.files_scanned, 3);
    assert_eq!(report.files_modified.len(), 2);
    assert!(report.is_success());

    assert_eq!(
        read(root, "src/Button.tsx"),
        r#"import styled, { css } from "styled-components";
import { visuallyHiddenMixin } from "@blocks/theme";

export const Label = styled.span`
  ${visuallyHiddenMixin};
`;
"#
    );

    assert_eq!(
        read(root, "src/Link.tsx"),
        r#"import styled from "styled-components";
import {
  Icon,
  StyledSvg,
} from "@blocks/icons";
import { StyledSvgDeprecated } from "@blocks/icons";

export const Link = styled.a`
  ${StyledSvgDeprecated}{
    fill: currentColor;
  }
`;
"#
    );

    assert_eq!(read(root, "src/plain.ts"), "export const answer = 42;\n");
}

#[test]
fn test_second_run_is_a_no_op() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "src/Button.tsx", BUTTON);
    write(root, "src/Link.tsx", LINK);

    migrate(root, WriteMode::Apply);
    let after_first = (read(root, "src/Button.tsx"), read(root, "src/Link.tsx"));

    let report = migrate(root, WriteMode::Apply);

    assert!(report.files_modified.is_empty());
    assert_eq!(
        (read(root, "src/Button.tsx"), read(root, "src/Link.tsx")),
        after_first
    );
}

#[test]
fn test_excluded_files_are_untouched() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "node_modules/lib/index.js", BUTTON);
    write(root, "dist/Button.js", BUTTON);
    write(root, "src/Button.test.tsx", BUTTON);
    write(root, "scripts/back-to-sc.js", BUTTON);

    let report = migrate(root, WriteMode::Apply);

    assert_eq!(report.files_scanned, 0);
    for rel in [
        "node_modules/lib/index.js",
        "dist/Button.js",
        "src/Button.test.tsx",
        "scripts/back-to-sc.js",
    ] {
        assert_eq!(read(root, rel), BUTTON, "{}", rel);
    }
}

#[test]
fn test_dry_run_leaves_files_alone() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "src/Button.tsx", BUTTON);

    let report = migrate(root, WriteMode::DryRun);

    assert_eq!(report.files_modified.len(), 1);
    assert_eq!(report.previews.len(), 1);
    assert_eq!(read(root, "src/Button.tsx"), BUTTON);
}

#[test]
fn test_project_config_adds_and_disables_rules() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(
        root,
        "codeshift.toml",
        r#"
disabled_rules = ["rename-visually-hidden-mixin"]

[[rules]]
name = "emotion-css"
[rules.action]
kind = "import"
from = "@emotion/react"
to = "styled-components"
named = ["css", "keyframes"]
"#,
    );
    write(
        root,
        "src/Anim.ts",
        "import { keyframes, css } from \"@emotion/react\";\nconst a = visuallyHiddenMixinYak;\n",
    );

    let settings = Settings::load(root, None).unwrap();
    let rules = RuleSet::from_settings(&settings).unwrap();
    let files = GlobWalker::from_settings(&settings).discover(root).unwrap();
    let report =
        FileProcessor::new(&rules, root.canonicalize().unwrap(), WriteMode::Apply).run(&files);

    assert_eq!(report.rule_hits.get("emotion-css"), Some(&1));
    assert_eq!(
        read(root, "src/Anim.ts"),
        "import { keyframes, css } from \"styled-components\";\nconst a = visuallyHiddenMixinYak;\n"
    );
}
