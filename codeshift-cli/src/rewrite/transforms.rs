use regex::Regex;
use std::path::Path;

use super::matcher::{contains_word, is_identifier, replace_word, Matcher};
use super::Transform;
use crate::core::{CodeshiftError, Result};

/// Whether a regex sees the whole buffer or one line at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Content,
    PerLine,
}

fn map_lines(content: &str, f: impl FnMut(&str) -> String) -> String {
    content.split('\n').map(f).collect::<Vec<_>>().join("\n")
}

/// Literal find/replace pair. Identifier-shaped find text only matches whole
/// identifiers, so `mixinYak` leaves `mixinYakYak` and `mixinYakFocus` alone;
/// any other find text matches anywhere.
#[derive(Debug, Clone)]
struct Literal {
    find: String,
    replace: String,
    whole_word: bool,
}

impl Literal {
    fn new(find: String, replace: String) -> Result<Self> {
        let invalid = |reason: String| CodeshiftError::InvalidReplacement {
            find: find.clone(),
            reason,
        };

        if find.is_empty() {
            return Err(invalid("find text is empty".to_string()));
        }

        let whole_word = is_identifier(&find);
        // A whole-identifier rename can only match again if the replacement
        // itself contains the identifier. Substring matches can also meet
        // across a replacement boundary, which this does not catch.
        let rematches = if whole_word {
            contains_word(&replace, &find)
        } else {
            replace.contains(find.as_str())
        };
        if rematches {
            return Err(invalid(format!(
                "replacement {:?} contains it, so a second run would rewrite it again",
                replace
            )));
        }

        Ok(Self {
            find,
            replace,
            whole_word,
        })
    }

    fn apply(&self, text: &str) -> String {
        if self.whole_word {
            replace_word(text, &self.find, &self.replace)
        } else {
            text.replace(&self.find, &self.replace)
        }
    }
}

/// Replace every occurrence of a literal string
#[derive(Debug, Clone)]
pub struct LiteralReplace {
    literal: Literal,
}

impl LiteralReplace {
    pub fn new(find: impl Into<String>, replace: impl Into<String>) -> Result<Self> {
        Ok(Self {
            literal: Literal::new(find.into(), replace.into())?,
        })
    }
}

impl Transform for LiteralReplace {
    fn apply(&self, _path: &Path, content: &str) -> String {
        self.literal.apply(content)
    }

    fn describe(&self) -> String {
        format!("replace {:?} with {:?}", self.literal.find, self.literal.replace)
    }
}

/// Replace a literal string, but only on lines the filter accepts
#[derive(Debug, Clone)]
pub struct LineLiteralReplace {
    lines: Matcher,
    literal: Literal,
}

impl LineLiteralReplace {
    pub fn new(
        lines: Matcher,
        find: impl Into<String>,
        replace: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            lines,
            literal: Literal::new(find.into(), replace.into())?,
        })
    }
}

impl Transform for LineLiteralReplace {
    fn apply(&self, _path: &Path, content: &str) -> String {
        map_lines(content, |line| {
            if self.lines.is_match(line) {
                self.literal.apply(line)
            } else {
                line.to_string()
            }
        })
    }

    fn describe(&self) -> String {
        format!(
            "replace {:?} with {:?} on lines that {}",
            self.literal.find,
            self.literal.replace,
            self.lines.describe()
        )
    }
}

/// Regex replacement; `replace` may use capture groups (`$1`, `${name}`)
#[derive(Debug, Clone)]
pub struct RegexReplace {
    pattern: Regex,
    replace: String,
    scope: Scope,
}

impl RegexReplace {
    pub fn new(pattern: &str, replace: impl Into<String>, scope: Scope) -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            replace: replace.into(),
            scope,
        })
    }
}

impl Transform for RegexReplace {
    fn apply(&self, _path: &Path, content: &str) -> String {
        match self.scope {
            Scope::Content => self.pattern.replace_all(content, self.replace.as_str()).into_owned(),
            Scope::PerLine => map_lines(content, |line| {
                self.pattern.replace_all(line, self.replace.as_str()).into_owned()
            }),
        }
    }

    fn describe(&self) -> String {
        let scope = match self.scope {
            Scope::Content => "",
            Scope::PerLine => " per line",
        };
        format!("replace /{}/ with {:?}{}", self.pattern.as_str(), self.replace, scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path() -> &'static Path {
        Path::new("/repo/src/a.ts")
    }

    #[test]
    fn test_literal_replace() {
        let rule = LiteralReplace::new("visuallyHiddenMixinYak", "visuallyHiddenMixin").unwrap();
        let once = rule.apply(path(), "${visuallyHiddenMixinYak}; ${visuallyHiddenMixinYak}");

        assert_eq!(once, "${visuallyHiddenMixin}; ${visuallyHiddenMixin}");
        assert_eq!(rule.apply(path(), &once), once);
    }

    #[test]
    fn test_literal_identifier_matches_whole_words_only() {
        let rule = LiteralReplace::new("visuallyHiddenMixinYak", "visuallyHiddenMixin").unwrap();
        let content = "${visuallyHiddenMixinYakYak};\nconst b = visuallyHiddenMixinYakFocusable;";

        assert_eq!(rule.apply(path(), content), content);

        // Growing an identifier is fine when the result is a different word
        let rule = LiteralReplace::new("StyledSvg", "StyledSvgDeprecated").unwrap();
        let once = rule.apply(path(), "${StyledSvg} ${StyledSvgDeprecated}");
        assert_eq!(once, "${StyledSvgDeprecated} ${StyledSvgDeprecated}");
        assert_eq!(rule.apply(path(), &once), once);
    }

    #[test]
    fn test_literal_rejects_replacement_that_rematches() {
        assert!(matches!(
            LiteralReplace::new("theme", "theme.light"),
            Err(CodeshiftError::InvalidReplacement { .. })
        ));
        assert!(LiteralReplace::new("Svg\"", "SvgDeprecated Svg\"").is_err());
        assert!(LiteralReplace::new("", "x").is_err());
    }

    #[test]
    fn test_line_literal_replace() {
        let rule = LineLiteralReplace::new(
            Matcher::contains(r#"from "@blocks/icons""#),
            r#"StyledSvg""#,
            r#"StyledSvgDeprecated""#,
        )
        .unwrap();
        let content = "import \"StyledSvg\"; import { A } from \"@blocks/icons\";\nconst s = \"StyledSvg\";";

        assert_eq!(
            rule.apply(path(), content),
            "import \"StyledSvgDeprecated\"; import { A } from \"@blocks/icons\";\nconst s = \"StyledSvg\";"
        );
    }

    #[test]
    fn test_regex_scopes() {
        let content = "const a = b\n  as unknown as StaticCSSProp;\nconst c = d as unknown as StaticCSSProp;";

        let per_line =
            RegexReplace::new(r"\s+as\s+unknown\s+as\s+StaticCSSProp", "", Scope::PerLine).unwrap();
        assert_eq!(
            per_line.apply(path(), content),
            "const a = b\n;\nconst c = d;"
        );

        let whole =
            RegexReplace::new(r"\s+as\s+unknown\s+as\s+StaticCSSProp", "", Scope::Content).unwrap();
        assert_eq!(whole.apply(path(), content), "const a = b;\nconst c = d;");
    }

    #[test]
    fn test_regex_capture_groups() {
        let rule = RegexReplace::new(
            r"\$\{StyledSvg\}\s*([{,])",
            "$${StyledSvgDeprecated}$1",
            Scope::Content,
        )
        .unwrap();
        let once = rule.apply(path(), "  ${StyledSvg} {\n  ${StyledSvg},\n  ${StyledSvg};");

        assert_eq!(once, "  ${StyledSvgDeprecated}{\n  ${StyledSvgDeprecated},\n  ${StyledSvg};");
        assert_eq!(rule.apply(path(), &once), once);
    }
}
