use regex::Regex;
use std::path::Path;

/// Decides whether a rule applies to a piece of content
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Always applies
    Always,

    /// Applies when the content contains the literal text
    Contains(String),

    /// Applies when the regex matches somewhere in the content
    Regex(Regex),
}

impl Matcher {
    pub fn contains(text: impl Into<String>) -> Self {
        Matcher::Contains(text.into())
    }

    pub fn regex(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Matcher::Regex(Regex::new(pattern)?))
    }

    pub fn is_match(&self, content: &str) -> bool {
        match self {
            Matcher::Always => true,
            Matcher::Contains(text) => content.contains(text.as_str()),
            Matcher::Regex(regex) => regex.is_match(content),
        }
    }

    /// Short description used by rule listings
    pub fn describe(&self) -> String {
        match self {
            Matcher::Always => "always".to_string(),
            Matcher::Contains(text) => format!("contains {:?}", text),
            Matcher::Regex(regex) => format!("matches /{}/", regex.as_str()),
        }
    }
}

/// Path-based applicability: substring checks against the file path,
/// with `/` separators on every platform.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathFilter {
    /// If non-empty, the path must contain at least one of these
    pub only: Vec<String>,

    /// The path must contain none of these
    pub except: Vec<String>,
}

impl PathFilter {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn only<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            only: parts.into_iter().map(Into::into).collect(),
            except: Vec::new(),
        }
    }

    pub fn except<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            only: Vec::new(),
            except: parts.into_iter().map(Into::into).collect(),
        }
    }

    pub fn matches(&self, path: &Path) -> bool {
        let path = normalize(path);

        if !self.only.is_empty() && !self.only.iter().any(|part| path.contains(part.as_str())) {
            return false;
        }

        !self.except.iter().any(|part| path.contains(part.as_str()))
    }

    pub fn is_any(&self) -> bool {
        self.only.is_empty() && self.except.is_empty()
    }
}

fn normalize(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

pub(crate) fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Non-empty and made only of identifier characters
pub(crate) fn is_identifier(text: &str) -> bool {
    !text.is_empty() && text.chars().all(is_ident_char)
}

/// Byte offsets where `word` occurs as a whole identifier
fn word_positions<'a>(haystack: &'a str, word: &'a str) -> impl Iterator<Item = usize> + 'a {
    haystack
        .match_indices(word)
        .map(|(pos, _)| pos)
        .filter(move |&pos| {
            let before = haystack[..pos].chars().next_back();
            let after = haystack[pos + word.len()..].chars().next();
            !before.is_some_and(is_ident_char) && !after.is_some_and(is_ident_char)
        })
}

/// Whole-identifier containment: `StyledSvg` does not occur in `StyledSvgDeprecated`.
pub(crate) fn contains_word(haystack: &str, word: &str) -> bool {
    !word.is_empty() && word_positions(haystack, word).next().is_some()
}

/// Replace whole-identifier occurrences of `word`, leaving identifiers that
/// merely contain it untouched
pub(crate) fn replace_word(haystack: &str, word: &str, replacement: &str) -> String {
    if word.is_empty() {
        return haystack.to_string();
    }

    let mut out = String::with_capacity(haystack.len());
    let mut last = 0;
    for pos in word_positions(haystack, word) {
        out.push_str(&haystack[last..pos]);
        out.push_str(replacement);
        last = pos + word.len();
    }
    out.push_str(&haystack[last..]);
    out
}
