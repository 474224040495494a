//! Logging/severity keyword matching

use anyhow::Result;
use regex::Regex;

/// Written in place of a comment that does not mention any keyword
pub const EXCLUDED_COMMENT: &str = "[Comment excluded]";

/// Terms that mark text as relevant. Matched as plain substrings, ignoring case;
/// leading and trailing spaces are significant (` log ` does not match `blog`).
pub const DEFAULT_KEYWORDS: &[&str] = &[
    " fine",
    "trace",
    "debug",
    "info",
    "warn",
    "warning",
    "error",
    "fatal",
    "logging",
    " log ",
    " logs ",
    " logger ",
    "log level",
    "severity level",
    "change level",
    "change severity",
    "slf4j",
    "log4j",
    "commons logging",
    "commons-logging",
    "logback",
    "noisy",
    "verbose",
    "spammy",
    "overload",
    "fail",
];

/// Case-insensitive OR-pattern over a keyword list
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    pattern: Option<Regex>,
}

impl KeywordMatcher {
    pub fn new<S: AsRef<str>>(keywords: &[S]) -> Result<Self> {
        let alternatives: Vec<String> = keywords
            .iter()
            .map(|k| k.as_ref())
            .filter(|k| !k.is_empty())
            .map(regex::escape)
            .collect();

        // An empty alternation would match everything
        if alternatives.is_empty() {
            return Ok(Self { pattern: None });
        }

        let pattern = Regex::new(&format!("(?i)(?:{})", alternatives.join("|")))?;
        Ok(Self {
            pattern: Some(pattern),
        })
    }

    /// Whether the text mentions any keyword
    pub fn is_relevant(&self, text: &str) -> bool {
        self.pattern.as_ref().is_some_and(|p| p.is_match(text))
    }

    /// Keep relevant text whole, replace anything else with `[Comment excluded]`
    pub fn redact(&self, text: &str) -> String {
        if self.is_relevant(text) {
            text.to_string()
        } else {
            EXCLUDED_COMMENT.to_string()
        }
    }
}

impl Default for KeywordMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_KEYWORDS).unwrap_or(Self { pattern: None })
    }
}
