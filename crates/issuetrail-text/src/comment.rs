//! Numbered comment blocks for the report

use std::sync::Arc;

use crate::{KeywordMatcher, Normalizer};

/// Normalizes and redacts comment bodies, then numbers them
#[derive(Debug, Clone)]
pub struct CommentFormatter {
    normalizer: Normalizer,
    keywords: Arc<KeywordMatcher>,
}

impl CommentFormatter {
    pub fn new(normalizer: Normalizer, keywords: Arc<KeywordMatcher>) -> Self {
        Self {
            normalizer,
            keywords,
        }
    }

    pub fn keywords(&self) -> &KeywordMatcher {
        &self.keywords
    }

    /// Format one comment; comments without a body become an empty string
    pub fn format_comment(&self, body: Option<&str>, index: usize) -> String {
        let Some(body) = body.filter(|b| !b.is_empty()) else {
            return String::new();
        };

        let body = self.normalizer.normalize(body);
        let body = self.keywords.redact(&body);

        format!("** Comment {} **\n{}\n", index + 1, body)
    }

    /// Format every comment in the order given and join them with newlines
    pub fn format_comments<'a, I>(&self, bodies: I) -> String
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        bodies
            .into_iter()
            .enumerate()
            .map(|(index, body)| self.format_comment(body, index))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for CommentFormatter {
    fn default() -> Self {
        Self::new(Normalizer::default(), Arc::new(KeywordMatcher::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_relevant_comment() {
        let formatter = CommentFormatter::default();
        assert_eq!(
            formatter.format_comment(Some("{color:red}Set log level to DEBUG{color}"), 0),
            "** Comment 1 **\nSet log level to DEBUG\n"
        );
    }

    #[test]
    fn test_format_excluded_comment() {
        let formatter = CommentFormatter::default();
        assert_eq!(
            formatter.format_comment(Some("Looks good to me"), 2),
            "** Comment 3 **\n[Comment excluded]\n"
        );
    }

    #[test]
    fn test_missing_body_is_empty() {
        let formatter = CommentFormatter::default();
        assert_eq!(formatter.format_comment(None, 0), "");
        assert_eq!(formatter.format_comment(Some(""), 0), "");
    }

    #[test]
    fn test_format_comments_keeps_order() {
        let formatter = CommentFormatter::default();
        let joined = formatter.format_comments([Some("trace on"), None, Some("+1")]);
        assert_eq!(
            joined,
            "** Comment 1 **\ntrace on\n\n\n** Comment 3 **\n[Comment excluded]\n"
        );
    }

    #[test]
    fn test_no_comments() {
        let formatter = CommentFormatter::default();
        assert_eq!(formatter.format_comments(Vec::<Option<&str>>::new()), "");
    }
}
