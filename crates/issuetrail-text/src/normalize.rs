//! Wiki markup normalizer

use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    static ref NO_FORMAT: Regex = Regex::new(r"\{noformat\}").unwrap();
    static ref COLOR: Regex = Regex::new(r"\{color(:[\w#]+)?\}|\{color\}").unwrap();
    static ref PANEL: Regex = Regex::new(r"\{panel.*\}|\{panel\}").unwrap();
    static ref MACRO: Regex = Regex::new(r"\{\w+:\w+\}").unwrap();
    static ref WIKI_LINK: Regex =
        Regex::new(r"\[[^\[\]|\n]*\|[^\[\]\n]*\]|\[[^\[\]\n]*\]").unwrap();
    static ref URL: Regex = Regex::new(
        r"https?://(?:[a-zA-Z]|[0-9]|[$-_@.&+]|[!*\\(),]|(?:%[0-9a-fA-F][0-9a-fA-F]))+"
    )
    .unwrap();
    static ref FILE_NAME: Regex = Regex::new(r"[\w\-/]+\.(java|txt)").unwrap();
    static ref FILE_INDICATOR: Regex = Regex::new(r"(?m)^\* \(edit\) \[file java\]\s*$").unwrap();
    static ref IMAGE: Regex = Regex::new(r"!.*?!").unwrap();
    static ref EMPTY_LINE: Regex = Regex::new(r"(?m)^\s*[\r\n]").unwrap();
    static ref PLACEHOLDER: Regex = Regex::new(r"^\[(?:link|file (?:java|txt))\]$").unwrap();
}

const LINK_PLACEHOLDER: &str = "[link]";

/// Strips wiki markup from comment bodies.
///
/// Rules run in a fixed order; later rules assume earlier ones already ran.
#[derive(Debug, Clone)]
pub struct Normalizer {
    drop_empty_lines: bool,
}

impl Normalizer {
    pub fn new(drop_empty_lines: bool) -> Self {
        Self { drop_empty_lines }
    }

    /// Removing one construct can expose another (`{col!x!or}`), so the chain
    /// is repeated until it stops changing. Every rule either deletes text or
    /// writes a placeholder no rule rewrites, so this terminates.
    pub fn normalize(&self, text: &str) -> String {
        let mut current = self.pass(text);
        loop {
            let next = self.pass(&current);
            if next == current {
                return current;
            }
            current = next;
        }
    }

    fn pass(&self, text: &str) -> String {
        let text = NO_FORMAT.replace_all(text, "");
        let text = COLOR.replace_all(&text, "");
        let text = PANEL.replace_all(&text, "");
        let text = MACRO.replace_all(&text, "");
        let text = WIKI_LINK.replace_all(&text, |caps: &Captures| {
            // Placeholders written by earlier passes look like links
            let matched = &caps[0];
            if PLACEHOLDER.is_match(matched) {
                matched.to_string()
            } else {
                String::new()
            }
        });
        let text = URL.replace_all(&text, LINK_PLACEHOLDER);
        let text = FILE_NAME.replace_all(&text, "[file ${1}]");
        let text = FILE_INDICATOR.replace_all(&text, "");
        let text = IMAGE.replace_all(&text, "");

        if self.drop_empty_lines {
            EMPTY_LINE.replace_all(&text, "").into_owned()
        } else {
            text.into_owned()
        }
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(text: &str) -> String {
        Normalizer::default().normalize(text)
    }

    #[test]
    fn test_color_spans() {
        assert_eq!(
            normalize("{color:red}Set log level to DEBUG{color}"),
            "Set log level to DEBUG"
        );
        assert_eq!(normalize("{color:#ff0000}x{color}"), "x");
    }

    #[test]
    fn test_noformat_panel_and_macro() {
        assert_eq!(normalize("{noformat}trace{noformat}"), "trace");
        assert_eq!(normalize("{panel:title=Logs}body"), "body");
        assert_eq!(normalize("{panel:title=Logs}body{panel}"), "");
        assert_eq!(normalize("{panel}body"), "body");
        assert_eq!(normalize("{align:right}text"), "text");
    }

    #[test]
    fn test_wiki_links_removed() {
        assert_eq!(normalize("see [the docs|http://x.org/a] now"), "see  now");
        assert_eq!(normalize("see [HDFS-1] now"), "see  now");
    }

    #[test]
    fn test_bare_url_replaced() {
        assert_eq!(
            normalize("logs at https://ci.example.org/job/42 failed"),
            "logs at [link] failed"
        );
    }

    #[test]
    fn test_file_names_replaced() {
        assert_eq!(
            normalize("changed src/main/Foo.java and notes.txt"),
            "changed [file java] and [file txt]"
        );
    }

    #[test]
    fn test_file_indicator_lines_removed() {
        assert_eq!(
            normalize("Patch\n* (edit) src/Foo.java\nDone"),
            "Patch\nDone"
        );
    }

    #[test]
    fn test_images_removed() {
        assert_eq!(normalize("before !screenshot.png! after"), "before  after");
    }

    #[test]
    fn test_empty_lines_dropped() {
        assert_eq!(normalize("a\n\n   \nb"), "a\nb");
        assert_eq!(Normalizer::new(false).normalize("a\n\nb"), "a\n\nb");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "{color:red}Set log level to DEBUG{color}",
            "see [docs|http://x.org] and http://y.org/a.java in Foo.java",
            "{noformat}\n[link] stays, [file txt] stays\n{noformat}",
            "{col!x!or}hidden{color}",
            "!a! [b|c] http://d.e/f!g! {panel:title=t}\n\n* (edit) Bar.java\n",
            "Fail! really! twice!",
        ];

        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", sample);
        }
    }

    #[test]
    fn test_deeply_nested_color_markup() {
        for depth in 0..10 {
            let text = format!(
                "keep {}{{color}}{} debug",
                "{co".repeat(depth),
                "lor}".repeat(depth)
            );

            let once = normalize(&text);
            assert_eq!(once, "keep  debug", "depth {}", depth);
            assert_eq!(normalize(&once), once, "not idempotent at depth {}", depth);
        }
    }

    #[test]
    fn test_images_nested_in_color_markup() {
        for depth in 1..10 {
            let text = format!(
                "keep {}{} debug",
                "{co!img!".repeat(depth),
                "lor}".repeat(depth)
            );

            let once = normalize(&text);
            assert_eq!(once, "keep  debug", "depth {}", depth);
            assert_eq!(normalize(&once), once, "not idempotent at depth {}", depth);
        }
    }
}
