//! Per-row values flowing through the enrichment pipeline

use std::fmt;

use serde::{Deserialize, Serialize};

/// Marker written wherever a value is absent
pub const NULL_VALUE: &str = "null";

/// Summary written when the issue fields could not be fetched
pub const ERROR_SUMMARY: &str = "ERROR";

/// Description written when the issue fields could not be fetched
pub const ERROR_DESCRIPTION: &str = "ERROR getting issue details";

/// One line of the input file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRow {
    /// Zero-based position in the input, excluding the header
    pub index: usize,
    /// Raw value of the input column, `None` when the row lacks it
    pub source: Option<String>,
}

impl InputRow {
    pub fn new(index: usize, source: Option<String>) -> Self {
        Self { index, source }
    }

    /// The usable input value.
    ///
    /// Empty cells and the `"null"` marker left by an earlier report count as absent.
    pub fn value(&self) -> Option<&str> {
        self.source
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty() && *v != NULL_VALUE)
    }

    /// The raw cell as written back into reports (empty when missing)
    pub fn raw(&self) -> &str {
        self.source.as_deref().unwrap_or_default()
    }
}

/// Issue key and link scraped from a repository page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueReference {
    pub id: String,
    pub link: String,
}

impl IssueReference {
    pub fn new(id: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            link: link.into(),
        }
    }

    /// `{id: "null", link: "null"}`
    pub fn absent() -> Self {
        Self::new(NULL_VALUE, NULL_VALUE)
    }
}

/// Issue fields plus the already formatted and joined comments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueDetail {
    pub id: String,
    pub summary: String,
    pub description: String,
    pub comments: String,
}

impl IssueDetail {
    /// Every field except the id set to `"null"`
    pub fn absent(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            summary: NULL_VALUE.to_string(),
            description: NULL_VALUE.to_string(),
            comments: NULL_VALUE.to_string(),
        }
    }

    /// Detail for an issue whose fields call failed but whose comments were read
    pub fn fields_unavailable(id: impl Into<String>, comments: String) -> Self {
        Self {
            id: id.into(),
            summary: ERROR_SUMMARY.to_string(),
            description: ERROR_DESCRIPTION.to_string(),
            comments,
        }
    }
}

/// Whether an issue summary mentions logging or severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Relevance {
    Yes,
    No,
}

impl Relevance {
    pub fn from_match(matched: bool) -> Self {
        if matched { Self::Yes } else { Self::No }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "YES",
            Self::No => "NO",
        }
    }
}

impl fmt::Display for Relevance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
