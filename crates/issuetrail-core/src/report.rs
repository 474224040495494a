//! Report shapes and the records written for each input row

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;
use crate::record::{NULL_VALUE, Relevance};

/// Summary written in place of an issue that is not about logging
pub const EXCLUDED_SUMMARY: &str = "Excluded issue";

const REFERENCE_HEADERS: &[&str] = &["Issue ID", "Issue Link", "Git URL"];
const DETAIL_HEADERS: &[&str] = &["ID", "Summary", "Description", "Comments"];
const FULL_HEADERS: &[&str] = &[
    "Issue ID",
    "Issue Link",
    "Git URL",
    "Summary",
    "Summary Relevance",
    "Description",
    "Comments",
];

/// Which report a run produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportShape {
    /// Repository URL to issue key and link
    Reference,
    /// Issue key to summary, description and comments
    Detail,
    /// Both, plus summary relevance
    #[default]
    Full,
}

impl ReportShape {
    /// Column headers, in output order
    pub fn headers(&self) -> &'static [&'static str] {
        match self {
            Self::Reference => REFERENCE_HEADERS,
            Self::Detail => DETAIL_HEADERS,
            Self::Full => FULL_HEADERS,
        }
    }

    /// Input column read when none is configured.
    ///
    /// Detail runs read the `Issue ID` column so a reference report can be fed back in.
    pub fn default_input_column(&self) -> &'static str {
        match self {
            Self::Reference | Self::Full => "git_url",
            Self::Detail => "Issue ID",
        }
    }

    /// Whether rows need the issue anchor scraped from a page
    pub fn needs_browser(&self) -> bool {
        matches!(self, Self::Reference | Self::Full)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reference => "reference",
            Self::Detail => "detail",
            Self::Full => "full",
        }
    }
}

impl fmt::Display for ReportShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportShape {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reference" | "ref" => Ok(Self::Reference),
            "detail" | "details" => Ok(Self::Detail),
            "full" => Ok(Self::Full),
            other => Err(Error::UnknownShape(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceRecord {
    pub issue_id: String,
    pub issue_link: String,
    pub git_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailRecord {
    pub id: String,
    pub summary: String,
    pub description: String,
    pub comments: String,
}

impl DetailRecord {
    /// Record for an issue whose summary is not about logging
    pub fn excluded(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            summary: EXCLUDED_SUMMARY.to_string(),
            description: String::new(),
            comments: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FullRecord {
    pub issue_id: String,
    pub issue_link: String,
    pub git_url: String,
    pub issue_summary: String,
    pub issue_summary_relevance: Relevance,
    pub issue_description: String,
    pub issue_comments: String,
}

impl FullRecord {
    /// Record for a row whose reference is unknown; detail columns are all `"null"`
    pub fn without_issue(git_url: impl Into<String>, issue_id: &str, issue_link: &str) -> Self {
        Self {
            issue_id: issue_id.to_string(),
            issue_link: issue_link.to_string(),
            git_url: git_url.into(),
            issue_summary: NULL_VALUE.to_string(),
            issue_summary_relevance: Relevance::No,
            issue_description: NULL_VALUE.to_string(),
            issue_comments: NULL_VALUE.to_string(),
        }
    }
}

/// One finished report row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum OutputRecord {
    Reference(ReferenceRecord),
    Detail(DetailRecord),
    Full(FullRecord),
}

impl OutputRecord {
    pub fn shape(&self) -> ReportShape {
        match self {
            Self::Reference(_) => ReportShape::Reference,
            Self::Detail(_) => ReportShape::Detail,
            Self::Full(_) => ReportShape::Full,
        }
    }

    /// Cell values in the same order as `ReportShape::headers`
    pub fn cells(&self) -> Vec<&str> {
        match self {
            Self::Reference(r) => vec![
                r.issue_id.as_str(),
                r.issue_link.as_str(),
                r.git_url.as_str(),
            ],
            Self::Detail(r) => vec![
                r.id.as_str(),
                r.summary.as_str(),
                r.description.as_str(),
                r.comments.as_str(),
            ],
            Self::Full(r) => vec![
                r.issue_id.as_str(),
                r.issue_link.as_str(),
                r.git_url.as_str(),
                r.issue_summary.as_str(),
                r.issue_summary_relevance.as_str(),
                r.issue_description.as_str(),
                r.issue_comments.as_str(),
            ],
        }
    }
}
