//! Data sources for issuetrail
//!
//! - `rows`: streaming CSV input
//! - `browser` / `reference`: issue anchors scraped from repository pages
//! - `tracker` / `detail`: issue fields and comments from the tracker REST API

pub mod browser;
pub mod detail;
pub mod error;
pub mod reference;
pub mod rows;
pub mod tracker;

pub use browser::{Anchor, BrowserHandle, BrowserOptions, ChromeBrowser, PageSession};
pub use detail::fetch_detail;
pub use error::{Result, SourceError};
pub use reference::{AnchorQuery, extract_reference};
pub use rows::RowSource;
pub use tracker::{Comment, IssueFields, IssueTracker, JiraClient, TrackerOptions};
