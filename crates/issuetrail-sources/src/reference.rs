//! Issue reference extraction from repository pages

use std::time::Duration;

use issuetrail_core::{IssueReference, Stage};
use tracing::{debug, info, warn};

use crate::browser::{Anchor, BrowserHandle, PageSession};
use crate::{Result, SourceError};

/// Which anchor marks the issue reference, and how long to wait for it
#[derive(Debug, Clone)]
pub struct AnchorQuery {
    pub selector: String,
    pub timeout: Duration,
}

impl Default for AnchorQuery {
    fn default() -> Self {
        Self {
            selector: "a.issue-link".to_string(),
            timeout: Duration::from_millis(3000),
        }
    }
}

/// Find the issue anchor on `url`.
///
/// Opens a page of its own and always closes it before returning. Never fails:
/// a missing anchor or a broken page gives the `"null"` reference.
pub async fn extract_reference(
    browser: &dyn BrowserHandle,
    url: &str,
    query: &AnchorQuery,
) -> Stage<IssueReference> {
    let mut page = match browser.open_page().await {
        Ok(page) => page,
        Err(e) => {
            warn!(url, error = %e, "Could not open a browser page");
            return Stage::sentinel(IssueReference::absent(), e.to_string());
        }
    };

    let located = locate_anchor(page.as_mut(), url, query).await;

    if let Err(e) = page.close().await {
        warn!(url, error = %e, "Failed to close browser page");
    }

    match located {
        Ok(anchor) if !anchor.text.is_empty() => {
            debug!(url, issue = %anchor.text, "Issue reference found");
            Stage::Found(IssueReference::new(anchor.text, anchor.href))
        }
        Ok(_) => {
            info!(url, "The '{}' element has no text", query.selector);
            Stage::sentinel(IssueReference::absent(), "anchor has no text")
        }
        Err(e @ SourceError::AnchorTimeout { .. }) => {
            info!(url, "The '{}' element doesn't exist", query.selector);
            Stage::sentinel(IssueReference::absent(), e.to_string())
        }
        Err(e) => {
            warn!(url, error = %e, "Failed to load page");
            Stage::sentinel(IssueReference::absent(), e.to_string())
        }
    }
}

async fn locate_anchor(
    page: &mut dyn PageSession,
    url: &str,
    query: &AnchorQuery,
) -> Result<Anchor> {
    page.goto(url).await?;
    page.wait_for_anchor(&query.selector, query.timeout).await
}
