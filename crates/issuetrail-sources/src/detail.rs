//! Issue detail fetching

use issuetrail_core::{IssueDetail, Stage};
use issuetrail_text::CommentFormatter;
use tracing::{debug, error};

use crate::Result;
use crate::tracker::IssueTracker;

/// Keys copied from commit messages sometimes point at pull requests (`#123`)
fn is_invalid_key(key: &str) -> bool {
    key.starts_with('#')
}

/// Fetch summary, description and formatted comments for one issue.
///
/// - A key starting with `#` gives the all-`"null"` detail without any request.
/// - A failed fields request degrades to `summary: "ERROR"`; comments are still read.
/// - A failed comments request is returned as an error; callers decide what the row becomes.
pub async fn fetch_detail(
    tracker: &dyn IssueTracker,
    formatter: &CommentFormatter,
    key: &str,
) -> Result<Stage<IssueDetail>> {
    if is_invalid_key(key) {
        debug!(key, "Skipping invalid issue key");
        return Ok(Stage::sentinel(
            IssueDetail::absent(key),
            "issue key starts with '#'",
        ));
    }

    let fields = tracker.issue_fields(key).await;
    let comments = tracker.comments(key).await?;
    let comments = formatter.format_comments(comments.iter().map(|c| c.body.as_deref()));

    match fields {
        Ok(fields) => Ok(Stage::Found(IssueDetail {
            id: key.to_string(),
            summary: fields.summary.unwrap_or_default(),
            description: fields.description.unwrap_or_default(),
            comments,
        })),
        Err(e) => {
            error!(key, error = %e, "Error on issue");
            Ok(Stage::degraded(
                IssueDetail::fields_unavailable(key, comments),
                e.to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SourceError;
    use crate::tracker::{Comment, IssueFields};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakeTracker {
        fields: Option<IssueFields>,
        comments: Option<Vec<Comment>>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl IssueTracker for FakeTracker {
        async fn issue_fields(&self, key: &str) -> Result<IssueFields> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.fields.clone().ok_or_else(|| SourceError::Status {
                status: 500,
                url: format!("https://jira/{}", key),
            })
        }

        async fn comments(&self, key: &str) -> Result<Vec<Comment>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.comments.clone().ok_or_else(|| SourceError::Status {
                status: 404,
                url: format!("https://jira/{}/comment", key),
            })
        }
    }

    fn fields(summary: &str) -> IssueFields {
        IssueFields {
            summary: Some(summary.to_string()),
            description: Some("desc".to_string()),
        }
    }

    #[tokio::test]
    async fn test_invalid_key_makes_no_calls() {
        let tracker = FakeTracker::default();

        let detail = fetch_detail(&tracker, &CommentFormatter::default(), "#123")
            .await
            .unwrap();

        assert!(detail.is_sentinel());
        assert_eq!(detail.into_value(), IssueDetail::absent("#123"));
        assert_eq!(tracker.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_found_detail_formats_comments_in_order() {
        let tracker = FakeTracker {
            fields: Some(fields("Lower log level of retry message")),
            comments: Some(vec![
                Comment::new("{color:red}Set log level to DEBUG{color}"),
                Comment::new("LGTM"),
            ]),
            ..Default::default()
        };

        let detail = fetch_detail(&tracker, &CommentFormatter::default(), "HDFS-1")
            .await
            .unwrap();

        assert!(detail.is_found());
        let detail = detail.into_value();
        assert_eq!(detail.summary, "Lower log level of retry message");
        assert_eq!(detail.description, "desc");
        assert_eq!(
            detail.comments,
            "** Comment 1 **\nSet log level to DEBUG\n\n** Comment 2 **\n[Comment excluded]\n"
        );
    }

    #[tokio::test]
    async fn test_fields_failure_degrades_but_keeps_comments() {
        let tracker = FakeTracker {
            fields: None,
            comments: Some(vec![Comment::new("trace it")]),
            ..Default::default()
        };

        let detail = fetch_detail(&tracker, &CommentFormatter::default(), "HDFS-2")
            .await
            .unwrap();

        assert!(detail.is_degraded());
        let detail = detail.into_value();
        assert_eq!(detail.summary, "ERROR");
        assert_eq!(detail.description, "ERROR getting issue details");
        assert_eq!(detail.comments, "** Comment 1 **\ntrace it\n");
        assert_eq!(tracker.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_comments_failure_propagates() {
        let tracker = FakeTracker {
            fields: Some(fields("debug output")),
            comments: None,
            ..Default::default()
        };

        let result = fetch_detail(&tracker, &CommentFormatter::default(), "HDFS-3").await;

        assert!(matches!(result, Err(SourceError::Status { status: 404, .. })));
    }
}
