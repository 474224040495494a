//! In-memory browser and tracker for pipeline tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use issuetrail_sources::{
    Anchor, BrowserHandle, Comment, IssueFields, IssueTracker, PageSession, Result, SourceError,
};

/// Tracks how many calls are running at once
#[derive(Default)]
pub struct Gauge {
    running: AtomicUsize,
    peak: AtomicUsize,
    total: AtomicUsize,
}

impl Gauge {
    fn enter(&self) {
        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        self.total.fetch_add(1, Ordering::SeqCst);
    }

    fn leave(&self) {
        self.running.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }
}

/// What a repository page shows
#[derive(Clone)]
pub struct FakePageContent {
    pub anchor: Option<Anchor>,
    pub delay: Duration,
}

/// Serves pages from a URL map; unknown URLs have no anchor
#[derive(Default)]
pub struct FakeBrowser {
    pages: HashMap<String, FakePageContent>,
    tasks: Option<Arc<Gauge>>,
    pub opened: Arc<AtomicUsize>,
    pub closed: Arc<AtomicUsize>,
}

impl FakeBrowser {
    /// Opening a page marks the start of a row task on `tasks`
    pub fn with_task_gauge(mut self, tasks: Arc<Gauge>) -> Self {
        self.tasks = Some(tasks);
        self
    }

    pub fn with_issue(mut self, url: &str, key: &str, delay_ms: u64) -> Self {
        self.pages.insert(
            url.to_string(),
            FakePageContent {
                anchor: Some(Anchor {
                    text: key.to_string(),
                    href: format!("https://issues.apache.org/jira/browse/{}", key),
                }),
                delay: Duration::from_millis(delay_ms),
            },
        );
        self
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

struct FakePage {
    pages: HashMap<String, FakePageContent>,
    current: Option<FakePageContent>,
    closed: Arc<AtomicUsize>,
}

#[async_trait]
impl BrowserHandle for FakeBrowser {
    async fn open_page(&self) -> Result<Box<dyn PageSession>> {
        if let Some(tasks) = &self.tasks {
            tasks.enter();
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakePage {
            pages: self.pages.clone(),
            current: None,
            closed: self.closed.clone(),
        }))
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl PageSession for FakePage {
    async fn goto(&mut self, url: &str) -> Result<()> {
        self.current = self.pages.get(url).cloned();
        Ok(())
    }

    async fn wait_for_anchor(&mut self, selector: &str, timeout: Duration) -> Result<Anchor> {
        let content = self.current.clone();
        match content {
            Some(FakePageContent {
                anchor: Some(anchor),
                delay,
            }) => {
                tokio::time::sleep(delay).await;
                Ok(anchor)
            }
            _ => Err(SourceError::AnchorTimeout {
                selector: selector.to_string(),
                timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        }
    }

    async fn close(&mut self) -> Result<()> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// What the tracker knows about one issue. `None` makes that call fail.
#[derive(Clone)]
pub struct FakeIssue {
    pub fields: Option<IssueFields>,
    pub comments: Option<Vec<Comment>>,
}

impl FakeIssue {
    pub fn new(summary: &str, description: &str, comments: &[&str]) -> Self {
        Self {
            fields: Some(IssueFields {
                summary: Some(summary.to_string()),
                description: Some(description.to_string()),
            }),
            comments: Some(comments.iter().map(|c| Comment::new(*c)).collect()),
        }
    }
}

#[derive(Default)]
pub struct FakeTracker {
    issues: HashMap<String, FakeIssue>,
    delay: Duration,
    tasks: Option<Arc<Gauge>>,
    pub gauge: Gauge,
}

impl FakeTracker {
    pub fn with_issue(mut self, key: &str, issue: FakeIssue) -> Self {
        self.issues.insert(key.to_string(), issue);
        self
    }

    /// Returning comments marks the end of a row task on `tasks`
    pub fn with_task_gauge(mut self, tasks: Arc<Gauge>) -> Self {
        self.tasks = Some(tasks);
        self
    }

    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.delay = Duration::from_millis(delay_ms);
        self
    }

    pub fn calls(&self) -> usize {
        self.gauge.total()
    }

    fn lookup(&self, key: &str) -> Option<&FakeIssue> {
        self.issues.get(key)
    }
}

fn not_found(url: String) -> SourceError {
    SourceError::Status { status: 404, url }
}

#[async_trait]
impl IssueTracker for FakeTracker {
    async fn issue_fields(&self, key: &str) -> Result<IssueFields> {
        self.gauge.enter();
        tokio::time::sleep(self.delay).await;
        self.gauge.leave();

        self.lookup(key)
            .and_then(|issue| issue.fields.clone())
            .ok_or_else(|| not_found(format!("https://jira/{}", key)))
    }

    async fn comments(&self, key: &str) -> Result<Vec<Comment>> {
        self.gauge.enter();
        tokio::time::sleep(self.delay).await;
        self.gauge.leave();
        if let Some(tasks) = &self.tasks {
            tasks.leave();
        }

        self.lookup(key)
            .and_then(|issue| issue.comments.clone())
            .ok_or_else(|| not_found(format!("https://jira/{}/comment", key)))
    }
}
