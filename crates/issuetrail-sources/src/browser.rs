//! Headless browser handle and page sessions

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures_util::StreamExt;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::{Result, SourceError};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Link target and display text of a matched anchor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub text: String,
    pub href: String,
}

/// One isolated page, used by a single task
#[async_trait]
pub trait PageSession: Send {
    /// Navigate to the URL and wait for the load to finish
    async fn goto(&mut self, url: &str) -> Result<()>;

    /// Wait until an element matches the selector, or fail after `timeout`
    async fn wait_for_anchor(&mut self, selector: &str, timeout: Duration) -> Result<Anchor>;

    /// Release the page; no other call is valid afterwards
    async fn close(&mut self) -> Result<()>;
}

/// A running browser shared by every task of a run
#[async_trait]
pub trait BrowserHandle: Send + Sync {
    async fn open_page(&self) -> Result<Box<dyn PageSession>>;

    /// Shut the browser down. Pages opened earlier become unusable.
    async fn close(&self) -> Result<()>;
}

/// How to launch Chrome
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    pub headless: bool,
    pub executable: Option<PathBuf>,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headless: true,
            executable: None,
        }
    }
}

/// Chrome driven over the DevTools protocol
pub struct ChromeBrowser {
    browser: RwLock<Option<Browser>>,
    handler: Mutex<Option<JoinHandle<()>>>,
}

impl ChromeBrowser {
    pub async fn launch(options: &BrowserOptions) -> Result<Self> {
        let mut builder = BrowserConfig::builder();
        if !options.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &options.executable {
            builder = builder.chrome_executable(path);
        }
        let config = builder.build().map_err(SourceError::Browser)?;

        let (browser, mut handler) = Browser::launch(config).await.map_err(browser_error)?;

        // The CDP connection only makes progress while its handler is polled
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!(error = %e, "Browser event error");
                }
            }
        });

        debug!(headless = options.headless, "Browser launched");

        Ok(Self {
            browser: RwLock::new(Some(browser)),
            handler: Mutex::new(Some(handler_task)),
        })
    }
}

#[async_trait]
impl BrowserHandle for ChromeBrowser {
    async fn open_page(&self) -> Result<Box<dyn PageSession>> {
        let guard = self.browser.read().await;
        let browser = guard
            .as_ref()
            .ok_or_else(|| SourceError::Browser("browser already closed".to_string()))?;

        let page = browser.new_page("about:blank").await.map_err(browser_error)?;
        Ok(Box::new(ChromePage { page }))
    }

    async fn close(&self) -> Result<()> {
        let Some(mut browser) = self.browser.write().await.take() else {
            return Ok(());
        };

        browser.close().await.map_err(browser_error)?;
        browser.wait().await?;

        if let Some(task) = self.handler.lock().await.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "Browser handler task ended abnormally");
            }
        }

        debug!("Browser closed");
        Ok(())
    }
}

struct ChromePage {
    page: Page,
}

#[async_trait]
impl PageSession for ChromePage {
    async fn goto(&mut self, url: &str) -> Result<()> {
        self.page.goto(url).await.map_err(browser_error)?;
        Ok(())
    }

    async fn wait_for_anchor(&mut self, selector: &str, timeout: Duration) -> Result<Anchor> {
        let poll = async {
            loop {
                if let Ok(element) = self.page.find_element(selector).await {
                    return element;
                }
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        };

        let element = tokio::time::timeout(timeout, poll).await.map_err(|_| {
            SourceError::AnchorTimeout {
                selector: selector.to_string(),
                timeout_ms: millis(timeout),
            }
        })?;

        let text = element
            .property("textContent")
            .await
            .map_err(browser_error)?;
        let href = element.property("href").await.map_err(browser_error)?;

        Ok(Anchor {
            text: string_value(text),
            href: string_value(href),
        })
    }

    async fn close(&mut self) -> Result<()> {
        self.page.clone().close().await.map_err(browser_error)
    }
}

/// Whole milliseconds, saturating at `u64::MAX`
pub(crate) fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn string_value(value: Option<serde_json::Value>) -> String {
    value
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

fn browser_error(e: chromiumoxide::error::CdpError) -> SourceError {
    SourceError::Browser(e.to_string())
}
