//! Issue tracker REST client

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{Result, SourceError};

/// Fields read from `GET {host}/{key}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct IssueFields {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// One entry of `GET {host}/{key}/comment`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Comment {
    #[serde(default)]
    pub body: Option<String>,
}

impl Comment {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: Some(body.into()),
        }
    }
}

#[derive(Deserialize)]
struct IssueResponse {
    fields: IssueFields,
}

#[derive(Deserialize)]
struct CommentsResponse {
    #[serde(default)]
    comments: Vec<Comment>,
}

/// Remote issue tracker
#[async_trait]
pub trait IssueTracker: Send + Sync {
    async fn issue_fields(&self, key: &str) -> Result<IssueFields>;

    /// Comments in the order the tracker returns them
    async fn comments(&self, key: &str) -> Result<Vec<Comment>>;
}

/// Connection settings for the tracker
#[derive(Debug, Clone)]
pub struct TrackerOptions {
    /// Issue resource base, e.g. `https://issues.apache.org/jira/rest/api/2/issue`
    pub host: String,
    pub user_agent: String,
    pub request_timeout: Option<Duration>,
}

impl Default for TrackerOptions {
    fn default() -> Self {
        Self {
            host: "https://issues.apache.org/jira/rest/api/2/issue".to_string(),
            user_agent: "issuetrail/0.2 (issue report generator)".to_string(),
            request_timeout: None,
        }
    }
}

/// Jira REST API v2 client
pub struct JiraClient {
    client: reqwest::Client,
    host: String,
}

impl JiraClient {
    pub fn new(options: &TrackerOptions) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(options.user_agent.as_str());
        if let Some(timeout) = options.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            host: options.host.trim_end_matches('/').to_string(),
        })
    }

    fn issue_url(&self, key: &str) -> String {
        format!("{}/{}", self.host, key)
    }

    fn comments_url(&self, key: &str) -> String {
        format!("{}/{}/comment", self.host, key)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!(url, "GET");
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(SourceError::Status {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl IssueTracker for JiraClient {
    async fn issue_fields(&self, key: &str) -> Result<IssueFields> {
        let response: IssueResponse = self.get_json(&self.issue_url(key)).await?;
        Ok(response.fields)
    }

    async fn comments(&self, key: &str) -> Result<Vec<Comment>> {
        let response: CommentsResponse = self.get_json(&self.comments_url(key)).await?;
        Ok(response.comments)
    }
}
