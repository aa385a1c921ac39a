//! Trending Tags
//!
//! Keyword tags read once per session from a keyed store and offered to the
//! user as quick-select buttons. The set only grows: new labels are merged by
//! union, in first-seen order, and nothing is ever removed.
//!
//! [`SocialPoster`] is the fire-and-forget side action that posts the current
//! tags through the agent endpoint after a successful portfolio lookup.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::backend::{build_http_client, AgentAction, AgentBackend};

/// Source of trending tag labels
#[async_trait]
pub trait TrendingSource: Send + Sync {
    /// Source name for logs
    fn name(&self) -> &str;

    /// Current labels; an empty list when the store has none
    async fn fetch_tags(&self) -> anyhow::Result<Vec<String>>;
}

/// Body of the store's `GET`: `{"tokens": [...]}` or `{"error": "..."}`
#[derive(Debug, Deserialize)]
struct TrendingBody {
    #[serde(default)]
    tokens: Option<Vec<String>>,
    #[serde(default)]
    error: Option<String>,
}

/// Decode a trending-store body
///
/// An `{"error": ...}` body means the store holds no tags.
///
/// # Errors
///
/// Fails when the body is not JSON of the expected shape.
pub fn parse_trending_body(body: &str) -> anyhow::Result<Vec<String>> {
    let parsed: TrendingBody = serde_json::from_str(body)?;
    if let Some(error) = parsed.error {
        tracing::debug!(error = %error, "Trending store reported no tags");
    }
    Ok(parsed.tokens.unwrap_or_default())
}

/// HTTP trending-tag store
#[derive(Clone, Debug)]
pub struct HttpTrendingSource {
    url: String,
    http_client: reqwest::Client,
}

impl HttpTrendingSource {
    /// Create a store client
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be constructed.
    pub fn new(url: impl Into<String>, timeout: Option<Duration>) -> anyhow::Result<Self> {
        Ok(Self {
            url: url.into(),
            http_client: build_http_client(timeout)?,
        })
    }
}

#[async_trait]
impl TrendingSource for HttpTrendingSource {
    fn name(&self) -> &str {
        "Trending store"
    }

    async fn fetch_tags(&self) -> anyhow::Result<Vec<String>> {
        let response = self.http_client.get(&self.url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("trending store returned {status}: {body}");
        }

        parse_trending_body(&response.text().await?)
    }
}

/// Insertion-ordered, union-merged tag set
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrendingTags {
    labels: Vec<String>,
    seen: HashSet<String>,
}

impl TrendingTags {
    /// Empty set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge labels, skipping blanks and ones already present
    ///
    /// Returns how many labels were new.
    pub fn merge<I, S>(&mut self, labels: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut added = 0;
        for label in labels {
            let label = label.as_ref().trim();
            if label.is_empty() || self.seen.contains(label) {
                continue;
            }
            self.seen.insert(label.to_string());
            self.labels.push(label.to_string());
            added += 1;
        }
        added
    }

    /// Labels in first-seen order
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Whether `label` is present
    #[must_use]
    pub fn contains(&self, label: &str) -> bool {
        self.seen.contains(label)
    }

    /// Number of labels
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the set is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Text posted for a tag list
#[must_use]
pub fn post_text(tags: &[String]) -> String {
    format!("Trending tokens: {}", tags.join(", "))
}

/// Fire-and-forget social post through the agent endpoint
#[derive(Clone)]
pub struct SocialPoster {
    backend: Arc<dyn AgentBackend>,
}

impl SocialPoster {
    /// Create a poster over `backend`
    pub fn new(backend: Arc<dyn AgentBackend>) -> Self {
        Self { backend }
    }

    /// Post `tags` and wait for the result
    ///
    /// # Errors
    ///
    /// Propagates the agent call's failure.
    pub async fn post(&self, tags: &[String]) -> anyhow::Result<()> {
        self.backend
            .perform(&AgentAction::post(post_text(tags)))
            .await
            .map(|_| ())
    }

    /// Post `tags` on a detached task; failures are only logged
    pub fn spawn_post(&self, tags: Vec<String>) -> tokio::task::JoinHandle<()> {
        let poster = self.clone();
        tokio::spawn(async move {
            match poster.post(&tags).await {
                Ok(()) => tracing::info!(tags = tags.len(), "Social post sent"),
                Err(e) => tracing::warn!(error = %format!("{e:#}"), "Social post failed"),
            }
        })
    }
}
