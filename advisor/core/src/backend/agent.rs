//! Agent Endpoint Backend
//!
//! Posts `{connection, action, params}` to a single agent URL and returns the
//! decoded JSON reply. What the reply means depends on the action.

use std::time::Duration;

use async_trait::async_trait;

use super::build_http_client;
use super::traits::{AgentAction, AgentBackend};

/// Agent endpoint client
#[derive(Clone, Debug)]
pub struct HttpAgentBackend {
    /// Action URL
    url: String,
    /// HTTP client
    http_client: reqwest::Client,
}

impl HttpAgentBackend {
    /// Create a new agent client
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

    /// Action URL
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl AgentBackend for HttpAgentBackend {
    fn name(&self) -> &str {
        "Agent"
    }

    async fn perform(&self, action: &AgentAction) -> anyhow::Result<serde_json::Value> {
        tracing::debug!(
            url = %self.url,
            connection = %action.connection,
            action = %action.action,
            "Performing agent action"
        );

        let response = self.http_client.post(&self.url).json(action).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "agent endpoint returned {status} for {}/{}: {body}",
                action.connection,
                action.action
            );
        }

        Ok(response.json().await?)
    }
}
