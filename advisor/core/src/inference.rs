//! Prediction Inference
//!
//! Fetches one prediction-market inference for a topic through the agent
//! endpoint. Like advice, failures are downgraded to placeholder text.

use std::sync::Arc;

use crate::backend::{AgentAction, AgentBackend};
use crate::error::FlowError;

/// Shown when the endpoint answers without an inference
pub const NO_INFERENCE_PLACEHOLDER: &str = "No inference was returned.";

/// Shown when the request fails
pub const INFERENCE_ERROR_PLACEHOLDER: &str = "Error fetching inference.";

/// Extract `result.inference` from an agent reply
///
/// Inference values arrive as strings or bare numbers depending on the topic.
#[must_use]
pub fn extract_inference(body: &serde_json::Value) -> Option<String> {
    match body.get("result")?.get("inference")? {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Inference fetcher
#[derive(Clone)]
pub struct InferenceFetcher {
    backend: Arc<dyn AgentBackend>,
}

impl InferenceFetcher {
    /// Create a fetcher over `backend`
    pub fn new(backend: Arc<dyn AgentBackend>) -> Self {
        Self { backend }
    }

    /// Fetch the inference for `topic_id`
    ///
    /// `Ok(None)` means the endpoint answered without an inference.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::InferenceFetchFailed`] when the agent call fails.
    pub async fn try_fetch_inference(&self, topic_id: u32) -> Result<Option<String>, FlowError> {
        tracing::info!(
            backend = self.backend.name(),
            topic_id,
            "Requesting inference"
        );
        let body = self
            .backend
            .perform(&AgentAction::inference(topic_id))
            .await
            .map_err(|e| FlowError::InferenceFetchFailed(format!("{e:#}")))?;
        Ok(extract_inference(&body))
    }

    /// Fetch the inference for `topic_id`, never failing
    pub async fn fetch_inference(&self, topic_id: u32) -> String {
        match self.try_fetch_inference(topic_id).await {
            Ok(Some(inference)) => inference,
            Ok(None) => NO_INFERENCE_PLACEHOLDER.to_string(),
            Err(e) => {
                tracing::warn!(topic_id, error = %e, "Inference fetch failed");
                INFERENCE_ERROR_PLACEHOLDER.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use parking_lot::Mutex;

    use super::*;

    struct MockAgent {
        reply: Option<serde_json::Value>,
        seen: Mutex<Vec<AgentAction>>,
    }

    #[async_trait]
    impl AgentBackend for MockAgent {
        fn name(&self) -> &str {
            "Mock"
        }

        async fn perform(&self, action: &AgentAction) -> anyhow::Result<serde_json::Value> {
            self.seen.lock().push(action.clone());
            self.reply
                .clone()
                .ok_or_else(|| anyhow::anyhow!("agent endpoint returned 502"))
        }
    }

    fn mock_fetcher(reply: Option<serde_json::Value>) -> (InferenceFetcher, Arc<MockAgent>) {
        let agent = Arc::new(MockAgent {
            reply,
            seen: Mutex::new(Vec::new()),
        });
        (InferenceFetcher::new(agent.clone()), agent)
    }

    #[test]
    fn test_extract_inference_shapes() {
        let s = serde_json::json!({"result": {"inference": "3412.55"}});
        assert_eq!(extract_inference(&s).as_deref(), Some("3412.55"));

        let n = serde_json::json!({"result": {"inference": 0.25}});
        assert_eq!(extract_inference(&n).as_deref(), Some("0.25"));

        assert_eq!(extract_inference(&serde_json::json!({"result": {}})), None);
        assert_eq!(extract_inference(&serde_json::json!({"error": "x"})), None);
    }

    #[tokio::test]
    async fn test_fetch_inference_sends_topic() {
        let (fetcher, agent) = mock_fetcher(Some(serde_json::json!({"result": {"inference": "97000"}})));
        assert_eq!(fetcher.fetch_inference(14).await, "97000");

        let seen = agent.seen.lock();
        assert_eq!(seen[0], AgentAction::inference(14));
    }

    #[tokio::test]
    async fn test_fetch_inference_placeholders() {
        let (fetcher, _) = mock_fetcher(Some(serde_json::json!({"result": {}})));
        assert_eq!(fetcher.fetch_inference(1).await, NO_INFERENCE_PLACEHOLDER);

        let (fetcher, _) = mock_fetcher(None);
        assert_eq!(fetcher.fetch_inference(1).await, INFERENCE_ERROR_PLACEHOLDER);
        assert!(matches!(
            fetcher.try_fetch_inference(1).await,
            Err(FlowError::InferenceFetchFailed(_))
        ));
    }
}
