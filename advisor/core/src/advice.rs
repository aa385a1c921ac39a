//! Investment Advice
//!
//! Turns a token list into one completion request and returns the reply text.
//! Failures never propagate: the caller always gets a string to show.

use std::sync::Arc;

use crate::backend::{CompletionBackend, CompletionRequest, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
use crate::error::FlowError;

/// Shown when the endpoint answers without message content
pub const NO_ADVICE_PLACEHOLDER: &str = "No advice was returned.";

/// Shown when the request fails
pub const ADVICE_ERROR_PLACEHOLDER: &str = "Error fetching investment advice.";

const PROMPT_PREFIX: &str = "I want investment advice for the following tokens: ";

/// Completion parameters for advice requests
#[derive(Clone, Debug, PartialEq)]
pub struct AdviceConfig {
    /// Maximum tokens in the response
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
    /// Model name sent to the endpoint, if any
    pub model: Option<String>,
}

impl Default for AdviceConfig {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            model: None,
        }
    }
}

/// Prompt sent for a token list
#[must_use]
pub fn advice_prompt(tokens: &[String]) -> String {
    format!("{PROMPT_PREFIX}{}", tokens.join(", "))
}

/// Advice fetcher
#[derive(Clone)]
pub struct AdviceFetcher {
    backend: Arc<dyn CompletionBackend>,
    config: AdviceConfig,
}

impl AdviceFetcher {
    /// Create a fetcher over `backend`
    pub fn new(backend: Arc<dyn CompletionBackend>, config: AdviceConfig) -> Self {
        Self { backend, config }
    }

    fn request(&self, tokens: &[String]) -> CompletionRequest {
        let request = CompletionRequest::new(advice_prompt(tokens))
            .with_max_tokens(self.config.max_tokens)
            .with_temperature(self.config.temperature);
        match self.config.model {
            Some(ref model) => request.with_model(model.clone()),
            None => request,
        }
    }

    /// Ask for advice, distinguishing failure from an empty answer
    ///
    /// `Ok(None)` means the endpoint answered without message content.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::AdviceFetchFailed`] on transport failure, non-success
    /// status or an undecodable body.
    pub async fn try_fetch_advice(&self, tokens: &[String]) -> Result<Option<String>, FlowError> {
        tracing::info!(
            backend = self.backend.name(),
            tokens = tokens.len(),
            "Requesting investment advice"
        );
        self.backend
            .complete(&self.request(tokens))
            .await
            .map(|response| response.content)
            .map_err(|e| FlowError::AdviceFetchFailed(format!("{e:#}")))
    }

    /// Ask for advice about `tokens`
    ///
    /// Callers skip this when `tokens` is empty. Never fails: an empty answer
    /// becomes [`NO_ADVICE_PLACEHOLDER`] and any error becomes
    /// [`ADVICE_ERROR_PLACEHOLDER`].
    pub async fn fetch_advice(&self, tokens: &[String]) -> String {
        match self.try_fetch_advice(tokens).await {
            Ok(Some(content)) if !content.is_empty() => content,
            Ok(_) => NO_ADVICE_PLACEHOLDER.to_string(),
            Err(e) => {
                tracing::warn!(error = %e, "Advice fetch failed");
                ADVICE_ERROR_PLACEHOLDER.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::backend::CompletionResponse;

    enum Reply {
        Content(&'static str),
        Empty,
        Fail,
    }

    struct MockCompletion {
        reply: Reply,
        seen: Mutex<Vec<CompletionRequest>>,
    }

    impl MockCompletion {
        fn new(reply: Reply) -> Arc<Self> {
            Arc::new(Self {
                reply,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl CompletionBackend for MockCompletion {
        fn name(&self) -> &str {
            "Mock"
        }

        async fn complete(&self, request: &CompletionRequest) -> anyhow::Result<CompletionResponse> {
            self.seen.lock().push(request.clone());
            match self.reply {
                Reply::Content(text) => Ok(CompletionResponse {
                    content: Some(text.to_string()),
                    ..Default::default()
                }),
                Reply::Empty => Ok(CompletionResponse::default()),
                Reply::Fail => anyhow::bail!("completion endpoint returned 500"),
            }
        }
    }

    fn tokens() -> Vec<String> {
        vec!["A".into(), "B".into(), "C".into()]
    }

    #[test]
    fn test_prompt_format() {
        assert_eq!(
            advice_prompt(&tokens()),
            "I want investment advice for the following tokens: A, B, C"
        );
    }

    #[tokio::test]
    async fn test_fetch_advice_returns_content() {
        let backend = MockCompletion::new(Reply::Content("Hold."));
        let fetcher = AdviceFetcher::new(backend.clone(), AdviceConfig::default());

        assert_eq!(fetcher.fetch_advice(&tokens()).await, "Hold.");

        let seen = backend.seen.lock();
        assert_eq!(seen.len(), 1);
        assert_eq!(
            seen[0].prompt(),
            Some("I want investment advice for the following tokens: A, B, C")
        );
        assert_eq!(seen[0].max_tokens, 1024);
        assert!(!seen[0].stream);
    }

    #[tokio::test]
    async fn test_missing_content_uses_placeholder() {
        let fetcher = AdviceFetcher::new(MockCompletion::new(Reply::Empty), AdviceConfig::default());
        assert_eq!(fetcher.fetch_advice(&tokens()).await, NO_ADVICE_PLACEHOLDER);

        let fetcher = AdviceFetcher::new(MockCompletion::new(Reply::Content("")), AdviceConfig::default());
        assert_eq!(fetcher.fetch_advice(&tokens()).await, NO_ADVICE_PLACEHOLDER);
    }

    #[tokio::test]
    async fn test_failure_uses_error_placeholder() {
        let fetcher = AdviceFetcher::new(MockCompletion::new(Reply::Fail), AdviceConfig::default());
        assert_eq!(fetcher.fetch_advice(&tokens()).await, ADVICE_ERROR_PLACEHOLDER);
        assert!(matches!(
            fetcher.try_fetch_advice(&tokens()).await,
            Err(FlowError::AdviceFetchFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_config_flows_into_request() {
        let backend = MockCompletion::new(Reply::Content("ok"));
        let fetcher = AdviceFetcher::new(
            backend.clone(),
            AdviceConfig {
                max_tokens: 256,
                temperature: 0.2,
                model: Some("advisor-small".into()),
            },
        );
        fetcher.fetch_advice(&tokens()).await;

        let seen = backend.seen.lock();
        assert_eq!(seen[0].max_tokens, 256);
        assert_eq!(seen[0].model.as_deref(), Some("advisor-small"));
    }
}
