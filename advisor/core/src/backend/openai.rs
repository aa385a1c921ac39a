//! OpenAI-Compatible Completion Backend
//!
//! # Chat Completions API
//!
//! `POST {url}` with `{messages, max_tokens, temperature, stream}`; the reply
//! text lives at `choices[0].message.content`. Only non-streaming requests are
//! issued.

use std::time::Duration;

use async_trait::async_trait;

use super::build_http_client;
use super::traits::{CompletionBackend, CompletionRequest, CompletionResponse};

/// Chat-completions client
#[derive(Clone)]
pub struct OpenAiCompatBackend {
    /// Endpoint URL (full path, not a base)
    url: String,
    /// Bearer token (optional; proxies often inject their own)
    api_key: Option<String>,
    /// HTTP client
    http_client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiCompatBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatBackend")
            .field("url", &self.url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<set>"))
            .finish_non_exhaustive()
    }
}

impl OpenAiCompatBackend {
    /// Create a new completion client
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be constructed.
    pub fn new(
        url: impl Into<String>,
        api_key: Option<String>,
        timeout: Option<Duration>,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            url: url.into(),
            api_key,
            http_client: build_http_client(timeout)?,
        })
    }

    /// Endpoint URL
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Pull the response fields out of a chat-completions body
fn parse_completion(data: &serde_json::Value) -> CompletionResponse {
    let content = data
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .map(String::from);

    let model = data.get("model").and_then(|m| m.as_str()).map(String::from);

    let tokens_used = data
        .get("usage")
        .and_then(|u| u.get("total_tokens"))
        .and_then(serde_json::Value::as_u64)
        .and_then(|t| u32::try_from(t).ok());

    CompletionResponse {
        content,
        model,
        tokens_used,
    }
}

#[async_trait]
impl CompletionBackend for OpenAiCompatBackend {
    fn name(&self) -> &str {
        "OpenAI-compatible"
    }

    async fn complete(&self, request: &CompletionRequest) -> anyhow::Result<CompletionResponse> {
        tracing::debug!(
            url = %self.url,
            max_tokens = request.max_tokens,
            temperature = request.temperature,
            "Sending completion request"
        );

        let mut builder = self.http_client.post(&self.url).json(request);
        if let Some(ref key) = self.api_key {
            builder = builder.bearer_auth(key);
        }
        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("completion endpoint returned {status}: {body}");
        }

        let data: serde_json::Value = response.json().await?;
        Ok(parse_completion(&data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_completion_content() {
        let data = serde_json::json!({
            "model": "gpt-4o-mini",
            "choices": [{"message": {"role": "assistant", "content": "Diversify."}}],
            "usage": {"total_tokens": 42}
        });
        let response = parse_completion(&data);
        assert_eq!(response.content.as_deref(), Some("Diversify."));
        assert_eq!(response.model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(response.tokens_used, Some(42));
    }

    #[test]
    fn test_parse_completion_missing_content() {
        assert_eq!(parse_completion(&serde_json::json!({"choices": []})).content, None);
        assert_eq!(parse_completion(&serde_json::json!({})).content, None);
        let null_content = serde_json::json!({"choices": [{"message": {"content": null}}]});
        assert_eq!(parse_completion(&null_content).content, None);
    }

    #[test]
    fn test_debug_hides_api_key() {
        let backend =
            OpenAiCompatBackend::new("http://localhost/v1/chat/completions", Some("sk-x".into()), None)
                .unwrap();
        assert!(!format!("{backend:?}").contains("sk-x"));
        assert_eq!(backend.url(), "http://localhost/v1/chat/completions");
    }
}
