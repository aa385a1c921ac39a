//! Backend Traits
//!
//! Trait definitions for the two remote services a conversation talks to
//! besides the transfer provider: a chat-completion endpoint (advice) and an
//! agent endpoint that runs named actions on named connections (inference,
//! social posts).
//!
//! Implementations handle wire formats and transport. Callers decide what a
//! failure means; most flows downgrade it to a placeholder text.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Default completion budget
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Role of a chat-completion message
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionRole {
    /// System instruction
    System,
    /// End-user turn
    User,
    /// Model turn
    Assistant,
}

/// One message in a completion request
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompletionMessage {
    /// Who said it
    pub role: CompletionRole,
    /// Text
    pub content: String,
}

impl CompletionMessage {
    /// User message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: CompletionRole::User,
            content: content.into(),
        }
    }

    /// System message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: CompletionRole::System,
            content: content.into(),
        }
    }
}

/// Chat-completion request
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CompletionRequest {
    /// Conversation sent to the model
    pub messages: Vec<CompletionMessage>,
    /// Model identifier (omitted when the endpoint picks one)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Maximum tokens in the response
    pub max_tokens: u32,
    /// Temperature (0.0-1.0)
    pub temperature: f32,
    /// Whether to stream the response
    pub stream: bool,
}

impl Default for CompletionRequest {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
            model: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            stream: false,
        }
    }
}

impl CompletionRequest {
    /// Single-turn request with a user prompt
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![CompletionMessage::user(prompt)],
            ..Default::default()
        }
    }

    /// Prepend a system prompt
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.messages.insert(0, CompletionMessage::system(system));
        self
    }

    /// Set model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature.clamp(0.0, 1.0);
        self
    }

    /// Set max tokens
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Text of the last user message
    #[must_use]
    pub fn prompt(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == CompletionRole::User)
            .map(|m| m.content.as_str())
    }
}

/// Response from a completion request
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompletionResponse {
    /// First choice's message content, if the endpoint returned one
    pub content: Option<String>,
    /// Model that generated the response (if reported)
    pub model: Option<String>,
    /// Tokens used (if reported)
    pub tokens_used: Option<u32>,
}

/// Chat-completion backend
///
/// Implement this to send advice prompts somewhere other than an
/// OpenAI-compatible endpoint.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Backend name for logs
    fn name(&self) -> &str;

    /// Send a request and wait for the complete response
    ///
    /// An `Ok` with `content: None` means the endpoint answered but returned
    /// no message.
    async fn complete(&self, request: &CompletionRequest) -> anyhow::Result<CompletionResponse>;
}

/// A named action on a named agent connection
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentAction {
    /// Connection (e.g. `allora`, `twitter`)
    pub connection: String,
    /// Action on that connection (e.g. `get-inference`)
    pub action: String,
    /// Positional parameters, always strings on the wire
    pub params: Vec<String>,
}

impl AgentAction {
    /// Build an action
    pub fn new(
        connection: impl Into<String>,
        action: impl Into<String>,
        params: Vec<String>,
    ) -> Self {
        Self {
            connection: connection.into(),
            action: action.into(),
            params,
        }
    }

    /// Prediction-market inference for one topic
    #[must_use]
    pub fn inference(topic_id: u32) -> Self {
        Self::new("allora", "get-inference", vec![topic_id.to_string()])
    }

    /// Social post with the given text
    pub fn post(text: impl Into<String>) -> Self {
        Self::new("twitter", "post-tweet", vec![text.into()])
    }
}

/// Agent-action backend
#[async_trait]
pub trait AgentBackend: Send + Sync {
    /// Backend name for logs
    fn name(&self) -> &str;

    /// Run an action and return the decoded JSON body
    async fn perform(&self, action: &AgentAction) -> anyhow::Result<serde_json::Value>;
}
