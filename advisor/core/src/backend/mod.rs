//! Remote Service Backends
//!
//! Trait seams for the completion and agent endpoints, plus their HTTP
//! implementations.
//!
//! # Available Backends
//!
//! - **OpenAiCompatBackend**: chat-completions endpoint (advice)
//! - **HttpAgentBackend**: agent action endpoint (inference, social posts)
//!
//! # Usage
//!
//! ```ignore
//! use advisor_core::backend::{CompletionBackend, CompletionRequest, OpenAiCompatBackend};
//!
//! let backend = OpenAiCompatBackend::new(url, None, Some(Duration::from_secs(30)))?;
//! let response = backend.complete(&CompletionRequest::new("Hello!")).await?;
//! ```

mod agent;
mod openai;
mod traits;

use std::time::Duration;

pub use agent::HttpAgentBackend;
pub use openai::OpenAiCompatBackend;
pub use traits::{
    AgentAction, AgentBackend, CompletionBackend, CompletionMessage, CompletionRequest,
    CompletionResponse, CompletionRole, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE,
};

/// Shared HTTP client construction; `None` means no per-call timeout
pub(crate) fn build_http_client(timeout: Option<Duration>) -> reqwest::Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build()
}
