//! Advisor Core - Headless Conversation Orchestration for wallet-advisor
//!
//! This crate provides the conversation logic of the wallet advisor,
//! completely independent of any UI. It can drive a terminal REPL, a web
//! chat widget, or run headless for testing.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         UI Surfaces                           │
//! │        ┌──────────┐     ┌──────────┐     ┌──────────┐         │
//! │        │ Terminal │     │ Web chat │     │ Headless │         │
//! │        └────┬─────┘     └────┬─────┘     └────┬─────┘         │
//! │             └────────────────┼────────────────┘               │
//! │                  SurfaceEvent (up)                            │
//! │                  SurfaceMessage (down)                        │
//! └──────────────────────────────┼────────────────────────────────┘
//!                                │
//! ┌──────────────────────────────┼────────────────────────────────┐
//! │                       ADVISOR CORE                             │
//! │  ┌───────────────────────────┴──────────────────────────────┐ │
//! │  │               ConversationOrchestrator                    │ │
//! │  │  ┌─────────┐  ┌───────────┐  ┌─────────┐  ┌────────────┐ │ │
//! │  │  │ Session │  │ Portfolio │  │ Advice  │  │ Inference  │ │ │
//! │  │  │         │  │ Aggregator│  │ (LLM)   │  │ (agent)    │ │ │
//! │  │  └─────────┘  └───────────┘  └─────────┘  └────────────┘ │ │
//! │  └──────────────────────────────────────────────────────────┘ │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`ConversationOrchestrator`]: Classifies input and runs the flows
//! - [`SurfaceMessage`]: Messages sent from the orchestrator to UI surfaces
//! - [`SurfaceEvent`]: Events sent from UI surfaces to the orchestrator
//! - [`Session`]: Append-only conversation history
//! - [`PortfolioAggregator`]: Three-category token transfer lookup
//!
//! # Quick Start
//!
//! ```ignore
//! use advisor_core::{load_config, ConversationOrchestrator, SurfaceEvent};
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let (tx, mut rx) = mpsc::unbounded_channel();
//!
//!     let config = load_config()?;
//!     let mut orchestrator = ConversationOrchestrator::from_config(&config, tx)?;
//!     orchestrator.start().await?;
//!
//!     orchestrator
//!         .handle_event(SurfaceEvent::user_message("hello"))
//!         .await?;
//!
//!     while let Some(msg) = rx.recv().await {
//!         // Render message to UI
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`address`]: Wallet address classification and checksums
//! - [`advice`]: Investment advice through a completion backend
//! - [`backend`]: Completion and agent endpoint abstraction
//! - [`config`]: Layered configuration (defaults, TOML, env, CLI)
//! - [`events`]: Events from UI surfaces
//! - [`inference`]: Prediction-market inference
//! - [`messages`]: Messages to UI surfaces
//! - [`orchestrator`]: Main orchestrator
//! - [`portfolio`]: Token transfer lookup and aggregation
//! - [`replies`]: Canned keyword replies
//! - [`session`]: Conversation session state
//! - [`topics`]: Prediction topic catalog
//! - [`trending`]: Trending tags and the social post side action
//!
//! # No UI Dependencies
//!
//! This crate has **zero** dependencies on any terminal or UI framework.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod address;
pub mod advice;
pub mod backend;
pub mod config;
pub mod error;
pub mod events;
pub mod inference;
pub mod messages;
pub mod orchestrator;
pub mod portfolio;
pub mod replies;
pub mod session;
pub mod topics;
pub mod trending;

// Re-exports for convenience
pub use address::{classify, is_valid_address, to_checksum_address, AddressClass};
pub use advice::{AdviceConfig, AdviceFetcher};
pub use backend::{
    AgentAction, AgentBackend, CompletionBackend, CompletionRequest, CompletionResponse,
    HttpAgentBackend, OpenAiCompatBackend,
};
pub use error::{FlowError, TransferError};
pub use events::SurfaceEvent;
pub use inference::InferenceFetcher;
pub use messages::{MessageId, MessageRole, SessionId, SurfaceMessage};
pub use orchestrator::{
    ConversationOrchestrator, OrchestratorConfig, PortfolioPolicy, Submission,
};
pub use portfolio::{
    AggregatorConfig, ExplorerClient, PortfolioAggregator, PortfolioSummary, TransferCategory,
    TransferProvider, TransferQuery, TransferRecord,
};
pub use replies::{ReplyRule, ReplyRules};
pub use session::{ChatMessage, Session, SessionHandle, TypingGuard};
pub use topics::{PredictionTopic, TopicCatalog};
pub use trending::{HttpTrendingSource, SocialPoster, TrendingSource, TrendingTags};

// Config exports
pub use config::{
    default_config_path, load_config, load_config_from_path, AdvisorConfig, AdvisorToml,
    ConfigError, ConfigOverrides, ConfigSource,
};
