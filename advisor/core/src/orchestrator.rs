//! Conversation Orchestrator
//!
//! The orchestrator is the core of the advisor. It:
//! - Classifies every submission and picks a flow
//! - Runs portfolio, reply and inference flows as independent tasks
//! - Appends every result to the session history
//! - Publishes reference data (trending tags, prediction topics)
//!
//! # Design Philosophy
//!
//! The orchestrator is UI-agnostic. It communicates through:
//! - [`SurfaceMessage`]: what the surface should show
//! - [`SurfaceEvent`]: what the user did
//!
//! # Flows
//!
//! Each submission appends the user's message first, then:
//!
//! - **Address**: typing on, aggregate three categories, append one line per
//!   non-empty category, ask for advice about the combined names, typing off.
//! - **Malformed address**: append the rejection, nothing else.
//! - **Anything else**: typing on, wait the reply delay, append the canned
//!   reply, typing off.
//!
//! Flows overlap freely. Results are appended in completion order; only each
//! flow's own steps are ordered.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::{AbortHandle, JoinSet};

use crate::address::{classify, AddressClass};
use crate::advice::AdviceFetcher;
use crate::backend::{HttpAgentBackend, OpenAiCompatBackend};
use crate::config::AdvisorConfig;
use crate::events::SurfaceEvent;
use crate::inference::InferenceFetcher;
use crate::messages::{MessageRole, SessionId, SurfaceMessage};
use crate::portfolio::{ExplorerClient, PortfolioAggregator};
use crate::replies::ReplyRules;
use crate::session::{ChatMessage, Session, SessionHandle, TypingGuard};
use crate::topics::{TopicCatalog, DEFAULT_TOPIC_CUTOFF};
use crate::trending::{HttpTrendingSource, SocialPoster, TrendingSource};

/// Appended when address-like text fails validation
pub const INVALID_ADDRESS_MESSAGE: &str = "Invalid wallet address. Please enter a valid address.";

/// Appended when the portfolio lookup fails
pub const PORTFOLIO_FAILURE_MESSAGE: &str = "Failed to fetch portfolio data. Please try again.";

/// Appended when the user quits
pub const GOODBYE_MESSAGE: &str = "Goodbye! Have a great day!";

/// What happens to a pending portfolio lookup when a new address arrives
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PortfolioPolicy {
    /// Earlier lookups keep running and append their results
    #[default]
    Concurrent,
    /// A new address aborts the previous lookup
    ///
    /// Whatever the aborted flow already appended stays; nothing more is
    /// appended and its typing hold is released.
    Supersede,
}

/// Orchestrator configuration
#[derive(Clone, Debug, PartialEq)]
pub struct OrchestratorConfig {
    /// Delay before a canned reply is appended
    pub reply_delay: Duration,
    /// Overlapping portfolio lookups
    pub policy: PortfolioPolicy,
    /// Post trending tags after a successful lookup
    pub social_post: bool,
    /// Prediction topics below this id are offered
    pub topic_cutoff: u32,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            reply_delay: Duration::from_millis(1000),
            policy: PortfolioPolicy::Concurrent,
            social_post: false,
            topic_cutoff: DEFAULT_TOPIC_CUTOFF,
        }
    }
}

/// Which flow a submission started
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Submission {
    /// Blank input; nothing happened
    Ignored,
    /// Canned reply scheduled
    Reply,
    /// Rejection appended
    Rejected,
    /// Portfolio lookup started
    Portfolio,
}

/// The conversation orchestrator - headless core
pub struct ConversationOrchestrator {
    /// Configuration
    config: OrchestratorConfig,
    /// Canned replies
    rules: Arc<ReplyRules>,
    /// Portfolio aggregation
    aggregator: PortfolioAggregator,
    /// Advice
    advice: AdviceFetcher,
    /// Prediction inference
    inference: InferenceFetcher,
    /// Trending tag source (loaded once in `start`)
    trending: Option<Arc<dyn TrendingSource>>,
    /// Social post side action
    social: Option<SocialPoster>,
    /// Prediction topics
    topics: TopicCatalog,
    /// Shared session and surface channel
    session: SessionHandle,
    /// In-flight flows
    flows: JoinSet<()>,
    /// Most recent portfolio flow
    pending_portfolio: Option<AbortHandle>,
    /// Whether `start` already ran
    started: bool,
}

impl ConversationOrchestrator {
    /// Create an orchestrator over the given services
    pub fn new(
        aggregator: PortfolioAggregator,
        advice: AdviceFetcher,
        inference: InferenceFetcher,
        config: OrchestratorConfig,
        tx: mpsc::UnboundedSender<SurfaceMessage>,
    ) -> Self {
        let topics = TopicCatalog::load(config.topic_cutoff);
        Self {
            config,
            rules: Arc::new(ReplyRules::default()),
            aggregator,
            advice,
            inference,
            trending: None,
            social: None,
            topics,
            session: SessionHandle::new(Session::new(), tx),
            flows: JoinSet::new(),
            pending_portfolio: None,
            started: false,
        }
    }

    /// Build every HTTP client from a resolved configuration
    ///
    /// # Errors
    ///
    /// Fails if an HTTP client cannot be constructed.
    pub fn from_config(
        config: &AdvisorConfig,
        tx: mpsc::UnboundedSender<SurfaceMessage>,
    ) -> anyhow::Result<Self> {
        let timeout = config.http_timeout;

        let explorer = ExplorerClient::new(
            config.explorer_url.clone(),
            config.explorer_api_key.clone(),
            timeout,
        )?;
        let completion = OpenAiCompatBackend::new(
            config.completion_url.clone(),
            config.completion_api_key.clone(),
            timeout,
        )?;
        let agent = Arc::new(HttpAgentBackend::new(config.agent_url.clone(), timeout)?);

        let mut orchestrator = Self::new(
            PortfolioAggregator::new(Arc::new(explorer), config.aggregator_config()),
            AdviceFetcher::new(Arc::new(completion), config.advice_config()),
            InferenceFetcher::new(agent.clone()),
            config.orchestrator_config(),
            tx,
        )
        .with_social_poster(SocialPoster::new(agent));

        if config.trending_enabled {
            let source = HttpTrendingSource::new(config.trending_url.clone(), timeout)?;
            orchestrator = orchestrator.with_trending_source(Arc::new(source));
        }

        Ok(orchestrator)
    }

    /// Load trending tags from `source` in [`start`](Self::start)
    #[must_use]
    pub fn with_trending_source(mut self, source: Arc<dyn TrendingSource>) -> Self {
        self.trending = Some(source);
        self
    }

    /// Use `poster` for the social side action (only when enabled in config)
    #[must_use]
    pub fn with_social_poster(mut self, poster: SocialPoster) -> Self {
        self.social = Some(poster);
        self
    }

    /// Replace the canned-reply rules
    #[must_use]
    pub fn with_rules(mut self, rules: ReplyRules) -> Self {
        self.rules = Arc::new(rules);
        self
    }

    /// Get the session ID
    pub fn session_id(&self) -> SessionId {
        self.session.session_id()
    }

    /// Configuration
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Prediction topics on offer
    pub fn topics(&self) -> &TopicCatalog {
        &self.topics
    }

    /// Snapshot of the history
    pub fn history(&self) -> Vec<ChatMessage> {
        self.session.history()
    }

    /// Address of the most recent valid submission
    pub fn active_address(&self) -> Option<String> {
        self.session.active_address()
    }

    /// Whether any typing flow is in flight
    pub fn is_typing(&self) -> bool {
        self.session.is_typing()
    }

    /// Trending tags known to this session
    pub fn trending_tags(&self) -> Vec<String> {
        self.session.trending_tags()
    }

    /// Number of flows not yet reaped
    pub fn in_flight(&self) -> usize {
        self.flows.len()
    }

    /// Load trending tags once and publish reference data
    ///
    /// A trending-store failure is logged; the session carries on without tags.
    ///
    /// # Errors
    ///
    /// Currently infallible; the signature leaves room for start-up checks.
    pub async fn start(&mut self) -> anyhow::Result<()> {
        if self.started {
            tracing::debug!("Orchestrator already started");
            return Ok(());
        }
        self.started = true;

        if let Some(ref source) = self.trending {
            match source.fetch_tags().await {
                Ok(tags) => {
                    let added = self.session.merge_trending(&tags);
                    tracing::info!(source = source.name(), added, "Trending tags loaded");
                }
                Err(e) => {
                    tracing::warn!(
                        source = source.name(),
                        error = %format!("{e:#}"),
                        "Failed to load trending tags"
                    );
                }
            }
        }

        self.session.send(SurfaceMessage::TrendingTags {
            tags: self.session.trending_tags(),
        });
        self.session.send(SurfaceMessage::Topics {
            topics: self.topics.topics().to_vec(),
        });

        tracing::info!(
            session = %self.session.session_id().0,
            topics = self.topics.len(),
            policy = ?self.config.policy,
            "Orchestrator started"
        );
        Ok(())
    }

    /// Handle an event from the UI surface
    ///
    /// # Errors
    ///
    /// Currently infallible; surfaces treat an error as fatal.
    pub async fn handle_event(&mut self, event: SurfaceEvent) -> anyhow::Result<()> {
        match event {
            SurfaceEvent::UserMessage { content } => {
                self.submit(&content);
            }
            SurfaceEvent::TagSelected { label } => {
                tracing::debug!(label = %label, "Trending tag selected");
                self.submit(&label);
            }
            SurfaceEvent::TopicSelected { topic_id } => {
                self.select_topic(topic_id);
            }
            SurfaceEvent::QuitRequested => {
                self.drain().await;
                self.session.send(SurfaceMessage::Quit {
                    message: Some(GOODBYE_MESSAGE.to_string()),
                });
            }
        }
        Ok(())
    }

    /// Submit user text
    ///
    /// Appends the user message, classifies it and starts the matching flow
    /// without waiting for it.
    pub fn submit(&mut self, text: &str) -> Submission {
        self.reap_finished();

        if text.trim().is_empty() {
            tracing::debug!("Ignoring blank submission");
            return Submission::Ignored;
        }

        self.session.append(MessageRole::User, text);

        match classify(text) {
            AddressClass::Valid => {
                let address = text.trim().to_string();
                self.start_portfolio_flow(address);
                Submission::Portfolio
            }
            AddressClass::MalformedLooksLikeAddress => {
                tracing::debug!("Rejecting malformed address");
                self.session.append_assistant(INVALID_ADDRESS_MESSAGE);
                Submission::Rejected
            }
            AddressClass::Ordinary => {
                self.start_reply_flow(text);
                Submission::Reply
            }
        }
    }

    /// Fetch the inference for a prediction topic
    ///
    /// No user message, no typing, no delay.
    pub fn select_topic(&mut self, topic_id: u32) {
        self.reap_finished();

        match self.topics.get(topic_id) {
            Some(topic) => tracing::info!(topic = %topic, "Prediction topic selected"),
            None => tracing::debug!(topic_id, "Topic not in catalog, requesting anyway"),
        }

        let inference = self.inference.clone();
        let session = self.session.clone();
        self.flows.spawn(async move {
            let text = inference.fetch_inference(topic_id).await;
            session.append_assistant(text);
        });
    }

    /// Wait for every in-flight flow to finish
    pub async fn drain(&mut self) {
        while let Some(result) = self.flows.join_next().await {
            log_flow_result(result);
        }
        self.pending_portfolio = None;
    }

    fn start_reply_flow(&mut self, text: &str) {
        let typing = self.session.begin_typing();
        let reply = self.rules.respond(text);
        let delay = self.config.reply_delay;
        let session = self.session.clone();

        self.flows.spawn(async move {
            tokio::time::sleep(delay).await;
            session.append_assistant(reply);
            drop(typing);
        });
    }

    fn start_portfolio_flow(&mut self, address: String) {
        tracing::info!(address = %address, "Wallet address detected");
        self.session.set_active_address(address.clone());

        // Take the new typing hold before releasing any superseded one
        let typing = self.session.begin_typing();

        if self.config.policy == PortfolioPolicy::Supersede {
            if let Some(previous) = self.pending_portfolio.take() {
                if !previous.is_finished() {
                    tracing::info!("Superseding pending portfolio lookup");
                    previous.abort();
                }
            }
        }

        let flow = PortfolioFlow {
            session: self.session.clone(),
            aggregator: self.aggregator.clone(),
            advice: self.advice.clone(),
            social: self
                .social
                .clone()
                .filter(|_| self.config.social_post),
        };
        let handle = self.flows.spawn(flow.run(address, typing));
        self.pending_portfolio = Some(handle);
    }

    /// Reap finished flows without waiting
    fn reap_finished(&mut self) {
        while let Some(result) = self.flows.try_join_next() {
            log_flow_result(result);
        }
    }
}

fn log_flow_result(result: Result<(), tokio::task::JoinError>) {
    match result {
        Ok(()) => {}
        Err(e) if e.is_cancelled() => tracing::debug!("Flow cancelled"),
        Err(e) => tracing::error!(error = %e, "Flow panicked"),
    }
}

/// Everything one portfolio lookup needs, detached from the orchestrator
struct PortfolioFlow {
    session: SessionHandle,
    aggregator: PortfolioAggregator,
    advice: AdviceFetcher,
    social: Option<SocialPoster>,
}

impl PortfolioFlow {
    async fn run(self, address: String, typing: TypingGuard) {
        match self.aggregator.aggregate(&address).await {
            Ok(summary) => {
                for line in summary.summary_lines() {
                    self.session.append_assistant(line);
                }

                if let Some(ref social) = self.social {
                    let tags = self.session.trending_tags();
                    if !tags.is_empty() {
                        social.spawn_post(tags);
                    }
                }

                let tokens = summary.all_tokens();
                if !tokens.is_empty() {
                    let advice = self.advice.fetch_advice(&tokens).await;
                    self.session.append_assistant(advice);
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Portfolio lookup failed");
                self.session.append_assistant(PORTFOLIO_FAILURE_MESSAGE);
            }
        }
        drop(typing);
    }
}
