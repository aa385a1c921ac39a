//! TOML Configuration File Support
//!
//! Centralised configuration loading for the advisor, with an optional TOML
//! file at `~/.config/wallet-advisor/advisor.toml`.
//!
//! # Configuration Priority
//!
//! Configuration values are loaded with the following priority (highest first):
//! 1. CLI arguments ([`ConfigOverrides`])
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! [explorer]
//! url = "https://api.sonicscan.org/api"
//! api_key = "..."
//! page_size = 10
//! name_cap = 3
//!
//! [completion]
//! url = "http://localhost:8000/v1/chat/completions"
//! max_tokens = 1024
//! temperature = 0.7
//!
//! [agent]
//! url = "http://localhost:8000/agent/action"
//!
//! [trending]
//! url = "http://localhost:8000/redis/tokens"
//! enabled = true
//!
//! [conversation]
//! reply_delay_ms = 1000
//! topic_cutoff = 30
//! supersede = false
//!
//! [http]
//! timeout_secs = 30
//!
//! [social]
//! enabled = false
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::advice::AdviceConfig;
use crate::backend::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
use crate::orchestrator::{OrchestratorConfig, PortfolioPolicy};
use crate::portfolio::AggregatorConfig;
use crate::topics::DEFAULT_TOPIC_CUTOFF;

/// Default explorer API
pub const DEFAULT_EXPLORER_URL: &str = "https://api.sonicscan.org/api";
/// Default chat-completions endpoint
pub const DEFAULT_COMPLETION_URL: &str = "http://localhost:8000/v1/chat/completions";
/// Default agent action endpoint
pub const DEFAULT_AGENT_URL: &str = "http://localhost:8000/agent/action";
/// Default trending-tag store
pub const DEFAULT_TRENDING_URL: &str = "http://localhost:8000/redis/tokens";

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// `[explorer]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerToml {
    /// Explorer API base URL
    pub url: Option<String>,
    /// Explorer API key
    pub api_key: Option<String>,
    /// Records requested per category
    pub page_size: Option<u32>,
    /// Names kept per category
    pub name_cap: Option<usize>,
}

/// `[completion]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionToml {
    /// Chat-completions URL
    pub url: Option<String>,
    /// Bearer token
    pub api_key: Option<String>,
    /// Model name
    pub model: Option<String>,
    /// Maximum tokens in the advice
    pub max_tokens: Option<u32>,
    /// Sampling temperature
    pub temperature: Option<f32>,
}

/// `[agent]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentToml {
    /// Agent action URL
    pub url: Option<String>,
}

/// `[trending]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendingToml {
    /// Trending store URL
    pub url: Option<String>,
    /// Whether to load tags at start
    pub enabled: Option<bool>,
}

/// `[conversation]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationToml {
    /// Delay before canned replies, in milliseconds
    pub reply_delay_ms: Option<u64>,
    /// Prediction topics below this id are offered
    pub topic_cutoff: Option<u32>,
    /// Abort the pending portfolio lookup when a new address arrives
    pub supersede: Option<bool>,
}

/// `[http]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpToml {
    /// Per-call timeout in seconds (0 = none)
    pub timeout_secs: Option<u64>,
}

/// `[social]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialToml {
    /// Post trending tags after a successful portfolio lookup
    pub enabled: Option<bool>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorToml {
    /// Explorer section
    pub explorer: ExplorerToml,
    /// Completion section
    pub completion: CompletionToml,
    /// Agent section
    pub agent: AgentToml,
    /// Trending section
    pub trending: TrendingToml,
    /// Conversation section
    pub conversation: ConversationToml,
    /// HTTP section
    pub http: HttpToml,
    /// Social section
    pub social: SocialToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Resolved advisor configuration
#[derive(Clone)]
pub struct AdvisorConfig {
    /// Explorer API base URL
    pub explorer_url: String,
    /// Explorer API key
    pub explorer_api_key: Option<String>,
    /// Records requested per category
    pub page_size: u32,
    /// Names kept per category
    pub name_cap: usize,

    /// Chat-completions URL
    pub completion_url: String,
    /// Bearer token for the completion endpoint
    pub completion_api_key: Option<String>,
    /// Model name sent with advice requests
    pub completion_model: Option<String>,
    /// Maximum tokens in the advice
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,

    /// Agent action URL
    pub agent_url: String,

    /// Trending store URL
    pub trending_url: String,
    /// Whether trending tags are loaded at start
    pub trending_enabled: bool,

    /// Delay before canned replies
    pub reply_delay: Duration,
    /// Prediction topics below this id are offered
    pub topic_cutoff: u32,
    /// Abort the pending portfolio lookup on a new address
    pub supersede: bool,

    /// Per-call HTTP timeout (`None` = no timeout)
    pub http_timeout: Option<Duration>,

    /// Post trending tags after a successful portfolio lookup
    pub social_post: bool,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    /// Source of configuration values
    source: ConfigSource,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        let aggregator = AggregatorConfig::default();
        Self {
            explorer_url: DEFAULT_EXPLORER_URL.to_string(),
            explorer_api_key: None,
            page_size: aggregator.page_size,
            name_cap: aggregator.name_cap,
            completion_url: DEFAULT_COMPLETION_URL.to_string(),
            completion_api_key: None,
            completion_model: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            agent_url: DEFAULT_AGENT_URL.to_string(),
            trending_url: DEFAULT_TRENDING_URL.to_string(),
            trending_enabled: true,
            reply_delay: Duration::from_millis(1000),
            topic_cutoff: DEFAULT_TOPIC_CUTOFF,
            supersede: false,
            http_timeout: Some(Duration::from_secs(30)),
            social_post: false,
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

// API keys are shown only as set/unset
impl std::fmt::Debug for AdvisorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdvisorConfig")
            .field("explorer_url", &self.explorer_url)
            .field("explorer_api_key", &self.explorer_api_key.as_ref().map(|_| "***"))
            .field("page_size", &self.page_size)
            .field("name_cap", &self.name_cap)
            .field("completion_url", &self.completion_url)
            .field("completion_api_key", &self.completion_api_key.as_ref().map(|_| "***"))
            .field("completion_model", &self.completion_model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("agent_url", &self.agent_url)
            .field("trending_url", &self.trending_url)
            .field("trending_enabled", &self.trending_enabled)
            .field("reply_delay", &self.reply_delay)
            .field("topic_cutoff", &self.topic_cutoff)
            .field("supersede", &self.supersede)
            .field("http_timeout", &self.http_timeout)
            .field("social_post", &self.social_post)
            .field("config_file_path", &self.config_file_path)
            .field("source", &self.source)
            .finish()
    }
}

impl AdvisorConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Set the configuration source
    pub fn set_source(&mut self, source: ConfigSource) {
        self.source = source;
    }

    /// Reject values no flow can work with
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] naming the offending value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::ValidationError(
                "explorer.page_size must be at least 1".to_string(),
            ));
        }
        if self.name_cap == 0 {
            return Err(ConfigError::ValidationError(
                "explorer.name_cap must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(ConfigError::ValidationError(format!(
                "completion.temperature out of range: {}",
                self.temperature
            )));
        }
        for (name, url) in [
            ("explorer.url", &self.explorer_url),
            ("completion.url", &self.completion_url),
            ("agent.url", &self.agent_url),
        ] {
            if url.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!("{name} is empty")));
            }
        }
        Ok(())
    }

    /// Aggregation parameters
    #[must_use]
    pub fn aggregator_config(&self) -> AggregatorConfig {
        AggregatorConfig {
            page_size: self.page_size,
            name_cap: self.name_cap,
            ..Default::default()
        }
    }

    /// Advice request parameters
    #[must_use]
    pub fn advice_config(&self) -> AdviceConfig {
        AdviceConfig {
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            model: self.completion_model.clone(),
        }
    }

    /// Orchestrator behaviour
    #[must_use]
    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            reply_delay: self.reply_delay,
            policy: if self.supersede {
                PortfolioPolicy::Supersede
            } else {
                PortfolioPolicy::Concurrent
            },
            social_post: self.social_post,
            topic_cutoff: self.topic_cutoff,
        }
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/wallet-advisor/advisor.toml` or
/// `~/.config/wallet-advisor/advisor.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("wallet-advisor").join("advisor.toml"))
}

/// Load configuration from the default path and the process environment
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed, or the
/// result fails validation. A missing config file is not an error.
pub fn load_config() -> Result<AdvisorConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path and the process environment
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed, or
/// the result fails validation.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<AdvisorConfig, ConfigError> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// Load configuration with an explicit environment lookup
///
/// # Errors
///
/// Same as [`load_config_from_path`].
pub fn load_config_with_env<F>(path: Option<PathBuf>, env: F) -> Result<AdvisorConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = AdvisorConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: AdvisorToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config, env);
    config.validate()?;

    tracing::debug!(
        source = %config.source,
        explorer_url = %config.explorer_url,
        api_key_set = config.explorer_api_key.is_some(),
        "Configuration resolved"
    );

    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut AdvisorConfig, toml: &AdvisorToml) {
    // Explorer
    if let Some(ref url) = toml.explorer.url {
        config.explorer_url = url.clone();
    }
    if toml.explorer.api_key.is_some() {
        config.explorer_api_key = toml.explorer.api_key.clone();
    }
    if let Some(size) = toml.explorer.page_size {
        config.page_size = size;
    }
    if let Some(cap) = toml.explorer.name_cap {
        config.name_cap = cap;
    }

    // Completion
    if let Some(ref url) = toml.completion.url {
        config.completion_url = url.clone();
    }
    if toml.completion.api_key.is_some() {
        config.completion_api_key = toml.completion.api_key.clone();
    }
    if toml.completion.model.is_some() {
        config.completion_model = toml.completion.model.clone();
    }
    if let Some(max_tokens) = toml.completion.max_tokens {
        config.max_tokens = max_tokens;
    }
    if let Some(temperature) = toml.completion.temperature {
        config.temperature = temperature;
    }

    // Agent
    if let Some(ref url) = toml.agent.url {
        config.agent_url = url.clone();
    }

    // Trending
    if let Some(ref url) = toml.trending.url {
        config.trending_url = url.clone();
    }
    if let Some(enabled) = toml.trending.enabled {
        config.trending_enabled = enabled;
    }

    // Conversation
    if let Some(ms) = toml.conversation.reply_delay_ms {
        config.reply_delay = Duration::from_millis(ms);
    }
    if let Some(cutoff) = toml.conversation.topic_cutoff {
        config.topic_cutoff = cutoff;
    }
    if let Some(supersede) = toml.conversation.supersede {
        config.supersede = supersede;
    }

    // HTTP
    if let Some(secs) = toml.http.timeout_secs {
        config.http_timeout = timeout_from_secs(secs);
    }

    // Social
    if let Some(enabled) = toml.social.enabled {
        config.social_post = enabled;
    }
}

fn timeout_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

fn parse_flag(value: &str) -> bool {
    value != "0" && value.to_lowercase() != "false"
}

/// Apply environment variable overrides to the config
fn apply_env_config<F>(config: &mut AdvisorConfig, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(key) = env("SONICSCAN_API_KEY") {
        config.explorer_api_key = Some(key);
        config.source = ConfigSource::Env;
    }
    if let Some(url) = env("ADVISOR_EXPLORER_URL") {
        config.explorer_url = url;
        config.source = ConfigSource::Env;
    }
    if let Some(url) = env("ADVISOR_COMPLETION_URL") {
        config.completion_url = url;
        config.source = ConfigSource::Env;
    }
    if let Some(url) = env("ADVISOR_AGENT_URL") {
        config.agent_url = url;
        config.source = ConfigSource::Env;
    }
    if let Some(url) = env("ADVISOR_TRENDING_URL") {
        config.trending_url = url;
        config.source = ConfigSource::Env;
    }
    if let Some(delay) = env("ADVISOR_REPLY_DELAY_MS") {
        if let Ok(ms) = delay.parse::<u64>() {
            config.reply_delay = Duration::from_millis(ms);
            config.source = ConfigSource::Env;
        }
    }
    if let Some(timeout) = env("ADVISOR_HTTP_TIMEOUT_SECS") {
        if let Ok(secs) = timeout.parse::<u64>() {
            config.http_timeout = timeout_from_secs(secs);
            config.source = ConfigSource::Env;
        }
    }
    if let Some(supersede) = env("ADVISOR_SUPERSEDE") {
        config.supersede = parse_flag(&supersede);
        config.source = ConfigSource::Env;
    }
    if let Some(social) = env("ADVISOR_SOCIAL_POST") {
        config.social_post = parse_flag(&social);
        config.source = ConfigSource::Env;
    }
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Builder for applying CLI overrides to configuration
///
/// Use this after [`load_config`] to apply command-line argument overrides.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Explorer URL override
    pub explorer_url: Option<String>,
    /// Completion URL override
    pub completion_url: Option<String>,
    /// Agent URL override
    pub agent_url: Option<String>,
    /// Trending URL override
    pub trending_url: Option<String>,
    /// Reply delay override (milliseconds)
    pub reply_delay_ms: Option<u64>,
    /// Supersede policy override
    pub supersede: Option<bool>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set explorer URL override
    #[must_use]
    pub fn with_explorer_url(mut self, url: String) -> Self {
        self.explorer_url = Some(url);
        self
    }

    /// Set completion URL override
    #[must_use]
    pub fn with_completion_url(mut self, url: String) -> Self {
        self.completion_url = Some(url);
        self
    }

    /// Set agent URL override
    #[must_use]
    pub fn with_agent_url(mut self, url: String) -> Self {
        self.agent_url = Some(url);
        self
    }

    /// Set trending URL override
    #[must_use]
    pub fn with_trending_url(mut self, url: String) -> Self {
        self.trending_url = Some(url);
        self
    }

    /// Set reply delay override
    #[must_use]
    pub fn with_reply_delay_ms(mut self, ms: u64) -> Self {
        self.reply_delay_ms = Some(ms);
        self
    }

    /// Set supersede override
    #[must_use]
    pub fn with_supersede(mut self, supersede: bool) -> Self {
        self.supersede = Some(supersede);
        self
    }

    fn is_empty(&self) -> bool {
        self.explorer_url.is_none()
            && self.completion_url.is_none()
            && self.agent_url.is_none()
            && self.trending_url.is_none()
            && self.reply_delay_ms.is_none()
            && self.supersede.is_none()
    }

    /// Apply overrides to a configuration
    pub fn apply(&self, config: &mut AdvisorConfig) {
        if !self.is_empty() {
            config.source = ConfigSource::Cli;
        }

        if let Some(ref url) = self.explorer_url {
            config.explorer_url = url.clone();
        }
        if let Some(ref url) = self.completion_url {
            config.completion_url = url.clone();
        }
        if let Some(ref url) = self.agent_url {
            config.agent_url = url.clone();
        }
        if let Some(ref url) = self.trending_url {
            config.trending_url = url.clone();
        }
        if let Some(ms) = self.reply_delay_ms {
            config.reply_delay = Duration::from_millis(ms);
        }
        if let Some(supersede) = self.supersede {
            config.supersede = supersede;
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
