//! Advisor - Terminal Surface for wallet-advisor
//!
//! A line-oriented chat client over the headless orchestration core. Type a
//! message, paste a wallet address, or use one of the slash commands.
//!
//! # Usage
//!
//! ```bash
//! # Start with defaults
//! advisor
//!
//! # With config file
//! advisor --config ~/.config/wallet-advisor/advisor.toml
//!
//! # Local endpoints, no artificial reply delay
//! advisor --completion-url http://localhost:9000/v1/chat/completions --reply-delay-ms 0
//!
//! # Verbose logging
//! RUST_LOG=debug advisor
//! ```
//!
//! Logs go to stderr; chat goes to stdout.

mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info};

use advisor_core::{
    load_config_from_path, ConfigOverrides, ConversationOrchestrator, MessageRole, SurfaceEvent,
    SurfaceMessage,
};

use commands::{Command, HELP};

/// Advisor - wallet portfolio chat in the terminal
#[derive(Parser, Debug)]
#[command(name = "advisor")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long, env = "ADVISOR_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Transfer explorer API URL
    #[arg(long, value_name = "URL")]
    explorer_url: Option<String>,

    /// Chat-completions endpoint URL
    #[arg(long, value_name = "URL")]
    completion_url: Option<String>,

    /// Agent-action endpoint URL
    #[arg(long, value_name = "URL")]
    agent_url: Option<String>,

    /// Trending-tag store URL
    #[arg(long, value_name = "URL")]
    trending_url: Option<String>,

    /// Delay before canned replies, in milliseconds
    #[arg(long, value_name = "MS")]
    reply_delay_ms: Option<u64>,

    /// Abort a pending portfolio lookup when a new address is submitted
    #[arg(long)]
    supersede: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, env = "ADVISOR_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        let mut overrides = ConfigOverrides::new();
        if let Some(ref url) = self.explorer_url {
            overrides = overrides.with_explorer_url(url.clone());
        }
        if let Some(ref url) = self.completion_url {
            overrides = overrides.with_completion_url(url.clone());
        }
        if let Some(ref url) = self.agent_url {
            overrides = overrides.with_agent_url(url.clone());
        }
        if let Some(ref url) = self.trending_url {
            overrides = overrides.with_trending_url(url.clone());
        }
        if let Some(ms) = self.reply_delay_ms {
            overrides = overrides.with_reply_delay_ms(ms);
        }
        if self.supersede {
            overrides = overrides.with_supersede(true);
        }
        overrides
    }
}

/// Initialize logging with the specified level
fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("advisor={level},advisor_core={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

/// Print one surface message; returns `false` once the session is over
fn render(message: &SurfaceMessage) -> bool {
    match message {
        // The user already sees what they typed
        SurfaceMessage::Message {
            role: MessageRole::User,
            ..
        } => {}
        SurfaceMessage::Message { role, content, .. } => {
            println!("{}: {content}", role.label());
        }
        SurfaceMessage::Typing { active: true } => println!("advisor is typing..."),
        SurfaceMessage::Typing { active: false } => {}
        SurfaceMessage::TrendingTags { tags } if !tags.is_empty() => {
            println!("Trending: {} (/tag <label>)", tags.join(", "));
        }
        SurfaceMessage::TrendingTags { .. } => {}
        SurfaceMessage::Topics { topics } => {
            println!("{} prediction topics available (/topics)", topics.len());
        }
        SurfaceMessage::Quit { message } => {
            if let Some(message) = message {
                println!("{message}");
            }
            return false;
        }
    }
    true
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level);

    info!("Advisor starting");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let mut config =
        load_config_from_path(args.config.clone()).context("Failed to load configuration")?;
    args.overrides().apply(&mut config);
    config
        .validate()
        .context("Invalid configuration after CLI overrides")?;

    info!(
        source = ?config.source(),
        explorer_url = %config.explorer_url,
        explorer_key_set = config.explorer_api_key.is_some(),
        completion_url = %config.completion_url,
        agent_url = %config.agent_url,
        supersede = config.supersede,
        "Configuration loaded"
    );

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut orchestrator = ConversationOrchestrator::from_config(&config, tx)
        .context("Failed to build orchestrator")?;

    let printer = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            if !render(&message) {
                break;
            }
        }
    });

    orchestrator.start().await?;
    println!("Type a message or paste a wallet address. /help for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read stdin")?,
            _ = tokio::signal::ctrl_c() => {
                info!("Received interrupt, shutting down");
                None
            }
        };

        // EOF and interrupts quit like /quit
        let command = line.map_or(Command::Quit, |line| Command::parse(&line));

        match command {
            Command::Empty => {}
            Command::Help => println!("{HELP}"),
            Command::Topics => {
                for topic in orchestrator.topics().topics() {
                    println!("  {topic}");
                }
            }
            Command::Invalid(reason) => println!("{reason}. /help for commands."),
            command => {
                let Some(event) = command.to_event() else {
                    continue;
                };
                let quitting = event == SurfaceEvent::QuitRequested;
                if let Err(e) = orchestrator.handle_event(event).await {
                    error!(error = %e, "Failed to handle input");
                }
                if quitting {
                    break;
                }
            }
        }
    }

    // Closing the channel lets the printer finish
    drop(orchestrator);
    if let Err(e) = printer.await {
        error!(error = %e, "Printer task failed");
    }

    info!("Advisor stopped");
    Ok(())
}
