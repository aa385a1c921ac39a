//! REPL line parsing
//!
//! Lines starting with `/` are commands; everything else is chat text.

use advisor_core::SurfaceEvent;

/// One line of terminal input
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Chat text (may be an address)
    Say(String),
    /// List the prediction topics
    Topics,
    /// Ask for the inference of a topic
    Topic(u32),
    /// Select a trending tag
    Tag(String),
    /// Drain and exit
    Quit,
    /// Show the command list
    Help,
    /// Blank line
    Empty,
    /// Unrecognised or malformed command
    Invalid(String),
}

/// Usage text for `/help`
pub const HELP: &str = "\
Commands:
  /topics          list prediction topics
  /topic <id>      fetch the inference for a topic
  /tag <label>     select a trending tag
  /quit            wait for pending replies and exit
Anything else is sent as a chat message; paste a wallet address to look it up.";

impl Command {
    /// Parse one input line
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Empty;
        }
        let Some(rest) = line.strip_prefix('/') else {
            return Self::Say(line.to_string());
        };

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };

        match name {
            "topics" => Self::Topics,
            "topic" => match arg.parse() {
                Ok(id) => Self::Topic(id),
                Err(_) => Self::Invalid(format!("expected a topic id, got {arg:?}")),
            },
            "tag" if !arg.is_empty() => Self::Tag(arg.to_string()),
            "tag" => Self::Invalid("expected a tag label".to_string()),
            "quit" | "exit" => Self::Quit,
            "help" => Self::Help,
            other => Self::Invalid(format!("unknown command /{other}")),
        }
    }

    /// The orchestrator event this line maps to, if any
    pub fn to_event(&self) -> Option<SurfaceEvent> {
        match self {
            Self::Say(text) => Some(SurfaceEvent::user_message(text.clone())),
            Self::Topic(topic_id) => Some(SurfaceEvent::TopicSelected {
                topic_id: *topic_id,
            }),
            Self::Tag(label) => Some(SurfaceEvent::TagSelected {
                label: label.clone(),
            }),
            Self::Quit => Some(SurfaceEvent::QuitRequested),
            Self::Topics | Self::Help | Self::Empty | Self::Invalid(_) => None,
        }
    }
}
