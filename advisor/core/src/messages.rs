//! Orchestrator Messages
//!
//! Messages sent from the orchestrator to UI surfaces. A surface renders what
//! it is told: appended chat messages, the typing indicator, and the reference
//! data (trending tags, prediction topics) it offers as quick-select buttons.
//!
//! # Design Philosophy
//!
//! The orchestrator owns the conversation. Surfaces never mutate history; they
//! forward user actions as [`SurfaceEvent`](crate::events::SurfaceEvent)s and
//! redraw from the messages they receive here.

use serde::{Deserialize, Serialize};

use crate::topics::PredictionTopic;

/// Messages from the orchestrator to a UI surface
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SurfaceMessage {
    // ============================================
    // Conversation Messages
    // ============================================
    /// A message was appended to the history
    Message {
        /// Unique message ID for tracking
        id: MessageId,
        /// Who sent this message
        role: MessageRole,
        /// The message content
        content: String,
    },

    /// Typing indicator changed
    Typing {
        /// Whether at least one reply is still being prepared
        active: bool,
    },

    // ============================================
    // Reference Data
    // ============================================
    /// Trending tags known to this session (full set, in first-seen order)
    TrendingTags {
        /// Tag labels
        tags: Vec<String>,
    },

    /// Prediction topics available for inference
    Topics {
        /// Topics after the catalog filter
        topics: Vec<PredictionTopic>,
    },

    // ============================================
    // System Messages
    // ============================================
    /// Request surface to quit
    Quit {
        /// Optional goodbye message
        message: Option<String>,
    },
}

/// Message identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl MessageId {
    /// Generate a new unique message ID
    pub fn new() -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        Self(format!("msg_{id}"))
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Session identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    /// Generate a new random session ID
    pub fn new() -> Self {
        Self(format!("session_{}", uuid::Uuid::new_v4().simple()))
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Who sent a message
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageRole {
    /// User input
    User,
    /// The assistant (canned replies, portfolio summaries, advice, inferences)
    Assistant,
}

impl MessageRole {
    /// Short label used by text surfaces
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::User => "you",
            Self::Assistant => "advisor",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_id_unique() {
        let id1 = MessageId::new();
        let id2 = MessageId::new();
        assert_ne!(id1, id2);
        assert!(id1.0.starts_with("msg_"));
    }

    #[test]
    fn test_session_id_unique() {
        let id1 = SessionId::new();
        let id2 = SessionId::new();
        assert_ne!(id1, id2);
        assert!(id1.0.starts_with("session_"));
    }

    #[test]
    fn test_surface_message_serializes_with_variant_tag() {
        let msg = SurfaceMessage::Typing { active: true };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["Typing"]["active"], serde_json::json!(true));
    }
}
