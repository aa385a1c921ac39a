//! Session State
//!
//! The one piece of shared mutable state in a conversation: the append-only
//! message history, the active address, the typing counter and the trending
//! tags.
//!
//! # Design Philosophy
//!
//! Flows run as independent tasks and all of them write here. [`SessionHandle`]
//! pairs every mutation with its surface notification under a single lock
//! acquisition, so a surface sees messages in exactly history order and no
//! append is lost when flows finish at the same time.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::messages::{MessageId, MessageRole, SessionId, SurfaceMessage};
use crate::trending::TrendingTags;

/// A message in the conversation history
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique message ID
    pub id: MessageId,
    /// Who sent this message
    pub role: MessageRole,
    /// Message content
    pub content: String,
    /// When the message was appended
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Create a new message
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    fn to_surface(&self) -> SurfaceMessage {
        SurfaceMessage::Message {
            id: self.id.clone(),
            role: self.role,
            content: self.content.clone(),
        }
    }
}

/// Conversation session
///
/// History only grows: there is no way to edit, reorder or remove a message.
#[derive(Debug)]
pub struct Session {
    /// Unique session ID
    pub id: SessionId,
    messages: Vec<ChatMessage>,
    active_address: Option<String>,
    typing: usize,
    trending: TrendingTags,
}

impl Session {
    /// Create an empty session
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: SessionId::new(),
            messages: Vec::new(),
            active_address: None,
            typing: 0,
            trending: TrendingTags::new(),
        }
    }

    /// Append a message and return it
    pub fn append(&mut self, role: MessageRole, content: impl Into<String>) -> &ChatMessage {
        self.messages.push(ChatMessage::new(role, content));
        let index = self.messages.len() - 1;
        &self.messages[index]
    }

    /// All messages, oldest first
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Get message by ID
    #[must_use]
    pub fn get_message(&self, id: &MessageId) -> Option<&ChatMessage> {
        self.messages.iter().find(|m| &m.id == id)
    }

    /// Number of messages
    #[must_use]
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Replace the active address
    pub fn set_active_address(&mut self, address: impl Into<String>) {
        self.active_address = Some(address.into());
    }

    /// Address of the most recent valid submission
    #[must_use]
    pub fn active_address(&self) -> Option<&str> {
        self.active_address.as_deref()
    }

    /// Register a typing flow; returns `true` on the 0→1 transition
    pub fn begin_typing(&mut self) -> bool {
        self.typing += 1;
        self.typing == 1
    }

    /// Release a typing flow; returns `true` on the 1→0 transition
    pub fn end_typing(&mut self) -> bool {
        if self.typing == 0 {
            return false;
        }
        self.typing -= 1;
        self.typing == 0
    }

    /// Whether at least one typing flow is in flight
    #[must_use]
    pub fn is_typing(&self) -> bool {
        self.typing > 0
    }

    /// Trending tags seen this session
    #[must_use]
    pub fn trending(&self) -> &TrendingTags {
        &self.trending
    }

    /// Mutable trending tags
    pub fn trending_mut(&mut self) -> &mut TrendingTags {
        &mut self.trending
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared session plus the channel to the surface
#[derive(Clone, Debug)]
pub struct SessionHandle {
    session: Arc<Mutex<Session>>,
    tx: mpsc::UnboundedSender<SurfaceMessage>,
}

impl SessionHandle {
    /// Wrap a session
    pub fn new(session: Session, tx: mpsc::UnboundedSender<SurfaceMessage>) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            tx,
        }
    }

    /// Send to the surface; a closed surface is not an error
    fn notify(&self, message: SurfaceMessage) {
        if self.tx.send(message).is_err() {
            tracing::trace!("Surface channel closed, dropping message");
        }
    }

    /// Send a message that does not touch history
    pub fn send(&self, message: SurfaceMessage) {
        self.notify(message);
    }

    /// Append a message and notify the surface atomically
    pub fn append(&self, role: MessageRole, content: impl Into<String>) -> MessageId {
        let mut session = self.session.lock();
        let message = session.append(role, content);
        let id = message.id.clone();
        self.notify(message.to_surface());
        id
    }

    /// Append an assistant message
    pub fn append_assistant(&self, content: impl Into<String>) -> MessageId {
        self.append(MessageRole::Assistant, content)
    }

    /// Enter typing until the returned guard drops
    #[must_use = "typing ends when the guard is dropped"]
    pub fn begin_typing(&self) -> TypingGuard {
        let mut session = self.session.lock();
        if session.begin_typing() {
            self.notify(SurfaceMessage::Typing { active: true });
        }
        TypingGuard {
            handle: self.clone(),
        }
    }

    fn end_typing(&self) {
        let mut session = self.session.lock();
        if session.end_typing() {
            self.notify(SurfaceMessage::Typing { active: false });
        }
    }

    /// Replace the active address
    pub fn set_active_address(&self, address: impl Into<String>) {
        self.session.lock().set_active_address(address);
    }

    /// Address of the most recent valid submission
    #[must_use]
    pub fn active_address(&self) -> Option<String> {
        self.session.lock().active_address().map(String::from)
    }

    /// Whether at least one typing flow is in flight
    #[must_use]
    pub fn is_typing(&self) -> bool {
        self.session.lock().is_typing()
    }

    /// Snapshot of the history
    #[must_use]
    pub fn history(&self) -> Vec<ChatMessage> {
        self.session.lock().messages().to_vec()
    }

    /// Merge trending labels; publishes the full set when anything was new
    pub fn merge_trending<I, S>(&self, labels: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut session = self.session.lock();
        let added = session.trending_mut().merge(labels);
        if added > 0 {
            self.notify(SurfaceMessage::TrendingTags {
                tags: session.trending().labels().to_vec(),
            });
        }
        added
    }

    /// Trending labels in first-seen order
    #[must_use]
    pub fn trending_tags(&self) -> Vec<String> {
        self.session.lock().trending().labels().to_vec()
    }

    /// Session ID
    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.session.lock().id.clone()
    }
}

/// Holds the typing indicator on while alive
///
/// Dropping the guard (including when its task is aborted) releases the hold.
#[derive(Debug)]
pub struct TypingGuard {
    handle: SessionHandle,
}

impl Drop for TypingGuard {
    fn drop(&mut self) {
        self.handle.end_typing();
    }
}
