//! Surface Events
//!
//! Events sent from UI surfaces to the orchestrator. Surfaces report what the
//! user did; the orchestrator decides what it means.

use serde::{Deserialize, Serialize};

/// Events from a UI surface to the orchestrator
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurfaceEvent {
    /// User submitted text from the input box
    UserMessage {
        /// Raw text as typed
        content: String,
    },

    /// User clicked a trending tag
    ///
    /// Treated exactly like submitting the tag label as text.
    TagSelected {
        /// Tag label
        label: String,
    },

    /// User picked a prediction topic
    TopicSelected {
        /// Topic identifier from the catalog
        topic_id: u32,
    },

    /// User wants to leave
    QuitRequested,
}

impl SurfaceEvent {
    /// Convenience constructor for a text submission
    pub fn user_message(content: impl Into<String>) -> Self {
        Self::UserMessage {
            content: content.into(),
        }
    }
}
