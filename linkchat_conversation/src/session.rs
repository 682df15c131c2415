//! The live chat session.
//!
//! A session is one conversation about one reference URL, identified by
//! the id the remote agent assigned to it.

use linkchat_core::{ChatMessage, ChatSnapshot, Role};

/// A chat session with its full message history.
///
/// An empty `id` means no session has been established yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatSession {
    /// Reference id assigned by the agent
    pub id: String,
    /// Canonical URL the chat is about
    pub topic_url: String,
    /// Messages in chronological order
    pub history: Vec<ChatMessage>,
    /// Suggested replies offered after the last agent turn
    pub pending_options: Vec<String>,
}

impl ChatSession {
    /// Create an unset session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a session from a snapshot, decoding its conversation.
    #[must_use]
    pub fn from_snapshot(snapshot: &ChatSnapshot) -> Self {
        Self {
            id: snapshot.id.clone(),
            topic_url: snapshot.url.clone(),
            history: snapshot.history(),
            pending_options: Vec::new(),
        }
    }

    /// Whether a session id has been established.
    #[must_use]
    pub fn is_established(&self) -> bool {
        !self.id.is_empty()
    }

    /// Get the last N messages from history.
    #[must_use]
    pub fn last_n_messages(&self, n: usize) -> &[ChatMessage] {
        let start = self.history.len().saturating_sub(n);
        &self.history[start..]
    }

    #[must_use]
    pub const fn message_count(&self) -> usize {
        self.history.len()
    }
}
