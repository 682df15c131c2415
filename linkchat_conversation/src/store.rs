//! Owner of the live chat session.
//!
//! Every mutation takes the write lock once and is applied in full, so a
//! reader never sees half of an update. Snapshots are decoded before the
//! lock is taken.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use linkchat_core::{ChatMessage, ChatReply, ChatSnapshot, Role};
use tracing::debug;

use crate::session::ChatSession;

/// Holds exactly one [`ChatSession`].
#[derive(Debug, Default)]
pub struct ChatSessionStore {
    session: RwLock<ChatSession>,
}

impl ChatSessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // Writers never panic mid-update, so a poisoned lock still holds a whole session.
    fn read(&self) -> RwLockReadGuard<'_, ChatSession> {
        self.session.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ChatSession> {
        self.session.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Swap in the session described by `snapshot`, clearing pending options.
    pub fn replace_session(&self, snapshot: &ChatSnapshot) {
        let next = ChatSession::from_snapshot(snapshot);
        debug!(
            "Replacing session with {} ({} messages)",
            next.id,
            next.history.len()
        );
        *self.write() = next;
    }

    pub fn append_message(&self, message: ChatMessage) {
        self.write().history.push(message);
    }

    pub fn set_pending_options(&self, options: Vec<String>) {
        self.write().pending_options = options;
    }

    /// Update the topic URL only, e.g. while the user is still typing it.
    pub fn set_topic_url(&self, url: impl Into<String>) {
        self.write().topic_url = url.into();
    }

    /// Append the user's message and drop stale options in one step.
    pub fn begin_turn(&self, message: ChatMessage) {
        let mut session = self.write();
        session.history.push(message);
        session.pending_options.clear();
    }

    /// Append the agent's reply together with its suggested options.
    pub fn finish_turn(&self, reply: ChatReply) {
        let mut session = self.write();
        session.history.push(ChatMessage::assistant(reply.body));
        session.pending_options = reply.options;
    }

    /// Drop the live session and go back to the unset state.
    pub fn reset(&self) {
        *self.write() = ChatSession::new();
    }

    /// Consistent copy of the whole session.
    #[must_use]
    pub fn snapshot(&self) -> ChatSession {
        self.read().clone()
    }

    #[must_use]
    pub fn id(&self) -> String {
        self.read().id.clone()
    }

    #[must_use]
    pub fn topic_url(&self) -> String {
        self.read().topic_url.clone()
    }

    #[must_use]
    pub fn history(&self) -> Vec<ChatMessage> {
        self.read().history.clone()
    }

    #[must_use]
    pub fn pending_options(&self) -> Vec<String> {
        self.read().pending_options.clone()
    }

    #[must_use]
    pub fn pending_option(&self, index: usize) -> Option<String> {
        self.read().pending_options.get(index).cloned()
    }

    #[must_use]
    pub fn is_established(&self) -> bool {
        self.read().is_established()
    }

    /// Whether the user has taken at least one turn in this session.
    #[must_use]
    pub fn has_user_turn(&self) -> bool {
        self.read().history.iter().any(|m| m.role == Role::User)
    }
}
