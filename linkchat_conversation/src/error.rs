use thiserror::Error;

/// Errors surfaced by the session controller.
///
/// Validation errors are raised before any network call and leave the
/// store untouched. [`SessionError::Remote`] is the only retryable kind.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Not a valid reference URL: {0:?}")]
    InvalidUrl(String),

    #[error("Message is empty")]
    EmptyMessage,

    #[error("Reference id is empty")]
    EmptyReference,

    #[error("No chat session yet, set a topic URL first")]
    NoSession,

    #[error("Session {given} is not the live session {live}")]
    SessionMismatch { given: String, live: String },

    #[error("Topic is already set for session {0}, start a new chat to change it")]
    TopicLocked(String),

    #[error("No suggested option #{0}")]
    NoSuchOption(usize),

    #[error("Another request is still in flight")]
    Busy,

    #[error("Remote agent error: {0}")]
    Remote(String),
}

impl SessionError {
    /// Wrap a transport or server failure, keeping its context chain.
    #[must_use]
    pub fn remote(err: &anyhow::Error) -> Self {
        Self::Remote(format!("{err:#}"))
    }

    /// Whether re-invoking the same action may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Remote(_))
    }

    /// Whether the action was refused before reaching the agent.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        !matches!(self, Self::Remote(_) | Self::Busy)
    }
}
