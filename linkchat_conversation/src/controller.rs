//! Session controller for the three user actions.
//!
//! The `SessionController` is the entry point the front end talks to. It
//! validates input, calls the remote agent, and applies the outcome to the
//! store. At most one action is in flight at a time: a second call made
//! while one is pending fails fast with [`SessionError::Busy`] and never
//! reaches the network.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use linkchat_core::{AgentService, ChatMessage, normalize};
use tracing::{debug, info, warn};

use crate::error::SessionError;
use crate::session::ChatSession;
use crate::store::ChatSessionStore;

/// Configuration for the session controller.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Text of the assistant message shown in-line when a send fails
    pub failure_message: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            failure_message: "Sorry, I could not reach the agent. Please try again.".to_string(),
        }
    }
}

impl ControllerConfig {
    #[must_use]
    pub fn with_failure_message(mut self, message: String) -> Self {
        self.failure_message = message;
        self
    }
}

/// A user action that holds the controller while it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    SetTopic,
    Send,
    Rewind,
    Reset,
}

/// Where the live session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No session id yet
    Unset,
    /// Session established, no user turn taken
    TopicSet,
    /// At least one turn taken, nothing in flight
    Idle,
    SettingTopic,
    Sending,
    Rewinding,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Releases the in-flight slot when the action finishes, however it ends.
struct InFlight<'a> {
    slot: &'a Mutex<Option<Operation>>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        *lock(self.slot) = None;
    }
}

/// Drives a chat session against a remote agent.
pub struct SessionController<A = Arc<dyn AgentService>>
where
    A: AgentService,
{
    agent: A,
    store: ChatSessionStore,
    config: ControllerConfig,
    in_flight: Mutex<Option<Operation>>,
    last_error: Mutex<Option<SessionError>>,
}

impl<A> SessionController<A>
where
    A: AgentService,
{
    /// Create a controller with an unset session.
    pub fn new(agent: A, config: ControllerConfig) -> Self {
        Self {
            agent,
            store: ChatSessionStore::new(),
            config,
            in_flight: Mutex::new(None),
            last_error: Mutex::new(None),
        }
    }

    /// Claim the in-flight slot for `operation`.
    fn begin(&self, operation: Operation) -> Result<InFlight<'_>, SessionError> {
        {
            let mut slot = lock(&self.in_flight);
            if let Some(current) = *slot {
                debug!("Ignoring {operation:?} while {current:?} is in flight");
                return Err(SessionError::Busy);
            }
            *slot = Some(operation);
        }

        *lock(&self.last_error) = None;
        Ok(InFlight {
            slot: &self.in_flight,
        })
    }

    /// Record a failure for the front end and hand it back to the caller.
    fn fail(&self, err: SessionError) -> SessionError {
        warn!("{err}");
        *lock(&self.last_error) = Some(err.clone());
        err
    }

    /// Start a chat about `raw_url`.
    ///
    /// The URL is normalized first; an unusable URL is refused without
    /// contacting the agent. Once a session exists its topic is locked, so
    /// changing topic requires [`reset`](Self::reset) or a rewind.
    pub async fn set_topic(&self, raw_url: &str) -> Result<(), SessionError> {
        let _in_flight = self.begin(Operation::SetTopic)?;

        let live = self.store.id();
        if !live.is_empty() {
            return Err(self.fail(SessionError::TopicLocked(live)));
        }

        let url = normalize(raw_url);
        if url.is_empty() {
            return Err(self.fail(SessionError::InvalidUrl(raw_url.to_string())));
        }

        info!("Setting chat topic: {url}");
        match self.agent.set_url(&url).await {
            Ok(snapshot) => {
                self.store.replace_session(&snapshot);
                info!("Chat {} started about {}", snapshot.id, snapshot.url);
                Ok(())
            }
            Err(e) => Err(self.fail(SessionError::remote(&e))),
        }
    }

    /// Send one user message in session `id`.
    ///
    /// The message is shown right away and stale options are cleared. If
    /// the agent fails, the user's message stays in history followed by an
    /// assistant message saying the send failed.
    pub async fn send_message(&self, id: &str, text: &str) -> Result<(), SessionError> {
        let _in_flight = self.begin(Operation::Send)?;

        if text.trim().is_empty() {
            return Err(self.fail(SessionError::EmptyMessage));
        }

        let live = self.store.id();
        if id.is_empty() || live.is_empty() {
            return Err(self.fail(SessionError::NoSession));
        }
        if id != live {
            return Err(self.fail(SessionError::SessionMismatch {
                given: id.to_string(),
                live,
            }));
        }

        let message = ChatMessage::user(text);
        self.store.begin_turn(message.clone());

        debug!("Sending message in chat {id}");
        match self.agent.chat(id, &message).await {
            Ok(reply) => {
                debug!("Chat {id} replied with {} options", reply.options.len());
                self.store.finish_turn(reply);
                Ok(())
            }
            Err(e) => {
                self.store
                    .append_message(ChatMessage::assistant(self.config.failure_message.clone()));
                Err(self.fail(SessionError::remote(&e)))
            }
        }
    }

    /// Send the suggested option at `index` as the next user message.
    pub async fn send_option(&self, index: usize) -> Result<(), SessionError> {
        let Some(option) = self.store.pending_option(index) else {
            if self.is_busy() {
                return Err(SessionError::Busy);
            }
            return Err(self.fail(SessionError::NoSuchOption(index)));
        };
        let id = self.store.id();
        self.send_message(&id, &option).await
    }

    /// Replace the live session with the saved chat `prev_id`.
    ///
    /// The swap is all or nothing: on failure the current session is kept.
    pub async fn rewind(&self, prev_id: &str) -> Result<(), SessionError> {
        let _in_flight = self.begin(Operation::Rewind)?;

        let prev_id = prev_id.trim();
        if prev_id.is_empty() {
            return Err(self.fail(SessionError::EmptyReference));
        }

        info!("Rewinding to chat {prev_id}");
        match self.agent.load_chat(prev_id).await {
            Ok(snapshot) => {
                self.store.replace_session(&snapshot);
                info!(
                    "Loaded chat {} with {} messages",
                    snapshot.id,
                    self.store.snapshot().message_count()
                );
                Ok(())
            }
            Err(e) => Err(self.fail(SessionError::remote(&e))),
        }
    }

    /// Forget the live session so a new topic can be set.
    pub fn reset(&self) -> Result<(), SessionError> {
        let _in_flight = self.begin(Operation::Reset)?;
        self.store.reset();
        info!("Chat session reset");
        Ok(())
    }

    /// Update the topic URL draft while no session is established.
    ///
    /// Returns `false` and leaves the store alone once the topic is locked
    /// or while an action is in flight.
    pub fn set_topic_draft(&self, url: &str) -> bool {
        if self.is_busy() || self.store.is_established() {
            return false;
        }
        self.store.set_topic_url(url);
        true
    }

    #[must_use]
    pub fn id(&self) -> String {
        self.store.id()
    }

    #[must_use]
    pub fn topic_url(&self) -> String {
        self.store.topic_url()
    }

    #[must_use]
    pub fn history(&self) -> Vec<ChatMessage> {
        self.store.history()
    }

    #[must_use]
    pub fn pending_options(&self) -> Vec<String> {
        self.store.pending_options()
    }

    /// Consistent copy of the whole session.
    #[must_use]
    pub fn session(&self) -> ChatSession {
        self.store.snapshot()
    }

    /// Whether an action is in flight. Front ends use this to disable
    /// duplicate submission.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        lock(&self.in_flight).is_some()
    }

    /// The operation currently in flight, if any.
    #[must_use]
    pub fn in_flight(&self) -> Option<Operation> {
        *lock(&self.in_flight)
    }

    /// The failure of the last accepted action, cleared when the next one starts.
    #[must_use]
    pub fn last_error(&self) -> Option<SessionError> {
        lock(&self.last_error).clone()
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        match self.in_flight() {
            Some(Operation::SetTopic) => SessionPhase::SettingTopic,
            Some(Operation::Send) => SessionPhase::Sending,
            Some(Operation::Rewind) => SessionPhase::Rewinding,
            Some(Operation::Reset) | None => {
                if !self.store.is_established() {
                    SessionPhase::Unset
                } else if self.store.has_user_turn() {
                    SessionPhase::Idle
                } else {
                    SessionPhase::TopicSet
                }
            }
        }
    }
}
