#![warn(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Chat session synchronization.
//!
//! This crate keeps the single live chat session in step with the remote
//! agent: the store owns the session state, and the controller runs the
//! three user actions (set topic, send message, rewind) against an
//! [`AgentService`](linkchat_core::AgentService).
//!
//! # Key Features
//! - One owned session, mutated only through atomic store operations
//! - Optimistic user turns that stay visible when the agent fails
//! - At most one remote action in flight at a time
//! - Rewind to any saved chat by reference id

mod controller;
mod error;
mod session;
mod store;

pub use controller::{ControllerConfig, Operation, SessionController, SessionPhase};
pub use error::SessionError;
pub use session::ChatSession;
pub use store::ChatSessionStore;
