#![deny(
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

//! Shared types for the link chat client.
//!
//! This crate holds the wire model exchanged with the remote agent, the
//! [`AgentService`] contract the session controller talks to, and the two
//! pure helpers the controller depends on: URL normalization and recursive
//! payload decoding.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};

pub mod decode;
pub mod url;

pub use decode::{MAX_DECODE_DEPTH, decode, decode_value, history_from_value};
pub use url::{is_valid, normalize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    #[serde(alias = "system")]
    Assistant,
}

impl Role {
    /// Parse a wire role label. `system` is what older clients used for
    /// agent replies, so it maps to [`Role::Assistant`].
    #[must_use]
    pub fn from_wire(label: &str) -> Option<Self> {
        match label {
            "user" => Some(Self::User),
            "assistant" | "system" => Some(Self::Assistant),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Full state of a chat as returned by `/url` and `/load_chat`.
///
/// `convo` is kept raw: the server may hand it back as a JSON string that
/// was encoded more than once, so it only becomes a history after passing
/// through [`decode_value`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatSnapshot {
    #[serde(deserialize_with = "string_or_integer")]
    pub id: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, alias = "conversation")]
    pub convo: serde_json::Value,
}

impl ChatSnapshot {
    /// Decode `convo` into an ordered message history.
    #[must_use]
    pub fn history(&self) -> Vec<ChatMessage> {
        history_from_value(decode_value(self.convo.clone()))
    }
}

/// Response to one `/chat` turn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatReply {
    #[serde(alias = "answer")]
    pub body: String,
    #[serde(default)]
    pub options: Vec<String>,
}

/// Chat ids are integers on the server but opaque strings on the client.
fn string_or_integer<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum WireId {
        Text(String),
        Signed(i64),
        Unsigned(u64),
    }

    Ok(match WireId::deserialize(deserializer)? {
        WireId::Text(id) => id,
        WireId::Signed(id) => id.to_string(),
        WireId::Unsigned(id) => id.to_string(),
    })
}

/// The remote agent backing a chat session.
#[async_trait]
pub trait AgentService: Send + Sync {
    /// Start a chat about `url`. The url is expected to be normalized.
    async fn set_url(&self, url: &str) -> anyhow::Result<ChatSnapshot>;

    /// Run one conversational turn in chat `id`.
    async fn chat(&self, id: &str, message: &ChatMessage) -> anyhow::Result<ChatReply>;

    /// Fetch a previously saved chat by reference id.
    async fn load_chat(&self, id: &str) -> anyhow::Result<ChatSnapshot>;

    /// Liveness probe; returns the server greeting.
    async fn health(&self) -> anyhow::Result<String>;
}

#[async_trait]
impl<T> AgentService for Arc<T>
where
    T: AgentService + ?Sized,
{
    async fn set_url(&self, url: &str) -> anyhow::Result<ChatSnapshot> {
        (**self).set_url(url).await
    }

    async fn chat(&self, id: &str, message: &ChatMessage) -> anyhow::Result<ChatReply> {
        (**self).chat(id, message).await
    }

    async fn load_chat(&self, id: &str) -> anyhow::Result<ChatSnapshot> {
        (**self).load_chat(id).await
    }

    async fn health(&self) -> anyhow::Result<String> {
        (**self).health().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn snapshot_accepts_integer_id_and_conversation_key() {
        let snapshot: ChatSnapshot = serde_json::from_value(json!({
            "id": 42,
            "url": "https://www.example.com",
            "conversation": "[{\"role\":\"assistant\",\"content\":\"Trained on https://www.example.com\"}]"
        }))
        .unwrap();

        assert_eq!(snapshot.id, "42");
        assert_eq!(
            snapshot.history(),
            vec![ChatMessage::assistant("Trained on https://www.example.com")]
        );
    }

    #[test]
    fn snapshot_accepts_structured_convo() {
        let snapshot: ChatSnapshot = serde_json::from_value(json!({
            "id": "7",
            "url": "https://www.example.com",
            "convo": [{"role": "user", "content": "hi"}]
        }))
        .unwrap();

        assert_eq!(snapshot.history(), vec![ChatMessage::user("hi")]);
    }

    #[test]
    fn system_role_reads_as_assistant() {
        let msg: ChatMessage =
            serde_json::from_value(json!({"role": "system", "content": "hello"})).unwrap();
        assert_eq!(msg.role, Role::Assistant);
        assert_eq!(serde_json::to_value(&msg).unwrap()["role"], "assistant");
    }

    #[test]
    fn reply_options_default_to_empty() {
        let reply: ChatReply = serde_json::from_value(json!({"body": "hi there"})).unwrap();
        assert_eq!(reply.body, "hi there");
        assert!(reply.options.is_empty());
    }
}
