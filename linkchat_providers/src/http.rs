use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use linkchat_core::{AgentService, ChatMessage, ChatReply, ChatSnapshot};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use crate::retry::retry_with_backoff;

/// Settings for [`HttpAgentService`].
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Request timeout
    pub timeout: Duration,
    /// Pauses between retries of idempotent requests
    pub retry_delays: Vec<Duration>,
    /// User-Agent header
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            retry_delays: vec![Duration::from_millis(500), Duration::from_secs(1)],
            user_agent: format!("linkchat/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// A failed request to the agent server.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Server returned {status}: {message}")]
    Status { status: StatusCode, message: String },
}

impl RequestError {
    /// Connection problems and server-side errors may go away on retry.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_connect() || e.is_timeout(),
            Self::Status { status, .. } => status.is_server_error(),
        }
    }
}

/// Error payload the server sends alongside non-2xx statuses.
#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Prefer the server's `{"error": ...}` message, falling back to the raw body.
fn status_error(status: StatusCode, body: String) -> RequestError {
    let message = serde_json::from_str::<ErrorBody>(&body).map_or(body, |e| e.error);
    RequestError::Status { status, message }
}

/// [`AgentService`] over the agent server's JSON HTTP API.
pub struct HttpAgentService {
    client: Client,
    base_url: Url,
    retry_delays: Vec<Duration>,
}

impl HttpAgentService {
    pub fn new(base_url: &str, config: &HttpConfig) -> anyhow::Result<Self> {
        let mut base_url =
            Url::parse(base_url).with_context(|| format!("Invalid agent URL: {base_url}"))?;
        // Endpoints are joined relative to the base, which needs a trailing slash.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .context("Failed to create HTTP client")?;

        info!("Creating HttpAgentService for {base_url}");
        Ok(Self {
            client,
            base_url,
            retry_delays: config.retry_delays.clone(),
        })
    }

    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> anyhow::Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("Invalid endpoint path: {path}"))
    }

    /// Turn a non-2xx response into [`RequestError::Status`].
    async fn check(response: Response) -> Result<Response, RequestError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(status_error(status, body))
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        url: Url,
        payload: &serde_json::Value,
    ) -> Result<T, RequestError> {
        let response = self.client.post(url).json(payload).send().await?;
        Ok(Self::check(response).await?.json::<T>().await?)
    }

    async fn try_load_chat(&self, url: &Url, id: &str) -> Result<ChatSnapshot, RequestError> {
        let response = self
            .client
            .get(url.clone())
            .query(&[("id", id)])
            .send()
            .await?;
        Ok(Self::check(response).await?.json::<ChatSnapshot>().await?)
    }

    async fn try_health(&self, url: &Url) -> Result<String, RequestError> {
        let response = self.client.get(url.clone()).send().await?;
        Ok(Self::check(response).await?.text().await?)
    }
}

#[async_trait]
impl AgentService for HttpAgentService {
    async fn set_url(&self, url: &str) -> anyhow::Result<ChatSnapshot> {
        let endpoint = self.endpoint("url")?;
        debug!("POST {endpoint} url={url}");

        let snapshot: ChatSnapshot = self
            .post_json(endpoint, &json!({ "url": url }))
            .await
            .context("Failed to send url")?;

        info!("Agent opened chat {} for {}", snapshot.id, snapshot.url);
        Ok(snapshot)
    }

    async fn chat(&self, id: &str, message: &ChatMessage) -> anyhow::Result<ChatReply> {
        let endpoint = self.endpoint("chat")?;
        debug!("POST {endpoint} id={id}");

        let reply: ChatReply = self
            .post_json(endpoint, &json!({ "body": message, "id": id }))
            .await
            .context("Failed to send chat message")?;

        debug!("Received reply with {} options", reply.options.len());
        Ok(reply)
    }

    async fn load_chat(&self, id: &str) -> anyhow::Result<ChatSnapshot> {
        let endpoint = self.endpoint("load_chat")?;
        debug!("GET {endpoint} id={id}");

        retry_with_backoff(
            || self.try_load_chat(&endpoint, id),
            &self.retry_delays,
            RequestError::is_transient,
        )
        .await
        .context("Failed to load chat")
    }

    async fn health(&self) -> anyhow::Result<String> {
        let endpoint = self.base_url.clone();

        retry_with_backoff(
            || self.try_health(&endpoint),
            &self.retry_delays,
            RequestError::is_transient,
        )
        .await
        .context("Agent server is not reachable")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_join_under_base_path() {
        let service =
            HttpAgentService::new("http://127.0.0.1:8000", &HttpConfig::default()).unwrap();
        assert_eq!(
            service.endpoint("load_chat").unwrap().as_str(),
            "http://127.0.0.1:8000/load_chat"
        );

        let service =
            HttpAgentService::new("https://agent.example.com/api", &HttpConfig::default())
                .unwrap();
        assert_eq!(
            service.endpoint("chat").unwrap().as_str(),
            "https://agent.example.com/api/chat"
        );
    }

    #[test]
    fn rejects_invalid_base_url() {
        assert!(HttpAgentService::new("not a url", &HttpConfig::default()).is_err());
    }

    #[test]
    fn server_errors_are_transient() {
        let unavailable = RequestError::Status {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: "busy".to_string(),
        };
        let missing = RequestError::Status {
            status: StatusCode::NOT_FOUND,
            message: "Chat not found".to_string(),
        };

        assert!(unavailable.is_transient());
        assert!(!missing.is_transient());
        assert_eq!(missing.to_string(), "Server returned 404 Not Found: Chat not found");
    }

    #[test]
    fn status_error_prefers_server_message() {
        let err = status_error(
            StatusCode::BAD_REQUEST,
            r#"{"error": "URL format is invalid."}"#.to_string(),
        );
        assert!(matches!(
            &err,
            RequestError::Status { status, message }
                if *status == StatusCode::BAD_REQUEST && message == "URL format is invalid."
        ));
        assert!(!err.is_transient());
    }

    #[test]
    fn status_error_falls_back_to_raw_body() {
        let err = status_error(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>".to_string());
        assert!(matches!(
            &err,
            RequestError::Status { message, .. } if message == "<html>bad gateway</html>"
        ));
        assert!(err.is_transient());

        let err = status_error(StatusCode::NOT_FOUND, r#"{"detail": "nope"}"#.to_string());
        assert!(matches!(
            &err,
            RequestError::Status { message, .. } if message == r#"{"detail": "nope"}"#
        ));

        let err = status_error(StatusCode::INTERNAL_SERVER_ERROR, String::new());
        assert_eq!(err.to_string(), "Server returned 500 Internal Server Error: ");
    }

    #[test]
    fn error_body_is_parsed() {
        let body: ErrorBody = serde_json::from_str(r#"{"error": "URL format is invalid."}"#)
            .unwrap();
        assert_eq!(body.error, "URL format is invalid.");
    }
}
