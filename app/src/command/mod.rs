//! Static strategy pattern for CLI commands.
//!
//! Each command is a separate strategy with its own input type, dispatched
//! statically from `main`.

use std::time::Duration;

use linkchat_config::Config;
use linkchat_conversation::{ChatSession, ControllerConfig, SessionController, SessionError};
use linkchat_core::Role;
use linkchat_providers::{HttpAgentService, HttpConfig};
use tracing::info;

mod chat;
mod info;
mod init;
mod show;
mod version;

pub use chat::{ChatInput, ChatStrategy};
pub use info::InfoStrategy;
pub use init::InitStrategy;
pub use show::{ShowInput, ShowStrategy};
pub use version::VersionStrategy;

/// Core trait defining the contract for all command strategies.
///
/// # Example
/// ```rust
/// struct MyStrategy;
///
/// impl CommandStrategy for MyStrategy {
///     type Input = MyInput;
///
///     async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
///         // Command logic here
///         Ok(())
///     }
/// }
/// ```
pub trait CommandStrategy: Send + Sync + 'static {
    /// The input type this strategy accepts.
    type Input;

    /// Execute the command with the given input.
    ///
    /// # Errors
    /// Returns an error if command execution fails.
    async fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}

/// Build the HTTP client for the agent server.
fn build_agent(config: &Config, base_url: Option<&str>) -> anyhow::Result<HttpAgentService> {
    let base_url = base_url.unwrap_or(&config.agent.base_url);
    info!("Using agent server at {base_url}");

    let http_config = HttpConfig {
        timeout: Duration::from_secs(config.agent.timeout_secs),
        retry_delays: config
            .agent
            .retry_delays_ms
            .iter()
            .copied()
            .map(Duration::from_millis)
            .collect(),
        ..HttpConfig::default()
    };

    HttpAgentService::new(base_url, &http_config)
}

/// Build a session controller talking to the configured agent server.
fn build_controller(
    config: &Config,
    base_url: Option<&str>,
) -> anyhow::Result<SessionController<HttpAgentService>> {
    let agent = build_agent(config, base_url)?;
    let controller_config =
        ControllerConfig::default().with_failure_message(config.chat.failure_message.clone());
    Ok(SessionController::new(agent, controller_config))
}

/// Print a failed action. Busy rejections are silent.
fn report(result: Result<(), SessionError>) {
    match result {
        Ok(()) | Err(SessionError::Busy) => {}
        Err(e) if e.is_retryable() => eprintln!("⚠️  {e} (you can retry)"),
        Err(e) => eprintln!("⚠️  {e}"),
    }
}

fn speaker(role: Role) -> &'static str {
    match role {
        Role::User => "you",
        Role::Assistant => "agent",
    }
}

/// Print the chat header and the full conversation.
fn print_session(session: &ChatSession) {
    println!("=== Chat {} about {} ===", session.id, session.topic_url);
    for message in &session.history {
        println!("{}> {}", speaker(message.role), message.content);
    }
}
