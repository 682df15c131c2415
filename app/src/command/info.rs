use linkchat_config::Config;
use linkchat_core::AgentService;
use tracing::info;

use super::build_agent;

/// Strategy for displaying configuration information.
///
/// This strategy outputs:
/// - The config file location
/// - Agent server URL and connection status
/// - Request timeout and retry backoff
/// - The in-chat failure message
#[derive(Debug, Clone, Copy)]
pub struct InfoStrategy;

impl super::CommandStrategy for InfoStrategy {
    /// Agent server override.
    type Input = Option<String>;

    async fn execute(&self, base_url: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;

        println!("=== linkchat Configuration ===\n");

        let config_path = Config::config_path()?;
        println!("Config File:");
        if config_path.exists() {
            println!("  Path: {}", config_path.display());
        } else {
            println!("  Path: {} (not created, using defaults)", config_path.display());
        }
        println!();

        let agent = build_agent(&config, base_url.as_deref())?;
        println!("Agent Server:");
        println!("  URL: {}", agent.base_url());

        info!("Checking agent server health");
        match agent.health().await {
            Ok(greeting) => {
                println!("  Status: Connected");
                println!("  Greeting: {}", truncate(greeting.trim(), 60));
            }
            Err(e) => {
                println!("  Status: Connection failed");
                println!("  Error: {e:#}");
            }
        }
        println!("  Timeout: {}s", config.agent.timeout_secs);
        println!("  Retry Delays: {}", format_delays(&config.agent.retry_delays_ms));
        println!();

        println!("Chat:");
        println!(
            "  Failure Message: {}",
            truncate(&config.chat.failure_message, 60)
        );

        Ok(())
    }
}

fn format_delays(delays_ms: &[u64]) -> String {
    if delays_ms.is_empty() {
        return "(no retries)".to_string();
    }
    delays_ms
        .iter()
        .map(|ms| format!("{ms}ms"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars - 3).collect();
        format!("{head}...")
    }
}
