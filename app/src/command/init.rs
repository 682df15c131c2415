use linkchat_config::Config;

/// Strategy for writing a starter config file.
///
/// The file lands at `~/linkchat/config.json` with every default spelled
/// out; `--base-url` is written into `agent.base_url`.
#[derive(Debug, Clone, Copy)]
pub struct InitStrategy;

impl super::CommandStrategy for InitStrategy {
    /// Agent server to record instead of the default.
    type Input = Option<String>;

    async fn execute(&self, base_url: Self::Input) -> anyhow::Result<()> {
        let config_path = Config::create_config(base_url.as_deref())?;

        println!("✅ Created config file at: {}", config_path.display());
        println!();
        println!("📝 Next steps:");
        println!("   1. Check that agent.base_url points at your agent server");
        println!("   2. Run 'linkchat info' to see whether it answers");
        println!("   3. Run 'linkchat chat --url <website>' to start a conversation");
        println!();
        println!("🔧 Configuration options:");
        println!("   - timeout_secs: How long to wait for the agent on each request");
        println!("   - retry_delays_ms: Backoff for loading chats when the server is flaky");
        println!("   - failure_message: What the conversation shows when a send fails");
        Ok(())
    }
}
