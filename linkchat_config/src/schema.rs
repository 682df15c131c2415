use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

/// Where and how to reach the agent server.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AgentConfig {
    #[serde(default = "AgentConfig::default_base_url")]
    pub base_url: String,
    #[serde(default = "AgentConfig::default_timeout_secs")]
    pub timeout_secs: u64,
    /// Pauses between retries of idempotent requests, in milliseconds
    #[serde(default = "AgentConfig::default_retry_delays_ms")]
    pub retry_delays_ms: Vec<u64>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            timeout_secs: Self::default_timeout_secs(),
            retry_delays_ms: Self::default_retry_delays_ms(),
        }
    }
}

impl AgentConfig {
    fn default_base_url() -> String {
        "http://127.0.0.1:8000".to_string()
    }

    const fn default_timeout_secs() -> u64 {
        60
    }

    fn default_retry_delays_ms() -> Vec<u64> {
        vec![500, 1000]
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ChatConfig {
    /// Assistant message shown in the conversation when a send fails
    #[serde(default = "ChatConfig::default_failure_message")]
    pub failure_message: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            failure_message: Self::default_failure_message(),
        }
    }
}

impl ChatConfig {
    fn default_failure_message() -> String {
        "Sorry, I could not reach the agent. Please try again.".to_string()
    }
}

impl Config {
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        Ok(dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join("linkchat"))
    }

    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Load `~/linkchat/config.json`, falling back to defaults when it
    /// does not exist.
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            info!(
                "No config file at {}, using defaults. Run 'linkchat init' to create one.",
                config_path.display()
            );
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config file {}: {e}", path.display()))?;

        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn ensure_config_dir() -> anyhow::Result<PathBuf> {
        let config_dir = Self::config_dir()?;
        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    /// Write a config file at `~/linkchat/config.json`, pointing at
    /// `base_url` when given. An existing file is never overwritten.
    pub fn create_config(base_url: Option<&str>) -> anyhow::Result<PathBuf> {
        let config_dir = Self::ensure_config_dir()?;
        let config_path = config_dir.join("config.json");

        let mut config = Self::default();
        if let Some(base_url) = base_url {
            config.agent.base_url = base_url.to_string();
        }
        config.write_new(&config_path)?;

        info!("Created config file at {}", config_path.display());
        Ok(config_path)
    }

    /// Serialize to `path`, refusing to replace a file that is already there.
    pub fn write_new(&self, path: &Path) -> anyhow::Result<()> {
        if path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                path.display()
            );
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
