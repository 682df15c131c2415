use linkchat_config::Config;

/// Strategy for printing the client version and where it looks for config.
#[derive(Debug, Clone, Copy)]
pub struct VersionStrategy;

impl super::CommandStrategy for VersionStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        println!("{}", version_line());
        if let Ok(path) = Config::config_path() {
            println!("config: {}", path.display());
        }
        Ok(())
    }
}

fn version_line() -> String {
    format!("linkchat {}", env!("CARGO_PKG_VERSION"))
}
