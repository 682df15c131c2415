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

mod command;

use clap::{Parser, Subcommand};
use command::{
    ChatInput, ChatStrategy, CommandStrategy, InfoStrategy, InitStrategy, ShowInput,
    ShowStrategy, VersionStrategy,
};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "linkchat")]
#[command(about = "Chat with an agent about any web page", long_about = None)]
struct Cli {
    /// Agent server URL (overrides the config file)
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive chat
    Chat {
        /// Website to chat about
        #[arg(short = 'u', long, value_parser = parse_topic_url)]
        url: Option<String>,

        /// Resume a saved chat by reference id
        #[arg(short = 'r', long, conflicts_with = "url")]
        rewind: Option<String>,

        /// Single message to send (non-interactive mode)
        #[arg(short = 'm', long)]
        message: Option<String>,
    },
    /// Print a saved chat by reference id
    Show {
        /// Chat reference id
        id: String,
    },
    /// Write a starter config file (records --base-url when given)
    Init,
    /// Show configuration and check the agent server
    Info,
    /// Show version
    Version,
}

/// Reject a `--url` that could never start a chat before anything is set up.
fn parse_topic_url(raw: &str) -> Result<String, String> {
    if linkchat_core::is_valid(raw) {
        Ok(raw.to_string())
    } else {
        Err(format!("'{raw}' is not a website address (expected something like example.com)"))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Chat {
            url,
            rewind,
            message,
        } => {
            ChatStrategy
                .execute(ChatInput {
                    base_url: cli.base_url,
                    url,
                    rewind,
                    message,
                })
                .await
        }
        Commands::Show { id } => {
            ShowStrategy
                .execute(ShowInput {
                    base_url: cli.base_url,
                    id,
                })
                .await
        }
        Commands::Init => InitStrategy.execute(cli.base_url).await,
        Commands::Info => InfoStrategy.execute(cli.base_url).await,
        Commands::Version => VersionStrategy.execute(()).await,
    }
}
