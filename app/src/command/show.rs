use linkchat_config::Config;

use super::{build_controller, print_session};

/// Input parameters for the Show command strategy.
#[derive(Debug, Clone)]
pub struct ShowInput {
    /// Agent server override
    pub base_url: Option<String>,
    /// Chat reference id
    pub id: String,
}

/// Strategy for printing a saved chat.
///
/// Loads the chat the same way a rewind does and prints its conversation.
#[derive(Debug, Clone, Copy)]
pub struct ShowStrategy;

impl super::CommandStrategy for ShowStrategy {
    type Input = ShowInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;
        let controller = build_controller(&config, input.base_url.as_deref())?;

        controller.rewind(&input.id).await?;
        print_session(&controller.session());
        Ok(())
    }
}
