mod schema;

pub use schema::{AgentConfig, ChatConfig, Config};
