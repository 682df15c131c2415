//! Interactive chat about a web page.
//!
//! The REPL is a thin front end over `SessionController`: it reads a line,
//! dispatches it to one of the controller's actions, and prints whatever
//! the session gained since the last prompt.

use std::io::Write;

use linkchat_config::Config;
use linkchat_conversation::{ChatSession, SessionController, SessionPhase};
use linkchat_core::AgentService;
use tracing::info;

use super::{build_controller, print_session, report, speaker};

/// Input parameters for the Chat command strategy.
#[derive(Debug, Clone)]
pub struct ChatInput {
    /// Agent server override
    pub base_url: Option<String>,
    /// Website to start a chat about
    pub url: Option<String>,
    /// Saved chat to resume
    pub rewind: Option<String>,
    /// Optional single message to send (non-interactive mode)
    pub message: Option<String>,
}

/// Strategy for executing the Chat command.
///
/// This strategy handles:
/// - Opening a chat from a URL or resuming one by reference id
/// - Sending a single message, or
/// - Running the interactive loop
#[derive(Debug, Clone, Copy)]
pub struct ChatStrategy;

impl super::CommandStrategy for ChatStrategy {
    type Input = ChatInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;
        let controller = build_controller(&config, input.base_url.as_deref())?;

        if let Some(id) = input.rewind {
            controller.rewind(&id).await?;
        } else if let Some(url) = input.url {
            controller.set_topic(&url).await?;
        }

        if let Some(msg) = input.message {
            let id = controller.id();
            controller.send_message(&id, &msg).await?;

            if let Some(reply) = controller.history().last() {
                println!("{}", reply.content);
            }
            print_options(&controller.pending_options());
            return Ok(());
        }

        run_interactive(&controller).await?;

        info!(
            "Chat ended: {} total messages",
            controller.session().message_count()
        );
        Ok(())
    }
}

const HELP: &str = "\
Commands:
  /url <website>   start a chat about a web page
  /rewind <id>     go back to a saved chat
  /new             forget the current chat
  /<n>             send suggested option n
  /history         print the whole conversation
  /help            show this help
  exit, quit, q    leave
Anything else is sent to the agent.";

/// A parsed line of REPL input.
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Exit,
    Help,
    History,
    New,
    Url(&'a str),
    Rewind(&'a str),
    Option(usize),
    Message(&'a str),
    Unknown(&'a str),
}

fn parse_input(line: &str) -> Input<'_> {
    let line = line.trim();
    if matches!(line, "exit" | "quit" | "q") {
        return Input::Exit;
    }

    let Some(command) = line.strip_prefix('/') else {
        return Input::Message(line);
    };
    let (name, arg) = command
        .split_once(char::is_whitespace)
        .map_or((command, ""), |(name, arg)| (name, arg.trim()));

    match name {
        "help" => Input::Help,
        "history" => Input::History,
        "new" => Input::New,
        "url" => Input::Url(arg),
        "rewind" => Input::Rewind(arg),
        _ => name
            .parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .map_or(Input::Unknown(name), |n| Input::Option(n - 1)),
    }
}

/// Tracks how much of the session has already been printed.
#[derive(Debug, Default)]
struct Transcript {
    id: String,
    shown: usize,
}

impl Transcript {
    /// Print messages added since the last call; a different session id
    /// means the session was replaced and is printed from the start.
    fn render(&mut self, session: &ChatSession) {
        if session.id != self.id || session.history.len() < self.shown {
            self.id.clone_from(&session.id);
            self.shown = 0;
            if session.is_established() {
                println!("\n=== Chat {} about {} ===", session.id, session.topic_url);
            }
        }

        for message in &session.history[self.shown..] {
            println!("\n{}> {}", speaker(message.role), message.content);
        }
        self.shown = session.history.len();
        print_options(&session.pending_options);
    }
}

fn print_options(options: &[String]) {
    if options.is_empty() {
        return;
    }
    println!();
    for (i, option) in options.iter().enumerate() {
        println!("  /{} {option}", i + 1);
    }
}

async fn run_interactive<A: AgentService>(controller: &SessionController<A>) -> anyhow::Result<()> {
    println!("=== linkchat ===");
    println!("Type /help for commands, 'exit' to quit.");

    let mut transcript = Transcript::default();
    transcript.render(&controller.session());
    if controller.phase() == SessionPhase::Unset {
        println!("\nStart with /url <website>, or /rewind <id> to open a saved chat.");
    }

    loop {
        print!("\n> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if std::io::stdin().read_line(&mut line)? == 0 {
            break;
        }

        match parse_input(&line) {
            Input::Exit => break,
            Input::Help => println!("{HELP}"),
            Input::History => print_session(&controller.session()),
            Input::New => {
                report(controller.reset());
                transcript = Transcript::default();
                println!("Started over. Use /url <website> to pick a page.");
            }
            Input::Url(url) => report(controller.set_topic(url).await),
            Input::Rewind(id) => report(controller.rewind(id).await),
            Input::Option(index) => report(controller.send_option(index).await),
            Input::Message("") => continue,
            Input::Message(text) => {
                let id = controller.id();
                report(controller.send_message(&id, text).await);
            }
            Input::Unknown(name) => println!("Unknown command /{name}, try /help"),
        }

        transcript.render(&controller.session());
    }

    Ok(())
}
