//! `robochat`: terminal client for the question-answering service.

mod command;
mod config;
mod terminal;

use clap::{Parser, Subcommand};
use command::{Command, HELP};
use robochat_client::{ChatClient, PollOutcome};
use robochat_core::{OutboundQuestion, RobochatResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use terminal::TerminalRenderer;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = "robochat.toml";

#[derive(Parser)]
#[command(name = "robochat", about = "Robochat question-answering chat client")]
struct Cli {
    /// Path to config file (default: ./robochat.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Service root URL (overrides config)
    #[arg(long)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive conversation with background message polling
    Chat,
    /// Ask a single question and print the answer
    Ask {
        /// The question
        #[arg(required = true)]
        question: Vec<String>,
    },
    /// Run one poll cycle and print pushed messages
    Poll,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = config::load(cli.config.as_deref(), Path::new(DEFAULT_CONFIG))?.client;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }

    let renderer = Arc::new(TerminalRenderer::new());
    let client = ChatClient::connect(config, renderer.clone()).await?;

    match cli.command {
        Commands::Chat => chat(&client, &renderer).await?,
        Commands::Ask { question } => {
            client.submit(OutboundQuestion::new(question.join(" "))).await?;
        }
        Commands::Poll => match client.poll_once().await {
            PollOutcome::Idle => println!("No pending messages."),
            PollOutcome::Skipped => anyhow::bail!("could not reach the message service"),
            PollOutcome::Delivered {
                dispatched,
                failed,
                confirmed,
            } => {
                debug!(?dispatched, ?failed, confirmed, "Poll finished");
                if !confirmed {
                    eprintln!("warning: messages were not confirmed and may be shown again");
                }
            }
        },
    }

    Ok(())
}

async fn chat(client: &ChatClient, renderer: &TerminalRenderer) -> anyhow::Result<()> {
    println!("{HELP}");
    client.start_polling();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match Command::parse(&line) {
            Command::Empty => {}
            Command::Quit => break,
            Command::Help => println!("{HELP}"),
            Command::Invalid(hint) => eprintln!("{hint}"),
            Command::Ask(text) => {
                client.ask(&text)?;
            }
            Command::FollowUp(n) => match renderer.follow_up(n) {
                Some(follow_up) => already_shown(client.follow_up(&follow_up).await),
                None => eprintln!("no follow-up [{n}]"),
            },
            Command::Complaint(content) => {
                let name = match renderer.complaint_name() {
                    Some(name) => name,
                    None => client.session().await.user_name,
                };
                already_shown(client.save_complaint(&name, &content).await);
            }
            Command::Upload { context_id, url } => {
                if renderer.is_closed(&context_id) {
                    eprintln!("message {context_id} is already closed");
                } else {
                    already_shown(client.leave_message_uploaded(&context_id, &url).await);
                }
            }
            Command::ReplyComplaint(text) => {
                already_shown(client.respond_to_last_complaint(&text).await);
            }
            Command::ReplyMessage(text) => {
                already_shown(client.respond_to_last_leave_message(&text).await);
            }
            Command::Push(text) => already_shown(client.send_message("robochat", &text).await),
        }
    }

    client.stop_polling();
    // The last question may still be waiting for its submit timer.
    already_shown(client.flush().await);
    Ok(())
}

/// Drops a result whose error the renderer has already shown to the user.
fn already_shown<T>(result: RobochatResult<T>) {
    if let Err(e) = result {
        debug!(error = %e, "Command failed");
    }
}
