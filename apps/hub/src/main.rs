use std::time::Duration;

use anyhow::Result;
use assistant::Conversation;
use clap::{Parser, Subcommand};
use hub_client::HubClient;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

#[derive(Parser, Debug)]
struct Args {
    #[arg(long, default_value = "http://127.0.0.1:5001")]
    server_url: String,
    /// Milliseconds to wait for the server's assistant before answering locally.
    #[arg(long, default_value_t = 3000)]
    assistant_timeout_ms: u64,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Health,
    Events,
    Meet {
        topic: String,
        #[arg(long)]
        duration: Option<u32>,
    },
    Join {
        festival: String,
    },
    Ask {
        utterance: String,
    },
    Chat,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("warn").init();
    let args = Args::parse();
    let client = HubClient::new(args.server_url)?;
    let assistant_timeout = Duration::from_millis(args.assistant_timeout_ms);

    match args.command {
        Command::Health => {
            let report = client.health().await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Events => {
            for event in client.list_events().await? {
                println!("{}  {:<28} {}", event.date, event.name, event.description);
            }
        }
        Command::Meet { topic, duration } => {
            let descriptor = client.create_meeting(&topic, duration).await?;
            if let Some(notice) = &descriptor.error {
                warn!(notice, "server returned a fallback meeting");
            }
            println!("{}", serde_json::to_string_pretty(&descriptor)?);
        }
        Command::Join { festival } => {
            println!("{}", client.join_target(&festival).await?);
        }
        Command::Ask { utterance } => {
            let resolver = client.resolver(assistant_timeout);
            println!("{}", resolver.resolve(&utterance).await);
        }
        Command::Chat => chat(&client, assistant_timeout).await?,
    }

    Ok(())
}

async fn chat(client: &HubClient, assistant_timeout: Duration) -> Result<()> {
    let resolver = client.resolver(assistant_timeout);
    let mut conversation = Conversation::new();
    if let Some(greeting) = conversation.turns().first() {
        println!("assistant> {}", greeting.text);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if matches!(line.trim(), "quit" | "exit") {
            break;
        }
        if let Some(reply) = conversation.ask(&resolver, &line).await {
            println!("assistant> {}", reply.text);
        }
    }

    info!(turns = conversation.user_turns(), "chat ended");
    Ok(())
}
