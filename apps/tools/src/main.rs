use anyhow::{bail, Result};
use catalog::fallback;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use storage::{NewEvent, Storage};

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, default_value = "sqlite://./data/festival_hub.db")]
    database_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Creates the database file and applies migrations.
    Init,
    AddEvent {
        id: String,
        name: String,
        date: NaiveDate,
        #[arg(long, default_value = "")]
        description: String,
    },
    RemoveEvent {
        id: String,
    },
    /// Copies the bundled festival list into the database.
    Seed,
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let storage = Storage::new(&cli.database_url).await?;

    match cli.command {
        Command::Init => {
            println!("schema ready, {} events stored", storage.count_events().await?);
        }
        Command::AddEvent {
            id,
            name,
            date,
            description,
        } => {
            if id.trim().is_empty() || name.trim().is_empty() {
                bail!("event id and name must not be empty");
            }
            storage
                .upsert_event(&NewEvent {
                    event_id: &id,
                    name: &name,
                    description: &description,
                    date,
                })
                .await?;
            println!("stored event id={id}");
        }
        Command::RemoveEvent { id } => {
            if storage.remove_event(&id).await? {
                println!("removed event id={id}");
            } else {
                println!("no event with id={id}");
            }
        }
        Command::Seed => {
            let events = fallback::snapshot();
            for event in &events {
                storage
                    .upsert_event(&NewEvent {
                        event_id: &event.id.0,
                        name: &event.name,
                        description: &event.description,
                        date: event.date,
                    })
                    .await?;
            }
            println!(
                "seeded {} events from snapshot {}",
                events.len(),
                fallback::SNAPSHOT_VERSION
            );
        }
        Command::List => {
            for event in storage.list_events().await? {
                println!("{}  {:<20} {}", event.date, event.event_id, event.name);
            }
        }
    }

    Ok(())
}
