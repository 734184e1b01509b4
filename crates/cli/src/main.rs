use anyhow::Context;
use clap::{Parser, Subcommand};
use gridwatch_db::{ActivityStore, RedbActivityStore};
use gridwatch_kernel::Settings;

#[derive(Parser)]
#[command(name = "gridwatch", version, about = "Book store and device activity API")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP API until interrupted
    Serve,
    /// Open the configured activity store and report whether it is usable
    Healthcheck,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load().context("failed to load gridwatch settings")?;

    match cli.command {
        Command::Serve => gridwatch_app::run(settings).await,
        Command::Healthcheck => healthcheck(&settings),
    }
}

fn healthcheck(settings: &Settings) -> anyhow::Result<()> {
    let store = RedbActivityStore::from_settings(&settings.database)
        .context("activity store unavailable")?;
    let activities = store.count().context("activity store unreadable")?;
    tracing::debug!(activities, "activity store reachable");
    println!("OK");
    Ok(())
}
