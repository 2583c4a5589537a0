use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use folio::analytics::retention::prune_expired;
use folio::analytics::{build_snapshot, AnalyticsAggregator, IdentifierHasher};
use folio::auth::AuthService;
use folio::config::Config;
use folio::storage;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "folio-admin")]
#[command(about = "Folio admin management CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the stored hash for a client identifier
    Hash {
        /// Client IP address as seen by the server
        identifier: String,
    },
    /// Print the current analytics snapshot as JSON
    Snapshot,
    /// Delete analytics records older than the given number of days
    Prune {
        #[arg(long)]
        older_than_days: u32,
    },
    /// Mint an admin session token
    Token,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command {
        Commands::Hash { identifier } => {
            let hasher = IdentifierHasher::new(config.analytics.hash_secret.clone());
            println!("{}", hasher.hash(&identifier));
        }
        Commands::Snapshot => {
            let storage = storage::connect(&config.database).await?;
            let aggregator = AnalyticsAggregator::new(
                storage,
                Duration::from_secs(config.analytics.query_timeout_secs),
            );
            let snapshot = build_snapshot(aggregator.compute_snapshot(Utc::now()).await?);
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        Commands::Prune { older_than_days } => {
            let storage = storage::connect(&config.database).await?;
            let deleted = prune_expired(storage.as_ref(), Utc::now(), older_than_days).await?;
            println!(
                "✓ Deleted {} analytics records older than {} days",
                deleted, older_than_days
            );
        }
        Commands::Token => {
            let auth = AuthService::new(&config.auth);
            println!("{}", auth.issue_token()?);
        }
    }

    Ok(())
}
