//! The `amplify` binary: feed/list/search amplification bot for Bluesky.

mod adapter;
mod commands;
mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bsky_client::BskyClient;
use config::AppConfig;

#[derive(Parser)]
#[command(name = "amplify", about = "Repost/like amplification bot for Bluesky")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one amplification pass over the configured sources
    Run,
    /// Delete own repost records (dry run unless --execute is given)
    UnrepostAll {
        /// Actually delete instead of only listing
        #[arg(long)]
        execute: bool,
        /// Stop after this many deletions
        #[arg(long, default_value_t = 500)]
        max_actions: u32,
        /// Pause between deletions, in milliseconds
        #[arg(long, default_value_t = 150)]
        sleep_ms: u64,
    },
    /// Count remaining repost records, then delete one batch
    UnrepostBatch {
        #[arg(long, default_value_t = 2000)]
        max_actions: u32,
        #[arg(long, default_value_t = 300)]
        sleep_ms: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,amplifier=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    let client = BskyClient::login(&config.service, &config.identifier, &config.password)
        .await
        .context("Login failed")?;
    tracing::info!(did = %client.did(), "Logged in");

    match cli.command {
        Command::Run => commands::run::execute(&config, client).await,
        Command::UnrepostAll {
            execute,
            max_actions,
            sleep_ms,
        } => {
            commands::unrepost::unrepost_all(
                &client,
                !execute,
                max_actions,
                std::time::Duration::from_millis(sleep_ms),
            )
            .await
        }
        Command::UnrepostBatch {
            max_actions,
            sleep_ms,
        } => {
            commands::unrepost::unrepost_batch(
                &client,
                max_actions,
                std::time::Duration::from_millis(sleep_ms),
            )
            .await
        }
    }
}
