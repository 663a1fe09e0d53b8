use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing::info;

mod adapter;
mod commands;
mod context;
mod delivery;
mod handler;
mod reply;
mod update;

use botones_api::ApiClient;
use botones_core::BotonesConfig;
use botones_habits::HabitRegistry;
use botones_storage::StorageResolver;

use crate::context::BotContext;

#[derive(Parser)]
#[command(name = "botones", version, about = "Discord errand bot")]
struct Cli {
    /// Path to the config file (default: ~/.botones/botones.toml).
    #[arg(long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Print detailed version info and exit.
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    if let Some(CliCommand::Version) = cli.command {
        update::print_version();
        return Ok(());
    }

    // The bot token has no workable default; refuse to start without it.
    let config = BotonesConfig::load(cli.config.as_deref()).context(
        "config load failed; set discord.bot_token in ~/.botones/botones.toml \
         or the BOTONES_DISCORD__BOT_TOKEN environment variable",
    )?;

    // One HTTP client serves the fixed public APIs and attachment downloads.
    let http = reqwest::Client::builder()
        .user_agent(botones_core::config::USER_AGENT)
        .timeout(std::time::Duration::from_secs(15))
        .build()
        .context("HTTP client construction failed")?;
    let api = ApiClient::with_client(http);

    let storage = StorageResolver::new(config.storage.base_dir.as_deref().map(PathBuf::from));
    info!(base = %storage.resolve_base().display(), "output storage resolved");

    // Fired-habit channel: HabitRegistry loops -> Discord delivery task.
    let (notice_tx, notice_rx) = tokio::sync::mpsc::channel(64);
    let habits = HabitRegistry::new(notice_tx);

    let context = Arc::new(BotContext {
        config,
        api,
        storage,
        habits,
    });

    info!(version = update::VERSION, sha = update::GIT_SHA, "botones starting");
    adapter::BotonesAdapter::new(context).run(notice_rx).await;
    Ok(())
}
