//! Ferryman - Discord-Telegram chat relay
//!
//! Relays text messages bidirectionally between Discord channels and
//! Telegram chats grouped into named bridges, preserving reply threads
//! through a persistent message-id correlation store.

mod bridge;
mod common;
mod config;
mod discord;
mod telegram;

use std::sync::Arc;

use anyhow::Result;
use serenity::http::Http;
use serenity::prelude::*;
use teloxide::Bot;
use tokio::signal;
use tracing::{error, info, warn};

use bridge::{BridgeContext, BridgeRegistry, CorrelationStore, RelayEngine};
use config::env::get_config_path;
use config::load_and_validate;
use discord::{DiscordAdapter, DiscordHandler};
use telegram::TelegramAdapter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Ferryman v{} starting...", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_path = get_config_path();
    info!("Loading configuration from {}...", config_path);

    let config = load_and_validate(&config_path).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        error!("Please ensure {} exists and is properly formatted.", config_path);
        error!("See ferryman.conf.example for reference.");
        e
    })?;

    info!("Configuration loaded successfully");
    info!("  Bridge registry: {}", config.storage.bridges);
    info!("  Correlation store: {}", config.storage.message_map);

    // ============================================================
    // Open persistent state
    // ============================================================

    let registry = BridgeRegistry::load(&config.storage.bridges).await;
    let store = CorrelationStore::open(&config.storage.message_map)?;

    // ============================================================
    // Build platform adapters and shared context
    // ============================================================

    let telegram_bot = Bot::new(config.telegram.token.clone());
    let discord_http = Arc::new(Http::new(&config.discord.token));

    let app = Arc::new(BridgeContext {
        registry,
        relay: RelayEngine::new(store),
        discord: DiscordAdapter::new(discord_http),
        telegram: TelegramAdapter::new(telegram_bot.clone()),
    });

    // ============================================================
    // Start both platform clients
    // ============================================================

    info!("Starting Discord client...");
    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let mut discord_client = Client::builder(&config.discord.token, intents)
        .event_handler(DiscordHandler::new(app.clone()))
        .await?;
    let shard_manager = discord_client.shard_manager.clone();

    let mut discord_task = tokio::spawn(async move {
        if let Err(e) = discord_client.start().await {
            error!("Discord client error: {}", e);
        }
    });

    let mut telegram_task = tokio::spawn({
        let app = app.clone();
        async move {
            if let Err(e) = telegram::handler::run(telegram_bot, app).await {
                error!("Telegram dispatcher error: {}", e);
            }
        }
    });

    // ============================================================
    // Run until shutdown or either client exits
    // ============================================================

    let shutdown = tokio::select! {
        biased;
        _ = shutdown_signal() => {
            info!("Shutdown signal received - stopping clients...");
            true
        }
        _ = &mut discord_task => {
            warn!("Discord client exited");
            false
        }
        _ = &mut telegram_task => {
            warn!("Telegram dispatcher exited");
            false
        }
    };

    if shutdown {
        // In-flight fan-outs may be abandoned here; every completed chunk
        // send has already been recorded, so state stays consistent.
        shard_manager.shutdown_all().await;
        telegram_task.abort();
    }

    info!("Exiting...");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
