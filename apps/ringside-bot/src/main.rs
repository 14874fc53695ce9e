use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;
use ringside_sheets::{ServiceAccountAuth, ServiceAccountKey, SheetsClient, SheetsRecordStore};
use teloxide::prelude::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod bot;
mod config;
mod notify;
mod sessions;
mod state;

pub use crate::state::AppState;

use crate::config::Config;
use crate::notify::TelegramNotifier;
use crate::sessions::InMemorySessionStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ringside_bot=info,ringside_sheets=info,teloxide=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::parse();
    tracing::info!("Starting Ringside Bot...");
    tracing::info!("Credentials: {}", config.credentials.display());
    tracing::info!("Expiry window: {} days", config.expiry_window_days);

    let key = ServiceAccountKey::from_file(&config.credentials)
        .with_context(|| format!("cannot load credentials from {}", config.credentials.display()))?;
    let auth = ServiceAccountAuth::new(key).context("invalid service-account private key")?;
    tracing::info!("Authenticating as {}", auth.client_email());

    let client = SheetsClient::new(Arc::new(auth));
    let records = SheetsRecordStore::open(client, config.locator(), config.worksheet.clone())
        .await
        .context("spreadsheet is not reachable")?;

    let bot = Bot::new(config.bot_token.clone());
    let bot_username = bot::connect(&bot).await?;

    let state = AppState {
        records: Arc::new(records),
        sessions: Arc::new(InMemorySessionStore::new()),
        notifier: Arc::new(TelegramNotifier::new(bot.clone())),
        bot_username,
        expiry_window_days: config.expiry_window_days,
    };

    bot::run_bot(bot, state).await;
    Ok(())
}
