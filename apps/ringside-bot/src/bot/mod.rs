use anyhow::{Context, Result};
use teloxide::utils::command::BotCommands;
use teloxide::{dptree, prelude::*, types::{Update, UserId}};
use tracing::{error, info, warn};

pub mod conversation;
pub mod handlers;
pub mod keyboards;
pub mod router;
pub mod texts;

use router::Command;

/// Checks the token against Telegram and registers the command menu.
/// Returns the bot's username, needed to recognise `/cmd@bot` in groups.
pub async fn connect(bot: &Bot) -> Result<String> {
    info!("Bot identity check...");
    let me = bot
        .get_me()
        .await
        .context("Telegram rejected the bot token")?;
    let username = me.user.username.clone().unwrap_or_default();
    info!("Bot connected as: @{}", username);

    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        // Cosmetic: commands still work without the client-side menu.
        warn!("Failed to register bot commands: {}", e);
    }
    Ok(username)
}

/// Wizard sessions are per user, so one sender's updates must never race, even
/// when they arrive from different chats.
fn by_sender(update: &Update) -> Option<UserId> {
    update.from().map(|user| user.id)
}

pub async fn run_bot(bot: Bot, state: crate::AppState) {
    info!("Starting bot dispatcher...");

    std::panic::set_hook(Box::new(|info| {
        error!("CRITICAL BOT PANIC: {:?}", info);
    }));

    let handler = Update::filter_message().endpoint(handlers::message::message_handler);

    // Updates from one sender are handled in order; different senders run concurrently.
    Dispatcher::builder(bot, dptree::entry().branch(handler))
        .dependencies(dptree::deps![state])
        .distribution_function(by_sender)
        .default_handler(|upd: std::sync::Arc<Update>| async move {
            info!("Unhandled update: {:?}", upd.id);
        })
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("Bot dispatcher exited");
}
