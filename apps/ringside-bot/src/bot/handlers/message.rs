use chrono::Local;
use teloxide::prelude::*;
use teloxide::types::ParseMode;
use tracing::{debug, error};

use crate::AppState;
use crate::bot::conversation::{self, Reply, ReplyKeyboard};
use crate::bot::keyboards::{main_menu, wizard_keyboard};

pub async fn message_handler(
    bot: Bot,
    msg: Message,
    state: AppState,
) -> Result<(), teloxide::RequestError> {
    let (Some(user), Some(text)) = (msg.from.as_ref(), msg.text()) else {
        return Ok(());
    };
    debug!("Received message from {}: {:?}", user.id.0, text);

    let today = Local::now().date_naive();
    for reply in conversation::handle(&state, user.id, text, today).await {
        if let Err(e) = send_reply(&bot, msg.chat.id, reply).await {
            error!("Failed to reply to {}: {}", user.id.0, e);
        }
    }
    Ok(())
}

async fn send_reply(bot: &Bot, chat_id: ChatId, reply: Reply) -> Result<Message, teloxide::RequestError> {
    let request = bot.send_message(chat_id, reply.text).parse_mode(ParseMode::Html);
    match reply.keyboard {
        ReplyKeyboard::Keep => request.await,
        ReplyKeyboard::MainMenu => request.reply_markup(main_menu()).await,
        ReplyKeyboard::Wizard => request.reply_markup(wizard_keyboard()).await,
    }
}
