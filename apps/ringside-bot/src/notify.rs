use async_trait::async_trait;
use ringside_shared::ExpiringStudent;
use teloxide::prelude::*;
use thiserror::Error;
use tracing::{info, warn};

use crate::bot::texts;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("{0:?} is not a numeric Telegram ID")]
    InvalidRecipient(String),

    #[error("delivery failed: {0}")]
    Delivery(#[from] teloxide::RequestError),
}

/// Direct messages to students.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, chat_id: ChatId, text: &str) -> Result<(), NotifyError>;
}

#[derive(Clone)]
pub struct TelegramNotifier {
    bot: Bot,
}

impl TelegramNotifier {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, chat_id: ChatId, text: &str) -> Result<(), NotifyError> {
        self.bot.send_message(chat_id, text).await?;
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NotifySummary {
    pub sent: usize,
    pub failed: usize,
}

impl NotifySummary {
    pub fn attempted(&self) -> usize {
        self.sent + self.failed
    }
}

fn recipient(telegram_id: &str) -> Result<ChatId, NotifyError> {
    telegram_id
        .trim()
        .parse::<i64>()
        .map(ChatId)
        .map_err(|_| NotifyError::InvalidRecipient(telegram_id.to_string()))
}

/// Reminds every expiring student that has a Telegram ID. One failed delivery
/// is logged and counted; it never stops the rest of the batch.
pub async fn notify_expiring(notifier: &dyn Notifier, students: &[ExpiringStudent]) -> NotifySummary {
    let mut summary = NotifySummary::default();
    for student in students {
        let Some(telegram_id) = student.telegram_id.as_deref().filter(|id| !id.trim().is_empty()) else {
            continue;
        };
        let delivered = match recipient(telegram_id) {
            Ok(chat_id) => {
                notifier
                    .notify(chat_id, &texts::membership_reminder(student.days_left))
                    .await
            }
            Err(e) => Err(e),
        };
        match delivered {
            Ok(()) => {
                info!("Reminded {:?} ({} days left)", student.name, student.days_left);
                summary.sent += 1;
            }
            Err(e) => {
                warn!("Could not notify {:?}: {}", student.name, e);
                summary.failed += 1;
            }
        }
    }
    summary
}
