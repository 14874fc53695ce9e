use teloxide::types::{KeyboardButton, KeyboardMarkup};

pub const ADD: &str = "➕ Add";
pub const VIEW_LIST: &str = "📋 View list";
pub const CHECK_DEADLINES: &str = "⏰ Check deadlines";
pub const PROFIT: &str = "💰 Profit";
pub const CANCEL: &str = "❌ Cancel";

pub fn main_menu() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![
        vec![KeyboardButton::new(ADD), KeyboardButton::new(VIEW_LIST)],
        vec![KeyboardButton::new(CHECK_DEADLINES), KeyboardButton::new(PROFIT)],
    ])
    .resize_keyboard()
}

/// Shown while a registration is in progress.
pub fn wizard_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![vec![KeyboardButton::new(CANCEL)]]).resize_keyboard()
}
