use teloxide::utils::command::BotCommands;

use crate::bot::keyboards;

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "snake_case", description = "Available commands:")]
pub enum Command {
    #[command(description = "show the menu")]
    Start,
    #[command(description = "register a student")]
    AddStudent,
    #[command(description = "students and days left")]
    ListStudents,
    #[command(description = "who expires soon")]
    Check,
    #[command(description = "payment totals")]
    Profit,
    #[command(description = "abort a registration")]
    Cancel,
}

/// What to do with one inbound text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Cancel,
    /// Feed the text to the active wizard step, whatever it looks like.
    Wizard,
    Start,
    ListStudents,
    CheckExpiry,
    Profit,
    BeginRegistration,
    NothingToCancel,
    Ignore,
}

/// Slash command (optionally addressed `@bot`) or menu button label.
pub fn trigger(text: &str, bot_username: &str) -> Option<Command> {
    if let Ok(command) = Command::parse(text.trim(), bot_username) {
        return Some(command);
    }
    match text.trim() {
        keyboards::ADD => Some(Command::AddStudent),
        keyboards::VIEW_LIST => Some(Command::ListStudents),
        keyboards::CHECK_DEADLINES => Some(Command::Check),
        keyboards::PROFIT => Some(Command::Profit),
        keyboards::CANCEL => Some(Command::Cancel),
        _ => None,
    }
}

/// Dispatch priority: cancel inside a wizard, then the wizard itself, then
/// commands and buttons. Anything else while idle is dropped.
pub fn route(text: &str, wizard_active: bool, bot_username: &str) -> Route {
    let trigger = trigger(text, bot_username);
    if wizard_active {
        return match trigger {
            Some(Command::Cancel) => Route::Cancel,
            _ => Route::Wizard,
        };
    }
    match trigger {
        Some(Command::Start) => Route::Start,
        Some(Command::AddStudent) => Route::BeginRegistration,
        Some(Command::ListStudents) => Route::ListStudents,
        Some(Command::Check) => Route::CheckExpiry,
        Some(Command::Profit) => Route::Profit,
        Some(Command::Cancel) => Route::NothingToCancel,
        None => Route::Ignore,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOT: &str = "ringside_bot";

    #[test]
    fn idle_commands_and_buttons() {
        assert_eq!(route("/start", false, BOT), Route::Start);
        assert_eq!(route("/add_student", false, BOT), Route::BeginRegistration);
        assert_eq!(route(keyboards::ADD, false, BOT), Route::BeginRegistration);
        assert_eq!(route("/list_students", false, BOT), Route::ListStudents);
        assert_eq!(route(keyboards::VIEW_LIST, false, BOT), Route::ListStudents);
        assert_eq!(route("/check", false, BOT), Route::CheckExpiry);
        assert_eq!(route(keyboards::CHECK_DEADLINES, false, BOT), Route::CheckExpiry);
        assert_eq!(route("/profit", false, BOT), Route::Profit);
        assert_eq!(route(keyboards::PROFIT, false, BOT), Route::Profit);
    }

    #[test]
    fn addressed_commands_match_only_this_bot() {
        assert_eq!(route("/check@ringside_bot", false, BOT), Route::CheckExpiry);
        assert_eq!(route("/check@other_bot", false, BOT), Route::Ignore);
    }

    #[test]
    fn idle_chatter_is_ignored() {
        assert_eq!(route("hello", false, BOT), Route::Ignore);
        assert_eq!(route("/unknown", false, BOT), Route::Ignore);
    }

    #[test]
    fn cancel_while_idle_has_nothing_to_do() {
        assert_eq!(route("/cancel", false, BOT), Route::NothingToCancel);
    }

    #[test]
    fn wizard_swallows_commands_except_cancel() {
        assert_eq!(route("/cancel", true, BOT), Route::Cancel);
        assert_eq!(route(keyboards::CANCEL, true, BOT), Route::Cancel);
        assert_eq!(route("/list_students", true, BOT), Route::Wizard);
        assert_eq!(route(keyboards::PROFIT, true, BOT), Route::Wizard);
        assert_eq!(route("Ivan Petrov", true, BOT), Route::Wizard);
    }
}
