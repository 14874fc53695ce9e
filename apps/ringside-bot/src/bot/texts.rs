//! User-facing copy. Replies are sent with HTML parse mode, so anything that
//! came from the sheet or the operator is escaped.

use ringside_shared::models::MEMBERSHIP_KINDS;
use ringside_shared::{
    ExpiringStudent, ProfitTotals, RosterEntry, StudentRecord, ValidationError, WizardStep,
};
use teloxide::utils::html::escape;

use crate::notify::NotifySummary;

pub fn welcome() -> String {
    "👋 <b>Hi! I'm the CRM bot of the boxing school.</b>\n\n\
     Commands:\n\
     /add_student - register a student\n\
     /list_students - students and days left\n\
     /check - who expires soon\n\
     /profit - payment totals\n\
     /cancel - abort a registration"
        .to_string()
}

/// The question asked on entering `step`.
pub fn prompt(step: WizardStep) -> Option<String> {
    let text = match step {
        WizardStep::Idle => return None,
        WizardStep::AwaitingName => {
            "Enter the student's full name:\n\nℹ️ Send /cancel at any time to abort.".to_string()
        }
        WizardStep::AwaitingPhone => "Enter the phone number:".to_string(),
        WizardStep::AwaitingTelegramId => {
            "Enter the student's Telegram ID (numeric), or \"-\" to skip:".to_string()
        }
        WizardStep::AwaitingMembershipType => format!(
            "Enter the membership type ({}):",
            MEMBERSHIP_KINDS.join(", ")
        ),
        WizardStep::AwaitingStartDate => "Enter the start date (DD.MM.YYYY):".to_string(),
        WizardStep::AwaitingEndDate => "Enter the end date (DD.MM.YYYY):".to_string(),
        WizardStep::AwaitingPayment => "Enter the payment amount:".to_string(),
    };
    Some(text)
}

pub fn rejected(error: &ValidationError) -> String {
    match error {
        ValidationError::Date(_) => {
            "⚠️ That is not a valid date. Use DD.MM.YYYY, for example 05.03.2025.".to_string()
        }
        ValidationError::Amount(_) => "⚠️ The amount must be a whole number.".to_string(),
        ValidationError::MissingField(field) => format!(
            "⚠️ The registration is missing the {}. Send /cancel and start over.",
            field
        ),
    }
}

pub fn student_added(record: &StudentRecord) -> String {
    format!(
        "✅ Student <b>{}</b> added! Days left: {}.",
        escape(&record.full_name),
        record.days_left
    )
}

pub fn append_failed() -> String {
    "❌ Could not save the student to the spreadsheet. The registration was discarded, please try again later."
        .to_string()
}

pub fn backend_unavailable() -> String {
    "❌ The spreadsheet is unavailable right now. Please try again later.".to_string()
}

pub fn cancelled() -> String {
    "❌ Registration cancelled.".to_string()
}

pub fn nothing_to_cancel() -> String {
    "There is nothing to cancel.".to_string()
}

pub fn roster(entries: &[RosterEntry]) -> String {
    if entries.is_empty() {
        return "📋 No students yet.".to_string();
    }
    let mut text = "📋 <b>Students and days left:</b>\n".to_string();
    for entry in entries {
        let days = entry
            .days_left
            .map(|d| d.to_string())
            .unwrap_or_else(|| "?".to_string());
        text.push_str(&format!("{} - {} days\n", escape(&entry.name), days));
    }
    text
}

pub fn expiring(students: &[ExpiringStudent], window_days: i64, summary: NotifySummary) -> String {
    if students.is_empty() {
        return format!("✅ No memberships end in the next {} days.", window_days);
    }
    let mut text = "⏰ <b>Memberships ending soon:</b>\n".to_string();
    for student in students {
        text.push_str(&format!(
            "{} - ends in {} days\n",
            escape(&student.name),
            student.days_left
        ));
    }
    if summary.attempted() > 0 {
        text.push_str(&format!(
            "\n📨 Reminders sent: {}, failed: {}",
            summary.sent, summary.failed
        ));
    }
    text
}

/// Sent to the student directly, as plain text.
pub fn membership_reminder(days_left: i64) -> String {
    format!("Your membership ends in {} days.", days_left)
}

pub fn profit(totals: &ProfitTotals) -> String {
    format!(
        "💰 <b>Profit:</b>\n\
         Today: {} ₽\n\
         This week: {} ₽\n\
         This month: {} ₽",
        totals.today, totals.week, totals.month
    )
}

/// Telegram's cap on one message, in UTF-16 code units.
pub const MESSAGE_LIMIT: usize = 4096;

fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Cuts one overlong line into pieces under the limit without breaking an HTML entity.
fn wrap_line(mut line: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    while utf16_len(line) > MESSAGE_LIMIT {
        let mut units = 0;
        let mut cut = line.len();
        for (idx, ch) in line.char_indices() {
            if units + ch.len_utf16() > MESSAGE_LIMIT {
                cut = idx;
                break;
            }
            units += ch.len_utf16();
        }
        let head = &line[..cut];
        if let Some(amp) = head.rfind('&') {
            if amp > 0 && !head[amp..].contains(';') {
                cut = amp;
            }
        }
        pieces.push(&line[..cut]);
        line = &line[cut..];
    }
    pieces.push(line);
    pieces
}

/// Splits a reply into messages Telegram accepts, breaking at line ends. Tags never
/// span lines in the copy above, so every chunk stays valid HTML.
pub fn split_message(text: &str) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    for line in text.split_inclusive('\n') {
        for piece in wrap_line(line) {
            if !current.is_empty() && utf16_len(&current) + utf16_len(piece) > MESSAGE_LIMIT {
                chunks.push(current.trim_end().to_string());
                current.clear();
            }
            current.push_str(piece);
        }
    }
    if !current.is_empty() || chunks.is_empty() {
        chunks.push(current.trim_end().to_string());
    }
    chunks
}
