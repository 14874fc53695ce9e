use std::path::PathBuf;

use clap::Parser;
use ringside_shared::EXPIRY_WINDOW_DAYS;
use ringside_sheets::SpreadsheetLocator;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Student registry bot for a boxing school", long_about = None)]
pub struct Config {
    /// Telegram bot token
    #[arg(long, env = "BOT_TOKEN", hide_env_values = true)]
    pub bot_token: String,

    /// Google service-account key file
    #[arg(long, env = "GOOGLE_CREDENTIALS", default_value = "credentials.json")]
    pub credentials: PathBuf,

    /// Spreadsheet title, looked up at startup
    #[arg(long, env = "SPREADSHEET_NAME", required_unless_present = "spreadsheet_id")]
    pub spreadsheet_name: Option<String>,

    /// Spreadsheet id; skips the title lookup
    #[arg(long, env = "SPREADSHEET_ID")]
    pub spreadsheet_id: Option<String>,

    /// Worksheet title (default: the first sheet)
    #[arg(long, env = "WORKSHEET")]
    pub worksheet: Option<String>,

    /// Memberships ending within this many days count as expiring
    #[arg(
        long,
        env = "EXPIRY_WINDOW_DAYS",
        default_value_t = EXPIRY_WINDOW_DAYS,
        value_parser = clap::value_parser!(i64).range(0..)
    )]
    pub expiry_window_days: i64,
}

impl Config {
    pub fn locator(&self) -> SpreadsheetLocator {
        match (&self.spreadsheet_id, &self.spreadsheet_name) {
            (Some(id), _) => SpreadsheetLocator::Id(id.clone()),
            (None, Some(name)) => SpreadsheetLocator::Title(name.clone()),
            // clap enforces one of the two
            (None, None) => SpreadsheetLocator::Title(String::new()),
        }
    }
}
