use chrono::NaiveDate;

use crate::error::ValidationError;

pub const DATE_FORMAT: &str = "%d.%m.%Y";

/// Parses `DD.MM.YYYY`, rejecting anything else (`31-13-2024`, `2024.01.31`, `foo`).
pub fn parse_date(text: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)
        .map_err(|_| ValidationError::Date(text.trim().to_string()))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Signed number of calendar days from `today` to `end`. Negative once `end` has passed.
pub fn days_until(end: NaiveDate, today: NaiveDate) -> i64 {
    (end - today).num_days()
}

/// Parses a whole amount, tolerating grouping spaces ("3 000") but nothing else.
pub fn parse_amount(text: &str) -> Result<i64, ValidationError> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    compact
        .parse::<i64>()
        .map_err(|_| ValidationError::Amount(text.trim().to_string()))
}
