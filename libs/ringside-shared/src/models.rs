use chrono::NaiveDate;

use crate::dates::format_date;

/// Header names of the backing worksheet.
pub mod columns {
    pub const FULL_NAME: &str = "Full Name";
    pub const PHONE: &str = "Phone";
    pub const TELEGRAM_ID: &str = "Telegram ID";
    pub const DAYS_LEFT: &str = "Days Left";
    pub const MEMBERSHIP_TYPE: &str = "Membership Type";
    pub const START_DATE: &str = "Start Date";
    pub const END_DATE: &str = "End Date";
    pub const PAYMENT_AMOUNT: &str = "Payment Amount";

    /// Positional order of an appended row.
    pub const ORDER: [&str; 8] = [
        FULL_NAME,
        PHONE,
        TELEGRAM_ID,
        DAYS_LEFT,
        MEMBERSHIP_TYPE,
        START_DATE,
        END_DATE,
        PAYMENT_AMOUNT,
    ];
}

/// Suggested membership kinds. The wizard stores whatever the operator types.
pub const MEMBERSHIP_KINDS: [&str; 3] = ["Group", "Small group", "Individual"];

/// A fully validated registration, ready to be appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentRecord {
    pub full_name: String,
    pub phone: String,
    pub telegram_id: Option<String>,
    /// Computed once at commit time, never refreshed by this crate.
    pub days_left: i64,
    pub membership_type: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub payment_amount: i64,
}

/// One cell of an appended row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Text(String),
    Number(i64),
}

impl StudentRecord {
    /// The 8 positional cells in the order of [`columns::ORDER`].
    pub fn to_cells(&self) -> [Cell; 8] {
        [
            Cell::Text(self.full_name.clone()),
            Cell::Text(self.phone.clone()),
            Cell::Text(self.telegram_id.clone().unwrap_or_default()),
            Cell::Number(self.days_left),
            Cell::Text(self.membership_type.clone()),
            Cell::Text(format_date(self.start_date)),
            Cell::Text(format_date(self.end_date)),
            Cell::Number(self.payment_amount),
        ]
    }
}

/// One row as read back from the worksheet. Dates and amounts stay as text because
/// the sheet is edited by hand and any of them may be malformed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentRow {
    pub full_name: String,
    pub phone: String,
    pub telegram_id: Option<String>,
    pub days_left: String,
    pub membership_type: String,
    pub start_date: String,
    pub end_date: String,
    pub payment_amount: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiringStudent {
    pub name: String,
    pub days_left: i64,
    pub telegram_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub name: String,
    pub days_left: Option<i64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProfitTotals {
    pub today: i64,
    pub week: i64,
    pub month: i64,
}

/// Everything the read-only reports need, computed per request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregationWindow {
    pub profit: ProfitTotals,
    pub expiring: Vec<ExpiringStudent>,
}
