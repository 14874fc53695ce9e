pub mod calculator;
pub mod dates;
pub mod error;
pub mod models;
pub mod wizard;

pub use calculator::{compute_profit, find_expiring, roster};
pub use error::ValidationError;
pub use models::{
    AggregationWindow, ExpiringStudent, ProfitTotals, RosterEntry, StudentRecord, StudentRow,
};
pub use wizard::{Draft, Transition, WizardSession, WizardStep};

/// Inclusive upper bound of the "expires soon" window, in days.
pub const EXPIRY_WINDOW_DAYS: i64 = 3;
