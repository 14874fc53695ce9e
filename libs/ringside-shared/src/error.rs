use thiserror::Error;

/// Rejected user or row input. Never fatal: the wizard re-prompts and the
/// read-side calculators skip the offending row.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("expected a date in DD.MM.YYYY form, got {0:?}")]
    Date(String),

    #[error("expected a whole number, got {0:?}")]
    Amount(String),

    #[error("registration is missing the {0} field")]
    MissingField(&'static str),
}
