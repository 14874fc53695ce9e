use thiserror::Error;

#[derive(Debug, Error)]
pub enum SheetsError {
    #[error("cannot read credentials file {path}: {source}")]
    CredentialsIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed service account credentials: {0}")]
    CredentialsFormat(#[source] serde_json::Error),

    #[error("cannot sign token assertion: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("token exchange failed: {0}")]
    Auth(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request to {url} failed with {status}: {body}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("spreadsheet {0:?} not found or not shared with the service account")]
    SpreadsheetNotFound(String),

    #[error("worksheet {0:?} not found")]
    WorksheetNotFound(String),
}

/// What the record store surfaces to callers. Every backend failure collapses into
/// one non-retriable kind; the source is kept for logs.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("backend unavailable: {0}")]
    BackendUnavailable(#[from] SheetsError),
}
