pub mod auth;
pub mod client;
pub mod error;
pub mod store;

pub use auth::{ServiceAccountAuth, ServiceAccountKey, TokenProvider};
pub use client::SheetsClient;
pub use error::{SheetsError, StoreError};
pub use store::{RecordStore, SheetsRecordStore, SpreadsheetLocator};
