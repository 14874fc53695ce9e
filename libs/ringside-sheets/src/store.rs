use std::collections::HashMap;

use async_trait::async_trait;
use ringside_shared::models::{Cell, StudentRecord, StudentRow, columns};
use serde_json::{Value, json};
use tracing::{error, info, warn};

use crate::client::{SheetsClient, sheet_range};
use crate::error::{SheetsError, StoreError};

/// Where student records live. Each call is one backend round trip.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn list_records(&self) -> Result<Vec<StudentRow>, StoreError>;

    /// Not idempotent: retrying after an ambiguous failure may duplicate the row.
    async fn append_record(&self, record: &StudentRecord) -> Result<(), StoreError>;
}

#[derive(Debug, Clone)]
pub enum SpreadsheetLocator {
    Id(String),
    Title(String),
}

/// Record store backed by one worksheet whose first row holds the column headers.
#[derive(Clone)]
pub struct SheetsRecordStore {
    client: SheetsClient,
    spreadsheet_id: String,
    worksheet: String,
}

impl SheetsRecordStore {
    /// Resolves the document and worksheet up front so a misconfigured name fails at startup.
    pub async fn open(
        client: SheetsClient,
        locator: SpreadsheetLocator,
        worksheet: Option<String>,
    ) -> Result<Self, SheetsError> {
        let spreadsheet_id = match locator {
            SpreadsheetLocator::Id(id) => id,
            SpreadsheetLocator::Title(title) => client.find_spreadsheet(&title).await?,
        };

        let titles = client.worksheet_titles(&spreadsheet_id).await?;
        let worksheet = match worksheet {
            Some(wanted) if titles.contains(&wanted) => wanted,
            Some(wanted) => return Err(SheetsError::WorksheetNotFound(wanted)),
            None => titles
                .into_iter()
                .next()
                .ok_or_else(|| SheetsError::WorksheetNotFound("<first sheet>".to_string()))?,
        };

        info!("Using worksheet {:?} of spreadsheet {}", worksheet, spreadsheet_id);
        Ok(Self {
            client,
            spreadsheet_id,
            worksheet,
        })
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    pub fn worksheet(&self) -> &str {
        &self.worksheet
    }
}

#[async_trait]
impl RecordStore for SheetsRecordStore {
    async fn list_records(&self) -> Result<Vec<StudentRow>, StoreError> {
        let values = self
            .client
            .get_values(&self.spreadsheet_id, &sheet_range(&self.worksheet))
            .await
            .map_err(|e| {
                error!("Failed to read students: {}", e);
                e
            })?;
        Ok(rows_from_values(values))
    }

    async fn append_record(&self, record: &StudentRecord) -> Result<(), StoreError> {
        let range = format!("{}!A1", sheet_range(&self.worksheet));
        self.client
            .append_row(&self.spreadsheet_id, &range, &row_values(record))
            .await
            .map_err(|e| {
                error!("Failed to append {:?}: {}", record.full_name, e);
                StoreError::from(e)
            })?;
        info!("Appended student {:?}", record.full_name);
        Ok(())
    }
}

/// Maps rows to records by the header row. Missing columns read as empty text,
/// blank rows are dropped.
pub fn rows_from_values(values: Vec<Vec<String>>) -> Vec<StudentRow> {
    let mut rows = values.into_iter();
    let Some(header) = rows.next() else {
        return Vec::new();
    };
    let index: HashMap<String, usize> = header
        .into_iter()
        .enumerate()
        .map(|(i, name)| (name.trim().to_string(), i))
        .collect();

    for required in [columns::FULL_NAME, columns::END_DATE, columns::START_DATE, columns::PAYMENT_AMOUNT] {
        if !index.contains_key(required) {
            warn!("Worksheet has no {:?} column", required);
        }
    }

    rows.filter(|cells| cells.iter().any(|c| !c.trim().is_empty()))
        .map(|cells| {
            let get = |column: &str| {
                index
                    .get(column)
                    .and_then(|&i| cells.get(i))
                    .map(|c| c.trim().to_string())
                    .unwrap_or_default()
            };
            let telegram_id = get(columns::TELEGRAM_ID);
            StudentRow {
                full_name: get(columns::FULL_NAME),
                phone: get(columns::PHONE),
                telegram_id: (!telegram_id.is_empty()).then_some(telegram_id),
                days_left: get(columns::DAYS_LEFT),
                membership_type: get(columns::MEMBERSHIP_TYPE),
                start_date: get(columns::START_DATE),
                end_date: get(columns::END_DATE),
                payment_amount: get(columns::PAYMENT_AMOUNT),
            }
        })
        .collect()
}

fn row_values(record: &StudentRecord) -> Vec<Value> {
    record
        .to_cells()
        .into_iter()
        .map(|cell| match cell {
            Cell::Text(s) => json!(s),
            Cell::Number(n) => json!(n),
        })
        .collect()
}
