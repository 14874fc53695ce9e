use std::sync::Arc;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::auth::TokenProvider;
use crate::error::SheetsError;

pub const SHEETS_API: &str = "https://sheets.googleapis.com/v4";
pub const DRIVE_API: &str = "https://www.googleapis.com/drive/v3";
const SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";

/// Thin async client over the Sheets v4 and Drive v3 REST APIs.
#[derive(Clone)]
pub struct SheetsClient {
    http: Client,
    auth: Arc<dyn TokenProvider>,
    sheets_base: String,
    drive_base: String,
}

#[derive(Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Deserialize)]
struct DriveFile {
    id: String,
}

#[derive(Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AppendBody<'a> {
    major_dimension: &'a str,
    values: [&'a [Value]; 1],
}

impl SheetsClient {
    pub fn new(auth: Arc<dyn TokenProvider>) -> Self {
        Self {
            http: Client::new(),
            auth,
            sheets_base: SHEETS_API.to_string(),
            drive_base: DRIVE_API.to_string(),
        }
    }

    pub fn with_base_urls(mut self, sheets_base: impl Into<String>, drive_base: impl Into<String>) -> Self {
        self.sheets_base = sheets_base.into();
        self.drive_base = drive_base.into();
        self
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, SheetsError> {
        let token = self.auth.access_token().await?;
        let resp = self.http.get(url).bearer_auth(token).send().await?;
        Self::check(url, resp).await?.json().await.map_err(SheetsError::from)
    }

    async fn post<B: Serialize>(&self, url: &str, body: &B) -> Result<(), SheetsError> {
        let token = self.auth.access_token().await?;
        let resp = self.http.post(url).bearer_auth(token).json(body).send().await?;
        Self::check(url, resp).await?;
        Ok(())
    }

    async fn check(url: &str, resp: reqwest::Response) -> Result<reqwest::Response, SheetsError> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        Err(SheetsError::Status {
            url: url.to_string(),
            status,
            body,
        })
    }

    /// Resolves a spreadsheet id from its human-readable title.
    pub async fn find_spreadsheet(&self, title: &str) -> Result<String, SheetsError> {
        let escaped = title.replace('\\', "\\\\").replace('\'', "\\'");
        let query = format!(
            "name = '{}' and mimeType = '{}' and trashed = false",
            escaped, SPREADSHEET_MIME
        );
        let url = format!(
            "{}/files?q={}&fields={}&pageSize=1&supportsAllDrives=true&includeItemsFromAllDrives=true",
            self.drive_base,
            urlencoding::encode(&query),
            urlencoding::encode("files(id,name)")
        );
        let list: FileList = self.get(&url).await?;
        list.files
            .into_iter()
            .next()
            .map(|f| f.id)
            .ok_or_else(|| SheetsError::SpreadsheetNotFound(title.to_string()))
    }

    pub async fn worksheet_titles(&self, spreadsheet_id: &str) -> Result<Vec<String>, SheetsError> {
        let url = format!(
            "{}/spreadsheets/{}?fields={}",
            self.sheets_base,
            spreadsheet_id,
            urlencoding::encode("sheets.properties.title")
        );
        let meta: SpreadsheetMeta = self.get(&url).await?;
        Ok(meta.sheets.into_iter().map(|s| s.properties.title).collect())
    }

    /// All cells of `range` as displayed in the sheet, one `Vec` per row.
    pub async fn get_values(&self, spreadsheet_id: &str, range: &str) -> Result<Vec<Vec<String>>, SheetsError> {
        let url = format!(
            "{}/spreadsheets/{}/values/{}?majorDimension=ROWS&valueRenderOption=FORMATTED_VALUE",
            self.sheets_base,
            spreadsheet_id,
            urlencoding::encode(range)
        );
        let range: ValueRange = self.get(&url).await?;
        debug!("Fetched {} rows from {}", range.values.len(), spreadsheet_id);
        Ok(range
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }

    /// Appends one row after the last non-empty row of `range`. Values are stored as sent.
    pub async fn append_row(&self, spreadsheet_id: &str, range: &str, row: &[Value]) -> Result<(), SheetsError> {
        let url = format!(
            "{}/spreadsheets/{}/values/{}:append?valueInputOption=RAW&insertDataOption=INSERT_ROWS",
            self.sheets_base,
            spreadsheet_id,
            urlencoding::encode(range)
        );
        self.post(
            &url,
            &AppendBody {
                major_dimension: "ROWS",
                values: [row],
            },
        )
        .await
    }
}

fn cell_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// A1 reference to a whole worksheet: `'Title'` with embedded quotes doubled.
pub fn sheet_range(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}
