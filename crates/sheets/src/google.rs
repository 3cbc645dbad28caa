//! Google Sheets row source.
//!
//! Reads the order form responses through the Sheets v4 `values.get`
//! endpoint. One GET per call; the table is never cached, so every inbound
//! message sees the sheet as it is right now.
//!
//! Credentials, in order of preference for the bearer header: a service
//! account (tokens minted and refreshed automatically), a fixed access
//! token. An API key, when set, is sent as the `key` query parameter.

use async_trait::async_trait;
use orderbot_config::SheetConfig;
use orderbot_core::error::SourceError;
use orderbot_core::source::RowSource;
use orderbot_core::table::Table;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::service_account::{SHEETS_READONLY_SCOPE, ServiceAccountAuth, ServiceAccountKey};

/// Row source backed by a Google Sheets range.
pub struct GoogleSheetsSource {
    base_url: reqwest::Url,
    spreadsheet_id: String,
    range: String,
    api_key: Option<String>,
    access_token: Option<String>,
    service_account: Option<ServiceAccountAuth>,
    client: reqwest::Client,
}

/// `Some` only for a value that is not blank.
fn non_empty(value: &Option<String>) -> Option<String> {
    value.clone().filter(|v| !v.trim().is_empty())
}

/// Inline credentials JSON wins over a key file path.
fn load_service_account_key(config: &SheetConfig) -> Result<Option<ServiceAccountKey>, SourceError> {
    if let Some(json) = non_empty(&config.credentials) {
        return ServiceAccountKey::from_json(&json).map(Some);
    }

    let Some(path) = config
        .credentials_path
        .as_ref()
        .filter(|p| !p.as_os_str().is_empty())
    else {
        return Ok(None);
    };

    let json = std::fs::read_to_string(path).map_err(|e| {
        SourceError::NotConfigured(format!("cannot read {}: {e}", path.display()))
    })?;
    ServiceAccountKey::from_json(&json).map(Some)
}

impl std::fmt::Debug for GoogleSheetsSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleSheetsSource")
            .field("base_url", &self.base_url.as_str())
            .field("spreadsheet_id", &self.spreadsheet_id)
            .field("range", &self.range)
            .finish_non_exhaustive()
    }
}

impl GoogleSheetsSource {
    /// Build a source from the `[sheet]` configuration section.
    ///
    /// Fails when the spreadsheet ID or every credential is missing. Blank
    /// values count as missing.
    pub fn from_config(config: &SheetConfig) -> Result<Self, SourceError> {
        let spreadsheet_id = non_empty(&config.spreadsheet_id)
            .ok_or_else(|| SourceError::NotConfigured("sheet.spreadsheet_id is not set".into()))?;

        let api_key = non_empty(&config.api_key);
        let access_token = non_empty(&config.access_token);
        let service_account_key = load_service_account_key(config)?;

        if api_key.is_none() && access_token.is_none() && service_account_key.is_none() {
            return Err(SourceError::NotConfigured(
                "set sheet.credentials, sheet.credentials_path, sheet.api_key or sheet.access_token"
                    .into(),
            ));
        }

        let base_url = reqwest::Url::parse(&config.api_base).map_err(|e| {
            SourceError::NotConfigured(format!("invalid sheet.api_base '{}': {e}", config.api_base))
        })?;

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SourceError::Http(format!("failed to create HTTP client: {e}")))?;

        let service_account = service_account_key
            .map(|key| ServiceAccountAuth::new(key, SHEETS_READONLY_SCOPE, client.clone()))
            .transpose()?;
        if let Some(auth) = &service_account {
            info!(account = %auth.client_email(), "Using service account for Google Sheets");
        }

        Ok(Self {
            base_url,
            spreadsheet_id,
            range: config.range.clone(),
            api_key,
            access_token,
            service_account,
            client,
        })
    }

    /// Bearer token for the next request, if any.
    async fn bearer_token(&self) -> Result<Option<String>, SourceError> {
        match &self.service_account {
            Some(auth) => auth.access_token().await.map(Some),
            None => Ok(self.access_token.clone()),
        }
    }

    /// `{base}/v4/spreadsheets/{id}/values/{range}`, with the range
    /// percent-encoded as a single path segment.
    pub fn values_url(&self) -> Result<reqwest::Url, SourceError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                SourceError::NotConfigured(format!(
                    "sheet.api_base cannot be a base URL: {}",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend([
                "v4",
                "spreadsheets",
                self.spreadsheet_id.as_str(),
                "values",
                self.range.as_str(),
            ]);

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("majorDimension", "ROWS");
            if let Some(key) = &self.api_key {
                query.append_pair("key", key);
            }
        }

        Ok(url)
    }
}

/// Response body of `spreadsheets.values.get`.
#[derive(Debug, Deserialize)]
struct ValueRange {
    /// Absent when the range holds no data.
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

/// Formatted values are strings, but numbers and booleans can slip through
/// with other render options.
fn cell_to_string(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Decode a `values.get` body into a table.
pub fn parse_value_range(body: &str) -> Result<Table, SourceError> {
    let range: ValueRange = serde_json::from_str(body)
        .map_err(|e| SourceError::MalformedResponse(format!("Failed to parse response: {e}")))?;

    Ok(Table::new(
        range
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect(),
    ))
}

#[async_trait]
impl RowSource for GoogleSheetsSource {
    fn name(&self) -> &str {
        "google_sheets"
    }

    async fn fetch_table(&self) -> Result<Table, SourceError> {
        let url = self.values_url()?;
        debug!(spreadsheet_id = %self.spreadsheet_id, range = %self.range, "Fetching order table");

        let mut request = self.client.get(url);
        if let Some(token) = self.bearer_token().await? {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SourceError::Http(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| SourceError::Http(e.to_string()))?;

        if !(200..300).contains(&status) {
            warn!(status, body = %body, "Sheets API returned error");
            return Err(SourceError::Status {
                status_code: status,
                message: body,
            });
        }

        let table = parse_value_range(&body)?;
        debug!(rows = table.len(), "Order table fetched");
        Ok(table)
    }
}
