//! Remote spreadsheet transport
//!
//! `SheetsTransport` is the seam between table semantics and the wire. The
//! production implementation speaks Sheets v4 REST over `reqwest`; tests swap
//! in an in-memory spreadsheet or a mock.

use crate::config::SheetsConfig;
use crate::error::{TableError, TableResult};
use crate::model::{BatchUpdate, Request, SpreadsheetMetadata, ValueRange};
use crate::record::Grid;
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use sheetflow_auth::{TokenProvider, TokenSource};
use std::sync::Arc;

/// Operations the remote spreadsheet service exposes
///
/// Ranges are A1 strings (`Sheet1`, `Sheet1!C1`, `'My Tab'!A1:D1`).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SheetsTransport: Send + Sync {
    /// Read the values in `range`
    async fn get_values(&self, range: &str) -> TableResult<ValueRange>;

    /// Append rows after the table found at `range`
    async fn append_values(&self, range: &str, rows: Grid) -> TableResult<()>;

    /// Overwrite values starting at `range`
    async fn update_values(&self, range: &str, rows: Grid) -> TableResult<()>;

    /// Apply structural and cell edits in order
    async fn batch_update(&self, requests: Vec<Request>) -> TableResult<()>;

    /// Tab ids and titles
    async fn get_metadata(&self) -> TableResult<SpreadsheetMetadata>;
}

#[async_trait]
impl<T: SheetsTransport + ?Sized> SheetsTransport for Arc<T> {
    async fn get_values(&self, range: &str) -> TableResult<ValueRange> {
        (**self).get_values(range).await
    }

    async fn append_values(&self, range: &str, rows: Grid) -> TableResult<()> {
        (**self).append_values(range, rows).await
    }

    async fn update_values(&self, range: &str, rows: Grid) -> TableResult<()> {
        (**self).update_values(range, rows).await
    }

    async fn batch_update(&self, requests: Vec<Request>) -> TableResult<()> {
        (**self).batch_update(requests).await
    }

    async fn get_metadata(&self) -> TableResult<SpreadsheetMetadata> {
        (**self).get_metadata().await
    }
}

/// Sheets v4 REST transport
#[derive(Debug)]
pub struct HttpTransport<S = TokenProvider> {
    client: reqwest::Client,
    api_base: String,
    spreadsheet_id: String,
    tokens: S,
}

impl HttpTransport<TokenProvider> {
    /// Create transport authenticating with the configured service account
    ///
    /// # Errors
    /// `TableError::Transport` if the HTTP client cannot be built.
    pub fn from_config(config: &SheetsConfig) -> TableResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        let tokens = TokenProvider::with_client(
            config.account.clone(),
            config.auth.clone(),
            client.clone(),
        );
        Ok(Self::with_client(
            client,
            &config.api_base,
            &config.spreadsheet_id,
            tokens,
        ))
    }
}

impl<S: TokenSource> HttpTransport<S> {
    /// Create transport with an explicit token source
    #[must_use]
    pub fn with_client(
        client: reqwest::Client,
        api_base: &str,
        spreadsheet_id: &str,
        tokens: S,
    ) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            spreadsheet_id: spreadsheet_id.to_string(),
            tokens,
        }
    }

    fn spreadsheet_url(&self) -> String {
        format!("{}/spreadsheets/{}", self.api_base, self.spreadsheet_id)
    }

    fn values_url(&self, range: &str) -> String {
        format!(
            "{}/values/{}",
            self.spreadsheet_url(),
            urlencoding::encode(range)
        )
    }

    async fn send(&self, method: Method, url: String, body: Option<serde_json::Value>) -> TableResult<String> {
        let token = self.tokens.access_token().await?;

        let mut request: RequestBuilder = self
            .client
            .request(method.clone(), &url)
            .bearer_auth(token.secret());
        if let Some(body) = body {
            request = request.json(&body);
        }

        tracing::debug!(%method, %url, "sheets request");
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            return Ok(text);
        }
        if status == StatusCode::UNAUTHORIZED {
            self.tokens.invalidate().await;
        }
        tracing::warn!(%method, %url, %status, "sheets request failed");
        Err(TableError::api(status.as_u16(), text))
    }
}

#[async_trait]
impl<S: TokenSource> SheetsTransport for HttpTransport<S> {
    async fn get_values(&self, range: &str) -> TableResult<ValueRange> {
        let body = self.send(Method::GET, self.values_url(range), None).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn append_values(&self, range: &str, rows: Grid) -> TableResult<()> {
        let url = format!(
            "{}:append?valueInputOption=USER_ENTERED",
            self.values_url(range)
        );
        let body = serde_json::to_value(ValueRange::rows(rows))?;
        self.send(Method::POST, url, Some(body)).await.map(drop)
    }

    async fn update_values(&self, range: &str, rows: Grid) -> TableResult<()> {
        let url = format!("{}?valueInputOption=USER_ENTERED", self.values_url(range));
        let body = serde_json::to_value(ValueRange::rows(rows))?;
        self.send(Method::PUT, url, Some(body)).await.map(drop)
    }

    async fn batch_update(&self, requests: Vec<Request>) -> TableResult<()> {
        let url = format!("{}:batchUpdate", self.spreadsheet_url());
        tracing::debug!(
            requests = requests.len(),
            structural = requests.iter().any(Request::is_structural),
            "batch update"
        );
        let body = serde_json::to_value(BatchUpdate { requests })?;
        self.send(Method::POST, url, Some(body)).await.map(drop)
    }

    async fn get_metadata(&self) -> TableResult<SpreadsheetMetadata> {
        let url = format!("{}?fields=sheets.properties", self.spreadsheet_url());
        let body = self.send(Method::GET, url, None).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetflow_auth::StaticToken;

    fn transport() -> HttpTransport<StaticToken> {
        HttpTransport::with_client(
            reqwest::Client::new(),
            "https://sheets.example/v4/",
            "sheet-abc",
            StaticToken("t".to_string()),
        )
    }

    #[test]
    fn values_url_encodes_range() {
        assert_eq!(
            transport().values_url("'My Tab'!A1:C1"),
            "https://sheets.example/v4/spreadsheets/sheet-abc/values/%27My%20Tab%27%21A1%3AC1"
        );
    }

    #[test]
    fn spreadsheet_url_trims_slash() {
        assert_eq!(
            transport().spreadsheet_url(),
            "https://sheets.example/v4/spreadsheets/sheet-abc"
        );
    }
}
