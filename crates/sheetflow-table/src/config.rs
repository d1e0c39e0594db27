//! Connection settings
//!
//! Built once and validated at construction; nothing reads the environment
//! after that.

use crate::error::TableError;
use sheetflow_auth::{AuthConfig, ServiceAccount, DEFAULT_TOKEN_URL};
use std::time::Duration;

/// Environment variable holding the service-account email
pub const ENV_CLIENT_EMAIL: &str = "GOOGLE_SHEETS_CLIENT_EMAIL";
/// Environment variable holding the newline-escaped PKCS8 key
pub const ENV_PRIVATE_KEY: &str = "GOOGLE_SHEETS_PRIVATE_KEY";
/// Environment variable holding the spreadsheet id
pub const ENV_SPREADSHEET_ID: &str = "GOOGLE_SHEETS_SHEET_ID";
/// Optional API base override
pub const ENV_API_BASE: &str = "SHEETFLOW_API_BASE";
/// Optional token endpoint override
pub const ENV_TOKEN_URL: &str = "SHEETFLOW_TOKEN_URL";
/// Optional HTTP timeout in seconds
pub const ENV_HTTP_TIMEOUT: &str = "SHEETFLOW_HTTP_TIMEOUT_SECS";

/// Sheets v4 REST root
pub const DEFAULT_API_BASE: &str = "https://sheets.googleapis.com/v4";

/// Everything needed to reach one spreadsheet
#[derive(Debug, Clone)]
pub struct SheetsConfig {
    /// Service-account credentials
    pub account: ServiceAccount,
    /// Target spreadsheet
    pub spreadsheet_id: String,
    /// REST root, overridable for tests
    pub api_base: String,
    /// Token exchange settings
    pub auth: AuthConfig,
    /// Per-request timeout
    pub timeout: Duration,
}

impl SheetsConfig {
    /// Create validated configuration
    ///
    /// # Errors
    /// `TableError::Configuration` if the spreadsheet id is empty.
    pub fn new(account: ServiceAccount, spreadsheet_id: impl Into<String>) -> Result<Self, TableError> {
        let spreadsheet_id = spreadsheet_id.into();
        if spreadsheet_id.trim().is_empty() {
            return Err(TableError::Configuration(format!(
                "spreadsheet id ({ENV_SPREADSHEET_ID}) is not set"
            )));
        }
        Ok(Self {
            account,
            spreadsheet_id: spreadsheet_id.trim().to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            auth: AuthConfig::default(),
            timeout: Duration::from_secs(30),
        })
    }

    /// Read configuration from the process environment
    ///
    /// # Errors
    /// `TableError::Configuration` when a required variable is missing, or the
    /// auth error when credentials are empty.
    pub fn from_env() -> Result<Self, TableError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary variable lookup
    ///
    /// # Errors
    /// Same as [`SheetsConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, TableError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| TableError::Configuration(format!("{key} is not set")))
        };

        let account = ServiceAccount::new(required(ENV_CLIENT_EMAIL)?, required(ENV_PRIVATE_KEY)?)?;
        let mut config = Self::new(account, required(ENV_SPREADSHEET_ID)?)?;

        if let Some(base) = lookup(ENV_API_BASE).filter(|v| !v.is_empty()) {
            config = config.with_api_base(base);
        }
        let token_url = lookup(ENV_TOKEN_URL)
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_TOKEN_URL.to_string());
        config.auth = config.auth.with_token_url(token_url);

        if let Some(raw) = lookup(ENV_HTTP_TIMEOUT) {
            let secs = raw.trim().parse::<u64>().map_err(|_| {
                TableError::Configuration(format!("{ENV_HTTP_TIMEOUT} must be whole seconds, got {raw:?}"))
            })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }

    /// With REST root
    #[inline]
    #[must_use]
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into().trim_end_matches('/').to_string();
        self
    }

    /// With request timeout (applies to token exchange too)
    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self.auth = self.auth.with_timeout(timeout);
        self
    }
}
