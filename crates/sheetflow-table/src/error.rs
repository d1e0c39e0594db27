//! Error types for table operations
//!
//! Lookups fail with `NotFoundError`; everything that talks to the remote
//! service folds into `TableError`.

use sheetflow_auth::AuthError;

/// A named sheet, column or row does not exist
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotFoundError {
    /// No tab with this title
    #[error("sheet \"{0}\" not found")]
    Sheet(String),

    /// No header with this name
    #[error("column \"{column}\" not found in {table}")]
    Column {
        /// Tab searched
        table: String,
        /// Header text looked for
        column: String,
    },

    /// Row index beyond the table, or no row matching a lookup
    #[error("row {row} not found in {table}")]
    Row {
        /// Tab searched
        table: String,
        /// Grid position or lookup key
        row: String,
    },
}

impl NotFoundError {
    /// Create column lookup miss
    pub fn column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::Column {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Create row lookup miss
    pub fn row(table: impl Into<String>, row: impl ToString) -> Self {
        Self::Row {
            table: table.into(),
            row: row.to_string(),
        }
    }
}

/// Table adapter error
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// Missing credentials or spreadsheet id
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Token acquisition failed
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),

    /// Sheet, column or row lookup miss
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    /// Non-2xx answer from the spreadsheet service
    #[error("spreadsheet api returned {status}: {body}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// Request could not be sent or its body not read
    #[error("transport error: {0}")]
    Transport(String),

    /// Response body did not have the expected shape
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// Malformed range or mismatched value count
    #[error("invalid range: {0}")]
    InvalidRange(String),
}

impl TableError {
    /// Create API error from status and raw body
    pub fn api(status: u16, body: impl Into<String>) -> Self {
        Self::Api {
            status,
            body: body.into(),
        }
    }

    /// Whether this is a lookup miss
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Whether the error came from configuration or credentials
    #[inline]
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        match self {
            Self::Configuration(_) => true,
            Self::Auth(e) => e.is_configuration(),
            _ => false,
        }
    }
}

impl From<reqwest::Error> for TableError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for TableError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Result type alias for table operations
pub type TableResult<T> = Result<T, TableError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_not_found_display() {
        let err: TableError = NotFoundError::column("Sheet1", "Role").into();
        assert_eq!(err.to_string(), "column \"Role\" not found in Sheet1");
        assert!(err.is_not_found());
    }

    #[test]
    fn api_error_keeps_body() {
        let err = TableError::api(403, "{\"error\":\"PERMISSION_DENIED\"}");
        assert!(err.to_string().contains("PERMISSION_DENIED"));
        assert!(!err.is_not_found());
    }

    #[test]
    fn auth_configuration_propagates() {
        let err: TableError = AuthError::configuration("no email").into();
        assert!(err.is_configuration());
    }
}
