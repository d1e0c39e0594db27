//! Error types for domain actions

use sheetflow_table::TableError;

/// Domain action error
#[derive(Debug, thiserror::Error)]
pub enum SheetFlowError {
    /// Caller supplied empty or malformed input
    #[error("{0}")]
    InvalidInput(String),

    /// A table lacks columns the action depends on
    #[error("required columns ({}) not found in {table}", .columns.join(", "))]
    MissingColumns { table: String, columns: Vec<String> },

    /// The table has no header or data yet
    #[error("no data found in {0}")]
    EmptyTable(String),

    /// A domain lookup missed
    #[error("{0}")]
    NotFound(String),

    /// Table adapter failure
    #[error(transparent)]
    Table(#[from] TableError),
}

impl SheetFlowError {
    /// Create input validation error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create missing-columns error
    pub fn missing_columns<I, S>(table: &str, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::MissingColumns {
            table: table.to_string(),
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether the failure was a lookup miss at either layer
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Table(e) => e.is_not_found(),
            _ => false,
        }
    }
}

/// Result type alias for domain actions
pub type FlowResult<T> = Result<T, SheetFlowError>;

#[cfg(test)]
mod tests {
    use super::*;
    use sheetflow_table::NotFoundError;

    #[test]
    fn missing_columns_display() {
        let err = SheetFlowError::missing_columns("Sheet4", ["Project ID", "Status"]);
        assert_eq!(
            err.to_string(),
            "required columns (Project ID, Status) not found in Sheet4"
        );
    }

    #[test]
    fn table_not_found_is_not_found() {
        let err: SheetFlowError = TableError::from(NotFoundError::Sheet("Sheet9".into())).into();
        assert!(err.is_not_found());
        assert!(!SheetFlowError::invalid_input("x").is_not_found());
    }
}
