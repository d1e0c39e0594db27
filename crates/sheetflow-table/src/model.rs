//! Wire shapes of the Sheets v4 API
//!
//! Only the subset the adapter sends or reads. Batch requests serialize in the
//! service's externally-tagged form, e.g. `{"deleteDimension": {"range": ...}}`.

use crate::record::Grid;
use serde::{Deserialize, Serialize};

/// Body of a values read or write
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    /// Range the values cover
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
    /// Rows of formatted cell values; absent when the range is empty
    #[serde(default)]
    pub values: Grid,
}

impl ValueRange {
    /// Create value range for rows
    #[must_use]
    pub fn rows(values: Grid) -> Self {
        Self { range: None, values }
    }
}

/// `spreadsheets.get?fields=sheets.properties` answer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpreadsheetMetadata {
    /// Tabs in display order
    #[serde(default)]
    pub sheets: Vec<SheetEntry>,
}

impl SpreadsheetMetadata {
    /// Tab with a matching title
    #[must_use]
    pub fn find(&self, title: &str) -> Option<&SheetProperties> {
        self.sheets
            .iter()
            .map(|s| &s.properties)
            .find(|p| p.title == title)
    }
}

/// One tab of the spreadsheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetEntry {
    /// Tab properties
    pub properties: SheetProperties,
}

/// Identity of a tab
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetProperties {
    /// Numeric id, stable across renames
    pub sheet_id: i64,
    /// Display name
    pub title: String,
    /// Position among tabs
    #[serde(default)]
    pub index: Option<i64>,
}

/// Axis of a structural edit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Dimension {
    /// Whole rows
    Rows,
    /// Whole columns
    Columns,
}

/// Half-open span of rows or columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionRange {
    /// Target tab
    pub sheet_id: i64,
    /// Axis
    pub dimension: Dimension,
    /// First index, inclusive
    pub start_index: usize,
    /// Last index, exclusive
    pub end_index: usize,
}

/// Rectangle of cells, half-open on both axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridRange {
    /// Target tab
    pub sheet_id: i64,
    /// First row, inclusive
    pub start_row_index: usize,
    /// Last row, exclusive
    pub end_row_index: usize,
    /// First column, inclusive
    pub start_column_index: usize,
    /// Last column, exclusive
    pub end_column_index: usize,
}

/// Cell value as entered by a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedValue {
    /// Text value
    pub string_value: String,
}

/// One cell of an `updateCells` request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellData {
    /// New value
    pub user_entered_value: ExtendedValue,
}

impl CellData {
    /// Text cell
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            user_entered_value: ExtendedValue {
                string_value: value.into(),
            },
        }
    }
}

/// One row of an `updateCells` request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowData {
    /// Cells left to right
    pub values: Vec<CellData>,
}

/// Properties for a new tab
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSheetProperties {
    /// Display name
    pub title: String,
}

/// A single structural or cell edit inside `batchUpdate`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Request {
    /// Remove rows or columns
    DeleteDimension {
        /// Span to remove
        range: DimensionRange,
    },
    /// Overwrite a block of cells
    #[serde(rename_all = "camelCase")]
    UpdateCells {
        /// Target rectangle
        range: GridRange,
        /// Row data
        rows: Vec<RowData>,
        /// Field mask
        fields: String,
    },
    /// Create a tab
    AddSheet {
        /// Tab properties
        properties: NewSheetProperties,
    },
}

impl Request {
    /// Delete `[start, end)` along `dimension`
    #[must_use]
    pub fn delete_dimension(sheet_id: i64, dimension: Dimension, start: usize, end: usize) -> Self {
        Self::DeleteDimension {
            range: DimensionRange {
                sheet_id,
                dimension,
                start_index: start,
                end_index: end,
            },
        }
    }

    /// Write `values` into one row starting at `start_col`
    #[must_use]
    pub fn update_row(sheet_id: i64, row: usize, start_col: usize, values: &[String]) -> Self {
        Self::UpdateCells {
            range: GridRange {
                sheet_id,
                start_row_index: row,
                end_row_index: row + 1,
                start_column_index: start_col,
                end_column_index: start_col + values.len(),
            },
            rows: vec![RowData {
                values: values.iter().map(CellData::text).collect(),
            }],
            fields: "userEnteredValue".to_string(),
        }
    }

    /// Create a tab called `title`
    #[must_use]
    pub fn add_sheet(title: impl Into<String>) -> Self {
        Self::AddSheet {
            properties: NewSheetProperties {
                title: title.into(),
            },
        }
    }

    /// Whether the request changes sheet structure rather than cell values
    #[must_use]
    pub fn is_structural(&self) -> bool {
        !matches!(self, Self::UpdateCells { .. })
    }
}

/// Body of a `batchUpdate` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchUpdate {
    /// Edits applied in order
    pub requests: Vec<Request>,
}
