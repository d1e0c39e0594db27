//! Spreadsheet tabs as header-addressed tables
//!
//! Row 0 of every tab is the header; callers name columns by header text and
//! rows by their zero-based position in the full grid (header included).
//! Structural deletes shift every later row up by one, so positions computed
//! before a delete are stale afterwards.

use crate::a1::A1Range;
use crate::error::{NotFoundError, TableError, TableResult};
use crate::model::{Dimension, Request};
use crate::record::{cell, Grid, Record};
use crate::transport::SheetsTransport;

/// What `append_record` does with keys missing from the header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemaPolicy {
    /// Add one column per missing key, to the right, before writing
    #[default]
    Evolve,
    /// Reject the record; schema changes go through `ensure_columns`
    Strict,
}

/// Table operations over a spreadsheet transport
#[derive(Debug)]
pub struct SheetTable<T> {
    transport: T,
    policy: SchemaPolicy,
}

impl<T: SheetsTransport> SheetTable<T> {
    /// Create adapter with the default `Evolve` policy
    #[inline]
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            policy: SchemaPolicy::default(),
        }
    }

    /// With schema policy
    #[inline]
    #[must_use]
    pub fn with_policy(mut self, policy: SchemaPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Schema policy in use
    #[inline]
    #[must_use]
    pub fn policy(&self) -> SchemaPolicy {
        self.policy
    }

    /// Underlying transport
    #[inline]
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Full value grid; empty (not an error) when the tab has no data
    pub async fn read_table(&self, name: &str) -> TableResult<Grid> {
        let range = A1Range::sheet(name).to_string();
        let values = self.transport.get_values(&range).await?.values;
        tracing::debug!(table = name, rows = values.len(), "read table");
        Ok(values)
    }

    /// Header row, empty when the tab has no data
    pub async fn headers(&self, name: &str) -> TableResult<Vec<String>> {
        Ok(self.read_table(name).await?.into_iter().next().unwrap_or_default())
    }

    /// Full value grid, creating the tab first when it does not exist
    ///
    /// A read of a missing tab is rejected by the service with status 400;
    /// only then is the tab list consulted, so existing tabs cost one call.
    pub async fn read_or_create(&self, name: &str) -> TableResult<Grid> {
        match self.read_table(name).await {
            Err(err @ TableError::Api { status: 400, .. }) => {
                if self.ensure_table(name).await? {
                    Ok(Grid::new())
                } else {
                    Err(err)
                }
            }
            other => other,
        }
    }

    async fn headers_or_create(&self, name: &str) -> TableResult<Vec<String>> {
        Ok(self.read_or_create(name).await?.into_iter().next().unwrap_or_default())
    }

    /// Append one row aligned to the header
    ///
    /// A missing tab is created and an empty tab gets a header synthesized
    /// from the record's keys first.
    /// Keys missing from an existing header are added as new columns under
    /// `SchemaPolicy::Evolve` and rejected under `SchemaPolicy::Strict`.
    /// Absent fields are written as empty strings. An empty record is a no-op.
    pub async fn append_record(&self, name: &str, record: &Record) -> TableResult<()> {
        if record.is_empty() {
            return Ok(());
        }

        let mut headers = self.headers_or_create(name).await?;
        if headers.is_empty() {
            tracing::info!(table = name, "synthesizing header row");
            self.write_header(name, &Record::header(record.keys())).await?;
            headers = record.keys().map(str::to_string).collect();
        } else {
            let missing: Vec<&str> = record
                .keys()
                .filter(|k| !headers.iter().any(|h| h == *k))
                .collect();
            if let Some(first) = missing.first() {
                if self.policy == SchemaPolicy::Strict {
                    return Err(NotFoundError::column(name, *first).into());
                }
                self.ensure_columns(name, missing.iter().copied()).await?;
                headers = self.headers(name).await?;
            }
        }

        let row = record.align(&headers);
        self.transport
            .append_values(&A1Range::cell(name, 0, 0).to_string(), vec![row])
            .await?;
        tracing::debug!(table = name, "appended row");
        Ok(())
    }

    /// Write or extend the header row itself
    ///
    /// Existing headers keep their position; record keys not yet present are
    /// appended. Each header cell takes the record's non-empty value for that
    /// header, otherwise the header name. A missing tab is created.
    pub async fn write_header(&self, name: &str, record: &Record) -> TableResult<()> {
        let mut headers = self.headers_or_create(name).await?;
        for key in record.keys() {
            if !headers.iter().any(|h| h == key) {
                headers.push(key.to_string());
            }
        }

        let cells: Vec<String> = headers
            .iter()
            .map(|h| {
                record
                    .get(h)
                    .filter(|v| !v.is_empty())
                    .unwrap_or(h.as_str())
                    .to_string()
            })
            .collect();

        let range = A1Range::row_span(name, 0, 0, cells.len());
        self.transport
            .update_values(&range.to_string(), vec![cells])
            .await
    }

    /// Add every column not already in the header, returning the ones added
    pub async fn ensure_columns<'c, I>(&self, name: &str, columns: I) -> TableResult<Vec<String>>
    where
        I: IntoIterator<Item = &'c str>,
    {
        let headers = self.headers(name).await?;
        let mut added: Vec<String> = Vec::new();
        for column in columns {
            if headers.iter().any(|h| h == column) || added.iter().any(|a| a == column) {
                continue;
            }
            self.add_column(name, column).await?;
            added.push(column.to_string());
        }
        Ok(added)
    }

    /// Write `column` into the first free header cell
    pub async fn add_column(&self, name: &str, column: &str) -> TableResult<()> {
        let next = self.headers(name).await?.len();
        let range = A1Range::cell(name, next, 0);
        tracing::info!(table = name, column, at = %range, "adding column");
        self.transport
            .update_values(&range.to_string(), vec![vec![column.to_string()]])
            .await
    }

    /// Overwrite the header cell of `old` with `new`
    ///
    /// # Errors
    /// `NotFoundError::Column` if `old` is not a header; nothing is written.
    pub async fn rename_column(&self, name: &str, old: &str, new: &str) -> TableResult<()> {
        let index = self.column_index(name, old).await?;
        let range = A1Range::cell(name, index, 0);
        tracing::info!(table = name, old, new, "renaming column");
        self.transport
            .update_values(&range.to_string(), vec![vec![new.to_string()]])
            .await
    }

    /// Remove a column and everything in it
    ///
    /// # Errors
    /// `NotFoundError::Column` if the column does not exist; nothing is deleted.
    pub async fn delete_column(&self, name: &str, column: &str) -> TableResult<()> {
        let index = self.column_index(name, column).await?;
        let sheet_id = self.resolve_sheet_id(name).await?;
        tracing::info!(table = name, column, index, "deleting column");
        self.transport
            .batch_update(vec![Request::delete_dimension(
                sheet_id,
                Dimension::Columns,
                index,
                index + 1,
            )])
            .await
    }

    /// Remove the row at `row_index`; later rows move up by one
    pub async fn delete_row(&self, name: &str, row_index: usize) -> TableResult<()> {
        let sheet_id = self.resolve_sheet_id(name).await?;
        tracing::info!(table = name, row_index, "deleting row");
        self.transport
            .batch_update(vec![Request::delete_dimension(
                sheet_id,
                Dimension::Rows,
                row_index,
                row_index + 1,
            )])
            .await
    }

    /// Overwrite columns `[start_col, end_col)` of one row
    ///
    /// # Errors
    /// `TableError::InvalidRange` unless `values` has exactly one entry per column.
    pub async fn update_cell_range(
        &self,
        name: &str,
        row_index: usize,
        start_col: usize,
        end_col: usize,
        values: &[String],
    ) -> TableResult<()> {
        if end_col <= start_col || values.len() != end_col - start_col {
            return Err(TableError::InvalidRange(format!(
                "{} values for columns {start_col}..{end_col} of {name}",
                values.len()
            )));
        }

        let sheet_id = self.resolve_sheet_id(name).await?;
        tracing::debug!(table = name, row_index, start_col, end_col, "updating cells");
        self.transport
            .batch_update(vec![Request::update_row(sheet_id, row_index, start_col, values)])
            .await
    }

    /// Overlay header-keyed values on one row, leaving other cells intact
    ///
    /// Keys that are not headers are ignored.
    ///
    /// # Errors
    /// `NotFoundError::Row` if the row does not exist or is the header row.
    pub async fn update_cells(&self, name: &str, row_index: usize, values: &Record) -> TableResult<()> {
        if row_index == 0 {
            return Err(NotFoundError::row(name, row_index).into());
        }
        let grid = self.read_table(name).await?;
        let (Some(headers), Some(existing)) = (grid.first(), grid.get(row_index)) else {
            return Err(NotFoundError::row(name, row_index).into());
        };
        if headers.is_empty() {
            return Err(NotFoundError::row(name, row_index).into());
        }

        let row: Vec<String> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                values
                    .get(h)
                    .map_or_else(|| cell(existing, i).to_string(), str::to_string)
            })
            .collect();

        self.update_cell_range(name, row_index, 0, headers.len(), &row)
            .await
    }

    /// Numeric id of the tab titled `name`
    ///
    /// # Errors
    /// `NotFoundError::Sheet` if no tab has that title.
    pub async fn resolve_sheet_id(&self, name: &str) -> TableResult<i64> {
        let metadata = self.transport.get_metadata().await?;
        metadata
            .find(name)
            .map(|p| p.sheet_id)
            .ok_or_else(|| NotFoundError::Sheet(name.to_string()).into())
    }

    /// Zero-based position of a header
    ///
    /// # Errors
    /// `NotFoundError::Column` if no header has that text.
    pub async fn column_index(&self, name: &str, column: &str) -> TableResult<usize> {
        self.headers(name)
            .await?
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| NotFoundError::column(name, column).into())
    }

    /// Grid position of the first data row whose `column` equals `value`
    ///
    /// Scanning by a stable identifier survives row insertions and deletions
    /// that would invalidate a remembered position.
    ///
    /// # Errors
    /// `NotFoundError::Column` or `NotFoundError::Row`.
    pub async fn find_row(&self, name: &str, column: &str, value: &str) -> TableResult<usize> {
        let grid = self.read_table(name).await?;
        let col = grid
            .first()
            .and_then(|h| h.iter().position(|c| c == column))
            .ok_or_else(|| NotFoundError::column(name, column))?;

        grid.iter()
            .enumerate()
            .skip(1)
            .find(|(_, row)| cell(row, col) == value)
            .map(|(i, _)| i)
            .ok_or_else(|| NotFoundError::row(name, format!("{column} = {value}")).into())
    }

    /// Create the tab if it does not exist, returning whether it was created
    pub async fn ensure_table(&self, name: &str) -> TableResult<bool> {
        if self.transport.get_metadata().await?.find(name).is_some() {
            return Ok(false);
        }
        tracing::info!(table = name, "creating table");
        self.transport
            .batch_update(vec![Request::add_sheet(name)])
            .await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SheetEntry, SheetProperties, SpreadsheetMetadata, ValueRange};
    use crate::transport::MockSheetsTransport;
    use mockall::predicate::eq;

    fn grid(rows: &[&[&str]]) -> Grid {
        rows.iter()
            .map(|r| r.iter().map(|c| (*c).to_string()).collect())
            .collect()
    }

    fn serving(rows: Grid) -> MockSheetsTransport {
        let mut mock = MockSheetsTransport::new();
        mock.expect_get_values()
            .returning(move |_| Ok(ValueRange::rows(rows.clone())));
        mock
    }

    fn metadata(sheets: &[(&str, i64)]) -> SpreadsheetMetadata {
        SpreadsheetMetadata {
            sheets: sheets
                .iter()
                .map(|(title, id)| SheetEntry {
                    properties: SheetProperties {
                        sheet_id: *id,
                        title: (*title).to_string(),
                        index: None,
                    },
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn rename_missing_column_writes_nothing() {
        // any call besides get_values panics the mock
        let table = SheetTable::new(serving(grid(&[&["Name", "Team"]])));

        let err = table.rename_column("Sheet2", "Role", "Position").await.unwrap_err();
        assert!(matches!(err, TableError::NotFound(NotFoundError::Column { .. })));
    }

    #[tokio::test]
    async fn delete_missing_column_writes_nothing() {
        let table = SheetTable::new(serving(grid(&[&["Name", "Team"]])));

        let err = table.delete_column("Sheet2", "Role").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn rename_targets_header_cell() {
        let mut mock = serving(grid(&[&["Name", "Team", "Role"]]));
        mock.expect_update_values()
            .with(eq("Sheet2!C1"), eq(grid(&[&["Position"]])))
            .times(1)
            .returning(|_, _| Ok(()));

        let table = SheetTable::new(mock);
        table.rename_column("Sheet2", "Role", "Position").await.unwrap();
    }

    #[tokio::test]
    async fn add_column_uses_next_letter() {
        let headers: Vec<&str> = (0..26).map(|_| "h").collect();
        let mut mock = serving(vec![headers.iter().map(|h| (*h).to_string()).collect()]);
        mock.expect_update_values()
            .with(eq("Sheet1!AA1"), eq(grid(&[&["Extra"]])))
            .times(1)
            .returning(|_, _| Ok(()));

        SheetTable::new(mock).add_column("Sheet1", "Extra").await.unwrap();
    }

    #[tokio::test]
    async fn delete_row_is_structural_edit() {
        let mut mock = MockSheetsTransport::new();
        mock.expect_get_metadata()
            .returning(|| Ok(metadata(&[("Sheet1", 0), ("Sheet4", 88)])));
        mock.expect_batch_update()
            .with(eq(vec![Request::delete_dimension(88, Dimension::Rows, 5, 6)]))
            .times(1)
            .returning(|_| Ok(()));

        SheetTable::new(mock).delete_row("Sheet4", 5).await.unwrap();
    }

    #[tokio::test]
    async fn unknown_sheet_id() {
        let mut mock = MockSheetsTransport::new();
        mock.expect_get_metadata().returning(|| Ok(metadata(&[("Sheet1", 0)])));

        let err = SheetTable::new(mock).resolve_sheet_id("Sheet9").await.unwrap_err();
        assert_eq!(err.to_string(), "sheet \"Sheet9\" not found");
    }

    #[tokio::test]
    async fn update_range_checks_width() {
        let table = SheetTable::new(MockSheetsTransport::new());
        let err = table
            .update_cell_range("Sheet1", 1, 2, 4, &["only one".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, TableError::InvalidRange(_)));
    }

    #[tokio::test]
    async fn strict_policy_rejects_unknown_keys() {
        let table = SheetTable::new(serving(grid(&[&["Name", "Team"]])))
            .with_policy(SchemaPolicy::Strict);
        let record = Record::new().with("Name", "B").with("Role", "Admin");

        let err = table.append_record("Sheet2", &record).await.unwrap_err();
        assert_eq!(err.to_string(), "column \"Role\" not found in Sheet2");
    }

    #[tokio::test]
    async fn empty_record_is_noop() {
        let table = SheetTable::new(MockSheetsTransport::new());
        table.append_record("Sheet1", &Record::new()).await.unwrap();
    }

    #[tokio::test]
    async fn update_cells_refuses_header_row() {
        // no expectations: any transport call panics the mock
        let table = SheetTable::new(MockSheetsTransport::new());
        let err = table
            .update_cells("Sheet3", 0, &Record::new().with("Kanban Initialized", "Yes"))
            .await
            .unwrap_err();
        assert!(matches!(err, TableError::NotFound(NotFoundError::Row { .. })));
    }

    #[tokio::test]
    async fn forbidden_read_does_not_create_tab() {
        let mut mock = MockSheetsTransport::new();
        mock.expect_get_values()
            .returning(|_| Err(TableError::api(403, "PERMISSION_DENIED")));

        let err = SheetTable::new(mock).read_or_create("Sheet1").await.unwrap_err();
        assert!(matches!(err, TableError::Api { status: 403, .. }));
    }

    #[tokio::test]
    async fn api_errors_propagate() {
        let mut mock = MockSheetsTransport::new();
        mock.expect_get_values()
            .returning(|_| Err(TableError::api(403, "PERMISSION_DENIED")));

        let err = SheetTable::new(mock).read_table("Sheet1").await.unwrap_err();
        assert!(matches!(err, TableError::Api { status: 403, .. }));
    }
}
