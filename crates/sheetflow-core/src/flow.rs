//! Domain action entry point

use crate::clock::{Clock, SystemClock};
use crate::config::TableNames;
use crate::error::{FlowResult, SheetFlowError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sheetflow_table::{Grid, Record, SheetTable, SheetsTransport};
use std::fmt;
use std::sync::Arc;

/// A data row together with its position in the full grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetRow {
    /// Zero-based grid position, header row being 0
    pub row_index: usize,
    pub record: Record,
}

impl SheetRow {
    /// Data rows of a grid, in sheet order
    #[must_use]
    pub fn from_grid(grid: &Grid) -> Vec<Self> {
        let Some((headers, rows)) = grid.split_first() else {
            return Vec::new();
        };
        rows.iter()
            .enumerate()
            .map(|(i, row)| Self {
                row_index: i + 1,
                record: Record::from_row(headers, row),
            })
            .collect()
    }
}

/// Tickets and members fetched together for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    /// Most recent first
    pub tickets: Vec<SheetRow>,
    pub members: Vec<SheetRow>,
}

/// Ticket, member, project, kanban and form-question actions
///
/// Every action is a sequential chain of table calls with no locking or
/// transactions; concurrent writers race and the last write wins.
pub struct SheetFlow<T> {
    pub(crate) table: SheetTable<T>,
    pub(crate) tables: TableNames,
    clock: Arc<dyn Clock>,
}

impl<T> fmt::Debug for SheetFlow<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SheetFlow")
            .field("tables", &self.tables)
            .finish_non_exhaustive()
    }
}

impl<T: SheetsTransport> SheetFlow<T> {
    /// Create with default table names and the system clock
    #[must_use]
    pub fn new(table: SheetTable<T>) -> Self {
        Self {
            table,
            tables: TableNames::default(),
            clock: Arc::new(SystemClock),
        }
    }

    /// With table names
    #[inline]
    #[must_use]
    pub fn with_tables(mut self, tables: TableNames) -> Self {
        self.tables = tables;
        self
    }

    /// With time source for ids and timestamps
    #[inline]
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Underlying table adapter
    #[inline]
    #[must_use]
    pub fn table(&self) -> &SheetTable<T> {
        &self.table
    }

    /// Table names in use
    #[inline]
    #[must_use]
    pub fn tables(&self) -> &TableNames {
        &self.tables
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Tickets and members, read concurrently
    pub async fn dashboard(&self) -> FlowResult<Dashboard> {
        let (tickets, members) =
            futures::try_join!(self.recent_tickets(), self.list_members())?;
        Ok(Dashboard {
            tickets,
            members: SheetRow::from_grid(&members),
        })
    }

    /// Make sure `columns` exist, writing them as the header of an empty or
    /// missing table
    pub(crate) async fn ensure_schema(&self, name: &str, columns: &[&str]) -> FlowResult<()> {
        let headers = self
            .table
            .read_or_create(name)
            .await?
            .into_iter()
            .next()
            .unwrap_or_default();
        if headers.is_empty() {
            tracing::info!(table = name, "initializing header row");
            self.table
                .write_header(name, &Record::header(columns.iter().copied()))
                .await?;
        } else {
            let added = self
                .table
                .ensure_columns(name, columns.iter().copied())
                .await?;
            if !added.is_empty() {
                tracing::info!(table = name, ?added, "added missing columns");
            }
        }
        Ok(())
    }

    /// Overwrite the `column` cell of one row
    pub(crate) async fn set_cell(
        &self,
        name: &str,
        row_index: usize,
        column: &str,
        value: &str,
    ) -> FlowResult<()> {
        let grid = self.table.read_table(name).await?;
        let Some(headers) = grid.first() else {
            return Err(SheetFlowError::EmptyTable(name.to_string()));
        };
        let col = headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| SheetFlowError::missing_columns(name, [column]))?;
        if row_index == 0 || row_index >= grid.len() {
            return Err(SheetFlowError::NotFound(format!(
                "row {row_index} not found in {name}"
            )));
        }

        self.table
            .update_cell_range(name, row_index, col, col + 1, &[value.to_string()])
            .await?;
        Ok(())
    }
}

/// Columns from `required` that `headers` lacks
pub(crate) fn missing<'a>(headers: &[String], required: &[&'a str]) -> Vec<&'a str> {
    required
        .iter()
        .copied()
        .filter(|r| !headers.iter().any(|h| h == r))
        .collect()
}
