//! Testing utilities for SheetFlow workspace
//!
//! An in-memory spreadsheet that speaks `SheetsTransport`, a deterministic
//! clock, and grid fixtures.

#![allow(missing_docs)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use sheetflow_core::{Clock, SheetFlow};
use sheetflow_table::model::{GridRange, SheetEntry, SheetProperties};
use sheetflow_table::{
    A1Range, CellRef, Dimension, Grid, Request, SheetTable, SheetsTransport, SpreadsheetMetadata,
    TableError, TableResult, ValueRange,
};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Default tab titles of a fresh SheetFlow spreadsheet
pub const STANDARD_SHEETS: [&str; 5] = ["Sheet1", "Sheet2", "Sheet3", "Sheet4", "Sheet5"];

/// Start of `SteppingClock::default()`, 2024-06-10T06:13:20Z
pub const EPOCH_MILLIS: i64 = 1_718_000_000_000;

/// Transport method, for failure injection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    GetValues,
    AppendValues,
    UpdateValues,
    BatchUpdate,
    GetMetadata,
}

/// One recorded transport call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GetValues(String),
    AppendValues { range: String, rows: Grid },
    UpdateValues { range: String, rows: Grid },
    BatchUpdate(Vec<Request>),
    GetMetadata,
}

impl Call {
    pub fn kind(&self) -> CallKind {
        match self {
            Self::GetValues(_) => CallKind::GetValues,
            Self::AppendValues { .. } => CallKind::AppendValues,
            Self::UpdateValues { .. } => CallKind::UpdateValues,
            Self::BatchUpdate(_) => CallKind::BatchUpdate,
            Self::GetMetadata => CallKind::GetMetadata,
        }
    }

    /// Whether the call writes to the spreadsheet
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::AppendValues { .. } | Self::UpdateValues { .. } | Self::BatchUpdate(_)
        )
    }
}

#[derive(Debug, Clone)]
struct Sheet {
    id: i64,
    title: String,
    grid: Grid,
}

#[derive(Debug, Default)]
struct State {
    sheets: Vec<Sheet>,
    next_id: i64,
    calls: Vec<Call>,
    failures: Vec<CallKind>,
}

impl State {
    fn add_sheet(&mut self, title: &str, grid: Grid) {
        let id = self.next_id;
        self.next_id += 1;
        self.sheets.push(Sheet {
            id,
            title: title.to_string(),
            grid,
        });
    }

    fn record(&mut self, call: Call) -> TableResult<()> {
        let kind = call.kind();
        self.calls.push(call);
        if let Some(i) = self.failures.iter().position(|k| *k == kind) {
            self.failures.remove(i);
            return Err(TableError::api(500, "injected failure"));
        }
        Ok(())
    }

    fn by_title(&mut self, range: &str) -> TableResult<(&mut Sheet, A1Range)> {
        let parsed = A1Range::parse(range)?;
        let sheet = self
            .sheets
            .iter_mut()
            .find(|s| s.title == parsed.sheet)
            .ok_or_else(|| TableError::api(400, format!("Unable to parse range: {range}")))?;
        Ok((sheet, parsed))
    }
}

/// In-memory spreadsheet behind the `SheetsTransport` seam
///
/// Clones share state, so a test can hand one clone to a `SheetTable` and
/// inspect the grid and call log through another. Reads trim trailing empty
/// cells and rows the way the remote service does; batch updates apply all
/// requests or none.
#[derive(Debug, Clone, Default)]
pub struct MemorySheets {
    state: Arc<Mutex<State>>,
}

impl MemorySheets {
    /// Spreadsheet with no tabs
    pub fn new() -> Self {
        Self::default()
    }

    /// Spreadsheet with the five empty standard tabs
    pub fn standard() -> Self {
        STANDARD_SHEETS
            .iter()
            .fold(Self::new(), |sheets, title| sheets.with_sheet(title))
    }

    /// With an empty tab
    pub fn with_sheet(self, title: &str) -> Self {
        self.with_table(title, Vec::new())
    }

    /// With a tab holding `grid`, replacing the tab's contents if it exists
    pub fn with_table(self, title: &str, grid: Grid) -> Self {
        {
            let mut state = self.state.lock();
            match state.sheets.iter_mut().find(|s| s.title == title) {
                Some(sheet) => sheet.grid = grid,
                None => state.add_sheet(title, grid),
            }
        }
        self
    }

    /// Fail the next call of `kind` with a 500 response
    pub fn fail_on(&self, kind: CallKind) {
        self.state.lock().failures.push(kind);
    }

    /// Tab contents as a read would return them; empty for unknown tabs
    pub fn grid(&self, title: &str) -> Grid {
        self.state
            .lock()
            .sheets
            .iter()
            .find(|s| s.title == title)
            .map(|s| trimmed(&s.grid))
            .unwrap_or_default()
    }

    /// Tab titles in creation order
    pub fn titles(&self) -> Vec<String> {
        self.state
            .lock()
            .sheets
            .iter()
            .map(|s| s.title.clone())
            .collect()
    }

    /// Every call so far
    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    /// Writing calls so far
    pub fn mutations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutation).collect()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }
}

#[async_trait]
impl SheetsTransport for MemorySheets {
    async fn get_values(&self, range: &str) -> TableResult<ValueRange> {
        let mut state = self.state.lock();
        state.record(Call::GetValues(range.to_string()))?;
        let (sheet, parsed) = state.by_title(range)?;

        let values = match parsed.start {
            None => trimmed(&sheet.grid),
            Some(start) => {
                let end = parsed.end.unwrap_or(start);
                let window: Grid = (start.row..=end.row)
                    .map(|r| {
                        (start.col..=end.col)
                            .map(|c| cell_at(&sheet.grid, r, c))
                            .collect()
                    })
                    .collect();
                trimmed(&window)
            }
        };
        Ok(ValueRange {
            range: Some(range.to_string()),
            values,
        })
    }

    async fn append_values(&self, range: &str, rows: Grid) -> TableResult<()> {
        let mut state = self.state.lock();
        state.record(Call::AppendValues {
            range: range.to_string(),
            rows: rows.clone(),
        })?;
        let (sheet, parsed) = state.by_title(range)?;

        let first_col = parsed.start.map_or(0, |s| s.col);
        let next_row = trimmed(&sheet.grid).len();
        for (i, row) in rows.into_iter().enumerate() {
            for (j, value) in row.into_iter().enumerate() {
                write(&mut sheet.grid, next_row + i, first_col + j, value);
            }
        }
        Ok(())
    }

    async fn update_values(&self, range: &str, rows: Grid) -> TableResult<()> {
        let mut state = self.state.lock();
        state.record(Call::UpdateValues {
            range: range.to_string(),
            rows: rows.clone(),
        })?;
        let (sheet, parsed) = state.by_title(range)?;

        let start = parsed.start.unwrap_or(CellRef::new(0, 0));
        for (i, row) in rows.into_iter().enumerate() {
            for (j, value) in row.into_iter().enumerate() {
                write(&mut sheet.grid, start.row + i, start.col + j, value);
            }
        }
        Ok(())
    }

    async fn batch_update(&self, requests: Vec<Request>) -> TableResult<()> {
        let mut state = self.state.lock();
        state.record(Call::BatchUpdate(requests.clone()))?;

        let mut sheets = state.sheets.clone();
        let mut next_id = state.next_id;
        for request in requests {
            apply(&mut sheets, &mut next_id, request)?;
        }
        state.sheets = sheets;
        state.next_id = next_id;
        Ok(())
    }

    async fn get_metadata(&self) -> TableResult<SpreadsheetMetadata> {
        let mut state = self.state.lock();
        state.record(Call::GetMetadata)?;
        Ok(SpreadsheetMetadata {
            sheets: state
                .sheets
                .iter()
                .enumerate()
                .map(|(i, s)| SheetEntry {
                    properties: SheetProperties {
                        sheet_id: s.id,
                        title: s.title.clone(),
                        index: i64::try_from(i).ok(),
                    },
                })
                .collect(),
        })
    }
}

fn position(sheets: &[Sheet], id: i64) -> TableResult<usize> {
    sheets
        .iter()
        .position(|s| s.id == id)
        .ok_or_else(|| TableError::api(400, format!("No grid with id: {id}")))
}

fn apply(sheets: &mut Vec<Sheet>, next_id: &mut i64, request: Request) -> TableResult<()> {
    match request {
        Request::DeleteDimension { range } => {
            let i = position(sheets, range.sheet_id)?;
            let grid = &mut sheets[i].grid;
            match range.dimension {
                Dimension::Rows => {
                    let end = range.end_index.min(grid.len());
                    if range.start_index < end {
                        grid.drain(range.start_index..end);
                    }
                }
                Dimension::Columns => {
                    for row in grid.iter_mut() {
                        let end = range.end_index.min(row.len());
                        if range.start_index < end {
                            row.drain(range.start_index..end);
                        }
                    }
                }
            }
        }
        Request::UpdateCells { range, rows, .. } => {
            let i = position(sheets, range.sheet_id)?;
            let GridRange {
                start_row_index,
                start_column_index,
                ..
            } = range;
            for (r, row) in rows.into_iter().enumerate() {
                for (c, cell) in row.values.into_iter().enumerate() {
                    write(
                        &mut sheets[i].grid,
                        start_row_index + r,
                        start_column_index + c,
                        cell.user_entered_value.string_value,
                    );
                }
            }
        }
        Request::AddSheet { properties } => {
            if sheets.iter().any(|s| s.title == properties.title) {
                return Err(TableError::api(
                    400,
                    format!(
                        "A sheet with the name \"{}\" already exists.",
                        properties.title
                    ),
                ));
            }
            sheets.push(Sheet {
                id: *next_id,
                title: properties.title,
                grid: Vec::new(),
            });
            *next_id += 1;
        }
    }
    Ok(())
}

fn cell_at(grid: &Grid, row: usize, col: usize) -> String {
    grid.get(row)
        .and_then(|r| r.get(col))
        .cloned()
        .unwrap_or_default()
}

fn write(grid: &mut Grid, row: usize, col: usize, value: String) {
    if grid.len() <= row {
        grid.resize_with(row + 1, Vec::new);
    }
    let cells = &mut grid[row];
    if cells.len() <= col {
        cells.resize(col + 1, String::new());
    }
    cells[col] = value;
}

fn trimmed(grid: &Grid) -> Grid {
    let mut out: Grid = grid
        .iter()
        .map(|row| {
            let len = row.iter().rposition(|c| !c.is_empty()).map_or(0, |i| i + 1);
            row[..len].to_vec()
        })
        .collect();
    while out.last().is_some_and(Vec::is_empty) {
        out.pop();
    }
    out
}

/// Clock that advances one step on every reading
#[derive(Debug)]
pub struct SteppingClock {
    millis: AtomicI64,
    step: i64,
}

impl SteppingClock {
    /// Starting at `start_millis`, one millisecond per reading
    pub fn new(start_millis: i64) -> Self {
        Self {
            millis: AtomicI64::new(start_millis),
            step: 1,
        }
    }

    /// With step; zero freezes the clock
    pub fn with_step(mut self, step_millis: i64) -> Self {
        self.step = step_millis;
        self
    }
}

impl Default for SteppingClock {
    fn default() -> Self {
        Self::new(EPOCH_MILLIS)
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        let millis = self.millis.fetch_add(self.step, Ordering::SeqCst);
        DateTime::from_timestamp_millis(millis).unwrap_or_default()
    }
}

/// Grid from string literals
pub fn grid(rows: &[&[&str]]) -> Grid {
    rows.iter().copied().map(strings).collect()
}

/// Owned row from string literals
pub fn strings(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|c| (*c).to_string()).collect()
}

/// Domain layer over `sheets` with a stepping clock
pub fn setup_flow(sheets: &MemorySheets) -> SheetFlow<MemorySheets> {
    SheetFlow::new(SheetTable::new(sheets.clone())).with_clock(SteppingClock::default())
}
