//! A1 notation
//!
//! Column letters, cell references and `Sheet!A1:B2` ranges. All positions
//! are zero-based here; the one-based row numbers of A1 strings only exist at
//! the formatting/parsing boundary.

use crate::error::TableError;
use std::fmt;

/// Spreadsheet column label for a zero-based index (0 → A, 25 → Z, 26 → AA)
#[must_use]
pub fn column_letter(index: usize) -> String {
    let mut letters = Vec::new();
    let mut n = Some(index);
    while let Some(i) = n {
        letters.push(b'A' + (i % 26) as u8);
        n = (i / 26).checked_sub(1);
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Zero-based index for a column label, `None` if the label is not all A-Z
#[must_use]
pub fn column_index(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }
    letters.bytes().try_fold(0usize, |acc, b| {
        let b = b.to_ascii_uppercase();
        b.is_ascii_uppercase()
            .then(|| acc.checked_mul(26)?.checked_add(usize::from(b - b'A') + 1))
            .flatten()
    })
    .map(|n| n - 1)
}

/// Quote a sheet title for use in a range when it needs it
#[must_use]
pub fn quote_sheet_name(name: &str) -> String {
    let plain = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if plain {
        name.to_string()
    } else {
        format!("'{}'", name.replace('\'', "''"))
    }
}

/// Single cell position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRef {
    /// Zero-based column
    pub col: usize,
    /// Zero-based row
    pub row: usize,
}

impl CellRef {
    /// Create cell reference
    #[inline]
    #[must_use]
    pub fn new(col: usize, row: usize) -> Self {
        Self { col, row }
    }

    fn parse(s: &str) -> Option<Self> {
        let split = s.find(|c: char| c.is_ascii_digit())?;
        let (letters, digits) = s.split_at(split);
        let col = column_index(letters)?;
        let row = digits.parse::<usize>().ok()?.checked_sub(1)?;
        Some(Self { col, row })
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_letter(self.col), self.row + 1)
    }
}

/// A range within one sheet
///
/// With no `start` the range covers the whole sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct A1Range {
    /// Sheet title (unquoted)
    pub sheet: String,
    /// First cell
    pub start: Option<CellRef>,
    /// Last cell (inclusive)
    pub end: Option<CellRef>,
}

impl A1Range {
    /// Whole sheet
    #[must_use]
    pub fn sheet(name: impl Into<String>) -> Self {
        Self {
            sheet: name.into(),
            start: None,
            end: None,
        }
    }

    /// Single cell
    #[must_use]
    pub fn cell(name: impl Into<String>, col: usize, row: usize) -> Self {
        Self {
            sheet: name.into(),
            start: Some(CellRef::new(col, row)),
            end: None,
        }
    }

    /// Horizontal span on one row, `end_col` exclusive
    #[must_use]
    pub fn row_span(name: impl Into<String>, row: usize, start_col: usize, end_col: usize) -> Self {
        let last = end_col.saturating_sub(1).max(start_col);
        Self {
            sheet: name.into(),
            start: Some(CellRef::new(start_col, row)),
            end: (last != start_col).then(|| CellRef::new(last, row)),
        }
    }

    /// Parse `Sheet`, `Sheet!B2`, `Sheet!A1:C1` or `'My Sheet'!A1`
    ///
    /// # Errors
    /// `TableError::InvalidRange` if the cell part is not valid A1 notation.
    pub fn parse(input: &str) -> Result<Self, TableError> {
        let invalid = || TableError::InvalidRange(input.to_string());

        let (sheet, cells) = if let Some(rest) = input.strip_prefix('\'') {
            let mut title = String::new();
            let mut chars = rest.char_indices().peekable();
            let mut tail = None;
            while let Some((i, c)) = chars.next() {
                if c == '\'' {
                    if matches!(chars.peek(), Some((_, '\''))) {
                        title.push('\'');
                        chars.next();
                    } else {
                        tail = Some(&rest[i + 1..]);
                        break;
                    }
                } else {
                    title.push(c);
                }
            }
            let tail = tail.ok_or_else(invalid)?;
            let cells = match tail.strip_prefix('!') {
                Some(c) => Some(c),
                None if tail.is_empty() => None,
                None => return Err(invalid()),
            };
            (title, cells)
        } else {
            match input.split_once('!') {
                Some((s, c)) => (s.to_string(), Some(c)),
                None => (input.to_string(), None),
            }
        };

        let Some(cells) = cells else {
            return Ok(Self::sheet(sheet));
        };
        let (start, end) = match cells.split_once(':') {
            Some((a, b)) => (
                CellRef::parse(a).ok_or_else(invalid)?,
                Some(CellRef::parse(b).ok_or_else(invalid)?),
            ),
            None => (CellRef::parse(cells).ok_or_else(invalid)?, None),
        };

        Ok(Self {
            sheet,
            start: Some(start),
            end,
        })
    }
}

impl fmt::Display for A1Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", quote_sheet_name(&self.sheet))?;
        if let Some(start) = self.start {
            write!(f, "!{start}")?;
            if let Some(end) = self.end {
                write!(f, ":{end}")?;
            }
        }
        Ok(())
    }
}
