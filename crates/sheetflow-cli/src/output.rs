//! Rendering command results to stdout

use serde::Serialize;
use sheetflow_core::Outcome;
use sheetflow_table::Grid;

/// Flat reply for actions, optionally carrying a generated id
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct Reply {
    #[serde(flatten)]
    pub(crate) outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) id: Option<String>,
}

impl Reply {
    pub(crate) fn from_result<E: std::fmt::Display>(result: Result<Option<String>, E>) -> Self {
        match result {
            Ok(id) => Self {
                outcome: Outcome::ok(),
                id,
            },
            Err(e) => Self {
                outcome: Err::<(), _>(e).into(),
                id: None,
            },
        }
    }
}

/// What a command produced
#[derive(Debug)]
pub(crate) enum Output {
    /// Tabular read, with its JSON form
    Table {
        grid: Grid,
        json: serde_json::Value,
    },
    Reply(Reply),
}

impl Output {
    /// Grid read straight from a tab
    pub(crate) fn grid(grid: Grid) -> Self {
        let json = serde_json::json!(grid);
        Self::Table { grid, json }
    }

    pub(crate) fn success(&self) -> bool {
        match self {
            Self::Table { .. } => true,
            Self::Reply(reply) => reply.outcome.is_success(),
        }
    }

    pub(crate) fn render(&self, json: bool) -> anyhow::Result<String> {
        Ok(match (self, json) {
            (Self::Table { json: value, .. }, true) => serde_json::to_string_pretty(value)?,
            (Self::Table { grid, .. }, false) => render_grid(grid),
            (Self::Reply(reply), true) => serde_json::to_string(reply)?,
            (Self::Reply(reply), false) => match (&reply.outcome.error, &reply.id) {
                (Some(error), _) => format!("error: {error}"),
                (None, Some(id)) => format!("ok {id}"),
                (None, None) => "ok".to_string(),
            },
        })
    }
}

/// Left-aligned columns separated by two spaces
pub(crate) fn render_grid(grid: &Grid) -> String {
    let columns = grid.iter().map(Vec::len).max().unwrap_or(0);
    let widths: Vec<usize> = (0..columns)
        .map(|c| {
            grid.iter()
                .filter_map(|row| row.get(c))
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    grid.iter()
        .map(|row| {
            row.iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{cell:<width$}"))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
