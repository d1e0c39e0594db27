//! Team members

use crate::config::{PREDEFINED_TEAMS, TEAM_DEFAULT};
use crate::error::{FlowResult, SheetFlowError};
use crate::flow::SheetFlow;
use sheetflow_table::record::cell;
use sheetflow_table::{Grid, Record, SheetsTransport};
use std::collections::HashSet;

pub const NAME: &str = "Name";
pub const TEAM: &str = "Team";

impl<T: SheetsTransport> SheetFlow<T> {
    /// Full member grid, header first
    pub async fn list_members(&self) -> FlowResult<Grid> {
        Ok(self.table.read_table(&self.tables.members).await?)
    }

    /// Add a member, seeding a `Team Default` row for every predefined team
    /// that has none yet
    pub async fn add_member(&self, name: &str, team: &str) -> FlowResult<()> {
        if name.trim().is_empty() || team.trim().is_empty() {
            return Err(SheetFlowError::invalid_input("Name and team are required."));
        }

        let table = self.tables.members.as_str();
        let grid = self.table.read_or_create(table).await?;
        let existing: HashSet<&str> = match grid.split_first() {
            None => {
                self.table
                    .write_header(table, &Record::header([NAME, TEAM]))
                    .await?;
                HashSet::new()
            }
            Some((headers, rows)) => headers
                .iter()
                .position(|h| h == TEAM)
                .map(|col| rows.iter().map(|row| cell(row, col)).collect())
                .unwrap_or_default(),
        };

        for seed in PREDEFINED_TEAMS.iter().filter(|t| !existing.contains(*t)) {
            tracing::debug!(team = seed, "seeding team");
            self.table
                .append_record(table, &Record::new().with(NAME, TEAM_DEFAULT).with(TEAM, *seed))
                .await?;
        }

        if name == TEAM_DEFAULT && PREDEFINED_TEAMS.contains(&team) {
            return Ok(());
        }

        self.table
            .append_record(table, &Record::new().with(NAME, name).with(TEAM, team))
            .await?;
        tracing::info!(name, team, "member added");
        Ok(())
    }
}
