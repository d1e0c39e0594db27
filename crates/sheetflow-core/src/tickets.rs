//! Support tickets

use crate::clock::{iso_timestamp, prefixed_id};
use crate::error::FlowResult;
use crate::flow::{SheetFlow, SheetRow};
use sheetflow_table::{Grid, Record, SheetsTransport};

pub const TICKET_ID: &str = "Ticket ID";
pub const CREATED_DATE: &str = "Created Date";
pub const STATUS: &str = "Status";

/// Status of a freshly submitted ticket
pub const OPEN: &str = "Open";
/// Status of a ticket promoted to a project
pub const IN_PROGRESS: &str = "In Progress";

impl<T: SheetsTransport> SheetFlow<T> {
    /// Record a ticket, returning its generated id
    ///
    /// Ticket fields are free-form; unseen field names become new columns.
    pub async fn submit_ticket(&self, fields: Record) -> FlowResult<String> {
        let now = self.now();
        let id = prefixed_id("TICKET", now);
        let mut record = fields;
        record.insert(TICKET_ID, id.as_str());
        record.insert(CREATED_DATE, iso_timestamp(now));
        record.insert(STATUS, OPEN);

        self.table.append_record(&self.tables.tickets, &record).await?;
        tracing::info!(ticket = %id, "ticket submitted");
        Ok(id)
    }

    /// Full ticket grid, header first
    pub async fn list_tickets(&self) -> FlowResult<Grid> {
        Ok(self.table.read_table(&self.tables.tickets).await?)
    }

    /// Ticket rows, most recent first
    pub async fn recent_tickets(&self) -> FlowResult<Vec<SheetRow>> {
        let mut rows = SheetRow::from_grid(&self.list_tickets().await?);
        rows.reverse();
        Ok(rows)
    }

    /// Set the `Status` cell of the ticket at `row_index`
    pub async fn update_ticket_status(&self, row_index: usize, status: &str) -> FlowResult<()> {
        self.set_cell(&self.tables.tickets, row_index, STATUS, status)
            .await?;
        tracing::info!(row_index, status, "ticket status updated");
        Ok(())
    }
}
