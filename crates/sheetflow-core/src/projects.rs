//! Projects promoted from tickets

use crate::clock::prefixed_id;
use crate::error::{FlowResult, SheetFlowError};
use crate::flow::SheetFlow;
use crate::kanban::{Priority, TaskStatus, KANBAN_HEADERS};
use crate::tickets::IN_PROGRESS;
use sheetflow_table::record::cell;
use sheetflow_table::{Grid, Record, SheetsTransport};

pub const PROJECT_ID: &str = "Project ID";
pub const KANBAN_INITIALIZED: &str = "Kanban Initialized";

/// Leading project columns; the source ticket's columns follow
pub const PROJECT_HEADERS: [&str; 5] = [
    PROJECT_ID,
    "Start Date",
    "End Date",
    "Assignee",
    KANBAN_INITIALIZED,
];

impl<T: SheetsTransport> SheetFlow<T> {
    /// Full project grid, header first
    pub async fn list_projects(&self) -> FlowResult<Grid> {
        Ok(self.table.read_table(&self.tables.projects).await?)
    }

    /// Copy a ticket into the project table and mark the ticket `In Progress`
    ///
    /// `values` are the ticket's cells in header order. The project id is the
    /// value of the first ticket header containing "id", or a generated
    /// `PROJ-` id when that is blank. The two writes are independent: when the
    /// status update fails the project row stays and the error is returned.
    /// A `row_index` outside the ticket data rows is rejected before any write.
    pub async fn create_project_from_ticket(
        &self,
        row_index: usize,
        values: &[String],
    ) -> FlowResult<String> {
        let tickets = self.table.read_table(&self.tables.tickets).await?;
        let Some(ticket_headers) = tickets.first().filter(|h| !h.is_empty()) else {
            return Err(SheetFlowError::EmptyTable(self.tables.tickets.clone()));
        };
        if row_index == 0 || row_index >= tickets.len() {
            return Err(SheetFlowError::NotFound(format!(
                "row {row_index} not found in {}",
                self.tables.tickets
            )));
        }

        let project_id = ticket_headers
            .iter()
            .position(|h| h.to_lowercase().contains("id"))
            .map(|i| cell(values, i))
            .filter(|v| !v.is_empty())
            .map_or_else(|| prefixed_id("PROJ", self.now()), str::to_string);

        let columns: Vec<&str> = PROJECT_HEADERS
            .iter()
            .copied()
            .chain(ticket_headers.iter().map(String::as_str))
            .collect();
        self.ensure_schema(&self.tables.projects, &columns).await?;

        let mut record = Record::new()
            .with(PROJECT_ID, project_id.as_str())
            .with("Start Date", "")
            .with("End Date", "")
            .with("Assignee", "")
            .with(KANBAN_INITIALIZED, "No");
        record.extend(
            ticket_headers
                .iter()
                .enumerate()
                .map(|(i, h)| (h.as_str(), cell(values, i))),
        );
        self.table
            .append_record(&self.tables.projects, &record)
            .await?;
        tracing::info!(project = %project_id, ticket_row = row_index, "project created");

        self.update_ticket_status(row_index, IN_PROGRESS).await?;
        Ok(project_id)
    }

    /// Overlay header-keyed values on the project at `row_index`
    pub async fn update_project(&self, row_index: usize, values: &Record) -> FlowResult<()> {
        self.table
            .update_cells(&self.tables.projects, row_index, values)
            .await?;
        Ok(())
    }

    /// Seed a kick-off task for the project and flag its board as initialized
    ///
    /// Returns the kick-off task id.
    pub async fn initialize_kanban(
        &self,
        project_row_index: usize,
        project_id: &str,
    ) -> FlowResult<String> {
        if project_id.trim().is_empty() {
            return Err(SheetFlowError::invalid_input("Project ID is required."));
        }
        if project_row_index == 0 {
            return Err(SheetFlowError::NotFound(format!(
                "row 0 of {} is the header, not a project",
                self.tables.projects
            )));
        }
        self.ensure_schema(&self.tables.kanban, &KANBAN_HEADERS)
            .await?;

        let task_id = prefixed_id("TASK", self.now());
        let kickoff = Record::new()
            .with(PROJECT_ID, project_id)
            .with("Task ID", task_id.as_str())
            .with("Title", "Project Kick-off")
            .with("Status", TaskStatus::Todo.as_str())
            .with("Assignee", "")
            .with("Due Date", "")
            .with("Description", "Initial setup and planning for the project.")
            .with("Type", "Planning")
            .with("Priority", Priority::High.as_str())
            .with("Tags", "kickoff,planning");
        self.table.append_record(&self.tables.kanban, &kickoff).await?;

        self.update_project(
            project_row_index,
            &Record::new().with(KANBAN_INITIALIZED, "Yes"),
        )
        .await?;
        tracing::info!(project = project_id, task = %task_id, "kanban initialized");
        Ok(task_id)
    }
}
