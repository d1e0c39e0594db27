//! Kanban tasks
//!
//! Tasks are addressed by their `Task ID` cell, scanned at call time, so a
//! row deleted by someone else between reads does not redirect a move or
//! delete onto the wrong task.

use crate::clock::prefixed_id;
use crate::error::{FlowResult, SheetFlowError};
use crate::flow::{missing, SheetFlow};
use crate::projects::PROJECT_ID;
use serde::{Deserialize, Serialize};
use sheetflow_table::{Record, SheetsTransport};
use std::fmt;
use std::str::FromStr;

pub const TASK_ID: &str = "Task ID";
pub const STATUS: &str = "Status";

/// Column layout of the kanban table
pub const KANBAN_HEADERS: [&str; 10] = [
    PROJECT_ID,
    TASK_ID,
    "Title",
    STATUS,
    "Assignee",
    "Due Date",
    "Description",
    "Type",
    "Priority",
    "Tags",
];

/// Board column of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Review,
    Done,
}

impl TaskStatus {
    /// Board columns, left to right
    pub const ALL: [Self; 4] = [Self::Todo, Self::InProgress, Self::Review, Self::Done];

    /// Cell text
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "inprogress",
            Self::Review => "review",
            Self::Done => "done",
        }
    }

    /// Lenient parse of a stored cell; unknown text lands in `Todo`
    #[must_use]
    pub fn from_cell(text: &str) -> Self {
        text.parse().unwrap_or_else(|_| {
            if !text.is_empty() {
                tracing::warn!(status = text, "unknown task status, treating as todo");
            }
            Self::Todo
        })
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = SheetFlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "todo" => Ok(Self::Todo),
            "inprogress" => Ok(Self::InProgress),
            "review" => Ok(Self::Review),
            "done" => Ok(Self::Done),
            _ => Err(SheetFlowError::invalid_input(format!(
                "unknown task status \"{s}\""
            ))),
        }
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    /// Cell text
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }

    /// Lenient parse of a stored cell; blank or unknown text is `Medium`
    #[must_use]
    pub fn from_cell(text: &str) -> Self {
        text.parse().unwrap_or_default()
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = SheetFlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            _ => Err(SheetFlowError::invalid_input(format!(
                "unknown priority \"{s}\""
            ))),
        }
    }
}

/// Typed view of one kanban row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KanbanTask {
    /// Zero-based grid position at read time
    pub sheet_row_index: usize,
    pub id: String,
    pub project_id: String,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub assignee: String,
    pub due_date: String,
    #[serde(rename = "type")]
    pub task_type: String,
    pub priority: Priority,
    pub tags: Vec<String>,
}

impl KanbanTask {
    fn from_record(sheet_row_index: usize, record: &Record) -> Self {
        let field = |name: &str| record.get(name).unwrap_or_default().to_string();
        let task_type = field("Type");
        Self {
            sheet_row_index,
            id: field(TASK_ID),
            project_id: field(PROJECT_ID),
            title: field("Title"),
            description: field("Description"),
            status: TaskStatus::from_cell(record.get(STATUS).unwrap_or_default()),
            assignee: field("Assignee"),
            due_date: field("Due Date"),
            task_type: if task_type.is_empty() {
                "Task".to_string()
            } else {
                task_type
            },
            priority: Priority::from_cell(record.get("Priority").unwrap_or_default()),
            tags: split_tags(record.get("Tags").unwrap_or_default()),
        }
    }
}

/// Fields of a task to create; id and status are assigned on insert
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub task_type: String,
    pub priority: Priority,
    pub assignee: String,
    pub due_date: String,
    pub tags: Vec<String>,
}

impl NewTask {
    /// Task of type `Task` with the given title
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            task_type: "Task".to_string(),
            ..Self::default()
        }
    }

    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_type(mut self, task_type: impl Into<String>) -> Self {
        self.task_type = task_type.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = assignee.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_due_date(mut self, due_date: impl Into<String>) -> Self {
        self.due_date = due_date.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// Comma-separated tag cell to tags, blanks dropped
#[must_use]
pub fn split_tags(cell: &str) -> Vec<String> {
    cell.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

impl<T: SheetsTransport> SheetFlow<T> {
    /// Tasks of one project in sheet order
    ///
    /// # Errors
    /// `MissingColumns` when `Project ID`, `Task ID` or `Status` is absent.
    pub async fn kanban_tasks(&self, project_id: &str) -> FlowResult<Vec<KanbanTask>> {
        let table = self.tables.kanban.as_str();
        let grid = self.table.read_table(table).await?;
        let Some((headers, rows)) = grid.split_first() else {
            return Ok(Vec::new());
        };

        let absent = missing(headers, &[PROJECT_ID, TASK_ID, STATUS]);
        if !absent.is_empty() {
            return Err(SheetFlowError::missing_columns(table, absent));
        }

        Ok(rows
            .iter()
            .enumerate()
            .map(|(i, row)| KanbanTask::from_record(i + 1, &Record::from_row(headers, row)))
            .filter(|task| task.project_id == project_id)
            .collect())
    }

    /// Add a `todo` task to a project, returning its generated id
    pub async fn add_kanban_task(&self, project_id: &str, task: &NewTask) -> FlowResult<String> {
        if project_id.trim().is_empty() || task.title.trim().is_empty() {
            return Err(SheetFlowError::invalid_input(
                "Project ID and task title are required.",
            ));
        }
        let table = self.tables.kanban.as_str();
        self.ensure_schema(table, &KANBAN_HEADERS).await?;

        let id = prefixed_id("TASK", self.now());
        let record = Record::new()
            .with(PROJECT_ID, project_id)
            .with(TASK_ID, id.as_str())
            .with("Title", task.title.as_str())
            .with(STATUS, TaskStatus::Todo.as_str())
            .with("Description", task.description.as_str())
            .with("Type", task.task_type.as_str())
            .with("Priority", task.priority.as_str())
            .with("Assignee", task.assignee.as_str())
            .with("Due Date", task.due_date.as_str())
            .with("Tags", task.tags.join(","));
        self.table.append_record(table, &record).await?;
        tracing::info!(project = project_id, task = %id, "task added");
        Ok(id)
    }

    /// Set the status of the task at a known grid position
    pub async fn update_kanban_task_status(
        &self,
        sheet_row_index: usize,
        status: TaskStatus,
    ) -> FlowResult<()> {
        self.set_cell(&self.tables.kanban, sheet_row_index, STATUS, status.as_str())
            .await
    }

    /// Move a task to another board column
    pub async fn move_kanban_task(&self, task_id: &str, status: TaskStatus) -> FlowResult<()> {
        let row = self.task_row(task_id).await?;
        self.update_kanban_task_status(row, status).await?;
        tracing::info!(task = task_id, %status, "task moved");
        Ok(())
    }

    /// Remove a task row
    pub async fn delete_kanban_task(&self, task_id: &str) -> FlowResult<()> {
        let row = self.task_row(task_id).await?;
        self.table.delete_row(&self.tables.kanban, row).await?;
        tracing::info!(task = task_id, "task deleted");
        Ok(())
    }

    async fn task_row(&self, task_id: &str) -> FlowResult<usize> {
        let table = self.tables.kanban.as_str();
        match self.table.find_row(table, TASK_ID, task_id).await {
            Ok(row) => Ok(row),
            Err(e) if e.is_not_found() => Err(SheetFlowError::NotFound(format!(
                "task \"{task_id}\" not found in {table}"
            ))),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("InProgress".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert_eq!(" done ".parse::<TaskStatus>().unwrap(), TaskStatus::Done);
        assert!("blocked".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn unknown_status_cell_is_todo() {
        assert_eq!(TaskStatus::from_cell("blocked"), TaskStatus::Todo);
        assert_eq!(TaskStatus::from_cell(""), TaskStatus::Todo);
    }

    #[test]
    fn blank_priority_is_medium() {
        assert_eq!(Priority::from_cell(""), Priority::Medium);
        assert_eq!(Priority::from_cell("critical"), Priority::Critical);
    }

    #[test]
    fn tags_split_and_trim() {
        assert_eq!(split_tags("kickoff, planning,,"), vec!["kickoff", "planning"]);
        assert!(split_tags("").is_empty());
    }

    #[test]
    fn task_defaults_from_short_row() {
        let headers: Vec<String> = KANBAN_HEADERS.iter().map(|h| (*h).to_string()).collect();
        let row: Vec<String> = ["PROJ-1", "TASK-2", "Write docs", "review"]
            .iter()
            .map(|c| (*c).to_string())
            .collect();

        let task = KanbanTask::from_record(3, &Record::from_row(&headers, &row));
        assert_eq!(task.sheet_row_index, 3);
        assert_eq!(task.status, TaskStatus::Review);
        assert_eq!(task.task_type, "Task");
        assert_eq!(task.priority, Priority::Medium);
        assert!(task.tags.is_empty());
    }

    #[test]
    fn serializes_like_board_json() {
        let json = serde_json::to_value(TaskStatus::InProgress).unwrap();
        assert_eq!(json, serde_json::json!("inprogress"));
    }
}
