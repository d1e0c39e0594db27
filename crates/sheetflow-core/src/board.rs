//! Client-side kanban board with optimistic moves
//!
//! A drag-and-drop move is applied to the board first and written to the
//! sheet afterwards. The `PendingMove` returned by `KanbanBoard::move_card`
//! restores the previous placement when the write fails.

use crate::error::{FlowResult, SheetFlowError};
use crate::flow::SheetFlow;
use crate::kanban::{KanbanTask, TaskStatus};
use serde::Serialize;
use sheetflow_table::SheetsTransport;
use std::collections::BTreeMap;

/// Tasks of one project grouped by status column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KanbanBoard {
    project_id: String,
    columns: BTreeMap<TaskStatus, Vec<KanbanTask>>,
}

/// A move applied locally but not yet confirmed by the sheet
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a pending move must be confirmed or rolled back"]
pub struct PendingMove {
    pub task_id: String,
    pub from: TaskStatus,
    pub from_position: usize,
    pub to: TaskStatus,
}

impl PendingMove {
    /// Whether the card changed column (a reorder needs no remote write)
    #[inline]
    #[must_use]
    pub fn changes_status(&self) -> bool {
        self.from != self.to
    }
}

impl KanbanBoard {
    /// Group tasks by status, keeping their relative order
    pub fn new(project_id: impl Into<String>, tasks: impl IntoIterator<Item = KanbanTask>) -> Self {
        let mut columns: BTreeMap<TaskStatus, Vec<KanbanTask>> =
            TaskStatus::ALL.iter().map(|s| (*s, Vec::new())).collect();
        for task in tasks {
            columns.entry(task.status).or_default().push(task);
        }
        Self {
            project_id: project_id.into(),
            columns,
        }
    }

    #[inline]
    #[must_use]
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Cards in one column, top to bottom
    #[must_use]
    pub fn column(&self, status: TaskStatus) -> &[KanbanTask] {
        self.columns.get(&status).map(Vec::as_slice).unwrap_or_default()
    }

    /// Columns left to right
    pub fn columns(&self) -> impl Iterator<Item = (TaskStatus, &[KanbanTask])> {
        self.columns.iter().map(|(s, tasks)| (*s, tasks.as_slice()))
    }

    /// Total number of cards
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Column and position of a card
    #[must_use]
    pub fn locate(&self, task_id: &str) -> Option<(TaskStatus, usize)> {
        self.columns.iter().find_map(|(status, tasks)| {
            tasks
                .iter()
                .position(|t| t.id == task_id)
                .map(|pos| (*status, pos))
        })
    }

    /// Move a card to `position` in column `to` (clamped to the column length)
    ///
    /// # Errors
    /// `NotFound` if no card has that id; the board is unchanged.
    pub fn move_card(
        &mut self,
        task_id: &str,
        to: TaskStatus,
        position: usize,
    ) -> FlowResult<PendingMove> {
        let (from, from_position) = self
            .locate(task_id)
            .ok_or_else(|| SheetFlowError::NotFound(format!("task \"{task_id}\" not on board")))?;

        let mut card = self.take(from, from_position);
        card.status = to;
        self.place(card, to, position);

        Ok(PendingMove {
            task_id: task_id.to_string(),
            from,
            from_position,
            to,
        })
    }

    /// Undo a move that the sheet rejected
    pub fn rollback(&mut self, pending: PendingMove) {
        let Some((status, pos)) = self.locate(&pending.task_id) else {
            return;
        };
        let mut card = self.take(status, pos);
        card.status = pending.from;
        self.place(card, pending.from, pending.from_position);
    }

    fn take(&mut self, status: TaskStatus, position: usize) -> KanbanTask {
        self.columns.entry(status).or_default().remove(position)
    }

    fn place(&mut self, card: KanbanTask, status: TaskStatus, position: usize) {
        let column = self.columns.entry(status).or_default();
        let position = position.min(column.len());
        column.insert(position, card);
    }
}

impl<T: SheetsTransport> SheetFlow<T> {
    /// Board for one project
    pub async fn board(&self, project_id: &str) -> FlowResult<KanbanBoard> {
        Ok(KanbanBoard::new(project_id, self.kanban_tasks(project_id).await?))
    }

    /// Move a card optimistically, then persist the status change
    ///
    /// The board is restored when the write fails.
    pub async fn move_card(
        &self,
        board: &mut KanbanBoard,
        task_id: &str,
        to: TaskStatus,
        position: usize,
    ) -> FlowResult<()> {
        let pending = board.move_card(task_id, to, position)?;
        if !pending.changes_status() {
            return Ok(());
        }

        if let Err(e) = self.move_kanban_task(task_id, to).await {
            tracing::warn!(task = task_id, error = %e, "move rejected, rolling back");
            board.rollback(pending);
            return Err(e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kanban::Priority;
    use pretty_assertions::assert_eq;

    fn task(id: &str, status: TaskStatus) -> KanbanTask {
        KanbanTask {
            sheet_row_index: 1,
            id: id.to_string(),
            project_id: "PROJ-1".to_string(),
            title: id.to_string(),
            description: String::new(),
            status,
            assignee: String::new(),
            due_date: String::new(),
            task_type: "Task".to_string(),
            priority: Priority::Medium,
            tags: Vec::new(),
        }
    }

    fn ids(board: &KanbanBoard, status: TaskStatus) -> Vec<&str> {
        board.column(status).iter().map(|t| t.id.as_str()).collect()
    }

    fn board() -> KanbanBoard {
        KanbanBoard::new(
            "PROJ-1",
            [
                task("a", TaskStatus::Todo),
                task("b", TaskStatus::Todo),
                task("c", TaskStatus::Done),
            ],
        )
    }

    #[test]
    fn groups_into_all_columns() {
        let board = board();
        assert_eq!(board.columns().count(), 4);
        assert_eq!(ids(&board, TaskStatus::Todo), vec!["a", "b"]);
        assert!(board.column(TaskStatus::Review).is_empty());
        assert_eq!(board.len(), 3);
    }

    #[test]
    fn move_updates_status_and_position() {
        let mut board = board();
        let pending = board.move_card("b", TaskStatus::Done, 0).unwrap();

        assert_eq!(ids(&board, TaskStatus::Done), vec!["b", "c"]);
        assert_eq!(board.column(TaskStatus::Done)[0].status, TaskStatus::Done);
        assert_eq!(pending.from, TaskStatus::Todo);
        assert_eq!(pending.from_position, 1);
    }

    #[test]
    fn position_is_clamped() {
        let mut board = board();
        let _ = board.move_card("a", TaskStatus::Review, 99).unwrap();
        assert_eq!(ids(&board, TaskStatus::Review), vec!["a"]);
    }

    #[test]
    fn rollback_restores_placement() {
        let mut board = board();
        let before = board.clone();

        let pending = board.move_card("a", TaskStatus::InProgress, 0).unwrap();
        board.rollback(pending);

        assert_eq!(board, before);
    }

    #[test]
    fn unknown_card_leaves_board_untouched() {
        let mut board = board();
        let before = board.clone();

        assert!(board.move_card("zzz", TaskStatus::Done, 0).is_err());
        assert_eq!(board, before);
    }

    #[test]
    fn reorder_within_column() {
        let mut board = board();
        let pending = board.move_card("b", TaskStatus::Todo, 0).unwrap();

        assert!(!pending.changes_status());
        assert_eq!(ids(&board, TaskStatus::Todo), vec!["b", "a"]);
    }
}
