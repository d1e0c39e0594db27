//! Per-team intake form questions
//!
//! Each row of the question table is `(Team, QuestionText)`. The input type
//! of a question is inferred from markers in its text.

use crate::error::{FlowResult, SheetFlowError};
use crate::flow::{missing, SheetFlow};
use serde::{Deserialize, Serialize};
use sheetflow_table::record::cell;
use sheetflow_table::{Record, SheetsTransport};

pub const TEAM: &str = "Team";
pub const QUESTION_TEXT: &str = "QuestionText";

const QUESTION_HEADERS: [&str; 2] = [TEAM, QUESTION_TEXT];

/// Form input type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionType {
    Text,
    Textarea,
    Select,
    Checkbox,
    Date,
    Url,
}

/// A question shown on a team's intake form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormQuestion {
    /// `col-<data row>`, positional
    pub id: String,
    pub question_text: String,
    pub question_type: QuestionType,
    pub options: Vec<String>,
}

/// Infer the input type of a question from its text
///
/// Markers are matched case-insensitively, first match wins:
/// `(select)`, `(checkbox: a; b)`, `describe`/`detail`, `date`,
/// `url`/`link`. Checkbox options keep their original case.
#[must_use]
pub fn infer_question_type(text: &str) -> (QuestionType, Vec<String>) {
    let lower = text.to_ascii_lowercase();

    if lower.contains("(select)") {
        return (QuestionType::Select, Vec::new());
    }
    if let Some(start) = lower.find("(checkbox:") {
        let body = start + "(checkbox:".len();
        let options = lower[body..]
            .find(')')
            .map(|end| {
                text[body..body + end]
                    .split(';')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        return (QuestionType::Checkbox, options);
    }

    let kind = if lower.contains("describe") || lower.contains("detail") {
        QuestionType::Textarea
    } else if lower.contains("date") {
        QuestionType::Date
    } else if lower.contains("url") || lower.contains("link") {
        QuestionType::Url
    } else {
        QuestionType::Text
    };
    (kind, Vec::new())
}

impl<T: SheetsTransport> SheetFlow<T> {
    /// Questions configured for `team`, in sheet order
    ///
    /// An empty or malformed question table gets its header written and
    /// yields no questions.
    pub async fn form_questions(&self, team: &str) -> FlowResult<Vec<FormQuestion>> {
        if team.trim().is_empty() {
            return Ok(Vec::new());
        }

        let table = self.tables.questions.as_str();
        let grid = self.table.read_or_create(table).await?;
        let layout = grid.split_first().and_then(|(headers, rows)| {
            let team_col = headers.iter().position(|h| h == TEAM)?;
            let text_col = headers.iter().position(|h| h == QUESTION_TEXT)?;
            Some((rows, team_col, text_col))
        });
        let Some((rows, team_col, text_col)) = layout else {
            tracing::info!(table, "initializing question table");
            self.table
                .write_header(table, &Record::header(QUESTION_HEADERS))
                .await?;
            return Ok(Vec::new());
        };

        Ok(rows
            .iter()
            .enumerate()
            .filter(|(_, row)| cell(row, team_col) == team)
            .map(|(i, row)| {
                let question_text = cell(row, text_col).to_string();
                let (question_type, options) = infer_question_type(&question_text);
                FormQuestion {
                    id: format!("col-{}", i + 1),
                    question_text,
                    question_type,
                    options,
                }
            })
            .collect())
    }

    /// Add a question to a team's form
    pub async fn add_form_question(&self, team: &str, text: &str) -> FlowResult<()> {
        if team.trim().is_empty() || text.trim().is_empty() {
            return Err(SheetFlowError::invalid_input(
                "Team and question text cannot be empty.",
            ));
        }
        let table = self.tables.questions.as_str();
        self.ensure_schema(table, &QUESTION_HEADERS).await?;
        self.table
            .append_record(
                table,
                &Record::new().with(TEAM, team).with(QUESTION_TEXT, text),
            )
            .await?;
        tracing::info!(team, "question added");
        Ok(())
    }

    /// Replace the text of an existing question
    pub async fn update_form_question(&self, team: &str, old: &str, new: &str) -> FlowResult<()> {
        if new.trim().is_empty() {
            return Err(SheetFlowError::invalid_input(
                "New question text cannot be empty.",
            ));
        }
        let (row, text_col) = self.locate_question(team, old).await?;
        self.table
            .update_cell_range(
                &self.tables.questions,
                row,
                text_col,
                text_col + 1,
                &[new.to_string()],
            )
            .await?;
        tracing::info!(team, row, "question updated");
        Ok(())
    }

    /// Remove a question row
    pub async fn delete_form_question(&self, team: &str, text: &str) -> FlowResult<()> {
        let row = self.find_question_row(team, text).await?;
        self.table.delete_row(&self.tables.questions, row).await?;
        tracing::info!(team, row, "question deleted");
        Ok(())
    }

    /// Grid position of the first question matching team and text
    pub async fn find_question_row(&self, team: &str, text: &str) -> FlowResult<usize> {
        Ok(self.locate_question(team, text).await?.0)
    }

    async fn locate_question(&self, team: &str, text: &str) -> FlowResult<(usize, usize)> {
        let table = self.tables.questions.as_str();
        let grid = self.table.read_table(table).await?;
        let Some((headers, rows)) = grid.split_first() else {
            return Err(SheetFlowError::EmptyTable(table.to_string()));
        };

        let absent = missing(headers, &QUESTION_HEADERS);
        if !absent.is_empty() {
            return Err(SheetFlowError::missing_columns(table, absent));
        }
        let team_col = headers.iter().position(|h| h == TEAM).unwrap_or_default();
        let text_col = headers
            .iter()
            .position(|h| h == QUESTION_TEXT)
            .unwrap_or_default();

        rows.iter()
            .position(|row| cell(row, team_col) == team && cell(row, text_col) == text)
            .map(|i| (i + 1, text_col))
            .ok_or_else(|| {
                SheetFlowError::NotFound(format!(
                    "Question \"{text}\" for team \"{team}\" not found."
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn select_marker() {
        assert_eq!(
            infer_question_type("Course (select)"),
            (QuestionType::Select, vec![])
        );
    }

    #[test]
    fn checkbox_options_keep_case() {
        let (kind, options) = infer_question_type("Platforms (Checkbox: iOS; Android ; Web)");
        assert_eq!(kind, QuestionType::Checkbox);
        assert_eq!(options, vec!["iOS", "Android", "Web"]);
    }

    #[test]
    fn unterminated_checkbox_has_no_options() {
        let (kind, options) = infer_question_type("Pick (checkbox: a; b");
        assert_eq!(kind, QuestionType::Checkbox);
        assert!(options.is_empty());
    }

    #[test]
    fn keyword_precedence() {
        assert_eq!(infer_question_type("Describe the date issue").0, QuestionType::Textarea);
        assert_eq!(infer_question_type("Further Details").0, QuestionType::Textarea);
        assert_eq!(infer_question_type("Due Date").0, QuestionType::Date);
        assert_eq!(infer_question_type("Link to recording").0, QuestionType::Url);
        assert_eq!(infer_question_type("Page URL").0, QuestionType::Url);
        assert_eq!(infer_question_type("Your name").0, QuestionType::Text);
    }

    #[test]
    fn select_beats_checkbox() {
        assert_eq!(
            infer_question_type("(select) (checkbox: a)").0,
            QuestionType::Select
        );
    }
}
