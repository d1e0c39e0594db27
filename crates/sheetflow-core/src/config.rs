//! Table layout of the spreadsheet

use serde::{Deserialize, Serialize};

/// Teams seeded into the member table with a `Team Default` row
pub const PREDEFINED_TEAMS: [&str; 4] = ["CM", "SMD", "QAC", "Class Ops"];

/// Member name used for seeded team rows
pub const TEAM_DEFAULT: &str = "Team Default";

/// Tab names backing each domain table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableNames {
    pub tickets: String,
    pub members: String,
    pub projects: String,
    pub kanban: String,
    pub questions: String,
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            tickets: "Sheet1".into(),
            members: "Sheet2".into(),
            projects: "Sheet3".into(),
            kanban: "Sheet4".into(),
            questions: "Sheet5".into(),
        }
    }
}

impl TableNames {
    /// Default layout, `Sheet1` through `Sheet5`
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With tickets tab
    #[inline]
    #[must_use]
    pub fn with_tickets(mut self, name: impl Into<String>) -> Self {
        self.tickets = name.into();
        self
    }

    /// With members tab
    #[inline]
    #[must_use]
    pub fn with_members(mut self, name: impl Into<String>) -> Self {
        self.members = name.into();
        self
    }

    /// With projects tab
    #[inline]
    #[must_use]
    pub fn with_projects(mut self, name: impl Into<String>) -> Self {
        self.projects = name.into();
        self
    }

    /// With kanban tab
    #[inline]
    #[must_use]
    pub fn with_kanban(mut self, name: impl Into<String>) -> Self {
        self.kanban = name.into();
        self
    }

    /// With form questions tab
    #[inline]
    #[must_use]
    pub fn with_questions(mut self, name: impl Into<String>) -> Self {
        self.questions = name.into();
        self
    }
}
