//! SheetFlow Core - ticket desk actions over spreadsheet tables
//!
//! Domain actions built on `sheetflow-table`:
//! - Tickets: submit, list, status updates
//! - Members: team roster with predefined team seeding
//! - Projects: promotion from tickets, kanban initialization
//! - Kanban: typed tasks addressed by `Task ID`, optimistic board moves
//! - Form questions: per-team intake questions with inferred input types
//!
//! Every action returns `Result<_, SheetFlowError>`; [`Outcome`] turns any of
//! them into the flat `{success, error?}` shape presentation code expects.
//!
//! # Example
//!
//! ```rust,ignore
//! use sheetflow_core::{Outcome, SheetFlow};
//! use sheetflow_table::{HttpTransport, Record, SheetTable, SheetsConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SheetsConfig::from_env()?;
//! let flow = SheetFlow::new(SheetTable::new(HttpTransport::from_config(&config)?));
//!
//! let id = flow
//!     .submit_ticket(Record::new().with("Name", "Ada").with("Details", "Login fails"))
//!     .await?;
//! let outcome: Outcome = flow.add_member("Ada", "CM").await.into();
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod board;
pub mod clock;
pub mod config;
pub mod error;
pub mod flow;
pub mod kanban;
pub mod members;
pub mod outcome;
pub mod projects;
pub mod questions;
pub mod tickets;

pub use board::{KanbanBoard, PendingMove};
pub use clock::{iso_timestamp, prefixed_id, Clock, SystemClock};
pub use config::{TableNames, PREDEFINED_TEAMS, TEAM_DEFAULT};
pub use error::{FlowResult, SheetFlowError};
pub use flow::{Dashboard, SheetFlow, SheetRow};
pub use kanban::{KanbanTask, NewTask, Priority, TaskStatus, KANBAN_HEADERS};
pub use outcome::Outcome;
pub use projects::PROJECT_HEADERS;
pub use questions::{infer_question_type, FormQuestion, QuestionType};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with SheetFlow Core
    pub use crate::{
        FlowResult, KanbanBoard, KanbanTask, NewTask, Outcome, Priority, SheetFlow,
        SheetFlowError, TableNames, TaskStatus,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
