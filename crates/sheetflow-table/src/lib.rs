//! SheetFlow Table
//!
//! Treats the tabs of a remote spreadsheet as ad-hoc relational tables.
//!
//! # Core Operations
//!
//! - **Read**: whole-tab value grids, header lookup, row search
//! - **Append**: header-aligned records with header synthesis and column auto-add
//! - **Update**: single header cells, horizontal cell spans, keyed row overlays
//! - **Delete**: structural row and column removal
//!
//! # Architecture
//!
//! ```text
//! SheetTable<T> ── A1 ranges / Record ──▶ SheetsTransport
//!                                            ├── HttpTransport (Sheets v4 + TokenProvider)
//!                                            └── in-memory fakes and mocks (tests)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use sheetflow_table::{HttpTransport, Record, SheetTable, SheetsConfig};
//!
//! # async fn example() -> Result<(), sheetflow_table::TableError> {
//! let config = SheetsConfig::from_env()?;
//! let table = SheetTable::new(HttpTransport::from_config(&config)?);
//!
//! table
//!     .append_record("Sheet2", &Record::new().with("Name", "Ada").with("Team", "CM"))
//!     .await?;
//! let grid = table.read_table("Sheet2").await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod a1;
pub mod config;
pub mod error;
pub mod model;
pub mod record;
pub mod table;
pub mod transport;

pub use a1::{column_index, column_letter, A1Range, CellRef};
pub use config::SheetsConfig;
pub use error::{NotFoundError, TableError, TableResult};
pub use model::{Dimension, Request, SpreadsheetMetadata, ValueRange};
pub use record::{Grid, Record};
pub use table::{SchemaPolicy, SheetTable};
pub use transport::{HttpTransport, SheetsTransport};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with tables
    pub use crate::error::{NotFoundError, TableError, TableResult};
    pub use crate::record::{Grid, Record};
    pub use crate::table::{SchemaPolicy, SheetTable};
    pub use crate::transport::SheetsTransport;
}
