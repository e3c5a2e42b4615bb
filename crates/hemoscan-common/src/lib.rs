//! hemoscan-common: Shared types, schema constants, and errors used across all hemoscan crates.

pub mod error;
pub mod schema;
pub mod table;
pub mod panel;
pub mod diagnosis;

// Re-export commonly used types
pub use error::{HemoscanError, Result};
pub use schema::{EXPECTED_COLUMNS, FEATURE_COUNT, IDENTIFIER_COLUMN};
pub use table::{CellValue, Table};
pub use panel::BloodPanel;
pub use diagnosis::{Diagnosis, ResultRecord, recommendation_for};
