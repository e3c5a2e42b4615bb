//! hemoscan-web: HTTP front end for blood-panel screening.
//! Provides:
//!   - Upload form (`GET /`)
//!   - Spreadsheet prediction (`POST /predict`)
//!   - Liveness probe (`GET /health`)

pub mod error;
pub mod spreadsheet;
pub mod pipeline;
pub mod render;
pub mod router;
pub mod handlers;
pub mod state;
