//! HTTP handlers for all web routes.

pub mod upload;
pub mod predict;
pub mod health;
