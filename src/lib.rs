//! Project Import Library
//!
//! Migrates project, media and tag records from CSV exports into the
//! platform database, rewriting cross-table references through an
//! original → assigned ID mapping. Exported for the binary and for tests.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod input;
pub mod logging;
pub mod pipeline;
pub mod types;
