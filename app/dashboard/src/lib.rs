//! FILENAME: app/dashboard/src/lib.rs
//! Terminal dashboard over the order summary engine.
//!
//! Loads the cleaned order CSV, summarises a purchase-date range and renders
//! the result as a text report or JSON. Configuration comes from an optional
//! JSON file overridden by command-line flags.

pub mod cli;
pub mod config;
pub mod format;
pub mod logging;
pub mod report;

pub use cli::{run, run_with_args, Args};
pub use config::{DashboardConfig, OutputFormat};
pub use report::{render_text, JsonReport, ReportOptions, TextReport};
