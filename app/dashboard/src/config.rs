//! FILENAME: app/dashboard/src/config.rs
//! Dashboard configuration.
//!
//! Settings come from an optional JSON file; command-line flags override
//! whatever the file sets. Every field has a default so an empty `{}` file
//! (or no file at all) is valid.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use persistence::CsvOptions;
use summary_engine::MissingKeyPolicy;

use crate::format::CurrencyStyle;
use crate::report::ReportOptions;

/// Rows shown in each ranked section unless configured otherwise.
pub const DEFAULT_TOP_N: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable report
    #[default]
    Text,
    /// The summary tables as JSON
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Cleaned order dataset.
    pub data_path: Option<PathBuf>,
    /// First purchase day to include. Defaults to the earliest day in the data.
    pub start: Option<NaiveDate>,
    /// Last purchase day to include. Defaults to the latest day in the data.
    pub end: Option<NaiveDate>,
    pub top_n: usize,
    pub currency: CurrencyStyle,
    /// When set, rows with an empty category, city or state are grouped
    /// under this label instead of being left out.
    pub unknown_label: Option<String>,
    pub format: OutputFormat,
    pub csv: CsvOptions,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            data_path: None,
            start: None,
            end: None,
            top_n: DEFAULT_TOP_N,
            currency: CurrencyStyle::default(),
            unknown_label: None,
            format: OutputFormat::default(),
            csv: CsvOptions::default(),
        }
    }
}

impl DashboardConfig {
    /// Read a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("failed to parse config {}", path.display()))
    }

    pub fn missing_key_policy(&self) -> MissingKeyPolicy {
        match &self.unknown_label {
            Some(label) => MissingKeyPolicy::Bucket(label.clone()),
            None => MissingKeyPolicy::Exclude,
        }
    }

    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            top_n: self.top_n,
            currency: self.currency.clone(),
            ..ReportOptions::default()
        }
    }
}
