//! FILENAME: core/persistence/src/csv_reader.rs

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;
use dataset::{Attribute, DatasetError, OrderTable, OrderTableBuilder, Value};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::PersistenceError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvOptions {
    pub delimiter: u8,
    /// Formats tried, in order, for the purchase timestamp column. A bare
    /// `%Y-%m-%d` date is always accepted as midnight.
    pub timestamp_formats: Vec<String>,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            timestamp_formats: vec![
                "%Y-%m-%d %H:%M:%S%.f".to_string(),
                "%Y-%m-%dT%H:%M:%S%.f".to_string(),
                "%Y-%m-%d %H:%M".to_string(),
            ],
        }
    }
}

pub fn load_orders_csv(path: &Path, options: &CsvOptions) -> Result<OrderTable, PersistenceError> {
    info!("loading orders from {}", path.display());
    let file = File::open(path)?;
    read_orders_csv(BufReader::new(file), options)
}

/// Reads an order CSV. The first row is the header; the purchase timestamp and
/// payment value columns are parsed, every other column is kept as text. The
/// returned table is sorted ascending by purchase timestamp.
///
/// Row numbers in errors are 1-based CSV lines, the header being row 1.
pub fn read_orders_csv<R: Read>(reader: R, options: &CsvOptions) -> Result<OrderTable, PersistenceError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        // Header handled manually so row numbers stay consistent in errors.
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut record = StringRecord::new();
    let mut row: u64 = 1;

    let has_header = csv_reader
        .read_record(&mut record)
        .map_err(|e| map_csv_error(e, row))?;
    if !has_header {
        return Err(PersistenceError::EmptyInput);
    }

    let header = header_names(&record);
    for attribute in Attribute::ALL {
        if !header.iter().any(|name| name == attribute.column_name()) {
            return Err(PersistenceError::MissingColumn(attribute.column_name().to_string()));
        }
    }
    let columns = ParsedColumns {
        timestamp: column_position(&header, Attribute::PurchaseTimestamp),
        payment: column_position(&header, Attribute::PaymentValue),
    };

    let mut builder = OrderTableBuilder::new(header);
    loop {
        match csv_reader.read_record(&mut record) {
            Ok(false) => break,
            Ok(true) => {
                row += 1;
                let values = record
                    .iter()
                    .enumerate()
                    .map(|(column, raw)| parse_field(raw, column, row, &columns, options))
                    .collect::<Result<Vec<Value>, PersistenceError>>()?;
                builder.push_row(values).map_err(|e| at_row(e, row))?;
            }
            Err(e) => return Err(map_csv_error(e, row + 1)),
        }
    }

    debug!("parsed {} data rows", builder.len());
    let table = builder.finish().sort_by_timestamp()?;
    info!("loaded {} order rows", table.len());
    Ok(table)
}

struct ParsedColumns {
    timestamp: usize,
    payment: usize,
}

/// Column names from the header row. An unnamed leading column (a saved
/// dataframe index) becomes `index`; other unnamed columns get positional names.
fn header_names(record: &StringRecord) -> Vec<String> {
    record
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let name = name.trim_start_matches('\u{feff}').trim();
            match (i, name.is_empty()) {
                (0, true) => "index".to_string(),
                (_, true) => format!("column{}", i + 1),
                _ => name.to_string(),
            }
        })
        .collect()
}

fn column_position(header: &[String], attribute: Attribute) -> usize {
    header
        .iter()
        .position(|name| name == attribute.column_name())
        .unwrap_or(usize::MAX)
}

fn parse_field(
    raw: &str,
    column: usize,
    row: u64,
    columns: &ParsedColumns,
    options: &CsvOptions,
) -> Result<Value, PersistenceError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Value::Empty);
    }

    if column == columns.timestamp {
        return parse_timestamp(trimmed, &options.timestamp_formats)
            .map(Value::Timestamp)
            .ok_or_else(|| PersistenceError::Parse {
                row,
                column: column as u64 + 1,
                reason: format!("invalid timestamp {trimmed:?}"),
            });
    }

    if column == columns.payment {
        return trimmed
            .parse::<f64>()
            .map(Value::from)
            .map_err(|e| PersistenceError::Parse {
                row,
                column: column as u64 + 1,
                reason: format!("invalid payment value {trimmed:?}: {e}"),
            });
    }

    Ok(Value::Text(raw.to_string()))
}

/// Renumbers a builder error with the loader's CSV row.
fn at_row(err: DatasetError, row: u64) -> DatasetError {
    match err {
        DatasetError::RowWidth { expected, found, .. } => DatasetError::RowWidth {
            row: row as u32,
            expected,
            found,
        },
        other => other,
    }
}

pub fn parse_timestamp(raw: &str, formats: &[String]) -> Option<NaiveDateTime> {
    formats
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

fn map_csv_error(err: csv::Error, fallback_row: u64) -> PersistenceError {
    let reason = err.to_string();
    let pos = err.position().cloned();

    match err.into_kind() {
        csv::ErrorKind::Io(e) => PersistenceError::Io(e),
        _ => {
            let row = pos
                .map(|p| p.record() + 1)
                .unwrap_or(fallback_row);
            PersistenceError::Parse {
                row,
                column: 0,
                reason,
            }
        }
    }
}
