//! FILENAME: app/dashboard/src/logging.rs
// PURPOSE: Unified log line format for the dashboard and the core crates.

use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};

use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

// ============================================================================
// UNIFIED LOGGING SYSTEM
// ============================================================================

/// Global sequence counter shared by every log line of the process
static LOG_SEQ: AtomicU64 = AtomicU64::new(0);

/// Get next sequence number
pub fn next_seq() -> u64 {
    LOG_SEQ.fetch_add(1, Ordering::SeqCst) + 1
}

/// Format a log line as `seq|LEVEL|category|message`
pub fn format_line(seq: u64, level: Level, category: &str, message: &str) -> String {
    format!("{}|{}|{}|{}", seq, level, category, message)
}

/// Category for a record target: the crate name, upper-cased.
/// `summary_engine::engine` becomes `SUMMARY_ENGINE`.
pub fn category_for(target: &str) -> String {
    target
        .split("::")
        .next()
        .unwrap_or(target)
        .to_ascii_uppercase()
}

/// Verbosity flag count to level: warnings by default, `-v` info,
/// `-vv` debug, anything more trace.
pub fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// `log` backend writing unified lines to stderr. Stdout is kept for the
/// report itself.
struct DashboardLogger {
    level: LevelFilter,
}

impl Log for DashboardLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_line(
            next_seq(),
            record.level(),
            &category_for(record.target()),
            &record.args().to_string(),
        );
        let _ = writeln!(std::io::stderr().lock(), "{}", line);
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Install the dashboard logger. Fails if a logger is already installed.
pub fn init(verbosity: u8) -> Result<(), SetLoggerError> {
    let level = level_for(verbosity);
    log::set_boxed_logger(Box::new(DashboardLogger { level }))?;
    log::set_max_level(level);
    Ok(())
}
