/// Structured logging for the air quality service
///
/// Provides context-rich logging with component and device identifiers,
/// timestamps, and severity levels. Supports both console output
/// and file-based logging for batch runs.

use crate::model::{BodyFault, IngestError};
use chrono::Utc;
use serde::Deserialize;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Mutex;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    #[serde(alias = "warn")]
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Component {
    Ingest,
    Config,
    Cli,
    System,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Ingest => write!(f, "INGEST"),
            Component::Config => write!(f, "CFG"),
            Component::Cli => write!(f, "CLI"),
            Component::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - client sent an incomplete reading
    Expected,
    /// Unexpected failure - body is not JSON, likely a broken sensor firmware or proxy
    Unexpected,
    /// Unknown - cannot determine if this is expected or not
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger Configuration
// ---------------------------------------------------------------------------

/// Global logger instance
static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

pub struct Logger {
    /// Minimum log level to display
    min_level: LogLevel,
    /// Optional file path for logging
    log_file: Option<String>,
    /// Whether to include timestamps in console output
    console_timestamps: bool,
}

impl Logger {
    /// Initialize the global logger
    pub fn init(min_level: LogLevel, log_file: Option<String>, console_timestamps: bool) {
        let logger = Logger {
            min_level,
            log_file,
            console_timestamps,
        };

        if let Ok(mut slot) = LOGGER.lock() {
            *slot = Some(logger);
        }
    }

    fn format_entry(level: LogLevel, component: &Component, device_id: Option<&str>, message: &str) -> String {
        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
        let device_part = device_id.map(|d| format!(" [{}]", d)).unwrap_or_default();
        format!("{} {} {}{}: {}", timestamp, level, component, device_part, message)
    }

    fn log(&self, level: LogLevel, component: &Component, device_id: Option<&str>, message: &str) {
        if level < self.min_level {
            return;
        }

        let log_entry = Self::format_entry(level, component, device_id, message);
        let device_part = device_id.map(|d| format!(" [{}]", d)).unwrap_or_default();

        // Console output. stdout carries records, so everything goes to stderr.
        if self.console_timestamps {
            eprintln!("{}", log_entry);
        } else {
            match level {
                LogLevel::Error => eprintln!("   ✗ {}{}: {}", component, device_part, message),
                LogLevel::Warning => eprintln!("   ⚠ {}{}: {}", component, device_part, message),
                LogLevel::Info => eprintln!("   {}", message),
                LogLevel::Debug => {}  // Skip debug in non-timestamp mode
            }
        }

        if let Some(ref path) = self.log_file {
            if let Err(e) = Self::append_to_file(path, &log_entry) {
                eprintln!("Failed to write to log file {}: {}", path, e);
            }
        }
    }

    fn append_to_file(path: &str, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Initialize the global logger
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>, console_timestamps: bool) {
    Logger::init(min_level, log_file.map(String::from), console_timestamps);
}

fn emit(level: LogLevel, component: Component, device_id: Option<&str>, message: &str) {
    if let Ok(guard) = LOGGER.lock() {
        if let Some(logger) = guard.as_ref() {
            logger.log(level, &component, device_id, message);
        }
    }
}

/// Log a general informational message
pub fn info(component: Component, device_id: Option<&str>, message: &str) {
    emit(LogLevel::Info, component, device_id, message);
}

/// Log a warning message
pub fn warn(component: Component, device_id: Option<&str>, message: &str) {
    emit(LogLevel::Warning, component, device_id, message);
}

/// Log an error message
pub fn error(component: Component, device_id: Option<&str>, message: &str) {
    emit(LogLevel::Error, component, device_id, message);
}

/// Log a debug message
pub fn debug(component: Component, device_id: Option<&str>, message: &str) {
    emit(LogLevel::Debug, component, device_id, message);
}

// ---------------------------------------------------------------------------
// Failure Classification Helpers
// ---------------------------------------------------------------------------

/// Classify an ingest failure by its error variant
pub fn classify_ingest_failure(err: &IngestError) -> FailureType {
    match err {
        IngestError::MissingField(_) | IngestError::InvalidTimestamp(_) => FailureType::Expected,
        IngestError::MalformedBody { fault: BodyFault::Truncated, .. } => FailureType::Unknown,
        IngestError::MalformedBody { .. } => FailureType::Unexpected,
    }
}

/// Log an ingest failure with automatic classification
pub fn log_ingest_failure(device_id: Option<&str>, err: &IngestError) {
    let failure_type = classify_ingest_failure(err);
    let message = format!("reading rejected [{}]: {}", failure_type, err);

    match failure_type {
        FailureType::Expected => debug(Component::Ingest, device_id, &message),
        FailureType::Unexpected => error(Component::Ingest, device_id, &message),
        FailureType::Unknown => warn(Component::Ingest, device_id, &message),
    }
}

// ---------------------------------------------------------------------------
// Batch Summary Logging
// ---------------------------------------------------------------------------

/// Log a summary of a batch of submissions
pub fn log_batch_summary(total: usize, accepted: usize, insufficient: usize, stale: usize) {
    let rejected = total - accepted;
    let message = format!(
        "Batch complete: {}/{} accepted ({} without PM2.5, {} stale), {} rejected",
        accepted,
        total,
        insufficient,
        stale,
        rejected
    );

    if rejected == 0 {
        info(Component::Ingest, None, &message);
    } else if accepted == 0 {
        error(Component::Ingest, None, &message);
    } else {
        warn(Component::Ingest, None, &message);
    }
}
