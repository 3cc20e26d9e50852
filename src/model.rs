/// Breakpoint, Category, RiskTier, SensorValues, IndexResult, ReadingRecord
/// core data structures and error handling
///
/// Core data types for the air quality service.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no computation and no I/O, only types and their
/// Display / serde plumbing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

// ---------------------------------------------------------------------------
// Breakpoints
// ---------------------------------------------------------------------------

/// One linear segment of a concentration-to-index mapping.
///
/// Within a segment `conc_low <= conc_high` and `index_low <= index_high`.
/// A table of these is listed in ascending, non-overlapping order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breakpoint {
    pub conc_low: f64,
    pub conc_high: f64,
    pub index_low: i32,
    pub index_high: i32,
}

impl Breakpoint {
    pub const fn new(conc_low: f64, conc_high: f64, index_low: i32, index_high: i32) -> Self {
        Self { conc_low, conc_high, index_low, index_high }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.conc_low && value <= self.conc_high
    }

    /// Index points per concentration unit.
    pub fn slope(&self) -> f64 {
        f64::from(self.index_high - self.index_low) / (self.conc_high - self.conc_low)
    }
}

// ---------------------------------------------------------------------------
// Classification labels
// ---------------------------------------------------------------------------

/// AQI category, in ascending order of severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Good,
    Moderate,
    #[serde(rename = "Unhealthy for Sensitive Groups")]
    UnhealthyForSensitiveGroups,
    Unhealthy,
    #[serde(rename = "Very Unhealthy")]
    VeryUnhealthy,
    Hazardous,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::Good => "Good",
            Category::Moderate => "Moderate",
            Category::UnhealthyForSensitiveGroups => "Unhealthy for Sensitive Groups",
            Category::Unhealthy => "Unhealthy",
            Category::VeryUnhealthy => "Very Unhealthy",
            Category::Hazardous => "Hazardous",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Coarse three-level collapse of `Category` used for simplified messaging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskTier {
    Low,
    Mid,
    High,
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskTier::Low => write!(f, "Low"),
            RiskTier::Mid => write!(f, "Mid"),
            RiskTier::High => write!(f, "High"),
        }
    }
}

// ---------------------------------------------------------------------------
// Reading types
// ---------------------------------------------------------------------------

/// Pollutant values from one sensor reading.
///
/// Only `pm25` takes part in classification. `co` and `voc` ride along so
/// callers can pass a whole reading. Non-numeric JSON values deserialize
/// to `None` rather than failing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorValues {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub pm25: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub co: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub voc: Option<f64>,
}

impl SensorValues {
    pub fn pm25(pm25: f64) -> Self {
        Self { pm25: Some(pm25), ..Self::default() }
    }
}

/// Converts a loose JSON value into a concentration.
///
/// Numbers pass through, numeric strings are parsed, everything else
/// (null, booleans, objects, garbage text) is absent.
pub fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| !v.is_nan()),
        _ => None,
    }
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_as_f64(&value))
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Index, category and risk tier for one valid concentration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assessment {
    pub index: i32,
    pub category: Category,
    pub risk: RiskTier,
}

/// Outcome of classifying a reading.
///
/// Either all three fields are present or all are absent; absent means
/// "insufficient data", never a zero/Good reading. Serializes as
/// `{ "aqi", "aqi_category", "risk_level" }` with nulls when absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IndexResult(Option<Assessment>);

impl IndexResult {
    pub fn insufficient() -> Self {
        IndexResult(None)
    }

    pub fn index(&self) -> Option<i32> {
        self.0.map(|a| a.index)
    }

    pub fn category(&self) -> Option<Category> {
        self.0.map(|a| a.category)
    }

    pub fn risk_tier(&self) -> Option<RiskTier> {
        self.0.map(|a| a.risk)
    }

    pub fn assessment(&self) -> Option<Assessment> {
        self.0
    }

    pub fn is_insufficient_data(&self) -> bool {
        self.0.is_none()
    }
}

impl From<Option<Assessment>> for IndexResult {
    fn from(assessment: Option<Assessment>) -> Self {
        IndexResult(assessment)
    }
}

#[derive(Serialize)]
struct IndexResultFields {
    aqi: Option<i32>,
    aqi_category: Option<Category>,
    risk_level: Option<RiskTier>,
}

impl Serialize for IndexResult {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        IndexResultFields {
            aqi: self.index(),
            aqi_category: self.category(),
            risk_level: self.risk_tier(),
        }
        .serialize(serializer)
    }
}

/// A classified reading, shaped like a row of the `readings` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadingRecord {
    pub device_id: String,
    pub pm25: Option<f64>,
    pub voc: Option<f64>,
    pub co: Option<f64>,
    #[serde(flatten)]
    pub result: IndexResult,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Why a submission body could not be read as JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFault {
    /// Not JSON at all.
    Syntax,
    /// JSON that ends early, typically a cut-off upload.
    Truncated,
    /// Valid JSON that is not an object.
    Shape,
}

impl fmt::Display for BodyFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BodyFault::Syntax => write!(f, "syntax"),
            BodyFault::Truncated => write!(f, "truncated"),
            BodyFault::Shape => write!(f, "shape"),
        }
    }
}

/// Errors that can arise when accepting a sensor submission.
#[derive(Debug, PartialEq)]
pub enum IngestError {
    /// The body could not be deserialized.
    MalformedBody { fault: BodyFault, message: String },
    /// A required field (`deviceId`, `pm25`, `voc`) is missing or empty.
    MissingField(&'static str),
    /// `createdAt` is present but not an RFC 3339 timestamp.
    InvalidTimestamp(String),
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestError::MalformedBody { fault, message } => {
                write!(f, "Invalid JSON ({}): {}", fault, message)
            }
            IngestError::MissingField(field) => write!(f, "Missing required fields: {}", field),
            IngestError::InvalidTimestamp(value) => write!(f, "Invalid createdAt: {}", value),
        }
    }
}

impl std::error::Error for IngestError {}

/// Errors that can arise when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io { path: String, source: std::io::Error },
    Parse(String),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => write!(f, "Cannot read config {}: {}", path, source),
            ConfigError::Parse(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::Invalid(msg) => write!(f, "Invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
