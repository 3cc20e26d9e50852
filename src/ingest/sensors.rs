/// Sensor submission handling
///
/// Accepts the JSON body a sensor device posts, validates it, runs the
/// AQI engine over it and produces the `ReadingRecord` that would be
/// written to the `readings` table.
///
/// Body shape: `{ "deviceId": "...", "pm25": 12.3, "voc": 110, "co": 0.4 }`
/// - `deviceId`, `pm25` and `voc` must be present; `co` is optional.
/// - `deviceId` may be a string or a number; null, false, 0 and blank
///   strings count as missing.
/// - An explicit `null` for `pm25` is accepted and stored with no AQI.
/// - An optional `createdAt` (RFC 3339) replays a stored reading; without
///   it the reading is stamped with the ingest time.

use crate::aqi::compute_aqi;
use crate::logging::{self, Component};
use crate::model::{BodyFault, IngestError, ReadingRecord, SensorValues, value_as_f64};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use serde_json::error::Category as JsonCategory;

// ============================================================================
// Request body
// ============================================================================

/// Raw submission body. Fields keep the JSON value so that a missing key,
/// an explicit `null` and a wrongly-typed value can be told apart.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SensorSubmission {
    #[serde(rename = "deviceId", default, deserialize_with = "present")]
    pub device_id: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub pm25: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub voc: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub co: Option<Value>,
    #[serde(rename = "createdAt", alias = "created_at", default)]
    pub created_at: Option<Value>,
}

/// `Some(Value::Null)` for an explicit null, `None` (via `default`) for a
/// missing key.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl SensorSubmission {
    /// Device id as text, or `None` when the id is absent or falsy.
    pub fn device_id(&self) -> Option<String> {
        match self.device_id.as_ref()? {
            Value::String(s) => Some(s.trim())
                .filter(|id| !id.is_empty())
                .map(str::to_string),
            Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Timestamp carried by the body, `Ok(None)` when there is none.
    pub fn created_at(&self) -> Result<Option<DateTime<Utc>>, IngestError> {
        match &self.created_at {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => DateTime::parse_from_rfc3339(s.trim())
                .map(|t| Some(t.with_timezone(&Utc)))
                .map_err(|_| IngestError::InvalidTimestamp(s.clone())),
            Some(other) => Err(IngestError::InvalidTimestamp(other.to_string())),
        }
    }

    /// Pollutant values as the engine sees them.
    pub fn values(&self) -> SensorValues {
        let num = |v: &Option<Value>| v.as_ref().and_then(value_as_f64);
        SensorValues {
            pm25: num(&self.pm25),
            co: num(&self.co),
            voc: num(&self.voc),
        }
    }
}

// ============================================================================
// Parsing and validation
// ============================================================================

pub fn parse_submission(body: &str) -> Result<SensorSubmission, IngestError> {
    serde_json::from_str(body).map_err(|e| {
        let fault = match e.classify() {
            JsonCategory::Eof => BodyFault::Truncated,
            JsonCategory::Data => BodyFault::Shape,
            JsonCategory::Syntax | JsonCategory::Io => BodyFault::Syntax,
        };
        IngestError::MalformedBody { fault, message: e.to_string() }
    })
}

/// Validates a submission and classifies it.
///
/// `now` becomes the record's `created_at` unless the body carries one.
pub fn build_record(
    submission: SensorSubmission,
    now: DateTime<Utc>,
) -> Result<ReadingRecord, IngestError> {
    let device_id = submission
        .device_id()
        .ok_or(IngestError::MissingField("deviceId"))?;

    if submission.pm25.is_none() {
        return Err(IngestError::MissingField("pm25"));
    }
    if submission.voc.is_none() {
        return Err(IngestError::MissingField("voc"));
    }

    let values = submission.values();
    Ok(ReadingRecord {
        device_id,
        pm25: values.pm25,
        voc: values.voc,
        co: values.co,
        result: compute_aqi(&values),
        created_at: submission.created_at()?.unwrap_or(now),
    })
}

/// Parses, validates and classifies one body, logging the outcome.
pub fn ingest_line(body: &str, now: DateTime<Utc>) -> Result<ReadingRecord, IngestError> {
    let submission = match parse_submission(body) {
        Ok(s) => s,
        Err(e) => {
            logging::log_ingest_failure(None, &e);
            return Err(e);
        }
    };
    let device_id = submission.device_id();

    match build_record(submission, now) {
        Ok(record) => {
            match record.result.assessment() {
                Some(a) => logging::debug(
                    Component::Ingest,
                    Some(&record.device_id),
                    &format!("AQI {} ({}, risk {})", a.index, a.category, a.risk),
                ),
                None => logging::info(
                    Component::Ingest,
                    Some(&record.device_id),
                    "no usable PM2.5 value, stored without AQI",
                ),
            }
            Ok(record)
        }
        Err(e) => {
            logging::log_ingest_failure(device_id.as_deref(), &e);
            Err(e)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
