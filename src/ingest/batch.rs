/// Batch ingestion of newline-delimited submissions
///
/// Each non-blank input line is one sensor body. Accepted lines are written
/// out as one JSON object per line: the `readings` row plus the trend-chart
/// tier for each pollutant that has cutoffs and a staleness flag, both
/// driven by configuration. Rejected lines are logged and skipped.

use crate::alert::stalenesses::is_stale_at;
use crate::alert::thresholds::{Pollutant, ThresholdTable, classify_trend_value};
use crate::config::AppConfig;
use crate::ingest::sensors::ingest_line;
use crate::logging;
use crate::model::{ReadingRecord, RiskTier};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::{self, BufRead, Write};

// ============================================================================
// Options and output
// ============================================================================

/// Settings applied to every record in a batch.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub thresholds: ThresholdTable,
    pub max_age_minutes: u64,
}

impl BatchOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            thresholds: config.threshold_table(),
            max_age_minutes: config.staleness.max_age_minutes,
        }
    }
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

/// Trend-chart tiers for the pollutants a reading carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrendTiers {
    pub pm25: Option<RiskTier>,
    pub co: Option<RiskTier>,
}

/// One output line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedRecord {
    #[serde(flatten)]
    pub record: ReadingRecord,
    pub trend: TrendTiers,
    pub stale: bool,
}

impl AnnotatedRecord {
    pub fn new(record: ReadingRecord, options: &BatchOptions, now: DateTime<Utc>) -> Self {
        let tier = |pollutant: Pollutant, value: Option<f64>| {
            value.and_then(|v| classify_trend_value(&options.thresholds.get(pollutant), v))
        };
        let trend = TrendTiers {
            pm25: tier(Pollutant::Pm25, record.pm25),
            co: tier(Pollutant::Co, record.co),
        };
        let stale = is_stale_at(record.created_at, options.max_age_minutes, now);
        Self { record, trend, stale }
    }
}

/// Counts for one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Non-blank lines seen.
    pub total: usize,
    pub accepted: usize,
    /// Accepted, but without a usable PM2.5 value.
    pub insufficient: usize,
    pub stale: usize,
}

impl BatchSummary {
    pub fn rejected(&self) -> usize {
        self.total - self.accepted
    }

    /// False only when there was input and none of it was accepted.
    pub fn succeeded(&self) -> bool {
        self.total == 0 || self.accepted > 0
    }
}

// ============================================================================
// Runner
// ============================================================================

/// Reads submissions from `input`, writes annotated records to `out`, and
/// logs a summary. `now` stamps bodies without `createdAt` and is the
/// reference point for staleness.
pub fn run_batch<R: BufRead, W: Write>(
    input: R,
    mut out: W,
    options: &BatchOptions,
    now: DateTime<Utc>,
) -> io::Result<BatchSummary> {
    let mut summary = BatchSummary::default();

    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        summary.total += 1;

        let Ok(record) = ingest_line(&line, now) else {
            continue;
        };
        let annotated = AnnotatedRecord::new(record, options, now);
        summary.accepted += 1;
        if annotated.record.result.is_insufficient_data() {
            summary.insufficient += 1;
        }
        if annotated.stale {
            summary.stale += 1;
        }

        let json = serde_json::to_string(&annotated)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        writeln!(out, "{}", json)?;
    }

    out.flush()?;
    logging::log_batch_summary(summary.total, summary.accepted, summary.insufficient, summary.stale);
    Ok(summary)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::Value;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, 12, 0, 0).unwrap()
    }

    fn run(input: &str, options: &BatchOptions) -> (BatchSummary, Vec<Value>) {
        let mut out = Vec::new();
        let summary = run_batch(input.as_bytes(), &mut out, options, fixed_now())
            .expect("in-memory batch should not fail");
        let lines = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        (summary, lines)
    }

    #[test]
    fn test_mixed_batch_writes_one_line_per_accepted_submission() {
        let input = concat!(
            r#"{ "deviceId": "a", "pm25": 8.0, "voc": 1 }"#, "\n",
            "\n",
            "   \n",
            r#"{ "deviceId": "b", "voc": 1 }"#, "\n",
            r#"{ "deviceId": "c", "pm25": null, "voc": 1 }"#, "\n",
            "garbage\n",
        );
        let (summary, lines) = run(input, &BatchOptions::default());

        assert_eq!(summary.total, 4, "blank lines are not counted");
        assert_eq!(summary.accepted, 2);
        assert_eq!(summary.rejected(), 2);
        assert_eq!(summary.insufficient, 1);
        assert!(summary.succeeded());

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["device_id"], "a");
        assert_eq!(lines[0]["aqi_category"], "Good");
        assert_eq!(lines[1]["device_id"], "c");
        assert!(lines[1]["aqi"].is_null());
    }

    #[test]
    fn test_all_rejected_batch_fails() {
        let input = "nope\n{ \"voc\": 1 }\n";
        let (summary, lines) = run(input, &BatchOptions::default());
        assert_eq!(summary.total, 2);
        assert_eq!(summary.accepted, 0);
        assert!(!summary.succeeded());
        assert!(lines.is_empty());
    }

    #[test]
    fn test_empty_input_succeeds() {
        let (summary, lines) = run("", &BatchOptions::default());
        assert_eq!(summary, BatchSummary::default());
        assert!(summary.succeeded());
        assert!(lines.is_empty());

        let (summary, _) = run("\n\n", &BatchOptions::default());
        assert!(summary.succeeded());
    }

    #[test]
    fn test_configured_thresholds_and_staleness_annotate_output() {
        let config = AppConfig::from_toml_str(concat!(
            "[staleness]\nmax_age_minutes = 30\n",
            "[trend_thresholds.CO]\nmoderate = 4.0\nhigh = 9.0\n",
        ))
        .unwrap();
        let options = BatchOptions::from_config(&config);
        let input = concat!(
            r#"{ "deviceId": "fresh", "pm25": 30.0, "voc": 1, "co": 5.0 }"#, "\n",
            r#"{ "deviceId": "old", "pm25": 60.0, "voc": 1, "createdAt": "2025-06-02T11:00:00Z" }"#, "\n",
        );
        let (summary, lines) = run(input, &options);

        assert_eq!(summary.stale, 1);
        assert_eq!(lines[0]["stale"], false);
        assert_eq!(lines[0]["trend"]["pm25"], "Mid");
        assert_eq!(lines[0]["trend"]["co"], "Mid", "CO cutoff override applies");
        assert_eq!(lines[1]["stale"], true);
        assert_eq!(lines[1]["trend"]["pm25"], "High");
        assert!(lines[1]["trend"]["co"].is_null());
        assert_eq!(lines[1]["created_at"], "2025-06-02T11:00:00Z");
    }
}
