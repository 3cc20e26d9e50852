/// Integration tests for sensor ingestion
///
/// Tests verify:
/// 1. Sensor bodies are validated like the readings endpoint does
/// 2. Accepted bodies carry AQI fields computed by the engine
/// 3. Records serialize to the `readings` row shape
/// 4. Config-driven staleness and trend thresholds apply to records
/// 5. Batch runs report success only when something was accepted
///
/// Run with: cargo test --test ingest_integration

use airq_service::alert::stalenesses::is_stale_at;
use airq_service::config::AppConfig;
use airq_service::ingest::batch::{BatchOptions, run_batch};
use airq_service::ingest::sensors::ingest_line;
use airq_service::logging::{self, LogLevel};
use airq_service::model::{Category, IngestError, RiskTier};
use chrono::{DateTime, Duration, TimeZone, Utc};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 20, 18, 0, 0).unwrap()
}

fn batch() -> Vec<&'static str> {
    vec![
        r#"{ "deviceId": "living-room", "pm25": 8.2, "voc": 95, "co": 0.3 }"#,
        r#"{ "deviceId": "garage", "pm25": 180.0, "voc": 640 }"#,
        r#"{ "deviceId": "attic", "pm25": null, "voc": 40 }"#,
        r#"{ "deviceId": "porch", "voc": 12 }"#,
        r#"{ "pm25": 10.0, "voc": 12 }"#,
        "definitely not json",
    ]
}

// ---------------------------------------------------------------------------
// Batch ingest
// ---------------------------------------------------------------------------

#[test]
fn test_batch_accepts_valid_and_rejects_invalid() {
    logging::init_logger(LogLevel::Error, None, false);

    let results: Vec<_> = batch().into_iter().map(|b| ingest_line(b, fixed_now())).collect();

    let living = results[0].as_ref().unwrap();
    assert_eq!(living.result.category(), Some(Category::Good));
    assert_eq!(living.result.risk_tier(), Some(RiskTier::Low));

    let garage = results[1].as_ref().unwrap();
    assert_eq!(garage.result.category(), Some(Category::VeryUnhealthy));
    assert_eq!(garage.result.risk_tier(), Some(RiskTier::High));

    let attic = results[2].as_ref().unwrap();
    assert!(attic.result.is_insufficient_data());

    assert_eq!(results[3].as_ref().unwrap_err(), &IngestError::MissingField("pm25"));
    assert_eq!(results[4].as_ref().unwrap_err(), &IngestError::MissingField("deviceId"));
    assert!(matches!(results[5], Err(IngestError::MalformedBody { .. })));
}

#[test]
fn test_record_json_matches_readings_row() {
    let record = ingest_line(
        r#"{ "deviceId": "office", "pm25": 55.4, "voc": 300, "co": 1.1 }"#,
        fixed_now(),
    )
    .unwrap();
    let json = serde_json::to_value(&record).unwrap();

    assert_eq!(
        json,
        serde_json::json!({
            "device_id": "office",
            "pm25": 55.4,
            "voc": 300.0,
            "co": 1.1,
            "aqi": 150,
            "aqi_category": "Unhealthy for Sensitive Groups",
            "risk_level": "Mid",
            "created_at": "2025-01-20T18:00:00Z",
        })
    );
}

#[test]
fn test_insufficient_record_has_null_aqi_fields() {
    let record = ingest_line(r#"{ "deviceId": "attic", "pm25": null, "voc": 40 }"#, fixed_now())
        .unwrap();
    let json = serde_json::to_value(&record).unwrap();
    assert!(json["aqi"].is_null());
    assert!(json["aqi_category"].is_null());
    assert!(json["risk_level"].is_null());
    assert!(json["pm25"].is_null());
}

// ---------------------------------------------------------------------------
// Config-driven checks on records
// ---------------------------------------------------------------------------

#[test]
fn test_configured_staleness_applies_to_records() {
    let config = AppConfig::from_toml_str("[staleness]\nmax_age_minutes = 30\n").unwrap();
    let record = ingest_line(r#"{ "deviceId": "d", "pm25": 1.0, "voc": 1 }"#, fixed_now()).unwrap();

    let max_age = config.staleness.max_age_minutes;
    assert!(!is_stale_at(record.created_at, max_age, fixed_now() + Duration::minutes(30)));
    assert!(is_stale_at(record.created_at, max_age, fixed_now() + Duration::minutes(31)));
}

#[test]
fn test_configured_trend_thresholds_classify_record_values() {
    let config = AppConfig::from_toml_str(
        "[trend_thresholds.\"PM2.5\"]\nmoderate = 10.0\nhigh = 20.0\n",
    )
    .unwrap();
    let table = config.threshold_table();
    let record = ingest_line(
        r#"{ "deviceId": "d", "pm25": 15.0, "voc": 1, "co": 2.5 }"#,
        fixed_now(),
    )
    .unwrap();

    assert_eq!(table.classify("PM2.5", record.pm25.unwrap()), Some(RiskTier::Mid));
    assert_eq!(table.classify("CO", record.co.unwrap()), Some(RiskTier::High));
    // The AQI for the same value is unaffected by trend cutoffs.
    assert_eq!(record.result.category(), Some(Category::Moderate));
}

#[test]
fn test_numeric_device_id_is_not_malformed() {
    let record = ingest_line(r#"{ "deviceId": 42, "pm25": 10.0, "voc": 1 }"#, fixed_now())
        .expect("numeric device id should be accepted");
    assert_eq!(record.device_id, "42");
    assert_eq!(record.result.index(), Some(42));
}

// ---------------------------------------------------------------------------
// Batch runner
// ---------------------------------------------------------------------------

#[test]
fn test_batch_runner_over_fixture_lines() {
    let input = batch().join("\n");
    let mut out = Vec::new();
    let summary = run_batch(input.as_bytes(), &mut out, &BatchOptions::default(), fixed_now())
        .expect("in-memory batch should not fail");

    assert_eq!(summary.total, 6);
    assert_eq!(summary.accepted, 3);
    assert_eq!(summary.insufficient, 1);
    assert_eq!(summary.stale, 0);
    assert!(summary.succeeded());

    let text = String::from_utf8(out).unwrap();
    let devices: Vec<String> = text
        .lines()
        .map(|l| serde_json::from_str::<serde_json::Value>(l).unwrap())
        .map(|v| v["device_id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(devices, ["living-room", "garage", "attic"]);
}

#[test]
fn test_batch_runner_fails_when_everything_is_rejected() {
    let input = batch()[3..].join("\n");
    let summary = run_batch(input.as_bytes(), Vec::new(), &BatchOptions::default(), fixed_now())
        .unwrap();
    assert_eq!(summary.accepted, 0);
    assert!(!summary.succeeded());
}
