/// Reading staleness detection.
///
/// Sensors push readings every few seconds to minutes. The dashboard shows
/// a "last sync" indicator and flips to offline when the newest reading is
/// too old; a dead sensor otherwise keeps showing its last good AQI.
///
/// # Clock injection
/// All functions accept a `now: DateTime<Utc>` parameter rather than calling
/// `Utc::now()` internally. This makes staleness purely deterministic in
/// tests without mocking or time manipulation.

use crate::model::ReadingRecord;
use chrono::{DateTime, Utc};

// ---------------------------------------------------------------------------
// Staleness check
// ---------------------------------------------------------------------------

/// Whole minutes between `created_at` and `now`. Readings from the future
/// (clock skew) count as zero minutes old.
pub fn age_minutes(created_at: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    (now - created_at).num_minutes().max(0) as u64
}

/// Returns `true` if `created_at` is older than `max_age_minutes` relative
/// to `now`.
///
/// Staleness is strictly greater than the threshold:
///   age > max_age_minutes  →  stale
///   age == max_age_minutes →  not stale
pub fn is_stale_at(created_at: DateTime<Utc>, max_age_minutes: u64, now: DateTime<Utc>) -> bool {
    age_minutes(created_at, now) > max_age_minutes
}

/// Same check for an RFC 3339 timestamp string, as returned by the store.
///
/// Returns an error if the timestamp cannot be parsed. Callers should treat
/// parse failures as stale.
pub fn is_stale_str_at(
    created_at: &str,
    max_age_minutes: u64,
    now: DateTime<Utc>,
) -> Result<bool, String> {
    let parsed = DateTime::parse_from_rfc3339(created_at)
        .map_err(|e| format!("invalid timestamp {:?}: {}", created_at, e))?;
    Ok(is_stale_at(parsed.with_timezone(&Utc), max_age_minutes, now))
}

/// Whether a record is stale as of the real current time.
/// Use `is_stale_at` in tests to keep them deterministic.
pub fn is_stale(record: &ReadingRecord, max_age_minutes: u64) -> bool {
    is_stale_at(record.created_at, max_age_minutes, Utc::now())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
