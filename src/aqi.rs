//! Air Quality Index computation.
//!
//! Converts a PM2.5 concentration into a US EPA-style AQI value by
//! piecewise-linear interpolation over a breakpoint table, then collapses
//! the index into a `Category` and a `RiskTier`.
//!
//! Everything here is a pure function of its input: no I/O, no logging,
//! no shared state. Invalid input never panics or errors, it yields an
//! absent result.

use crate::model::{Assessment, Breakpoint, Category, IndexResult, RiskTier, SensorValues};

/// Fixed ceiling for extrapolated values above the last breakpoint.
pub const AQI_CEILING: i32 = 500;

/// EPA breakpoints for PM2.5 (µg/m³, 24-hour average).
pub static PM25_BREAKPOINTS: &[Breakpoint] = &[
    Breakpoint::new(0.0, 12.0, 0, 50),
    Breakpoint::new(12.1, 35.4, 51, 100),
    Breakpoint::new(35.5, 55.4, 101, 150),
    Breakpoint::new(55.5, 150.4, 151, 200),
    Breakpoint::new(150.5, 250.4, 201, 300),
    Breakpoint::new(250.5, 350.4, 301, 400),
    Breakpoint::new(350.5, 500.4, 401, 500),
];

// ---------------------------------------------------------------------------
// Concentration -> index
// ---------------------------------------------------------------------------

/// Maps a concentration onto `table`, returning `None` for NaN, negative
/// values, or an empty table.
///
/// Inside a segment the interpolated value is clamped to that segment's
/// index range and rounded. A value sitting in the gap between two segments
/// (e.g. 12.05 for PM2.5) takes the upper index of the segment below.
/// Above the last segment the last slope is extrapolated and the result
/// clamped to `[last.index_high, AQI_CEILING]`.
pub fn index_for(table: &[Breakpoint], value: f64) -> Option<i32> {
    if value.is_nan() || value < 0.0 {
        return None;
    }
    let last = table.last()?;

    let mut below: Option<&Breakpoint> = None;
    for bp in table {
        if bp.contains(value) {
            let raw = bp.slope() * (value - bp.conc_low) + f64::from(bp.index_low);
            return Some(round_clamped(raw, bp.index_low, bp.index_high));
        }
        if value < bp.conc_low {
            // Gap between `below` and `bp`, or under the first segment.
            return Some(below.map_or(bp.index_low, |b| b.index_high));
        }
        below = Some(bp);
    }

    let raw = last.slope() * (value - last.conc_low) + f64::from(last.index_low);
    Some(round_clamped(raw, last.index_high.min(AQI_CEILING), AQI_CEILING))
}

fn round_clamped(raw: f64, min: i32, max: i32) -> i32 {
    raw.min(f64::from(max)).max(f64::from(min)).round() as i32
}

/// AQI for a PM2.5 concentration in µg/m³.
pub fn pm25_to_aqi(pm25: f64) -> Option<i32> {
    index_for(PM25_BREAKPOINTS, pm25)
}

// ---------------------------------------------------------------------------
// Index -> category -> risk tier
// ---------------------------------------------------------------------------

/// Category for any integer index, including values outside `[0, 500]`.
pub fn category_from_index(index: i32) -> Category {
    match index {
        i if i <= 50 => Category::Good,
        i if i <= 100 => Category::Moderate,
        i if i <= 150 => Category::UnhealthyForSensitiveGroups,
        i if i <= 200 => Category::Unhealthy,
        i if i <= 300 => Category::VeryUnhealthy,
        _ => Category::Hazardous,
    }
}

pub fn risk_from_category(category: Category) -> RiskTier {
    match category {
        Category::Good => RiskTier::Low,
        Category::Moderate | Category::UnhealthyForSensitiveGroups => RiskTier::Mid,
        Category::Unhealthy | Category::VeryUnhealthy | Category::Hazardous => RiskTier::High,
    }
}

/// Absent index yields absent category.
pub fn classify(index: Option<i32>) -> Option<Category> {
    index.map(category_from_index)
}

/// Absent category yields absent tier.
pub fn risk_for(category: Option<Category>) -> Option<RiskTier> {
    category.map(risk_from_category)
}

// ---------------------------------------------------------------------------
// Composite entry point
// ---------------------------------------------------------------------------

/// Classifies a reading by its PM2.5 value.
///
/// `co` and `voc` are accepted but not classified. When `pm25` is absent
/// or invalid every field of the result is absent.
pub fn compute_aqi(values: &SensorValues) -> IndexResult {
    values
        .pm25
        .and_then(pm25_to_aqi)
        .map(|index| {
            let category = category_from_index(index);
            Assessment { index, category, risk: risk_from_category(category) }
        })
        .into()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
