//! Per-pollutant trend thresholds.
//!
//! The dashboard colors trend charts by comparing each raw value against a
//! "moderate" and a "high" cutoff. Those cutoffs map onto the same
//! `RiskTier` the AQI engine produces, so charts and cards speak one
//! vocabulary. Unlike the AQI, these are plain step thresholds on the raw
//! concentration, not a standardized index.

use crate::model::RiskTier;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Pollutants that have trend-chart cutoffs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Pollutant {
    Pm25,
    Pm10,
    O3,
    No2,
    So2,
    Co,
    Mold,
}

impl Pollutant {
    pub const ALL: [Pollutant; 7] = [
        Pollutant::Pm25,
        Pollutant::Pm10,
        Pollutant::O3,
        Pollutant::No2,
        Pollutant::So2,
        Pollutant::Co,
        Pollutant::Mold,
    ];

    /// Display name used on charts and as the config key.
    pub fn name(&self) -> &'static str {
        match self {
            Pollutant::Pm25 => "PM2.5",
            Pollutant::Pm10 => "PM10",
            Pollutant::O3 => "O₃",
            Pollutant::No2 => "NO₂",
            Pollutant::So2 => "SO₂",
            Pollutant::Co => "CO",
            Pollutant::Mold => "Mold",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Pollutant::Co => "mg/m³",
            Pollutant::Mold => "spores/m³",
            _ => "µg/m³",
        }
    }

    /// Resolves a name loosely: case-insensitive, ASCII digits accepted in
    /// place of subscripts, punctuation ignored ("pm25", "O3", "no2").
    pub fn from_name(name: &str) -> Option<Pollutant> {
        let key: String = name
            .chars()
            .filter_map(|c| match c {
                '₂' => Some('2'),
                '₃' => Some('3'),
                c if c.is_ascii_alphanumeric() => Some(c.to_ascii_lowercase()),
                _ => None,
            })
            .collect();
        match key.as_str() {
            "pm25" => Some(Pollutant::Pm25),
            "pm10" => Some(Pollutant::Pm10),
            "o3" => Some(Pollutant::O3),
            "no2" => Some(Pollutant::No2),
            "so2" => Some(Pollutant::So2),
            "co" => Some(Pollutant::Co),
            "mold" => Some(Pollutant::Mold),
            _ => None,
        }
    }
}

/// Moderate/high cutoffs for one pollutant, in that pollutant's unit.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct TrendThresholds {
    pub moderate: f64,
    pub high: f64,
}

impl TrendThresholds {
    pub fn is_ordered(&self) -> bool {
        self.moderate >= 0.0 && self.moderate <= self.high
    }
}

/// Built-in cutoffs used by the trend charts.
pub fn default_thresholds(pollutant: Pollutant) -> TrendThresholds {
    let (moderate, high) = match pollutant {
        Pollutant::Pm25 => (25.0, 50.0),
        Pollutant::Pm10 => (50.0, 100.0),
        Pollutant::O3 => (60.0, 120.0),
        Pollutant::No2 => (40.0, 80.0),
        Pollutant::So2 => (20.0, 50.0),
        Pollutant::Co => (1.0, 2.0),
        Pollutant::Mold => (5.0, 10.0),
    };
    TrendThresholds { moderate, high }
}

/// Compares a raw value against cutoffs.
///
/// `value >= high` is High, `value >= moderate` is Mid, anything lower is
/// Low. NaN has no tier.
pub fn classify_trend_value(thresholds: &TrendThresholds, value: f64) -> Option<RiskTier> {
    if value.is_nan() {
        None
    } else if value >= thresholds.high {
        Some(RiskTier::High)
    } else if value >= thresholds.moderate {
        Some(RiskTier::Mid)
    } else {
        Some(RiskTier::Low)
    }
}

/// Cutoffs for every pollutant, with optional per-pollutant overrides.
#[derive(Debug, Clone, Default)]
pub struct ThresholdTable {
    overrides: BTreeMap<Pollutant, TrendThresholds>,
}

impl ThresholdTable {
    pub fn with_override(mut self, pollutant: Pollutant, thresholds: TrendThresholds) -> Self {
        self.overrides.insert(pollutant, thresholds);
        self
    }

    pub fn get(&self, pollutant: Pollutant) -> TrendThresholds {
        self.overrides
            .get(&pollutant)
            .copied()
            .unwrap_or_else(|| default_thresholds(pollutant))
    }

    /// Looks up a pollutant by name and classifies `value`. Unknown names
    /// are left unclassified.
    pub fn classify(&self, pollutant_name: &str, value: f64) -> Option<RiskTier> {
        let pollutant = Pollutant::from_name(pollutant_name)?;
        classify_trend_value(&self.get(pollutant), value)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
