//! Dashboard-facing checks layered on top of raw readings.
//!
//! Submodules:
//! - `thresholds` — per-pollutant trend-chart cutoffs mapped onto `RiskTier`.
//! - `stalenesses` — "last sync" freshness checks.

pub mod stalenesses;
pub mod thresholds;
