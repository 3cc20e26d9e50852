//! Air quality service: PM2.5 AQI engine plus the ingest, alerting,
//! configuration and logging pieces around it.
//!
//! - `model` — shared value types and errors.
//! - `aqi` — concentration → index → category → risk tier.
//! - `ingest` — sensor submission validation and classification.
//! - `alert` — trend-chart thresholds and staleness checks.
//! - `config` — TOML configuration.
//! - `logging` — console/file logger.

pub mod alert;
pub mod aqi;
pub mod config;
pub mod ingest;
pub mod logging;
pub mod model;
