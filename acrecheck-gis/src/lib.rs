//! acrecheck-gis: multi-source GIS risk engine
//!
//! Resolves property addresses to coordinates, probes five independent
//! public geographic datasets (wetlands, flood zone, slope, road access,
//! protected land) with per-probe fallback chains, and combines the results
//! into one overall risk verdict. A vision-analysis collaborator can later
//! contradict the GIS road-access finding; the override policy here decides
//! whether to accept that and triggers re-aggregation.
//!
//! All provider clients are constructed once from [`config::GisConfig`] and
//! injected; there is no ambient global state. Probes are total functions:
//! provider failures advance the fallback chain and are never surfaced to
//! the aggregator.

pub mod config;
pub mod services;

pub use config::GisConfig;
pub use services::analyzer::GisRiskService;
pub use services::geocoder::GeocodingService;
