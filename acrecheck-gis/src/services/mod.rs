//! GIS engine services
//!
//! One module per dataset probe, plus the resolver, the pure aggregator,
//! the vision override policy, and the per-property orchestrator. Provider
//! fallback chains are ordered `Vec<Box<dyn Provider>>` so the order is data
//! that tests can exercise with injected fakes.

use std::time::Duration;

use acrecheck_common::{Error, Result};
use thiserror::Error;

pub mod analyzer;
pub mod arcgis;
pub mod flood_zone;
pub mod geocoder;
pub mod protected_land;
pub mod risk_aggregator;
pub mod road_access;
pub mod road_override;
pub mod slope;
pub mod wetlands;

/// Provider-level failure, always recovered by advancing the fallback chain.
///
/// These never cross a probe boundary; the aggregator only ever sees
/// well-formed results.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}")]
    Status(u16),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        ProviderError::Network(e.to_string())
    }
}

/// Address context threaded through the probes for regional heuristics
#[derive(Debug, Clone, Default)]
pub struct AnalysisHints {
    pub city: Option<String>,
    pub state: Option<String>,
}

impl AnalysisHints {
    pub fn state_is(&self, code: &str) -> bool {
        self.state
            .as_deref()
            .map(|s| s.eq_ignore_ascii_case(code))
            .unwrap_or(false)
    }
}

/// Build an HTTP client with the engine user agent and a per-provider timeout
pub(crate) fn build_client(user_agent: &str, timeout_seconds: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(timeout_seconds))
        .build()
        .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))
}
