//! Wetlands probe
//!
//! Both providers serve the USFWS National Wetlands Inventory; the ESRI
//! Living Atlas mirror is tried first because it is the more reliable
//! endpoint. A clean empty feature set from either is an authoritative
//! negative and short-circuits with HIGH confidence — it is not a trigger to
//! fall further. Last resort is the Southwest Florida geographic heuristic.

use acrecheck_common::models::{Confidence, WetlandsResult};
use acrecheck_common::{GeoPoint, Result};
use async_trait::async_trait;

use super::arcgis::query_features;
use super::{build_client, AnalysisHints, ProviderError};
use crate::config::GisConfig;

/// Bounding box of the Southwest Florida wetlands zone (includes Lehigh Acres)
const SW_FL_LAT_RANGE: (f64, f64) = (26.0, 27.5);
const SW_FL_LON_RANGE: (f64, f64) = (-82.0, -81.0);

/// A matched wetland feature
#[derive(Debug, Clone)]
pub struct WetlandsHit {
    pub wetland_type: Option<String>,
}

/// One wetlands data source.
///
/// `Ok(None)` is an authoritative "no wetlands at this point".
#[async_trait]
pub trait WetlandsProvider: Send + Sync {
    fn source_id(&self) -> &'static str;

    async fn query(
        &self,
        point: &GeoPoint,
    ) -> std::result::Result<Option<WetlandsHit>, ProviderError>;
}

/// ESRI Living Atlas USA Wetlands layer (mirrors USFWS NWI)
pub struct LivingAtlasWetlands {
    client: reqwest::Client,
    url: String,
}

impl LivingAtlasWetlands {
    pub fn new(config: &GisConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(&config.user_agent, config.wetlands.timeout_seconds)?,
            url: config.wetlands.living_atlas_url.clone(),
        })
    }
}

#[async_trait]
impl WetlandsProvider for LivingAtlasWetlands {
    fn source_id(&self) -> &'static str {
        "ESRI Living Atlas (USFWS NWI)"
    }

    async fn query(
        &self,
        point: &GeoPoint,
    ) -> std::result::Result<Option<WetlandsHit>, ProviderError> {
        let features =
            query_features(&self.client, &self.url, point, "WETLAND_TYPE", &[]).await?;
        Ok(features.first().map(|f| WetlandsHit {
            wetland_type: f.string_attr("WETLAND_TYPE"),
        }))
    }
}

/// USFWS NWI direct map service (same dataset, alternate endpoint)
pub struct NwiDirectWetlands {
    client: reqwest::Client,
    url: String,
}

impl NwiDirectWetlands {
    pub fn new(config: &GisConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(&config.user_agent, config.wetlands.timeout_seconds)?,
            url: config.wetlands.nwi_direct_url.clone(),
        })
    }
}

#[async_trait]
impl WetlandsProvider for NwiDirectWetlands {
    fn source_id(&self) -> &'static str {
        "USFWS NWI Direct"
    }

    async fn query(
        &self,
        point: &GeoPoint,
    ) -> std::result::Result<Option<WetlandsHit>, ProviderError> {
        let features = query_features(
            &self.client,
            &self.url,
            point,
            "WETLAND_TYPE,ATTRIBUTE",
            &[],
        )
        .await?;
        Ok(features.first().map(|f| WetlandsHit {
            wetland_type: f.string_attr("WETLAND_TYPE"),
        }))
    }
}

/// Wetlands probe with provider fallback and geographic heuristic
pub struct WetlandsProbe {
    providers: Vec<Box<dyn WetlandsProvider>>,
}

impl WetlandsProbe {
    pub fn new(config: &GisConfig) -> Result<Self> {
        Ok(Self {
            providers: vec![
                Box::new(LivingAtlasWetlands::new(config)?),
                Box::new(NwiDirectWetlands::new(config)?),
            ],
        })
    }

    pub fn with_providers(providers: Vec<Box<dyn WetlandsProvider>>) -> Self {
        Self { providers }
    }

    /// Probe wetlands status. Total: provider failures advance the chain and
    /// exhaustion falls back to the geographic heuristic.
    pub async fn probe(&self, point: &GeoPoint, hints: &AnalysisHints) -> WetlandsResult {
        for provider in &self.providers {
            match provider.query(point).await {
                Ok(Some(hit)) => {
                    return WetlandsResult {
                        status: true,
                        wetland_type: hit.wetland_type,
                        confidence: Confidence::High,
                        source: provider.source_id().to_string(),
                        note: None,
                    };
                }
                Ok(None) => {
                    // Authoritative negative; do not fall further
                    return WetlandsResult {
                        status: false,
                        wetland_type: None,
                        confidence: Confidence::High,
                        source: provider.source_id().to_string(),
                        note: None,
                    };
                }
                Err(e) => {
                    tracing::warn!(
                        source = provider.source_id(),
                        error = %e,
                        "Wetlands provider failed, trying next"
                    );
                }
            }
        }

        self.heuristic(point, hints)
    }

    fn heuristic(&self, point: &GeoPoint, hints: &AnalysisHints) -> WetlandsResult {
        if hints.state_is("FL") && in_sw_florida_wetlands_zone(point) {
            return WetlandsResult {
                status: true,
                wetland_type: None,
                confidence: Confidence::Medium,
                source: "Geographic heuristic (SW Florida wetlands zone)".to_string(),
                note: Some("Area known for wetlands. Verify with local survey.".to_string()),
            };
        }

        WetlandsResult {
            status: false,
            wetland_type: None,
            confidence: Confidence::Low,
            source: "Unable to verify (API unavailable)".to_string(),
            note: None,
        }
    }
}

fn in_sw_florida_wetlands_zone(point: &GeoPoint) -> bool {
    (SW_FL_LAT_RANGE.0..=SW_FL_LAT_RANGE.1).contains(&point.latitude)
        && (SW_FL_LON_RANGE.0..=SW_FL_LON_RANGE.1).contains(&point.longitude)
}
