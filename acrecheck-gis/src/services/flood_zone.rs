//! FEMA flood zone probe
//!
//! Fallback chain: ESRI Living Atlas mirror of the FEMA flood-hazard data,
//! the FEMA Map Service Center identify endpoint, then the FEMA NFHL layer
//! queried with a small buffer to catch precision misses. Unlike wetlands,
//! an empty feature set here is ambiguous (the layer may simply have no
//! coverage) and advances the chain rather than short-circuiting. Last
//! resort is a Florida regional estimate.
//!
//! Zone-to-severity classification is a pure function of the zone code, with
//! the provider's SFHA flag forcing HIGH unconditionally when set.

use acrecheck_common::models::{Confidence, FloodZoneResult, Severity};
use acrecheck_common::{GeoPoint, Result};
use async_trait::async_trait;

use super::arcgis::{query_features, IdentifyResponse};
use super::{build_client, AnalysisHints, ProviderError};
use crate::config::GisConfig;

/// Florida counties with known high coastal flood exposure
const FL_HIGH_FLOOD_COUNTIES: &[&str] = &[
    "miami-dade",
    "broward",
    "monroe",
    "collier",
    "lee",
    "charlotte",
    "manatee",
    "pinellas",
    "hillsborough",
];

/// A flood-zone feature as reported by a provider
#[derive(Debug, Clone)]
pub struct FloodReading {
    pub zone: String,
    pub zone_subtype: Option<String>,
    /// SFHA flag when the layer carries one ("T"/"F" upstream)
    pub in_sfha: Option<bool>,
}

/// One flood-hazard data source.
///
/// `Ok(None)` means "no feature at this point", which is ambiguous for flood
/// layers and advances the fallback chain.
#[async_trait]
pub trait FloodProvider: Send + Sync {
    fn source_id(&self) -> &'static str;

    async fn query(
        &self,
        point: &GeoPoint,
    ) -> std::result::Result<Option<FloodReading>, ProviderError>;
}

/// ESRI Living Atlas mirror of FEMA flood hazard data
pub struct LivingAtlasFlood {
    client: reqwest::Client,
    url: String,
}

impl LivingAtlasFlood {
    pub fn new(config: &GisConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(&config.user_agent, config.flood.living_atlas_timeout_seconds)?,
            url: config.flood.living_atlas_url.clone(),
        })
    }
}

#[async_trait]
impl FloodProvider for LivingAtlasFlood {
    fn source_id(&self) -> &'static str {
        "ESRI Living Atlas (FEMA Data)"
    }

    async fn query(
        &self,
        point: &GeoPoint,
    ) -> std::result::Result<Option<FloodReading>, ProviderError> {
        let features = query_features(
            &self.client,
            &self.url,
            point,
            "FLD_ZONE,ZONE_SUBTY,SFHA_TF",
            &[],
        )
        .await?;

        Ok(features.first().map(|f| FloodReading {
            zone: f.string_attr("FLD_ZONE").unwrap_or_else(|| "X".to_string()),
            zone_subtype: f.string_attr("ZONE_SUBTY"),
            in_sfha: f.string_attr("SFHA_TF").map(|s| s == "T"),
        }))
    }
}

/// FEMA Map Service Center identify endpoint
pub struct FemaMscIdentify {
    client: reqwest::Client,
    url: String,
}

impl FemaMscIdentify {
    pub fn new(config: &GisConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(&config.user_agent, config.flood.msc_timeout_seconds)?,
            url: config.flood.msc_identify_url.clone(),
        })
    }
}

#[async_trait]
impl FloodProvider for FemaMscIdentify {
    fn source_id(&self) -> &'static str {
        "FEMA MSC"
    }

    async fn query(
        &self,
        point: &GeoPoint,
    ) -> std::result::Result<Option<FloodReading>, ProviderError> {
        let geometry = format!("{},{}", point.longitude, point.latitude);
        let map_extent = format!(
            "{},{},{},{}",
            point.longitude - 0.01,
            point.latitude - 0.01,
            point.longitude + 0.01,
            point.latitude + 0.01
        );
        let params = [
            ("geometry", geometry.as_str()),
            ("geometryType", "esriGeometryPoint"),
            ("sr", "4326"),
            ("layers", "all"),
            ("tolerance", "1"),
            ("mapExtent", map_extent.as_str()),
            ("imageDisplay", "400,400,96"),
            ("returnGeometry", "false"),
            ("f", "json"),
        ];

        let response = self.client.get(&self.url).query(&params).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }

        let body: IdentifyResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        // The identify call returns features from every layer; only the ones
        // carrying a flood zone attribute are usable.
        Ok(body
            .results
            .iter()
            .find_map(|r| r.string_attr("FLD_ZONE"))
            .map(|zone| FloodReading {
                zone,
                zone_subtype: None,
                in_sfha: None,
            }))
    }
}

/// FEMA NFHL layer query with a small search buffer
pub struct FemaNfhlBuffered {
    client: reqwest::Client,
    url: String,
    buffer_meters: f64,
}

impl FemaNfhlBuffered {
    pub fn new(config: &GisConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(&config.user_agent, config.flood.nfhl_timeout_seconds)?,
            url: config.flood.nfhl_query_url.clone(),
            buffer_meters: config.flood.nfhl_buffer_meters,
        })
    }
}

#[async_trait]
impl FloodProvider for FemaNfhlBuffered {
    fn source_id(&self) -> &'static str {
        "FEMA NFHL"
    }

    async fn query(
        &self,
        point: &GeoPoint,
    ) -> std::result::Result<Option<FloodReading>, ProviderError> {
        let extra = [
            ("outSR", "4326".to_string()),
            ("distance", self.buffer_meters.to_string()),
            ("units", "esriSRUnit_Meter".to_string()),
        ];
        let features = query_features(&self.client, &self.url, point, "*", &extra).await?;

        Ok(features.first().map(|f| FloodReading {
            zone: f.string_attr("FLD_ZONE").unwrap_or_else(|| "X".to_string()),
            zone_subtype: f.string_attr("ZONE_SUBTY"),
            in_sfha: f.string_attr("SFHA_TF").map(|s| s == "T"),
        }))
    }
}

/// Classify a flood zone code into severity.
///
/// HIGH: 100-year floodplain and coastal high-hazard zones (AE, AH, AO, A99,
/// AR, VE, or any zone prefixed "A "/"V"), or an explicit SFHA flag.
/// MEDIUM: 500-year floodplain markers (B, X500, shaded X, 0.2 pct annual
/// chance). Everything else, including plain X and C, is LOW.
pub fn classify_flood_zone(zone: &str, in_sfha: Option<bool>) -> Severity {
    let zone = zone.to_uppercase();

    // The SFHA flag, when set, is authoritative regardless of the zone string
    if in_sfha == Some(true) {
        return Severity::High;
    }

    const HIGH_RISK: &[&str] = &["AE", "AH", "AO", "A99", "AR", "VE"];
    const HIGH_RISK_PREFIXES: &[&str] = &["A ", "V"];
    const MODERATE_RISK: &[&str] = &["B", "X500", "X-SHADED", "SHADED", "0.2 PCT ANNUAL CHANCE"];

    if HIGH_RISK.contains(&zone.as_str()) {
        return Severity::High;
    }
    if HIGH_RISK_PREFIXES.iter().any(|p| zone.starts_with(p)) {
        return Severity::High;
    }

    if MODERATE_RISK.contains(&zone.as_str()) {
        return Severity::Medium;
    }
    if zone.contains("SHADED") || zone.contains("X500") || zone.contains("0.2") {
        return Severity::Medium;
    }

    Severity::Low
}

/// Flood zone probe with provider fallback and regional estimate
pub struct FloodZoneProbe {
    providers: Vec<Box<dyn FloodProvider>>,
}

impl FloodZoneProbe {
    pub fn new(config: &GisConfig) -> Result<Self> {
        Ok(Self {
            providers: vec![
                Box::new(LivingAtlasFlood::new(config)?),
                Box::new(FemaMscIdentify::new(config)?),
                Box::new(FemaNfhlBuffered::new(config)?),
            ],
        })
    }

    pub fn with_providers(providers: Vec<Box<dyn FloodProvider>>) -> Self {
        Self { providers }
    }

    /// Probe the flood zone. Total: never propagates provider failures.
    pub async fn probe(&self, point: &GeoPoint, hints: &AnalysisHints) -> FloodZoneResult {
        for provider in &self.providers {
            match provider.query(point).await {
                Ok(Some(reading)) => {
                    let severity = classify_flood_zone(&reading.zone, reading.in_sfha);
                    let full_zone = match &reading.zone_subtype {
                        Some(subtype) => format!("{} ({})", reading.zone, subtype),
                        None => reading.zone.clone(),
                    };

                    tracing::info!(
                        source = provider.source_id(),
                        zone = %full_zone,
                        severity = severity.as_str(),
                        "Flood zone resolved"
                    );

                    return FloodZoneResult {
                        zone: full_zone,
                        severity,
                        in_sfha: reading.in_sfha,
                        confidence: Confidence::High,
                        source: provider.source_id().to_string(),
                        note: None,
                    };
                }
                Ok(None) => {
                    // No coverage at this point; ambiguous, keep falling
                    tracing::debug!(
                        source = provider.source_id(),
                        "No flood features at point, trying next provider"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        source = provider.source_id(),
                        error = %e,
                        "Flood provider failed, trying next"
                    );
                }
            }
        }

        self.regional_estimate(hints)
    }

    fn regional_estimate(&self, hints: &AnalysisHints) -> FloodZoneResult {
        if hints.state_is("FL") {
            let city_lower = hints
                .city
                .as_deref()
                .map(str::to_lowercase)
                .unwrap_or_default();

            if FL_HIGH_FLOOD_COUNTIES
                .iter()
                .any(|county| city_lower.contains(county))
            {
                return FloodZoneResult {
                    zone: "A (estimated)".to_string(),
                    severity: Severity::High,
                    in_sfha: None,
                    confidence: Confidence::Low,
                    source: "Geographic estimate (coastal area)".to_string(),
                    note: Some(
                        "FEMA data unavailable - verify with official flood map".to_string(),
                    ),
                };
            }

            // Most inland SW Florida is genuinely Zone X
            return FloodZoneResult {
                zone: "X".to_string(),
                severity: Severity::Low,
                in_sfha: None,
                confidence: Confidence::Low,
                source: "Geographic estimate (inland FL)".to_string(),
                note: Some(
                    "FEMA data unavailable - individual properties may vary".to_string(),
                ),
            };
        }

        FloodZoneResult {
            zone: "X".to_string(),
            severity: Severity::Low,
            in_sfha: None,
            confidence: Confidence::Low,
            source: "Data unavailable".to_string(),
            note: Some(
                "Unable to verify flood zone - recommend official FEMA map check".to_string(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_high_risk_zones() {
        for zone in ["AE", "AH", "AO", "A99", "AR", "VE", "V1", "VE "] {
            assert_eq!(
                classify_flood_zone(zone, None),
                Severity::High,
                "zone {zone} should be HIGH"
            );
        }
        // Prefix match: "A " with a suffix
        assert_eq!(classify_flood_zone("A 1-30", None), Severity::High);
    }

    #[test]
    fn test_bare_zone_a_is_low_without_sfha_flag() {
        // "A" alone is neither in the exact high-risk set nor an "A "-prefixed
        // designation; only the SFHA flag elevates it
        assert_eq!(classify_flood_zone("A", None), Severity::Low);
        assert_eq!(classify_flood_zone("A", Some(false)), Severity::Low);
        assert_eq!(classify_flood_zone("A", Some(true)), Severity::High);
    }

    #[test]
    fn test_medium_risk_zones() {
        for zone in ["B", "X500", "X-SHADED", "SHADED", "0.2 PCT ANNUAL CHANCE"] {
            assert_eq!(
                classify_flood_zone(zone, None),
                Severity::Medium,
                "zone {zone} should be MEDIUM"
            );
        }
        assert_eq!(classify_flood_zone("X (SHADED)", None), Severity::Medium);
    }

    #[test]
    fn test_low_risk_zones() {
        for zone in ["X", "C", "D", ""] {
            assert_eq!(
                classify_flood_zone(zone, None),
                Severity::Low,
                "zone {zone} should be LOW"
            );
        }
    }

    #[test]
    fn test_sfha_flag_forces_high() {
        // SFHA overrides a zone string that would otherwise classify lower
        assert_eq!(classify_flood_zone("X", Some(true)), Severity::High);
        assert_eq!(classify_flood_zone("X", Some(false)), Severity::Low);
    }

    #[test]
    fn test_classification_is_case_insensitive() {
        assert_eq!(classify_flood_zone("ae", None), Severity::High);
        assert_eq!(classify_flood_zone("x-shaded", None), Severity::Medium);
    }

    #[tokio::test]
    async fn test_regional_estimate_coastal_vs_inland() {
        let probe = FloodZoneProbe::with_providers(vec![]);
        let point = GeoPoint::new(26.6254, -81.6437).unwrap();

        // City name containing a high-flood county
        let coastal = AnalysisHints {
            city: Some("Miami-Dade".to_string()),
            state: Some("FL".to_string()),
        };
        let result = probe.probe(&point, &coastal).await;
        assert_eq!(result.severity, Severity::High);
        assert_eq!(result.confidence, Confidence::Low);
        assert_eq!(result.zone, "A (estimated)");

        // Inland Florida defaults to Zone X
        let inland = AnalysisHints {
            city: Some("Lehigh Acres".to_string()),
            state: Some("FL".to_string()),
        };
        let result = probe.probe(&point, &inland).await;
        assert_eq!(result.severity, Severity::Low);
        assert_eq!(result.zone, "X");

        // Out of region
        let elsewhere = AnalysisHints {
            city: Some("Denver".to_string()),
            state: Some("CO".to_string()),
        };
        let result = probe.probe(&point, &elsewhere).await;
        assert_eq!(result.severity, Severity::Low);
        assert_eq!(result.confidence, Confidence::Low);
        assert_eq!(result.source, "Data unavailable");
    }
}
