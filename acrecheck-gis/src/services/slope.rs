//! Terrain slope probe
//!
//! Samples elevation at the property point plus two offset points (~10m
//! north and ~10m east) and derives a slope percentage from the elevation
//! spread. The same three-point geometry is used against both elevation
//! providers so their answers are comparable. Thresholds: >15% HIGH,
//! >8% MEDIUM, else LOW.

use acrecheck_common::models::{Confidence, Severity, SlopeResult};
use acrecheck_common::{GeoPoint, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{build_client, AnalysisHints, ProviderError};
use crate::config::GisConfig;

/// Meters per degree of latitude, used to convert the sample offset
const METERS_PER_DEGREE: f64 = 111_000.0;

/// USGS EPQS sentinel for "no data at this point"
const EPQS_NO_DATA: f64 = -1_000_000.0;

/// One elevation data source.
///
/// Returns the usable elevations for the requested points, in meters.
/// Points the provider has no data for are simply omitted; the probe needs
/// at least two to compute a slope.
#[async_trait]
pub trait ElevationProvider: Send + Sync {
    fn source_id(&self) -> &'static str;

    async fn elevations(
        &self,
        points: &[GeoPoint],
    ) -> std::result::Result<Vec<f64>, ProviderError>;
}

#[derive(Debug, Deserialize)]
struct EpqsResponse {
    value: Option<serde_json::Value>,
}

/// USGS Elevation Point Query Service (one request per point)
pub struct UsgsElevation {
    client: reqwest::Client,
    url: String,
}

impl UsgsElevation {
    pub fn new(config: &GisConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(&config.user_agent, config.slope.timeout_seconds)?,
            url: config.slope.usgs_epqs_url.clone(),
        })
    }
}

#[async_trait]
impl ElevationProvider for UsgsElevation {
    fn source_id(&self) -> &'static str {
        "USGS Elevation API"
    }

    async fn elevations(
        &self,
        points: &[GeoPoint],
    ) -> std::result::Result<Vec<f64>, ProviderError> {
        let mut elevations = Vec::with_capacity(points.len());

        for point in points {
            let x = point.longitude.to_string();
            let y = point.latitude.to_string();
            let params = [
                ("x", x.as_str()),
                ("y", y.as_str()),
                ("units", "Meters"),
                ("output", "json"),
            ];

            let response = self.client.get(&self.url).query(&params).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(ProviderError::Status(status.as_u16()));
            }

            let body: EpqsResponse = response
                .json()
                .await
                .map_err(|e| ProviderError::Parse(e.to_string()))?;

            // The service reports elevation as a number or numeric string,
            // with a large negative sentinel for "no data"
            let elevation = body
                .value
                .as_ref()
                .and_then(|v| v.as_f64().or_else(|| v.as_str().and_then(|s| s.parse().ok())));
            if let Some(elevation) = elevation {
                if elevation != EPQS_NO_DATA {
                    elevations.push(elevation);
                }
            }
        }

        Ok(elevations)
    }
}

#[derive(Debug, Serialize)]
struct OpenElevationRequest {
    locations: Vec<OpenElevationLocation>,
}

#[derive(Debug, Serialize)]
struct OpenElevationLocation {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct OpenElevationResponse {
    #[serde(default)]
    results: Vec<OpenElevationResult>,
}

#[derive(Debug, Deserialize)]
struct OpenElevationResult {
    elevation: f64,
}

/// Open-Elevation batch lookup (independent open-source alternative)
pub struct OpenElevation {
    client: reqwest::Client,
    url: String,
}

impl OpenElevation {
    pub fn new(config: &GisConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(&config.user_agent, config.slope.timeout_seconds)?,
            url: config.slope.open_elevation_url.clone(),
        })
    }
}

#[async_trait]
impl ElevationProvider for OpenElevation {
    fn source_id(&self) -> &'static str {
        "Open-Elevation API"
    }

    async fn elevations(
        &self,
        points: &[GeoPoint],
    ) -> std::result::Result<Vec<f64>, ProviderError> {
        let request = OpenElevationRequest {
            locations: points
                .iter()
                .map(|p| OpenElevationLocation {
                    latitude: p.latitude,
                    longitude: p.longitude,
                })
                .collect(),
        };

        let response = self.client.post(&self.url).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }

        let body: OpenElevationResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        Ok(body.results.into_iter().map(|r| r.elevation).collect())
    }
}

/// Classify slope severity from a 0-100 percentage
pub fn classify_slope(percentage: f64) -> Severity {
    if percentage > 15.0 {
        Severity::High
    } else if percentage > 8.0 {
        Severity::Medium
    } else {
        Severity::Low
    }
}

/// Slope percentage from sampled elevations and the sample offset in degrees
pub fn slope_percentage(elevations: &[f64], offset_degrees: f64) -> Option<f64> {
    if elevations.len() < 2 {
        return None;
    }
    let max = elevations.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let min = elevations.iter().cloned().fold(f64::INFINITY, f64::min);
    let horizontal_distance = offset_degrees * METERS_PER_DEGREE;
    Some((max - min).abs() / horizontal_distance * 100.0)
}

/// Terrain slope probe with provider fallback and regional default
pub struct SlopeProbe {
    providers: Vec<Box<dyn ElevationProvider>>,
    offset_degrees: f64,
}

impl SlopeProbe {
    pub fn new(config: &GisConfig) -> Result<Self> {
        Ok(Self {
            providers: vec![
                Box::new(UsgsElevation::new(config)?),
                Box::new(OpenElevation::new(config)?),
            ],
            offset_degrees: config.slope.sample_offset_degrees,
        })
    }

    pub fn with_providers(providers: Vec<Box<dyn ElevationProvider>>, offset_degrees: f64) -> Self {
        Self {
            providers,
            offset_degrees,
        }
    }

    /// Three-point sampling geometry: the point itself, ~10m north, ~10m east
    fn sample_points(&self, point: &GeoPoint) -> Vec<GeoPoint> {
        vec![
            *point,
            GeoPoint {
                latitude: point.latitude + self.offset_degrees,
                longitude: point.longitude,
            },
            GeoPoint {
                latitude: point.latitude,
                longitude: point.longitude + self.offset_degrees,
            },
        ]
    }

    /// Probe terrain slope. Total: provider failures or insufficient samples
    /// advance the chain, then fall back to the regional default.
    pub async fn probe(&self, point: &GeoPoint, hints: &AnalysisHints) -> SlopeResult {
        let samples = self.sample_points(point);

        for provider in &self.providers {
            match provider.elevations(&samples).await {
                Ok(elevations) => {
                    if let Some(percentage) = slope_percentage(&elevations, self.offset_degrees) {
                        let percentage = (percentage * 100.0).round() / 100.0;
                        return SlopeResult {
                            percentage,
                            severity: classify_slope(percentage),
                            confidence: Confidence::High,
                            source: provider.source_id().to_string(),
                            note: None,
                        };
                    }
                    tracing::debug!(
                        source = provider.source_id(),
                        usable = elevations.len(),
                        "Too few usable elevations, trying next provider"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        source = provider.source_id(),
                        error = %e,
                        "Elevation provider failed, trying next"
                    );
                }
            }
        }

        self.regional_default(hints)
    }

    fn regional_default(&self, hints: &AnalysisHints) -> SlopeResult {
        if hints.state_is("FL") {
            return SlopeResult {
                percentage: 0.5,
                severity: Severity::Low,
                confidence: Confidence::Medium,
                source: "Geographic estimate (Florida is generally flat)".to_string(),
                note: Some("Florida terrain is typically 0-2% slope".to_string()),
            };
        }

        SlopeResult {
            percentage: 0.0,
            severity: Severity::Unknown,
            confidence: Confidence::Low,
            source: "Unable to calculate (API unavailable)".to_string(),
            note: None,
        }
    }
}
