//! Protected land probe
//!
//! Point-intersection against the USGS Protected Areas Database (PAD-US).
//! A clean empty result is an authoritative "not protected" at HIGH
//! confidence; only a provider failure degrades to the LOW-confidence
//! default.

use acrecheck_common::models::{Confidence, ProtectedLandResult};
use acrecheck_common::{GeoPoint, Result};
use async_trait::async_trait;

use super::arcgis::query_features;
use super::{build_client, ProviderError};
use crate::config::GisConfig;

/// A matched protected-area feature
#[derive(Debug, Clone)]
pub struct ProtectedHit {
    pub category: Option<String>,
    pub manager: Option<String>,
    pub unit_name: Option<String>,
}

/// One protected-areas data source.
///
/// `Ok(None)` is an authoritative "not protected".
#[async_trait]
pub trait ProtectedLandProvider: Send + Sync {
    fn source_id(&self) -> &'static str;

    async fn query(
        &self,
        point: &GeoPoint,
    ) -> std::result::Result<Option<ProtectedHit>, ProviderError>;
}

/// PAD-US ArcGIS feature service
pub struct PadUsProvider {
    client: reqwest::Client,
    url: String,
}

impl PadUsProvider {
    pub fn new(config: &GisConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(&config.user_agent, config.protected_land.timeout_seconds)?,
            url: config.protected_land.padus_url.clone(),
        })
    }
}

#[async_trait]
impl ProtectedLandProvider for PadUsProvider {
    fn source_id(&self) -> &'static str {
        "PAD-US"
    }

    async fn query(
        &self,
        point: &GeoPoint,
    ) -> std::result::Result<Option<ProtectedHit>, ProviderError> {
        let features = query_features(
            &self.client,
            &self.url,
            point,
            "Category,Mang_Name,Unit_Nm",
            &[],
        )
        .await?;

        Ok(features.first().map(|f| ProtectedHit {
            category: f.string_attr("Category"),
            manager: f.string_attr("Mang_Name"),
            unit_name: f.string_attr("Unit_Nm"),
        }))
    }
}

/// Protected land probe
pub struct ProtectedLandProbe {
    providers: Vec<Box<dyn ProtectedLandProvider>>,
}

impl ProtectedLandProbe {
    pub fn new(config: &GisConfig) -> Result<Self> {
        Ok(Self {
            providers: vec![Box::new(PadUsProvider::new(config)?)],
        })
    }

    pub fn with_providers(providers: Vec<Box<dyn ProtectedLandProvider>>) -> Self {
        Self { providers }
    }

    /// Probe protected status. Total: exhaustion defaults to not-protected
    /// at LOW confidence.
    pub async fn probe(&self, point: &GeoPoint) -> ProtectedLandResult {
        for provider in &self.providers {
            match provider.query(point).await {
                Ok(Some(hit)) => {
                    return ProtectedLandResult {
                        is_protected: true,
                        category: hit.category,
                        manager: hit.manager,
                        unit_name: hit.unit_name,
                        confidence: Confidence::High,
                        source: provider.source_id().to_string(),
                    };
                }
                Ok(None) => {
                    return ProtectedLandResult {
                        is_protected: false,
                        category: None,
                        manager: None,
                        unit_name: None,
                        confidence: Confidence::High,
                        source: provider.source_id().to_string(),
                    };
                }
                Err(e) => {
                    tracing::warn!(
                        source = provider.source_id(),
                        error = %e,
                        "Protected-land provider failed"
                    );
                }
            }
        }

        ProtectedLandResult {
            is_protected: false,
            category: None,
            manager: None,
            unit_name: None,
            confidence: Confidence::Low,
            source: "Unable to verify (API unavailable)".to_string(),
        }
    }
}
