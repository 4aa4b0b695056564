//! Per-property analysis orchestration
//!
//! Owns the five dataset probes, constructed once at startup from
//! [`GisConfig`] and reused for every property. The probes are independent
//! of each other; correctness does not depend on running them in parallel,
//! and running them sequentially keeps the load on the free public APIs
//! predictable. Cross-property fan-out belongs to the caller's worker pool.

use std::time::Instant;

use acrecheck_common::models::{
    OverallRiskAssessment, PropertyAnalysis, RiskInputs, RoadConditionJudgment,
};
use acrecheck_common::{GeoPoint, Result};
use chrono::Utc;

use super::flood_zone::FloodZoneProbe;
use super::protected_land::ProtectedLandProbe;
use super::risk_aggregator::aggregate;
use super::road_access::RoadAccessProbe;
use super::road_override;
use super::slope::SlopeProbe;
use super::wetlands::WetlandsProbe;
use super::AnalysisHints;
use crate::config::GisConfig;

/// GIS risk analysis service
pub struct GisRiskService {
    wetlands: WetlandsProbe,
    flood_zone: FloodZoneProbe,
    slope: SlopeProbe,
    road_access: RoadAccessProbe,
    protected_land: ProtectedLandProbe,
}

impl GisRiskService {
    pub fn new(config: &GisConfig) -> Result<Self> {
        Ok(Self {
            wetlands: WetlandsProbe::new(config)?,
            flood_zone: FloodZoneProbe::new(config)?,
            slope: SlopeProbe::new(config)?,
            road_access: RoadAccessProbe::new(config)?,
            protected_land: ProtectedLandProbe::new(config)?,
        })
    }

    /// Build a service from explicit probes (used by tests to inject fakes)
    pub fn with_probes(
        wetlands: WetlandsProbe,
        flood_zone: FloodZoneProbe,
        slope: SlopeProbe,
        road_access: RoadAccessProbe,
        protected_land: ProtectedLandProbe,
    ) -> Self {
        Self {
            wetlands,
            flood_zone,
            slope,
            road_access,
            protected_land,
        }
    }

    /// Run all five probes for one property and aggregate the verdict.
    ///
    /// Total with respect to probe data: every probe absorbs its provider
    /// failures internally, so this always produces a full analysis for a
    /// successfully geocoded point.
    pub async fn analyze(
        &self,
        point: GeoPoint,
        address: Option<String>,
        hints: AnalysisHints,
    ) -> PropertyAnalysis {
        let start = Instant::now();

        let wetlands = self.wetlands.probe(&point, &hints).await;
        let flood_zone = self.flood_zone.probe(&point, &hints).await;
        let slope = self.slope.probe(&point, &hints).await;
        let road_access = self.road_access.probe(&point).await;
        let protected_land = self.protected_land.probe(&point).await;

        let inputs = RiskInputs {
            wetlands,
            flood_zone,
            slope,
            road_access,
            protected_land,
        };
        let assessment = aggregate(&inputs);

        let processing_time = start.elapsed().as_secs_f64();
        tracing::info!(
            risk = assessment.risk_level.as_str(),
            landlocked = assessment.landlocked,
            elapsed_seconds = format!("{:.2}", processing_time),
            "Property analysis complete"
        );

        PropertyAnalysis {
            point,
            address,
            city: hints.city,
            state: hints.state,
            assessment,
            processing_time_seconds: (processing_time * 100.0).round() / 100.0,
            analyzed_at: Utc::now(),
        }
    }

    /// Apply a vision road judgment to an existing assessment.
    ///
    /// When the override policy fires, the corrected road-access facts are
    /// written into the inputs and the verdict is recomputed through the
    /// same aggregator; the risk level is never patched directly. Returns
    /// the new assessment when an override was applied, `None` otherwise.
    pub fn apply_road_override(
        &self,
        assessment: &OverallRiskAssessment,
        judgment: &RoadConditionJudgment,
    ) -> Option<OverallRiskAssessment> {
        let decision = road_override::evaluate(judgment, &assessment.inputs.road_access);
        if !decision.applied {
            return None;
        }

        let reason = decision.reason.unwrap_or_default();
        let old_access = assessment.inputs.road_access.has_access;
        let old_distance = assessment.inputs.road_access.distance_meters;

        let mut inputs = assessment.inputs.clone();
        inputs.road_access.has_access = decision.has_access;
        inputs.road_access.distance_meters = decision.distance_meters;
        inputs.road_access.source = format!("Vision override: {}", reason);
        inputs.road_access.note = Some(reason.clone());

        let updated = aggregate(&inputs);
        tracing::info!(
            "Vision override applied: road access {} ({}m) -> {} ({}m). Overall risk: {} -> {}. {}",
            old_access,
            old_distance,
            decision.has_access,
            decision.distance_meters,
            assessment.risk_level.as_str(),
            updated.risk_level.as_str(),
            reason
        );

        Some(updated)
    }
}
