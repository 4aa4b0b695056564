//! End-to-end analysis scenarios with injected fake providers, including the
//! vision override re-aggregation flow.

use acrecheck_common::models::{
    Confidence, RiskLevel, RoadConditionJudgment, RoadSurface, Severity,
};
use acrecheck_common::GeoPoint;
use acrecheck_gis::services::analyzer::GisRiskService;
use acrecheck_gis::services::flood_zone::{FloodProvider, FloodReading, FloodZoneProbe};
use acrecheck_gis::services::protected_land::{
    ProtectedHit, ProtectedLandProbe, ProtectedLandProvider,
};
use acrecheck_gis::services::road_access::{RoadAccessProbe, RoadProvider};
use acrecheck_gis::services::slope::{ElevationProvider, SlopeProbe};
use acrecheck_gis::services::wetlands::{WetlandsHit, WetlandsProbe, WetlandsProvider};
use acrecheck_gis::services::{AnalysisHints, ProviderError};
use async_trait::async_trait;

fn lehigh() -> GeoPoint {
    GeoPoint::new(26.6254, -81.6437).unwrap()
}

fn fl_hints() -> AnalysisHints {
    AnalysisHints {
        city: Some("Lehigh Acres".to_string()),
        state: Some("FL".to_string()),
    }
}

// Stub providers with fixed answers

struct NoWetlands;

#[async_trait]
impl WetlandsProvider for NoWetlands {
    fn source_id(&self) -> &'static str {
        "stub-wetlands"
    }

    async fn query(&self, _point: &GeoPoint) -> Result<Option<WetlandsHit>, ProviderError> {
        Ok(None)
    }
}

struct FloodZoneFixed {
    zone: &'static str,
    sfha: bool,
}

#[async_trait]
impl FloodProvider for FloodZoneFixed {
    fn source_id(&self) -> &'static str {
        "stub-flood"
    }

    async fn query(&self, _point: &GeoPoint) -> Result<Option<FloodReading>, ProviderError> {
        Ok(Some(FloodReading {
            zone: self.zone.to_string(),
            zone_subtype: None,
            in_sfha: Some(self.sfha),
        }))
    }
}

struct FlatTerrain;

#[async_trait]
impl ElevationProvider for FlatTerrain {
    fn source_id(&self) -> &'static str {
        "stub-elevation"
    }

    async fn elevations(&self, points: &[GeoPoint]) -> Result<Vec<f64>, ProviderError> {
        Ok(vec![5.0; points.len()])
    }
}

struct RoadAtOffset {
    lat_offset: f64,
}

#[async_trait]
impl RoadProvider for RoadAtOffset {
    fn source_id(&self) -> &'static str {
        "stub-roads"
    }

    async fn roads_near(
        &self,
        point: &GeoPoint,
        _radius_meters: f64,
    ) -> Result<Vec<GeoPoint>, ProviderError> {
        Ok(vec![GeoPoint::new(
            point.latitude + self.lat_offset,
            point.longitude,
        )
        .unwrap()])
    }
}

struct NotProtected;

#[async_trait]
impl ProtectedLandProvider for NotProtected {
    fn source_id(&self) -> &'static str {
        "stub-protected"
    }

    async fn query(&self, _point: &GeoPoint) -> Result<Option<ProtectedHit>, ProviderError> {
        Ok(None)
    }
}

/// Service where every probe reports its cleanest no-risk answer except the
/// pieces a test overrides
fn service(flood_zone: &'static str, sfha: bool, road_lat_offset: f64) -> GisRiskService {
    GisRiskService::with_probes(
        WetlandsProbe::with_providers(vec![Box::new(NoWetlands)]),
        FloodZoneProbe::with_providers(vec![Box::new(FloodZoneFixed {
            zone: flood_zone,
            sfha,
        })]),
        SlopeProbe::with_providers(vec![Box::new(FlatTerrain)], 0.0001),
        RoadAccessProbe::with_providers(
            vec![Box::new(RoadAtOffset {
                lat_offset: road_lat_offset,
            })],
            200.0,
        ),
        ProtectedLandProbe::with_providers(vec![Box::new(NotProtected)]),
    )
}

#[tokio::test]
async fn all_clean_probes_yield_low_risk() {
    // Road ~55m away, zone X, flat, no wetlands, not protected
    let service = service("X", false, 0.0005);

    let analysis = service
        .analyze(lehigh(), Some("123 Main St".to_string()), fl_hints())
        .await;

    assert_eq!(analysis.assessment.risk_level, RiskLevel::Low);
    assert!(!analysis.assessment.landlocked);
    assert_eq!(analysis.assessment.inputs.flood_zone.severity, Severity::Low);
    assert_eq!(
        analysis.assessment.inputs.road_access.confidence,
        Confidence::High
    );
    assert!(analysis.processing_time_seconds >= 0.0);
}

#[tokio::test]
async fn flood_high_dominates_everything() {
    let service = service("AE", true, 0.0005);

    let analysis = service.analyze(lehigh(), None, fl_hints()).await;
    assert_eq!(analysis.assessment.risk_level, RiskLevel::High);
    assert_eq!(
        analysis.assessment.inputs.flood_zone.severity,
        Severity::High
    );
}

#[tokio::test]
async fn distant_road_makes_property_landlocked_and_high_risk() {
    // ~330m to the nearest road, outside the 200m radius
    let service = service("X", false, 0.003);

    let analysis = service.analyze(lehigh(), None, fl_hints()).await;
    assert_eq!(analysis.assessment.risk_level, RiskLevel::High);
    assert!(analysis.assessment.landlocked);
    assert!(!analysis.assessment.inputs.road_access.has_access);
}

#[tokio::test]
async fn dirt_road_override_flips_landlocked_verdict() {
    let service = service("X", false, 0.003);
    let analysis = service.analyze(lehigh(), None, fl_hints()).await;
    assert_eq!(analysis.assessment.risk_level, RiskLevel::High);
    assert!(analysis.assessment.landlocked);

    let judgment = RoadConditionJudgment {
        surface: RoadSurface::Dirt,
        confidence: 0.75,
        details: "Unpaved road visible along the parcel frontage".to_string(),
    };

    let updated = service
        .apply_road_override(&analysis.assessment, &judgment)
        .expect("override should fire");

    // The corrected facts flow back through the aggregator
    assert!(updated.inputs.road_access.has_access);
    assert_eq!(updated.inputs.road_access.distance_meters, 50.0);
    assert!(!updated.landlocked);
    assert_eq!(updated.risk_level, RiskLevel::Low);
    assert!(updated.inputs.road_access.source.starts_with("Vision override:"));
}

#[tokio::test]
async fn low_confidence_judgment_changes_nothing() {
    let service = service("X", false, 0.003);
    let analysis = service.analyze(lehigh(), None, fl_hints()).await;

    let judgment = RoadConditionJudgment {
        surface: RoadSurface::Dirt,
        confidence: 0.4,
        details: "Possible track, image obscured".to_string(),
    };

    assert!(service
        .apply_road_override(&analysis.assessment, &judgment)
        .is_none());
}

#[tokio::test]
async fn override_cannot_rescue_flood_disqualifier() {
    // Landlocked AND in a high flood zone: granting access must not lower
    // the verdict because the flood disqualifier still applies
    let service = service("AE", true, 0.003);
    let analysis = service.analyze(lehigh(), None, fl_hints()).await;
    assert_eq!(analysis.assessment.risk_level, RiskLevel::High);

    let judgment = RoadConditionJudgment {
        surface: RoadSurface::Paved,
        confidence: 0.9,
        details: "Paved road at frontage".to_string(),
    };

    let updated = service
        .apply_road_override(&analysis.assessment, &judgment)
        .expect("override should fire");
    assert!(updated.inputs.road_access.has_access);
    assert_eq!(updated.risk_level, RiskLevel::High);
}
