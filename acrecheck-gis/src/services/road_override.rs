//! Vision road-access override policy
//!
//! Boundary with the vision-analysis collaborator: when a high-confidence
//! visual judgment of the road contradicts the GIS road-access finding,
//! decide which source to trust and produce corrected road-access facts.
//! The policy never computes a risk level; the caller applies the corrected
//! facts and re-runs the aggregator.

use acrecheck_common::models::{RoadAccessResult, RoadConditionJudgment, RoadSurface};

/// Minimum vision confidence for the policy to engage at all
const MIN_VISION_CONFIDENCE: f64 = 0.6;
/// Conservative proximity estimate when vision finds an unpaved road, meters
const UNPAVED_PROXIMITY_METERS: f64 = 50.0;
/// Proximity estimate when vision finds a paved road, meters
const PAVED_PROXIMITY_METERS: f64 = 30.0;
/// GIS-reported distance beyond which an unconfirmed road is suspect, meters
const FAR_ROAD_METERS: f64 = 100.0;

/// Outcome of the override evaluation
#[derive(Debug, Clone)]
pub struct OverrideDecision {
    pub applied: bool,
    pub has_access: bool,
    pub distance_meters: f64,
    pub reason: Option<String>,
}

impl OverrideDecision {
    fn unchanged(gis: &RoadAccessResult) -> Self {
        Self {
            applied: false,
            has_access: gis.has_access,
            distance_meters: gis.distance_meters,
            reason: None,
        }
    }
}

/// Decide whether the vision judgment overrides the GIS road access.
///
/// Three cases, evaluated in order, first match wins:
/// 1. Vision sees a dirt/gravel road but GIS found no access: unpaved roads
///    are routinely missing from road-network data, so access is granted at
///    a conservative 50m.
/// 2. Vision sees a paved road but GIS found no access: the network data is
///    treated as incomplete rather than wrong; access granted at 30m.
/// 3. Vision cannot confirm any road while GIS reports access further than
///    100m: a road that far away and invisible from ground level may not be
///    real access, so access is revoked (GIS distance kept).
pub fn evaluate(
    judgment: &RoadConditionJudgment,
    gis: &RoadAccessResult,
) -> OverrideDecision {
    if judgment.confidence < MIN_VISION_CONFIDENCE {
        return OverrideDecision::unchanged(gis);
    }

    match judgment.surface {
        RoadSurface::Dirt | RoadSurface::Gravel if !gis.has_access => OverrideDecision {
            applied: true,
            has_access: true,
            distance_meters: UNPAVED_PROXIMITY_METERS,
            reason: Some(format!(
                "Vision detected {} road (confidence: {:.2}) but GIS found no road access. \
                 Updated to reflect unpaved road access.",
                judgment.surface.as_str(),
                judgment.confidence
            )),
        },
        RoadSurface::Paved if !gis.has_access => OverrideDecision {
            applied: true,
            has_access: true,
            distance_meters: PAVED_PROXIMITY_METERS,
            reason: Some(format!(
                "Vision detected PAVED road (confidence: {:.2}) but GIS found no road access. \
                 Updated to reflect road access.",
                judgment.confidence
            )),
        },
        RoadSurface::Unknown if gis.has_access && gis.distance_meters > FAR_ROAD_METERS => {
            OverrideDecision {
                applied: true,
                has_access: false,
                distance_meters: gis.distance_meters,
                reason: Some(format!(
                    "Vision cannot confirm road access and GIS shows road is {:.0}m away. \
                     Updated to no direct access.",
                    gis.distance_meters
                )),
            }
        }
        _ => OverrideDecision::unchanged(gis),
    }
}
