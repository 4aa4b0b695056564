//! Overall risk aggregation
//!
//! Pure, total, deterministic: same inputs always produce the same verdict,
//! no I/O and no failure mode. Hard disqualifiers fire before any scoring
//! because a catastrophic single factor must not be diluted by a weighted
//! sum. The unknown-penalty override keeps an assessment built mostly on
//! fallback data from masquerading as a clean LOW.
//!
//! Landlocked status is derived from road access (`!has_access`), so the
//! historical "has access but landlocked" contradiction cannot be
//! represented, and the output invariant
//! `landlocked == !inputs.road_access.has_access` holds by construction.

use acrecheck_common::models::{
    Confidence, OverallRiskAssessment, RiskInputs, RiskLevel, Severity,
};

/// Point total at or above which the verdict is HIGH
const HIGH_RISK_THRESHOLD: u32 = 5;
/// Point total at or above which the verdict is MEDIUM
const MEDIUM_RISK_THRESHOLD: u32 = 3;
/// Unknown-penalty count at or above which the verdict is UNKNOWN
const UNKNOWN_PENALTY_THRESHOLD: u32 = 3;

/// Combine the five probe results into one risk verdict.
///
/// In strict order: flood-HIGH disqualifier, landlocked disqualifier, point
/// accumulation with unknown penalties, unknown override, threshold
/// classification.
pub fn aggregate(inputs: &RiskInputs) -> OverallRiskAssessment {
    let landlocked = inputs.road_access.landlocked();

    // Hard disqualifier 1: HIGH flood zone
    if inputs.flood_zone.severity == Severity::High {
        tracing::info!("HIGH flood zone detected - overall risk HIGH");
        return OverallRiskAssessment {
            risk_level: RiskLevel::High,
            landlocked,
            inputs: inputs.clone(),
        };
    }

    // Hard disqualifier 2: no road access means the parcel is landlocked,
    // which is categorically high risk regardless of every other factor
    if landlocked {
        tracing::info!("Landlocked property (no road access) - overall risk HIGH");
        return OverallRiskAssessment {
            risk_level: RiskLevel::High,
            landlocked,
            inputs: inputs.clone(),
        };
    }

    let mut risk_score: u32 = 0;
    let mut unknown_penalties: u32 = 0;

    // Wetlands: +2 if present; sub-HIGH confidence counts as an unknown
    if inputs.wetlands.status {
        risk_score += 2;
    }
    if inputs.wetlands.confidence != Confidence::High {
        unknown_penalties += 1;
    }

    // Flood zone: HIGH already handled above. The severity and confidence
    // checks are independent; both can add an unknown penalty.
    match inputs.flood_zone.severity {
        Severity::Medium => risk_score += 2,
        Severity::Unknown => unknown_penalties += 1,
        _ => {}
    }
    if inputs.flood_zone.confidence != Confidence::High {
        unknown_penalties += 1;
    }

    // Slope: graded contribution
    match inputs.slope.severity {
        Severity::High => risk_score += 2,
        Severity::Medium => risk_score += 1,
        Severity::Unknown => unknown_penalties += 1,
        Severity::Low => {}
    }

    // Protected land: +2, no partial credit for confidence
    if inputs.protected_land.is_protected {
        risk_score += 2;
    }

    // Too many low-confidence inputs make any verdict untrustworthy
    if unknown_penalties >= UNKNOWN_PENALTY_THRESHOLD {
        tracing::info!(
            unknown_penalties,
            "Too many low-confidence inputs - overall risk UNKNOWN"
        );
        return OverallRiskAssessment {
            risk_level: RiskLevel::Unknown,
            landlocked,
            inputs: inputs.clone(),
        };
    }

    let risk_level = if risk_score >= HIGH_RISK_THRESHOLD {
        RiskLevel::High
    } else if risk_score >= MEDIUM_RISK_THRESHOLD {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };

    OverallRiskAssessment {
        risk_level,
        landlocked,
        inputs: inputs.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use acrecheck_common::models::{
        FloodZoneResult, ProtectedLandResult, RoadAccessResult, SlopeResult, WetlandsResult,
    };

    /// Cleanest possible inputs: every probe verified, nothing risky
    fn clean_inputs() -> RiskInputs {
        RiskInputs {
            wetlands: WetlandsResult {
                status: false,
                wetland_type: None,
                confidence: Confidence::High,
                source: "test".to_string(),
                note: None,
            },
            flood_zone: FloodZoneResult {
                zone: "X".to_string(),
                severity: Severity::Low,
                in_sfha: Some(false),
                confidence: Confidence::High,
                source: "test".to_string(),
                note: None,
            },
            slope: SlopeResult {
                percentage: 0.5,
                severity: Severity::Low,
                confidence: Confidence::High,
                source: "test".to_string(),
                note: None,
            },
            road_access: RoadAccessResult {
                has_access: true,
                distance_meters: 25.0,
                confidence: Confidence::High,
                source: "test".to_string(),
                note: None,
            },
            protected_land: ProtectedLandResult {
                is_protected: false,
                category: None,
                manager: None,
                unit_name: None,
                confidence: Confidence::High,
                source: "test".to_string(),
            },
        }
    }

    #[test]
    fn test_clean_inputs_are_low_risk() {
        let assessment = aggregate(&clean_inputs());
        assert_eq!(assessment.risk_level, RiskLevel::Low);
        assert!(!assessment.landlocked);
    }

    #[test]
    fn test_flood_high_disqualifies_despite_clean_everything_else() {
        let mut inputs = clean_inputs();
        inputs.flood_zone.severity = Severity::High;
        inputs.flood_zone.zone = "AE".to_string();

        let assessment = aggregate(&inputs);
        assert_eq!(assessment.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_no_road_access_disqualifies_despite_clean_everything_else() {
        let mut inputs = clean_inputs();
        inputs.road_access.has_access = false;
        inputs.road_access.distance_meters = 450.0;

        let assessment = aggregate(&inputs);
        assert_eq!(assessment.risk_level, RiskLevel::High);
        assert!(assessment.landlocked);
    }

    #[test]
    fn test_landlocked_invariant_holds_after_aggregation() {
        let accessible = aggregate(&clean_inputs());
        assert_eq!(
            accessible.landlocked,
            !accessible.inputs.road_access.has_access
        );

        let mut inputs = clean_inputs();
        inputs.road_access.has_access = false;
        let landlocked = aggregate(&inputs);
        assert_eq!(
            landlocked.landlocked,
            !landlocked.inputs.road_access.has_access
        );
    }

    #[test]
    fn test_aggregate_is_pure() {
        let mut inputs = clean_inputs();
        inputs.wetlands.status = true;
        inputs.slope.severity = Severity::Medium;

        let first = aggregate(&inputs);
        let second = aggregate(&inputs);
        assert_eq!(first.risk_level, second.risk_level);
        assert_eq!(first.landlocked, second.landlocked);
    }

    #[test]
    fn test_scoring_boundary_exactly_five_is_high() {
        // wetlands (+2) + flood MEDIUM (+2) + slope MEDIUM (+1) = 5
        let mut inputs = clean_inputs();
        inputs.wetlands.status = true;
        inputs.flood_zone.severity = Severity::Medium;
        inputs.slope.severity = Severity::Medium;

        let assessment = aggregate(&inputs);
        assert_eq!(assessment.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_scoring_boundary_exactly_three_is_medium() {
        // wetlands (+2) + slope MEDIUM (+1) = 3
        let mut inputs = clean_inputs();
        inputs.wetlands.status = true;
        inputs.slope.severity = Severity::Medium;

        let assessment = aggregate(&inputs);
        assert_eq!(assessment.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn test_two_points_stay_low() {
        let mut inputs = clean_inputs();
        inputs.wetlands.status = true;

        let assessment = aggregate(&inputs);
        assert_eq!(assessment.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_three_unknown_penalties_force_unknown() {
        // Wetlands LOW confidence + flood LOW confidence + slope UNKNOWN:
        // raw score would be LOW but the verdict must be UNKNOWN
        let mut inputs = clean_inputs();
        inputs.wetlands.confidence = Confidence::Low;
        inputs.flood_zone.confidence = Confidence::Low;
        inputs.slope.severity = Severity::Unknown;

        let assessment = aggregate(&inputs);
        assert_eq!(assessment.risk_level, RiskLevel::Unknown);
    }

    #[test]
    fn test_flood_severity_and_confidence_penalties_are_independent() {
        // Flood UNKNOWN severity with sub-HIGH confidence fires both
        // penalties; one more anywhere tips the verdict to UNKNOWN.
        let mut inputs = clean_inputs();
        inputs.flood_zone.severity = Severity::Unknown;
        inputs.flood_zone.confidence = Confidence::Medium;
        inputs.wetlands.confidence = Confidence::Medium;

        let assessment = aggregate(&inputs);
        assert_eq!(assessment.risk_level, RiskLevel::Unknown);
    }

    #[test]
    fn test_two_unknown_penalties_do_not_force_unknown() {
        let mut inputs = clean_inputs();
        inputs.wetlands.confidence = Confidence::Low;
        inputs.slope.severity = Severity::Unknown;

        let assessment = aggregate(&inputs);
        assert_eq!(assessment.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_protected_land_scores_without_confidence_credit() {
        // Protected (+2) + wetlands (+2) + slope MEDIUM (+1) = 5
        let mut inputs = clean_inputs();
        inputs.protected_land.is_protected = true;
        inputs.wetlands.status = true;
        inputs.slope.severity = Severity::Medium;

        let assessment = aggregate(&inputs);
        assert_eq!(assessment.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_disqualifier_precedes_unknown_override() {
        // Flood HIGH wins even when everything else is low-confidence noise
        let mut inputs = clean_inputs();
        inputs.flood_zone.severity = Severity::High;
        inputs.wetlands.confidence = Confidence::Low;
        inputs.flood_zone.confidence = Confidence::Low;
        inputs.slope.severity = Severity::Unknown;

        let assessment = aggregate(&inputs);
        assert_eq!(assessment.risk_level, RiskLevel::High);
    }
}
