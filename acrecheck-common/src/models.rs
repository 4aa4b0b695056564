//! Data model shared between the GIS risk engine and its collaborators
//!
//! These records are what the persistence layer stores and what the vision
//! analysis service consumes and partially overrides, so field meaning is a
//! contract: confidence tags are threaded through from the probe that
//! produced them and are never re-derived downstream.

use crate::geo::GeoPoint;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Trust level for a single probed field.
///
/// `Low` only ever comes from a heuristic or fallback path. A verified
/// provider match is `High`; a regional heuristic with real signal is
/// `Medium`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "HIGH",
            Confidence::Medium => "MEDIUM",
            Confidence::Low => "LOW",
        }
    }
}

/// Severity of a single risk factor (flood zone, slope)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Unknown,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Unknown => "UNKNOWN",
        }
    }
}

/// Overall property risk verdict.
///
/// `Unknown` is reserved for "geocoded successfully but too many probes
/// returned low-confidence data"; a property whose geocoding failed is
/// reported as unprocessed, never as `Unknown` risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Unknown,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Unknown => "UNKNOWN",
        }
    }
}

/// Positional accuracy of a geocoding match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GeocodeAccuracy {
    High,
    Medium,
    Low,
}

impl GeocodeAccuracy {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeocodeAccuracy::High => "HIGH",
            GeocodeAccuracy::Medium => "MEDIUM",
            GeocodeAccuracy::Low => "LOW",
        }
    }
}

/// Resolved address with coordinates.
///
/// Only the winning provider's accuracy and source are recorded; partial
/// results from earlier failed providers are never merged in. `accuracy` is
/// preserved for audit even though the risk logic does not consume it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub point: GeoPoint,
    pub full_address: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub county: Option<String>,
    pub accuracy: GeocodeAccuracy,
    pub source: String,
}

/// Wetlands intersection result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WetlandsResult {
    /// True if the point intersects a mapped wetland
    pub status: bool,
    /// Wetland classification from the inventory, when matched
    pub wetland_type: Option<String>,
    pub confidence: Confidence,
    pub source: String,
    pub note: Option<String>,
}

/// Flood-hazard zone result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloodZoneResult {
    /// Zone designation, possibly with subtype (e.g. "AE (FLOODWAY)")
    pub zone: String,
    pub severity: Severity,
    /// Whether the point is inside a Special Flood Hazard Area, when the
    /// provider reported the flag
    pub in_sfha: Option<bool>,
    pub confidence: Confidence,
    pub source: String,
    pub note: Option<String>,
}

/// Terrain slope result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlopeResult {
    /// Slope as a 0-100 percentage, not a fraction
    pub percentage: f64,
    pub severity: Severity,
    pub confidence: Confidence,
    pub source: String,
    pub note: Option<String>,
}

/// Road access result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadAccessResult {
    /// True if a road-tagged way exists within the search radius
    pub has_access: bool,
    /// Distance to the nearest candidate road in meters
    pub distance_meters: f64,
    pub confidence: Confidence,
    pub source: String,
    pub note: Option<String>,
}

impl RoadAccessResult {
    /// Landlocked status is derived, never stored separately: a property is
    /// landlocked exactly when it has no qualifying road access.
    pub fn landlocked(&self) -> bool {
        !self.has_access
    }
}

/// Protected/conservation land result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtectedLandResult {
    pub is_protected: bool,
    /// Protection category (e.g. "Fee", "Easement"), when matched
    pub category: Option<String>,
    /// Managing agency name, when matched
    pub manager: Option<String>,
    /// Protected unit name, when matched
    pub unit_name: Option<String>,
    pub confidence: Confidence,
    pub source: String,
}

/// The five probe results feeding one risk verdict
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskInputs {
    pub wetlands: WetlandsResult,
    pub flood_zone: FloodZoneResult,
    pub slope: SlopeResult,
    pub road_access: RoadAccessResult,
    pub protected_land: ProtectedLandResult,
}

/// Aggregated risk verdict together with the inputs that produced it.
///
/// Recomputed through the aggregator whenever any input changes (including a
/// vision override); never patched field-by-field. `landlocked` always equals
/// `!inputs.road_access.has_access`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverallRiskAssessment {
    pub risk_level: RiskLevel,
    pub landlocked: bool,
    pub inputs: RiskInputs,
}

/// Full per-property analysis as produced by the GIS risk service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyAnalysis {
    pub point: GeoPoint,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub assessment: OverallRiskAssessment,
    pub processing_time_seconds: f64,
    pub analyzed_at: DateTime<Utc>,
}

/// Road surface classification from the vision collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RoadSurface {
    Paved,
    Dirt,
    Gravel,
    Poor,
    Unknown,
}

impl RoadSurface {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoadSurface::Paved => "PAVED",
            RoadSurface::Dirt => "DIRT",
            RoadSurface::Gravel => "GRAVEL",
            RoadSurface::Poor => "POOR",
            RoadSurface::Unknown => "UNKNOWN",
        }
    }
}

/// Structured road-condition judgment from the vision collaborator.
///
/// The override policy does not care how this was produced, only that
/// `confidence` is a 0.0-1.0 float.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadConditionJudgment {
    pub surface: RoadSurface,
    pub confidence: f64,
    pub details: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_string_forms() {
        assert_eq!(Confidence::High.as_str(), "HIGH");
        assert_eq!(Severity::Unknown.as_str(), "UNKNOWN");
        assert_eq!(RiskLevel::Medium.as_str(), "MEDIUM");
        assert_eq!(RoadSurface::Gravel.as_str(), "GRAVEL");
    }

    #[test]
    fn test_landlocked_is_derived() {
        let accessible = RoadAccessResult {
            has_access: true,
            distance_meters: 42.0,
            confidence: Confidence::High,
            source: "test".to_string(),
            note: None,
        };
        assert!(!accessible.landlocked());

        let landlocked = RoadAccessResult {
            has_access: false,
            distance_meters: 350.0,
            confidence: Confidence::High,
            source: "test".to_string(),
            note: None,
        };
        assert!(landlocked.landlocked());
    }

    #[test]
    fn test_serde_round_trip_uses_uppercase_tags() {
        let json = serde_json::to_string(&Severity::High).unwrap();
        assert_eq!(json, "\"HIGH\"");
        let back: Severity = serde_json::from_str("\"MEDIUM\"").unwrap();
        assert_eq!(back, Severity::Medium);
    }
}
