//! Shared ArcGIS REST helpers
//!
//! Several probes (wetlands, flood, protected land) talk to ArcGIS
//! FeatureServer/MapServer endpoints with the same point-intersection query
//! shape; this module holds the geometry encoding and the typed response
//! payloads so each probe only deals with its own out-fields.

use super::ProviderError;
use acrecheck_common::GeoPoint;
use serde::Deserialize;
use serde_json::Value;

/// JSON point geometry parameter for FeatureServer queries (WGS84)
pub fn point_geometry_param(point: &GeoPoint) -> String {
    format!(
        r#"{{"x":{},"y":{},"spatialReference":{{"wkid":4326}}}}"#,
        point.longitude, point.latitude
    )
}

/// Feature query response (`/query?f=json`)
#[derive(Debug, Deserialize)]
pub struct FeatureQueryResponse {
    #[serde(default)]
    pub features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub attributes: Value,
}

impl Feature {
    /// Non-empty string attribute by name, trimmed
    pub fn string_attr(&self, name: &str) -> Option<String> {
        self.attributes
            .get(name)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}

/// Identify response (`/identify?f=json`)
#[derive(Debug, Deserialize)]
pub struct IdentifyResponse {
    #[serde(default)]
    pub results: Vec<Feature>,
}

/// Run a point-intersection feature query and return the feature list.
///
/// `extra_params` lets callers add buffer/spatial-relation parameters beyond
/// the common set.
pub async fn query_features(
    client: &reqwest::Client,
    url: &str,
    point: &GeoPoint,
    out_fields: &str,
    extra_params: &[(&str, String)],
) -> Result<Vec<Feature>, ProviderError> {
    let geometry = point_geometry_param(point);
    let mut params: Vec<(&str, String)> = vec![
        ("geometry", geometry),
        ("geometryType", "esriGeometryPoint".to_string()),
        ("inSR", "4326".to_string()),
        ("spatialRel", "esriSpatialRelIntersects".to_string()),
        ("outFields", out_fields.to_string()),
        ("returnGeometry", "false".to_string()),
        ("f", "json".to_string()),
    ];
    params.extend(extra_params.iter().cloned());

    let response = client.get(url).query(&params).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(ProviderError::Status(status.as_u16()));
    }

    let body: FeatureQueryResponse = response
        .json()
        .await
        .map_err(|e| ProviderError::Parse(e.to_string()))?;

    Ok(body.features)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_geometry_param_encoding() {
        let point = GeoPoint::new(26.6254, -81.6437).unwrap();
        let param = point_geometry_param(&point);
        assert_eq!(
            param,
            r#"{"x":-81.6437,"y":26.6254,"spatialReference":{"wkid":4326}}"#
        );
    }

    #[test]
    fn test_feature_string_attr() {
        let feature: Feature = serde_json::from_str(
            r#"{"attributes":{"FLD_ZONE":" AE ","ZONE_SUBTY":"","SFHA_TF":"T"}}"#,
        )
        .unwrap();
        assert_eq!(feature.string_attr("FLD_ZONE"), Some("AE".to_string()));
        // Empty after trimming
        assert_eq!(feature.string_attr("ZONE_SUBTY"), None);
        assert_eq!(feature.string_attr("MISSING"), None);
    }

    #[test]
    fn test_feature_response_defaults_to_empty() {
        let body: FeatureQueryResponse = serde_json::from_str("{}").unwrap();
        assert!(body.features.is_empty());
    }
}
