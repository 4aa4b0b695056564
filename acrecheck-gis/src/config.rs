//! Configuration for the GIS risk engine
//!
//! Provider endpoints, per-provider timeouts, and tuning knobs. Compiled
//! defaults are the production endpoints (all free, no API keys); a TOML
//! file can override any field, resolved via `ACRECHECK_GIS_CONFIG` or the
//! user config directory.

use acrecheck_common::config::{load_toml, resolve_config_path};
use acrecheck_common::Result;
use serde::Deserialize;

const CONFIG_ENV_VAR: &str = "ACRECHECK_GIS_CONFIG";
const CONFIG_FILE_NAME: &str = "gis.toml";

/// Full engine configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GisConfig {
    /// User agent sent to every provider
    pub user_agent: String,
    pub geocoding: GeocodingConfig,
    pub wetlands: WetlandsConfig,
    pub flood: FloodConfig,
    pub slope: SlopeConfig,
    pub road_access: RoadAccessConfig,
    pub protected_land: ProtectedLandConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    pub census_url: String,
    pub census_timeout_seconds: u64,
    pub nominatim_url: String,
    pub nominatim_timeout_seconds: u64,
    /// Minimum inter-request delay for Nominatim (usage policy courtesy)
    pub nominatim_min_interval_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WetlandsConfig {
    pub living_atlas_url: String,
    pub nwi_direct_url: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FloodConfig {
    pub living_atlas_url: String,
    pub msc_identify_url: String,
    pub nfhl_query_url: String,
    pub living_atlas_timeout_seconds: u64,
    pub msc_timeout_seconds: u64,
    pub nfhl_timeout_seconds: u64,
    /// Search buffer for the NFHL query, meters (catches precision misses)
    pub nfhl_buffer_meters: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SlopeConfig {
    pub usgs_epqs_url: String,
    pub open_elevation_url: String,
    pub timeout_seconds: u64,
    /// Offset between elevation sample points, degrees (~10m)
    pub sample_offset_degrees: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RoadAccessConfig {
    pub overpass_url: String,
    pub timeout_seconds: u64,
    /// Radius within which a road qualifies as access, meters
    pub search_radius_meters: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProtectedLandConfig {
    pub padus_url: String,
    pub timeout_seconds: u64,
}

impl Default for GisConfig {
    fn default() -> Self {
        Self {
            user_agent: "acrecheck/0.1 (property risk analysis)".to_string(),
            geocoding: GeocodingConfig::default(),
            wetlands: WetlandsConfig::default(),
            flood: FloodConfig::default(),
            slope: SlopeConfig::default(),
            road_access: RoadAccessConfig::default(),
            protected_land: ProtectedLandConfig::default(),
        }
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            census_url: "https://geocoding.geo.census.gov/geocoder/locations/onelineaddress"
                .to_string(),
            census_timeout_seconds: 8,
            nominatim_url: "https://nominatim.openstreetmap.org/search".to_string(),
            nominatim_timeout_seconds: 10,
            nominatim_min_interval_ms: 1000,
        }
    }
}

impl Default for WetlandsConfig {
    fn default() -> Self {
        Self {
            living_atlas_url: "https://services.arcgis.com/P3ePLMYs2RVChkJx/arcgis/rest/services/USA_Wetlands/FeatureServer/0/query".to_string(),
            nwi_direct_url: "https://fwspublicservices.wim.usgs.gov/wetlandsmapservice/rest/services/Wetlands/MapServer/0/query".to_string(),
            timeout_seconds: 15,
        }
    }
}

impl Default for FloodConfig {
    fn default() -> Self {
        Self {
            living_atlas_url: "https://services.arcgis.com/P3ePLMYs2RVChkJx/arcgis/rest/services/USA_Flood_Hazard_Reduced_Set_gdb/FeatureServer/0/query".to_string(),
            msc_identify_url: "https://msc.fema.gov/arcgis/rest/services/public/NFHLWMS/MapServer/identify".to_string(),
            nfhl_query_url: "https://hazards.fema.gov/gis/nfhl/rest/services/public/NFHL/MapServer/28/query".to_string(),
            living_atlas_timeout_seconds: 20,
            msc_timeout_seconds: 15,
            nfhl_timeout_seconds: 20,
            nfhl_buffer_meters: 10.0,
        }
    }
}

impl Default for SlopeConfig {
    fn default() -> Self {
        Self {
            usgs_epqs_url: "https://epqs.nationalmap.gov/v1/json".to_string(),
            open_elevation_url: "https://api.open-elevation.com/api/v1/lookup".to_string(),
            timeout_seconds: 10,
            sample_offset_degrees: 0.0001,
        }
    }
}

impl Default for RoadAccessConfig {
    fn default() -> Self {
        Self {
            overpass_url: "https://overpass-api.de/api/interpreter".to_string(),
            timeout_seconds: 15,
            search_radius_meters: 200.0,
        }
    }
}

impl Default for ProtectedLandConfig {
    fn default() -> Self {
        Self {
            padus_url: "https://services1.arcgis.com/Hp6G80Pky0om7QvQ/arcgis/rest/services/Protected_Areas_Database_US_PAD_US3_0/FeatureServer/0/query".to_string(),
            timeout_seconds: 15,
        }
    }
}

impl GisConfig {
    /// Load configuration: env-var path, then user config file, then defaults
    pub fn load() -> Result<Self> {
        match resolve_config_path(CONFIG_ENV_VAR, CONFIG_FILE_NAME) {
            Some(path) => {
                tracing::info!("Loading GIS config from {}", path.display());
                load_toml(&path)
            }
            None => {
                tracing::debug!("No GIS config file found, using compiled defaults");
                Ok(Self::default())
            }
        }
    }
}
