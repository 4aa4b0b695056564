//! Address geocoding with provider fallback
//!
//! Providers in priority order: US Census geocoder (authoritative, HIGH
//! accuracy), OpenStreetMap Nominatim (community, MEDIUM accuracy,
//! rate-limited to 1 request/second per usage policy), then a static table
//! of known ZIP centroids (LOW accuracy). The first usable match wins and
//! only that provider's accuracy/source are recorded; partial results are
//! never merged across providers.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use acrecheck_common::models::{GeocodeAccuracy, GeocodeResult};
use acrecheck_common::{Error, GeoPoint, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Mutex;

use super::{build_client, ProviderError};
use crate::config::GisConfig;

/// Address submitted for resolution
#[derive(Debug, Clone)]
pub struct AddressQuery {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

impl AddressQuery {
    pub fn full_address(&self) -> String {
        format!("{}, {}, {} {}", self.street, self.city, self.state, self.zip)
    }
}

/// One geocoding provider in the fallback chain.
///
/// `Ok(None)` means the provider answered but found no match; the resolver
/// advances to the next provider in both that case and on error.
#[async_trait]
pub trait GeocodeProvider: Send + Sync {
    fn source_id(&self) -> &'static str;

    async fn geocode(&self, query: &AddressQuery)
        -> std::result::Result<Option<GeocodeResult>, ProviderError>;
}

/// Rate limiter enforcing a minimum inter-request interval
struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval_ms: u64) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval: Duration::from_millis(min_interval_ms),
        }
    }

    /// Wait if necessary to comply with the provider's usage policy
    async fn wait(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                tracing::debug!("Rate limiting: waiting {:?}", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}

// ---------------------------------------------------------------------------
// US Census geocoder

#[derive(Debug, Deserialize)]
struct CensusResponse {
    result: CensusResult,
}

#[derive(Debug, Deserialize)]
struct CensusResult {
    #[serde(rename = "addressMatches", default)]
    address_matches: Vec<CensusMatch>,
}

#[derive(Debug, Deserialize)]
struct CensusMatch {
    coordinates: CensusCoordinates,
    #[serde(rename = "addressComponents")]
    address_components: CensusAddressComponents,
}

#[derive(Debug, Deserialize)]
struct CensusCoordinates {
    /// Longitude
    x: f64,
    /// Latitude
    y: f64,
}

#[derive(Debug, Deserialize, Default)]
struct CensusAddressComponents {
    #[serde(rename = "streetName")]
    street_name: Option<String>,
    city: Option<String>,
    state: Option<String>,
    zip: Option<String>,
    county: Option<String>,
}

/// US Census Bureau geocoder (free, no API key, HIGH accuracy)
pub struct CensusGeocoder {
    client: reqwest::Client,
    url: String,
}

impl CensusGeocoder {
    pub fn new(config: &GisConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(&config.user_agent, config.geocoding.census_timeout_seconds)?,
            url: config.geocoding.census_url.clone(),
        })
    }
}

#[async_trait]
impl GeocodeProvider for CensusGeocoder {
    fn source_id(&self) -> &'static str {
        "US Census Geocoder"
    }

    async fn geocode(
        &self,
        query: &AddressQuery,
    ) -> std::result::Result<Option<GeocodeResult>, ProviderError> {
        let full_address = query.full_address();
        let params = [
            ("address", full_address.as_str()),
            ("benchmark", "Public_AR_Current"),
            ("format", "json"),
        ];

        let response = self.client.get(&self.url).query(&params).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }

        let body: CensusResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        let Some(m) = body.result.address_matches.into_iter().next() else {
            return Ok(None);
        };

        let point = GeoPoint::new(m.coordinates.y, m.coordinates.x)
            .map_err(|e| ProviderError::Parse(e.to_string()))?;
        let components = m.address_components;

        Ok(Some(GeocodeResult {
            point,
            full_address,
            street: components.street_name.unwrap_or_else(|| query.street.clone()),
            city: components.city.unwrap_or_else(|| query.city.clone()),
            state: components.state.unwrap_or_else(|| query.state.clone()),
            zip: components.zip.unwrap_or_else(|| query.zip.clone()),
            county: components.county,
            accuracy: GeocodeAccuracy::High,
            source: self.source_id().to_string(),
        }))
    }
}

// ---------------------------------------------------------------------------
// OpenStreetMap Nominatim

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    #[serde(default)]
    address: NominatimAddress,
}

#[derive(Debug, Deserialize, Default)]
struct NominatimAddress {
    city: Option<String>,
    town: Option<String>,
    state: Option<String>,
    postcode: Option<String>,
    county: Option<String>,
}

/// OpenStreetMap Nominatim geocoder (community service, MEDIUM accuracy).
///
/// The usage policy requires at most one request per second; the limiter is
/// shared across clones so concurrent resolutions still pace correctly.
pub struct NominatimGeocoder {
    client: reqwest::Client,
    url: String,
    rate_limiter: Arc<RateLimiter>,
}

impl NominatimGeocoder {
    pub fn new(config: &GisConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(
                &config.user_agent,
                config.geocoding.nominatim_timeout_seconds,
            )?,
            url: config.geocoding.nominatim_url.clone(),
            rate_limiter: Arc::new(RateLimiter::new(config.geocoding.nominatim_min_interval_ms)),
        })
    }
}

#[async_trait]
impl GeocodeProvider for NominatimGeocoder {
    fn source_id(&self) -> &'static str {
        "OpenStreetMap Nominatim"
    }

    async fn geocode(
        &self,
        query: &AddressQuery,
    ) -> std::result::Result<Option<GeocodeResult>, ProviderError> {
        self.rate_limiter.wait().await;

        let full_address = query.full_address();
        let params = [
            ("q", full_address.as_str()),
            ("format", "json"),
            ("limit", "1"),
            ("addressdetails", "1"),
            ("countrycodes", "us"),
        ];

        let response = self.client.get(&self.url).query(&params).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }

        let places: Vec<NominatimPlace> = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        let Some(place) = places.into_iter().next() else {
            return Ok(None);
        };

        let latitude: f64 = place
            .lat
            .parse()
            .map_err(|_| ProviderError::Parse(format!("bad latitude: {}", place.lat)))?;
        let longitude: f64 = place
            .lon
            .parse()
            .map_err(|_| ProviderError::Parse(format!("bad longitude: {}", place.lon)))?;
        let point =
            GeoPoint::new(latitude, longitude).map_err(|e| ProviderError::Parse(e.to_string()))?;

        let address = place.address;
        Ok(Some(GeocodeResult {
            point,
            full_address,
            street: query.street.clone(),
            city: address
                .city
                .or(address.town)
                .unwrap_or_else(|| query.city.clone()),
            state: address.state.unwrap_or_else(|| query.state.clone()),
            zip: address.postcode.unwrap_or_else(|| query.zip.clone()),
            county: address.county,
            accuracy: GeocodeAccuracy::Medium,
            source: self.source_id().to_string(),
        }))
    }
}

// ---------------------------------------------------------------------------
// ZIP centroid fallback

/// Static centroid table for known ZIP codes (LOW accuracy, last resort).
///
/// Southwest Florida coverage matches the service's primary market; other
/// ZIPs return no match and resolution fails as exhausted.
pub struct ZipCentroidGeocoder {
    centroids: HashMap<&'static str, (f64, f64)>,
}

impl ZipCentroidGeocoder {
    pub fn new() -> Self {
        let mut centroids = HashMap::new();
        centroids.insert("33971", (26.6254, -81.6437)); // Lehigh Acres
        centroids.insert("33972", (26.5920, -81.6570)); // Lehigh Acres
        centroids.insert("33973", (26.5731, -81.6881)); // Lehigh Acres
        centroids.insert("33974", (26.6531, -81.6209)); // Lehigh Acres
        centroids.insert("33976", (26.5731, -81.6881)); // Lehigh Acres
        Self { centroids }
    }

    /// Estimate the Florida county from the city name
    fn estimate_county_fl(city: &str) -> Option<&'static str> {
        let city_lower = city.to_lowercase();
        let county_map = [
            ("lehigh", "Lee County"),
            ("fort myers", "Lee County"),
            ("cape coral", "Lee County"),
            ("miami", "Miami-Dade County"),
            ("tampa", "Hillsborough County"),
            ("orlando", "Orange County"),
            ("jacksonville", "Duval County"),
        ];
        county_map
            .iter()
            .find(|(key, _)| city_lower.contains(key))
            .map(|(_, county)| *county)
    }
}

impl Default for ZipCentroidGeocoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GeocodeProvider for ZipCentroidGeocoder {
    fn source_id(&self) -> &'static str {
        "ZIP Code Approximation"
    }

    async fn geocode(
        &self,
        query: &AddressQuery,
    ) -> std::result::Result<Option<GeocodeResult>, ProviderError> {
        // Strip ZIP+4 suffix
        let zip_clean = query.zip.split('-').next().unwrap_or("").trim();

        let Some(&(latitude, longitude)) = self.centroids.get(zip_clean) else {
            return Ok(None);
        };
        let point =
            GeoPoint::new(latitude, longitude).map_err(|e| ProviderError::Parse(e.to_string()))?;

        let county = if query.state.eq_ignore_ascii_case("FL") {
            Self::estimate_county_fl(&query.city).map(str::to_string)
        } else {
            None
        };

        Ok(Some(GeocodeResult {
            point,
            full_address: query.full_address(),
            street: query.street.clone(),
            city: query.city.clone(),
            state: query.state.clone(),
            zip: query.zip.clone(),
            county,
            accuracy: GeocodeAccuracy::Low,
            source: self.source_id().to_string(),
        }))
    }
}

// ---------------------------------------------------------------------------
// Resolver

/// Geocoding resolver iterating the provider chain in priority order
pub struct GeocodingService {
    providers: Vec<Box<dyn GeocodeProvider>>,
}

impl GeocodingService {
    pub fn new(config: &GisConfig) -> Result<Self> {
        Ok(Self {
            providers: vec![
                Box::new(CensusGeocoder::new(config)?),
                Box::new(NominatimGeocoder::new(config)?),
                Box::new(ZipCentroidGeocoder::new()),
            ],
        })
    }

    /// Build a resolver with an explicit provider chain (used by tests)
    pub fn with_providers(providers: Vec<Box<dyn GeocodeProvider>>) -> Self {
        Self { providers }
    }

    /// Resolve an address to coordinates.
    ///
    /// # Errors
    /// `Error::GeocodingExhausted` when every provider fails or finds no
    /// match. Callers must treat the property as unprocessable; default
    /// coordinates are never substituted.
    pub async fn resolve(&self, query: &AddressQuery) -> Result<GeocodeResult> {
        let full_address = query.full_address();

        for provider in &self.providers {
            match provider.geocode(query).await {
                Ok(Some(result)) => {
                    tracing::info!(
                        source = provider.source_id(),
                        accuracy = result.accuracy.as_str(),
                        "Geocoded: {}",
                        full_address
                    );
                    return Ok(result);
                }
                Ok(None) => {
                    tracing::debug!(
                        source = provider.source_id(),
                        "No geocoding match for: {}",
                        full_address
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        source = provider.source_id(),
                        error = %e,
                        "Geocoding provider failed, trying next"
                    );
                }
            }
        }

        tracing::warn!("All geocoding providers exhausted for: {}", full_address);
        Err(Error::GeocodingExhausted(full_address))
    }
}
