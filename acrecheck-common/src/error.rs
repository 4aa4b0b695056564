//! Common error types for acrecheck services

use thiserror::Error;

/// Common result type for acrecheck operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that cross service boundaries.
///
/// Probe-internal provider failures never appear here: every dataset probe
/// absorbs them by advancing its fallback chain and always returns a
/// well-formed result. Geocoding exhaustion is the one external-data failure
/// allowed to propagate, and callers must mark the affected property as
/// unprocessed rather than substituting default coordinates.
#[derive(Error, Debug)]
pub enum Error {
    /// Every geocoding provider failed or returned no match
    #[error("Geocoding exhausted for address: {0}")]
    GeocodingExhausted(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid caller-supplied input (NaN coordinates, out-of-range values)
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
