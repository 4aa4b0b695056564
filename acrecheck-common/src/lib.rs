//! Shared types for the acrecheck property analysis services
//!
//! Holds the data model exchanged between the GIS risk engine and its
//! collaborators (persistence, vision analysis, reporting), the common error
//! taxonomy, geographic math, and config file resolution.

pub mod config;
pub mod error;
pub mod geo;
pub mod models;

pub use error::{Error, Result};
pub use geo::GeoPoint;
