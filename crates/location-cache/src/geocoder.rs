//! The seam between the cache and the external geocoding provider.

use async_trait::async_trait;
use thiserror::Error;
use weather_core::ResolvedLocation;

/// Errors a geocoding backend can report.
///
/// "No match for this input" and "the provider call itself failed" are
/// distinct on purpose: the former is a caller problem and must not be
/// retried, the latter is transient and safe to retry.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// The provider returned zero results for the input.
    #[error("location not found: {0}")]
    NotFound(String),

    /// The provider call failed (network error, bad status, bad payload).
    #[error("geocoding provider error: {0}")]
    Upstream(String),
}

/// Resolves a free-text location input to coordinates.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve `location` (the caller's original, non-normalized input)
    /// to the best-matching place.
    async fn geocode(&self, location: &str) -> Result<ResolvedLocation, GeocodeError>;
}
