//! Error taxonomy for the aggregation pipeline.

use location_cache::GeocodeError;
use thiserror::Error;

/// Errors crossing the aggregator boundary.
///
/// Everything a provider client or the cache can fail with is folded
/// into these kinds before it leaves this crate, so transports never see
/// a raw `reqwest` or parsing error.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// The caller's location input is unusable (empty, too long).
    #[error("invalid location: {0}")]
    InvalidLocation(String),

    /// No place matches the caller's input. Reported, never retried.
    #[error("location not found: {0}")]
    LocationNotFound(String),

    /// A provider call failed. Transient; safe for the caller to retry
    /// with backoff. Not retried here — automatic retries would amplify
    /// load during a provider outage.
    #[error("upstream provider error: {0}")]
    Upstream(String),
}

impl From<GeocodeError> for WeatherError {
    fn from(e: GeocodeError) -> Self {
        match e {
            GeocodeError::NotFound(location) => Self::LocationNotFound(location),
            GeocodeError::Upstream(message) => Self::Upstream(message),
        }
    }
}

impl From<reqwest::Error> for WeatherError {
    fn from(e: reqwest::Error) -> Self {
        Self::Upstream(e.to_string())
    }
}
