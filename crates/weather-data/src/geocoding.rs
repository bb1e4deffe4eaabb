//! Open-Meteo geocoding client.

use std::time::Duration;

use async_trait::async_trait;
use location_cache::{GeocodeError, Geocoder};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};
use weather_core::{LocationQuery, ResolvedLocation};

use crate::error::WeatherError;

/// Open-Meteo geocoding search endpoint (free, no API key).
pub const DEFAULT_GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";

/// How many candidates to request so qualifier filtering has material
/// to work with.
const CANDIDATE_COUNT: u32 = 10;

#[derive(Debug, Deserialize)]
struct GeoResponse {
    #[serde(default)]
    results: Option<Vec<GeoCandidate>>,
}

/// One candidate from the geocoding provider, in provider ranking order.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GeoCandidate {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub country: Option<String>,
    /// First-level administrative area (state/province).
    #[serde(default)]
    pub admin1: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
}

impl GeoCandidate {
    fn into_resolved(self) -> ResolvedLocation {
        ResolvedLocation {
            latitude: self.latitude,
            longitude: self.longitude,
            name: self.name,
            country: self.country.unwrap_or_default(),
            timezone: self.timezone.unwrap_or_else(|| "auto".to_string()),
        }
    }
}

/// Pick the best candidate for a parsed query.
///
/// The query is sent as the bare city name, so disambiguation happens
/// here: a US-state qualifier selects the first candidate whose name and
/// admin1 both match; a country qualifier selects the first candidate
/// with matching name and country, then any candidate in that country.
/// Without qualifiers — or when filtering eliminates everything — the
/// provider's first-ranked result wins.
pub(crate) fn select_candidate<'a>(
    query: &LocationQuery,
    results: &'a [GeoCandidate],
) -> &'a GeoCandidate {
    let city = query.city.to_lowercase();

    if query.is_us() {
        if let Some(region) = query.region.as_deref() {
            let region_lower = region.to_lowercase();
            let full_lower = query.region_full_name().map(str::to_lowercase);
            for r in results {
                let r_admin1 = r.admin1.as_deref().unwrap_or_default().to_lowercase();
                let r_country = r.country.as_deref().unwrap_or_default().to_lowercase();
                let state_matches = full_lower
                    .as_deref()
                    .is_some_and(|full| r_admin1.contains(full))
                    || r_admin1.contains(&region_lower);
                if r.name.to_lowercase() == city
                    && r_country.contains("united states")
                    && state_matches
                {
                    return r;
                }
            }
            return &results[0];
        }
    }

    if let Some(country) = query.country.as_deref() {
        let country_lower = country.to_lowercase();
        let country_matches = |r: &GeoCandidate| {
            let r_country = r.country.as_deref().unwrap_or_default().to_lowercase();
            if query.is_us() {
                r_country.contains("united states")
            } else {
                // Bidirectional substring match tolerates provider
                // spellings like "United Kingdom" vs "UK of Great
                // Britain and Northern Ireland".
                r_country.contains(&country_lower) || country_lower.contains(&r_country)
            }
        };

        if let Some(exact) = results
            .iter()
            .find(|r| r.name.to_lowercase() == city && country_matches(r))
        {
            return exact;
        }
        if let Some(in_country) = results.iter().find(|r| country_matches(r)) {
            return in_country;
        }
    }

    &results[0]
}

/// HTTP client for the Open-Meteo geocoding API.
pub struct GeocodingClient {
    http: Client,
    url: String,
}

impl GeocodingClient {
    pub fn new(url: impl Into<String>) -> Result<Self, WeatherError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }
}

#[async_trait]
impl Geocoder for GeocodingClient {
    async fn geocode(&self, location: &str) -> Result<ResolvedLocation, GeocodeError> {
        let query = LocationQuery::parse(location);
        debug!(
            city = %query.city,
            region = ?query.region,
            country = ?query.country,
            "geocoding query"
        );

        let count = CANDIDATE_COUNT.to_string();
        let response = self
            .http
            .get(&self.url)
            .query(&[
                ("name", query.city.as_str()),
                ("count", count.as_str()),
                ("language", "en"),
                ("format", "json"),
            ])
            .send()
            .await
            .map_err(|e| GeocodeError::Upstream(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "geocoding API returned an error status");
            return Err(GeocodeError::Upstream(format!(
                "geocoding API returned HTTP {status}"
            )));
        }

        let body: GeoResponse = response
            .json()
            .await
            .map_err(|e| GeocodeError::Upstream(e.to_string()))?;

        let results = body.results.unwrap_or_default();
        if results.is_empty() {
            warn!(location, "geocoding returned no results");
            return Err(GeocodeError::NotFound(location.to_string()));
        }

        let chosen = select_candidate(&query, &results).clone();
        info!(
            location,
            name = %chosen.name,
            country = chosen.country.as_deref().unwrap_or(""),
            latitude = chosen.latitude,
            longitude = chosen.longitude,
            "geocoded location"
        );
        Ok(chosen.into_resolved())
    }
}
