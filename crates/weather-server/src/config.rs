//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use weather_data::{DEFAULT_FORECAST_URL, DEFAULT_GEOCODING_URL};

use crate::dispatcher::TransportMode;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Which transport this instance serves. One transport kind per
    /// process; run two processes to expose both.
    pub transport: TransportMode,
    /// Bind address for HTTP mode. Required when `transport` is HTTP.
    pub http_addr: Option<SocketAddr>,
    /// Geocoding API endpoint.
    pub geocoding_url: String,
    /// Forecast API endpoint.
    pub weather_url: String,
    /// Directory holding the location cache file.
    pub cache_dir: PathBuf,
    /// Location cache entry lifetime in days.
    pub cache_expiry_days: i64,
    /// Whether inbound calls are authenticated.
    pub auth_enabled: bool,
    /// Identity introspection endpoint. Required when auth is enabled.
    pub auth_introspect_url: Option<String>,
    /// How long an auth decision may be reused.
    pub auth_cache_ttl: Duration,
    /// How long `stop` waits for in-flight calls before aborting them.
    pub shutdown_grace: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `WEATHER_TRANSPORT` | `stdio` or `http` | `stdio` |
    /// | `WEATHER_HTTP_ADDR` | Bind address for HTTP mode | (required for http) |
    /// | `WEATHER_GEOCODING_URL` | Geocoding API endpoint | Open-Meteo |
    /// | `WEATHER_API_URL` | Forecast API endpoint | Open-Meteo |
    /// | `WEATHER_CACHE_DIR` | Location cache directory | `~/.cache/weather` |
    /// | `WEATHER_CACHE_EXPIRY_DAYS` | Cache entry lifetime | `30` |
    /// | `AUTH_ENABLED` | `true`/`false` | `true` for http, `false` for stdio |
    /// | `AUTH_INTROSPECT_URL` | Identity introspection endpoint | (required when auth on) |
    /// | `AUTH_CACHE_TTL_SECS` | Auth decision reuse window | `300` |
    /// | `WEATHER_SHUTDOWN_GRACE_SECS` | Drain deadline on stop | `10` |
    pub fn from_env() -> Result<Self, ConfigError> {
        let transport = match env::var("WEATHER_TRANSPORT")
            .unwrap_or_else(|_| "stdio".to_string())
            .to_lowercase()
            .as_str()
        {
            "stdio" => TransportMode::Stdio,
            "http" => TransportMode::Http,
            other => return Err(ConfigError::InvalidTransport(other.to_string())),
        };

        let http_addr = match env::var("WEATHER_HTTP_ADDR") {
            Ok(raw) => Some(raw.parse().map_err(|_| ConfigError::InvalidHttpAddr(raw))?),
            Err(_) => None,
        };

        let geocoding_url =
            env::var("WEATHER_GEOCODING_URL").unwrap_or_else(|_| DEFAULT_GEOCODING_URL.to_string());
        let weather_url =
            env::var("WEATHER_API_URL").unwrap_or_else(|_| DEFAULT_FORECAST_URL.to_string());

        let cache_dir = env::var("WEATHER_CACHE_DIR").map(PathBuf::from).unwrap_or_else(|_| {
            env::var("HOME")
                .map(|home| PathBuf::from(home).join(".cache").join("weather"))
                .unwrap_or_else(|_| PathBuf::from(".weather-cache"))
        });

        let cache_expiry_days = parse_env("WEATHER_CACHE_EXPIRY_DAYS", 30)?;

        let auth_enabled = match env::var("AUTH_ENABLED") {
            Ok(raw) => matches!(raw.to_lowercase().as_str(), "true" | "1" | "yes"),
            // Stdio has no credential channel, so auth defaults off
            // there and on for the network-reachable transport.
            Err(_) => transport == TransportMode::Http,
        };
        let auth_introspect_url = env::var("AUTH_INTROSPECT_URL").ok();
        let auth_cache_ttl = Duration::from_secs(parse_env("AUTH_CACHE_TTL_SECS", 300)?);

        let shutdown_grace = Duration::from_secs(parse_env("WEATHER_SHUTDOWN_GRACE_SECS", 10)?);

        Ok(Self {
            transport,
            http_addr,
            geocoding_url,
            weather_url,
            cache_dir,
            cache_expiry_days,
            auth_enabled,
            auth_introspect_url,
            auth_cache_ttl,
            shutdown_grace,
        })
    }

    /// Check the configuration is complete for the selected transport.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.transport == TransportMode::Http && self.http_addr.is_none() {
            return Err(ConfigError::MissingHttpAddr);
        }
        if self.auth_enabled {
            if self.transport == TransportMode::Stdio {
                return Err(ConfigError::AuthOnStdio);
            }
            if self.auth_introspect_url.is_none() {
                return Err(ConfigError::MissingIntrospectUrl);
            }
        }
        Ok(())
    }
}

/// Configuration errors. All fatal: the process refuses to start
/// rather than guessing.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("WEATHER_TRANSPORT must be 'stdio' or 'http', got '{0}'")]
    InvalidTransport(String),

    #[error("invalid WEATHER_HTTP_ADDR '{0}'")]
    InvalidHttpAddr(String),

    #[error("WEATHER_HTTP_ADDR is required for the http transport")]
    MissingHttpAddr,

    #[error("AUTH_INTROSPECT_URL is required when AUTH_ENABLED=true")]
    MissingIntrospectUrl,

    #[error("authentication is not supported on the stdio transport; unset AUTH_ENABLED or use http")]
    AuthOnStdio,

    #[error("invalid value for {name}: '{value}'")]
    InvalidNumber { name: &'static str, value: String },
}

fn parse_env<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidNumber {
            name,
            value: raw.clone(),
        }),
        Err(_) => Ok(default),
    }
}
