//! Weather tool service entry point.

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use auth_gate::{AuthGate, HttpIntrospector};
use location_cache::{LocationCache, LocationCacheOptions};
use tool_registry::ToolRegistry;
use weather_data::{ForecastClient, GeocodingClient, WeatherService};

use weather_server::config::Config;
use weather_server::dispatcher::{Dispatcher, DispatcherState, TransportMode};
use weather_server::state::AppState;
use weather_server::tools;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    // Logs go to stderr unconditionally: in stdio mode stdout belongs
    // to the protocol.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;
    config.validate()?;
    log_startup(&config);

    // Business pipeline, wired bottom-up and injected explicitly.
    let geocoder = Arc::new(GeocodingClient::new(&config.geocoding_url)?);
    if let Err(e) = tokio::fs::create_dir_all(&config.cache_dir).await {
        error!(dir = %config.cache_dir.display(), error = %e, "cannot create cache directory");
    }
    let cache = Arc::new(
        LocationCache::open(
            geocoder,
            LocationCacheOptions {
                expiry_days: config.cache_expiry_days,
                persist_path: Some(config.cache_dir.join("location_cache.json")),
            },
        )
        .await,
    );
    let forecast = Arc::new(ForecastClient::new(&config.weather_url)?);
    let service = Arc::new(WeatherService::new(cache, forecast));

    let mut registry = ToolRegistry::new();
    tools::register_tools(&mut registry, service)?;
    info!(tools = ?registry.list_tools(), "tools registered");

    let auth = if config.auth_enabled {
        // validate() guarantees the URL is present here.
        let url = config
            .auth_introspect_url
            .clone()
            .ok_or("AUTH_INTROSPECT_URL missing after validation")?;
        Arc::new(AuthGate::new(
            Arc::new(HttpIntrospector::new(url)?),
            config.auth_cache_ttl,
        ))
    } else {
        Arc::new(AuthGate::disabled())
    };

    let app_state = AppState::new(Arc::new(registry), auth);
    let mut dispatcher = Dispatcher::new(app_state);
    let mut status = dispatcher.subscribe();
    dispatcher.start(config.transport, config.http_addr).await?;

    // Run until interrupted, or until the transport ends on its own
    // (stdio EOF when the client disconnects).
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                error!(error = %e, "failed to listen for shutdown signal");
            }
            info!("shutdown requested");
        }
        _ = async {
            while status.changed().await.is_ok() {
                if *status.borrow() == DispatcherState::Stopped {
                    break;
                }
            }
        } => {
            info!("transport closed");
        }
    }

    dispatcher.stop(config.shutdown_grace).await;
    info!("weather server stopped");
    Ok(())
}

fn log_startup(config: &Config) {
    info!(
        transport = ?config.transport,
        addr = ?config.http_addr,
        "starting weather server"
    );
    info!(
        geocoding = %config.geocoding_url,
        weather = %config.weather_url,
        "provider endpoints"
    );
    info!(
        dir = %config.cache_dir.display(),
        expiry_days = config.cache_expiry_days,
        "location cache"
    );
    if config.transport == TransportMode::Http && config.auth_enabled {
        // The disabled case logs its own warning in AuthGate::disabled.
        info!(
            introspect = config.auth_introspect_url.as_deref().unwrap_or(""),
            ttl_secs = config.auth_cache_ttl.as_secs(),
            "authentication enabled"
        );
    }
}
