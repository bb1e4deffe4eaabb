//! Read-through TTL cache for geocoded locations.
//!
//! Geocoding is cheap to key (a normalized location string) but
//! expensive to compute (an external HTTP lookup), so resolved
//! coordinates are kept for a long window (30 days by default) in an
//! in-memory map backed by a JSON file. Weather observations themselves
//! are never cached — they change too often to be worth it.
//!
//! The external geocoder sits behind the [`Geocoder`] trait so the cache
//! can be exercised in tests with a stub, and so the provider client
//! lives in its own crate without a dependency cycle.

mod cache;
mod geocoder;

pub use cache::{CacheStats, LocationCache, LocationCacheOptions};
pub use geocoder::{GeocodeError, Geocoder};
