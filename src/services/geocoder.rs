use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::error::AppError;
use crate::models::GeoPoint;

/// Errors that can occur while resolving a place name
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("No results for {0}")]
    NoResults(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

impl From<GeocodeError> for AppError {
    fn from(err: GeocodeError) -> Self {
        AppError::GeocodeFailed(err.to_string())
    }
}

/// Best-effort text to coordinate lookup
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn resolve(&self, city: &str, area: &str) -> Result<GeoPoint, GeocodeError>;
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

/// OpenStreetMap Nominatim search client
///
/// Results are cached per (city, area) since Nominatim asks clients to
/// keep to roughly one request per second.
pub struct NominatimGeocoder {
    base_url: String,
    user_agent: String,
    client: Client,
    cache: Cache<(String, String), GeoPoint>,
}

impl NominatimGeocoder {
    pub fn new(
        base_url: String,
        user_agent: String,
        timeout: Duration,
        cache_size: u64,
        cache_ttl: Duration,
    ) -> Result<Self, GeocodeError> {
        let client = Client::builder().timeout(timeout).build()?;

        let cache = moka::future::CacheBuilder::new(cache_size)
            .time_to_live(cache_ttl)
            .build();

        Ok(Self {
            base_url,
            user_agent,
            client,
            cache,
        })
    }

    async fn search(&self, city: &str, area: &str) -> Result<GeoPoint, GeocodeError> {
        let address = format!("{}, {}", area, city);
        let url = format!(
            "{}/search?format=json&limit=1&q={}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(&address)
        );

        tracing::debug!("Geocoding {:?}", address);

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .send()
            .await?
            .error_for_status()?;

        let places: Vec<NominatimPlace> = response.json().await?;
        let place = places
            .into_iter()
            .next()
            .ok_or_else(|| GeocodeError::NoResults(address.clone()))?;

        let lat: f64 = place
            .lat
            .parse()
            .map_err(|_| GeocodeError::InvalidResponse(format!("bad latitude {:?}", place.lat)))?;
        let lon: f64 = place
            .lon
            .parse()
            .map_err(|_| GeocodeError::InvalidResponse(format!("bad longitude {:?}", place.lon)))?;

        GeoPoint::new(lat, lon).map_err(|e| GeocodeError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn resolve(&self, city: &str, area: &str) -> Result<GeoPoint, GeocodeError> {
        let key = (city.to_string(), area.to_string());
        if let Some(point) = self.cache.get(&key).await {
            tracing::trace!("Geocode cache hit: {}, {}", area, city);
            return Ok(point);
        }

        let point = self.search(city, area).await?;
        self.cache.insert(key, point).await;
        Ok(point)
    }
}
