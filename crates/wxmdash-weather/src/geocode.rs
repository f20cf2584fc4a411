//! Forward and reverse geocoding via Nominatim (OpenStreetMap).
//! Free, no API key required — only a User-Agent identifying the client.

use std::sync::Arc;
use std::time::Instant;

use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::call_log::CallLogHandle;
use crate::types::{Coordinate, GeocodeError};

const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org/";

/// Forward searches are capped at this many hits.
const SEARCH_LIMIT: &str = "5";

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    display_name: String,
    // Nominatim returns coordinates as decimal strings
    lat: String,
    lon: String,
}

#[derive(Debug, Deserialize)]
struct NominatimReverse {
    display_name: Option<String>,
}

/// A forward-geocoding hit, with coordinates already parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub display_name: String,
    pub lat: f64,
    pub lon: f64,
}

impl SearchResult {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::labeled(self.lat, self.lon, self.display_name.clone())
    }
}

/// Nominatim client
#[derive(Debug, Clone)]
pub struct GeoClient {
    base_url: Url,
    client: Arc<Client>,
    log: CallLogHandle,
}

impl GeoClient {
    /// Create a client against the public Nominatim instance.
    pub fn new(user_agent: &str, log: CallLogHandle) -> Result<Self, GeocodeError> {
        let base_url = Url::parse(DEFAULT_BASE_URL)?;
        Self::with_base_url(base_url, user_agent, log)
    }

    /// Create a client against a specific instance (also used by tests).
    pub fn with_base_url(
        base_url: Url,
        user_agent: &str,
        log: CallLogHandle,
    ) -> Result<Self, GeocodeError> {
        let client = Client::builder().user_agent(user_agent).build()?;

        Ok(Self {
            base_url,
            client: Arc::new(client),
            log,
        })
    }

    /// Free-text place search, capped at 5 results. Hits whose coordinate
    /// strings fail to parse are dropped.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>, GeocodeError> {
        let mut url = self.base_url.join("search")?;
        url.query_pairs_mut()
            .append_pair("format", "json")
            .append_pair("q", query)
            .append_pair("limit", SEARCH_LIMIT);

        let params = [
            ("q", query.to_string()),
            ("limit", SEARCH_LIMIT.to_string()),
        ];

        let response = self.logged_get(url, &params).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Api(status.as_u16()));
        }

        let places: Vec<NominatimPlace> = response.json().await?;
        let results: Vec<SearchResult> = places
            .into_iter()
            .filter_map(|place| {
                let lat = place.lat.parse().ok()?;
                let lon = place.lon.parse().ok()?;
                Some(SearchResult {
                    display_name: place.display_name,
                    lat,
                    lon,
                })
            })
            .collect();

        tracing::info!("Geocode search for {:?} returned {} hits", query, results.len());
        Ok(results)
    }

    /// Best-effort display name for a coordinate. Falls back to a
    /// fixed-precision numeric rendering on any failure; the caller never
    /// sees a reverse-lookup error.
    pub async fn reverse(&self, coord: &Coordinate) -> String {
        match self.try_reverse(coord).await {
            Ok(Some(name)) => {
                tracing::info!("Reverse geocoded to: {}", name);
                name
            }
            Ok(None) => coord.display(),
            Err(e) => {
                tracing::debug!("Reverse geocode failed: {}", e);
                coord.display()
            }
        }
    }

    async fn try_reverse(&self, coord: &Coordinate) -> Result<Option<String>, GeocodeError> {
        let mut url = self.base_url.join("reverse")?;
        url.query_pairs_mut()
            .append_pair("format", "json")
            .append_pair("lat", &coord.lat.to_string())
            .append_pair("lon", &coord.lon.to_string());

        let params = [
            ("lat", coord.lat.to_string()),
            ("lon", coord.lon.to_string()),
        ];

        let response = self.logged_get(url, &params).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Api(status.as_u16()));
        }

        let body: NominatimReverse = response.json().await?;
        Ok(body.display_name)
    }

    async fn logged_get(
        &self,
        url: Url,
        params: &[(&str, String)],
    ) -> Result<reqwest::Response, GeocodeError> {
        let log_id = self.log.lock().record_request("GET", url.as_str(), params);
        let started = Instant::now();

        match self.client.get(url).send().await {
            Ok(response) => {
                self.log.lock().record_completion(
                    log_id,
                    Some(response.status().as_u16()),
                    started.elapsed(),
                );
                Ok(response)
            }
            Err(e) => {
                self.log
                    .lock()
                    .record_completion(log_id, None, started.elapsed());
                Err(e.into())
            }
        }
    }
}
