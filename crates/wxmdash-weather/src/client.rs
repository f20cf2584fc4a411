//! WeatherXM Pro API client: station discovery, latest observations, and
//! cell forecasts. One request/response round trip per call — no retries,
//! no pagination, no timeouts (a hung request is surfaced by the UI
//! spinner, not aborted here).

use std::sync::Arc;
use std::time::Instant;

use reqwest::Client;
use url::Url;

use crate::call_log::CallLogHandle;
use crate::distance::haversine_km;
use crate::types::{
    BoundsResponse, Coordinate, ForecastPoint, LatestResponse, Observation, Station, WxmError,
};

const DEFAULT_BASE_URL: &str = "https://pro.weatherxm.com/api/";
const API_KEY_HEADER: &str = "X-API-Key";

/// Half-width of the bounds search box, in degrees of latitude and
/// longitude (roughly 30 km; a deliberate approximation, not a geodesic
/// radius).
const BOUNDS_OFFSET_DEG: f64 = 0.3;

/// Stations at or below this quality-of-data score are dropped by
/// discovery. Callers wanting "high quality" generically should rely on
/// this threshold; stricter cuts are presentation policy.
pub const QUALITY_THRESHOLD: f64 = 0.9;

/// WeatherXM Pro API client
#[derive(Debug, Clone)]
pub struct WxmClient {
    base_url: Url,
    client: Arc<Client>,
    api_key: String,
    log: CallLogHandle,
}

impl WxmClient {
    /// Create a client against the production API.
    pub fn new(api_key: impl Into<String>, log: CallLogHandle) -> Result<Self, WxmError> {
        let base_url = Url::parse(DEFAULT_BASE_URL)?;
        Self::with_base_url(base_url, api_key, log)
    }

    /// Create a client against a specific gateway (also used by tests).
    pub fn with_base_url(
        base_url: Url,
        api_key: impl Into<String>,
        log: CallLogHandle,
    ) -> Result<Self, WxmError> {
        let client = Client::builder().build()?;

        Ok(Self {
            base_url,
            client: Arc::new(client),
            api_key: api_key.into(),
            log,
        })
    }

    /// Find high-quality stations near a coordinate, nearest first.
    ///
    /// Queries a fixed-size bounding box around the point, requires a
    /// non-empty station list, then filters for quality score above
    /// [`QUALITY_THRESHOLD`] and sorts ascending by great-circle distance.
    /// A raw response with zero stations is a hard [`WxmError::NoStations`]
    /// failure; a list where every station fails the quality cut returns
    /// an empty vector.
    pub async fn discover_stations(&self, coord: &Coordinate) -> Result<Vec<Station>, WxmError> {
        let min_lat = coord.lat - BOUNDS_OFFSET_DEG;
        let max_lat = coord.lat + BOUNDS_OFFSET_DEG;
        let min_lon = coord.lon - BOUNDS_OFFSET_DEG;
        let max_lon = coord.lon + BOUNDS_OFFSET_DEG;

        let params = [
            ("min_lat", min_lat.to_string()),
            ("min_lon", min_lon.to_string()),
            ("max_lat", max_lat.to_string()),
            ("max_lon", max_lon.to_string()),
        ];

        let mut url = self.base_url.join("stations/bounds")?;
        for (key, value) in &params {
            url.query_pairs_mut().append_pair(key, value);
        }

        tracing::debug!("Searching stations in bounds around {}", coord.display());
        let response = self.logged_get(url, &params).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::api_error(response).await);
        }

        // The bounds search is the one call whose body is parsed
        // explicitly, so a malformed payload surfaces as Parse rather
        // than a decode-flavored network error.
        let body = response.text().await?;
        let parsed: BoundsResponse =
            serde_json::from_str(&body).map_err(|e| WxmError::Parse(e.to_string()))?;

        if parsed.stations.is_empty() {
            return Err(WxmError::NoStations);
        }

        let mut stations: Vec<Station> = parsed
            .stations
            .into_iter()
            .filter(|s| s.last_day_qod > QUALITY_THRESHOLD)
            .collect();

        stations.sort_by(|a, b| {
            let da = haversine_km(coord, &a.coordinate());
            let db = haversine_km(coord, &b.coordinate());
            da.total_cmp(&db)
        });

        tracing::info!("Discovered {} qualifying stations", stations.len());
        Ok(stations)
    }

    /// Fetch the latest observation for a station, normalized: a missing
    /// `observation` object is treated as empty and missing fields take
    /// their defaults.
    pub async fn latest_observation(&self, station_id: &str) -> Result<Observation, WxmError> {
        let url = self
            .base_url
            .join(&format!("stations/{station_id}/latest"))?;
        let params = [("station_id", station_id.to_string())];

        tracing::debug!("Fetching latest observation for station {}", station_id);
        let response = self.logged_get(url, &params).await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let body: LatestResponse = response.json().await?;
        Ok(body.observation.unwrap_or_default())
    }

    /// Fetch the forecast time series for a cell.
    pub async fn cell_forecast(&self, cell_index: &str) -> Result<Vec<ForecastPoint>, WxmError> {
        let url = self
            .base_url
            .join(&format!("v1/cells/{cell_index}/forecast"))?;

        tracing::debug!("Fetching forecast for cell {}", cell_index);
        let response = self.logged_get(url, &[]).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(WxmError::Api {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string(),
            });
        }

        let points: Vec<ForecastPoint> = response.json().await?;
        tracing::info!("Fetched {} forecast points", points.len());
        Ok(points)
    }

    /// Send an authenticated GET, recording it in the call log with its
    /// eventual status and duration. Transport failures are recorded with
    /// no status.
    async fn logged_get(
        &self,
        url: Url,
        params: &[(&str, String)],
    ) -> Result<reqwest::Response, WxmError> {
        let log_id = self.log.lock().record_request("GET", url.as_str(), params);
        let started = Instant::now();

        let result = self
            .client
            .get(url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await;

        match result {
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

    /// Build an `Api` error from a non-2xx response, using the provider's
    /// `message` field when the body carries one.
    async fn api_error(response: reqwest::Response) -> WxmError {
        let status = response.status();
        let fallback = status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string();

        let message = response
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|body| Some(body.get("message")?.as_str()?.to_string()))
            .unwrap_or(fallback);

        WxmError::Api {
            status: status.as_u16(),
            message,
        }
    }
}
