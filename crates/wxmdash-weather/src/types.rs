use serde::{Deserialize, Serialize};

/// Geographic point, optionally carrying a human-readable label.
///
/// Replaced wholesale on every new selection; never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            label: None,
        }
    }

    pub fn labeled(lat: f64, lon: f64, label: impl Into<String>) -> Self {
        Self {
            lat,
            lon,
            label: Some(label.into()),
        }
    }

    /// Fixed-precision rendering used when no place name is available.
    pub fn display(&self) -> String {
        format!("{:.4}, {:.4}", self.lat, self.lon)
    }
}

/// A WeatherXM station as returned by the bounds-search endpoint.
///
/// `last_day_qod` is the provider's quality-of-data score in [0, 1];
/// `cell_index` groups stations for forecast lookups. The remaining fields
/// are a denormalized snapshot of last-known readings and tolerate absence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(rename = "lastDayQod", default)]
    pub last_day_qod: f64,
    #[serde(default)]
    pub cell_index: String,
    #[serde(default)]
    pub temperature: f64,
    #[serde(default)]
    pub humidity: f64,
    #[serde(default)]
    pub wind_speed: f64,
    #[serde(default)]
    pub wind_direction: f64,
    #[serde(default)]
    pub pressure: f64,
    #[serde(default)]
    pub conditions: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub timestamp: String,
}

impl Station {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lon)
    }
}

/// Wire shape of the bounds-search response.
#[derive(Debug, Deserialize)]
pub(crate) struct BoundsResponse {
    #[serde(default)]
    pub stations: Vec<Station>,
}

/// Wire shape of the per-station latest-observation response.
#[derive(Debug, Deserialize)]
pub(crate) struct LatestResponse {
    #[serde(default)]
    pub observation: Option<Observation>,
}

fn unknown_condition() -> String {
    "Unknown".to_string()
}

/// Normalized current-conditions record.
///
/// Every missing numeric field becomes zero and a missing condition becomes
/// `"Unknown"`; absence of a field is never an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    #[serde(default)]
    pub temperature: f64,
    #[serde(default)]
    pub humidity: f64,
    #[serde(default)]
    pub wind_speed: f64,
    #[serde(default)]
    pub wind_gust: f64,
    #[serde(default)]
    pub wind_direction: f64,
    #[serde(default)]
    pub pressure: f64,
    #[serde(default)]
    pub dew_point: f64,
    #[serde(default)]
    pub feels_like: f64,
    #[serde(default)]
    pub uv_index: f64,
    #[serde(default)]
    pub solar_irradiance: f64,
    #[serde(default)]
    pub precipitation_rate: f64,
    #[serde(default, rename = "precipitation_accumulated_daily")]
    pub precipitation_accumulated: f64,
    #[serde(default = "unknown_condition", rename = "icon")]
    pub condition: String,
    #[serde(default)]
    pub timestamp: String,
}

impl Default for Observation {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            humidity: 0.0,
            wind_speed: 0.0,
            wind_gust: 0.0,
            wind_direction: 0.0,
            pressure: 0.0,
            dew_point: 0.0,
            feels_like: 0.0,
            uv_index: 0.0,
            solar_irradiance: 0.0,
            precipitation_rate: 0.0,
            precipitation_accumulated: 0.0,
            condition: unknown_condition(),
            timestamp: String::new(),
        }
    }
}

/// One time-stamped forecast projection for a cell.
///
/// Typed with the same missing-field defaults as [`Observation`] so both
/// halves of the display share one normalization rule.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ForecastPoint {
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub temperature: f64,
    #[serde(default)]
    pub humidity: f64,
    #[serde(default)]
    pub wind_speed: f64,
    #[serde(default)]
    pub wind_direction: f64,
    #[serde(default)]
    pub precipitation: f64,
    #[serde(default)]
    pub pressure: f64,
    #[serde(default)]
    pub solar_radiation: f64,
}

/// WeatherXM Pro API errors
#[derive(Debug, thiserror::Error)]
pub enum WxmError {
    /// Non-2xx response, with the provider's message field when present.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Successful response, but no stations in the searched area.
    #[error("No weather stations found in the area")]
    NoStations,

    /// Response body was not valid JSON.
    #[error("Invalid JSON response from API: {0}")]
    Parse(String),

    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid request URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Geocoding service errors
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("Geocoding request failed with status {0}")]
    Api(u16),

    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid request URL: {0}")]
    Url(#[from] url::ParseError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observation_missing_fields_default_to_zero_and_unknown() {
        let obs: Observation = serde_json::from_str(r#"{"temperature": 21.5}"#).unwrap();
        assert_eq!(obs.temperature, 21.5);
        assert_eq!(obs.humidity, 0.0);
        assert_eq!(obs.wind_gust, 0.0);
        assert_eq!(obs.condition, "Unknown");
        assert_eq!(obs.timestamp, "");
    }

    #[test]
    fn observation_maps_provider_field_names() {
        let obs: Observation = serde_json::from_str(
            r#"{
                "wind_speed": 3.2,
                "feels_like": 18.0,
                "precipitation_accumulated_daily": 4.5,
                "icon": "partly-cloudy-day"
            }"#,
        )
        .unwrap();
        assert_eq!(obs.wind_speed, 3.2);
        assert_eq!(obs.feels_like, 18.0);
        assert_eq!(obs.precipitation_accumulated, 4.5);
        assert_eq!(obs.condition, "partly-cloudy-day");
    }

    #[test]
    fn station_tolerates_missing_snapshot_fields() {
        let station: Station = serde_json::from_str(
            r#"{"id": "st-1", "name": "Rooftop", "lat": 37.98, "lon": 23.72}"#,
        )
        .unwrap();
        assert_eq!(station.last_day_qod, 0.0);
        assert_eq!(station.cell_index, "");
        assert_eq!(station.coordinate(), Coordinate::new(37.98, 23.72));
    }

    #[test]
    fn forecast_point_missing_fields_default_to_zero() {
        let point: ForecastPoint =
            serde_json::from_str(r#"{"timestamp": "2026-08-29T12:00:00Z"}"#).unwrap();
        assert_eq!(point.temperature, 0.0);
        assert_eq!(point.solar_radiation, 0.0);
        assert_eq!(point.timestamp, "2026-08-29T12:00:00Z");
    }

    #[test]
    fn coordinate_display_is_fixed_precision() {
        let coord = Coordinate::new(37.98381, 23.72754);
        assert_eq!(coord.display(), "37.9838, 23.7275");
    }
}
