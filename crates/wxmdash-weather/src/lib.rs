//! Weather data access for wxmdash
//!
//! HTTP clients for the WeatherXM Pro API (station discovery, latest
//! observations, cell forecasts) and the Nominatim geocoding service,
//! plus the shared call log every outbound request is recorded in.

pub mod call_log;
pub mod client;
pub mod distance;
pub mod geocode;
pub mod types;

pub use call_log::{new_call_log, CallLog, CallLogEntry, CallLogHandle};
pub use client::WxmClient;
pub use distance::haversine_km;
pub use geocode::{GeoClient, SearchResult};
pub use types::{Coordinate, ForecastPoint, GeocodeError, Observation, Station, WxmError};
