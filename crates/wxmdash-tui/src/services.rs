//! Background request plumbing between the event loop and the async clients.
//!
//! Each `request_*` function spawns a task onto the shared runtime and
//! reports its completion over a channel the event loop drains every tick.
//! Completions tied to the weather flow carry the generation tag of the
//! selection that issued them, so the store can drop stale results.

use std::sync::mpsc::Sender;

use tokio::runtime::Handle;

use wxmdash_weather::{
    Coordinate, ForecastPoint, GeoClient, GeocodeError, Observation, SearchResult, Station,
    WxmClient, WxmError,
};

/// Completion messages delivered back to the event loop.
#[derive(Debug)]
pub enum ServiceMessage {
    StationsDone {
        generation: u64,
        result: Result<Vec<Station>, WxmError>,
    },
    ObservationDone {
        generation: u64,
        result: Result<Observation, WxmError>,
    },
    ForecastDone {
        cell_index: String,
        result: Result<Vec<ForecastPoint>, WxmError>,
    },
    SearchDone(Result<Vec<SearchResult>, GeocodeError>),
    ReverseDone { lat: f64, lon: f64, name: String },
}

// Send failures below mean the receiver is gone, which only happens during
// shutdown; the results are dropped on the floor.

pub fn request_stations(
    handle: &Handle,
    tx: Sender<ServiceMessage>,
    client: WxmClient,
    generation: u64,
    coord: Coordinate,
) {
    handle.spawn(async move {
        let result = client.discover_stations(&coord).await;
        let _ = tx.send(ServiceMessage::StationsDone { generation, result });
    });
}

pub fn request_observation(
    handle: &Handle,
    tx: Sender<ServiceMessage>,
    client: WxmClient,
    generation: u64,
    station_id: String,
) {
    handle.spawn(async move {
        let result = client.latest_observation(&station_id).await;
        let _ = tx.send(ServiceMessage::ObservationDone { generation, result });
    });
}

pub fn request_forecast(
    handle: &Handle,
    tx: Sender<ServiceMessage>,
    client: WxmClient,
    cell_index: String,
) {
    handle.spawn(async move {
        let result = client.cell_forecast(&cell_index).await;
        let _ = tx.send(ServiceMessage::ForecastDone { cell_index, result });
    });
}

pub fn request_search(
    handle: &Handle,
    tx: Sender<ServiceMessage>,
    client: GeoClient,
    query: String,
) {
    handle.spawn(async move {
        let result = client.search(&query).await;
        let _ = tx.send(ServiceMessage::SearchDone(result));
    });
}

pub fn request_reverse(
    handle: &Handle,
    tx: Sender<ServiceMessage>,
    client: GeoClient,
    coord: Coordinate,
) {
    handle.spawn(async move {
        let name = client.reverse(&coord).await;
        let _ = tx.send(ServiceMessage::ReverseDone {
            lat: coord.lat,
            lon: coord.lon,
            name,
        });
    });
}
