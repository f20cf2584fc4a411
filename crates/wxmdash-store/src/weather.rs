//! Orchestration state for the discovery → observation flow.
//!
//! Selecting a coordinate runs station discovery; a successful discovery
//! auto-selects the nearest qualifying station and continues into the
//! observation fetch, whose completion is the terminal transition. A
//! generation counter guards against overlapping flows: completions
//! carrying a stale generation are dropped rather than overwriting newer
//! state. In-flight requests are never cancelled.

use wxmdash_weather::{Coordinate, Observation, Station, WxmError};

/// Lifecycle of the current location's weather flow.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Ready,
    Error(String),
}

/// Shown when discovery succeeds but yields no usable station. Fixed text,
/// independent of the pipeline's own `NoStations` message.
pub const NO_STATIONS_MESSAGE: &str = "No weather stations found in your area";

#[derive(Debug, Default)]
pub struct WeatherStore {
    phase: Phase,
    generation: u64,
    selected_location: Option<Coordinate>,
    stations: Vec<Station>,
    selected_station: Option<Station>,
    observation: Option<Observation>,
}

impl WeatherStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    pub fn selected_location(&self) -> Option<&Coordinate> {
        self.selected_location.as_ref()
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn selected_station(&self) -> Option<&Station> {
        self.selected_station.as_ref()
    }

    pub fn observation(&self) -> Option<&Observation> {
        self.observation.as_ref()
    }

    /// Begin the discovery flow for a new coordinate: clears any prior
    /// error and result, records the coordinate, and transitions to
    /// Loading. Returns the generation tag the eventual completions must
    /// carry.
    pub fn select_location(&mut self, coord: Coordinate) -> u64 {
        self.generation += 1;
        self.phase = Phase::Loading;
        self.selected_location = Some(coord);
        self.stations.clear();
        self.selected_station = None;
        self.observation = None;
        self.generation
    }

    /// Apply a discovery completion. Returns the auto-selected (nearest
    /// qualifying) station when the flow should continue into the
    /// observation fetch; `None` in every terminal or stale case.
    ///
    /// Both "no stations in the area" shapes (an empty qualifying list and
    /// the pipeline's own `NoStations` failure) end in the store's fixed
    /// message; other errors keep their own text.
    pub fn apply_stations(
        &mut self,
        generation: u64,
        result: Result<Vec<Station>, WxmError>,
    ) -> Option<Station> {
        if generation != self.generation {
            tracing::debug!(
                "Dropping stale discovery completion (gen {} != {})",
                generation,
                self.generation
            );
            return None;
        }

        match result {
            Ok(stations) if !stations.is_empty() => {
                let first = stations[0].clone();
                self.stations = stations;
                self.selected_station = Some(first.clone());
                Some(first)
            }
            Ok(_) | Err(WxmError::NoStations) => {
                self.phase = Phase::Error(NO_STATIONS_MESSAGE.to_string());
                None
            }
            Err(e) => {
                self.phase = Phase::Error(e.to_string());
                None
            }
        }
    }

    /// User override: fetch the observation for a specific station,
    /// bypassing discovery. Returns the new generation tag.
    pub fn select_station(&mut self, station: Station) -> u64 {
        self.generation += 1;
        self.phase = Phase::Loading;
        self.selected_station = Some(station);
        self.observation = None;
        self.generation
    }

    /// Terminal transition of the flow: Ready on success, Error on
    /// failure. Stale completions are dropped.
    pub fn apply_observation(&mut self, generation: u64, result: Result<Observation, WxmError>) {
        if generation != self.generation {
            tracing::debug!(
                "Dropping stale observation completion (gen {} != {})",
                generation,
                self.generation
            );
            return;
        }

        match result {
            Ok(observation) => {
                self.observation = Some(observation);
                self.phase = Phase::Ready;
            }
            Err(e) => {
                self.phase = Phase::Error(e.to_string());
            }
        }
    }
}
