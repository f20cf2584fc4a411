//! Application state and key handling for the dashboard.
//!
//! The event loop owns one [`App`]; every key press mutates it directly and
//! every completed background request is applied through
//! [`App::drain_messages`]. Nothing here blocks on the network.

use std::sync::mpsc::{self, Receiver, Sender};

use anyhow::{Context, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::runtime::Handle;
use url::Url;

use wxmdash_core::Config;
use wxmdash_store::{FavoriteStore, SettingsStore, WeatherStore};
use wxmdash_weather::{
    new_call_log, CallLogHandle, Coordinate, ForecastPoint, GeoClient, SearchResult, Station,
    WxmClient, WxmError,
};

use crate::services::{self, ServiceMessage};

/// Panels reachable with Tab / Shift-Tab, in cycle order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Search,
    Favorites,
    Stations,
    CallLog,
    Settings,
}

impl Panel {
    pub fn next(self) -> Self {
        match self {
            Panel::Search => Panel::Favorites,
            Panel::Favorites => Panel::Stations,
            Panel::Stations => Panel::CallLog,
            Panel::CallLog => Panel::Settings,
            Panel::Settings => Panel::Search,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Panel::Search => Panel::Settings,
            Panel::Favorites => Panel::Search,
            Panel::Stations => Panel::Favorites,
            Panel::CallLog => Panel::Stations,
            Panel::Settings => Panel::CallLog,
        }
    }
}

/// Forecast panel lifecycle, tracked separately from the observation flow
/// because the forecast loads in parallel and may fail independently.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ForecastState {
    #[default]
    Idle,
    Loading,
    Ready(Vec<ForecastPoint>),
    Error(String),
}

pub struct App {
    pub config: Config,
    handle: Handle,
    tx: Sender<ServiceMessage>,
    rx: Receiver<ServiceMessage>,

    pub settings: SettingsStore,
    pub favorites: FavoriteStore,
    pub weather: WeatherStore,
    pub geo: GeoClient,
    pub wxm: Option<WxmClient>,
    pub call_log: CallLogHandle,

    pub focus: Panel,
    pub search_input: String,
    pub search_results: Vec<SearchResult>,
    pub search_selected: usize,
    pub favorites_selected: usize,
    pub stations_selected: usize,
    pub key_input: String,
    pub forecast: ForecastState,
    /// Place name for the selected location, from the search hit or the
    /// reverse lookup.
    pub location_label: Option<String>,
    pub status: Option<String>,
    pub tick: u64,
    pub should_quit: bool,
}

impl App {
    pub fn new(config: Config, handle: Handle) -> Result<Self> {
        let settings =
            SettingsStore::load(&config.config_dir).context("Failed to load settings")?;
        let favorites =
            FavoriteStore::load(&config.config_dir).context("Failed to load favorites")?;
        let call_log = new_call_log();

        let geo_base =
            Url::parse(&config.api.geocode_base_url).context("Invalid geocode base URL")?;
        let geo = GeoClient::with_base_url(geo_base, &config.api.user_agent, call_log.clone())
            .context("Failed to build geocoding client")?;

        let wxm = match settings.api_key() {
            Some(key) => Some(
                build_weather_client(&config, key, call_log.clone())
                    .context("Failed to build weather client")?,
            ),
            None => None,
        };

        // Without a credential the only useful panel is Settings.
        let focus = if wxm.is_some() {
            Panel::Search
        } else {
            Panel::Settings
        };

        let (tx, rx) = mpsc::channel();

        Ok(Self {
            config,
            handle,
            tx,
            rx,
            settings,
            favorites,
            weather: WeatherStore::new(),
            geo,
            wxm,
            call_log,
            focus,
            search_input: String::new(),
            search_results: Vec::new(),
            search_selected: 0,
            favorites_selected: 0,
            stations_selected: 0,
            key_input: String::new(),
            forecast: ForecastState::Idle,
            location_label: None,
            status: None,
            should_quit: false,
            tick: 0,
        })
    }

    pub fn on_tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    /// Apply every completed background request waiting on the channel.
    pub fn drain_messages(&mut self) {
        while let Ok(message) = self.rx.try_recv() {
            self.apply_message(message);
        }
    }

    fn apply_message(&mut self, message: ServiceMessage) {
        match message {
            ServiceMessage::StationsDone { generation, result } => {
                let next = self.weather.apply_stations(generation, result);
                self.stations_selected = 0;
                if let (Some(station), Some(client)) = (next, self.wxm.clone()) {
                    services::request_observation(
                        &self.handle,
                        self.tx.clone(),
                        client.clone(),
                        generation,
                        station.id.clone(),
                    );
                    self.load_forecast(&station, client);
                }
            }
            ServiceMessage::ObservationDone { generation, result } => {
                self.weather.apply_observation(generation, result);
            }
            ServiceMessage::ForecastDone { cell_index, result } => {
                let current = self
                    .weather
                    .selected_station()
                    .map(|s| s.cell_index.clone());
                if current.as_deref() != Some(cell_index.as_str()) {
                    tracing::debug!("Dropping forecast for deselected cell {}", cell_index);
                    return;
                }
                self.forecast = match result {
                    Ok(points) => ForecastState::Ready(points),
                    Err(e) => ForecastState::Error(e.to_string()),
                };
            }
            ServiceMessage::SearchDone(result) => match result {
                Ok(results) => {
                    if results.is_empty() {
                        self.status = Some("No places found".to_string());
                    } else {
                        self.status = None;
                    }
                    self.search_results = results;
                    self.search_selected = 0;
                }
                Err(e) => self.status = Some(e.to_string()),
            },
            ServiceMessage::ReverseDone { lat, lon, name } => {
                let matches = self
                    .weather
                    .selected_location()
                    .map(|c| c.lat == lat && c.lon == lon)
                    .unwrap_or(false);
                if matches {
                    self.location_label = Some(name);
                }
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match key.code {
            KeyCode::Tab => {
                self.focus = self.focus.next();
                return;
            }
            KeyCode::BackTab => {
                self.focus = self.focus.prev();
                return;
            }
            _ => {}
        }

        match self.focus {
            Panel::Search => self.handle_search_key(key),
            Panel::Favorites => self.handle_favorites_key(key),
            Panel::Stations => self.handle_stations_key(key),
            Panel::CallLog => self.handle_call_log_key(key),
            Panel::Settings => self.handle_settings_key(key),
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(c) => {
                self.search_input.push(c);
                self.search_results.clear();
                self.search_selected = 0;
            }
            KeyCode::Backspace => {
                self.search_input.pop();
                self.search_results.clear();
                self.search_selected = 0;
            }
            KeyCode::Esc => {
                if self.search_input.is_empty() && self.search_results.is_empty() {
                    self.should_quit = true;
                } else {
                    self.search_input.clear();
                    self.search_results.clear();
                    self.search_selected = 0;
                }
            }
            KeyCode::Down => {
                if !self.search_results.is_empty() {
                    self.search_selected =
                        (self.search_selected + 1) % self.search_results.len();
                }
            }
            KeyCode::Up => {
                if !self.search_results.is_empty() {
                    self.search_selected = self
                        .search_selected
                        .checked_sub(1)
                        .unwrap_or(self.search_results.len() - 1);
                }
            }
            KeyCode::Enter => self.submit_search(),
            _ => {}
        }
    }

    /// Enter in the search panel: pick the highlighted geocode hit if there
    /// is one, otherwise try the input as a raw `lat, lon` pair, otherwise
    /// run a place search.
    fn submit_search(&mut self) {
        if let Some(hit) = self.search_results.get(self.search_selected) {
            let coord = hit.coordinate();
            self.select_coordinate(coord);
        } else if let Some(coord) = parse_coordinate(&self.search_input) {
            self.select_coordinate(coord);
        } else if !self.search_input.trim().is_empty() {
            self.status = Some(format!("Searching for \"{}\"...", self.search_input.trim()));
            services::request_search(
                &self.handle,
                self.tx.clone(),
                self.geo.clone(),
                self.search_input.trim().to_string(),
            );
        }
    }

    /// Kick off the discovery flow for a coordinate. Requires a configured
    /// weather client; without one the user is sent to Settings.
    pub fn select_coordinate(&mut self, coord: Coordinate) {
        let Some(client) = self.wxm.clone() else {
            self.status = Some("Set your WeatherXM Pro API key first".to_string());
            self.focus = Panel::Settings;
            return;
        };

        self.status = None;
        self.forecast = ForecastState::Idle;
        self.location_label = coord.label.clone();
        self.stations_selected = 0;

        let generation = self.weather.select_location(coord.clone());
        if self.location_label.is_none() {
            services::request_reverse(
                &self.handle,
                self.tx.clone(),
                self.geo.clone(),
                coord.clone(),
            );
        }
        services::request_stations(&self.handle, self.tx.clone(), client, generation, coord);
    }

    fn handle_favorites_key(&mut self, key: KeyEvent) {
        let count = self.favorites.favorites().len();
        match key.code {
            KeyCode::Down if count > 0 => {
                self.favorites_selected = (self.favorites_selected + 1) % count;
            }
            KeyCode::Up if count > 0 => {
                self.favorites_selected =
                    self.favorites_selected.checked_sub(1).unwrap_or(count - 1);
            }
            KeyCode::Enter => {
                if let Some(favorite) = self.favorites.favorites().get(self.favorites_selected) {
                    let coord = favorite.coordinate();
                    self.select_coordinate(coord);
                }
            }
            KeyCode::Char('a') => self.save_current_favorite(),
            KeyCode::Char('d') | KeyCode::Delete => self.remove_selected_favorite(),
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            _ => {}
        }
    }

    fn save_current_favorite(&mut self) {
        let Some(coord) = self.weather.selected_location().cloned() else {
            self.status = Some("No location selected".to_string());
            return;
        };
        let name = self
            .location_label
            .clone()
            .or(coord.label.clone())
            .unwrap_or_default();

        match self.favorites.add(&coord, &name) {
            Ok(Some(favorite)) => self.status = Some(format!("Saved \"{}\"", favorite.name)),
            Ok(None) => self.status = Some("Already in favorites".to_string()),
            Err(e) => self.status = Some(e.to_string()),
        }
    }

    fn remove_selected_favorite(&mut self) {
        let Some(id) = self
            .favorites
            .favorites()
            .get(self.favorites_selected)
            .map(|f| f.id.clone())
        else {
            return;
        };

        match self.favorites.remove(&id) {
            Ok(true) => {
                let count = self.favorites.favorites().len();
                if self.favorites_selected >= count && count > 0 {
                    self.favorites_selected = count - 1;
                }
            }
            Ok(false) => {}
            Err(e) => self.status = Some(e.to_string()),
        }
    }

    fn handle_stations_key(&mut self, key: KeyEvent) {
        let count = self.weather.stations().len();
        match key.code {
            KeyCode::Down if count > 0 => {
                self.stations_selected = (self.stations_selected + 1) % count;
            }
            KeyCode::Up if count > 0 => {
                self.stations_selected =
                    self.stations_selected.checked_sub(1).unwrap_or(count - 1);
            }
            KeyCode::Enter => {
                if let Some(station) = self.weather.stations().get(self.stations_selected) {
                    let station = station.clone();
                    self.select_station(station);
                }
            }
            KeyCode::Char(c @ '1'..='5') => {
                let index = (c as usize) - ('1' as usize);
                let pick = quick_picks(self.weather.stations())
                    .get(index)
                    .map(|s| (*s).clone());
                if let Some(station) = pick {
                    self.select_station(station);
                }
            }
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            _ => {}
        }
    }

    /// User override: refresh observation and forecast for this station
    /// without re-running discovery.
    fn select_station(&mut self, station: Station) {
        let Some(client) = self.wxm.clone() else {
            return;
        };

        let generation = self.weather.select_station(station.clone());
        services::request_observation(
            &self.handle,
            self.tx.clone(),
            client.clone(),
            generation,
            station.id.clone(),
        );
        self.load_forecast(&station, client);
    }

    fn load_forecast(&mut self, station: &Station, client: WxmClient) {
        if station.cell_index.is_empty() {
            self.forecast = ForecastState::Idle;
            return;
        }
        self.forecast = ForecastState::Loading;
        services::request_forecast(
            &self.handle,
            self.tx.clone(),
            client,
            station.cell_index.clone(),
        );
    }

    fn handle_call_log_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('c') => self.call_log.lock().clear(),
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            _ => {}
        }
    }

    fn handle_settings_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(c) => self.key_input.push(c),
            KeyCode::Backspace => {
                self.key_input.pop();
            }
            KeyCode::Esc => {
                if self.key_input.is_empty() {
                    self.should_quit = true;
                } else {
                    self.key_input.clear();
                }
            }
            KeyCode::Enter => self.apply_api_key(),
            _ => {}
        }
    }

    /// Validate and persist the entered key, then swap in a client built
    /// with it. A rejected key leaves the previous client untouched.
    fn apply_api_key(&mut self) {
        let raw = self.key_input.clone();
        if let Err(e) = self.settings.set_api_key(&raw) {
            self.status = Some(e.user_message().to_string());
            return;
        }

        match build_weather_client(&self.config, &raw, self.call_log.clone()) {
            Ok(client) => {
                self.wxm = Some(client);
                self.key_input.clear();
                self.status = Some("API key saved".to_string());
                self.focus = Panel::Search;
            }
            Err(e) => self.status = Some(e.to_string()),
        }
    }
}

fn build_weather_client(
    config: &Config,
    api_key: &str,
    log: CallLogHandle,
) -> Result<WxmClient, WxmError> {
    let base_url = Url::parse(&config.api.weather_base_url)?;
    WxmClient::with_base_url(base_url, api_key, log)
}

/// Parse free-form input as a `lat, lon` pair. Both parts must be plain
/// decimal numbers in range; anything else falls through to place search.
pub fn parse_coordinate(input: &str) -> Option<Coordinate> {
    let (lat, lon) = input.split_once(',')?;
    let lat: f64 = lat.trim().parse().ok()?;
    let lon: f64 = lon.trim().parse().ok()?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return None;
    }
    Some(Coordinate::new(lat, lon))
}

/// Stations offered as one-key picks: perfect quality score only, capped
/// at five. The list is already sorted nearest-first by discovery.
pub fn quick_picks(stations: &[Station]) -> Vec<&Station> {
    stations
        .iter()
        .filter(|s| s.last_day_qod == 1.0)
        .take(5)
        .collect()
}
