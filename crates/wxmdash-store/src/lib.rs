//! Local state for wxmdash
//!
//! Two persisted JSON records (API credential, favorite locations) and the
//! in-memory state machine driving the discovery → observation flow.

pub mod favorites;
pub mod settings;
pub mod weather;

pub use favorites::{Favorite, FavoriteStore};
pub use settings::{is_valid_api_key, SettingsStore};
pub use weather::{Phase, WeatherStore, NO_STATIONS_MESSAGE};
