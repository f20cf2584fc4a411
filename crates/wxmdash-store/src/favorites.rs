//! The favorites record: named coordinates persisted in their own JSON
//! file, independent of the credential record.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use wxmdash_core::error::StoreError;
use wxmdash_weather::Coordinate;

const FAVORITES_FILE: &str = "favorites.json";

/// A saved location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Favorite {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

impl Favorite {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::labeled(self.lat, self.lon, self.name.clone())
    }
}

/// File-backed store for favorite locations. Every mutation is persisted
/// before it returns.
#[derive(Debug)]
pub struct FavoriteStore {
    path: PathBuf,
    favorites: Vec<Favorite>,
}

impl FavoriteStore {
    /// Load the favorites record, starting empty if the file is missing.
    pub fn load(config_dir: &Path) -> Result<Self, StoreError> {
        let path = config_dir.join(FAVORITES_FILE);

        let favorites = if path.exists() {
            let json = fs::read_to_string(&path)?;
            serde_json::from_str(&json)?
        } else {
            Vec::new()
        };

        Ok(Self { path, favorites })
    }

    pub fn favorites(&self) -> &[Favorite] {
        &self.favorites
    }

    /// Add a favorite unless one already exists at exactly this coordinate
    /// (exact lat/lon equality, not distance-based). Returns the stored
    /// favorite, or `None` if it was a duplicate. An empty name gets a
    /// generated `Location {n}` placeholder.
    pub fn add(&mut self, coord: &Coordinate, name: &str) -> Result<Option<&Favorite>, StoreError> {
        let exists = self
            .favorites
            .iter()
            .any(|f| f.lat == coord.lat && f.lon == coord.lon);
        if exists {
            return Ok(None);
        }

        let name = if name.is_empty() {
            format!("Location {}", self.favorites.len() + 1)
        } else {
            name.to_string()
        };

        self.favorites.push(Favorite {
            id: Uuid::new_v4().to_string(),
            name,
            lat: coord.lat,
            lon: coord.lon,
        });
        self.save()?;

        Ok(self.favorites.last())
    }

    /// Remove exactly the favorite with this id. Returns whether anything
    /// was removed; all other favorites are untouched.
    pub fn remove(&mut self, id: &str) -> Result<bool, StoreError> {
        let before = self.favorites.len();
        self.favorites.retain(|f| f.id != id);

        if self.favorites.len() == before {
            return Ok(false);
        }

        self.save()?;
        Ok(true)
    }

    fn save(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(&self.favorites)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_coordinate_is_stored_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FavoriteStore::load(dir.path()).unwrap();
        let coord = Coordinate::new(12.34, 56.78);

        assert!(store.add(&coord, "Home").unwrap().is_some());
        assert!(store.add(&coord, "Home again").unwrap().is_none());

        assert_eq!(store.favorites().len(), 1);
        assert_eq!(store.favorites()[0].name, "Home");
    }

    #[test]
    fn nearby_but_different_coordinates_are_distinct() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FavoriteStore::load(dir.path()).unwrap();

        store.add(&Coordinate::new(12.34, 56.78), "A").unwrap();
        store.add(&Coordinate::new(12.34, 56.780001), "B").unwrap();
        assert_eq!(store.favorites().len(), 2);
    }

    #[test]
    fn remove_by_id_touches_exactly_one() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FavoriteStore::load(dir.path()).unwrap();

        let id = store
            .add(&Coordinate::new(1.0, 2.0), "First")
            .unwrap()
            .unwrap()
            .id
            .clone();
        store.add(&Coordinate::new(3.0, 4.0), "Second").unwrap();

        assert!(store.remove(&id).unwrap());
        assert_eq!(store.favorites().len(), 1);
        assert_eq!(store.favorites()[0].name, "Second");

        // Unknown id removes nothing.
        assert!(!store.remove("no-such-id").unwrap());
        assert_eq!(store.favorites().len(), 1);
    }

    #[test]
    fn blank_name_gets_a_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FavoriteStore::load(dir.path()).unwrap();

        let fav = store
            .add(&Coordinate::new(5.0, 6.0), "")
            .unwrap()
            .unwrap()
            .clone();
        assert_eq!(fav.name, "Location 1");
    }

    #[test]
    fn favorites_persist_across_reloads() {
        let dir = tempfile::tempdir().unwrap();

        {
            let mut store = FavoriteStore::load(dir.path()).unwrap();
            store.add(&Coordinate::new(12.34, 56.78), "Home").unwrap();
        }

        let reloaded = FavoriteStore::load(dir.path()).unwrap();
        assert_eq!(reloaded.favorites().len(), 1);
        assert_eq!(reloaded.favorites()[0].name, "Home");
        assert!(!reloaded.favorites()[0].id.is_empty());
    }
}
