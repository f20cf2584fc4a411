//! The credential record: a single WeatherXM Pro API key, persisted in its
//! own JSON file under the config directory.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use wxmdash_core::error::{AppError, CredentialError, StoreError};

const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct SettingsRecord {
    api_key: Option<String>,
}

/// Check the WeatherXM Pro API key shape: 36 characters in 8-4-4-4-12
/// hexadecimal groups, case-insensitive. The value is validated exactly as
/// submitted — no trimming.
pub fn is_valid_api_key(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    if bytes.len() != 36 {
        return false;
    }
    bytes.iter().enumerate().all(|(i, b)| match i {
        8 | 13 | 18 | 23 => *b == b'-',
        _ => b.is_ascii_hexdigit(),
    })
}

/// File-backed store for the API credential.
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    api_key: Option<String>,
}

impl SettingsStore {
    /// Load the settings record, starting empty if the file is missing.
    pub fn load(config_dir: &Path) -> Result<Self, StoreError> {
        let path = config_dir.join(SETTINGS_FILE);

        let api_key = if path.exists() {
            let json = fs::read_to_string(&path)?;
            let record: SettingsRecord = serde_json::from_str(&json)?;
            record.api_key
        } else {
            None
        };

        Ok(Self { path, api_key })
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Store a new API key. A value failing the shape check is rejected
    /// with [`CredentialError::InvalidFormat`] and the previous key is
    /// retained; on success the key is persisted and immediately visible
    /// to subsequent calls.
    pub fn set_api_key(&mut self, raw: &str) -> Result<(), AppError> {
        if !is_valid_api_key(raw) {
            return Err(CredentialError::InvalidFormat.into());
        }

        self.api_key = Some(raw.to_string());
        self.save()?;
        tracing::info!("Stored API key at {:?}", self.path);
        Ok(())
    }

    fn save(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let record = SettingsRecord {
            api_key: self.api_key.clone(),
        };
        let json = serde_json::to_string_pretty(&record)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}
