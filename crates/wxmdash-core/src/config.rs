use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory
    pub config_dir: PathBuf,

    /// External service endpoints
    #[serde(default)]
    pub api: ApiConfig,

    /// UI preferences
    #[serde(default)]
    pub ui: UiConfig,
}

/// External service endpoints and identification.
///
/// The API key is deliberately not part of this file; it lives in its own
/// persisted record managed by the settings store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL for the WeatherXM Pro API
    pub weather_base_url: String,

    /// Base URL for the Nominatim geocoding service
    pub geocode_base_url: String,

    /// User-Agent sent to the geocoding service (Nominatim requires one)
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            weather_base_url: "https://pro.weatherxm.com/api/".to_string(),
            geocode_base_url: "https://nominatim.openstreetmap.org/".to_string(),
            user_agent: "wxmdash/0.1 (terminal weather dashboard)".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// UI tick interval in milliseconds (spinner, message draining)
    pub tick_ms: u64,

    /// Maximum number of forecast rows shown in the table
    pub forecast_rows: u16,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_ms: 250,
            forecast_rows: 24,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("wxmdash");

        Self {
            config_dir,
            api: ApiConfig::default(),
            ui: UiConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let contents =
            std::fs::read_to_string(&config_path).context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        if !validation.warnings.is_empty() {
            for warning in &validation.warnings {
                tracing::warn!("Config warning: {}", warning);
            }
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    ///
    /// Returns a ValidationResult containing any errors or warnings.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(
            &self.api.weather_base_url,
            "api.weather_base_url",
            &mut result,
        );
        self.validate_url(
            &self.api.geocode_base_url,
            "api.geocode_base_url",
            &mut result,
        );

        // Nominatim's usage policy rejects anonymous clients
        if self.api.user_agent.is_empty() {
            result.add_error("api.user_agent", "User-Agent must not be empty");
        }

        if self.ui.tick_ms == 0 {
            result.add_error("ui.tick_ms", "Tick interval must be greater than 0");
        } else if self.ui.tick_ms > 5000 {
            result.add_warning("ui.tick_ms", "Tick interval over 5s makes the UI sluggish");
        }

        if self.ui.forecast_rows == 0 {
            result.add_warning("ui.forecast_rows", "Forecast table is disabled (0 rows)");
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }

                // Endpoint paths are joined onto the base; a missing
                // trailing slash silently drops the last path segment.
                if !url.path().ends_with('/') {
                    result.add_warning(
                        field_name,
                        "Base URL should end with a trailing slash",
                    );
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(&config_path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("wxmdash");

        Ok(config_dir.join("config.toml"))
    }
}
