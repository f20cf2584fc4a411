pub mod config;
pub mod error;

pub use config::{ApiConfig, Config, UiConfig, ValidationResult};
pub use error::{AppError, CredentialError, StoreError};

use std::path::Path;

use anyhow::{Context, Result};

/// Initialize tracing for the application.
///
/// Output goes to a log file under the config directory rather than the
/// terminal, which the UI owns while the alternate screen is active.
pub fn init_logging(config_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(config_dir).context("Failed to create config directory")?;

    let log_path = config_dir.join("wxmdash.log");
    let log_file =
        std::fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::sync::Mutex::new(log_file))
        .with_ansi(false)
        .init();

    tracing::info!("wxmdash core initialized, logging to {}", log_path.display());
    Ok(())
}
