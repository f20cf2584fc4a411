//! Centralized error types for the wxmdash application.
//!
//! Typed errors for everything the UI needs to react to precisely;
//! `user_message()` produces a display string suitable for a panel.

use thiserror::Error;

/// Top-level application error type.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Service-level errors converted to a message at the call site.
    #[error("Service error: {0}")]
    Service(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Returns a user-friendly message suitable for display in the UI.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Credential(e) => e.user_message(),
            AppError::Store(e) => e.user_message(),
            AppError::Config(_) => "Invalid configuration. Check your settings.",
            AppError::Io(_) => "A file operation failed. Please try again.",
            AppError::Service(_) => "Something went wrong. Please try again.",
            AppError::Other(_) => "An unexpected error occurred. Please try again.",
        }
    }
}

/// API credential errors. The only failure mode is shape mismatch; a
/// rejected value never reaches the network or the persisted record.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error(
        "Invalid API key format. WeatherXM Pro API keys are UUIDs \
         (e.g. 85e7123d-a2aa-41a6-9c03-7e9773d5b942)"
    )]
    InvalidFormat,
}

impl CredentialError {
    pub fn user_message(&self) -> &'static str {
        match self {
            CredentialError::InvalidFormat => {
                "API key must be a UUID like 85e7123d-a2aa-41a6-9c03-7e9773d5b942."
            }
        }
    }
}

/// Errors reading or writing the persisted JSON records.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read or write persisted state: {0}")]
    Io(#[from] std::io::Error),

    #[error("persisted state is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl StoreError {
    pub fn user_message(&self) -> &'static str {
        match self {
            StoreError::Io(_) => "Unable to access local data. Please try again.",
            StoreError::Malformed(_) => {
                "Local data may be corrupted. Consider resetting app data."
            }
        }
    }
}
