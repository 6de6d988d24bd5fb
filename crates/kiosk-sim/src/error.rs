//! # Simulation Error Types
//!
//! Errors raised while configuring and assembling a simulated station.
//! Errors from the checkout itself stay [`CheckoutError`]s and are wrapped,
//! not flattened.

use kiosk_core::CheckoutError;
use thiserror::Error;

/// Result type alias for station setup.
pub type SimResult<T> = Result<T, SimError>;

#[derive(Debug, Error)]
pub enum SimError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// A configuration value is out of range or inconsistent.
    #[error("Invalid station configuration: {0}")]
    InvalidConfig(String),

    /// Failed to read or parse the config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to write the config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Catalog Errors
    // =========================================================================
    /// The catalog seed could not be parsed.
    #[error("Invalid catalog seed: {0}")]
    CatalogSeed(String),

    // =========================================================================
    // Core Errors
    // =========================================================================
    #[error(transparent)]
    Checkout(#[from] CheckoutError),
}

impl From<std::io::Error> for SimError {
    fn from(err: std::io::Error) -> Self {
        SimError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for SimError {
    fn from(err: toml::de::Error) -> Self {
        SimError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for SimError {
    fn from(err: toml::ser::Error) -> Self {
        SimError::ConfigSaveFailed(err.to_string())
    }
}

impl From<serde_json::Error> for SimError {
    fn from(err: serde_json::Error) -> Self {
        SimError::CatalogSeed(err.to_string())
    }
}
