//! # kiosk-sim: Simulated Self-Checkout Station
//!
//! Simulated devices, an in-memory catalog and station configuration for
//! running `kiosk-core` without hardware.
//!
//! ## Module Organization
//! - [`config`] - Station configuration (TOML, environment, defaults)
//! - [`error`] - Setup error types
//! - [`scanner`] - Barcode scanner
//! - [`scale`] - Bagging-area scale
//! - [`cash`] - Validators, storage units and reject sinks
//! - [`catalog`] - In-memory product catalog
//! - [`station`] - Builds a ready [`kiosk_core::Checkout`]
//!
//! ## Quick Start
//! ```rust,no_run
//! use kiosk_sim::{init_tracing, InMemoryCatalog, SimulatedStation, StationConfig};
//!
//! init_tracing();
//! let config = StationConfig::load(None)?;
//! let station = SimulatedStation::from_config(&config)?;
//! let checkout = station.open_checkout(InMemoryCatalog::new())?;
//! # Ok::<(), kiosk_sim::SimError>(())
//! ```

use tracing_subscriber::EnvFilter;

pub mod cash;
pub mod catalog;
pub mod config;
pub mod error;
pub mod scale;
pub mod scanner;
pub mod station;

pub use cash::{
    BanknoteSlot, BanknoteStorageUnit, BanknoteValidator, CoinStorageUnit, CoinTray,
    CoinValidator, SimulatedCashUnits, Storage,
};
pub use catalog::InMemoryCatalog;
pub use config::StationConfig;
pub use error::{SimError, SimResult};
pub use scale::SimulatedScale;
pub use scanner::SimulatedScanner;
pub use station::{SimulatedCheckout, SimulatedStation};

/// Installs the global `tracing` subscriber.
///
/// Filter comes from `RUST_LOG`, defaulting to `info`. Safe to call more
/// than once; later calls are no-ops.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init();
}
