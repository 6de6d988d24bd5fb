//! # kiosk-core: Self-Checkout Session Logic
//!
//! This crate holds the control logic of a self-checkout station: what has
//! been scanned, whether the bagging area agrees, and how much is still owed.
//! Devices and the product catalog are reached only through the traits in
//! [`devices`].
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Self-Checkout Station                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │           Hardware / kiosk-sim (scanners, scale, cash)          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ capability traits                      │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ kiosk-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   scan    │  │  payment  │  │ checkout  │  │ validation│  │   │
//! │  │   │ScanSession│  │ PaymentSe │  │ Checkout  │  │   rules   │  │   │
//! │  │   │  bagging  │  │  balance  │  │ scan lock │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO THREADS • INTEGER MONEY AND WEIGHT               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (ScannedItem, PricedProduct, Coin, Banknote, ...)
//! - [`money`] - Money type with integer arithmetic
//! - [`error`] - Checkout and validation errors
//! - [`validation`] - Argument checks run before any device is touched
//! - [`devices`] - Capability traits and synchronous device outcomes
//! - [`scan`] - Scanned items and bagging reconciliation
//! - [`payment`] - Balance and tender handling
//! - [`checkout`] - Orchestrator tying scanning to payment
//!
//! ## Example Usage
//!
//! ```rust
//! use kiosk_core::money::Money;
//!
//! let price: Money = "15.20".parse().unwrap();
//! let paid = Money::from_major(10) + Money::from_cents(100);
//! assert_eq!((price - paid).to_string(), "$4.20");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod devices;
pub mod error;
pub mod money;
pub mod payment;
pub mod scan;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use checkout::{Checkout, CheckoutSummary};
pub use devices::{
    BarcodeScanner, DeviceFault, ElectronicScale, PaymentDevices, ProductCatalog, RejectReason,
    ScaleEvent, StorageUnit, TenderOutcome,
};
pub use error::{CheckoutError, CheckoutResult, ErrorKind, ValidationError};
pub use money::Money;
pub use payment::{PaymentReceipt, PaymentSession, TenderRecord};
pub use scan::{ScanPolicy, ScanSession};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Longest barcode payload accepted (GS1 DataBar Expanded tops out near here).
pub const MAX_BARCODE_LENGTH: usize = 48;

/// Longest product description accepted.
pub const MAX_DESCRIPTION_LENGTH: usize = 200;

/// Highest price a single product may carry, in cents ($100,000.00).
///
/// ## Business Reason
/// Keeps every basket total far inside `i64`, so summing prices can never
/// overflow.
pub const MAX_PRODUCT_PRICE_CENTS: i64 = 10_000_000;

/// Heaviest single item accepted, in grams (1 tonne).
///
/// ## Business Reason
/// Nothing a customer can lift weighs more; the bound also keeps weight
/// sums far inside `u64`.
pub const MAX_ITEM_WEIGHT_GRAMS: u64 = 1_000_000;
