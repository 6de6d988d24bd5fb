//! # Device Capabilities
//!
//! The traits kiosk-core uses to reach hardware and the product catalog.
//!
//! ## Synchronous Outcomes, Not Listeners
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Listener style (rejected):                                             │
//! │    validator.register(listener)                                        │
//! │    validator.accept(coin)      ──► listener sets `valid = true`        │
//! │    if valid { ... }            ◄── caller reads a shared flag          │
//! │                                                                         │
//! │  This crate:                                                            │
//! │    match devices.accept_coin(coin)? {                                  │
//! │        TenderOutcome::Accepted { value } => ...,                       │
//! │        TenderOutcome::Rejected { reason } => ...,                      │
//! │    }                                                                    │
//! │                                                                         │
//! │  The outcome IS the return value; there is nothing to race on.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::error::{CheckoutError, CheckoutResult};
use crate::money::Money;
use crate::types::{
    BaggingState, Banknote, Barcode, Coin, Currency, PricedProduct, ScannedItem, Weight,
};

// =============================================================================
// Device Outcomes
// =============================================================================

/// Why a device refused a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceFault {
    /// The device has been switched off by the attendant.
    #[error("device is disabled")]
    Disabled,

    /// The item asked for is not on / in the device.
    #[error("item is not present")]
    NotPresent,

    /// The device is physically blocked (e.g. a note dangling in the slot).
    #[error("device is blocked: {0}")]
    Blocked(String),
}

impl DeviceFault {
    /// Maps a fault into the session error taxonomy.
    pub fn into_checkout_error(self, device: &str) -> CheckoutError {
        match self {
            DeviceFault::Disabled => CheckoutError::device_unavailable(device, "disabled"),
            DeviceFault::Blocked(reason) => CheckoutError::device_unavailable(device, reason),
            DeviceFault::NotPresent => CheckoutError::NotFound(format!("item on {}", device)),
        }
    }
}

/// What a scale reports after an item is added or removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ScaleEvent {
    /// The reading changed by more than the sensitivity.
    WeightChanged { weight: Weight },
    /// The change was too small to be reported.
    BelowSensitivity,
    /// The surface now holds more than its limit.
    Overload,
    /// The surface dropped back under its limit.
    OutOfOverload,
}

/// Why a validator turned a tender away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RejectReason {
    /// Tender belongs to another currency.
    WrongCurrency { expected: Currency, found: Currency },
    /// Tender value is not one the station recognises.
    UnknownDenomination { value: Money },
}

/// Result of presenting a tender to a validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TenderOutcome {
    /// Tender recognised and moved into storage.
    Accepted { value: Money },
    /// Tender routed to the reject sink (coin tray / banknote slot).
    Rejected { reason: RejectReason },
}

impl TenderOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, TenderOutcome::Accepted { .. })
    }
}

// =============================================================================
// Capability Traits
// =============================================================================

/// A barcode scanner.
pub trait BarcodeScanner {
    fn is_disabled(&self) -> bool;

    /// Reads the item's barcode.
    fn scan(&mut self, item: &ScannedItem) -> Result<Barcode, DeviceFault>;
}

/// The weighed bagging surface.
pub trait ElectronicScale {
    fn is_disabled(&self) -> bool;

    /// Total weight currently on the surface, including anything unscanned.
    fn current_weight(&self) -> Weight;

    fn weight_limit(&self) -> Weight;

    fn sensitivity(&self) -> Weight;

    /// Places an item on the surface.
    fn add(&mut self, item: &ScannedItem) -> Result<ScaleEvent, DeviceFault>;

    /// Takes an item off the surface; `NotPresent` if it was never placed.
    fn remove(&mut self, item: &ScannedItem) -> Result<ScaleEvent, DeviceFault>;

    /// Snapshot of the surface.
    fn state(&self) -> BaggingState {
        BaggingState {
            current: self.current_weight(),
            limit: self.weight_limit(),
            sensitivity: self.sensitivity(),
        }
    }
}

/// A coin or banknote storage unit.
pub trait StorageUnit {
    /// Tenders currently stored.
    fn count(&self) -> usize;

    /// Maximum tenders the unit holds.
    fn capacity(&self) -> usize;

    fn is_full(&self) -> bool {
        self.count() >= self.capacity()
    }
}

/// Everything a payment session needs from the cash hardware.
///
/// Validators route accepted tenders into their storage unit and rejected
/// ones into their reject sink before returning the outcome.
pub trait PaymentDevices {
    fn coin_storage(&self) -> &dyn StorageUnit;

    fn banknote_storage(&self) -> &dyn StorageUnit;

    fn accept_coin(&mut self, coin: Coin) -> Result<TenderOutcome, DeviceFault>;

    fn accept_banknote(&mut self, note: Banknote) -> Result<TenderOutcome, DeviceFault>;
}

/// Barcode → price lookup.
pub trait ProductCatalog {
    /// Returns the product for a barcode, `NotFound` if unknown.
    fn lookup(&self, barcode: &Barcode) -> CheckoutResult<PricedProduct>;
}

impl ProductCatalog for HashMap<Barcode, PricedProduct> {
    fn lookup(&self, barcode: &Barcode) -> CheckoutResult<PricedProduct> {
        self.get(barcode)
            .cloned()
            .ok_or_else(|| CheckoutError::NotFound(format!("product with barcode {}", barcode)))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_fault_mapping() {
        assert_eq!(
            DeviceFault::Disabled.into_checkout_error("bagging scale").kind(),
            ErrorKind::DeviceUnavailable
        );
        assert_eq!(
            DeviceFault::NotPresent.into_checkout_error("bagging scale").kind(),
            ErrorKind::NotFound
        );
        let err = DeviceFault::Blocked("note in slot".into()).into_checkout_error("banknote input");
        assert_eq!(err.to_string(), "banknote input is unavailable: note in slot");
    }

    #[test]
    fn test_hashmap_catalog_lookup() {
        let barcode = Barcode::new("012345").unwrap();
        let product =
            PricedProduct::new(barcode.clone(), "Cheese sticks", Money::from_cents(295)).unwrap();
        let mut catalog = HashMap::new();
        catalog.insert(barcode.clone(), product.clone());

        assert_eq!(catalog.lookup(&barcode).unwrap(), product);
        let missing = Barcode::new("999").unwrap();
        assert_eq!(catalog.lookup(&missing).unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_outcome_serializes_tagged() {
        let outcome = TenderOutcome::Accepted {
            value: Money::from_cents(100),
        };
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains("\"outcome\":\"accepted\""));
        assert!(outcome.is_accepted());
    }
}
