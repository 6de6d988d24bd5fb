//! # Simulated Cash Hardware
//!
//! Validators, storage units and reject sinks for coins and banknotes.
//!
//! ## Tender Paths
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  coin ──► CoinValidator ──┬── valid ───► CoinStorageUnit                │
//! │                           └── invalid ─► CoinTray (customer picks up)   │
//! │                                                                         │
//! │  note ──► BanknoteSlot ──► BanknoteValidator                            │
//! │              ▲               ├── valid ───► BanknoteStorageUnit         │
//! │              │               └── invalid ─┐                             │
//! │              └────── dangles in slot ◄────┘                             │
//! │                      (slot blocked until remove_dangling_banknote)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use kiosk_core::{
    Banknote, Coin, Currency, DeviceFault, Money, PaymentDevices, RejectReason, StorageUnit,
    TenderOutcome,
};
use tracing::{debug, warn};

use crate::config::StationConfig;

// =============================================================================
// Validators
// =============================================================================

/// Judges coins by currency and face value.
#[derive(Debug, Clone)]
pub struct CoinValidator {
    currency: Currency,
    denominations: Vec<Money>,
    disabled: bool,
}

impl CoinValidator {
    pub fn new(currency: Currency, denominations: Vec<Money>) -> Self {
        CoinValidator {
            currency,
            denominations,
            disabled: false,
        }
    }

    /// Returns the credited value, or why the coin is refused.
    pub fn judge(&self, coin: &Coin) -> Result<Money, RejectReason> {
        if coin.currency != self.currency {
            return Err(RejectReason::WrongCurrency {
                expected: self.currency,
                found: coin.currency,
            });
        }
        if !self.denominations.contains(&coin.value) {
            return Err(RejectReason::UnknownDenomination { value: coin.value });
        }
        Ok(coin.value)
    }

    pub fn disable(&mut self) {
        self.disabled = true;
    }

    pub fn enable(&mut self) {
        self.disabled = false;
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }
}

/// Judges banknotes by currency and denomination.
#[derive(Debug, Clone)]
pub struct BanknoteValidator {
    currency: Currency,
    denominations: Vec<u32>,
    disabled: bool,
}

impl BanknoteValidator {
    pub fn new(currency: Currency, denominations: Vec<u32>) -> Self {
        BanknoteValidator {
            currency,
            denominations,
            disabled: false,
        }
    }

    pub fn judge(&self, note: &Banknote) -> Result<Money, RejectReason> {
        if note.currency != self.currency {
            return Err(RejectReason::WrongCurrency {
                expected: self.currency,
                found: note.currency,
            });
        }
        if !self.denominations.contains(&note.denomination) {
            return Err(RejectReason::UnknownDenomination {
                value: note.value(),
            });
        }
        Ok(note.value())
    }

    pub fn disable(&mut self) {
        self.disabled = true;
    }

    pub fn enable(&mut self) {
        self.disabled = false;
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }
}

// =============================================================================
// Storage Units
// =============================================================================

/// A cassette holding accepted tenders.
#[derive(Debug, Clone)]
pub struct Storage<T> {
    contents: Vec<T>,
    capacity: usize,
}

pub type CoinStorageUnit = Storage<Coin>;
pub type BanknoteStorageUnit = Storage<Banknote>;

impl<T> Storage<T> {
    pub fn new(capacity: usize) -> Self {
        Storage {
            contents: Vec::new(),
            capacity,
        }
    }

    /// Stores a tender; `Blocked` when the cassette is full.
    pub fn load(&mut self, tender: T) -> Result<(), DeviceFault> {
        if self.contents.len() >= self.capacity {
            return Err(DeviceFault::Blocked("storage unit is full".into()));
        }
        self.contents.push(tender);
        Ok(())
    }

    /// Empties the cassette, as an attendant does at end of day.
    pub fn unload(&mut self) -> Vec<T> {
        std::mem::take(&mut self.contents)
    }

    pub fn contents(&self) -> &[T] {
        &self.contents
    }
}

impl<T> StorageUnit for Storage<T> {
    fn count(&self) -> usize {
        self.contents.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }
}

// =============================================================================
// Reject Sinks
// =============================================================================

/// Where rejected coins drop for the customer to collect.
#[derive(Debug, Clone, Default)]
pub struct CoinTray {
    coins: Vec<Coin>,
}

impl CoinTray {
    pub fn coins(&self) -> &[Coin] {
        &self.coins
    }

    /// Customer picks the coins up.
    pub fn collect(&mut self) -> Vec<Coin> {
        std::mem::take(&mut self.coins)
    }
}

/// The banknote input slot. A rejected note is pushed back out and dangles
/// here until the customer takes it.
#[derive(Debug, Clone, Default)]
pub struct BanknoteSlot {
    dangling: Option<Banknote>,
    disabled: bool,
}

impl BanknoteSlot {
    pub fn has_dangling_banknote(&self) -> bool {
        self.dangling.is_some()
    }

    pub fn remove_dangling_banknote(&mut self) -> Option<Banknote> {
        self.dangling.take()
    }

    pub fn disable(&mut self) {
        self.disabled = true;
    }

    pub fn enable(&mut self) {
        self.disabled = false;
    }
}

// =============================================================================
// Cash Units
// =============================================================================

/// Every piece of cash hardware on the station.
#[derive(Debug, Clone)]
pub struct SimulatedCashUnits {
    pub coin_validator: CoinValidator,
    pub banknote_validator: BanknoteValidator,
    pub coin_storage: CoinStorageUnit,
    pub banknote_storage: BanknoteStorageUnit,
    pub coin_tray: CoinTray,
    pub banknote_slot: BanknoteSlot,
}

impl SimulatedCashUnits {
    pub fn from_config(config: &StationConfig) -> Self {
        let currency = config.currency.code;
        SimulatedCashUnits {
            coin_validator: CoinValidator::new(currency, config.coin_denominations()),
            banknote_validator: BanknoteValidator::new(
                currency,
                config.currency.banknote_denominations.clone(),
            ),
            coin_storage: Storage::new(config.storage.coin_capacity),
            banknote_storage: Storage::new(config.storage.banknote_capacity),
            coin_tray: CoinTray::default(),
            banknote_slot: BanknoteSlot::default(),
        }
    }

    /// Total value held in both storage units.
    pub fn stored_value(&self) -> Money {
        let coins: Money = self.coin_storage.contents().iter().map(|c| c.value).sum();
        let notes: Money = self.banknote_storage.contents().iter().map(Banknote::value).sum();
        coins + notes
    }
}

impl PaymentDevices for SimulatedCashUnits {
    fn coin_storage(&self) -> &dyn StorageUnit {
        &self.coin_storage
    }

    fn banknote_storage(&self) -> &dyn StorageUnit {
        &self.banknote_storage
    }

    fn accept_coin(&mut self, coin: Coin) -> Result<TenderOutcome, DeviceFault> {
        if self.coin_validator.is_disabled() {
            return Err(DeviceFault::Disabled);
        }

        match self.coin_validator.judge(&coin) {
            Ok(value) => {
                self.coin_storage.load(coin)?;
                debug!(%value, stored = self.coin_storage.count(), "Coin stored");
                Ok(TenderOutcome::Accepted { value })
            }
            Err(reason) => {
                warn!(?reason, "Coin dropped to tray");
                self.coin_tray.coins.push(coin);
                Ok(TenderOutcome::Rejected { reason })
            }
        }
    }

    fn accept_banknote(&mut self, note: Banknote) -> Result<TenderOutcome, DeviceFault> {
        if self.banknote_slot.disabled || self.banknote_validator.is_disabled() {
            return Err(DeviceFault::Disabled);
        }
        if self.banknote_slot.has_dangling_banknote() {
            return Err(DeviceFault::Blocked(
                "a rejected banknote is still in the slot".into(),
            ));
        }

        match self.banknote_validator.judge(&note) {
            Ok(value) => {
                self.banknote_storage.load(note)?;
                debug!(%value, stored = self.banknote_storage.count(), "Banknote stored");
                Ok(TenderOutcome::Accepted { value })
            }
            Err(reason) => {
                warn!(?reason, "Banknote pushed back out of the slot");
                self.banknote_slot.dangling = Some(note);
                Ok(TenderOutcome::Rejected { reason })
            }
        }
    }
}
