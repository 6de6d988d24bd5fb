//! # Payment Session
//!
//! Tracks the amount owed for a frozen set of priced products and applies
//! coin and banknote tenders against it.
//!
//! ## Tender Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       pay_coin / pay_banknote                           │
//! │                                                                         │
//! │  1. Tender well formed?            no  ──► InvalidInput                 │
//! │  2. Balance > 0?                   no  ──► BalanceAlreadySettled        │
//! │  3. Storage unit has room?         no  ──► CapacityExceeded             │
//! │         (validator NOT touched; money we cannot store is not taken)     │
//! │  4. Present to validator           ──► phase: Scanning → Paying         │
//! │         │                                                               │
//! │         ├── Accepted { value } ──► balance = max(0, balance - value)    │
//! │         │                          change_due += overpayment            │
//! │         │                                                               │
//! │         └── Rejected { reason } ─► reject sink, balance unchanged       │
//! │                                                                         │
//! │  5. balance == 0 ──► phase: Settled                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::devices::{PaymentDevices, TenderOutcome};
use crate::error::{CheckoutError, CheckoutResult};
use crate::money::Money;
use crate::types::{Banknote, Coin, PricedProduct, SessionPhase, Tender};
use crate::validation::{validate_product, validate_tender};

// =============================================================================
// Records
// =============================================================================

/// One tender presented during the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TenderRecord {
    pub tender: Tender,
    pub outcome: TenderOutcome,
    /// Balance right after this tender was applied.
    pub balance_after: Money,
    pub presented_at: DateTime<Utc>,
}

/// What the caller learns from a successful `pay_*` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaymentReceipt {
    pub outcome: TenderOutcome,
    pub balance: Money,
    pub change_due: Money,
    pub phase: SessionPhase,
}

// =============================================================================
// Payment Session
// =============================================================================

/// Amount owed for a snapshot of priced products.
#[derive(Debug)]
pub struct PaymentSession<D> {
    devices: D,
    products: Vec<PricedProduct>,
    balance: Money,
    amount_paid: Money,
    change_due: Money,
    phase: SessionPhase,
    tenders: Vec<TenderRecord>,
    started_at: DateTime<Utc>,
}

impl<D: PaymentDevices> PaymentSession<D> {
    /// Opens a session owing the exact sum of the product prices.
    ///
    /// ## Errors
    /// `InvalidInput` if any product is malformed.
    pub fn new(products: Vec<PricedProduct>, devices: D) -> CheckoutResult<Self> {
        for product in &products {
            validate_product(product)?;
        }

        let balance = total_of(&products);
        Ok(PaymentSession {
            devices,
            products,
            balance,
            amount_paid: Money::zero(),
            change_due: Money::zero(),
            phase: SessionPhase::Scanning,
            tenders: Vec::new(),
            started_at: Utc::now(),
        })
    }

    // =========================================================================
    // Tenders
    // =========================================================================

    /// Pays with a coin.
    pub fn pay_coin(&mut self, coin: Coin) -> CheckoutResult<PaymentReceipt> {
        self.pay(Tender::Coin(coin))
    }

    /// Pays with a banknote.
    pub fn pay_banknote(&mut self, note: Banknote) -> CheckoutResult<PaymentReceipt> {
        self.pay(Tender::Banknote(note))
    }

    fn pay(&mut self, tender: Tender) -> CheckoutResult<PaymentReceipt> {
        validate_tender(&tender)?;

        if !self.balance.is_positive() {
            return Err(CheckoutError::BalanceAlreadySettled);
        }

        let (storage, storage_name) = match tender {
            Tender::Coin(_) => (self.devices.coin_storage(), "coin storage"),
            Tender::Banknote(_) => (self.devices.banknote_storage(), "banknote storage"),
        };
        if storage.is_full() {
            return Err(CheckoutError::capacity_exceeded(
                storage_name,
                format!("{} of {} slots used", storage.count(), storage.capacity()),
            ));
        }

        let outcome = match tender {
            Tender::Coin(coin) => self
                .devices
                .accept_coin(coin)
                .map_err(|fault| fault.into_checkout_error("coin validator"))?,
            Tender::Banknote(note) => self
                .devices
                .accept_banknote(note)
                .map_err(|fault| fault.into_checkout_error("banknote validator"))?,
        };

        if self.phase == SessionPhase::Scanning {
            self.phase = SessionPhase::Paying;
            info!(balance = %self.balance, "Payment started; item set locked");
        }

        match outcome {
            TenderOutcome::Accepted { value } => {
                let remaining = self.balance - value;
                if remaining.is_negative() {
                    self.change_due += remaining.abs();
                }
                self.balance = remaining.floor_at_zero();
                self.amount_paid += value;
                info!(
                    tender = tender.label(),
                    currency = %tender.currency(),
                    %value,
                    balance = %self.balance,
                    "Tender accepted"
                );
            }
            TenderOutcome::Rejected { reason } => {
                warn!(tender = tender.label(), ?reason, "Tender rejected");
            }
        }

        if self.balance.is_zero() {
            self.phase = SessionPhase::Settled;
            info!(
                paid = %self.amount_paid,
                change_due = %self.change_due,
                "Balance settled"
            );
        }

        self.tenders.push(TenderRecord {
            tender,
            outcome,
            balance_after: self.balance,
            presented_at: Utc::now(),
        });

        Ok(PaymentReceipt {
            outcome,
            balance: self.balance,
            change_due: self.change_due,
            phase: self.phase,
        })
    }

    // =========================================================================
    // Item Snapshot
    // =========================================================================

    /// Replaces the product snapshot and recomputes the balance from scratch.
    ///
    /// ## Errors
    /// - `InvalidInput`: a product is malformed
    /// - `PaymentInProgress`: a tender has already been presented
    pub fn update_items(&mut self, products: Vec<PricedProduct>) -> CheckoutResult<()> {
        for product in &products {
            validate_product(product)?;
        }

        if !self.phase.accepts_item_changes() {
            return Err(CheckoutError::PaymentInProgress);
        }

        self.balance = total_of(&products);
        self.products = products;
        Ok(())
    }

    /// Drops the snapshot and tender log and reopens the session for
    /// scanning. Stored tenders stay in the hardware.
    pub fn reset(&mut self) {
        info!(phase = %self.phase, "Payment session reset");
        self.products.clear();
        self.balance = Money::zero();
        self.amount_paid = Money::zero();
        self.change_due = Money::zero();
        self.phase = SessionPhase::Scanning;
        self.tenders.clear();
        self.started_at = Utc::now();
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Amount still owed. Never negative.
    pub fn balance(&self) -> Money {
        self.balance
    }

    /// Overpayment accumulated so far, kept apart from the balance.
    pub fn change_due(&self) -> Money {
        self.change_due
    }

    /// Sum of all accepted tenders.
    pub fn amount_paid(&self) -> Money {
        self.amount_paid
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_settled(&self) -> bool {
        self.phase.is_terminal()
    }

    pub fn products(&self) -> &[PricedProduct] {
        &self.products
    }

    pub fn tenders(&self) -> &[TenderRecord] {
        &self.tenders
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn devices(&self) -> &D {
        &self.devices
    }

    pub fn devices_mut(&mut self) -> &mut D {
        &mut self.devices
    }
}

fn total_of(products: &[PricedProduct]) -> Money {
    products.iter().map(|p| p.price).sum()
}

// =============================================================================
// Unit Tests
// =============================================================================
