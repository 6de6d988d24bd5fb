//! # Checkout Orchestrator
//!
//! Wires a [`ScanSession`] to a [`PaymentSession`] through a product catalog
//! and enforces the one rule neither session can see on its own: once a
//! tender has been presented, the scanned set is frozen.
//!
//! ## User Workflow
//! ```text
//! ┌────────────┐   scan_main / scan_handheld   ┌─────────────────────────┐
//! │  Customer  │ ────────────────────────────► │ ScanSession.items       │
//! └────────────┘                               └───────────┬─────────────┘
//!       │ bag / unbag                                      │
//!       ▼                                                  │ sync_products
//! ┌────────────┐                                           ▼ (catalog lookup)
//! │  Bagging   │                               ┌─────────────────────────┐
//! │  surface   │                               │ PaymentSession.products │
//! └────────────┘                               └───────────┬─────────────┘
//!                                                          │ pay_coin /
//!                                                          ▼ pay_banknote
//!                                        Scanning ──► Paying ──► Settled
//! ```
//!
//! ## Example
//! ```rust,ignore
//! let mut checkout = Checkout::new(scan, payment, catalog);
//! checkout.scan_main(&item)?;
//! checkout.bag(&item)?;
//! let receipt = checkout.pay_banknote(Banknote::new(20, Currency::CAD)?)?;
//! assert!(receipt.balance.is_zero());
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::devices::{BarcodeScanner, ElectronicScale, PaymentDevices, ProductCatalog};
use crate::error::{CheckoutError, CheckoutResult};
use crate::money::Money;
use crate::payment::{PaymentReceipt, PaymentSession};
use crate::scan::ScanSession;
use crate::types::{
    Banknote, Coin, PricedProduct, ScannedItem, ScannerKind, SessionPhase, Weight,
};
use crate::validation::{validate_banknote, validate_coin};

/// Read-only overview of a checkout, e.g. for a status display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutSummary {
    pub phase: SessionPhase,
    pub item_count: usize,
    pub scanned_weight: Weight,
    pub bagged_weight: Weight,
    pub balance: Money,
    pub amount_paid: Money,
    pub change_due: Money,
    pub started_at: DateTime<Utc>,
}

/// One customer's checkout: scanning, bagging and payment.
#[derive(Debug)]
pub struct Checkout<B, S, D, C> {
    scan: ScanSession<B, S>,
    payment: PaymentSession<D>,
    catalog: C,
}

impl<B, S, D, C> Checkout<B, S, D, C>
where
    B: BarcodeScanner,
    S: ElectronicScale,
    D: PaymentDevices,
    C: ProductCatalog,
{
    pub fn new(scan: ScanSession<B, S>, payment: PaymentSession<D>, catalog: C) -> Self {
        Checkout {
            scan,
            payment,
            catalog,
        }
    }

    // =========================================================================
    // Scanning & Bagging
    // =========================================================================

    /// Scans an item on the main scanner.
    pub fn scan_main(&mut self, item: &ScannedItem) -> CheckoutResult<()> {
        self.ensure_scanning()?;
        self.scan.scan(item, ScannerKind::Main)
    }

    /// Scans an item on the handheld scanner.
    pub fn scan_handheld(&mut self, item: &ScannedItem) -> CheckoutResult<()> {
        self.ensure_scanning()?;
        self.scan.scan(item, ScannerKind::Handheld)
    }

    /// Places a scanned item in the bagging area.
    pub fn bag(&mut self, item: &ScannedItem) -> CheckoutResult<()> {
        self.ensure_scanning()?;
        self.scan.place_in_bagging(item)
    }

    /// Takes an item out of the bagging area. Allowed in every phase: the
    /// customer picks up their bags after paying.
    pub fn unbag(&mut self, item: &ScannedItem) -> CheckoutResult<()> {
        self.scan.remove_from_bagging(item)
    }

    /// Empties the bagging area of every scanned item. Allowed in every phase.
    pub fn clear_bagged(&mut self) -> CheckoutResult<()> {
        self.scan.clear_bagged()
    }

    /// Removes an item from the scanned set.
    pub fn remove_scanned(&mut self, item: &ScannedItem) -> CheckoutResult<ScannedItem> {
        self.ensure_scanning()?;
        self.scan.remove_scanned(item)
    }

    fn ensure_scanning(&self) -> CheckoutResult<()> {
        if !self.payment.phase().accepts_item_changes() {
            return Err(CheckoutError::PaymentInProgress);
        }
        Ok(())
    }

    // =========================================================================
    // Pricing & Payment
    // =========================================================================

    /// Prices every scanned item through the catalog and hands the result to
    /// the payment session.
    ///
    /// ## Errors
    /// - `NotFound`: a barcode is not in the catalog (nothing changes)
    /// - `PaymentInProgress`: a tender has already been presented
    pub fn sync_products(&mut self) -> CheckoutResult<()> {
        let products = self
            .scan
            .items()
            .iter()
            .map(|item| self.catalog.lookup(item.barcode()))
            .collect::<CheckoutResult<Vec<PricedProduct>>>()?;

        debug!(count = products.len(), "Scanned items priced");
        self.payment.update_items(products)
    }

    /// Pays with a coin, pricing the scanned items first if payment has not
    /// started yet.
    pub fn pay_coin(&mut self, coin: Coin) -> CheckoutResult<PaymentReceipt> {
        validate_coin(&coin)?;
        self.sync_before_payment()?;
        self.payment.pay_coin(coin)
    }

    /// Pays with a banknote, pricing the scanned items first if payment has
    /// not started yet.
    pub fn pay_banknote(&mut self, note: Banknote) -> CheckoutResult<PaymentReceipt> {
        validate_banknote(&note)?;
        self.sync_before_payment()?;
        self.payment.pay_banknote(note)
    }

    fn sync_before_payment(&mut self) -> CheckoutResult<()> {
        if self.payment.phase() == SessionPhase::Scanning {
            self.sync_products()?;
        }
        Ok(())
    }

    /// Starts over for the next customer: scanned items are forgotten and
    /// the payment session goes back to Scanning. Whatever is physically on
    /// the bagging surface stays there.
    pub fn reset(&mut self) {
        info!(
            phase = %self.payment.phase(),
            items = self.scan.items().len(),
            "Checkout reset"
        );
        self.scan.clear_scanned();
        self.payment.reset();
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn balance(&self) -> Money {
        self.payment.balance()
    }

    pub fn change_due(&self) -> Money {
        self.payment.change_due()
    }

    pub fn phase(&self) -> SessionPhase {
        self.payment.phase()
    }

    pub fn is_settled(&self) -> bool {
        self.payment.is_settled()
    }

    pub fn items(&self) -> &[ScannedItem] {
        self.scan.items()
    }

    pub fn products(&self) -> &[PricedProduct] {
        self.payment.products()
    }

    pub fn summary(&self) -> CheckoutSummary {
        CheckoutSummary {
            phase: self.payment.phase(),
            item_count: self.scan.items().len(),
            scanned_weight: self.scan.scanned_weight(),
            bagged_weight: self.scan.bagging_state().current,
            balance: self.payment.balance(),
            amount_paid: self.payment.amount_paid(),
            change_due: self.payment.change_due(),
            started_at: self.payment.started_at(),
        }
    }

    pub fn scan_session(&self) -> &ScanSession<B, S> {
        &self.scan
    }

    pub fn payment_session(&self) -> &PaymentSession<D> {
        &self.payment
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut C {
        &mut self.catalog
    }

    pub fn main_scanner_mut(&mut self) -> &mut B {
        self.scan.main_scanner_mut()
    }

    pub fn handheld_scanner_mut(&mut self) -> &mut B {
        self.scan.handheld_scanner_mut()
    }

    pub fn scale_mut(&mut self) -> &mut S {
        self.scan.scale_mut()
    }

    pub fn payment_devices_mut(&mut self) -> &mut D {
        self.payment.devices_mut()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::{DeviceFault, RejectReason, ScaleEvent, StorageUnit, TenderOutcome};
    use crate::error::ErrorKind;
    use crate::types::{Barcode, Currency, ItemId};
    use std::collections::HashMap;

    #[derive(Debug, Default)]
    struct FakeScanner {
        disabled: bool,
    }

    impl BarcodeScanner for FakeScanner {
        fn is_disabled(&self) -> bool {
            self.disabled
        }

        fn scan(&mut self, item: &ScannedItem) -> Result<Barcode, DeviceFault> {
            Ok(item.barcode().clone())
        }
    }

    #[derive(Debug, Default)]
    struct FakeScale {
        on_scale: Vec<(ItemId, Weight)>,
    }

    impl ElectronicScale for FakeScale {
        fn is_disabled(&self) -> bool {
            false
        }

        fn current_weight(&self) -> Weight {
            self.on_scale.iter().map(|(_, w)| *w).sum()
        }

        fn weight_limit(&self) -> Weight {
            Weight::from_grams(25_000)
        }

        fn sensitivity(&self) -> Weight {
            Weight::from_grams(15)
        }

        fn add(&mut self, item: &ScannedItem) -> Result<ScaleEvent, DeviceFault> {
            self.on_scale.push((item.id(), item.weight()));
            Ok(ScaleEvent::WeightChanged {
                weight: self.current_weight(),
            })
        }

        fn remove(&mut self, item: &ScannedItem) -> Result<ScaleEvent, DeviceFault> {
            let index = self
                .on_scale
                .iter()
                .position(|(id, _)| *id == item.id())
                .ok_or(DeviceFault::NotPresent)?;
            self.on_scale.remove(index);
            Ok(ScaleEvent::WeightChanged {
                weight: self.current_weight(),
            })
        }
    }

    #[derive(Debug, Default)]
    struct Slots {
        count: usize,
    }

    impl StorageUnit for Slots {
        fn count(&self) -> usize {
            self.count
        }

        fn capacity(&self) -> usize {
            10
        }
    }

    #[derive(Debug, Default)]
    struct FakeCash {
        coins: Slots,
        notes: Slots,
        validator_calls: usize,
    }

    impl PaymentDevices for FakeCash {
        fn coin_storage(&self) -> &dyn StorageUnit {
            &self.coins
        }

        fn banknote_storage(&self) -> &dyn StorageUnit {
            &self.notes
        }

        fn accept_coin(&mut self, coin: Coin) -> Result<TenderOutcome, DeviceFault> {
            self.validator_calls += 1;
            if coin.currency != Currency::CAD {
                return Ok(TenderOutcome::Rejected {
                    reason: RejectReason::WrongCurrency {
                        expected: Currency::CAD,
                        found: coin.currency,
                    },
                });
            }
            self.coins.count += 1;
            Ok(TenderOutcome::Accepted { value: coin.value })
        }

        fn accept_banknote(&mut self, note: Banknote) -> Result<TenderOutcome, DeviceFault> {
            self.validator_calls += 1;
            self.notes.count += 1;
            Ok(TenderOutcome::Accepted {
                value: note.value(),
            })
        }
    }

    type TestCheckout =
        Checkout<FakeScanner, FakeScale, FakeCash, HashMap<Barcode, PricedProduct>>;

    fn checkout() -> TestCheckout {
        let mut catalog = HashMap::new();
        for (code, name, price) in [
            ("1111", "Cheese sticks", 1520),
            ("2222", "Chicken nuggets", 899),
        ] {
            let barcode = Barcode::new(code).unwrap();
            let product =
                PricedProduct::new(barcode.clone(), name, Money::from_cents(price)).unwrap();
            catalog.insert(barcode, product);
        }

        let scan = ScanSession::new(
            FakeScanner::default(),
            FakeScanner::default(),
            FakeScale::default(),
        );
        let payment = PaymentSession::new(Vec::new(), FakeCash::default()).unwrap();
        Checkout::new(scan, payment, catalog)
    }

    fn cad_coin(cents: i64) -> Coin {
        Coin::new(Money::from_cents(cents), Currency::CAD).unwrap()
    }

    fn cad_note(value: u32) -> Banknote {
        Banknote::new(value, Currency::CAD).unwrap()
    }

    #[test]
    fn test_full_checkout_scenario() {
        let mut checkout = checkout();
        let cheese = ScannedItem::parse("1111", 500).unwrap();

        checkout.scan_main(&cheese).unwrap();
        checkout.bag(&cheese).unwrap();

        let receipt = checkout.pay_banknote(cad_note(10)).unwrap();
        assert_eq!(receipt.balance.cents(), 520);
        assert_eq!(checkout.phase(), SessionPhase::Paying);

        checkout.pay_coin(cad_coin(100)).unwrap();
        assert_eq!(checkout.balance().cents(), 420);

        let receipt = checkout.pay_banknote(cad_note(5)).unwrap();
        assert!(receipt.balance.is_zero());
        assert_eq!(receipt.change_due.cents(), 80);
        assert!(checkout.is_settled());
    }

    #[test]
    fn test_scanning_locked_once_paying() {
        let mut checkout = checkout();
        let cheese = ScannedItem::parse("1111", 500).unwrap();
        let nuggets = ScannedItem::parse("2222", 2000).unwrap();

        checkout.scan_main(&cheese).unwrap();
        checkout.scan_handheld(&nuggets).unwrap();
        checkout.bag(&cheese).unwrap();
        checkout.pay_coin(cad_coin(200)).unwrap();

        let extra = ScannedItem::parse("1111", 500).unwrap();
        assert_eq!(
            checkout.scan_main(&extra).unwrap_err(),
            CheckoutError::PaymentInProgress
        );
        assert_eq!(
            checkout.scan_handheld(&extra).unwrap_err(),
            CheckoutError::PaymentInProgress
        );
        assert_eq!(
            checkout.bag(&nuggets).unwrap_err(),
            CheckoutError::PaymentInProgress
        );
        assert_eq!(
            checkout.remove_scanned(&nuggets).unwrap_err(),
            CheckoutError::PaymentInProgress
        );
        assert_eq!(checkout.items().len(), 2);

        // Bags can still be picked up.
        checkout.unbag(&cheese).unwrap();
    }

    #[test]
    fn test_unknown_barcode_leaves_state_unchanged() {
        let mut checkout = checkout();
        let mystery = ScannedItem::parse("9999", 300).unwrap();
        checkout.scan_main(&mystery).unwrap();

        let err = checkout.pay_coin(cad_coin(100)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(checkout.phase(), SessionPhase::Scanning);
        assert!(checkout.balance().is_zero());
        assert_eq!(checkout.payment_session().devices().validator_calls, 0);

        checkout.remove_scanned(&mystery).unwrap();
        assert!(checkout.items().is_empty());
    }

    #[test]
    fn test_empty_checkout_cannot_pay() {
        let mut checkout = checkout();
        assert_eq!(
            checkout.pay_banknote(cad_note(5)).unwrap_err(),
            CheckoutError::BalanceAlreadySettled
        );
        assert_eq!(checkout.phase(), SessionPhase::Scanning);
    }

    #[test]
    fn test_sync_products_prices_duplicates() {
        let mut checkout = checkout();
        checkout.scan_main(&ScannedItem::parse("2222", 2000).unwrap()).unwrap();
        checkout.scan_main(&ScannedItem::parse("2222", 2000).unwrap()).unwrap();

        checkout.sync_products().unwrap();
        assert_eq!(checkout.products().len(), 2);
        assert_eq!(checkout.balance().cents(), 1798);
    }

    #[test]
    fn test_rejected_tender_still_locks_scanning() {
        let mut checkout = checkout();
        checkout.scan_main(&ScannedItem::parse("1111", 500).unwrap()).unwrap();

        let usd = Coin::new(Money::from_cents(100), Currency::USD).unwrap();
        let receipt = checkout.pay_coin(usd).unwrap();
        assert!(!receipt.outcome.is_accepted());
        assert_eq!(checkout.balance().cents(), 1520);
        assert_eq!(checkout.phase(), SessionPhase::Paying);
    }

    #[test]
    fn test_reset_starts_over() {
        let mut checkout = checkout();
        let cheese = ScannedItem::parse("1111", 500).unwrap();
        checkout.scan_main(&cheese).unwrap();
        checkout.pay_banknote(cad_note(20)).unwrap();
        assert!(checkout.is_settled());

        let opened_at = checkout.summary().started_at;
        checkout.reset();
        let summary = checkout.summary();
        assert!(summary.started_at >= opened_at);
        assert_eq!(summary.phase, SessionPhase::Scanning);
        assert_eq!(summary.item_count, 0);
        assert!(summary.balance.is_zero());

        checkout.scan_main(&ScannedItem::parse("2222", 2000).unwrap()).unwrap();
    }

    #[test]
    fn test_invalid_tender_rejected_before_catalog() {
        let mut checkout = checkout();
        checkout.scan_main(&ScannedItem::parse("9999", 300).unwrap()).unwrap();

        let bad = Banknote {
            denomination: 0,
            currency: Currency::CAD,
        };
        assert_eq!(
            checkout.pay_banknote(bad).unwrap_err().kind(),
            ErrorKind::InvalidInput
        );
    }
}
