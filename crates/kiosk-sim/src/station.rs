//! # Simulated Station
//!
//! Assembles a ready-to-use [`Checkout`] from a [`StationConfig`] and a
//! catalog.
//!
//! ## Example
//! ```rust,no_run
//! use kiosk_sim::{InMemoryCatalog, SimulatedStation, StationConfig};
//!
//! let config = StationConfig::load_or_default(None);
//! let station = SimulatedStation::from_config(&config)?;
//! let catalog = InMemoryCatalog::from_json_file("catalog.json")?;
//! let mut checkout = station.open_checkout(catalog)?;
//! # Ok::<(), kiosk_sim::SimError>(())
//! ```

use kiosk_core::{Checkout, PaymentSession, ScanSession};
use tracing::info;

use crate::cash::SimulatedCashUnits;
use crate::catalog::InMemoryCatalog;
use crate::config::StationConfig;
use crate::error::SimResult;
use crate::scale::SimulatedScale;
use crate::scanner::SimulatedScanner;

/// A checkout running entirely on simulated hardware.
pub type SimulatedCheckout =
    Checkout<SimulatedScanner, SimulatedScale, SimulatedCashUnits, InMemoryCatalog>;

#[derive(Debug, Clone)]
pub struct SimulatedStation {
    config: StationConfig,
}

impl SimulatedStation {
    /// Checks the configuration and keeps a copy for building checkouts.
    pub fn from_config(config: &StationConfig) -> SimResult<Self> {
        config.validate()?;
        Ok(SimulatedStation {
            config: config.clone(),
        })
    }

    pub fn config(&self) -> &StationConfig {
        &self.config
    }

    /// Builds a checkout with fresh devices and an empty cart.
    pub fn open_checkout(&self, catalog: InMemoryCatalog) -> SimResult<SimulatedCheckout> {
        let scale = SimulatedScale::new(self.config.scale_limit(), self.config.scale_sensitivity());
        let scan = ScanSession::new(SimulatedScanner::new(), SimulatedScanner::new(), scale)
            .with_policy(self.config.policy);

        let cash = SimulatedCashUnits::from_config(&self.config);
        let payment = PaymentSession::new(Vec::new(), cash)?;

        info!(
            currency = %self.config.currency.code,
            products = catalog.len(),
            "Checkout opened"
        );
        Ok(Checkout::new(scan, payment, catalog))
    }
}

// =============================================================================
// Scenario Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::init_tracing;
    use kiosk_core::{
        Banknote, CheckoutError, Coin, Currency, ElectronicScale, ErrorKind, Money, PricedProduct,
        ScannedItem, SessionPhase, StorageUnit, Weight,
    };

    const SEED: &str = r#"[
        { "barcode": "012345", "description": "Cheese sticks", "price": 1520 },
        { "barcode": "067890", "description": "Chicken nuggets", "price": 899 },
        { "barcode": "011111", "description": "Sample cup", "price": 0 }
    ]"#;

    fn station_with(config: StationConfig) -> SimulatedCheckout {
        init_tracing();
        let catalog = InMemoryCatalog::from_json(SEED).unwrap();
        SimulatedStation::from_config(&config)
            .unwrap()
            .open_checkout(catalog)
            .unwrap()
    }

    fn station() -> SimulatedCheckout {
        station_with(StationConfig::default())
    }

    fn cad_coin(cents: i64) -> Coin {
        Coin::new(Money::from_cents(cents), Currency::CAD).unwrap()
    }

    fn cad_note(value: u32) -> Banknote {
        Banknote::new(value, Currency::CAD).unwrap()
    }

    #[test]
    fn test_pay_fifteen_twenty() {
        let mut checkout = station();
        let cheese = ScannedItem::parse("012345", 500).unwrap();
        checkout.scan_main(&cheese).unwrap();
        checkout.bag(&cheese).unwrap();

        assert_eq!(checkout.pay_banknote(cad_note(10)).unwrap().balance.cents(), 520);
        assert_eq!(checkout.pay_coin(cad_coin(100)).unwrap().balance.cents(), 420);

        let receipt = checkout.pay_banknote(cad_note(5)).unwrap();
        assert!(receipt.balance.is_zero());
        assert_eq!(receipt.change_due.cents(), 80);
        assert_eq!(receipt.phase, SessionPhase::Settled);

        let cash = checkout.payment_session().devices();
        assert_eq!(cash.stored_value().cents(), 1600);
        assert_eq!(checkout.payment_session().tenders().len(), 3);
    }

    #[test]
    fn test_empty_cart_cannot_pay() {
        let mut checkout = station();
        assert_eq!(
            checkout.pay_coin(cad_coin(100)).unwrap_err(),
            CheckoutError::BalanceAlreadySettled
        );
        assert_eq!(
            checkout.pay_banknote(cad_note(5)).unwrap_err(),
            CheckoutError::BalanceAlreadySettled
        );
    }

    #[test]
    fn test_free_items_only_owe_nothing() {
        let mut checkout = station();
        checkout.scan_main(&ScannedItem::parse("011111", 20).unwrap()).unwrap();
        assert_eq!(
            checkout.pay_coin(cad_coin(100)).unwrap_err(),
            CheckoutError::BalanceAlreadySettled
        );
    }

    #[test]
    fn test_full_coin_storage_refuses_before_validation() {
        let mut config = StationConfig::default();
        config.storage.coin_capacity = 1;
        let mut checkout = station_with(config);
        checkout.scan_main(&ScannedItem::parse("012345", 500).unwrap()).unwrap();

        checkout.pay_coin(cad_coin(200)).unwrap();
        assert_eq!(checkout.balance().cents(), 1320);

        // A foreign coin would normally land in the tray; here it must not
        // reach the validator at all.
        let usd = Coin::new(Money::from_cents(100), Currency::USD).unwrap();
        let err = checkout.pay_coin(usd).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CapacityExceeded);
        assert_eq!(checkout.balance().cents(), 1320);

        let cash = checkout.payment_session().devices();
        assert!(cash.coin_tray.coins().is_empty());
        assert!(cash.coin_storage.is_full());
    }

    #[test]
    fn test_foreign_currency_lands_in_reject_sink() {
        let mut checkout = station();
        checkout.scan_main(&ScannedItem::parse("067890", 2000).unwrap()).unwrap();

        let usd = Coin::new(Money::from_cents(100), Currency::USD).unwrap();
        assert!(!checkout.pay_coin(usd).unwrap().outcome.is_accepted());

        let euro = Banknote::new(10, Currency::EUR).unwrap();
        assert!(!checkout.pay_banknote(euro).unwrap().outcome.is_accepted());
        assert_eq!(checkout.balance().cents(), 899);

        // The note dangles until the customer takes it back.
        let blocked = checkout.pay_banknote(cad_note(10)).unwrap_err();
        assert_eq!(blocked.kind(), ErrorKind::DeviceUnavailable);

        let devices = checkout.payment_devices_mut();
        assert_eq!(devices.coin_tray.collect(), vec![usd]);
        assert_eq!(devices.banknote_slot.remove_dangling_banknote(), Some(euro));

        assert!(checkout.pay_banknote(cad_note(10)).unwrap().balance.is_zero());
        assert_eq!(checkout.change_due().cents(), 101);
    }

    #[test]
    fn test_scanning_locked_after_first_tender() {
        let mut checkout = station();
        let nuggets = ScannedItem::parse("067890", 2000).unwrap();
        checkout.scan_handheld(&nuggets).unwrap();
        checkout.bag(&nuggets).unwrap();
        checkout.pay_coin(cad_coin(200)).unwrap();

        let late = ScannedItem::parse("012345", 500).unwrap();
        assert_eq!(
            checkout.scan_main(&late).unwrap_err(),
            CheckoutError::PaymentInProgress
        );
        assert_eq!(checkout.balance().cents(), 699);

        checkout.clear_bagged().unwrap();
        assert!(checkout.scan_session().bagging_state().current.is_zero());
    }

    #[test]
    fn test_unknown_barcode_blocks_payment() {
        let mut checkout = station();
        let mystery = ScannedItem::parse("555555", 100).unwrap();
        checkout.scan_main(&mystery).unwrap();

        let err = checkout.pay_banknote(cad_note(5)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(checkout.phase(), SessionPhase::Scanning);
        assert_eq!(checkout.payment_session().devices().banknote_storage.count(), 0);

        // Stocking the product fixes it.
        checkout.catalog_mut().insert(
            PricedProduct::new(mystery.barcode().clone(), "Mystery box", Money::from_cents(300))
                .unwrap(),
        );
        let receipt = checkout.pay_banknote(cad_note(5)).unwrap();
        assert_eq!(receipt.change_due.cents(), 200);
    }

    #[test]
    fn test_unscanned_item_in_bagging_area() {
        let mut checkout = station();
        let cheese = ScannedItem::parse("012345", 500).unwrap();
        checkout.scan_main(&cheese).unwrap();

        checkout.scale_mut().place_foreign(Weight::from_grams(300));
        let err = checkout.bag(&cheese).unwrap_err();
        assert!(matches!(err, CheckoutError::IntegrityViolation { .. }));

        checkout.scale_mut().clear_foreign();
        checkout.bag(&cheese).unwrap();
        assert_eq!(checkout.scan_session().unbagged_weight(), Weight::ZERO);
    }

    #[test]
    fn test_overloaded_scale_blocks_scanning() {
        let mut config = StationConfig::default();
        config.scale.max_weight_grams = 1000;
        let mut checkout = station_with(config);

        checkout.scale_mut().place_foreign(Weight::from_grams(1200));
        assert!(checkout.scale_mut().state().is_overloaded());

        let cheese = ScannedItem::parse("012345", 500).unwrap();
        assert_eq!(
            checkout.scan_main(&cheese).unwrap_err().kind(),
            ErrorKind::CapacityExceeded
        );
    }

    #[test]
    fn test_bagging_policy_from_config() {
        let mut config = StationConfig::default();
        config.policy.require_bagging_between_scans = true;
        let mut checkout = station_with(config);

        let cheese = ScannedItem::parse("012345", 500).unwrap();
        let nuggets = ScannedItem::parse("067890", 2000).unwrap();
        checkout.scan_main(&cheese).unwrap();

        assert!(matches!(
            checkout.scan_main(&nuggets).unwrap_err(),
            CheckoutError::BaggingRequired { .. }
        ));

        checkout.bag(&cheese).unwrap();
        checkout.scan_main(&nuggets).unwrap();
    }

    #[test]
    fn test_disabled_scanner() {
        let mut checkout = station();
        checkout.main_scanner_mut().disable();

        let cheese = ScannedItem::parse("012345", 500).unwrap();
        assert_eq!(
            checkout.scan_main(&cheese).unwrap_err().kind(),
            ErrorKind::DeviceUnavailable
        );
        checkout.scan_handheld(&cheese).unwrap();
        assert_eq!(checkout.items().len(), 1);
    }

    #[test]
    fn test_reset_between_customers() {
        let mut checkout = station();
        let cheese = ScannedItem::parse("012345", 500).unwrap();
        checkout.scan_main(&cheese).unwrap();
        checkout.bag(&cheese).unwrap();
        checkout.pay_banknote(cad_note(20)).unwrap();
        checkout.unbag(&cheese).unwrap();

        checkout.reset();
        assert_eq!(checkout.phase(), SessionPhase::Scanning);
        assert!(checkout.items().is_empty());

        // Storage keeps what the previous customer paid.
        let cash = checkout.payment_session().devices();
        assert_eq!(cash.banknote_storage.count(), 1);
    }
}
