//! # Scan Session
//!
//! Tracks what the customer has scanned and reconciles it against the
//! bagging area.
//!
//! ## The Weight Invariant
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │        Σ weight(bagged)  ≤  Σ weight(scanned)                           │
//! │                                                                         │
//! │  scanned: [cheese 500g] [nuggets 2000g]          = 2500g                │
//! │  bagged:  [cheese 500g] [nuggets 2000g]          = 2500g   ✅           │
//! │  bagged:  [cheese 500g] [nuggets 2000g] [??? 800g] = 3300g ❌           │
//! │                                                    │                    │
//! │                                                    ▼                    │
//! │                                     IntegrityViolation (never fixed up) │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Check Order
//! Every operation validates its argument first, then device availability,
//! then capacity, then integrity. A failed check leaves the session as it was.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::devices::{BarcodeScanner, DeviceFault, ElectronicScale, ScaleEvent};
use crate::error::{CheckoutError, CheckoutResult, ValidationError};
use crate::types::{BaggingState, ScannedItem, ScannerKind, Weight};
use crate::validation::validate_scanned_item;

const BAGGING_AREA: &str = "bagging area";

// =============================================================================
// Scan Policy
// =============================================================================

/// Station rules that vary between deployments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanPolicy {
    /// Refuse a new scan while a scanned item has not been bagged yet.
    #[serde(default)]
    pub require_bagging_between_scans: bool,
}

// =============================================================================
// Scan Session
// =============================================================================

/// The scanned-but-unpaid items of one checkout, plus the devices that
/// produce them.
#[derive(Debug)]
pub struct ScanSession<B, S> {
    main_scanner: B,
    handheld_scanner: B,
    scale: S,
    items: Vec<ScannedItem>,
    policy: ScanPolicy,
}

impl<B, S> ScanSession<B, S>
where
    B: BarcodeScanner,
    S: ElectronicScale,
{
    /// Creates an empty session over the given devices.
    pub fn new(main_scanner: B, handheld_scanner: B, scale: S) -> Self {
        ScanSession {
            main_scanner,
            handheld_scanner,
            scale,
            items: Vec::new(),
            policy: ScanPolicy::default(),
        }
    }

    /// Creates a session that resumes with previously scanned items.
    ///
    /// ## Errors
    /// `InvalidInput` if the list is empty (use [`ScanSession::new`]) or any
    /// item is malformed.
    pub fn with_items(
        main_scanner: B,
        handheld_scanner: B,
        scale: S,
        items: Vec<ScannedItem>,
    ) -> CheckoutResult<Self> {
        if items.is_empty() {
            return Err(ValidationError::Required {
                field: "previously scanned items".to_string(),
            }
            .into());
        }
        for item in &items {
            validate_scanned_item(item)?;
        }

        let mut session = ScanSession::new(main_scanner, handheld_scanner, scale);
        session.items = items;
        Ok(session)
    }

    /// Replaces the station policy.
    pub fn with_policy(mut self, policy: ScanPolicy) -> Self {
        self.policy = policy;
        self
    }

    // =========================================================================
    // Scanning
    // =========================================================================

    /// Scans an item through one of the two scanners.
    ///
    /// ## Errors
    /// - `InvalidInput`: malformed item
    /// - `DeviceUnavailable`: the chosen scanner is disabled
    /// - `CapacityExceeded`: the bagging area is overloaded and must be
    ///   cleared first
    /// - `BaggingRequired`: policy demands the previous item be bagged
    pub fn scan(&mut self, item: &ScannedItem, via: ScannerKind) -> CheckoutResult<()> {
        validate_scanned_item(item)?;

        let scanner = match via {
            ScannerKind::Main => &mut self.main_scanner,
            ScannerKind::Handheld => &mut self.handheld_scanner,
        };
        if scanner.is_disabled() {
            return Err(CheckoutError::device_unavailable(via.to_string(), "disabled"));
        }

        let bagging = self.scale.state();
        if bagging.is_overloaded() {
            return Err(CheckoutError::capacity_exceeded(
                BAGGING_AREA,
                format!(
                    "{} on a {} surface; remove items before scanning",
                    bagging.current, bagging.limit
                ),
            ));
        }

        if self.policy.require_bagging_between_scans {
            let pending = self
                .items
                .iter()
                .map(ScannedItem::weight)
                .sum::<Weight>()
                .saturating_sub(bagging.current);
            if !pending.is_zero() {
                return Err(CheckoutError::BaggingRequired { pending });
            }
        }

        let barcode = scanner
            .scan(item)
            .map_err(|fault| fault.into_checkout_error(&via.to_string()))?;
        debug!(%barcode, item_id = %item.id(), scanner = %via, "Item scanned");

        self.items.push(item.clone());
        Ok(())
    }

    /// Removes a scanned item by identity.
    ///
    /// Refuses with `IntegrityViolation` if the item's weight is still on the
    /// bagging surface and removing it would leave more bagged than scanned.
    pub fn remove_scanned(&mut self, item: &ScannedItem) -> CheckoutResult<ScannedItem> {
        validate_scanned_item(item)?;

        let index = self
            .items
            .iter()
            .position(|scanned| scanned == item)
            .ok_or_else(|| CheckoutError::NotFound(format!("scanned item {}", item.id())))?;

        let remaining = self.scanned_weight().saturating_sub(self.items[index].weight());
        let bagged = self.scale.current_weight();
        if bagged > remaining {
            warn!(%bagged, %remaining, "Refusing to unscan an item that is still bagged");
            return Err(CheckoutError::IntegrityViolation {
                expected: remaining,
                actual: bagged,
            });
        }

        let removed = self.items.remove(index);
        debug!(barcode = %removed.barcode(), item_id = %removed.id(), "Scanned item removed");
        Ok(removed)
    }

    /// Forgets every scanned item.
    pub fn clear_scanned(&mut self) {
        debug!(count = self.items.len(), "Scanned items cleared");
        self.items.clear();
    }

    // =========================================================================
    // Bagging
    // =========================================================================

    /// Places an item on the bagging surface.
    ///
    /// ## Errors
    /// - `InvalidInput`: malformed item
    /// - `DeviceUnavailable`: scale disabled
    /// - `CapacityExceeded`: the item would push the surface over its limit
    /// - `IntegrityViolation`: more would be bagged than was scanned
    pub fn place_in_bagging(&mut self, item: &ScannedItem) -> CheckoutResult<()> {
        validate_scanned_item(item)?;
        self.ensure_scale_enabled()?;

        let bagging = self.scale.state();
        let would_be = bagging.current + item.weight();
        if item.weight() > bagging.headroom() {
            return Err(CheckoutError::capacity_exceeded(
                BAGGING_AREA,
                format!("{} would exceed the {} limit", would_be, bagging.limit),
            ));
        }

        let scanned = self.scanned_weight();
        if would_be > scanned {
            warn!(
                %scanned,
                bagged = %would_be,
                barcode = %item.barcode(),
                "Bagged weight would exceed scanned weight"
            );
            return Err(CheckoutError::IntegrityViolation {
                expected: scanned,
                actual: would_be,
            });
        }

        let event = self
            .scale
            .add(item)
            .map_err(|fault| fault.into_checkout_error(BAGGING_AREA))?;
        log_scale_event(event);
        Ok(())
    }

    /// Takes an item off the bagging surface.
    pub fn remove_from_bagging(&mut self, item: &ScannedItem) -> CheckoutResult<()> {
        validate_scanned_item(item)?;
        self.ensure_scale_enabled()?;

        let event = self.scale.remove(item).map_err(|fault| match fault {
            DeviceFault::NotPresent => {
                CheckoutError::NotFound(format!("item {} in {}", item.id(), BAGGING_AREA))
            }
            other => other.into_checkout_error(BAGGING_AREA),
        })?;
        log_scale_event(event);
        Ok(())
    }

    /// Removes every scanned item from the bagging surface.
    ///
    /// Items that were never bagged are skipped. Whatever is left afterwards
    /// was never scanned.
    ///
    /// ## Errors
    /// `IntegrityViolation` if weight remains on the surface.
    pub fn clear_bagged(&mut self) -> CheckoutResult<()> {
        self.ensure_scale_enabled()?;

        for item in &self.items {
            match self.scale.remove(item) {
                Ok(event) => log_scale_event(event),
                Err(DeviceFault::NotPresent) => {}
                Err(other) => return Err(other.into_checkout_error(BAGGING_AREA)),
            }
        }

        let residual = self.scale.current_weight();
        if !residual.is_zero() {
            warn!(%residual, "Unpaid item left in bagging area");
            return Err(CheckoutError::IntegrityViolation {
                expected: Weight::ZERO,
                actual: residual,
            });
        }

        Ok(())
    }

    fn ensure_scale_enabled(&self) -> CheckoutResult<()> {
        if self.scale.is_disabled() {
            return Err(CheckoutError::device_unavailable(BAGGING_AREA, "disabled"));
        }
        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Items scanned and not yet removed, in scan order.
    pub fn items(&self) -> &[ScannedItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of the weights of all scanned items.
    pub fn scanned_weight(&self) -> Weight {
        self.items.iter().map(ScannedItem::weight).sum()
    }

    /// Scanned weight not yet accounted for on the bagging surface.
    pub fn unbagged_weight(&self) -> Weight {
        self.scanned_weight()
            .saturating_sub(self.scale.current_weight())
    }

    pub fn bagging_state(&self) -> BaggingState {
        self.scale.state()
    }

    pub fn policy(&self) -> ScanPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: ScanPolicy) {
        self.policy = policy;
    }

    pub fn main_scanner(&self) -> &B {
        &self.main_scanner
    }

    pub fn main_scanner_mut(&mut self) -> &mut B {
        &mut self.main_scanner
    }

    pub fn handheld_scanner(&self) -> &B {
        &self.handheld_scanner
    }

    pub fn handheld_scanner_mut(&mut self) -> &mut B {
        &mut self.handheld_scanner
    }

    pub fn scale(&self) -> &S {
        &self.scale
    }

    pub fn scale_mut(&mut self) -> &mut S {
        &mut self.scale
    }
}

fn log_scale_event(event: ScaleEvent) {
    match event {
        ScaleEvent::WeightChanged { weight } => debug!(%weight, "Bagging area weight changed"),
        ScaleEvent::BelowSensitivity => debug!("Bagging area change below sensitivity"),
        ScaleEvent::Overload => warn!("Bagging area overloaded"),
        ScaleEvent::OutOfOverload => debug!("Bagging area no longer overloaded"),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
