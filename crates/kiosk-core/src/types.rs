//! # Domain Types
//!
//! Core domain types used throughout the checkout session.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  ScannedItem    │   │ PricedProduct   │   │     Tender      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  barcode        │   │  Coin           │       │
//! │  │  barcode        │   │  description    │   │  Banknote       │       │
//! │  │  weight (mg)    │   │  price (cents)  │   │  (+ Currency)   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Weight       │   │  SessionPhase   │   │  BaggingState   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  milligrams     │   │  Scanning       │   │  current        │       │
//! │  │  (u64)          │   │  Paying         │   │  limit          │       │
//! │  └─────────────────┘   │  Settled        │   │  sensitivity    │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity vs Business Key
//! A `ScannedItem` has:
//! - `id`: UUID v4, unique per physical item, used for removal by identity
//! - `barcode`: the business key, shared by every can of the same soup

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;
use uuid::Uuid;

use crate::error::{CheckoutResult, ValidationError};
use crate::money::Money;
use crate::validation;

// =============================================================================
// Barcode
// =============================================================================

/// A product barcode (numeric digits only, e.g. UPC/EAN payloads).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Barcode(String);

impl Barcode {
    /// Creates a barcode after validating its digits.
    ///
    /// ## Example
    /// ```rust
    /// use kiosk_core::types::Barcode;
    ///
    /// assert!(Barcode::new("012345").is_ok());
    /// assert!(Barcode::new("").is_err());
    /// assert!(Barcode::new("12-34").is_err());
    /// ```
    pub fn new(code: impl Into<String>) -> Result<Self, ValidationError> {
        let code = code.into();
        validation::validate_barcode(&code)?;
        Ok(Barcode(code))
    }

    /// Returns the barcode digits.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Barcode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Barcode::new(value)
    }
}

impl From<Barcode> for String {
    fn from(barcode: Barcode) -> Self {
        barcode.0
    }
}

impl fmt::Display for Barcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Weight
// =============================================================================

/// A weight in milligrams.
///
/// ## Why Integer Milligrams?
/// The bagging check compares the scale total against the sum of scanned
/// weights. Bagging "exactly up to" the scanned weight must succeed, which
/// only holds reliably when both sides are summed without rounding.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Weight(u64);

impl Weight {
    /// No weight at all.
    pub const ZERO: Weight = Weight(0);

    /// Creates a weight from milligrams.
    #[inline]
    pub const fn from_milligrams(mg: u64) -> Self {
        Weight(mg)
    }

    /// Creates a weight from whole grams, saturating at `u64::MAX` mg.
    #[inline]
    pub const fn from_grams(grams: u64) -> Self {
        Weight(grams.saturating_mul(1000))
    }

    /// Returns the weight in milligrams.
    #[inline]
    pub const fn milligrams(&self) -> u64 {
        self.0
    }

    /// Returns the whole-gram part of the weight.
    #[inline]
    pub const fn grams(&self) -> u64 {
        self.0 / 1000
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Subtracts, stopping at zero.
    #[inline]
    pub const fn saturating_sub(self, other: Weight) -> Weight {
        Weight(self.0.saturating_sub(other.0))
    }

    /// Absolute difference between two weights.
    #[inline]
    pub const fn abs_diff(self, other: Weight) -> Weight {
        Weight(self.0.abs_diff(other.0))
    }
}

impl Add for Weight {
    type Output = Weight;

    #[inline]
    fn add(self, other: Weight) -> Weight {
        Weight(self.0 + other.0)
    }
}

impl Sum for Weight {
    fn sum<I: Iterator<Item = Weight>>(iter: I) -> Self {
        iter.fold(Weight::ZERO, Add::add)
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mg = self.0 % 1000;
        if mg == 0 {
            write!(f, "{}g", self.grams())
        } else {
            write!(f, "{}.{:03}g", self.grams(), mg)
        }
    }
}

// =============================================================================
// Scanned Item
// =============================================================================

/// Unique identity of one physical item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(Uuid);

impl ItemId {
    /// Generates a fresh identity.
    pub fn new() -> Self {
        ItemId(Uuid::new_v4())
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A physical item the customer holds up to a scanner.
///
/// Owned by the scan session once scanned. Equality is by identity, so two
/// identical cans are two different items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannedItem {
    id: ItemId,
    barcode: Barcode,
    weight: Weight,
}

impl ScannedItem {
    /// Creates a new item with a fresh identity.
    ///
    /// ## Errors
    /// `InvalidInput` if the weight is zero.
    pub fn new(barcode: Barcode, weight: Weight) -> CheckoutResult<Self> {
        validation::validate_weight(weight)?;
        Ok(ScannedItem {
            id: ItemId::new(),
            barcode,
            weight,
        })
    }

    /// Convenience constructor from raw barcode digits and grams.
    pub fn parse(barcode: &str, grams: u64) -> CheckoutResult<Self> {
        ScannedItem::new(Barcode::new(barcode)?, Weight::from_grams(grams))
    }

    #[inline]
    pub fn id(&self) -> ItemId {
        self.id
    }

    #[inline]
    pub fn barcode(&self) -> &Barcode {
        &self.barcode
    }

    #[inline]
    pub fn weight(&self) -> Weight {
        self.weight
    }
}

impl PartialEq for ScannedItem {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ScannedItem {}

// =============================================================================
// Priced Product
// =============================================================================

/// A catalog entry: what a barcode costs.
///
/// Uses the snapshot pattern: the payment session keeps its own frozen copy,
/// so a catalog update mid-session cannot change what is owed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedProduct {
    pub barcode: Barcode,
    pub description: String,
    /// Price in cents (smallest currency unit).
    pub price: Money,
}

impl PricedProduct {
    /// Creates a product after validating its description and price.
    pub fn new(
        barcode: Barcode,
        description: impl Into<String>,
        price: Money,
    ) -> Result<Self, ValidationError> {
        let product = PricedProduct {
            barcode,
            description: description.into(),
            price,
        };
        validation::validate_product(&product)?;
        Ok(product)
    }
}

// =============================================================================
// Currency & Tenders
// =============================================================================

/// A three-letter ISO 4217 currency code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency([u8; 3]);

impl Currency {
    pub const CAD: Currency = Currency(*b"CAD");
    pub const USD: Currency = Currency(*b"USD");
    pub const EUR: Currency = Currency(*b"EUR");

    /// Parses a currency code.
    ///
    /// ## Example
    /// ```rust
    /// use kiosk_core::types::Currency;
    ///
    /// assert_eq!(Currency::new("CAD").unwrap(), Currency::CAD);
    /// assert!(Currency::new("cad").is_err());
    /// assert!(Currency::new("CADX").is_err());
    /// ```
    pub fn new(code: &str) -> Result<Self, ValidationError> {
        validation::validate_currency_code(code)?;
        let bytes = code.as_bytes();
        Ok(Currency([bytes[0], bytes[1], bytes[2]]))
    }

    /// Returns the code as a string slice.
    pub fn code(&self) -> &str {
        // Only ASCII uppercase letters ever get in through `new`.
        std::str::from_utf8(&self.0).unwrap_or("???")
    }
}

impl TryFrom<String> for Currency {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Currency::new(&value)
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> Self {
        currency.code().to_string()
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A coin presented for payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub value: Money,
    pub currency: Currency,
}

impl Coin {
    /// Creates a coin; the value must be positive.
    pub fn new(value: Money, currency: Currency) -> CheckoutResult<Self> {
        let coin = Coin { value, currency };
        validation::validate_coin(&coin)?;
        Ok(coin)
    }
}

/// A banknote presented for payment. Denominations are whole units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Banknote {
    pub denomination: u32,
    pub currency: Currency,
}

impl Banknote {
    /// Creates a banknote; the denomination must be positive.
    pub fn new(denomination: u32, currency: Currency) -> CheckoutResult<Self> {
        let note = Banknote {
            denomination,
            currency,
        };
        validation::validate_banknote(&note)?;
        Ok(note)
    }

    /// Face value as Money.
    #[inline]
    pub fn value(&self) -> Money {
        Money::from_major(i64::from(self.denomination))
    }
}

/// Either kind of tender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Tender {
    Coin(Coin),
    Banknote(Banknote),
}

impl Tender {
    pub fn value(&self) -> Money {
        match self {
            Tender::Coin(coin) => coin.value,
            Tender::Banknote(note) => note.value(),
        }
    }

    pub fn currency(&self) -> Currency {
        match self {
            Tender::Coin(coin) => coin.currency,
            Tender::Banknote(note) => note.currency,
        }
    }

    /// Short label used in logs and error messages.
    pub fn label(&self) -> &'static str {
        match self {
            Tender::Coin(_) => "coin",
            Tender::Banknote(_) => "banknote",
        }
    }
}

impl From<Coin> for Tender {
    fn from(coin: Coin) -> Self {
        Tender::Coin(coin)
    }
}

impl From<Banknote> for Tender {
    fn from(note: Banknote) -> Self {
        Tender::Banknote(note)
    }
}

// =============================================================================
// Scanner Selection
// =============================================================================

/// Which of the station's two scanners an item goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScannerKind {
    /// The flatbed scanner built into the station.
    Main,
    /// The handheld gun for bulky items.
    Handheld,
}

impl fmt::Display for ScannerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScannerKind::Main => write!(f, "main scanner"),
            ScannerKind::Handheld => write!(f, "handheld scanner"),
        }
    }
}

// =============================================================================
// Session Phase
// =============================================================================

/// Where a checkout session is in its lifecycle.
///
/// ## Transitions
/// ```text
/// ┌──────────┐  first tender presented  ┌──────────┐  balance <= 0  ┌──────────┐
/// │ Scanning │ ───────────────────────► │  Paying  │ ─────────────► │ Settled  │
/// └──────────┘                          └──────────┘                └──────────┘
///      ▲                                                                 │
///      └──────────────────────── explicit reset ─────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Items may be scanned, bagged and re-priced.
    #[default]
    Scanning,
    /// A tender has been presented; the item set is frozen.
    Paying,
    /// Nothing more is owed.
    Settled,
}

impl SessionPhase {
    /// Returns true while the item set may still change.
    pub fn accepts_item_changes(&self) -> bool {
        matches!(self, SessionPhase::Scanning)
    }

    /// Returns true once the session can take no more tenders.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionPhase::Settled)
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionPhase::Scanning => write!(f, "scanning"),
            SessionPhase::Paying => write!(f, "paying"),
            SessionPhase::Settled => write!(f, "settled"),
        }
    }
}

// =============================================================================
// Bagging State
// =============================================================================

/// Snapshot of the bagging surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaggingState {
    /// Weight currently on the surface.
    pub current: Weight,
    /// Maximum weight the surface accepts.
    pub limit: Weight,
    /// Changes smaller than this are not reported by the scale.
    pub sensitivity: Weight,
}

impl BaggingState {
    /// Returns true when the surface holds more than its limit.
    pub fn is_overloaded(&self) -> bool {
        self.current > self.limit
    }

    /// Weight that can still be added before reaching the limit.
    pub fn headroom(&self) -> Weight {
        self.limit.saturating_sub(self.current)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
