//! # Validation Module
//!
//! Argument validation for the checkout session.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Constructors                                                 │
//! │  ├── Barcode::new, ScannedItem::new, Coin::new, ...                    │
//! │  └── Bad raw values never become domain values                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Session operations                                           │
//! │  ├── Re-check values that may have arrived through serde               │
//! │  └── ALWAYS before any device is touched                               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Business rules (scan.rs / payment.rs)                        │
//! │  └── Capacity, integrity, state machine                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use kiosk_core::validation::{validate_barcode, validate_currency_code};
//!
//! assert!(validate_barcode("012345").is_ok());
//! assert!(validate_currency_code("CAD").is_ok());
//! ```

use crate::error::ValidationError;
use crate::types::{Banknote, Coin, PricedProduct, ScannedItem, Tender, Weight};
use crate::{
    MAX_BARCODE_LENGTH, MAX_DESCRIPTION_LENGTH, MAX_ITEM_WEIGHT_GRAMS, MAX_PRODUCT_PRICE_CENTS,
};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates barcode digits.
///
/// ## Rules
/// - Must not be empty
/// - At most `MAX_BARCODE_LENGTH` characters
/// - ASCII digits only
pub fn validate_barcode(code: &str) -> ValidationResult<()> {
    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "barcode".to_string(),
        });
    }

    if code.len() > MAX_BARCODE_LENGTH {
        return Err(ValidationError::TooLong {
            field: "barcode".to_string(),
            max: MAX_BARCODE_LENGTH,
        });
    }

    if !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "barcode".to_string(),
            reason: "must contain only digits".to_string(),
        });
    }

    Ok(())
}

/// Validates a product description.
///
/// ## Rules
/// - Must not be blank
/// - At most `MAX_DESCRIPTION_LENGTH` characters
pub fn validate_description(description: &str) -> ValidationResult<()> {
    let description = description.trim();

    if description.is_empty() {
        return Err(ValidationError::Required {
            field: "description".to_string(),
        });
    }

    if description.len() > MAX_DESCRIPTION_LENGTH {
        return Err(ValidationError::TooLong {
            field: "description".to_string(),
            max: MAX_DESCRIPTION_LENGTH,
        });
    }

    Ok(())
}

/// Validates an ISO 4217 style currency code.
///
/// ## Rules
/// - Exactly three ASCII uppercase letters
pub fn validate_currency_code(code: &str) -> ValidationResult<()> {
    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "currency".to_string(),
        });
    }

    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(ValidationError::InvalidFormat {
            field: "currency".to_string(),
            reason: "must be three uppercase letters".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an item weight.
///
/// ## Rules
/// - Must be positive (zero-weight items cannot be reconciled on a scale)
/// - At most `MAX_ITEM_WEIGHT_GRAMS`
pub fn validate_weight(weight: Weight) -> ValidationResult<()> {
    if weight.is_zero() {
        return Err(ValidationError::MustBePositive {
            field: "weight".to_string(),
        });
    }

    if weight > Weight::from_grams(MAX_ITEM_WEIGHT_GRAMS) {
        return Err(ValidationError::OutOfRange {
            field: "weight (mg)".to_string(),
            min: 1,
            max: (MAX_ITEM_WEIGHT_GRAMS * 1000) as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Composite Validators
// =============================================================================

/// Validates an item before it reaches a scanner or the scale.
pub fn validate_scanned_item(item: &ScannedItem) -> ValidationResult<()> {
    validate_barcode(item.barcode().as_str())?;
    validate_weight(item.weight())
}

/// Validates a catalog product.
///
/// ## Rules
/// - Barcode and description are well formed
/// - Price is between zero (free items) and `MAX_PRODUCT_PRICE_CENTS`
pub fn validate_product(product: &PricedProduct) -> ValidationResult<()> {
    validate_barcode(product.barcode.as_str())?;
    validate_description(&product.description)?;

    let cents = product.price.cents();
    if !(0..=MAX_PRODUCT_PRICE_CENTS).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: MAX_PRODUCT_PRICE_CENTS,
        });
    }

    Ok(())
}

/// Validates a coin: its value must be positive.
pub fn validate_coin(coin: &Coin) -> ValidationResult<()> {
    validate_currency_code(coin.currency.code())?;

    if !coin.value.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "coin value".to_string(),
        });
    }

    Ok(())
}

/// Validates a banknote: its denomination must be positive.
pub fn validate_banknote(note: &Banknote) -> ValidationResult<()> {
    validate_currency_code(note.currency.code())?;

    if note.denomination == 0 {
        return Err(ValidationError::MustBePositive {
            field: "banknote denomination".to_string(),
        });
    }

    Ok(())
}

/// Validates either kind of tender.
pub fn validate_tender(tender: &Tender) -> ValidationResult<()> {
    match tender {
        Tender::Coin(coin) => validate_coin(coin),
        Tender::Banknote(note) => validate_banknote(note),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
