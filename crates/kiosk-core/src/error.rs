//! # Error Types
//!
//! Domain-specific error types for kiosk-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  kiosk-core errors (this file)                                         │
//! │  ├── CheckoutError    - Session rule violations and device refusals    │
//! │  └── ValidationError  - Malformed arguments (always checked first)     │
//! │                                                                         │
//! │  kiosk-sim errors (separate crate)                                     │
//! │  └── SimError         - Config / seed loading failures                 │
//! │                                                                         │
//! │  Flow: ValidationError → CheckoutError → SimError → caller             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (barcode, weight, device)
//! 3. Errors are enum variants, never String
//! 4. Nothing is printed and swallowed: every failure reaches the caller

use serde::Serialize;
use thiserror::Error;

use crate::types::Weight;

// =============================================================================
// Checkout Error
// =============================================================================

/// Errors raised by the scan/bag/pay operations.
///
/// All of them are local and synchronous. The core never retries; the caller
/// decides whether to try again (e.g. with another tender) or abort.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    /// An argument failed validation.
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] ValidationError),

    /// The targeted device is disabled or cannot take the request right now.
    #[error("{device} is unavailable: {reason}")]
    DeviceUnavailable { device: String, reason: String },

    /// A storage unit is full or the bagging surface would be overloaded.
    ///
    /// ## When This Occurs
    /// ```text
    /// Insert coin
    ///      │
    ///      ▼
    /// coin storage: count == capacity
    ///      │
    ///      ▼
    /// CapacityExceeded { resource: "coin storage", .. }
    ///      │
    ///      ▼
    /// Validator is NEVER invoked, balance untouched
    /// ```
    #[error("{resource} capacity exceeded: {detail}")]
    CapacityExceeded { resource: String, detail: String },

    /// Bagged weight exceeds what was scanned: something unscanned is on
    /// the bagging surface.
    #[error("Unscanned object in bagging area: expected at most {expected}, found {actual}")]
    IntegrityViolation { expected: Weight, actual: Weight },

    /// An item or product is not where the caller expected it.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Item changes were attempted after a tender was presented.
    #[error("Payment is in progress; scanned items can no longer change")]
    PaymentInProgress,

    /// A tender was presented when nothing is owed.
    #[error("Balance is already settled")]
    BalanceAlreadySettled,

    /// The station requires the previous item to be bagged before scanning.
    #[error("Bag the previous item before scanning another ({pending} not yet bagged)")]
    BaggingRequired { pending: Weight },
}

impl CheckoutError {
    /// Shorthand for a disabled or blocked device.
    pub fn device_unavailable(device: impl Into<String>, reason: impl Into<String>) -> Self {
        CheckoutError::DeviceUnavailable {
            device: device.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for a capacity failure.
    pub fn capacity_exceeded(resource: impl Into<String>, detail: impl Into<String>) -> Self {
        CheckoutError::CapacityExceeded {
            resource: resource.into(),
            detail: detail.into(),
        }
    }

    /// Returns the machine-readable code for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CheckoutError::InvalidInput(_) => ErrorKind::InvalidInput,
            CheckoutError::DeviceUnavailable { .. } => ErrorKind::DeviceUnavailable,
            CheckoutError::CapacityExceeded { .. } => ErrorKind::CapacityExceeded,
            CheckoutError::IntegrityViolation { .. } => ErrorKind::IntegrityViolation,
            CheckoutError::NotFound(_) => ErrorKind::NotFound,
            CheckoutError::PaymentInProgress => ErrorKind::PaymentInProgress,
            CheckoutError::BalanceAlreadySettled => ErrorKind::BalanceAlreadySettled,
            CheckoutError::BaggingRequired { .. } => ErrorKind::BaggingRequired,
        }
    }
}

/// Error codes for callers that branch on the failure category.
///
/// ## Serialization
/// ```json
/// "INTEGRITY_VIOLATION"
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    InvalidInput,
    DeviceUnavailable,
    CapacityExceeded,
    IntegrityViolation,
    NotFound,
    PaymentInProgress,
    BalanceAlreadySettled,
    BaggingRequired,
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when an argument is malformed. They are checked before
/// any device is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., non-digit barcode, lowercase currency code).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CheckoutError.
pub type CheckoutResult<T> = Result<T, CheckoutError>;

// =============================================================================
// Unit Tests
// =============================================================================
