//! # Error Types
//!
//! Domain-specific error types for wholesale-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  wholesale-core errors (this file)                                     │
//! │  ├── CoreError        - Ledger rule violations                         │
//! │  └── ValidationError  - Input validation failures (InvalidInput)       │
//! │                                                                         │
//! │  wholesale-db errors (separate crate)                                  │
//! │  └── DbError          - Storage failures, wraps CoreError              │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → caller                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every variant is raised before the ledger is touched, so a caller that
//! receives an error can assume the state is exactly as it was.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Ledger rule violations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Item id is not in the catalog.
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// Customer id is not in the directory.
    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    /// Sale id is not in the sales log.
    #[error("Sale not found: {0}")]
    SaleNotFound(String),

    /// Requested quantity is more than the item has on hand.
    ///
    /// ## User Workflow
    /// ```text
    /// Add to Cart (qty: 8)
    ///      │
    ///      ▼
    /// Check stock: available=7
    ///      │
    ///      ▼
    /// InsufficientStock { item_id: "item-1", available: 7, requested: 8 }
    ///      │
    ///      ▼
    /// Line is not added, cart unchanged
    /// ```
    #[error("Insufficient stock for {item_id}: available {available}, requested {requested}")]
    InsufficientStock {
        item_id: String,
        available: i64,
        requested: i64,
    },

    /// The item already has a line in this cart.
    #[error("Item {0} is already in the cart")]
    DuplicateLine(String),

    /// Checkout attempted with no lines.
    #[error("Cart is empty")]
    EmptyCart,

    /// An entity with this id already exists.
    #[error("{entity} '{id}' already exists")]
    AlreadyExists { entity: &'static str, id: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// True for errors a caller should present as "bad input" rather than a
    /// ledger conflict.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, CoreError::Validation(_) | CoreError::EmptyCart)
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
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

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Applying the value would overflow a running quantity or amount.
    #[error("{field} is too large")]
    TooLarge { field: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            item_id: "item-1".to_string(),
            available: 7,
            requested: 8,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for item-1: available 7, requested 8"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "customerId".to_string(),
        };
        assert_eq!(err.to_string(), "customerId is required");

        let err = ValidationError::OutOfRange {
            field: "discountPercentage".to_string(),
            min: 0,
            max: 100,
        };
        assert_eq!(err.to_string(), "discountPercentage must be between 0 and 100");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert!(core_err.is_invalid_input());
    }
}
