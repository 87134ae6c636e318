//! # Validation Module
//!
//! Input validation for everything that enters the ledger.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Presentation (outside this workspace)                        │
//! │  └── Form-level hints, immediate feedback                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (boundary checks)                                │
//! │  ├── ids and names present                                             │
//! │  ├── quantities and payments positive                                  │
//! │  └── prices non-negative                                               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Value types                                                  │
//! │  └── DiscountPercent cannot hold a value outside 0..=100               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use wholesale_core::validation::{validate_id, validate_quantity};
//!
//! validate_id("itemId", "item-1").unwrap();
//! assert!(validate_quantity(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{Customer, Item};
use crate::MAX_NAME_LENGTH;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates an entity id reference (customer, item).
///
/// ## Rules
/// - Must not be empty or whitespace
pub fn validate_id(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a display name.
///
/// ## Rules
/// - Must not be empty
/// - At most `MAX_NAME_LENGTH` characters
pub fn validate_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line or purchase quantity.
///
/// ## Rules
/// - Must be positive (> 0)
///
/// Wholesale orders have no upper bound; stock is the only ceiling.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    Ok(())
}

/// Validates a payment amount.
///
/// ## Rules
/// - Must be positive (> 0)
/// - May exceed the outstanding balance (the customer goes into credit)
pub fn validate_payment_amount(amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }
    Ok(())
}

/// Validates a price.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free goods)
pub fn validate_price(field: &str, price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Entity Validators
// =============================================================================

/// Validates a full item record before it is added to the catalog.
///
/// Stock is not checked: an administrative correction may record a
/// negative count.
pub fn validate_item(item: &Item) -> ValidationResult<()> {
    validate_id("id", &item.id)?;
    validate_name(&item.name)?;
    validate_price("costPrice", item.cost_price)?;
    validate_price("sellingPrice", item.selling_price)?;
    Ok(())
}

/// Validates a full customer record before it is added to the directory.
pub fn validate_customer(customer: &Customer) -> ValidationResult<()> {
    validate_id("id", &customer.id)?;
    validate_name(&customer.name)?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
