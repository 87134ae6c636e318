//! # Pricing Engine
//!
//! Turns (item, customer, quantity) into a priced [`CartItem`].
//!
//! ## Pricing Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  price_line(item, discounts, customer_id, quantity)                     │
//! │       │                                                                 │
//! │       ├── quantity <= 0?          → InvalidInput                        │
//! │       ├── quantity > item.stock?  → InsufficientStock                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  percent  = discounts[(customer_id, item.id)] or 0%                     │
//! │  discount = sellingPrice × percent / 100     (full precision)           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CartItem { itemName, unitPrice, discount } frozen from the item now    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The stock check is a point-in-time read, not a reservation.

use crate::error::{CoreError, CoreResult};
use crate::state::LedgerState;
use crate::types::{CartItem, Discount, DiscountPercent, Item};
use crate::validation::validate_quantity;

/// Looks up the discount for a pair; absent means 0%.
pub fn resolve_discount(discounts: &[Discount], customer_id: &str, item_id: &str) -> DiscountPercent {
    discounts
        .iter()
        .find(|d| d.matches(customer_id, item_id))
        .map(|d| d.discount_percentage)
        .unwrap_or_default()
}

/// Prices one line for `customer_id`.
///
/// Pure: the same inputs always produce the same `CartItem`.
///
/// ## Example
/// ```rust
/// use wholesale_core::pricing::price_line;
/// use wholesale_core::{Discount, DiscountPercent, Item, Money};
///
/// let rice = Item {
///     id: "item-1".into(),
///     name: "Rice".into(),
///     cost_price: Money::from_major(100),
///     selling_price: Money::from_major(150),
///     stock: 10,
///     target_sale: 0,
/// };
/// let discounts = vec![Discount {
///     customer_id: "cust-1".into(),
///     item_id: "item-1".into(),
///     discount_percentage: DiscountPercent::from_whole(10).unwrap(),
/// }];
///
/// let line = price_line(&rice, &discounts, "cust-1", 2).unwrap();
/// assert_eq!(line.discount, Money::from_major(15));
/// assert_eq!(line.line_total(), Money::from_major(270));
/// ```
pub fn price_line(
    item: &Item,
    discounts: &[Discount],
    customer_id: &str,
    quantity: i64,
) -> CoreResult<CartItem> {
    validate_quantity(quantity)?;

    if !item.can_sell(quantity) {
        return Err(CoreError::InsufficientStock {
            item_id: item.id.clone(),
            available: item.stock,
            requested: quantity,
        });
    }

    let percent = resolve_discount(discounts, customer_id, &item.id);

    Ok(CartItem {
        item_id: item.id.clone(),
        item_name: item.name.clone(),
        quantity,
        unit_price: item.selling_price,
        discount: item.selling_price.percentage(percent),
    })
}

impl LedgerState {
    /// Resolves `item_id` in the catalog and prices the line.
    pub fn price_line(&self, item_id: &str, customer_id: &str, quantity: i64) -> CoreResult<CartItem> {
        let item = self.require_item(item_id)?;
        price_line(item, &self.discounts, customer_id, quantity)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
