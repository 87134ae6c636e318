//! # Domain Types
//!
//! Core domain types used throughout the wholesale ledger.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Leaf entities (mutable)        Transaction log (immutable records)    │
//! │  ┌─────────────────┐            ┌─────────────────┐                    │
//! │  │      Item       │◄───────────│      Sale       │                    │
//! │  │  costPrice      │  itemId    │  customerId     │                    │
//! │  │  sellingPrice   │            │  items[]  ──────┼──► CartItem        │
//! │  │  stock          │            │  totalAmount    │    (frozen name,   │
//! │  │  targetSale     │            └─────────────────┘     price, disc.)  │
//! │  └─────────────────┘            ┌─────────────────┐                    │
//! │  ┌─────────────────┐            │    Purchase     │  itemId, quantity  │
//! │  │    Customer     │            └─────────────────┘                    │
//! │  │  creditBalance  │◄───────────┌─────────────────┐                    │
//! │  └─────────────────┘            │     Payment     │  customerId, amount│
//! │  ┌─────────────────┐            └─────────────────┘                    │
//! │  │    Discount     │  (customerId, itemId) → percentage                │
//! │  └─────────────────┘                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Field names on the wire are camelCase (`costPrice`, `creditBalance`, ...).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::validation::ValidationResult;

// =============================================================================
// Discount Percent
// =============================================================================

/// A discount percentage in the closed range 0–100.
///
/// Constructed only through [`DiscountPercent::new`], so every value in the
/// ledger is in range. Deserialization goes through the same check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(try_from = "Decimal", into = "Decimal")]
#[ts(export)]
pub struct DiscountPercent(#[ts(type = "string")] Decimal);

impl DiscountPercent {
    /// Validates and wraps a percentage.
    pub fn new(percent: Decimal) -> ValidationResult<Self> {
        if percent < Decimal::ZERO || percent > Decimal::ONE_HUNDRED {
            return Err(ValidationError::OutOfRange {
                field: "discountPercentage".to_string(),
                min: 0,
                max: 100,
            });
        }
        Ok(DiscountPercent(percent))
    }

    /// Convenience constructor for whole percentages.
    pub fn from_whole(percent: i64) -> ValidationResult<Self> {
        Self::new(Decimal::from(percent))
    }

    /// No discount.
    #[inline]
    pub const fn zero() -> Self {
        DiscountPercent(Decimal::ZERO)
    }

    /// Returns the percentage (10 means 10%).
    #[inline]
    pub const fn value(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl Default for DiscountPercent {
    fn default() -> Self {
        DiscountPercent::zero()
    }
}

impl TryFrom<Decimal> for DiscountPercent {
    type Error = ValidationError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        DiscountPercent::new(value)
    }
}

impl From<DiscountPercent> for Decimal {
    fn from(percent: DiscountPercent) -> Self {
        percent.0
    }
}

// =============================================================================
// Item
// =============================================================================

/// A catalog item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Item {
    /// Unique identifier (e.g. `item-3`).
    pub id: String,

    /// Display name shown on invoices.
    pub name: String,

    /// What the business pays per unit. Used for profit.
    pub cost_price: Money,

    /// What the customer pays per unit before discount.
    pub selling_price: Money,

    /// Units on hand.
    pub stock: i64,

    /// Informational sales goal, used only by reports.
    pub target_sale: i64,
}

impl Item {
    /// Checks whether `quantity` units can be taken from current stock.
    pub fn can_sell(&self, quantity: i64) -> bool {
        self.stock >= quantity
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A customer and their running credit balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Customer {
    pub id: String,
    pub name: String,

    /// Positive means the customer owes the business.
    pub credit_balance: Money,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub phone: Option<String>,
}

impl Customer {
    /// Amount to pre-fill when receiving a payment: the outstanding balance,
    /// or zero if the customer is in credit.
    pub fn suggested_payment(&self) -> Money {
        if self.credit_balance.is_positive() {
            self.credit_balance
        } else {
            Money::zero()
        }
    }
}

// =============================================================================
// Discount
// =============================================================================

/// Per-customer, per-item discount override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Discount {
    pub customer_id: String,
    pub item_id: String,
    pub discount_percentage: DiscountPercent,
}

impl Discount {
    /// Returns true if this record is for the given pair.
    #[inline]
    pub fn matches(&self, customer_id: &str, item_id: &str) -> bool {
        self.customer_id == customer_id && self.item_id == item_id
    }
}

// =============================================================================
// Cart Item
// =============================================================================

/// A priced line, either in a cart or inside a posted sale.
///
/// Uses the snapshot pattern: `item_name`, `unit_price` and `discount` are
/// frozen when the line is priced and never re-resolved from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartItem {
    pub item_id: String,
    pub item_name: String,
    pub quantity: i64,
    pub unit_price: Money,

    /// Absolute discount per unit (not a percentage).
    pub discount: Money,
}

impl CartItem {
    /// Price per unit after discount.
    #[inline]
    pub fn net_unit_price(&self) -> Money {
        self.unit_price - self.discount
    }

    /// (unitPrice − discount) × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.net_unit_price().multiply_quantity(self.quantity)
    }

    /// Margin on this line against the given per-unit cost.
    #[inline]
    pub fn line_profit(&self, cost_price: Money) -> Money {
        (self.net_unit_price() - cost_price).multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A posted sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Sale {
    pub id: String,
    pub customer_id: String,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    pub items: Vec<CartItem>,

    /// Stored once at posting time, never re-derived.
    pub total_amount: Money,
}

impl Sale {
    /// Σ line totals, the value stored in `total_amount` at posting.
    pub fn compute_total(items: &[CartItem]) -> Money {
        items.iter().map(CartItem::line_total).sum()
    }

    /// [`Sale::compute_total`], or `None` if a line or the sum overflows.
    pub fn checked_total(items: &[CartItem]) -> Option<Money> {
        items.iter().try_fold(Money::zero(), |total, line| {
            let net = line.net_unit_price().amount();
            let line_total = net.checked_mul(Decimal::from(line.quantity))?;
            total.amount().checked_add(line_total).map(Money::new)
        })
    }

    /// Total units across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.items
            .iter()
            .fold(0i64, |sum, i| sum.saturating_add(i.quantity))
    }
}

// =============================================================================
// Purchase
// =============================================================================

/// Stock received from a supplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Purchase {
    pub id: String,
    pub item_id: String,
    pub quantity: i64,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
}

// =============================================================================
// Payment
// =============================================================================

/// Money received from a customer against their credit balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Payment {
    pub id: String,
    pub customer_id: String,
    pub amount: Money,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(unit: i64, discount: Decimal, qty: i64) -> CartItem {
        CartItem {
            item_id: "item-1".to_string(),
            item_name: "Rice".to_string(),
            quantity: qty,
            unit_price: Money::from_major(unit),
            discount: Money::new(discount),
        }
    }

    #[test]
    fn test_discount_percent_range() {
        assert!(DiscountPercent::from_whole(0).is_ok());
        assert!(DiscountPercent::from_whole(100).is_ok());
        assert!(DiscountPercent::new(dec!(12.5)).is_ok());
        assert!(DiscountPercent::from_whole(-1).is_err());
        assert!(DiscountPercent::from_whole(101).is_err());
    }

    #[test]
    fn test_discount_percent_deserialize_is_validated() {
        let ok: DiscountPercent = serde_json::from_str("10").unwrap();
        assert_eq!(ok.value(), dec!(10));
        assert!(serde_json::from_str::<DiscountPercent>("150").is_err());
    }

    #[test]
    fn test_line_total_and_profit() {
        let l = line(150, dec!(15), 2);
        assert_eq!(l.line_total(), Money::from_major(270));
        assert_eq!(l.line_profit(Money::from_major(100)), Money::from_major(70));
    }

    #[test]
    fn test_sale_compute_total() {
        let items = vec![line(150, dec!(0), 3), line(100, dec!(2.5), 4)];
        assert_eq!(Sale::compute_total(&items), Money::from_major(840));
    }

    #[test]
    fn test_suggested_payment() {
        let mut c = Customer {
            id: "cust-1".to_string(),
            name: "Retail Store #1".to_string(),
            credit_balance: Money::from_major(250),
            phone: None,
        };
        assert_eq!(c.suggested_payment(), Money::from_major(250));

        c.credit_balance = Money::from_major(-20);
        assert_eq!(c.suggested_payment(), Money::zero());
    }

    #[test]
    fn test_wire_field_names() {
        let item = Item {
            id: "item-1".to_string(),
            name: "Rice".to_string(),
            cost_price: Money::from_major(100),
            selling_price: Money::from_major(150),
            stock: 10,
            target_sale: 5,
        };
        let json = serde_json::to_value(&item).unwrap();
        assert!(json.get("costPrice").is_some());
        assert!(json.get("sellingPrice").is_some());
        assert!(json.get("targetSale").is_some());
    }
}
