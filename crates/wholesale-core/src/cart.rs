//! # Cart
//!
//! The sale being assembled for one customer. A cart lives outside the
//! [`LedgerState`] until checkout; nothing in it touches stock or balances.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Select customer ────────► Cart::new(customer_id)                       │
//! │                                                                         │
//! │  Add item + qty ─────────► cart.add(&state, item_id, qty)               │
//! │                             └── priced via LedgerState::price_line      │
//! │                                                                         │
//! │  Click remove ───────────► cart.remove(item_id)                         │
//! │                                                                         │
//! │  Complete sale ──────────► state.checkout(cart, policy, stamp)          │
//! │                                                                         │
//! │  NOTE: changing the customer starts a new cart, because discounts are   │
//! │        resolved per customer when a line is added.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::state::LedgerState;
use crate::types::{CartItem, Item};
use crate::validation::validate_id;

/// A cart in progress.
///
/// ## Invariants
/// - Lines are unique by `item_id` (an item already in the cart cannot be
///   added again; remove it first)
/// - Every line was priced for `customer_id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    customer_id: String,
    lines: Vec<CartItem>,
}

impl Cart {
    /// Starts an empty cart for a customer.
    pub fn new(customer_id: impl Into<String>) -> CoreResult<Self> {
        let customer_id = customer_id.into();
        validate_id("customerId", &customer_id)?;
        Ok(Cart {
            customer_id,
            lines: Vec::new(),
        })
    }

    /// Prices `item_id` for this cart's customer and appends the line.
    ///
    /// ## Errors
    /// - `ItemNotFound` if the item is not in the catalog
    /// - `InsufficientStock` if `quantity` exceeds current stock
    /// - `DuplicateLine` if the item already has a line
    /// - `Validation` if `quantity` is not positive
    ///
    /// On error the cart is unchanged.
    pub fn add(&mut self, state: &LedgerState, item_id: &str, quantity: i64) -> CoreResult<&CartItem> {
        if self.contains(item_id) {
            return Err(CoreError::DuplicateLine(item_id.to_string()));
        }

        let line = state.price_line(item_id, &self.customer_id, quantity)?;
        debug!(
            customer_id = %self.customer_id,
            item_id,
            quantity,
            discount = %line.discount,
            "Added cart line"
        );
        self.lines.push(line);
        Ok(&self.lines[self.lines.len() - 1])
    }

    /// Removes the line for `item_id`. Returns false if there was none.
    pub fn remove(&mut self, item_id: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.item_id != item_id);
        self.lines.len() != before
    }

    pub fn contains(&self, item_id: &str) -> bool {
        self.lines.iter().any(|l| l.item_id == item_id)
    }

    /// Catalog items that can still be added: not yet in the cart and with
    /// stock left.
    ///
    /// Out-of-stock items are left out as well, since [`Cart::add`] would
    /// refuse them with `InsufficientStock`.
    pub fn available_items<'a>(&self, state: &'a LedgerState) -> Vec<&'a Item> {
        state
            .items
            .iter()
            .filter(|i| i.stock > 0 && !self.contains(&i.id))
            .collect()
    }

    /// Line total for `item_id`, if present.
    pub fn line_total(&self, item_id: &str) -> Option<Money> {
        self.lines
            .iter()
            .find(|l| l.item_id == item_id)
            .map(CartItem::line_total)
    }

    /// Σ line totals. This is what the sale will be posted for.
    pub fn total(&self) -> Money {
        self.lines.iter().map(CartItem::line_total).sum()
    }

    pub fn total_quantity(&self) -> i64 {
        self.lines
            .iter()
            .fold(0i64, |sum, l| sum.saturating_add(l.quantity))
    }

    pub fn item_count(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[CartItem] {
        &self.lines
    }

    pub fn customer_id(&self) -> &str {
        &self.customer_id
    }

    /// Consumes the cart, returning the customer id and the priced lines.
    pub fn into_parts(self) -> (String, Vec<CartItem>) {
        (self.customer_id, self.lines)
    }
}

/// Cart summary for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartTotals {
    pub customer_id: String,
    pub item_count: usize,
    pub total_quantity: i64,
    pub total: Money,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        CartTotals {
            customer_id: cart.customer_id.clone(),
            item_count: cart.item_count(),
            total_quantity: cart.total_quantity(),
            total: cart.total(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Customer, DiscountPercent};

    fn state() -> LedgerState {
        let mut state = LedgerState::empty();
        for (id, price, stock) in [("item-1", 150, 10), ("item-2", 100, 0), ("item-3", 80, 5)] {
            state
                .add_item(Item {
                    id: id.to_string(),
                    name: format!("Item {id}"),
                    cost_price: Money::from_major(price - 20),
                    selling_price: Money::from_major(price),
                    stock,
                    target_sale: 0,
                })
                .unwrap();
        }
        state
            .add_customer(Customer {
                id: "cust-1".to_string(),
                name: "Retail Store #1".to_string(),
                credit_balance: Money::zero(),
                phone: None,
            })
            .unwrap();
        state
            .upsert_discount("cust-1", "item-1", DiscountPercent::from_whole(10).unwrap())
            .unwrap();
        state
    }

    #[test]
    fn test_new_requires_customer() {
        assert!(Cart::new("").unwrap_err().is_invalid_input());
    }

    #[test]
    fn test_add_prices_with_customer_discount() {
        let state = state();
        let mut cart = Cart::new("cust-1").unwrap();

        let line = cart.add(&state, "item-1", 2).unwrap();
        assert_eq!(line.discount, Money::from_major(15));
        assert_eq!(cart.total(), Money::from_major(270));
        assert_eq!(cart.line_total("item-1"), Some(Money::from_major(270)));
    }

    #[test]
    fn test_add_duplicate_rejected() {
        let state = state();
        let mut cart = Cart::new("cust-1").unwrap();
        cart.add(&state, "item-1", 1).unwrap();

        assert!(matches!(
            cart.add(&state, "item-1", 1),
            Err(CoreError::DuplicateLine(_))
        ));
        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn test_add_over_stock_leaves_cart_unchanged() {
        let state = state();
        let mut cart = Cart::new("cust-1").unwrap();

        assert!(matches!(
            cart.add(&state, "item-3", 6),
            Err(CoreError::InsufficientStock { .. })
        ));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove() {
        let state = state();
        let mut cart = Cart::new("cust-1").unwrap();
        cart.add(&state, "item-3", 2).unwrap();

        assert!(cart.remove("item-3"));
        assert!(!cart.remove("item-3"));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_available_items_excludes_cart_and_empty_stock() {
        let state = state();
        let mut cart = Cart::new("cust-1").unwrap();
        cart.add(&state, "item-1", 1).unwrap();

        let ids: Vec<_> = cart.available_items(&state).iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["item-3"]);
    }

    #[test]
    fn test_totals() {
        let state = state();
        let mut cart = Cart::new("cust-1").unwrap();
        cart.add(&state, "item-1", 2).unwrap();
        cart.add(&state, "item-3", 3).unwrap();

        let totals = CartTotals::from(&cart);
        assert_eq!(totals.item_count, 2);
        assert_eq!(totals.total_quantity, 5);
        assert_eq!(totals.total, Money::from_major(510));
    }
}
