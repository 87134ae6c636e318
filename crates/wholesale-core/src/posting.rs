//! # Ledger Poster
//!
//! The three posting transitions. Each one appends a record to its log and
//! applies the matching stock or balance change as a single step.
//!
//! ## Posting Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       post_sale(customer, lines)                        │
//! │                                                                         │
//! │  1. CHECK (no writes yet)                                               │
//! │     ├── customer id present              → else InvalidInput            │
//! │     ├── at least one line                → else EmptyCart               │
//! │     ├── every quantity > 0               → else InvalidInput            │
//! │     ├── Σ qty per item <= stock          → else InsufficientStock       │
//! │     │   (skipped under StockPolicy::AllowNegative)                      │
//! │     └── new stock / balance fit          → else InvalidInput            │
//! │                                                                         │
//! │  2. WRITE (cannot fail)                                                 │
//! │     ├── sales.push(Sale { totalAmount = Σ line totals })                │
//! │     ├── item.stock -= qty         (unknown item: skipped, warn)         │
//! │     └── customer.balance += total (unknown customer: skipped, warn)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Purchases and payments follow the same check-then-write shape. A posting
//! that returns `Err` has not touched the state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cart::Cart;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::stamp::Stamp;
use crate::state::LedgerState;
use crate::types::{CartItem, Payment, Purchase, Sale};
use crate::validation::{validate_id, validate_payment_amount, validate_quantity};

/// Whether `post_sale` re-checks stock at posting time.
///
/// Lines are always checked when they are priced. Between pricing and
/// posting another sale may have taken the stock; `Enforce` refuses the sale
/// in that case, `AllowNegative` lets stock go below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockPolicy {
    #[default]
    Enforce,
    AllowNegative,
}

impl LedgerState {
    // =========================================================================
    // Sales
    // =========================================================================

    /// Posts a sale of already-priced lines.
    ///
    /// Lines are stored exactly as given (name, price and discount
    /// snapshots are not re-resolved).
    pub fn post_sale(
        &mut self,
        customer_id: &str,
        items: Vec<CartItem>,
        policy: StockPolicy,
        stamp: Stamp,
    ) -> CoreResult<Sale> {
        validate_id("customerId", customer_id)?;
        if items.is_empty() {
            return Err(CoreError::EmptyCart);
        }
        for line in &items {
            validate_quantity(line.quantity)?;
        }
        self.check_stock(&items, policy)?;
        let total_amount = Sale::checked_total(&items).ok_or_else(|| too_large("totalAmount"))?;
        if let Some(customer) = self.customer(customer_id) {
            customer
                .credit_balance
                .amount()
                .checked_add(total_amount.amount())
                .ok_or_else(|| too_large("creditBalance"))?;
        }

        let sale = Sale {
            id: stamp.id,
            customer_id: customer_id.to_string(),
            date: stamp.date,
            total_amount,
            items,
        };

        for line in &sale.items {
            match self.item_mut(&line.item_id) {
                Some(item) => item.stock -= line.quantity,
                None => warn!(
                    sale_id = %sale.id,
                    item_id = %line.item_id,
                    "Sold item not in catalog, stock not adjusted"
                ),
            }
        }

        match self.customer_mut(customer_id) {
            Some(customer) => customer.credit_balance += sale.total_amount,
            None => warn!(
                sale_id = %sale.id,
                customer_id,
                "Customer not found, balance not adjusted"
            ),
        }

        info!(
            sale_id = %sale.id,
            customer_id,
            lines = sale.items.len(),
            total = %sale.total_amount,
            "Sale posted"
        );

        self.sales.push(sale.clone());
        Ok(sale)
    }

    /// Posts a cart as a sale for the cart's customer.
    pub fn checkout(&mut self, cart: Cart, policy: StockPolicy, stamp: Stamp) -> CoreResult<Sale> {
        let (customer_id, lines) = cart.into_parts();
        self.post_sale(&customer_id, lines, policy, stamp)
    }

    /// Quantities are summed per item first, so two lines of the same item
    /// cannot each pass on their own and together oversell.
    ///
    /// Under either policy the resulting stock must fit in an `i64`.
    fn check_stock(&self, items: &[CartItem], policy: StockPolicy) -> CoreResult<()> {
        let mut requested: BTreeMap<&str, i64> = BTreeMap::new();
        for line in items {
            let total = requested.entry(line.item_id.as_str()).or_insert(0);
            *total = total
                .checked_add(line.quantity)
                .ok_or_else(|| too_large("quantity"))?;
        }

        for (item_id, quantity) in requested {
            // Unknown items are not checked; their stock change is skipped.
            let Some(item) = self.item(item_id) else {
                continue;
            };
            if policy == StockPolicy::Enforce && !item.can_sell(quantity) {
                debug!(item_id, available = item.stock, quantity, "Stock re-check failed");
                return Err(CoreError::InsufficientStock {
                    item_id: item_id.to_string(),
                    available: item.stock,
                    requested: quantity,
                });
            }
            item.stock
                .checked_sub(quantity)
                .ok_or_else(|| too_large("quantity"))?;
        }
        Ok(())
    }

    // =========================================================================
    // Purchases
    // =========================================================================

    /// Records stock received and adds it to the item.
    pub fn post_purchase(&mut self, item_id: &str, quantity: i64, stamp: Stamp) -> CoreResult<Purchase> {
        validate_id("itemId", item_id)?;
        validate_quantity(quantity)?;
        if let Some(item) = self.item(item_id) {
            item.stock
                .checked_add(quantity)
                .ok_or_else(|| too_large("quantity"))?;
        }

        let purchase = Purchase {
            id: stamp.id,
            item_id: item_id.to_string(),
            quantity,
            date: stamp.date,
        };

        match self.item_mut(item_id) {
            Some(item) => item.stock += quantity,
            None => warn!(
                purchase_id = %purchase.id,
                item_id,
                "Purchased item not in catalog, stock not adjusted"
            ),
        }

        info!(purchase_id = %purchase.id, item_id, quantity, "Purchase posted");

        self.purchases.push(purchase.clone());
        Ok(purchase)
    }

    // =========================================================================
    // Payments
    // =========================================================================

    /// Records a payment and reduces the customer's balance.
    ///
    /// The amount may exceed the balance; the balance then goes negative.
    pub fn post_payment(&mut self, customer_id: &str, amount: Money, stamp: Stamp) -> CoreResult<Payment> {
        validate_id("customerId", customer_id)?;
        validate_payment_amount(amount)?;
        if let Some(customer) = self.customer(customer_id) {
            customer
                .credit_balance
                .amount()
                .checked_sub(amount.amount())
                .ok_or_else(|| too_large("amount"))?;
        }

        let payment = Payment {
            id: stamp.id,
            customer_id: customer_id.to_string(),
            amount,
            date: stamp.date,
        };

        match self.customer_mut(customer_id) {
            Some(customer) => customer.credit_balance -= amount,
            None => warn!(
                payment_id = %payment.id,
                customer_id,
                "Customer not found, balance not adjusted"
            ),
        }

        info!(payment_id = %payment.id, customer_id, amount = %amount, "Payment posted");

        self.payments.push(payment.clone());
        Ok(payment)
    }

    /// The outstanding balance for a customer, or zero when in credit.
    pub fn suggested_payment(&self, customer_id: &str) -> CoreResult<Money> {
        Ok(self.require_customer(customer_id)?.suggested_payment())
    }
}

fn too_large(field: &str) -> CoreError {
    ValidationError::TooLarge {
        field: field.to_string(),
    }
    .into()
}

// =============================================================================
// Unit Tests
// =============================================================================
