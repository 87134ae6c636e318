//! # Ledger State
//!
//! The explicit state container: catalog, customer directory, discount table
//! and the three transaction logs. Everything that mutates or reads the
//! ledger takes a `LedgerState` by reference; there is no global.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Session start:  slots ──► LedgerState::from_slots ──► LedgerState     │
//! │                                                                         │
//! │  Each mutation:  state.post_sale / post_purchase / post_payment        │
//! │                  state.upsert_discount / update_item / ...             │
//! │                                                                         │
//! │  After mutation: state.to_slots ──► store writes all slots at once     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Administrative edits live here; postings are in [`crate::posting`].

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::types::{Customer, Discount, DiscountPercent, Item, Payment, Purchase, Sale};
use crate::validation::{validate_customer, validate_id, validate_item};

/// The whole ledger.
///
/// Collections keep insertion order; reports iterate them in that order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerState {
    pub items: Vec<Item>,
    pub customers: Vec<Customer>,
    pub discounts: Vec<Discount>,
    pub sales: Vec<Sale>,
    pub purchases: Vec<Purchase>,
    pub payments: Vec<Payment>,
}

impl LedgerState {
    /// An empty ledger (no catalog, no customers, empty logs).
    pub fn empty() -> Self {
        Self::default()
    }

    /// A ledger holding the seed catalog, customers and discounts.
    pub fn seeded() -> Self {
        crate::seed::seed_state()
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    pub fn item(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    pub(crate) fn item_mut(&mut self, id: &str) -> Option<&mut Item> {
        self.items.iter_mut().find(|i| i.id == id)
    }

    pub fn customer(&self, id: &str) -> Option<&Customer> {
        self.customers.iter().find(|c| c.id == id)
    }

    pub(crate) fn customer_mut(&mut self, id: &str) -> Option<&mut Customer> {
        self.customers.iter_mut().find(|c| c.id == id)
    }

    /// Like [`item`](Self::item) but `ItemNotFound` when absent.
    pub fn require_item(&self, id: &str) -> CoreResult<&Item> {
        self.item(id)
            .ok_or_else(|| CoreError::ItemNotFound(id.to_string()))
    }

    /// Like [`customer`](Self::customer) but `CustomerNotFound` when absent.
    pub fn require_customer(&self, id: &str) -> CoreResult<&Customer> {
        self.customer(id)
            .ok_or_else(|| CoreError::CustomerNotFound(id.to_string()))
    }

    pub fn sale(&self, id: &str) -> Option<&Sale> {
        self.sales.iter().find(|s| s.id == id)
    }

    /// Date of the newest sale, purchase or payment.
    pub fn latest_record_date(&self) -> Option<DateTime<Utc>> {
        let sales = self.sales.iter().map(|s| s.date);
        let purchases = self.purchases.iter().map(|p| p.date);
        let payments = self.payments.iter().map(|p| p.date);
        sales.chain(purchases).chain(payments).max()
    }

    // =========================================================================
    // Discount Administration
    // =========================================================================

    /// The discount for a customer×item pair; 0% when no record exists.
    pub fn discount_for(&self, customer_id: &str, item_id: &str) -> DiscountPercent {
        crate::pricing::resolve_discount(&self.discounts, customer_id, item_id)
    }

    /// All discount records of one customer, keyed by item id.
    pub fn discounts_for_customer(&self, customer_id: &str) -> BTreeMap<String, DiscountPercent> {
        self.discounts
            .iter()
            .filter(|d| d.customer_id == customer_id)
            .map(|d| (d.item_id.clone(), d.discount_percentage))
            .collect()
    }

    /// Inserts or replaces the discount for (customer, item).
    ///
    /// ## Behavior
    /// - Pair present: percentage overwritten in place
    /// - Pair absent: record appended
    ///
    /// Applying the same call twice leaves exactly one record.
    pub fn upsert_discount(
        &mut self,
        customer_id: &str,
        item_id: &str,
        percent: DiscountPercent,
    ) -> CoreResult<()> {
        validate_id("customerId", customer_id)?;
        validate_id("itemId", item_id)?;

        debug!(customer_id, item_id, percent = %percent.value(), "Upserting discount");

        match self
            .discounts
            .iter_mut()
            .find(|d| d.matches(customer_id, item_id))
        {
            Some(existing) => existing.discount_percentage = percent,
            None => self.discounts.push(Discount {
                customer_id: customer_id.to_string(),
                item_id: item_id.to_string(),
                discount_percentage: percent,
            }),
        }
        Ok(())
    }

    // =========================================================================
    // Catalog / Customer Administration
    // =========================================================================

    /// Adds a new catalog item.
    pub fn add_item(&mut self, item: Item) -> CoreResult<()> {
        validate_item(&item)?;
        if self.item(&item.id).is_some() {
            return Err(CoreError::AlreadyExists {
                entity: "Item",
                id: item.id,
            });
        }
        debug!(item_id = %item.id, "Adding item");
        self.items.push(item);
        Ok(())
    }

    /// Adds a new customer.
    pub fn add_customer(&mut self, customer: Customer) -> CoreResult<()> {
        validate_customer(&customer)?;
        if self.customer(&customer.id).is_some() {
            return Err(CoreError::AlreadyExists {
                entity: "Customer",
                id: customer.id,
            });
        }
        debug!(customer_id = %customer.id, "Adding customer");
        self.customers.push(customer);
        Ok(())
    }

    /// Replaces the whole item record with the same id.
    ///
    /// Stock is overwritten too; this is the administrative correction path.
    pub fn update_item(&mut self, item: Item) -> CoreResult<()> {
        let slot = self
            .item_mut(&item.id)
            .ok_or_else(|| CoreError::ItemNotFound(item.id.clone()))?;
        debug!(item_id = %item.id, "Updating item");
        *slot = item;
        Ok(())
    }

    /// Replaces the whole customer record with the same id.
    ///
    /// Credit balance is overwritten too.
    pub fn update_customer(&mut self, customer: Customer) -> CoreResult<()> {
        let slot = self
            .customer_mut(&customer.id)
            .ok_or_else(|| CoreError::CustomerNotFound(customer.id.clone()))?;
        debug!(customer_id = %customer.id, "Updating customer");
        *slot = customer;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
