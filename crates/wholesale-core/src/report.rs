//! # Report Engine
//!
//! Read-only folds over a [`LedgerState`]. Every report is re-derived from
//! the transaction logs plus the current catalog and customer directory, so
//! two calls on the same state return identical rows.
//!
//! ## Report Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Report              Reads                        Order                 │
//! │  ──────────────────  ───────────────────────────  ───────────────────── │
//! │  summary             sales, items (cost)          -                     │
//! │  item_wise_sales     items, sales                 revenue desc          │
//! │  sales_vs_target     items, sales                 revenue desc          │
//! │  credit_report       customers, sales, payments   balance desc          │
//! │  sales_history       sales, customers, items      newest first          │
//! │  stock_report        items                        name                  │
//! │  purchase_history    purchases, items             newest first          │
//! │  reconcile           customers, sales, payments   directory order       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All sorts are stable: ties keep log or catalog insertion order.
//!
//! Profit is computed against the item's CURRENT cost price. Editing a cost
//! price therefore changes historical profit figures. An item that has left
//! the catalog is costed at zero.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::state::LedgerState;
use crate::types::{Purchase, Sale};

const UNKNOWN_CUSTOMER: &str = "Unknown Customer";
const UNKNOWN_ITEM: &str = "Unknown Item";

// =============================================================================
// Row Types
// =============================================================================

/// Headline figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SalesSummary {
    pub total_revenue: Money,
    pub total_profit: Money,
    pub sales_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ItemSalesRow {
    pub item_id: String,
    pub item_name: String,
    pub quantity_sold: i64,
    pub revenue: Money,
    pub current_stock: i64,
    pub target_sale: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TargetRow {
    pub item_id: String,
    pub item_name: String,
    pub target_sale: i64,
    pub quantity_sold: i64,
    pub current_stock: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreditRow {
    pub customer_id: String,
    pub customer_name: String,
    /// Σ totals of this customer's sales.
    pub total_purchases: Money,
    pub total_payments: Money,
    /// The stored running balance, not re-derived.
    pub balance: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleHistoryRow {
    pub sale_id: String,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    pub customer_id: String,
    pub customer_name: String,
    pub line_count: usize,
    pub total_amount: Money,
    pub profit: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StockRow {
    pub item_id: String,
    pub item_name: String,
    pub stock: i64,
    pub cost_price: Money,
    pub selling_price: Money,
    pub low_stock: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PurchaseHistoryRow {
    pub purchase_id: String,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    pub item_id: String,
    pub item_name: String,
    pub quantity: i64,
}

/// A customer whose stored balance disagrees with their history.
///
/// `difference = stored - expected`. Reported, never raised or corrected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ConsistencyDrift {
    pub customer_id: String,
    pub customer_name: String,
    /// Σ sale totals − Σ payments.
    pub expected: Money,
    pub stored: Money,
    pub difference: Money,
}

// =============================================================================
// Revenue & Profit
// =============================================================================

/// Σ sale.totalAmount.
pub fn total_revenue(state: &LedgerState) -> Money {
    state.sales.iter().map(|s| s.total_amount).sum()
}

/// Profit of one sale at current cost prices.
pub fn sale_profit(state: &LedgerState, sale: &Sale) -> Money {
    let costs = cost_index(state);
    profit_with(&costs, sale)
}

/// Σ over all sales of [`sale_profit`].
pub fn total_profit(state: &LedgerState) -> Money {
    let costs = cost_index(state);
    state.sales.iter().map(|s| profit_with(&costs, s)).sum()
}

pub fn summary(state: &LedgerState) -> SalesSummary {
    SalesSummary {
        total_revenue: total_revenue(state),
        total_profit: total_profit(state),
        sales_count: state.sales.len(),
    }
}

fn cost_index(state: &LedgerState) -> HashMap<&str, Money> {
    state
        .items
        .iter()
        .map(|i| (i.id.as_str(), i.cost_price))
        .collect()
}

fn profit_with(costs: &HashMap<&str, Money>, sale: &Sale) -> Money {
    sale.items
        .iter()
        .map(|line| {
            let cost = costs.get(line.item_id.as_str()).copied().unwrap_or_default();
            line.line_profit(cost)
        })
        .sum()
}

// =============================================================================
// Item Reports
// =============================================================================

/// Quantity sold and revenue per catalog item, highest revenue first.
///
/// Every catalog item gets a row, including ones never sold. Sale lines for
/// items no longer in the catalog are not counted.
pub fn item_wise_sales(state: &LedgerState) -> Vec<ItemSalesRow> {
    let mut rows: Vec<ItemSalesRow> = state
        .items
        .iter()
        .map(|item| ItemSalesRow {
            item_id: item.id.clone(),
            item_name: item.name.clone(),
            quantity_sold: 0,
            revenue: Money::zero(),
            current_stock: item.stock,
            target_sale: item.target_sale,
        })
        .collect();

    let position: HashMap<&str, usize> = state
        .items
        .iter()
        .enumerate()
        .map(|(idx, item)| (item.id.as_str(), idx))
        .collect();

    for line in state.sales.iter().flat_map(|s| s.items.iter()) {
        if let Some(&idx) = position.get(line.item_id.as_str()) {
            rows[idx].quantity_sold = rows[idx].quantity_sold.saturating_add(line.quantity);
            rows[idx].revenue += line.line_total();
        }
    }

    rows.sort_by(|a, b| b.revenue.cmp(&a.revenue));
    rows
}

/// (target, sold, stock) per item, in the same order as [`item_wise_sales`].
pub fn sales_vs_target(state: &LedgerState) -> Vec<TargetRow> {
    item_wise_sales(state)
        .into_iter()
        .map(|row| TargetRow {
            item_id: row.item_id,
            item_name: row.item_name,
            target_sale: row.target_sale,
            quantity_sold: row.quantity_sold,
            current_stock: row.current_stock,
        })
        .collect()
}

/// Catalog sorted by name, flagging items with stock below `low_stock_threshold`.
pub fn stock_report(state: &LedgerState, low_stock_threshold: i64) -> Vec<StockRow> {
    let mut rows: Vec<StockRow> = state
        .items
        .iter()
        .map(|item| StockRow {
            item_id: item.id.clone(),
            item_name: item.name.clone(),
            stock: item.stock,
            cost_price: item.cost_price,
            selling_price: item.selling_price,
            low_stock: item.stock < low_stock_threshold,
        })
        .collect();

    rows.sort_by(|a, b| {
        a.item_name
            .to_lowercase()
            .cmp(&b.item_name.to_lowercase())
            .then_with(|| a.item_name.cmp(&b.item_name))
    });
    rows
}

// =============================================================================
// Customer Reports
// =============================================================================

/// Gross purchases, gross payments and stored balance per customer,
/// largest balance first.
pub fn credit_report(state: &LedgerState) -> Vec<CreditRow> {
    let (purchases, payments) = customer_flows(state);

    let mut rows: Vec<CreditRow> = state
        .customers
        .iter()
        .map(|c| CreditRow {
            customer_id: c.id.clone(),
            customer_name: c.name.clone(),
            total_purchases: purchases.get(c.id.as_str()).copied().unwrap_or_default(),
            total_payments: payments.get(c.id.as_str()).copied().unwrap_or_default(),
            balance: c.credit_balance,
        })
        .collect();

    rows.sort_by(|a, b| b.balance.cmp(&a.balance));
    rows
}

/// Customers whose stored balance differs from Σ sales − Σ payments.
///
/// An empty result means every balance agrees with the logs.
pub fn reconcile(state: &LedgerState) -> Vec<ConsistencyDrift> {
    let (purchases, payments) = customer_flows(state);

    state
        .customers
        .iter()
        .filter_map(|c| {
            let bought = purchases.get(c.id.as_str()).copied().unwrap_or_default();
            let paid = payments.get(c.id.as_str()).copied().unwrap_or_default();
            let expected = bought - paid;
            let difference = c.credit_balance - expected;

            (!difference.is_zero()).then(|| ConsistencyDrift {
                customer_id: c.id.clone(),
                customer_name: c.name.clone(),
                expected,
                stored: c.credit_balance,
                difference,
            })
        })
        .collect()
}

fn customer_flows(state: &LedgerState) -> (HashMap<&str, Money>, HashMap<&str, Money>) {
    let mut purchases: HashMap<&str, Money> = HashMap::new();
    for sale in &state.sales {
        *purchases.entry(sale.customer_id.as_str()).or_default() += sale.total_amount;
    }

    let mut payments: HashMap<&str, Money> = HashMap::new();
    for payment in &state.payments {
        *payments.entry(payment.customer_id.as_str()).or_default() += payment.amount;
    }

    (purchases, payments)
}

// =============================================================================
// History
// =============================================================================

/// All sales, newest first, with customer name and profit.
pub fn sales_history(state: &LedgerState) -> Vec<SaleHistoryRow> {
    let costs = cost_index(state);
    let mut sales: Vec<&Sale> = state.sales.iter().collect();
    sales.sort_by(|a, b| b.date.cmp(&a.date));

    sales
        .into_iter()
        .map(|sale| SaleHistoryRow {
            sale_id: sale.id.clone(),
            date: sale.date,
            customer_id: sale.customer_id.clone(),
            customer_name: state
                .customer(&sale.customer_id)
                .map_or_else(|| UNKNOWN_CUSTOMER.to_string(), |c| c.name.clone()),
            line_count: sale.items.len(),
            total_amount: sale.total_amount,
            profit: profit_with(&costs, sale),
        })
        .collect()
}

/// All purchases, newest first, with the item's current name.
pub fn purchase_history(state: &LedgerState) -> Vec<PurchaseHistoryRow> {
    let mut purchases: Vec<&Purchase> = state.purchases.iter().collect();
    purchases.sort_by(|a, b| b.date.cmp(&a.date));

    purchases
        .into_iter()
        .map(|p| PurchaseHistoryRow {
            purchase_id: p.id.clone(),
            date: p.date,
            item_id: p.item_id.clone(),
            item_name: state
                .item(&p.item_id)
                .map_or_else(|| UNKNOWN_ITEM.to_string(), |i| i.name.clone()),
            quantity: p.quantity,
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::posting::StockPolicy;
    use crate::stamp::Stamp;
    use crate::types::{CartItem, Customer, DiscountPercent, Item};
    use chrono::{Duration, TimeZone};

    fn at(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap() + Duration::minutes(minutes)
    }

    fn stamp(id: &str, minutes: i64) -> Stamp {
        Stamp {
            id: id.to_string(),
            date: at(minutes),
        }
    }

    fn item(id: &str, name: &str, cost: i64, price: i64, stock: i64) -> Item {
        Item {
            id: id.to_string(),
            name: name.to_string(),
            cost_price: Money::from_major(cost),
            selling_price: Money::from_major(price),
            stock,
            target_sale: 10,
        }
    }

    fn customer(id: &str, name: &str) -> Customer {
        Customer {
            id: id.to_string(),
            name: name.to_string(),
            credit_balance: Money::zero(),
            phone: None,
        }
    }

    /// A: cost 100 / price 150; B: cost 50 / price 80.
    /// X buys 3×A, Y buys 2×B with 10% off, X pays 200.
    fn ledger() -> LedgerState {
        let mut state = LedgerState::empty();
        state.add_item(item("a", "Rice", 100, 150, 100)).unwrap();
        state.add_item(item("b", "atta", 50, 80, 40)).unwrap();
        state.add_customer(customer("x", "Store X")).unwrap();
        state.add_customer(customer("y", "Store Y")).unwrap();
        state
            .upsert_discount("y", "b", DiscountPercent::from_whole(10).unwrap())
            .unwrap();

        let line = state.price_line("a", "x", 3).unwrap();
        state
            .post_sale("x", vec![line], StockPolicy::Enforce, stamp("s1", 0))
            .unwrap();
        let line = state.price_line("b", "y", 2).unwrap();
        state
            .post_sale("y", vec![line], StockPolicy::Enforce, stamp("s2", 5))
            .unwrap();
        state
            .post_payment("x", Money::from_major(200), stamp("p1", 10))
            .unwrap();
        state
    }

    #[test]
    fn test_summary() {
        let s = summary(&ledger());
        // 450 + 2 × 72
        assert_eq!(s.total_revenue, Money::from_major(594));
        // 3 × 50 + 2 × 22
        assert_eq!(s.total_profit, Money::from_major(194));
        assert_eq!(s.sales_count, 2);
    }

    #[test]
    fn test_profit_uses_current_cost() {
        let mut state = ledger();
        let mut a = state.item("a").unwrap().clone();
        a.cost_price = Money::from_major(140);
        state.update_item(a).unwrap();

        assert_eq!(total_profit(&state), Money::from_major(30 + 44));
    }

    #[test]
    fn test_profit_of_unknown_item_costs_zero() {
        let mut state = ledger();
        state.items.retain(|i| i.id != "a");
        assert_eq!(sale_profit(&state, &state.sales[0].clone()), Money::from_major(450));
    }

    #[test]
    fn test_item_wise_sales_sorted_by_revenue() {
        let rows = item_wise_sales(&ledger());
        assert_eq!(rows[0].item_id, "a");
        assert_eq!(rows[0].quantity_sold, 3);
        assert_eq!(rows[0].revenue, Money::from_major(450));
        assert_eq!(rows[0].current_stock, 97);
        assert_eq!(rows[1].revenue, Money::from_major(144));
    }

    #[test]
    fn test_item_wise_quantity_saturates() {
        let mut state = ledger();
        let huge = CartItem {
            item_id: "a".to_string(),
            item_name: "A".to_string(),
            quantity: i64::MAX,
            unit_price: Money::zero(),
            discount: Money::zero(),
        };
        for n in 0..2 {
            state.sales.push(Sale {
                id: format!("bulk-{n}"),
                customer_id: "x".to_string(),
                date: at(100 + n),
                items: vec![huge.clone()],
                total_amount: Money::zero(),
            });
        }

        let row = item_wise_sales(&state)
            .into_iter()
            .find(|r| r.item_id == "a")
            .unwrap();
        assert_eq!(row.quantity_sold, i64::MAX);
    }

    #[test]
    fn test_sales_vs_target() {
        let rows = sales_vs_target(&ledger());
        assert_eq!(rows[0].target_sale, 10);
        assert_eq!(rows[0].quantity_sold, 3);
        assert_eq!(rows[0].current_stock, 97);
    }

    #[test]
    fn test_credit_report() {
        let rows = credit_report(&ledger());
        assert_eq!(rows[0].customer_id, "x");
        assert_eq!(rows[0].total_purchases, Money::from_major(450));
        assert_eq!(rows[0].total_payments, Money::from_major(200));
        assert_eq!(rows[0].balance, Money::from_major(250));
        assert_eq!(rows[1].balance, Money::from_major(144));
    }

    #[test]
    fn test_sales_history_newest_first() {
        let mut state = ledger();
        state.customers.retain(|c| c.id != "y");
        let rows = sales_history(&state);
        assert_eq!(rows[0].sale_id, "s2");
        assert_eq!(rows[0].customer_name, "Unknown Customer");
        assert_eq!(rows[0].profit, Money::from_major(44));
        assert_eq!(rows[1].customer_name, "Store X");
    }

    #[test]
    fn test_stock_report_sorted_and_flagged() {
        let rows = stock_report(&ledger(), 50);
        assert_eq!(rows[0].item_name, "atta");
        assert!(rows[0].low_stock);
        assert!(!rows[1].low_stock);
    }

    #[test]
    fn test_purchase_history_unknown_item() {
        let mut state = ledger();
        state.post_purchase("a", 5, stamp("pu1", 20)).unwrap();
        state.post_purchase("gone", 1, stamp("pu2", 30)).unwrap();

        let rows = purchase_history(&state);
        assert_eq!(rows[0].item_name, "Unknown Item");
        assert_eq!(rows[1].item_name, "Rice");
    }

    #[test]
    fn test_reconcile_clean_and_drifted() {
        let mut state = ledger();
        assert!(reconcile(&state).is_empty());

        let mut x = state.customer("x").unwrap().clone();
        x.credit_balance = Money::from_major(300);
        state.update_customer(x).unwrap();

        let drift = reconcile(&state);
        assert_eq!(drift.len(), 1);
        assert_eq!(drift[0].expected, Money::from_major(250));
        assert_eq!(drift[0].difference, Money::from_major(50));
    }

    #[test]
    fn test_reports_are_reproducible() {
        let state = ledger();
        assert_eq!(credit_report(&state), credit_report(&state));
        assert_eq!(item_wise_sales(&state), item_wise_sales(&state));
        assert_eq!(summary(&state), summary(&state));
    }
}
