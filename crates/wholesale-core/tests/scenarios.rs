//! End-to-end ledger walkthroughs against a small hand-built catalog.

use chrono::{Duration, TimeZone, Utc};
use wholesale_core::report;
use wholesale_core::stamp::{RecordKind, SequentialIds, SteppingClock};
use wholesale_core::{
    Cart, CoreError, Customer, DiscountPercent, Item, LedgerState, Money, Stamper, StockPolicy,
};

fn stamper() -> Stamper {
    let start = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
    Stamper::new(SequentialIds::new(), SteppingClock::new(start, Duration::minutes(1)))
}

/// Item A (cost 100, price 150, stock 10) and customer X with no balance.
fn ledger() -> LedgerState {
    let mut state = LedgerState::empty();
    state
        .add_item(Item {
            id: "item-a".to_string(),
            name: "Item A".to_string(),
            cost_price: Money::from_major(100),
            selling_price: Money::from_major(150),
            stock: 10,
            target_sale: 25,
        })
        .unwrap();
    state
        .add_customer(Customer {
            id: "cust-x".to_string(),
            name: "Customer X".to_string(),
            credit_balance: Money::zero(),
            phone: None,
        })
        .unwrap();
    state
}

#[test]
fn sale_without_discount_moves_stock_and_balance() {
    let mut state = ledger();
    let stamps = stamper();

    let line = state.price_line("item-a", "cust-x", 3).unwrap();
    assert!(line.discount.is_zero());

    let sale = state
        .post_sale("cust-x", vec![line], StockPolicy::Enforce, stamps.issue(RecordKind::Sale))
        .unwrap();

    assert_eq!(sale.total_amount.to_string(), "450.00");
    assert_eq!(state.item("item-a").unwrap().stock, 7);
    assert_eq!(
        state.customer("cust-x").unwrap().credit_balance,
        Money::from_major(450)
    );
}

#[test]
fn ten_percent_discount_prices_line() {
    let mut state = ledger();
    state
        .upsert_discount("cust-x", "item-a", DiscountPercent::from_whole(10).unwrap())
        .unwrap();

    let line = state.price_line("item-a", "cust-x", 2).unwrap();
    assert_eq!(line.unit_price, Money::from_major(150));
    assert_eq!(line.discount, Money::from_major(15));
    assert_eq!(line.line_total(), Money::from_major(270));
}

#[test]
fn payment_reduces_balance_and_shows_in_credit_report() {
    let mut state = ledger();
    let stamps = stamper();

    let line = state.price_line("item-a", "cust-x", 3).unwrap();
    state
        .post_sale("cust-x", vec![line], StockPolicy::Enforce, stamps.issue(RecordKind::Sale))
        .unwrap();
    state
        .post_payment("cust-x", Money::from_major(200), stamps.issue(RecordKind::Payment))
        .unwrap();

    assert_eq!(
        state.customer("cust-x").unwrap().credit_balance,
        Money::from_major(250)
    );

    let rows = report::credit_report(&state);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].total_purchases, Money::from_major(450));
    assert_eq!(rows[0].total_payments, Money::from_major(200));
    assert_eq!(rows[0].balance, Money::from_major(250));
    assert!(report::reconcile(&state).is_empty());
}

#[test]
fn over_stock_request_is_refused_without_changes() {
    let mut state = ledger();
    let stamps = stamper();

    let line = state.price_line("item-a", "cust-x", 3).unwrap();
    state
        .post_sale("cust-x", vec![line], StockPolicy::Enforce, stamps.issue(RecordKind::Sale))
        .unwrap();
    let before = state.clone();

    let err = state.price_line("item-a", "cust-x", 8).unwrap_err();
    assert!(matches!(
        err,
        CoreError::InsufficientStock {
            available: 7,
            requested: 8,
            ..
        }
    ));

    let mut cart = Cart::new("cust-x").unwrap();
    assert!(cart.add(&state, "item-a", 8).is_err());
    assert!(cart.is_empty());
    assert_eq!(state, before);
}

#[test]
fn stale_cart_is_rechecked_at_checkout() {
    let mut state = ledger();
    let stamps = stamper();

    // Two carts priced against the same 10 units.
    let mut first = Cart::new("cust-x").unwrap();
    first.add(&state, "item-a", 6).unwrap();
    let mut second = Cart::new("cust-x").unwrap();
    second.add(&state, "item-a", 6).unwrap();

    state
        .checkout(first, StockPolicy::Enforce, stamps.issue(RecordKind::Sale))
        .unwrap();
    let before = state.clone();

    let err = state
        .checkout(second, StockPolicy::Enforce, stamps.issue(RecordKind::Sale))
        .unwrap_err();
    assert!(matches!(err, CoreError::InsufficientStock { available: 4, .. }));
    assert_eq!(state, before);
}

#[test]
fn purchase_restocks_without_touching_balances() {
    let mut state = ledger();
    let stamps = stamper();

    let line = state.price_line("item-a", "cust-x", 3).unwrap();
    state
        .post_sale("cust-x", vec![line], StockPolicy::Enforce, stamps.issue(RecordKind::Sale))
        .unwrap();
    state
        .post_purchase("item-a", 20, stamps.issue(RecordKind::Purchase))
        .unwrap();

    assert_eq!(state.item("item-a").unwrap().stock, 27);
    assert_eq!(
        state.customer("cust-x").unwrap().credit_balance,
        Money::from_major(450)
    );

    let history = report::purchase_history(&state);
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].item_name, "Item A");
    assert_eq!(history[0].purchase_id, "purchase-000002");
}

#[test]
fn seeded_ledger_full_day() {
    let mut state = LedgerState::seeded();
    let stamps = stamper();

    let mut cart = Cart::new("cust-7").unwrap();
    cart.add(&state, "item-4", 10).unwrap();
    cart.add(&state, "item-9", 1).unwrap();
    // item-4: 2% of 2600 = 52 → 2548 × 10; item-9: ((7+9)%10)+1 = 7% of 7000 = 490 → 6510
    assert_eq!(cart.total(), Money::from_major(25480 + 6510));

    let sale = state
        .checkout(cart, StockPolicy::Enforce, stamps.issue(RecordKind::Sale))
        .unwrap();
    state
        .post_payment("cust-7", Money::from_major(10_000), stamps.issue(RecordKind::Payment))
        .unwrap();

    let summary = report::summary(&state);
    assert_eq!(summary.sales_count, 1);
    assert_eq!(summary.total_revenue, sale.total_amount);
    // (2548 - 2200) × 10 + (6510 - 6000)
    assert_eq!(summary.total_profit, Money::from_major(3480 + 510));

    let history = report::sales_history(&state);
    assert_eq!(history[0].customer_name, "Retail Store #7");

    let stock = report::stock_report(&state, 50);
    assert!(stock.iter().all(|row| !row.low_stock));
}
