//! # Seed Data
//!
//! The initial ledger used when the store has no data yet: ten wholesale
//! items, fifty retail customers and a discount for every customer×item
//! pair. Slots that are missing or unreadable also fall back to these.
//!
//! Discounts are generated, not random, so every installation starts with
//! the same table:
//! ```text
//! percent = ((d(customer.id[5]) + d(item.id[5])) % 10) + 1
//!           where d(c) = char code of c − 48
//!
//!   cust-1  × item-1  → ((1 + 1) % 10) + 1 = 3%
//!   cust-7  × item-4  → ((7 + 4) % 10) + 1 = 2%
//!   cust-12 × item-10 → ((1 + 1) % 10) + 1 = 3%   (only the 6th char counts)
//! ```

use crate::money::Money;
use crate::state::LedgerState;
use crate::types::{Customer, Discount, DiscountPercent, Item};

pub const SEED_CUSTOMER_COUNT: usize = 50;

/// (id, name, cost, price, stock, target)
const SEED_ITEMS: &[(&str, &str, i64, i64, i64, i64)] = &[
    ("item-1", "Premium Grade A Rice (50kg)", 2000, 2500, 500, 400),
    ("item-2", "Sunflower Oil (15L Tin)", 1500, 1800, 300, 250),
    ("item-3", "Whole Wheat Flour (25kg)", 800, 1000, 800, 600),
    ("item-4", "Refined Sugar (50kg Sack)", 2200, 2600, 400, 300),
    ("item-5", "Toor Dal (30kg Bag)", 2800, 3200, 250, 200),
    ("item-6", "Basmati Rice (25kg)", 3000, 3500, 200, 150),
    ("item-7", "Groundnut Oil (15L Tin)", 2100, 2400, 280, 220),
    ("item-8", "Tea Powder (10kg Pack)", 1800, 2200, 150, 100),
    ("item-9", "Cashew Nuts (10kg Box)", 6000, 7000, 100, 80),
    ("item-10", "Ghee (5L Tin)", 2500, 2900, 180, 150),
];

pub fn seed_items() -> Vec<Item> {
    SEED_ITEMS
        .iter()
        .map(|&(id, name, cost, price, stock, target)| Item {
            id: id.to_string(),
            name: name.to_string(),
            cost_price: Money::from_major(cost),
            selling_price: Money::from_major(price),
            stock,
            target_sale: target,
        })
        .collect()
}

pub fn seed_customers() -> Vec<Customer> {
    (1..=SEED_CUSTOMER_COUNT)
        .map(|n| Customer {
            id: format!("cust-{n}"),
            name: format!("Retail Store #{n}"),
            credit_balance: Money::zero(),
            phone: Some(format!("9230012345{n:02}")),
        })
        .collect()
}

/// One record per customer×item pair, customers outermost.
pub fn seed_discounts(customers: &[Customer], items: &[Item]) -> Vec<Discount> {
    customers
        .iter()
        .flat_map(|c| {
            items.iter().map(move |i| Discount {
                customer_id: c.id.clone(),
                item_id: i.id.clone(),
                discount_percentage: generated_discount(&c.id, &i.id),
            })
        })
        .collect()
}

/// The full seed ledger with empty transaction logs.
pub fn seed_state() -> LedgerState {
    let items = seed_items();
    let customers = seed_customers();
    let discounts = seed_discounts(&customers, &items);
    LedgerState {
        items,
        customers,
        discounts,
        ..LedgerState::default()
    }
}

fn generated_discount(customer_id: &str, item_id: &str) -> DiscountPercent {
    let percent = (sixth_char_value(customer_id) + sixth_char_value(item_id)).rem_euclid(10) + 1;
    // 1..=10 is always in range.
    DiscountPercent::from_whole(percent).unwrap_or_default()
}

fn sixth_char_value(id: &str) -> i64 {
    id.as_bytes().get(5).map_or(0, |&b| i64::from(b) - 48)
}
