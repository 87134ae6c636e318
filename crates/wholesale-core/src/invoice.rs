//! # Invoice Snapshot
//!
//! Everything a renderer needs to draw an invoice for one sale. Rendering
//! itself (image, PDF, sharing) happens outside the core.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  Wholesale POS                               │
//! │  Invoice #: sale-0192...   Date: 2024-03-01  │
//! │  Bill To: Retail Store #7                    │
//! │  ──────────────────────────────────────────  │
//! │  Item        Qty   Price   Disc.   Total     │
//! │  ...                                         │
//! │  ──────────────────────────────────────────  │
//! │  Previous Balance:            RS    250.00   │
//! │  Current Sale:                RS    450.00   │
//! │  New Balance:                 RS    700.00   │
//! └──────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::settings::LedgerSettings;
use crate::state::LedgerState;
use crate::types::{Customer, Sale};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct InvoiceLine {
    pub item_name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub discount: Money,
    pub line_total: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Invoice {
    /// The sale id.
    pub invoice_number: String,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    pub store_name: String,
    pub customer_id: String,
    pub customer_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub customer_phone: Option<String>,
    pub lines: Vec<InvoiceLine>,
    /// Customer balance before this sale.
    pub previous_balance: Money,
    pub current_sale: Money,
    pub new_balance: Money,
}

impl Invoice {
    /// Builds the snapshot from a sale and the customer's balance before it.
    pub fn build(
        sale: &Sale,
        customer: &Customer,
        previous_balance: Money,
        settings: &LedgerSettings,
    ) -> Self {
        Invoice {
            invoice_number: sale.id.clone(),
            date: sale.date,
            store_name: settings.store_name.clone(),
            customer_id: customer.id.clone(),
            customer_name: customer.name.clone(),
            customer_phone: customer.phone.clone(),
            lines: sale
                .items
                .iter()
                .map(|l| InvoiceLine {
                    item_name: l.item_name.clone(),
                    quantity: l.quantity,
                    unit_price: l.unit_price,
                    discount: l.discount,
                    line_total: l.line_total(),
                })
                .collect(),
            previous_balance,
            current_sale: sale.total_amount,
            new_balance: previous_balance + sale.total_amount,
        }
    }

    /// Text sent alongside the invoice when it is shared.
    pub fn share_message(&self, settings: &LedgerSettings) -> String {
        format!(
            "Dear {}, here is your invoice for {}. Thank you for your business!",
            self.customer_name,
            settings.format_currency(self.current_sale)
        )
    }
}

impl LedgerState {
    /// Invoice for an already-posted sale.
    ///
    /// The previous balance is the stored balance with this sale and every
    /// later sale and payment backed out, so administrative balance edits
    /// made before the sale are respected.
    ///
    /// Later sales are found by log position. Payments live in their own log
    /// and are ordered against the sale by date, which relies on
    /// [`Stamper`](crate::stamp::Stamper) issuing strictly increasing dates.
    pub fn invoice_for(&self, sale_id: &str, settings: &LedgerSettings) -> CoreResult<Invoice> {
        let position = self
            .sales
            .iter()
            .position(|s| s.id == sale_id)
            .ok_or_else(|| CoreError::SaleNotFound(sale_id.to_string()))?;
        let sale = &self.sales[position];
        let customer = self.require_customer(&sale.customer_id)?;

        let later_sales: Money = self.sales[position + 1..]
            .iter()
            .filter(|s| s.customer_id == sale.customer_id)
            .map(|s| s.total_amount)
            .sum();
        let later_payments: Money = self
            .payments
            .iter()
            .filter(|p| p.customer_id == sale.customer_id && p.date > sale.date)
            .map(|p| p.amount)
            .sum();

        let previous = customer.credit_balance - sale.total_amount - later_sales + later_payments;
        Ok(Invoice::build(sale, customer, previous, settings))
    }
}
