//! # Ledger Settings
//!
//! The pure part of the configuration: values that change how the ledger
//! behaves or renders, with no knowledge of where they were loaded from.
//!
//! Loading (TOML file, environment overrides) lives in `wholesale-db`.

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::posting::StockPolicy;

/// Behavioural and display settings for one ledger.
///
/// ## Fields
/// Defaults suit a single-store deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerSettings {
    /// Store name (printed on invoices).
    pub store_name: String,

    /// Currency symbol (for display).
    pub currency_symbol: String,

    /// Number of decimal places for currency display.
    pub currency_decimals: u32,

    /// Items with stock below this are flagged in the stock report.
    pub low_stock_threshold: i64,

    /// When false, a sale that would take stock below zero is refused at
    /// posting time, not only when the line was added to the cart.
    pub allow_negative_stock: bool,
}

impl Default for LedgerSettings {
    /// ## Default Values
    /// - Store: "Wholesale POS"
    /// - Currency: RS, two decimals
    /// - Low stock below 50 units
    /// - Stock re-checked at posting
    fn default() -> Self {
        LedgerSettings {
            store_name: "Wholesale POS".to_string(),
            currency_symbol: "RS".to_string(),
            currency_decimals: 2,
            low_stock_threshold: 50,
            allow_negative_stock: false,
        }
    }
}

impl LedgerSettings {
    /// The stock policy applied by `post_sale`.
    pub fn stock_policy(&self) -> StockPolicy {
        if self.allow_negative_stock {
            StockPolicy::AllowNegative
        } else {
            StockPolicy::Enforce
        }
    }

    /// Formats an amount for display, e.g. `RS 450.00`.
    ///
    /// The sign follows the number (`RS -12.50`).
    pub fn format_currency(&self, amount: Money) -> String {
        let rounded = amount.amount().round_dp_with_strategy(
            self.currency_decimals,
            rust_decimal::RoundingStrategy::MidpointAwayFromZero,
        );
        format!(
            "{} {:.prec$}",
            self.currency_symbol,
            rounded,
            prec = self.currency_decimals as usize
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_currency_positive() {
        let settings = LedgerSettings::default();
        assert_eq!(settings.format_currency(Money::from_major(450)), "RS 450.00");
        assert_eq!(settings.format_currency(Money::new(dec!(0.015))), "RS 0.02");
    }

    #[test]
    fn test_format_currency_negative() {
        let settings = LedgerSettings::default();
        assert_eq!(settings.format_currency(Money::new(dec!(-12.5))), "RS -12.50");
    }

    #[test]
    fn test_format_currency_zero_decimals() {
        let settings = LedgerSettings {
            currency_decimals: 0,
            ..LedgerSettings::default()
        };
        assert_eq!(settings.format_currency(Money::new(dec!(2499.5))), "RS 2500");
    }

    #[test]
    fn test_stock_policy() {
        let mut settings = LedgerSettings::default();
        assert_eq!(settings.stock_policy(), StockPolicy::Enforce);
        settings.allow_negative_stock = true;
        assert_eq!(settings.stock_policy(), StockPolicy::AllowNegative);
    }
}
