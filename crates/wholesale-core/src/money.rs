//! # Money Module
//!
//! Provides the `Money` type for handling currency amounts safely.
//!
//! ## Why Decimal Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Wholesale discounts are percentages of the selling price:             │
//! │    7% of RS 1999 = RS 139.93 exactly, 3% of RS 2.55 = RS 0.0765        │
//! │    Integer cents cannot hold the second one without rounding early.    │
//! │                                                                         │
//! │  OUR SOLUTION: Exact Decimal                                            │
//! │    Amounts are stored at full precision and rounded to two places      │
//! │    only when displayed (see `Money::rounded`).                          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use wholesale_core::money::Money;
//!
//! let price = Money::from_major(150);
//! let line = price.multiply_quantity(3);
//! assert_eq!(line, Money::from_major(450));
//! assert_eq!(line.to_string(), "450.00");
//! ```

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use ts_rs::TS;

use crate::types::DiscountPercent;

/// Number of decimal places shown for currency amounts.
pub const DISPLAY_DECIMALS: u32 = 2;

// =============================================================================
// Money Type
// =============================================================================

/// A currency amount at full decimal precision.
///
/// ## Design Decisions
/// - **Decimal (signed)**: credit balances go negative when a customer overpays
/// - **Single field tuple struct**: zero-cost abstraction over `Decimal`
/// - **Serde transparent**: written as a decimal string, read from either a
///   string or a JSON number (older blobs stored plain numbers)
///
/// ## Where Money is Used
/// ```text
/// Item.sellingPrice ──► CartItem.unitPrice ──┐
///                                            ├──► line total ──► Sale.totalAmount
/// Discount % ─────────► CartItem.discount ───┘                        │
///                                                                     ▼
///                    Payment.amount ──────────────────► Customer.creditBalance
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[serde(transparent)]
#[ts(export)]
pub struct Money(#[ts(type = "string")] Decimal);

impl Money {
    /// Wraps an exact decimal amount.
    #[inline]
    pub const fn new(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Creates a whole-unit amount (e.g. `from_major(150)` is RS 150.00).
    #[inline]
    pub fn from_major(units: i64) -> Self {
        Money(Decimal::from(units))
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    /// Returns the underlying decimal at full precision.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Checks if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use wholesale_core::money::Money;
    ///
    /// let unit = Money::from_major(135);
    /// assert_eq!(unit.multiply_quantity(2), Money::from_major(270));
    /// ```
    #[inline]
    pub fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * Decimal::from(qty))
    }

    /// Returns `percent` of this amount, unrounded.
    ///
    /// ## Example
    /// ```rust
    /// use wholesale_core::money::Money;
    /// use wholesale_core::types::DiscountPercent;
    ///
    /// let price = Money::from_major(150);
    /// let ten = DiscountPercent::from_whole(10).unwrap();
    /// assert_eq!(price.percentage(ten), Money::from_major(15));
    /// ```
    pub fn percentage(&self, percent: DiscountPercent) -> Money {
        Money(self.0 * percent.value() / Decimal::ONE_HUNDRED)
    }

    /// Rounds to display precision, half away from zero.
    ///
    /// Only presentation code should call this; stored values keep full
    /// precision.
    pub fn rounded(&self) -> Decimal {
        self.0
            .round_dp_with_strategy(DISPLAY_DECIMALS, RoundingStrategy::MidpointAwayFromZero)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Renders as a plain two-decimal amount, e.g. `450.00`.
///
/// Currency symbols are added by `LedgerSettings::format_currency`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.rounded())
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Money(amount)
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

/// Multiplication by a quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
