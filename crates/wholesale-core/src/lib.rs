//! # wholesale-core: Pure Ledger Logic for the Wholesale POS
//!
//! This crate holds the whole ledger: catalog, customers, discounts, the
//! sales/purchases/payments logs, and every rule that changes or reads them.
//! It performs no I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Wholesale POS Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Presentation (outside workspace)                │   │
//! │  │   New Sale ──► Invoice ──► Purchases ──► Manage ──► Reports     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             wholesale-db :: LedgerSession                       │   │
//! │  │     load slots ─► apply transition ─► save slots (1 txn)        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ wholesale-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐          │   │
//! │  │   │ pricing  │ │ posting  │ │  report  │ │  slots   │          │   │
//! │  │   │  cart    │ │  state   │ │ invoice  │ │  seed    │          │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────┘          │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO GLOBAL STATE                        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Records (Item, Customer, Discount, CartItem, Sale, ...)
//! - [`money`] - Exact decimal money
//! - [`state`] - The `LedgerState` container and administrative edits
//! - [`pricing`] - Discount resolution and line pricing
//! - [`cart`] - Sale in progress
//! - [`posting`] - Sale / purchase / payment transitions
//! - [`report`] - Read-only report folds
//! - [`invoice`] - Invoice snapshot and share text
//! - [`slots`] - Slot payload codec
//! - [`stamp`] - Id and clock collaborators
//!
//! ## Example Usage
//!
//! ```rust
//! use wholesale_core::stamp::RecordKind;
//! use wholesale_core::{Cart, LedgerState, Money, Stamper, StockPolicy};
//!
//! let mut state = LedgerState::seeded();
//! let stamper = Stamper::system();
//!
//! // cust-1 gets 3% on item-1 in the seed table: 2500 - 75 = 2425 per unit
//! let mut cart = Cart::new("cust-1").unwrap();
//! cart.add(&state, "item-1", 2).unwrap();
//! assert_eq!(cart.total(), Money::from_major(4850));
//!
//! let sale = state
//!     .checkout(cart, StockPolicy::Enforce, stamper.issue(RecordKind::Sale))
//!     .unwrap();
//! assert_eq!(state.item("item-1").unwrap().stock, 498);
//! assert_eq!(state.customer("cust-1").unwrap().credit_balance, sale.total_amount);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod invoice;
pub mod money;
pub mod posting;
pub mod pricing;
pub mod report;
pub mod seed;
pub mod settings;
pub mod slots;
pub mod stamp;
pub mod state;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartTotals};
pub use error::{CoreError, CoreResult, ValidationError};
pub use invoice::{Invoice, InvoiceLine};
pub use money::Money;
pub use posting::StockPolicy;
pub use settings::LedgerSettings;
pub use slots::{LoadedState, Slot, SlotError};
pub use stamp::{Stamp, Stamper};
pub use state::LedgerState;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length of an item or customer name.
pub const MAX_NAME_LENGTH: usize = 200;
