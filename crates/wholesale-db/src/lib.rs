//! # wholesale-db: Storage and Session for the Wholesale Ledger
//!
//! Persists the ledger in SQLite and applies every transition through a
//! versioned load/apply/save cycle.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Wholesale Ledger Data Flow                         │
//! │                                                                         │
//! │  Presentation (checkout screen, reports, invoice share)                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   wholesale-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │ LedgerSession │    │ SlotRepository│    │  Migrations  │  │   │
//! │  │   │ (session.rs)  │───►│  (slots.rs)   │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ clone, apply, │    │ load_state    │    │ 001_ledger_  │  │   │
//! │  │   │ save, swap    │    │ save_state    │    │  slots.sql   │  │   │
//! │  │   └───────┬───────┘    └───────┬───────┘    └──────────────┘  │   │
//! │  │           │                    │                                │   │
//! │  │           ▼                    ▼                                │   │
//! │  │   wholesale-core          Database (pool.rs)                   │   │
//! │  │   (rules, reports)                                              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (WAL)                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - TOML file + environment configuration
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Slot store
//! - [`session`] - Ledger session
//!
//! ## Usage
//!
//! ```rust,ignore
//! use wholesale_db::{AppConfig, LedgerSession};
//!
//! let config = AppConfig::load(None)?;
//! let session = LedgerSession::from_config(&config).await?;
//!
//! let line = session.price_line("item-1", "cust-1", 2).await?;
//! let sale = session.post_sale("cust-1", vec![line]).await?;
//! let invoice = session.invoice(&sale.id).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod session;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::AppConfig;
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::slots::SlotRepository;
pub use session::LedgerSession;
