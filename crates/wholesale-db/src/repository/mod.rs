//! # Repository Module
//!
//! Database access for the ledger slot store.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  LedgerSession                                                         │
//! │       │                                                                 │
//! │       │  db.slots().save_state(&next, version)                         │
//! │       ▼                                                                 │
//! │  SlotRepository                                                        │
//! │  ├── load_state(&self)          → (LoadedState, version)               │
//! │  ├── save_state(&self, state, expected_version)                        │
//! │  ├── state_version(&self)                                              │
//! │  └── has_data(&self)                                                   │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database (ledger_slots, ledger_meta)                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`slots::SlotRepository`] - Whole-state load and versioned save

pub mod slots;
